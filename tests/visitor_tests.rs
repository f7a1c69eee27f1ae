// Integration tests for double-dispatch traversal

use protoidl::*;
use rstest::rstest;

/// Records the callback fired for every node, and follows embedded options.
#[derive(Default)]
struct KindRecorder {
    kinds: Vec<&'static str>,
}

impl Visitor for KindRecorder {
    fn visit_syntax(&mut self, _: &Syntax) {
        self.kinds.push("Syntax");
    }
    fn visit_package(&mut self, _: &Package) {
        self.kinds.push("Package");
    }
    fn visit_import(&mut self, _: &Import) {
        self.kinds.push("Import");
    }
    fn visit_option(&mut self, _: &ProtoOption) {
        self.kinds.push("Option");
    }
    fn visit_message(&mut self, _: &Message) {
        self.kinds.push("Message");
    }
    fn visit_normal_field(&mut self, field: &NormalField) {
        self.kinds.push("NormalField");
        for option in &field.field.options {
            option.accept(self);
        }
    }
    fn visit_map_field(&mut self, _: &MapField) {
        self.kinds.push("MapField");
    }
    fn visit_oneof_field(&mut self, _: &OneOfField) {
        self.kinds.push("OneOfField");
    }
    fn visit_oneof(&mut self, _: &Oneof) {
        self.kinds.push("Oneof");
    }
    fn visit_enum(&mut self, _: &Enum) {
        self.kinds.push("Enum");
    }
    fn visit_enum_field(&mut self, field: &EnumField) {
        self.kinds.push("EnumField");
        for option in &field.value_options {
            option.accept(self);
        }
    }
    fn visit_service(&mut self, _: &Service) {
        self.kinds.push("Service");
    }
    fn visit_rpc(&mut self, _: &Rpc) {
        self.kinds.push("Rpc");
    }
    fn visit_reserved(&mut self, _: &Reserved) {
        self.kinds.push("Reserved");
    }
    fn visit_group(&mut self, _: &Group) {
        self.kinds.push("Group");
    }
    fn visit_extensions(&mut self, _: &Extensions) {
        self.kinds.push("Extensions");
    }
    fn visit_comment(&mut self, _: &Comment) {
        self.kinds.push("Comment");
    }
}

fn recorded(source: &str) -> Vec<&'static str> {
    let proto = parse(source).expect("valid proto");
    let mut recorder = KindRecorder::default();
    walk(&proto.elements, &mut recorder);
    recorder.kinds
}

#[rstest]
#[case::syntax(r#"syntax = "proto3";"#, &["Syntax"])]
#[case::package("package a.b;", &["Package"])]
#[case::import(r#"import "x.proto";"#, &["Import"])]
#[case::option("option cc_enable_arenas = true;", &["Option"])]
#[case::message("message M {}", &["Message"])]
#[case::normal_field("message M { int32 a = 1; }", &["Message", "NormalField"])]
#[case::map_field("message M { map<int32, string> m = 1; }", &["Message", "MapField"])]
#[case::oneof("message M { oneof o { int32 a = 1; } }", &["Message", "Oneof", "OneOfField"])]
#[case::enumeration("enum E { A = 0; }", &["Enum", "EnumField"])]
#[case::service("service S { rpc R (A) returns (B); }", &["Service", "Rpc"])]
#[case::reserved("message M { reserved 1; }", &["Message", "Reserved"])]
#[case::group("message M { optional group G = 1 {} }", &["Message", "Group"])]
#[case::extensions("message M { extensions 10 to 20; }", &["Message", "Extensions"])]
#[case::comment("// lone", &["Comment"])]
#[case::extend("extend M { int32 x = 5; }", &["Message", "NormalField"])]
fn test_dispatch_matches_variant(#[case] source: &str, #[case] expected: &[&str]) {
    assert_eq!(recorded(source), expected);
}

#[rstest]
#[case::enum_value_option("enum E { A = 1 [deprecated = true]; }", &["Enum", "EnumField", "Option"])]
#[case::field_options(
    "message M { int32 a = 1 [packed = true, json_name = \"x\"]; }",
    &["Message", "NormalField", "Option", "Option"]
)]
#[case::rpc_body(
    "service S { rpc R (A) returns (B) { option deadline = 5; } }",
    &["Service", "Rpc", "Option"]
)]
fn test_embedded_options_dispatch_to_option(#[case] source: &str, #[case] expected: &[&str]) {
    assert_eq!(recorded(source), expected);
}

#[test]
fn test_accept_on_element_matches_kind_name() {
    let source = r#"
        syntax = "proto2";
        // doc
        package p;
        import "i.proto";
        option o = 1;
        message M {
          int32 a = 1;
          map<string, int32> m = 2;
          oneof u { int32 b = 3; }
          reserved 4;
          extensions 100 to 200;
          optional group G = 5 {}
        }
        enum E { X = 0; }
        service S { rpc R (M) returns (M); }
        // trailing
    "#;
    let proto = parse(source).unwrap();
    let mut expected = Vec::new();
    collect_kind_names(&proto.elements, &mut expected);

    let mut recorder = KindRecorder::default();
    walk(&proto.elements, &mut recorder);
    assert_eq!(recorder.kinds, expected);
    assert!(expected.len() >= 17);
}

fn collect_kind_names(elements: &[Element], out: &mut Vec<&'static str>) {
    for element in elements {
        out.push(element.kind_name());
        if let Some(container) = element.as_container() {
            collect_kind_names(container.elements(), out);
        }
    }
}

#[test]
fn test_concurrent_read_only_traversals() {
    let proto = std::sync::Arc::new(parse("message M { int32 a = 1; } enum E { A = 0; }").unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let proto = std::sync::Arc::clone(&proto);
            std::thread::spawn(move || {
                let mut recorder = KindRecorder::default();
                walk(&proto.elements, &mut recorder);
                recorder.kinds
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(
            handle.join().unwrap(),
            vec!["Message", "NormalField", "Enum", "EnumField"]
        );
    }
}
