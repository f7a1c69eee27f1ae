// Integration tests for parsing complete .proto files

use protoidl::*;

const SEARCH_PROTO: &str = r#"
syntax = "proto3";

package search.v1;

import "google/protobuf/timestamp.proto";
import public "common.proto";

option go_package = "example.com/search/v1;searchv1";
option (validate.rules) = { message: { required: true } };

message SearchRequest {
  string query = 1;
  int32 page_number = 2;
  int32 results_per_page = 3 [deprecated = true];
  map<string, Filter> filters = 4;
  oneof cursor {
    string token = 5;
    int64 offset = 6;
  }
  reserved 8, 10 to 12;
  reserved "legacy";

  message Filter {
    repeated string values = 1;
  }

  enum Corpus {
    CORPUS_UNSPECIFIED = 0;
    CORPUS_WEB = 1;
  }
}

enum Order {
  option allow_alias = true;
  ASC = 0;
  DESC = 1 [(label) = "descending"];
}

service SearchService {
  option (api.version) = "v1";
  rpc Search (SearchRequest) returns (SearchResponse);
  rpc Stream (stream SearchRequest) returns (stream SearchResponse) {
    option idempotency_level = NO_SIDE_EFFECTS;
  }
}
"#;

fn kinds(elements: &[Element]) -> Vec<&'static str> {
    elements.iter().map(Element::kind_name).collect()
}

#[test]
fn test_top_level_structure() {
    let proto = parse(SEARCH_PROTO).expect("valid proto");
    assert_eq!(
        kinds(&proto.elements),
        vec![
            "Syntax", "Package", "Import", "Import", "Option", "Option", "Message", "Enum",
            "Service"
        ]
    );
}

#[test]
fn test_message_body_order() {
    let proto = parse(SEARCH_PROTO).unwrap();
    let Element::Message(request) = &proto.elements[6] else {
        panic!("Expected message");
    };
    assert_eq!(request.name, "SearchRequest");
    assert_eq!(
        kinds(&request.elements),
        vec![
            "NormalField",
            "NormalField",
            "NormalField",
            "MapField",
            "Oneof",
            "Reserved",
            "Reserved",
            "Message",
            "Enum"
        ]
    );
    let Element::Oneof(cursor) = &request.elements[4] else {
        panic!("Expected oneof");
    };
    assert_eq!(kinds(&cursor.elements), vec!["OneOfField", "OneOfField"]);
}

#[test]
fn test_aggregate_option_round_trips() {
    let proto = parse(SEARCH_PROTO).unwrap();
    let Element::Option(rules) = &proto.elements[5] else {
        panic!("Expected option");
    };
    assert_eq!(rules.name, "(validate.rules)");
    assert_eq!(rules.constant.to_string(), "{ message: { required: true } }");
}

#[test]
fn test_service_rpcs() {
    let proto = parse(SEARCH_PROTO).unwrap();
    let Element::Service(service) = &proto.elements[8] else {
        panic!("Expected service");
    };
    assert_eq!(kinds(&service.elements), vec!["Option", "Rpc", "Rpc"]);
    let Element::Rpc(stream) = &service.elements[2] else {
        panic!("Expected rpc");
    };
    assert!(stream.streams_request);
    assert!(stream.streams_returns);
    let options: Vec<&ProtoOption> = stream.options().collect();
    assert_eq!(options.len(), 1);
    assert_eq!(
        options[0].constant,
        Literal::Scalar("NO_SIDE_EFFECTS".to_string())
    );
}

#[test]
fn test_embedded_option_then_statement_end() {
    let proto = parse("enum E { BAR = 2 [deprecated = true]; BAZ = 3; }").unwrap();
    let Element::Enum(e) = &proto.elements[0] else {
        panic!("Expected enum");
    };
    assert_eq!(e.elements.len(), 2);
    let Element::EnumField(bar) = &e.elements[0] else {
        panic!("Expected enum field");
    };
    let option = bar.value_option().expect("value option");
    assert_eq!(option.name, "deprecated");
    assert_eq!(option.constant, Literal::Scalar("true".to_string()));
    assert!(matches!(&e.elements[1], Element::EnumField(baz) if baz.integer == 3));
}

#[test]
fn test_proto2_constructs() {
    let source = r#"
        syntax = "proto2";
        message Legacy {
          required string id = 1 [default = "none"];
          optional group Meta = 2 {
            optional int32 version = 3;
          }
          extensions 100 to max;
        }
        extend Legacy {
          optional string note = 100;
        }
    "#;
    let proto = parse(source).unwrap();
    let Element::Message(legacy) = &proto.elements[1] else {
        panic!("Expected message");
    };
    assert_eq!(kinds(&legacy.elements), vec!["NormalField", "Group", "Extensions"]);
    let Element::NormalField(id) = &legacy.elements[0] else {
        panic!("Expected field");
    };
    assert_eq!(id.label, Some(FieldLabel::Required));
    assert!(id.field.options[0].constant.is_string());

    let Element::Message(extend) = &proto.elements[2] else {
        panic!("Expected extend");
    };
    assert!(extend.is_extend);
    assert_eq!(extend.name, "Legacy");
}

#[test]
fn test_field_numbers_are_not_validated() {
    let proto = parse("message M { int32 a = 1; int32 b = 1; int32 c = -5; reserved 9 to 2; }");
    assert!(proto.is_ok());
}

#[test]
fn test_columns_line_up_enum_values() {
    let proto = parse("enum E { A = 1; LONGER = 100; }").unwrap();
    let Element::Enum(e) = &proto.elements[0] else {
        panic!("Expected enum");
    };
    let rows: Vec<Vec<Column>> = e.elements.iter().map(Columns::columns).collect();
    assert_eq!(rows[0].len(), rows[1].len());
    assert_eq!(rows[1][2], Column::right("100"));
    assert_eq!(to_source(&rows[1]), "LONGER = 100;");
}

#[test]
fn test_parse_with_config() {
    let shallow = ParserConfig::default().with_max_depth(1);
    assert!(parse_with_config("message A {}", &shallow).is_ok());
    assert!(parse_with_config("message A { message B {} }", &shallow).is_err());
}

#[test]
fn test_parser_value() {
    let mut parser = Parser::new("package a;", ParserConfig::default());
    let proto = parser.parse_proto().unwrap();
    assert!(matches!(&proto.elements[0], Element::Package(p) if p.name == "a"));
}
