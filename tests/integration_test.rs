use openapi_from_annotations::{
    annotation::AnnotationParser,
    cli::process_routes,
    config::DocConfig,
    openapi_builder::{OpenApiBuilder, OpenApiDocument},
    parser::AstParser,
    resolver::SourceResolver,
    response::NullResponseResolver,
    scanner::SourceScanner,
    serializer::{serialize, OutputFormat},
};
use serde_json::json;
use tempfile::TempDir;

const DEMO_CONFIG: &str = r#"
title = "Demo API"
version = "1.0"
description = "Demo endpoints."
base-url = "https://api.example.com"

[[servers]]
url = "https://api.example.com"
description = "Production"

[[routes]]
uri = "users/{id}"
methods = ["GET"]
handler = "UserController::show"

[[routes]]
uri = "users"
methods = ["POST"]
handler = "UserController::store"

[routes.apply.headers]
Authorization = "Bearer {token}"
Api-Version = "v2"

[[routes]]
uri = "internal/verify"
methods = ["GET"]
handler = "UserController::verify"
"#;

/// Helper that materializes the demo project and runs the whole pipeline.
fn generate() -> (DocConfig, OpenApiDocument) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let src_dir = temp_dir.path().join("src");
    std::fs::create_dir_all(&src_dir).expect("Failed to create src directory");
    std::fs::write(src_dir.join("demo_api.rs"), include_str!("fixtures/demo_api.rs"))
        .expect("Failed to write fixture");

    let config_path = temp_dir.path().join("idoc.toml");
    std::fs::write(&config_path, DEMO_CONFIG).expect("Failed to write config");
    let config = DocConfig::load(&config_path).expect("Failed to load config");

    let scanner = SourceScanner::new(temp_dir.path().to_path_buf());
    let files = scanner.scan().expect("Failed to scan directory");
    assert!(!files.is_empty(), "Should find Rust files");

    let resolver = SourceResolver::new(AstParser::parse_files(&files));
    let parser = AnnotationParser::new(&resolver);
    let routes =
        process_routes(&parser, &config, &NullResponseResolver).expect("Failed to process routes");

    let document = OpenApiBuilder::new(&config).build(&routes);
    (config, document)
}

#[test]
fn test_hidden_route_is_absent() {
    let (_, document) = generate();
    assert_eq!(document.paths.len(), 2);
    assert!(!document.paths.contains_key("/internal/verify"));
}

#[test]
fn test_get_route_has_exactly_two_parameters() {
    let (_, document) = generate();
    let operation = document.paths["/users/{id}"]
        .get
        .as_ref()
        .expect("GET operation missing");

    assert_eq!(operation.parameters.len(), 2);

    let id = &operation.parameters[0];
    assert_eq!(id.location, "path");
    assert_eq!(id.name, "id");
    assert!(id.required);
    assert_eq!(id.schema.ty, "integer");
    assert_eq!(id.schema.example, Some(json!(7)));

    let include = &operation.parameters[1];
    assert_eq!(include.location, "query");
    assert_eq!(include.name, "include");
    assert!(!include.required);
    assert_eq!(include.schema.example, Some(json!("profile")));
}

#[test]
fn test_unauthenticated_route_has_no_security() {
    let (_, document) = generate();
    let operation = document.paths["/users/{id}"].get.as_ref().unwrap();
    assert!(operation.security.is_none());
}

#[test]
fn test_group_and_operation_id_come_from_doc_comments() {
    let (_, document) = generate();
    let operation = document.paths["/users/{id}"].get.as_ref().unwrap();
    // the handler has no @group of its own, so the type-level one applies
    assert_eq!(operation.tags, vec!["Users".to_string()]);
    assert_eq!(operation.operation_id, "Retrieve a user.");
    assert_eq!(operation.description, "Returns a single user record by id.");
}

#[test]
fn test_post_route_body_and_security() {
    let (_, document) = generate();
    let operation = document.paths["/users"]
        .post
        .as_ref()
        .expect("POST operation missing");

    let security = operation.security.as_ref().expect("security missing");
    assert!(security[0].contains_key("BearerAuth"));

    let body = operation.request_body.as_ref().expect("requestBody missing");
    let schema = &body.content["application/json"].schema;
    assert_eq!(schema["type"], json!("object"));
    assert_eq!(schema["required"], json!(["email"]));
    assert_eq!(
        schema["properties"]["email"]["example"],
        json!("user@example.com")
    );
    assert_eq!(schema["properties"]["nickname"]["example"], json!("al"));
    assert_eq!(schema["example"]["email"], json!("user@example.com"));
}

#[test]
fn test_authorization_header_stays_out_of_parameters() {
    let (_, document) = generate();
    let operation = document.paths["/users"].post.as_ref().unwrap();
    assert!(operation
        .parameters
        .iter()
        .all(|p| p.name != "Authorization"));
    // the other configured header survives as a header parameter
    let version = operation
        .parameters
        .iter()
        .find(|p| p.name == "Api-Version")
        .expect("Api-Version parameter missing");
    assert_eq!(version.location, "header");
    assert_eq!(version.schema.default, Some(json!("v2")));
}

#[test]
fn test_response_resource_lands_in_components() {
    let (_, document) = generate();
    let schema = &document.components.schemas["User"];
    assert_eq!(schema["type"], json!("object"));
    assert_eq!(schema["description"], json!("A user record."));
    assert_eq!(schema["properties"]["id"]["type"], json!("integer"));
    assert_eq!(schema["properties"]["email"]["example"], json!("user@example.com"));
    assert_eq!(schema["properties"]["roles"]["type"], json!("array"));
    assert_eq!(
        schema["properties"]["roles"]["items"]["properties"]["name"]["example"],
        json!("admin")
    );
    // nesting closed before `active`, so it sits at the top level
    assert_eq!(schema["properties"]["active"]["type"], json!("boolean"));
    assert_eq!(schema["properties"]["active"]["example"], json!(false));
    assert_eq!(schema["example"]["active"], json!(false));
    assert_eq!(schema["example"]["roles"], json!([{"name": "admin"}]));
}

#[test]
fn test_document_metadata() {
    let (config, document) = generate();
    assert_eq!(document.openapi, "3.0.0");
    assert_eq!(document.info.title, config.title);
    assert_eq!(document.servers.len(), 1);
    assert_eq!(document.servers[0].url, "https://api.example.com");
    assert!(document.components.security_schemes.contains_key("BearerAuth"));
}

#[test]
fn test_code_samples_attached() {
    let (_, document) = generate();
    let operation = document.paths["/users"].post.as_ref().unwrap();
    assert_eq!(operation.code_samples.len(), 2);
    assert!(operation.code_samples[0].source.starts_with("curl -X POST"));
    assert!(operation.code_samples[1].source.contains("fetch(url"));
}

#[test]
fn test_serialization_is_byte_identical() {
    let (_, document) = generate();
    let first = serialize(&document, OutputFormat::Json).expect("serialize failed");
    let second = serialize(&document, OutputFormat::Json).expect("serialize failed");
    assert_eq!(first, second);

    // a document rebuilt from the same sources serializes identically too
    let (_, rebuilt) = generate();
    let third = serialize(&rebuilt, OutputFormat::Json).expect("serialize failed");
    assert_eq!(first, third);
}

#[test]
fn test_yaml_output_well_formed() {
    let (_, document) = generate();
    let yaml = serialize(&document, OutputFormat::Yaml).expect("serialize failed");
    assert!(yaml.contains("openapi: 3.0.0"));
    assert!(yaml.contains("/users/{id}"));
}
