//! OpenAPI 3.0 document assembly.
//!
//! Folds the parsed route collection, grouped by group label, into one
//! document: paths (multiple methods on one URI merge into a single path
//! item), per-operation parameters, request bodies, responses, security and
//! code samples, plus `components.schemas` built from declared response
//! resources. Every map is insertion-ordered so that assembling the same
//! route collection twice yields byte-identical JSON.

use crate::annotation::{ParameterDescriptor, RouteDescriptor};
use crate::config::DocConfig;
use crate::samples::render_sample;
use crate::schema_parser::{SchemaDescriptor, SchemaField};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Complete OpenAPI document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// Security schemes and response-resource schemas
    pub components: Components,
    /// Advertised servers
    pub servers: Vec<ServerObject>,
    /// Paths, in discovery order
    pub paths: IndexMap<String, PathItem>,
}

/// OpenAPI Info object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: String,
    #[serde(rename = "x-logo", skip_serializing_if = "Option::is_none")]
    pub x_logo: Option<Logo>,
}

/// `x-logo` info extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logo {
    pub url: String,
    #[serde(rename = "altText")]
    pub alt_text: String,
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
}

/// OpenAPI Components object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Components {
    #[serde(rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
    pub schemas: IndexMap<String, Value>,
}

/// OpenAPI SecurityScheme object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    pub scheme: String,
    #[serde(rename = "bearerFormat")]
    pub bearer_format: String,
}

/// One entry of the `servers` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerObject {
    pub url: String,
    pub description: String,
}

/// OpenAPI PathItem object: all operations registered on one URI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
}

/// OpenAPI Operation object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<IndexMap<String, Vec<Value>>>>,
    pub tags: Vec<String>,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    pub description: String,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub parameters: Vec<ParameterObject>,
    pub responses: IndexMap<String, ResponseObject>,
    #[serde(rename = "x-code-samples", skip_serializing_if = "Vec::is_empty", default)]
    pub code_samples: Vec<CodeSample>,
}

/// OpenAPI RequestBody object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    pub description: String,
    pub required: bool,
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Value,
}

/// OpenAPI Parameter object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterObject {
    #[serde(rename = "in")]
    pub location: String,
    pub name: String,
    pub description: String,
    pub required: bool,
    pub schema: ParameterSchema,
}

/// Schema of a single parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// OpenAPI Response object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseObject {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// One `x-code-samples` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSample {
    pub lang: String,
    pub source: String,
}

/// Maps a normalized parameter/field type to a valid OpenAPI schema type.
fn openapi_type(ty: &str) -> &str {
    match ty {
        "float" => "number",
        "json" => "object",
        other => other,
    }
}

/// Assembles the final OpenAPI document from parsed routes.
pub struct OpenApiBuilder<'a> {
    config: &'a DocConfig,
}

impl<'a> OpenApiBuilder<'a> {
    pub fn new(config: &'a DocConfig) -> Self {
        Self { config }
    }

    /// Builds the whole document in one pass over the route collection.
    pub fn build(&self, routes: &[RouteDescriptor]) -> OpenApiDocument {
        debug!("Assembling OpenAPI document from {} routes", routes.len());

        // Group by label, preserving discovery order both of groups and of
        // routes within a group.
        let mut groups: IndexMap<String, Vec<&RouteDescriptor>> = IndexMap::new();
        for route in routes {
            groups.entry(route.group.clone()).or_default().push(route);
        }

        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        for (group, group_routes) in &groups {
            for route in group_routes {
                let path = Self::convert_path(&route.uri);
                let operation = self.build_operation(route, group);
                let item = paths.entry(path.clone()).or_default();
                for method in &route.methods {
                    Self::set_operation(item, method, operation.clone(), &path);
                }
            }
        }

        let mut schemas: IndexMap<String, Value> = IndexMap::new();
        for (group, group_routes) in &groups {
            if !self.config.emits_schemas_for(group) {
                continue;
            }
            for route in group_routes {
                for descriptor in &route.schemas {
                    schemas.insert(descriptor.name.clone(), Self::resource_schema(descriptor));
                }
            }
        }

        let mut security_schemes = IndexMap::new();
        security_schemes.insert(
            "BearerAuth".to_string(),
            SecurityScheme {
                scheme_type: "http".to_string(),
                scheme: "bearer".to_string(),
                bearer_format: "JWT".to_string(),
            },
        );

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: Info {
                title: self.config.title.clone(),
                version: self.config.version.clone(),
                description: self.config.description.clone(),
                x_logo: self.config.logo.as_ref().map(|url| Logo {
                    url: url.clone(),
                    alt_text: self.config.title.clone(),
                    background_color: self.config.color.clone(),
                }),
            },
            components: Components {
                security_schemes,
                schemas,
            },
            servers: self
                .config
                .servers
                .iter()
                .map(|s| ServerObject {
                    url: s.url.clone(),
                    description: s.description.clone(),
                })
                .collect(),
            paths,
        }
    }

    fn build_operation(&self, route: &RouteDescriptor, group: &str) -> Operation {
        let security = route.authenticated.then(|| {
            let mut requirement = IndexMap::new();
            requirement.insert("BearerAuth".to_string(), Vec::new());
            vec![requirement]
        });

        let wants_body = route
            .methods
            .iter()
            .any(|m| matches!(m.as_str(), "POST" | "PUT" | "PATCH"));
        let request_body = wants_body.then(|| RequestBody {
            description: route.description.clone(),
            required: true,
            content: {
                let mut content = IndexMap::new();
                content.insert(
                    "application/json".to_string(),
                    MediaType {
                        schema: Self::body_schema(&route.body_parameters),
                    },
                );
                content
            },
        });

        let code_samples = self
            .config
            .language_tabs
            .iter()
            .filter_map(|(lang, label)| {
                render_sample(lang, route, &self.config.base_url).map(|source| CodeSample {
                    lang: label.clone(),
                    source,
                })
            })
            .collect();

        Operation {
            security,
            tags: vec![group.to_string()],
            operation_id: route.title.clone(),
            description: route.description.clone(),
            request_body,
            parameters: Self::build_parameters(route),
            responses: Self::build_responses(route),
            code_samples,
        }
    }

    /// Path and query parameters first, header parameters appended.
    /// `Authorization` never appears as a header parameter.
    fn build_parameters(route: &RouteDescriptor) -> Vec<ParameterObject> {
        let mut parameters = Vec::new();

        let scalar = |location: &str, name: &String, p: &ParameterDescriptor| ParameterObject {
            location: location.to_string(),
            name: name.clone(),
            description: p.description.clone(),
            required: p.required,
            schema: ParameterSchema {
                ty: openapi_type(&p.ty).to_string(),
                default: None,
                example: Some(p.value.clone()),
            },
        };

        for (name, p) in &route.path_parameters {
            parameters.push(scalar("path", name, p));
        }
        for (name, p) in &route.query_parameters {
            parameters.push(scalar("query", name, p));
        }
        for (header, value) in &route.headers {
            if header == "Authorization" {
                continue;
            }
            parameters.push(ParameterObject {
                location: "header".to_string(),
                name: header.clone(),
                description: String::new(),
                required: true,
                schema: ParameterSchema {
                    ty: "string".to_string(),
                    default: Some(Value::from(value.clone())),
                    example: Some(Value::from(value.clone())),
                },
            });
        }

        parameters
    }

    /// A single `200` response; content is attached only when a captured
    /// example exists, as a loose example-driven schema.
    fn build_responses(route: &RouteDescriptor) -> IndexMap<String, ResponseObject> {
        let content = route.response.as_deref().and_then(|raw| {
            match serde_json::from_str::<Value>(raw) {
                Ok(example) => {
                    let mut schema = serde_json::Map::new();
                    schema.insert("type".to_string(), Value::from("object"));
                    schema.insert("example".to_string(), example);
                    let mut content = IndexMap::new();
                    content.insert(
                        "application/json".to_string(),
                        MediaType {
                            schema: Value::Object(schema),
                        },
                    );
                    Some(content)
                }
                Err(e) => {
                    warn!(
                        "Discarding non-JSON captured response for {}: {}",
                        route.uri, e
                    );
                    None
                }
            }
        });

        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            ResponseObject {
                description: "success".to_string(),
                content,
            },
        );
        responses
    }

    /// Renders the body-parameter map as an `application/json` object schema
    /// with `required`, `properties` and a parallel flat `example`.
    fn body_schema(body: &IndexMap<String, ParameterDescriptor>) -> Value {
        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), Value::from("object"));

        let required: Vec<Value> = body
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(name, _)| Value::from(name.clone()))
            .collect();
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }

        if !body.is_empty() {
            let mut properties = serde_json::Map::new();
            let mut example = serde_json::Map::new();
            for (name, p) in body {
                let value = Self::body_value(p);
                let mut property = serde_json::Map::new();
                property.insert("type".to_string(), Value::from(openapi_type(&p.ty)));
                property.insert("example".to_string(), value.clone());
                property.insert("description".to_string(), Value::from(p.description.clone()));
                properties.insert(name.clone(), Value::Object(property));
                example.insert(name.clone(), value);
            }
            schema.insert("properties".to_string(), Value::Object(properties));
            schema.insert("example".to_string(), Value::Object(example));
        }

        Value::Object(schema)
    }

    /// Example value of a body parameter; `json` examples given as strings
    /// are decoded so they render as structured JSON.
    fn body_value(p: &ParameterDescriptor) -> Value {
        if p.ty == "json" {
            if let Value::String(raw) = &p.value {
                if let Ok(decoded) = serde_json::from_str::<Value>(raw) {
                    return decoded;
                }
            }
        }
        p.value.clone()
    }

    /// Renders a declared response resource as a `components.schemas` entry.
    fn resource_schema(descriptor: &SchemaDescriptor) -> Value {
        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), Value::from("object"));
        if !descriptor.description.is_empty() {
            schema.insert(
                "description".to_string(),
                Value::from(descriptor.description.clone()),
            );
        }
        Self::insert_object_members(&mut schema, &descriptor.properties);
        schema.insert("example".to_string(), descriptor.example.clone());
        Value::Object(schema)
    }

    /// Inserts `properties` and `required` for one object scope.
    fn insert_object_members(schema: &mut serde_json::Map<String, Value>, fields: &IndexMap<String, SchemaField>) {
        if fields.is_empty() {
            return;
        }
        let mut properties = serde_json::Map::new();
        for (name, field) in fields {
            properties.insert(name.clone(), Self::field_schema(field));
        }
        schema.insert("properties".to_string(), Value::Object(properties));

        let required: Vec<Value> = fields
            .iter()
            .filter(|(_, f)| f.required)
            .map(|(name, _)| Value::from(name.clone()))
            .collect();
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
    }

    fn field_schema(field: &SchemaField) -> Value {
        let mut schema = serde_json::Map::new();

        match field.ty.as_str() {
            "array" => {
                schema.insert("type".to_string(), Value::from("array"));
                if !field.description.is_empty() {
                    schema.insert("description".to_string(), Value::from(field.description.clone()));
                }
                let mut items = serde_json::Map::new();
                items.insert("type".to_string(), Value::from("object"));
                Self::insert_object_members(&mut items, &field.children);
                schema.insert("items".to_string(), Value::Object(items));
            }
            "object" | "json" => {
                schema.insert("type".to_string(), Value::from("object"));
                if !field.description.is_empty() {
                    schema.insert("description".to_string(), Value::from(field.description.clone()));
                }
                Self::insert_object_members(&mut schema, &field.children);
            }
            scalar => {
                schema.insert("type".to_string(), Value::from(openapi_type(scalar)));
                if !field.description.is_empty() {
                    schema.insert("description".to_string(), Value::from(field.description.clone()));
                }
                if let Some(example) = &field.example {
                    schema.insert("example".to_string(), example.clone());
                }
                if let Some(values) = &field.enum_values {
                    schema.insert(
                        "enum".to_string(),
                        Value::Array(values.iter().map(|v| Value::from(v.clone())).collect()),
                    );
                }
            }
        }

        Value::Object(schema)
    }

    /// Prefixes the URI with `/` and converts `:param` segments to the
    /// OpenAPI `{param}` form.
    fn convert_path(uri: &str) -> String {
        let converted: Vec<String> = uri
            .trim_start_matches('/')
            .split('/')
            .map(|segment| {
                if let Some(name) = segment.strip_prefix(':') {
                    format!("{{{}}}", name)
                } else {
                    segment.to_string()
                }
            })
            .collect();
        format!("/{}", converted.join("/"))
    }

    fn set_operation(item: &mut PathItem, method: &str, operation: Operation, path: &str) {
        let slot = match method {
            "GET" => &mut item.get,
            "POST" => &mut item.post,
            "PUT" => &mut item.put,
            "DELETE" => &mut item.delete,
            "PATCH" => &mut item.patch,
            "OPTIONS" => &mut item.options,
            other => {
                warn!("Ignoring unsupported method {} on {}", other, path);
                return;
            }
        };
        if slot.is_some() {
            warn!("Duplicate {} operation on {}; keeping the last one", method, path);
        }
        *slot = Some(operation);
    }
}
