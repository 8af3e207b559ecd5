//! Annotation parsing: turns a handler's structured doc comment into a fully
//! populated [`RouteDescriptor`].
//!
//! The parameter tag grammar is `<name> <type> [required] [description
//! [Example: <value>]]`. The grammar is stringly-typed by design; its exact
//! semantics (the optional `required` token position, the trailing `Example:`
//! extraction, the bare `name type` fallback) are pinned down by the unit
//! tests at the bottom of this file.

use crate::docblock::DocBlock;
use crate::error::{Error, Result};
use crate::resolver::HandlerResolver;
use crate::response::ResponseResolver;
use crate::routes::RouteRecord;
use crate::schema_parser::{SchemaDescriptor, SchemaParser};
use indexmap::IndexMap;
use log::{debug, warn};
use once_cell::sync::Lazy;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use serde_json::Value;

static PARAM_GRAMMAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+(.+?)\s+(required\s+)?(.*)$").unwrap());
static EXAMPLE_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)Example:\s*(.*?)\s*$").unwrap());
static RESPONSE_RESOURCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)?\s*(.*)$").unwrap());

/// Tag that hides a handler from the generated documentation.
const HIDE_TAG: &str = "hideFromAPIDocumentation";

/// One documented parameter of a route.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Normalized parameter type
    pub ty: String,
    /// Human description, with the `Example:` fragment removed
    pub description: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Example value: author-supplied, or a synthesized placeholder
    pub value: Value,
}

/// The fully parsed, in-memory representation of one documented route.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    /// Deterministic identity (digest of URI and method set)
    pub id: String,
    /// Logical group label
    pub group: String,
    /// Short description, used as the operation id
    pub title: String,
    /// Long description
    pub description: String,
    /// Ordered HTTP methods, HEAD excluded
    pub methods: Vec<String>,
    /// URI template, without a leading slash
    pub uri: String,
    /// Documented body parameters, in declaration order
    pub body_parameters: IndexMap<String, ParameterDescriptor>,
    /// Documented query parameters
    pub query_parameters: IndexMap<String, ParameterDescriptor>,
    /// Documented path parameters
    pub path_parameters: IndexMap<String, ParameterDescriptor>,
    /// Whether the route requires authentication
    pub authenticated: bool,
    /// Captured example response body, if a probe produced one
    pub response: Option<String>,
    /// Declared response resources
    pub schemas: Vec<SchemaDescriptor>,
    /// Effective headers for documented requests. `Authorization` is stripped
    /// when the route is not authenticated.
    pub headers: IndexMap<String, String>,
}

/// Result of the raw `<name> <type> [required] [description]` grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedParamTag {
    pub name: String,
    pub ty: String,
    pub required: bool,
    pub description: String,
}

/// Applies the parameter tag grammar to a tag's content.
///
/// A content that does not match the full grammar but splits into exactly two
/// whitespace-separated tokens is a bare `name type` declaration. Anything
/// else is malformed and returns `None`.
pub fn parse_param_grammar(content: &str) -> Option<ParsedParamTag> {
    if let Some(captures) = PARAM_GRAMMAR.captures(content) {
        let name = captures[1].to_string();
        let ty = captures[2].to_string();
        let mut required = captures.get(3).is_some();
        let mut description = captures[4].trim().to_string();

        // `name type required` with nothing after it: the trailing token
        // lands in the description slot.
        if description == "required" && !required {
            required = true;
            description = String::new();
        }

        return Some(ParsedParamTag {
            name,
            ty,
            required,
            description,
        });
    }

    let tokens: Vec<&str> = content.split_whitespace().collect();
    if tokens.len() == 2 {
        return Some(ParsedParamTag {
            name: tokens[0].to_string(),
            ty: tokens[1].to_string(),
            required: false,
            description: String::new(),
        });
    }

    None
}

/// Normalizes a raw type string to one of the eight supported types.
///
/// Total and idempotent: every input maps to exactly one normalized type, and
/// anything unrecognized (including the empty string) becomes `string`.
pub fn normalize_type(raw: &str) -> String {
    match raw.trim() {
        "int" | "integer" => "integer",
        "bool" | "boolean" => "boolean",
        "double" | "float" => "float",
        "number" => "number",
        "array" => "array",
        "object" => "object",
        "json" => "json",
        _ => "string",
    }
    .to_string()
}

/// Casts a raw example string to the given normalized type.
///
/// The literal string `"false"` (and `"0"` and the empty string) cast to
/// boolean `false`; any other non-empty string is truthy. Unparseable numeric
/// examples fall back to zero, and non-numeric types stay strings.
pub fn cast_to_type(value: &str, ty: &str) -> Value {
    match ty {
        "integer" => Value::from(value.parse::<i64>().unwrap_or(0)),
        "number" | "float" => Value::from(value.parse::<f64>().unwrap_or(0.0)),
        "boolean" => Value::Bool(!matches!(value, "false" | "0" | "")),
        _ => Value::from(value),
    }
}

/// Splits an `Example: <value>` fragment off the end of a description and
/// casts it to the parameter type.
pub fn parse_description(description: &str, ty: &str) -> (String, Option<Value>) {
    if let Some(captures) = EXAMPLE_TAIL.captures(description) {
        let rest = captures[1].trim().to_string();
        let example = cast_to_type(captures[2].trim(), ty);
        return (rest, Some(example));
    }
    (description.to_string(), None)
}

/// Synthesizes a type-appropriate placeholder value.
pub fn generate_dummy_value(ty: &str) -> Value {
    let mut rng = rand::thread_rng();
    match ty {
        "integer" => Value::from(rng.gen_range(1..=20)),
        "number" | "float" => {
            let raw: f64 = rng.gen_range(1.0..100.0);
            Value::from((raw * 100.0).round() / 100.0)
        }
        "boolean" => Value::Bool(rng.gen_bool(0.5)),
        "array" => Value::from("[]"),
        "object" | "json" => Value::from("{}"),
        _ => {
            let masked: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(12)
                .map(char::from)
                .collect();
            Value::from(masked)
        }
    }
}

/// Parses the structured doc comments of route handlers into route
/// descriptors.
pub struct AnnotationParser<'a> {
    resolver: &'a dyn HandlerResolver,
    schema_parser: SchemaParser,
}

impl<'a> AnnotationParser<'a> {
    pub fn new(resolver: &'a dyn HandlerResolver) -> Self {
        Self {
            resolver,
            schema_parser: SchemaParser::new(),
        }
    }

    /// Processes one route record.
    ///
    /// Returns `Ok(None)` for skippable routes (uninspectable handler, or an
    /// explicit hide marker); authoring errors abort with `Err`.
    pub fn process_route(
        &self,
        record: &RouteRecord,
        responder: &dyn ResponseResolver,
    ) -> Result<Option<RouteDescriptor>> {
        let resolved = match self.resolver.resolve_handler(&record.handler) {
            Some(resolved) => resolved,
            None => {
                warn!(
                    "Skipping route {}: handler `{}` cannot be inspected",
                    record.uri, record.handler
                );
                return Ok(None);
            }
        };

        let block = resolved
            .method_doc
            .as_deref()
            .map(DocBlock::parse)
            .unwrap_or_default();

        if block.tags.iter().any(|t| t.name == HIDE_TAG) {
            warn!(
                "Skipping route {}: handler `{}` is hidden from documentation",
                record.uri, record.handler
            );
            return Ok(None);
        }

        let type_block = resolved
            .type_doc
            .as_deref()
            .map(DocBlock::parse)
            .unwrap_or_default();

        // The handler's own @group wins over the declaring type's.
        let group = block
            .tags_named("group")
            .next()
            .or_else(|| type_block.tags_named("group").next())
            .map(|t| t.content.clone())
            .unwrap_or_else(|| "general".to_string());

        let path_parameters = self.parse_parameters(&block, "pathParam", &record.handler)?;
        let query_parameters = self.parse_parameters(&block, "queryParam", &record.handler)?;
        let body_parameters = self.parse_parameters(&block, "bodyParam", &record.handler)?;

        let authenticated = block.tag("authenticated").is_some();

        let schemas = self.parse_response_resources(&block, &record.handler)?;

        let mut headers = record.apply.headers.clone();
        if !authenticated {
            // Authenticated-only headers must not leak onto routes not
            // documented as authenticated.
            headers.shift_remove("Authorization");
        }

        let methods = record.documented_methods();

        let response = if schemas.is_empty() && record.apply.response_calls.allows(&methods) {
            match responder.resolve(record) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Response probe failed for {}: {}", record.uri, e);
                    None
                }
            }
        } else {
            None
        };

        debug!("Parsed route {} ({})", record.uri, group);

        Ok(Some(RouteDescriptor {
            id: record.id(),
            group,
            title: block.short.clone(),
            description: block.long.clone(),
            methods,
            uri: record.uri.clone(),
            body_parameters,
            query_parameters,
            path_parameters,
            authenticated,
            response,
            schemas,
            headers,
        }))
    }

    fn parse_parameters(
        &self,
        block: &DocBlock,
        kind: &str,
        handler: &str,
    ) -> Result<IndexMap<String, ParameterDescriptor>> {
        let mut parameters = IndexMap::new();

        for tag in block.tags_named(kind) {
            let parsed = parse_param_grammar(&tag.content).ok_or_else(|| Error::MalformedTag {
                handler: handler.to_string(),
                tag: kind.to_string(),
                content: tag.content.clone(),
            })?;

            let ty = normalize_type(&parsed.ty);
            let (description, example) = parse_description(&parsed.description, &ty);
            let value = example.unwrap_or_else(|| generate_dummy_value(&ty));

            parameters.insert(
                parsed.name,
                ParameterDescriptor {
                    ty,
                    description,
                    required: parsed.required,
                    value,
                },
            );
        }

        Ok(parameters)
    }

    fn parse_response_resources(
        &self,
        block: &DocBlock,
        handler: &str,
    ) -> Result<Vec<SchemaDescriptor>> {
        let mut schemas = Vec::new();

        for tag in block.tags_named("responseResource") {
            let (declared_status, resource) = match RESPONSE_RESOURCE.captures(&tag.content) {
                Some(captures) => (
                    captures.get(1).map(|m| m.as_str().to_string()),
                    captures[2].trim().to_string(),
                ),
                None => (None, tag.content.trim().to_string()),
            };

            let excerpt = self.resolver.resolve_resource(&resource).ok_or_else(|| {
                Error::UnresolvedResource {
                    handler: handler.to_string(),
                    resource: resource.clone(),
                }
            })?;

            schemas.push(
                self.schema_parser
                    .parse_resource(&excerpt, declared_status.as_deref())?,
            );
        }

        Ok(schemas)
    }
}
