//! Nested response-schema parsing.
//!
//! A response resource documents its shape with `@responseParam` comments
//! inside the body of its representation method. The tag stream is flat: a
//! field of type `array` opens an item scope, `object`/`json` opens a
//! property scope, and a line holding only `]` or `}` (optionally followed by
//! a comma) closes the innermost scope. The parser first reduces the excerpt
//! to a linear event sequence and then folds it into a [`SchemaField`] tree.

use crate::annotation::{cast_to_type, normalize_type, parse_param_grammar};
use crate::docblock::DocBlock;
use crate::error::{Error, Result};
use crate::resolver::ResourceExcerpt;
use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RESPONSE_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\*|//)\s*@responseParam\s+(.*)$").unwrap());
static CLOSE_SCOPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[\]}]\s*,?\s*$").unwrap());
static EXAMPLE_FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"Example:\s*(.*)$").unwrap());
static ENUM_FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"Enum:\s*\[(.*?)\]").unwrap());

/// One field of a declared response shape, possibly nested.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Normalized field type
    pub ty: String,
    /// Field description with `Example:`/`Enum:` fragments removed
    pub description: String,
    /// Whether the field is required
    pub required: bool,
    /// Author-supplied example, cast to the field type
    pub example: Option<Value>,
    /// Ordered enumeration of allowed literal values, if declared
    pub enum_values: Option<Vec<String>>,
    /// Item fields for `array`, property fields for `object`/`json`,
    /// empty for scalars
    pub children: IndexMap<String, SchemaField>,
}

impl SchemaField {
    /// Whether this field type opens a nested scope.
    pub fn is_container(&self) -> bool {
        matches!(self.ty.as_str(), "array" | "object" | "json")
    }
}

/// A fully parsed response resource declaration.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    /// Resource name (`@resourceName` override or the type's short name)
    pub name: String,
    /// HTTP status the resource documents
    pub status_code: String,
    /// Resource description (`@resourceDescription`)
    pub description: String,
    /// Top-level fields of the shape
    pub properties: IndexMap<String, SchemaField>,
    /// Example payload synthesized from the field tree
    pub example: Value,
}

/// Linear event stream the excerpt is reduced to before tree assembly.
#[derive(Debug)]
enum SchemaEvent {
    Field(String, SchemaField),
    ScopeClose,
}

/// Parser for `@responseParam` annotated representation-method bodies.
pub struct SchemaParser;

impl SchemaParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a resolved resource excerpt into a [`SchemaDescriptor`].
    ///
    /// `declared_status` is the status code given on the `@responseResource`
    /// tag, if any; the resource's own `@resourceStatus` wins over it, and
    /// `200` is the final fallback.
    pub fn parse_resource(
        &self,
        excerpt: &ResourceExcerpt,
        declared_status: Option<&str>,
    ) -> Result<SchemaDescriptor> {
        debug!(
            "Parsing schema of resource {} (lines {}..{})",
            excerpt.short_name, excerpt.start_line, excerpt.end_line
        );

        let start = excerpt.start_line.saturating_sub(1);
        let end = excerpt.end_line.min(excerpt.lines.len());
        let body = &excerpt.lines[start..end];

        let properties = self.parse_schema(body, &excerpt.short_name)?;

        let type_block = excerpt
            .type_doc
            .as_deref()
            .map(DocBlock::parse)
            .unwrap_or_default();

        let name = type_block
            .tag("resourceName")
            .map(|t| t.content.clone())
            .unwrap_or_else(|| excerpt.short_name.clone());
        let description = type_block
            .tag("resourceDescription")
            .map(|t| t.content.clone())
            .unwrap_or_default();
        let status_code = type_block
            .tag("resourceStatus")
            .map(|t| t.content.clone())
            .or_else(|| declared_status.map(|s| s.to_string()))
            .unwrap_or_else(|| "200".to_string());

        let example = generate_example(&properties);

        Ok(SchemaDescriptor {
            name,
            status_code,
            description,
            properties,
            example,
        })
    }

    /// Walks the excerpt lines and reconstructs the field tree.
    pub fn parse_schema(
        &self,
        lines: &[String],
        resource: &str,
    ) -> Result<IndexMap<String, SchemaField>> {
        let events = self.scan_events(lines, resource)?;

        // The scope walk must balance before the excerpt ends. A close with
        // no open scope is ignored, matching the stack-pop-if-non-empty rule.
        let mut depth: usize = 0;
        for event in &events {
            match event {
                SchemaEvent::Field(_, field) if field.is_container() => depth += 1,
                SchemaEvent::ScopeClose => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        if depth > 0 {
            return Err(Error::UnbalancedSchema {
                resource: resource.to_string(),
                open: depth,
            });
        }

        let mut pos = 0;
        Ok(Self::build_scope(&events, &mut pos, false))
    }

    /// Reduces the excerpt to a `Field`/`ScopeClose` event sequence.
    fn scan_events(&self, lines: &[String], resource: &str) -> Result<Vec<SchemaEvent>> {
        let mut events = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let mut line = lines[i].clone();
            i += 1;

            if RESPONSE_PARAM.is_match(&line) {
                // A block-comment tag may continue over several lines until
                // its terminator; the line-comment form is always single-line.
                let is_block = !line.contains("//");
                if is_block && !line.contains("*/") {
                    let mut accumulated = line.clone();
                    while i < lines.len() && !accumulated.contains("*/") {
                        accumulated.push(' ');
                        accumulated.push_str(lines[i].trim());
                        i += 1;
                    }
                    line = accumulated;
                }

                let content = RESPONSE_PARAM
                    .captures(&line)
                    .map(|c| c[1].to_string())
                    .unwrap_or_default();
                let (name, field) = self.parse_field(&content, resource)?;
                events.push(SchemaEvent::Field(name, field));
            } else if CLOSE_SCOPE.is_match(&line) {
                events.push(SchemaEvent::ScopeClose);
            }
        }

        Ok(events)
    }

    /// Parses one tag's content into a named field.
    fn parse_field(&self, content: &str, resource: &str) -> Result<(String, SchemaField)> {
        let parsed = parse_param_grammar(content).ok_or_else(|| Error::MalformedTag {
            handler: resource.to_string(),
            tag: "responseParam".to_string(),
            content: content.to_string(),
        })?;

        let ty = normalize_type(&parsed.ty);
        let mut description = parsed
            .description
            .trim_matches(|c| matches!(c, ' ' | '*' | '/'))
            .to_string();

        // Example first, then Enum: each fragment is cut out of the
        // description once extracted.
        let mut example = None;
        let example_match = EXAMPLE_FRAGMENT.captures(&description).and_then(|captures| {
            match (captures.get(0), captures.get(1)) {
                (Some(whole), Some(value)) => {
                    Some((whole.range(), value.as_str().trim().to_string()))
                }
                _ => None,
            }
        });
        if let Some((range, raw)) = example_match {
            description.replace_range(range, "");
            description = description.trim().to_string();
            example = Some(cast_to_type(&raw, &ty));
        }

        let mut enum_values = None;
        let enum_match = ENUM_FRAGMENT.captures(&description).and_then(|captures| {
            match (captures.get(0), captures.get(1)) {
                (Some(whole), Some(list)) => {
                    Some((whole.range(), list.as_str().to_string()))
                }
                _ => None,
            }
        });
        if let Some((range, list)) = enum_match {
            let values: Vec<String> = list
                .split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
            description.replace_range(range, "");
            description = description.trim().to_string();
            enum_values = Some(values);
        }

        Ok((
            parsed.name,
            SchemaField {
                ty,
                description,
                required: parsed.required,
                example,
                enum_values,
                children: IndexMap::new(),
            },
        ))
    }

    /// Folds the event stream into a tree. Called recursively per scope; the
    /// event stream is known to be balanced at this point.
    fn build_scope(
        events: &[SchemaEvent],
        pos: &mut usize,
        nested: bool,
    ) -> IndexMap<String, SchemaField> {
        let mut scope = IndexMap::new();

        while *pos < events.len() {
            match &events[*pos] {
                SchemaEvent::Field(name, field) => {
                    *pos += 1;
                    let mut field = field.clone();
                    if field.is_container() {
                        field.children = Self::build_scope(events, pos, true);
                    }
                    scope.insert(name.clone(), field);
                }
                SchemaEvent::ScopeClose => {
                    *pos += 1;
                    if nested {
                        return scope;
                    }
                    // close with no open scope: ignore
                }
            }
        }

        scope
    }
}

impl Default for SchemaParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Synthesizes an example payload from a field tree: arrays become
/// single-element lists of the item shape, objects recurse into their
/// properties, scalars use the declared example or a fixed dummy.
pub fn generate_example(properties: &IndexMap<String, SchemaField>) -> Value {
    let mut map = serde_json::Map::new();
    for (name, field) in properties {
        let value = match field.ty.as_str() {
            "array" => Value::Array(vec![generate_example(&field.children)]),
            "object" | "json" => generate_example(&field.children),
            _ => field
                .example
                .clone()
                .unwrap_or_else(|| fixed_dummy(&field.ty)),
        };
        map.insert(name.clone(), value);
    }
    Value::Object(map)
}

/// Fixed placeholder used when a scalar field declares no example.
pub fn fixed_dummy(ty: &str) -> Value {
    match ty {
        "integer" => Value::from(1),
        "float" | "number" => Value::from(1.0),
        "boolean" => Value::Bool(true),
        "string" => Value::from("example"),
        "array" => Value::Array(Vec::new()),
        "object" | "json" => Value::Object(serde_json::Map::new()),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn lines(source: &str) -> Vec<String> {
        source.lines().map(|l| l.to_string()).collect()
    }

    fn parse(source: &str) -> IndexMap<String, SchemaField> {
        SchemaParser::new()
            .parse_schema(&lines(source), "TestResource")
            .unwrap()
    }

    #[test]
    fn test_flat_fields() {
        let schema = parse(
            r#"
            // @responseParam id integer required The user id. Example: 7
            // @responseParam name string The display name.
            "#,
        );
        assert_eq!(schema.len(), 2);
        assert_eq!(schema["id"].ty, "integer");
        assert!(schema["id"].required);
        assert_eq!(schema["id"].description, "The user id.");
        assert_eq!(schema["id"].example, Some(json!(7)));
        assert_eq!(schema["name"].ty, "string");
        assert!(!schema["name"].required);
        assert!(schema["name"].example.is_none());
    }

    #[test]
    fn test_nested_array_scope_restored() {
        let schema = parse(
            r#"
            // @responseParam items array The line items.
            "items": [
                // @responseParam id integer required The item id.
            ],
            // @responseParam total integer The grand total.
            "#,
        );
        assert_eq!(schema["items"].ty, "array");
        assert_eq!(schema["items"].children["id"].ty, "integer");
        // sibling after the `]` attaches to the outer scope
        assert!(schema.contains_key("total"));
        assert!(!schema["items"].children.contains_key("total"));
    }

    #[test]
    fn test_nested_object_scope() {
        let schema = parse(
            r#"
            // @responseParam owner object The owning account.
            "owner": {
                // @responseParam email string required The owner email.
            },
            "#,
        );
        assert_eq!(schema["owner"].ty, "object");
        assert_eq!(schema["owner"].children["email"].ty, "string");
        assert!(schema["owner"].children["email"].required);
    }

    #[test]
    fn test_deep_nesting() {
        let schema = parse(
            r#"
            // @responseParam data array The payload.
            [
                // @responseParam meta object Item metadata.
                {
                    // @responseParam tags array Item tags.
                    [
                        // @responseParam label string The tag label.
                    ]
                }
            ]
            "#,
        );
        let meta = &schema["data"].children["meta"];
        let label = &meta.children["tags"].children["label"];
        assert_eq!(label.ty, "string");
    }

    #[test]
    fn test_enum_extraction() {
        let schema = parse(
            "// @responseParam status string required The charge status. Enum: [pending, paid, failed]",
        );
        assert_eq!(
            schema["status"].enum_values,
            Some(vec![
                "pending".to_string(),
                "paid".to_string(),
                "failed".to_string()
            ])
        );
        assert_eq!(schema["status"].description, "The charge status.");
    }

    #[test]
    fn test_example_cast_to_type() {
        let schema = parse("// @responseParam flag boolean The flag. Example: false");
        assert_eq!(schema["flag"].example, Some(json!(false)));
    }

    #[test]
    fn test_block_comment_continuation() {
        let schema = parse(
            r#"
            /* @responseParam note string required A note that
               spans several lines of text. */
            "#,
        );
        assert!(schema["note"].required);
        assert_eq!(
            schema["note"].description,
            "A note that spans several lines of text."
        );
    }

    #[test]
    fn test_unbalanced_scope_is_error() {
        let result = SchemaParser::new().parse_schema(
            &lines(
                r#"
                // @responseParam items array The items.
                // @responseParam id integer The id.
                "#,
            ),
            "BrokenResource",
        );
        match result {
            Err(Error::UnbalancedSchema { resource, open }) => {
                assert_eq!(resource, "BrokenResource");
                assert_eq!(open, 1);
            }
            other => panic!("expected UnbalancedSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_stray_close_is_ignored() {
        let schema = parse(
            r#"
            ],
            // @responseParam id integer The id.
            }
            "#,
        );
        assert_eq!(schema.len(), 1);
        assert!(schema.contains_key("id"));
    }

    #[test]
    fn test_malformed_tag_is_error() {
        let result = SchemaParser::new()
            .parse_schema(&lines("// @responseParam justaname"), "BadResource");
        assert!(matches!(result, Err(Error::MalformedTag { .. })));
    }

    #[test]
    fn test_generate_example_nested() {
        let schema = parse(
            r#"
            // @responseParam id integer required The id. Example: 9
            // @responseParam tags array The tags.
            [
                // @responseParam name string The tag name.
            ]
            "#,
        );
        let example = generate_example(&schema);
        assert_eq!(example, json!({"id": 9, "tags": [{"name": "example"}]}));
    }

    #[test]
    fn test_fixed_dummies() {
        assert_eq!(fixed_dummy("integer"), json!(1));
        assert_eq!(fixed_dummy("float"), json!(1.0));
        assert_eq!(fixed_dummy("boolean"), json!(true));
        assert_eq!(fixed_dummy("string"), json!("example"));
        assert_eq!(fixed_dummy("array"), json!([]));
        assert_eq!(fixed_dummy("object"), json!({}));
    }

    #[test]
    fn test_parse_resource_metadata() {
        use crate::resolver::ResourceExcerpt;

        let source = r#"
            // @responseParam id integer required The id.
        "#;
        let excerpt = ResourceExcerpt {
            short_name: "ChargeResource".to_string(),
            type_doc: Some(
                "@resourceName Charge\n@resourceDescription A charge payload.\n@resourceStatus 201"
                    .to_string(),
            ),
            lines: lines(source),
            start_line: 1,
            end_line: 3,
        };

        let descriptor = SchemaParser::new()
            .parse_resource(&excerpt, Some("200"))
            .unwrap();
        assert_eq!(descriptor.name, "Charge");
        assert_eq!(descriptor.description, "A charge payload.");
        // @resourceStatus wins over the declared tag status
        assert_eq!(descriptor.status_code, "201");
        assert_eq!(descriptor.example, json!({"id": 1}));
    }

    #[test]
    fn test_parse_resource_status_fallbacks() {
        use crate::resolver::ResourceExcerpt;

        let excerpt = ResourceExcerpt {
            short_name: "PlainResource".to_string(),
            type_doc: None,
            lines: lines("// @responseParam ok boolean The flag."),
            start_line: 1,
            end_line: 1,
        };

        let parser = SchemaParser::new();
        let with_declared = parser.parse_resource(&excerpt, Some("202")).unwrap();
        assert_eq!(with_declared.status_code, "202");
        assert_eq!(with_declared.name, "PlainResource");

        let without = parser.parse_resource(&excerpt, None).unwrap();
        assert_eq!(without.status_code, "200");
    }
}
