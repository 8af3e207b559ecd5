//! Request example rendering for `x-code-samples`.
//!
//! One sample is attached per configured language tab. Unknown language ids
//! are skipped with a warning rather than failing the run.

use crate::annotation::RouteDescriptor;
use log::warn;
use serde_json::Value;

/// Renders a request example for the given language id, or `None` when no
/// renderer exists for it.
pub fn render_sample(lang: &str, route: &RouteDescriptor, base_url: &str) -> Option<String> {
    match lang {
        "bash" => Some(render_bash(route, base_url)),
        "javascript" => Some(render_javascript(route, base_url)),
        other => {
            warn!("No sample renderer for language tab `{}`", other);
            None
        }
    }
}

fn url_of(route: &RouteDescriptor, base_url: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        route.uri.trim_start_matches('/')
    )
}

/// Bare rendering of an example value inside a sample, without JSON quoting.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn render_bash(route: &RouteDescriptor, base_url: &str) -> String {
    let method = route.methods.first().map(String::as_str).unwrap_or("GET");
    let mut out = format!(
        "curl -X {} {}\"{}\"",
        method,
        if method == "GET" { "-G " } else { "" },
        url_of(route, base_url)
    );

    for (header, value) in &route.headers {
        out.push_str(&format!(" \\\n    -H \"{}: {}\"", header, value));
    }

    for (name, parameter) in &route.body_parameters {
        out.push_str(&format!(
            " \\\n    -d \"{}\"=\"{}\"",
            name,
            literal(&parameter.value)
        ));
    }

    out
}

fn render_javascript(route: &RouteDescriptor, base_url: &str) -> String {
    let method = route.methods.first().map(String::as_str).unwrap_or("GET");
    let mut out = format!("const url = new URL(\"{}\");\n", url_of(route, base_url));

    if !route.query_parameters.is_empty() {
        out.push_str("\nlet params = {\n");
        for (name, parameter) in &route.query_parameters {
            out.push_str(&format!("    \"{}\": \"{}\",\n", name, literal(&parameter.value)));
        }
        out.push_str("};\n\nObject.keys(params).forEach(key => url.searchParams.append(key, params[key]));\n");
    }

    out.push_str("\nlet headers = {\n");
    for (header, value) in &route.headers {
        out.push_str(&format!("    \"{}\": \"{}\",\n", header, value));
    }
    if !route.headers.contains_key("Accept") {
        out.push_str("    \"Accept\": \"application/json\",\n");
    }
    if !route.headers.contains_key("Content-Type") {
        out.push_str("    \"Content-Type\": \"application/json\",\n");
    }
    out.push_str("};\n");

    if !route.body_parameters.is_empty() {
        out.push_str("\nlet body = JSON.stringify({\n");
        for (name, parameter) in &route.body_parameters {
            let rendered = if matches!(parameter.ty.as_str(), "json" | "object") {
                literal(&parameter.value)
            } else {
                format!("\"{}\"", literal(&parameter.value))
            };
            out.push_str(&format!("    \"{}\": {},\n", name, rendered));
        }
        out.push_str("});\n");
    }

    out.push_str(&format!("\nfetch(url, {{\n    method: \"{}\",\n    headers: headers,\n", method));
    if !route.body_parameters.is_empty() {
        out.push_str("    body: body,\n");
    }
    out.push_str("})\n    .then(response => response.json())\n    .then(json => console.log(json));\n");

    out
}
