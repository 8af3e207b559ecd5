//! Structured doc comment parsing.
//!
//! A handler's doc comment carries a short description (first line), a long
//! description (remaining body up to the first tag) and an ordered list of
//! annotation tags (`@name content`). A tag's content continues onto
//! following lines until the next tag starts.

use log::trace;

/// One annotation tag inside a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name, without the leading `@`
    pub name: String,
    /// Tag content, trimmed, continuation lines joined by a single space
    pub content: String,
}

/// A parsed structured doc comment.
#[derive(Debug, Clone, Default)]
pub struct DocBlock {
    /// First line of the comment
    pub short: String,
    /// Remaining description body, before the first tag
    pub long: String,
    /// Ordered annotation tags
    pub tags: Vec<Tag>,
}

impl DocBlock {
    /// Parses raw doc comment text (one entry per source line, as produced by
    /// [`doc_text`]).
    pub fn parse(text: &str) -> Self {
        let mut short = String::new();
        let mut long_lines: Vec<String> = Vec::new();
        let mut tags: Vec<Tag> = Vec::new();

        for raw in text.lines() {
            let line = raw.trim();

            if let Some(rest) = line.strip_prefix('@') {
                let (name, content) = match rest.split_once(char::is_whitespace) {
                    Some((name, content)) => (name.to_string(), content.trim().to_string()),
                    None => (rest.to_string(), String::new()),
                };
                trace!("Found tag @{}: {}", name, content);
                tags.push(Tag { name, content });
                continue;
            }

            if let Some(last) = tags.last_mut() {
                // Continuation line of the previous tag
                if !line.is_empty() {
                    if !last.content.is_empty() {
                        last.content.push(' ');
                    }
                    last.content.push_str(line);
                }
            } else if short.is_empty() && !line.is_empty() {
                short = line.to_string();
            } else if !short.is_empty() {
                long_lines.push(line.to_string());
            }
        }

        let long = long_lines.join("\n").trim().to_string();

        DocBlock { short, long, tags }
    }

    /// First tag with the given name, compared case-insensitively.
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// All tags with the given exact name, in declaration order.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> {
        self.tags.iter().filter(move |t| t.name == name)
    }
}

/// Collects the text of `#[doc = "..."]` attributes (i.e. `///` comments)
/// into one newline-joined string. Returns `None` when the item carries no
/// doc comment at all.
pub fn doc_text(attrs: &[syn::Attribute]) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();

    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let syn::Meta::NameValue(nv) = &attr.meta {
            if let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(s),
                ..
            }) = &nv.value
            {
                let value = s.value();
                // `/// text` yields " text"; drop the conventional one space
                lines.push(value.strip_prefix(' ').unwrap_or(&value).to_string());
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
