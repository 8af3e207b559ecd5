//! Handler and resource resolution over parsed source files.
//!
//! The annotation parser never touches the filesystem or the AST directly; it
//! talks to a [`HandlerResolver`]. The production implementation,
//! [`SourceResolver`], walks the `syn` trees of every scanned file, so the
//! parsing and assembly logic stays testable against a stub resolver.

use crate::docblock::doc_text;
use crate::parser::ParsedFile;
use log::debug;
use syn::spanned::Spanned;

/// Name of the canonical "build representation" method a response resource
/// must expose. Its body is the excerpt the nested-schema parser walks.
pub const REPRESENTATION_METHOD: &str = "to_representation";

/// Doc comments attached to a resolved route handler.
#[derive(Debug, Clone, Default)]
pub struct ResolvedHandler {
    /// Doc comment of the handler method itself
    pub method_doc: Option<String>,
    /// Doc comment of the declaring type
    pub type_doc: Option<String>,
}

/// A resolved response-resource type together with the source excerpt of its
/// representation method.
#[derive(Debug, Clone)]
pub struct ResourceExcerpt {
    /// Unqualified type name
    pub short_name: String,
    /// Doc comment of the resource type
    pub type_doc: Option<String>,
    /// All lines of the file declaring the resource
    pub lines: Vec<String>,
    /// 1-based line on which the representation method starts
    pub start_line: usize,
    /// 1-based line on which the representation method ends
    pub end_line: usize,
}

/// Resolution capability consumed by the annotation parser.
pub trait HandlerResolver {
    /// Resolves a handler identity (`Type::method`, optionally
    /// module-qualified) to its doc comments. `None` means the handler cannot
    /// be inspected and the route should be skipped.
    fn resolve_handler(&self, handler: &str) -> Option<ResolvedHandler>;

    /// Resolves a response-resource type name to the excerpt of its
    /// representation method. `None` means the type or the method does not
    /// exist, which the caller must treat as an authoring error.
    fn resolve_resource(&self, resource: &str) -> Option<ResourceExcerpt>;
}

/// [`HandlerResolver`] backed by the parsed files of the scanned project.
pub struct SourceResolver {
    files: Vec<ParsedFile>,
}

impl SourceResolver {
    pub fn new(files: Vec<ParsedFile>) -> Self {
        debug!("Initializing resolver over {} files", files.len());
        Self { files }
    }

    /// Splits `a::b::Type::method` into (`Type`, `method`).
    fn split_handler(handler: &str) -> Option<(&str, &str)> {
        let mut segments = handler.rsplitn(3, "::");
        let method = segments.next()?;
        let type_name = segments.next()?;
        if method.is_empty() || type_name.is_empty() {
            return None;
        }
        Some((type_name, method))
    }

    fn find_type_doc(&self, type_name: &str) -> Option<String> {
        for file in &self.files {
            for item in &file.syntax_tree.items {
                let attrs = match item {
                    syn::Item::Struct(s) if s.ident == type_name => &s.attrs,
                    syn::Item::Enum(e) if e.ident == type_name => &e.attrs,
                    _ => continue,
                };
                return doc_text(attrs);
            }
        }
        None
    }

    /// Finds `fn method` inside any `impl Type` block, returning the method
    /// item and the file declaring it.
    fn find_impl_method(&self, type_name: &str, method: &str) -> Option<(&syn::ImplItemFn, &ParsedFile)> {
        for file in &self.files {
            for item in &file.syntax_tree.items {
                let item_impl = match item {
                    syn::Item::Impl(i) => i,
                    _ => continue,
                };
                let self_ty = match item_impl.self_ty.as_ref() {
                    syn::Type::Path(p) => p,
                    _ => continue,
                };
                let matches_type = self_ty
                    .path
                    .segments
                    .last()
                    .map(|s| s.ident == type_name)
                    .unwrap_or(false);
                if !matches_type {
                    continue;
                }
                for impl_item in &item_impl.items {
                    if let syn::ImplItem::Fn(f) = impl_item {
                        if f.sig.ident == method {
                            return Some((f, file));
                        }
                    }
                }
            }
        }
        None
    }
}

impl HandlerResolver for SourceResolver {
    fn resolve_handler(&self, handler: &str) -> Option<ResolvedHandler> {
        let (type_name, method) = Self::split_handler(handler)?;
        let (method_item, file) = self.find_impl_method(type_name, method)?;
        debug!(
            "Resolved handler {} in {}",
            handler,
            file.path.display()
        );
        Some(ResolvedHandler {
            method_doc: doc_text(&method_item.attrs),
            type_doc: self.find_type_doc(type_name),
        })
    }

    fn resolve_resource(&self, resource: &str) -> Option<ResourceExcerpt> {
        let short_name = resource.rsplit("::").next().unwrap_or(resource).to_string();
        let (method_item, file) = self.find_impl_method(&short_name, REPRESENTATION_METHOD)?;

        let span = method_item.span();
        let start_line = span.start().line;
        let end_line = span.end().line;
        debug!(
            "Resolved resource {} ({} lines {}..{})",
            short_name,
            file.path.display(),
            start_line,
            end_line
        );

        Some(ResourceExcerpt {
            type_doc: self.find_type_doc(&short_name),
            short_name,
            lines: file.lines(),
            start_line,
            end_line,
        })
    }
}
