//! ---
//! thalos_section: "01-core-functionality"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Template registry, substitution and code skeleton generation."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
//! Named templates with `{placeholder}` substitution, plus Python-style
//! class and function skeletons.
//!
//! Templates are parsed once at registration. Rendering walks the segment
//! list, so a context value containing braces is never re-interpreted.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thalos_common::ident;
use tracing::debug;

use crate::error::{CoreError, ValidationError};

/// Placeholder values keyed by placeholder name.
pub type Context = BTreeMap<String, String>;

const INDENT: &str = "    ";
const CONSTRUCTOR: &str = "__init__";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone)]
struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(ch) = rest.chars().next() {
            if rest.starts_with("{{") {
                literal.push('{');
                rest = &rest[2..];
            } else if rest.starts_with("}}") {
                literal.push('}');
                rest = &rest[2..];
            } else if let Some(name) = placeholder_at(rest) {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name.to_owned()));
                rest = &rest[name.len() + 2..];
            } else {
                literal.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source: source.to_owned(),
            segments,
        }
    }

    fn placeholders(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }
}

/// Returns the placeholder name if `rest` starts with `{name}`.
///
/// Any non-empty run without braces counts, so `{user-name}` and `{a.b}` are
/// placeholders while `{}` stays literal.
fn placeholder_at(rest: &str) -> Option<&str> {
    let body = rest.strip_prefix('{')?;
    let end = body.find(['{', '}'])?;
    let name = &body[..end];
    (body[end..].starts_with('}') && !name.is_empty()).then_some(name)
}

/// One successful `generate` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRecord {
    pub template: String,
    /// Sorted names of the context entries supplied.
    pub context_keys: Vec<String>,
}

/// Options for [`TemplateEngine::generate_class_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassOptions {
    /// Emit an `__init__` stub ahead of the listed methods.
    pub include_constructor: bool,
}

impl Default for ClassOptions {
    fn default() -> Self {
        Self {
            include_constructor: true,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TemplateEngine {
    templates: BTreeMap<String, Template>,
    history: Option<Vec<GenerationRecord>>,
}

impl TemplateEngine {
    /// Engine without generation history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that records every successful [`generate`](Self::generate).
    pub fn with_history() -> Self {
        Self {
            templates: BTreeMap::new(),
            history: Some(Vec::new()),
        }
    }

    pub fn tracks_history(&self) -> bool {
        self.history.is_some()
    }

    pub fn register_template(&mut self, name: &str, body: &str) -> Result<(), CoreError> {
        if name.is_empty() {
            return Err(ValidationError::new("template", "cannot be empty").into());
        }
        if self.templates.contains_key(name) {
            return Err(CoreError::TemplateExists { name: name.to_owned() });
        }
        let template = Template::parse(body);
        debug!(template = name, placeholders = template.placeholders().len(), "template registered");
        self.templates.insert(name.to_owned(), template);
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered template body exactly as supplied.
    pub fn template_source(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(|template| template.source.as_str())
    }

    pub fn list_templates(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    /// Substitute `context` into the named template without recording history.
    ///
    /// Every placeholder must have an entry; extra entries are ignored. When
    /// any are absent the error lists all of them in sorted order.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, CoreError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| CoreError::TemplateNotFound { name: name.to_owned() })?;

        let missing: Vec<String> = template
            .placeholders()
            .into_iter()
            .filter(|placeholder| !context.contains_key(*placeholder))
            .map(str::to_owned)
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::MissingContext {
                template: name.to_owned(),
                missing,
            });
        }

        let mut output = String::with_capacity(template.source.len());
        for segment in &template.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder(key) => {
                    if let Some(value) = context.get(key) {
                        output.push_str(value);
                    }
                }
            }
        }
        Ok(output)
    }

    /// [`render`](Self::render), appending a [`GenerationRecord`] on success
    /// when history is enabled.
    pub fn generate(&mut self, name: &str, context: &Context) -> Result<String, CoreError> {
        let output = self.render(name, context)?;
        if let Some(history) = self.history.as_mut() {
            history.push(GenerationRecord {
                template: name.to_owned(),
                context_keys: context.keys().cloned().collect(),
            });
        }
        Ok(output)
    }

    pub fn history(&self) -> Result<&[GenerationRecord], CoreError> {
        self.history.as_deref().ok_or(CoreError::HistoryDisabled)
    }

    pub fn clear_history(&mut self) -> Result<(), CoreError> {
        let history = self.history.as_mut().ok_or(CoreError::HistoryDisabled)?;
        history.clear();
        Ok(())
    }

    pub fn generate_class<S: AsRef<str>>(
        &self,
        class_name: &str,
        methods: &[S],
    ) -> Result<String, CoreError> {
        self.generate_class_with(class_name, methods, ClassOptions::default())
    }

    /// Class skeleton with one stub per method in the order given.
    ///
    /// An explicitly listed `__init__` keeps its position and suppresses the
    /// implicit constructor stub.
    pub fn generate_class_with<S: AsRef<str>>(
        &self,
        class_name: &str,
        methods: &[S],
        options: ClassOptions,
    ) -> Result<String, CoreError> {
        if !ident::is_valid_class_name(class_name) {
            return Err(ValidationError::new(
                "class_name",
                "must start with an uppercase letter and contain only letters or digits",
            )
            .with_value(class_name)
            .into());
        }

        let mut stubs: Vec<&str> = Vec::with_capacity(methods.len() + 1);
        for method in methods.iter().map(AsRef::as_ref) {
            if !ident::is_valid_identifier(method) {
                return Err(ValidationError::new("method", "must be a valid identifier")
                    .with_value(method)
                    .into());
            }
            if stubs.contains(&method) {
                return Err(ValidationError::new("method", "listed more than once")
                    .with_value(method)
                    .into());
            }
            stubs.push(method);
        }
        if options.include_constructor && !stubs.contains(&CONSTRUCTOR) {
            stubs.insert(0, CONSTRUCTOR);
        }

        let mut lines = vec![
            format!("class {class_name}:"),
            format!("{INDENT}\"\"\"{class_name} class\"\"\""),
        ];
        if stubs.is_empty() {
            lines.push(String::new());
            lines.push(format!("{INDENT}pass"));
        }
        for stub in stubs {
            lines.push(String::new());
            lines.push(format!("{INDENT}def {stub}(self):"));
            lines.push(format!("{INDENT}{INDENT}pass"));
        }
        Ok(lines.join("\n") + "\n")
    }

    pub fn generate_function<S: AsRef<str>>(
        &self,
        function_name: &str,
        parameters: &[S],
    ) -> Result<String, CoreError> {
        if !ident::is_valid_function_name(function_name) {
            return Err(ValidationError::new(
                "function_name",
                "must start with a lowercase letter or underscore and contain only lowercase letters, digits, or underscores",
            )
            .with_value(function_name)
            .into());
        }
        let mut params: Vec<&str> = Vec::with_capacity(parameters.len());
        for param in parameters.iter().map(AsRef::as_ref) {
            if !ident::is_valid_identifier(param) {
                return Err(ValidationError::new("parameter", "must be a valid identifier")
                    .with_value(param)
                    .into());
            }
            params.push(param);
        }

        Ok(format!(
            "def {function_name}({}):\n{INDENT}\"\"\"{function_name} function\"\"\"\n{INDENT}pass\n",
            params.join(", ")
        ))
    }
}
