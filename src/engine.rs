//! Text-substitution engine
//!
//! The registry treats template parsing and execution as an injectable
//! collaborator: [`TemplateEngine`] turns template text into an
//! [`ExecutableTemplate`], which reports the variables it references and fills
//! them from a JSON context. [`HandlebarsEngine`] is the default.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use handlebars::template::{HelperTemplate, Parameter, TemplateElement};
use handlebars::{Context, Handlebars, RenderContext, Renderable, StringOutput, Template};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// Parses template text into an executable form
pub trait TemplateEngine: Send + Sync {
    fn compile(&self, text: &str) -> Result<Box<dyn ExecutableTemplate>, EngineError>;
}

/// A parsed template, ready to execute against a context
pub trait ExecutableTemplate: fmt::Debug + Send + Sync {
    /// Variable references in the template, as written (`button.url`)
    fn variables(&self) -> BTreeSet<String>;

    fn execute(&self, context: &Value) -> Result<String, EngineError>;
}

/// Root key of a variable path: `"button.url"` becomes `"button"`.
///
/// Only the root of a nested reference is checked against a source schema.
pub fn root_key(variable: &str) -> &str {
    variable.split('.').next().unwrap_or(variable)
}

/// Escaping applied to substituted values, selected by `[render] escape`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// Values are inserted verbatim
    #[default]
    None,
    /// HTML special characters are escaped, as mustache does
    Html,
}

/// [`TemplateEngine`] backed by Handlebars
#[derive(Clone)]
pub struct HandlebarsEngine {
    registry: Arc<Handlebars<'static>>,
}

impl Default for HandlebarsEngine {
    fn default() -> Self {
        Self::new(EscapeMode::default(), false)
    }
}

impl fmt::Debug for HandlebarsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlebarsEngine")
            .field("strict", &self.registry.strict_mode())
            .finish()
    }
}

impl HandlebarsEngine {
    /// Create an engine. In strict mode a reference missing from the context
    /// fails rendering instead of producing an empty string.
    pub fn new(escape: EscapeMode, strict: bool) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(strict);
        match escape {
            EscapeMode::None => registry.register_escape_fn(handlebars::no_escape),
            EscapeMode::Html => registry.register_escape_fn(handlebars::html_escape),
        }
        Self {
            registry: Arc::new(registry),
        }
    }
}

impl TemplateEngine for HandlebarsEngine {
    fn compile(&self, text: &str) -> Result<Box<dyn ExecutableTemplate>, EngineError> {
        let template = Template::compile(text).map_err(|e| EngineError::new(e.to_string()))?;
        Ok(Box::new(HandlebarsTemplate {
            registry: Arc::clone(&self.registry),
            variables: template_variables(&template),
            template,
        }))
    }
}

struct HandlebarsTemplate {
    registry: Arc<Handlebars<'static>>,
    template: Template,
    variables: BTreeSet<String>,
}

impl fmt::Debug for HandlebarsTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlebarsTemplate")
            .field("variables", &self.variables)
            .finish()
    }
}

impl ExecutableTemplate for HandlebarsTemplate {
    fn variables(&self) -> BTreeSet<String> {
        self.variables.clone()
    }

    fn execute(&self, context: &Value) -> Result<String, EngineError> {
        let ctx = Context::wraps(context).map_err(|e| EngineError::new(e.to_string()))?;
        let mut rc = RenderContext::new(None);
        let mut out = StringOutput::new();
        self.template
            .render(self.registry.as_ref(), &ctx, &mut rc, &mut out)
            .map_err(|e| EngineError::new(e.to_string()))?;
        out.into_string().map_err(|e| EngineError::new(e.to_string()))
    }
}

/// Variable references in a parsed template, normalised to dotted paths.
///
/// Expressions, helper arguments, hash values and subexpressions are read;
/// comments, partials, `@` data and parent (`../`) references are not source
/// fields. Block bodies are only read for `if`/`unless`, which keep the
/// current context; `each`/`with` bodies are relative to their argument.
pub fn template_variables(template: &Template) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_template(template, &mut out);
    out
}

fn collect_template(template: &Template, out: &mut BTreeSet<String>) {
    for element in &template.elements {
        collect_element(element, out);
    }
}

fn collect_element(element: &TemplateElement, out: &mut BTreeSet<String>) {
    match element {
        TemplateElement::Expression(ht) | TemplateElement::HtmlExpression(ht) => {
            if ht.params.is_empty() && ht.hash.is_empty() {
                collect_parameter(&ht.name, out);
            } else {
                collect_arguments(ht, out);
            }
        }
        TemplateElement::HelperBlock(ht) => {
            collect_arguments(ht, out);
            if matches!(ht.name.as_name(), Some("if" | "unless")) {
                if let Some(body) = &ht.template {
                    collect_template(body, out);
                }
            }
            if let Some(inverse) = &ht.inverse {
                collect_template(inverse, out);
            }
        }
        _ => {}
    }
}

fn collect_arguments(ht: &HelperTemplate, out: &mut BTreeSet<String>) {
    for param in ht.params.iter().chain(ht.hash.values()) {
        collect_parameter(param, out);
    }
}

fn collect_parameter(param: &Parameter, out: &mut BTreeSet<String>) {
    match param {
        Parameter::Subexpression(sub) => collect_element(&sub.element, out),
        Parameter::Literal(_) => {}
        other => {
            if let Some(path) = other.as_name().and_then(context_path) {
                out.insert(path);
            }
        }
    }
}

/// `this.a/b` becomes `a.b`; `this`, `@index` and `../a` have no source field
fn context_path(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let path = ["@root.", "@root/"]
        .iter()
        .find_map(|prefix| raw.strip_prefix(prefix))
        .unwrap_or(raw);
    if path.starts_with('@') || path.starts_with("..") {
        return None;
    }
    let path = ["this.", "this/", "./"]
        .iter()
        .find_map(|prefix| path.strip_prefix(prefix))
        .unwrap_or(path);
    if path.is_empty() || path == "this" || path == "." {
        return None;
    }
    Some(path.replace('/', "."))
}
