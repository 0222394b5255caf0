//! Document templates and their compiled form

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::engine::{ExecutableTemplate, TemplateEngine};
use crate::locale::Locale;
use crate::schema::{Document, SourceType};
use crate::validation::Diagnostic;

/// Author-supplied templates for the fields of one or more Documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTemplate {
    /// Target field name to template text; `None` leaves the field blank
    pub fields: BTreeMap<String, Option<String>>,
    /// The DocumentData this template reads from
    pub source: SourceType,
    /// Names of the Documents this template can fill
    pub targets: BTreeSet<String>,
    pub locale: Locale,
}

impl DocumentTemplate {
    pub fn new(source: SourceType, locale: Locale) -> Self {
        Self {
            fields: BTreeMap::new(),
            source,
            targets: BTreeSet::new(),
            locale,
        }
    }

    /// Set the template text for a target field
    pub fn field(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.insert(name.into(), Some(text.into()));
        self
    }

    /// Declare a target field this template intentionally leaves blank
    pub fn blank_field(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), None);
        self
    }

    /// Add a target Document by name
    pub fn target(mut self, name: impl Into<String>) -> Self {
        self.targets.insert(name.into());
        self
    }

    /// Add a target Document by type
    pub fn target_document<T: Document>(self) -> Self {
        self.target(T::target_type().name)
    }
}

/// A parsed template field
#[derive(Debug)]
pub struct CompiledField {
    template: Box<dyn ExecutableTemplate>,
    variables: BTreeSet<String>,
}

impl CompiledField {
    /// Variable references in this field, as written in the template
    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    pub fn template(&self) -> &dyn ExecutableTemplate {
        self.template.as_ref()
    }
}

/// The executable form of a [`DocumentTemplate`]
#[derive(Debug)]
pub struct CompiledDocumentTemplate {
    /// Target field name to parsed template; `None` renders as no value
    pub fields: BTreeMap<String, Option<CompiledField>>,
    pub source: SourceType,
    pub targets: BTreeSet<String>,
    pub locale: Locale,
}

impl CompiledDocumentTemplate {
    /// Compile every field of `raw`.
    ///
    /// Source and target declarations are not consulted here. All malformed
    /// fields are reported, each as its own diagnostic.
    pub fn compile(
        engine: &dyn TemplateEngine,
        raw: &DocumentTemplate,
    ) -> Result<Self, Vec<Diagnostic>> {
        let mut fields = BTreeMap::new();
        let mut errors = Vec::new();

        for (name, text) in &raw.fields {
            let Some(text) = text else {
                fields.insert(name.clone(), None);
                continue;
            };
            match engine.compile(text) {
                Ok(template) => {
                    let variables = template.variables();
                    fields.insert(
                        name.clone(),
                        Some(CompiledField {
                            template,
                            variables,
                        }),
                    );
                }
                Err(e) => errors.push(Diagnostic::Compile {
                    source: raw.source.name.clone(),
                    field: name.clone(),
                    locale: raw.locale.clone(),
                    message: e.message,
                }),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        tracing::debug!(
            source = %raw.source.name,
            locale = %raw.locale,
            fields = fields.len(),
            "compiled document template"
        );

        Ok(Self {
            fields,
            source: raw.source.clone(),
            targets: raw.targets.clone(),
            locale: raw.locale.clone(),
        })
    }

    /// Every (field, variable) reference in this template
    pub fn references(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().flat_map(|(field, compiled)| {
            compiled
                .iter()
                .flat_map(|c| c.variables.iter())
                .map(move |v| (field.as_str(), v.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HandlebarsEngine;

    fn source() -> SourceType {
        SourceType::new("ButtonData").field("button").field("sender")
    }

    #[test]
    fn test_compile_records_blank_fields() {
        let raw = DocumentTemplate::new(source(), Locale::default())
            .field("body", "{{sender}}")
            .blank_field("footer")
            .target("Email");

        let compiled = CompiledDocumentTemplate::compile(&HandlebarsEngine::default(), &raw).unwrap();
        assert!(compiled.fields["body"].is_some());
        assert!(compiled.fields["footer"].is_none());
        assert_eq!(compiled.targets, raw.targets);
    }

    #[test]
    fn test_compile_collects_references() {
        let raw = DocumentTemplate::new(source(), Locale::default())
            .field("btn", "<Button url={{button.url}}>{{button.label}}</Button>")
            .field("body", "{{sender}}");

        let compiled = CompiledDocumentTemplate::compile(&HandlebarsEngine::default(), &raw).unwrap();
        let refs: Vec<_> = compiled.references().collect();
        assert_eq!(
            refs,
            vec![("body", "sender"), ("btn", "button.label"), ("btn", "button.url")]
        );
    }

    #[test]
    fn test_compile_reports_every_malformed_field() {
        let raw = DocumentTemplate::new(source(), Locale::default())
            .field("a", "{{#if sender}}x{{/each}}")
            .field("b", "ok {{sender}}")
            .field("c", "{{#each button}}y{{/if}}");

        let errors = CompiledDocumentTemplate::compile(&HandlebarsEngine::default(), &raw).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], Diagnostic::Compile { field, .. } if field == "a"));
        assert!(matches!(&errors[1], Diagnostic::Compile { field, .. } if field == "c"));
    }
}
