//! The Barbershop registry
//!
//! Templates and Documents are installed into a [`BarbershopBuilder`], which
//! compiles and validates everything once in [`BarbershopBuilder::build`].
//! The resulting [`Barbershop`] is immutable and hands out [`Barber`]s for
//! each (DocumentData, Document) pair.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::barber::Barber;
use crate::config::BarberConfig;
use crate::engine::{HandlebarsEngine, TemplateEngine};
use crate::error::{BarberError, ErrorReport, Result};
use crate::locale::Locale;
use crate::schema::{Document, DocumentData, TargetType};
use crate::template::{CompiledDocumentTemplate, DocumentTemplate};
use crate::validation::Validator;

/// Identity of a Barber: a (DocumentData, Document) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BarberKey {
    pub source: String,
    pub target: String,
}

impl BarberKey {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn of<D: DocumentData, T: Document>() -> Self {
        Self::new(D::source_type().name, T::target_type().name)
    }
}

impl fmt::Display for BarberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Barber<{}, {}>", self.source, self.target)
    }
}

/// Compiled templates for one key, by locale
pub(crate) type LocaleIndex = BTreeMap<Locale, Arc<CompiledDocumentTemplate>>;

/// Immutable index of compiled templates and installed Documents
#[derive(Debug)]
pub struct Barbershop {
    documents: BTreeMap<String, TargetType>,
    templates: BTreeMap<BarberKey, LocaleIndex>,
    default_locale: Locale,
}

impl Barbershop {
    /// Start installing Documents and templates
    pub fn builder() -> BarbershopBuilder {
        BarbershopBuilder::new()
    }

    /// Get the Barber for a DocumentData and Document type
    pub fn get_barber<D: DocumentData, T: Document>(&self) -> Result<Barber<'_>> {
        self.barber(&D::source_type().name, &T::target_type().name)
    }

    /// Get the Barber for a source and target by name
    pub fn barber(&self, source: &str, target: &str) -> Result<Barber<'_>> {
        let key = BarberKey::new(source, target);
        if let Some((key, templates)) = self.templates.get_key_value(&key) {
            if let Some(document) = self.documents.get(target) {
                return Ok(Barber::new(key, document, templates, &self.default_locale));
            }
        }
        Err(BarberError::BarberNotFound(self.explain_missing(&key)))
    }

    fn explain_missing(&self, key: &BarberKey) -> ErrorReport {
        let mut message = format!("Failed to get {}\n", key);
        if !self.documents.contains_key(&key.target) {
            message.push_str(&format!(
                "Document [{}] is not installed in Barbershop",
                key.target
            ));
        } else {
            let source_state = if self.templates.keys().any(|k| k.source == key.source) {
                "is installed"
            } else {
                "is not installed"
            };
            message.push_str(&format!(
                "Requested Document [{}] is installed\n\
                 Requested DocumentData [{}] {}\n\
                 DocumentTemplate with source=[{}] does not have target=[{}]",
                key.target, key.source, source_state, key.source, key.target
            ));
        }
        tracing::debug!(%key, "barber lookup failed");
        [message].into_iter().collect()
    }

    /// One Barber per distinct (source, target) pair, regardless of locales
    pub fn all_barbers(&self) -> BTreeMap<BarberKey, Barber<'_>> {
        self.templates
            .iter()
            .filter_map(|(key, templates)| {
                let document = self.documents.get(&key.target)?;
                Some((
                    key.clone(),
                    Barber::new(key, document, templates, &self.default_locale),
                ))
            })
            .collect()
    }

    /// Documents reachable from a DocumentData type
    pub fn target_documents<D: DocumentData>(&self) -> BTreeSet<String> {
        self.target_documents_for(&D::source_type().name)
    }

    /// Documents reachable from a source by name; empty if there are none
    pub fn target_documents_for(&self, source: &str) -> BTreeSet<String> {
        self.templates
            .keys()
            .filter(|k| k.source == source)
            .map(|k| k.target.clone())
            .collect()
    }

    /// Installed Documents by name
    pub fn installed_documents(&self) -> &BTreeMap<String, TargetType> {
        &self.documents
    }

    /// Locales with a template for `key`
    pub fn locales(&self, key: &BarberKey) -> Vec<&Locale> {
        self.templates
            .get(key)
            .map(|index| index.keys().collect())
            .unwrap_or_default()
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }
}

/// Mutable install phase of a [`Barbershop`]
pub struct BarbershopBuilder {
    documents: BTreeMap<String, TargetType>,
    templates: Vec<DocumentTemplate>,
    engine: Arc<dyn TemplateEngine>,
    default_locale: Locale,
}

impl Default for BarbershopBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BarbershopBuilder {
    pub fn new() -> Self {
        Self {
            documents: BTreeMap::new(),
            templates: Vec::new(),
            engine: Arc::new(HandlebarsEngine::default()),
            default_locale: Locale::default(),
        }
    }

    /// Builder configured with the engine and default locale from `config`
    pub fn from_config(config: &BarberConfig) -> Result<Self> {
        Ok(Self::new()
            .with_engine(Arc::new(HandlebarsEngine::new(
                config.render.escape,
                config.render.strict,
            )))
            .with_default_locale(config.default_locale()?))
    }

    /// Replace the template engine
    pub fn with_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Locale used when neither the exact nor the language-only locale matches
    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    /// Install a Document type
    pub fn install_document<T: Document>(self) -> Self {
        self.install_document_type(T::target_type())
    }

    /// Install a Document schema. Reinstalling a name replaces it.
    pub fn install_document_type(mut self, document: TargetType) -> Self {
        self.documents.insert(document.name.clone(), document);
        self
    }

    /// Install a template. Nothing is checked until `build()`.
    pub fn install_document_template(mut self, template: DocumentTemplate) -> Self {
        self.templates.push(template);
        self
    }

    /// Compile and validate everything installed.
    ///
    /// All compile and validation problems are returned together as one
    /// [`BarberError::Build`]; no Barbershop is produced in that case.
    /// Problems are listed template by template in install order. A template
    /// that fails to compile reports only its compile errors; it is not
    /// validated further.
    pub fn build(self) -> Result<Barbershop> {
        let mut diagnostics = Vec::new();
        let mut compiled = Vec::with_capacity(self.templates.len());
        let mut validator = Validator::new(&self.documents);

        for raw in &self.templates {
            match CompiledDocumentTemplate::compile(self.engine.as_ref(), raw) {
                Ok(template) => {
                    diagnostics.extend(validator.check(&template));
                    compiled.push(Arc::new(template));
                }
                Err(errors) => diagnostics.extend(errors),
            }
        }

        if !diagnostics.is_empty() {
            for diagnostic in &diagnostics {
                tracing::warn!(code = diagnostic.code(), "{}", diagnostic);
            }
            return Err(BarberError::Build(
                diagnostics.iter().map(ToString::to_string).collect(),
            ));
        }

        let mut templates: BTreeMap<BarberKey, LocaleIndex> = BTreeMap::new();
        for template in compiled {
            for target in &template.targets {
                templates
                    .entry(BarberKey::new(&template.source.name, target))
                    .or_default()
                    .insert(template.locale.clone(), Arc::clone(&template));
            }
        }

        tracing::info!(
            documents = self.documents.len(),
            templates = self.templates.len(),
            barbers = templates.len(),
            "barbershop built"
        );

        Ok(Barbershop {
            documents: self.documents,
            templates,
            default_locale: self.default_locale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SourceType;

    fn receipt() -> SourceType {
        SourceType::new("Receipt").field("sender")
    }

    fn sms() -> TargetType {
        TargetType::new("Sms").field("sms_body")
    }

    fn sms_template(locale: &str) -> DocumentTemplate {
        DocumentTemplate::new(receipt(), Locale::parse(locale).unwrap())
            .field("sms_body", "{{sender}}")
            .target("Sms")
    }

    #[test]
    fn test_build_empty() {
        let shop = Barbershop::builder().build().unwrap();
        assert!(shop.all_barbers().is_empty());
        assert!(shop.target_documents_for("Receipt").is_empty());
    }

    #[test]
    fn test_build_indexes_locales() {
        let shop = Barbershop::builder()
            .install_document_type(sms())
            .install_document_template(sms_template("en-US"))
            .install_document_template(sms_template("en-GB"))
            .build()
            .unwrap();

        let key = BarberKey::new("Receipt", "Sms");
        assert_eq!(shop.locales(&key).len(), 2);
        assert_eq!(shop.all_barbers().len(), 1);
    }

    #[test]
    fn test_build_is_all_or_nothing() {
        let result = Barbershop::builder()
            .install_document_type(sms())
            .install_document_template(sms_template("en-US"))
            .install_document_template(sms_template("en-US"))
            .build();

        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Errors\n1) Duplicate DocumentTemplate with source=[Receipt] target=[Sms] locale=en-US\n"
        );
    }

    #[test]
    fn test_key_display() {
        assert_eq!(BarberKey::new("A", "B").to_string(), "Barber<A, B>");
    }
}
