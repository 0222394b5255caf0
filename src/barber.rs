//! Rendering Documents from DocumentData

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::barbershop::{BarberKey, LocaleIndex};
use crate::error::{BarberError, Result};
use crate::locale::Locale;
use crate::schema::TargetType;
use crate::template::CompiledDocumentTemplate;

/// Renders one Document from one DocumentData.
///
/// A Barber borrows from its [`Barbershop`](crate::Barbershop) and holds no
/// state of its own; it is cheap to copy and safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct Barber<'shop> {
    key: &'shop BarberKey,
    document: &'shop TargetType,
    templates: &'shop LocaleIndex,
    default_locale: &'shop Locale,
}

/// Field values produced by a [`Barber`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// The locale of the template that was used
    pub locale: Locale,
    /// Document field name to rendered value; `None` for blank fields
    pub fields: BTreeMap<String, Option<String>>,
}

impl RenderedDocument {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }

    /// Deserialize the rendered fields into a Document type
    pub fn into_document<T: DeserializeOwned>(self) -> Result<T> {
        let value = serde_json::to_value(self.fields)?;
        Ok(serde_json::from_value(value)?)
    }
}

impl<'shop> Barber<'shop> {
    pub(crate) fn new(
        key: &'shop BarberKey,
        document: &'shop TargetType,
        templates: &'shop LocaleIndex,
        default_locale: &'shop Locale,
    ) -> Self {
        Self {
            key,
            document,
            templates,
            default_locale,
        }
    }

    pub fn key(&self) -> &'shop BarberKey {
        self.key
    }

    pub fn document(&self) -> &'shop TargetType {
        self.document
    }

    /// Pick the template for `locale`: exact, then language-only, then the
    /// Barbershop default.
    pub fn resolve(&self, locale: &Locale) -> Result<&'shop CompiledDocumentTemplate> {
        let chain = locale.fallback_chain(self.default_locale);
        for candidate in &chain {
            if let Some(template) = self.templates.get(candidate) {
                if candidate != locale {
                    tracing::debug!(
                        key = %self.key,
                        requested = %locale,
                        resolved = %candidate,
                        "locale fallback"
                    );
                }
                return Ok(template.as_ref());
            }
        }
        Err(BarberError::LocaleNotResolved {
            key: self.key.clone(),
            requested: locale.clone(),
            tried: chain,
        })
    }

    /// Render the Document fields from any serializable DocumentData
    pub fn render<D: Serialize + ?Sized>(&self, data: &D, locale: &Locale) -> Result<RenderedDocument> {
        let context = serde_json::to_value(data)?;
        self.render_value(&context, locale)
    }

    /// Render the Document fields from a JSON context
    pub fn render_value(&self, context: &Value, locale: &Locale) -> Result<RenderedDocument> {
        let template = self.resolve(locale)?;

        let mut fields = BTreeMap::new();
        for name in self.document.field_names() {
            let value = match template.fields.get(name) {
                Some(Some(compiled)) => Some(compiled.template().execute(context).map_err(|e| {
                    BarberError::Render {
                        field: name.to_string(),
                        message: e.message,
                    }
                })?),
                Some(None) | None => None,
            };
            fields.insert(name.to_string(), value);
        }

        Ok(RenderedDocument {
            locale: template.locale.clone(),
            fields,
        })
    }

    /// Render and deserialize straight into the Document type
    pub fn render_document<D, T>(&self, data: &D, locale: &Locale) -> Result<T>
    where
        D: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.render(data, locale)?.into_document()
    }
}
