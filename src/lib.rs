//! Barber
//!
//! A type-indexed registry of locale-specific document templates. Templates
//! bind a DocumentData (the values) to one or more Documents (the fields to
//! fill). Everything is compiled and cross-checked once when the
//! [`Barbershop`] is built, so rendering never meets a reference that cannot
//! be satisfied.
//!
//! ## Features
//!
//! - **Build-time validation**: every template variable must name a field of
//!   its DocumentData, and every target Document must be installed
//! - **Aggregate errors**: all problems are reported together as a numbered list
//! - **Locale fallback**: exact locale, then language-only, then a default
//! - **Injectable engine**: Handlebars by default, behind [`TemplateEngine`]
//!
//! ## Architecture
//!
//! ```text
//! BarbershopBuilder ── install_document / install_document_template
//!        │
//!        ▼ build()
//!   compile ──► validate ──► Barbershop ──► Barber ──► RenderedDocument
//! ```

pub mod barber;
pub mod barbershop;
pub mod config;
pub mod engine;
pub mod error;
pub mod locale;
pub mod manifest;
pub mod schema;
pub mod template;
pub mod validation;

pub use barber::{Barber, RenderedDocument};
pub use barbershop::{BarberKey, Barbershop, BarbershopBuilder};
pub use config::BarberConfig;
pub use engine::{EscapeMode, ExecutableTemplate, HandlebarsEngine, TemplateEngine};
pub use error::{BarberError, EngineError, ErrorReport, Result};
pub use locale::Locale;
pub use manifest::Manifest;
pub use schema::{Document, DocumentData, FieldSpec, SourceType, TargetType};
pub use template::{CompiledDocumentTemplate, DocumentTemplate};
pub use validation::{Diagnostic, Validator};
