//! Build-time validation of compiled templates
//!
//! Every compiled template is checked against its DocumentData schema and the
//! installed Documents. Checks never short-circuit: all problems for all
//! templates are returned so they can be reported together.
//!
//! ## Checks
//! 1. **Field existence**: the root key of every variable reference is a
//!    declared field of the template's source. `button.url` only checks
//!    `button`; nested paths are not validated.
//! 2. **Target coverage**: every target is installed, every template field is
//!    declared by a target, and single-target templates supply each required
//!    target field.
//! 3. **Duplicates**: one template per (source, target, locale).
//! 4. **Targets declared**: a template with no target could never be looked up.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::engine::root_key;
use crate::locale::Locale;
use crate::schema::TargetType;
use crate::template::CompiledDocumentTemplate;

/// A single build-time problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A template field could not be parsed
    Compile {
        source: String,
        field: String,
        locale: Locale,
        message: String,
    },
    /// A variable's root key is not a field of the source
    FieldNotFound {
        source: String,
        field: String,
        locale: Locale,
        variable: String,
    },
    /// A template targets a Document that was never installed
    TargetNotInstalled {
        source: String,
        target: String,
        locale: Locale,
    },
    /// A template field is not declared by any of its targets
    UnknownTargetField {
        source: String,
        field: String,
        locale: Locale,
        targets: Vec<String>,
    },
    /// A single-target template leaves a required Document field out
    MissingTargetField {
        source: String,
        target: String,
        field: String,
        locale: Locale,
    },
    DuplicateTemplate {
        source: String,
        target: String,
        locale: Locale,
    },
    /// A template declares no target Document
    NoTargets { source: String, locale: Locale },
}

impl Diagnostic {
    /// Stable identifier for the kind of problem
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::Compile { .. } => "compile",
            Diagnostic::FieldNotFound { .. } => "field-not-found",
            Diagnostic::TargetNotInstalled { .. } => "target-not-installed",
            Diagnostic::UnknownTargetField { .. } => "unknown-target-field",
            Diagnostic::MissingTargetField { .. } => "missing-target-field",
            Diagnostic::DuplicateTemplate { .. } => "duplicate-template",
            Diagnostic::NoTargets { .. } => "no-targets",
        }
    }

    /// Name of the DocumentData the offending template reads from
    pub fn source(&self) -> &str {
        match self {
            Diagnostic::Compile { source, .. }
            | Diagnostic::FieldNotFound { source, .. }
            | Diagnostic::TargetNotInstalled { source, .. }
            | Diagnostic::UnknownTargetField { source, .. }
            | Diagnostic::MissingTargetField { source, .. }
            | Diagnostic::DuplicateTemplate { source, .. }
            | Diagnostic::NoTargets { source, .. } => source,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Compile {
                source,
                field,
                locale,
                message,
            } => {
                let message: Vec<&str> = message
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .collect();
                write!(
                    f,
                    "Failed to compile DocumentTemplate field [{}] with source=[{}] locale={}: {}",
                    field,
                    source,
                    locale,
                    message.join(" ")
                )
            }
            Diagnostic::FieldNotFound {
                source,
                field,
                locale,
                variable,
            } => {
                let root = root_key(variable);
                write!(f, "Missing variable [{}]", root)?;
                if root != variable {
                    write!(f, " referenced as [{}]", variable)?;
                }
                write!(
                    f,
                    " in DocumentData [{}] for DocumentTemplate field [{}] locale={}",
                    source, field, locale
                )
            }
            Diagnostic::TargetNotInstalled {
                source,
                target,
                locale,
            } => write!(
                f,
                "Attempted to install DocumentTemplate with a non-installed Document [{}] (source=[{}] locale={})",
                target, source, locale
            ),
            Diagnostic::UnknownTargetField {
                source,
                field,
                locale,
                targets,
            } => write!(
                f,
                "DocumentTemplate field [{}] (source=[{}] locale={}) is not declared by any target Document [{}]",
                field,
                source,
                locale,
                targets.join(", ")
            ),
            Diagnostic::MissingTargetField {
                source,
                target,
                field,
                locale,
            } => write!(
                f,
                "DocumentTemplate (source=[{}] locale={}) is missing field [{}] required by Document [{}]",
                source, locale, field, target
            ),
            Diagnostic::DuplicateTemplate {
                source,
                target,
                locale,
            } => write!(
                f,
                "Duplicate DocumentTemplate with source=[{}] target=[{}] locale={}",
                source, target, locale
            ),
            Diagnostic::NoTargets { source, locale } => write!(
                f,
                "DocumentTemplate with source=[{}] locale={} does not declare any target Document",
                source, locale
            ),
        }
    }
}

/// Cross-checks compiled templates against the installed Documents.
///
/// Templates are checked one at a time in install order; the validator
/// remembers which (source, target, locale) triples it has seen so duplicates
/// are caught across calls.
pub struct Validator<'a> {
    documents: &'a BTreeMap<String, TargetType>,
    seen: HashSet<(String, String, Locale)>,
}

impl<'a> Validator<'a> {
    pub fn new(documents: &'a BTreeMap<String, TargetType>) -> Self {
        Self {
            documents,
            seen: HashSet::new(),
        }
    }

    /// Run every check for every template, in order. Never fails.
    pub fn validate<'t, I>(&mut self, templates: I) -> Vec<Diagnostic>
    where
        I: IntoIterator<Item = &'t CompiledDocumentTemplate>,
    {
        templates
            .into_iter()
            .flat_map(|template| self.check(template))
            .collect()
    }

    /// Run every check for one template
    pub fn check(&mut self, template: &CompiledDocumentTemplate) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if template.targets.is_empty() {
            diagnostics.push(Diagnostic::NoTargets {
                source: template.source.name.clone(),
                locale: template.locale.clone(),
            });
        }
        for target in &template.targets {
            let triple = (
                template.source.name.clone(),
                target.clone(),
                template.locale.clone(),
            );
            if !self.seen.insert(triple) {
                diagnostics.push(Diagnostic::DuplicateTemplate {
                    source: template.source.name.clone(),
                    target: target.clone(),
                    locale: template.locale.clone(),
                });
            }
        }
        self.check_targets_installed(template, &mut diagnostics);
        self.check_fields_exist(template, &mut diagnostics);
        self.check_target_coverage(template, &mut diagnostics);

        diagnostics
    }

    fn check_fields_exist(&self, template: &CompiledDocumentTemplate, out: &mut Vec<Diagnostic>) {
        for (field, variable) in template.references() {
            if !template.source.has_field(root_key(variable)) {
                out.push(Diagnostic::FieldNotFound {
                    source: template.source.name.clone(),
                    field: field.to_string(),
                    locale: template.locale.clone(),
                    variable: variable.to_string(),
                });
            }
        }
    }

    fn check_targets_installed(&self, template: &CompiledDocumentTemplate, out: &mut Vec<Diagnostic>) {
        for target in &template.targets {
            if !self.documents.contains_key(target) {
                out.push(Diagnostic::TargetNotInstalled {
                    source: template.source.name.clone(),
                    target: target.clone(),
                    locale: template.locale.clone(),
                });
            }
        }
    }

    fn check_target_coverage(&self, template: &CompiledDocumentTemplate, out: &mut Vec<Diagnostic>) {
        let installed: Vec<&TargetType> = template
            .targets
            .iter()
            .filter_map(|t| self.documents.get(t))
            .collect();

        // Coverage is only decidable once every target is known
        if installed.is_empty() || installed.len() != template.targets.len() {
            return;
        }

        for field in template.fields.keys() {
            if !installed.iter().any(|doc| doc.has_field(field)) {
                out.push(Diagnostic::UnknownTargetField {
                    source: template.source.name.clone(),
                    field: field.clone(),
                    locale: template.locale.clone(),
                    targets: template.targets.iter().cloned().collect(),
                });
            }
        }

        if let [document] = installed.as_slice() {
            for required in document.required_fields() {
                if !template.fields.contains_key(&required.name) {
                    out.push(Diagnostic::MissingTargetField {
                        source: template.source.name.clone(),
                        target: document.name.clone(),
                        field: required.name.clone(),
                        locale: template.locale.clone(),
                    });
                }
            }
        }
    }
}
