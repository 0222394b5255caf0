//! Template manifests
//!
//! Documents, DocumentData schemas and templates can be declared in TOML or
//! JSON files and installed into a [`BarbershopBuilder`] in one step.
//!
//! ```toml
//! [[documents]]
//! name = "TransactionalSmsDocument"
//! fields = [{ name = "sms_body" }]
//!
//! [[sources]]
//! name = "RecipientReceipt"
//! fields = [{ name = "sender" }, { name = "amount" }]
//!
//! [[templates]]
//! source = "RecipientReceipt"
//! targets = ["TransactionalSmsDocument"]
//! locale = "en-US"
//! [templates.fields]
//! sms_body = "{{sender}} sent you {{amount}}"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::barbershop::BarbershopBuilder;
use crate::error::{BarberError, Result};
use crate::locale::Locale;
use crate::schema::{SourceType, TargetType};
use crate::template::DocumentTemplate;

/// A template as written in a manifest, with its source referenced by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub source: String,
    pub targets: BTreeSet<String>,
    pub locale: Locale,
    /// Target field to template text. Absent fields are blank.
    #[serde(default)]
    pub fields: BTreeMap<String, Option<String>>,
}

/// Declarations loaded from one or more manifest files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub documents: Vec<TargetType>,
    #[serde(default)]
    pub sources: Vec<SourceType>,
    #[serde(default)]
    pub templates: Vec<TemplateEntry>,
}

impl Manifest {
    /// Parse a manifest from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a manifest from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Append the declarations of another manifest
    pub fn merge(&mut self, other: Manifest) {
        self.documents.extend(other.documents);
        self.sources.extend(other.sources);
        self.templates.extend(other.templates);
    }

    /// Resolve template sources by name and install everything.
    ///
    /// A template naming an undeclared source is rejected here; all other
    /// problems surface from `build()`.
    pub fn install(self, mut builder: BarbershopBuilder) -> Result<BarbershopBuilder> {
        let sources: BTreeMap<String, SourceType> = self
            .sources
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();

        for document in self.documents {
            builder = builder.install_document_type(document);
        }

        for entry in self.templates {
            let source = sources.get(&entry.source).cloned().ok_or_else(|| {
                BarberError::Manifest {
                    path: "[[templates]]".to_string(),
                    message: format!("DocumentData [{}] is not declared", entry.source),
                }
            })?;
            builder = builder.install_document_template(DocumentTemplate {
                fields: entry.fields,
                source,
                targets: entry.targets,
                locale: entry.locale,
            });
        }

        Ok(builder)
    }
}

/// Load a single `.toml` or `.json` manifest
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path)?;
    let manifest = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Manifest::from_toml(&content),
        Some("json") => Manifest::from_json(&content),
        _ => {
            return Err(BarberError::Manifest {
                path: path.display().to_string(),
                message: "expected a .toml or .json file".to_string(),
            })
        }
    };
    manifest.map_err(|e| BarberError::Manifest {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Load and merge every manifest under `dir`, in path order
pub fn load_directory(dir: &Path) -> Result<Manifest> {
    let mut paths: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| ext == "toml" || ext == "json")
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    let mut manifest = Manifest::default();
    for path in paths {
        tracing::debug!(path = %path.display(), "loading manifest");
        manifest.merge(load_manifest(&path)?);
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SMS: &str = r#"
[[documents]]
name = "Sms"
fields = [{ name = "sms_body" }]

[[sources]]
name = "Receipt"
fields = [{ name = "sender" }]

[[templates]]
source = "Receipt"
targets = ["Sms"]
locale = "en-US"
[templates.fields]
sms_body = "{{sender}} paid you"
"#;

    #[test]
    fn test_parse_toml() {
        let manifest = Manifest::from_toml(SMS).unwrap();
        assert_eq!(manifest.documents.len(), 1);
        assert_eq!(manifest.templates[0].locale, Locale::default());
    }

    #[test]
    fn test_install_unknown_source() {
        let mut manifest = Manifest::from_toml(SMS).unwrap();
        manifest.sources.clear();
        let err = manifest.install(BarbershopBuilder::new()).err().unwrap();
        assert!(matches!(err, BarberError::Manifest { .. }));
    }

    #[test]
    fn test_load_directory_merges() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("sms.toml"), SMS).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("nested/email.json"),
            r#"{ "documents": [{ "name": "Email", "fields": [{ "name": "subject" }] }] }"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let manifest = load_directory(dir.path()).unwrap();
        let names: Vec<_> = manifest.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Email", "Sms"]);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("templates.yaml");
        fs::write(&path, "").unwrap();
        assert!(load_manifest(&path).is_err());
    }

    #[test]
    fn test_template_without_targets_fails_build() {
        let manifest = Manifest::from_toml(&SMS.replace(r#"targets = ["Sms"]"#, "targets = []")).unwrap();
        let err = manifest
            .install(BarbershopBuilder::new())
            .unwrap()
            .build()
            .unwrap_err();
        assert_eq!(
            err.report().unwrap().messages(),
            ["DocumentTemplate with source=[Receipt] locale=en-US does not declare any target Document"]
        );
    }
}
