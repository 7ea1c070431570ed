// Legal template catalog
//
// A fixed set of agreement templates shipped as PDF files in one directory.
// Catalog entries whose file is missing are reported as unavailable rather
// than treated as errors.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::errors::{AssistantError, AssistantResult};

/// Display name -> file name
pub const LEGAL_TEMPLATES: [(&str, &str); 9] = [
    ("Rental Agreement", "rental_agreement_template.pdf"),
    ("Loan Agreement", "loan-agreement-template.pdf"),
    ("Employment Agreement", "employment_agreement_template.pdf"),
    ("Business Agreement", "partnership_agreement_template.pdf"),
    ("Freelancer Agreement", "freelancer_contract_template.pdf"),
    ("Invoice Agreement", "invoice_template.pdf"),
    ("Lease Agreement", "lease_agreement_template.pdf"),
    ("Service Agreement", "service_agreement_template.pdf"),
    ("Non-Disclosure Agreement", "nda_template.pdf"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    pub name: &'static str,
    pub file_name: &'static str,
    pub available: bool,
}

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    dir: PathBuf,
}

impl TemplateCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every catalog entry with its availability
    pub fn entries(&self) -> Vec<TemplateEntry> {
        LEGAL_TEMPLATES
            .iter()
            .map(|&(name, file_name)| TemplateEntry {
                name,
                file_name,
                available: self.dir.join(file_name).is_file(),
            })
            .collect()
    }

    /// Catalog entries whose file exists
    pub fn list_available(&self) -> Vec<TemplateEntry> {
        self.entries().into_iter().filter(|e| e.available).collect()
    }

    /// Path of the template called `name` (case-insensitive)
    pub fn resolve(&self, name: &str) -> AssistantResult<PathBuf> {
        let wanted = name.trim();
        let (label, file_name) = LEGAL_TEMPLATES
            .iter()
            .copied()
            .find(|(n, _)| n.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AssistantError::TemplateNotFound(wanted.to_string()))?;

        let path = self.dir.join(file_name);
        if path.is_file() {
            Ok(path)
        } else {
            tracing::warn!(template = label, path = %path.display(), "template file missing");
            Err(AssistantError::TemplateNotFound(label.to_string()))
        }
    }

    /// File names of every PDF in the templates directory, sorted
    pub fn pdf_documents(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %self.dir.display(), "cannot read templates dir: {}", e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".pdf"))
            .collect();
        names.sort();
        names
    }

    /// Path of a document listed by [`TemplateCatalog::pdf_documents`].
    ///
    /// Rejects anything that is not a bare `.pdf` file name in the directory.
    pub fn document_path(&self, file_name: &str) -> AssistantResult<PathBuf> {
        let is_bare = Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name);
        if !is_bare || !file_name.ends_with(".pdf") {
            return Err(AssistantError::InvalidRequest(format!(
                "'{}' is not a document name",
                file_name
            )));
        }

        let path = self.dir.join(file_name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(AssistantError::TemplateNotFound(file_name.to_string()))
        }
    }
}
