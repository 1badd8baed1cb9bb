//! Test uninstall validators.

use std::collections::BTreeSet;

use ext_extensions::{UninstallValidator, UninstallVeto, ValidationContext};

/// Vetoes modules that still own stored content.
#[derive(Debug, Clone, Default)]
pub struct StoredContentValidator {
    with_content: BTreeSet<String>,
}

impl StoredContentValidator {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            with_content: modules.into_iter().map(Into::into).collect(),
        }
    }
}

impl UninstallValidator for StoredContentValidator {
    fn name(&self) -> &str {
        "content"
    }

    fn validate(&self, candidates: &[String], _ctx: &ValidationContext<'_>) -> Vec<UninstallVeto> {
        candidates
            .iter()
            .filter(|c| self.with_content.contains(*c))
            .map(|c| {
                UninstallVeto::new(
                    c,
                    format!("There is content for the entity type: {c}"),
                    self.name(),
                )
            })
            .collect()
    }
}
