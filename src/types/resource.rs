//! Registry resources.

use serde::{Deserialize, Serialize};

/// A catalogued research resource (animal model, cell line, ...).
///
/// Immutable for the duration of an extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Opaque, stable registry identifier (an etag-like string).
    pub resource_id: String,
    /// Display name. Not guaranteed unique.
    pub resource_name: String,
    /// One of the registry's controlled types, e.g. "Animal Model".
    pub resource_type: String,
    /// External research resource identifier, when the registry has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rrid: Option<String>,
    /// Free-text alternate names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<String>,
}

impl Resource {
    pub fn new(
        resource_id: impl Into<String>,
        resource_name: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            resource_name: resource_name.into(),
            resource_type: resource_type.into(),
            rrid: None,
            synonyms: None,
        }
    }

    pub fn with_rrid(mut self, rrid: impl Into<String>) -> Self {
        self.rrid = present(rrid.into());
        self
    }

    pub fn with_synonyms(mut self, synonyms: impl Into<String>) -> Self {
        self.synonyms = present(synonyms.into());
        self
    }
}

/// Registry exports use empty cells and `nan` for missing values.
pub(crate) fn present(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_markers_become_none() {
        let resource = Resource::new("id-1", "NF90-8", "Cell Line")
            .with_rrid("nan")
            .with_synonyms("  ");
        assert_eq!(resource.rrid, None);
        assert_eq!(resource.synonyms, None);
    }

    #[test]
    fn real_values_are_trimmed_and_kept() {
        let resource = Resource::new("id-1", "HCT 116", "Cell Line").with_rrid(" CVCL_0291 ");
        assert_eq!(resource.rrid.as_deref(), Some("CVCL_0291"));
    }
}
