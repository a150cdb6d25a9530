//! Registry sources of candidate resources.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HarvestError, Result};
use crate::types::resource::present;
use crate::types::Resource;

/// Supplies the resources to process, in registry order.
pub trait ResourceSource: Send + Sync {
    fn load(&self) -> Result<Vec<Resource>>;
}

/// A CSV export of the registry table.
///
/// Columns are matched by header name (`resourceId`, `resourceName`,
/// `resourceType`, `rrid`, `synonyms`); any other columns are ignored.
#[derive(Debug, Clone)]
pub struct CsvRegistry {
    path: PathBuf,
    resource_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryRow {
    resource_id: Option<String>,
    resource_name: Option<String>,
    resource_type: Option<String>,
    rrid: Option<String>,
    synonyms: Option<String>,
}

impl CsvRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            resource_types: Vec::new(),
        }
    }

    /// Keep only rows of these types. Empty keeps everything.
    pub fn with_resource_types(mut self, resource_types: Vec<String>) -> Self {
        self.resource_types = resource_types;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse registry rows from any reader.
    pub fn parse<R: Read>(reader: R, resource_types: &[String]) -> Result<Vec<Resource>> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut resources = Vec::new();

        for (index, row) in reader.deserialize::<RegistryRow>().enumerate() {
            let row = row?;
            let resource_type = row.resource_type.unwrap_or_default();
            if !resource_types.is_empty() && !resource_types.iter().any(|t| t == &resource_type) {
                continue;
            }
            let Some(resource_id) = row.resource_id.and_then(present) else {
                return Err(HarvestError::Registry(format!(
                    "row {} has no resourceId",
                    index + 1
                )));
            };
            let mut resource = Resource::new(
                resource_id,
                row.resource_name.unwrap_or_default(),
                resource_type,
            );
            resource.rrid = row.rrid.and_then(present);
            resource.synonyms = row.synonyms.and_then(present);
            resources.push(resource);
        }

        Ok(resources)
    }
}

impl ResourceSource for CsvRegistry {
    fn load(&self) -> Result<Vec<Resource>> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            HarvestError::Registry(format!("cannot open {}: {e}", self.path.display()))
        })?;
        Self::parse(file, &self.resource_types)
    }
}

/// An in-memory source, handy for single resources and tests.
impl ResourceSource for Vec<Resource> {
    fn load(&self) -> Result<Vec<Resource>> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXPORT: &str = "\
resourceId,resourceName,resourceType,rrid,synonyms,extra
a1,NF1OPG,Animal Model,nan,,x
c1,NF90-8,Cell Line,CVCL_1B47,NF 90-8,y
g1,Some Antibody,Antibody,,,z
";

    fn types() -> Vec<String> {
        vec!["Animal Model".to_string(), "Cell Line".to_string()]
    }

    #[test]
    fn filters_types_and_normalizes_missing_values() {
        let resources = CsvRegistry::parse(EXPORT.as_bytes(), &types()).unwrap();
        assert_eq!(
            resources,
            vec![
                Resource::new("a1", "NF1OPG", "Animal Model"),
                Resource::new("c1", "NF90-8", "Cell Line")
                    .with_rrid("CVCL_1B47")
                    .with_synonyms("NF 90-8"),
            ]
        );
    }

    #[test]
    fn empty_type_filter_keeps_everything() {
        let resources = CsvRegistry::parse(EXPORT.as_bytes(), &[]).unwrap();
        assert_eq!(resources.len(), 3);
    }

    #[test]
    fn missing_id_is_a_registry_error() {
        let export = "resourceId,resourceName,resourceType\n,NF1OPG,Animal Model\n";
        let err = CsvRegistry::parse(export.as_bytes(), &types()).unwrap_err();
        assert!(matches!(err, HarvestError::Registry(_)));
    }

    #[test]
    fn missing_file_is_a_registry_error() {
        let registry = CsvRegistry::new("/definitely/not/here.csv");
        assert!(matches!(registry.load(), Err(HarvestError::Registry(_))));
    }
}
