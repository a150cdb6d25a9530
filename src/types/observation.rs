//! Literature-derived observations.

use serde::Serialize;
use serde_json::{Map, Value};

/// Column names of the known observation fields, in output order.
pub const OBSERVATION_COLUMNS: [&str; 9] = [
    "resourceId",
    "resourceName",
    "resourceType",
    "observationText",
    "observationType",
    "observationPhase",
    "observationTime",
    "observationTimeUnits",
    "doi",
];

/// Key used to keep an `observationTime` value that is not numeric.
const RAW_TIME_KEY: &str = "observationTimeRaw";

/// A single structured factual claim about a resource.
///
/// Produced by the remote agent and only checked for structure. Every field
/// is optional because partial records are kept rather than rejected; keys
/// outside the schema survive in `extra`, in the order the agent sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub resource_id: Option<String>,
    pub resource_name: Option<String>,
    pub resource_type: Vec<String>,
    pub observation_text: Option<String>,
    pub observation_type: Vec<String>,
    pub observation_phase: Option<String>,
    pub observation_time: Option<f64>,
    pub observation_time_units: Option<String>,
    /// Source document identifier. Must come from retrieval metadata.
    pub doi: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Observation {
    /// Normalize one JSON object from an agent reply.
    pub fn from_record(record: Map<String, Value>) -> Self {
        let mut observation = Self::default();
        for (key, value) in record {
            match key.as_str() {
                "resourceId" => observation.resource_id = text(value),
                "resourceName" => observation.resource_name = text(value),
                "resourceType" => observation.resource_type = list(value),
                "observationText" => observation.observation_text = text(value),
                "observationType" => observation.observation_type = list(value),
                "observationPhase" => observation.observation_phase = text(value),
                "observationTime" => match time(&value) {
                    Ok(parsed) => observation.observation_time = parsed,
                    Err(()) => {
                        observation.extra.insert(RAW_TIME_KEY.to_string(), value);
                    }
                },
                "observationTimeUnits" => observation.observation_time_units = text(value),
                "doi" => observation.doi = text(value),
                _ => {
                    observation.extra.insert(key, value);
                }
            }
        }
        observation
    }

    /// Flatten into `(column, cell)` pairs: the known fields first, then the
    /// extra keys with nested objects expanded to dotted column names.
    pub fn to_columns(&self) -> Vec<(String, String)> {
        let known = [
            opt_cell(&self.resource_id),
            opt_cell(&self.resource_name),
            list_cell(&self.resource_type),
            opt_cell(&self.observation_text),
            list_cell(&self.observation_type),
            opt_cell(&self.observation_phase),
            self.observation_time.map(|t| t.to_string()).unwrap_or_default(),
            opt_cell(&self.observation_time_units),
            opt_cell(&self.doi),
        ];
        let mut columns: Vec<(String, String)> = OBSERVATION_COLUMNS
            .iter()
            .map(|name| name.to_string())
            .zip(known)
            .collect();
        for (key, value) in &self.extra {
            flatten(key, value, &mut columns);
        }
        columns
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    }
}

fn time(value: &Value) -> Result<Option<f64>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| ()),
        _ => Err(()),
    }
}

fn opt_cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn list_cell(values: &[String]) -> String {
    if values.is_empty() {
        return String::new();
    }
    Value::from(values.to_vec()).to_string()
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten(&format!("{prefix}.{key}"), nested, out);
            }
        }
        Value::Null => out.push((prefix.to_string(), String::new())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
