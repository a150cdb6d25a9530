//! Configuration system (layered: defaults < config file < env < CLI flags).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};
use crate::provider::knowledge_base::DEFAULT_RESULT_LIMIT;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MAX_TURNS: usize = 100;
const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_OUTPUT_DIR: &str = "observations";
const DEFAULT_RESOURCE_TYPES: [&str; 2] = ["Animal Model", "Cell Line"];

const CONFIG_PATH_ENV: &str = "KBHARVEST_CONFIG";

/// Settings for one harvesting process.
///
/// Built explicitly and passed to the clients that need it; there is no
/// process-wide instance.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarvestConfig {
    /// Region of the foundation model used by retrieve-and-generate.
    pub region: String,
    /// Base URL of the HTTPS gateway in front of the agent runtime and the
    /// knowledge base. Required; there is no default host.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
    pub agent_alias_id: Option<String>,
    pub knowledge_base_id: Option<String>,
    /// Foundation model answering retrieve-and-generate queries.
    pub model_id: String,
    pub enable_trace: bool,
    /// Hard ceiling on turns per resource, turn 0 included.
    pub max_turns: usize,
    /// Number of knowledge-base results per retrieval.
    pub result_limit: u32,
    pub timeout_secs: u64,
    pub output_dir: PathBuf,
    pub resource_types: Vec<String>,
    pub registry_path: Option<PathBuf>,
}

impl fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("agent_id", &self.agent_id)
            .field("agent_alias_id", &self.agent_alias_id)
            .field("knowledge_base_id", &self.knowledge_base_id)
            .field("model_id", &self.model_id)
            .field("enable_trace", &self.enable_trace)
            .field("max_turns", &self.max_turns)
            .field("result_limit", &self.result_limit)
            .field("timeout_secs", &self.timeout_secs)
            .field("output_dir", &self.output_dir)
            .field("resource_types", &self.resource_types)
            .field("registry_path", &self.registry_path)
            .finish()
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            api_key: None,
            agent_id: None,
            agent_alias_id: None,
            knowledge_base_id: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            enable_trace: false,
            max_turns: DEFAULT_MAX_TURNS,
            result_limit: DEFAULT_RESULT_LIMIT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            resource_types: DEFAULT_RESOURCE_TYPES.iter().map(|t| t.to_string()).collect(),
            registry_path: None,
        }
    }
}

impl HarvestConfig {
    /// Read a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| HarvestError::Configuration(format!("{}: {e}", path.display())))
    }

    /// Resolve the full layered configuration.
    ///
    /// The file is `path` if given, else `$KBHARVEST_CONFIG`, else
    /// `~/.kbharvest/config.toml` when it exists. Environment variables
    /// (after loading `.env`) override the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("KBHARVEST_REGION") {
            self.region = v;
        }
        if let Some(v) = var("KBHARVEST_ENDPOINT") {
            self.endpoint = Some(v);
        }
        if let Some(v) = var("KBHARVEST_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = var("KBHARVEST_AGENT_ID") {
            self.agent_id = Some(v);
        }
        if let Some(v) = var("KBHARVEST_AGENT_ALIAS_ID") {
            self.agent_alias_id = Some(v);
        }
        if let Some(v) = var("KBHARVEST_KNOWLEDGE_BASE_ID") {
            self.knowledge_base_id = Some(v);
        }
        if let Some(v) = var("KBHARVEST_MODEL_ID") {
            self.model_id = v;
        }
        if let Some(v) = var("KBHARVEST_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = var("KBHARVEST_REGISTRY") {
            self.registry_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("KBHARVEST_MAX_TURNS") {
            self.max_turns = parse_number("KBHARVEST_MAX_TURNS", &v)?;
        }
        if let Some(v) = var("KBHARVEST_TIMEOUT_SECS") {
            self.timeout_secs = parse_number("KBHARVEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = var("KBHARVEST_ENABLE_TRACE") {
            self.enable_trace = matches!(v.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Gateway base URL, without a trailing slash.
    pub fn endpoint(&self) -> Result<String> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(|e| e.trim_end_matches('/').to_string())
            .ok_or_else(|| HarvestError::Configuration("Missing KBHARVEST_ENDPOINT".into()))
    }

    /// Foundation-model ARN for `model_id` in `region`.
    pub fn model_arn(&self) -> String {
        format!(
            "arn:aws:bedrock:{}::foundation-model/{}",
            self.region, self.model_id
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check everything the extraction loop needs is present.
    pub fn validate_for_agent(&self) -> Result<()> {
        self.endpoint()?;
        if self.agent_id.is_none() {
            return Err(HarvestError::Configuration("Missing KBHARVEST_AGENT_ID".into()));
        }
        if self.agent_alias_id.is_none() {
            return Err(HarvestError::Configuration(
                "Missing KBHARVEST_AGENT_ALIAS_ID".into(),
            ));
        }
        if self.max_turns == 0 {
            return Err(HarvestError::Configuration(
                "max_turns must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn validate_for_retrieval(&self) -> Result<()> {
        self.endpoint()?;
        if self.knowledge_base_id.is_none() {
            return Err(HarvestError::Configuration(
                "Missing KBHARVEST_KNOWLEDGE_BASE_ID".into(),
            ));
        }
        if self.result_limit == 0 {
            return Err(HarvestError::Configuration(
                "result_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| HarvestError::Configuration(format!("{key} is not a number: {value}")))
}

fn default_config_path() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().join(".kbharvest").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_batch_contract() {
        let config = HarvestConfig::default();
        assert_eq!(config.max_turns, 100);
        assert_eq!(config.result_limit, 50);
        assert_eq!(config.resource_types, vec!["Animal Model", "Cell Line"]);
        assert_eq!(
            config.model_arn(),
            "arn:aws:bedrock:us-east-1::foundation-model/anthropic.claude-3-sonnet-20240229-v1:0"
        );
    }

    #[test]
    fn env_overrides_and_ignores_blank_values() {
        let mut config = HarvestConfig::default();
        config
            .apply_env(lookup(&[
                ("KBHARVEST_AGENT_ID", "RMYQ6X4RLO"),
                ("KBHARVEST_AGENT_ALIAS_ID", " "),
                ("KBHARVEST_MAX_TURNS", "5"),
                ("KBHARVEST_ENDPOINT", "http://localhost:9000/"),
            ]))
            .unwrap();
        assert_eq!(config.agent_id.as_deref(), Some("RMYQ6X4RLO"));
        assert_eq!(config.agent_alias_id, None);
        assert_eq!(config.max_turns, 5);
        assert_eq!(config.endpoint().unwrap(), "http://localhost:9000");
    }

    #[test]
    fn bad_number_is_a_configuration_error() {
        let mut config = HarvestConfig::default();
        let err = config
            .apply_env(lookup(&[("KBHARVEST_MAX_TURNS", "many")]))
            .unwrap_err();
        assert!(matches!(err, HarvestError::Configuration(_)));
    }

    #[test]
    fn validate_for_agent_requires_endpoint_ids_and_turns() {
        let mut config = HarvestConfig::default();
        assert!(config.validate_for_agent().is_err());
        config.endpoint = Some("https://gateway.internal".into());
        assert!(config.validate_for_agent().is_err());
        config.agent_id = Some("agent".into());
        config.agent_alias_id = Some("alias".into());
        assert!(config.validate_for_agent().is_ok());
        config.max_turns = 0;
        assert!(config.validate_for_agent().is_err());
    }

    #[test]
    fn missing_or_blank_endpoint_is_a_configuration_error() {
        let mut config = HarvestConfig {
            agent_id: Some("agent".into()),
            agent_alias_id: Some("alias".into()),
            knowledge_base_id: Some("kb".into()),
            ..HarvestConfig::default()
        };
        assert!(matches!(config.endpoint(), Err(HarvestError::Configuration(_))));
        assert!(config.validate_for_agent().is_err());
        assert!(config.validate_for_retrieval().is_err());

        config.endpoint = Some("  ".into());
        assert!(config.endpoint().is_err());
    }

    #[test]
    fn debug_hides_api_key() {
        let config = HarvestConfig {
            api_key: Some("secret-key".into()),
            ..HarvestConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
    }
}
