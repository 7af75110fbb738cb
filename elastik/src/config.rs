//! File based client configuration
//!
//! A TOML file deserialized into [`ClientConfig`], optionally overridden by
//! `ELASTIK_*` environment variables, then turned into
//! [`ConnectionSettings`].
//!
//! ```toml
//! nodes = ["http://es1:9200", "http://es2:9200"]
//! pool = "sniffing"
//! default_index = "project"
//!
//! [sniff]
//! lifespan_secs = 300
//!
//! [mappings.Developer]
//! index_name = "devs"
//! ```

use crate::error::{ElasticError, Result};
use crate::settings::{ConnectionSettings, DocumentMapping, PoolKind, DEFAULT_NODE};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const ENV_NODES: &str = "ELASTIK_NODES";
pub const ENV_DEFAULT_INDEX: &str = "ELASTIK_DEFAULT_INDEX";
pub const ENV_USERNAME: &str = "ELASTIK_USERNAME";
pub const ENV_PASSWORD: &str = "ELASTIK_PASSWORD";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_nodes")]
    pub nodes: Vec<String>,
    /// Defaults to `static` for several nodes, `single_node` otherwise
    #[serde(default)]
    pub pool: Option<PoolKind>,
    #[serde(default)]
    pub default_index: Option<String>,
    #[serde(default)]
    pub default_type_name: Option<String>,
    /// Keyed by document type name
    #[serde(default)]
    pub mappings: HashMap<String, DocumentMapping>,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,
    #[serde(default = "default_dead_timeout_ms")]
    pub dead_timeout_ms: u64,
    #[serde(default = "default_max_dead_timeout_ms")]
    pub max_dead_timeout_ms: u64,
    #[serde(default)]
    pub max_retries: Option<usize>,
    #[serde(default)]
    pub max_retry_timeout_ms: Option<u64>,

    #[serde(default)]
    pub sniff: SniffConfig,
    #[serde(default)]
    pub disable_pings: bool,
    #[serde(default)]
    pub disable_direct_streaming: bool,
    #[serde(default)]
    pub pretty_json: bool,
    #[serde(default)]
    pub throw_exceptions: bool,

    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Added to every request
    #[serde(default)]
    pub query_string: BTreeMap<String, String>,
}

fn default_nodes() -> Vec<String> {
    vec![DEFAULT_NODE.to_string()]
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_ping_timeout_ms() -> u64 {
    2_000
}

fn default_dead_timeout_ms() -> u64 {
    60_000
}

fn default_max_dead_timeout_ms() -> u64 {
    30 * 60 * 1000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            pool: None,
            default_index: None,
            default_type_name: None,
            mappings: HashMap::new(),
            request_timeout_ms: default_request_timeout_ms(),
            ping_timeout_ms: default_ping_timeout_ms(),
            dead_timeout_ms: default_dead_timeout_ms(),
            max_dead_timeout_ms: default_max_dead_timeout_ms(),
            max_retries: None,
            max_retry_timeout_ms: None,
            sniff: SniffConfig::default(),
            disable_pings: false,
            disable_direct_streaming: false,
            pretty_json: false,
            throw_exceptions: false,
            auth: AuthConfig::default(),
            headers: BTreeMap::new(),
            query_string: BTreeMap::new(),
        }
    }
}

/// Unset flags follow the pool: sniffing pools sniff on startup and on fault
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SniffConfig {
    #[serde(default)]
    pub on_startup: Option<bool>,
    #[serde(default)]
    pub on_connection_fault: Option<bool>,
    /// Re-sniff once the node list is older than this
    #[serde(default)]
    pub lifespan_secs: Option<u64>,
    #[serde(default = "default_sniff_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_sniff_timeout_ms() -> u64 {
    2_000
}

impl Default for SniffConfig {
    fn default() -> Self {
        Self {
            on_startup: None,
            on_connection_fault: None,
            lifespan_secs: None,
            timeout_ms: default_sniff_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Already encoded `id:key`
    pub api_key: Option<String>,
    pub api_key_id: Option<String>,
    pub api_key_secret: Option<String>,
}

impl AuthConfig {
    /// Encoded api key, from `api_key` or the id and secret pair
    pub fn encoded_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            return Some(key.clone());
        }
        let (id, secret) = (self.api_key_id.as_ref()?, self.api_key_secret.as_ref()?);
        Some(base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", id, secret)))
    }
}

impl ClientConfig {
    /// Read a TOML file; the file must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        debug!(path = %path.display(), nodes = config.nodes.len(), "Loaded client config");
        Ok(config)
    }

    /// File when given, defaults otherwise, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `ELASTIK_*` overrides from any source
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(nodes) = lookup(ENV_NODES) {
            let nodes: Vec<String> = nodes
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
            if !nodes.is_empty() {
                self.nodes = nodes;
            }
        }
        if let Some(index) = lookup(ENV_DEFAULT_INDEX) {
            self.default_index = Some(index);
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.auth.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.auth.password = Some(password);
        }
    }

    pub fn into_settings(self) -> Result<ConnectionSettings> {
        let nodes = self
            .nodes
            .iter()
            .map(|n| Url::parse(n).map_err(|e| ElasticError::Config(format!("invalid node url {}: {}", n, e))))
            .collect::<Result<Vec<Url>>>()?;
        if nodes.is_empty() {
            return Err(ElasticError::Config("at least one node is required".to_string()));
        }

        let pool = self.pool.unwrap_or(if nodes.len() > 1 {
            PoolKind::Static
        } else {
            PoolKind::SingleNode
        });
        let mut settings = ConnectionSettings::with_pool(pool, nodes)
            .request_timeout(Duration::from_millis(self.request_timeout_ms))
            .ping_timeout(Duration::from_millis(self.ping_timeout_ms))
            .dead_timeout(Duration::from_millis(self.dead_timeout_ms))
            .max_dead_timeout(Duration::from_millis(self.max_dead_timeout_ms));

        settings.default_index = self.default_index;
        settings.default_type_name = self.default_type_name;
        settings.mappings = self.mappings;
        settings.max_retries = self.max_retries;
        settings.max_retry_timeout = self.max_retry_timeout_ms.map(Duration::from_millis);

        if let Some(on_startup) = self.sniff.on_startup {
            settings.sniff_on_startup = on_startup;
        }
        if let Some(on_fault) = self.sniff.on_connection_fault {
            settings.sniff_on_connection_fault = on_fault;
        }
        settings.sniff_lifespan = self.sniff.lifespan_secs.map(Duration::from_secs);
        settings.sniff_timeout = Duration::from_millis(self.sniff.timeout_ms);

        settings.disable_pings = self.disable_pings;
        settings.disable_direct_streaming = self.disable_direct_streaming;
        settings.pretty_json = self.pretty_json;
        settings.throw_exceptions = self.throw_exceptions;

        settings.api_key = self.auth.encoded_api_key();
        settings.basic_auth = match (self.auth.username, self.auth.password) {
            (Some(username), password) => Some((username, password.unwrap_or_default())),
            (None, _) => None,
        };
        settings.headers = self.headers.into_iter().collect();
        settings.query_string = self.query_string;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_convert_to_single_node() {
        let settings = ClientConfig::default().into_settings().unwrap();
        assert_eq!(settings.pool, PoolKind::SingleNode);
        assert_eq!(settings.nodes.len(), 1);
        assert_eq!(settings.request_timeout, Duration::from_secs(60));
        assert!(!settings.sniff_on_startup);
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
nodes = ["http://es1:9200", "http://es2:9200"]
pool = "sniffing"
default_index = "project"
max_retries = 2

[sniff]
on_startup = false
lifespan_secs = 300

[auth]
api_key_id = "id"
api_key_secret = "secret"

[mappings.Developer]
index_name = "devs"
"#
        )
        .unwrap();

        let settings = ClientConfig::load_from(file.path()).unwrap().into_settings().unwrap();
        assert_eq!(settings.pool, PoolKind::Sniffing);
        assert_eq!(settings.nodes.len(), 2);
        assert!(!settings.sniff_on_startup);
        assert!(settings.sniff_on_connection_fault);
        assert_eq!(settings.sniff_lifespan, Some(Duration::from_secs(300)));
        assert_eq!(settings.max_retries, Some(2));
        assert_eq!(settings.api_key.as_deref(), Some("aWQ6c2VjcmV0"));
        assert_eq!(
            settings.mapping_for("Developer").and_then(|m| m.index_name.as_deref()),
            Some("devs")
        );
    }

    #[test]
    fn test_several_nodes_default_to_static_pool() {
        let config = ClientConfig {
            nodes: vec!["http://a:9200".to_string(), "http://b:9200".to_string()],
            ..Default::default()
        };
        assert_eq!(config.into_settings().unwrap().pool, PoolKind::Static);
    }

    #[test]
    fn test_overrides() {
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| match key {
            ENV_NODES => Some("http://x:9200, http://y:9200".to_string()),
            ENV_DEFAULT_INDEX => Some("devs".to_string()),
            ENV_USERNAME => Some("elastic".to_string()),
            _ => None,
        });
        assert_eq!(config.nodes, vec!["http://x:9200", "http://y:9200"]);

        let settings = config.into_settings().unwrap();
        assert_eq!(settings.default_index.as_deref(), Some("devs"));
        assert_eq!(settings.basic_auth, Some(("elastic".to_string(), String::new())));
    }

    #[test]
    fn test_invalid_node_is_a_config_error() {
        let config = ClientConfig {
            nodes: vec!["not a url".to_string()],
            ..Default::default()
        };
        assert_eq!(config.into_settings().unwrap_err().error_type(), "config");

        let empty = ClientConfig {
            nodes: Vec::new(),
            ..Default::default()
        };
        assert!(empty.into_settings().is_err());
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(&dir.path().join("missing.toml")).unwrap_err();
        assert_eq!(err.error_type(), "io");
    }
}
