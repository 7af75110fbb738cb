pub mod bulk;
pub mod cluster;
pub mod document;
pub mod search;
pub mod template;

pub use bulk::run_bulk;
pub use cluster::{run_health, run_info, run_ping, run_sniff};
pub use document::run_get;
pub use search::{run_search, SearchArgs};
pub use template::{run_template_delete, run_template_get, run_template_put};

use anyhow::Result;
use elastik::{ClientConfig, ElasticClient, ElasticResponse};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// A configured client plus output options shared by every command
pub struct Session {
    pub client: ElasticClient,
    pub verbose: bool,
}

impl Session {
    /// Config file (or defaults) and environment, with `nodes` taking precedence when given
    pub fn connect(config: Option<&Path>, nodes: &[String], verbose: bool) -> Result<Self> {
        let mut config = ClientConfig::load(config)?;
        if !nodes.is_empty() {
            config.nodes = nodes.to_vec();
        }
        debug!(nodes = ?config.nodes, "Connecting");

        let client = ElasticClient::new(config.into_settings()?)?;
        Ok(Self { client, verbose })
    }

    /// Body of a valid response; prints call details first in verbose mode
    pub fn body<R>(&self, response: ElasticResponse<R>) -> Result<R> {
        self.trace(&response);
        Ok(response.into_result()?)
    }

    pub fn trace<R>(&self, response: &ElasticResponse<R>) {
        if self.verbose {
            eprintln!("{}", response.debug_information());
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
