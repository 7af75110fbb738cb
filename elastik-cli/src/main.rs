//! elastik command line tool
//!
//! Talks to an Elasticsearch cluster through the elastik client, so every
//! command gets node pooling, retries and sniffing from the config file.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::Session;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "elastik")]
#[command(about = "Inspect and feed an Elasticsearch cluster")]
#[command(version)]
struct Cli {
    /// Client config file (TOML)
    #[arg(short, long, global = true, env = "ELASTIK_CONFIG")]
    config: Option<PathBuf>,

    /// Node url, repeat for several nodes; replaces the configured nodes
    #[arg(short, long, global = true)]
    node: Vec<String>,

    /// Print request and response details of every call to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show name and version of the node answering
    Info,

    /// Check that the cluster answers at all
    Ping,

    /// Show cluster health
    Health {
        /// Limit health to these indices (comma separated)
        #[arg(short, long)]
        index: Option<String>,

        /// Wait until the cluster reaches this status (green, yellow, red)
        #[arg(long)]
        wait_for_status: Option<String>,

        /// Detail level (cluster, indices, shards)
        #[arg(long)]
        level: Option<String>,
    },

    /// Manage index templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Search documents
    Search {
        /// Indices to search (comma separated), all when omitted
        #[arg(short, long)]
        index: Option<String>,

        /// Document type to search
        #[arg(short = 't', long = "type")]
        doc_type: Option<String>,

        /// Match query as field=text; match_all when omitted
        #[arg(short, long)]
        query: Option<String>,

        /// Number of hits to return
        #[arg(short, long, default_value = "10")]
        size: u64,

        /// Offset of the first hit
        #[arg(long)]
        from: Option<u64>,
    },

    /// Fetch a document by id
    Get {
        /// Document id
        id: String,

        /// Index holding the document
        #[arg(short, long)]
        index: String,

        /// Document type
        #[arg(short = 't', long = "type", default_value = "_doc")]
        doc_type: String,
    },

    /// Send a newline delimited bulk file
    Bulk {
        /// File with action and source lines
        #[arg(short, long)]
        file: PathBuf,

        /// Default index for actions that name none
        #[arg(short, long)]
        index: Option<String>,
    },

    /// List the nodes the cluster reports
    Sniff,
}

#[derive(Subcommand)]
enum TemplateAction {
    /// Show one template, or all of them
    Get {
        name: Option<String>,

        /// Read from the local node instead of the master
        #[arg(long)]
        local: bool,
    },

    /// Create or replace a template from a JSON file
    Put {
        name: String,

        /// Template body (index_patterns, order, version, settings, mappings, aliases)
        #[arg(short, long)]
        file: PathBuf,

        /// Fail if the template already exists
        #[arg(long)]
        create: bool,
    },

    /// Delete a template
    Delete { name: String },
}

fn init_tracing() {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let session = Session::connect(cli.config.as_deref(), &cli.node, cli.verbose)?;

    match cli.command {
        Commands::Info => commands::run_info(&session).await,
        Commands::Ping => commands::run_ping(&session).await,
        Commands::Health {
            index,
            wait_for_status,
            level,
        } => commands::run_health(&session, index, wait_for_status, level).await,
        Commands::Template { action } => match action {
            TemplateAction::Get { name, local } => commands::run_template_get(&session, name, local).await,
            TemplateAction::Put { name, file, create } => {
                commands::run_template_put(&session, &name, &file, create).await
            }
            TemplateAction::Delete { name } => commands::run_template_delete(&session, &name).await,
        },
        Commands::Search {
            index,
            doc_type,
            query,
            size,
            from,
        } => {
            commands::run_search(
                &session,
                commands::SearchArgs {
                    index,
                    doc_type,
                    query,
                    size,
                    from,
                },
            )
            .await
        }
        Commands::Get { id, index, doc_type } => commands::run_get(&session, &index, &doc_type, &id).await,
        Commands::Bulk { file, index } => commands::run_bulk(&session, &file, index.as_deref()).await,
        Commands::Sniff => commands::run_sniff(&session).await,
    }
}
