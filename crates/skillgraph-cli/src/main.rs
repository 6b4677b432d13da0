mod serve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use tracing_subscriber::EnvFilter;

use skillgraph_core::config::DEFAULT_PAGE_SIZE;
use skillgraph_core::{Config, Draft, FileStore, NodeFilter, NodeType, Vault};

const CONFIG_FILE: &str = "skillgraph.toml";

#[derive(Parser)]
#[command(name = "skillgraph")]
#[command(about = "Markdown-backed personal knowledge graph", long_about = None)]
struct Cli {
    /// Config file to use instead of the default search path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vault directory, overriding the configured one
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Scan the vault and report node and edge counts
    Scan,
    /// Print vault statistics as JSON
    Stats,
    /// Search titles, content and tags
    Search {
        /// Text to look for
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(long = "type")]
        node_type: Option<NodeType>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,
    },
    /// Suggest connections for a draft node
    Suggest {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        domain: String,
        /// May be repeated
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Show recently updated nodes
    Changelog {
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,
    },
    /// Write a default skillgraph.toml in the current directory
    Init,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(root) = cli.vault {
        config.vault.root = root;
    }

    match cli.command {
        Commands::Serve { port, bind } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            serve::start_server(config).await?;
        }
        Commands::Scan => {
            let vault = open_vault(&config)?;
            let index = vault.index();
            println!(
                "Scanned {}: {} nodes, {} edges",
                config.vault.root.display(),
                index.len(),
                index.edges().len()
            );
        }
        Commands::Stats => {
            let vault = open_vault(&config)?;
            let stats = vault.index().stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Search {
            query,
            node_type,
            domain,
            status,
            limit,
        } => {
            let vault = open_vault(&config)?;
            let filter = NodeFilter {
                node_type,
                domain,
                status,
                confidence: None,
            };
            let query = query.join(" ");
            let results = vault.index().search(&query, &filter);

            if results.is_empty() {
                println!("No nodes match \"{}\".", query);
            }
            for node in results.iter().take(limit) {
                println!(
                    "{:<40} [{}] {} ({})",
                    node.meta.id, node.meta.node_type, node.meta.title, node.file_path
                );
            }
        }
        Commands::Suggest {
            title,
            domain,
            tags,
            content,
        } => {
            let vault = open_vault(&config)?;
            let draft = Draft {
                title,
                domain,
                tags,
                content,
            };
            let suggestions = vault.suggest(&draft);

            if suggestions.is_empty() {
                println!("No connection suggestions.");
            }
            for s in &suggestions {
                println!(
                    "{:>3}  {:<40} {} ({})",
                    s.score, s.id, s.suggested_edge, s.title
                );
            }
        }
        Commands::Changelog { limit } => {
            let vault = open_vault(&config)?;
            for node in vault.index().changelog(limit) {
                println!(
                    "{}  {:<40} [{}] {}",
                    node.meta.updated, node.meta.id, node.meta.node_type, node.meta.title
                );
            }
        }
        Commands::Init => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                bail!("{} already exists", CONFIG_FILE);
            }
            std::fs::write(path, Config::default_config_string())
                .wrap_err_with(|| format!("failed to write {}", CONFIG_FILE))?;
            println!("Wrote {}", CONFIG_FILE);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("skillgraph=info,skillgraph_core=info,tower_http=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> color_eyre::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().wrap_err("failed to load config")?,
    };
    Ok(config)
}

fn open_vault(config: &Config) -> color_eyre::Result<Vault<FileStore>> {
    let vault = Vault::open(config.vault.clone())
        .wrap_err_with(|| format!("failed to open vault at {}", config.vault.root.display()))?
        .with_suggest_config(config.suggest.clone());
    Ok(vault)
}
