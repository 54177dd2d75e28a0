//! DBpedia Indexer CLI
//!
//! Usage:
//!   dbpedia-indexer [--config config/indexer.yaml] <command>
//!
//! Examples:
//!   # Build and index every identifier of a list
//!   dbpedia-indexer run --action build --input uris_nl.txt
//!
//!   # Resume an OCR refresh at line 250000
//!   dbpedia-indexer run --action ocr --input uris_en.txt --start 250000
//!
//!   # Show the document of one identifier without indexing it
//!   dbpedia-indexer lookup --uri http://nl.dbpedia.org/resource/Albert_Einstein
//!
//!   # List candidate identifiers of the secondary edition
//!   dbpedia-indexer list --edition secondary --output uris_nl.txt
//!
//!   # Remove documents that dropped out of a list
//!   dbpedia-indexer delete-stale --new uris_nl.txt --old uris_nl_old.txt

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use dbpedia_indexer::batch::{delete_stale, Action, BatchLoader, LineRange};
use dbpedia_indexer::listing::list_uris;
use dbpedia_indexer::uri::EditionRole;
use dbpedia_indexer::{IndexerConfig, Pipeline, Services, Updater};

/// Build and maintain a Solr index of DBpedia entities
#[derive(Parser, Debug)]
#[command(name = "dbpedia-indexer", version)]
struct Cli {
    /// YAML configuration file
    #[arg(long, env = "INDEXER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build or update the document of every identifier in a file
    Run {
        /// `build` or an update operation (ocr, topics, last-part, ...)
        #[arg(long)]
        action: Action,
        /// One identifier per line (first whitespace-separated token)
        #[arg(long)]
        input: PathBuf,
        /// First line to process (0-based)
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Line to stop before (0-based, exclusive)
        #[arg(long)]
        stop: Option<usize>,
    },
    /// Print the document of one identifier as JSON
    Lookup {
        #[arg(long)]
        uri: String,
    },
    /// Append the candidate identifiers of an edition to a file
    List {
        #[arg(long, value_enum)]
        edition: Edition,
        #[arg(long)]
        output: PathBuf,
    },
    /// Delete identifiers present in the old list but not in the new one
    DeleteStale {
        #[arg(long)]
        new: PathBuf,
        #[arg(long)]
        old: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Edition {
    Primary,
    Secondary,
}

impl From<Edition> for EditionRole {
    fn from(edition: Edition) -> Self {
        match edition {
            Edition::Primary => EditionRole::Primary,
            Edition::Secondary => EditionRole::Secondary,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<IndexerConfig> {
    let mut config = match path {
        Some(path) => IndexerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => IndexerConfig::default(),
    };
    config.apply_env();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dbpedia_indexer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let services = Services::from_config(&config).context("Failed to create service clients")?;

    match cli.command {
        Command::Run {
            action,
            input,
            start,
            stop,
        } => {
            let loader = BatchLoader::new(
                Pipeline::from_services(&config, &services),
                Updater::from_services(&config, &services),
                services.index.clone(),
                &config.batch,
            );
            let summary = loader
                .run(action, &input, LineRange { start, stop })
                .await
                .with_context(|| format!("Batch over {} aborted", input.display()))?;
            if summary.failed > 0 {
                eprintln!(
                    "{} of {} identifiers failed, see {}",
                    summary.failed, summary.processed, config.batch.failure_log
                );
            }
        }
        Command::Lookup { uri } => {
            let pipeline = Pipeline::from_services(&config, &services);
            let doc = pipeline
                .build(&uri)
                .await
                .with_context(|| format!("Failed to build document for {uri}"))?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Command::List { edition, output } => {
            list_uris(
                services.store.as_ref(),
                &config.editions,
                edition.into(),
                config.batch.listing_page_size,
                &output,
            )
            .await
            .context("Listing failed")?;
        }
        Command::DeleteStale { new, old } => {
            delete_stale(
                services.index.as_ref(),
                &new,
                &old,
                config.batch.commit_every,
            )
            .await
            .context("Stale deletion failed")?;
        }
    }

    Ok(())
}
