//! Gallery CLI - upload, classify, list, edit and delete photos.
//!
//! Images go to the configured object store, are labelled by the vision
//! service, and get one of four categories (animal, flower, people, other)
//! before their metadata is saved.
//!
//! # Usage
//!
//! ```bash
//! # Classify labels without uploading anything
//! gallery classify Dog "Golden retriever" Grass --explain
//!
//! # Upload a photo
//! gallery upload ./dog.jpg --photographer Ana --location Lisbon
//!
//! # List photos grouped by category
//! gallery list --grouped
//!
//! # View configuration
//! gallery config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Gallery - photo storage with automatic categories.
#[derive(Parser, Debug)]
#[command(name = "gallery")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a list of labels into a category
    Classify(cli::classify::ClassifyArgs),

    /// Upload a photo, detect labels and store it
    Upload(cli::photos::UploadArgs),

    /// List stored photos
    List(cli::photos::ListArgs),

    /// Show one stored photo
    Show(cli::photos::ShowArgs),

    /// Edit a photo's metadata or replace its image
    Edit(cli::photos::EditArgs),

    /// Delete a photo and its stored image
    Delete(cli::photos::DeleteArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match gallery_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `gallery config path`."
            );
            gallery_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Gallery v{}", gallery_core::VERSION);

    match cli.command {
        Commands::Classify(args) => cli::classify::execute(args, &config),
        Commands::Upload(args) => cli::photos::upload(args, &config).await,
        Commands::List(args) => cli::photos::list(args, &config).await,
        Commands::Show(args) => cli::photos::show(args, &config).await,
        Commands::Edit(args) => cli::photos::edit(args, &config).await,
        Commands::Delete(args) => cli::photos::delete(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
