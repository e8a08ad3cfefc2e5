// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folio - blog content service for a bilingual marketing site.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod import;
mod posts;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_config::FolioConfig;

/// Folio - blog content service.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the blog API over HTTP.
    Serve,
    /// Seed posts from a JSON array of content items.
    Import {
        /// Path to the JSON file.
        file: PathBuf,
    },
    /// Print one page of the blog listing as JSON.
    Posts {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Language code (en, ru). Defaults to site.default_language.
        #[arg(long)]
        lang: Option<String>,
    },
    /// Validate and print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => folio_config::load_and_validate_path(path),
        None => folio_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            folio_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.site.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Import { file }) => import::run_import(&config, &file).await,
        Some(Commands::Posts {
            search,
            category,
            page,
            lang,
        }) => {
            posts::run_posts(
                &config,
                posts::PostsArgs {
                    search,
                    category,
                    page,
                    lang,
                },
            )
            .await
        }
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("folio: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("folio: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &FolioConfig) -> Result<(), folio_core::FolioError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| folio_core::FolioError::Config(e.to_string()))?;
    print!("{rendered}");
    Ok(())
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("folio={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
