//! Sleuth CLI
//!
//! Looks for a handle across a registry of sites and correlates the accounts found.

mod report;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use sleuth_core::{Handle, SiteRegistry, DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS};
use sleuth_net::HttpConfig;
use sleuth_runtime::{Investigation, InvestigationConfig};

#[derive(Parser)]
#[command(name = "sleuth")]
#[command(author, version, about = "Sleuth: find a handle across many sites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every registry site for a handle
    Search {
        /// Handle to look for (prompted for when omitted)
        handle: Option<String>,

        /// Site registry file (JSON, or TOML by extension)
        #[arg(short, long, env = "SLEUTH_SITES", default_value = "sites.json")]
        sites: PathBuf,

        /// Sites probed concurrently
        #[arg(short, long, default_value_t = DEFAULT_MAX_CONCURRENT)]
        workers: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Proxy for all requests, e.g. socks5h://127.0.0.1:9050
        #[arg(long, env = "SLEUTH_PROXY")]
        proxy: Option<String>,

        /// Accept invalid TLS certificates
        #[arg(long)]
        insecure: bool,

        /// Skip the linked-account pass
        #[arg(long)]
        no_links: bool,

        /// Skip the identity pass
        #[arg(long)]
        no_identity: bool,

        /// Also write the report as JSON (default: sleuth_<handle>_<timestamp>.json)
        #[arg(long)]
        json: bool,

        /// Output file for the JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show registry contents and patterns that do not form valid URLs
    Sites {
        /// Site registry file (JSON, or TOML by extension)
        #[arg(short, long, env = "SLEUTH_SITES", default_value = "sites.json")]
        sites: PathBuf,

        /// Handle used to check the patterns
        #[arg(long, default_value = "example")]
        handle: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Search {
            handle,
            sites,
            workers,
            timeout,
            proxy,
            insecure,
            no_links,
            no_identity,
            json,
            output,
        } => {
            let http = HttpConfig {
                timeout_secs: timeout,
                user_agent: None,
                proxy,
                accept_invalid_certs: insecure,
            };
            let config = InvestigationConfig {
                max_concurrent: workers,
                resolve_links: !no_links,
                extract_identity: !no_identity,
            };
            run_search(handle, sites, http, config, json, output).await?;
        }
        Commands::Sites { sites, handle } => {
            show_sites(sites, &handle)?;
        }
    }

    Ok(())
}

async fn run_search(
    handle: Option<String>,
    sites: PathBuf,
    http: HttpConfig,
    config: InvestigationConfig,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let raw = match handle {
        Some(h) => h,
        None => prompt("Handle to search: ")?,
    };
    let handle = Handle::new(&raw)?;

    let investigation = Investigation::from_registry_path(&sites, &http, config)
        .with_context(|| format!("cannot start investigation with {}", sites.display()))?;

    println!(
        "🔍 Searching {} sites for '{}'\n",
        investigation.registry().len(),
        handle
    );

    let report = investigation.run(&handle).await;
    print!("{}", report::render_text(&report));

    if json || output.is_some() {
        let output_path = output.unwrap_or_else(|| {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
            PathBuf::from(format!("sleuth_{}_{}.json", file_stem(&handle), timestamp))
        });

        fs::write(&output_path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("cannot write {}", output_path.display()))?;
        println!("\n📄 Report saved to: {}", output_path.display());
    }

    Ok(())
}

fn show_sites(path: PathBuf, handle: &str) -> Result<()> {
    let registry = SiteRegistry::load(&path)
        .with_context(|| format!("cannot load registry {}", path.display()))?;
    let handle = Handle::new(handle)?;

    println!("📚 {} sites in {}\n", registry.len(), path.display());
    for (category, count) in registry.category_counts() {
        println!("   {:<20} {}", category, count);
    }

    let invalid = registry.invalid_sites(&handle);
    if invalid.is_empty() {
        println!("\n✅ All URL patterns are valid");
    } else {
        println!("\n⚠️  {} invalid URL patterns:", invalid.len());
        for site in invalid {
            println!("   {} - {}: {}", site.category, site.name, site.url_pattern);
        }
    }

    Ok(())
}

/// Handle made safe for a file name: anything but ASCII alphanumerics, `-` and `_` becomes `_`
fn file_stem(handle: &Handle) -> String {
    handle
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_replaces_path_characters() {
        let handle = Handle::new("../alice/bob").unwrap();
        assert_eq!(file_stem(&handle), "___alice_bob");

        let handle = Handle::new("john doe").unwrap();
        assert_eq!(file_stem(&handle), "john_doe");

        let handle = Handle::new("alice-99_x").unwrap();
        assert_eq!(file_stem(&handle), "alice-99_x");
    }
}
