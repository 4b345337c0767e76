mod config;
mod error;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use driver::Driver;
use rest_http::RestHttpDriver;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "mcs.toml";

#[derive(Parser)]
#[command(name = "mcs")]
#[command(about = "Let a language model call HTTP tools described by an OpenAPI spec", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Spec URL (repeatable, first is primary). Replaces configured URLs
    #[arg(short, long = "url", global = true)]
    urls: Vec<String>,

    /// Strip components and error responses from the fetched spec
    #[arg(long, global = true)]
    reduced: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tool description (spec) the model sees
    Describe,
    /// Print the system prompt for the model
    Prompt,
    /// Execute the tool call in a model response and print the result
    Process {
        /// Model output. Read from stdin when omitted
        text: Option<String>,
    },
    /// Show driver metadata and spec URLs
    Info,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config, cli.urls, cli.reduced)?;
    let driver = RestHttpDriver::from_config(config.driver)?;
    debug!(spec_url = %driver.spec_url(), "driver ready");

    match cli.command {
        Commands::Describe => cmd_describe(&driver).await,
        Commands::Prompt => cmd_prompt(&driver).await,
        Commands::Process { text } => cmd_process(&driver, text).await,
        Commands::Info => {
            cmd_info(&driver, &driver.config().urls);
            Ok(())
        }
    }
}

async fn cmd_describe<D: Driver>(driver: &D) -> Result<()> {
    println!("{}", driver.describe().await?);
    Ok(())
}

async fn cmd_prompt<D: Driver>(driver: &D) -> Result<()> {
    println!("{}", driver.system_prompt().await?);
    Ok(())
}

async fn cmd_process<D: Driver>(driver: &D, text: Option<String>) -> Result<()> {
    let input = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    if input.trim().is_empty() {
        return Err(Error::EmptyInput);
    }

    println!("{}", driver.process_response(&input).await?);
    Ok(())
}

fn cmd_info<D: Driver>(driver: &D, urls: &[String]) {
    println!("mcs v{}", env!("CARGO_PKG_VERSION"));
    println!("Driver: {}", driver.meta());
    println!("Spec URLs:");
    for (i, url) in urls.iter().enumerate() {
        let marker = if i == 0 { " (primary)" } else { "" };
        println!("  {url}{marker}");
    }
}

fn load_config(path: &Path, urls: Vec<String>, reduced: bool) -> Result<Config> {
    let config = if path.exists() {
        Config::load(path)?
    } else if !urls.is_empty() {
        Config::from_urls(Vec::new())
    } else {
        return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        });
    };

    Ok(config.with_overrides(urls, reduced))
}
