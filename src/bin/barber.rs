//! Barber CLI
//!
//! Checks template manifests and renders Documents from JSON data.

use std::path::PathBuf;

use anyhow::Context;
use barber::{manifest, BarberConfig, Barbershop, BarbershopBuilder, Locale};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "barber")]
#[command(about = "Validate and render document templates")]
struct Cli {
    /// Config file (defaults to barber.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    /// Manifest directory (overrides the configured templates dir)
    #[arg(short, long)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the Barbershop and report every problem
    Check,

    /// List the Barbers, or the Documents reachable from one DocumentData
    Targets {
        /// DocumentData name
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Render a Document from a JSON data file
    Render {
        /// DocumentData name
        #[arg(short, long)]
        source: String,
        /// Document name
        #[arg(short = 'T', long)]
        target: String,
        /// Requested locale
        #[arg(short, long, default_value = Locale::EN_US)]
        locale: String,
        /// JSON file with the DocumentData
        #[arg(short, long)]
        data: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn build(cli: &Cli, config: &BarberConfig) -> anyhow::Result<Barbershop> {
    let dir = cli
        .templates
        .clone()
        .unwrap_or_else(|| config.templates_dir());
    let manifest = manifest::load_directory(&dir)
        .with_context(|| format!("loading manifests from {}", dir.display()))?;
    let builder = manifest.install(BarbershopBuilder::from_config(config)?)?;
    Ok(builder.build()?)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BarberConfig::load_from(cli.config.as_deref())?;
    let shop = build(&cli, &config)?;

    match &cli.command {
        Commands::Check => {
            let barbers = shop.all_barbers();
            println!(
                "✅ {} Document(s), {} Barber(s)",
                shop.installed_documents().len(),
                barbers.len()
            );
            for key in barbers.keys() {
                let locales: Vec<_> = shop.locales(key).iter().map(ToString::to_string).collect();
                println!("  {} [{}]", key, locales.join(", "));
            }
            Ok(())
        }

        Commands::Targets { source } => {
            match source {
                Some(source) => {
                    for target in shop.target_documents_for(source) {
                        println!("{}", target);
                    }
                }
                None => {
                    for key in shop.all_barbers().keys() {
                        println!("{}", key);
                    }
                }
            }
            Ok(())
        }

        Commands::Render {
            source,
            target,
            locale,
            data,
        } => {
            let locale = Locale::parse(locale)?;
            let content = std::fs::read_to_string(data)
                .with_context(|| format!("reading {}", data.display()))?;
            let data: serde_json::Value = serde_json::from_str(&content)?;

            let barber = shop.barber(source, target)?;
            let rendered = barber.render_value(&data, &locale)?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);
            Ok(())
        }
    }
}
