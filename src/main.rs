// Command-line entry point for Logweaver.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use dashmap::DashMap;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use logweaver::application::{inject, remove, scope};
use logweaver::domain::config::{FrameworkId, LoggingConfiguration};
use logweaver::domain::error::EngineError;
use logweaver::infrastructure::fixture::FixtureParser;
use logweaver::infrastructure::workspace::{
    run_in_mutation_transaction, TomlConfigStore, Workspace,
};
use logweaver::ports::{ConfigStore, TreeProvider};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input source file path (can specify multiple)
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Input source folder(s), walked recursively
    #[arg(short = 'd', long)]
    folder: Vec<PathBuf>,

    /// Remove previously inserted log statements instead of inserting
    #[arg(short, long)]
    remove: bool,

    /// Log tag, overriding the configured one
    #[arg(short, long)]
    tag: Option<String>,

    /// Logging framework (println, timber, napier)
    #[arg(short = 'F', long)]
    framework: Option<String>,

    /// Configuration TOML path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Caret offset; scopes the operation to the enclosing type declaration.
    /// Requires exactly one --input file.
    #[arg(long)]
    caret: Option<usize>,

    /// Write results back to the input files instead of stdout
    #[arg(short, long)]
    write: bool,
}

fn load_config(cli: &Cli) -> Result<LoggingConfiguration> {
    let mut config = match &cli.config {
        Some(path) => TomlConfigStore::new(path).load()?,
        None => LoggingConfiguration::default(),
    };
    if let Some(tag) = &cli.tag {
        config.log_tag = tag.clone();
    }
    if let Some(name) = &cli.framework {
        config.framework = FrameworkId::from_str(name)
            .ok_or_else(|| EngineError::UnknownFramework(name.clone()))?;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut files: Vec<PathBuf> = cli.input.clone();
    for folder in &cli.folder {
        Workspace::collect_sources(folder, &mut files)?;
    }
    files.sort();
    files.dedup();
    if files.is_empty() {
        bail!("Please provide at least one --input <file> or --folder <dir>");
    }
    if cli.caret.is_some() && files.len() != 1 {
        bail!("--caret requires exactly one --input file");
    }

    let provider = FixtureParser;
    let results: DashMap<PathBuf, String> = DashMap::new();
    files.par_iter().try_for_each(|path| -> Result<()> {
        let mut tree = provider.tree_for(path)?;
        let scope = match cli.caret {
            Some(offset) => scope::resolve_scope(&tree, offset),
            None => tree.root(),
        };
        let changed = run_in_mutation_transaction(&mut tree, |t| {
            Ok(if cli.remove {
                remove::remove_logs(t, scope, &config)
            } else {
                inject::insert_logs(t, scope, &config)
            })
        })?;
        if changed {
            results.insert(path.clone(), tree.text());
        }
        Ok(())
    })?;

    if cli.write {
        for entry in results.iter() {
            fs::write(entry.key(), entry.value().as_bytes())
                .with_context(|| format!("Failed to write {}", entry.key().display()))?;
        }
        println!(
            "Done. {} of {} files changed.",
            results.len(),
            files.len()
        );
    } else {
        for path in &files {
            if let Some(text) = results.get(path) {
                println!("==> {}", path.display());
                print!("{}", text.value());
            }
        }
    }
    Ok(())
}
