// Workspace adapters: source discovery, config persistence, and the
// all-or-nothing mutation wrapper hosts run engine operations under.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::config::LoggingConfiguration;
use crate::domain::grammar::Grammar;
use crate::domain::tree::SyntaxTree;
use crate::ports::ConfigStore;

pub struct Workspace;

impl Workspace {
    /// Collect every source file under `dir` whose extension maps to a
    /// supported grammar. Build output and VCS directories are skipped.
    pub fn collect_sources(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
        if dir.ends_with("build") || dir.ends_with("target") || dir.ends_with(".git") {
            return Ok(());
        }
        if !dir.exists() {
            return Ok(());
        }
        if dir.is_file() {
            if Grammar::from_path(dir).is_some() {
                out.push(dir.to_path_buf());
            }
            return Ok(());
        }
        for entry in
            fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                Self::collect_sources(&path, out)?;
            } else if Grammar::from_path(&path).is_some() {
                out.push(path);
            }
        }
        Ok(())
    }
}

/// Run a mutating closure against the tree. When the closure fails, the tree
/// is restored to its pre-call state so a partial edit never escapes.
pub fn run_in_mutation_transaction<T>(
    tree: &mut SyntaxTree,
    f: impl FnOnce(&mut SyntaxTree) -> Result<T>,
) -> Result<T> {
    let snapshot = tree.clone();
    match f(tree) {
        Ok(value) => Ok(value),
        Err(err) => {
            debug!("mutation failed, tree restored");
            *tree = snapshot;
            Err(err)
        }
    }
}

/// Config store backed by a TOML file. A missing file yields defaults so a
/// fresh project works without setup.
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<LoggingConfiguration> {
        if !self.path.exists() {
            return Ok(LoggingConfiguration::default());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config {}", self.path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", self.path.display()))
    }

    fn store(&self, config: &LoggingConfiguration) -> Result<()> {
        let raw = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write config {}", self.path.display()))
    }
}
