// Host-facing ports. The engine stays independent of how the host stores
// settings, produces trees, or resolves class symbols.

use std::path::Path;

use crate::domain::config::LoggingConfiguration;
use crate::domain::tree::SyntaxTree;

/// Settings persistence owned by the host.
pub trait ConfigStore {
    fn load(&self) -> anyhow::Result<LoggingConfiguration>;
    fn store(&self, config: &LoggingConfiguration) -> anyhow::Result<()>;
}

/// Supplies an already-parsed tree for a source file. The engine never
/// parses source itself.
pub trait TreeProvider {
    fn tree_for(&self, path: &Path) -> anyhow::Result<SyntaxTree>;
}

/// Host symbol index consulted before adding a Java-like import. An import
/// whose symbol the host cannot resolve is skipped rather than inserted as
/// an unresolved reference.
pub trait ClassIndex {
    fn resolves(&self, import_path: &str) -> bool;
}
