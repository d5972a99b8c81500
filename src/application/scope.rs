// Scope resolution.
// Narrows every subsequent query to the innermost type declaration enclosing
// the caret, or the whole file when the caret sits outside any type.

use tracing::debug;

use crate::domain::tree::{NodeId, NodeKind, SyntaxTree};

/// Resolve the search scope for one operation. Read-only.
pub fn resolve_scope(tree: &SyntaxTree, caret_offset: usize) -> NodeId {
    let at = tree.node_at_offset(caret_offset);
    if at == tree.root() {
        return tree.root();
    }
    match tree.nearest_ancestor_of_kind(at, NodeKind::TypeDeclaration) {
        Some(type_decl) => {
            debug!(
                name = tree.node(type_decl).name.as_deref().unwrap_or("?"),
                "scope resolved to enclosing type declaration"
            );
            type_decl
        }
        None => tree.root(),
    }
}
