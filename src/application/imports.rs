// Import bookkeeping.
// Adds a strategy's required import once per file and removes it again when
// the last reference to the imported symbol is gone. Liveness is a line-level
// substring scan over non-import lines; false negatives keep the import,
// false positives never drop a live one.

use tracing::{debug, warn};

use crate::domain::grammar::Grammar;
use crate::domain::tree::{NodeId, NodeKind, SyntaxTree};
use crate::ports::ClassIndex;

pub struct ImportManager<'a> {
    class_index: Option<&'a dyn ClassIndex>,
}

impl<'a> ImportManager<'a> {
    pub fn new(class_index: Option<&'a dyn ClassIndex>) -> Self {
        Self { class_index }
    }

    /// Add `import <path>` to the file unless it is already present. Returns
    /// true when a directive was inserted.
    pub fn add_import_if_absent(&self, tree: &mut SyntaxTree, path: &str) -> bool {
        if find_directive(tree, path).is_some() {
            return false;
        }
        if tree.grammar() == Grammar::JavaLike {
            if let Some(index) = self.class_index {
                if !index.resolves(path) {
                    warn!(path, "import target not resolvable, import skipped");
                    return false;
                }
            }
        }
        let text = format!("import {}{}", path, tree.grammar().terminator());
        let directive = tree.leaf(NodeKind::ImportDirective, text);
        tree.node_mut(directive).name = Some(path.to_string());

        if let Some(list) = find_import_list(tree) {
            let sep = tree.create_whitespace("\n");
            tree.push_child(list, sep);
            tree.push_child(list, directive);
        } else {
            let list = tree.alloc(NodeKind::ImportList);
            tree.push_child(list, directive);
            place_new_list(tree, list);
        }
        debug!(path, "import added");
        true
    }

    /// Remove `import <path>` when no non-import line still references the
    /// symbol's trailing simple name. Returns true when the directive was
    /// removed.
    pub fn remove_import_if_unused(&self, tree: &mut SyntaxTree, path: &str) -> bool {
        let Some(directive) = find_directive(tree, path) else {
            return false;
        };
        if symbol_in_use(tree, path) {
            debug!(path, "imported symbol still referenced, import kept");
            return false;
        }
        let list = tree.parent(directive);
        if let Some(prev) = tree.prev_sibling(directive) {
            if tree.kind(prev) == NodeKind::Whitespace {
                tree.delete(prev);
            }
        } else if let Some(next) = tree.next_sibling(directive) {
            if tree.kind(next) == NodeKind::Whitespace {
                tree.delete(next);
            }
        }
        tree.delete(directive);
        if let Some(list) = list {
            if tree.kind(list) == NodeKind::ImportList && tree.children(list).is_empty() {
                // a list at the very top of the file carries its blank-line
                // separator after it, not before
                if tree.prev_sibling(list).is_none() {
                    if let Some(next) = tree.next_sibling(list) {
                        if tree.kind(next) == NodeKind::Whitespace {
                            tree.delete(next);
                        }
                    }
                }
                tree.delete_with_leading_trivia(list);
            }
        }
        debug!(path, "import removed");
        true
    }
}

/// A fresh import list goes right after the package directive, blank line
/// separated, or at the very top of a file without one.
fn place_new_list(tree: &mut SyntaxTree, list: NodeId) {
    let root = tree.root();
    let package = tree
        .children(root)
        .iter()
        .copied()
        .find(|&c| tree.kind(c) == NodeKind::PackageDirective);
    match package {
        Some(pkg) => {
            tree.insert_after(pkg, list);
            let sep = tree.create_whitespace("\n\n");
            tree.insert_after(pkg, sep);
        }
        None => match tree.children(root).first().copied() {
            Some(first) => {
                let sep = tree.create_whitespace("\n\n");
                tree.insert_before(first, sep);
                tree.insert_before(sep, list);
            }
            None => tree.push_child(root, list),
        },
    }
}

fn find_import_list(tree: &SyntaxTree) -> Option<NodeId> {
    tree.children(tree.root())
        .iter()
        .copied()
        .find(|&c| tree.kind(c) == NodeKind::ImportList)
}

fn find_directive(tree: &SyntaxTree, path: &str) -> Option<NodeId> {
    tree.descendants_of_kind(tree.root(), NodeKind::ImportDirective)
        .into_iter()
        .find(|&d| tree.node(d).name.as_deref() == Some(path))
}

fn symbol_in_use(tree: &SyntaxTree, path: &str) -> bool {
    let simple = path.rsplit('.').next().unwrap_or(path);
    tree.text()
        .lines()
        .any(|line| !line.trim_start().starts_with("import ") && line.contains(simple))
}
