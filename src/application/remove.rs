// Removal engine.
// Deletes previously inserted log statements matching the strategy's removal
// markers inside the resolved scope, then drops the framework import once the
// last reference to the imported symbol is gone.

use tracing::debug;

use crate::application::imports::ImportManager;
use crate::domain::config::LoggingConfiguration;
use crate::domain::grammar::Grammar;
use crate::domain::strategy::{strategy_for, LogStrategy};
use crate::domain::tree::{NodeId, NodeKind, SyntaxTree};

/// Remove every log statement in `scope` matching the configured strategy and
/// tag. Returns true when anything was removed.
pub fn remove_logs(tree: &mut SyntaxTree, scope: NodeId, config: &LoggingConfiguration) -> bool {
    remove_logs_with(tree, scope, &config.log_tag, strategy_for(config.framework))
}

pub fn remove_logs_with(
    tree: &mut SyntaxTree,
    scope: NodeId,
    tag: &str,
    strategy: &dyn LogStrategy,
) -> bool {
    let markers = strategy.removal_markers(tag);
    let candidates = match tree.grammar() {
        Grammar::JavaLike => java_candidates(tree, scope, &markers),
        Grammar::KotlinLike => kotlin_candidates(tree, scope, &markers),
    };
    let survivors = drop_containing_candidates(tree, candidates);
    let removed = !survivors.is_empty();
    for node in &survivors {
        debug!(text = %tree.node_text(*node), "log statement removed");
        tree.delete_with_leading_trivia(*node);
    }
    if removed {
        if let Some(path) = strategy.required_import(tree.grammar()) {
            ImportManager::new(None).remove_import_if_unused(tree, path);
        }
    }
    removed
}

/// Java-like logs are whole expression statements; match on statement text.
fn java_candidates(tree: &SyntaxTree, scope: NodeId, markers: &[String]) -> Vec<NodeId> {
    tree.descendants_of_kind(scope, NodeKind::ExpressionStatement)
        .into_iter()
        .filter(|&stmt| {
            let text = tree.node_text(stmt);
            markers.iter().any(|m| text.contains(m))
        })
        .collect()
}

/// Kotlin-like logs are call chains; a matched call is walked up through its
/// qualification wrappers to the node sitting directly in a block, which is
/// the unit of deletion.
fn kotlin_candidates(tree: &SyntaxTree, scope: NodeId, markers: &[String]) -> Vec<NodeId> {
    let mut found = Vec::new();
    for call in tree.descendants_of_kind(scope, NodeKind::CallExpression) {
        let text = tree.node_text(call);
        if !markers.iter().any(|m| text.contains(m)) {
            continue;
        }
        if let Some(top) = statement_ancestor(tree, call) {
            if !found.contains(&top) {
                found.push(top);
            }
        }
    }
    found
}

fn statement_ancestor(tree: &SyntaxTree, call: NodeId) -> Option<NodeId> {
    let mut current = call;
    loop {
        let parent = tree.parent(current)?;
        if tree.kind(parent).is_statement_container() {
            return Some(current);
        }
        match tree.kind(parent) {
            NodeKind::QualifiedExpression => current = parent,
            _ => return None,
        }
    }
}

/// Never delete a candidate that contains another candidate: the inner match
/// is the log, the outer one is a construct (say a scope-function wrapper)
/// whose text merely includes it.
fn drop_containing_candidates(tree: &SyntaxTree, candidates: Vec<NodeId>) -> Vec<NodeId> {
    candidates
        .iter()
        .copied()
        .filter(|&a| {
            !candidates
                .iter()
                .any(|&b| a != b && tree.is_ancestor(a, b))
        })
        .collect()
}
