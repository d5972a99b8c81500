// Injection engine.
// Walks the resolved scope and inserts one rendered log statement per method
// entry and per assignment, skipping sites that already carry one. The
// already-present checks are textual containment, not structural equality.

use tracing::debug;

use crate::application::imports::ImportManager;
use crate::domain::config::LoggingConfiguration;
use crate::domain::grammar::Grammar;
use crate::domain::strategy::{strategy_for, LogStrategy};
use crate::domain::tree::{NodeId, NodeKind, SyntaxTree};
use crate::ports::ClassIndex;

/// Run the enabled injection passes and add the framework import when any
/// insertion happened. Returns true when the tree changed.
pub fn insert_logs(tree: &mut SyntaxTree, scope: NodeId, config: &LoggingConfiguration) -> bool {
    insert_logs_with(tree, scope, config, None)
}

/// Same as [`insert_logs`], consulting `class_index` before adding an import.
pub fn insert_logs_with(
    tree: &mut SyntaxTree,
    scope: NodeId,
    config: &LoggingConfiguration,
    class_index: Option<&dyn ClassIndex>,
) -> bool {
    let strategy = strategy_for(config.framework);
    let mut changed = false;
    if config.track_method_execution {
        changed |= insert_method_entry_logs(tree, scope, &config.log_tag, strategy);
    }
    if config.track_assignments {
        changed |= insert_assignment_logs(tree, scope, &config.log_tag, strategy);
    }
    if changed {
        if let Some(path) = strategy.required_import(tree.grammar()) {
            ImportManager::new(class_index).add_import_if_absent(tree, path);
        }
    }
    changed
}

/// Insert an entry log as the first statement of every function body in
/// `scope`. Bodiless functions are skipped. Returns true when at least one
/// statement was inserted.
pub fn insert_method_entry_logs(
    tree: &mut SyntaxTree,
    scope: NodeId,
    tag: &str,
    strategy: &dyn LogStrategy,
) -> bool {
    let mut changed = false;
    for func in tree.descendants_of_kind(scope, NodeKind::Function) {
        let Some(name) = tree.node(func).name.clone() else {
            continue;
        };
        let Some(body) = function_body(tree, func) else {
            debug!(function = %name, "no body, skipped");
            continue;
        };
        let body_text = tree.node_text(body);
        if body_text.contains(tag) && body_text.contains(&name) {
            debug!(function = %name, "entry log already present, skipped");
            continue;
        }
        let Some(lbrace) = opening_brace(tree, body) else {
            continue;
        };
        let message = method_entry_message(&name, &tree.node(func).params, tree.grammar());
        let call = strategy.render_call(tag, &message, tree.grammar());
        let indent = statement_indent(tree, body, lbrace);
        let stmt = tree.create_statement_from_text(&call);
        let ws = tree.create_whitespace(&format!("\n{}", indent));
        tree.insert_after(lbrace, stmt);
        tree.insert_after(lbrace, ws);
        debug!(function = %name, "entry log inserted");
        changed = true;
    }
    changed
}

/// Insert a value log after every assignment statement in `scope`. Compound
/// operators are treated the same as plain assignment. Returns true when at
/// least one statement was inserted.
pub fn insert_assignment_logs(
    tree: &mut SyntaxTree,
    scope: NodeId,
    tag: &str,
    strategy: &dyn LogStrategy,
) -> bool {
    let mut changed = false;
    for assign in tree.descendants_of_kind(scope, NodeKind::BinaryExpression) {
        if tree.node(assign).op.is_none() {
            continue;
        }
        let Some(var_name) = tree.node(assign).name.clone() else {
            continue;
        };
        let Some(anchor) = containing_statement(tree, assign) else {
            continue;
        };
        if log_follows(tree, anchor, tag, &var_name) {
            debug!(var = %var_name, "assignment log already present, skipped");
            continue;
        }
        let message = assignment_message(&var_name, tree.grammar());
        let call = strategy.render_call(tag, &message, tree.grammar());
        let indent = line_indent_at(tree, tree.offset_of(anchor));
        let stmt = tree.create_statement_from_text(&call);
        let ws = tree.create_whitespace(&format!("\n{}", indent));
        tree.insert_after(anchor, stmt);
        tree.insert_after(anchor, ws);
        debug!(var = %var_name, "assignment log inserted");
        changed = true;
    }
    changed
}

/// Interpolation of one value inside a double-quoted message: string
/// concatenation for the Java-like grammar, native templates for Kotlin-like.
fn interp(var: &str, grammar: Grammar) -> String {
    match grammar {
        Grammar::JavaLike => format!("\" + {} + \"", var),
        Grammar::KotlinLike => format!("${{{}}}", var),
    }
}

fn method_entry_message(name: &str, params: &[String], grammar: Grammar) -> String {
    let rendered: Vec<String> = params
        .iter()
        .map(|p| format!("{}={}", p, interp(p, grammar)))
        .collect();
    format!("{}({})", name, rendered.join(", "))
}

fn assignment_message(var_name: &str, grammar: Grammar) -> String {
    format!(
        "{} assigned new value: {}",
        var_name,
        interp(var_name, grammar)
    )
}

fn function_body(tree: &SyntaxTree, func: NodeId) -> Option<NodeId> {
    tree.children(func)
        .iter()
        .copied()
        .find(|&c| tree.kind(c) == NodeKind::Block)
}

fn opening_brace(tree: &SyntaxTree, block: NodeId) -> Option<NodeId> {
    tree.children(block)
        .iter()
        .copied()
        .find(|&c| tree.kind(c) == NodeKind::LBrace)
}

/// Nearest ancestor of `node` sitting directly in a statement container. In
/// the Kotlin-like grammar an assignment is itself an expression, so this may
/// return the assignment node itself.
fn containing_statement(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        if tree.kind(parent).is_statement_container() {
            return Some(current);
        }
        current = parent;
    }
    None
}

/// True when the next non-trivia sibling after `anchor` already carries both
/// the tag and the variable name.
fn log_follows(tree: &SyntaxTree, anchor: NodeId, tag: &str, var_name: &str) -> bool {
    let mut next = tree.next_sibling(anchor);
    while let Some(node) = next {
        if !tree.kind(node).is_trivia() {
            let text = tree.node_text(node);
            return text.contains(tag) && text.contains(var_name);
        }
        next = tree.next_sibling(node);
    }
    false
}

/// Indentation for a statement inserted right after the opening brace: the
/// first statement's own indentation when the body has one, otherwise the
/// brace line's indentation plus one level.
fn statement_indent(tree: &SyntaxTree, body: NodeId, lbrace: NodeId) -> String {
    if has_statements(tree, body) {
        if let Some(next) = tree.next_sibling(lbrace) {
            if tree.kind(next) == NodeKind::Whitespace {
                let ws = tree.node_text(next);
                if let Some(pos) = ws.rfind('\n') {
                    return ws[pos + 1..].to_string();
                }
            }
        }
    }
    let mut indent = line_indent_at(tree, tree.offset_of(lbrace));
    indent.push_str("    ");
    indent
}

fn has_statements(tree: &SyntaxTree, block: NodeId) -> bool {
    tree.children(block).iter().any(|&c| {
        !tree.kind(c).is_trivia() && !matches!(tree.kind(c), NodeKind::LBrace | NodeKind::RBrace)
    })
}

/// Leading whitespace of the line containing `offset`.
fn line_indent_at(tree: &SyntaxTree, offset: usize) -> String {
    let text = tree.text();
    let upto = offset.min(text.len());
    let line_start = text[..upto].rfind('\n').map(|p| p + 1).unwrap_or(0);
    text[line_start..]
        .chars()
        .take_while(|&c| c == ' ' || c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::FrameworkId;
    use crate::domain::strategy::PrintlnStrategy;
    use crate::domain::tree::AssignOp;

    fn kotlin_method() -> SyntaxTree {
        // fun test(param: String) {
        //     val y = 0
        // }
        let mut tree = SyntaxTree::new(Grammar::KotlinLike);
        let root = tree.root();
        let func = tree.alloc(NodeKind::Function);
        tree.node_mut(func).name = Some("test".to_string());
        tree.node_mut(func).params = vec!["param".to_string()];
        tree.push_child(root, func);
        let header = tree.leaf(NodeKind::Token, "fun test(param: String) ");
        tree.push_child(func, header);
        let block = tree.alloc(NodeKind::Block);
        tree.push_child(func, block);
        let lb = tree.leaf(NodeKind::LBrace, "{");
        tree.push_child(block, lb);
        let ws = tree.leaf(NodeKind::Whitespace, "\n    ");
        tree.push_child(block, ws);
        let decl = tree.alloc(NodeKind::DeclarationStatement);
        tree.push_child(block, decl);
        let decl_text = tree.leaf(NodeKind::Token, "val y = 0");
        tree.push_child(decl, decl_text);
        let ws2 = tree.leaf(NodeKind::Whitespace, "\n");
        tree.push_child(block, ws2);
        let rb = tree.leaf(NodeKind::RBrace, "}");
        tree.push_child(block, rb);
        tree
    }

    fn kotlin_assignment() -> SyntaxTree {
        // fun f() {
        //     var x = 1
        //     x = 2
        // }
        let mut tree = SyntaxTree::new(Grammar::KotlinLike);
        let root = tree.root();
        let func = tree.alloc(NodeKind::Function);
        tree.node_mut(func).name = Some("f".to_string());
        tree.push_child(root, func);
        let header = tree.leaf(NodeKind::Token, "fun f() ");
        tree.push_child(func, header);
        let block = tree.alloc(NodeKind::Block);
        tree.push_child(func, block);
        let lb = tree.leaf(NodeKind::LBrace, "{");
        tree.push_child(block, lb);
        let ws = tree.leaf(NodeKind::Whitespace, "\n    ");
        tree.push_child(block, ws);
        let decl = tree.alloc(NodeKind::DeclarationStatement);
        tree.push_child(block, decl);
        let decl_text = tree.leaf(NodeKind::Token, "var x = 1");
        tree.push_child(decl, decl_text);
        let ws2 = tree.leaf(NodeKind::Whitespace, "\n    ");
        tree.push_child(block, ws2);
        let assign = tree.alloc(NodeKind::BinaryExpression);
        tree.node_mut(assign).name = Some("x".to_string());
        tree.node_mut(assign).op = Some(AssignOp::Assign);
        tree.push_child(block, assign);
        let assign_text = tree.leaf(NodeKind::Token, "x = 2");
        tree.push_child(assign, assign_text);
        let ws3 = tree.leaf(NodeKind::Whitespace, "\n");
        tree.push_child(block, ws3);
        let rb = tree.leaf(NodeKind::RBrace, "}");
        tree.push_child(block, rb);
        tree
    }

    fn java_assignment() -> SyntaxTree {
        // void f() {
        //     int x = 1;
        //     x = 2;
        // }
        let mut tree = SyntaxTree::new(Grammar::JavaLike);
        let root = tree.root();
        let func = tree.alloc(NodeKind::Function);
        tree.node_mut(func).name = Some("f".to_string());
        tree.push_child(root, func);
        let header = tree.leaf(NodeKind::Token, "void f() ");
        tree.push_child(func, header);
        let block = tree.alloc(NodeKind::Block);
        tree.push_child(func, block);
        let lb = tree.leaf(NodeKind::LBrace, "{");
        tree.push_child(block, lb);
        let ws = tree.leaf(NodeKind::Whitespace, "\n    ");
        tree.push_child(block, ws);
        let decl = tree.alloc(NodeKind::DeclarationStatement);
        tree.push_child(block, decl);
        let decl_text = tree.leaf(NodeKind::Token, "int x = 1;");
        tree.push_child(decl, decl_text);
        let ws2 = tree.leaf(NodeKind::Whitespace, "\n    ");
        tree.push_child(block, ws2);
        let stmt = tree.alloc(NodeKind::ExpressionStatement);
        tree.push_child(block, stmt);
        let assign = tree.alloc(NodeKind::BinaryExpression);
        tree.node_mut(assign).name = Some("x".to_string());
        tree.node_mut(assign).op = Some(AssignOp::Assign);
        tree.push_child(stmt, assign);
        let assign_text = tree.leaf(NodeKind::Token, "x = 2");
        tree.push_child(assign, assign_text);
        let semi = tree.leaf(NodeKind::Token, ";");
        tree.push_child(stmt, semi);
        let ws3 = tree.leaf(NodeKind::Whitespace, "\n");
        tree.push_child(block, ws3);
        let rb = tree.leaf(NodeKind::RBrace, "}");
        tree.push_child(block, rb);
        tree
    }

    #[test]
    fn test_kotlin_method_entry_log() {
        let mut tree = kotlin_method();
        let root = tree.root();
        assert!(insert_method_entry_logs(
            &mut tree,
            root,
            "TestTag",
            &PrintlnStrategy
        ));
        assert_eq!(
            tree.text(),
            "fun test(param: String) {\n    println(\"TestTag: test(param=${param})\")\n    val y = 0\n}"
        );
    }

    #[test]
    fn test_method_entry_is_idempotent() {
        let mut tree = kotlin_method();
        let root = tree.root();
        insert_method_entry_logs(&mut tree, root, "TestTag", &PrintlnStrategy);
        let once = tree.text();
        assert!(!insert_method_entry_logs(
            &mut tree,
            root,
            "TestTag",
            &PrintlnStrategy
        ));
        assert_eq!(tree.text(), once);
    }

    #[test]
    fn test_bodiless_function_skipped() {
        let mut tree = SyntaxTree::new(Grammar::KotlinLike);
        let root = tree.root();
        let func = tree.alloc(NodeKind::Function);
        tree.node_mut(func).name = Some("abstractFun".to_string());
        tree.push_child(root, func);
        let header = tree.leaf(NodeKind::Token, "fun abstractFun()");
        tree.push_child(func, header);
        assert!(!insert_method_entry_logs(
            &mut tree,
            root,
            "TestTag",
            &PrintlnStrategy
        ));
        assert_eq!(tree.text(), "fun abstractFun()");
    }

    #[test]
    fn test_kotlin_assignment_log() {
        let mut tree = kotlin_assignment();
        let root = tree.root();
        assert!(insert_assignment_logs(
            &mut tree,
            root,
            "TestTag",
            &PrintlnStrategy
        ));
        assert_eq!(
            tree.text(),
            "fun f() {\n    var x = 1\n    x = 2\n    println(\"TestTag: x assigned new value: ${x}\")\n}"
        );
    }

    #[test]
    fn test_assignment_is_idempotent() {
        let mut tree = kotlin_assignment();
        let root = tree.root();
        insert_assignment_logs(&mut tree, root, "TestTag", &PrintlnStrategy);
        let once = tree.text();
        assert!(!insert_assignment_logs(
            &mut tree,
            root,
            "TestTag",
            &PrintlnStrategy
        ));
        assert_eq!(tree.text(), once);
    }

    #[test]
    fn test_java_assignment_log() {
        let mut tree = java_assignment();
        let root = tree.root();
        assert!(insert_assignment_logs(
            &mut tree,
            root,
            "TestTag",
            &PrintlnStrategy
        ));
        assert_eq!(
            tree.text(),
            "void f() {\n    int x = 1;\n    x = 2;\n    System.out.println(\"TestTag: x assigned new value: \" + x);\n}"
        );
    }

    #[test]
    fn test_disabled_passes_leave_tree_untouched() {
        let mut tree = kotlin_assignment();
        let root = tree.root();
        let original = tree.text();
        let config = LoggingConfiguration {
            track_method_execution: false,
            track_assignments: false,
            log_tag: "TestTag".to_string(),
            framework: FrameworkId::Println,
        };
        assert!(!insert_logs(&mut tree, root, &config));
        assert_eq!(tree.text(), original);
    }

    #[test]
    fn test_insert_logs_adds_framework_import() {
        // package com.example
        //
        // fun f() {
        //     x = 2
        // }
        let mut tree = SyntaxTree::new(Grammar::KotlinLike);
        let root = tree.root();
        let pkg = tree.leaf(NodeKind::PackageDirective, "package com.example");
        tree.push_child(root, pkg);
        let ws = tree.leaf(NodeKind::Whitespace, "\n\n");
        tree.push_child(root, ws);
        let func = tree.alloc(NodeKind::Function);
        tree.node_mut(func).name = Some("f".to_string());
        tree.push_child(root, func);
        let header = tree.leaf(NodeKind::Token, "fun f() ");
        tree.push_child(func, header);
        let block = tree.alloc(NodeKind::Block);
        tree.push_child(func, block);
        let lb = tree.leaf(NodeKind::LBrace, "{");
        tree.push_child(block, lb);
        let wsb = tree.leaf(NodeKind::Whitespace, "\n    ");
        tree.push_child(block, wsb);
        let assign = tree.alloc(NodeKind::BinaryExpression);
        tree.node_mut(assign).name = Some("x".to_string());
        tree.node_mut(assign).op = Some(AssignOp::Assign);
        tree.push_child(block, assign);
        let assign_text = tree.leaf(NodeKind::Token, "x = 2");
        tree.push_child(assign, assign_text);
        let wse = tree.leaf(NodeKind::Whitespace, "\n");
        tree.push_child(block, wse);
        let rb = tree.leaf(NodeKind::RBrace, "}");
        tree.push_child(block, rb);

        let config = LoggingConfiguration {
            track_method_execution: false,
            track_assignments: true,
            log_tag: "TestTag".to_string(),
            framework: FrameworkId::Timber,
        };
        assert!(insert_logs(&mut tree, root, &config));
        assert_eq!(
            tree.text(),
            "package com.example\n\nimport timber.log.Timber\n\nfun f() {\n    x = 2\n    Timber.tag(\"TestTag\").d(\"x assigned new value: ${x}\")\n}"
        );
    }
}
