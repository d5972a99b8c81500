// Fixture parser.
// Builds full-fidelity syntax trees from source text for both grammars. This
// is the reference stand-in for the host's parser; the engine itself never
// parses source. Best-effort: anything the scanner does not recognize stays a
// plain token leaf, so `tree.text()` always reproduces the input exactly.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::error::EngineError;
use crate::domain::grammar::Grammar;
use crate::domain::tree::{AssignOp, NodeId, NodeKind, SyntaxTree};
use crate::ports::TreeProvider;

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "open",
    "sealed",
    "data",
    "abstract",
    "final",
    "static",
    "override",
    "suspend",
    "inline",
    "synchronized",
];

const CONTROL: &[&str] = &[
    "if", "else", "for", "while", "when", "do", "try", "catch", "finally", "switch", "return",
    "throw",
];

pub struct FixtureParser;

impl FixtureParser {
    pub fn parse(source: &str, grammar: Grammar) -> SyntaxTree {
        let mut tree = SyntaxTree::new(grammar);
        let root = tree.root();
        let mut scanner = Scanner {
            src: source,
            pos: 0,
            grammar,
        };
        scanner.items(&mut tree, root);
        tree
    }
}

impl TreeProvider for FixtureParser {
    fn tree_for(&self, path: &Path) -> Result<SyntaxTree> {
        let grammar = Grammar::from_path(path).ok_or_else(|| EngineError::UnsupportedGrammar {
            path: path.to_path_buf(),
        })?;
        let source =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::parse(&source, grammar))
    }
}

struct Scanner<'s> {
    src: &'s str,
    pos: usize,
    grammar: Grammar,
}

impl<'s> Scanner<'s> {
    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    /// File, class body, and block contents all share one item loop; the
    /// statement fallback absorbs whatever the keyword checks do not claim.
    fn items(&mut self, tree: &mut SyntaxTree, parent: NodeId) {
        while self.pos < self.src.len() {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                return;
            };
            if c.is_whitespace() {
                let end = rest
                    .find(|ch: char| !ch.is_whitespace())
                    .unwrap_or(rest.len());
                let ws = tree.create_whitespace(&rest[..end]);
                tree.push_child(parent, ws);
                self.pos += end;
                continue;
            }
            if rest.starts_with("//") {
                let end = rest.find('\n').unwrap_or(rest.len());
                let comment = tree.leaf(NodeKind::Comment, &rest[..end]);
                tree.push_child(parent, comment);
                self.pos += end;
                continue;
            }
            if rest.starts_with("/*") {
                let end = rest.find("*/").map(|i| i + 2).unwrap_or(rest.len());
                let comment = tree.leaf(NodeKind::Comment, &rest[..end]);
                tree.push_child(parent, comment);
                self.pos += end;
                continue;
            }
            if c == '}' {
                // the enclosing block owns its closing brace
                return;
            }
            let line_end = rest.find('\n').unwrap_or(rest.len());
            let line = &rest[..line_end];
            let word = leading_word(strip_modifiers(line));
            match word {
                "package" => self.directive_line(tree, parent, NodeKind::PackageDirective),
                "import" => self.import_list(tree, parent),
                "class" | "interface" | "object" | "enum" => self.type_decl(tree, parent),
                "fun" if self.grammar == Grammar::KotlinLike => self.function(tree, parent),
                _ if self.grammar == Grammar::JavaLike && looks_like_java_method(line) => {
                    self.function(tree, parent)
                }
                _ => self.statement(tree, parent),
            }
        }
    }

    fn directive_line(&mut self, tree: &mut SyntaxTree, parent: NodeId, kind: NodeKind) {
        let rest = self.rest();
        let line_end = rest.find('\n').unwrap_or(rest.len());
        let leaf = tree.leaf(kind, &rest[..line_end]);
        tree.push_child(parent, leaf);
        self.pos += line_end;
    }

    /// Consecutive import lines form one list; the directive's `name` is the
    /// imported path without keyword or terminator.
    fn import_list(&mut self, tree: &mut SyntaxTree, parent: NodeId) {
        let list = tree.alloc(NodeKind::ImportList);
        tree.push_child(parent, list);
        loop {
            let rest = self.rest();
            let line_end = rest.find('\n').unwrap_or(rest.len());
            let line = &rest[..line_end];
            let directive = tree.leaf(NodeKind::ImportDirective, line);
            let path = line
                .trim_start()
                .trim_start_matches("import")
                .trim()
                .trim_end_matches(';')
                .trim();
            tree.node_mut(directive).name = Some(path.to_string());
            tree.push_child(list, directive);
            self.pos += line_end;

            let rest = self.rest();
            if !rest.starts_with('\n') {
                return;
            }
            let after = &rest[1..];
            let indent = after.len() - after.trim_start_matches([' ', '\t']).len();
            if leading_word(&after[indent..]) != "import" {
                return;
            }
            let sep = tree.create_whitespace(&rest[..1 + indent]);
            tree.push_child(list, sep);
            self.pos += 1 + indent;
        }
    }

    fn type_decl(&mut self, tree: &mut SyntaxTree, parent: NodeId) {
        let rest = self.rest();
        let line_end = rest.find('\n').unwrap_or(rest.len());
        let brace = find_outside_strings(&rest[..line_end], '{');
        let node = tree.alloc(NodeKind::TypeDeclaration);
        tree.push_child(parent, node);
        let header_end = brace.unwrap_or(line_end);
        let header = &rest[..header_end];
        let tok = tree.leaf(NodeKind::Token, header);
        tree.push_child(node, tok);
        tree.node_mut(node).name = type_name(header);
        self.pos += header_end;
        if brace.is_some() {
            self.block(tree, node);
        }
    }

    fn function(&mut self, tree: &mut SyntaxTree, parent: NodeId) {
        let rest = self.rest();
        let line_end = rest.find('\n').unwrap_or(rest.len());
        let brace = find_outside_strings(&rest[..line_end], '{');
        let node = tree.alloc(NodeKind::Function);
        tree.push_child(parent, node);
        let header_end = brace.unwrap_or(line_end);
        let header = &rest[..header_end];
        let tok = tree.leaf(NodeKind::Token, header);
        tree.push_child(node, tok);
        tree.node_mut(node).name = function_name(header, self.grammar);
        tree.node_mut(node).params = param_names(header, self.grammar);
        self.pos += header_end;
        if brace.is_some() {
            self.block(tree, node);
        }
    }

    fn block(&mut self, tree: &mut SyntaxTree, parent: NodeId) {
        let node = tree.alloc(NodeKind::Block);
        tree.push_child(parent, node);
        if self.rest().starts_with('{') {
            let lb = tree.leaf(NodeKind::LBrace, "{");
            tree.push_child(node, lb);
            self.pos += 1;
        }
        self.items(tree, node);
        if self.rest().starts_with('}') {
            let rb = tree.leaf(NodeKind::RBrace, "}");
            tree.push_child(node, rb);
            self.pos += 1;
        }
    }

    fn statement(&mut self, tree: &mut SyntaxTree, parent: NodeId) {
        let rest = self.rest();
        let (mut end, brace) = statement_extent(rest);
        if let Some(brace_idx) = brace {
            let head = &rest[..brace_idx];
            self.pos += brace_idx;
            if head.trim().is_empty() {
                self.block(tree, parent);
            } else if self.grammar == Grammar::JavaLike || is_control(head) {
                let tok = tree.leaf(NodeKind::Token, head);
                tree.push_child(parent, tok);
                self.block(tree, parent);
            } else {
                self.lambda_call(tree, parent, head);
            }
            return;
        }
        while end > 0 && matches!(rest.as_bytes()[end - 1], b' ' | b'\t') {
            end -= 1;
        }
        if end == 0 {
            let len = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(0);
            if len == 0 {
                return;
            }
            let tok = tree.leaf(NodeKind::Token, &rest[..len]);
            tree.push_child(parent, tok);
            self.pos += len;
            return;
        }
        let text = &rest[..end];
        self.pos += end;
        build_statement(tree, parent, text, self.grammar);
    }

    /// `receiver?.call { ... }`: the trailing lambda block nests inside the
    /// call, the call inside its qualification chain.
    fn lambda_call(&mut self, tree: &mut SyntaxTree, parent: NodeId, head: &'s str) {
        match top_level_dots(head).last().copied() {
            Some(dot) => {
                let chain = tree.alloc(NodeKind::QualifiedExpression);
                tree.push_child(parent, chain);
                let recv = tree.leaf(NodeKind::Token, &head[..=dot]);
                tree.push_child(chain, recv);
                let call = tree.alloc(NodeKind::CallExpression);
                tree.push_child(chain, call);
                let name = tree.leaf(NodeKind::Token, &head[dot + 1..]);
                tree.push_child(call, name);
                self.block(tree, call);
            }
            None => {
                let call = tree.alloc(NodeKind::CallExpression);
                tree.push_child(parent, call);
                let name = tree.leaf(NodeKind::Token, head);
                tree.push_child(call, name);
                self.block(tree, call);
            }
        }
    }
}

fn build_statement(tree: &mut SyntaxTree, parent: NodeId, text: &str, grammar: Grammar) {
    let stripped = strip_modifiers(text);
    if grammar == Grammar::KotlinLike {
        let word = leading_word(stripped);
        if word == "val" || word == "var" || word == "lateinit" {
            let decl = tree.leaf(NodeKind::DeclarationStatement, text);
            tree.push_child(parent, decl);
            return;
        }
    }
    if let Some((idx, op)) = find_assignment(text) {
        let lhs = text[..idx].trim();
        if is_simple_target(lhs) {
            build_assignment(tree, parent, text, lhs, op, grammar);
        } else {
            // multi-word target means a declaration with an initializer
            let decl = tree.leaf(NodeKind::DeclarationStatement, text);
            tree.push_child(parent, decl);
        }
        return;
    }
    if grammar == Grammar::KotlinLike && looks_like_call(stripped) {
        build_call_chain(tree, parent, text);
        return;
    }
    let kind = match grammar {
        Grammar::JavaLike => NodeKind::ExpressionStatement,
        Grammar::KotlinLike => NodeKind::Token,
    };
    let leaf = tree.leaf(kind, text);
    tree.push_child(parent, leaf);
}

fn build_assignment(
    tree: &mut SyntaxTree,
    parent: NodeId,
    text: &str,
    lhs: &str,
    op: AssignOp,
    grammar: Grammar,
) {
    match grammar {
        Grammar::KotlinLike => {
            let assign = tree.alloc(NodeKind::BinaryExpression);
            tree.node_mut(assign).name = Some(lhs.to_string());
            tree.node_mut(assign).op = Some(op);
            tree.push_child(parent, assign);
            let tok = tree.leaf(NodeKind::Token, text);
            tree.push_child(assign, tok);
        }
        Grammar::JavaLike => {
            let stmt = tree.alloc(NodeKind::ExpressionStatement);
            tree.push_child(parent, stmt);
            let assign = tree.alloc(NodeKind::BinaryExpression);
            tree.node_mut(assign).name = Some(lhs.to_string());
            tree.node_mut(assign).op = Some(op);
            tree.push_child(stmt, assign);
            let body = text.strip_suffix(';').unwrap_or(text);
            let tok = tree.leaf(NodeKind::Token, body);
            tree.push_child(assign, tok);
            if text.ends_with(';') {
                let semi = tree.leaf(NodeKind::Token, ";");
                tree.push_child(stmt, semi);
            }
        }
    }
}

/// `a.b("x").c("y")` becomes a qualified chain whose first call spans the
/// receiver up to the first parenthesized segment; later segments hang off
/// their own dot tokens.
fn build_call_chain(tree: &mut SyntaxTree, parent: NodeId, text: &str) {
    let dots = top_level_dots(text);
    let mut boundaries = dots.clone();
    boundaries.push(text.len());
    let mut seg_start = 0;
    let mut first_end = None;
    for &b in &boundaries {
        if text[seg_start..b].contains('(') {
            first_end = Some(b);
            break;
        }
        seg_start = b + 1;
    }
    let Some(first_end) = first_end else {
        let tok = tree.leaf(NodeKind::Token, text);
        tree.push_child(parent, tok);
        return;
    };
    if first_end == text.len() {
        let call = tree.leaf(NodeKind::CallExpression, text);
        tree.push_child(parent, call);
        return;
    }
    let chain = tree.alloc(NodeKind::QualifiedExpression);
    tree.push_child(parent, chain);
    let first = tree.leaf(NodeKind::CallExpression, &text[..first_end]);
    tree.push_child(chain, first);
    let mut pos = first_end;
    let mut bounds: Vec<usize> = dots.into_iter().filter(|&d| d > first_end).collect();
    bounds.push(text.len());
    for &b in &bounds {
        if pos >= b {
            continue;
        }
        let dot = tree.leaf(NodeKind::Token, &text[pos..pos + 1]);
        tree.push_child(chain, dot);
        let seg = &text[pos + 1..b];
        let kind = if seg.contains('(') {
            NodeKind::CallExpression
        } else {
            NodeKind::Token
        };
        let leaf = tree.leaf(kind, seg);
        tree.push_child(chain, leaf);
        pos = b;
    }
}

/// Extent of one statement: (end index, optional index of a block-opening
/// brace). Strings and bracket depth are tracked so separators inside
/// arguments do not terminate the scan.
fn statement_extent(s: &str) -> (usize, Option<usize>) {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut in_string = false;
    let mut depth = 0i32;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == b'"' {
                in_string = false;
            }
        } else {
            match c {
                b'"' => in_string = true,
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth -= 1,
                b'{' if depth == 0 => return (i, Some(i)),
                b'\n' if depth == 0 => return (i, None),
                b';' if depth == 0 => return (i + 1, None),
                b'}' if depth == 0 => return (i, None),
                _ => {}
            }
        }
        i += 1;
    }
    (bytes.len(), None)
}

/// First assignment operator at top level, with its parsed kind.
fn find_assignment(s: &str) -> Option<(usize, AssignOp)> {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut in_string = false;
    let mut depth = 0i32;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match c {
            b'"' => in_string = true,
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 => {
                if i + 1 < bytes.len() && bytes[i + 1] == b'=' {
                    i += 2;
                    continue;
                }
                if i > 0 {
                    match bytes[i - 1] {
                        b'!' | b'<' | b'>' => {
                            i += 1;
                            continue;
                        }
                        b'+' => return Some((i - 1, AssignOp::AddAssign)),
                        b'-' => return Some((i - 1, AssignOp::SubAssign)),
                        b'*' => return Some((i - 1, AssignOp::MulAssign)),
                        b'/' => return Some((i - 1, AssignOp::DivAssign)),
                        b'%' => return Some((i - 1, AssignOp::RemAssign)),
                        _ => {}
                    }
                }
                return Some((i, AssignOp::Assign));
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// One token naming a storage location: identifier, field path, or an indexed
/// element. A spaced left side is a declaration, not an assignment target.
fn is_simple_target(lhs: &str) -> bool {
    !lhs.is_empty()
        && lhs
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | '[' | ']'))
}

fn looks_like_call(s: &str) -> bool {
    let word = leading_word(s);
    !word.is_empty() && !CONTROL.contains(&word) && find_outside_strings(s, '(').is_some()
}

fn looks_like_java_method(line: &str) -> bool {
    let stripped = strip_modifiers(line);
    let word = leading_word(stripped);
    if word.is_empty() || word == "new" || CONTROL.contains(&word) {
        return false;
    }
    if !line.trim_end().ends_with('{') {
        return false;
    }
    let Some(open) = find_outside_strings(line, '(') else {
        return false;
    };
    let Some(brace) = find_outside_strings(line, '{') else {
        return false;
    };
    open < brace && find_assignment(&line[..brace]).is_none()
}

fn is_control(head: &str) -> bool {
    CONTROL.contains(&leading_word(strip_modifiers(head)))
}

fn leading_word(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

fn strip_modifiers(mut s: &str) -> &str {
    loop {
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix('@') {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '(')
                .unwrap_or(rest.len());
            s = &rest[end..];
            continue;
        }
        let word = leading_word(s);
        if !word.is_empty() && MODIFIERS.contains(&word) {
            s = &s[word.len()..];
            continue;
        }
        return s;
    }
}

fn type_name(header: &str) -> Option<String> {
    let mut s = strip_modifiers(header);
    loop {
        let word = leading_word(s);
        if matches!(word, "class" | "interface" | "object" | "enum") {
            s = strip_modifiers(&s[word.len()..]);
            continue;
        }
        return (!word.is_empty()).then(|| word.to_string());
    }
}

fn function_name(header: &str, grammar: Grammar) -> Option<String> {
    match grammar {
        Grammar::KotlinLike => {
            let stripped = strip_modifiers(header);
            let after = stripped.strip_prefix("fun")?.trim_start();
            let name = leading_word(after);
            (!name.is_empty()).then(|| name.to_string())
        }
        Grammar::JavaLike => {
            let open = find_outside_strings(header, '(')?;
            let before = header[..open].trim_end();
            let start = before
                .rfind(|c: char| !(c.is_alphanumeric() || c == '_'))
                .map(|i| i + 1)
                .unwrap_or(0);
            let name = &before[start..];
            (!name.is_empty()).then(|| name.to_string())
        }
    }
}

fn param_names(header: &str, grammar: Grammar) -> Vec<String> {
    let Some(open) = find_outside_strings(header, '(') else {
        return Vec::new();
    };
    let bytes = header.as_bytes();
    let mut depth = 0i32;
    let mut close = None;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
        i += 1;
    }
    let Some(close) = close else {
        return Vec::new();
    };
    let inner = &header[open + 1..close];
    if inner.trim().is_empty() {
        return Vec::new();
    }
    split_top_level_commas(inner)
        .into_iter()
        .filter_map(|seg| single_param_name(seg, grammar))
        .collect()
}

fn single_param_name(seg: &str, grammar: Grammar) -> Option<String> {
    let seg = seg.trim();
    if seg.is_empty() {
        return None;
    }
    match grammar {
        Grammar::KotlinLike => {
            let before_colon = seg.split(':').next().unwrap_or(seg);
            let name = before_colon.trim().split_whitespace().last()?;
            Some(name.to_string())
        }
        Grammar::JavaLike => {
            let name = seg.split_whitespace().last()?;
            Some(name.trim_start_matches("...").to_string())
        }
    }
}

fn find_outside_strings(s: &str, target: char) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == b'"' {
                in_string = false;
            }
        } else if c == b'"' {
            in_string = true;
        } else if c == target as u8 {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn top_level_dots(s: &str) -> Vec<usize> {
    let bytes = s.as_bytes();
    let mut dots = Vec::new();
    let mut in_string = false;
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == b'"' {
                in_string = false;
            }
        } else {
            match c {
                b'"' => in_string = true,
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                b'.' if depth == 0 => dots.push(i),
                _ => {}
            }
        }
        i += 1;
    }
    dots
}

fn split_top_level_commas(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == b'"' {
                in_string = false;
            }
        } else {
            match c {
                b'"' => in_string = true,
                b'(' | b'[' | b'<' | b'{' => depth += 1,
                b')' | b']' | b'>' | b'}' => depth -= 1,
                b',' if depth == 0 => {
                    parts.push(&s[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }
        i += 1;
    }
    parts.push(&s[start..]);
    parts
}
