// Syntax tree data structures for Logweaver.
// A full-fidelity, whitespace-preserving tree over one source file. The tree
// is built by the host (see infrastructure::fixture); the engine only queries
// and mutates it through the node API below.

use crate::domain::grammar::Grammar;

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// Node types understood by the injection and removal engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    PackageDirective,
    ImportList,
    ImportDirective,
    TypeDeclaration,
    Function,
    Block,
    ExpressionStatement,
    DeclarationStatement,
    BinaryExpression,
    CallExpression,
    QualifiedExpression,
    LBrace,
    RBrace,
    Whitespace,
    Comment,
    Token,
}

impl NodeKind {
    /// Whitespace and comments are skipped when scanning statement siblings.
    pub fn is_trivia(&self) -> bool {
        matches!(self, NodeKind::Whitespace | NodeKind::Comment)
    }

    pub fn is_statement_container(&self) -> bool {
        matches!(self, NodeKind::Block | NodeKind::Function)
    }
}

/// Assignment operators recognized on binary expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
}

impl AssignOp {
    pub fn from_token(tok: &str) -> Option<AssignOp> {
        match tok {
            "=" => Some(AssignOp::Assign),
            "+=" => Some(AssignOp::AddAssign),
            "-=" => Some(AssignOp::SubAssign),
            "*=" => Some(AssignOp::MulAssign),
            "/=" => Some(AssignOp::DivAssign),
            "%=" => Some(AssignOp::RemAssign),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::RemAssign => "%=",
        }
    }
}

/// One node in the arena. Leaves carry exact source text; interior nodes
/// derive their text from their descendants.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Exact source text (leaves only).
    pub text: Option<String>,
    /// Function/type name, or the left-hand target of an assignment.
    pub name: Option<String>,
    /// Ordered parameter names (functions only).
    pub params: Vec<String>,
    /// Assignment operator (binary expressions only).
    pub op: Option<AssignOp>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            text: None,
            name: None,
            params: Vec::new(),
            op: None,
        }
    }
}

/// Arena-backed syntax tree for one source file, tagged with its grammar.
///
/// Deleted nodes are detached from their parent but stay allocated; trees are
/// transient (one user operation) so the arena never shrinks.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    grammar: Grammar,
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn new(grammar: Grammar) -> Self {
        let root = NodeData::new(NodeKind::File);
        Self {
            grammar,
            nodes: vec![root],
            root: 0,
        }
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    // ------------------------------------------------------------------
    // Construction (host side)
    // ------------------------------------------------------------------

    /// Allocate a detached interior node.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData::new(kind));
        self.nodes.len() - 1
    }

    /// Allocate a detached leaf carrying exact source text.
    pub fn leaf(&mut self, kind: NodeKind, text: impl Into<String>) -> NodeId {
        let id = self.alloc(kind);
        self.nodes[id].text = Some(text.into());
        id
    }

    /// Append `child` as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Factory for a rendered log statement. The node kind reflects what the
    /// grammar's parser would produce for the same text, so a later removal
    /// pass finds the statement through the same queries as hand-written code.
    pub fn create_statement_from_text(&mut self, text: &str) -> NodeId {
        let kind = match self.grammar {
            Grammar::JavaLike => NodeKind::ExpressionStatement,
            Grammar::KotlinLike => NodeKind::CallExpression,
        };
        self.leaf(kind, text)
    }

    pub fn create_whitespace(&mut self, text: &str) -> NodeId {
        self.leaf(NodeKind::Whitespace, text)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Exact source text of the subtree rooted at `id`.
    pub fn node_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        if let Some(text) = &node.text {
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// Exact source text of the whole file.
    pub fn text(&self) -> String {
        self.node_text(self.root)
    }

    /// All descendants of `scope` (excluding `scope` itself) with the given
    /// kind, in preorder.
    pub fn descendants_of_kind(&self, scope: NodeId, kind: NodeKind) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk_descendants(scope, kind, &mut found);
        found
    }

    fn walk_descendants(&self, id: NodeId, kind: NodeKind, found: &mut Vec<NodeId>) {
        for &child in &self.nodes[id].children {
            if self.nodes[child].kind == kind {
                found.push(child);
            }
            self.walk_descendants(child, kind, found);
        }
    }

    /// Nearest strict ancestor of `id` with the given kind.
    pub fn nearest_ancestor_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        let mut current = self.nodes[id].parent;
        while let Some(node) = current {
            if self.nodes[node].kind == kind {
                return Some(node);
            }
            current = self.nodes[node].parent;
        }
        None
    }

    /// True when `ancestor` strictly contains `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.nodes[id].parent;
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes[node].parent;
        }
        false
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id].parent?;
        let siblings = &self.nodes[parent].children;
        let pos = siblings.iter().position(|&c| c == id)?;
        if pos == 0 {
            None
        } else {
            Some(siblings[pos - 1])
        }
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id].parent?;
        let siblings = &self.nodes[parent].children;
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Byte offset of the subtree rooted at `id` within the file text.
    pub fn offset_of(&self, id: NodeId) -> usize {
        let mut offset = 0;
        self.find_offset(self.root, id, &mut offset);
        offset
    }

    fn find_offset(&self, current: NodeId, target: NodeId, offset: &mut usize) -> bool {
        if current == target {
            return true;
        }
        let node = &self.nodes[current];
        if let Some(text) = &node.text {
            *offset += text.len();
        }
        for &child in &node.children {
            if self.find_offset(child, target, offset) {
                return true;
            }
        }
        false
    }

    /// Deepest node whose text span contains the byte offset. Every file
    /// character lives in a leaf, so this returns the containing leaf, or the
    /// file root when the offset is past the end of the text.
    pub fn node_at_offset(&self, offset: usize) -> NodeId {
        let mut best = self.root;
        let mut pos = 0;
        self.descend_at_offset(self.root, offset, &mut pos, &mut best);
        best
    }

    fn descend_at_offset(
        &self,
        current: NodeId,
        offset: usize,
        pos: &mut usize,
        best: &mut NodeId,
    ) -> bool {
        let start = *pos;
        let node = &self.nodes[current];
        if let Some(text) = &node.text {
            *pos += text.len();
        }
        if node.children.is_empty() {
            if start <= offset && offset < *pos {
                *best = current;
                return true;
            }
            return false;
        }
        for &child in &node.children {
            if self.descend_at_offset(child, offset, pos, best) {
                return true;
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Mutation (engine side, inside one host transaction)
    // ------------------------------------------------------------------

    /// Insert `node` as the sibling immediately after `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        if let Some(parent) = self.nodes[anchor].parent {
            let pos = self.nodes[parent]
                .children
                .iter()
                .position(|&c| c == anchor)
                .expect("anchor must be a child of its parent");
            self.nodes[parent].children.insert(pos + 1, node);
            self.nodes[node].parent = Some(parent);
        }
    }

    /// Insert `node` as the sibling immediately before `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        if let Some(parent) = self.nodes[anchor].parent {
            let pos = self.nodes[parent]
                .children
                .iter()
                .position(|&c| c == anchor)
                .expect("anchor must be a child of its parent");
            self.nodes[parent].children.insert(pos, node);
            self.nodes[node].parent = Some(parent);
        }
    }

    /// Detach `node` from its parent. The arena slot stays allocated.
    pub fn delete(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node].parent {
            self.nodes[parent].children.retain(|&c| c != node);
            self.nodes[node].parent = None;
        }
    }

    /// Detach `node` together with the whitespace leaf directly before it,
    /// collapsing the source line the node occupied.
    pub fn delete_with_leading_trivia(&mut self, node: NodeId) {
        if let Some(prev) = self.prev_sibling(node) {
            if self.nodes[prev].kind == NodeKind::Whitespace {
                self.delete(prev);
            }
        }
        self.delete(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> (SyntaxTree, NodeId, NodeId) {
        // fun f() { a = 1 }
        let mut tree = SyntaxTree::new(Grammar::KotlinLike);
        let root = tree.root();
        let func = tree.alloc(NodeKind::Function);
        tree.node_mut(func).name = Some("f".to_string());
        tree.push_child(root, func);
        let header = tree.leaf(NodeKind::Token, "fun f() ");
        tree.push_child(func, header);
        let block = tree.alloc(NodeKind::Block);
        tree.push_child(func, block);
        let lbrace = tree.leaf(NodeKind::LBrace, "{");
        tree.push_child(block, lbrace);
        let ws = tree.leaf(NodeKind::Whitespace, " ");
        tree.push_child(block, ws);
        let assign = tree.alloc(NodeKind::BinaryExpression);
        tree.node_mut(assign).name = Some("a".to_string());
        tree.node_mut(assign).op = Some(AssignOp::Assign);
        tree.push_child(block, assign);
        let assign_text = tree.leaf(NodeKind::Token, "a = 1");
        tree.push_child(assign, assign_text);
        let ws2 = tree.leaf(NodeKind::Whitespace, " ");
        tree.push_child(block, ws2);
        let rbrace = tree.leaf(NodeKind::RBrace, "}");
        tree.push_child(block, rbrace);
        (tree, block, assign)
    }

    #[test]
    fn test_text_round_trip() {
        let (tree, _, _) = small_tree();
        assert_eq!(tree.text(), "fun f() { a = 1 }");
    }

    #[test]
    fn test_descendants_and_ancestors() {
        let (tree, block, assign) = small_tree();
        let found = tree.descendants_of_kind(tree.root(), NodeKind::BinaryExpression);
        assert_eq!(found, vec![assign]);
        assert_eq!(tree.nearest_ancestor_of_kind(assign, NodeKind::Block), Some(block));
        assert!(tree.is_ancestor(block, assign));
        assert!(!tree.is_ancestor(assign, block));
    }

    #[test]
    fn test_insert_after_and_delete() {
        let (mut tree, _, assign) = small_tree();
        let log = tree.create_statement_from_text("println(\"T: a\")");
        let ws = tree.create_whitespace(" ");
        tree.insert_after(assign, ws);
        tree.insert_after(ws, log);
        assert_eq!(tree.text(), "fun f() { a = 1 println(\"T: a\") }");

        tree.delete_with_leading_trivia(log);
        assert_eq!(tree.text(), "fun f() { a = 1 }");
    }

    #[test]
    fn test_offsets() {
        let (tree, _, assign) = small_tree();
        let offset = tree.offset_of(assign);
        assert_eq!(offset, "fun f() {".len() + 1);
        let at = tree.node_at_offset(offset);
        // Deepest node at the assignment start is its text leaf.
        assert_eq!(tree.node_text(at), "a = 1");
    }

    #[test]
    fn test_statement_factory_kind_follows_grammar() {
        let mut kt = SyntaxTree::new(Grammar::KotlinLike);
        let stmt = kt.create_statement_from_text("println(\"x\")");
        assert_eq!(kt.kind(stmt), NodeKind::CallExpression);

        let mut java = SyntaxTree::new(Grammar::JavaLike);
        let stmt = java.create_statement_from_text("System.out.println(\"x\");");
        assert_eq!(java.kind(stmt), NodeKind::ExpressionStatement);
    }
}
