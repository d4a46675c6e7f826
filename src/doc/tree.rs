//! Arena-backed document tree.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`]. Parent
//! links make upward walks (nearest common ancestor, enclosing cell) cheap and
//! allocation-free; removing a node only detaches it, so ids captured before
//! an edit never dangle. Every node caches its content length, updated along
//! the ancestor chain on attach and detach, so offset arithmetic never walks
//! a subtree.

use super::node::{CellProps, ElementType, Node, NodeId, NodeKind, TableProps};
use crate::error::{Result, TableError};

/// A hierarchical rich-text document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a single root container
    pub fn new() -> Self {
        Document {
            nodes: vec![Node {
                kind: NodeKind::Other,
                parent: None,
                children: Vec::new(),
                content_len: 0,
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(Node::kind)
    }

    pub fn element_type(&self, id: NodeId) -> Option<ElementType> {
        self.kind(id).map(NodeKind::element_type)
    }

    /// Whether `id` is a node of the given type
    pub fn is(&self, id: NodeId, ty: ElementType) -> bool {
        self.element_type(id) == Some(ty)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Children of `id`; empty for unknown nodes
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Index of `id` among its parent's children
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Iterate `id` and its ancestors, innermost first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.node(id).map(|_| id),
        }
    }

    /// Nearest ancestor-or-self of the given type
    pub fn enclosing(&self, id: NodeId, ty: ElementType) -> Option<NodeId> {
        self.ancestors(id).find(|&a| self.is(a, ty))
    }

    /// Whether `id` is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors(id).last() == Some(self.root)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Inline(text) => Some(text),
            _ => None,
        }
    }

    pub fn cell_props(&self, id: NodeId) -> Option<&CellProps> {
        match self.kind(id)? {
            NodeKind::Cell(props) => Some(props),
            _ => None,
        }
    }

    pub fn cell_props_mut(&mut self, id: NodeId) -> Option<&mut CellProps> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Cell(props)) => Some(props),
            _ => None,
        }
    }

    pub fn table_props(&self, id: NodeId) -> Option<&TableProps> {
        match self.kind(id)? {
            NodeKind::Table(props) => Some(props),
            _ => None,
        }
    }

    pub fn table_props_mut(&mut self, id: NodeId) -> Option<&mut TableProps> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Table(props)) => Some(props),
            _ => None,
        }
    }

    /// Cell properties, or an error naming the node
    pub(crate) fn require_cell(&self, id: NodeId) -> Result<&CellProps> {
        self.cell_props(id).ok_or(TableError::UnexpectedElement {
            node: id,
            expected: ElementType::Cell,
        })
    }

    pub(crate) fn require_cell_mut(&mut self, id: NodeId) -> Result<&mut CellProps> {
        self.cell_props_mut(id).ok_or(TableError::UnexpectedElement {
            node: id,
            expected: ElementType::Cell,
        })
    }

    /// Parent of `id`, checked to be of the given type
    pub(crate) fn require_parent(&self, id: NodeId, expected: ElementType) -> Result<NodeId> {
        self.parent(id)
            .filter(|&p| self.is(p, expected))
            .ok_or(TableError::UnexpectedElement { node: id, expected })
    }

    /// Allocate a detached node
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let content_len = match &kind {
            NodeKind::Inline(text) => text.chars().count(),
            _ => 0,
        };
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            content_len,
        });
        id
    }

    /// Attach a detached node as the last child of `parent`
    ///
    /// # Errors
    /// Fails on unknown nodes, already-attached children and schema violations.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Attach a detached node at `index` (clamped) among `parent`'s children
    ///
    /// # Errors
    /// Fails on unknown nodes, already-attached children and schema violations.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        let parent_ty = self
            .element_type(parent)
            .ok_or(TableError::UnknownNode(parent))?;
        let child_ty = self
            .element_type(child)
            .ok_or(TableError::UnknownNode(child))?;
        if !parent_ty.accepts(child_ty) {
            return Err(TableError::InvalidChild {
                parent: parent_ty,
                child: child_ty,
            });
        }
        if self.parent(child).is_some() || child == self.root {
            return Err(TableError::AlreadyAttached(child));
        }
        if self.ancestors(parent).any(|a| a == child) {
            return Err(TableError::InvalidChild {
                parent: parent_ty,
                child: child_ty,
            });
        }

        if let Some(node) = self.nodes.get_mut(parent.0) {
            let at = index.min(node.children.len());
            node.children.insert(at, child);
        }
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        }
        let len = self.symbol_len(child);
        self.resize_ancestors(parent, |n| n + len);
        Ok(())
    }

    /// Remove `id` from its parent. The subtree stays intact in the arena.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.parent = None;
        }
        let len = self.symbol_len(id);
        self.resize_ancestors(parent, |n| n.saturating_sub(len));
    }

    /// Apply `f` to the cached content length of `from` and every ancestor
    fn resize_ancestors(&mut self, from: NodeId, f: impl Fn(usize) -> usize) {
        let mut next = Some(from);
        while let Some(id) = next {
            let Some(node) = self.nodes.get_mut(id.0) else {
                break;
            };
            node.content_len = f(node.content_len);
            next = node.parent;
        }
    }

    /// Create a block holding `text` (empty text gives an empty block)
    ///
    /// # Errors
    /// Fails if `parent` cannot hold blocks.
    pub fn append_paragraph(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        let block = self.create(NodeKind::Block);
        if !text.is_empty() {
            let run = self.create(NodeKind::Inline(text.to_string()));
            self.append_child(block, run)?;
        }
        self.append_child(parent, block)?;
        Ok(block)
    }

    /// Concatenated text of every run below `id`, one line per block
    pub fn plain_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Inline(text)) => out.push_str(text),
            Some(NodeKind::Block) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            Some(_) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    /// Whether the subtree holds any text or nested table
    pub fn has_content(&self, id: NodeId) -> bool {
        match self.kind(id) {
            Some(NodeKind::Inline(text)) => !text.is_empty(),
            Some(NodeKind::Table(_)) => true,
            Some(_) => self.children(id).iter().any(|&c| self.has_content(c)),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Symbol geometry. Every element contributes a start and an end
    // symbol, every character of a run one symbol. The root contributes
    // none, so document offsets run from 0 to `content_len(root)`.
    // ------------------------------------------------------------------

    /// Number of symbols `id` occupies, including its own start/end tags
    pub fn symbol_len(&self, id: NodeId) -> usize {
        self.content_len(id) + 2
    }

    /// Number of symbols between `id`'s start and end tags
    pub fn content_len(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.content_len)
    }

    /// Offset of `id`'s start tag; `None` for the root and detached nodes
    pub fn element_start(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let mut offset = self.content_start(parent)?;
        for &sibling in self.children(parent) {
            if sibling == id {
                return Some(offset);
            }
            offset += self.symbol_len(sibling);
        }
        None
    }

    /// Offset just past `id`'s end tag
    pub fn element_end(&self, id: NodeId) -> Option<usize> {
        Some(self.element_start(id)? + self.symbol_len(id))
    }

    /// Offset of the first content slot of `id`
    pub fn content_start(&self, id: NodeId) -> Option<usize> {
        if id == self.root {
            return Some(0);
        }
        Some(self.element_start(id)? + 1)
    }

    /// Offset of the last content slot of `id` (just before its end tag)
    pub fn content_end(&self, id: NodeId) -> Option<usize> {
        Some(self.content_start(id)? + self.content_len(id))
    }
}

/// Upward walk over a node and its ancestors
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_misplaced_nodes() {
        let mut doc = Document::new();
        let row = doc.create(NodeKind::Row);
        let err = doc.append_child(doc.root(), row).unwrap_err();
        assert!(matches!(err, TableError::InvalidChild { .. }));

        let cell = doc.create(NodeKind::Cell(CellProps::default()));
        let block = doc.create(NodeKind::Block);
        doc.append_child(cell, block).unwrap();
        let other = doc.create(NodeKind::Cell(CellProps::default()));
        assert!(matches!(
            doc.append_child(other, block),
            Err(TableError::AlreadyAttached(_))
        ));
    }

    #[test]
    fn test_symbol_offsets() {
        let mut doc = Document::new();
        let root = doc.root();
        let first = doc.append_paragraph(root, "ab").unwrap();
        let second = doc.append_paragraph(root, "").unwrap();

        // <p><r>ab</r></p><p></p>
        assert_eq!(doc.symbol_len(first), 6);
        assert_eq!(doc.element_start(first), Some(0));
        assert_eq!(doc.element_end(first), Some(6));
        assert_eq!(doc.element_start(second), Some(6));
        assert_eq!(doc.content_start(second), Some(7));
        assert_eq!(doc.content_end(second), Some(7));
        assert_eq!(doc.content_len(root), 8);
    }

    #[test]
    fn test_detach_keeps_subtree() {
        let mut doc = Document::new();
        let root = doc.root();
        let para = doc.append_paragraph(root, "hello").unwrap();
        let run = doc.children(para)[0];
        doc.detach(para);

        assert!(doc.children(root).is_empty());
        assert!(!doc.is_attached(run));
        assert_eq!(doc.text(run), Some("hello"));
        assert_eq!(doc.element_start(para), None);
    }

    /// Sum of symbols by walking the subtree
    fn measured_len(doc: &Document, id: NodeId) -> usize {
        match doc.kind(id) {
            Some(NodeKind::Inline(text)) => text.chars().count(),
            _ => doc
                .children(id)
                .iter()
                .map(|&c| measured_len(doc, c) + 2)
                .sum(),
        }
    }

    #[test]
    fn test_cached_lengths_follow_edits() {
        let mut doc = Document::new();
        let root = doc.root();
        let first = doc.append_paragraph(root, "héllo").unwrap();
        let cell = doc.create(NodeKind::Cell(CellProps::default()));
        let inner = doc.append_paragraph(cell, "xy").unwrap();
        assert_eq!(doc.content_len(cell), 6);

        let row = doc.create(NodeKind::Row);
        doc.append_child(row, cell).unwrap();
        let group = doc.create(NodeKind::RowGroup);
        doc.append_child(group, row).unwrap();
        let table = doc.create(NodeKind::Table(TableProps::default()));
        doc.append_child(table, group).unwrap();
        doc.insert_child(root, 0, table).unwrap();
        assert_eq!(doc.content_len(root), measured_len(&doc, root));
        assert_eq!(doc.element_start(first), Some(14));

        doc.detach(inner);
        assert_eq!(doc.content_len(cell), 0);
        assert_eq!(doc.content_len(root), measured_len(&doc, root));

        doc.detach(table);
        assert_eq!(doc.content_len(root), 9);
        assert_eq!(doc.content_len(table), measured_len(&doc, table));
        doc.detach(table);
        assert_eq!(doc.content_len(root), 9);
    }

    #[test]
    fn test_plain_text_joins_blocks() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_paragraph(root, "one").unwrap();
        doc.append_paragraph(root, "two").unwrap();
        assert_eq!(doc.plain_text(root), "one\ntwo");
        assert!(doc.has_content(root));
    }
}
