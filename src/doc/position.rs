//! Positions and segments over the document's symbol stream.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::node::{ElementType, NodeId, NodeKind};
use super::tree::Document;

/// Affinity of a position to the content on one of its sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LogicalDirection {
    Backward,
    #[default]
    Forward,
}

impl LogicalDirection {
    pub fn reverse(self) -> Self {
        match self {
            LogicalDirection::Backward => LogicalDirection::Forward,
            LogicalDirection::Forward => LogicalDirection::Backward,
        }
    }
}

/// Edges of an element a position can be moved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementEdge {
    /// Just before the start tag
    BeforeStart,
    /// Just after the start tag (content start)
    AfterStart,
    /// Just before the end tag (content end)
    BeforeEnd,
    /// Just after the end tag
    AfterEnd,
}

/// An immutable location between two symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    offset: usize,
    direction: LogicalDirection,
}

impl TextPosition {
    pub fn new(offset: usize, direction: LogicalDirection) -> Self {
        Self { offset, direction }
    }

    pub fn offset(self) -> usize {
        self.offset
    }

    pub fn direction(self) -> LogicalDirection {
        self.direction
    }

    pub fn with_direction(self, direction: LogicalDirection) -> Self {
        Self {
            offset: self.offset,
            direction,
        }
    }
}

/// Ordered pair of positions, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    start: TextPosition,
    end: TextPosition,
}

impl TextSegment {
    /// Build a segment from two positions in any order
    pub fn new(a: TextPosition, b: TextPosition) -> Self {
        if a.offset <= b.offset {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn collapsed(position: TextPosition) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn start(&self) -> TextPosition {
        self.start
    }

    pub fn end(&self) -> TextPosition {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    pub fn contains(&self, position: TextPosition) -> bool {
        self.start.offset <= position.offset && position.offset <= self.end.offset
    }
}

impl Document {
    /// Offset of the very last position in the document
    pub fn document_end(&self) -> usize {
        self.content_len(self.root())
    }

    /// Order two positions by document offset
    pub fn compare_positions(&self, a: TextPosition, b: TextPosition) -> Ordering {
        a.offset.cmp(&b.offset)
    }

    /// Innermost element whose content holds `position`
    pub fn position_parent(&self, position: TextPosition) -> NodeId {
        let p = position.offset;
        let mut node = self.root();
        let mut base = 0;
        'descend: loop {
            if self.is(node, ElementType::Inline) {
                return node;
            }
            let mut offset = base;
            for &child in self.children(node) {
                let len = self.symbol_len(child);
                if offset < p && p < offset + len {
                    node = child;
                    base = offset + 1;
                    continue 'descend;
                }
                offset += len;
                if offset >= p {
                    break;
                }
            }
            return node;
        }
    }

    /// Whether both positions share the same parent element
    pub fn has_equal_scope(&self, a: TextPosition, b: TextPosition) -> bool {
        self.position_parent(a) == self.position_parent(b)
    }

    pub fn parent_type(&self, position: TextPosition) -> ElementType {
        self.element_type(self.position_parent(position))
            .unwrap_or(ElementType::Other)
    }

    /// Position at one edge of `element`
    pub fn element_position(&self, element: NodeId, edge: ElementEdge) -> Option<TextPosition> {
        let (offset, direction) = match edge {
            ElementEdge::BeforeStart => (self.element_start(element)?, LogicalDirection::Forward),
            ElementEdge::AfterStart => (self.content_start(element)?, LogicalDirection::Forward),
            ElementEdge::BeforeEnd => (self.content_end(element)?, LogicalDirection::Backward),
            ElementEdge::AfterEnd => (self.element_end(element)?, LogicalDirection::Backward),
        };
        Some(TextPosition::new(offset, direction))
    }

    /// Move to an edge of the element that contains `position`
    pub fn move_to_element_edge(
        &self,
        position: TextPosition,
        edge: ElementEdge,
    ) -> Option<TextPosition> {
        self.element_position(self.position_parent(position), edge)
    }

    /// Whether a caret may sit at `position`: inside a run, or inside an
    /// empty block
    pub fn is_at_insertion_position(&self, position: TextPosition) -> bool {
        if position.offset > self.document_end() {
            return false;
        }
        let parent = self.position_parent(position);
        match self.kind(parent) {
            Some(NodeKind::Inline(_)) => true,
            Some(NodeKind::Block) => self.children(parent).is_empty(),
            _ => false,
        }
    }

    /// Closest insertion position strictly after (or before) `position`
    pub fn next_insertion_position(
        &self,
        position: TextPosition,
        direction: LogicalDirection,
    ) -> Option<TextPosition> {
        let end = self.document_end();
        let found = match direction {
            LogicalDirection::Forward => (position.offset + 1..=end)
                .find(|&o| self.is_at_insertion_position(position.at(o))),
            LogicalDirection::Backward => (0..position.offset.min(end + 1))
                .rev()
                .find(|&o| self.is_at_insertion_position(position.at(o))),
        };
        found.map(|o| position.at(o))
    }

    /// `position` itself when it is an insertion position, otherwise the
    /// nearest one in `direction`, then in the opposite direction
    pub fn insertion_position(
        &self,
        position: TextPosition,
        direction: LogicalDirection,
    ) -> TextPosition {
        if self.is_at_insertion_position(position) {
            return position;
        }
        self.next_insertion_position(position, direction)
            .or_else(|| self.next_insertion_position(position, direction.reverse()))
            .unwrap_or(position)
    }

    /// First insertion position inside `element`
    pub fn first_insertion_in(&self, element: NodeId) -> Option<TextPosition> {
        let target = self.caret_host(element, false)?;
        let offset = self.content_start(target)?;
        Some(TextPosition::new(offset, LogicalDirection::Forward))
    }

    /// Last insertion position inside `element`
    pub fn last_insertion_in(&self, element: NodeId) -> Option<TextPosition> {
        let target = self.caret_host(element, true)?;
        let offset = self.content_end(target)?;
        Some(TextPosition::new(offset, LogicalDirection::Backward))
    }

    /// First (or last) run or empty block at or below `element`, in
    /// document order
    fn caret_host(&self, element: NodeId, from_end: bool) -> Option<NodeId> {
        match self.kind(element)? {
            NodeKind::Inline(_) => return Some(element),
            NodeKind::Block if self.children(element).is_empty() => return Some(element),
            _ => {}
        }
        let children = self.children(element);
        if from_end {
            children
                .iter()
                .rev()
                .find_map(|&c| self.caret_host(c, from_end))
        } else {
            children.iter().find_map(|&c| self.caret_host(c, from_end))
        }
    }
}

impl TextPosition {
    fn at(self, offset: usize) -> TextPosition {
        TextPosition::new(offset, self.direction)
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

    fn two_paragraphs() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let first = doc.append_paragraph(root, "ab").unwrap();
        let second = doc.append_paragraph(root, "").unwrap();
        (doc, first, second)
    }

    #[test]
    fn test_position_parent() {
        // 0 <p> 1 <r> 2 a 3 b 4 </r> 5 </p> 6 <p> 7 </p> 8
        let (doc, first, second) = two_paragraphs();
        let run = doc.children(first)[0];
        let at = |o| TextPosition::new(o, LogicalDirection::Forward);

        assert_eq!(doc.position_parent(at(0)), doc.root());
        assert_eq!(doc.position_parent(at(1)), first);
        assert_eq!(doc.position_parent(at(2)), run);
        assert_eq!(doc.position_parent(at(4)), run);
        assert_eq!(doc.position_parent(at(5)), first);
        assert_eq!(doc.position_parent(at(6)), doc.root());
        assert_eq!(doc.position_parent(at(7)), second);
        assert_eq!(doc.parent_type(at(3)), ElementType::Inline);
    }

    #[test]
    fn test_insertion_positions() {
        let (doc, _, second) = two_paragraphs();
        let at = |o| TextPosition::new(o, LogicalDirection::Forward);

        assert!(!doc.is_at_insertion_position(at(0)));
        assert!(doc.is_at_insertion_position(at(2)));
        assert!(doc.is_at_insertion_position(at(7)));
        assert_eq!(doc.insertion_position(at(0), LogicalDirection::Forward).offset(), 2);
        assert_eq!(
            doc.insertion_position(at(6), LogicalDirection::Backward).offset(),
            4
        );
        assert_eq!(
            doc.next_insertion_position(at(4), LogicalDirection::Forward)
                .map(TextPosition::offset),
            Some(7)
        );
        assert_eq!(doc.first_insertion_in(second).map(TextPosition::offset), Some(7));
        // Nothing after the last paragraph: fall back to searching backward
        assert_eq!(doc.insertion_position(at(8), LogicalDirection::Forward).offset(), 7);
    }

    #[test]
    fn test_insertion_edges_skip_structure() {
        // 0 <p> 1 <r> 2 a 3 b 4 </r> 5 </p> 6 <p> 7 </p> 8
        let (doc, first, _) = two_paragraphs();
        let root = doc.root();
        assert_eq!(doc.first_insertion_in(root).map(TextPosition::offset), Some(2));
        assert_eq!(doc.last_insertion_in(root).map(TextPosition::offset), Some(7));
        assert_eq!(
            doc.last_insertion_in(first),
            Some(TextPosition::new(4, LogicalDirection::Backward))
        );
        for element in [root, first] {
            let first_found = doc.first_insertion_in(element).unwrap();
            assert!(doc.is_at_insertion_position(first_found));
        }

        let mut empty = Document::new();
        let cell = empty.create(NodeKind::Cell(Default::default()));
        assert_eq!(empty.first_insertion_in(cell), None);
    }

    #[test]
    fn test_element_edges() {
        let (doc, first, _) = two_paragraphs();
        let inside = TextPosition::new(1, LogicalDirection::Forward);
        assert_eq!(
            doc.move_to_element_edge(inside, ElementEdge::AfterEnd),
            Some(TextPosition::new(6, LogicalDirection::Backward))
        );
        assert_eq!(
            doc.element_position(first, ElementEdge::BeforeEnd).map(TextPosition::offset),
            Some(5)
        );
        assert!(doc.has_equal_scope(inside, TextPosition::new(5, LogicalDirection::Backward)));
    }

    #[test]
    fn test_segment_orders_ends() {
        let a = TextPosition::new(9, LogicalDirection::Backward);
        let b = TextPosition::new(3, LogicalDirection::Forward);
        let segment = TextSegment::new(a, b);
        assert_eq!(segment.start(), b);
        assert_eq!(segment.end(), a);
        assert!(segment.contains(TextPosition::new(5, LogicalDirection::Forward)));
        assert!(!segment.is_empty());
    }
}
