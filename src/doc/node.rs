use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in a [`super::Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural type of a node, used for single-dispatch classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Table,
    RowGroup,
    Row,
    Cell,
    /// Paragraph-level content
    Block,
    /// A text run
    Inline,
    /// Containers outside the table schema (the document root, sections)
    Other,
}

impl ElementType {
    /// Whether the tree schema allows `child` directly under `self`
    pub fn accepts(self, child: ElementType) -> bool {
        match self {
            ElementType::Other => matches!(
                child,
                ElementType::Table | ElementType::Block | ElementType::Other
            ),
            ElementType::Table => child == ElementType::RowGroup,
            ElementType::RowGroup => child == ElementType::Row,
            ElementType::Row => child == ElementType::Cell,
            ElementType::Cell => matches!(child, ElementType::Block | ElementType::Table),
            ElementType::Block => child == ElementType::Inline,
            ElementType::Inline => false,
        }
    }
}

/// Border widths of a cell, one per side
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thickness {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Thickness {
    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    /// The widest side
    pub fn max_side(&self) -> f64 {
        self.left.max(self.top).max(self.right).max(self.bottom)
    }
}

/// Width of a table column
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ColumnWidth {
    /// Shares the table's remaining width with other auto columns
    #[default]
    Auto,
    /// Fixed width in pixels
    Fixed(f64),
}

/// Column definition stored on the table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnDef {
    pub width: ColumnWidth,
}

/// Table-level properties
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProps {
    /// Gap between adjacent cells; 0 collapses neighbouring borders
    pub cell_spacing: f64,
    /// Column definitions; may be shorter than the column count
    pub columns: Vec<ColumnDef>,
    /// Derived by layout (`validate_structure`), 0 until then
    #[serde(skip)]
    pub column_count: usize,
}

/// Cell-level properties. `column_index` belongs to layout and is only
/// trustworthy right after `validate_structure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellProps {
    pub column_span: usize,
    pub row_span: usize,
    /// First grid column occupied by the cell; `None` until computed
    #[serde(skip)]
    pub column_index: Option<usize>,
    pub borders: Thickness,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Default for CellProps {
    fn default() -> Self {
        Self {
            column_span: 1,
            row_span: 1,
            column_index: None,
            borders: Thickness::default(),
            background: None,
        }
    }
}

/// Payload of a node: a closed union over the structural element types
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Table(TableProps),
    RowGroup,
    Row,
    Cell(CellProps),
    Block,
    Inline(String),
    Other,
}

impl NodeKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            NodeKind::Table(_) => ElementType::Table,
            NodeKind::RowGroup => ElementType::RowGroup,
            NodeKind::Row => ElementType::Row,
            NodeKind::Cell(_) => ElementType::Cell,
            NodeKind::Block => ElementType::Block,
            NodeKind::Inline(_) => ElementType::Inline,
            NodeKind::Other => ElementType::Other,
        }
    }
}

/// Arena entry. Detached nodes keep their slot with `parent == None`.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Symbols between the start and end tags, kept current by the tree
    pub(crate) content_len: usize,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
