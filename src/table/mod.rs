//! Table structure model.
//!
//! A table is stored inside the document tree as Table → RowGroup → Row →
//! Cell. A cell with `row_span > 1` is stored only in its top row and is
//! "spanned" into the rows below it.

mod borders;
mod model;
mod spec;

pub use borders::{correct_borders, correct_group_borders};
pub(crate) use model::copy_cell_structure;
pub use model::{
    cells, column_count, column_range, covering_cell, effective_row_span, group_of, is_regular,
    next_cell, origin_row_index, previous_cell, row_groups, row_index, row_of, row_width, rows,
    spanned_cells, table_of, table_of_cell, table_rows,
};
pub use spec::{CellSpec, TableSpec};
