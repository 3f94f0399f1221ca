//! Table grid engine: cell edits, merge/unmerge and grid resizing.
//!
//! # Responsibility
//! - Edit cell content without breaking span bookkeeping.
//! - Merge rectangular selections into one span owner and split them back.
//! - Grow and shrink the grid while keeping every span inside bounds.
//!
//! # Invariants
//! - A merged region is a rectangle whose top-left cell is the owner; every
//!   other cell in it is spanned, empty and points back at the owner.
//! - Merge concatenates the non-empty owner contents in row-major order,
//!   joined by one space. Unmerge keeps the owner content and leaves the
//!   formerly covered cells empty.
//! - A rejected edit leaves the table unchanged.

use crate::content::factory::MAX_TABLE_DIMENSION;
use crate::document::Document;
use crate::error::{log_rejection, ActError, ActResult};
use crate::model::node::ContentId;
use crate::model::table::{Cell, CellRef, Table, DEFAULT_COLUMN_WIDTH};
use log::{debug, info};
use std::collections::BTreeSet;

/// Narrowest column width accepted by [`Table::set_column_width`].
pub const MIN_COLUMN_WIDTH: f64 = 40.0;

/// Makes `origin` own a `rows` x `cols` region, clamped to the grid.
///
/// Covered cells lose their content. Cells outside the region are untouched.
pub(crate) fn apply_span(table: &mut Table, origin: CellRef, rows: usize, cols: usize) {
    if table.cell(origin.row, origin.col).is_none() {
        return;
    }
    let rows = rows.clamp(1, table.rows() - origin.row);
    let cols = cols.clamp(1, table.cols() - origin.col);
    for row in origin.row..origin.row + rows {
        for col in origin.col..origin.col + cols {
            let Some(cell) = table.cell_mut(row, col) else {
                continue;
            };
            if CellRef::new(row, col) == origin {
                cell.is_spanned = false;
                cell.span_origin = None;
                cell.row_span = rows;
                cell.col_span = cols;
            } else {
                cell.content.clear();
                cell.is_spanned = true;
                cell.span_origin = Some(origin);
                cell.row_span = 1;
                cell.col_span = 1;
            }
        }
    }
}

/// Span owner captured before a resize, re-applied afterwards.
struct Span {
    origin: CellRef,
    rows: usize,
    cols: usize,
    /// Owner content moved to a new origin cell when the old one was removed.
    carry: Option<(String, bool)>,
}

fn collect_spans(table: &Table) -> Vec<Span> {
    let mut spans = Vec::new();
    for (row, cells) in table.grid.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if cell.is_span_owner() {
                spans.push(Span {
                    origin: CellRef::new(row, col),
                    rows: cell.row_span,
                    cols: cell.col_span,
                    carry: None,
                });
            }
        }
    }
    spans
}

/// Start and length of a span after inserting a line at `at`.
fn grow(start: usize, len: usize, at: usize) -> (usize, usize) {
    if at <= start {
        (start + 1, len)
    } else if at < start + len {
        (start, len + 1)
    } else {
        (start, len)
    }
}

/// Start and length of a span after removing line `at`; `None` when it vanishes.
fn shrink(start: usize, len: usize, at: usize) -> Option<(usize, usize)> {
    if at < start {
        Some((start - 1, len))
    } else if at < start + len {
        (len > 1).then_some((start, len - 1))
    } else {
        Some((start, len))
    }
}

impl Table {
    /// Overwrites cell content. Returns `false` (no-op) for spanned cells.
    ///
    /// # Errors
    /// - `CellOutOfRange` when `(row, col)` is outside the grid.
    pub fn set_cell(&mut self, row: usize, col: usize, content: &str) -> ActResult<bool> {
        let at = CellRef::new(row, col);
        let out_of_range = self.out_of_range(at);
        let cell = self.cell_mut(row, col).ok_or(out_of_range)?;
        if cell.is_spanned {
            return Ok(false);
        }
        cell.content = content.to_string();
        Ok(true)
    }

    /// Sets the header flag of a cell and of every cell in its merged region.
    pub fn set_header(&mut self, row: usize, col: usize, is_header: bool) -> ActResult<()> {
        let at = CellRef::new(row, col);
        let cell = self.cell(row, col).ok_or_else(|| self.out_of_range(at))?;
        let origin = cell.span_origin.unwrap_or(at);
        let (rows, cols) = self
            .cell(origin.row, origin.col)
            .map_or((1, 1), |owner| (owner.row_span, owner.col_span));
        for r in origin.row..origin.row + rows {
            for c in origin.col..origin.col + cols {
                if let Some(cell) = self.cell_mut(r, c) {
                    cell.is_header = is_header;
                }
            }
        }
        Ok(())
    }

    /// Merges the selected cells into one region owned by its top-left cell.
    ///
    /// Selected cells that belong to an existing region stand for the whole
    /// region. The selection must then tile one rectangle exactly.
    ///
    /// # Errors
    /// - `CellOutOfRange` for coordinates outside the grid.
    /// - `InvalidSelection` for fewer than two distinct cells, or a selection
    ///   that is not a rectangle or cuts through an existing region.
    pub fn merge(&mut self, selection: &[CellRef]) -> ActResult<CellRef> {
        if selection.len() < 2 {
            return Err(ActError::InvalidSelection(
                "select at least two cells".to_string(),
            ));
        }
        let mut owners = BTreeSet::new();
        for at in selection {
            let cell = self
                .cell(at.row, at.col)
                .ok_or_else(|| self.out_of_range(*at))?;
            owners.insert(cell.span_origin.unwrap_or(*at));
        }
        if owners.len() < 2 {
            return Err(ActError::InvalidSelection(
                "selection lies inside a single merged cell".to_string(),
            ));
        }

        let areas: Vec<(CellRef, usize, usize)> = owners
            .iter()
            .filter_map(|origin| {
                self.cell(origin.row, origin.col)
                    .map(|owner| (*origin, owner.row_span, owner.col_span))
            })
            .collect();
        let top = areas.iter().map(|(origin, _, _)| origin.row).min().unwrap_or(0);
        let left = areas.iter().map(|(origin, _, _)| origin.col).min().unwrap_or(0);
        let bottom = areas
            .iter()
            .map(|(origin, rows, _)| origin.row + rows)
            .max()
            .unwrap_or(0);
        let right = areas
            .iter()
            .map(|(origin, _, cols)| origin.col + cols)
            .max()
            .unwrap_or(0);
        let covered: usize = areas.iter().map(|(_, rows, cols)| rows * cols).sum();
        if covered != (bottom - top) * (right - left) {
            return Err(ActError::InvalidSelection(
                "selection must form one rectangle of whole cells".to_string(),
            ));
        }

        let merged = owners
            .iter()
            .filter_map(|origin| self.cell(origin.row, origin.col))
            .map(|owner| owner.content.trim())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        for row in top..bottom {
            for col in left..right {
                if let Some(cell) = self.cell_mut(row, col) {
                    cell.reset_independent(row, col);
                    cell.content.clear();
                }
            }
        }
        let origin = CellRef::new(top, left);
        if let Some(owner) = self.cell_mut(top, left) {
            owner.content = merged;
        }
        apply_span(self, origin, bottom - top, right - left);
        Ok(origin)
    }

    /// Splits the region owned by `at` back into independent cells.
    ///
    /// # Errors
    /// - `CellOutOfRange` for coordinates outside the grid.
    /// - `NotSpanOwner` when `at` is a covered cell or owns no region.
    pub fn unmerge(&mut self, at: CellRef) -> ActResult<()> {
        let owner = self
            .cell(at.row, at.col)
            .ok_or_else(|| self.out_of_range(at))?;
        if !owner.is_span_owner() {
            return Err(ActError::NotSpanOwner {
                table_id: self.id.clone(),
                row: at.row,
                col: at.col,
            });
        }
        let (rows, cols) = (owner.row_span, owner.col_span);
        for row in at.row..at.row + rows {
            for col in at.col..at.col + cols {
                if let Some(cell) = self.cell_mut(row, col) {
                    cell.reset_independent(row, col);
                }
            }
        }
        Ok(())
    }

    /// Inserts an empty row before index `at` (`at == rows()` appends).
    ///
    /// Regions crossing the insertion line grow by one row.
    pub fn insert_row(&mut self, at: usize) -> ActResult<()> {
        if at > self.rows() {
            return Err(self.out_of_range(CellRef::new(at, 0)));
        }
        if self.rows() >= MAX_TABLE_DIMENSION {
            return Err(ActError::InvalidTableShape(format!(
                "table already has {MAX_TABLE_DIMENSION} rows"
            )));
        }
        let header = at > 0 && at < self.header_rows();
        let spans = collect_spans(self)
            .into_iter()
            .map(|mut span| {
                (span.origin.row, span.rows) = grow(span.origin.row, span.rows, at);
                span
            })
            .collect();
        let cols = self.cols();
        self.resize(spans, |table| {
            table
                .grid
                .insert(at, (0..cols).map(|col| Cell::new(at, col, "", header)).collect());
        })
    }

    /// Removes row `at`. Regions crossing it shrink; the table keeps one row.
    pub fn remove_row(&mut self, at: usize) -> ActResult<()> {
        if at >= self.rows() {
            return Err(self.out_of_range(CellRef::new(at, 0)));
        }
        if self.rows() == 1 {
            return Err(ActError::InvalidTableShape(
                "table must keep at least one row".to_string(),
            ));
        }
        let removed = self.grid[at].clone();
        let spans = collect_spans(self)
            .into_iter()
            .filter_map(|mut span| {
                let carries = span.origin.row == at;
                (span.origin.row, span.rows) = shrink(span.origin.row, span.rows, at)?;
                if carries {
                    span.carry = removed
                        .get(span.origin.col)
                        .map(|owner| (owner.content.clone(), owner.is_header));
                }
                Some(span)
            })
            .collect();
        self.resize(spans, |table| {
            table.grid.remove(at);
        })
    }

    /// Inserts an empty column before index `at` (`at == cols()` appends).
    pub fn insert_column(&mut self, at: usize) -> ActResult<()> {
        if at > self.cols() {
            return Err(self.out_of_range(CellRef::new(0, at)));
        }
        if self.cols() >= MAX_TABLE_DIMENSION {
            return Err(ActError::InvalidTableShape(format!(
                "table already has {MAX_TABLE_DIMENSION} columns"
            )));
        }
        let header_rows = self.header_rows();
        let spans = collect_spans(self)
            .into_iter()
            .map(|mut span| {
                (span.origin.col, span.cols) = grow(span.origin.col, span.cols, at);
                span
            })
            .collect();
        self.resize(spans, |table| {
            for (row, cells) in table.grid.iter_mut().enumerate() {
                cells.insert(at, Cell::new(row, at, "", row < header_rows));
            }
            table.col_widths.insert(at, DEFAULT_COLUMN_WIDTH);
        })
    }

    /// Removes column `at`. Regions crossing it shrink; the table keeps one column.
    pub fn remove_column(&mut self, at: usize) -> ActResult<()> {
        if at >= self.cols() {
            return Err(self.out_of_range(CellRef::new(0, at)));
        }
        if self.cols() == 1 {
            return Err(ActError::InvalidTableShape(
                "table must keep at least one column".to_string(),
            ));
        }
        let removed: Vec<Option<Cell>> =
            self.grid.iter().map(|cells| cells.get(at).cloned()).collect();
        let spans = collect_spans(self)
            .into_iter()
            .filter_map(|mut span| {
                let carries = span.origin.col == at;
                (span.origin.col, span.cols) = shrink(span.origin.col, span.cols, at)?;
                if carries {
                    span.carry = removed
                        .get(span.origin.row)
                        .and_then(Option::as_ref)
                        .map(|owner| (owner.content.clone(), owner.is_header));
                }
                Some(span)
            })
            .collect();
        self.resize(spans, |table| {
            for cells in table.grid.iter_mut().filter(|cells| at < cells.len()) {
                cells.remove(at);
            }
            table.col_widths.remove(at);
        })
    }

    /// Sets the width of column `col`, raised to [`MIN_COLUMN_WIDTH`] if narrower.
    pub fn set_column_width(&mut self, col: usize, width: f64) -> ActResult<()> {
        if !width.is_finite() {
            return Err(ActError::InvalidTableShape(format!(
                "column width must be a finite number, got {width}"
            )));
        }
        let out_of_range = self.out_of_range(CellRef::new(0, col));
        let slot = self.col_widths.get_mut(col).ok_or(out_of_range)?;
        *slot = width.max(MIN_COLUMN_WIDTH);
        Ok(())
    }

    /// Applies a shape change, then re-anchors every cell and re-applies spans.
    fn resize(&mut self, spans: Vec<Span>, change: impl FnOnce(&mut Table)) -> ActResult<()> {
        let backup = self.clone();
        change(&mut *self);
        for (row, cells) in self.grid.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                cell.reset_independent(row, col);
            }
        }
        for span in spans {
            if let Some((content, is_header)) = span.carry {
                if let Some(owner) = self.cell_mut(span.origin.row, span.origin.col) {
                    owner.content = content;
                    owner.is_header = is_header;
                }
            }
            apply_span(self, span.origin, span.rows, span.cols);
        }
        if let Err(reason) = self.validate() {
            *self = backup;
            return Err(ActError::InvalidTableShape(reason));
        }
        Ok(())
    }

    fn out_of_range(&self, at: CellRef) -> ActError {
        ActError::CellOutOfRange {
            table_id: self.id.clone(),
            row: at.row,
            col: at.col,
        }
    }
}

impl Document {
    /// Sets cell text. Returns `false` when the cell is covered by a merge.
    pub fn set_cell(
        &mut self,
        table_id: &ContentId,
        row: usize,
        col: usize,
        content: &str,
    ) -> ActResult<bool> {
        self.edit_table("set_cell", table_id, |table| table.set_cell(row, col, content))
    }

    pub fn set_header(
        &mut self,
        table_id: &ContentId,
        row: usize,
        col: usize,
        is_header: bool,
    ) -> ActResult<()> {
        self.edit_table("set_header", table_id, |table| {
            table.set_header(row, col, is_header)
        })
    }

    /// Merges `selection` and returns the owner cell.
    pub fn merge_cells(
        &mut self,
        table_id: &ContentId,
        selection: &[CellRef],
    ) -> ActResult<CellRef> {
        let origin = self.edit_table("merge", table_id, |table| table.merge(selection))?;
        info!(
            "event=cells_merge module=grid status=ok table={} cells={} origin_row={} origin_col={}",
            table_id,
            selection.len(),
            origin.row,
            origin.col
        );
        Ok(origin)
    }

    pub fn unmerge_cell(&mut self, table_id: &ContentId, at: CellRef) -> ActResult<()> {
        self.edit_table("unmerge", table_id, |table| table.unmerge(at))?;
        info!(
            "event=cells_unmerge module=grid status=ok table={} row={} col={}",
            table_id, at.row, at.col
        );
        Ok(())
    }

    pub fn insert_row(&mut self, table_id: &ContentId, at: usize) -> ActResult<()> {
        self.edit_table("insert_row", table_id, |table| table.insert_row(at))
    }

    pub fn remove_row(&mut self, table_id: &ContentId, at: usize) -> ActResult<()> {
        self.edit_table("remove_row", table_id, |table| table.remove_row(at))
    }

    pub fn insert_column(&mut self, table_id: &ContentId, at: usize) -> ActResult<()> {
        self.edit_table("insert_column", table_id, |table| table.insert_column(at))
    }

    pub fn remove_column(&mut self, table_id: &ContentId, at: usize) -> ActResult<()> {
        self.edit_table("remove_column", table_id, |table| table.remove_column(at))
    }

    pub fn set_column_width(
        &mut self,
        table_id: &ContentId,
        col: usize,
        width: f64,
    ) -> ActResult<()> {
        self.edit_table("set_column_width", table_id, |table| {
            table.set_column_width(col, width)
        })
    }

    fn edit_table<T>(
        &mut self,
        operation: &'static str,
        table_id: &ContentId,
        edit: impl FnOnce(&mut Table) -> ActResult<T>,
    ) -> ActResult<T> {
        let table = self.store.table_mut(table_id).ok_or_else(|| {
            log_rejection(operation, ActError::ContentNotFound(table_id.clone()))
        })?;
        let outcome = edit(table).map_err(|err| log_rejection(operation, err))?;
        debug!(
            "event=grid_edit module=grid status=ok op={} table={}",
            operation, table_id
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::{grow, shrink, MIN_COLUMN_WIDTH};
    use crate::error::ActError;
    use crate::model::node::{ContentId, NodeId};
    use crate::model::table::{CellRef, Table};

    fn table(rows: usize, cols: usize) -> Table {
        let headers: Vec<String> = (0..cols).map(|col| format!("H{col}")).collect();
        Table::with_headers(ContentId::from("t"), NodeId::from("n"), &headers, rows)
    }

    fn cells(refs: &[(usize, usize)]) -> Vec<CellRef> {
        refs.iter().map(|(row, col)| CellRef::new(*row, *col)).collect()
    }

    #[test]
    fn line_shift_helpers() {
        assert_eq!(grow(2, 2, 1), (3, 2));
        assert_eq!(grow(2, 2, 3), (2, 3));
        assert_eq!(grow(2, 2, 4), (2, 2));
        assert_eq!(shrink(2, 2, 0), Some((1, 2)));
        assert_eq!(shrink(2, 2, 2), Some((2, 1)));
        assert_eq!(shrink(2, 1, 2), None);
        assert_eq!(shrink(2, 2, 5), Some((2, 2)));
    }

    #[test]
    fn merge_concatenates_in_row_major_order() {
        let mut table = table(2, 2);
        table.set_cell(1, 0, "A").unwrap();
        table.set_cell(1, 1, "B").unwrap();
        table.set_cell(2, 0, "C").unwrap();
        table.set_cell(2, 1, "D").unwrap();

        let origin = table
            .merge(&cells(&[(2, 1), (1, 0), (1, 1), (2, 0)]))
            .unwrap();
        assert_eq!(origin, CellRef::new(1, 0));
        let owner = table.cell(1, 0).unwrap();
        assert_eq!(owner.content, "A B C D");
        assert_eq!((owner.row_span, owner.col_span), (2, 2));
        for (row, col) in [(1, 1), (2, 0), (2, 1)] {
            let covered = table.cell(row, col).unwrap();
            assert!(covered.is_spanned);
            assert!(covered.content.is_empty());
            assert_eq!(covered.span_origin, Some(origin));
        }
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn set_cell_on_covered_cell_is_noop() {
        let mut table = table(2, 2);
        table.merge(&cells(&[(1, 0), (1, 1)])).unwrap();
        assert_eq!(table.set_cell(1, 1, "x"), Ok(false));
        assert!(table.cell(1, 1).unwrap().content.is_empty());
        assert!(matches!(
            table.set_cell(9, 0, "x"),
            Err(ActError::CellOutOfRange { row: 9, .. })
        ));
    }

    #[test]
    fn merge_rejects_gaps_and_partial_regions() {
        let mut table = table(3, 3);
        let before = table.clone();
        assert!(matches!(
            table.merge(&cells(&[(1, 0), (2, 1)])),
            Err(ActError::InvalidSelection(_))
        ));
        assert!(matches!(
            table.merge(&cells(&[(1, 0)])),
            Err(ActError::InvalidSelection(_))
        ));
        assert_eq!(table, before);

        table.merge(&cells(&[(1, 1), (2, 1)])).unwrap();
        let before = table.clone();
        // (1,1) stands for the vertical region (1..=2, 1), which sticks out below (1,0).
        assert!(matches!(
            table.merge(&cells(&[(1, 0), (1, 1)])),
            Err(ActError::InvalidSelection(_))
        ));
        assert!(matches!(
            table.merge(&cells(&[(1, 1), (2, 1)])),
            Err(ActError::InvalidSelection(_))
        ));
        assert_eq!(table, before);
    }

    #[test]
    fn merge_can_absorb_existing_region() {
        let mut table = table(3, 3);
        table.merge(&cells(&[(1, 0), (2, 0)])).unwrap();
        let origin = table.merge(&cells(&[(2, 0), (1, 1), (2, 1)])).unwrap();
        assert_eq!(origin, CellRef::new(1, 0));
        let owner = table.cell(1, 0).unwrap();
        assert_eq!((owner.row_span, owner.col_span), (2, 2));
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn unmerge_restores_geometry() {
        let mut table = table(2, 3);
        let original = table.clone();
        table.merge(&cells(&[(1, 1), (1, 2), (2, 1), (2, 2)])).unwrap();
        table.unmerge(CellRef::new(1, 1)).unwrap();
        assert_eq!(table, original);

        assert!(matches!(
            table.unmerge(CellRef::new(1, 1)),
            Err(ActError::NotSpanOwner { row: 1, col: 1, .. })
        ));
    }

    #[test]
    fn unmerge_rejects_covered_cell() {
        let mut table = table(2, 2);
        table.merge(&cells(&[(1, 0), (1, 1)])).unwrap();
        assert!(matches!(
            table.unmerge(CellRef::new(1, 1)),
            Err(ActError::NotSpanOwner { .. })
        ));
    }

    #[test]
    fn inserting_inside_region_grows_it() {
        let mut table = table(3, 2);
        table.merge(&cells(&[(1, 0), (2, 0)])).unwrap();
        table.insert_row(2).unwrap();
        let owner = table.cell(1, 0).unwrap();
        assert_eq!(owner.row_span, 3);
        assert!(table.cell(2, 0).unwrap().is_spanned);
        assert_eq!(table.rows(), 5);
        assert_eq!(table.validate(), Ok(()));

        table.insert_row(0).unwrap();
        assert!(table.cell(2, 0).unwrap().is_span_owner());
        assert_eq!(table.cell(3, 0).unwrap().span_origin, Some(CellRef::new(2, 0)));
    }

    #[test]
    fn removing_owner_row_moves_content_down() {
        let mut table = table(3, 2);
        table.set_cell(1, 0, "итог").unwrap();
        table.merge(&cells(&[(1, 0), (2, 0), (3, 0)])).unwrap();
        table.remove_row(1).unwrap();
        let owner = table.cell(1, 0).unwrap();
        assert_eq!(owner.content, "итог");
        assert_eq!(owner.row_span, 2);
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn removing_columns_shrinks_regions_and_widths() {
        let mut table = table(1, 3);
        table.merge(&cells(&[(1, 0), (1, 1)])).unwrap();
        table.remove_column(1).unwrap();
        assert_eq!(table.cols(), 2);
        assert_eq!(table.col_widths.len(), 2);
        assert!(!table.cell(1, 0).unwrap().is_span_owner());
        assert_eq!(table.validate(), Ok(()));

        table.insert_column(2).unwrap();
        assert_eq!(table.cols(), 3);
        assert!(table.cell(0, 2).unwrap().is_header);
        assert!(!table.cell(1, 2).unwrap().is_header);
    }

    #[test]
    fn last_row_and_column_stay() {
        let mut table = table(0, 1);
        assert!(matches!(table.remove_row(0), Err(ActError::InvalidTableShape(_))));
        assert!(matches!(table.remove_column(0), Err(ActError::InvalidTableShape(_))));
    }

    #[test]
    fn column_width_is_clamped() {
        let mut table = table(1, 2);
        table.set_column_width(1, 5.0).unwrap();
        assert_eq!(table.col_widths[1], MIN_COLUMN_WIDTH);
        assert!(table.set_column_width(1, f64::NAN).is_err());
        assert!(table.set_column_width(7, 100.0).is_err());
    }
}
