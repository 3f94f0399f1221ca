//! Table content model.
//!
//! # Responsibility
//! - Define the grid/cell shape stored in the table content store.
//! - Check span integrity of a grid.
//!
//! # Invariants
//! - Every grid row has exactly `cols()` cells; spanned cells stay in the matrix.
//! - `span_origin` is set iff `is_spanned`; a spanned cell has empty content.
//! - A span owner's region stays inside the grid and covers only cells that
//!   point back at it.
//! - `origin_row`/`origin_col` equal the cell's own grid position.

use crate::model::node::{ContentId, NodeId};
use serde::{Deserialize, Serialize};

/// Default column width in layout units.
pub const DEFAULT_COLUMN_WIDTH: f64 = 150.0;

/// Grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub content: String,
    pub is_header: bool,
    pub col_span: usize,
    pub row_span: usize,
    pub is_spanned: bool,
    pub span_origin: Option<CellRef>,
    pub origin_row: usize,
    pub origin_col: usize,
}

impl Cell {
    /// Creates an independent 1x1 cell at `(row, col)`.
    pub fn new(row: usize, col: usize, content: impl Into<String>, is_header: bool) -> Self {
        Self {
            content: content.into(),
            is_header,
            col_span: 1,
            row_span: 1,
            is_spanned: false,
            span_origin: None,
            origin_row: row,
            origin_col: col,
        }
    }

    /// Whether this cell owns a merged region.
    pub fn is_span_owner(&self) -> bool {
        !self.is_spanned && (self.col_span > 1 || self.row_span > 1)
    }

    /// Content as seen by readers; spanned cells read as empty.
    pub fn visible_content(&self) -> &str {
        if self.is_spanned {
            ""
        } else {
            &self.content
        }
    }

    pub(crate) fn reset_independent(&mut self, row: usize, col: usize) {
        self.col_span = 1;
        self.row_span = 1;
        self.is_spanned = false;
        self.span_origin = None;
        self.origin_row = row;
        self.origin_col = col;
    }
}

/// System role of a table. Non-plain roles are managed by companion sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TableRole {
    #[default]
    Plain,
    /// Per risk-group summary table.
    Metrics,
    /// Singleton summary table under the results section.
    MainMetrics,
    RegularRisk,
    OperationalRisk,
}

impl TableRole {
    pub fn is_risk(self) -> bool {
        matches!(self, Self::RegularRisk | Self::OperationalRisk)
    }

    pub fn is_companion(self) -> bool {
        matches!(self, Self::Metrics | Self::MainMetrics)
    }
}

/// Table content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "TableWire", try_from = "TableWire")]
pub struct Table {
    pub id: ContentId,
    pub node_id: NodeId,
    pub grid: Vec<Vec<Cell>>,
    pub col_widths: Vec<f64>,
    pub protected: bool,
    pub role: TableRole,
}

impl Table {
    /// Builds a table with one header row of `headers` and `data_rows` empty rows.
    pub fn with_headers(
        id: ContentId,
        node_id: NodeId,
        headers: &[String],
        data_rows: usize,
    ) -> Self {
        let cols = headers.len();
        let mut grid = Vec::with_capacity(data_rows + 1);
        grid.push(
            headers
                .iter()
                .enumerate()
                .map(|(col, title)| Cell::new(0, col, title.as_str(), true))
                .collect(),
        );
        for row in 1..=data_rows {
            grid.push((0..cols).map(|col| Cell::new(row, col, "", false)).collect());
        }
        Self {
            id,
            node_id,
            grid,
            col_widths: vec![DEFAULT_COLUMN_WIDTH; cols],
            protected: false,
            role: TableRole::Plain,
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.get(row).and_then(|cells| cells.get(col))
    }

    pub(crate) fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.grid.get_mut(row).and_then(|cells| cells.get_mut(col))
    }

    /// Number of leading rows whose cells are all headers.
    pub fn header_rows(&self) -> usize {
        self.grid
            .iter()
            .take_while(|cells| !cells.is_empty() && cells.iter().all(|cell| cell.is_header))
            .count()
    }

    /// Checks shape and span invariants.
    ///
    /// # Errors
    /// - Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        let cols = self.cols();
        if self.col_widths.len() != cols {
            return Err(format!(
                "col_widths has {} entries for {cols} columns",
                self.col_widths.len()
            ));
        }
        for (row, cells) in self.grid.iter().enumerate() {
            if cells.len() != cols {
                return Err(format!("row {row} has {} cells, expected {cols}", cells.len()));
            }
            for (col, cell) in cells.iter().enumerate() {
                if cell.origin_row != row || cell.origin_col != col {
                    return Err(format!("cell ({row}, {col}) has stale origin"));
                }
                if cell.col_span == 0 || cell.row_span == 0 {
                    return Err(format!("cell ({row}, {col}) has zero span"));
                }
                if cell.is_spanned != cell.span_origin.is_some() {
                    return Err(format!("cell ({row}, {col}) span flag mismatch"));
                }
                if let Some(origin) = cell.span_origin {
                    if !cell.content.is_empty() {
                        return Err(format!("spanned cell ({row}, {col}) holds content"));
                    }
                    let covered = self
                        .cell(origin.row, origin.col)
                        .filter(|owner| !owner.is_spanned)
                        .map(|owner| {
                            row >= origin.row
                                && row < origin.row + owner.row_span
                                && col >= origin.col
                                && col < origin.col + owner.col_span
                        })
                        .unwrap_or(false);
                    if !covered || origin == CellRef::new(row, col) {
                        return Err(format!(
                            "spanned cell ({row}, {col}) points at non-covering origin ({}, {})",
                            origin.row, origin.col
                        ));
                    }
                } else if cell.is_span_owner() {
                    if row + cell.row_span > self.rows() || col + cell.col_span > cols {
                        return Err(format!("span of ({row}, {col}) exceeds grid bounds"));
                    }
                    for r in row..row + cell.row_span {
                        for c in col..col + cell.col_span {
                            if (r, c) == (row, col) {
                                continue;
                            }
                            let points_back = self
                                .cell(r, c)
                                .and_then(|covered| covered.span_origin)
                                .map(|origin| origin == CellRef::new(row, col))
                                .unwrap_or(false);
                            if !points_back {
                                return Err(format!(
                                    "cell ({r}, {c}) inside span of ({row}, {col}) is not marked spanned"
                                ));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableWire {
    id: ContentId,
    node_id: NodeId,
    grid: Vec<Vec<Cell>>,
    col_widths: Vec<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    protected: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    is_metrics_table: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    is_main_metrics_table: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    is_regular_risk_table: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    is_operational_risk_table: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<Table> for TableWire {
    fn from(value: Table) -> Self {
        Self {
            id: value.id,
            node_id: value.node_id,
            grid: value.grid,
            col_widths: value.col_widths,
            protected: value.protected,
            is_metrics_table: value.role == TableRole::Metrics,
            is_main_metrics_table: value.role == TableRole::MainMetrics,
            is_regular_risk_table: value.role == TableRole::RegularRisk,
            is_operational_risk_table: value.role == TableRole::OperationalRisk,
        }
    }
}

impl TryFrom<TableWire> for Table {
    type Error = String;

    fn try_from(value: TableWire) -> Result<Self, Self::Error> {
        let flags = [
            (value.is_metrics_table, TableRole::Metrics),
            (value.is_main_metrics_table, TableRole::MainMetrics),
            (value.is_regular_risk_table, TableRole::RegularRisk),
            (value.is_operational_risk_table, TableRole::OperationalRisk),
        ];
        let mut roles = flags.iter().filter(|(set, _)| *set).map(|(_, role)| *role);
        let role = roles.next().unwrap_or_default();
        if roles.next().is_some() {
            return Err(format!("table {} declares more than one role", value.id));
        }
        Ok(Self {
            id: value.id,
            node_id: value.node_id,
            grid: value.grid,
            col_widths: value.col_widths,
            protected: value.protected,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CellRef, Table, TableRole};
    use crate::model::node::{ContentId, NodeId};

    fn sample() -> Table {
        Table::with_headers(
            ContentId::from("t"),
            NodeId::from("n"),
            &["A".to_string(), "B".to_string()],
            2,
        )
    }

    #[test]
    fn with_headers_builds_header_row_and_positions() {
        let table = sample();
        assert_eq!(table.rows(), 3);
        assert_eq!(table.cols(), 2);
        assert_eq!(table.header_rows(), 1);
        let cell = table.cell(2, 1).expect("cell exists");
        assert_eq!((cell.origin_row, cell.origin_col), (2, 1));
        assert_eq!((cell.col_span, cell.row_span), (1, 1));
        assert!(table.validate().is_ok());
    }

    #[test]
    fn validate_rejects_dangling_span_marker() {
        let mut table = sample();
        if let Some(cell) = table.cell_mut(1, 1) {
            cell.is_spanned = true;
            cell.span_origin = Some(CellRef::new(1, 0));
        }
        let err = table.validate().expect_err("owner does not cover (1,1)");
        assert!(err.contains("non-covering origin"), "unexpected: {err}");
    }

    #[test]
    fn validate_rejects_span_past_bounds() {
        let mut table = sample();
        if let Some(cell) = table.cell_mut(2, 1) {
            cell.col_span = 2;
        }
        assert!(table.validate().is_err());
    }

    #[test]
    fn wire_shape_uses_role_flags() {
        let mut table = sample();
        table.role = TableRole::RegularRisk;
        let json = serde_json::to_value(&table).expect("serialize");
        assert_eq!(json["isRegularRiskTable"], true);
        assert!(json.get("isMetricsTable").is_none());
        assert_eq!(json["grid"][0][0]["isHeader"], true);
        assert_eq!(json["colWidths"].as_array().map(Vec::len), Some(2));

        let decoded: Table = serde_json::from_value(json).expect("deserialize");
        assert_eq!(decoded, table);
    }

    #[test]
    fn wire_shape_rejects_conflicting_roles() {
        let mut json = serde_json::to_value(sample()).expect("serialize");
        json["isMetricsTable"] = serde_json::Value::Bool(true);
        json["isOperationalRiskTable"] = serde_json::Value::Bool(true);
        assert!(serde_json::from_value::<Table>(json).is_err());
    }
}
