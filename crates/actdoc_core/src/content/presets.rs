//! Preset table shapes for risk and metrics tables.

use crate::grid::apply_span;
use crate::model::node::{ContentId, NodeId};
use crate::model::table::{Cell, CellRef, Table, TableRole, DEFAULT_COLUMN_WIDTH};

const REGULAR_RISK_HEADERS: [&str; 5] = [
    "№",
    "Наименование риска",
    "Вероятность",
    "Влияние",
    "Уровень риска",
];
const OPERATIONAL_RISK_HEADERS: [&str; 5] = [
    "№",
    "Риск-событие",
    "Источник",
    "Сумма потерь, руб.",
    "Меры реагирования",
];
const METRICS_HEADERS: [&str; 3] = ["Показатель", "Количество", "Сумма, руб."];
const METRICS_ROWS: [&str; 2] = ["Регулярные риски", "Операционные риски"];
const MAIN_METRICS_ROWS: [&str; 3] = [
    "Итого регулярные риски",
    "Итого операционные риски",
    "Всего",
];

/// Base label of the node holding a table with `role`.
pub fn base_label(role: TableRole) -> &'static str {
    match role {
        TableRole::Plain => "",
        TableRole::Metrics => "Метрики",
        TableRole::MainMetrics => "Сводные метрики",
        TableRole::RegularRisk => "Регулярные риски",
        TableRole::OperationalRisk => "Операционные риски",
    }
}

/// Default header titles for a plain table with `cols` columns.
pub fn plain_headers(cols: usize) -> Vec<String> {
    (1..=cols).map(|index| format!("Столбец {index}")).collect()
}

/// Builds the preset grid for `role`. Companion presets come back protected.
pub fn build_table(role: TableRole, id: ContentId, node_id: NodeId) -> Table {
    let mut table = match role {
        TableRole::Plain => Table::with_headers(id, node_id, &plain_headers(3), 3),
        TableRole::RegularRisk => {
            Table::with_headers(id, node_id, &owned(&REGULAR_RISK_HEADERS), 1)
        }
        TableRole::OperationalRisk => {
            Table::with_headers(id, node_id, &owned(&OPERATIONAL_RISK_HEADERS), 1)
        }
        TableRole::Metrics => {
            let mut table = Table::with_headers(id, node_id, &owned(&METRICS_HEADERS), 0);
            append_labeled_rows(&mut table, &METRICS_ROWS);
            table
        }
        TableRole::MainMetrics => main_metrics(id, node_id),
    };
    table.role = role;
    table.protected = role.is_companion();
    table
}

/// Two header rows: `Показатель` spans both, `Значение` spans the value columns.
fn main_metrics(id: ContentId, node_id: NodeId) -> Table {
    let top = vec![
        "Показатель".to_string(),
        "Значение".to_string(),
        String::new(),
    ];
    let mut table = Table::with_headers(id, node_id, &top, 0);
    table.grid.push(
        ["", "Количество", "Сумма, руб."]
            .iter()
            .enumerate()
            .map(|(col, title)| Cell::new(1, col, *title, true))
            .collect(),
    );
    apply_span(&mut table, CellRef::new(0, 0), 2, 1);
    apply_span(&mut table, CellRef::new(0, 1), 1, 2);
    append_labeled_rows(&mut table, &MAIN_METRICS_ROWS);
    table.col_widths = vec![
        DEFAULT_COLUMN_WIDTH * 2.0,
        DEFAULT_COLUMN_WIDTH,
        DEFAULT_COLUMN_WIDTH,
    ];
    table
}

fn append_labeled_rows(table: &mut Table, labels: &[&str]) {
    let cols = table.cols();
    for label in labels {
        let row = table.rows();
        table.grid.push(
            (0..cols)
                .map(|col| Cell::new(row, col, if col == 0 { *label } else { "" }, false))
                .collect(),
        );
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::build_table;
    use crate::model::node::{ContentId, NodeId};
    use crate::model::table::TableRole;

    #[test]
    fn every_preset_passes_grid_validation() {
        for role in [
            TableRole::Plain,
            TableRole::Metrics,
            TableRole::MainMetrics,
            TableRole::RegularRisk,
            TableRole::OperationalRisk,
        ] {
            let table = build_table(role, ContentId::from("t"), NodeId::from("n"));
            assert_eq!(table.validate(), Ok(()), "preset {role:?} is inconsistent");
            assert_eq!(table.protected, role.is_companion());
        }
    }

    #[test]
    fn main_metrics_has_merged_two_row_header() {
        let table = build_table(TableRole::MainMetrics, ContentId::from("t"), NodeId::from("n"));
        assert_eq!(table.header_rows(), 2);
        let corner = table.cell(0, 0).expect("corner cell");
        assert_eq!((corner.row_span, corner.col_span), (2, 1));
        let value = table.cell(0, 1).expect("value header");
        assert_eq!((value.row_span, value.col_span), (1, 2));
        assert!(table.cell(0, 2).expect("covered").is_spanned);
        assert!(table.cell(1, 0).expect("covered").is_spanned);
    }
}
