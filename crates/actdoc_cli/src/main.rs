//! CLI smoke entry point.
//!
//! # Responsibility
//! - Build a fresh act, run a short scripted edit sequence and print the
//!   export snapshot, to check core wiring without any UI.
//! - Keep output deterministic apart from generated ids.
//!
//! Usage: `actdoc_cli [absolute-log-dir]`

use actdoc_core::{
    default_log_level, fixed_section_id, init_logging, ActSession, ActionResponse, CellRef,
    ContentRequest, EditorConfig,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Some(log_dir) = std::env::args().nth(1) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }
    println!("actdoc_core ping={}", actdoc_core::ping());
    println!("actdoc_core version={}", actdoc_core::core_version());

    let mut session = ActSession::new(EditorConfig::default());
    let results = fixed_section_id(5);

    let group = session.insert(&results, "Оценка рисков", true);
    report("insert risk group", &group);
    let Some(group_id) = group.node_id else {
        return ExitCode::FAILURE;
    };
    report(
        "add regular risk table",
        &session.add_content(&group_id, ContentRequest::RegularRiskTable),
    );

    let table = session.add_content(&fixed_section_id(2), ContentRequest::default_table());
    report("add table", &table);
    if let Some(table_id) = table.content_id {
        report("set cell", &session.set_cell(&table_id, 1, 0, "Отдел"));
        report("set cell", &session.set_cell(&table_id, 1, 1, "продаж"));
        report(
            "merge",
            &session.merge(&table_id, &[CellRef::new(1, 0), CellRef::new(1, 1)]),
        );
    }
    report(
        "extra top-level item",
        &session.insert(&fixed_section_id(5), "Приложение", false),
    );

    match session.export_json() {
        Ok(json) => {
            log::info!("event=cli_export module=cli status=ok bytes={}", json.len());
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn report(step: &str, response: &ActionResponse) {
    let envelope = serde_json::to_string(response).unwrap_or_else(|err| err.to_string());
    eprintln!("{step}: {envelope}");
}
