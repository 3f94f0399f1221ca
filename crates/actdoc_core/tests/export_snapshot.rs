use actdoc_core::export::{from_json, to_json, to_json_pretty};
use actdoc_core::{
    fixed_section_id, ActError, CellRef, Document, DocumentLimits, ErrorCategory, ExportSnapshot,
    NodeId,
};
use serde_json::{json, Value};

fn populated() -> Document {
    let mut document = Document::new();
    let group = document
        .insert(&fixed_section_id(5), "Риски", true)
        .unwrap();
    document.add_regular_risk_table(&group).unwrap();
    let item = document
        .insert(&fixed_section_id(1), "Основание", true)
        .unwrap();
    document.update_item_content(&item, "Приказ №1").unwrap();
    document.set_custom_label(&item, "Основание проверки").unwrap();
    let table = document.add_table(&item, 2, 2).unwrap();
    document.set_cell(&table.content_id, 1, 0, "x").unwrap();
    document.set_cell(&table.content_id, 1, 1, "y").unwrap();
    document
        .merge_cells(
            &table.content_id,
            &[CellRef::new(1, 0), CellRef::new(1, 1)],
        )
        .unwrap();
    document.add_text_block(&item).unwrap();
    document.add_violation(&fixed_section_id(4)).unwrap();
    document
}

#[test]
fn snapshot_has_expected_top_level_shape() {
    let document = populated();
    let value: Value = serde_json::from_str(&to_json(&document).unwrap()).unwrap();

    assert_eq!(value["tree"]["id"], "root");
    assert_eq!(value["tree"]["type"], "item");
    assert_eq!(value["tree"]["protected"], true);
    assert_eq!(value["tree"]["children"].as_array().unwrap().len(), 5);
    assert_eq!(value["tables"].as_object().unwrap().len(), 4);
    assert_eq!(value["textBlocks"].as_object().unwrap().len(), 1);
    assert_eq!(value["violations"].as_object().unwrap().len(), 1);

    let item = &value["tree"]["children"][0]["children"][0];
    assert_eq!(item["label"], "Основание проверки");
    assert_eq!(item["customLabel"], "Основание проверки");
    assert_eq!(item["baseLabel"], "Основание");
    assert_eq!(item["number"], "1.1");
    assert_eq!(item["content"], "Приказ №1");
    assert!(item.get("tableId").is_none());

    let table_node = &item["children"][0];
    assert_eq!(table_node["type"], "table");
    assert_eq!(table_node["children"], json!([]));
    let table_id = table_node["tableId"].as_str().unwrap();
    let grid = &value["tables"][table_id]["grid"];
    assert_eq!(grid[1][0]["colSpan"], 2);
    assert_eq!(grid[1][0]["content"], "x y");
    assert_eq!(grid[1][1]["isSpanned"], true);
    assert_eq!(grid[1][1]["spanOrigin"], json!({"row": 1, "col": 0}));
}

#[test]
fn risk_and_metrics_flags_are_exported() {
    let document = populated();
    let snapshot = document.export();
    let value = serde_json::to_value(&snapshot).unwrap();
    let tables = value["tables"].as_object().unwrap();
    let count = |flag: &str| tables.values().filter(|table| table[flag] == true).count();
    assert_eq!(count("isRegularRiskTable"), 1);
    assert_eq!(count("isMetricsTable"), 1);
    assert_eq!(count("isMainMetricsTable"), 1);
    assert_eq!(count("isOperationalRiskTable"), 0);
}

#[test]
fn export_is_deterministic_and_import_round_trips() {
    let document = populated();
    let first = to_json_pretty(&document).unwrap();
    assert_eq!(first, to_json_pretty(&document).unwrap());

    let restored = from_json(&first, DocumentLimits::default()).unwrap();
    assert_eq!(restored, document);
    assert!(restored
        .node(&fixed_section_id(1))
        .map(|section| !section.deletable)
        .unwrap());
}

#[test]
fn legacy_labels_without_base_label_are_recovered() {
    let document = populated();
    let mut value = serde_json::to_value(document.export()).unwrap();
    strip_base_labels(&mut value["tree"]);
    let snapshot: ExportSnapshot = serde_json::from_value(value).unwrap();
    let restored = Document::from_snapshot(snapshot, DocumentLimits::default()).unwrap();

    let section = restored.node(&fixed_section_id(2)).unwrap();
    assert_eq!(section.base_label, "Объект проверки");
    assert_eq!(section.label, "2 Объект проверки");
    let risk_group = &restored.node(&fixed_section_id(5)).unwrap().children()[1];
    assert_eq!(risk_group.base_label, "Риски");
    assert_eq!(risk_group.children()[1].label, "Таблица 2 Регулярные риски");
}

fn strip_base_labels(node: &mut Value) {
    if let Some(object) = node.as_object_mut() {
        object.remove("baseLabel");
    }
    if let Some(children) = node["children"].as_array_mut() {
        for child in children {
            strip_base_labels(child);
        }
    }
}

#[test]
fn inconsistent_snapshots_are_rejected() {
    let document = populated();
    let base = serde_json::to_value(document.export()).unwrap();

    let mut orphan = base.clone();
    let extra_id = "table-data-orphan";
    let mut extra = orphan["tables"].as_object().unwrap().values().next().unwrap().clone();
    extra["id"] = json!(extra_id);
    orphan["tables"][extra_id] = extra;

    let mut dangling = base.clone();
    dangling["textBlocks"] = json!({});

    let mut duplicate = base.clone();
    let copy = duplicate["tree"]["children"][1].clone();
    duplicate["tree"]["children"][2]["children"] = json!([copy]);

    let mut missing_section = base.clone();
    missing_section["tree"]["children"]
        .as_array_mut()
        .unwrap()
        .remove(3);

    for broken in [orphan, dangling, duplicate, missing_section] {
        let err = from_json(&broken.to_string(), DocumentLimits::default()).unwrap_err();
        assert!(matches!(err, ActError::InvalidSnapshot(_)), "got {err}");
        assert_eq!(err.category(), ErrorCategory::Snapshot);
    }
    assert!(matches!(
        from_json("{not json", DocumentLimits::default()),
        Err(ActError::InvalidSnapshot(_))
    ));
}

#[test]
fn import_resyncs_missing_companions() {
    let document = populated();
    let mut value = serde_json::to_value(document.export()).unwrap();

    let results = &mut value["tree"]["children"][4]["children"];
    let main_node = results.as_array_mut().unwrap().remove(0);
    let main_table = main_node["tableId"].as_str().unwrap().to_string();
    value["tables"].as_object_mut().unwrap().remove(&main_table);

    let restored = from_json(&value.to_string(), DocumentLimits::default()).unwrap();
    let results = restored.node(&fixed_section_id(5)).unwrap();
    let first = &results.children()[0];
    assert_eq!(first.base_label, "Сводные метрики");
    assert!(first.protected);
    assert_ne!(first.content_id().unwrap().as_str(), main_table);
    assert!(restored.node(&NodeId::from("root")).is_some());
}
