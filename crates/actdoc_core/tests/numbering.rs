use actdoc_core::{fixed_section_id, Document, NodeId};

#[test]
fn content_counters_are_per_parent_and_independent_of_items() {
    let mut document = Document::new();
    let section = fixed_section_id(3);
    let t1 = document.add_table(&section, 1, 1).unwrap();
    let item = document.insert(&section, "Пункт", true).unwrap();
    let b1 = document.add_text_block(&section).unwrap();
    let t2 = document.add_table(&section, 1, 1).unwrap();
    let v1 = document.add_violation(&section).unwrap();
    let nested = document.add_table(&item, 1, 1).unwrap();

    let label = |id: &NodeId| document.node(id).unwrap().label.clone();
    assert_eq!(label(&t1.node_id), "Таблица 1");
    assert_eq!(label(&t2.node_id), "Таблица 2");
    assert_eq!(label(&b1.node_id), "Текстовый блок 1");
    assert_eq!(label(&v1.node_id), "Нарушение 1");
    assert_eq!(label(&item), "3.1 Пункт");
    assert_eq!(label(&nested.node_id), "Таблица 1");
}

#[test]
fn deleting_a_sibling_shifts_following_numbers() {
    let mut document = Document::new();
    let section = fixed_section_id(1);
    let first = document.insert(&section, "Первый", true).unwrap();
    let second = document.insert(&section, "Второй", true).unwrap();
    let t1 = document.add_table(&section, 1, 1).unwrap();
    let t2 = document.add_table(&section, 1, 1).unwrap();

    document.delete(&first).unwrap();
    document.delete(&t1.node_id).unwrap();
    assert_eq!(document.node(&second).unwrap().label, "1.1 Второй");
    assert_eq!(document.node(&t2.node_id).unwrap().number, "Таблица 1");
}

#[test]
fn custom_label_overrides_display_but_number_is_kept() {
    let mut document = Document::new();
    let item = document.insert(&fixed_section_id(2), "Обычный", true).unwrap();
    document.set_custom_label(&item, "Особое название").unwrap();
    let node = document.node(&item).unwrap();
    assert_eq!(node.label, "Особое название");
    assert_eq!(node.number, "2.1");
    assert_eq!(node.base_label, "Обычный");

    document.set_custom_label(&item, "").unwrap();
    assert_eq!(document.node(&item).unwrap().label, "2.1 Обычный");

    document.set_base_label(&item, "Новое").unwrap();
    assert_eq!(document.node(&item).unwrap().label, "2.1 Новое");
}

#[test]
fn renumber_is_idempotent() {
    let mut document = Document::new();
    let a = document.insert(&fixed_section_id(1), "A", true).unwrap();
    document.insert(&a, "A1", true).unwrap();
    document.add_table(&a, 2, 2).unwrap();
    document.add_violation(&a).unwrap();

    document.renumber();
    let once = document.clone();
    document.renumber();
    assert_eq!(document, once);
}

#[test]
fn root_and_sections_have_stable_labels() {
    let document = Document::new();
    let labels: Vec<&str> = document
        .root()
        .children()
        .iter()
        .map(|section| section.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "1 Общие сведения о проверке",
            "2 Объект проверки",
            "3 Оценка процессов и процедур",
            "4 Выявленные нарушения",
            "5 Результаты проверки",
        ]
    );
}
