use actdoc_core::{
    fixed_section_id, ActError, Document, DocumentLimits, DropPosition, NodeId, NodeKind,
};

fn item_depths(document: &Document) -> Vec<usize> {
    let mut out = Vec::new();
    collect_item_ids(document.root(), &mut out);
    out.iter()
        .map(|id| document.depth_of(id).unwrap())
        .collect()
}

fn collect_item_ids(node: &actdoc_core::Node, out: &mut Vec<NodeId>) {
    for child in node.children() {
        if child.is_item() {
            out.push(child.id.clone());
            collect_item_ids(child, out);
        }
    }
}

#[test]
fn sixth_top_level_item_only_at_end_and_seventh_rejected() {
    let mut document = Document::new();

    let err = document
        .insert(&fixed_section_id(2), "Вставка", false)
        .unwrap_err();
    assert_eq!(err, ActError::TopLevelNotAtEnd);

    let extra = document
        .insert(&fixed_section_id(5), "Приложение", false)
        .unwrap();
    let top = document.root().children();
    assert_eq!(top.len(), 6);
    assert_eq!(top[5].id, extra);
    assert_eq!(top[5].label, "6 Приложение");

    let before = document.clone();
    let err = document.insert(&extra, "Ещё одно", false).unwrap_err();
    assert_eq!(err.to_string(), "only one additional top-level item allowed");
    let err = document.insert(&NodeId::root(), "Ещё одно", true).unwrap_err();
    assert_eq!(err, ActError::TopLevelLimitReached);
    assert_eq!(document, before);
}

#[test]
fn fourth_level_item_allowed_fifth_rejected() {
    let mut document = Document::new();
    let level2 = document.insert(&fixed_section_id(1), "Уровень 2", true).unwrap();
    let level3 = document.insert(&level2, "Уровень 3", true).unwrap();
    let level4 = document.insert(&level3, "Уровень 4", true).unwrap();
    assert_eq!(document.node(&level4).unwrap().number, "1.1.1.1");

    let before = document.clone();
    let err = document.insert(&level4, "Уровень 5", true).unwrap_err();
    assert!(matches!(err, ActError::DepthExceeded { depth: 5, max: 4 }));
    assert!(err.to_string().contains("depth"));
    assert_eq!(document, before);
    assert!(item_depths(&document).iter().all(|depth| *depth <= 4));
}

#[test]
fn sibling_of_content_under_fourth_level_item_is_rejected() {
    let mut document = Document::new();
    let level2 = document.insert(&fixed_section_id(1), "Уровень 2", true).unwrap();
    let level3 = document.insert(&level2, "Уровень 3", true).unwrap();
    let level4 = document.insert(&level3, "Уровень 4", true).unwrap();
    let table = document.add_table(&level4, 1, 1).unwrap();

    let before = document.clone();
    let err = document.insert(&table.node_id, "Глубже", false).unwrap_err();
    assert!(matches!(err, ActError::DepthExceeded { depth: 5, max: 4 }));
    assert_eq!(document, before);
    assert!(item_depths(&document).iter().all(|depth| *depth <= 4));

    let beside = document.insert(&level4, "Соседний", false).unwrap();
    assert_eq!(document.node(&beside).unwrap().number, "1.1.1.2");
}

#[test]
fn sibling_insert_lands_right_after_reference() {
    let mut document = Document::new();
    let first = document.insert(&fixed_section_id(3), "Первый", true).unwrap();
    let third = document.insert(&fixed_section_id(3), "Третий", true).unwrap();
    let second = document.insert(&first, "Второй", false).unwrap();

    let section = document.node(&fixed_section_id(3)).unwrap();
    let order: Vec<&NodeId> = section.children().iter().map(|child| &child.id).collect();
    assert_eq!(order, vec![&first, &second, &third]);
    assert_eq!(document.node(&third).unwrap().label, "3.3 Третий");
}

#[test]
fn blank_insert_label_gets_default_title() {
    let mut document = Document::new();
    let id = document.insert(&fixed_section_id(1), "   ", true).unwrap();
    assert_eq!(document.node(&id).unwrap().base_label, "Новый пункт");
}

#[test]
fn content_limit_is_per_parent_and_per_kind() {
    let limits = DocumentLimits {
        max_tables_per_parent: 2,
        ..DocumentLimits::default()
    };
    let mut document = Document::with_limits(limits);
    let host = fixed_section_id(2);
    document.add_table(&host, 1, 1).unwrap();
    document.add_table(&host, 1, 1).unwrap();
    let err = document.add_table(&host, 1, 1).unwrap_err();
    assert_eq!(
        err,
        ActError::ContentLimitReached {
            kind: NodeKind::Table,
            limit: 2
        }
    );
    document.add_text_block(&host).unwrap();
    document.add_table(&fixed_section_id(3), 1, 1).unwrap();
}

#[test]
fn content_nodes_cannot_host_children() {
    let mut document = Document::new();
    let added = document.add_text_block(&fixed_section_id(1)).unwrap();
    assert_eq!(
        document.insert(&added.node_id, "x", true).unwrap_err(),
        ActError::ParentMustBeItem(added.node_id.clone())
    );
    assert_eq!(
        document.add_violation(&added.node_id).unwrap_err(),
        ActError::ParentMustBeItem(added.node_id.clone())
    );
}

#[test]
fn cascading_delete_removes_every_record_in_subtree() {
    let mut document = Document::new();
    let parent = document.insert(&fixed_section_id(4), "Раздел", true).unwrap();
    let child = document.insert(&parent, "Подраздел", true).unwrap();
    let grandchild = document.insert(&child, "Пункт", true).unwrap();
    let t1 = document.add_table(&parent, 2, 2).unwrap();
    let v1 = document.add_violation(&child).unwrap();
    let b1 = document.add_text_block(&grandchild).unwrap();
    let keep = document.add_text_block(&fixed_section_id(4)).unwrap();

    let report = document.delete(&parent).unwrap();
    assert_eq!(report.removed_nodes.len(), 6);
    for id in [&t1.content_id, &v1.content_id, &b1.content_id] {
        assert!(report.removed_content.contains(id));
    }
    assert!(document.table(&t1.content_id).is_none());
    assert!(document.violation(&v1.content_id).is_none());
    assert!(document.text_block(&b1.content_id).is_none());
    assert!(document.node(&grandchild).is_none());
    assert_eq!(document.store().len(), 1);
    assert!(document.text_block(&keep.content_id).is_some());
}

#[test]
fn protected_nodes_and_root_cannot_be_deleted() {
    let mut document = Document::new();
    assert_eq!(
        document.delete(&NodeId::root()).unwrap_err(),
        ActError::RootImmutable
    );
    assert_eq!(
        document.delete(&fixed_section_id(1)).unwrap_err(),
        ActError::ProtectedNode(fixed_section_id(1))
    );
    assert!(matches!(
        document.delete(&NodeId::from("nope")).unwrap_err(),
        ActError::NodeNotFound(_)
    ));
}

#[test]
fn move_carries_subtree_and_renumbers() {
    let mut document = Document::new();
    let a = document.insert(&fixed_section_id(1), "A", true).unwrap();
    let a1 = document.insert(&a, "A1", true).unwrap();
    let table = document.add_table(&a1, 1, 1).unwrap();
    let b = document.insert(&fixed_section_id(2), "B", true).unwrap();

    document.move_node(&a, &b, DropPosition::After).unwrap();
    assert_eq!(document.parent_of(&a).unwrap().id, fixed_section_id(2));
    assert_eq!(document.node(&a).unwrap().label, "2.2 A");
    assert_eq!(document.node(&a1).unwrap().number, "2.2.1");
    assert_eq!(document.parent_of(&table.node_id).unwrap().id, a1);
    assert!(document.node(&fixed_section_id(1)).unwrap().children().is_empty());

    document.move_node(&a, &b, DropPosition::Before).unwrap();
    assert_eq!(document.node(&a).unwrap().number, "2.1");
    assert_eq!(document.node(&b).unwrap().number, "2.2");
}

#[test]
fn rejected_move_leaves_tree_unchanged() {
    let mut document = Document::new();
    let a = document.insert(&fixed_section_id(1), "A", true).unwrap();
    let a1 = document.insert(&a, "A1", true).unwrap();
    let before = document.clone();

    assert!(matches!(
        document.move_node(&a, &a1, DropPosition::Child),
        Err(ActError::CycleDetected { .. })
    ));
    assert!(matches!(
        document.move_node(&a, &a1, DropPosition::Before),
        Err(ActError::CycleDetected { .. })
    ));
    assert_eq!(
        document
            .move_node(&fixed_section_id(3), &a, DropPosition::Child)
            .unwrap_err(),
        ActError::ProtectedNode(fixed_section_id(3))
    );
    assert_eq!(document, before);
}

#[test]
fn content_moves_respect_limits_and_top_level_rule() {
    let limits = DocumentLimits {
        max_text_blocks_per_parent: 1,
        ..DocumentLimits::default()
    };
    let mut document = Document::with_limits(limits);
    let first = document.add_text_block(&fixed_section_id(1)).unwrap();
    document.add_text_block(&fixed_section_id(2)).unwrap();

    assert!(matches!(
        document.move_node(&first.node_id, &fixed_section_id(2), DropPosition::Child),
        Err(ActError::ContentLimitReached { .. })
    ));
    assert_eq!(
        document
            .move_node(&first.node_id, &fixed_section_id(5), DropPosition::After)
            .unwrap_err(),
        ActError::TopLevelContentForbidden
    );
    document
        .move_node(&first.node_id, &fixed_section_id(3), DropPosition::Child)
        .unwrap();
    assert_eq!(
        document.parent_of(&first.node_id).unwrap().id,
        fixed_section_id(3)
    );
}
