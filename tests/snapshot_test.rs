use attrstore::{
    AttrError, Column, ColumnStore, Config, ElementClass, Element, Estimator, Interval,
    SnapshotConfig, SnapshotFile, StoreBuilder, TypeTag, Value, ValueType,
};
use std::sync::Arc;
use tempfile::TempDir;

fn populated() -> (Arc<ColumnStore>, Vec<Element>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = StoreBuilder::new(ElementClass::Edge)
        .column(
            Column::builder("kind", TypeTag::Scalar(ValueType::Char))
                .default_value(Value::Char('x'))
                .build()
                .unwrap(),
        )
        .column(
            Column::builder("flow", TypeTag::Timestamped(ValueType::Float))
                .estimator(Estimator::Max)
                .build()
                .unwrap(),
        )
        .column(Column::builder("scratch", TypeTag::Scalar(ValueType::Bool)).build().unwrap())
        .build()
        .unwrap();
    // Leaves a hole in the dense index space.
    store.remove_column("scratch").unwrap();

    let elements: Vec<_> = (0..3)
        .map(|i| {
            let edge = Element::new(store.clone(), format!("e{}", i));
            edge.set_attribute("kind", Some(Value::Char('a'))).unwrap();
            edge.set_attribute_at("flow", Some(Value::Float(i as f32)), 1.0)
                .unwrap();
            edge.set_attribute_at("flow", Some(Value::Float(10.0 + i as f32)), 2.0)
                .unwrap();
            edge.add_timestamp(100.0 + i as f64).unwrap();
            edge
        })
        .collect();
    (store, elements)
}

#[test]
fn test_snapshot_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("edges.snap");
    let (store, elements) = populated();

    let mut snapshot = SnapshotFile::new(&path, SnapshotConfig::default());
    snapshot.save(&store, &elements).unwrap();
    assert!(snapshot.exists());

    let restored = Arc::new(ColumnStore::new(ElementClass::Edge, Config::default()).unwrap());
    let loaded = snapshot.load(&restored).unwrap();

    assert_eq!(loaded.len(), 3);
    assert_eq!(restored.column_ids(), store.column_ids());
    assert!(!restored.has_column("scratch"));

    let all = Interval::new(0.0, 10.0).unwrap();
    for (i, edge) in loaded.iter().enumerate() {
        assert_eq!(edge.id(), format!("e{}", i));
        assert_eq!(edge.get_value("kind").unwrap(), Some(Value::Char('a')));
        assert_eq!(
            edge.get_attribute_in("flow", &all).unwrap(),
            Some(Value::Float(10.0 + i as f32))
        );
        assert_eq!(edge.timestamps(), vec![100.0 + i as f64]);
    }

    // The freed slot is still the first one handed out.
    let reused = restored
        .add_column(Column::builder("fresh", TypeTag::Scalar(ValueType::Int)).build().unwrap())
        .unwrap();
    assert_eq!(reused.dense_index(), Some(5));
}

#[test]
fn test_open_through_builder() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("edges.snap");
    let (store, elements) = populated();
    SnapshotFile::new(&path, SnapshotConfig::default())
        .save(&store, &elements)
        .unwrap();

    let opened = StoreBuilder::new(ElementClass::Edge)
        .snapshot_path(&path)
        .column(Column::builder("extra", TypeTag::Scalar(ValueType::Short)).build().unwrap())
        .column(Column::builder("kind", TypeTag::Scalar(ValueType::Char)).build().unwrap())
        .open()
        .unwrap();

    assert_eq!(opened.elements.len(), 3);
    assert!(opened.store.has_column("extra"));
    // The snapshot's definition wins over the builder's.
    let kind = opened.store.get_column("kind").unwrap();
    assert_eq!(kind.default_value(), Some(&Value::Char('x')));
}

#[test]
fn test_load_into_non_empty_store_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("edges.snap");
    let (store, elements) = populated();
    let mut snapshot = SnapshotFile::new(&path, SnapshotConfig::default());
    snapshot.save(&store, &elements).unwrap();

    let target = StoreBuilder::new(ElementClass::Edge)
        .column(Column::builder("other", TypeTag::Scalar(ValueType::Int)).build().unwrap())
        .build()
        .unwrap();
    assert!(matches!(
        snapshot.load(&target),
        Err(AttrError::StoreNotEmpty)
    ));
    assert_eq!(target.column_ids(), vec!["id", "label", "timeset", "other"]);
}

#[test]
fn test_truncated_snapshot_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("edges.snap");
    let (store, elements) = populated();
    SnapshotFile::new(&path, SnapshotConfig::default())
        .save(&store, &elements)
        .unwrap();

    let raw = std::fs::read(&path).unwrap();
    std::fs::write(&path, &raw[..raw.len() - 5]).unwrap();

    let target = StoreBuilder::new(ElementClass::Edge).build().unwrap();
    let result = SnapshotFile::new(&path, SnapshotConfig::default()).load(&target);
    assert!(matches!(result, Err(AttrError::UnexpectedEof)));
    assert_eq!(target.size(), 3);
    assert_eq!(target.timestamp_reference_count(100.0), 0);
}

#[test]
fn test_class_mismatch_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("edges.snap");
    let (store, elements) = populated();
    SnapshotFile::new(&path, SnapshotConfig::default())
        .save(&store, &elements)
        .unwrap();

    let nodes = StoreBuilder::new(ElementClass::Node).build().unwrap();
    let err = SnapshotFile::new(&path, SnapshotConfig::default())
        .load(&nodes)
        .unwrap_err();
    assert!(matches!(err, AttrError::InvalidFormat(_)));
    assert_eq!(nodes.size(), 3);
}
