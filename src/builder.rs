//! Store builder for flexible configuration
//!
//! Collects the element class, configuration and initial columns of a
//! [`ColumnStore`], and optionally the snapshot file it is restored from.

use std::sync::Arc;

use attrstore_types::ElementClass;

use crate::column::{Column, ColumnStore};
use crate::config::Config;
use crate::error::Result;
#[cfg(feature = "snapshot")]
use crate::{
    element::Element,
    error::AttrError,
    storage::{SnapshotConfig, SnapshotFile},
};
#[cfg(feature = "snapshot")]
use std::path::PathBuf;

/// Builder for column stores.
#[derive(Debug)]
pub struct StoreBuilder {
    class: ElementClass,
    config: Config,
    columns: Vec<Column>,
    #[cfg(feature = "snapshot")]
    snapshot_path: Option<PathBuf>,
    #[cfg(feature = "snapshot")]
    auto_snapshot_ops: Option<usize>,
}

/// A store restored from a snapshot together with its elements.
#[cfg(feature = "snapshot")]
#[derive(Debug)]
pub struct OpenedStore {
    pub store: Arc<ColumnStore>,
    pub elements: Vec<Element>,
    pub snapshot: SnapshotFile,
}

impl StoreBuilder {
    /// Create a builder for `class` with the default configuration.
    pub fn new(class: ElementClass) -> Self {
        Self {
            class,
            config: Config::default(),
            columns: Vec::new(),
            #[cfg(feature = "snapshot")]
            snapshot_path: None,
            #[cfg(feature = "snapshot")]
            auto_snapshot_ops: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.config = self.config.with_timestamps(enabled);
        self
    }

    pub fn indexing(mut self, enabled: bool) -> Self {
        self.config = self.config.with_indexing(enabled);
        self
    }

    pub fn version_limit(mut self, limit: u32) -> Self {
        self.config.version_limit = limit;
        self
    }

    /// Register `column` when the store is built.
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Snapshot file to restore from in [`Self::open`].
    #[cfg(feature = "snapshot")]
    pub fn snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    #[cfg(feature = "snapshot")]
    pub fn auto_snapshot_ops(mut self, ops: usize) -> Self {
        self.auto_snapshot_ops = Some(ops);
        self
    }

    /// Build an in-memory store with the configured columns.
    pub fn build(self) -> Result<Arc<ColumnStore>> {
        let store = ColumnStore::new(self.class, self.config)?;
        for column in self.columns {
            store.add_column(column)?;
        }
        Ok(Arc::new(store))
    }

    /// Build the store and restore it from the snapshot path, if the file
    /// exists. Configured columns missing from the snapshot are added after
    /// loading.
    #[cfg(feature = "snapshot")]
    pub fn open(self) -> Result<OpenedStore> {
        let path = self.snapshot_path.ok_or_else(|| {
            AttrError::InvalidConfig("open() requires a snapshot path".to_string())
        })?;
        let store = Arc::new(ColumnStore::new(self.class, self.config)?);
        let snapshot = SnapshotFile::new(
            &path,
            SnapshotConfig {
                auto_snapshot_ops: self.auto_snapshot_ops,
            },
        );
        let elements = snapshot.load(&store)?;

        for column in self.columns {
            if !store.has_column(column.id()) {
                store.add_column(column)?;
            }
        }

        Ok(OpenedStore {
            store,
            elements,
            snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttrError;
    use attrstore_types::{TypeTag, ValueType};

    #[test]
    fn test_builder_default() {
        let store = StoreBuilder::new(ElementClass::Node).build().unwrap();
        assert_eq!(store.class(), ElementClass::Node);
        assert_eq!(store.config(), &Config::default());
        assert_eq!(store.size(), 3);
    }

    #[test]
    fn test_builder_with_columns() {
        let store = StoreBuilder::new(ElementClass::Edge)
            .timestamps(false)
            .column(
                Column::builder("weight", TypeTag::Scalar(ValueType::Double))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert!(!store.has_timestamps());
        assert!(store.has_column("weight"));
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        let err = StoreBuilder::new(ElementClass::Node)
            .version_limit(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, AttrError::InvalidConfig(_)));
    }

    #[test]
    fn test_builder_rejects_indexed_column_without_indexing() {
        let err = StoreBuilder::new(ElementClass::Node)
            .indexing(false)
            .column(
                Column::builder("k", TypeTag::Scalar(ValueType::Int))
                    .indexed(true)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, AttrError::IndexingUnsupported(_)));
    }

    #[cfg(feature = "snapshot")]
    #[test]
    fn test_open_requires_path() {
        assert!(matches!(
            StoreBuilder::new(ElementClass::Node).open(),
            Err(AttrError::InvalidConfig(_))
        ));
    }

    #[cfg(feature = "snapshot")]
    #[test]
    fn test_open_missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let opened = StoreBuilder::new(ElementClass::Node)
            .snapshot_path(dir.path().join("nodes.snap"))
            .auto_snapshot_ops(10)
            .column(
                Column::builder("age", TypeTag::Scalar(ValueType::Int))
                    .build()
                    .unwrap(),
            )
            .open()
            .unwrap();
        assert!(opened.elements.is_empty());
        assert!(opened.store.has_column("age"));
        assert!(!opened.snapshot.should_snapshot());
    }
}
