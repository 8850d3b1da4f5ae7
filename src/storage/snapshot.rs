//! Snapshot files for a column store and its elements.
//!
//! A snapshot is written to a temporary file, synced and renamed over the
//! previous one, so a crash never leaves a half-written snapshot behind.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use super::codec::{self, Decoder};
use crate::column::ColumnStore;
use crate::element::Element;
use crate::error::{AttrError, Result};

const SNAPSHOT_MAGIC: &[u8] = b"ATTRSTORE_SNAPSHOT";
const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Clone, Default)]
pub struct SnapshotConfig {
    /// Suggest a snapshot after this many recorded operations.
    pub auto_snapshot_ops: Option<usize>,
}

#[derive(Debug)]
pub struct SnapshotFile {
    path: PathBuf,
    config: SnapshotConfig,
    ops_since_snapshot: usize,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P, config: SnapshotConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
            ops_since_snapshot: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the snapshot into `store` and returns its elements.
    ///
    /// A missing or empty file loads nothing. Everything is decoded and
    /// checked against a scratch store first, so a bad file leaves `store`
    /// untouched.
    pub fn load(&self, store: &Arc<ColumnStore>) -> Result<Vec<Element>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)?;
        let mut reader = Reader::new(&raw);

        if reader.take(SNAPSHOT_MAGIC.len())? != SNAPSHOT_MAGIC {
            return Err(AttrError::InvalidFormat("not a snapshot file".into()));
        }
        let version = reader.u8()?;
        if version != SNAPSHOT_VERSION {
            return Err(AttrError::InvalidFormat(format!(
                "unsupported snapshot version {}",
                version
            )));
        }
        let _created_secs = reader.u64()?;
        let _created_nanos = reader.u32()?;

        let store_len = reader.u64()? as usize;
        let store_body = Bytes::copy_from_slice(reader.take(store_len)?);
        let element_count = reader.u64()? as usize;
        let mut images = Vec::with_capacity(element_count.min(raw.len()));
        for _ in 0..element_count {
            let len = reader.u64()? as usize;
            let mut decoder = Decoder::new(Bytes::copy_from_slice(reader.take(len)?));
            images.push(decoder.read_element()?);
        }

        let scratch = Arc::new(ColumnStore::new(store.class(), store.config().clone())?);
        codec::decode_store(&scratch, store_body.clone())?;
        for image in &images {
            Element::from_image(scratch.clone(), image.clone())?;
        }

        codec::decode_store(store, store_body)?;
        let elements = images
            .into_iter()
            .map(|image| Element::from_image(store.clone(), image))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "loaded snapshot {} with {} elements",
            self.path.display(),
            elements.len()
        );
        Ok(elements)
    }

    pub fn save(&mut self, store: &ColumnStore, elements: &[Element]) -> Result<()> {
        let temp_path = self.temp_path();

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        let mut writer = BufWriter::new(file);

        writer.write_all(SNAPSHOT_MAGIC)?;
        writer.write_all(&[SNAPSHOT_VERSION])?;

        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AttrError::InvalidFormat(e.to_string()))?;
        write_u64(&mut writer, created.as_secs())?;
        write_u32(&mut writer, created.subsec_nanos())?;

        let body = codec::encode_store(store);
        write_u64(&mut writer, body.len() as u64)?;
        writer.write_all(&body)?;

        write_u64(&mut writer, elements.len() as u64)?;
        for element in elements {
            let body = codec::encode_element(element)?;
            write_u64(&mut writer, body.len() as u64)?;
            writer.write_all(&body)?;
        }

        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&temp_path, &self.path)?;
        self.sync_parent_dir()?;

        self.ops_since_snapshot = 0;
        log::debug!(
            "saved snapshot {} with {} elements",
            self.path.display(),
            elements.len()
        );
        Ok(())
    }

    pub fn record_operation(&mut self) {
        self.ops_since_snapshot += 1;
    }

    pub fn should_snapshot(&self) -> bool {
        if let Some(threshold) = self.config.auto_snapshot_ops {
            self.ops_since_snapshot >= threshold
        } else {
            false
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        if let Some(name) = temp.file_name() {
            let mut new_name = name.to_string_lossy().into_owned();
            new_name.push_str(".tmp");
            temp.set_file_name(new_name);
        }
        temp
    }

    fn sync_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
        Ok(())
    }
}

/// Cursor over the fixed-width file framing.
struct Reader<'a> {
    raw: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(raw: &'a [u8]) -> Self {
        Self { raw }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.raw.len() < n {
            return Err(AttrError::UnexpectedEof);
        }
        let (head, tail) = self.raw.split_at(n);
        self.raw = tail;
        Ok(head)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}
