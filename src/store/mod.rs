//! Binary array-store container: a flat file of named, typed, shaped
//! datasets. [`ArrayStore`] is the read-only handle the benchmark runner
//! opens; [`builder::StoreBuilder`] creates store files.

pub mod builder;
pub mod format;

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::error::{BenchError, Result};
use crate::store::format::DatasetInfo;

/// Read-only handle on an open store file.
///
/// Opening parses the header and the full dataset directory eagerly; no
/// data bytes are touched until [`ArrayStore::read`] is called. The file
/// handle closes when the store is dropped.
#[derive(Debug)]
pub struct ArrayStore {
    file: File,
    datasets: Vec<DatasetInfo>,
}

impl ArrayStore {
    /// Open a store read-only and parse its dataset directory.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(&file);
        let count = format::read_header(&mut reader)?;
        let mut datasets = Vec::with_capacity(count as usize);
        for _ in 0..count {
            datasets.push(format::read_entry(&mut reader)?);
        }
        debug!(
            path = %path.display(),
            datasets = datasets.len(),
            "opened array store"
        );
        Ok(Self { file, datasets })
    }

    /// Look up a dataset by name.
    pub fn dataset(&self, name: &str) -> Result<&DatasetInfo> {
        self.datasets
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| BenchError::DatasetNotFound(name.to_string()))
    }

    /// Names of all datasets in directory order.
    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|d| d.name.as_str())
    }

    /// Materialize a dataset's full contents into memory.
    ///
    /// This is the region the benchmark runner times; everything before it
    /// (open, directory parse, byte-size derivation) is metadata-only.
    pub fn read(&mut self, info: &DatasetInfo) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(info.offset))?;
        let mut data = vec![0u8; info.byte_len as usize];
        self.file.read_exact(&mut data).map_err(|_| {
            BenchError::Corruption(format!(
                "dataset {}: file truncated before {} bytes at offset {}",
                info.name, info.byte_len, info.offset
            ))
        })?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::builder::StoreBuilder;
    use super::format::DType;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_resolves_datasets_without_reading_data() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.arr");
        let mut builder = StoreBuilder::new();
        builder.dataset_f64("a", &[3], &[2.0, 4.0, 6.0])?;
        builder.dataset_f32("b", &[2, 2], &[1.0, 2.0, 3.0, 4.0])?;
        builder.write_to(&path)?;

        let store = ArrayStore::open(&path)?;
        assert_eq!(store.dataset_names().collect::<Vec<_>>(), vec!["a", "b"]);

        let a = store.dataset("a")?;
        assert_eq!(a.dtype, DType::F64);
        assert_eq!(a.shape, vec![3]);
        assert_eq!(a.total_bytes(), 24);

        let b = store.dataset("b")?;
        assert_eq!(b.total_bytes(), 16);
        Ok(())
    }

    #[test]
    fn read_returns_exact_payload() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.arr");
        let values = [2.0f64, 4.0, 6.0];
        let mut builder = StoreBuilder::new();
        builder.dataset_f64("ds", &[3], &values)?;
        builder.write_to(&path)?;

        let mut store = ArrayStore::open(&path)?;
        let info = store.dataset("ds")?.clone();
        let bytes = store.read(&info)?;
        assert_eq!(bytes.len(), 24);
        assert_eq!(DType::F64.mean_le(&bytes), 4.0);
        Ok(())
    }

    #[test]
    fn missing_dataset_names_the_dataset() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.arr");
        let mut builder = StoreBuilder::new();
        builder.dataset_i64("present", &[1], &[1])?;
        builder.write_to(&path)?;

        let store = ArrayStore::open(&path)?;
        match store.dataset("absent") {
            Err(BenchError::DatasetNotFound(name)) => assert_eq!(name, "absent"),
            other => panic!("expected DatasetNotFound, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn garbage_file_is_corrupt_not_panic() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("garbage.arr");
        std::fs::write(&path, b"definitely not a store")?;
        let err = ArrayStore::open(&path).unwrap_err();
        assert!(matches!(err, BenchError::Corruption(_)));
        Ok(())
    }
}
