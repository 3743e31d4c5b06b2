//! One-shot writer for array-store files.
//!
//! Used by the synthetic store generator and by tests. A builder collects
//! datasets in memory and writes the whole file in a single pass; existing
//! store files are never appended to or mutated.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{BenchError, Result};
use crate::store::format::{self, DType, DatasetInfo, HEADER_LEN};

/// In-memory accumulator for a new store file.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    datasets: Vec<PendingDataset>,
}

#[derive(Debug)]
struct PendingDataset {
    name: String,
    dtype: DType,
    shape: Vec<u64>,
    data: Vec<u8>,
}

impl StoreBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset of 64-bit floats.
    pub fn dataset_f64(&mut self, name: &str, shape: &[u64], values: &[f64]) -> Result<&mut Self> {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(name, DType::F64, shape, values.len(), data)
    }

    /// Add a dataset of 32-bit floats.
    pub fn dataset_f32(&mut self, name: &str, shape: &[u64], values: &[f32]) -> Result<&mut Self> {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(name, DType::F32, shape, values.len(), data)
    }

    /// Add a dataset of 32-bit signed integers.
    pub fn dataset_i32(&mut self, name: &str, shape: &[u64], values: &[i32]) -> Result<&mut Self> {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(name, DType::I32, shape, values.len(), data)
    }

    /// Add a dataset of 64-bit signed integers.
    pub fn dataset_i64(&mut self, name: &str, shape: &[u64], values: &[i64]) -> Result<&mut Self> {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(name, DType::I64, shape, values.len(), data)
    }

    fn push(
        &mut self,
        name: &str,
        dtype: DType,
        shape: &[u64],
        value_count: usize,
        data: Vec<u8>,
    ) -> Result<&mut Self> {
        let declared: u64 = shape.iter().product();
        if declared != value_count as u64 {
            return Err(BenchError::InvalidArgument(format!(
                "dataset {name}: shape declares {declared} elements, got {value_count}"
            )));
        }
        if self.datasets.iter().any(|d| d.name == name) {
            return Err(BenchError::InvalidArgument(format!(
                "duplicate dataset name: {name}"
            )));
        }
        self.datasets.push(PendingDataset {
            name: name.to_string(),
            dtype,
            shape: shape.to_vec(),
            data,
        });
        Ok(self)
    }

    /// Write the complete store to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let count = u32::try_from(self.datasets.len())
            .map_err(|_| BenchError::InvalidArgument("too many datasets".into()))?;

        // Lay out directory entries first so data offsets are known up front.
        let mut entries: Vec<DatasetInfo> = self
            .datasets
            .iter()
            .map(|d| DatasetInfo {
                name: d.name.clone(),
                dtype: d.dtype,
                shape: d.shape.clone(),
                offset: 0,
                byte_len: d.data.len() as u64,
            })
            .collect();
        let dir_len: u64 = entries.iter().map(DatasetInfo::encoded_len).sum();
        let mut offset = HEADER_LEN + dir_len;
        for entry in &mut entries {
            entry.offset = offset;
            offset += entry.byte_len;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        format::write_header(&mut writer, count)?;
        for entry in &entries {
            format::write_entry(&mut writer, entry)?;
        }
        for dataset in &self.datasets {
            writer.write_all(&dataset.data)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_must_match_value_count() {
        let mut builder = StoreBuilder::new();
        let err = builder.dataset_f64("ds", &[4], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, BenchError::InvalidArgument(_)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut builder = StoreBuilder::new();
        builder.dataset_i32("ds", &[1], &[7]).unwrap();
        let err = builder.dataset_i32("ds", &[1], &[8]).unwrap_err();
        assert!(matches!(err, BenchError::InvalidArgument(_)));
    }
}
