//! On-disk layout of the array-store container.
//!
//! A store file is a fixed header, a dataset directory, and a raw data
//! region. All integers are little-endian:
//!
//! ```text
//! header:    magic [u8; 8] | version_major u16 | version_minor u16 | count u32
//! directory: per dataset:
//!            name_len u16 | name utf-8 | dtype u8 | rank u8 |
//!            dims [u64; rank] | data_offset u64 | data_len u64
//! data:      contiguous little-endian element blobs at the recorded offsets
//! ```

use std::convert::TryInto;
use std::io::{Read, Write};

use crate::error::{BenchError, Result};

const MAGIC: &[u8; 8] = b"ARRSTOR\0";
const VERSION_MAJOR: u16 = 1;
const VERSION_MINOR: u16 = 0;

/// Size of the fixed file header in bytes.
pub const HEADER_LEN: u64 = 16;

/// Element type of a stored dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    /// 32-bit IEEE float.
    F32,
    /// 64-bit IEEE float.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn elem_size(self) -> u64 {
        match self {
            DType::F32 | DType::I32 => 4,
            DType::F64 | DType::I64 => 8,
        }
    }

    /// Short lowercase name, used by the store generator CLI.
    pub fn name(self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I32 => "i32",
            DType::I64 => "i64",
        }
    }

    /// Parse the short name form accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "f32" => Some(DType::F32),
            "f64" => Some(DType::F64),
            "i32" => Some(DType::I32),
            "i64" => Some(DType::I64),
            _ => None,
        }
    }

    fn tag(self) -> u8 {
        match self {
            DType::F32 => 1,
            DType::F64 => 2,
            DType::I32 => 3,
            DType::I64 => 4,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(DType::F32),
            2 => Ok(DType::F64),
            3 => Ok(DType::I32),
            4 => Ok(DType::I64),
            other => Err(BenchError::Corruption(format!(
                "unknown dtype tag {other}"
            ))),
        }
    }

    /// Arithmetic mean of a little-endian element blob, 0.0 when empty.
    ///
    /// Integers are widened to f64 before summing, matching the reduction
    /// the `compute-avg` test kind performs on float data.
    pub fn mean_le(self, bytes: &[u8]) -> f64 {
        let size = self.elem_size() as usize;
        let count = bytes.len() / size;
        if count == 0 {
            return 0.0;
        }
        let sum: f64 = bytes
            .chunks_exact(size)
            .map(|chunk| match self {
                DType::F32 => {
                    f32::from_le_bytes(chunk.try_into().expect("chunk is 4 bytes")) as f64
                }
                DType::F64 => f64::from_le_bytes(chunk.try_into().expect("chunk is 8 bytes")),
                DType::I32 => {
                    i32::from_le_bytes(chunk.try_into().expect("chunk is 4 bytes")) as f64
                }
                DType::I64 => {
                    i64::from_le_bytes(chunk.try_into().expect("chunk is 8 bytes")) as f64
                }
            })
            .sum();
        sum / count as f64
    }
}

/// Directory entry describing one named dataset.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    /// Dataset name, unique within the store.
    pub name: String,
    /// Element type.
    pub dtype: DType,
    /// Dimension extents; a scalar has an empty shape.
    pub shape: Vec<u64>,
    /// Byte offset of the data blob from the start of the file.
    pub offset: u64,
    /// Length of the data blob in bytes.
    pub byte_len: u64,
}

impl DatasetInfo {
    /// Number of elements declared by the shape.
    pub fn element_count(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Total payload size derived from shape and dtype, metadata only.
    pub fn total_bytes(&self) -> u64 {
        self.element_count() * self.dtype.elem_size()
    }

    /// Encoded size of this directory entry in bytes.
    pub fn encoded_len(&self) -> u64 {
        2 + self.name.len() as u64 + 1 + 1 + 8 * self.shape.len() as u64 + 8 + 8
    }
}

/// Write the fixed header for a store holding `count` datasets.
pub fn write_header<W: Write>(writer: &mut W, count: u32) -> Result<()> {
    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION_MAJOR.to_le_bytes())?;
    writer.write_all(&VERSION_MINOR.to_le_bytes())?;
    writer.write_all(&count.to_le_bytes())?;
    Ok(())
}

/// Read and validate the fixed header, returning the dataset count.
pub fn read_header<R: Read>(reader: &mut R) -> Result<u32> {
    let mut magic = [0u8; 8];
    reader
        .read_exact(&mut magic)
        .map_err(|_| BenchError::Corruption("file shorter than header".into()))?;
    if &magic != MAGIC {
        return Err(BenchError::Corruption("invalid store magic".into()));
    }
    let major = read_u16(reader)?;
    let minor = read_u16(reader)?;
    if major != VERSION_MAJOR {
        return Err(BenchError::Corruption(format!(
            "unsupported store version {major}.{minor}"
        )));
    }
    read_u32(reader)
}

/// Write one directory entry.
pub fn write_entry<W: Write>(writer: &mut W, info: &DatasetInfo) -> Result<()> {
    let name_len = u16::try_from(info.name.len())
        .map_err(|_| BenchError::InvalidArgument("dataset name exceeds u16::MAX bytes".into()))?;
    let rank = u8::try_from(info.shape.len())
        .map_err(|_| BenchError::InvalidArgument("dataset rank exceeds u8::MAX".into()))?;
    writer.write_all(&name_len.to_le_bytes())?;
    writer.write_all(info.name.as_bytes())?;
    writer.write_all(&[info.dtype.tag(), rank])?;
    for dim in &info.shape {
        writer.write_all(&dim.to_le_bytes())?;
    }
    writer.write_all(&info.offset.to_le_bytes())?;
    writer.write_all(&info.byte_len.to_le_bytes())?;
    Ok(())
}

/// Read one directory entry and check it is internally consistent.
pub fn read_entry<R: Read>(reader: &mut R) -> Result<DatasetInfo> {
    let name_len = read_u16(reader)? as usize;
    let mut name_buf = vec![0u8; name_len];
    reader.read_exact(&mut name_buf)?;
    let name = String::from_utf8(name_buf)
        .map_err(|_| BenchError::Corruption("dataset name is not valid UTF-8".into()))?;

    let mut tag_rank = [0u8; 2];
    reader.read_exact(&mut tag_rank)?;
    let dtype = DType::from_tag(tag_rank[0])?;
    let rank = tag_rank[1] as usize;

    let mut shape = Vec::with_capacity(rank);
    for _ in 0..rank {
        shape.push(read_u64(reader)?);
    }
    let offset = read_u64(reader)?;
    let byte_len = read_u64(reader)?;

    let info = DatasetInfo {
        name,
        dtype,
        shape,
        offset,
        byte_len,
    };
    if info.byte_len != info.total_bytes() {
        return Err(BenchError::Corruption(format!(
            "dataset {}: directory length {} does not match shape ({} bytes)",
            info.name,
            info.byte_len,
            info.total_bytes()
        )));
    }
    Ok(info)
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
