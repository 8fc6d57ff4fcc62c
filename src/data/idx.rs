//! MNIST IDX file loader
//!
//! The IDX format is a big-endian header followed by raw bytes:
//! images carry magic `0x00000803` and three dimensions (count, rows,
//! columns); labels carry magic `0x00000801` and a single count.

use crate::core::{LogRegError, Result};
use crate::data::LabeledMatrix;
use ndarray::{Array1, Array2};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub const IMAGE_MAGIC: u32 = 0x0000_0803;
pub const LABEL_MAGIC: u32 = 0x0000_0801;

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn check_magic(found: u32, expected: u32) -> Result<()> {
    if found != expected {
        return Err(LogRegError::ParseError(format!(
            "bad IDX magic number {found:#010x}, expected {expected:#010x}"
        )));
    }
    Ok(())
}

fn checked_product(dims: &[usize]) -> Result<usize> {
    dims.iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| {
            LogRegError::ParseError(format!("IDX dimensions {dims:?} overflow the address space"))
        })
}

/// Read exactly `len` payload bytes without trusting `len` for allocation
fn read_payload<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(LogRegError::ParseError(format!(
            "truncated IDX payload: header declares {len} bytes, found {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Read an image file into an N x (rows * cols) matrix of raw pixel values
pub fn read_images<R: Read>(mut reader: R) -> Result<Array2<f64>> {
    check_magic(read_u32(&mut reader)?, IMAGE_MAGIC)?;
    let count = read_u32(&mut reader)? as usize;
    let rows = read_u32(&mut reader)? as usize;
    let cols = read_u32(&mut reader)? as usize;
    let width = checked_product(&[rows, cols])?;
    let len = checked_product(&[count, rows, cols])?;

    let pixels = read_payload(&mut reader, len)?;
    let values = pixels.into_iter().map(f64::from).collect();
    Array2::from_shape_vec((count, width), values)
        .map_err(|e| LogRegError::ParseError(e.to_string()))
}

/// Read a label file into one class index per image
pub fn read_labels<R: Read>(mut reader: R) -> Result<Array1<usize>> {
    check_magic(read_u32(&mut reader)?, LABEL_MAGIC)?;
    let count = read_u32(&mut reader)? as usize;

    let bytes = read_payload(&mut reader, count)?;
    Ok(bytes.into_iter().map(usize::from).collect())
}

/// Load a matching pair of image and label files
pub fn load_idx_pair<P: AsRef<Path>, Q: AsRef<Path>>(
    images: P,
    labels: Q,
) -> Result<LabeledMatrix> {
    let features = read_images(BufReader::new(File::open(images)?))?;
    let labels = read_labels(BufReader::new(File::open(labels)?))?;
    log::debug!(
        "Loaded {} IDX images with {} pixels",
        features.nrows(),
        features.ncols()
    );
    LabeledMatrix::new(features, labels)
}
