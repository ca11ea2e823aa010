//! 1-D integer NumPy (`.npy`) arrays.
//!
//! Sentence counts and document offsets are small arrays written with
//! `numpy.save`, so they are read into memory in one go. `int64` is what
//! NumPy writes by default; `int32` arrays are widened.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ndarray::Array1;
use ndarray_npy::{ReadNpyError, ReadNpyExt, WriteNpyExt};

use crate::error::{Error, Result};

/// Reads a 1-D integer array from an `.npy` file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Npy`] if it
/// is not a 1-D `int64`/`int32` array.
pub fn read_i64_array(path: &Path) -> Result<Vec<i64>> {
    let bytes = std::fs::read(path)?;
    parse_i64_array(&bytes).map_err(|e| match e {
        Error::Npy(msg) => Error::Npy(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Parses a 1-D integer array from in-memory `.npy` bytes.
///
/// # Errors
///
/// Returns [`Error::Npy`] for a malformed or unsupported array.
pub fn parse_i64_array(bytes: &[u8]) -> Result<Vec<i64>> {
    match Array1::<i64>::read_npy(bytes) {
        Ok(array) => Ok(array.to_vec()),
        Err(ReadNpyError::WrongDescriptor(_)) => {
            let array = Array1::<i32>::read_npy(bytes).map_err(npy_error)?;
            Ok(array.iter().map(|&v| i64::from(v)).collect())
        }
        Err(e) => Err(npy_error(e)),
    }
}

/// Writes `values` as an `int64` `.npy` file.
///
/// Used to build sentence-count and offset fixtures.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be created and [`Error::Npy`] on
/// write failure.
pub fn write_i64_array(path: &Path, values: &[i64]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    Array1::from(values.to_vec())
        .write_npy(writer)
        .map_err(|e| Error::Npy(format!("{}: {e}", path.display())))
}

fn npy_error(e: ReadNpyError) -> Error {
    Error::Npy(e.to_string())
}
