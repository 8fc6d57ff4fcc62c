//! CSV digit loader
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the class label (a non-negative integer)
//! - All other columns are dense numeric features
//! - First row can be headers (automatically detected)
//! - Lines starting with `#` are comments

use crate::core::{LogRegError, Result};
use crate::data::LabeledMatrix;
use ndarray::{Array1, Array2};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dense CSV loader for labeled digit rows
pub struct CsvDigits;

impl CsvDigits {
    /// Load a dataset from a CSV file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<LabeledMatrix> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader, auto-detecting a header row
    pub fn from_reader<R: BufRead>(reader: R) -> Result<LabeledMatrix> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load a dataset from a reader with explicit header option
    pub fn from_reader_with_options<R: BufRead>(
        reader: R,
        auto_detect_header: bool,
    ) -> Result<LabeledMatrix> {
        let mut values = Vec::new();
        let mut labels = Vec::new();
        let mut width: Option<usize> = None;
        let mut seen_data_line = false;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if !seen_data_line {
                seen_data_line = true;
                if auto_detect_header && Self::is_header_line(line) {
                    continue;
                }
            }

            let (row, label) = Self::parse_data_line(line, line_no + 1)?;
            match width {
                None => width = Some(row.len()),
                Some(expected) if expected != row.len() => {
                    return Err(LogRegError::ParseError(format!(
                        "line {}: expected {} feature columns, found {}",
                        line_no + 1,
                        expected,
                        row.len()
                    )));
                }
                Some(_) => {}
            }
            values.extend(row);
            labels.push(label);
        }

        let width = match width {
            Some(width) => width,
            None => return Err(LogRegError::EmptyDataset),
        };
        let features = Array2::from_shape_vec((labels.len(), width), values)
            .map_err(|e| LogRegError::ParseError(e.to_string()))?;
        log::debug!(
            "Loaded {} CSV rows with {} features",
            labels.len(),
            width
        );
        LabeledMatrix::new(features, Array1::from(labels))
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 2 {
            return false;
        }

        let non_numeric_count = fields
            .iter()
            .take(fields.len() - 1)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count > fields.len() / 2
    }

    fn parse_data_line(line: &str, line_no: usize) -> Result<(Vec<f64>, usize)> {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();
        if fields.len() < 2 {
            return Err(LogRegError::ParseError(format!(
                "line {line_no}: too few fields"
            )));
        }

        let label_str = fields[fields.len() - 1];
        let label = parse_label(label_str).ok_or_else(|| {
            LogRegError::ParseError(format!("line {line_no}: invalid label {label_str:?}"))
        })?;

        let mut row = Vec::with_capacity(fields.len() - 1);
        for (col, field) in fields.iter().take(fields.len() - 1).enumerate() {
            let value = field.parse::<f64>().map_err(|_| {
                LogRegError::ParseError(format!(
                    "line {line_no}: invalid feature value at column {}: {field}",
                    col + 1
                ))
            })?;
            if !value.is_finite() {
                return Err(LogRegError::NonFiniteInput(format!(
                    "line {line_no}, column {}",
                    col + 1
                )));
            }
            row.push(value);
        }
        Ok((row, label))
    }
}

/// Accepts `7` as well as `7.0`; rejects negatives and fractions
fn parse_label(field: &str) -> Option<usize> {
    if let Ok(label) = field.parse::<usize>() {
        return Some(label);
    }
    let value = field.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Some(value as usize)
    } else {
        None
    }
}
