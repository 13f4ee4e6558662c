//! # CSV Source Adapter
//!
//! Reads labeled points from comma-separated text.
//!
//! Format:
//!
//! ```text
//! x,y,label        <- header: column count fixes the attribute count
//! 0.5,1.25,red
//! 3.0,0.75,blue
//! ```
//!
//! The last column is the class label; every other column is an `f32`
//! attribute. Rows with the wrong number of columns or unparsable numbers
//! are skipped with a warning rather than failing the load.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::{Dataset, Point};
use crate::ports::{PointSource, SourceError, SourceResult};

/// CSV file on disk
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> SourceResult<BufReader<File>> {
        Ok(BufReader::new(File::open(&self.path)?))
    }
}

impl PointSource for CsvSource {
    fn load(&self) -> SourceResult<Dataset> {
        let dataset = parse_csv(self.open()?, None)?;
        debug!(path = ?self.path, points = dataset.len(), "dataset loaded");
        Ok(dataset)
    }

    fn load_with_labels(&self, labels: &Dataset) -> SourceResult<Dataset> {
        let dataset = parse_csv(self.open()?, Some(labels))?;
        debug!(path = ?self.path, points = dataset.len(), "dataset loaded");
        Ok(dataset)
    }
}

/// Parse CSV from any buffered reader
///
/// With `labels`, the result shares (and may extend) that label space and
/// must have the same attribute count.
pub fn parse_csv<R: BufRead>(reader: R, labels: Option<&Dataset>) -> SourceResult<Dataset> {
    let mut lines = reader.lines();

    let header = lines.next().ok_or(SourceError::MissingHeader)??;
    let columns = header.split(',').count();
    if columns < 2 {
        return Err(SourceError::TooFewColumns(columns));
    }
    let attributes = columns - 1;

    let mut dataset = match labels {
        Some(labels) => {
            if labels.dimensionality() != attributes {
                return Err(SourceError::AttributeCount {
                    expected: labels.dimensionality(),
                    got: attributes,
                });
            }
            Dataset::with_classes_of(labels)
        }
        None => Dataset::new(attributes)?,
    };

    for (line_no, line) in lines.enumerate() {
        let line = line?;
        let row = line.trim();
        if row.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = row.split(',').map(str::trim).collect();
        if tokens.len() != columns {
            warn!(line = line_no + 2, row, "skipping malformed row");
            continue;
        }

        let Some((label, values)) = tokens.split_last() else {
            continue;
        };
        let dims: Result<Vec<f32>, _> = values.iter().map(|t| t.parse::<f32>()).collect();
        let Ok(dims) = dims else {
            warn!(line = line_no + 2, row, "skipping row with invalid numbers");
            continue;
        };

        dataset.push_labeled(Point::new(dims), label)?;
    }

    Ok(dataset)
}
