use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Column names of an extracted line table, in row order.
pub const COLUMN_NAMES: [&str; 8] = [
    "Wavenumber",
    "Wavelength",
    "Einstein A",
    "Energy_cm",
    "Band",
    "LineName",
    "gu",
    "gl",
];

// ---------------------------------------------------------------------------
// LineRecord – one accepted HITRAN line
// ---------------------------------------------------------------------------

/// A single spectral line (one row of the result table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Transition wavenumber (cm⁻¹).
    #[serde(rename = "Wavenumber")]
    pub wavenumber: f64,
    /// Wavelength (µm).
    #[serde(rename = "Wavelength")]
    pub wavelength: f64,
    #[serde(rename = "Einstein A")]
    pub einstein_a: f64,
    /// Lower-state energy (cm⁻¹).
    #[serde(rename = "Energy_cm")]
    pub lower_energy: f64,
    /// Matched band tokens, space-joined.
    #[serde(rename = "Band")]
    pub band: String,
    #[serde(rename = "LineName")]
    pub line_name: String,
    pub gu: f64,
    pub gl: f64,
}

// ---------------------------------------------------------------------------
// LineTable – the extraction result
// ---------------------------------------------------------------------------

/// Accepted lines in input-file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineTable {
    rows: Vec<LineRecord>,
}

impl LineTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: LineRecord) {
        self.rows.push(row);
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no line was accepted.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[LineRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineRecord> {
        self.rows.iter()
    }

    pub fn column_names(&self) -> &'static [&'static str] {
        &COLUMN_NAMES
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> LineTable {
        LineTable {
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Arrow schema matching [`COLUMN_NAMES`].
    pub fn schema() -> Arc<Schema> {
        let field = |name: &str, dtype: DataType| Field::new(name, dtype, false);
        Arc::new(Schema::new(vec![
            field(COLUMN_NAMES[0], DataType::Float64),
            field(COLUMN_NAMES[1], DataType::Float64),
            field(COLUMN_NAMES[2], DataType::Float64),
            field(COLUMN_NAMES[3], DataType::Float64),
            field(COLUMN_NAMES[4], DataType::Utf8),
            field(COLUMN_NAMES[5], DataType::Utf8),
            field(COLUMN_NAMES[6], DataType::Float64),
            field(COLUMN_NAMES[7], DataType::Float64),
        ]))
    }

    /// Columnar form for Parquet export and preview rendering.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let floats = |f: fn(&LineRecord) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from(self.rows.iter().map(f).collect::<Vec<_>>()))
        };
        let strings = |f: fn(&LineRecord) -> &str| -> ArrayRef {
            Arc::new(StringArray::from(self.rows.iter().map(f).collect::<Vec<_>>()))
        };

        let batch = RecordBatch::try_new(
            Self::schema(),
            vec![
                floats(|r| r.wavenumber),
                floats(|r| r.wavelength),
                floats(|r| r.einstein_a),
                floats(|r| r.lower_energy),
                strings(|r| r.band.as_str()),
                strings(|r| r.line_name.as_str()),
                floats(|r| r.gu),
                floats(|r| r.gl),
            ],
        )?;
        Ok(batch)
    }
}

impl FromIterator<LineRecord> for LineTable {
    fn from_iter<I: IntoIterator<Item = LineRecord>>(iter: I) -> Self {
        LineTable {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for LineTable {
    type Item = LineRecord;
    type IntoIter = std::vec::IntoIter<LineRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a LineTable {
    type Item = &'a LineRecord;
    type IntoIter = std::slice::Iter<'a, LineRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
