use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::normalizer::{RawAmount, RawSignal};

#[derive(Debug)]
pub enum SignalImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidTimestamp { row: usize, value: String },
}

impl std::fmt::Display for SignalImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalImportError::Io(err) => write!(f, "failed to read signal export: {}", err),
            SignalImportError::Csv(err) => write!(f, "invalid signal CSV data: {}", err),
            SignalImportError::InvalidTimestamp { row, value } => {
                write!(f, "row {}: '{}' is not a timestamp or date", row, value)
            }
        }
    }
}

impl std::error::Error for SignalImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SignalImportError::Io(err) => Some(err),
            SignalImportError::Csv(err) => Some(err),
            SignalImportError::InvalidTimestamp { .. } => None,
        }
    }
}

impl From<std::io::Error> for SignalImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SignalImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads candidate signals from a CSV export.
pub struct SignalCsvImporter;

impl SignalCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawSignal>, SignalImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<RawSignal>, SignalImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut signals = Vec::new();

        for (index, record) in csv_reader.deserialize::<SignalRow>().enumerate() {
            let row = record?;
            // Header is line 1.
            signals.push(row.into_signal(index + 2)?);
        }

        Ok(signals)
    }
}

#[derive(Debug, Deserialize)]
struct SignalRow {
    #[serde(rename = "Action ID")]
    action_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Category", default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(rename = "Risk Level")]
    risk_level: String,
    #[serde(rename = "Exposure", default, deserialize_with = "empty_string_as_none")]
    exposure: Option<String>,
    #[serde(rename = "Observed At")]
    observed_at: String,
    #[serde(
        rename = "Duplicate Of",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    duplicate_of: Option<String>,
    #[serde(
        rename = "Snoozed Until",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    snoozed_until: Option<String>,
    #[serde(rename = "Confidence", default)]
    confidence: Option<f64>,
}

impl SignalRow {
    fn into_signal(self, row: usize) -> Result<RawSignal, SignalImportError> {
        let observed_at =
            parse_timestamp(&self.observed_at).ok_or_else(|| SignalImportError::InvalidTimestamp {
                row,
                value: self.observed_at.clone(),
            })?;
        let snoozed_until = match self.snoozed_until {
            Some(value) => Some(
                parse_timestamp(&value)
                    .ok_or(SignalImportError::InvalidTimestamp { row, value })?,
            ),
            None => None,
        };

        Ok(RawSignal {
            id: self.action_id,
            title: self.title,
            category: self.category,
            risk_level: self.risk_level,
            exposure: self.exposure.map(RawAmount::Text),
            confidence: self.confidence,
            observed_at,
            duplicate_of: self.duplicate_of,
            snoozed_until,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
