//! Loader module for the item search pipeline.
//!
//! Reads the tabular item source into `Record`s. The first row is the header
//! and names the attributes; every following row becomes one record whose
//! attributes keep the header's column order.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use item_search_shared::Record;

/// Configuration for the record loader.
#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    /// Field delimiter of the source.
    pub delimiter: u8,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Outcome of one load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Records read from the source, in source order.
    pub records: Vec<Record>,
    /// Rows skipped because they could not be parsed.
    pub skipped_rows: usize,
    /// Records that received a generated `id`.
    pub generated_ids: usize,
    /// Earlier rows replaced by a later row with the same `id`.
    pub duplicate_ids: usize,
    /// Set when the source could not be read at all.
    pub source_error: Option<PipelineError>,
}

impl LoadReport {
    /// An empty report carrying the reason the source could not be read.
    pub fn from_error(error: PipelineError) -> Self {
        Self {
            source_error: Some(error),
            ..Self::default()
        }
    }
}

/// Serializable summary of a `LoadReport`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoadSummary {
    pub records_loaded: usize,
    pub skipped_rows: usize,
    pub source_error: Option<String>,
}

impl From<&LoadReport> for LoadSummary {
    fn from(report: &LoadReport) -> Self {
        Self {
            records_loaded: report.records.len(),
            skipped_rows: report.skipped_rows,
            source_error: report.source_error.as_ref().map(ToString::to_string),
        }
    }
}

/// Loader that turns a delimited text source into records.
#[derive(Debug, Clone, Default)]
pub struct RecordLoader {
    config: LoaderConfig,
}

impl RecordLoader {
    /// Create a new loader for comma-separated sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load records from `path`, degrading to an empty report on failure.
    ///
    /// A missing or unreadable source is logged and reported through
    /// `LoadReport::source_error`; it never aborts the caller.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> LoadReport {
        match self.try_load(path) {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Failed to load records, continuing with none");
                LoadReport::from_error(e)
            }
        }
    }

    /// Load records from `path`.
    pub fn try_load(&self, path: &Path) -> Result<LoadReport, PipelineError> {
        let file = File::open(path).map_err(|e| {
            PipelineError::source_unavailable(path.display().to_string(), e.to_string())
        })?;

        let report = self.read_from(file)?;
        info!(
            records = report.records.len(),
            skipped_rows = report.skipped_rows,
            generated_ids = report.generated_ids,
            duplicate_ids = report.duplicate_ids,
            "Loaded records"
        );
        Ok(report)
    }

    /// Read records from any reader.
    ///
    /// Rows that cannot be parsed (wrong field count, invalid UTF-8) are
    /// skipped and counted. When two rows share an `id` the later row
    /// replaces the earlier one. An unreadable header fails the whole load.
    pub fn read_from<R: Read>(&self, reader: R) -> Result<LoadReport, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| PipelineError::malformed(1, e.to_string()))?
            .clone();

        let mut report = LoadReport::default();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (index, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    let line = e
                        .position()
                        .map(|p| p.line())
                        .unwrap_or(index as u64 + 2);
                    warn!(line, error = %e, "Skipping malformed row");
                    report.skipped_rows += 1;
                    continue;
                }
            };

            let mut record = Record::from_pairs(headers.iter().zip(row.iter()));
            if record.ensure_id() {
                report.generated_ids += 1;
            }

            let id = record.id().unwrap_or_default().to_string();
            match positions.get(&id).copied() {
                Some(position) => {
                    warn!(id = %id, "Duplicate id in source, the last row wins");
                    report.records[position] = record;
                    report.duplicate_ids += 1;
                }
                None => {
                    positions.insert(id, report.records.len());
                    report.records.push(record);
                }
            }
        }

        if let Some(first) = report.records.first() {
            debug!(record = ?first, "First record");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use item_search_shared::ID_FIELD;
    use std::io::Write;

    fn load_str(source: &str) -> LoadReport {
        RecordLoader::new().read_from(source.as_bytes()).unwrap()
    }

    #[test]
    fn test_rows_become_records_in_order() {
        let report = load_str("id,item_name,brand\n7,Aspirin,ABC\n8,Ibuprofen,XYZ\n");

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.skipped_rows, 0);
        assert_eq!(report.generated_ids, 0);

        let first = &report.records[0];
        assert_eq!(first.id(), Some("7"));
        assert_eq!(first.get("item_name"), Some("Aspirin"));
        let names: Vec<&str> = first.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["id", "item_name", "brand"]);
    }

    #[test]
    fn test_missing_id_column_generates_unique_ids() {
        let report = load_str("item_name,brand\nAspirin,ABC\nIbuprofen,XYZ\n");

        assert_eq!(report.generated_ids, 2);
        let ids: Vec<&str> = report.records.iter().filter_map(Record::id).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert!(report.records.iter().all(|r| r.get(ID_FIELD).is_some()));
    }

    #[test]
    fn test_generated_ids_differ_between_loads() {
        let source = "item_name,brand\nAspirin,ABC\n";

        let first = load_str(source);
        let second = load_str(source);

        assert!(first.records[0].id().is_some());
        assert_ne!(first.records[0].id(), second.records[0].id());
    }

    #[test]
    fn test_duplicate_ids_keep_the_last_row() {
        let report = load_str("id,item_name\n1,A\n2,Other\n1,B\n");

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.duplicate_ids, 1);
        assert_eq!(report.records[0].id(), Some("1"));
        assert_eq!(report.records[0].get("item_name"), Some("B"));
        assert_eq!(report.records[1].id(), Some("2"));
        assert_eq!(LoadSummary::from(&report).records_loaded, 2);
    }

    #[test]
    fn test_blank_id_is_replaced() {
        let report = load_str("id,item_name\n,Aspirin\n5,Ibuprofen\n");

        assert_eq!(report.generated_ids, 1);
        assert!(!report.records[0].id().unwrap_or_default().is_empty());
        assert_eq!(report.records[1].id(), Some("5"));
    }

    #[test]
    fn test_header_only_source_is_empty() {
        let report = load_str("id,item_name,brand,category\n");

        assert!(report.records.is_empty());
        assert!(report.source_error.is_none());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let report = load_str("id,item_name\n1,Aspirin\n2,Ibuprofen,extra\n3,Zinc\n");

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.records[1].id(), Some("3"));
    }

    #[test]
    fn test_custom_delimiter() {
        let loader = RecordLoader::with_config(LoaderConfig { delimiter: b';' });
        let report = loader.read_from("id;item_name\n1;Aspirin\n".as_bytes()).unwrap();

        assert_eq!(report.records[0].get("item_name"), Some("Aspirin"));
    }

    #[test]
    fn test_missing_source_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");

        let report = RecordLoader::new().load(&path);

        assert!(report.records.is_empty());
        assert!(matches!(
            report.source_error,
            Some(PipelineError::SourceUnavailable { .. })
        ));
        assert!(matches!(
            RecordLoader::new().try_load(&path),
            Err(PipelineError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,item_name,brand,category").unwrap();
        writeln!(file, "1,\"Vitamin C, 500mg\",ABC,Vitamins").unwrap();
        file.flush().unwrap();

        let report = RecordLoader::new().load(file.path());
        let summary = LoadSummary::from(&report);

        assert_eq!(report.records[0].get("item_name"), Some("Vitamin C, 500mg"));
        assert_eq!(summary.records_loaded, 1);
        assert_eq!(summary.source_error, None);
    }
}
