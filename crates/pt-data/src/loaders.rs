use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use pt_types::{DataError, TuneResult};

use crate::dataset::Dataset;

/// Loads a labeled dataset from a headered CSV file.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    label_column: Option<String>,
    delimiter: u8,
}

impl CsvLoader {
    pub fn new() -> Self {
        Self {
            label_column: None,
            delimiter: b',',
        }
    }

    /// Use the named column as the class label (defaults to the last column).
    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = Some(column.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn load<P: AsRef<Path>>(&self, file_path: P) -> TuneResult<Dataset> {
        let path = file_path.as_ref();
        tracing::info!("Loading CSV dataset from: {}", path.display());

        if !path.exists() {
            return Err(DataError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| DataError::ReadFailed {
                message: format!("Failed to open CSV file {}: {}", path.display(), e),
            })?;

        let headers = rdr
            .headers()
            .map_err(|e| DataError::ReadFailed {
                message: format!("Failed to read CSV headers: {}", e),
            })?
            .clone();
        tracing::debug!("CSV headers: {:?}", headers);

        let label_idx = self.label_index(&headers)?;
        let feature_names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx)
            .map(|(_, name)| name.to_string())
            .collect();

        let mut features = Vec::new();
        let mut raw_labels = Vec::new();

        for (line_num, result) in rdr.records().enumerate() {
            // Header occupies line 1.
            let row = line_num + 2;
            let record = result.map_err(|e| DataError::ReadFailed {
                message: format!("Failed to read CSV record at line {}: {}", row, e),
            })?;

            if record.len() != headers.len() {
                return Err(DataError::RaggedRow {
                    row,
                    expected: headers.len(),
                    actual: record.len(),
                }
                .into());
            }

            features.push(Self::parse_features(&record, &headers, label_idx, row)?);
            raw_labels.push(record.get(label_idx).unwrap_or("").to_string());
        }

        let labels = encode_labels(&raw_labels);
        let dataset = Dataset::new(feature_names, features, labels)?;
        tracing::info!(
            "Loaded {} samples with {} features and {} classes",
            dataset.len(),
            dataset.n_features(),
            dataset.classes().len()
        );
        Ok(dataset)
    }

    fn label_index(&self, headers: &StringRecord) -> TuneResult<usize> {
        match &self.label_column {
            Some(name) => headers
                .iter()
                .position(|h| h == name.as_str())
                .ok_or_else(|| {
                    DataError::UnknownLabelColumn {
                        column: name.clone(),
                    }
                    .into()
                }),
            None => headers.len().checked_sub(1).ok_or_else(|| {
                DataError::UnknownLabelColumn {
                    column: "<last>".to_string(),
                }
                .into()
            }),
        }
    }

    fn parse_features(
        record: &StringRecord,
        headers: &StringRecord,
        label_idx: usize,
        row: usize,
    ) -> TuneResult<Vec<f64>> {
        let mut values = Vec::with_capacity(record.len().saturating_sub(1));
        for (i, cell) in record.iter().enumerate() {
            if i == label_idx {
                continue;
            }
            let value: f64 = cell.parse().map_err(|e| DataError::ParseError {
                row,
                column: headers.get(i).unwrap_or("").to_string(),
                message: format!("'{}' is not a number: {}", cell, e),
            })?;
            values.push(value);
        }
        Ok(values)
    }
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer labels are kept as-is; otherwise each distinct string becomes a
/// class index in order of first appearance.
fn encode_labels(raw: &[String]) -> Vec<i64> {
    let numeric: Option<Vec<i64>> = raw.iter().map(|s| s.parse::<i64>().ok()).collect();
    if let Some(labels) = numeric {
        return labels;
    }

    let mut mapping: HashMap<&str, i64> = HashMap::new();
    raw.iter()
        .map(|s| {
            let next = mapping.len() as i64;
            *mapping.entry(s.as_str()).or_insert(next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_types::TuneError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_last_column_as_label() {
        let file = write_csv("radius,texture,target\n1.5,2.0,0\n3.0,4.5,1\n2.2,1.1,1\n");
        let ds = CsvLoader::new().load(file.path()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.feature_names(), &["radius".to_string(), "texture".to_string()]);
        assert_eq!(ds.labels(), &[0, 1, 1]);
        assert_eq!(ds.features()[1], vec![3.0, 4.5]);
    }

    #[test]
    fn named_label_column() {
        let file = write_csv("diagnosis,radius,texture\nM,1.5,2.0\nB,3.0,4.5\nM,2.2,1.1\n");
        let ds = CsvLoader::new()
            .with_label_column("diagnosis")
            .load(file.path())
            .unwrap();
        assert_eq!(ds.labels(), &[0, 1, 0]);
        assert_eq!(ds.n_features(), 2);
    }

    #[test]
    fn unknown_label_column() {
        let file = write_csv("a,b\n1,0\n");
        let err = CsvLoader::new()
            .with_label_column("target")
            .load(file.path())
            .unwrap_err();
        assert!(matches!(
            err,
            TuneError::Data(DataError::UnknownLabelColumn { .. })
        ));
    }

    #[test]
    fn non_numeric_feature_reports_location() {
        let file = write_csv("a,b,target\n1,2,0\n1,oops,1\n");
        let err = CsvLoader::new().load(file.path()).unwrap_err();
        match err {
            TuneError::Data(DataError::ParseError { row, column, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(column, "b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_file() {
        let err = CsvLoader::new().load("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, TuneError::Data(DataError::FileNotFound { .. })));
    }

    #[test]
    fn semicolon_delimiter() {
        let file = write_csv("a;b;y\n0.5;1.5;2\n");
        let ds = CsvLoader::new().with_delimiter(b';').load(file.path()).unwrap();
        assert_eq!(ds.labels(), &[2]);
        assert_eq!(ds.features()[0], vec![0.5, 1.5]);
    }
}
