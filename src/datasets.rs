// src/datasets.rs

use crate::error::PcaError;
use crate::matrix::DataMatrix;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Motif categories tallied for every interface.
pub const MOTIF_FEATURES: [&str; 3] = ["Shared", "Novel", "Lost"];

/// Feature correlated against PC1 in the report.
pub const NOVEL_FEATURE: &str = "Novel";

/// A named interface table plus the presentation settings used when reporting it.
///
/// Records can be built in code (see [`builtin_datasets`]) or read from JSON:
///
/// ```json
/// {
///   "name": "heterotetramer",
///   "title": "Heterotetramer",
///   "sample_labels": ["A", "B"],
///   "feature_names": ["Shared", "Novel", "Lost"],
///   "values": [[3, 4, 0], [1, 6, 0]],
///   "color": [46, 139, 87],
///   "write_scores_csv": true,
///   "report_correlation": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Short identifier, used in output file names.
    pub name: String,
    /// Human readable assembly type, used in the plot title.
    pub title: String,
    pub sample_labels: Vec<String>,
    pub feature_names: Vec<String>,
    pub values: Vec<Vec<f64>>,
    /// Marker colour for the scatter plot (RGB).
    #[serde(default = "default_color")]
    pub color: [u8; 3],
    #[serde(default = "default_true")]
    pub write_scores_csv: bool,
    #[serde(default = "default_true")]
    pub report_correlation: bool,
}

fn default_color() -> [u8; 3] {
    colors::STEELBLUE
}

fn default_true() -> bool {
    true
}

/// Named marker colours.
pub mod colors {
    pub const SEAGREEN: [u8; 3] = [46, 139, 87];
    pub const TOMATO: [u8; 3] = [255, 99, 71];
    pub const DODGERBLUE: [u8; 3] = [30, 144, 255];
    pub const STEELBLUE: [u8; 3] = [70, 130, 180];
}

impl DatasetConfig {
    /// Validates the record and builds its data matrix.
    pub fn to_matrix(&self) -> Result<DataMatrix, PcaError> {
        DataMatrix::from_rows(
            self.sample_labels.clone(),
            self.feature_names.clone(),
            &self.values,
        )
    }

    /// Reads a single dataset record from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PcaError> {
        let file = File::open(path.as_ref())?;
        let config: DatasetConfig = serde_json::from_reader(BufReader::new(file))?;
        config.to_matrix()?;
        Ok(config)
    }

    /// Title drawn above the scatter plot.
    pub fn plot_title(&self) -> String {
        format!("PCA - {} Interfaces", self.title)
    }

    pub fn scores_csv_file_name(&self) -> String {
        format!("PCA_{}_scores.csv", self.name)
    }

    pub fn plot_file_name(&self) -> String {
        format!("PCA_{}_PC1_PC2.png", self.name)
    }
}

fn motif_dataset(
    name: &str,
    title: &str,
    sample_labels: [&str; 4],
    values: [[f64; 3]; 4],
    color: [u8; 3],
    with_exports: bool,
) -> DatasetConfig {
    DatasetConfig {
        name: name.to_string(),
        title: title.to_string(),
        sample_labels: sample_labels.iter().map(|s| s.to_string()).collect(),
        feature_names: MOTIF_FEATURES.iter().map(|s| s.to_string()).collect(),
        values: values.iter().map(|row| row.to_vec()).collect(),
        color,
        write_scores_csv: with_exports,
        report_correlation: with_exports,
    }
}

/// ErbB heterotetramer interfaces.
pub fn heterotetramer() -> DatasetConfig {
    motif_dataset(
        "heterotetramer",
        "Heterotetramer",
        [
            "ErbB1(2)–ErbB3(2)",
            "ErbB1(2)–ErbB4(2)",
            "ErbB2(2)–ErbB4(2)",
            "ErbB3(2)–ErbB4(2)",
        ],
        [[3.0, 4.0, 0.0], [1.0, 6.0, 0.0], [2.0, 2.0, 1.0], [5.0, 2.0, 1.0]],
        colors::SEAGREEN,
        true,
    )
}

/// ErbB homotetramer interfaces. Reported as a plot only.
pub fn homotetramer() -> DatasetConfig {
    motif_dataset(
        "homotetramer",
        "Homotetramer",
        [
            "ErbB1(2)–ErbB1(2)",
            "ErbB2(2)–ErbB2(2)",
            "ErbB3(2)–ErbB3(2)",
            "ErbB4(2)–ErbB4(2)",
        ],
        [[2.0, 1.0, 1.0], [1.0, 4.0, 1.0], [1.0, 7.0, 1.0], [2.0, 3.0, 0.0]],
        colors::TOMATO,
        false,
    )
}

/// ErbB homotrimer interfaces. The `Lost` count is the same for every trimer.
pub fn homotrimer() -> DatasetConfig {
    motif_dataset(
        "homotrimer",
        "Homotrimer",
        [
            "ErbB1–ErbB1–ErbB1",
            "ErbB2–ErbB2–ErbB2",
            "ErbB3–ErbB3–ErbB3",
            "ErbB4–ErbB4–ErbB4",
        ],
        [[2.0, 0.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [2.0, 3.0, 1.0]],
        colors::DODGERBLUE,
        true,
    )
}

pub fn builtin_datasets() -> Vec<DatasetConfig> {
    vec![heterotetramer(), homotetramer(), homotrimer()]
}

/// Looks up a built-in dataset by name (case insensitive).
pub fn builtin_dataset(name: &str) -> Option<DatasetConfig> {
    builtin_datasets()
        .into_iter()
        .find(|d| d.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_datasets_are_valid_4x3_tables() {
        for dataset in builtin_datasets() {
            let matrix = dataset.to_matrix().unwrap();
            assert_eq!((matrix.nrows(), matrix.ncols()), (4, 3), "{}", dataset.name);
            assert_eq!(matrix.feature_names(), &["Shared", "Novel", "Lost"]);
        }
    }

    #[test]
    fn test_builtin_lookup_and_file_names() {
        let d = builtin_dataset("HomoTrimer").unwrap();
        assert_eq!(d.name, "homotrimer");
        assert_eq!(d.scores_csv_file_name(), "PCA_homotrimer_scores.csv");
        assert_eq!(d.plot_file_name(), "PCA_homotrimer_PC1_PC2.png");
        assert_eq!(d.plot_title(), "PCA - Homotrimer Interfaces");
        assert!(builtin_dataset("pentamer").is_none());
        assert!(!homotetramer().write_scores_csv);
        assert!(!homotetramer().report_correlation);
    }

    #[test]
    fn test_json_record_loads_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "name": "dimer",
                "title": "Dimer",
                "sample_labels": ["a", "b", "c"],
                "feature_names": ["Shared", "Novel"],
                "values": [[1, 2], [2, 2], [4, 0]]
            }}"#
        )
        .unwrap();
        let d = DatasetConfig::from_json_file(file.path()).unwrap();
        assert_eq!(d.color, colors::STEELBLUE);
        assert!(d.write_scores_csv && d.report_correlation);
        assert_eq!(d.to_matrix().unwrap().column("Novel").unwrap().to_vec(), vec![2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_json_record_with_ragged_rows_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name": "x", "title": "X", "sample_labels": ["a", "b"],
                "feature_names": ["Shared", "Novel"], "values": [[1, 2], [3]]}}"#
        )
        .unwrap();
        assert!(matches!(
            DatasetConfig::from_json_file(file.path()),
            Err(PcaError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_a_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            DatasetConfig::from_json_file(file.path()),
            Err(PcaError::Config(_))
        ));
    }
}
