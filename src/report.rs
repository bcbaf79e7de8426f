// src/report.rs

use crate::correlation::Correlation;
use crate::pca::PcaResult;
use ndarray::ArrayView2;
use std::fmt::Write;

/// `PC1`, `PC2`, ... for `n` components.
pub fn component_labels(n: usize) -> Vec<String> {
    (1..=n).map(|k| format!("PC{k}")).collect()
}

/// `PC1_Score`, `PC2_Score`, ... for `n` components.
pub fn score_labels(n: usize) -> Vec<String> {
    (1..=n).map(|k| format!("PC{k}_Score")).collect()
}

/// Explained variance ratios as percentages, e.g.
/// `Explained variance (%): PC1=82.57%, PC2=16.70%, PC3=0.73%`.
pub fn format_explained_variance(result: &PcaResult) -> String {
    let parts: Vec<String> = result
        .explained_variance_ratio()
        .iter()
        .enumerate()
        .map(|(k, ratio)| format!("PC{}={:.2}%", k + 1, ratio * 100.0))
        .collect();
    format!("Explained variance (%): {}", parts.join(", "))
}

/// Right-aligned text table with a label column.
pub fn format_table(row_labels: &[String], column_labels: &[String], values: ArrayView2<'_, f64>) -> String {
    let cells: Vec<Vec<String>> = values
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| format!("{v:.6}")).collect())
        .collect();

    let label_width = row_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let col_widths: Vec<usize> = column_labels
        .iter()
        .enumerate()
        .map(|(j, header)| {
            cells
                .iter()
                .map(|row| row[j].len())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:label_width$}", "");
    for (header, &width) in column_labels.iter().zip(&col_widths) {
        let _ = write!(out, "  {header:>width$}");
    }
    out.push('\n');
    for (label, row) in row_labels.iter().zip(&cells) {
        let pad = label_width - label.chars().count();
        let _ = write!(out, "{label}{:pad$}", "");
        for (cell, &width) in row.iter().zip(&col_widths) {
            let _ = write!(out, "  {cell:>width$}");
        }
        out.push('\n');
    }
    out
}

/// Loadings: one row per component, one column per original feature.
pub fn format_loadings(result: &PcaResult) -> String {
    format_table(
        &component_labels(result.n_components()),
        result.feature_names(),
        result.components().view(),
    )
}

/// Scores: one row per sample, one `PCk_Score` column per component.
pub fn format_scores(result: &PcaResult) -> String {
    format_table(
        result.sample_labels(),
        &score_labels(result.n_components()),
        result.scores().view(),
    )
}

/// `r = 0.945, p = 0.0553`
pub fn format_correlation(correlation: &Correlation) -> String {
    format!("r = {:.3}, p = {:.4}", correlation.r, correlation.p_value)
}

/// Full text report for one dataset.
pub fn format_report(
    dataset_name: &str,
    result: &PcaResult,
    correlation: Option<&Correlation>,
    feature: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {dataset_name} ===");
    let _ = writeln!(out, "{}", format_explained_variance(result));
    let _ = writeln!(out, "\nLoadings:\n{}", format_loadings(result));
    let _ = writeln!(out, "PC Scores:\n{}", format_scores(result));
    if let Some(c) = correlation {
        let _ = writeln!(
            out,
            "Pearson correlation (PC1 vs {feature}): {}",
            format_correlation(c)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DataMatrix;
    use crate::pca::decompose;
    use ndarray::array;

    fn sample_result() -> PcaResult {
        let m = DataMatrix::new(
            vec!["first".into(), "second".into(), "third".into()],
            vec!["Shared".into(), "Novel".into()],
            array![[1.0, 0.0], [3.0, 0.0], [2.0, 0.0]],
        )
        .unwrap();
        decompose(&m).unwrap()
    }

    #[test]
    fn test_labels() {
        assert_eq!(component_labels(3), vec!["PC1", "PC2", "PC3"]);
        assert_eq!(score_labels(2), vec!["PC1_Score", "PC2_Score"]);
    }

    #[test]
    fn test_explained_variance_line() {
        let line = format_explained_variance(&sample_result());
        assert_eq!(line, "Explained variance (%): PC1=100.00%, PC2=0.00%");
    }

    #[test]
    fn test_correlation_format() {
        let c = Correlation {
            r: 0.94471123,
            p_value: 0.05528876,
        };
        assert_eq!(format_correlation(&c), "r = 0.945, p = 0.0553");
    }

    #[test]
    fn test_loadings_table_layout() {
        let table = format_loadings(&sample_result());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Shared") && lines[0].contains("Novel"));
        assert!(lines[1].starts_with("PC1"));
        assert!(lines[1].contains("1.000000"));
        assert!(lines[2].starts_with("PC2"));
    }

    #[test]
    fn test_report_includes_correlation_only_when_given() {
        let result = sample_result();
        let without = format_report("toy", &result, None, "Novel");
        assert!(without.starts_with("=== toy ==="));
        assert!(without.contains("PC Scores:"));
        assert!(without.contains("second"));
        assert!(!without.contains("Pearson"));

        let c = Correlation { r: -0.5, p_value: 0.25 };
        let with = format_report("toy", &result, Some(&c), "Novel");
        assert!(with.contains("Pearson correlation (PC1 vs Novel): r = -0.500, p = 0.2500"));
    }
}
