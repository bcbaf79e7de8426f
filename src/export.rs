// src/export.rs

use crate::error::PcaError;
use crate::matrix::DataMatrix;
use crate::pca::PcaResult;
use crate::report::score_labels;
use log::info;
use std::io::Write;
use std::path::Path;

/// Writes the raw table followed by its PC scores as CSV.
///
/// Header: an empty index cell, the feature names in input order, then
/// `PC1_Score..PCk_Score`. One row per sample, keyed by the sample label.
pub fn write_scores<W: Write>(writer: W, matrix: &DataMatrix, result: &PcaResult) -> Result<(), PcaError> {
    if matrix.nrows() != result.scores().nrows() {
        return Err(PcaError::InvalidInput(format!(
            "matrix has {} rows but the result has scores for {}",
            matrix.nrows(),
            result.scores().nrows()
        )));
    }

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(1 + matrix.ncols() + result.n_components());
    header.push(String::new());
    header.extend(matrix.feature_names().iter().cloned());
    header.extend(score_labels(result.n_components()));
    csv_writer.write_record(&header)?;

    let values = matrix.values();
    for (i, label) in matrix.sample_labels().iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(label.clone());
        record.extend(values.row(i).iter().map(|v| v.to_string()));
        record.extend(result.scores().row(i).iter().map(|v| v.to_string()));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes [`write_scores`] output to `path`, replacing any existing file.
pub fn write_scores_csv<P: AsRef<Path>>(path: P, matrix: &DataMatrix, result: &PcaResult) -> Result<(), PcaError> {
    let file = std::fs::File::create(path.as_ref())?;
    write_scores(std::io::BufWriter::new(file), matrix, result)?;
    info!("Combined data saved to {}", path.as_ref().display());
    Ok(())
}
