// src/analysis.rs

use crate::correlation::{correlate, Correlation};
use crate::datasets::{DatasetConfig, NOVEL_FEATURE};
use crate::error::PcaError;
use crate::export::write_scores_csv;
use crate::matrix::DataMatrix;
use crate::pca::{decompose, PcaResult};
use crate::plot::{save_pc_scatter, PlotConfig};
use crate::report::format_report;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::PathBuf;

/// Where and what to write for each analysed dataset.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub output_dir: PathBuf,
    /// Honour each dataset's `write_scores_csv` flag. When false no CSV is written.
    pub write_csv: bool,
    pub write_plot: bool,
    pub plot_config: PlotConfig,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            write_csv: true,
            write_plot: true,
            plot_config: PlotConfig::default(),
        }
    }
}

/// Everything produced for one dataset.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub dataset: String,
    pub matrix: DataMatrix,
    pub result: PcaResult,
    pub correlation: Option<Correlation>,
    pub report: String,
    pub csv_path: Option<PathBuf>,
    pub plot_path: Option<PathBuf>,
}

/// PC1 scores against the `Novel` motif counts.
pub fn correlate_pc1_with_novel(matrix: &DataMatrix, result: &PcaResult) -> Result<Correlation, PcaError> {
    let novel = matrix.column(NOVEL_FEATURE).ok_or_else(|| {
        PcaError::InvalidInput(format!("dataset has no '{NOVEL_FEATURE}' column to correlate with PC1"))
    })?;
    let pc1 = result
        .score_column(0)
        .ok_or_else(|| PcaError::InvalidInput("result has no first component".to_string()))?;
    correlate(&pc1.to_vec(), &novel.to_vec())
}

/// Decomposes one dataset and, if requested, correlates PC1 with `Novel`.
/// Performs no I/O.
pub fn analyze(dataset: &DatasetConfig) -> Result<(DataMatrix, PcaResult, Option<Correlation>), PcaError> {
    let matrix = dataset.to_matrix()?;
    let result = decompose(&matrix)?;
    let correlation = if dataset.report_correlation {
        Some(correlate_pc1_with_novel(&matrix, &result)?)
    } else {
        warn!(
            "{}: PC1 vs {} correlation disabled for this dataset; skipping",
            dataset.name, NOVEL_FEATURE
        );
        None
    };
    debug!(
        "{}: explained variance ratio {:?}",
        dataset.name,
        result.explained_variance_ratio().to_vec()
    );
    Ok((matrix, result, correlation))
}

/// Analyses one dataset and writes its CSV and scatter plot.
pub fn run(dataset: &DatasetConfig, options: &AnalysisOptions) -> Result<AnalysisOutcome, PcaError> {
    info!("Analysing dataset '{}'", dataset.name);
    let (matrix, result, correlation) = analyze(dataset)?;
    let report = format_report(&dataset.name, &result, correlation.as_ref(), NOVEL_FEATURE);

    if options.write_csv || options.write_plot {
        std::fs::create_dir_all(&options.output_dir)?;
    }

    let csv_path = if options.write_csv && dataset.write_scores_csv {
        let path = options.output_dir.join(dataset.scores_csv_file_name());
        write_scores_csv(&path, &matrix, &result)?;
        Some(path)
    } else {
        None
    };

    let plot_path = if options.write_plot {
        let path = options.output_dir.join(dataset.plot_file_name());
        save_pc_scatter(&path, &result, &dataset.plot_title(), dataset.color, &options.plot_config)?;
        Some(path)
    } else {
        None
    };

    Ok(AnalysisOutcome {
        dataset: dataset.name.clone(),
        matrix,
        result,
        correlation,
        report,
        csv_path,
        plot_path,
    })
}

/// Runs [`run`] for every dataset in parallel. Results keep the input order.
pub fn run_all(datasets: &[DatasetConfig], options: &AnalysisOptions) -> Vec<Result<AnalysisOutcome, PcaError>> {
    datasets.par_iter().map(|d| run(d, options)).collect()
}
