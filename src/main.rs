// main.rs

use anyhow::{anyhow, Context, Error, Result};
use clap::Parser;
use log::{error, info};
use oligomer_pca::analysis::{run_all, AnalysisOptions};
use oligomer_pca::datasets::{builtin_dataset, builtin_datasets};
use oligomer_pca::DatasetConfig;
use std::time::Instant;

mod cli {
    use clap::Parser;
    use std::path::PathBuf;

    /// PCA of Shared/Novel/Lost interface motif counts across ErbB oligomers.
    #[derive(Parser, Debug)]
    #[command(name = "oligomer-pca", version, about)]
    pub struct CliArgs {
        /// Built-in dataset to analyse (heterotetramer, homotetramer, homotrimer) or `all`.
        #[arg(short, long, default_value = "all")]
        pub dataset: String,

        /// JSON dataset record to analyse instead of a built-in table.
        #[arg(long, value_name = "FILE")]
        pub dataset_file: Option<PathBuf>,

        /// Directory receiving the CSV and PNG outputs.
        #[arg(short, long, default_value = ".")]
        pub output_dir: PathBuf,

        /// Skip the PC1/PC2 scatter plots.
        #[arg(long)]
        pub no_plot: bool,

        /// Skip the combined raw + score CSV files.
        #[arg(long)]
        pub no_csv: bool,

        /// Log level (error, warn, info, debug, trace).
        #[arg(long, default_value = "info")]
        pub log_level: String,

        /// Worker threads for analysing several datasets (defaults to all cores).
        #[arg(long)]
        pub threads: Option<usize>,
    }
}

fn select_datasets(args: &cli::CliArgs) -> Result<Vec<DatasetConfig>> {
    if let Some(path) = &args.dataset_file {
        let dataset = DatasetConfig::from_json_file(path)
            .with_context(|| format!("loading dataset record {}", path.display()))?;
        return Ok(vec![dataset]);
    }
    if args.dataset.eq_ignore_ascii_case("all") {
        return Ok(builtin_datasets());
    }
    builtin_dataset(&args.dataset)
        .map(|d| vec![d])
        .ok_or_else(|| {
            let names: Vec<String> = builtin_datasets().into_iter().map(|d| d.name).collect();
            anyhow!(
                "unknown dataset '{}'; expected one of {} or 'all'",
                args.dataset,
                names.join(", ")
            )
        })
}

fn main() -> Result<(), Error> {
    let start = Instant::now();
    let cli_args = cli::CliArgs::parse();

    // Initialize logger
    let log_level = cli_args
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or_else(|_| {
            eprintln!(
                "Warning: Invalid log level '{}' provided. Defaulting to Info.",
                cli_args.log_level
            );
            log::LevelFilter::Info
        });
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_micros()
        .init();

    info!("Starting oligomer-pca with args: {:?}", cli_args);

    if let Some(threads) = cli_args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let datasets = select_datasets(&cli_args)?;
    let options = AnalysisOptions {
        output_dir: cli_args.output_dir.clone(),
        write_csv: !cli_args.no_csv,
        write_plot: !cli_args.no_plot,
        ..Default::default()
    };

    let mut failures = 0usize;
    for (dataset, outcome) in datasets.iter().zip(run_all(&datasets, &options)) {
        match outcome {
            Ok(outcome) => println!("{}", outcome.report),
            Err(e) => {
                error!("Dataset '{}' failed: {}", dataset.name, e);
                failures += 1;
            }
        }
    }

    info!("Finished in {:.2?}", start.elapsed());
    if failures > 0 {
        return Err(anyhow!("{} of {} dataset(s) failed", failures, datasets.len()));
    }
    Ok(())
}
