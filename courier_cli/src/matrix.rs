use std::{fs::File, io::BufWriter, path::PathBuf, time::Duration};

use clap::Args;
use comfy_table::Table;
use courier_optimizer::{
    json::types::{FromProblem, JsonDistanceMatrix},
    problem::distance_matrix::{DEFAULT_CONCURRENCY, DistanceMatrix},
};
use indicatif::ProgressBar;
use tracing::info;

use crate::{input, parsers};

/// Matrices with more points are written but not printed.
const MAX_PRINTED_POINTS: usize = 12;

#[derive(Args)]
pub struct MatrixArgs {
    /// The problem file
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Matrix output file
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// Maximum distance queries in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Timeout of each routing service request (e.g., "10s", "PT1M")
    #[arg(long, value_parser = parsers::parse_duration)]
    request_timeout: Option<jiff::SignedDuration>,
}

fn print_matrix(matrix: &JsonDistanceMatrix) {
    let mut table = Table::new();
    table.set_header(std::iter::once(String::new()).chain(matrix.ids.iter().cloned()));

    for (id, row) in matrix.ids.iter().zip(&matrix.distances) {
        table.add_row(
            std::iter::once(id.clone()).chain(row.iter().map(|distance| format!("{distance:.3}"))),
        );
    }

    println!("{table}");
}

pub async fn run(args: MatrixArgs) -> anyhow::Result<()> {
    let mut content = input::read_problem(&args.input)?;

    if let Some(timeout) = args.request_timeout {
        input::set_request_timeout(&mut content, timeout);
    }

    let problem = content.build_problem()?;
    let client = content.distance_client(&problem)?;
    let concurrency = args
        .concurrency
        .or(content.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!(
        "querying {} distances...",
        problem.num_points() * problem.num_points().saturating_sub(1)
    ));

    let matrix = DistanceMatrix::build(&problem, &client, concurrency).await;
    spinner.finish_and_clear();

    let matrix = JsonDistanceMatrix::from_problem(&matrix?, &problem);

    if matrix.ids.len() <= MAX_PRINTED_POINTS {
        print_matrix(&matrix);
    }

    if let Some(out) = args.out {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }

        serde_json::to_writer_pretty(BufWriter::new(File::create(&out)?), &matrix)?;
        info!("Distance matrix written to {}", out.display());
    }

    Ok(())
}
