use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use clap::Args;
use comfy_table::Table;
use courier_optimizer::{
    json::types::{FromProblem, JsonRoutingProblem, JsonSolution},
    solver::solver_params::Threads,
};
use tracing::info;

use crate::{file_utils::json_files, input, parsers};

#[derive(Args)]
pub struct OptimizeArgs {
    /// Problem file, or a folder of problem files
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Solution file, or a folder when the input is a folder
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// "greedy" or "randomized", overrides the problem file
    #[arg(long)]
    strategy: Option<String>,

    #[arg(long, short = 'n')]
    iterations: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    rcl_size: Option<usize>,

    /// Threads running the iterations (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Maximum distance queries in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Timeout of each routing service request (e.g., "10s", "PT1M")
    #[arg(long, value_parser = parsers::parse_duration)]
    request_timeout: Option<jiff::SignedDuration>,
}

impl OptimizeArgs {
    fn apply_overrides(&self, problem: &mut JsonRoutingProblem) {
        if let Some(strategy) = &self.strategy {
            problem.strategy = Some(strategy.clone());
        }

        if self.iterations.is_some() {
            problem.iterations = self.iterations;
        }

        if self.seed.is_some() {
            problem.seed = self.seed;
        }

        if self.rcl_size.is_some() {
            problem.rcl_size = self.rcl_size;
        }

        if self.concurrency.is_some() {
            problem.concurrency = self.concurrency;
        }

        if let Some(timeout) = self.request_timeout {
            input::set_request_timeout(problem, timeout);
        }
    }

    fn threads(&self) -> Threads {
        match self.threads {
            Some(1) => Threads::Single,
            Some(threads) => Threads::Multi(threads),
            None => Threads::Auto,
        }
    }
}

fn solution_path(args: &OptimizeArgs, path: &Path, batch: bool) -> Option<PathBuf> {
    let out = args.out.as_ref()?;

    if !batch {
        return Some(out.clone());
    }

    let stem = path.file_stem()?.to_string_lossy();
    Some(out.join(format!("{stem}.solution.json")))
}

fn print_solution(solution: &JsonSolution) {
    let mut table = Table::new();
    table.set_header(vec!["Route", "Points", "Load", "Distance (km)"]);

    for (index, route) in solution.routes.iter().enumerate() {
        let points = route
            .points
            .iter()
            .map(|point| point.id.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");

        table.add_row(vec![
            (index + 1).to_string(),
            points,
            route.load.to_string(),
            format!("{:.3}", route.total_distance),
        ]);
    }

    println!("{table}");
}

async fn optimize_file(
    args: &OptimizeArgs,
    path: &Path,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    info!("Optimizing {}", path.display());

    let mut problem = input::read_problem(path)?;
    args.apply_overrides(&mut problem);

    let mut prepared = problem.prepare().await?;
    prepared.params.threads = args.threads();

    let result = prepared.solve()?;
    let solution = JsonSolution::from_problem(&result, &prepared.problem);

    info!(
        "Finished: routes = {}, distance = {:.3} km, best iteration = {}/{}",
        solution.routes.len(),
        solution.total_distance,
        solution.best_iteration + 1,
        solution.iterations
    );
    print_solution(&solution);

    if let Some(out) = out {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }

        serde_json::to_writer_pretty(BufWriter::new(File::create(&out)?), &solution)?;
        info!("Solution written to {}", out.display());
    }

    Ok(())
}

pub async fn run(args: OptimizeArgs) -> anyhow::Result<()> {
    let batch = args.input.is_dir();
    let paths = json_files(&args.input)?;

    if paths.is_empty() {
        anyhow::bail!("No problem file found in {}", args.input.display());
    }

    for path in &paths {
        let out = solution_path(&args, path, batch);
        optimize_file(&args, path, out).await?;
    }

    Ok(())
}
