//! geolin CLI — solve linear systems, find dominant eigenvectors and fit
//! planes from JSON input.

use clap::{Args, Parser, Subcommand};
use nalgebra::{DMatrix, DVector, Point3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use geolin::{EigenEstimate, Plane, PowerIterationConfig};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "geolin")]
#[command(about = "Dense linear solves, dominant eigenvectors and plane fits for 3D geometry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve A·x = b. Input: {"a": [[..], ..], "b": [..]}.
    Solve {
        /// Path to the input system (JSON).
        #[arg(long)]
        input: PathBuf,

        /// Path to write the result (JSON). Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Dominant eigenvector of a square matrix. Input: {"matrix": [[..], ..]}.
    Eigen {
        /// Path to the input matrix (JSON).
        #[arg(long)]
        input: PathBuf,

        /// Path to write the result (JSON). Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        iteration: CliIterationArgs,
    },

    /// Least-squares plane through 3D points. Input: {"points": [[x, y, z], ..]}.
    FitPlane {
        /// Path to the input points (JSON).
        #[arg(long)]
        input: PathBuf,

        /// Path to write the result (JSON). Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        iteration: CliIterationArgs,
    },
}

#[derive(Debug, Clone, Args)]
struct CliIterationArgs {
    /// Power-iteration config (JSON). Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of power-iteration steps.
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Squared step distance below which iteration stops.
    #[arg(long)]
    convergence_limit: Option<f64>,
}

impl CliIterationArgs {
    fn to_config(&self) -> CliResult<PowerIterationConfig> {
        let mut config = match &self.config {
            Some(path) => PowerIterationConfig::from_json_file(path)?,
            None => PowerIterationConfig::default(),
        };
        if let Some(v) = self.max_iterations {
            config.max_iterations = v;
        }
        if let Some(v) = self.convergence_limit {
            config.convergence_limit = v;
        }
        config.validate()?;
        Ok(config)
    }
}

// ── JSON documents ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SystemInput {
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct SolveOutput {
    solution: Option<Vec<f64>>,
    residual_norm: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MatrixInput {
    matrix: Vec<Vec<f64>>,
}

#[derive(Debug, Serialize)]
struct EigenOutput {
    vector: Vec<f64>,
    eigenvalue: f64,
    iterations: usize,
    converged: bool,
    last_step: f64,
}

#[derive(Debug, Deserialize)]
struct PointsInput {
    points: Vec<[f64; 3]>,
}

#[derive(Debug, Serialize)]
struct FitPlaneOutput {
    n_points: usize,
    plane: Option<Plane>,
    rms_distance: Option<f64>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CliResult<T> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| -> CliError { format!("Failed to read {}: {}", path.display(), e).into() })?;
    let value = serde_json::from_str(&data)
        .map_err(|e| -> CliError { format!("Failed to parse {}: {}", path.display(), e).into() })?;
    Ok(value)
}

fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn rows_to_matrix(rows: &[Vec<f64>]) -> CliResult<DMatrix<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some(i) = rows.iter().position(|r| r.len() != n_cols) {
        return Err(format!(
            "row {} has {} entries, expected {}",
            i,
            rows[i].len(),
            n_cols
        )
        .into());
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(DMatrix::from_row_slice(n_rows, n_cols, &flat))
}

// ── Commands ───────────────────────────────────────────────────────────

fn run_solve(input: &Path, out: Option<&Path>) -> CliResult<()> {
    let system: SystemInput = read_json(input)?;
    let a = rows_to_matrix(&system.a)?;
    let b = DVector::from_vec(system.b);
    tracing::info!("Solving {}x{} system", a.nrows(), a.ncols());

    let solution = geolin::solve_vector(&a, &b)?;
    match &solution {
        Some(_) => tracing::info!("System solved"),
        None => tracing::info!("System has no solution"),
    }

    let output = SolveOutput {
        residual_norm: solution.as_ref().map(|x| geolin::residual_norm(&a, x, &b)),
        solution: solution.map(|x| x.iter().copied().collect()),
    };
    write_json(&output, out)
}

fn run_eigen(input: &Path, out: Option<&Path>, iteration: &CliIterationArgs) -> CliResult<()> {
    let doc: MatrixInput = read_json(input)?;
    let m = rows_to_matrix(&doc.matrix)?;
    let config = iteration.to_config()?;

    let estimate: EigenEstimate<DVector<f64>> =
        geolin::dominant_eigenvector_with_config(&m, &config)?;
    if !estimate.converged {
        tracing::warn!(
            "Power iteration did not converge within {} iterations (last step {:.3e})",
            estimate.iterations,
            estimate.last_step
        );
    }

    let output = EigenOutput {
        eigenvalue: geolin::rayleigh_quotient(&m, &estimate.vector),
        vector: estimate.vector.iter().copied().collect(),
        iterations: estimate.iterations,
        converged: estimate.converged,
        last_step: estimate.last_step,
    };
    write_json(&output, out)
}

fn run_fit_plane(input: &Path, out: Option<&Path>, iteration: &CliIterationArgs) -> CliResult<()> {
    let doc: PointsInput = read_json(input)?;
    let points: Vec<Point3<f64>> = doc
        .points
        .iter()
        .map(|&[x, y, z]| Point3::new(x, y, z))
        .collect();
    let config = iteration.to_config()?;
    tracing::info!("Fitting plane to {} points", points.len());

    let plane = geolin::fit_plane_with_config(&points, &config)?;
    match &plane {
        Some(p) => tracing::info!(
            "Plane normal ({:.6}, {:.6}, {:.6})",
            p.normal.x,
            p.normal.y,
            p.normal.z
        ),
        None => tracing::info!("Points do not determine a unique plane"),
    }

    let output = FitPlaneOutput {
        n_points: points.len(),
        rms_distance: plane.as_ref().and_then(|p| p.rms_distance(&points)),
        plane,
    };
    write_json(&output, out)
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { input, out } => run_solve(&input, out.as_deref()),
        Commands::Eigen {
            input,
            out,
            iteration,
        } => run_eigen(&input, out.as_deref(), &iteration),
        Commands::FitPlane {
            input,
            out,
            iteration,
        } => run_fit_plane(&input, out.as_deref(), &iteration),
    }
}
