use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use subgrid_dft::{
    Accelerator, HostAccelerator, OracleConfig, OracleReport, Origin, Tolerance, run_oracle,
};
use tracing::{error, info};

/// Subgrid oracle - direct Fourier transform, serial reference vs parallel kernel
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "subgrid-oracle")]
#[command(about = "Time the parallel subgrid kernel and check it against the serial reference", long_about = None)]
struct Cli {
    /// Number of visibility samples (default: 204800)
    #[arg(short = 'n', long, default_value = "204800")]
    samples: usize,

    /// Subgrid side length; must be even (default: 96)
    #[arg(short = 's', long, default_value = "96")]
    subgrid_size: usize,

    /// Execution units per group (default: 512)
    #[arg(short = 'g', long, default_value = "512")]
    group_size: usize,

    /// Timed kernel launches to average over (default: 10)
    #[arg(short, long, default_value = "10")]
    repeats: usize,

    /// Leading pixels to print side by side (default: 10)
    #[arg(long, default_value = "10")]
    preview: usize,

    /// Seed for the synthetic dataset
    #[arg(long, default_value = "5489")]
    seed: u64,

    /// Origin offset as u0,v0,w0 (accepted, not applied to the phase)
    #[arg(
        long,
        value_delimiter = ',',
        num_args = 3,
        allow_hyphen_values = true,
        default_values_t = [1.5f32, 3.2, -0.4]
    )]
    origin: Vec<f32>,

    /// Relative tolerance, scaled by sqrt(N), amplitude and S/2
    #[arg(long, default_value = "2e-6")]
    tolerance: f64,

    /// Accelerator to run the kernel on
    #[arg(short, long, value_enum, default_value = "host")]
    backend: BackendArg,

    /// Worker threads for the host backend (0 = one per core)
    #[arg(short = 't', long, default_value = "0")]
    threads: usize,

    /// Save the run report as JSON
    #[arg(long, value_name = "REPORT_PATH")]
    report: Option<PathBuf>,

    /// Exit with an error when the kernel diverges from the reference
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum BackendArg {
    /// Rayon thread pool on the host
    Host,
    /// cubeCL kernel on the default WGPU adapter (requires the `cubecl` feature)
    Cubecl,
}

impl Cli {
    fn oracle_config(&self) -> OracleConfig {
        OracleConfig {
            n_samples: self.samples,
            subgrid_size: self.subgrid_size,
            group_size: self.group_size,
            repeats: self.repeats,
            preview_pixels: self.preview,
            seed: self.seed,
            origin: Origin::new(self.origin[0], self.origin[1], self.origin[2]),
            tolerance: Tolerance::new(self.tolerance),
        }
    }
}

/// Run the oracle with a progress bar over the timed launches
fn run_with_progress<A: Accelerator>(config: &OracleConfig, accelerator: &A) -> Result<OracleReport> {
    let progress = ProgressBar::new(config.repeats as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} launches {bar:30} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let report = run_oracle(config, accelerator, |_, elapsed| {
        progress.set_message(format!("{:.3} ms", elapsed.as_secs_f64() * 1e3));
        progress.inc(1);
    });
    progress.finish_and_clear();

    report.with_context(|| format!("oracle run on the {} backend failed", accelerator.name()))
}

fn print_report(report: &OracleReport) {
    println!("\n⚙️  Configuration:");
    println!("   Backend: {}", report.accelerator);
    println!("   Samples: {}", report.config.n_samples);
    println!(
        "   Subgrid: {}x{}",
        report.config.subgrid_size, report.config.subgrid_size
    );
    println!(
        "   Launch: {} groups x {} units",
        report.launch.group_count, report.launch.group_size
    );

    println!(
        "\n   Reference accumulator: {:.3} ms",
        report.reference_time.as_secs_f64() * 1e3
    );
    println!(
        "   Elapsed time per call: {:.3} ms (min {:.3}, max {:.3}, {} launches)",
        report.timing.per_launch_ms, report.timing.min_ms, report.timing.max_ms, report.timing.repeats
    );

    println!();
    for pair in &report.preview {
        println!(
            "   CPU: ({}, {}) GPU: ({}, {})",
            pair.reference.re, pair.reference.im, pair.candidate.re, pair.candidate.im
        );
    }

    let accuracy = &report.accuracy;
    let verdict = if accuracy.passed() { "✅" } else { "❌" };
    println!(
        "\n{} Max |error| {:.3e} at pixel {} (threshold {:.3e}, mean {:.3e})",
        verdict,
        accuracy.max_abs_error,
        accuracy.worst_pixel,
        accuracy.threshold,
        accuracy.mean_abs_error
    );
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing subscriber with environment filter
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    println!("📡 Subgrid Oracle - Direct Fourier Transform");
    println!("============================================");

    let start_time = Instant::now();
    let config = args.oracle_config();

    let report = match args.backend {
        BackendArg::Host => {
            let accelerator = HostAccelerator::new(args.threads)?;
            info!("Host backend with {} worker threads", accelerator.threads());
            run_with_progress(&config, &accelerator)?
        }
        #[cfg(feature = "cubecl")]
        BackendArg::Cubecl => {
            let accelerator = subgrid_dft::gpu::CubeclAccelerator::new()?;
            run_with_progress(&config, &accelerator)?
        }
        #[cfg(not(feature = "cubecl"))]
        BackendArg::Cubecl => {
            return Err(anyhow::anyhow!(
                "the cubecl backend is not compiled in; rebuild with --features cubecl"
            ));
        }
    };

    print_report(&report);

    if let Some(ref report_path) = args.report {
        std::fs::write(report_path, report.to_json()?)
            .with_context(|| format!("failed to write report to {}", report_path.display()))?;
        println!("📄 Saved report to: {}", report_path.display());
    }

    println!("   ⏱️  Total time: {:.2}s", start_time.elapsed().as_secs_f64());

    if args.strict {
        if let Err(e) = report.accuracy.check() {
            error!("{}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
