use clap::Parser;
use sanity_check::{run_check, CheckInput, CheckOptions};
use std::process::ExitCode;

/// Run a forward and a backward streaming FFT back to back and check that
/// the input is recovered.
#[derive(Parser)]
struct Args {
    /// Number of points; must be a power of two
    domain_size: usize,

    /// Scalars per staged chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Chunks each stage queue may hold
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Use a seeded random signal instead of the golden impulse
    #[arg(long)]
    random: bool,

    /// Seed for --random
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Allowed error relative to the largest input magnitude
    #[arg(long, default_value_t = 1e-4)]
    tolerance: f32,

    /// Print every mismatching element
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let options = CheckOptions {
        domain_size: args.domain_size,
        chunk_size: args.chunk_size,
        queue_capacity: args.queue_capacity,
        input: if args.random {
            CheckInput::Random { seed: args.seed }
        } else {
            CheckInput::Golden
        },
        tolerance: args.tolerance,
    };

    let report = match run_check(&options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    for timing in &report.timings {
        println!("{}", timing);
    }
    if args.verbose {
        for mismatch in &report.mismatches {
            println!("{}", mismatch);
        }
    }
    println!("{}", report);
    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
