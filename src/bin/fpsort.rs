use std::path::PathBuf;
use std::process;

use clap::Parser;

use psort_rs::common::reset_sigpipe;
use psort_rs::sort::{SortConfig, SortError, sort_file};

#[derive(Parser)]
#[command(
    name = "fpsort",
    about = "Parallel sample sort for binary float32 arrays",
    long_about = "Sorts a binary file holding an 8-byte count header followed by \
                  float32 values, using P worker threads that partition the value \
                  range, sort locally, and write disjoint ranges of the output."
)]
struct Cli {
    /// Number of partitions (worker threads); must not exceed the value count
    partitions: usize,

    /// Input file: 8-byte count header, then count float32 values
    input: PathBuf,

    /// Output file (overwritten)
    output: PathBuf,

    /// Seed for pivot sampling; 0 seeds from the OS
    #[arg(long = "random-seed", value_name = "SEED", default_value_t = 0)]
    random_seed: u64,

    /// Print per-partition range and count
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Abort the whole process after SECS seconds (watchdog)
    #[arg(long = "timeout", value_name = "SECS")]
    timeout: Option<u32>,
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();

    if let Some(_secs) = cli.timeout {
        #[cfg(unix)]
        unsafe {
            libc::alarm(_secs);
        }
        #[cfg(not(unix))]
        eprintln!("fpsort: --timeout is not supported on this platform; ignoring");
    }

    let config = SortConfig {
        partitions: cli.partitions,
        random_seed: cli.random_seed,
        verbose: cli.verbose,
    };

    match sort_file(&cli.input, &cli.output, &config) {
        Ok(count) => {
            if cli.verbose {
                eprintln!(
                    "fpsort: sorted {} values across {} partitions",
                    count, cli.partitions
                );
            }
        }
        Err(e @ SortError::InvalidPartitions { .. }) => {
            eprintln!("fpsort: {}", e);
            process::exit(2);
        }
        Err(e) => {
            eprintln!("fpsort: {}", e);
            process::exit(1);
        }
    }
}
