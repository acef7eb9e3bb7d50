//! Print stratified sample positions, one `seed x y` line per sample.

use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};

// command line options
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
// strata
use rs_strata::core::error::SamplingError;
use rs_strata::core::float::Float;
use rs_strata::core::geometry::Point2f;
use rs_strata::samplers::stratified::StratifiedSampler;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generate stratified (jittered) sample positions in [-1, 1]^2.
#[derive(Parser, Debug)]
#[command(name = "rs_strata")]
#[command(version, about, long_about = None)]
struct Cli {
    /// seed of the first sample set
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
    /// number of strata in each dimension
    #[arg(short = 'n', long, default_value_t = 4, allow_negative_numbers = true)]
    strata: i32,
    /// confine samples towards their stratum centers, in [0, 1]
    #[arg(short, long, allow_negative_numbers = true)]
    centering: Option<Float>,
    /// number of sample sets, seeded consecutively starting at --seed
    #[arg(long, default_value_t = 1)]
    sets: u64,
    /// use specified number of threads (0 uses all cores)
    #[arg(short = 't', long = "nthreads", default_value_t = 0)]
    nthreads: u8,
    /// log level (trace, debug, info, warn, error), RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Sampling(#[from] SamplingError),
    #[error("cannot write samples: {0}")]
    Io(#[from] io::Error),
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn sample_set(seed: u64, n: i32, centering: Option<Float>) -> Result<Vec<Point2f>, SamplingError> {
    let mut sampler = StratifiedSampler::new(seed);
    let samples: Vec<Point2f> = match centering {
        Some(c) => sampler.centered_samples(n, c)?.collect(),
        None => sampler.uniform_samples(n)?.collect(),
    };
    Ok(samples)
}

/// Stream a single set straight to `out` without collecting it.
fn write_single_set<W: Write>(cli: &Cli, out: &mut W) -> Result<(), CliError> {
    let mut sampler = StratifiedSampler::new(cli.seed);
    let seed: u64 = cli.seed;
    let mut emit = |x: Float, y: Float| -> Result<(), CliError> {
        writeln!(out, "{} {} {}", seed, x, y)?;
        Ok(())
    };
    match cli.centering {
        Some(c) => sampler.try_generate_centered(cli.strata, c, &mut emit),
        None => sampler.try_generate_uniform(cli.strata, &mut emit),
    }
}

fn write_set<W: Write>(out: &mut W, seed: u64, set: Vec<Point2f>) -> Result<(), CliError> {
    for p in set {
        writeln!(out, "{} {} {}", seed, p.x, p.y)?;
    }
    Ok(())
}

/// Every set gets its own sampler, worker threads pick the next set
/// index until all sets are done. Sets are written in index order as
/// soon as they are complete; only sets finished ahead of their turn
/// are held back.
fn write_sets<W: Write>(cli: &Cli, num_cores: usize, out: &mut W) -> Result<(), CliError> {
    let first_seed: u64 = cli.seed;
    let n_sets: u64 = cli.sets;
    let n: i32 = cli.strata;
    let centering: Option<Float> = cli.centering;
    let next_set = &AtomicU64::new(0_u64);
    let scoped = crossbeam::scope(|scope| -> Result<(), CliError> {
        let (set_tx, set_rx) = crossbeam_channel::bounded(num_cores);
        // spawn worker threads
        for _ in 0..num_cores {
            let set_tx = set_tx.clone();
            scope.spawn(move |_| loop {
                let index: u64 = next_set.fetch_add(1, Ordering::Relaxed);
                if index >= n_sets {
                    break;
                }
                let seed: u64 = first_seed.wrapping_add(index);
                let set = sample_set(seed, n, centering);
                if set_tx.send((seed, index, set)).is_err() {
                    break;
                }
            });
        }
        drop(set_tx);
        // dropping the receiver on error makes the workers stop
        let mut pending: BTreeMap<u64, (u64, Vec<Point2f>)> = BTreeMap::new();
        let mut next_index: u64 = 0_u64;
        for (seed, index, set) in set_rx.iter() {
            pending.insert(index, (seed, set?));
            while let Some((seed, set)) = pending.remove(&next_index) {
                write_set(&mut *out, seed, set)?;
                next_index += 1;
            }
        }
        Ok(())
    });
    match scoped {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

fn thread_count(cli: &Cli) -> usize {
    if cli.nthreads == 0_u8 {
        num_cpus::get()
    } else {
        cli.nthreads as usize
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    tracing::info!("rs_strata version {}", VERSION);
    tracing::info!(
        seed = cli.seed,
        strata = cli.strata,
        centering = ?cli.centering,
        sets = cli.sets,
        "Sampler configuration"
    );
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if cli.sets == 1 {
        write_single_set(&cli, &mut out)?;
    } else if cli.sets > 1 {
        let num_cores: usize = thread_count(&cli);
        tracing::info!("Sampling with {:?} thread(s) ...", num_cores);
        write_sets(&cli, num_cores, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn lines(buf: &[u8]) -> Vec<(u64, String)> {
        String::from_utf8(buf.to_vec())
            .unwrap()
            .lines()
            .map(|line| {
                let mut fields = line.splitn(2, ' ');
                let seed: u64 = fields.next().unwrap().parse().unwrap();
                (seed, fields.next().unwrap().to_string())
            })
            .collect()
    }

    #[test]
    fn sets_are_written_in_seed_order() {
        let cli = Cli::parse_from(&[
            "rs_strata", "--seed", "5", "--sets", "6", "-n", "2", "-t", "3",
        ]);
        assert_eq!(thread_count(&cli), 3);
        let mut buf: Vec<u8> = Vec::new();
        write_sets(&cli, thread_count(&cli), &mut buf).unwrap();
        let seeds: Vec<u64> = lines(&buf).iter().map(|(seed, _)| *seed).collect();
        let expected: Vec<u64> = (5..11_u64).flat_map(|seed| vec![seed; 4]).collect();
        assert_eq!(seeds, expected);
        for (_, line) in lines(&buf) {
            let coords: Vec<Float> = line
                .split(' ')
                .map(|v| v.parse::<Float>().unwrap())
                .collect();
            assert_eq!(coords.len(), 2);
        }
    }

    #[test]
    fn threaded_set_matches_single_set() {
        for centering in &[None, Some("0.5")] {
            let mut args = vec!["rs_strata", "--seed", "5", "--sets", "6", "-n", "3"];
            let mut single_args = vec!["rs_strata", "--seed", "7", "-n", "3"];
            if let Some(c) = *centering {
                args.extend_from_slice(&["-c", c]);
                single_args.extend_from_slice(&["-c", c]);
            }
            let mut threaded: Vec<u8> = Vec::new();
            write_sets(&Cli::parse_from(&args), 4, &mut threaded).unwrap();
            let mut single: Vec<u8> = Vec::new();
            write_single_set(&Cli::parse_from(&single_args), &mut single).unwrap();
            let seed_7: Vec<(u64, String)> = lines(&threaded)
                .into_iter()
                .filter(|(seed, _)| *seed == 7)
                .collect();
            assert_eq!(seed_7.len(), 9);
            assert_eq!(seed_7, lines(&single));
        }
    }

    #[test]
    fn negative_strata_is_an_error() {
        let cli = Cli::parse_from(&["rs_strata", "-n", "-2", "--sets", "3"]);
        let mut buf: Vec<u8> = Vec::new();
        let err = write_sets(&cli, 2, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            CliError::Sampling(SamplingError::NegativeStrata { n: -2 })
        ));
        assert_eq!(err.to_string(), "number of strata must not be negative, got -2");
        assert!(buf.is_empty());
        let err = write_single_set(&cli, &mut buf).unwrap_err();
        assert!(matches!(err, CliError::Sampling(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn zero_sets_write_nothing() {
        let cli = Cli::parse_from(&["rs_strata", "--sets", "0"]);
        let mut buf: Vec<u8> = Vec::new();
        write_sets(&cli, 2, &mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
