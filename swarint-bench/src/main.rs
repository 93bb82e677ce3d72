//! Standalone throughput driver for the packed-integer kernels.
//!
//! Runs one kernel over a slice of packed words and over the equivalent
//! plain-integer slice, prints mean and standard deviation of element
//! throughput, and optionally writes the raw measurements to a file. Pick
//! the kernel and sizes on the command line; log verbosity follows
//! `RUST_LOG`.

use std::fs::File;
use std::hint::black_box;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use swarint_core::{LaneLayout, Packed7x32, PackedInt};

#[derive(Parser)]
#[command(name = "swarint-bench", about = "Throughput driver for packed-integer kernels")]
struct Args {
    /// Kernel to run
    #[arg(value_enum)]
    kernel: Kernel,

    /// Number of packed words per operand slice
    #[arg(long, default_value_t = 1 << 16)]
    len: usize,

    /// Timed repetitions per variant
    #[arg(long, default_value_t = 32)]
    iters: u32,

    /// Write the report as bincode to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Kernel {
    /// Element-wise addition of two slices
    Xpy,
    /// Element-wise maximum of two slices
    ElemMax,
    /// Sum reduction to a single integer
    SumRed,
    /// Maximum reduction to a single integer
    MaxRed,
    /// Sum reduction into a double-width packed accumulator
    PromRed,
}

#[derive(Serialize)]
struct Measurement {
    mean_elems_per_sec: f64,
    stddev_elems_per_sec: f64,
    samples: Vec<f64>,
}

#[derive(Serialize)]
struct Report {
    kernel: String,
    words: usize,
    lanes_per_word: u32,
    iterations: u32,
    packed: Measurement,
    scalar: Measurement,
}

fn measure(iters: u32, elements: usize, mut body: impl FnMut()) -> Measurement {
    let mut samples = Vec::with_capacity(iters as usize);
    for _ in 0..iters {
        let start = Instant::now();
        body();
        let secs = start.elapsed().as_secs_f64();
        samples.push(elements as f64 / secs);
    }
    Measurement {
        mean_elems_per_sec: statistical::mean(&samples),
        stddev_elems_per_sec: statistical::standard_deviation(&samples, None),
        samples,
    }
}

/// Deterministic small operand, in range for every layout used here.
fn lane_value(i: usize) -> i64 {
    (i % 7) as i64 - 3
}

fn packed_operand<const BITS: u32, W: swarint_core::Word>(
    len: usize,
    salt: usize,
) -> Vec<PackedInt<BITS, W>> {
    (0..len)
        .map(|i| {
            let mut word = PackedInt::<BITS, W>::new();
            for lane in 0..PackedInt::<BITS, W>::LANES as usize {
                word.set(lane, lane_value(i + salt + lane));
            }
            word
        })
        .collect()
}

fn scalar_operand(len: usize, lanes: u32, salt: usize) -> Vec<i32> {
    (0..len * lanes as usize)
        .map(|i| lane_value(i + salt) as i32)
        .collect()
}

fn run(args: &Args) -> Result<Report> {
    let bits = match args.kernel {
        Kernel::PromRed => 15,
        _ => 7,
    };
    let layout = LaneLayout::new(bits, 32)?;
    let lanes = layout.lanes();
    info!(%layout, words = args.len, "operands");

    let elements = args.len * lanes as usize;

    let (packed, scalar) = match args.kernel {
        Kernel::Xpy => {
            let x = packed_operand::<7, u32>(args.len, 0);
            let y = packed_operand::<7, u32>(args.len, 1);
            let packed = measure(args.iters, elements, || {
                let z: Vec<Packed7x32> = x.iter().zip(&y).map(|(&a, &b)| a + b).collect();
                black_box(z);
            });

            let x = scalar_operand(args.len, lanes, 0);
            let y = scalar_operand(args.len, lanes, 1);
            let scalar = measure(args.iters, elements, || {
                let z: Vec<i32> = x.iter().zip(&y).map(|(a, b)| a + b).collect();
                black_box(z);
            });
            (packed, scalar)
        }
        Kernel::ElemMax => {
            let x = packed_operand::<7, u32>(args.len, 0);
            let y = packed_operand::<7, u32>(args.len, 1);
            let packed = measure(args.iters, elements, || {
                let z: Vec<Packed7x32> = x.iter().zip(&y).map(|(&a, &b)| a.max(b)).collect();
                black_box(z);
            });

            let x = scalar_operand(args.len, lanes, 0);
            let y = scalar_operand(args.len, lanes, 1);
            let scalar = measure(args.iters, elements, || {
                let z: Vec<i32> = x.iter().zip(&y).map(|(a, b)| *a.max(b)).collect();
                black_box(z);
            });
            (packed, scalar)
        }
        Kernel::SumRed => {
            let x = packed_operand::<7, u32>(args.len, 0);
            let packed = measure(args.iters, elements, || {
                black_box(x.iter().fold(0i64, |acc, v| acc + i64::from(v.sum())));
            });

            let x = scalar_operand(args.len, lanes, 0);
            let scalar = measure(args.iters, elements, || {
                black_box(x.iter().fold(0i64, |acc, &v| acc + i64::from(v)));
            });
            (packed, scalar)
        }
        Kernel::MaxRed => {
            let x = packed_operand::<7, u32>(args.len, 0);
            let packed = measure(args.iters, elements, || {
                let folded = x.iter().fold(Packed7x32::min_value(), |acc, &v| acc.max(v));
                black_box(folded.max_element());
            });

            let x = scalar_operand(args.len, lanes, 0);
            let scalar = measure(args.iters, elements, || {
                black_box(x.iter().copied().fold(i32::MIN, i32::max));
            });
            (packed, scalar)
        }
        Kernel::PromRed => {
            // narrow stream, double-width accumulator, one horizontal sum
            let x = packed_operand::<15, u32>(args.len, 0);
            let packed = measure(args.iters, elements, || {
                let acc = x
                    .iter()
                    .fold(PackedInt::<31, u64>::new(), |acc, &v| acc + v);
                black_box(acc.sum());
            });

            let x = scalar_operand(args.len, lanes, 0);
            let scalar = measure(args.iters, elements, || {
                black_box(x.iter().fold(0i64, |acc, &v| acc + i64::from(v)));
            });
            (packed, scalar)
        }
    };

    Ok(Report {
        kernel: format!("{:?}", args.kernel),
        words: args.len,
        lanes_per_word: lanes,
        iterations: args.iters,
        packed,
        scalar,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let report = run(&args)?;

    println!(
        "{}: packed {:.3e} ± {:.3e} elems/s, scalar {:.3e} ± {:.3e} elems/s",
        report.kernel,
        report.packed.mean_elems_per_sec,
        report.packed.stddev_elems_per_sec,
        report.scalar.mean_elems_per_sec,
        report.scalar.stddev_elems_per_sec,
    );

    if let Some(path) = &args.output {
        let file = File::create(path)
            .with_context(|| format!("creating report file {}", path.display()))?;
        bincode::serialize_into(BufWriter::new(file), &report)
            .context("serializing report")?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}
