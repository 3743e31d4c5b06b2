//! Store generator CLI: writes an array-store file populated with seeded
//! synthetic datasets, for benchmark fixtures and smoke tests.
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process;

use arraybench::error::{BenchError, Result};
use arraybench::store::builder::StoreBuilder;
use arraybench::store::format::DType;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "arraybench-mkstore",
    version,
    about = "Generates an array-store file with seeded synthetic datasets"
)]
struct Args {
    /// Path of the store file to create.
    #[arg(long)]
    out: PathBuf,

    /// Dataset spec `name:dtype:dims`, e.g. `ds1:f64:1000` or
    /// `grid:f32:64x64`; repeat for multiple datasets.
    #[arg(long = "dataset", value_name = "SPEC", required = true)]
    datasets: Vec<String>,

    /// RNG seed for repeatable contents.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    if let Err(err) = try_main() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut builder = StoreBuilder::new();

    for spec in &args.datasets {
        let (name, dtype, shape) = parse_spec(spec)?;
        let count = shape.iter().product::<u64>() as usize;
        match dtype {
            DType::F32 => {
                let values: Vec<f32> = (0..count).map(|_| rng.gen()).collect();
                builder.dataset_f32(name, &shape, &values)?;
            }
            DType::F64 => {
                let values: Vec<f64> = (0..count).map(|_| rng.gen()).collect();
                builder.dataset_f64(name, &shape, &values)?;
            }
            DType::I32 => {
                let values: Vec<i32> = (0..count).map(|_| rng.gen_range(-1000..1000)).collect();
                builder.dataset_i32(name, &shape, &values)?;
            }
            DType::I64 => {
                let values: Vec<i64> = (0..count).map(|_| rng.gen_range(-1000..1000)).collect();
                builder.dataset_i64(name, &shape, &values)?;
            }
        }
    }

    builder.write_to(&args.out)?;
    println!("wrote {}", args.out.display());
    Ok(())
}

fn parse_spec(spec: &str) -> Result<(&str, DType, Vec<u64>)> {
    let mut parts = spec.splitn(3, ':');
    let (Some(name), Some(dtype_name), Some(dims)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(BenchError::InvalidArgument(format!(
            "dataset spec must be name:dtype:dims, got {spec}"
        )));
    };
    let dtype = DType::from_name(dtype_name).ok_or_else(|| {
        BenchError::InvalidArgument(format!("unknown dtype {dtype_name} in spec {spec}"))
    })?;
    let shape = dims
        .split('x')
        .map(|dim| {
            dim.parse::<u64>().map_err(|_| {
                BenchError::InvalidArgument(format!("bad dimension {dim} in spec {spec}"))
            })
        })
        .collect::<Result<Vec<u64>>>()?;
    if name.is_empty() || shape.is_empty() {
        return Err(BenchError::InvalidArgument(format!(
            "dataset spec must be name:dtype:dims, got {spec}"
        )));
    }
    Ok((name, dtype, shape))
}
