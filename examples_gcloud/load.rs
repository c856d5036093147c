use std::time::Instant;
use tracing::error;

use tracing_gcloud_sink::init::{init_tracing_with_config, LayerConfig};
use tracing_gcloud_sink::noop_sink::NoopSink;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing_with_config(NoopSink::default(), LayerConfig::default())?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, label.phase = "load", "load test error");
    }

    let elapsed = start.elapsed();
    println!("formatted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    Ok(())
}
