// scripts/benchmark.rs
//! Timing harness for both pricing engines.

use fast_pricer::lattice::{ExerciseStyle, OptionKind};
use fast_pricer::market::MarketModel;
use fast_pricer::pricing::{price_lattice, price_monte_carlo};

struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

fn main() {
    let market = MarketModel::new(100.0, 105.0, 0.05, 0.2, 1.0).expect("valid market");

    let steps = 1000;
    let timer = Timer::new();
    let lattice = price_lattice(&market, steps, OptionKind::Put, ExerciseStyle::American)
        .expect("valid lattice inputs");
    let lattice_ms = timer.elapsed_ms();
    println!(
        "lattice   american put  N={:<7} price={:.4}  ({:.2} ms)",
        steps, lattice.price, lattice_ms
    );

    let paths = 100_000;
    let mc_steps = 252;
    let timer = Timer::new();
    let mc = price_monte_carlo(&market, mc_steps, paths, "max(s - strike, 0)", Some(42))
        .expect("valid simulation inputs");
    let mc_ms = timer.elapsed_ms();
    let paths_per_sec = paths as f64 / (mc_ms / 1000.0);
    println!(
        "monte-carlo european call P={:<7} price={:.4} ± {:.4}  ({:.2} ms, {:.0} paths/s)",
        paths,
        mc.price,
        mc.standard_error.unwrap_or(0.0),
        mc_ms,
        paths_per_sec
    );
}
