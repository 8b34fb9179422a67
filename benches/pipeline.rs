use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use heatframes::bench::{Benchmark, BenchmarkReport};
use heatframes::threads::AnyExecutor;
use heatframes::{Catalog, Pipeline, Renderer, SnapshotPattern};

const FRAMES: usize = 32;
const SIZE: usize = 256;
const REPEATS: usize = 3;

fn thread_counts() -> Vec<usize> {
    let counts: BTreeSet<usize> = [0, 1, 2, 4, num_cpus::get_physical(), num_cpus::get()]
        .into_iter()
        .collect();
    counts.into_iter().collect()
}

fn write_frames(dir: &Path) {
    for f in 0..FRAMES {
        let mut text = String::with_capacity(SIZE * SIZE * 8);
        for k in 0..SIZE * SIZE {
            let (r, c) = ((k / SIZE) as f64, (k % SIZE) as f64);
            let v = ((r + f as f64) * 0.05).sin() * (c * 0.03).cos() * (1.0 + f as f64);
            text.push_str(&format!("{:.6}\n", v));
        }
        fs::write(dir.join(format!("frame_{:04}.csv", f)), text).unwrap();
    }
}

fn bench_pipeline(catalog: Rc<Catalog>, threads: usize, render: bool) -> Benchmark {
    let pass = if render { "both" } else { "reduce" };
    let name = &format!("pipeline-{}-t{}-{}x{}", pass, threads, SIZE, SIZE);
    let pipeline = Pipeline::new(AnyExecutor::with_threads(threads), Renderer::new(SIZE, SIZE));
    Benchmark::iter(name, REPEATS, move || {
        if render {
            pipeline.run(&catalog).unwrap();
        } else {
            pipeline.reduce(&catalog).unwrap();
        }
    })
}

fn main() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path());
    let catalog = Rc::new(Catalog::scan(dir.path(), &SnapshotPattern::default()).unwrap());

    let mut benches = vec![];
    for t in thread_counts() {
        benches.push(bench_pipeline(catalog.clone(), t, false));
        benches.push(bench_pipeline(catalog.clone(), t, true));
    }
    BenchmarkReport::with_benches(benches)
        .report("pipeline")
        .unwrap();
}
