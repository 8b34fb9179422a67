//! Minimal timing harness for the `harness = false` benches.

use std::fs;
use std::io::{self, stdout, Write};
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct Benchmark {
    f: Rc<dyn Fn()>,
    name: String,
    iterations: usize,
}

pub enum Unit {
    Microsecond,
    Millisecond,
    Second,
}

impl Unit {
    pub fn scaled(d: &Duration) -> Self {
        if d.as_micros() < 10_000 {
            Self::Microsecond
        } else if d.as_millis() < 10_000 {
            Self::Millisecond
        } else {
            Self::Second
        }
    }

    pub fn format(&self, d: &Duration) -> String {
        let (symbol, value) = match self {
            Self::Microsecond => ("µs", d.as_micros()),
            Self::Millisecond => ("ms", d.as_millis()),
            Self::Second => ("s", d.as_secs() as u128),
        };
        format!("{:>6}{:<2}", value, symbol)
    }
}

impl Benchmark {
    pub fn iter<F: Fn() + 'static>(name: &str, n: usize, f: F) -> Self {
        Self {
            f: Rc::new(f),
            name: name.to_string(),
            iterations: n.max(1),
        }
    }

    pub fn once<F: Fn() + 'static>(name: &str, f: F) -> Self {
        Self::iter(name, 1, f)
    }

    fn run(&self) -> Duration {
        let start = Instant::now();
        for _ in 0..self.iterations {
            (self.f)();
        }
        start.elapsed()
    }
}

pub struct BenchmarkReport {
    benches: Vec<Benchmark>,
    results: Vec<(String, usize, Duration)>,
}

impl BenchmarkReport {
    pub fn with_benches(benches: Vec<Benchmark>) -> Self {
        Self {
            benches,
            results: vec![],
        }
    }

    pub fn run(&mut self) {
        for bench in &self.benches {
            let t = bench.run();
            self.results.push((bench.name.clone(), bench.iterations, t));
            print!(".");
            let _ = stdout().flush();
        }
        println!();
    }

    pub fn show(&self) {
        println!("  {: <36} {: >8}   {: >8}", "benchmark", "total", "per_call");
        for (name, iterations, t) in &self.results {
            let per_call = t.div_f64(*iterations as f64);
            println!(
                "  {: <36} {}   {}",
                name,
                Unit::scaled(t).format(t),
                Unit::scaled(&per_call).format(&per_call),
            )
        }
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut lines = vec!["benchmark,iterations,total_us,per_call_us".to_string()];
        for (name, iterations, t) in &self.results {
            lines.push(format!(
                "{},{},{},{}",
                name,
                iterations,
                t.as_micros(),
                t.as_micros() / *iterations as u128,
            ));
        }
        lines.push(String::new());
        fs::write(path, lines.join("\n"))
    }

    pub fn report(&mut self, name: &str) -> io::Result<()> {
        print!("Benchmark: {}", name);
        self.run();
        self.show();
        self.write_csv(format!("benchmark_{}.csv", name))
    }
}

#[test]
fn test_report_csv() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = BenchmarkReport::with_benches(vec![
        Benchmark::iter("noop", 3, || {}),
        Benchmark::once("noop-once", || {}),
    ]);
    report.run();
    let path = dir.path().join("b.csv");
    report.write_csv(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("noop,3,"));
    assert!(lines[2].starts_with("noop-once,1,"));
}
