use std::time::Instant;

// ─── Statistics ─────────────────────────────────────────────────────────────

/// Per-call latency summary in nanoseconds.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Stats {
    pub min: u64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub max: u64,
    pub mean: f64,
    pub count: usize,
}

impl Stats {
    /// Summarises `samples`, or `None` when there are none.
    pub fn from_samples(mut samples: Vec<u64>) -> Option<Self> {
        samples.sort_unstable();
        let (&min, &max) = (samples.first()?, samples.last()?);
        // Nearest-rank percentile.
        let rank = |pct: usize| samples[(samples.len() * pct).div_ceil(100).max(1) - 1];
        Some(Self {
            min,
            p50: rank(50),
            p90: rank(90),
            p99: rank(99),
            max,
            mean: samples.iter().sum::<u64>() as f64 / samples.len() as f64,
            count: samples.len(),
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct BenchResult {
    pub name: String,
    pub stats: Stats,
}

// ─── Measurement Harness ────────────────────────────────────────────────────

/// Batched timing loop: one sample is the mean cost of `batch_size` calls,
/// which keeps the clock read out of sub-100ns buffer operations.
#[derive(Debug, Clone, Copy)]
pub struct Harness {
    pub batches: usize,
    pub batch_size: usize,
    pub warmup_batches: usize,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            batches: 2_000,
            batch_size: 100,
            warmup_batches: 50,
        }
    }
}

impl Harness {
    pub fn run<F: FnMut()>(&self, name: &str, mut f: F) -> BenchResult {
        for _ in 0..self.warmup_batches * self.batch_size {
            f();
        }

        let batch = self.batch_size.max(1) as u128;
        let samples = (0..self.batches)
            .map(|_| {
                let start = Instant::now();
                for _ in 0..batch {
                    f();
                }
                (start.elapsed().as_nanos() / batch).max(1) as u64
            })
            .collect();

        BenchResult {
            name: name.to_string(),
            stats: Stats::from_samples(samples).unwrap_or_default(),
        }
    }
}

// ─── Payloads ───────────────────────────────────────────────────────────────

/// `len` bytes cycling through printable ASCII.
pub fn make_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| b' ' + (i % 95) as u8).collect()
}

/// Payload sizes exercised by the benches: empty, greeting-sized, full, oversized.
pub const PAYLOAD_SIZES: [usize; 4] = [0, 19, 255, 300];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_on_known_samples() {
        let s = Stats::from_samples((1..=100).rev().collect()).unwrap();
        assert_eq!((s.min, s.max), (1, 100));
        assert_eq!((s.p50, s.p90, s.p99), (50, 90, 99));
        assert_eq!(s.count, 100);
        assert!((s.mean - 50.5).abs() < 1e-9);
    }

    #[test]
    fn single_sample_is_every_percentile() {
        let s = Stats::from_samples(vec![42]).unwrap();
        assert_eq!((s.min, s.p50, s.p99, s.max), (42, 42, 42, 42));
    }

    #[test]
    fn no_samples_no_stats() {
        assert!(Stats::from_samples(Vec::new()).is_none());
    }

    #[test]
    fn harness_counts_every_call() {
        let harness = Harness {
            batches: 3,
            batch_size: 4,
            warmup_batches: 1,
        };
        let mut calls = 0;
        let result = harness.run("count", || calls += 1);
        assert_eq!(calls, 4 + 3 * 4);
        assert_eq!(result.stats.count, 3);
        assert!(result.stats.min >= 1);
    }

    #[test]
    fn payload_is_printable() {
        let p = make_payload(300);
        assert_eq!(p.len(), 300);
        assert!(p.iter().all(|b| (b' '..=b'~').contains(b)));
    }
}
