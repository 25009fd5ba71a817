//! Monte Carlo estimate of completion and coverage for random pack draws.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Deserializer, Serialize};

/// Iterations per estimate.
pub const ITERATIONS: usize = 10_000;

/// Draw setup. Values outside the supported ranges are clamped, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Packs opened, `0..=1000`.
    #[serde(rename = "n_packs", deserialize_with = "count_from_number")]
    pub pack_count: u32,
    /// Members in the pool, `1..=500`.
    #[serde(rename = "n_members", deserialize_with = "count_from_number")]
    pub member_count: u32,
    /// Cut types per member, `1..=10`.
    #[serde(rename = "n_cuts", deserialize_with = "count_from_number")]
    pub cut_count: u32,
    /// Distinct members drawn per pack, `1..=member_count`.
    #[serde(rename = "n_onedraw", deserialize_with = "count_from_number")]
    pub one_pack_size: u32,
}

impl SimulationParams {
    /// Copy with every field forced into its supported range.
    pub fn clamped(self) -> Self {
        let member_count = self.member_count.clamp(1, 500);
        Self {
            pack_count: self.pack_count.min(1000),
            member_count,
            cut_count: self.cut_count.clamp(1, 10),
            one_pack_size: self.one_pack_size.clamp(1, member_count),
        }
    }
}

/// Reads any JSON number as a count. Fractions truncate and negatives
/// become zero; range clamping happens in [`SimulationParams::clamped`].
fn count_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    // Float-to-int `as` saturates and maps NaN to zero.
    Ok(value.max(0.0) as u32)
}

/// Sample means and standard errors over [`ITERATIONS`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Mean number of full sets, summed over members.
    pub comp_mean: f64,
    /// Mean number of distinct (member, cut) pairs held at least once.
    pub coverage_mean: f64,
    /// Standard error of `comp_mean`.
    pub comp_stderr: f64,
    /// Standard error of `coverage_mean`.
    pub coverage_stderr: f64,
}

/// Runs the estimate with OS-seeded randomness.
pub fn simulate(params: SimulationParams) -> SimulationResult {
    simulate_with_rng(params, &mut StdRng::from_entropy())
}

/// Runs the estimate drawing from `rng`.
pub fn simulate_with_rng<R: Rng + ?Sized>(params: SimulationParams, rng: &mut R) -> SimulationResult {
    let p = params.clamped();
    let members = p.member_count as usize;
    let cuts = p.cut_count as usize;
    let draw = p.one_pack_size as usize;

    // Buffers reused across iterations.
    let mut counts = vec![0u32; members * cuts];
    let mut indices: Vec<usize> = (0..members).collect();
    let mut comps = Vec::with_capacity(ITERATIONS);
    let mut coverages = Vec::with_capacity(ITERATIONS);

    for _ in 0..ITERATIONS {
        counts.fill(0);
        for _ in 0..p.pack_count {
            for (k, slot) in indices.iter_mut().enumerate() {
                *slot = k;
            }
            // Partial Fisher-Yates: the first `draw` slots are a uniform sample.
            for j in 0..draw {
                let pick = rng.gen_range(j..members);
                indices.swap(j, pick);
            }
            for &member in &indices[..draw] {
                let cut = rng.gen_range(0..cuts);
                counts[member * cuts + cut] += 1;
            }
        }

        let mut comp = 0u64;
        let mut coverage = 0u64;
        for row in counts.chunks_exact(cuts) {
            comp += u64::from(row.iter().copied().min().unwrap_or(0));
            coverage += row.iter().filter(|&&n| n > 0).count() as u64;
        }
        comps.push(comp as f64);
        coverages.push(coverage as f64);
    }

    let (comp_mean, comp_stderr) = mean_and_stderr(&comps);
    let (coverage_mean, coverage_stderr) = mean_and_stderr(&coverages);
    SimulationResult {
        comp_mean,
        coverage_mean,
        comp_stderr,
        coverage_stderr,
    }
}

/// Population standard deviation over `sqrt(n)`.
fn mean_and_stderr(samples: &[f64]) -> (f64, f64) {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt() / n.sqrt())
}
