//! Classification of continuous values into discrete classes.

use serde::{Deserialize, Serialize};

/// Binning strategy mapping values onto colour-range indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationMethod {
    /// Equal number of values per class
    Quantile,
    /// Equal-width intervals between min and max
    Equal,
    /// Natural breaks, approximated by 1-D k-means refinement
    #[serde(alias = "jenks")]
    JenksApprox,
}

/// Refinement rounds for [`ClassificationMethod::JenksApprox`].
const JENKS_MAX_ITERATIONS: usize = 50;

/// Class boundaries: `k + 1` ascending values from the minimum to the maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct Breaks {
    bounds: Vec<f64>,
}

impl Breaks {
    /// Compute `k` classes over the finite entries of `values`.
    ///
    /// Returns `None` when there is no finite value or `k == 0`.
    pub fn compute(values: &[f64], method: ClassificationMethod, k: usize) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() || k == 0 {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let bounds = match method {
            ClassificationMethod::Equal => equal_interval(&sorted, k),
            ClassificationMethod::Quantile => quantile(&sorted, k),
            ClassificationMethod::JenksApprox => jenks_approx(&sorted, k),
        };
        Some(Self { bounds })
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    pub fn classes(&self) -> usize {
        self.bounds.len() - 1
    }

    /// Class index of `value`: the number of interior bounds at or below it.
    pub fn class_of(&self, value: f64) -> usize {
        let k = self.classes();
        self.bounds[1..k].partition_point(|b| *b <= value)
    }
}

fn equal_interval(sorted: &[f64], k: usize) -> Vec<f64> {
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let step = (max - min) / k as f64;
    (0..=k)
        .map(|i| if i == k { max } else { min + step * i as f64 })
        .collect()
}

fn quantile(sorted: &[f64], k: usize) -> Vec<f64> {
    let n = sorted.len();
    let mut bounds: Vec<f64> = (0..k).map(|i| sorted[i * n / k]).collect();
    bounds.push(sorted[n - 1]);
    bounds
}

/// Lloyd iterations on sorted 1-D data, seeded with quantile class means.
/// Bounds sit halfway between neighbouring class centres.
fn jenks_approx(sorted: &[f64], k: usize) -> Vec<f64> {
    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];

    let mut centers: Vec<f64> = (0..k)
        .map(|i| {
            let lo = i * n / k;
            let hi = ((i + 1) * n / k).max(lo + 1).min(n);
            mean(&sorted[lo.min(n - 1)..hi])
        })
        .collect();

    for _ in 0..JENKS_MAX_ITERATIONS {
        let cuts = midpoints(&centers);
        let mut sums = vec![0.0; k];
        let mut counts = vec![0usize; k];
        for &v in sorted {
            let class = cuts.partition_point(|c| *c <= v);
            sums[class] += v;
            counts[class] += 1;
        }
        let next: Vec<f64> = centers
            .iter()
            .enumerate()
            .map(|(i, &c)| if counts[i] > 0 { sums[i] / counts[i] as f64 } else { c })
            .collect();
        let converged = next
            .iter()
            .zip(&centers)
            .all(|(a, b)| (a - b).abs() <= f64::EPSILON * a.abs().max(1.0));
        centers = next;
        if converged {
            break;
        }
    }

    let mut bounds = Vec::with_capacity(k + 1);
    bounds.push(min);
    bounds.extend(midpoints(&centers).into_iter().map(|c| c.clamp(min, max)));
    bounds.push(max);
    bounds
}

fn midpoints(centers: &[f64]) -> Vec<f64> {
    centers.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
