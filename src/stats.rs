//! Summary statistics over requested prices.

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() { return None; }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Midpoint median: even-length input averages the two middle values.
pub fn median(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() { return None; }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(sorted_median(&sorted))
}

fn sorted_median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn min(xs: &[f64]) -> Option<f64> {
    xs.iter().copied().reduce(f64::min)
}

pub fn max(xs: &[f64]) -> Option<f64> {
    xs.iter().copied().reduce(f64::max)
}

/// Sample standard deviation (n - 1 denominator); needs two observations.
pub fn sample_std(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 { return None; }
    let m = mean(xs)?;
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (xs.len() - 1) as f64).sqrt())
}

/// All of the above for a sample known to hold at least one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub median: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub sample_std: Option<f64>,
}

impl Summary {
    pub fn of(first: f64, rest: &[f64]) -> Self {
        let mut sorted = Vec::with_capacity(rest.len() + 1);
        sorted.push(first);
        sorted.extend_from_slice(rest);
        sorted.sort_by(|a, b| a.total_cmp(b));
        Self {
            median: sorted_median(&sorted),
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            sample_std: sample_std(&sorted),
        }
    }
}
