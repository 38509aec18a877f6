//! NaN-aware descriptive statistics shared by normalization and metrics.
//!
//! Missing values are encoded as `NaN`. Functions prefixed with `nan_` skip
//! non-finite values; the plain variants propagate them. Degenerate input
//! (empty slices, too few values for the requested degrees of freedom)
//! yields `NaN` rather than panicking.

/// Arithmetic mean. `NaN` if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Variance with `n - ddof` denominator (`ddof = 0` is the population variance).
///
/// Returns `NaN` if `data.len() <= ddof`.
pub fn variance(data: &[f64], ddof: usize) -> f64 {
    let n = data.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / (n - ddof) as f64
}

/// Standard deviation with `n - ddof` denominator.
pub fn std(data: &[f64], ddof: usize) -> f64 {
    variance(data, ddof).sqrt()
}

fn finite(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| x.is_finite()).collect()
}

/// Mean over the finite values only. `NaN` if there are none.
pub fn nan_mean(data: &[f64]) -> f64 {
    mean(&finite(data))
}

/// Variance over the finite values only.
pub fn nan_variance(data: &[f64], ddof: usize) -> f64 {
    variance(&finite(data), ddof)
}

/// Standard deviation over the finite values only.
pub fn nan_std(data: &[f64], ddof: usize) -> f64 {
    nan_variance(data, ddof).sqrt()
}

/// Keeps the positions where both `obs[i]` and `sim[i]` are finite.
///
/// Trailing elements of the longer slice are ignored.
pub fn finite_pairs(obs: &[f64], sim: &[f64]) -> (Vec<f64>, Vec<f64>) {
    obs.iter()
        .zip(sim)
        .filter(|(o, s)| o.is_finite() && s.is_finite())
        .map(|(o, s)| (*o, *s))
        .unzip()
}

/// Trailing rolling mean over `window` values.
///
/// The first `window - 1` outputs are `NaN`, as is any window containing a
/// non-finite value. A `window` of zero yields all `NaN`.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; data.len()];
    if window == 0 {
        return out;
    }
    for end in window..=data.len() {
        let slice = &data[end - window..end];
        if slice.iter().all(|x| x.is_finite()) {
            out[end - 1] = slice.iter().sum::<f64>() / window as f64;
        }
    }
    out
}

/// Pearson correlation coefficient.
///
/// Filters to indices where both `x[i]` and `y[i]` are finite.
/// Returns `None` if fewer than 3 finite pairs or if the denominator is zero
/// (constant input).
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let (xs, ys) = finite_pairs(x, y);
    if xs.len() < 3 {
        return None;
    }

    let mx = mean(&xs);
    let my = mean(&ys);

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    for (&xi, &yi) in xs.iter().zip(&ys) {
        let dx = xi - mx;
        let dy = yi - my;
        sum_xy += dx * dy;
        sum_xx += dx * dx;
        sum_yy += dy * dy;
    }

    let denom = (sum_xx * sum_yy).sqrt();
    if denom == 0.0 {
        return None;
    }

    Some(sum_xy / denom)
}
