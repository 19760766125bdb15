//! Small numeric helpers shared by the forecast models

/// Below this, a variance or sum of squares is treated as zero
pub const EPSILON: f64 = 1e-9;

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n); 0.0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Root mean square; 0.0 for an empty slice
pub fn root_mean_square(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|x| x * x).sum::<f64>() / values.len() as f64).sqrt()
}

/// Ordinary least squares line `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit a line through `(xs[i], ys[i])`.
///
/// Returns `None` when fewer than two pairs are given, the lengths differ,
/// or the x values have no spread (singular normal equations).
pub fn least_squares(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let x_mean = mean(xs);
    let y_mean = mean(ys);
    let (numerator, denominator) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0), |(num, den), (x, y)| {
            let dx = x - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });

    if denominator.abs() < EPSILON {
        return None;
    }

    let slope = numerator / denominator;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Centered moving average with an odd `window`.
///
/// Entry `i` holds the mean of `values[i - window/2 ..= i + window/2]` when
/// that range is in bounds, otherwise `None`.
pub fn centered_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let half = window / 2;
    (0..values.len())
        .map(|i| {
            if window == 0 || i < half || i + half >= values.len() {
                None
            } else {
                Some(mean(&values[i - half..=i + half]))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert_eq!(population_std_dev(&values), 2.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
    }

    #[test]
    fn test_root_mean_square() {
        assert_eq!(root_mean_square(&[3.0, -3.0]), 3.0);
        assert_eq!(root_mean_square(&[]), 0.0);
    }

    #[test]
    fn test_least_squares_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let fit = least_squares(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.at(10.0) - 21.0).abs() < 1e-12);
    }

    #[test]
    fn test_least_squares_degenerate() {
        assert!(least_squares(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(least_squares(&[1.0], &[1.0]).is_none());
        assert!(least_squares(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn test_centered_moving_average() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let cma = centered_moving_average(&values, 3);
        assert_eq!(cma, vec![None, Some(2.0), Some(3.0), Some(4.0), None]);
    }
}
