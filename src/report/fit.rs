/// Least-squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    /// `None` for fewer than two points or when every x is the same.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return None;
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);

        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;

        let (sxy, sxx) = xs
            .iter()
            .zip(ys)
            .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
                let dx = x - mean_x;
                (sxy + dx * (y - mean_y), sxx + dx * dx)
            });

        if sxx.abs() < f64::EPSILON {
            return None;
        }

        let slope = sxy / sxx;
        Some(Self {
            intercept: mean_y - slope * mean_x,
            slope,
        })
    }

    /// Legend text, e.g. `Pens = 1.20 + 0.85 * Goals`.
    pub fn label(&self, y_name: &str, x_name: &str) -> String {
        format!(
            "{} = {:.2} + {:.2} * {}",
            y_name, self.intercept, self.slope, x_name
        )
    }
}
