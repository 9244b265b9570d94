//! One-dimensional piecewise-linear interpolation.

/// Errors from building a [`PiecewiseLinear`] mapping.
#[derive(thiserror::Error, Debug)]
pub enum InterpolantError {
    #[error("need at least 2 anchor points, got {found}")]
    NotEnoughPoints { found: usize },
    #[error("duplicate anchor abscissa {x} (zero-length segment)")]
    DuplicateX { x: f64 },
}

/// A piecewise-linear function through a set of `(x, y)` anchor points.
///
/// Outside the anchor range the function extrapolates with the slope of the
/// nearest end segment, so every finite input maps to a finite output.
#[derive(Clone, Debug)]
pub struct PiecewiseLinear {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl PiecewiseLinear {
    /// Build the interpolant from anchor points.
    ///
    /// Points are sorted by abscissa internally; the input order does not
    /// matter. Duplicate abscissae are rejected because they would produce a
    /// zero-length segment with an undefined slope.
    pub fn new(mut points: Vec<(f64, f64)>) -> Result<Self, InterpolantError> {
        if points.len() < 2 {
            return Err(InterpolantError::NotEnoughPoints {
                found: points.len(),
            });
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in points.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(InterpolantError::DuplicateX { x: pair[0].0 });
            }
        }
        let (xs, ys) = points.into_iter().unzip();
        Ok(Self { xs, ys })
    }

    /// Evaluate the mapping at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        // Segment index such that xs[i] <= x < xs[i+1], clamped to the end
        // segments for extrapolation.
        let i = self
            .xs
            .partition_point(|&xi| xi <= x)
            .saturating_sub(1)
            .min(self.xs.len() - 2);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }

    /// Number of anchor points.
    pub fn anchor_count(&self) -> usize {
        self.xs.len()
    }
}
