//! Cubic bezier timing curve, the same model as CSS `cubic-bezier()`.

use std::fmt;

/// Timing curve through (0,0), (x1,y1), (x2,y2), (1,1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    /// Curve used for manual spin steps
    pub const SNAP: CubicBezier = CubicBezier::new(0.25, 0.8, 0.25, 1.0);

    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Progress (y) at time fraction `time` (x)
    ///
    /// Inputs outside [0, 1] are clamped.
    pub fn value(&self, time: f64) -> f64 {
        if time <= 0.0 {
            return 0.0;
        }
        if time >= 1.0 {
            return 1.0;
        }

        // x(s) is monotonic for x1, x2 in [0, 1], so bisection converges
        let mut low = 0.0_f64;
        let mut high = 1.0_f64;
        let mut mid = time;
        for _ in 0..64 {
            mid = (low + high) / 2.0;
            let x_estimate = Self::bezier(self.x1, self.x2, mid);
            if (x_estimate - time).abs() < 1e-7 {
                break;
            }
            if x_estimate < time {
                low = mid;
            } else {
                high = mid;
            }
        }

        Self::bezier(self.y1, self.y2, mid)
    }

    /// One coordinate of the curve at parameter `s`
    fn bezier(p1: f64, p2: f64, s: f64) -> f64 {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
    }

    /// True if both x control points are within [0, 1]
    pub fn is_valid(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
            && (0.0..=1.0).contains(&self.x1)
            && (0.0..=1.0).contains(&self.x2)
    }
}

impl Default for CubicBezier {
    fn default() -> Self {
        Self::SNAP
    }
}

impl fmt::Display for CubicBezier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cubic-bezier({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}
