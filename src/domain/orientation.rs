//! Two-axis cube orientation
//!
//! X is the tilt (bounded by the wobble), Y the spin (unbounded, it simply
//! keeps accumulating degrees).

/// Rotation of the cube in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Tilt around the X axis
    pub x: f64,
    /// Spin around the Y axis
    pub y: f64,
}

impl Orientation {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Adds `degrees` to the spin
    pub fn spin_by(&mut self, degrees: f64) {
        self.y += degrees;
    }

    /// Linear interpolation between two orientations, `t` in [0, 1]
    ///
    /// `t` outside that range extrapolates, which overshooting easing curves rely on.
    pub fn lerp(self, target: Orientation, t: f64) -> Orientation {
        Orientation {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }

    /// Spin reduced into [0, 360), as logged
    pub fn normalized_spin(&self) -> f64 {
        self.y.rem_euclid(360.0)
    }
}

/// Direction of a manual spin step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinDirection {
    Left,
    Right,
}

impl SpinDirection {
    /// Sign applied to the step size: left turns decrease Y
    pub fn sign(self) -> f64 {
        match self {
            SpinDirection::Left => -1.0,
            SpinDirection::Right => 1.0,
        }
    }
}
