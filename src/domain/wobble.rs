//! Cosine wobble of the tilt axis
//!
//! The tilt follows `A * cos(2π * ((t - offset) mod P) / P)`. Pausing the
//! animation freezes the tilt at some value; resuming has to pick a new phase
//! offset so the curve continues from that value. The inverse cosine only
//! yields phases in [0, P/2], so a resumed wobble always continues on its
//! descending half even if it was rising when frozen.

use std::f64::consts::TAU;

use thiserror::Error;

/// Phase recovery failures
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum WobbleError {
    #[error("wobble amplitude {amplitude} cannot be inverted")]
    DegenerateAmplitude { amplitude: f64 },

    #[error("tilt {tilt} is outside the wobble range ±{amplitude}")]
    OutOfRange { tilt: f64, amplitude: f64 },

    #[error("tilt is not a finite number")]
    NonFinite,
}

/// Slack for tilts that overshoot ±amplitude through float rounding only
const RANGE_EPSILON: f64 = 1e-9;

/// Cosine oscillation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wobble {
    /// Peak tilt in degrees
    pub amplitude: f64,
    /// Full period in milliseconds
    pub period_ms: f64,
}

impl Wobble {
    pub const DEFAULT_AMPLITUDE: f64 = 20.0;
    pub const DEFAULT_PERIOD_MS: f64 = 20_000.0;

    pub fn new(amplitude: f64, period_ms: f64) -> Self {
        Self {
            amplitude,
            period_ms,
        }
    }

    /// Tilt at time `t_ms` for the given phase offset
    pub fn tilt_at(&self, t_ms: f64, phase_offset_ms: f64) -> f64 {
        let phase = (t_ms - phase_offset_ms).rem_euclid(self.period_ms);
        self.amplitude * (TAU * phase / self.period_ms).cos()
    }

    /// Phase (ms into the period) at which the wobble equals `tilt`
    ///
    /// Always returns a phase in [0, period/2]. Callers set the new phase
    /// offset to `now - phase`.
    pub fn recover_phase(&self, tilt: f64) -> Result<f64, WobbleError> {
        if !tilt.is_finite() {
            return Err(WobbleError::NonFinite);
        }
        if !(self.amplitude.is_finite() && self.amplitude > 0.0) {
            return Err(WobbleError::DegenerateAmplitude {
                amplitude: self.amplitude,
            });
        }

        let ratio = tilt / self.amplitude;
        if ratio.abs() > 1.0 + RANGE_EPSILON {
            return Err(WobbleError::OutOfRange {
                tilt,
                amplitude: self.amplitude,
            });
        }

        Ok(ratio.clamp(-1.0, 1.0).acos() / TAU * self.period_ms)
    }
}

impl Default for Wobble {
    fn default() -> Self {
        Self::new(Self::DEFAULT_AMPLITUDE, Self::DEFAULT_PERIOD_MS)
    }
}

/// How the X axis behaves while the cube animates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TiltMode {
    /// Cosine wobble around zero
    Wobble(Wobble),
    /// Constant tilt in degrees
    Fixed(f64),
}

impl TiltMode {
    pub const DEFAULT_FIXED_TILT: f64 = 20.0;

    /// Tilt at time `t_ms` for the given phase offset
    pub fn tilt_at(&self, t_ms: f64, phase_offset_ms: f64) -> f64 {
        match self {
            TiltMode::Wobble(wobble) => wobble.tilt_at(t_ms, phase_offset_ms),
            TiltMode::Fixed(degrees) => *degrees,
        }
    }

    /// New phase offset that makes the animation continue from `frozen_tilt` at `now_ms`
    ///
    /// A fixed tilt has no phase, so the offset is returned unchanged.
    pub fn resume_offset(
        &self,
        frozen_tilt: f64,
        now_ms: f64,
        current_offset_ms: f64,
    ) -> Result<f64, WobbleError> {
        match self {
            TiltMode::Wobble(wobble) => Ok(now_ms - wobble.recover_phase(frozen_tilt)?),
            TiltMode::Fixed(_) => Ok(current_offset_ms),
        }
    }
}

impl Default for TiltMode {
    fn default() -> Self {
        TiltMode::Wobble(Wobble::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn starts_at_peak() {
        let wobble = Wobble::default();
        assert!((wobble.tilt_at(0.0, 0.0) - 20.0).abs() < EPS);
        assert!((wobble.tilt_at(10_000.0, 0.0) + 20.0).abs() < EPS);
        assert!(wobble.tilt_at(5_000.0, 0.0).abs() < EPS);
    }

    #[test]
    fn periodic_and_bounded() {
        let wobble = Wobble::default();
        let mut t = 0.0;
        while t < 60_000.0 {
            let tilt = wobble.tilt_at(t, 1234.5);
            assert!((-20.0..=20.0).contains(&tilt), "tilt {tilt} at {t}");
            let next_period = wobble.tilt_at(t + 20_000.0, 1234.5);
            assert!((tilt - next_period).abs() < 1e-6);
            t += 377.0;
        }
    }

    #[test]
    fn offset_later_than_time_still_in_range() {
        let wobble = Wobble::default();
        let tilt = wobble.tilt_at(100.0, 5_100.0);
        // (100 - 5100) mod 20000 = 15000 -> cos(3π/2) = 0
        assert!(tilt.abs() < EPS);
    }

    #[test]
    fn recovered_phase_reproduces_tilt() {
        let wobble = Wobble::default();
        for frozen_at in [0.0, 1_500.0, 4_000.0, 9_999.0, 10_000.0] {
            let frozen = wobble.tilt_at(frozen_at, 0.0);
            let phase = wobble.recover_phase(frozen).unwrap();
            assert!((0.0..=10_000.0).contains(&phase));
            assert!((wobble.tilt_at(phase, 0.0) - frozen).abs() < 1e-6);
        }
    }

    #[test]
    fn rising_half_resumes_on_descending_half() {
        let wobble = Wobble::default();
        // 15000ms in: tilt 0 and rising
        let frozen = wobble.tilt_at(15_000.0, 0.0);
        let phase = wobble.recover_phase(frozen).unwrap();
        assert!((phase - 5_000.0).abs() < 1e-6);
        // Same value, but the recovered curve heads down next
        assert!(wobble.tilt_at(phase + 100.0, 0.0) < frozen);
    }

    #[test]
    fn rounding_overshoot_is_tolerated() {
        let wobble = Wobble::default();
        let phase = wobble.recover_phase(20.0 + 1e-12).unwrap();
        assert!(phase.abs() < EPS);
        let phase = wobble.recover_phase(-20.0 - 1e-12).unwrap();
        assert!((phase - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_tilts_are_reported() {
        let wobble = Wobble::default();
        assert_eq!(
            wobble.recover_phase(25.0),
            Err(WobbleError::OutOfRange {
                tilt: 25.0,
                amplitude: 20.0
            })
        );
        assert_eq!(wobble.recover_phase(f64::NAN), Err(WobbleError::NonFinite));

        let flat = Wobble::new(0.0, 20_000.0);
        assert!(matches!(
            flat.recover_phase(0.0),
            Err(WobbleError::DegenerateAmplitude { .. })
        ));
    }

    #[test]
    fn fixed_tilt_ignores_time() {
        let mode = TiltMode::Fixed(20.0);
        assert_eq!(mode.tilt_at(0.0, 0.0), 20.0);
        assert_eq!(mode.tilt_at(12_345.0, 99.0), 20.0);
        assert_eq!(mode.resume_offset(20.0, 5_000.0, 42.0), Ok(42.0));
    }

    #[test]
    fn wobble_resume_offset_continues_curve() {
        let mode = TiltMode::default();
        let frozen = mode.tilt_at(2_000.0, 0.0);
        let offset = mode.resume_offset(frozen, 3_000.0, 0.0).unwrap();
        assert!((mode.tilt_at(3_000.0, offset) - frozen).abs() < 1e-6);
    }
}
