//! Phase-to-rotation conversion shared by every accumulator
//!
//! The phase of a sample at `(u, v)` seen from pixel `(l, m)` is measured in
//! **turns**: `t = u*l + v*m`. One turn is a full rotation, so the
//! contribution of the sample is `data * exp(j*2*pi*t)`.
//!
//! Two trigonometric conventions produce that rotation:
//!
//! | convention | primitive | argument |
//! |---|---|---|
//! | [`AngleConvention::Radians`] | `sin_cos(x)` | `x = 2*pi*t` |
//! | [`AngleConvention::HalfTurns`] | `sincospi(x)` = `(sin(pi*x), cos(pi*x))` | `x = 2*t` |
//!
//! Both are only reachable through [`AngleConvention::rotation`], which takes
//! the phase in turns, so the scale factor for each convention exists in
//! exactly one place.

use num_complex::Complex32;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Phase of one sample at one pixel, in turns
#[inline]
pub fn phase_turns(u: f32, v: f32, l: f32, m: f32) -> f32 {
    u * l + v * m
}

/// Trigonometric argument convention used to evaluate a rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngleConvention {
    /// `cos`/`sin` of `2*pi*t` radians
    #[default]
    Radians,
    /// `sincospi(2*t)`, with the factor of pi folded into the primitive
    HalfTurns,
}

impl AngleConvention {
    /// `exp(j*2*pi*turns)` evaluated with this convention
    #[inline]
    pub fn rotation(self, turns: f32) -> Complex32 {
        let (sin, cos) = match self {
            AngleConvention::Radians => (2.0 * PI * turns).sin_cos(),
            AngleConvention::HalfTurns => sincospi(2.0 * turns),
        };
        Complex32::new(cos, sin)
    }
}

/// `(sin(pi*x), cos(pi*x))`
///
/// `x` is reduced modulo 2 before scaling by pi. The reduction is exact in
/// `f32`, so large arguments lose no precision to the multiplication.
#[inline]
pub fn sincospi(x: f32) -> (f32, f32) {
    let r = x - 2.0 * (0.5 * x).round();
    (PI * r).sin_cos()
}
