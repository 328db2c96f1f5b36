// posefuse_core/src/utils/angles.rs

use num_traits::{Float, FloatConst};

/// Wraps an angle into the half-open interval `(-PI, PI]`.
///
/// Works in closed form, so very large inputs cost the same as small ones.
/// Non-finite inputs are returned unchanged.
pub fn normalize_angle<T: Float + FloatConst>(angle: T) -> T {
    if !angle.is_finite() {
        return angle;
    }

    let pi = T::PI();
    let two_pi = pi + pi;

    // Shift into [-PI, PI) first, then fold the lower edge onto +PI.
    let mut wrapped = angle - two_pi * ((angle + pi) / two_pi).floor();
    if wrapped <= -pi {
        wrapped = wrapped + two_pi;
    }
    if wrapped > pi {
        wrapped = wrapped - two_pi;
    }
    wrapped
}

/// Signed smallest difference `a - b`, wrapped into `(-PI, PI]`.
pub fn angle_difference<T: Float + FloatConst>(a: T, b: T) -> T {
    normalize_angle(a - b)
}
