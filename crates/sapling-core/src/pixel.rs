//! Snapping values to the device pixel grid.

use crate::value::floats_equal;

/// Round `value` (in points) to a multiple of `1 / point_scale_factor`.
///
/// Values already on the grid are left alone. Otherwise `force_ceil` and
/// `force_floor` pick a direction, and round-half-up applies when neither
/// is set.
#[must_use]
pub fn round_value_to_pixel_grid(
    value: f32,
    point_scale_factor: f32,
    force_ceil: bool,
    force_floor: bool,
) -> f32 {
    let mut scaled = value * point_scale_factor;
    // `%` on floats keeps the dividend's sign, same as C fmodf
    let fraction = scaled % 1.0;
    if floats_equal(fraction, 0.0) {
        scaled -= fraction;
    } else if floats_equal(fraction, 1.0) {
        scaled = scaled - fraction + 1.0;
    } else if force_ceil {
        scaled = scaled - fraction + 1.0;
    } else if force_floor {
        scaled -= fraction;
    } else {
        scaled = scaled - fraction + if fraction >= 0.5 { 1.0 } else { 0.0 };
    }
    scaled / point_scale_factor
}

/// Whether `value` scaled to pixels has a fractional part.
#[must_use]
pub fn has_fractional_pixels(value: f32, point_scale_factor: f32) -> bool {
    let fraction = (value * point_scale_factor) % 1.0;
    !floats_equal(fraction, 0.0) && !floats_equal(fraction, 1.0)
}
