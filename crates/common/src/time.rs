//! Pixel, millisecond and frame conversions.
//!
//! All timeline positions are milliseconds (`f64`). Frame indices are `i64`.
//! Non-positive `fps` or `pixels_per_ms` is a caller error: the functions
//! return non-finite or saturated values in that case but never panic.
//!
//! Choosing the frame variant matters:
//!
//! | Function              | Use for                                        |
//! |-----------------------|------------------------------------------------|
//! | [`ms_to_frame`]       | nearest frame (seek targets, display)          |
//! | [`ms_to_frame_floor`] | the frame *containing* an instant (clip start) |
//! | [`ms_to_frame_ceil`]  | the exclusive end frame covering an instant    |

/// Frame positions this close to an integer are treated as that integer, so
/// `ms_to_frame_floor(frame_to_ms(n, fps), fps) == n` survives float error.
const FRAME_EPSILON: f64 = 1e-9;

/// Start of `frame` in milliseconds.
pub fn frame_to_ms(frame: i64, fps: f64) -> f64 {
    frame as f64 / fps * 1000.0
}

/// Fractional frame position of `ms`, snapped onto an integer when within
/// [`FRAME_EPSILON`] of one.
fn frame_position(ms: f64, fps: f64) -> f64 {
    let position = ms * fps / 1000.0;
    let nearest = position.round();
    if (position - nearest).abs() < FRAME_EPSILON {
        nearest
    } else {
        position
    }
}

/// Nearest frame to `ms`. Ties round half away from zero.
///
/// ```
/// use fc_common::time::ms_to_frame;
/// assert_eq!(ms_to_frame(500.0, 30.0), 15);
/// ```
pub fn ms_to_frame(ms: f64, fps: f64) -> i64 {
    frame_position(ms, fps).round() as i64
}

/// Frame that contains the instant `ms`.
pub fn ms_to_frame_floor(ms: f64, fps: f64) -> i64 {
    frame_position(ms, fps).floor() as i64
}

/// First frame at or after `ms`; used as an exclusive end frame.
pub fn ms_to_frame_ceil(ms: f64, fps: f64) -> i64 {
    frame_position(ms, fps).ceil() as i64
}

/// Convert a horizontal pixel distance on the timeline into milliseconds.
pub fn pixels_to_ms(px: f64, pixels_per_ms: f64) -> f64 {
    px / pixels_per_ms
}

/// Convert milliseconds into a horizontal pixel distance on the timeline.
pub fn ms_to_pixels(ms: f64, pixels_per_ms: f64) -> f64 {
    ms * pixels_per_ms
}

/// Snap radius in milliseconds for a radius given in screen pixels at the
/// current zoom level.
pub fn snap_threshold_ms(threshold_px: f64, pixels_per_ms: f64) -> f64 {
    pixels_to_ms(threshold_px, pixels_per_ms)
}
