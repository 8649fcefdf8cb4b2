//! Spring smoothing of the captured cursor path.
//!
//! The raw cursor path is jittery; the renderer follows it with a damped
//! spring instead. Evaluating the spring at time T means integrating it from
//! the first sample up to T, which is linear in T. Callers memoize results
//! through a smoothing cache keyed by [`SmoothingParams::cache_key`].

use serde::{Deserialize, Serialize};

use crate::types::CursorEvent;

/// Integration step (ms). 120 Hz keeps the default spring well inside the
/// stability bound of semi-implicit Euler.
const STEP_MS: f64 = 1000.0 / 120.0;

/// Damped spring parameters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            stiffness: 170.0,
            damping: 26.0,
            mass: 1.0,
        }
    }
}

impl SmoothingParams {
    /// Deterministic composite key for a sample at `timestamp` (ms).
    ///
    /// Values are fixed-precision so equal inputs always format identically.
    /// The key does not encode which project or recording it belongs to.
    pub fn cache_key(&self, timestamp: f64) -> String {
        format!(
            "{:.3}|{:.4}|{:.4}|{:.4}",
            timestamp, self.stiffness, self.damping, self.mass
        )
    }
}

/// A smoothed position in normalized coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothedPoint {
    pub x: f64,
    pub y: f64,
}

/// Raw cursor position at `time`, linearly interpolated between samples.
/// `events` must be ordered by timestamp.
pub fn cursor_position_at(events: &[CursorEvent], time: f64) -> Option<SmoothedPoint> {
    let first = events.first()?;
    if time <= first.timestamp {
        return Some(SmoothedPoint {
            x: first.x,
            y: first.y,
        });
    }

    // first index with timestamp > time
    let upper = events.partition_point(|e| e.timestamp <= time);
    if upper >= events.len() {
        let last = events[events.len() - 1];
        return Some(SmoothedPoint {
            x: last.x,
            y: last.y,
        });
    }

    let a = events[upper - 1];
    let b = events[upper];
    let span = b.timestamp - a.timestamp;
    let t = if span > 0.0 {
        (time - a.timestamp) / span
    } else {
        1.0
    };
    Some(SmoothedPoint {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    })
}

/// Spring-smoothed cursor position at `time`.
///
/// Starts at rest on the first sample and integrates toward the interpolated
/// raw path in fixed steps. Returns `None` when there are no samples.
pub fn smooth_cursor_position(
    events: &[CursorEvent],
    time: f64,
    params: &SmoothingParams,
) -> Option<SmoothedPoint> {
    let first = events.first()?;
    let mut pos = SmoothedPoint {
        x: first.x,
        y: first.y,
    };
    let mut vel = (0.0_f64, 0.0_f64);
    let mass = if params.mass > 0.0 { params.mass } else { 1.0 };

    let mut t = first.timestamp;
    while t < time {
        let step_end = (t + STEP_MS).min(time);
        let h = (step_end - t) / 1000.0;
        let target = cursor_position_at(events, step_end).unwrap_or(pos);

        let ax = (params.stiffness * (target.x - pos.x) - params.damping * vel.0) / mass;
        let ay = (params.stiffness * (target.y - pos.y) - params.damping * vel.1) / mass;
        vel.0 += ax * h;
        vel.1 += ay * h;
        pos.x += vel.0 * h;
        pos.y += vel.1 * h;

        t = step_end;
    }

    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(timestamp: f64, x: f64, y: f64) -> CursorEvent {
        CursorEvent { timestamp, x, y }
    }

    #[test]
    fn cache_key_is_deterministic() {
        let params = SmoothingParams::default();
        assert_eq!(params.cache_key(1000.0), params.cache_key(1000.0));
        assert_eq!(params.cache_key(1000.0), "1000.000|170.0000|26.0000|1.0000");
    }

    #[test]
    fn cache_key_changes_with_params() {
        let a = SmoothingParams::default();
        let b = SmoothingParams {
            stiffness: 120.0,
            ..a
        };
        assert_ne!(a.cache_key(500.0), b.cache_key(500.0));
        assert_ne!(a.cache_key(500.0), a.cache_key(501.0));
    }

    #[test]
    fn raw_position_interpolates() {
        let events = [event(0.0, 0.0, 0.0), event(100.0, 1.0, 0.5)];
        let p = cursor_position_at(&events, 50.0).unwrap();
        assert!((p.x - 0.5).abs() < 1e-9);
        assert!((p.y - 0.25).abs() < 1e-9);

        let before = cursor_position_at(&events, -10.0).unwrap();
        assert_eq!(before, SmoothedPoint { x: 0.0, y: 0.0 });
        let after = cursor_position_at(&events, 500.0).unwrap();
        assert_eq!(after, SmoothedPoint { x: 1.0, y: 0.5 });
    }

    #[test]
    fn no_events_no_position() {
        assert!(cursor_position_at(&[], 10.0).is_none());
        assert!(smooth_cursor_position(&[], 10.0, &SmoothingParams::default()).is_none());
    }

    #[test]
    fn smoothed_position_lags_then_settles() {
        let events = [event(0.0, 0.0, 0.0), event(10.0, 1.0, 1.0)];
        let params = SmoothingParams::default();

        let early = smooth_cursor_position(&events, 50.0, &params).unwrap();
        assert!(early.x > 0.0 && early.x < 1.0, "spring should lag: {early:?}");

        let settled = smooth_cursor_position(&events, 3_000.0, &params).unwrap();
        assert!((settled.x - 1.0).abs() < 1e-3, "spring should settle: {settled:?}");
        assert!((settled.y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn smoothing_is_deterministic() {
        let events = [
            event(0.0, 0.1, 0.2),
            event(40.0, 0.3, 0.1),
            event(90.0, 0.8, 0.7),
        ];
        let params = SmoothingParams::default();
        let a = smooth_cursor_position(&events, 123.4, &params);
        let b = smooth_cursor_position(&events, 123.4, &params);
        assert_eq!(a, b);
    }
}
