//! Timeline geometry: active-clip resolution and snap targets.
//!
//! Clips are treated as half-open intervals `[start_time, end_time)`: a clip
//! is active at its own start instant and inactive at its end instant. Input
//! collections may be unsorted and overlapping. When several clips contain a
//! query time, the one with the greatest `start_time` wins ("newest wins");
//! equal starts resolve to the clip that comes first in the input.

use std::cmp::Ordering;

use fc_common::ClipId;

use crate::types::{Clip, Project};

/// Anything occupying a span of the timeline.
pub trait TimeSpan {
    fn start_time(&self) -> f64;
    fn end_time(&self) -> f64;

    /// Half-open containment: `start <= time < end`.
    fn contains(&self, time: f64) -> bool {
        time >= self.start_time() && time < self.end_time()
    }
}

impl TimeSpan for Clip {
    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn end_time(&self) -> f64 {
        Clip::end_time(self)
    }
}

/// A clip reduced to its identity and extent, as used while dragging.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeBlock {
    pub id: ClipId,
    pub start_time: f64,
    pub end_time: f64,
}

impl TimeSpan for TimeBlock {
    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn end_time(&self) -> f64 {
        self.end_time
    }
}

impl From<&Clip> for TimeBlock {
    fn from(clip: &Clip) -> Self {
        Self {
            id: clip.id.clone(),
            start_time: clip.start_time,
            end_time: clip.end_time(),
        }
    }
}

/// Derive snap blocks from clips.
pub fn blocks_from_clips<'a>(clips: impl IntoIterator<Item = &'a Clip>) -> Vec<TimeBlock> {
    clips.into_iter().map(TimeBlock::from).collect()
}

/// Every block edge plus the timeline origin, ascending and deduplicated.
///
/// The block with `exclude_id` (the one being dragged) contributes nothing.
/// `0` is always present, so empty input yields `[0.0]`. Non-finite edges are
/// dropped.
pub fn compute_snap_positions(blocks: &[TimeBlock], exclude_id: Option<&ClipId>) -> Vec<f64> {
    let mut positions = Vec::with_capacity(blocks.len() * 2 + 1);
    positions.push(0.0);
    for block in blocks {
        if exclude_id == Some(&block.id) {
            continue;
        }
        positions.push(block.start_time);
        positions.push(block.end_time);
    }

    positions.retain(|p| p.is_finite());
    positions.sort_by(f64::total_cmp);
    // -0.0 and 0.0 compare equal here
    positions.dedup_by(|a, b| *a == *b);
    positions
}

/// Result of a snap search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapMatch {
    pub position: f64,
    /// Absolute distance from the query time.
    pub distance: f64,
}

/// Closest snap point to `time`.
///
/// Ties (equal distance on both sides) resolve to the smaller snap point, so
/// `find_nearest_snap_position(5.0, &[0.0, 10.0])` is `0.0`. Candidates need
/// not be sorted. Returns `None` for an empty candidate list.
pub fn find_nearest_snap_position(time: f64, snap_points: &[f64]) -> Option<SnapMatch> {
    let mut best: Option<SnapMatch> = None;
    for &position in snap_points {
        let distance = (time - position).abs();
        if distance.is_nan() {
            continue;
        }
        let better = match best {
            None => true,
            Some(current) => match distance.total_cmp(&current.distance) {
                Ordering::Less => true,
                Ordering::Equal => position < current.position,
                Ordering::Greater => false,
            },
        };
        if better {
            best = Some(SnapMatch { position, distance });
        }
    }
    best
}

/// Nearest snap point, but only if it lies within `threshold_ms` of `time`.
pub fn snap_time(time: f64, snap_points: &[f64], threshold_ms: f64) -> Option<SnapMatch> {
    find_nearest_snap_position(time, snap_points).filter(|m| m.distance <= threshold_ms)
}

/// The clip active at `time`, newest wins.
pub fn find_clip_at_timeline_position<'a, T, I>(time: f64, clips: I) -> Option<&'a T>
where
    T: TimeSpan + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<&'a T> = None;
    for clip in clips {
        if !clip.contains(time) {
            continue;
        }
        // strictly greater keeps the earlier clip on equal starts
        if best.map_or(true, |b| clip.start_time() > b.start_time()) {
            best = Some(clip);
        }
    }
    best
}

/// The webcam clip visible at `time`.
///
/// Orders clips newest-first by start with a stable sort, then takes the
/// first that contains `time`. Equal starts keep their original relative
/// order, which is the same answer [`find_clip_at_timeline_position`] gives.
pub fn find_active_webcam_clip<'a>(
    time: f64,
    clips: impl IntoIterator<Item = &'a Clip>,
) -> Option<&'a Clip> {
    let mut ordered: Vec<&Clip> = clips.into_iter().collect();
    ordered.sort_by(|a, b| b.start_time.total_cmp(&a.start_time));
    ordered.into_iter().find(|c| c.contains(time))
}

/// The clip that starts soonest strictly after `time`. Ties go to the lowest id.
pub fn next_clip_after<'a>(
    time: f64,
    clips: impl IntoIterator<Item = &'a Clip>,
) -> Option<&'a Clip> {
    clips
        .into_iter()
        .filter(|c| c.start_time > time)
        .min_by(|a, b| {
            a.start_time
                .total_cmp(&b.start_time)
                .then_with(|| a.id.cmp(&b.id))
        })
}

/// End of the last clip on any track, or 0 for an empty timeline.
pub fn timeline_duration(project: &Project) -> f64 {
    project
        .all_clips()
        .map(Clip::end_time)
        .fold(0.0_f64, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_clip(id: &str, start: f64, duration: f64) -> Clip {
        Clip::new(id, "t1", "rec1", start, duration)
    }

    fn block(id: &str, start: f64, end: f64) -> TimeBlock {
        TimeBlock {
            id: ClipId::new(id),
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn snap_positions_empty_is_origin() {
        assert_eq!(compute_snap_positions(&[], None), vec![0.0]);
    }

    #[test]
    fn snap_positions_sorted_unique_with_origin() {
        let blocks = [
            block("b", 2_000.0, 3_000.0),
            block("a", 500.0, 2_000.0),
            block("c", 0.0, 500.0),
        ];
        let snaps = compute_snap_positions(&blocks, None);
        assert_eq!(snaps, vec![0.0, 500.0, 2_000.0, 3_000.0]);
    }

    #[test]
    fn snap_positions_exclude_dragged_block() {
        let blocks = [block("a", 100.0, 200.0), block("b", 300.0, 400.0)];
        let snaps = compute_snap_positions(&blocks, Some(&ClipId::new("a")));
        assert_eq!(snaps, vec![0.0, 300.0, 400.0]);

        // origin survives even if the dragged block sat on it
        let blocks = [block("a", 0.0, 200.0)];
        let snaps = compute_snap_positions(&blocks, Some(&ClipId::new("a")));
        assert_eq!(snaps, vec![0.0]);
    }

    #[test]
    fn snap_positions_from_clips() {
        let clips = [make_clip("a", 1_000.0, 500.0), make_clip("b", 1_200.0, 800.0)];
        let blocks = blocks_from_clips(&clips);
        let snaps = compute_snap_positions(&blocks, None);
        assert_eq!(snaps, vec![0.0, 1_000.0, 1_200.0, 1_500.0, 2_000.0]);
    }

    #[test]
    fn nearest_snap_tie_prefers_lower() {
        let m = find_nearest_snap_position(5.0, &[0.0, 10.0]).unwrap();
        assert_eq!(m.position, 0.0);
        assert_eq!(m.distance, 5.0);

        // order of candidates does not matter
        let m = find_nearest_snap_position(5.0, &[10.0, 0.0]).unwrap();
        assert_eq!(m.position, 0.0);
    }

    #[test]
    fn nearest_snap_picks_closest() {
        let m = find_nearest_snap_position(7.0, &[0.0, 10.0, 20.0]).unwrap();
        assert_eq!(m.position, 10.0);
        assert_eq!(m.distance, 3.0);
    }

    #[test]
    fn nearest_snap_none_when_empty() {
        assert!(find_nearest_snap_position(5.0, &[]).is_none());
    }

    #[test]
    fn snap_time_respects_threshold() {
        let snaps = [0.0, 1_000.0];
        assert_eq!(snap_time(990.0, &snaps, 20.0).unwrap().position, 1_000.0);
        assert!(snap_time(950.0, &snaps, 20.0).is_none());
    }

    #[test]
    fn half_open_interval() {
        let clips = [make_clip("a", 1_000.0, 500.0)];
        assert!(find_clip_at_timeline_position(1_000.0, &clips).is_some());
        assert!(find_clip_at_timeline_position(1_499.0, &clips).is_some());
        assert!(find_clip_at_timeline_position(1_500.0, &clips).is_none());
        assert!(find_clip_at_timeline_position(999.0, &clips).is_none());
    }

    #[test]
    fn newest_wins_on_overlap() {
        let clips = [make_clip("A", 0.0, 1_000.0), make_clip("B", 500.0, 1_000.0)];
        let active = find_clip_at_timeline_position(700.0, &clips).unwrap();
        assert_eq!(active.id, ClipId::new("B"));

        // insertion order does not matter
        let reversed = [make_clip("B", 500.0, 1_000.0), make_clip("A", 0.0, 1_000.0)];
        let active = find_clip_at_timeline_position(700.0, &reversed).unwrap();
        assert_eq!(active.id, ClipId::new("B"));

        // before B starts, A is active
        let active = find_clip_at_timeline_position(300.0, &clips).unwrap();
        assert_eq!(active.id, ClipId::new("A"));
    }

    #[test]
    fn equal_starts_keep_input_order() {
        let clips = [make_clip("second", 0.0, 1_000.0), make_clip("first", 0.0, 2_000.0)];
        let active = find_clip_at_timeline_position(500.0, &clips).unwrap();
        assert_eq!(active.id, ClipId::new("second"));
    }

    #[test]
    fn works_on_blocks() {
        let blocks = [block("a", 0.0, 100.0), block("b", 50.0, 150.0)];
        let active = find_clip_at_timeline_position(60.0, &blocks).unwrap();
        assert_eq!(active.id, ClipId::new("b"));
    }

    #[test]
    fn webcam_selection_matches_general_query() {
        let clips = [
            make_clip("w1", 0.0, 5_000.0),
            make_clip("w2", 1_000.0, 1_000.0),
            make_clip("w3", 1_000.0, 3_000.0),
            make_clip("w4", 4_000.0, 500.0),
        ];
        for t in [0.0, 999.0, 1_000.0, 1_500.0, 2_000.0, 3_999.0, 4_000.0, 4_500.0, 5_000.0] {
            let webcam = find_active_webcam_clip(t, &clips).map(|c| c.id.clone());
            let general = find_clip_at_timeline_position(t, &clips).map(|c| c.id.clone());
            assert_eq!(webcam, general, "t = {t}");
        }
        // equal starts: w2 precedes w3 in input, so it wins while both are active
        assert_eq!(
            find_active_webcam_clip(1_500.0, &clips).unwrap().id,
            ClipId::new("w2")
        );
        assert_eq!(
            find_active_webcam_clip(2_500.0, &clips).unwrap().id,
            ClipId::new("w3")
        );
    }

    #[test]
    fn next_clip_lowest_start_then_lowest_id() {
        let clips = [
            make_clip("z", 2_000.0, 100.0),
            make_clip("b", 1_000.0, 100.0),
            make_clip("a", 1_000.0, 100.0),
        ];
        assert_eq!(next_clip_after(0.0, &clips).unwrap().id, ClipId::new("a"));
        // strictly after: a clip starting exactly at `time` is not "next"
        assert_eq!(next_clip_after(1_000.0, &clips).unwrap().id, ClipId::new("z"));
        assert!(next_clip_after(2_000.0, &clips).is_none());
    }

    #[test]
    fn duration_of_project() {
        let mut project = Project::new("p", "P");
        assert_eq!(timeline_duration(&project), 0.0);
        let track = project.add_track("v1", "V", crate::types::TrackType::Video);
        track.add_clip(make_clip("a", 0.0, 1_000.0));
        track.add_clip(make_clip("b", 3_000.0, 500.0));
        assert_eq!(timeline_duration(&project), 3_500.0);
    }
}
