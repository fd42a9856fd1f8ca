use super::event::EventMarker;
use super::projection::project_onto_segment;
use crate::sample::{Pose2d, TrajectorySample};

/// Segments shorter than this (seconds) are not interpolated across.
const MIN_SEGMENT_DURATION: f64 = 1e-6;

/// A planned motion: time-ordered samples plus split boundaries and event markers.
///
/// Immutable once built, so shared references can be queried from any number
/// of control tasks at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<S> {
    name: String,
    samples: Vec<S>,
    splits: Vec<usize>,
    events: Vec<EventMarker>,
}

impl<S: TrajectorySample> Trajectory<S> {
    /// Builds a trajectory. `samples` must be sorted by timestamp; the loader
    /// guarantees `splits` starts at 0 when it is non-empty.
    pub fn new(
        name: impl Into<String>,
        samples: Vec<S>,
        splits: Vec<usize>,
        events: Vec<EventMarker>,
    ) -> Self {
        Self {
            name: name.into(),
            samples,
            splits,
            events,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[S] {
        &self.samples
    }

    /// Sample indices at which each split segment starts.
    pub fn splits(&self) -> &[usize] {
        &self.splits
    }

    pub fn split_count(&self) -> usize {
        self.splits.len()
    }

    pub fn events(&self) -> &[EventMarker] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn initial_sample(&self) -> Option<&S> {
        self.samples.first()
    }

    pub fn final_sample(&self) -> Option<&S> {
        self.samples.last()
    }

    pub fn initial_pose(&self) -> Option<Pose2d> {
        self.initial_sample().map(S::pose)
    }

    pub fn final_pose(&self) -> Option<Pose2d> {
        self.final_sample().map(S::pose)
    }

    pub fn poses(&self) -> Vec<Pose2d> {
        self.samples.iter().map(S::pose).collect()
    }

    /// Timestamp of the last sample, or 0 for an empty trajectory.
    pub fn total_time(&self) -> f64 {
        self.final_sample().map_or(0.0, S::timestamp)
    }

    /// All markers named `event`, in trajectory order.
    pub fn events_named(&self, event: &str) -> Vec<&EventMarker> {
        self.events.iter().filter(|e| e.event == event).collect()
    }

    /// The interpolated state at `timestamp` seconds from the start.
    ///
    /// Times before the first sample or past the end clamp to the first or
    /// last sample. Returns `None` only for an empty trajectory.
    pub fn sample_at(&self, timestamp: f64) -> Option<S> {
        match self.samples.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            samples => Some(sample_sorted(samples, timestamp)),
        }
    }

    /// The segment starting at split `index`, re-based to start at time 0.
    ///
    /// A segment runs up to and including the first sample of the next one,
    /// so consecutive segments share their boundary sample. The result has no
    /// splits of its own and keeps only the events inside its time range.
    pub fn split(&self, index: usize) -> Option<Trajectory<S>> {
        let start = *self.splits.get(index)?;
        let end = match self.splits.get(index + 1) {
            Some(next) => next + 1,
            None => self.samples.len(),
        }
        .min(self.samples.len());

        let segment = self.samples.get(start..end).filter(|s| !s.is_empty())?;
        let start_time = segment[0].timestamp();
        let end_time = segment[segment.len() - 1].timestamp();

        let samples = segment.iter().map(|s| s.offset_by(-start_time)).collect();
        let events = self
            .events
            .iter()
            .filter(|e| e.timestamp >= start_time && e.timestamp <= end_time)
            .map(|e| e.offset_by(-start_time))
            .collect();

        Some(Trajectory::new(
            format!("{}[{}]", self.name, index),
            samples,
            Vec::new(),
            events,
        ))
    }

    /// The state on the path nearest to `point`.
    ///
    /// Each consecutive sample pair is treated as a straight segment; the
    /// closest segment wins (the earliest one on exact ties) and the projected
    /// distance along it is mapped back to a time to interpolate at. Segments
    /// whose endpoints coincide are skipped. Returns `None` when no segment has
    /// a length, including when there are fewer than two samples.
    pub fn closest_sample(&self, point: &Pose2d) -> Option<S> {
        let mut best: Option<(f64, usize, f64)> = None;

        for (i, pair) in self.samples.windows(2).enumerate() {
            let projection = project_onto_segment(point, &pair[0].pose(), &pair[1].pose());
            // A zero-length segment has no direction to project along.
            if projection.length <= 0.0 {
                continue;
            }
            let closer = match best {
                Some((distance_squared, _, _)) => projection.distance_squared < distance_squared,
                None => true,
            };
            if closer {
                best = Some((projection.distance_squared, i, projection.fraction()));
            }
        }

        let (_, i, fraction) = best?;
        let behind = &self.samples[i];
        let ahead = &self.samples[i + 1];
        let timestamp = behind.timestamp() + (ahead.timestamp() - behind.timestamp()) * fraction;
        Some(blend(behind, ahead, timestamp))
    }
}

/// Samples a sorted sequence of at least two samples.
fn sample_sorted<S: TrajectorySample>(samples: &[S], timestamp: f64) -> S {
    let first = &samples[0];
    let last = &samples[samples.len() - 1];
    if timestamp < first.timestamp() {
        return first.clone();
    }
    if timestamp >= last.timestamp() {
        return last.clone();
    }

    // Lower bound: first sample at or after `timestamp`.
    let ahead_index = samples.partition_point(|s| s.timestamp() < timestamp);
    if ahead_index == 0 {
        return first.clone();
    }

    blend(&samples[ahead_index - 1], &samples[ahead_index], timestamp)
}

fn blend<S: TrajectorySample>(behind: &S, ahead: &S, timestamp: f64) -> S {
    if ahead.timestamp() - behind.timestamp() < MIN_SEGMENT_DURATION {
        return ahead.clone();
    }
    behind.interpolate(ahead, timestamp)
}
