use crate::sample::TrajectorySample;
use crate::trajectory::{EventMarker, Trajectory};

/// Receives the output of a [`Player`](crate::player::Player) run.
///
/// Called from the playback task, once per tick for samples and once per
/// crossed marker for events.
pub trait PlaybackSink<S> {
    fn on_start(&mut self, _trajectory: &Trajectory<S>) {}

    fn on_sample(&mut self, sample: &S);

    fn on_event(&mut self, _marker: &EventMarker) {}

    /// `completed` is false when the run was stopped before the end.
    fn on_finish(&mut self, _trajectory: &Trajectory<S>, _completed: bool) {}
}

/// Writes playback progress to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl<S: TrajectorySample> PlaybackSink<S> for LogSink {
    fn on_start(&mut self, trajectory: &Trajectory<S>) {
        log::info!(
            "Playing {} ({} samples, {:.2}s)",
            trajectory.name(),
            trajectory.samples().len(),
            trajectory.total_time()
        );
    }

    fn on_sample(&mut self, sample: &S) {
        let pose = sample.pose();
        log::debug!(
            "t={:.3} x={:.3} y={:.3} heading={:.3}",
            sample.timestamp(),
            pose.x,
            pose.y,
            pose.heading
        );
    }

    fn on_event(&mut self, marker: &EventMarker) {
        log::info!("Event {} at {:.3}s", marker.event, marker.timestamp);
    }

    fn on_finish(&mut self, trajectory: &Trajectory<S>, completed: bool) {
        if completed {
            log::info!("Finished {}", trajectory.name());
        } else {
            log::warn!("Stopped {} before the end", trajectory.name());
        }
    }
}
