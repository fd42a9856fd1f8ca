use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use super::error::PlaybackError;
use super::sink::PlaybackSink;
use crate::sample::TrajectorySample;
use crate::trajectory::Trajectory;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlayerMode {
    Idle,
    Running {
        start: DateTime<Utc>,
        trajectory: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStatus<S> {
    pub mode: PlayerMode,
    pub last_sample: Option<S>,
    /// Seconds into the current (or last) run at the most recent tick.
    pub elapsed: f64,
}

#[derive(Debug)]
struct Shared<S> {
    status: PlayerStatus<S>,
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Replays a trajectory against the clock, sampling it once per `period`.
pub struct Player<S> {
    period: Duration,
    shared: Arc<StdMutex<Shared<S>>>,
    worker: Option<WorkerHandle>,
}

fn lock<S>(shared: &StdMutex<Shared<S>>) -> MutexGuard<'_, Shared<S>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S> Player<S>
where
    S: TrajectorySample + Send + Sync + 'static,
{
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            shared: Arc::new(StdMutex::new(Shared {
                status: PlayerStatus {
                    mode: PlayerMode::Idle,
                    last_sample: None,
                    elapsed: 0.0,
                },
            })),
            worker: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn status(&self) -> PlayerStatus<S> {
        lock(&self.shared).status.clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(lock(&self.shared).status.mode, PlayerMode::Running { .. })
    }

    /// Ends the current run early. The sink sees `on_finish` with `completed = false`.
    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.await;
        }
        lock(&self.shared).status.mode = PlayerMode::Idle;
    }

    /// Waits for the current run to reach the end of its trajectory.
    pub async fn wait(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join.await;
        }
    }

    /// Starts playing `trajectory` on a new task. Must be called inside a tokio runtime.
    pub async fn run<K>(
        &mut self,
        trajectory: Arc<Trajectory<S>>,
        sink: K,
    ) -> Result<(), PlaybackError>
    where
        K: PlaybackSink<S> + Send + 'static,
    {
        if self
            .worker
            .as_ref()
            .is_some_and(|worker| !worker.join.is_finished())
        {
            return Err(PlaybackError::AlreadyRunning);
        }
        if trajectory.is_empty() {
            return Err(PlaybackError::EmptyTrajectory(trajectory.name().to_string()));
        }

        {
            let mut locked = lock(&self.shared);
            locked.status = PlayerStatus {
                mode: PlayerMode::Running {
                    start: Utc::now(),
                    trajectory: trajectory.name().to_string(),
                },
                last_sample: None,
                elapsed: 0.0,
            };
        }

        let shared = self.shared.clone();
        let period = self.period;
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_playback_loop(shared, trajectory, sink, period, stop_rx));

        self.worker = Some(WorkerHandle { stop_tx, join });
        Ok(())
    }
}

async fn run_playback_loop<S, K>(
    shared: Arc<StdMutex<Shared<S>>>,
    trajectory: Arc<Trajectory<S>>,
    mut sink: K,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) where
    S: TrajectorySample,
    K: PlaybackSink<S>,
{
    let start = Instant::now();
    let total_time = trajectory.total_time();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut previous: Option<f64> = None;

    sink.on_start(&trajectory);

    let completed = loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            break false;
        }

        let elapsed = start.elapsed().as_secs_f64();
        for marker in trajectory
            .events()
            .iter()
            .filter(|marker| crossed(previous, elapsed, marker.timestamp))
        {
            sink.on_event(marker);
        }

        if let Some(sample) = trajectory.sample_at(elapsed) {
            sink.on_sample(&sample);
            let mut locked = lock(&shared);
            locked.status.last_sample = Some(sample);
            locked.status.elapsed = elapsed;
        }

        previous = Some(elapsed);
        if elapsed >= total_time {
            break true;
        }
    };

    sink.on_finish(&trajectory, completed);
    lock(&shared).status.mode = PlayerMode::Idle;
}

/// Whether a marker at `timestamp` falls in `(previous, now]`; the first tick includes its start.
fn crossed(previous: Option<f64>, now: f64, timestamp: f64) -> bool {
    match previous {
        Some(previous) => timestamp > previous && timestamp <= now,
        None => timestamp <= now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SwerveSample;
    use crate::trajectory::EventMarker;
    use approx::assert_relative_eq;

    #[derive(Debug, Default)]
    struct Recorded {
        started: bool,
        samples: Vec<SwerveSample>,
        events: Vec<String>,
        finished: Option<bool>,
    }

    struct RecordingSink(Arc<StdMutex<Recorded>>);

    impl PlaybackSink<SwerveSample> for RecordingSink {
        fn on_start(&mut self, _trajectory: &Trajectory<SwerveSample>) {
            self.0.lock().unwrap().started = true;
        }

        fn on_sample(&mut self, sample: &SwerveSample) {
            self.0.lock().unwrap().samples.push(*sample);
        }

        fn on_event(&mut self, marker: &EventMarker) {
            self.0.lock().unwrap().events.push(marker.event.clone());
        }

        fn on_finish(&mut self, _trajectory: &Trajectory<SwerveSample>, completed: bool) {
            self.0.lock().unwrap().finished = Some(completed);
        }
    }

    fn straight(duration: f64) -> Arc<Trajectory<SwerveSample>> {
        Arc::new(Trajectory::new(
            "straight",
            vec![
                SwerveSample::at(0.0, 0.0, 0.0, 0.0),
                SwerveSample::at(duration, 10.0, 0.0, 0.0),
            ],
            vec![0],
            vec![
                EventMarker::new("begin", 0.0),
                EventMarker::new("halfway", duration / 2.0 + 0.05),
                EventMarker::new("end", duration),
            ],
        ))
    }

    fn recorder() -> (RecordingSink, Arc<StdMutex<Recorded>>) {
        let recorded = Arc::new(StdMutex::new(Recorded::default()));
        (RecordingSink(recorded.clone()), recorded)
    }

    #[test]
    fn test_crossed() {
        assert!(crossed(None, 0.0, 0.0));
        assert!(!crossed(None, 0.0, 0.1));
        assert!(crossed(Some(0.1), 0.2, 0.2));
        assert!(!crossed(Some(0.1), 0.2, 0.1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_to_completion() {
        let mut player = Player::new(Duration::from_millis(100));
        let (sink, recorded) = recorder();

        player.run(straight(1.0), sink).await.unwrap();
        assert!(player.is_running());
        player.wait().await;

        let recorded = recorded.lock().unwrap();
        assert!(recorded.started);
        assert_eq!(recorded.finished, Some(true));
        assert_eq!(recorded.events, vec!["begin", "halfway", "end"]);
        assert_eq!(recorded.samples.len(), 11);
        assert_relative_eq!(recorded.samples[0].x, 0.0);
        assert_relative_eq!(recorded.samples[5].x, 5.0, epsilon = 1e-6);
        assert_relative_eq!(recorded.samples[10].x, 10.0);

        let status = player.status();
        assert_eq!(status.mode, PlayerMode::Idle);
        assert_relative_eq!(status.last_sample.unwrap().x, 10.0);
        assert!(!player.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_early() {
        let mut player = Player::new(Duration::from_millis(100));
        let (sink, recorded) = recorder();

        player.run(straight(10.0), sink).await.unwrap();
        tokio::time::sleep(Duration::from_millis(350)).await;
        player.stop().await;

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.finished, Some(false));
        assert_eq!(recorded.events, vec!["begin"]);
        assert!(!recorded.samples.is_empty());
        assert_eq!(player.status().mode, PlayerMode::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_second_run_while_playing() {
        let mut player = Player::new(Duration::from_millis(100));
        let (first, _) = recorder();
        let (second, _) = recorder();

        player.run(straight(5.0), first).await.unwrap();
        assert!(matches!(
            player.run(straight(5.0), second).await,
            Err(PlaybackError::AlreadyRunning)
        ));
        player.stop().await;

        let (third, _) = recorder();
        player.run(straight(0.2), third).await.unwrap();
        player.wait().await;
    }

    #[tokio::test]
    async fn test_rejects_empty_trajectory() {
        let mut player: Player<SwerveSample> = Player::new(Duration::from_millis(10));
        let (sink, _) = recorder();
        let empty = Arc::new(Trajectory::new("empty", Vec::new(), Vec::new(), Vec::new()));

        assert!(matches!(
            player.run(empty, sink).await,
            Err(PlaybackError::EmptyTrajectory(ref name)) if name == "empty"
        ));
        assert_eq!(player.status().mode, PlayerMode::Idle);
    }
}
