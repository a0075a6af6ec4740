//! Day-advance driver for playback.
//!
//! A spawned tokio task sleeps for the target's tick interval, then advances
//! it by one tick, until the target stops playing or the handle cancels it.
//! Cancellation goes through a `watch` channel so it interrupts a sleep in
//! progress.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::controller::{PlaybackState, TimelineController, TimelineEvent};

/// Something the driver can advance.
pub trait PlaybackTarget: Send + 'static {
    /// Delay before the next tick, or `None` when playback is not running.
    fn next_interval(&self) -> Option<Duration>;

    /// Advance by one tick and react to the resulting event.
    fn advance(&mut self) -> Option<TimelineEvent>;
}

impl PlaybackTarget for TimelineController {
    fn next_interval(&self) -> Option<Duration> {
        (self.state() == PlaybackState::Playing).then(|| self.tick_interval())
    }

    fn advance(&mut self) -> Option<TimelineEvent> {
        self.tick()
    }
}

/// Handle to a running playback task.
#[derive(Debug)]
pub struct PlaybackHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<usize>,
}

impl PlaybackHandle {
    /// Signal the task to stop without waiting for it.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel and wait for the task to exit. Returns the number of ticks it ran.
    pub async fn stop(self) -> usize {
        self.cancel();
        match self.task.await {
            Ok(ticks) => ticks,
            Err(err) => {
                log::error!("Playback task failed: {}", err);
                0
            }
        }
    }
}

pub struct PlaybackDriver;

impl PlaybackDriver {
    /// Spawn the day-advance loop for `target` on the current tokio runtime.
    pub fn spawn<T: PlaybackTarget>(target: Arc<Mutex<T>>) -> PlaybackHandle {
        let (cancel, mut cancelled) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticks = 0usize;
            loop {
                let Some(interval) = target.lock().next_interval() else {
                    break;
                };

                tokio::select! {
                    // A dropped sender also ends playback
                    _ = cancelled.changed() => break,
                    _ = tokio::time::sleep(interval) => {
                        let event = target.lock().advance();
                        ticks += 1;
                        match event {
                            Some(TimelineEvent::Finished(request)) => {
                                log::info!("Playback finished at {}", request.date);
                                break;
                            }
                            Some(_) => {}
                            None => break,
                        }
                    }
                }
            }
            log::debug!("Playback loop exited after {} ticks", ticks);
            ticks
        });

        PlaybackHandle { cancel, task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::add_days;
    use crate::timeline::ScheduleBounds;
    use chrono::NaiveDate;

    fn playing_controller(span: i64) -> Arc<Mutex<TimelineController>> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = add_days(start, span);
        let mut controller = TimelineController::default();
        controller.set_bounds(ScheduleBounds::new(start, end));
        controller.play().unwrap();
        Arc::new(Mutex::new(controller))
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_runs_to_end() {
        let controller = playing_controller(5);
        let handle = PlaybackDriver::spawn(controller.clone());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(handle.is_finished());
        assert_eq!(handle.stop().await, 5);

        let controller = controller.lock();
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert!(controller.is_at_end());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_sleep() {
        let controller = playing_controller(100);
        let handle = PlaybackDriver::spawn(controller.clone());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        let ticks = handle.stop().await;
        assert_eq!(ticks, 3);
        assert_eq!(controller.lock().offset_days(), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_shortens_interval() {
        let controller = playing_controller(100);
        controller.lock().set_speed(4.0).unwrap();
        let handle = PlaybackDriver::spawn(controller.clone());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(handle.stop().await, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tiny_speed_waits_without_ticking() {
        let controller = playing_controller(100);
        controller.lock().set_speed(1e-30).unwrap();
        let handle = PlaybackDriver::spawn(controller.clone());

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!handle.is_finished());
        assert_eq!(handle.stop().await, 0);
        assert_eq!(controller.lock().offset_days(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_playing_exits_immediately() {
        let controller = Arc::new(Mutex::new(TimelineController::default()));
        let handle = PlaybackDriver::spawn(controller);
        assert_eq!(handle.stop().await, 0);
    }
}
