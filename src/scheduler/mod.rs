//! The two periodic cycles and the loop that runs them.
//!
//! The status cycle runs as its own task and publishes snapshots through a `watch` channel. The
//! frame cycle is driven inline by [`RenderScheduler::run`] and always draws the most recently
//! published snapshot, so several frames are usually drawn from one snapshot.

use std::time::Duration;

use chrono::NaiveTime;
use tokio::time::{MissedTickBehavior, interval};

use crate::{
    foundation::error::{DisplayError, DisplayResult},
    matrix::bus::BusStats,
    matrix::transport::Transport,
    status::source::StatusSource,
};

/// Fast cycle.
pub mod frame_cycle;
/// Slow cycle.
pub mod status_cycle;

pub use frame_cycle::FrameCycle;
pub use status_cycle::{Snapshot, StatusCycle, StatusStats};

/// Timing and limits for [`RenderScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerOpts {
    /// Status refresh period, also the bootstrap retry delay.
    pub status_interval: Duration,
    /// Frame period.
    pub frame_interval: Duration,
    /// Brightness sent during start-up, `0..=15`.
    pub intensity: u8,
    /// Stop after this many frames; `None` runs until cancelled.
    pub max_frames: Option<u64>,
}

impl Default for SchedulerOpts {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_millis(500),
            frame_interval: Duration::from_millis(50),
            intensity: 1,
            max_frames: None,
        }
    }
}

impl SchedulerOpts {
    /// Reject zero periods.
    pub fn validate(&self) -> DisplayResult<()> {
        if self.status_interval.is_zero() {
            return Err(DisplayError::validation("status interval must be non-zero"));
        }
        if self.frame_interval.is_zero() {
            return Err(DisplayError::validation("frame interval must be non-zero"));
        }
        Ok(())
    }
}

/// Totals for one [`RenderScheduler::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Frames composed and sent.
    pub frames: u64,
    /// Frames with at least one failed write.
    pub draw_failures: u64,
    /// Status cycle counters.
    pub status: StatusStats,
    /// Bus counters at the end of the run.
    pub bus: BusStats,
}

/// Wall-clock reading used for the clock face.
pub type Clock = fn() -> NaiveTime;

/// Local time of day.
pub fn local_time() -> NaiveTime {
    chrono::Local::now().time()
}

/// Owns the frame cycle and runs both cycles together.
pub struct RenderScheduler<T> {
    frame: FrameCycle<T>,
    opts: SchedulerOpts,
    clock: Clock,
}

impl<T: Transport> RenderScheduler<T> {
    /// Scheduler over `frame` with the given timing.
    pub fn new(frame: FrameCycle<T>, opts: SchedulerOpts) -> DisplayResult<Self> {
        opts.validate()?;
        Ok(Self {
            frame,
            opts,
            clock: local_time,
        })
    }

    /// Replace the time-of-day source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Timing in use.
    pub fn opts(&self) -> SchedulerOpts {
        self.opts
    }

    /// The frame cycle.
    pub fn frame_cycle(&self) -> &FrameCycle<T> {
        &self.frame
    }

    /// The frame cycle, mutably.
    pub fn frame_cycle_mut(&mut self) -> &mut FrameCycle<T> {
        &mut self.frame
    }

    /// Initialise the chain, wait for a first status, then draw frames until `max_frames` is
    /// reached. With no limit this only returns on a fatal error.
    ///
    /// Status failures and bus write failures are logged and never end the run.
    pub async fn run<S>(&mut self, source: S) -> DisplayResult<RunStats>
    where
        S: StatusSource + Send + 'static,
    {
        let geometry = self.frame.bus().geometry();
        tracing::info!(
            modules_x = geometry.width(),
            modules_y = geometry.height(),
            intensity = self.opts.intensity,
            status_ms = self.opts.status_interval.as_millis() as u64,
            frame_ms = self.opts.frame_interval.as_millis() as u64,
            "starting display"
        );
        let start_up = self.frame.bus_mut().start_up(self.opts.intensity);
        if !start_up.is_clean() {
            tracing::warn!(
                failed = start_up.failed,
                writes = start_up.writes,
                "chain start-up incomplete"
            );
        }

        let (cycle, mut rx) = StatusCycle::bootstrap(source, self.opts.status_interval).await;
        let status_task = tokio::spawn(cycle.run(self.opts.status_interval));

        let mut ticker = interval(self.opts.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let frames_before = self.frame.frames();
        let failures_before = self.frame.draw_failures();

        let drawn = loop {
            let drawn = self.frame.frames() - frames_before;
            if self.opts.max_frames.is_some_and(|max| drawn >= max) {
                break drawn;
            }
            ticker.tick().await;
            let snapshot = rx.borrow_and_update().clone();
            self.frame.tick(&snapshot, (self.clock)())?;
        };

        drop(rx);
        let status = status_task
            .await
            .map_err(|e| anyhow::anyhow!("status cycle task failed: {e}"))?;

        let stats = RunStats {
            frames: drawn,
            draw_failures: self.frame.draw_failures() - failures_before,
            status,
            bus: self.frame.bus().stats(),
        };
        tracing::info!(?stats, "display run finished");
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/scheduler.rs"]
mod tests;
