use chrono::NaiveTime;

use crate::{
    foundation::core::PixelBuffer,
    foundation::error::{DisplayError, DisplayResult},
    matrix::bus::{BusWriter, DrawOutcome},
    matrix::transport::Transport,
    render::scene::Scene,
    render::scroll::ScrollState,
    status::model::PlaybackStatus,
};

/// Fast cycle: composes the now-playing frame and pushes it down the chain.
pub struct FrameCycle<T> {
    bus: BusWriter<T>,
    scene: Scene,
    scroll: ScrollState,
    frames: u64,
    draw_failures: u64,
}

impl<T: Transport> FrameCycle<T> {
    /// Pair a bus with a layout drawn for the same panel.
    pub fn new(bus: BusWriter<T>, scene: Scene) -> DisplayResult<Self> {
        let geometry = bus.geometry();
        if scene.geometry() != geometry {
            return Err(DisplayError::validation(format!(
                "layout is for {:?} but the chain is {:?}",
                scene.geometry(),
                geometry
            )));
        }
        Ok(Self {
            scroll: ScrollState::new(geometry.pixel_width()),
            bus,
            scene,
            frames: 0,
            draw_failures: 0,
        })
    }

    /// Draw the frame for `status` at `now` and step the marquee.
    pub fn compose(&mut self, status: &PlaybackStatus, now: NaiveTime) -> PixelBuffer {
        let frame = self.scene.compose(status, now, self.scroll.offset());
        self.scroll.advance(self.scene.title_width(status));
        frame
    }

    /// Compose and send one frame. Write failures are logged and counted, not returned.
    pub fn tick(&mut self, status: &PlaybackStatus, now: NaiveTime) -> DisplayResult<DrawOutcome> {
        let frame = self.compose(status, now);
        let outcome = self.bus.draw(&frame)?;
        self.frames += 1;
        if !outcome.is_clean() {
            self.draw_failures += 1;
            tracing::warn!(
                frame = self.frames,
                failed = outcome.failed,
                writes = outcome.writes,
                "frame partially delivered"
            );
        }
        Ok(outcome)
    }

    /// Marquee state.
    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    /// Frames sent so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames with at least one failed write.
    pub fn draw_failures(&self) -> u64 {
        self.draw_failures
    }

    /// The bus.
    pub fn bus(&self) -> &BusWriter<T> {
        &self.bus
    }

    /// The bus, mutably.
    pub fn bus_mut(&mut self) -> &mut BusWriter<T> {
        &mut self.bus
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/frame_cycle.rs"]
mod tests;
