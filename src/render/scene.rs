use chrono::{NaiveTime, Timelike};
use embedded_graphics::text::{Alignment, Baseline};

use crate::{
    foundation::core::{ChainGeometry, MODULE_SIZE, PixelBuffer},
    foundation::error::{DisplayError, DisplayResult},
    render::canvas::Canvas,
    status::model::PlaybackStatus,
};

/// Pixel row of the progress bar.
pub const PROGRESS_ROW: i32 = 8;
/// Pixel row of the volume bar.
pub const VOLUME_ROW: i32 = 9;

/// Width in pixels of the play/pause icon.
pub const STATE_ICON_WIDTH: u32 = 3;

/// Wall-clock position within the current minute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockDigest {
    /// Seconds of the minute, `0..60`.
    pub seconds: u32,
}

impl ClockDigest {
    /// Digest of `now`.
    pub fn from_time(now: NaiveTime) -> Self {
        Self {
            seconds: now.second() % 60,
        }
    }

    /// Fraction of the minute elapsed, `0.0..1.0`.
    pub fn fraction(&self) -> f32 {
        self.seconds as f32 / 60.0
    }
}

/// Options for the now-playing layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneOpts {
    /// Draw a seconds bar along the top pixel row.
    pub seconds_indicator: bool,
    /// Draw a play or pause icon left of the clock.
    pub state_indicator: bool,
}

/// Now-playing layout.
///
/// ```text
/// rows 0..8   HH:MM, centered; optional play/pause icon at the left edge
/// row  8      progress bar
/// row  9      volume bar
/// last row    scrolling "<artist> - <song>", bottom aligned
/// ```
#[derive(Clone, Debug)]
pub struct Scene {
    canvas: Canvas,
    opts: SceneOpts,
}

impl Scene {
    /// Layout for `geometry`; needs at least two module rows.
    pub fn new(geometry: ChainGeometry, opts: SceneOpts) -> DisplayResult<Self> {
        if geometry.pixel_height() < 2 * MODULE_SIZE {
            return Err(DisplayError::validation(format!(
                "now-playing layout needs at least 2 module rows, got {}",
                geometry.height()
            )));
        }
        Ok(Self {
            canvas: Canvas::new(geometry),
            opts,
        })
    }

    /// Panel the layout is drawn for.
    pub fn geometry(&self) -> ChainGeometry {
        self.canvas.geometry()
    }

    /// Panel width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    /// Title width in pixels as it will be drawn.
    pub fn title_width(&self, status: &PlaybackStatus) -> u32 {
        self.canvas.measure(&status.title())
    }

    /// Compose one frame.
    pub fn compose(&mut self, status: &PlaybackStatus, now: NaiveTime, offset: i32) -> PixelBuffer {
        let width = self.canvas.width();
        let height = self.canvas.height() as i32;
        let c = &mut self.canvas;
        c.clear();

        if self.opts.seconds_indicator {
            let digest = ClockDigest::from_time(now);
            c.fill_rect(0, 0, bar_len(width, digest.fraction()), 1);
        }

        let clock = now.format("%H:%M").to_string();
        if self.opts.state_indicator {
            // Skipped when the panel is too narrow to keep the icon clear of the clock.
            let clock_left = (width / 2).saturating_sub(c.measure(&clock) / 2);
            if clock_left > STATE_ICON_WIDTH {
                draw_state_icon(c, status.playing);
            }
        }
        c.text(
            &clock,
            (width / 2) as i32,
            MODULE_SIZE as i32 - 1,
            Alignment::Center,
            Baseline::Bottom,
        );
        c.fill_rect(0, PROGRESS_ROW, bar_len(width, status.progress), 1);
        c.fill_rect(0, VOLUME_ROW, bar_len(width, status.volume), 1);
        c.text(
            &status.title(),
            offset,
            height - 1,
            Alignment::Left,
            Baseline::Bottom,
        );

        c.snapshot()
    }
}

/// Play triangle or pause bars in columns `0..3`, rows `2..7`.
fn draw_state_icon(c: &mut Canvas, playing: bool) {
    if playing {
        c.fill_rect(0, 2, 1, 5);
        c.fill_rect(1, 3, 1, 3);
        c.fill_rect(2, 4, 1, 1);
    } else {
        c.fill_rect(0, 2, 1, 5);
        c.fill_rect(2, 2, 1, 5);
    }
}

/// `width * fraction`, truncated, with the fraction clamped to `0..=1`.
pub fn bar_len(width: u32, fraction: f32) -> u32 {
    (width as f32 * fraction.clamp(0.0, 1.0)) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
