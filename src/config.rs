use std::{path::PathBuf, time::Duration};

use crate::{
    foundation::core::ChainGeometry,
    foundation::error::{DisplayError, DisplayResult},
    matrix::encoder::{AddressingEncoder, ColumnOrder},
    render::scene::SceneOpts,
    scheduler::SchedulerOpts,
    status::source::{DEFAULT_FETCH_TIMEOUT, MpcStatusSource},
};

/// Everything needed to drive one panel.
///
/// The library never reads this from disk; callers build it (the binary does so from flags).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Modules per row.
    pub modules_x: u32,
    /// Module rows.
    pub modules_y: u32,
    /// spidev node.
    pub spi_device: PathBuf,
    /// SPI clock in Hz.
    pub spi_speed_hz: u32,
    /// Brightness, `0..=15`.
    pub intensity: u8,
    /// Row byte packing.
    pub column_order: ColumnOrder,
    /// Status program.
    pub status_program: String,
    /// Passed as `-h <host>` when set.
    pub mpd_host: Option<String>,
    /// Passed as `-p <port>` when set.
    pub mpd_port: Option<u16>,
    /// Status refresh period.
    pub status_interval: Duration,
    /// Frame period.
    pub frame_interval: Duration,
    /// Limit for one status program run.
    pub fetch_timeout: Duration,
    /// Draw the seconds bar.
    pub seconds_indicator: bool,
    /// Draw the play/pause icon.
    pub state_indicator: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            modules_x: 4,
            modules_y: 2,
            spi_device: PathBuf::from("/dev/spidev0.0"),
            spi_speed_hz: 8_000_000,
            intensity: 1,
            column_order: ColumnOrder::MsbFirst,
            status_program: "mpc".to_string(),
            mpd_host: None,
            mpd_port: None,
            status_interval: Duration::from_millis(500),
            frame_interval: Duration::from_millis(50),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            seconds_indicator: false,
            state_indicator: false,
        }
    }
}

impl PanelConfig {
    /// Check every field; the first problem found is returned.
    pub fn validate(&self) -> DisplayResult<()> {
        self.geometry()?;
        if self.modules_y < 2 {
            return Err(DisplayError::validation(
                "the now-playing layout needs at least 2 module rows",
            ));
        }
        if self.intensity > 0x0F {
            return Err(DisplayError::validation(format!(
                "intensity must be 0..=15, got {}",
                self.intensity
            )));
        }
        if self.spi_speed_hz == 0 {
            return Err(DisplayError::validation("SPI speed must be non-zero"));
        }
        if self.status_program.trim().is_empty() {
            return Err(DisplayError::validation("status program must be set"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(DisplayError::validation("fetch timeout must be non-zero"));
        }
        self.scheduler_opts(None).validate()
    }

    /// Chain shape.
    pub fn geometry(&self) -> DisplayResult<ChainGeometry> {
        ChainGeometry::new(self.modules_x, self.modules_y)
    }

    /// Encoder for this chain.
    pub fn encoder(&self) -> DisplayResult<AddressingEncoder> {
        Ok(AddressingEncoder::new(self.geometry()?).with_column_order(self.column_order))
    }

    /// Layout options.
    pub fn scene_opts(&self) -> SceneOpts {
        SceneOpts {
            seconds_indicator: self.seconds_indicator,
            state_indicator: self.state_indicator,
        }
    }

    /// Scheduler timing, optionally bounded to `max_frames`.
    pub fn scheduler_opts(&self, max_frames: Option<u64>) -> SchedulerOpts {
        SchedulerOpts {
            status_interval: self.status_interval,
            frame_interval: self.frame_interval,
            intensity: self.intensity,
            max_frames,
        }
    }

    /// `mpc` invocation for this configuration.
    pub fn status_source(&self) -> MpcStatusSource {
        let mut source = MpcStatusSource::new(self.status_program.clone())
            .with_timeout(self.fetch_timeout);
        if let Some(host) = &self.mpd_host {
            source = source.with_host(host.clone());
        }
        if let Some(port) = self.mpd_port {
            source = source.with_port(port);
        }
        source
    }

    /// spidev options.
    #[cfg(feature = "spi")]
    pub fn spi_opts(&self) -> crate::matrix::transport::SpiOpts {
        crate::matrix::transport::SpiOpts {
            device: self.spi_device.clone(),
            max_speed_hz: self.spi_speed_hz,
        }
    }
}
