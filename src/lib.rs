#![forbid(unsafe_code)]

pub mod config;
mod foundation;
pub mod matrix;
pub mod render;
pub mod scheduler;
pub mod status;

pub use config::PanelConfig;
pub use foundation::core::{ChainGeometry, MODULE_SIZE, PixelBuffer};
pub use foundation::error::{DisplayError, DisplayResult};
pub use matrix::bus::{BusStats, BusWriter, DrawOutcome, wire_frame};
pub use matrix::emulator::{ChainEmulator, ModuleState};
pub use matrix::encoder::{AddressingEncoder, ColumnOrder, row_byte};
pub use matrix::register::{Register, RegisterWrite, Targets};
#[cfg(feature = "spi")]
pub use matrix::transport::{SpiOpts, SpiTransport};
pub use matrix::transport::{InMemoryTransport, Transport};
pub use render::canvas::Canvas;
pub use render::preview::{PreviewImage, PreviewOpts, render_preview, save_png};
pub use render::scene::{ClockDigest, Scene, SceneOpts};
pub use render::scroll::ScrollState;
pub use scheduler::{
    FrameCycle, RenderScheduler, RunStats, SchedulerOpts, Snapshot, StatusCycle, StatusStats,
};
pub use status::model::PlaybackStatus;
pub use status::parser::{StatusParseError, StatusPattern, parse_status};
pub use status::source::{FileStatusSource, MpcStatusSource, ScriptedStatusSource, StatusSource};
