//! Frame composition: canvas, now-playing layout, marquee and PNG preview.

/// Monochrome `embedded-graphics` draw target.
pub mod canvas;
/// PNG preview of panel frames.
pub mod preview;
/// Now-playing layout.
pub mod scene;
/// Marquee offset.
pub mod scroll;
