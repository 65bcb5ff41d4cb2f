//! Playback status: the record, its text grammar, and where it comes from.

/// The playback status record.
pub mod model;
/// Three-line status grammar.
pub mod parser;
/// Status sources (`mpc` subprocess, file, scripted).
pub mod source;
