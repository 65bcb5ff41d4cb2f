//! MAX7219 chain addressing: register map, bitmap encoding, wire framing and transports.

/// Bus writer and wire framing.
pub mod bus;
/// In-process chain model used for dry runs and previews.
pub mod emulator;
/// Bitmap to row-register encoding.
pub mod encoder;
/// Register map and register writes.
pub mod register;
/// Byte sinks for a chain.
pub mod transport;
