use crate::{
    foundation::core::{ChainGeometry, PixelBuffer},
    foundation::error::DisplayResult,
    matrix::encoder::AddressingEncoder,
    matrix::register::{Register, RegisterWrite, Targets, clear_sequence, startup_sequence},
    matrix::transport::Transport,
};

/// Wire frame for one register write over a chain of `device_count` modules.
///
/// Always `2 * device_count` bytes, chain index 0 first. Addressed modules get
/// `[register, value]`, the rest get `[NOOP, 0]`.
pub fn wire_frame(write: &RegisterWrite, device_count: usize) -> DisplayResult<Vec<u8>> {
    write.targets.validate(device_count)?;
    let mut bytes = Vec::with_capacity(device_count * 2);
    for device in 0..device_count {
        if write.targets.contains(device) {
            bytes.extend_from_slice(&[write.register.addr(), write.value]);
        } else {
            bytes.extend_from_slice(&[Register::Noop.addr(), 0]);
        }
    }
    Ok(bytes)
}

/// Running transmission counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Frames the transport accepted.
    pub frames_sent: u64,
    /// Frames the transport rejected.
    pub frames_failed: u64,
}

/// Result of pushing a batch of register writes, such as one full bitmap, to the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawOutcome {
    /// Register writes attempted.
    pub writes: usize,
    /// Writes the transport rejected; the remaining writes were still sent.
    pub failed: usize,
}

impl DrawOutcome {
    /// `true` when every write went out.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    fn merge(self, other: Self) -> Self {
        Self {
            writes: self.writes + other.writes,
            failed: self.failed + other.failed,
        }
    }
}

/// Serializes register writes for one chain and hands them to a [`Transport`].
pub struct BusWriter<T> {
    transport: T,
    encoder: AddressingEncoder,
    stats: BusStats,
}

impl<T: Transport> BusWriter<T> {
    /// Writer for a chain shaped like `encoder.geometry()`.
    pub fn new(transport: T, encoder: AddressingEncoder) -> Self {
        Self {
            transport,
            encoder,
            stats: BusStats::default(),
        }
    }

    /// Chain geometry.
    pub fn geometry(&self) -> ChainGeometry {
        self.encoder.geometry()
    }

    /// Counters since construction.
    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Send one register write.
    ///
    /// Transport failures come back as [`crate::DisplayError::Transport`]; nothing is retried and the
    /// writer stays usable.
    pub fn write(&mut self, write: &RegisterWrite) -> DisplayResult<()> {
        let bytes = wire_frame(write, self.geometry().module_count())?;
        match self.transport.transmit(&bytes) {
            Ok(()) => {
                self.stats.frames_sent += 1;
                Ok(())
            }
            Err(e) => {
                self.stats.frames_failed += 1;
                Err(e)
            }
        }
    }

    /// Set `register` to `value` on every module.
    pub fn write_all(&mut self, register: Register, value: u8) -> DisplayResult<()> {
        self.write(&RegisterWrite::all(register, value))
    }

    /// Set `register` to `value` on the listed modules only.
    pub fn write_to(
        &mut self,
        register: Register,
        value: u8,
        modules: impl IntoIterator<Item = usize>,
    ) -> DisplayResult<()> {
        self.write(&RegisterWrite {
            register,
            value,
            targets: Targets::subset(modules),
        })
    }

    /// One-time initialisation followed by a clear.
    ///
    /// Every write is attempted even when an earlier one fails.
    pub fn start_up(&mut self, intensity: u8) -> DrawOutcome {
        let init = self.send_each(startup_sequence(clamp_intensity(intensity)), "start-up");
        init.merge(self.clear())
    }

    /// Blank every row of every module. Failed rows are logged and counted.
    pub fn clear(&mut self) -> DrawOutcome {
        self.send_each(clear_sequence(), "clear")
    }

    /// Change brightness on every module.
    pub fn set_intensity(&mut self, intensity: u8) -> DisplayResult<()> {
        self.write_all(Register::Intensity, clamp_intensity(intensity))
    }

    /// Encode `buffer` and send every row write.
    ///
    /// A failing write is logged and counted; the rest of the frame is still sent. Only a buffer
    /// that does not fit the chain is an error.
    pub fn draw(&mut self, buffer: &PixelBuffer) -> DisplayResult<DrawOutcome> {
        let writes = self.encoder.encode(buffer)?;
        Ok(self.send_each(writes, "row"))
    }

    fn send_each(
        &mut self,
        writes: impl IntoIterator<Item = RegisterWrite>,
        phase: &'static str,
    ) -> DrawOutcome {
        let mut outcome = DrawOutcome::default();
        for write in writes {
            outcome.writes += 1;
            if let Err(e) = self.write(&write) {
                outcome.failed += 1;
                tracing::warn!(
                    phase,
                    register = ?write.register,
                    error = %e,
                    "dropping register write"
                );
            }
        }
        outcome
    }
}

fn clamp_intensity(intensity: u8) -> u8 {
    if intensity > 0x0F {
        tracing::debug!(intensity, "intensity clamped to 15");
    }
    intensity.min(0x0F)
}

#[cfg(test)]
#[path = "../../tests/unit/matrix/bus.rs"]
mod tests;
