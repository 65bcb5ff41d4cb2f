use crate::foundation::error::{DisplayError, DisplayResult};

/// Byte sink for one chain. Bytes are shifted out most-significant bit first.
///
/// Contract: one call to [`Transport::transmit`] is one latched transmission; the chain sees the
/// whole slice between chip-select edges.
pub trait Transport {
    /// Send one frame of bytes.
    fn transmit(&mut self, bytes: &[u8]) -> DisplayResult<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn transmit(&mut self, bytes: &[u8]) -> DisplayResult<()> {
        (**self).transmit(bytes)
    }
}

/// Transport that records every transmission, for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    frames: Vec<Vec<u8>>,
    fail_next: usize,
}

impl InMemoryTransport {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` transmissions fail without being recorded.
    pub fn fail_next(&mut self, n: usize) {
        self.fail_next = n;
    }

    /// Borrow the recorded transmissions in order.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Transport for InMemoryTransport {
    fn transmit(&mut self, bytes: &[u8]) -> DisplayResult<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(DisplayError::transport("injected failure"));
        }
        self.frames.push(bytes.to_vec());
        Ok(())
    }
}

#[cfg(feature = "spi")]
pub use self::spi::{SpiOpts, SpiTransport};

#[cfg(feature = "spi")]
mod spi {
    use std::path::{Path, PathBuf};

    use embedded_hal::spi::SpiDevice;
    use linux_embedded_hal::{
        SpidevDevice,
        spidev::{SpiModeFlags, SpidevOptions},
    };

    use super::Transport;
    use crate::foundation::error::{DisplayError, DisplayResult};

    /// Options for opening a Linux spidev node.
    #[derive(Clone, Debug)]
    pub struct SpiOpts {
        /// Device node, e.g. `/dev/spidev0.0`.
        pub device: PathBuf,
        /// Clock speed in Hz.
        pub max_speed_hz: u32,
    }

    impl Default for SpiOpts {
        fn default() -> Self {
            Self {
                device: PathBuf::from("/dev/spidev0.0"),
                max_speed_hz: 8_000_000,
            }
        }
    }

    /// Transport over a Linux spidev device (`linux-embedded-hal`).
    pub struct SpiTransport {
        spi: SpidevDevice,
        device: PathBuf,
    }

    impl SpiTransport {
        /// Open and configure the device: 8-bit words, mode 0, MSB first.
        pub fn open(opts: &SpiOpts) -> DisplayResult<Self> {
            let mut spi = SpidevDevice::open(&opts.device).map_err(|e| {
                DisplayError::transport(format!(
                    "failed to open SPI device '{}': {e:?}",
                    opts.device.display()
                ))
            })?;
            let options = SpidevOptions::new()
                .bits_per_word(8)
                .max_speed_hz(opts.max_speed_hz)
                .lsb_first(false)
                .mode(SpiModeFlags::SPI_MODE_0)
                .build();
            spi.configure(&options).map_err(|e| {
                DisplayError::transport(format!(
                    "failed to configure SPI device '{}': {e}",
                    opts.device.display()
                ))
            })?;
            tracing::info!(device = %opts.device.display(), hz = opts.max_speed_hz, "SPI device opened");
            Ok(Self {
                spi,
                device: opts.device.clone(),
            })
        }

        /// Device node this transport writes to.
        pub fn device(&self) -> &Path {
            &self.device
        }
    }

    impl Transport for SpiTransport {
        fn transmit(&mut self, bytes: &[u8]) -> DisplayResult<()> {
            SpiDevice::write(&mut self.spi, bytes).map_err(|e| {
                DisplayError::transport(format!(
                    "SPI write to '{}' failed: {e:?}",
                    self.device.display()
                ))
            })
        }
    }
}
