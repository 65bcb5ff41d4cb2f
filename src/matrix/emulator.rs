use crate::{
    foundation::core::{ChainGeometry, MODULE_SIZE, PixelBuffer},
    foundation::error::{DisplayError, DisplayResult},
    matrix::encoder::ColumnOrder,
    matrix::register::Register,
    matrix::transport::Transport,
};

/// Register file of one emulated driver chip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModuleState {
    /// Row registers, index 0 = `DIGIT0` (bottom row).
    pub digits: [u8; 8],
    /// `DECODEMODE` register.
    pub decode_mode: u8,
    /// `INTENSITY` register.
    pub intensity: u8,
    /// `SCANLIMIT` register.
    pub scan_limit: u8,
    /// `SHUTDOWN` register; `1` = running.
    pub shutdown: u8,
    /// `DISPLAYTEST` register.
    pub display_test: u8,
}

impl ModuleState {
    fn apply(&mut self, register: Register, value: u8) {
        match register {
            Register::Noop => {}
            Register::DecodeMode => self.decode_mode = value,
            Register::Intensity => self.intensity = value,
            Register::ScanLimit => self.scan_limit = value,
            Register::Shutdown => self.shutdown = value,
            Register::DisplayTest => self.display_test = value,
            digit => self.digits[(digit.addr() - 1) as usize] = value,
        }
    }

    /// `true` when the chip would show its row registers.
    pub fn is_running(&self) -> bool {
        self.shutdown == 1
    }
}

/// In-process model of a module chain, driven through [`Transport`].
///
/// Each transmission is split into per-module `[register, value]` pairs, chain index 0 first,
/// and applied to that module's register file. Used for dry runs and previews.
#[derive(Clone, Debug)]
pub struct ChainEmulator {
    geometry: ChainGeometry,
    order: ColumnOrder,
    modules: Vec<ModuleState>,
    transmissions: u64,
}

impl ChainEmulator {
    /// Fresh chain with every register at zero (powered down).
    pub fn new(geometry: ChainGeometry) -> Self {
        Self {
            geometry,
            order: ColumnOrder::MsbFirst,
            modules: vec![ModuleState::default(); geometry.module_count()],
            transmissions: 0,
        }
    }

    /// Column order used when reading rows back into pixels.
    pub fn with_column_order(mut self, order: ColumnOrder) -> Self {
        self.order = order;
        self
    }

    /// Register file of the module at chain index `index`.
    pub fn module(&self, index: usize) -> Option<&ModuleState> {
        self.modules.get(index)
    }

    /// Number of transmissions accepted.
    pub fn transmissions(&self) -> u64 {
        self.transmissions
    }

    /// Reconstruct the visible panel.
    ///
    /// Shut-down modules show nothing; display-test modules show every LED.
    pub fn to_pixel_buffer(&self) -> PixelBuffer {
        let mut buffer = PixelBuffer::blank(self.geometry);
        for y in 0..self.geometry.height() {
            for x in 0..self.geometry.width() {
                let index = x as usize + y as usize * self.geometry.width() as usize;
                let module = &self.modules[index];
                for row in 0..MODULE_SIZE {
                    let byte = if module.display_test == 1 {
                        0xFF
                    } else if module.is_running() {
                        module.digits[(7 - row) as usize]
                    } else {
                        0
                    };
                    for col in 0..MODULE_SIZE {
                        let bit = match self.order {
                            ColumnOrder::MsbFirst => 0x80 >> col,
                            ColumnOrder::LsbFirst => 0x01 << col,
                        };
                        if byte & bit != 0 {
                            buffer.set(x * MODULE_SIZE + col, y * MODULE_SIZE + row, true);
                        }
                    }
                }
            }
        }
        buffer
    }
}

impl Transport for ChainEmulator {
    fn transmit(&mut self, bytes: &[u8]) -> DisplayResult<()> {
        let expected = self.modules.len() * 2;
        if bytes.len() != expected {
            return Err(DisplayError::transport(format!(
                "chain of {} modules needs {expected} bytes per transmission, got {}",
                self.modules.len(),
                bytes.len()
            )));
        }
        // Decode the whole transmission first so a bad pair leaves every module untouched.
        let pairs = bytes
            .chunks_exact(2)
            .map(|pair| {
                Register::from_addr(pair[0])
                    .map(|register| (register, pair[1]))
                    .ok_or_else(|| {
                        DisplayError::transport(format!("unknown register address {:#x}", pair[0]))
                    })
            })
            .collect::<DisplayResult<Vec<_>>>()?;
        for (module, (register, value)) in self.modules.iter_mut().zip(pairs) {
            module.apply(register, value);
        }
        self.transmissions += 1;
        Ok(())
    }
}
