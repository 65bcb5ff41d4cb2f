use std::collections::BTreeSet;

use crate::foundation::error::{DisplayError, DisplayResult};

/// MAX7219 register addresses. Values are wire-level and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Register {
    /// No-op; a module receiving `[NOOP, 0]` ignores the transmission.
    Noop = 0x0,
    /// Bottom pixel row of a module.
    Digit0 = 0x1,
    Digit1 = 0x2,
    Digit2 = 0x3,
    Digit3 = 0x4,
    Digit4 = 0x5,
    Digit5 = 0x6,
    Digit6 = 0x7,
    /// Top pixel row of a module.
    Digit7 = 0x8,
    /// BCD decode per digit; `0` for raw matrix use.
    DecodeMode = 0x9,
    /// Brightness, `0..=15`.
    Intensity = 0xA,
    /// Number of scanned digits minus one.
    ScanLimit = 0xB,
    /// `0` = shutdown, `1` = normal operation.
    Shutdown = 0xC,
    /// `1` lights every LED.
    DisplayTest = 0xF,
}

impl Register {
    /// The eight row registers, bottom (`Digit0`) to top (`Digit7`).
    pub const DIGITS: [Register; 8] = [
        Register::Digit0,
        Register::Digit1,
        Register::Digit2,
        Register::Digit3,
        Register::Digit4,
        Register::Digit5,
        Register::Digit6,
        Register::Digit7,
    ];

    /// Row register `DIGITn`.
    pub fn digit(n: u8) -> DisplayResult<Self> {
        Self::DIGITS
            .get(n as usize)
            .copied()
            .ok_or_else(|| DisplayError::validation(format!("DIGIT{n} does not exist")))
    }

    /// Row register for visual row `row`, counted from the top of a module.
    pub fn for_row(row: u8) -> DisplayResult<Self> {
        if row > 7 {
            return Err(DisplayError::validation(format!(
                "module row {row} is outside 0..8"
            )));
        }
        Self::digit(7 - row)
    }

    /// Wire address.
    pub fn addr(self) -> u8 {
        self as u8
    }

    /// Decode a wire address.
    pub fn from_addr(addr: u8) -> Option<Self> {
        Some(match addr {
            0x0 => Self::Noop,
            0x1..=0x8 => Self::DIGITS[(addr - 1) as usize],
            0x9 => Self::DecodeMode,
            0xA => Self::Intensity,
            0xB => Self::ScanLimit,
            0xC => Self::Shutdown,
            0xF => Self::DisplayTest,
            _ => return None,
        })
    }

    /// `true` for `Digit0..=Digit7`.
    pub fn is_digit(self) -> bool {
        (0x1..=0x8).contains(&self.addr())
    }
}

/// Which modules of the chain a write addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Targets {
    /// Every module.
    All,
    /// Only these chain indices; every other module receives a no-op.
    Only(BTreeSet<usize>),
}

impl Targets {
    /// Address a single module.
    pub fn single(index: usize) -> Self {
        Self::Only(BTreeSet::from([index]))
    }

    /// Address a set of modules.
    pub fn subset(indices: impl IntoIterator<Item = usize>) -> Self {
        Self::Only(indices.into_iter().collect())
    }

    /// `true` when the module at `index` is addressed.
    pub fn contains(&self, index: usize) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.contains(&index),
        }
    }

    /// Check every index against a chain of `module_count` modules.
    pub fn validate(&self, module_count: usize) -> DisplayResult<()> {
        if let Self::Only(set) = self
            && let Some(&bad) = set.iter().find(|&&i| i >= module_count)
        {
            return Err(DisplayError::validation(format!(
                "target module {bad} is outside a chain of {module_count}"
            )));
        }
        Ok(())
    }
}

/// One register assignment fanned out over the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Register to set.
    pub register: Register,
    /// Value to store.
    pub value: u8,
    /// Modules that take the value.
    pub targets: Targets,
}

impl RegisterWrite {
    /// Write `value` to `register` on every module.
    pub fn all(register: Register, value: u8) -> Self {
        Self {
            register,
            value,
            targets: Targets::All,
        }
    }

    /// Write `value` to `register` on one module.
    pub fn to_module(register: Register, value: u8, index: usize) -> Self {
        Self {
            register,
            value,
            targets: Targets::single(index),
        }
    }
}

/// Registers sent to every module once at startup, in order.
pub fn startup_sequence(intensity: u8) -> [RegisterWrite; 5] {
    [
        RegisterWrite::all(Register::ScanLimit, 7),
        RegisterWrite::all(Register::DecodeMode, 0),
        RegisterWrite::all(Register::DisplayTest, 0),
        RegisterWrite::all(Register::Shutdown, 1),
        RegisterWrite::all(Register::Intensity, intensity),
    ]
}

/// Writes that blank every row of every module.
pub fn clear_sequence() -> impl Iterator<Item = RegisterWrite> {
    Register::DIGITS
        .into_iter()
        .map(|r| RegisterWrite::all(r, 0))
}
