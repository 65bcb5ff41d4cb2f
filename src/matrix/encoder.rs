use crate::{
    foundation::core::{ChainGeometry, MODULE_SIZE, PixelBuffer},
    foundation::error::{DisplayError, DisplayResult},
    matrix::register::{Register, RegisterWrite},
};

/// How the eight pixels of a module row are packed into a row register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnOrder {
    /// Leftmost pixel in bit 7.
    #[default]
    MsbFirst,
    /// Leftmost pixel in bit 0, for modules mounted mirrored.
    LsbFirst,
}

/// Pack eight pixels into one row byte; bit `7 - i` holds pixel `i`.
///
/// Slices shorter than eight pixels leave the missing low bits dark.
pub fn row_byte(pixels: &[bool]) -> u8 {
    pixels
        .iter()
        .take(8)
        .enumerate()
        .fold(0u8, |acc, (i, &lit)| if lit { acc | (0x80 >> i) } else { acc })
}

/// Maps whole-panel bitmaps onto per-module row register writes.
#[derive(Clone, Copy, Debug)]
pub struct AddressingEncoder {
    geometry: ChainGeometry,
    order: ColumnOrder,
}

impl AddressingEncoder {
    /// Encoder for `geometry` with the default column order.
    pub fn new(geometry: ChainGeometry) -> Self {
        Self {
            geometry,
            order: ColumnOrder::MsbFirst,
        }
    }

    /// Override the column order.
    pub fn with_column_order(mut self, order: ColumnOrder) -> Self {
        self.order = order;
        self
    }

    /// Geometry this encoder addresses.
    pub fn geometry(&self) -> ChainGeometry {
        self.geometry
    }

    /// Packed byte for one module row, honouring the column order.
    pub fn pack(&self, pixels: &[bool]) -> u8 {
        match self.order {
            ColumnOrder::MsbFirst => row_byte(pixels),
            ColumnOrder::LsbFirst => row_byte(pixels).reverse_bits(),
        }
    }

    /// Encode a full frame: eight row writes per module, each addressed to one chain index.
    ///
    /// Writes are ordered by module column, then module row, then pixel row from the top.
    #[tracing::instrument(level = "trace", skip_all, fields(modules = self.geometry.module_count()))]
    pub fn encode(&self, buffer: &PixelBuffer) -> DisplayResult<Vec<RegisterWrite>> {
        if !buffer.matches(self.geometry) {
            return Err(DisplayError::validation(format!(
                "pixel buffer is {}x{}, chain expects {}x{}",
                buffer.width(),
                buffer.height(),
                self.geometry.pixel_width(),
                self.geometry.pixel_height()
            )));
        }

        let width = self.geometry.width() as usize;
        let pixels = buffer.pixels();
        let mut writes = Vec::with_capacity(self.geometry.module_count() * 8);

        for x in 0..self.geometry.width() {
            for y in 0..self.geometry.height() {
                let device = self.geometry.chain_index(x, y)?;
                for row in 0..MODULE_SIZE as u8 {
                    // Skip full module rows, then whole pixel rows, then earlier modules.
                    let index = x as usize * 8 + y as usize * width * 64 + row as usize * width * 8;
                    let value = self.pack(&pixels[index..index + 8]);
                    writes.push(RegisterWrite::to_module(
                        Register::for_row(row)?,
                        value,
                        device,
                    ));
                }
            }
        }

        Ok(writes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/matrix/encoder.rs"]
mod tests;
