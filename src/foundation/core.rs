use crate::foundation::error::{DisplayError, DisplayResult};

/// Side length, in pixels, of one LED matrix module.
pub const MODULE_SIZE: u32 = 8;

/// Grid of chained 8x8 modules, measured in modules.
///
/// Modules are numbered row-major by module: chain index `x + y * width`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ChainGeometry {
    width: u32,
    height: u32,
}

impl ChainGeometry {
    /// Create a geometry of `width` x `height` modules.
    ///
    /// Both must be non-zero. Pixel dimensions must fit drawing coordinates (`i32`), and the pixel
    /// count and wire frame length must fit `usize`.
    pub fn new(width: u32, height: u32) -> DisplayResult<Self> {
        if width == 0 || height == 0 {
            return Err(DisplayError::validation(
                "chain geometry must have at least one module in each direction",
            ));
        }
        let too_large = || {
            DisplayError::validation(format!("a {width}x{height} module chain is too large"))
        };
        let pixel_side = |modules: u32| {
            modules
                .checked_mul(MODULE_SIZE)
                .filter(|&px| i32::try_from(px).is_ok())
                .ok_or_else(too_large)
        };
        let pixel_width = pixel_side(width)?;
        let pixel_height = pixel_side(height)?;
        (pixel_width as usize)
            .checked_mul(pixel_height as usize)
            .ok_or_else(too_large)?;
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|modules| modules.checked_mul(2))
            .ok_or_else(too_large)?;
        Ok(Self { width, height })
    }

    /// Modules per row.
    pub fn width(self) -> u32 {
        self.width
    }

    /// Module rows.
    pub fn height(self) -> u32 {
        self.height
    }

    /// Number of modules in the chain.
    pub fn module_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Panel width in pixels.
    pub fn pixel_width(self) -> u32 {
        self.width * MODULE_SIZE
    }

    /// Panel height in pixels.
    pub fn pixel_height(self) -> u32 {
        self.height * MODULE_SIZE
    }

    /// Chain index of the module at grid position `(x, y)`.
    pub fn chain_index(self, x: u32, y: u32) -> DisplayResult<usize> {
        if x >= self.width || y >= self.height {
            return Err(DisplayError::validation(format!(
                "module ({x}, {y}) is outside a {}x{} chain",
                self.width, self.height
            )));
        }
        Ok(x as usize + y as usize * self.width as usize)
    }
}

/// Monochrome frame for a whole panel, row-major in pixel coordinates, `true` = lit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl PixelBuffer {
    /// All-dark buffer sized for `geometry`.
    pub fn blank(geometry: ChainGeometry) -> Self {
        let width = geometry.pixel_width();
        let height = geometry.pixel_height();
        Self {
            width,
            height,
            pixels: vec![false; width as usize * height as usize],
        }
    }

    /// Wrap existing pixels. The length must match the geometry exactly.
    pub fn from_pixels(geometry: ChainGeometry, pixels: Vec<bool>) -> DisplayResult<Self> {
        let width = geometry.pixel_width();
        let height = geometry.pixel_height();
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(DisplayError::validation(format!(
                "pixel buffer has {} pixels, a {}x{} panel needs {expected}",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Flat row-major pixels.
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// `true` when this buffer has exactly the pixel size of `geometry`.
    pub fn matches(&self, geometry: ChainGeometry) -> bool {
        self.width == geometry.pixel_width() && self.height == geometry.pixel_height()
    }

    /// Read one pixel; out-of-range coordinates read as dark.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[self.index(x, y)]
    }

    /// Set one pixel; out-of-range coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32, lit: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.pixels[i] = lit;
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// Number of lit pixels.
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
