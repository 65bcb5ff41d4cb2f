/// Marquee position for the title line.
///
/// The text is drawn at `offset`, then the offset moves one pixel left. Once the text has fully
/// left the panel it re-enters from the right edge. A new title does not restart the marquee.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollState {
    offset: i32,
    panel_width: i32,
    text_width: u32,
}

impl ScrollState {
    /// Marquee starting just off the right edge of a `panel_width` wide panel.
    pub fn new(panel_width: u32) -> Self {
        let panel_width = panel_width as i32;
        Self {
            offset: panel_width,
            panel_width,
            text_width: 0,
        }
    }

    /// Where the text is drawn this frame.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Width measured on the last [`ScrollState::advance`].
    pub fn text_width(&self) -> u32 {
        self.text_width
    }

    /// Start value the offset wraps to.
    pub fn panel_width(&self) -> i32 {
        self.panel_width
    }

    /// Step one pixel left after a frame that drew `text_width` pixels of text.
    pub fn advance(&mut self, text_width: u32) {
        self.text_width = text_width;
        self.offset -= 1;
        if self.offset + (text_width as i32) < 0 {
            self.offset = self.panel_width;
        }
    }
}
