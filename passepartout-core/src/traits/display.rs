//! Display collaborator for the frame panel
//!
//! The core streams whole frames through [`FrameDisplay::open_window`] and
//! [`FrameDisplay::write_buffer`], and uses a handful of primitives to draw
//! menu overlays. Glyph rendering, line drawing and the panel protocol
//! live in the board crate.

/// Errors that can occur while driving the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer failed
    Communication,
    /// Window or primitive outside the panel
    InvalidCoordinates,
}

/// Packed RGB565 colors used by the menu renderer
pub mod color {
    pub const BLACK: u16 = 0x0000;
    pub const WHITE: u16 = 0xFFFF;
    pub const RED: u16 = 0xF800;
    pub const GREEN: u16 = 0x07E0;
    pub const GRAY: u16 = 0x8410;
}

/// Pixel rectangle on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Frame panel with backlight
pub trait FrameDisplay {
    /// Panel width in pixels (current orientation)
    fn width(&self) -> u16;

    /// Panel height in pixels (current orientation)
    fn height(&self) -> u16;

    /// Total pixel count
    fn size(&self) -> u32 {
        self.width() as u32 * self.height() as u32
    }

    /// Open a write window; subsequent buffers fill it in scan order
    fn open_window(&mut self, area: Rect) -> Result<(), DisplayError>;

    /// Write packed RGB565 pixels into the open window
    fn write_buffer(&mut self, pixels: &[u16]) -> Result<(), DisplayError>;

    /// Set the backlight PWM level immediately
    fn set_backlight(&mut self, level: u8);

    /// Latch the level that [`FrameDisplay::restore_backlight`] returns to
    fn set_default_backlight(&mut self, level: u8);

    /// Currently latched default level
    fn default_backlight(&self) -> u8;

    /// Return the backlight to the latched default
    fn restore_backlight(&mut self) {
        let level = self.default_backlight();
        self.set_backlight(level);
    }

    /// Fill a rectangle with one color
    fn fill_rect(&mut self, area: Rect, color: u16) -> Result<(), DisplayError>;

    /// Draw a line of text with its top-left corner at `(x, y)`
    fn draw_text(&mut self, x: u16, y: u16, text: &str, color: u16) -> Result<(), DisplayError>;

    /// Fill the whole panel
    fn clear(&mut self, color: u16) -> Result<(), DisplayError> {
        let area = Rect::new(0, 0, self.width(), self.height());
        self.fill_rect(area, color)
    }
}
