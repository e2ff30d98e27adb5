//! BMP header validation
//!
//! Only one layout is accepted: `BITMAPINFOHEADER`, 24 bits per pixel,
//! no compression, dimensions equal to the panel in either orientation.
//!
//! Header layout (little-endian):
//! ```text
//! off  size  field
//!   0    2   magic "BM"
//!   2    4   file size          (ignored)
//!   6    4   reserved           (ignored)
//!  10    4   pixel data offset
//!  14    4   info header size   (ignored)
//!  18    4   width
//!  22    4   height
//!  26    2   color planes       (must be 1)
//!  28    2   bits per pixel     (must be 24)
//!  30    4   compression        (must be 0)
//! ```

/// Bytes read to validate an entry
pub const HEADER_LEN: usize = 34;

/// "BM" read as a little-endian u16
pub const BMP_MAGIC: u16 = 0x4D42;

/// Bit depth the pixel converter expects (B, G, R bytes)
pub const BITS_PER_PIXEL: u16 = 24;

/// Why an entry was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// File shorter than the header
    Truncated,
    /// Not a BMP file
    BadMagic,
    /// Color plane count is not 1
    BadPlanes,
    /// Not a 24-bit image
    BadBitDepth,
    /// Compressed pixel data
    Compressed,
    /// Size does not match the panel
    Dimensions { width: u32, height: u32 },
}

/// Parsed fields of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BmpHeader {
    pub magic: u16,
    pub data_offset: u32,
    pub width: u32,
    pub height: u32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
}

impl BmpHeader {
    /// Decode the fixed header fields
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Self {
        let u16_at = |off: usize| u16::from_le_bytes([bytes[off], bytes[off + 1]]);
        let u32_at = |off: usize| {
            u32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
        };

        Self {
            magic: u16_at(0),
            data_offset: u32_at(10),
            width: u32_at(18),
            height: u32_at(22),
            planes: u16_at(26),
            bits_per_pixel: u16_at(28),
            compression: u32_at(30),
        }
    }

    /// Check the header against the panel size
    ///
    /// Width and height are compared as an unordered pair, so a portrait
    /// file is accepted on a landscape panel declaration and vice versa.
    ///
    /// Only 24-bit files pass: the pixel reader consumes three bytes per
    /// pixel, so 16- and 32-bit files are rejected with
    /// [`FormatError::BadBitDepth`] even though their plane count is 1.
    pub fn validate(&self, panel_width: u16, panel_height: u16) -> Result<(), FormatError> {
        if self.magic != BMP_MAGIC {
            return Err(FormatError::BadMagic);
        }

        let (pw, ph) = (panel_width as u32, panel_height as u32);
        let same = self.width == pw && self.height == ph;
        let rotated = self.width == ph && self.height == pw;
        if !same && !rotated {
            return Err(FormatError::Dimensions {
                width: self.width,
                height: self.height,
            });
        }

        if self.planes != 1 {
            return Err(FormatError::BadPlanes);
        }
        if self.bits_per_pixel != BITS_PER_PIXEL {
            return Err(FormatError::BadBitDepth);
        }
        if self.compression != 0 {
            return Err(FormatError::Compressed);
        }

        Ok(())
    }
}

/// Pack 8-bit channels into RGB565
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    (((r >> 3) as u16) << 11) | (((g >> 2) as u16) << 5) | (b >> 3) as u16
}
