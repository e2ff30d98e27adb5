//! Frame statistics shown on the main menu

/// Frame-load times kept for the running average
pub const LOAD_HISTORY: usize = 5;

/// Counters collected while the frame runs
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    images_displayed: u32,
    invalid_images: u32,
    load_times: [u32; LOAD_HISTORY],
    next_slot: u8,
    filled: u8,
}

impl FrameStats {
    /// Count a completed full-frame load
    pub fn record_load(&mut self, elapsed_ms: u32) {
        self.images_displayed = self.images_displayed.saturating_add(1);
        self.load_times[self.next_slot as usize] = elapsed_ms;
        self.next_slot = (self.next_slot + 1) % LOAD_HISTORY as u8;
        if (self.filled as usize) < LOAD_HISTORY {
            self.filled += 1;
        }
    }

    /// Count invalid entries met while advancing
    pub fn record_invalid(&mut self, count: u16) {
        self.invalid_images = self.invalid_images.saturating_add(count as u32);
    }

    pub fn images_displayed(&self) -> u32 {
        self.images_displayed
    }

    pub fn invalid_images(&self) -> u32 {
        self.invalid_images
    }

    /// Mean of the last [`LOAD_HISTORY`] load times (0 before the first)
    pub fn average_load_ms(&self) -> u32 {
        if self.filled == 0 {
            return 0;
        }
        let recorded = &self.load_times[..self.filled as usize];
        let sum: u64 = recorded.iter().map(|&t| t as u64).sum();
        (sum / recorded.len() as u64) as u32
    }
}
