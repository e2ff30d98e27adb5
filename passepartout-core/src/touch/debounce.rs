//! Touch rate limiting

/// Accepts a touch only after a quiet interval since the last accepted one
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    interval_ms: u32,
    last_accepted: Option<u32>,
}

impl Debounce {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_accepted: None,
        }
    }

    /// Decide whether a touch reported at `now_ms` counts
    ///
    /// Rejected touches do not extend the window.
    pub fn accept(&mut self, now_ms: u32) -> bool {
        if let Some(last) = self.last_accepted {
            if now_ms.wrapping_sub(last) < self.interval_ms {
                return false;
            }
        }
        self.last_accepted = Some(now_ms);
        true
    }
}
