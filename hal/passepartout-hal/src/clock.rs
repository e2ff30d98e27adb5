//! Timing abstraction
//!
//! The frame runs a single cooperative loop. Every deadline (display
//! duration, debounce window, scheduled turn-off) is compared against the
//! monotonic millisecond counter exposed here. Blocking waits (intro
//! screen, backlight ramps, calibration settle time) take an
//! [`embedded_hal::delay::DelayNs`] instead.

/// Monotonic millisecond clock
///
/// The counter is expected to wrap after ~49 days like a 32-bit tick
/// counter. Compare instants through [`Clock::elapsed_since`], which is
/// correct across the wrap.
pub trait Clock {
    /// Milliseconds since boot
    fn now_ms(&self) -> u32;

    /// Milliseconds elapsed since `since`
    fn elapsed_since(&self, since: u32) -> u32 {
        self.now_ms().wrapping_sub(since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u32);

    impl Clock for Fixed {
        fn now_ms(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(Fixed(5).elapsed_since(u32::MAX - 4), 10);
        assert_eq!(Fixed(1500).elapsed_since(500), 1000);
    }
}
