//! Menu overlays
//!
//! Drawn on top of the menu background images. Every label sits in the
//! touch band that triggers it, so the layout follows the band geometry.

use core::fmt::Write as _;

use heapless::String;

use super::stats::FrameStats;
use crate::selection::SelectionMode;
use crate::touch::{band_rect, BACK_BAND};
use crate::traits::{color, DisplayError, FrameDisplay, Rect};

/// Left inset of labels (px)
const LABEL_X: u16 = 12;

/// Offset of a label below its band's top edge (px)
const LABEL_DY: u16 = 8;

/// Height of the level bar (px)
const BAR_HEIGHT: u16 = 16;

type Line = String<48>;

fn label<D: FrameDisplay>(display: &mut D, band: u8, text: &str, fg: u16) -> Result<(), DisplayError> {
    let area = band_rect(band, display.width(), display.height());
    display.draw_text(LABEL_X, area.y + LABEL_DY, text, fg)
}

/// Main menu: one entry per band plus the statistics line
pub fn render_main<D: FrameDisplay>(
    display: &mut D,
    stats: &FrameStats,
    total_images: u16,
) -> Result<(), DisplayError> {
    label(display, 0, "Brightness", color::WHITE)?;
    label(display, 1, "Display time", color::WHITE)?;
    label(display, 2, "Mode", color::WHITE)?;
    label(display, 3, "Turn off", color::WHITE)?;
    label(display, BACK_BAND, "Back", color::WHITE)?;

    let mut line = Line::new();
    let _ = write!(
        line,
        "{}/{} shown, {} bad, {} ms",
        stats.images_displayed(),
        total_images,
        stats.invalid_images(),
        stats.average_load_ms()
    );
    let area = band_rect(BACK_BAND, display.width(), display.height());
    display.draw_text(LABEL_X, area.y + area.height / 2, &line, color::GRAY)
}

/// Level editor: down/up bands, a bar and the current value
pub fn render_level<D: FrameDisplay>(
    display: &mut D,
    level: u8,
    levels: u8,
    value: &str,
) -> Result<(), DisplayError> {
    label(display, 0, "Down", color::WHITE)?;
    label(display, 3, "Up", color::WHITE)?;
    label(display, BACK_BAND, "Back", color::WHITE)?;

    let width = display.width();
    let middle = band_rect(2, width, display.height());
    let inner = width.saturating_sub(2 * LABEL_X);
    let filled = if levels == 0 {
        0
    } else {
        (inner as u32 * (level as u32 + 1) / levels as u32) as u16
    };

    let bar_y = middle.y + LABEL_DY;
    display.fill_rect(Rect::new(LABEL_X, bar_y, filled, BAR_HEIGHT), color::GREEN)?;
    display.fill_rect(
        Rect::new(LABEL_X + filled, bar_y, inner - filled, BAR_HEIGHT),
        color::GRAY,
    )?;
    display.draw_text(LABEL_X, bar_y + BAR_HEIGHT + LABEL_DY, value, color::WHITE)
}

/// Mode chooser with the active mode highlighted
pub fn render_modes<D: FrameDisplay>(display: &mut D, current: SelectionMode) -> Result<(), DisplayError> {
    for (band, mode) in SelectionMode::ALL.into_iter().enumerate() {
        let fg = if mode == current { color::RED } else { color::WHITE };
        label(display, band as u8, mode.label(), fg)?;
    }
    label(display, BACK_BAND, "Back", color::WHITE)
}

/// Turn-off editor: delay value, cancel on the left, start on the right
pub fn render_turn_off<D: FrameDisplay>(
    display: &mut D,
    level: u8,
    levels: u8,
    delay_min: u16,
) -> Result<(), DisplayError> {
    let mut value = Line::new();
    let _ = write!(value, "Off in {} min", delay_min);
    render_level(display, level, levels, &value)?;

    // Replace the plain "Back" with the two choices
    let area = band_rect(BACK_BAND, display.width(), display.height());
    display.fill_rect(area, color::BLACK)?;
    display.draw_text(LABEL_X, area.y + LABEL_DY, "Cancel", color::WHITE)?;
    display.draw_text(area.width / 2 + LABEL_X, area.y + LABEL_DY, "Start", color::GREEN)
}

/// Terminal storage error screen
pub fn render_error<D: FrameDisplay>(display: &mut D) -> Result<(), DisplayError> {
    display.clear(color::BLACK)?;
    label(display, 2, "SD card error", color::RED)?;
    label(display, 1, "Touch to restart", color::WHITE)
}

/// "5 s", "15 min", "1 h"
pub fn format_duration(seconds: u16) -> Line {
    let mut line = Line::new();
    let _ = if seconds >= 3600 && seconds % 3600 == 0 {
        write!(line, "{} h", seconds / 3600)
    } else if seconds >= 60 && seconds % 60 == 0 {
        write!(line, "{} min", seconds / 60)
    } else {
        write!(line, "{} s", seconds)
    };
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Bench, DisplayOp};

    #[test]
    fn test_durations() {
        assert_eq!(format_duration(5).as_str(), "5 s");
        assert_eq!(format_duration(300).as_str(), "5 min");
        assert_eq!(format_duration(90).as_str(), "90 s");
        assert_eq!(format_duration(3600).as_str(), "1 h");
    }

    #[test]
    fn test_mode_highlight() {
        let bench = Bench::new(320, 480);
        render_modes(&mut bench.display(), SelectionMode::InOrder).unwrap();
        assert_eq!(bench.texts(), ["Random", "In order", "Only current", "Back"]);
    }

    #[test]
    fn test_level_bar_fills_proportionally() {
        let bench = Bench::new(320, 480);
        render_level(&mut bench.display(), 4, 10, "5").unwrap();

        let fills: std::vec::Vec<Rect> = bench
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                DisplayOp::Fill(r, _) => Some(r),
                _ => None,
            })
            .collect();
        // 296 px wide bar, half filled
        assert_eq!(fills[0].width, 148);
        assert_eq!(fills[0].width + fills[1].width, 296);
    }

    #[test]
    fn test_main_menu_shows_stats() {
        let bench = Bench::new(320, 480);
        let mut stats = FrameStats::default();
        stats.record_load(120);
        stats.record_invalid(1);
        render_main(&mut bench.display(), &stats, 7).unwrap();
        assert!(bench.texts().contains(&"1/7 shown, 1 bad, 120 ms".into()));
    }
}
