//! Next-image decision

use super::shown::ShownSet;
use crate::traits::RandomSource;

/// How the next image is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SelectionMode {
    /// Shuffle without repeats inside a cycle
    #[default]
    Random = 0,
    /// Directory order, wrapping at the end
    InOrder = 1,
    /// Stay on the pinned image
    OnlyCurrent = 2,
}

impl SelectionMode {
    pub const ALL: [SelectionMode; 3] = [
        SelectionMode::Random,
        SelectionMode::InOrder,
        SelectionMode::OnlyCurrent,
    ];

    /// Decode a stored mode byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SelectionMode::Random),
            1 => Some(SelectionMode::InOrder),
            2 => Some(SelectionMode::OnlyCurrent),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SelectionMode::Random => "Random",
            SelectionMode::InOrder => "In order",
            SelectionMode::OnlyCurrent => "Only current",
        }
    }
}

/// What the image source should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Selection {
    /// Advance the directory cursor
    Next,
    /// Jump to a logical index
    Index(u16),
}

/// Selection state owned by the controller
#[derive(Debug, Clone)]
pub struct Selector {
    mode: SelectionMode,
    total: u16,
    shown: ShownSet,
}

impl Selector {
    pub fn new(total: u16, mode: SelectionMode) -> Self {
        Self {
            mode,
            total,
            shown: ShownSet::with_capacity(total),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        if mode != self.mode {
            debug!("Selection mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Number of images in the directory
    pub fn total(&self) -> u16 {
        self.total
    }

    pub fn shown(&self) -> &ShownSet {
        &self.shown
    }

    /// Pick the next image
    ///
    /// `pinned` is the index shown in [`SelectionMode::OnlyCurrent`].
    pub fn choose<R: RandomSource>(&mut self, rng: &mut R, pinned: u16) -> Selection {
        match self.mode {
            SelectionMode::InOrder => Selection::Next,
            SelectionMode::OnlyCurrent => Selection::Index(pinned),
            SelectionMode::Random => match self.choose_random(rng) {
                Some(index) => Selection::Index(index),
                None => Selection::Next,
            },
        }
    }

    /// Draw `k` in `[0, remaining)` and take the k-th index not yet shown
    fn choose_random<R: RandomSource>(&mut self, rng: &mut R) -> Option<u16> {
        if self.total == 0 {
            return None;
        }

        let remaining = self.total - self.shown.len();
        let mut k = rng.below(remaining as u32) as u16;

        let mut picked = None;
        for index in 0..self.total {
            if self.shown.contains(index) {
                continue;
            }
            if k == 0 {
                picked = Some(index);
                break;
            }
            k -= 1;
        }

        let index = picked?;
        self.shown.insert(index);
        if self.shown.len() == self.total {
            trace!("Selection: cycle of {} complete", self.total);
            self.shown.clear();
        }
        Some(index)
    }
}
