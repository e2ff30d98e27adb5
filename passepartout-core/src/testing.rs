//! Test doubles for the collaborator traits
//!
//! `MemFs` is an in-memory medium with card-removal and read-failure
//! switches. `Bench` hands out a display, touch panel and clock that share
//! one recording state, so a test can script touches against the number of
//! pixel portions written and inspect everything afterwards.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use embedded_io::{ErrorType, Read, Seek, SeekFrom, Write};
use passepartout_hal::{Clock, DelayNs, DirEntry, Directory, FileName, FileSystem, FsError};

use crate::traits::{DisplayError, FrameDisplay, RandomSource, RawSample, Rect, TouchPanel};

// ---------------------------------------------------------------------------
// In-memory file system
// ---------------------------------------------------------------------------

struct FsState {
    mounted: bool,
    fail_reads: bool,
    fail_writes: bool,
    dirs: Vec<String>,
    files: Vec<(String, Rc<RefCell<Vec<u8>>>)>,
}

/// In-memory medium; clones share the same content
#[derive(Clone)]
pub struct MemFs {
    state: Rc<RefCell<FsState>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FsState {
                mounted: true,
                fail_reads: false,
                fail_writes: false,
                dirs: Vec::new(),
                files: Vec::new(),
            })),
        }
    }

    pub fn add_dir(&self, path: &str) {
        self.state.borrow_mut().dirs.push(path.to_string());
    }

    /// Add or replace a file; listings keep insertion order
    pub fn add_file(&self, path: &str, data: Vec<u8>) {
        let mut state = self.state.borrow_mut();
        match state.files.iter().find(|(name, _)| name == path) {
            Some((_, content)) => *content.borrow_mut() = data,
            None => state.files.push((path.to_string(), Rc::new(RefCell::new(data)))),
        }
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.state.borrow();
        state
            .files
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, content)| content.borrow().clone())
    }

    pub fn set_mounted(&self, mounted: bool) {
        self.state.borrow_mut().mounted = mounted;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    fn lookup(&self, path: &str) -> Option<Rc<RefCell<Vec<u8>>>> {
        let state = self.state.borrow();
        state
            .files
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, content)| content.clone())
    }

    fn handle(&self, data: Rc<RefCell<Vec<u8>>>) -> MemFile {
        MemFile {
            data,
            pos: 0,
            state: self.state.clone(),
        }
    }
}

impl FileSystem for MemFs {
    type File = MemFile;
    type Directory = MemDir;

    fn is_mounted(&self) -> bool {
        self.state.borrow().mounted
    }

    fn open_dir(&mut self, path: &str) -> Result<MemDir, FsError> {
        let state = self.state.borrow();
        if !state.mounted {
            return Err(FsError::NotMounted);
        }
        if path != "/" && !state.dirs.iter().any(|d| d == path) {
            return Err(FsError::NotFound);
        }

        let prefix = if path.ends_with('/') {
            path.to_string()
        } else {
            alloc::format!("{}/", path)
        };
        let child = |full: &str| -> Option<FileName> {
            let rest = full.strip_prefix(prefix.as_str())?;
            if rest.is_empty() || rest.contains('/') {
                return None;
            }
            let mut name = FileName::new();
            name.push_str(rest).ok()?;
            Some(name)
        };

        let mut entries = Vec::new();
        for dir in &state.dirs {
            if let Some(name) = child(dir) {
                entries.push(DirEntry {
                    name,
                    is_dir: true,
                    size: 0,
                });
            }
        }
        for (full, content) in &state.files {
            if let Some(name) = child(full) {
                entries.push(DirEntry {
                    name,
                    is_dir: false,
                    size: content.borrow().len() as u32,
                });
            }
        }

        Ok(MemDir {
            entries,
            pos: 0,
            state: self.state.clone(),
        })
    }

    fn open_file(&mut self, path: &str) -> Result<MemFile, FsError> {
        if !self.is_mounted() {
            return Err(FsError::NotMounted);
        }
        let data = self.lookup(path).ok_or(FsError::NotFound)?;
        Ok(self.handle(data))
    }

    fn open_or_create(&mut self, path: &str) -> Result<MemFile, FsError> {
        if !self.is_mounted() {
            return Err(FsError::NotMounted);
        }
        if self.lookup(path).is_none() {
            self.add_file(path, Vec::new());
        }
        let data = self.lookup(path).ok_or(FsError::NotFound)?;
        Ok(self.handle(data))
    }
}

/// Open file on a [`MemFs`]
pub struct MemFile {
    data: Rc<RefCell<Vec<u8>>>,
    pos: usize,
    state: Rc<RefCell<FsState>>,
}

impl ErrorType for MemFile {
    type Error = FsError;
}

impl Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        {
            let state = self.state.borrow();
            if !state.mounted {
                return Err(FsError::NotMounted);
            }
            if state.fail_reads {
                return Err(FsError::Io);
            }
        }

        let data = self.data.borrow();
        let available = data.len().saturating_sub(self.pos);
        let n = available.min(buf.len());
        buf[..n].copy_from_slice(&data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize, FsError> {
        {
            let state = self.state.borrow();
            if !state.mounted {
                return Err(FsError::NotMounted);
            }
            if state.fail_writes {
                return Err(FsError::Io);
            }
        }

        let mut data = self.data.borrow_mut();
        let end = self.pos + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), FsError> {
        Ok(())
    }
}

impl Seek for MemFile {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, FsError> {
        let len = self.data.borrow().len() as i64;
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(delta) => len + delta,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
        };
        if target < 0 {
            return Err(FsError::Io);
        }
        self.pos = target as usize;
        Ok(target as u64)
    }
}

/// Directory listing snapshot taken when opened
pub struct MemDir {
    entries: Vec<DirEntry>,
    pos: usize,
    state: Rc<RefCell<FsState>>,
}

impl Directory for MemDir {
    fn next_entry(&mut self) -> Result<Option<DirEntry>, FsError> {
        if !self.state.borrow().mounted {
            return Err(FsError::NotMounted);
        }
        let entry = self.entries.get(self.pos).cloned();
        if entry.is_some() {
            self.pos += 1;
        }
        Ok(entry)
    }

    fn rewind(&mut self) -> Result<(), FsError> {
        self.pos = 0;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// BMP builder
// ---------------------------------------------------------------------------

/// Uncompressed 24-bit BMP filled with one color, pixels stored as B, G, R
pub fn bmp_file(width: u32, height: u32, rgb: (u8, u8, u8)) -> Vec<u8> {
    let pixels = (width * height) as usize;
    let mut out = Vec::with_capacity(54 + pixels * 3);

    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(54 + pixels as u32 * 3).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&54u32.to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(pixels as u32 * 3).to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);
    debug_assert_eq!(out.len(), 54);

    for _ in 0..pixels {
        out.extend_from_slice(&[rgb.2, rgb.1, rgb.0]);
    }
    out
}

// ---------------------------------------------------------------------------
// Display, touch and clock bench
// ---------------------------------------------------------------------------

/// Recorded display call
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayOp {
    Window(Rect),
    Pixels { count: usize, first: u16 },
    Fill(Rect, u16),
    Text(String),
}

/// When a scripted touch becomes visible to the panel
#[derive(Debug, Clone, Copy, PartialEq)]
enum Trigger {
    Now,
    AfterPortions(usize),
}

/// Scripted raw touch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    x: u16,
    y: u16,
    trigger: Trigger,
}

impl Touch {
    /// Pressed on the next poll
    pub fn now(x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            trigger: Trigger::Now,
        }
    }

    /// Pressed once `portions` pixel buffers have been written in total
    pub fn after_portions(portions: usize, x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            trigger: Trigger::AfterPortions(portions),
        }
    }
}

struct BenchState {
    width: u16,
    height: u16,
    now: u32,
    ops: Vec<DisplayOp>,
    portions: usize,
    backlight: u8,
    default_backlight: u8,
    backlight_log: Vec<u8>,
    touches: VecDeque<Touch>,
    fail_fills: bool,
}

/// Shared state behind [`MockDisplay`], [`MockTouch`] and [`MockClock`]
#[derive(Clone)]
pub struct Bench {
    state: Rc<RefCell<BenchState>>,
}

impl Bench {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            state: Rc::new(RefCell::new(BenchState {
                width,
                height,
                now: 0,
                ops: Vec::new(),
                portions: 0,
                backlight: 0,
                default_backlight: 0,
                backlight_log: Vec::new(),
                touches: VecDeque::new(),
                fail_fills: false,
            })),
        }
    }

    pub fn display(&self) -> MockDisplay {
        MockDisplay {
            state: self.state.clone(),
        }
    }

    pub fn touch(&self) -> MockTouch {
        MockTouch {
            state: self.state.clone(),
        }
    }

    pub fn clock(&self) -> MockClock {
        MockClock {
            state: self.state.clone(),
        }
    }

    /// Make every fill (and so every clear) report a bus error
    pub fn set_fail_fills(&self, fail: bool) {
        self.state.borrow_mut().fail_fills = fail;
    }

    pub fn push_touch(&self, touch: Touch) {
        self.state.borrow_mut().touches.push_back(touch);
    }

    pub fn pending_touches(&self) -> usize {
        self.state.borrow().touches.len()
    }

    pub fn now(&self) -> u32 {
        self.state.borrow().now
    }

    pub fn advance(&self, ms: u32) {
        let mut state = self.state.borrow_mut();
        state.now = state.now.wrapping_add(ms);
    }

    /// Pixel buffers written so far
    pub fn portions(&self) -> usize {
        self.state.borrow().portions
    }

    pub fn ops(&self) -> Vec<DisplayOp> {
        self.state.borrow().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.borrow_mut().ops.clear();
    }

    /// Texts drawn since the last [`Bench::clear_ops`]
    pub fn texts(&self) -> Vec<String> {
        self.state
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                DisplayOp::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn backlight(&self) -> u8 {
        self.state.borrow().backlight
    }

    pub fn backlight_log(&self) -> Vec<u8> {
        self.state.borrow().backlight_log.clone()
    }
}

/// Recording panel
pub struct MockDisplay {
    state: Rc<RefCell<BenchState>>,
}

impl FrameDisplay for MockDisplay {
    fn width(&self) -> u16 {
        self.state.borrow().width
    }

    fn height(&self) -> u16 {
        self.state.borrow().height
    }

    fn open_window(&mut self, area: Rect) -> Result<(), DisplayError> {
        self.state.borrow_mut().ops.push(DisplayOp::Window(area));
        Ok(())
    }

    fn write_buffer(&mut self, pixels: &[u16]) -> Result<(), DisplayError> {
        let mut state = self.state.borrow_mut();
        state.portions += 1;
        state.ops.push(DisplayOp::Pixels {
            count: pixels.len(),
            first: pixels.first().copied().unwrap_or(0),
        });
        Ok(())
    }

    fn set_backlight(&mut self, level: u8) {
        let mut state = self.state.borrow_mut();
        state.backlight = level;
        state.backlight_log.push(level);
    }

    fn set_default_backlight(&mut self, level: u8) {
        self.state.borrow_mut().default_backlight = level;
    }

    fn default_backlight(&self) -> u8 {
        self.state.borrow().default_backlight
    }

    fn fill_rect(&mut self, area: Rect, color: u16) -> Result<(), DisplayError> {
        let mut state = self.state.borrow_mut();
        if state.fail_fills {
            return Err(DisplayError::Communication);
        }
        state.ops.push(DisplayOp::Fill(area, color));
        Ok(())
    }

    fn draw_text(&mut self, _x: u16, _y: u16, text: &str, _color: u16) -> Result<(), DisplayError> {
        self.state
            .borrow_mut()
            .ops
            .push(DisplayOp::Text(text.to_string()));
        Ok(())
    }
}

/// Scripted touch panel; each scripted touch is reported once
pub struct MockTouch {
    state: Rc<RefCell<BenchState>>,
}

impl TouchPanel for MockTouch {
    fn sample(&mut self) -> Option<RawSample> {
        let mut state = self.state.borrow_mut();
        let touch = *state.touches.front()?;
        let ready = match touch.trigger {
            Trigger::Now => true,
            Trigger::AfterPortions(n) => state.portions >= n,
        };
        if !ready {
            return None;
        }
        state.touches.pop_front();
        Some(RawSample::at(touch.x, touch.y))
    }
}

/// Manual clock; delays advance time instantly
pub struct MockClock {
    state: Rc<RefCell<BenchState>>,
}

impl MockClock {
    fn advance(&mut self, ms: u32) {
        let mut state = self.state.borrow_mut();
        state.now = state.now.wrapping_add(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.state.borrow().now
    }
}

impl DelayNs for MockClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns / 1_000_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(us / 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}

/// Replays a fixed sequence of values
pub struct ScriptedRandom {
    values: Vec<u32>,
    pos: usize,
}

impl ScriptedRandom {
    pub fn new(values: &[u32]) -> Self {
        Self {
            values: values.to_vec(),
            pos: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_u32(&mut self) -> u32 {
        let value = self.values.get(self.pos % self.values.len().max(1)).copied().unwrap_or(0);
        self.pos += 1;
        value
    }
}
