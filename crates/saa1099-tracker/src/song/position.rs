//! Positions: the song order list.

use saa1099::NUM_CHANNELS;

use super::pattern::MAX_PATTERN_LINES;
use crate::runtime::Runtime;

/// Default lines per position
pub const DEFAULT_POSITION_LENGTH: usize = 64;

/// Default ticks per line
pub const DEFAULT_SPEED: u8 = 6;

/// Highest ticks-per-line value
pub const MAX_SPEED: u8 = 31;

/// Pattern and transposition for one channel of a position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelAssignment {
    /// Pattern index, 0 = empty pattern
    pub pattern: usize,
    /// Transposition in semitones
    pub pitch: i8,
}

/// One entry of the order list
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Channel assignments
    pub channels: [ChannelAssignment; NUM_CHANNELS],
    /// Lines played (1-96)
    length: usize,
    /// Initial ticks per line (1-31)
    pub speed: u8,
    /// Song-absolute tick at which each line starts, plus the end tick
    pub(crate) frames: Vec<usize>,
    /// Sequencer state captured at the first tick of the position
    pub(crate) init_params: Option<Box<Runtime>>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION_LENGTH, DEFAULT_SPEED)
    }
}

impl Position {
    /// Empty position with the given length and speed, clamped into range
    pub fn new(length: usize, speed: u8) -> Self {
        Self {
            channels: [ChannelAssignment::default(); NUM_CHANNELS],
            length: length.clamp(1, MAX_PATTERN_LINES),
            speed: speed.clamp(1, MAX_SPEED),
            frames: Vec::new(),
            init_params: None,
        }
    }

    /// Lines played (1-96)
    pub fn length(&self) -> usize {
        self.length
    }

    /// Change the number of lines played, clamped to 1-96
    ///
    /// Drops the frame table, which no longer matches the line count.
    pub fn set_length(&mut self, length: usize) {
        self.length = length.clamp(1, MAX_PATTERN_LINES);
        self.frames.clear();
    }

    /// Frame table computed by the last simulation, if still valid
    ///
    /// Holds `length + 1` entries: the start tick of every line and the tick
    /// at which the position ends.
    pub fn frames(&self) -> Option<&[usize]> {
        (self.frames.len() == self.length + 1).then_some(self.frames.as_slice())
    }

    /// Whether a restore checkpoint is available
    pub fn has_checkpoint(&self) -> bool {
        self.init_params.is_some()
    }

    /// Checkpoint captured at the first tick of the position
    pub fn checkpoint(&self) -> Option<&Runtime> {
        self.init_params.as_deref()
    }

    /// Whether any channel plays `pattern`
    pub fn uses_pattern(&self, pattern: usize) -> bool {
        self.channels.iter().any(|c| c.pattern == pattern)
    }

    pub(crate) fn invalidate(&mut self) {
        self.frames.clear();
        self.init_params = None;
    }
}
