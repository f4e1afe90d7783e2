//! Patterns: rows of note events for one channel.

use super::sample::Volume;
use super::{MAX_ORNAMENTS, MAX_SAMPLES};
use crate::tones::MAX_TONE;

/// Maximum number of lines in a pattern or position
pub const MAX_PATTERN_LINES: usize = 96;

/// One row of a pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternLine {
    /// Note index, 0 = none
    pub tone: u8,
    /// Release the sounding note
    pub release: bool,
    /// Sample slot, 0 = keep current
    pub sample: u8,
    /// Ornament slot, 0 = keep current
    pub ornament: u8,
    /// Switch back to the identity ornament
    pub ornament_release: bool,
    /// Volume, all-zero = keep current attenuation
    pub volume: Volume,
    /// Command nibble (0-F)
    pub cmd: u8,
    /// Command parameter
    pub cmd_data: u8,
}

impl PatternLine {
    /// True when the line carries no event at all
    pub fn is_empty(&self) -> bool {
        *self == PatternLine::default()
    }

    /// Flags nibble: bit 0 release, bit 1 ornament release
    pub fn flags(&self) -> u8 {
        u8::from(self.release) | (u8::from(self.ornament_release) << 1)
    }

    /// Apply a flags nibble produced by [`flags`](Self::flags)
    pub fn set_flags(&mut self, flags: u8) {
        self.release = flags & 0x01 != 0;
        self.ornament_release = flags & 0x02 != 0;
    }

    /// Replace a note, sample or ornament that does not exist with 0
    ///
    /// Each field is checked on its own; the rest of the line is kept.
    /// Returns `true` when anything was replaced.
    pub fn clamp_references(&mut self) -> bool {
        let mut changed = false;
        if self.tone > MAX_TONE {
            self.tone = 0;
            changed = true;
        }
        if usize::from(self.sample) >= MAX_SAMPLES {
            self.sample = 0;
            changed = true;
        }
        if usize::from(self.ornament) >= MAX_ORNAMENTS {
            self.ornament = 0;
            changed = true;
        }
        changed
    }
}

/// A pattern of up to 96 lines
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    lines: Vec<PatternLine>,
    /// Number of lines in use
    pub end: usize,
}

/// Read-only stand-in for missing pattern slots
pub(crate) static EMPTY_PATTERN: Pattern = Pattern {
    lines: Vec::new(),
    end: 0,
};

impl Default for Pattern {
    fn default() -> Self {
        Self {
            lines: vec![PatternLine::default(); MAX_PATTERN_LINES],
            end: 0,
        }
    }
}

impl Pattern {
    /// Pattern with every line empty and `end` lines in use
    pub fn with_length(end: usize) -> Self {
        Self {
            end: end.min(MAX_PATTERN_LINES),
            ..Default::default()
        }
    }

    /// Line `index`; lines past `end` read as empty
    pub fn line(&self, index: usize) -> PatternLine {
        if index < self.end {
            self.lines.get(index).copied().unwrap_or_default()
        } else {
            PatternLine::default()
        }
    }

    /// Mutable access to line `index` (0-95)
    pub fn line_mut(&mut self, index: usize) -> Option<&mut PatternLine> {
        self.lines.get_mut(index)
    }

    /// All 96 line slots
    pub fn lines(&self) -> &[PatternLine] {
        &self.lines
    }

    /// Whether any line in use references `sample`
    pub fn uses_sample(&self, sample: u8) -> bool {
        self.lines[..self.end.min(self.lines.len())]
            .iter()
            .any(|l| l.sample == sample)
    }

    /// Whether any line in use references `ornament`
    pub fn uses_ornament(&self, ornament: u8) -> bool {
        self.lines[..self.end.min(self.lines.len())]
            .iter()
            .any(|l| l.ornament == ornament)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_past_end_are_empty() {
        let mut pattern = Pattern::with_length(4);
        if let Some(line) = pattern.line_mut(10) {
            line.tone = 20;
        }
        assert!(pattern.line(10).is_empty());
        pattern.end = 16;
        assert_eq!(pattern.line(10).tone, 20);
        assert!(pattern.line(500).is_empty());
    }

    #[test]
    fn usage_scan_respects_end() {
        let mut pattern = Pattern::with_length(2);
        if let Some(line) = pattern.line_mut(5) {
            line.sample = 3;
        }
        assert!(!pattern.uses_sample(3));
        pattern.end = 6;
        assert!(pattern.uses_sample(3));
    }
}
