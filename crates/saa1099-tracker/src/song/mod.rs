//! Song data model.
//!
//! A [`Song`] owns fixed slot tables for samples (32) and ornaments (16), a
//! growable pattern list and the position order list. Slot 0 of every table is
//! the neutral entity: silent sample, identity ornament, empty pattern.
//!
//! Read accessors never fail: an out-of-range index resolves to slot 0.
//! Write accessors invalidate the simulation checkpoints that the edit could
//! affect, so seeking never resumes from stale state.

mod pattern;
mod position;
mod sample;

pub use pattern::{MAX_PATTERN_LINES, Pattern, PatternLine};
pub use position::{ChannelAssignment, DEFAULT_POSITION_LENGTH, DEFAULT_SPEED, MAX_SPEED, Position};
pub use sample::{MAX_SHIFT, Ornament, SAMPLE_LENGTH, Sample, SampleTick, Volume};

use log::debug;
use saa1099_common::{FRAME_RATE_PAL, MetadataFields};

use pattern::EMPTY_PATTERN;

/// Sample slots, including the reserved slot 0
pub const MAX_SAMPLES: usize = 32;

/// Ornament slots, including the reserved slot 0
pub const MAX_ORNAMENTS: usize = 16;

/// Tracker song
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    /// Song title
    pub title: String,
    /// Author name
    pub author: String,
    interrupt: u32,
    repeat_position: usize,
    samples: Vec<Sample>,
    ornaments: Vec<Ornament>,
    patterns: Vec<Pattern>,
    positions: Vec<Position>,
}

impl Default for Song {
    fn default() -> Self {
        Self::new()
    }
}

impl Song {
    /// Empty song at the PAL interrupt rate
    pub fn new() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            interrupt: FRAME_RATE_PAL,
            repeat_position: 0,
            samples: vec![Sample::default(); MAX_SAMPLES],
            ornaments: vec![Ornament::default(); MAX_ORNAMENTS],
            patterns: vec![Pattern::default()],
            positions: Vec::new(),
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// Player interrupt rate in Hz (ticks per second)
    pub fn interrupt(&self) -> u32 {
        self.interrupt
    }

    /// Position the song loops back to
    pub fn repeat_position(&self) -> usize {
        self.repeat_position
    }

    /// Sample `index`, slot 0 when out of range
    pub fn sample(&self, index: usize) -> &Sample {
        self.samples.get(index).unwrap_or(&self.samples[0])
    }

    /// Ornament `index`, slot 0 when out of range
    pub fn ornament(&self, index: usize) -> &Ornament {
        self.ornaments.get(index).unwrap_or(&self.ornaments[0])
    }

    /// Pattern `index`, the empty pattern when out of range
    pub fn pattern(&self, index: usize) -> &Pattern {
        self.patterns.get(index).unwrap_or(&EMPTY_PATTERN)
    }

    /// Position `index`
    pub fn position(&self, index: usize) -> Option<&Position> {
        self.positions.get(index)
    }

    /// All positions in play order
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of positions
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of patterns including the empty pattern 0
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Number of channel assignments across all positions that play `pattern`
    pub fn count_pattern_usage(&self, pattern: usize) -> usize {
        self.positions
            .iter()
            .flat_map(|p| p.channels.iter())
            .filter(|c| c.pattern == pattern)
            .count()
    }

    /// Total length in ticks, once every position has a frame table
    pub fn total_frames(&self) -> Option<usize> {
        match self.positions.last() {
            None => Some(0),
            Some(last) => last.frames().map(|f| f[last.length()]),
        }
    }

    // ========================================================================
    // Write access
    // ========================================================================

    /// Change the interrupt rate; every frame table becomes stale
    pub fn set_interrupt(&mut self, hz: u32) {
        self.interrupt = hz.max(1);
        self.invalidate_from(0);
    }

    /// Set the loop target, clamped to the existing positions
    pub fn set_repeat_position(&mut self, position: usize) {
        self.repeat_position = position.min(self.positions.len().saturating_sub(1));
    }

    /// Mutable sample slot; slot 0 is read-only
    pub fn sample_mut(&mut self, index: usize) -> Option<&mut Sample> {
        if index == 0 || index >= self.samples.len() {
            return None;
        }
        let first = self
            .positions
            .iter()
            .position(|p| p.channels.iter().any(|c| self.pattern(c.pattern).uses_sample(index as u8)));
        if let Some(first) = first {
            self.invalidate_from(first);
        }
        self.samples.get_mut(index)
    }

    /// Mutable ornament slot; slot 0 is read-only
    pub fn ornament_mut(&mut self, index: usize) -> Option<&mut Ornament> {
        if index == 0 || index >= self.ornaments.len() {
            return None;
        }
        let first = self
            .positions
            .iter()
            .position(|p| p.channels.iter().any(|c| self.pattern(c.pattern).uses_ornament(index as u8)));
        if let Some(first) = first {
            self.invalidate_from(first);
        }
        self.ornaments.get_mut(index)
    }

    /// Mutable pattern; pattern 0 is read-only
    pub fn pattern_mut(&mut self, index: usize) -> Option<&mut Pattern> {
        if index == 0 || index >= self.patterns.len() {
            return None;
        }
        if let Some(first) = self.positions.iter().position(|p| p.uses_pattern(index)) {
            self.invalidate_from(first);
        }
        self.patterns.get_mut(index)
    }

    /// Mutable position
    ///
    /// The state at the start of `index` is unaffected, so its own checkpoint
    /// survives; only its frame table and everything after it are dropped.
    pub fn position_mut(&mut self, index: usize) -> Option<&mut Position> {
        if index >= self.positions.len() {
            return None;
        }
        self.invalidate_from(index + 1);
        let position = &mut self.positions[index];
        position.frames.clear();
        Some(position)
    }

    /// Append an empty pattern and return its index
    pub fn add_pattern(&mut self) -> usize {
        self.add_pattern_with(Pattern::default())
    }

    /// Append `pattern` and return its index
    pub fn add_pattern_with(&mut self, pattern: Pattern) -> usize {
        self.patterns.push(pattern);
        self.patterns.len() - 1
    }

    /// Append a position and return its index
    pub fn add_position(&mut self, position: Position) -> usize {
        self.positions.push(position);
        self.positions.len() - 1
    }

    /// Insert a position before `index` (appends when past the end)
    pub fn insert_position(&mut self, index: usize, position: Position) {
        let index = index.min(self.positions.len());
        self.positions.insert(index, position);
        self.invalidate_from(index);
    }

    /// Remove and return position `index`
    pub fn remove_position(&mut self, index: usize) -> Option<Position> {
        if index >= self.positions.len() {
            return None;
        }
        let removed = self.positions.remove(index);
        self.invalidate_from(index);
        self.repeat_position = self.repeat_position.min(self.positions.len().saturating_sub(1));
        Some(removed)
    }

    /// Drop frame tables and checkpoints of `from` and every later position
    pub fn invalidate_from(&mut self, from: usize) {
        if from < self.positions.len() {
            debug!("invalidating checkpoints from position {from}");
        }
        for position in self.positions.iter_mut().skip(from) {
            position.invalidate();
        }
    }

    pub(crate) fn positions_mut_raw(&mut self) -> &mut [Position] {
        &mut self.positions
    }

    pub(crate) fn set_slots(
        &mut self,
        samples: Vec<Sample>,
        ornaments: Vec<Ornament>,
        patterns: Vec<Pattern>,
        positions: Vec<Position>,
    ) {
        self.samples = samples;
        self.samples.resize(MAX_SAMPLES, Sample::default());
        self.ornaments = ornaments;
        self.ornaments.resize(MAX_ORNAMENTS, Ornament::default());
        self.patterns = patterns;
        if self.patterns.is_empty() {
            self.patterns.push(Pattern::default());
        }
        self.positions = positions;
        self.set_repeat_position(self.repeat_position);
    }

    pub(crate) fn set_interrupt_raw(&mut self, hz: u32) {
        self.interrupt = hz.max(1);
    }

    pub(crate) fn set_repeat_position_raw(&mut self, position: usize) {
        self.repeat_position = position;
    }

    pub(crate) fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub(crate) fn ornaments(&self) -> &[Ornament] {
        &self.ornaments
    }

    pub(crate) fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}

impl MetadataFields for Song {
    fn title(&self) -> &str {
        &self.title
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn format(&self) -> &str {
        "SAA1099 Tracker"
    }

    fn frame_count(&self) -> Option<usize> {
        self.total_frames()
    }

    fn frame_rate(&self) -> u32 {
        self.interrupt
    }

    fn loop_frame(&self) -> Option<usize> {
        self.positions
            .get(self.repeat_position)
            .and_then(|p| p.frames())
            .map(|f| f[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    fn song_with_positions(count: usize) -> Song {
        let mut song = Song::new();
        let a = song.add_pattern();
        let b = song.add_pattern();
        for i in 0..count {
            let mut position = Position::new(4, 6);
            position.channels[0].pattern = if i < 2 { a } else { b };
            song.add_position(position);
        }
        song
    }

    fn mark_all(song: &mut Song) {
        for position in song.positions_mut_raw() {
            position.frames = vec![0; position.length() + 1];
            position.init_params = Some(Box::new(Runtime::default()));
        }
    }

    fn checkpoints(song: &Song) -> Vec<bool> {
        song.positions().iter().map(Position::has_checkpoint).collect()
    }

    #[test]
    fn out_of_range_reads_fall_back_to_slot_zero() {
        let song = Song::new();
        assert_eq!(song.sample(99).end, 0);
        assert_eq!(song.ornament(99).offset(0), 0);
        assert!(song.pattern(1234).line(0).is_empty());
        assert!(song.position(0).is_none());
    }

    #[test]
    fn slot_zero_is_read_only() {
        let mut song = Song::new();
        assert!(song.sample_mut(0).is_none());
        assert!(song.ornament_mut(0).is_none());
        assert!(song.pattern_mut(0).is_none());
        assert!(song.sample_mut(1).is_some());
    }

    #[test]
    fn pattern_edit_invalidates_from_first_use() {
        let mut song = song_with_positions(4);
        mark_all(&mut song);
        song.pattern_mut(2);
        assert_eq!(checkpoints(&song), vec![true, true, false, false]);
    }

    #[test]
    fn position_edit_keeps_own_checkpoint() {
        let mut song = song_with_positions(4);
        mark_all(&mut song);
        song.position_mut(1);
        assert_eq!(checkpoints(&song), vec![true, true, false, false]);
        assert!(song.position(1).and_then(Position::frames).is_none());
        assert!(song.position(0).and_then(Position::frames).is_some());
    }

    #[test]
    fn sample_edit_invalidates_positions_using_it() {
        let mut song = song_with_positions(4);
        if let Some(line) = song.pattern_mut(2).and_then(|p| {
            p.end = 4;
            p.line_mut(1)
        }) {
            line.sample = 5;
        }
        mark_all(&mut song);
        song.sample_mut(5);
        assert_eq!(checkpoints(&song), vec![true, true, false, false]);

        mark_all(&mut song);
        song.sample_mut(6);
        assert_eq!(checkpoints(&song), vec![true; 4]);
    }

    #[test]
    fn pattern_usage_counts_assignments() {
        let mut song = song_with_positions(3);
        assert_eq!(song.count_pattern_usage(1), 2);
        assert_eq!(song.count_pattern_usage(2), 1);
        assert_eq!(song.count_pattern_usage(0), 3 * 5);
        song.remove_position(0);
        assert_eq!(song.count_pattern_usage(1), 1);
    }

    #[test]
    fn repeat_position_is_clamped() {
        let mut song = song_with_positions(2);
        song.set_repeat_position(10);
        assert_eq!(song.repeat_position(), 1);
    }
}
