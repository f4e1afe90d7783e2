//! Tone and noise generators for the SAA-1099
//!
//! This module contains the free-running sound sources:
//! - Tone oscillators (6 channels), each with an octave/offset pair
//! - Noise generators (2 shared LFSRs), clocked internally or by an oscillator
//!
//! Both use a fixed-point phase accumulator: every output sample adds a
//! frequency-dependent step to a counter, and each time the counter crosses
//! `sample_rate << 12` the generator changes state.

use crate::tables::FREQ_TABLE;

/// Number of tone channels
pub const NUM_CHANNELS: usize = 6;

/// Number of noise generators
pub const NUM_NOISE: usize = 2;

/// Noise source value that hands clocking to the paired oscillator
pub const NOISE_SOURCE_OSCILLATOR: u8 = 3;

/// Half-cycle rate of the fastest internal noise clock (31.25 kHz), scaled by 4096
const NOISE_BASE_STEP: u64 = 31_250 << 12;

const NOISE_SEEDS: [u32; NUM_NOISE] = [0x14AF_5209, 0x76A9_B11E];

#[inline]
fn counter_threshold(sample_rate: u32) -> u64 {
    u64::from(sample_rate) << 12
}

/// Buffered frequency writes waiting for the next half-cycle boundary
///
/// The chip latches octave and offset writes and only applies them when the
/// oscillator output toggles. An octave write also arms an "ignore offset"
/// latch: at the next boundary only the octave is applied and a buffered
/// offset waits one more half-cycle. An offset written while the buffered
/// octave equals the current one disarms the latch again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingFrequency {
    /// Nothing buffered
    #[default]
    None,
    /// A new offset is buffered
    Offset,
    /// A new octave is buffered; the offset latch is armed
    Octave,
    /// Offset and octave are buffered and commit together
    Both,
    /// Offset and octave are buffered with the latch armed; the offset
    /// commits one half-cycle after the octave
    OctaveThenOffset,
}

/// Tone oscillator for a single channel
#[derive(Clone, Debug)]
pub struct ToneGenerator {
    octave: u8,
    offset: u8,
    next_octave: u8,
    next_offset: u8,
    pending: PendingFrequency,
    step: u64,
    counter: u64,
    threshold: u64,
    /// Output level, 0 or 2
    level: u8,
    sync: bool,
}

impl ToneGenerator {
    /// Create an oscillator running at octave 0, offset 0
    pub fn new(sample_rate: u32) -> Self {
        Self {
            octave: 0,
            offset: 0,
            next_octave: 0,
            next_offset: 0,
            pending: PendingFrequency::None,
            step: u64::from(FREQ_TABLE[0][0]),
            counter: 0,
            threshold: counter_threshold(sample_rate),
            level: 2,
            sync: false,
        }
    }

    /// Buffer a new frequency offset (0-255)
    pub fn set_offset(&mut self, offset: u8) {
        self.next_offset = offset;
        if self.sync {
            self.offset = offset;
            self.octave = self.next_octave;
            self.pending = PendingFrequency::None;
            self.update_step();
            return;
        }
        let same_octave = self.next_octave == self.octave;
        self.pending = match self.pending {
            PendingFrequency::None | PendingFrequency::Offset => PendingFrequency::Offset,
            PendingFrequency::Both => PendingFrequency::Both,
            PendingFrequency::Octave | PendingFrequency::OctaveThenOffset if same_octave => PendingFrequency::Both,
            PendingFrequency::Octave | PendingFrequency::OctaveThenOffset => PendingFrequency::OctaveThenOffset,
        };
    }

    /// Buffer a new octave (0-7)
    ///
    /// Arms the offset latch, so an offset already buffered is held back
    /// until the boundary after the octave commits.
    pub fn set_octave(&mut self, octave: u8) {
        self.next_octave = octave & 0x07;
        if self.sync {
            self.octave = self.next_octave;
            self.offset = self.next_offset;
            self.pending = PendingFrequency::None;
            self.update_step();
            return;
        }
        self.pending = match self.pending {
            PendingFrequency::None | PendingFrequency::Octave => PendingFrequency::Octave,
            PendingFrequency::Offset | PendingFrequency::Both | PendingFrequency::OctaveThenOffset => {
                PendingFrequency::OctaveThenOffset
            }
        };
    }

    /// Enter or leave sync (register 28 bit 1)
    ///
    /// Entering sync holds the output high, clears the counter and applies
    /// buffered frequency data immediately.
    pub fn set_sync(&mut self, sync: bool) {
        self.sync = sync;
        if sync {
            self.counter = 0;
            self.level = 2;
            self.octave = self.next_octave;
            self.offset = self.next_offset;
            self.pending = PendingFrequency::None;
            self.update_step();
        }
    }

    /// Advance by one output sample
    ///
    /// # Returns
    ///
    /// The number of half-cycle edges crossed during this sample. Each edge
    /// clocks whatever device is wired to this oscillator.
    #[inline]
    pub fn tick(&mut self) -> u32 {
        if self.sync {
            return 0;
        }
        let mut edges = 0;
        self.counter += self.step;
        while self.counter >= self.threshold {
            self.counter -= self.threshold;
            self.level ^= 2;
            edges += 1;
            self.commit_pending();
        }
        edges
    }

    /// Current output level (0 or 2)
    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Octave currently driving the oscillator
    pub fn octave(&self) -> u8 {
        self.octave
    }

    /// Offset currently driving the oscillator
    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// Buffered write state
    pub fn pending(&self) -> PendingFrequency {
        self.pending
    }

    fn commit_pending(&mut self) {
        match self.pending {
            PendingFrequency::None => return,
            PendingFrequency::Offset => self.offset = self.next_offset,
            PendingFrequency::Octave => self.octave = self.next_octave,
            PendingFrequency::Both => {
                self.octave = self.next_octave;
                self.offset = self.next_offset;
            }
            PendingFrequency::OctaveThenOffset => {
                self.octave = self.next_octave;
                self.pending = PendingFrequency::Offset;
                self.update_step();
                return;
            }
        }
        self.pending = PendingFrequency::None;
        self.update_step();
    }

    #[inline]
    fn update_step(&mut self) {
        self.step = u64::from(FREQ_TABLE[self.octave as usize][self.offset as usize]);
    }
}

/// 31-bit LFSR noise generator
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    lfsr: u32,
    source: u8,
    step: u64,
    counter: u64,
    threshold: u64,
    sync: bool,
}

impl NoiseGenerator {
    /// Create noise generator `index` (0 or 1) with its power-on seed
    pub fn new(index: usize, sample_rate: u32) -> Self {
        Self {
            lfsr: NOISE_SEEDS[index % NUM_NOISE],
            source: 0,
            step: NOISE_BASE_STEP,
            counter: 0,
            threshold: counter_threshold(sample_rate),
            sync: false,
        }
    }

    /// Select the clock source
    ///
    /// * `0`..=`2` - internal clock at 31.25 kHz, 15.6 kHz or 7.8 kHz
    /// * `3` - clocked by the paired oscillator through [`trigger`](Self::trigger)
    pub fn set_source(&mut self, source: u8) {
        self.source = source & 0x03;
        self.step = NOISE_BASE_STEP >> self.source;
    }

    /// Currently selected clock source
    pub fn source(&self) -> u8 {
        self.source
    }

    /// Enter or leave sync; entering clears the counter only
    pub fn set_sync(&mut self, sync: bool) {
        self.sync = sync;
        if sync {
            self.counter = 0;
        }
    }

    /// Advance by one output sample on the internal clock
    #[inline]
    pub fn tick(&mut self) {
        if self.source == NOISE_SOURCE_OSCILLATOR || self.sync {
            return;
        }
        self.counter += self.step;
        while self.counter >= self.threshold {
            self.counter -= self.threshold;
            self.shift();
        }
    }

    /// Clock pulse from the paired oscillator, honoured only for source 3
    #[inline]
    pub fn trigger(&mut self) {
        if self.source == NOISE_SOURCE_OSCILLATOR {
            self.shift();
        }
    }

    /// Current output level (0 or 2)
    #[inline]
    pub fn level(&self) -> u8 {
        ((self.lfsr & 1) as u8) << 1
    }

    /// Raw shift register contents
    pub fn lfsr(&self) -> u32 {
        self.lfsr
    }

    #[inline]
    fn shift(&mut self) {
        let taps = self.lfsr & 0x4000_0004;
        let feedback = u32::from(taps == 0x4000_0000 || taps == 0x0000_0004);
        self.lfsr = ((self.lfsr << 1) | feedback) & 0x7FFF_FFFF;
    }
}
