//! Samples (per-tick volume/frequency envelopes) and ornaments (per-tick
//! semitone offsets).

/// Ticks stored per sample or ornament
pub const SAMPLE_LENGTH: usize = 256;

/// Largest pitch shift magnitude a sample tick can store
pub const MAX_SHIFT: i16 = 0xFFF;

/// Stereo volume pair, each side 0-15
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Volume {
    /// Left channel level
    pub left: u8,
    /// Right channel level
    pub right: u8,
}

impl Volume {
    /// Both sides silent
    pub const SILENT: Volume = Volume { left: 0, right: 0 };

    /// Create a volume, clamping each side to 15
    pub fn new(left: u8, right: u8) -> Self {
        Self {
            left: left.min(15),
            right: right.min(15),
        }
    }

    /// Decode the register form `L | R << 4`
    pub fn from_byte(byte: u8) -> Self {
        Self {
            left: byte & 0x0F,
            right: byte >> 4,
        }
    }

    /// Encode into the register form `L | R << 4`
    pub fn to_byte(self) -> u8 {
        (self.left & 0x0F) | ((self.right & 0x0F) << 4)
    }

    /// Swap left and right
    pub fn swapped(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }

    /// True when both sides are zero
    pub fn is_silent(self) -> bool {
        self.left == 0 && self.right == 0
    }
}

/// One tick of a sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleTick {
    /// Output volume before attenuation
    pub volume: Volume,
    /// Route the oscillator to the channel
    pub enable_freq: bool,
    /// Route the group's noise generator to the channel
    pub enable_noise: bool,
    /// Noise clock source (0-3) requested while noise is enabled
    pub noise_value: u8,
    /// Fine pitch shift added to the note
    pub shift: i16,
}

impl SampleTick {
    /// Flags nibble: bit 0 tone, bit 1 noise, bits 2-3 noise value
    pub fn flags(&self) -> u8 {
        u8::from(self.enable_freq) | (u8::from(self.enable_noise) << 1) | ((self.noise_value & 0x03) << 2)
    }

    /// Apply a flags nibble produced by [`flags`](Self::flags)
    pub fn set_flags(&mut self, flags: u8) {
        self.enable_freq = flags & 0x01 != 0;
        self.enable_noise = flags & 0x02 != 0;
        self.noise_value = (flags >> 2) & 0x03;
    }
}

/// Instrument: a sequence of ticks with optional loop
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Display name
    pub name: String,
    /// Tick data
    pub data: [SampleTick; SAMPLE_LENGTH],
    /// Tick the loop restarts from
    pub loop_start: usize,
    /// One past the last tick played
    pub end: usize,
    /// A released note leaves the loop and plays the tail
    pub releasable: bool,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            name: String::new(),
            data: [SampleTick::default(); SAMPLE_LENGTH],
            loop_start: 0,
            end: 0,
            releasable: false,
        }
    }
}

impl Sample {
    /// Whether the sample repeats `loop_start..end`
    pub fn is_looping(&self) -> bool {
        self.loop_start < self.end
    }

    /// Clamp `end` and `loop_start` into range
    pub fn normalize(&mut self) {
        self.end = self.end.min(SAMPLE_LENGTH);
        self.loop_start = self.loop_start.min(self.end);
    }
}

/// Per-tick semitone offsets applied to the note
#[derive(Debug, Clone, PartialEq)]
pub struct Ornament {
    /// Display name
    pub name: String,
    /// Offsets in semitones
    pub data: [i8; SAMPLE_LENGTH],
    /// Tick the loop restarts from
    pub loop_start: usize,
    /// One past the last tick used
    pub end: usize,
}

impl Default for Ornament {
    fn default() -> Self {
        Self {
            name: String::new(),
            data: [0; SAMPLE_LENGTH],
            loop_start: 0,
            end: 0,
        }
    }
}

impl Ornament {
    /// Whether the ornament repeats `loop_start..end`
    pub fn is_looping(&self) -> bool {
        self.loop_start < self.end
    }

    /// Clamp `end` and `loop_start` into range
    pub fn normalize(&mut self) {
        self.end = self.end.min(SAMPLE_LENGTH);
        self.loop_start = self.loop_start.min(self.end);
    }

    /// Offset at `cursor`, 0 past the end
    pub fn offset(&self, cursor: usize) -> i8 {
        if cursor < self.end {
            self.data[cursor]
        } else {
            0
        }
    }
}
