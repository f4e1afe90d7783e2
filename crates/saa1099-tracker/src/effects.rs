//! Pattern command definitions.
//!
//! Each pattern line carries a command nibble and an 8-bit parameter. They
//! decode into [`Command`]; continuous commands stay active on the channel
//! across lines until replaced or cancelled with `C00`.

/// Half-sine modulation table used by vibrato and tremolo
pub const MODULATION_TABLE: [u8; 16] = [
    25, 74, 120, 162, 197, 225, 244, 254, 254, 244, 225, 197, 162, 120, 74, 25,
];

/// Decoded pattern command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Command {
    /// No command
    #[default]
    None,
    /// `1xy`: raise pitch by `delta` every `period` ticks
    PortamentoUp { period: u8, delta: u8 },
    /// `2xy`: lower pitch by `delta` every `period` ticks
    PortamentoDown { period: u8, delta: u8 },
    /// `3xy`: glide toward the line's note by `delta` every `period` ticks
    Glissando { period: u8, delta: u8 },
    /// `4xy`: pitch modulation, half-cycle `period` ticks, amplitude `depth`
    Vibrato { period: u8, depth: u8 },
    /// `5xy`: volume modulation, half-cycle `period` ticks, amplitude `depth`
    Tremolo { period: u8, depth: u8 },
    /// `6xx`: hold the ornament at offset 0 for `xx` ticks
    OrnamentDelay(u8),
    /// `7xx`: jump the ornament cursor
    OrnamentOffset(u8),
    /// `8xx`: keep the sample silent for `xx` ticks
    SampleDelay(u8),
    /// `9xx`: jump the sample cursor
    SampleOffset(u8),
    /// `Axy`: per-tick attenuation change, signed nibbles, positive is louder
    VolumeSlide { left: i8, right: i8 },
    /// `Bxx`: continue the channel's pattern at line `xx` after this line
    Break(u8),
    /// `C00`: cancel the running continuous command
    Clear,
    /// `CF0`/`CF1`: normal or swapped stereo
    StereoSwap(bool),
    /// `Cxy`: cycle the note through `+0`, `+x`, `+y` semitones every tick
    Chord { first: u8, second: u8 },
    /// `Dxx`: delay the line by `xx` ticks
    LineDelay(u8),
    /// `E0x`/`E1x`: envelope control byte for the channel's group
    Envelope(u8),
    /// `EDx`: envelope off for the channel's group
    EnvelopeOff,
    /// `E2x`: noise clock source for the channel's group
    NoiseSource(u8),
    /// `Fxx`: ticks per line from the next line on
    Speed(u8),
}

#[inline]
fn signed_nibble(n: u8) -> i8 {
    let n = (n & 0x0F) as i8;
    if n >= 8 { n - 16 } else { n }
}

impl Command {
    /// Decode a command nibble and parameter
    ///
    /// Unknown sub-commands decode to [`Command::None`].
    pub fn decode(cmd: u8, data: u8) -> Command {
        let hi = data >> 4;
        let lo = data & 0x0F;
        match cmd & 0x0F {
            0x1 => Command::PortamentoUp { period: hi, delta: lo },
            0x2 => Command::PortamentoDown { period: hi, delta: lo },
            0x3 => Command::Glissando { period: hi, delta: lo },
            0x4 => Command::Vibrato { period: hi, depth: lo },
            0x5 => Command::Tremolo { period: hi, depth: lo },
            0x6 => Command::OrnamentDelay(data),
            0x7 => Command::OrnamentOffset(data),
            0x8 => Command::SampleDelay(data),
            0x9 => Command::SampleOffset(data),
            0xA => Command::VolumeSlide {
                left: signed_nibble(hi),
                right: signed_nibble(lo),
            },
            0xB => Command::Break(data),
            0xC => match data {
                0x00 => Command::Clear,
                0xF0 => Command::StereoSwap(false),
                0xF1 => Command::StereoSwap(true),
                _ => Command::Chord { first: hi, second: lo },
            },
            0xD => Command::LineDelay(data),
            0xE => match hi {
                0x0 => Command::Envelope(envelope_control(lo, false)),
                0x1 => Command::Envelope(envelope_control(lo, true)),
                0x2 => Command::NoiseSource(lo & 0x03),
                0xD => Command::EnvelopeOff,
                _ => Command::None,
            },
            0xF => Command::Speed(data),
            _ => Command::None,
        }
    }

    /// Whether the command keeps running on later ticks and lines
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            Command::PortamentoUp { .. }
                | Command::PortamentoDown { .. }
                | Command::Glissando { .. }
                | Command::Vibrato { .. }
                | Command::Tremolo { .. }
                | Command::VolumeSlide { .. }
                | Command::Chord { .. }
        )
    }
}

/// Envelope control byte: enabled, shape from bits 0-2, invert from bit 3
fn envelope_control(x: u8, three_bit: bool) -> u8 {
    let base = 0x80 | ((x & 0x07) << 1) | ((x >> 3) & 0x01);
    if three_bit { base | 0x10 } else { base }
}

/// Signed modulation value for command tick `phase`
///
/// One half-cycle lasts `period` ticks (0 is treated as 1); odd half-cycles
/// are negative.
pub fn modulation(phase: u32, period: u8, depth: u8) -> i32 {
    let period = u32::from(period.max(1));
    let k = phase % period;
    let index = (((2 * k + 1) * 8) / period).min(15) as usize;
    let magnitude = (i32::from(MODULATION_TABLE[index]) * i32::from(depth) + 128) >> 8;
    if (phase / period) & 1 == 1 {
        -magnitude
    } else {
        magnitude
    }
}

/// Semitone offset of a false chord at command tick `phase`
pub fn chord_offset(phase: u32, first: u8, second: u8) -> i32 {
    let mut steps = [0i32; 3];
    let mut len = 1;
    for n in [first, second] {
        if n != 0 {
            steps[len] = i32::from(n);
            len += 1;
        }
    }
    steps[(phase as usize) % len]
}
