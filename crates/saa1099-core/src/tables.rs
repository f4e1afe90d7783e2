//! Static lookup tables for the SAA-1099
//!
//! Every table is evaluated at compile time, so there is no lazy
//! initialisation and no first-use cost on the audio thread.

/// Number of octaves selectable per oscillator
pub const OCTAVES: usize = 8;

/// Highest per-channel output level produced by the mixer (`15 * 32`)
pub const MAX_CHANNEL_LEVEL: usize = 480;

/// Divisor that maps the summed level of all six channels onto `0.0..=1.0`
const LEVEL_DIVISOR: f32 = 2880.0;

/// Oscillator step per output sample, in half-cycles scaled by 4096
///
/// Indexed `[octave][offset]`. An oscillator with a counter threshold of
/// `sample_rate << 12` toggles once per `threshold / FREQ_TABLE[o][f]` samples.
pub static FREQ_TABLE: [[u32; 256]; OCTAVES] = build_freq_table();

/// Linear amplitude for every possible per-channel mixer output
pub static LEVEL_TABLE: [f32; MAX_CHANNEL_LEVEL + 1] = build_level_table();

const fn build_freq_table() -> [[u32; 256]; OCTAVES] {
    let mut table = [[0u32; 256]; OCTAVES];
    let mut octave = 0;
    while octave < OCTAVES {
        let mut offset = 0;
        while offset < 256 {
            let numerator = 32_000_000u64 << octave;
            let denominator = (511 - offset) as u64;
            // round to nearest in integer arithmetic
            let rounded = (2 * numerator + denominator) / (2 * denominator);
            table[octave][offset] = (rounded << 2) as u32;
            offset += 1;
        }
        octave += 1;
    }
    table
}

const fn build_level_table() -> [f32; MAX_CHANNEL_LEVEL + 1] {
    let mut table = [0.0f32; MAX_CHANNEL_LEVEL + 1];
    let mut i = 0;
    while i <= MAX_CHANNEL_LEVEL {
        table[i] = i as f32 / LEVEL_DIVISOR;
        i += 1;
    }
    table
}

// ============================================================================
// Envelope shapes
// ============================================================================

/// Level data for one envelope waveform
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeShape {
    /// Number of 16-step phases (1 or 2)
    pub phases: usize,
    /// Restart at phase 0 after the last phase instead of ending
    pub looping: bool,
    /// Levels indexed `[resolution][phase][position]`; resolution 1 is 3-bit
    pub levels: [[[u8; 16]; 2]; 2],
}

const ZERO: [u8; 16] = [0; 16];
const FULL: [u8; 16] = [15; 16];
const DECAY: [u8; 16] = [15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0];
const ATTACK: [u8; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

const fn three_bit(levels: [u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    let mut i = 0;
    while i < 16 {
        out[i] = levels[i] & 0x0E;
        i += 1;
    }
    out
}

const fn shape(phases: usize, looping: bool, first: [u8; 16], second: [u8; 16]) -> EnvelopeShape {
    EnvelopeShape {
        phases,
        looping,
        levels: [
            [first, second],
            [three_bit(first), three_bit(second)],
        ],
    }
}

/// The eight envelope waveforms, indexed by control bits 1-3
pub static ENVELOPE_SHAPES: [EnvelopeShape; 8] = [
    // zero amplitude
    shape(1, false, ZERO, ZERO),
    // maximum amplitude
    shape(1, true, FULL, ZERO),
    // single decay
    shape(1, false, DECAY, ZERO),
    // repetitive decay
    shape(1, true, DECAY, ZERO),
    // single triangular
    shape(2, false, ATTACK, DECAY),
    // repetitive triangular
    shape(2, true, ATTACK, DECAY),
    // single attack, then silence
    shape(2, false, ATTACK, ZERO),
    // repetitive attack
    shape(1, true, ATTACK, ZERO),
];
