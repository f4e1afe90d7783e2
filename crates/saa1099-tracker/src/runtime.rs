//! Mutable playback state.
//!
//! [`Runtime`] is everything the sequencer needs to resume at a given tick:
//! the last register file sent to the chip plus per-channel note state. It is
//! plain data, so checkpoints are simple clones.

use saa1099::{NUM_CHANNELS, REGISTER_COUNT};

use crate::effects::Command;
use crate::song::{PatternLine, Volume};

/// Per-channel sequencer state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelParams {
    /// Base note index (0 = none)
    pub tone: u8,
    /// A note is sounding
    pub playing: bool,
    /// The note was released
    pub released: bool,
    /// Active sample slot
    pub sample: u8,
    /// Next sample tick
    pub sample_cursor: usize,
    /// Active ornament slot
    pub ornament: u8,
    /// Next ornament tick
    pub ornament_cursor: usize,
    /// Attenuation per side, subtracted from the sample volume
    pub attenuation: Volume,
    /// Accumulated portamento/glissando shift in fine pitch units
    pub slide_shift: i32,
    /// Semitone transposition of the position's channel assignment
    pub transposition: i8,
    /// Line of the channel's pattern to load next
    pub pattern_line: usize,
    /// Line to continue from after the current one (`Bxx`)
    pub break_line: Option<usize>,
    /// Running continuous command
    pub command: Command,
    /// Ticks since `command` was set
    pub command_phase: u32,
    /// Vibrato contribution of the current tick
    pub pitch_mod: i32,
    /// Tremolo contribution of the current tick
    pub volume_mod: i32,
    /// Chord contribution of the current tick
    pub chord_mod: i32,
    /// Target note of a running glissando
    pub glide_target: Option<u8>,
    /// Remaining ticks before `delayed_line` loads
    pub line_delay: u8,
    /// Line waiting for its `Dxx` delay
    pub delayed_line: Option<PatternLine>,
    /// Remaining ticks the sample stays silent
    pub sample_delay: u8,
    /// Remaining ticks the ornament stays at offset 0
    pub ornament_delay: u8,
    /// Left/right volumes exchanged
    pub stereo_swap: bool,
}

impl ChannelParams {
    /// Silence the channel and drop any running command
    pub fn cut(&mut self) {
        self.playing = false;
        self.released = false;
        self.command = Command::None;
        self.glide_target = None;
        self.pitch_mod = 0;
        self.volume_mod = 0;
        self.chord_mod = 0;
    }
}

/// Complete sequencer state at a tick boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runtime {
    /// Register file as last written to the chip
    pub regs: [u8; REGISTER_COUNT],
    /// Host channel mutes
    pub mutes: [bool; NUM_CHANNELS],
    /// Per-channel state
    pub params: [ChannelParams; NUM_CHANNELS],
    /// Envelope control byte per channel group
    pub envelopes: [u8; 2],
    /// Noise source per channel group
    pub noise_sources: [u8; 2],
    /// Speed requested by `Fxx`, applied at the next line
    pub pending_speed: Option<u8>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            regs: [0; REGISTER_COUNT],
            mutes: [false; NUM_CHANNELS],
            params: [ChannelParams::default(); NUM_CHANNELS],
            envelopes: [0; 2],
            noise_sources: [0; 2],
            pending_speed: None,
        }
    }
}

impl Runtime {
    /// Copy of this state carrying `mutes` instead of the stored ones
    pub fn with_mutes(&self, mutes: [bool; NUM_CHANNELS]) -> Self {
        Self {
            mutes,
            ..self.clone()
        }
    }
}
