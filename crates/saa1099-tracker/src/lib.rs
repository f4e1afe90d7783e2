//! SAA-1099 Tracker Song Model and Sequencer
//!
//! This crate turns tracker songs into register writes and stereo audio for
//! the Philips SAA-1099. It covers the song data model, the JSON song format
//! and a sample-accurate sequencer driving any [`saa1099::Saa1099Backend`].
//!
//! # Features
//!
//! - 96-note table over eight octaves
//! - Samples, ornaments, 96-line patterns and a position order list
//! - Pattern commands: portamento, glissando, vibrato, tremolo, volume
//!   slide, false chords, delays, breaks, envelopes, noise source, speed
//! - Line, position, song and sample playback modes
//! - Silent simulation with per-position checkpoints for instant seeking
//! - JSON song files (version 1.2, legacy 1.1 read support)
//! - Lock-protected shared handle for audio callbacks
//!
//! # Example
//!
//! ```no_run
//! use saa1099_tracker::{Player, format};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let song = format::load_file("song.json")?;
//! let mut player = Player::new(song);
//! player.count_position_frames(None);
//! player.play_position(true, true, true);
//!
//! let mut left = vec![0.0; 4096];
//! let mut right = vec![0.0; 4096];
//! player.get_audio(&mut left, &mut right);
//! # Ok(())
//! # }
//! ```

// Error handling
mod error;
pub use error::{Result, TrackerError};

// Song data
pub mod effects;
pub mod runtime;
pub mod song;
pub mod tones;

// File format
pub mod format;

// Sequencer
pub mod player;

pub use effects::Command;
pub use player::{PlayMode, Player, PlayerConfig, SharedPlayer};
pub use runtime::{ChannelParams, Runtime};
pub use song::{
    ChannelAssignment, Ornament, Pattern, PatternLine, Position, Sample, SampleTick, Song, Volume,
};
pub use tones::{MAX_TONE, Tone, tone, tone_name};
