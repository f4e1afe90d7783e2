//! Philips SAA-1099 Sound Generator Emulator
//!
//! A sample-accurate emulator of the SAA-1099 as found in the SAM Coupé and
//! Creative Music System cards: six square-wave oscillators, two noise
//! generators and two envelope controllers behind 32 write-only registers.
//!
//! # Features
//! - Bit-exact period, noise and envelope tables evaluated at compile time
//! - Frequency write buffering, including the octave-then-offset latch quirk
//! - Oscillator-clocked noise and envelopes, address-clocked envelopes
//! - Independent host mute and chip sound-enable per channel
//! - Register snapshot save/restore for seeking
//!
//! # Backend Trait
//! The [`Saa1099Backend`] trait lets sequencers drive either the emulator or
//! a substitute (for example a register-recording test double).
//!
//! # Quick start
//! ```
//! use saa1099::{Register, Saa1099};
//!
//! let mut chip = Saa1099::new();
//! chip.write(Register::AMPLITUDE_0, 0xFF); // full volume both sides
//! chip.write(Register::OFFSET_0, 0x21);
//! chip.write(Register::OCTAVE_01, 0x03);
//! chip.write(Register::TONE_ENABLE, 0x01);
//! chip.write(Register::SOUND_ENABLE, 0x01);
//!
//! let mut left = vec![0.0; 882];
//! let mut right = vec![0.0; 882];
//! chip.render(&mut left, &mut right, 882, 0);
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod chip;
pub mod envelope;
pub mod generators;
pub mod mixer;
pub mod registers;
pub mod tables;

/// Error types for SAA-1099 emulator operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Saa1099Error {
    /// Register address outside 0-31
    #[error("Invalid register address: {0} (valid range 0-31)")]
    InvalidRegister(u8),

    /// Channel index outside 0-5
    #[error("Invalid channel: {0} (valid range 0-5)")]
    InvalidChannel(usize),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Result type for SAA-1099 operations
pub type Result<T> = std::result::Result<T, Saa1099Error>;

pub use backend::Saa1099Backend;
pub use chip::{ChipConfig, DEFAULT_SAMPLE_RATE, Saa1099};
pub use envelope::EnvelopeGenerator;
pub use generators::{NUM_CHANNELS, NoiseGenerator, PendingFrequency, ToneGenerator};
pub use mixer::{ChannelMixer, MixMode};
pub use registers::{REGISTER_COUNT, Register};
