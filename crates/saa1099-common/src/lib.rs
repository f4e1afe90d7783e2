//! Common traits and types for SAA-1099 music players.
//!
//! # Traits
//!
//! - [`ChiptunePlayerBase`] - Object-safe stereo player interface
//! - [`ChiptunePlayer`] - Player interface with typed metadata access
//! - [`MetadataFields`] - Title, author and timing information
//!
//! # Example
//!
//! ```ignore
//! use saa1099_common::{ChiptunePlayerBase, PlaybackState};
//!
//! fn drain(player: &mut dyn ChiptunePlayerBase) {
//!     player.play();
//!     let mut left = vec![0.0; 1024];
//!     let mut right = vec![0.0; 1024];
//!     while player.state() == PlaybackState::Playing {
//!         player.generate_samples_into(&mut left, &mut right);
//!         // ... send buffers to audio device
//!     }
//! }
//! ```

#![warn(missing_docs)]

mod metadata;
mod player;

pub use metadata::{MetadataFields, PlaybackMetadata};
pub use player::{ChiptunePlayer, ChiptunePlayerBase, PlaybackState};

// ============================================================================
// Common Constants
// ============================================================================

/// Standard audio sample rate (44.1 kHz CD quality), as used by the chip.
pub use saa1099::DEFAULT_SAMPLE_RATE;

/// PAL frame rate (50 Hz), the usual interrupt rate of SAM Coupé software.
pub const FRAME_RATE_PAL: u32 = 50;

/// Number of audio channels per SAA-1099.
pub const CHANNEL_COUNT: usize = saa1099::NUM_CHANNELS;
