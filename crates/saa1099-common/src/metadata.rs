//! Song metadata access shared by all players.

use crate::FRAME_RATE_PAL;

/// Metadata fields common to every song format.
pub trait MetadataFields {
    /// Get the song title.
    fn title(&self) -> &str;

    /// Get the author/composer name.
    fn author(&self) -> &str;

    /// Get the file format identifier.
    fn format(&self) -> &str;

    /// Get the total frame (interrupt tick) count, if known.
    fn frame_count(&self) -> Option<usize> {
        None
    }

    /// Get the playback interrupt rate in Hz.
    fn frame_rate(&self) -> u32 {
        FRAME_RATE_PAL
    }

    /// Get the song duration in seconds, if known.
    fn duration_seconds(&self) -> Option<f32> {
        self.frame_count()
            .map(|fc| fc as f32 / self.frame_rate().max(1) as f32)
    }

    /// Get the loop start frame, if the song loops.
    fn loop_frame(&self) -> Option<usize> {
        None
    }
}

/// Marker over [`MetadataFields`] used as the player metadata bound.
pub trait PlaybackMetadata: MetadataFields {}

impl<T: MetadataFields> PlaybackMetadata for T {}
