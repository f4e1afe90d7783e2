//! Unified stereo player trait.
//!
//! - [`ChiptunePlayerBase`] - Object-safe base trait for dynamic dispatch
//! - [`ChiptunePlayer`] - Full trait with associated `Metadata` type

use crate::{CHANNEL_COUNT, DEFAULT_SAMPLE_RATE, PlaybackMetadata};

/// Playback state for chiptune players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Player is stopped.
    #[default]
    Stopped,
    /// Player is actively playing.
    Playing,
}

/// Object-safe base trait for stereo chiptune players.
pub trait ChiptunePlayerBase: Send {
    /// Start or resume playback.
    fn play(&mut self);

    /// Stop playback.
    fn stop(&mut self);

    /// Get current playback state.
    fn state(&self) -> PlaybackState;

    /// Check if currently playing.
    fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Fill both channel buffers with audio.
    ///
    /// Renders `min(left.len(), right.len())` samples. When stopped the
    /// buffers receive silence.
    fn generate_samples_into(&mut self, left: &mut [f32], right: &mut [f32]);

    /// Render `count` samples into new buffers.
    fn generate_samples(&mut self, count: usize) -> (Vec<f32>, Vec<f32>) {
        let mut left = vec![0.0; count];
        let mut right = vec![0.0; count];
        self.generate_samples_into(&mut left, &mut right);
        (left, right)
    }

    /// Get the output sample rate in Hz.
    fn sample_rate(&self) -> u32 {
        DEFAULT_SAMPLE_RATE
    }

    /// Mute or unmute a specific channel.
    ///
    /// Default implementation does nothing.
    fn set_channel_mute(&mut self, _channel: usize, _mute: bool) {}

    /// Check if a channel is muted.
    fn is_channel_muted(&self, _channel: usize) -> bool {
        false
    }

    /// Get playback position as a fraction (0.0 to 1.0).
    fn playback_position(&self) -> f32 {
        0.0
    }

    /// Get the total duration in seconds, 0.0 if unknown.
    fn duration_seconds(&self) -> f32 {
        0.0
    }

    /// Get elapsed time in seconds based on playback position.
    fn elapsed_seconds(&self) -> f32 {
        self.playback_position() * self.duration_seconds()
    }

    /// Get the total number of audio channels.
    fn channel_count(&self) -> usize {
        CHANNEL_COUNT
    }
}

/// Player interface with typed metadata access.
///
/// Not object-safe because of the associated `Metadata` type; use
/// [`ChiptunePlayerBase`] for trait objects.
pub trait ChiptunePlayer: ChiptunePlayerBase {
    /// The metadata type for this player.
    type Metadata: PlaybackMetadata;

    /// Get song metadata.
    fn metadata(&self) -> &Self::Metadata;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silence {
        state: PlaybackState,
    }

    impl ChiptunePlayerBase for Silence {
        fn play(&mut self) {
            self.state = PlaybackState::Playing;
        }

        fn stop(&mut self) {
            self.state = PlaybackState::Stopped;
        }

        fn state(&self) -> PlaybackState {
            self.state
        }

        fn generate_samples_into(&mut self, left: &mut [f32], right: &mut [f32]) {
            left.fill(0.0);
            right.fill(0.0);
        }
    }

    #[test]
    fn defaults_describe_a_single_chip() {
        let mut player = Silence {
            state: PlaybackState::default(),
        };
        assert!(!player.is_playing());
        player.play();
        assert!(player.is_playing());
        assert_eq!(player.channel_count(), 6);
        assert_eq!(player.sample_rate(), 44_100);

        let (left, right) = player.generate_samples(16);
        assert_eq!(left.len(), 16);
        assert_eq!(right.len(), 16);

        let boxed: Box<dyn ChiptunePlayerBase> = Box::new(player);
        assert_eq!(boxed.elapsed_seconds(), 0.0);
    }
}
