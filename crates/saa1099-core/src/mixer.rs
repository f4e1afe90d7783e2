//! Per-channel amplitude and source mixing
//!
//! Each of the six channels combines its oscillator, the noise generator of
//! its group and optionally an envelope into a left/right level in
//! `0..=MAX_CHANNEL_LEVEL`. The chip converts those levels to floats through
//! [`LEVEL_TABLE`](crate::tables::LEVEL_TABLE).

use bitflags::bitflags;

use crate::envelope::EnvelopeGenerator;
use crate::generators::{NoiseGenerator, ToneGenerator};

bitflags! {
    /// Sources routed into a channel (registers 20 and 21)
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct MixMode: u8 {
        /// Oscillator enabled
        const TONE = 0b01;
        /// Noise enabled
        const NOISE = 0b10;
    }
}

/// Amplitude byte decoded into the multipliers the mixer needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmplitudeLevels {
    left_x16: u16,
    left_x32: u16,
    left_env: u16,
    left_env_x2: u16,
    right_x16: u16,
    right_x32: u16,
    right_env: u16,
    right_env_x2: u16,
}

impl AmplitudeLevels {
    /// Decode an amplitude register (`L | R << 4`)
    pub fn from_register(data: u8) -> Self {
        let left = u16::from(data & 0x0F);
        let right = u16::from(data >> 4);
        Self {
            left_x16: left * 16,
            left_x32: left * 32,
            left_env: left & 0x0E,
            left_env_x2: (left & 0x0E) * 2,
            right_x16: right * 16,
            right_x32: right * 32,
            right_env: right & 0x0E,
            right_env_x2: (right & 0x0E) * 2,
        }
    }
}

/// Mixer for one channel
#[derive(Clone, Debug)]
pub struct ChannelMixer {
    amplitude: AmplitudeLevels,
    mode: MixMode,
    noise: usize,
    envelope: Option<usize>,
    user_muted: bool,
    output_enabled: bool,
    /// 0, 1 (half level) or 2 (full level)
    intermediate: u8,
}

impl ChannelMixer {
    /// Create a mixer wired to noise generator `noise` and optionally an envelope
    pub fn new(noise: usize, envelope: Option<usize>) -> Self {
        Self {
            amplitude: AmplitudeLevels::default(),
            mode: MixMode::empty(),
            noise,
            envelope,
            user_muted: false,
            output_enabled: false,
            intermediate: 0,
        }
    }

    /// Load an amplitude register value
    pub fn set_amplitude(&mut self, data: u8) {
        self.amplitude = AmplitudeLevels::from_register(data);
    }

    /// Enable or disable the oscillator path
    pub fn set_tone_enabled(&mut self, enabled: bool) {
        self.mode.set(MixMode::TONE, enabled);
    }

    /// Enable or disable the noise path
    pub fn set_noise_enabled(&mut self, enabled: bool) {
        self.mode.set(MixMode::NOISE, enabled);
    }

    /// Current source selection
    pub fn mode(&self) -> MixMode {
        self.mode
    }

    /// Global output enable (register 28 bit 0)
    pub fn set_output_enabled(&mut self, enabled: bool) {
        self.output_enabled = enabled;
    }

    /// Host-side mute; independent of the global output enable
    pub fn set_user_muted(&mut self, muted: bool) {
        self.user_muted = muted;
    }

    /// Whether the host muted this channel
    pub fn is_user_muted(&self) -> bool {
        self.user_muted
    }

    /// Index of the noise generator feeding this channel
    pub fn noise_index(&self) -> usize {
        self.noise
    }

    /// Index of the envelope controlling this channel, if any
    pub fn envelope_index(&self) -> Option<usize> {
        self.envelope
    }

    /// Advance the oscillator one sample and latch the intermediate output
    ///
    /// # Returns
    ///
    /// Oscillator edges crossed, for clocking wired devices.
    #[inline]
    pub fn tick(&mut self, tone: &mut ToneGenerator, noise: &NoiseGenerator) -> u32 {
        let edges = tone.tick();
        let tone_level = tone.level();
        let noise_level = noise.level();
        self.intermediate = match (self.mode.contains(MixMode::TONE), self.mode.contains(MixMode::NOISE)) {
            (false, false) => 0,
            (true, false) => tone_level,
            (false, true) => noise_level,
            (true, true) => {
                if tone_level == 2 && noise_level != 0 {
                    1
                } else {
                    tone_level
                }
            }
        };
        edges
    }

    /// Left/right level for the current sample
    ///
    /// `envelope` is the controller wired to this channel; it only shapes the
    /// output while enabled.
    #[inline]
    pub fn output(&self, envelope: Option<&EnvelopeGenerator>) -> (usize, usize) {
        if self.user_muted || !self.output_enabled {
            return (0, 0);
        }
        let amp = &self.amplitude;
        let (left, right) = match envelope.filter(|env| env.is_enabled()) {
            Some(env) => {
                let env_left = u16::from(env.left());
                let env_right = u16::from(env.right());
                match self.intermediate {
                    0 => (env_left * amp.left_env_x2, env_right * amp.right_env_x2),
                    1 => (env_left * amp.left_env, env_right * amp.right_env),
                    _ => (0, 0),
                }
            }
            None => match self.intermediate {
                0 => (0, 0),
                1 => (amp.left_x16, amp.right_x16),
                _ => (amp.left_x32, amp.right_x32),
            },
        };
        (usize::from(left), usize::from(right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    fn tone_high() -> ToneGenerator {
        let mut tone = ToneGenerator::new(RATE);
        tone.set_sync(true);
        tone
    }

    #[test]
    fn amplitude_decoding() {
        let levels = AmplitudeLevels::from_register(0xF3);
        assert_eq!(levels.left_x16, 48);
        assert_eq!(levels.left_x32, 96);
        assert_eq!(levels.left_env, 2);
        assert_eq!(levels.right_x32, 480);
        assert_eq!(levels.right_env_x2, 28);
    }

    #[test]
    fn tone_only_outputs_full_level() {
        let mut mixer = ChannelMixer::new(0, None);
        mixer.set_output_enabled(true);
        mixer.set_amplitude(0xFF);
        mixer.set_tone_enabled(true);
        let mut tone = tone_high();
        let noise = NoiseGenerator::new(0, RATE);
        mixer.tick(&mut tone, &noise);
        assert_eq!(mixer.output(None), (480, 480));
    }

    #[test]
    fn disabled_sources_are_silent() {
        let mut mixer = ChannelMixer::new(0, None);
        mixer.set_output_enabled(true);
        mixer.set_amplitude(0xFF);
        let mut tone = tone_high();
        let noise = NoiseGenerator::new(0, RATE);
        mixer.tick(&mut tone, &noise);
        assert_eq!(mixer.output(None), (0, 0));
    }

    #[test]
    fn mutes_are_independent() {
        let mut mixer = ChannelMixer::new(0, None);
        mixer.set_amplitude(0x88);
        mixer.set_tone_enabled(true);
        let mut tone = tone_high();
        let noise = NoiseGenerator::new(0, RATE);
        mixer.tick(&mut tone, &noise);
        assert_eq!(mixer.output(None), (0, 0));

        mixer.set_output_enabled(true);
        assert_ne!(mixer.output(None), (0, 0));

        mixer.set_user_muted(true);
        assert_eq!(mixer.output(None), (0, 0));
        mixer.set_output_enabled(false);
        mixer.set_output_enabled(true);
        assert!(mixer.is_user_muted());
        assert_eq!(mixer.output(None), (0, 0));
    }

    #[test]
    fn enabled_envelope_gates_against_tone() {
        let mut mixer = ChannelMixer::new(0, Some(0));
        mixer.set_output_enabled(true);
        mixer.set_amplitude(0xFF);
        let mut env = EnvelopeGenerator::new();
        env.set(0x80 | (1 << 1));
        let mut tone = tone_high();
        let noise = NoiseGenerator::new(0, RATE);

        // no sources: intermediate 0 -> env * (L & 0xE) * 2
        mixer.tick(&mut tone, &noise);
        assert_eq!(mixer.output(Some(&env)), (15 * 28, 15 * 28));

        // tone high: intermediate 2 -> silent
        mixer.set_tone_enabled(true);
        mixer.tick(&mut tone, &noise);
        assert_eq!(mixer.output(Some(&env)), (0, 0));

        // disabled envelope falls back to the plain amplitude path
        env.set(0x00);
        assert_eq!(mixer.output(Some(&env)), (480, 480));
    }
}
