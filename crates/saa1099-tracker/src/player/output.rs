//! Per-channel output computation and register writing.

use saa1099::{NUM_CHANNELS, REGISTER_COUNT, Register, Saa1099Backend};

use super::{PlayMode, Player};
use crate::runtime::ChannelParams;
use crate::song::{Ornament, SAMPLE_LENGTH, Sample, SampleTick, Volume};
use crate::tones::{MAX_TONE, tone};

const REG_TONE_ENABLE: usize = 0x14;
const REG_NOISE_ENABLE: usize = 0x15;
const REG_NOISE_SOURCE: usize = 0x16;
const REG_ENVELOPE_0: usize = 0x18;
const REG_ENVELOPE_1: usize = 0x19;
const REG_SOUND_ENABLE: usize = 0x1C;

/// Highest combined fine pitch (octave 7, offset 255)
const MAX_PITCH: i32 = 0x7FF;

/// What one channel contributes to the register file this tick
#[derive(Debug, Clone, Copy, Default)]
struct ChannelOutput {
    volume: Volume,
    octave: u8,
    offset: u8,
    tone: bool,
    noise: bool,
    noise_source: Option<u8>,
}

/// Next sample tick, advancing the cursor; `None` once the sample has ended
fn step_sample(sample: &Sample, params: &mut ChannelParams) -> Option<SampleTick> {
    let through = sample.releasable && params.released;
    let looping = sample.is_looping() && !through;

    if looping && params.sample_cursor >= sample.end {
        params.sample_cursor = sample.loop_start;
    }
    let limit = if sample.is_looping() && through {
        SAMPLE_LENGTH
    } else {
        sample.end
    };
    if params.sample_cursor >= limit {
        return None;
    }

    let tick = sample.data[params.sample_cursor];
    params.sample_cursor += 1;
    if looping && params.sample_cursor >= sample.end {
        params.sample_cursor = sample.loop_start;
    }
    Some(tick)
}

/// Current ornament offset, advancing the cursor
fn step_ornament(ornament: &Ornament, params: &mut ChannelParams) -> i32 {
    if params.ornament_delay > 0 {
        params.ornament_delay -= 1;
        return 0;
    }
    if ornament.is_looping() && params.ornament_cursor >= ornament.end {
        params.ornament_cursor = ornament.loop_start;
    }
    let offset = i32::from(ornament.offset(params.ornament_cursor));
    params.ornament_cursor = (params.ornament_cursor + 1).min(SAMPLE_LENGTH);
    if ornament.is_looping() && params.ornament_cursor >= ornament.end {
        params.ornament_cursor = ornament.loop_start;
    }
    offset
}

/// Compute one channel's output for this tick and advance its cursors
fn channel_output(sample: &Sample, ornament: &Ornament, params: &mut ChannelParams) -> Option<ChannelOutput> {
    if !params.playing {
        return None;
    }
    if params.sample_delay > 0 {
        params.sample_delay -= 1;
        return None;
    }
    let Some(tick) = step_sample(sample, params) else {
        params.playing = false;
        return None;
    };
    let ornament_offset = step_ornament(ornament, params);

    let note = (i32::from(params.tone)
        + i32::from(params.transposition)
        + ornament_offset
        + params.chord_mod)
        .clamp(1, i32::from(MAX_TONE));
    let pitch = (tone(note as u8).pitch()
        + i32::from(tick.shift)
        + params.slide_shift
        + params.pitch_mod)
        .clamp(0, MAX_PITCH);

    let level = |vol: u8, attenuation: u8| {
        (i32::from(vol) - i32::from(attenuation) + params.volume_mod).clamp(0, 15) as u8
    };
    let mut volume = Volume {
        left: level(tick.volume.left, params.attenuation.left),
        right: level(tick.volume.right, params.attenuation.right),
    };
    if params.stereo_swap {
        volume = volume.swapped();
    }

    Some(ChannelOutput {
        volume,
        octave: (pitch >> 8) as u8,
        offset: (pitch & 0xFF) as u8,
        tone: tick.enable_freq,
        noise: tick.enable_noise,
        noise_source: tick.enable_noise.then_some(tick.noise_value & 0x03),
    })
}

impl<B: Saa1099Backend> Player<B> {
    /// Build the desired register file for this tick.
    ///
    /// Starts from the previous register file, so silent channels keep their
    /// last frequency and no register changes without reason.
    pub(crate) fn render_channels(&mut self) -> [u8; REGISTER_COUNT] {
        let mut regs = self.runtime.regs;
        let mut tone_enable = 0u8;
        let mut noise_enable = 0u8;
        let mut noise_sources = self.runtime.noise_sources;

        for ch in 0..NUM_CHANNELS {
            let params = &mut self.runtime.params[ch];
            let sample = self.song.sample(usize::from(params.sample));
            let ornament = self.song.ornament(usize::from(params.ornament));

            let Some(out) = channel_output(sample, ornament, params) else {
                regs[ch] = 0;
                continue;
            };

            regs[ch] = out.volume.to_byte();
            regs[0x08 + ch] = out.offset;
            let octave_reg = 0x10 + ch / 2;
            regs[octave_reg] = if ch % 2 == 0 {
                (regs[octave_reg] & 0xF0) | out.octave
            } else {
                (regs[octave_reg] & 0x0F) | (out.octave << 4)
            };
            if out.tone {
                tone_enable |= 1 << ch;
            }
            if out.noise {
                noise_enable |= 1 << ch;
            }
            if let Some(source) = out.noise_source {
                noise_sources[ch / 3] = source;
            }
        }

        regs[REG_TONE_ENABLE] = tone_enable;
        regs[REG_NOISE_ENABLE] = noise_enable;
        regs[REG_NOISE_SOURCE] = (noise_sources[0] & 0x03) | ((noise_sources[1] & 0x03) << 4);
        regs[REG_ENVELOPE_0] = self.runtime.envelopes[0];
        regs[REG_ENVELOPE_1] = self.runtime.envelopes[1];
        regs[REG_SOUND_ENABLE] = 0x01;
        regs
    }

    /// Write registers that differ from the last written file, in ascending
    /// address order, and remember the new file.
    ///
    /// Offsets (8-13) are written before octaves (16-18). A changed octave
    /// register arms the chip's offset latch for both channels of its pair,
    /// so a note that crosses an octave gets its new offset one half-cycle
    /// after its new octave. Simulation only updates state.
    pub(crate) fn commit_registers(&mut self, regs: [u8; REGISTER_COUNT]) {
        if self.mode != PlayMode::Simulation {
            for reg in Register::all() {
                let i = reg.index();
                if regs[i] != self.runtime.regs[i] {
                    self.chip_mut().write(reg, regs[i]);
                }
            }
        }
        self.runtime.regs = regs;
    }

    /// Silence every channel and enter [`PlayMode::Stopped`].
    pub(crate) fn halt(&mut self) {
        for params in self.runtime.params.iter_mut() {
            params.cut();
            params.delayed_line = None;
        }
        self.runtime.envelopes = [0; 2];

        let mut regs = self.runtime.regs;
        regs[..NUM_CHANNELS].fill(0);
        regs[REG_TONE_ENABLE] = 0;
        regs[REG_NOISE_ENABLE] = 0;
        regs[REG_ENVELOPE_0] = 0;
        regs[REG_ENVELOPE_1] = 0;

        self.mode = PlayMode::Stopped;
        self.stop_requested = false;
        self.commit_registers(regs);
        log::debug!("playback stopped at position {} line {}", self.position, self.line);
    }

    /// Cut one channel and silence it on the chip at once.
    pub(crate) fn silence_channel(&mut self, ch: usize) {
        let params = &mut self.runtime.params[ch];
        params.cut();
        params.delayed_line = None;

        let mut regs = self.runtime.regs;
        regs[ch] = 0;
        regs[REG_TONE_ENABLE] &= !(1 << ch);
        regs[REG_NOISE_ENABLE] &= !(1 << ch);
        self.commit_registers(regs);
    }
}
