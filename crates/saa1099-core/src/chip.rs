//! SAA-1099 chip emulation
//!
//! Ties the six oscillators, two noise generators, two envelope controllers
//! and six mixers together behind the chip's address/data register port.
//!
//! Device wiring inside each group of three channels:
//!
//! | Oscillator | Clocks |
//! |---|---|
//! | 0 / 3 | noise generator 0 / 1 (when its source is 3) |
//! | 1 / 4 | envelope 0 / 1 (when internally clocked) |
//! | 2 / 5 | nothing |
//!
//! Envelope 0 shapes channel 2 and envelope 1 shapes channel 5.

use serde::{Deserialize, Serialize};

use crate::envelope::EnvelopeGenerator;
use crate::generators::{NUM_CHANNELS, NUM_NOISE, NoiseGenerator, ToneGenerator};
use crate::mixer::ChannelMixer;
use crate::registers::{REGISTER_COUNT, Register};
use crate::tables::LEVEL_TABLE;
use crate::{Result, Saa1099Error};

/// Default output sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Register 28 with only the sync bit set
const SYNC_ONLY: u8 = 0x02;

/// Chip construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl ChipConfig {
    /// Reject configurations the chip cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Saa1099Error::ConfigError(
                "sample rate must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Device clocked by an oscillator edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockLink {
    Noise(usize),
    Envelope(usize),
    None,
}

const CLOCK_LINKS: [ClockLink; NUM_CHANNELS] = [
    ClockLink::Noise(0),
    ClockLink::Envelope(0),
    ClockLink::None,
    ClockLink::Noise(1),
    ClockLink::Envelope(1),
    ClockLink::None,
];

/// Philips SAA-1099 emulator
#[derive(Clone, Debug)]
pub struct Saa1099 {
    registers: [u8; REGISTER_COUNT],
    latch: u8,
    sample_rate: u32,
    tones: [ToneGenerator; NUM_CHANNELS],
    noise: [NoiseGenerator; NUM_NOISE],
    envelopes: [EnvelopeGenerator; 2],
    mixers: [ChannelMixer; NUM_CHANNELS],
}

impl Default for Saa1099 {
    fn default() -> Self {
        Self::build(DEFAULT_SAMPLE_RATE)
    }
}

impl Saa1099 {
    /// Create a chip rendering at 44.1 kHz
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chip rendering at `sample_rate` Hz
    ///
    /// # Errors
    ///
    /// `ConfigError` for a zero sample rate.
    pub fn with_sample_rate(sample_rate: u32) -> Result<Self> {
        Self::with_config(ChipConfig { sample_rate })
    }

    /// Create a chip from a validated configuration
    pub fn with_config(config: ChipConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config.sample_rate))
    }

    fn build(sample_rate: u32) -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
            latch: 0,
            sample_rate,
            tones: std::array::from_fn(|_| ToneGenerator::new(sample_rate)),
            noise: std::array::from_fn(|i| NoiseGenerator::new(i, sample_rate)),
            envelopes: [EnvelopeGenerator::new(), EnvelopeGenerator::new()],
            mixers: std::array::from_fn(|ch| {
                let envelope = match ch {
                    2 => Some(0),
                    5 => Some(1),
                    _ => None,
                };
                ChannelMixer::new(ch / 3, envelope)
            }),
        }
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Latch a register address
    ///
    /// Latching 24 or 25 clocks the matching envelope when it is set to
    /// external clocking.
    ///
    /// # Errors
    ///
    /// `InvalidRegister` when `addr > 31`; the latch is left unchanged.
    pub fn set_reg(&mut self, addr: u8) -> Result<()> {
        let reg = Register::new(addr)?;
        self.latch_register(reg);
        Ok(())
    }

    /// Write `data` to the latched register
    pub fn set_data(&mut self, data: u8) {
        let addr = self.latch;
        self.registers[usize::from(addr)] = data;
        self.apply(addr, data);
    }

    /// Latch `addr` and write `data` to it
    pub fn set_reg_data(&mut self, addr: u8, data: u8) -> Result<()> {
        self.set_reg(addr)?;
        self.set_data(data);
        Ok(())
    }

    /// Latch and write a validated register
    pub fn write(&mut self, reg: Register, data: u8) {
        self.latch_register(reg);
        self.set_data(data);
    }

    /// Last value written to `reg`
    pub fn read(&self, reg: Register) -> u8 {
        self.registers[reg.index()]
    }

    /// Snapshot of all 32 registers
    pub fn registers(&self) -> [u8; REGISTER_COUNT] {
        self.registers
    }

    /// Currently latched address
    pub fn latch(&self) -> u8 {
        self.latch
    }

    /// Reset to the power-on register state
    ///
    /// Sync is raised first so every oscillator restarts cleanly, all other
    /// registers are cleared from the top down, then sync and output are
    /// dropped.
    pub fn reset(&mut self) {
        self.store(Register::SOUND_ENABLE.addr(), SYNC_ONLY);
        for addr in (0..REGISTER_COUNT as u8).rev() {
            if addr != Register::SOUND_ENABLE.addr() {
                self.store(addr, 0);
            }
        }
        self.store(Register::SOUND_ENABLE.addr(), 0);
        self.latch = 0;
    }

    /// Restore a register snapshot
    ///
    /// Values are applied under sync so frequency data takes effect at once.
    /// Envelope addresses are not latched, so no external envelope clock
    /// fires.
    pub fn load_registers(&mut self, registers: &[u8; REGISTER_COUNT]) {
        let sound_enable = Register::SOUND_ENABLE.addr();
        self.store(sound_enable, SYNC_ONLY);
        for (addr, &value) in registers.iter().enumerate() {
            if addr as u8 != sound_enable {
                self.store(addr as u8, value);
            }
        }
        self.store(sound_enable, registers[usize::from(sound_enable)]);
    }

    /// Host-side mute of one channel
    ///
    /// Survives toggles of the sound-enable bit.
    pub fn mute(&mut self, channel: usize, mute: bool) -> Result<()> {
        let mixer = self
            .mixers
            .get_mut(channel)
            .ok_or(Saa1099Error::InvalidChannel(channel))?;
        mixer.set_user_muted(mute);
        Ok(())
    }

    /// Whether the host muted `channel`; out-of-range channels report `false`
    pub fn is_muted(&self, channel: usize) -> bool {
        self.mixers.get(channel).is_some_and(|m| m.is_user_muted())
    }

    /// Render `count` stereo samples into `left[offset..]` and `right[offset..]`
    ///
    /// Output is clamped to the shorter of the two buffers.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32], count: usize, offset: usize) {
        let end = (offset + count).min(left.len()).min(right.len());
        if offset >= end {
            return;
        }
        for i in offset..end {
            let (l, r) = self.next_sample();
            left[i] = l;
            right[i] = r;
        }
    }

    /// Oscillator of `channel`, for inspection
    pub fn tone(&self, channel: usize) -> Option<&ToneGenerator> {
        self.tones.get(channel)
    }

    /// Noise generator `index`, for inspection
    pub fn noise(&self, index: usize) -> Option<&NoiseGenerator> {
        self.noise.get(index)
    }

    /// Envelope controller `index`, for inspection
    pub fn envelope(&self, index: usize) -> Option<&EnvelopeGenerator> {
        self.envelopes.get(index)
    }

    #[inline]
    fn next_sample(&mut self) -> (f32, f32) {
        for noise in self.noise.iter_mut() {
            noise.tick();
        }

        let mut left = 0.0f32;
        let mut right = 0.0f32;
        for ch in 0..NUM_CHANNELS {
            let group = ch / 3;
            let edges = self.mixers[ch].tick(&mut self.tones[ch], &self.noise[group]);
            for _ in 0..edges {
                match CLOCK_LINKS[ch] {
                    ClockLink::Noise(n) => self.noise[n].trigger(),
                    ClockLink::Envelope(e) => self.envelopes[e].tick_internal(),
                    ClockLink::None => {}
                }
            }
            let envelope = self.mixers[ch].envelope_index().map(|e| &self.envelopes[e]);
            let (l, r) = self.mixers[ch].output(envelope);
            left += LEVEL_TABLE[l];
            right += LEVEL_TABLE[r];
        }
        (left, right)
    }

    fn latch_register(&mut self, reg: Register) {
        match reg {
            Register::ENVELOPE_0 => self.envelopes[0].tick_external(),
            Register::ENVELOPE_1 => self.envelopes[1].tick_external(),
            _ => {}
        }
        self.latch = reg.addr();
    }

    /// Store and apply a value without touching the latch
    fn store(&mut self, addr: u8, data: u8) {
        self.registers[usize::from(addr)] = data;
        self.apply(addr, data);
    }

    fn apply(&mut self, addr: u8, data: u8) {
        let addr = usize::from(addr);
        match addr {
            0x00..=0x05 => self.mixers[addr].set_amplitude(data),
            0x08..=0x0D => self.tones[addr - 0x08].set_offset(data),
            0x10..=0x12 => {
                let ch = (addr - 0x10) * 2;
                self.tones[ch].set_octave(data & 0x07);
                self.tones[ch + 1].set_octave((data >> 4) & 0x07);
            }
            0x14 => {
                for (ch, mixer) in self.mixers.iter_mut().enumerate() {
                    mixer.set_tone_enabled(data & (1 << ch) != 0);
                }
            }
            0x15 => {
                for (ch, mixer) in self.mixers.iter_mut().enumerate() {
                    mixer.set_noise_enabled(data & (1 << ch) != 0);
                }
            }
            0x16 => {
                self.noise[0].set_source(data & 0x03);
                self.noise[1].set_source((data >> 4) & 0x03);
            }
            0x18 => self.envelopes[0].set(data),
            0x19 => self.envelopes[1].set(data),
            0x1C => {
                let sync = data & 0x02 != 0;
                for tone in self.tones.iter_mut() {
                    tone.set_sync(sync);
                }
                for noise in self.noise.iter_mut() {
                    noise.set_sync(sync);
                }
                let enabled = data & 0x01 != 0;
                for mixer in self.mixers.iter_mut() {
                    mixer.set_output_enabled(enabled);
                }
            }
            _ => {}
        }
    }
}
