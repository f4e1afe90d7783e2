//! Backend trait abstraction for SAA-1099 chip implementations
//!
//! Sequencers drive the chip through this interface, so a recording or
//! alternative implementation can stand in for the emulator.

use crate::Result;
use crate::chip::Saa1099;
use crate::registers::{REGISTER_COUNT, Register};

/// Common interface for SAA-1099 backends
///
/// # Example
///
/// ```
/// use saa1099::{Register, Saa1099, Saa1099Backend};
///
/// fn play_note<B: Saa1099Backend>(chip: &mut B) {
///     chip.write(Register::AMPLITUDE_0, 0xFF);
///     chip.write(Register::OFFSET_0, 0x21);
///     chip.write(Register::OCTAVE_01, 0x03);
///     chip.write(Register::TONE_ENABLE, 0x01);
///     chip.write(Register::SOUND_ENABLE, 0x01);
///
///     let mut left = [0.0; 256];
///     let mut right = [0.0; 256];
///     chip.render(&mut left, &mut right, 256, 0);
/// }
///
/// play_note(&mut Saa1099::new());
/// ```
pub trait Saa1099Backend: Send {
    /// Reset to the power-on register state
    fn reset(&mut self);

    /// Latch `reg` and write `value` to it
    fn write(&mut self, reg: Register, value: u8);

    /// Last value written to `reg`
    fn read(&self, reg: Register) -> u8;

    /// Snapshot of all registers
    fn registers(&self) -> [u8; REGISTER_COUNT];

    /// Restore a register snapshot taken with [`registers`](Self::registers)
    fn load_registers(&mut self, registers: &[u8; REGISTER_COUNT]);

    /// Host-side mute of one channel
    ///
    /// # Errors
    ///
    /// `InvalidChannel` when `channel > 5`.
    fn set_channel_mute(&mut self, channel: usize, mute: bool) -> Result<()>;

    /// Whether the host muted `channel`
    fn is_channel_muted(&self, channel: usize) -> bool;

    /// Render `count` stereo samples starting at `offset`
    fn render(&mut self, left: &mut [f32], right: &mut [f32], count: usize, offset: usize);

    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;
}

impl Saa1099Backend for Saa1099 {
    fn reset(&mut self) {
        Saa1099::reset(self);
    }

    fn write(&mut self, reg: Register, value: u8) {
        Saa1099::write(self, reg, value);
    }

    fn read(&self, reg: Register) -> u8 {
        Saa1099::read(self, reg)
    }

    fn registers(&self) -> [u8; REGISTER_COUNT] {
        Saa1099::registers(self)
    }

    fn load_registers(&mut self, registers: &[u8; REGISTER_COUNT]) {
        Saa1099::load_registers(self, registers);
    }

    fn set_channel_mute(&mut self, channel: usize, mute: bool) -> Result<()> {
        self.mute(channel, mute)
    }

    fn is_channel_muted(&self, channel: usize) -> bool {
        self.is_muted(channel)
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32], count: usize, offset: usize) {
        Saa1099::render(self, left, right, count, offset);
    }

    fn sample_rate(&self) -> u32 {
        Saa1099::sample_rate(self)
    }
}
