//! SAA-1099 register addresses
//!
//! The chip decodes 32 addresses. Unused ones are still stored so a full
//! register snapshot can be written back verbatim.

use std::fmt;

use crate::{Result, Saa1099Error};

/// Number of addressable registers
pub const REGISTER_COUNT: usize = 32;

/// A validated register address (0-31)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register(u8);

impl Register {
    /// Channel 0 amplitude (`L | R << 4`)
    pub const AMPLITUDE_0: Register = Register(0x00);
    /// Channel 5 amplitude
    pub const AMPLITUDE_5: Register = Register(0x05);
    /// Channel 0 frequency offset
    pub const OFFSET_0: Register = Register(0x08);
    /// Channel 5 frequency offset
    pub const OFFSET_5: Register = Register(0x0D);
    /// Octaves of channels 0 (low nibble) and 1 (high nibble)
    pub const OCTAVE_01: Register = Register(0x10);
    /// Octaves of channels 2 and 3
    pub const OCTAVE_23: Register = Register(0x11);
    /// Octaves of channels 4 and 5
    pub const OCTAVE_45: Register = Register(0x12);
    /// Oscillator enable, one bit per channel
    pub const TONE_ENABLE: Register = Register(0x14);
    /// Noise enable, one bit per channel
    pub const NOISE_ENABLE: Register = Register(0x15);
    /// Noise clock sources (bits 0-1 generator 0, bits 4-5 generator 1)
    pub const NOISE_SOURCE: Register = Register(0x16);
    /// Envelope controller 0
    pub const ENVELOPE_0: Register = Register(0x18);
    /// Envelope controller 1
    pub const ENVELOPE_1: Register = Register(0x19);
    /// Bit 0 sound enable, bit 1 sync/reset
    pub const SOUND_ENABLE: Register = Register(0x1C);

    /// Validate a raw address
    ///
    /// # Errors
    ///
    /// `InvalidRegister` when `addr > 31`.
    pub fn new(addr: u8) -> Result<Self> {
        if usize::from(addr) < REGISTER_COUNT {
            Ok(Register(addr))
        } else {
            Err(Saa1099Error::InvalidRegister(addr))
        }
    }

    /// Amplitude register of `channel` (0-5)
    pub fn amplitude(channel: usize) -> Result<Self> {
        check_channel(channel)?;
        Ok(Register(channel as u8))
    }

    /// Frequency offset register of `channel` (0-5)
    pub fn offset(channel: usize) -> Result<Self> {
        check_channel(channel)?;
        Ok(Register(0x08 + channel as u8))
    }

    /// Octave register shared by `channel` and its pair
    pub fn octave(channel: usize) -> Result<Self> {
        check_channel(channel)?;
        Ok(Register(0x10 + (channel / 2) as u8))
    }

    /// Raw address
    #[inline]
    pub fn addr(self) -> u8 {
        self.0
    }

    /// Address as an index into a register snapshot
    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Whether the chip assigns a function to this address
    pub fn is_mapped(self) -> bool {
        matches!(self.0, 0x00..=0x05 | 0x08..=0x0D | 0x10..=0x12 | 0x14..=0x16 | 0x18 | 0x19 | 0x1C)
    }

    /// Iterate over every address in ascending order
    pub fn all() -> impl Iterator<Item = Register> {
        (0..REGISTER_COUNT as u8).map(Register)
    }
}

fn check_channel(channel: usize) -> Result<()> {
    if channel < crate::generators::NUM_CHANNELS {
        Ok(())
    } else {
        Err(Saa1099Error::InvalidChannel(channel))
    }
}

impl TryFrom<u8> for Register {
    type Error = Saa1099Error;

    fn try_from(addr: u8) -> Result<Self> {
        Register::new(addr)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            a @ 0x00..=0x05 => write!(f, "Amplitude {a}"),
            a @ 0x08..=0x0D => write!(f, "Frequency {}", a - 0x08),
            a @ 0x10..=0x12 => {
                let low = (a - 0x10) * 2;
                write!(f, "Octave {}/{}", low, low + 1)
            }
            0x14 => write!(f, "Frequency enable"),
            0x15 => write!(f, "Noise enable"),
            0x16 => write!(f, "Noise generator clock"),
            0x18 => write!(f, "Envelope 0"),
            0x19 => write!(f, "Envelope 1"),
            0x1C => write!(f, "Sound enable / reset"),
            a => write!(f, "Unused 0x{a:02X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_address() {
        assert!(Register::new(31).is_ok());
        assert!(matches!(Register::new(32), Err(Saa1099Error::InvalidRegister(32))));
    }

    #[test]
    fn channel_helpers() {
        assert_eq!(Register::amplitude(5).map(Register::addr).ok(), Some(5));
        assert_eq!(Register::offset(2).map(Register::addr).ok(), Some(0x0A));
        assert_eq!(Register::octave(3).ok(), Some(Register::OCTAVE_23));
        assert!(matches!(Register::octave(6), Err(Saa1099Error::InvalidChannel(6))));
    }

    #[test]
    fn all_is_ascending_and_complete() {
        let regs: Vec<_> = Register::all().collect();
        assert_eq!(regs.len(), REGISTER_COUNT);
        assert!(regs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(regs.iter().filter(|r| r.is_mapped()).count(), 21);
    }

    #[test]
    fn display_names() {
        assert_eq!(Register::OCTAVE_45.to_string(), "Octave 4/5");
        assert_eq!(Register::ENVELOPE_1.to_string(), "Envelope 1");
    }
}
