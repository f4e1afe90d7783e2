//! SAA-1099 envelope controller
//!
//! Two envelope controllers exist. Each one drives the amplitude of the
//! third channel of its group (channel 2 or 5) and is clocked either by the
//! second oscillator of the group or by writes of its own register address.
//!
//! Control byte layout:
//!
//! | Bit | Meaning |
//! |-----|---------|
//! | 7 | enable |
//! | 5 | external clock (address write) instead of oscillator 1/4 |
//! | 4 | 3-bit resolution |
//! | 3-1 | waveform |
//! | 0 | right channel inverted |

use crate::tables::{ENVELOPE_SHAPES, EnvelopeShape};

const ENABLE: u8 = 0x80;
const EXTERNAL_CLOCK: u8 = 0x20;
const THREE_BIT: u8 = 0x10;
const INVERT_RIGHT: u8 = 0x01;

/// Envelope generator state
#[derive(Clone, Debug)]
pub struct EnvelopeGenerator {
    shape: usize,
    invert_right: bool,
    clock_external: bool,
    /// 0 = 4-bit, 1 = 3-bit
    resolution: usize,
    enabled: bool,
    phase: usize,
    position: usize,
    ended: bool,
    pending: Option<u8>,
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeGenerator {
    /// Create a disabled envelope
    pub fn new() -> Self {
        Self {
            shape: 0,
            invert_right: false,
            clock_external: false,
            resolution: 0,
            enabled: false,
            phase: 0,
            position: 0,
            ended: true,
            pending: None,
        }
    }

    /// Write the control byte
    ///
    /// Enable and resolution take effect at once. Waveform, inversion and
    /// clock source load immediately when the envelope is disabled or has
    /// ended; otherwise they wait in a one-deep buffer for the next phase
    /// boundary.
    pub fn set(&mut self, data: u8) {
        self.enabled = data & ENABLE != 0;
        self.resolution = usize::from(data & THREE_BIT != 0);

        if !self.enabled {
            self.load(data);
            self.ended = true;
            self.pending = None;
        } else if self.ended {
            self.load(data);
        } else {
            self.pending = Some(data);
        }
    }

    /// Clock from the wired oscillator edge
    #[inline]
    pub fn tick_internal(&mut self) {
        if self.enabled && !self.clock_external {
            self.advance();
        }
    }

    /// Clock from a write to the envelope's register address
    #[inline]
    pub fn tick_external(&mut self) {
        if self.enabled && self.clock_external {
            self.advance();
        }
    }

    /// Whether the envelope currently controls its channel's amplitude
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a single-shot waveform has finished
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether a control write is waiting for a phase boundary
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Active waveform index (0-7)
    pub fn shape(&self) -> usize {
        self.shape
    }

    /// Current left level (0-15)
    #[inline]
    pub fn left(&self) -> u8 {
        self.current_shape().levels[self.resolution][self.phase][self.position]
    }

    /// Current right level, inverted against the resolution maximum when requested
    #[inline]
    pub fn right(&self) -> u8 {
        let left = self.left();
        if self.invert_right {
            (15 - self.resolution as u8) - left
        } else {
            left
        }
    }

    #[inline]
    fn current_shape(&self) -> &'static EnvelopeShape {
        &ENVELOPE_SHAPES[self.shape]
    }

    fn load(&mut self, data: u8) {
        self.shape = usize::from((data >> 1) & 0x07);
        self.invert_right = data & INVERT_RIGHT != 0;
        self.clock_external = data & EXTERNAL_CLOCK != 0;
        self.phase = 0;
        self.position = 0;
        self.ended = false;
    }

    fn advance(&mut self) {
        if self.ended {
            return;
        }
        self.position += if self.resolution == 1 { 2 } else { 1 };
        if self.position < 16 {
            return;
        }

        self.position -= 16;
        self.phase += 1;

        if let Some(data) = self.pending.take() {
            self.load(data);
            return;
        }

        let shape = self.current_shape();
        if self.phase >= shape.phases {
            if shape.looping {
                self.phase = 0;
            } else {
                self.ended = true;
                self.phase = shape.phases - 1;
                self.position = 15;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Enabled, internal clock, waveform `shape`.
    fn control(shape: u8) -> u8 {
        ENABLE | (shape << 1)
    }

    fn run(env: &mut EnvelopeGenerator, steps: usize) -> Vec<u8> {
        (0..steps)
            .map(|_| {
                let level = env.left();
                env.tick_internal();
                level
            })
            .collect()
    }

    #[test]
    fn zero_shape_is_silent() {
        let mut env = EnvelopeGenerator::new();
        env.set(control(0));
        assert!(run(&mut env, 64).iter().all(|&l| l == 0));
    }

    #[test]
    fn maximum_shape_holds_full_level() {
        let mut env = EnvelopeGenerator::new();
        env.set(control(1));
        assert!(run(&mut env, 64).iter().all(|&l| l == 15));

        env.set(control(1) | THREE_BIT);
        assert!(run(&mut env, 64).iter().all(|&l| l == 14));
    }

    #[test]
    fn single_decay_ends_silent() {
        let mut env = EnvelopeGenerator::new();
        env.set(control(2));
        let levels = run(&mut env, 16);
        assert_eq!(levels[0], 15);
        assert_eq!(levels[15], 0);
        assert!(env.is_ended());
        assert!(run(&mut env, 32).iter().all(|&l| l == 0));
    }

    #[test]
    fn repetitive_triangle_cycles_every_32_steps() {
        let mut env = EnvelopeGenerator::new();
        env.set(control(5));
        let levels = run(&mut env, 64);
        assert_eq!(levels[15], 15);
        assert_eq!(levels[16], 15);
        assert_eq!(levels[31], 0);
        assert_eq!(&levels[..32], &levels[32..]);
    }

    #[test]
    fn three_bit_resolution_steps_twice_as_fast() {
        let mut env = EnvelopeGenerator::new();
        env.set(control(3) | THREE_BIT);
        let levels = run(&mut env, 8);
        assert_eq!(levels, vec![14, 12, 10, 8, 6, 4, 2, 0]);
    }

    #[test]
    fn inverted_right_mirrors_left() {
        let mut env = EnvelopeGenerator::new();
        env.set(control(7) | INVERT_RIGHT);
        for _ in 0..16 {
            assert_eq!(env.left() + env.right(), 15);
            env.tick_internal();
        }
    }

    #[test]
    fn new_data_waits_for_phase_boundary() {
        let mut env = EnvelopeGenerator::new();
        env.set(control(3));
        env.tick_internal();
        env.set(control(1));
        assert!(env.has_pending());
        assert_eq!(env.shape(), 3);

        for _ in 0..15 {
            env.tick_internal();
        }
        assert!(!env.has_pending());
        assert_eq!(env.shape(), 1);
        assert_eq!(env.left(), 15);
    }

    #[test]
    fn disabling_loads_immediately() {
        let mut env = EnvelopeGenerator::new();
        env.set(control(3));
        env.tick_internal();
        env.set(0x00);
        assert!(!env.is_enabled());
        assert!(!env.has_pending());
        env.set(control(1));
        assert_eq!(env.shape(), 1);
    }

    #[test]
    fn clock_source_selects_tick_path() {
        let mut env = EnvelopeGenerator::new();
        env.set(control(3) | EXTERNAL_CLOCK);
        env.tick_internal();
        assert_eq!(env.left(), 15);
        env.tick_external();
        assert_eq!(env.left(), 14);
    }
}
