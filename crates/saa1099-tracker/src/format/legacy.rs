//! Version 1.1 song data: one base64 blob per entity.
//!
//! Every function here is a pure transform from bytes to model values.
//! Incomplete trailing records are dropped. Values the current format cannot
//! hold are brought into range with a warning, so saving never loses a line.

use base64::{Engine as _, engine::general_purpose};
use log::warn;
use saa1099::NUM_CHANNELS;

use crate::error::Result;
use crate::song::{ChannelAssignment, MAX_SHIFT, PatternLine, SampleTick, Volume};

const SAMPLE_TICK_BYTES: usize = 4;
const PATTERN_LINE_BYTES: usize = 7;
const CHANNEL_BYTES: usize = 2;

/// Decode a base64 blob
pub(super) fn unpack(data: &str) -> Result<Vec<u8>> {
    Ok(general_purpose::STANDARD.decode(data.trim())?)
}

fn check_stride(bytes: &[u8], stride: usize, what: &str) {
    if bytes.len() % stride != 0 {
        warn!(
            "{what} data has {} trailing bytes, ignoring them",
            bytes.len() % stride
        );
    }
}

/// `[volume, flags, shift lo, shift hi]` per tick
pub(super) fn sample_ticks(bytes: &[u8]) -> Vec<SampleTick> {
    check_stride(bytes, SAMPLE_TICK_BYTES, "sample");
    bytes
        .chunks_exact(SAMPLE_TICK_BYTES)
        .map(|b| {
            let shift = i16::from_le_bytes([b[2], b[3]]);
            let mut tick = SampleTick {
                volume: Volume::from_byte(b[0]),
                shift: shift.clamp(-MAX_SHIFT, MAX_SHIFT),
                ..Default::default()
            };
            if tick.shift != shift {
                warn!("sample shift {shift} out of range, clamped to {}", tick.shift);
            }
            tick.set_flags(b[1]);
            tick
        })
        .collect()
}

/// One signed byte per tick
pub(super) fn ornament_ticks(bytes: &[u8]) -> Vec<i8> {
    bytes.iter().map(|&b| b as i8).collect()
}

/// `[tone, flags, sample, ornament, volume, cmd, data]` per line
pub(super) fn pattern_lines(bytes: &[u8]) -> Vec<PatternLine> {
    check_stride(bytes, PATTERN_LINE_BYTES, "pattern");
    bytes
        .chunks_exact(PATTERN_LINE_BYTES)
        .map(|b| {
            let mut line = PatternLine {
                tone: b[0],
                sample: b[2],
                ornament: b[3],
                volume: Volume::from_byte(b[4]),
                cmd: b[5] & 0x0F,
                cmd_data: b[6],
                ..Default::default()
            };
            line.set_flags(b[1]);
            if line.clamp_references() {
                warn!("pattern line {b:02X?} names a missing note, sample or ornament, using 0");
            }
            line
        })
        .collect()
}

/// `[pattern, pitch]` for each of the six channels
pub(super) fn position_channels(bytes: &[u8]) -> Vec<ChannelAssignment> {
    if bytes.len() != NUM_CHANNELS * CHANNEL_BYTES {
        warn!("position data has {} bytes, expected {}", bytes.len(), NUM_CHANNELS * CHANNEL_BYTES);
    }
    bytes
        .chunks_exact(CHANNEL_BYTES)
        .take(NUM_CHANNELS)
        .map(|b| ChannelAssignment {
            pattern: usize::from(b[0]),
            pitch: b[1] as i8,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_tick_bytes() {
        let ticks = sample_ticks(&[0x5A, 0x0B, 0xEE, 0xFF, 0x0F, 0x01, 0x10, 0x00, 0x99]);
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].volume, Volume::new(0xA, 0x5));
        assert_eq!(ticks[0].shift, -0x12);
        assert!(ticks[0].enable_freq && ticks[0].enable_noise);
        assert_eq!(ticks[0].noise_value, 2);
        assert_eq!(ticks[1].shift, 0x10);
        assert!(!ticks[1].enable_noise);
    }

    #[test]
    fn pattern_line_bytes() {
        let lines = pattern_lines(&[49, 0x01, 3, 2, 0x8F, 0x0F, 0x04]);
        assert_eq!(
            lines,
            vec![PatternLine {
                tone: 49,
                release: true,
                sample: 3,
                ornament: 2,
                ornament_release: false,
                volume: Volume::new(0xF, 0x8),
                cmd: 0xF,
                cmd_data: 4,
            }]
        );
    }

    #[test]
    fn bad_references_keep_the_rest_of_the_line() {
        let lines = pattern_lines(&[49, 0x00, 40, 17, 0xFF, 0x0F, 0x04, 120, 0x00, 2, 3, 0x11, 0x01, 0x22]);
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].tone, lines[0].sample, lines[0].ornament), (49, 0, 0));
        assert_eq!((lines[0].cmd, lines[0].cmd_data), (0xF, 0x04));
        assert_eq!(lines[0].volume, Volume::new(0xF, 0xF));
        assert_eq!((lines[1].tone, lines[1].sample, lines[1].ornament), (0, 2, 3));
    }

    #[test]
    fn oversized_shift_is_clamped() {
        let ticks = sample_ticks(&[0x00, 0x01, 0x00, 0x20, 0x00, 0x01, 0x00, 0xE0]);
        assert_eq!(ticks[0].shift, 0xFFF);
        assert_eq!(ticks[1].shift, -0xFFF);
    }

    #[test]
    fn position_bytes_are_pattern_pitch_pairs() {
        let channels = position_channels(&[1, 0xFE, 2, 0, 3, 12, 0, 0, 0, 0, 0, 0]);
        assert_eq!(channels.len(), NUM_CHANNELS);
        assert_eq!(channels[0], ChannelAssignment { pattern: 1, pitch: -2 });
        assert_eq!(channels[2], ChannelAssignment { pattern: 3, pitch: 12 });
    }

    #[test]
    fn unpack_rejects_invalid_base64() {
        assert!(unpack("AAEC").is_ok_and(|b| b == [0, 1, 2]));
        assert!(unpack("not base64!").is_err());
    }
}
