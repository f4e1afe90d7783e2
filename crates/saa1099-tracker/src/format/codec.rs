//! Fixed-width text encodings of the current song format.
//!
//! | Entity | Layout | Fields |
//! |---|---|---|
//! | sample tick | `VVF±HHH` | volume hex, flags hex, sign, shift magnitude hex |
//! | ornament tick | signed base-36 | semitone offset |
//! | pattern line | `TTFSOVVCDD` | tone base-36, flags hex, sample base-36, ornament hex, volume hex, command hex, data hex |
//! | position channel | `PPP±HH` | pattern hex, sign, transposition magnitude hex |
//!
//! Decoders return `None` for anything that does not parse; the caller
//! substitutes the default entry. A pattern line that parses but names a
//! missing note, sample or ornament keeps its other fields.

use log::warn;

use crate::song::{ChannelAssignment, MAX_SHIFT, PatternLine, SampleTick, Volume};

/// Digits `0-9A-Z` of `value` in base 36, zero-padded to `width`
fn base36(mut value: u32, width: usize) -> String {
    let mut digits = Vec::new();
    loop {
        // `value % 36` is below 36, so the digit always exists.
        digits.push(char::from_digit(value % 36, 36).unwrap_or('0').to_ascii_uppercase());
        value /= 36;
        if value == 0 {
            break;
        }
    }
    while digits.len() < width {
        digits.push('0');
    }
    digits.iter().rev().collect()
}

fn sign(negative: bool) -> char {
    if negative { '-' } else { '+' }
}

fn parse_sign(s: &str) -> Option<bool> {
    match s {
        "+" => Some(false),
        "-" => Some(true),
        _ => None,
    }
}

fn hex(s: &str) -> Option<u16> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(s, 16).ok()
}

/// Length of `items` without its trailing default entries
pub(super) fn trimmed_len<T: Default + PartialEq>(items: &[T]) -> usize {
    let empty = T::default();
    items.iter().rposition(|item| *item != empty).map_or(0, |i| i + 1)
}

// ============================================================================
// Samples
// ============================================================================

pub(super) fn encode_sample_tick(tick: &SampleTick) -> String {
    format!(
        "{:02X}{:X}{}{:03X}",
        tick.volume.to_byte(),
        tick.flags(),
        sign(tick.shift < 0),
        tick.shift.unsigned_abs().min(MAX_SHIFT.unsigned_abs())
    )
}

pub(super) fn decode_sample_tick(s: &str) -> Option<SampleTick> {
    if s.len() != 7 || !s.is_ascii() {
        return None;
    }
    let volume = hex(&s[0..2])?;
    let flags = hex(&s[2..3])?;
    let negative = parse_sign(&s[3..4])?;
    let magnitude = hex(&s[4..7])? as i16;

    let mut tick = SampleTick {
        volume: Volume::from_byte(volume as u8),
        shift: if negative { -magnitude } else { magnitude },
        ..Default::default()
    };
    tick.set_flags(flags as u8);
    Some(tick)
}

// ============================================================================
// Ornaments
// ============================================================================

pub(super) fn encode_ornament_tick(offset: i8) -> String {
    let magnitude = base36(u32::from(offset.unsigned_abs()), 1);
    if offset < 0 { format!("-{magnitude}") } else { magnitude }
}

pub(super) fn decode_ornament_tick(s: &str) -> Option<i8> {
    i8::from_str_radix(s, 36).ok()
}

// ============================================================================
// Patterns
// ============================================================================

pub(super) fn encode_pattern_line(line: &PatternLine) -> String {
    let mut line = *line;
    line.clamp_references();
    format!(
        "{}{:X}{}{:X}{:02X}{:X}{:02X}",
        base36(u32::from(line.tone), 2),
        line.flags(),
        base36(u32::from(line.sample), 1),
        line.ornament,
        line.volume.to_byte(),
        line.cmd & 0x0F,
        line.cmd_data
    )
}

pub(super) fn decode_pattern_line(s: &str) -> Option<PatternLine> {
    if s.len() != 10 || !s.is_ascii() {
        return None;
    }
    let tone = u16::from_str_radix(&s[0..2], 36).ok()?;
    let sample = u8::from_str_radix(&s[3..4], 36).ok()?;

    let mut line = PatternLine {
        // above the note table either way; cleared below
        tone: u8::try_from(tone).unwrap_or(u8::MAX),
        sample,
        ornament: hex(&s[4..5])? as u8,
        volume: Volume::from_byte(hex(&s[5..7])? as u8),
        cmd: hex(&s[7..8])? as u8,
        cmd_data: hex(&s[8..10])? as u8,
        ..Default::default()
    };
    line.set_flags(hex(&s[2..3])? as u8);
    if line.clamp_references() {
        warn!("pattern line '{s}' names a missing note, sample or ornament, using 0");
    }
    Some(line)
}

// ============================================================================
// Positions
// ============================================================================

pub(super) fn encode_channel(channel: &ChannelAssignment) -> String {
    format!(
        "{:03X}{}{:02X}",
        channel.pattern.min(0xFFF),
        sign(channel.pitch < 0),
        channel.pitch.unsigned_abs()
    )
}

pub(super) fn decode_channel(s: &str) -> Option<ChannelAssignment> {
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }
    let pattern = usize::from(hex(&s[0..3])?);
    let negative = parse_sign(&s[3..4])?;
    let magnitude = i16::try_from(hex(&s[4..6])?).ok()?;
    let pitch = i8::try_from(if negative { -magnitude } else { magnitude }).ok()?;
    Some(ChannelAssignment { pattern, pitch })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_is_padded_and_uppercase() {
        assert_eq!(base36(0, 2), "00");
        assert_eq!(base36(35, 2), "0Z");
        assert_eq!(base36(96, 2), "2O");
        assert_eq!(base36(31, 1), "V");
    }

    #[test]
    fn sample_tick_layout() {
        let mut tick = SampleTick {
            volume: Volume::new(0xA, 0x5),
            shift: -0x12,
            ..Default::default()
        };
        tick.set_flags(0b1011);
        assert_eq!(encode_sample_tick(&tick), "5AB-012");
        assert_eq!(decode_sample_tick("5AB-012"), Some(tick));
        assert_eq!(encode_sample_tick(&SampleTick::default()), "000+000");
    }

    #[test]
    fn malformed_sample_tick_is_rejected() {
        assert_eq!(decode_sample_tick("5AB*012"), None);
        assert_eq!(decode_sample_tick("5AB-01"), None);
        assert_eq!(decode_sample_tick("5AB-0G2"), None);
        assert_eq!(decode_sample_tick("5AB-+12"), None);
    }

    #[test]
    fn ornament_ticks_are_signed_base36() {
        assert_eq!(encode_ornament_tick(12), "C");
        assert_eq!(encode_ornament_tick(-12), "-C");
        assert_eq!(encode_ornament_tick(-128), "-3K");
        assert_eq!(decode_ornament_tick("-c"), Some(-12));
        assert_eq!(decode_ornament_tick("-3K"), Some(-128));
        assert_eq!(decode_ornament_tick("3J"), Some(127));
        assert_eq!(decode_ornament_tick("3K"), None);
        assert_eq!(decode_ornament_tick("ZZ"), None);
    }

    #[test]
    fn pattern_line_layout() {
        let line = PatternLine {
            tone: 49,
            release: false,
            sample: 31,
            ornament: 15,
            ornament_release: true,
            volume: Volume::new(0xF, 0x8),
            cmd: 0xE,
            cmd_data: 0x0B,
        };
        let encoded = encode_pattern_line(&line);
        assert_eq!(encoded, "1D2VF8FE0B");
        assert_eq!(decode_pattern_line(&encoded), Some(line));
        assert_eq!(encode_pattern_line(&PatternLine::default()), "0000000000");
    }

    #[test]
    fn out_of_range_references_clear_only_their_field() {
        let line = decode_pattern_line("2P0W08FF04").expect("parses");
        assert_eq!((line.tone, line.sample), (0, 0));
        assert_eq!(line.volume, Volume::new(0xF, 0x8));
        assert_eq!((line.cmd, line.cmd_data), (0xF, 0x04));
        assert_eq!(decode_pattern_line("2O00000000").map(|l| l.tone), Some(96));
        assert_eq!(decode_pattern_line("ZZ00000000").map(|l| l.tone), Some(0));
    }

    #[test]
    fn encoder_never_widens_a_line() {
        let line = PatternLine {
            tone: 49,
            sample: 40,
            ornament: 17,
            cmd: 0xF,
            cmd_data: 0x04,
            ..Default::default()
        };
        assert_eq!(encode_pattern_line(&line), "1D00000F04");
    }

    #[test]
    fn channel_layout() {
        let channel = ChannelAssignment { pattern: 0x1A, pitch: -5 };
        assert_eq!(encode_channel(&channel), "01A-05");
        assert_eq!(decode_channel("01A-05"), Some(channel));
        assert_eq!(decode_channel("001-80").map(|c| c.pitch), Some(-128));
        assert_eq!(decode_channel("001+80"), None);
    }

    #[test]
    fn trimmed_len_ignores_trailing_defaults() {
        assert_eq!(trimmed_len(&[1, 0, 2, 0, 0]), 3);
        assert_eq!(trimmed_len::<i8>(&[0, 0]), 0);
    }
}
