//! Note table: 96 chromatic notes over the chip's eight octaves.
//!
//! Index 0 means "no note". Index `i >= 1` maps to octave `(i - 1) / 12` and a
//! frequency offset tuned so that consecutive notes are a semitone apart.

/// Highest valid note index
pub const MAX_TONE: u8 = 96;

const CENTS: [u8; 12] = [5, 33, 60, 85, 109, 132, 153, 173, 192, 210, 227, 243];

const NOTE_NAMES: [&str; 12] = [
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
];

/// Chip octave and offset for one note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tone {
    /// Octave register value (0-7)
    pub octave: u8,
    /// Offset register value (0-255)
    pub cent: u8,
}

impl Tone {
    /// Combined fine pitch, `octave * 256 + cent`
    #[inline]
    pub fn pitch(self) -> i32 {
        i32::from(self.octave) * 256 + i32::from(self.cent)
    }
}

/// Note table indexed by note number, entry 0 is silence
pub static TONE_TABLE: [Tone; MAX_TONE as usize + 1] = build_tone_table();

const fn build_tone_table() -> [Tone; MAX_TONE as usize + 1] {
    let mut table = [Tone { octave: 0, cent: 0 }; MAX_TONE as usize + 1];
    let mut i = 1;
    while i <= MAX_TONE as usize {
        table[i] = Tone {
            octave: ((i - 1) / 12) as u8,
            cent: CENTS[(i - 1) % 12],
        };
        i += 1;
    }
    table
}

/// Look up a note, treating out-of-range indices as silence
#[inline]
pub fn tone(index: u8) -> Tone {
    TONE_TABLE
        .get(usize::from(index))
        .copied()
        .unwrap_or_default()
}

/// Display name such as `"C-1"` or `"A#4"`; `"---"` for silence
pub fn tone_name(index: u8) -> String {
    if index == 0 || index > MAX_TONE {
        return "---".to_string();
    }
    let i = usize::from(index - 1);
    format!("{}{}", NOTE_NAMES[i % 12], i / 12 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_last_notes() {
        assert_eq!(tone(1), Tone { octave: 0, cent: 5 });
        assert_eq!(tone(12), Tone { octave: 0, cent: 243 });
        assert_eq!(tone(13), Tone { octave: 1, cent: 5 });
        assert_eq!(tone(96), Tone { octave: 7, cent: 243 });
        assert_eq!(tone(97), Tone::default());
    }

    #[test]
    fn pitch_increases_with_index() {
        assert!(TONE_TABLE[1..].windows(2).all(|w| w[0].pitch() < w[1].pitch()));
    }

    #[test]
    fn names() {
        assert_eq!(tone_name(0), "---");
        assert_eq!(tone_name(1), "C-1");
        assert_eq!(tone_name(2), "C#1");
        assert_eq!(tone_name(46), "A-4");
        assert_eq!(tone_name(96), "B-8");
    }
}
