//! JSON song files.
//!
//! Two encodings share one document layout:
//!
//! - `"1.2"` (read and written): every tick, line and channel is a short
//!   fixed-width string
//! - `"1.1"` (read only): each entity's data is one base64 blob
//!
//! Array element `i` of `samples`, `ornaments` and `patterns` fills slot
//! `i + 1`; slot 0 is always the neutral entity. Entries that fail to decode
//! become defaults with a warning; only a broken document is an error.
//!
//! # Example
//!
//! ```
//! use saa1099_tracker::{Song, format};
//!
//! let json = format::to_json(&Song::new())?;
//! let song = format::from_json(&json)?;
//! assert_eq!(song.position_count(), 0);
//! # Ok::<(), saa1099_tracker::TrackerError>(())
//! ```

mod codec;
mod legacy;

use std::path::Path;

use log::{debug, warn};
use saa1099::NUM_CHANNELS;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::song::{
    DEFAULT_POSITION_LENGTH, DEFAULT_SPEED, MAX_ORNAMENTS, MAX_SAMPLES, Ornament, Pattern, Position,
    SAMPLE_LENGTH, Sample, Song,
};

/// Version written by [`to_json`]
pub const CURRENT_VERSION: &str = "1.2";

/// Base64 encoding accepted by [`from_json`]
pub const LEGACY_VERSION: &str = "1.1";

const DEFAULT_INTERRUPT: u32 = 50;

// ============================================================================
// Document layout
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SongFile {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    config: SongConfig,
    #[serde(default)]
    repeat_position: usize,
    #[serde(default)]
    samples: Vec<SampleFile>,
    #[serde(default)]
    ornaments: Vec<OrnamentFile>,
    #[serde(default)]
    patterns: Vec<PatternFile>,
    #[serde(default)]
    positions: Vec<PositionFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SongConfig {
    #[serde(default = "default_interrupt")]
    interrupt: u32,
}

impl Default for SongConfig {
    fn default() -> Self {
        Self {
            interrupt: DEFAULT_INTERRUPT,
        }
    }
}

/// Entity data: a string per entry, or one legacy base64 blob
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum EntityData {
    Entries(Vec<String>),
    Packed(String),
}

impl Default for EntityData {
    fn default() -> Self {
        EntityData::Entries(Vec::new())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SampleFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    data: EntityData,
    #[serde(default, rename = "loop")]
    loop_start: usize,
    #[serde(default)]
    end: usize,
    #[serde(default)]
    releasable: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OrnamentFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    data: EntityData,
    #[serde(default, rename = "loop")]
    loop_start: usize,
    #[serde(default)]
    end: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct PatternFile {
    #[serde(default)]
    data: EntityData,
    #[serde(default)]
    end: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct PositionFile {
    #[serde(default)]
    ch: EntityData,
    #[serde(default = "default_length")]
    length: usize,
    #[serde(default = "default_speed")]
    speed: u8,
}

fn default_version() -> String {
    CURRENT_VERSION.to_string()
}

fn default_interrupt() -> u32 {
    DEFAULT_INTERRUPT
}

fn default_length() -> usize {
    DEFAULT_POSITION_LENGTH
}

fn default_speed() -> u8 {
    DEFAULT_SPEED
}

// ============================================================================
// Reading
// ============================================================================

/// Decode entity entries with `decode`, or a legacy blob with `unpack`.
///
/// Undecodable entries become `T::default()`.
fn decode_entries<T: Default>(
    data: &EntityData,
    what: &str,
    decode: impl Fn(&str) -> Option<T>,
    unpack: impl Fn(&[u8]) -> Vec<T>,
) -> Result<Vec<T>> {
    match data {
        EntityData::Entries(entries) => Ok(entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                decode(entry).unwrap_or_else(|| {
                    warn!("{what} entry {i} ('{entry}') is malformed, using default");
                    T::default()
                })
            })
            .collect()),
        EntityData::Packed(blob) => Ok(unpack(&legacy::unpack(blob)?)),
    }
}

fn read_sample(file: &SampleFile, slot: usize) -> Result<Sample> {
    let what = format!("sample {slot}");
    let ticks = decode_entries(&file.data, &what, codec::decode_sample_tick, legacy::sample_ticks)?;
    let mut sample = Sample {
        name: file.name.clone(),
        loop_start: file.loop_start,
        end: file.end,
        releasable: file.releasable,
        ..Default::default()
    };
    if ticks.len() > SAMPLE_LENGTH {
        warn!("{what} has {} ticks, keeping {SAMPLE_LENGTH}", ticks.len());
    }
    for (dst, tick) in sample.data.iter_mut().zip(ticks) {
        *dst = tick;
    }
    sample.normalize();
    Ok(sample)
}

fn read_ornament(file: &OrnamentFile, slot: usize) -> Result<Ornament> {
    let what = format!("ornament {slot}");
    let ticks = decode_entries(&file.data, &what, codec::decode_ornament_tick, legacy::ornament_ticks)?;
    let mut ornament = Ornament {
        name: file.name.clone(),
        loop_start: file.loop_start,
        end: file.end,
        ..Default::default()
    };
    for (dst, tick) in ornament.data.iter_mut().zip(ticks) {
        *dst = tick;
    }
    ornament.normalize();
    Ok(ornament)
}

fn read_pattern(file: &PatternFile, slot: usize) -> Result<Pattern> {
    let what = format!("pattern {slot}");
    let lines = decode_entries(&file.data, &what, codec::decode_pattern_line, legacy::pattern_lines)?;
    let mut pattern = Pattern::with_length(file.end);
    for (i, line) in lines.into_iter().enumerate() {
        match pattern.line_mut(i) {
            Some(dst) => *dst = line,
            None => {
                warn!("{what} has more lines than fit, ignoring the rest");
                break;
            }
        }
    }
    Ok(pattern)
}

fn read_position(file: &PositionFile, index: usize) -> Result<Position> {
    let what = format!("position {index}");
    let channels = decode_entries(&file.ch, &what, codec::decode_channel, legacy::position_channels)?;
    if channels.len() != NUM_CHANNELS {
        warn!("{what} has {} channels, expected {NUM_CHANNELS}", channels.len());
    }
    let mut position = Position::new(file.length, file.speed);
    for (dst, channel) in position.channels.iter_mut().zip(channels) {
        *dst = channel;
    }
    Ok(position)
}

/// Read slots `1..` from `files`, keeping at most `capacity` slots in total
fn read_slots<F, T: Default>(
    files: &[F],
    capacity: usize,
    what: &str,
    read: impl Fn(&F, usize) -> Result<T>,
) -> Result<Vec<T>> {
    if files.len() >= capacity {
        warn!("{} {what}s in file, keeping {}", files.len(), capacity - 1);
    }
    let mut slots = vec![T::default()];
    for (i, file) in files.iter().take(capacity - 1).enumerate() {
        slots.push(read(file, i + 1)?);
    }
    Ok(slots)
}

/// Parse a song document.
///
/// # Errors
///
/// `Json` for malformed JSON, `UnsupportedVersion` for versions other than
/// 1.1 and 1.2, `Base64` for a corrupt legacy blob, and `InvalidValue` for an
/// interrupt rate of zero.
pub fn from_json(json: &str) -> Result<Song> {
    let file: SongFile = serde_json::from_str(json)?;
    if file.version != CURRENT_VERSION && file.version != LEGACY_VERSION {
        return Err(TrackerError::UnsupportedVersion(file.version));
    }
    if file.config.interrupt == 0 {
        return Err(TrackerError::InvalidValue {
            field: "config.interrupt".to_string(),
            value: "0".to_string(),
            expected: "a positive rate in Hz".to_string(),
        });
    }

    let samples = read_slots(&file.samples, MAX_SAMPLES, "sample", read_sample)?;
    let ornaments = read_slots(&file.ornaments, MAX_ORNAMENTS, "ornament", read_ornament)?;
    let patterns = read_slots(&file.patterns, usize::MAX, "pattern", read_pattern)?;
    let positions = file
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| read_position(p, i))
        .collect::<Result<Vec<_>>>()?;

    let mut song = Song::new();
    song.title = file.title;
    song.author = file.author;
    song.set_interrupt_raw(file.config.interrupt);
    song.set_repeat_position_raw(file.repeat_position);
    song.set_slots(samples, ornaments, patterns, positions);

    debug!(
        "loaded song '{}' (version {}): {} patterns, {} positions",
        song.title,
        file.version,
        song.pattern_count() - 1,
        song.position_count()
    );
    Ok(song)
}

/// Load a song file from disk.
///
/// # Errors
///
/// `Io` when the file cannot be read, otherwise as [`from_json`].
pub fn load_file(path: impl AsRef<Path>) -> Result<Song> {
    let json = std::fs::read_to_string(path)?;
    from_json(&json)
}

// ============================================================================
// Writing
// ============================================================================

fn encode_trimmed<T: Default + PartialEq>(items: &[T], encode: impl Fn(&T) -> String) -> EntityData {
    let len = codec::trimmed_len(items);
    EntityData::Entries(items[..len].iter().map(encode).collect())
}

fn write_sample(sample: &Sample) -> SampleFile {
    SampleFile {
        name: sample.name.clone(),
        data: encode_trimmed(&sample.data, codec::encode_sample_tick),
        loop_start: sample.loop_start,
        end: sample.end,
        releasable: sample.releasable,
    }
}

fn write_ornament(ornament: &Ornament) -> OrnamentFile {
    OrnamentFile {
        name: ornament.name.clone(),
        data: encode_trimmed(&ornament.data, |&t| codec::encode_ornament_tick(t)),
        loop_start: ornament.loop_start,
        end: ornament.end,
    }
}

fn write_pattern(pattern: &Pattern) -> PatternFile {
    PatternFile {
        data: encode_trimmed(pattern.lines(), codec::encode_pattern_line),
        end: pattern.end,
    }
}

fn write_position(position: &Position) -> PositionFile {
    PositionFile {
        ch: EntityData::Entries(position.channels.iter().map(codec::encode_channel).collect()),
        length: position.length(),
        speed: position.speed,
    }
}

/// Slots `1..` up to the last one that differs from the default
fn used_slots<T: Default + PartialEq>(slots: &[T]) -> &[T] {
    let len = codec::trimmed_len(slots);
    slots.get(1..len).unwrap_or(&[])
}

/// Serialize a song as a version 1.2 document.
///
/// # Errors
///
/// `Json` if serialization fails.
pub fn to_json(song: &Song) -> Result<String> {
    let file = SongFile {
        version: CURRENT_VERSION.to_string(),
        title: song.title.clone(),
        author: song.author.clone(),
        config: SongConfig {
            interrupt: song.interrupt(),
        },
        repeat_position: song.repeat_position(),
        samples: used_slots(song.samples()).iter().map(write_sample).collect(),
        ornaments: used_slots(song.ornaments()).iter().map(write_ornament).collect(),
        patterns: song.patterns().iter().skip(1).map(write_pattern).collect(),
        positions: song.positions().iter().map(write_position).collect(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Write a song file to disk.
///
/// # Errors
///
/// `Io` when the file cannot be written, `Json` if serialization fails.
pub fn save_file(song: &Song, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, to_json(song)?)?;
    Ok(())
}
