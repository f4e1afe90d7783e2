use anyhow::Result;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use saa1099_tracker::{Pattern, Position, Song, TrackerError, Volume, format};
use serde_json::json;

fn demo_song() -> Song {
    let mut song = Song::new();
    song.title = "Demo".to_string();
    song.author = "Someone".to_string();
    song.set_interrupt(60);

    if let Some(sample) = song.sample_mut(1) {
        sample.name = "lead".to_string();
        sample.end = 2;
        sample.releasable = true;
        sample.data[0].volume = Volume::new(15, 12);
        sample.data[0].enable_freq = true;
        sample.data[0].shift = -3;
        sample.data[1].volume = Volume::new(10, 8);
        sample.data[1].set_flags(0b0111);
        sample.data[1].shift = 0x20;
    }
    if let Some(ornament) = song.ornament_mut(1) {
        ornament.name = "maj".to_string();
        ornament.data[..3].copy_from_slice(&[0, 4, 7]);
        ornament.end = 3;
    }

    let mut pattern = Pattern::with_length(4);
    if let Some(line) = pattern.line_mut(0) {
        line.tone = 49;
        line.sample = 1;
        line.ornament = 1;
        line.volume = Volume::new(12, 12);
        line.cmd = 0x4;
        line.cmd_data = 0x12;
    }
    if let Some(line) = pattern.line_mut(2) {
        line.release = true;
    }
    let pattern = song.add_pattern_with(pattern);

    let mut position = Position::new(4, 5);
    position.channels[0].pattern = pattern;
    position.channels[0].pitch = -2;
    position.channels[3].pattern = pattern;
    position.channels[3].pitch = 12;
    song.add_position(position);
    song
}

#[test]
fn current_format_round_trips() -> Result<()> {
    let song = demo_song();
    let json = format::to_json(&song)?;
    assert!(json.contains(r#""version": "1.2""#));
    assert!(json.contains(r#""repeatPosition": 0"#));
    assert_eq!(format::from_json(&json)?, song);
    Ok(())
}

#[test]
fn legacy_blobs_decode_to_the_same_song() -> Result<()> {
    let sample = STANDARD.encode([0xCFu8, 0x01, 0xFD, 0xFF, 0x8A, 0x07, 0x20, 0x00]);
    let ornament = STANDARD.encode([0u8, 4, 7]);
    let pattern = STANDARD.encode([
        49u8, 0, 1, 1, 0xCC, 0x4, 0x12, //
        0, 0, 0, 0, 0, 0, 0, //
        0, 1, 0, 0, 0, 0, 0,
    ]);
    let channels = STANDARD.encode([1u8, 0xFE, 0, 0, 0, 0, 1, 12, 0, 0, 0, 0]);

    let legacy = json!({
        "version": "1.1",
        "title": "Demo",
        "author": "Someone",
        "config": { "interrupt": 60 },
        "repeatPosition": 0,
        "samples": [{ "name": "lead", "data": sample, "loop": 0, "end": 2, "releasable": true }],
        "ornaments": [{ "name": "maj", "data": ornament, "loop": 0, "end": 3 }],
        "patterns": [{ "data": pattern, "end": 4 }],
        "positions": [{ "ch": channels, "length": 4, "speed": 5 }],
    });

    assert_eq!(format::from_json(&legacy.to_string())?, demo_song());
    Ok(())
}

#[test]
fn corrupt_legacy_blob_is_an_error() {
    let legacy = json!({
        "version": "1.1",
        "patterns": [{ "data": "***", "end": 4 }],
    });
    assert!(matches!(
        format::from_json(&legacy.to_string()),
        Err(TrackerError::Base64(_))
    ));
}

#[test]
fn malformed_json_is_an_error() {
    assert!(matches!(format::from_json("{"), Err(TrackerError::Json(_))));
}

#[test]
fn out_of_range_references_fall_back_to_slot_zero() -> Result<()> {
    let json = json!({
        "positions": [{ "ch": ["0FF+00", "000+00", "000+00", "000+00", "000+00", "000+00"] }],
    });
    let song = format::from_json(&json.to_string())?;
    let position = song.position(0).expect("position");
    assert_eq!(position.channels[0].pattern, 0xFF);
    assert!(song.pattern(position.channels[0].pattern).line(0).is_empty());
    assert_eq!((position.length(), position.speed), (64, 6));
    Ok(())
}

#[test]
fn files_round_trip_through_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("demo.json");
    let song = demo_song();
    format::save_file(&song, &path)?;
    assert_eq!(format::load_file(&path)?, song);

    assert!(matches!(
        format::load_file(dir.path().join("missing.json")),
        Err(TrackerError::Io(_))
    ));
    Ok(())
}

#[test]
fn legacy_bad_references_survive_resave() -> Result<()> {
    let pattern = STANDARD.encode([49u8, 0, 40, 17, 0xFF, 0x0F, 0x04]);
    let sample = STANDARD.encode([0x11u8, 0x01, 0x00, 0x20]);
    let legacy = json!({
        "version": "1.1",
        "samples": [{ "data": sample, "end": 1 }],
        "patterns": [{ "data": pattern, "end": 1 }],
    });

    let song = format::from_json(&legacy.to_string())?;
    let line = song.pattern(1).line(0);
    assert_eq!((line.tone, line.sample, line.ornament), (49, 0, 0));
    assert_eq!((line.cmd, line.cmd_data), (0xF, 0x04));
    assert_eq!(line.volume, Volume::new(0xF, 0xF));
    assert_eq!(song.sample(1).data[0].shift, 0xFFF);

    let reloaded = format::from_json(&format::to_json(&song)?)?;
    assert_eq!(reloaded, song);
    Ok(())
}
