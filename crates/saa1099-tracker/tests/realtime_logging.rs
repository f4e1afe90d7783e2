//! Audio rendering must stay quiet at the default log level: `get_audio`
//! runs on the audio thread, where a locked stderr write can glitch output.

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use saa1099_tracker::{PlayMode, Player, Position, Song};

static RECORDS: Mutex<Vec<(Level, String)>> = parking_lot::const_mutex(Vec::new());

struct Capture;

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.lock().push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture;

#[test]
fn rendering_logs_nothing_above_debug() {
    log::set_logger(&CAPTURE).expect("logger installed once");
    log::set_max_level(LevelFilter::Trace);

    let mut song = Song::new();
    song.add_position(Position::new(2, 1));
    let mut player = Player::new(song);
    assert!(player.play_position(true, true, true));
    RECORDS.lock().clear();

    // ten ticks at 44.1 kHz / 50 Hz: the two-line song loops five times
    let mut left = vec![0.0; 8820];
    let mut right = vec![0.0; 8820];
    player.get_audio(&mut left, &mut right);
    player.stop();
    player.get_audio(&mut left, &mut right);
    assert_eq!(player.mode(), PlayMode::Stopped);

    let records = RECORDS.lock();
    let loud: Vec<_> = records.iter().filter(|(level, _)| *level <= Level::Info).collect();
    assert!(loud.is_empty(), "{loud:?}");
    assert!(records.iter().any(|(_, message)| message.contains("looping")));
    assert!(records.iter().any(|(_, message)| message.contains("stopped")));
}
