//! Offline rendering of a player to a 16-bit stereo WAV file.

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use saa1099_tracker::Player;

/// Samples rendered per `get_audio` call
const CHUNK: usize = 4096;

/// What [`render_wav`] produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    /// Stereo frames written
    pub frames: usize,
    /// Playback stopped on its own before the length limit
    pub finished: bool,
}

#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Render until playback stops or `max_frames` frames are written.
///
/// # Errors
///
/// Fails when the WAV file cannot be created or written.
pub fn render_wav(player: &mut Player, path: &Path, max_frames: usize) -> Result<RenderSummary> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: player.chip().sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut left = vec![0.0f32; CHUNK];
    let mut right = vec![0.0f32; CHUNK];
    let mut frames = 0;

    while frames < max_frames && player.is_playing() {
        let count = (max_frames - frames).min(CHUNK);
        player.get_audio(&mut left[..count], &mut right[..count]);
        for (&l, &r) in left[..count].iter().zip(&right[..count]) {
            writer.write_sample(to_i16(l))?;
            writer.write_sample(to_i16(r))?;
        }
        frames += count;
    }

    writer.finalize().context("finalizing WAV file")?;
    let finished = !player.is_playing();
    debug!("rendered {frames} frames, finished: {finished}");
    Ok(RenderSummary { frames, finished })
}

#[cfg(test)]
mod tests {
    use super::*;
    use saa1099_tracker::{Position, Song};

    #[test]
    fn sample_conversion_clamps() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.5), i16::MAX);
        assert_eq!(to_i16(-2.0), -i16::MAX);
    }

    #[test]
    fn stops_with_the_song() -> Result<()> {
        let mut song = Song::new();
        song.add_position(Position::new(2, 3));
        let mut player = Player::new(song);
        player.set_loop_mode(false);
        player.play_position(true, true, true);

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.wav");
        let summary = render_wav(&mut player, &path, 44_100 * 10)?;
        assert!(summary.finished);
        assert!(summary.frames < 44_100);

        let reader = hound::WavReader::open(&path)?;
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.len() as usize, summary.frames * 2);
        Ok(())
    }

    #[test]
    fn length_limit_cuts_looping_songs() -> Result<()> {
        let mut song = Song::new();
        song.add_position(Position::new(2, 3));
        let mut player = Player::new(song);
        player.play_position(true, true, true);

        let dir = tempfile::tempdir()?;
        let summary = render_wav(&mut player, &dir.path().join("loop.wav"), 10_000)?;
        assert_eq!(summary.frames, 10_000);
        assert!(!summary.finished);
        Ok(())
    }
}
