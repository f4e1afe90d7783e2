//! Tracker song player.
//!
//! The player turns a [`Song`] into register writes and stereo audio:
//! - Transport (line, position, song and sample playback)
//! - Tick timing at the song's interrupt rate
//! - Pattern command evaluation
//! - Checkpoint-based seeking and silent simulation
//!
//! # Module Organization
//!
//! - `tick` - Line loading, commands and song advancement
//! - `output` - Per-channel output and register writing
//! - `simulation` - Frame counting and checkpoints
//! - `shared` - Lock-protected handle for audio callbacks
//!
//! # Example
//!
//! ```no_run
//! use saa1099_tracker::{Player, format};
//!
//! let json = std::fs::read_to_string("song.json")?;
//! let song = format::from_json(&json)?;
//! let mut player = Player::new(song);
//!
//! player.play_position(true, true, true);
//! let mut left = vec![0.0; 44_100];
//! let mut right = vec![0.0; 44_100];
//! player.get_audio(&mut left, &mut right); // 1 second of audio
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod output;
mod shared;
mod simulation;
mod tick;


pub use shared::SharedPlayer;

use log::{info, warn};
use saa1099::{NUM_CHANNELS, Saa1099, Saa1099Backend, Saa1099Error};
use saa1099_common::{ChiptunePlayer, ChiptunePlayerBase, DEFAULT_SAMPLE_RATE, PlaybackState};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::runtime::Runtime;
use crate::song::{DEFAULT_SPEED, Position, Song};
use crate::tones::MAX_TONE;

/// What the player is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    /// Idle; the chip is silent
    #[default]
    Stopped,
    /// Playing a single line, stopping at its end
    Line,
    /// Looping one position
    Position,
    /// Following the order list
    Song,
    /// Auditioning a sample on one channel
    Sample,
    /// Advancing state without touching the chip
    Simulation,
}

impl PlayMode {
    /// Whether ticks load pattern lines
    pub fn is_line_driven(self) -> bool {
        matches!(
            self,
            PlayMode::Line | PlayMode::Position | PlayMode::Song | PlayMode::Simulation
        )
    }

    /// Whether audio rendering advances ticks
    pub fn is_playing(self) -> bool {
        matches!(
            self,
            PlayMode::Line | PlayMode::Position | PlayMode::Song | PlayMode::Sample
        )
    }
}

/// Player settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Jump to the repeat position after the last position
    pub loop_mode: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            loop_mode: true,
        }
    }
}

/// Tracker song player driving an SAA-1099 backend.
pub struct Player<B: Saa1099Backend = Saa1099> {
    /// The song being played
    pub(crate) song: Song,
    /// Chip receiving register writes
    chip: B,
    config: PlayerConfig,
    pub(crate) mode: PlayMode,
    pub(crate) runtime: Runtime,

    // Transport
    /// Current position index
    pub(crate) position: usize,
    /// Current line within the position
    pub(crate) line: usize,
    /// Tick within the line (0..speed)
    pub(crate) tick: u8,
    /// Ticks per line
    pub(crate) speed: u8,
    /// Stop at the next line boundary
    pub(crate) stop_requested: bool,
    /// Ticks processed since the start of the song
    pub(crate) tick_count: usize,
    /// Position whose last line just finished
    pub(crate) finished_position: Option<usize>,

    // Sample timing
    /// Samples left until the next tick
    samples_to_tick: usize,
    /// Remainder accumulator for non-integral samples per tick
    tick_remainder: u32,

    // Change notification, reset on every `get_audio`
    changed_line: bool,
    changed_position: bool,
}

impl Player<Saa1099> {
    /// Create a player with the default configuration (44.1 kHz, looping).
    pub fn new(song: Song) -> Self {
        Self::with_backend(song, Saa1099::new(), PlayerConfig::default())
    }

    /// Create a player rendering at `config.sample_rate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample rate is zero.
    pub fn with_config(song: Song, config: PlayerConfig) -> Result<Self> {
        let chip = Saa1099::with_sample_rate(config.sample_rate)?;
        Ok(Self::with_backend(song, chip, config))
    }
}

impl<B: Saa1099Backend> Player<B> {
    /// Create a player driving a custom backend.
    ///
    /// Tick timing follows the backend's sample rate.
    pub fn with_backend(song: Song, chip: B, config: PlayerConfig) -> Self {
        let config = PlayerConfig {
            sample_rate: chip.sample_rate(),
            ..config
        };
        Self {
            song,
            chip,
            config,
            mode: PlayMode::Stopped,
            runtime: Runtime::default(),
            position: 0,
            line: 0,
            tick: 0,
            speed: DEFAULT_SPEED,
            stop_requested: false,
            tick_count: 0,
            finished_position: None,
            samples_to_tick: 0,
            tick_remainder: 0,
            changed_line: false,
            changed_position: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The song being played.
    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Mutable song access for editing; edits invalidate affected checkpoints.
    pub fn song_mut(&mut self) -> &mut Song {
        &mut self.song
    }

    /// The chip backend.
    pub fn chip(&self) -> &B {
        &self.chip
    }

    /// Mutable chip backend access.
    pub fn chip_mut(&mut self) -> &mut B {
        &mut self.chip
    }

    /// Player configuration.
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Enable or disable looping at the end of the song.
    pub fn set_loop_mode(&mut self, enabled: bool) {
        self.config.loop_mode = enabled;
    }

    /// Current play mode.
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Whether audio rendering advances playback.
    pub fn is_playing(&self) -> bool {
        self.mode.is_playing()
    }

    /// Current position index.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Current line within the position.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Tick within the current line that will be processed next.
    pub fn current_tick(&self) -> u8 {
        self.tick
    }

    /// Current ticks per line.
    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Song-absolute tick counter.
    pub fn tick_count(&self) -> usize {
        self.tick_count
    }

    /// A new line was loaded during the last `get_audio` call.
    pub fn changed_line(&self) -> bool {
        self.changed_line
    }

    /// A new position was entered during the last `get_audio` call.
    pub fn changed_position(&self) -> bool {
        self.changed_position
    }

    /// Live sequencer state.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Move the edit cursor while stopped.
    ///
    /// # Errors
    ///
    /// `InvalidPosition` when `position` does not exist.
    pub fn set_cursor(&mut self, position: usize, line: usize) -> Result<()> {
        let available = self.song.position_count();
        let Some(pos) = self.song.position(position) else {
            return Err(crate::TrackerError::InvalidPosition {
                index: position,
                available,
            });
        };
        self.line = line.min(pos.length().saturating_sub(1));
        self.position = position;
        Ok(())
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Start playback at a position.
    ///
    /// # Arguments
    ///
    /// * `from_start` - start at position 0 instead of the current one
    /// * `follow_song` - continue through the order list instead of looping the position
    /// * `reset_line` - start at line 0 instead of the current line
    ///
    /// # Returns
    ///
    /// `false` when the song has no position to play.
    pub fn play_position(&mut self, from_start: bool, follow_song: bool, reset_line: bool) -> bool {
        let position = if from_start { 0 } else { self.position };
        let Some(length) = self.song.position(position).map(Position::length) else {
            return false;
        };
        let line = if from_start || reset_line {
            0
        } else {
            self.line.min(length.saturating_sub(1))
        };
        let mode = if follow_song {
            PlayMode::Song
        } else {
            PlayMode::Position
        };
        info!("playing position {position} line {line} ({mode:?})");
        self.start_at(position, line, mode);
        true
    }

    /// Play the current line once, then stop.
    ///
    /// # Returns
    ///
    /// `false` when the current position does not exist.
    pub fn play_line(&mut self) -> bool {
        let Some(length) = self.song.position(self.position).map(Position::length) else {
            return false;
        };
        let line = self.line.min(length.saturating_sub(1));
        info!("playing line {line} of position {}", self.position);
        self.start_at(self.position, line, PlayMode::Line);
        true
    }

    /// Audition a sample with an ornament on one channel.
    ///
    /// # Errors
    ///
    /// `Chip(InvalidChannel)` when `channel > 5`.
    pub fn play_sample(&mut self, sample: u8, ornament: u8, tone: u8, channel: usize) -> Result<()> {
        if channel >= NUM_CHANNELS {
            return Err(Saa1099Error::InvalidChannel(channel).into());
        }
        let mutes = self.runtime.mutes;
        self.runtime = Runtime {
            mutes,
            ..Runtime::default()
        };
        self.sync_chip();

        let params = &mut self.runtime.params[channel];
        params.tone = tone.min(MAX_TONE);
        params.sample = sample;
        params.ornament = ornament;
        params.playing = tone != 0;

        info!("auditioning sample {sample} ornament {ornament} on channel {channel}");
        self.mode = PlayMode::Sample;
        self.tick = 0;
        self.stop_requested = false;
        self.samples_to_tick = 0;
        self.tick_remainder = 0;
        Ok(())
    }

    /// Stop playback.
    ///
    /// Line-driven playback stops at the next line boundary; sample
    /// auditioning stops immediately.
    pub fn stop(&mut self) {
        match self.mode {
            PlayMode::Line | PlayMode::Position | PlayMode::Song => self.stop_requested = true,
            _ => self.halt(),
        }
    }

    /// Stop one channel immediately, or the whole player.
    ///
    /// `None` behaves like [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// `Chip(InvalidChannel)` when the channel index is out of range.
    pub fn stop_channel(&mut self, channel: Option<usize>) -> Result<()> {
        match channel {
            None => {
                self.stop();
                Ok(())
            }
            Some(ch) if ch >= NUM_CHANNELS => Err(Saa1099Error::InvalidChannel(ch).into()),
            Some(ch) => {
                self.silence_channel(ch);
                Ok(())
            }
        }
    }

    /// Mute or unmute a channel; the mute survives seeking.
    ///
    /// # Errors
    ///
    /// `Chip(InvalidChannel)` when `channel > 5`.
    pub fn set_channel_mute(&mut self, channel: usize, mute: bool) -> Result<()> {
        self.chip.set_channel_mute(channel, mute)?;
        self.runtime.mutes[channel] = mute;
        Ok(())
    }

    /// Whether a channel is muted.
    pub fn is_channel_muted(&self, channel: usize) -> bool {
        self.runtime.mutes.get(channel).copied().unwrap_or(false)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render audio into both buffers, advancing playback.
    ///
    /// Renders `min(left.len(), right.len())` samples. Ticks are processed
    /// before the samples they govern, so the first tick after a play call
    /// takes effect at the first sample.
    pub fn get_audio(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.changed_line = false;
        self.changed_position = false;

        let len = left.len().min(right.len());
        let mut offset = 0;
        while offset < len {
            if self.mode.is_playing() && self.samples_to_tick == 0 {
                self.process_tick();
                self.samples_to_tick = self.next_tick_length();
            }
            let remaining = len - offset;
            let chunk = if self.mode.is_playing() {
                self.samples_to_tick.min(remaining)
            } else {
                remaining
            };
            self.chip.render(left, right, chunk, offset);
            if self.mode.is_playing() {
                self.samples_to_tick -= chunk;
            }
            offset += chunk;
        }
    }

    /// Samples in the next tick, spreading the division remainder evenly.
    fn next_tick_length(&mut self) -> usize {
        let rate = self.chip.sample_rate();
        let interrupt = self.song.interrupt().max(1);
        let mut length = rate / interrupt;
        self.tick_remainder += rate % interrupt;
        if self.tick_remainder >= interrupt {
            self.tick_remainder -= interrupt;
            length += 1;
        }
        length.max(1) as usize
    }

    // ========================================================================
    // Internal transport helpers
    // ========================================================================

    /// Restore state at `position`, fast-forward to `line`, then start `mode`.
    fn start_at(&mut self, position: usize, line: usize, mode: PlayMode) {
        self.restore_position(position);
        if line > 0 {
            self.simulate_to_line(line);
        }
        self.sync_chip();
        self.mode = mode;
        self.stop_requested = false;
        self.samples_to_tick = 0;
        self.tick_remainder = 0;
    }

    /// Enter `position` at line 0.
    pub(crate) fn enter_position(&mut self, position: usize) {
        let Some(pos) = self.song.position(position) else {
            return;
        };
        self.position = position;
        self.line = 0;
        self.tick = 0;
        self.speed = pos.speed.max(1);
        for (params, assignment) in self.runtime.params.iter_mut().zip(pos.channels.iter()) {
            params.pattern_line = 0;
            params.break_line = None;
            params.transposition = assignment.pitch;
        }
        self.changed_position = true;
        log::debug!("entered position {position}");
    }

    /// Reset the chip and load the runtime's register file and mutes.
    fn sync_chip(&mut self) {
        self.chip.reset();
        self.chip.load_registers(&self.runtime.regs);
        for (channel, &mute) in self.runtime.mutes.iter().enumerate() {
            if let Err(err) = self.chip.set_channel_mute(channel, mute) {
                warn!("could not restore mute of channel {channel}: {err}");
            }
        }
    }
}

impl<B: Saa1099Backend> ChiptunePlayerBase for Player<B> {
    fn play(&mut self) {
        if !self.mode.is_playing() {
            self.play_position(true, true, true);
        }
    }

    fn stop(&mut self) {
        Player::stop(self);
    }

    fn state(&self) -> PlaybackState {
        if self.mode.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    fn generate_samples_into(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.get_audio(left, right);
    }

    fn sample_rate(&self) -> u32 {
        self.chip.sample_rate()
    }

    fn set_channel_mute(&mut self, channel: usize, mute: bool) {
        if let Err(err) = Player::set_channel_mute(self, channel, mute) {
            warn!("ignoring mute request: {err}");
        }
    }

    fn is_channel_muted(&self, channel: usize) -> bool {
        Player::is_channel_muted(self, channel)
    }

    fn playback_position(&self) -> f32 {
        match self.song.total_frames() {
            Some(total) if total > 0 => (self.tick_count as f32 / total as f32).min(1.0),
            _ => 0.0,
        }
    }

    fn duration_seconds(&self) -> f32 {
        self.song
            .total_frames()
            .map_or(0.0, |total| total as f32 / self.song.interrupt() as f32)
    }
}

impl<B: Saa1099Backend> ChiptunePlayer for Player<B> {
    type Metadata = Song;

    fn metadata(&self) -> &Song {
        &self.song
    }
}
