//! Tick processing: line loading, command evaluation and song advancement.

use saa1099::{NUM_CHANNELS, Saa1099Backend};

use super::{PlayMode, Player};
use crate::effects::{Command, chord_offset, modulation};
use crate::song::{MAX_SPEED, PatternLine, Volume};
use crate::tones::{MAX_TONE, tone};

/// Fine pitch of `note + transposition`, clamped to the note table
fn transposed_pitch(note: u8, transposition: i8) -> i32 {
    let index = (i32::from(note) + i32::from(transposition)).clamp(1, i32::from(MAX_TONE));
    tone(index as u8).pitch()
}

impl<B: Saa1099Backend> Player<B> {
    /// Process one tick.
    ///
    /// Order: line loading (tick 0), delayed lines, commands, channel output
    /// and register writes, then tick/line/position advancement.
    pub(crate) fn process_tick(&mut self) {
        if self.mode.is_line_driven() && self.tick == 0 {
            if self.stop_requested {
                self.halt();
                return;
            }
            if let Some(speed) = self.runtime.pending_speed.take() {
                self.speed = speed;
            }
            self.load_lines();
            self.changed_line = true;
        }

        self.run_delayed_lines();
        for ch in 0..NUM_CHANNELS {
            self.run_command(ch);
        }

        let registers = self.render_channels();
        self.commit_registers(registers);
        self.advance();

        if self.mode == PlayMode::Sample && !self.runtime.params.iter().any(|p| p.playing) {
            self.halt();
        }
    }

    /// Load the current line of every channel's pattern.
    fn load_lines(&mut self) {
        let Some(position) = self.song.position(self.position) else {
            return;
        };
        let channels = position.channels;

        for (ch, assignment) in channels.iter().enumerate() {
            let line = self
                .song
                .pattern(assignment.pattern)
                .line(self.runtime.params[ch].pattern_line);

            let params = &mut self.runtime.params[ch];
            params.transposition = assignment.pitch;
            let flushed = params.delayed_line.take();
            params.line_delay = 0;
            if let Some(pending) = flushed {
                self.load_line(ch, pending);
            }

            match Command::decode(line.cmd, line.cmd_data) {
                Command::LineDelay(ticks) if ticks > 0 => {
                    let params = &mut self.runtime.params[ch];
                    params.line_delay = ticks;
                    params.delayed_line = Some(line);
                }
                _ => self.load_line(ch, line),
            }
        }
    }

    /// Count down `Dxx` delays and load lines whose delay expired.
    fn run_delayed_lines(&mut self) {
        for ch in 0..NUM_CHANNELS {
            let params = &mut self.runtime.params[ch];
            if params.delayed_line.is_none() {
                continue;
            }
            if params.line_delay > 0 {
                params.line_delay -= 1;
                continue;
            }
            if let Some(line) = params.delayed_line.take() {
                self.load_line(ch, line);
            }
        }
    }

    /// Apply one pattern line to channel `ch`.
    pub(crate) fn load_line(&mut self, ch: usize, line: PatternLine) {
        let command = Command::decode(line.cmd, line.cmd_data);
        let group = ch / 3;

        let sample = if line.sample != 0 {
            line.sample
        } else {
            self.runtime.params[ch].sample
        };
        let releasable = self.song.sample(usize::from(sample)).releasable;

        let params = &mut self.runtime.params[ch];
        params.sample = sample;

        if line.ornament_release {
            params.ornament = 0;
            params.ornament_cursor = 0;
        } else if line.ornament != 0 {
            params.ornament = line.ornament;
            params.ornament_cursor = 0;
        }

        if line.tone != 0 && !line.release {
            let glide = matches!(command, Command::Glissando { .. }) && params.playing && params.tone != 0;
            if glide {
                params.glide_target = Some(line.tone);
            } else {
                params.tone = line.tone;
                params.playing = true;
                params.released = false;
                params.sample_cursor = 0;
                params.ornament_cursor = 0;
                params.slide_shift = 0;
                params.glide_target = None;
                params.sample_delay = 0;
                params.ornament_delay = 0;
            }
        }

        if line.release {
            if releasable && params.playing {
                params.released = true;
            } else {
                params.cut();
            }
        }

        if !line.volume.is_silent() {
            params.attenuation = Volume::new(15 - line.volume.left.min(15), 15 - line.volume.right.min(15));
        }

        match command {
            Command::None | Command::LineDelay(_) => {}
            c if c.is_continuous() => {
                if !matches!(c, Command::Glissando { .. }) {
                    params.glide_target = None;
                }
                params.command = c;
                params.command_phase = 0;
            }
            Command::Clear => {
                params.command = Command::None;
                params.glide_target = None;
                params.pitch_mod = 0;
                params.volume_mod = 0;
                params.chord_mod = 0;
            }
            Command::OrnamentDelay(ticks) => params.ornament_delay = ticks,
            Command::OrnamentOffset(cursor) => params.ornament_cursor = usize::from(cursor),
            Command::SampleDelay(ticks) => params.sample_delay = ticks,
            Command::SampleOffset(cursor) => params.sample_cursor = usize::from(cursor),
            Command::Break(target) => params.break_line = Some(usize::from(target)),
            Command::StereoSwap(swap) => params.stereo_swap = swap,
            Command::Envelope(control) => self.runtime.envelopes[group] = control,
            Command::EnvelopeOff => self.runtime.envelopes[group] = 0,
            Command::NoiseSource(source) => self.runtime.noise_sources[group] = source,
            Command::Speed(speed) => {
                if speed > 0 {
                    self.runtime.pending_speed = Some(speed.min(MAX_SPEED));
                }
            }
            _ => {}
        }
    }

    /// Evaluate the running continuous command of channel `ch` for this tick.
    fn run_command(&mut self, ch: usize) {
        let params = &mut self.runtime.params[ch];
        params.pitch_mod = 0;
        params.volume_mod = 0;
        params.chord_mod = 0;

        let phase = params.command_phase;
        let on_period = |period: u8| phase % u32::from(period.max(1)) == 0;

        match params.command {
            Command::None => return,
            Command::PortamentoUp { period, delta } => {
                if on_period(period) {
                    params.slide_shift += i32::from(delta);
                }
            }
            Command::PortamentoDown { period, delta } => {
                if on_period(period) {
                    params.slide_shift -= i32::from(delta);
                }
            }
            Command::Glissando { period, delta } => {
                if let Some(target) = params.glide_target
                    && on_period(period)
                {
                    let distance = transposed_pitch(target, params.transposition)
                        - transposed_pitch(params.tone, params.transposition);
                    let step = i32::from(delta);
                    if params.slide_shift < distance {
                        params.slide_shift = (params.slide_shift + step).min(distance);
                    } else if params.slide_shift > distance {
                        params.slide_shift = (params.slide_shift - step).max(distance);
                    }
                    if params.slide_shift == distance {
                        params.tone = target;
                        params.slide_shift = 0;
                        params.glide_target = None;
                    }
                }
            }
            Command::Vibrato { period, depth } => {
                params.pitch_mod = modulation(phase, period, depth);
            }
            Command::Tremolo { period, depth } => {
                params.volume_mod = modulation(phase, period, depth);
            }
            Command::VolumeSlide { left, right } => {
                let slide = |level: u8, delta: i8| (i32::from(level) - i32::from(delta)).clamp(0, 15) as u8;
                params.attenuation = Volume {
                    left: slide(params.attenuation.left, left),
                    right: slide(params.attenuation.right, right),
                };
            }
            Command::Chord { first, second } => {
                params.chord_mod = chord_offset(phase, first, second);
            }
            _ => {}
        }
        params.command_phase = params.command_phase.wrapping_add(1);
    }

    /// Advance tick, line and position counters after a processed tick.
    fn advance(&mut self) {
        self.tick_count += 1;
        match self.mode {
            PlayMode::Stopped => return,
            PlayMode::Sample => {
                self.tick = 0;
                return;
            }
            _ => {}
        }

        self.tick += 1;
        if self.tick < self.speed {
            return;
        }
        self.tick = 0;

        if self.mode == PlayMode::Line {
            self.stop_requested = true;
            return;
        }

        self.line += 1;
        for params in self.runtime.params.iter_mut() {
            params.pattern_line = params.break_line.take().unwrap_or(params.pattern_line + 1);
        }

        let length = self.song.position(self.position).map_or(0, |p| p.length());
        if self.line >= length {
            self.finish_position();
        }
    }

    /// Move on after the last line of a position.
    fn finish_position(&mut self) {
        let finished = self.position;
        self.finished_position = Some(finished);

        match self.mode {
            PlayMode::Position => self.enter_position(finished),
            PlayMode::Song | PlayMode::Simulation => {
                let count = self.song.position_count();
                if finished + 1 < count {
                    self.enter_position(finished + 1);
                } else if self.mode == PlayMode::Song && self.config().loop_mode && count > 0 {
                    let target = self.song.repeat_position().min(count - 1);
                    log::debug!("song finished, looping to position {target}");
                    self.enter_position(target);
                } else {
                    self.stop_requested = true;
                }
            }
            _ => {}
        }
    }
}
