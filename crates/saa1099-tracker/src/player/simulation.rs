//! Silent simulation: frame tables, checkpoints and seeking.
//!
//! Simulation runs the normal tick pipeline in [`PlayMode::Simulation`],
//! which updates the runtime but never writes to the chip. It fills each
//! position's frame table and captures a checkpoint at its first tick, so
//! playback can later resume anywhere without replaying from the start.

use log::debug;
use saa1099::Saa1099Backend;

use super::{PlayMode, Player};
use crate::runtime::Runtime;

/// Live transport state saved around a simulation pass
struct TransportSnapshot {
    mode: PlayMode,
    runtime: Runtime,
    position: usize,
    line: usize,
    tick: u8,
    speed: u8,
    stop_requested: bool,
    tick_count: usize,
    finished_position: Option<usize>,
    changed_line: bool,
    changed_position: bool,
}

impl<B: Saa1099Backend> Player<B> {
    /// Simulate the song to fill frame tables and checkpoints.
    ///
    /// # Arguments
    ///
    /// * `limit` - last position to compute; `None` computes every position
    ///
    /// Simulation resumes from the latest position at or before `limit` that
    /// still has a checkpoint and a frame table, or from the song start. The
    /// live playback state is left untouched.
    pub fn count_position_frames(&mut self, limit: Option<usize>) {
        let count = self.song.position_count();
        if count == 0 {
            return;
        }
        let last = limit.unwrap_or(count - 1).min(count - 1);
        let saved = self.save_transport();

        let resume = (0..=last).rev().find_map(|i| {
            let position = self.song.position(i)?;
            let frames = position.frames()?;
            let checkpoint = position.checkpoint()?;
            Some((i, checkpoint.clone(), frames[0]))
        });
        let (start, runtime, ticks) = resume.unwrap_or_else(|| (0, Runtime::default(), 0));
        debug!("simulating positions {start}..={last}");

        self.runtime = runtime;
        self.tick_count = ticks;
        self.mode = PlayMode::Simulation;
        self.stop_requested = false;
        self.finished_position = None;
        self.enter_position(start);

        loop {
            if self.tick == 0 {
                self.record_line_start();
            }
            self.process_tick();

            if let Some(done) = self.finished_position.take() {
                let ticks = self.tick_count;
                if let Some(position) = self.song.positions_mut_raw().get_mut(done) {
                    let end = position.length();
                    if let Some(frame) = position.frames.get_mut(end) {
                        *frame = ticks;
                    }
                }
                if done >= last || self.stop_requested {
                    break;
                }
            }
            if self.mode != PlayMode::Simulation {
                break;
            }
        }

        self.restore_transport(saved);
    }

    /// Make sure `position` has a checkpoint, simulating if needed.
    ///
    /// # Returns
    ///
    /// `false` when the position does not exist.
    pub fn store_position_runtime(&mut self, position: usize) -> bool {
        let Some(pos) = self.song.position(position) else {
            return false;
        };
        if !pos.has_checkpoint() || pos.frames().is_none() {
            self.count_position_frames(Some(position));
        }
        self.song
            .position(position)
            .is_some_and(|p| p.has_checkpoint())
    }

    /// Load the state at the first tick of `position`, keeping live mutes.
    pub(crate) fn restore_position(&mut self, position: usize) {
        self.store_position_runtime(position);
        let mutes = self.runtime.mutes;
        let (runtime, ticks) = match self.song.position(position) {
            Some(pos) => (
                pos.checkpoint().cloned().unwrap_or_default(),
                pos.frames().map_or(0, |f| f[0]),
            ),
            None => (Runtime::default(), 0),
        };
        self.runtime = runtime.with_mutes(mutes);
        self.tick_count = ticks;
        self.stop_requested = false;
        self.finished_position = None;
        self.enter_position(position);
    }

    /// Silently run ticks until `line` of the current position starts.
    pub(crate) fn simulate_to_line(&mut self, line: usize) {
        let mode = self.mode;
        let position = self.position;
        self.mode = PlayMode::Simulation;
        while self.position == position && self.line < line && self.mode == PlayMode::Simulation {
            self.process_tick();
        }
        self.mode = mode;
        self.finished_position = None;
    }

    /// Capture the checkpoint at line 0 and note the line's start tick.
    fn record_line_start(&mut self) {
        let (index, line, ticks) = (self.position, self.line, self.tick_count);
        let runtime = (line == 0).then(|| Box::new(self.runtime.clone()));
        let Some(position) = self.song.positions_mut_raw().get_mut(index) else {
            return;
        };
        if let Some(checkpoint) = runtime {
            position.init_params = Some(checkpoint);
            position.frames = vec![0; position.length() + 1];
        }
        if let Some(frame) = position.frames.get_mut(line) {
            *frame = ticks;
        }
    }

    fn save_transport(&self) -> TransportSnapshot {
        TransportSnapshot {
            mode: self.mode,
            runtime: self.runtime.clone(),
            position: self.position,
            line: self.line,
            tick: self.tick,
            speed: self.speed,
            stop_requested: self.stop_requested,
            tick_count: self.tick_count,
            finished_position: self.finished_position,
            changed_line: self.changed_line,
            changed_position: self.changed_position,
        }
    }

    fn restore_transport(&mut self, saved: TransportSnapshot) {
        self.mode = saved.mode;
        self.runtime = saved.runtime;
        self.position = saved.position;
        self.line = saved.line;
        self.tick = saved.tick;
        self.speed = saved.speed;
        self.stop_requested = saved.stop_requested;
        self.tick_count = saved.tick_count;
        self.finished_position = saved.finished_position;
        self.changed_line = saved.changed_line;
        self.changed_position = saved.changed_position;
    }
}
