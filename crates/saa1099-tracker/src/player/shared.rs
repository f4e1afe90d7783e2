//! Lock-protected player handle for audio callbacks.
//!
//! Editing and transport calls take the lock from the host thread; the audio
//! thread renders through [`SharedPlayer::render`], which never blocks. If the
//! lock is held when a buffer is due, the buffer is filled with silence.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use saa1099::{Saa1099, Saa1099Backend};

use super::Player;

/// Clonable handle sharing one [`Player`] between threads
pub struct SharedPlayer<B: Saa1099Backend = Saa1099> {
    inner: Arc<Mutex<Player<B>>>,
}

impl<B: Saa1099Backend> Clone for SharedPlayer<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Saa1099Backend> SharedPlayer<B> {
    /// Wrap a player for shared use.
    pub fn new(player: Player<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(player)),
        }
    }

    /// Lock the player for editing or transport calls.
    pub fn lock(&self) -> MutexGuard<'_, Player<B>> {
        self.inner.lock()
    }

    /// Render one audio buffer without blocking.
    ///
    /// # Returns
    ///
    /// `false` when the player was busy and silence was written instead.
    pub fn render(&self, left: &mut [f32], right: &mut [f32]) -> bool {
        match self.inner.try_lock() {
            Some(mut player) => {
                player.get_audio(left, right);
                true
            }
            None => {
                left.fill(0.0);
                right.fill(0.0);
                false
            }
        }
    }
}
