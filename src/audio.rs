//! Sound triggers
//!
//! The game only ever names a cue and moves on. What actually makes noise is
//! a [`SoundSink`] supplied by the host; a sink that fails is logged and
//! ignored so audio can never stall the game.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::sim::GameEvent;

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Arrow fired
    Shoot,
    /// Wandering enemy struck
    Hit,
    /// Player caught
    Boom,
    /// Treasure collected
    Pickup,
    /// Walked through the door
    PowerUp,
}

impl SoundCue {
    /// Asset key the host uses to look the sound up
    pub fn key(self) -> &'static str {
        match self {
            SoundCue::Shoot => "shoot",
            SoundCue::Hit => "hit",
            SoundCue::Boom => "boom",
            SoundCue::Pickup => "pickup",
            SoundCue::PowerUp => "powerUp",
        }
    }

    /// Cue that accompanies a game event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::ArrowFired => Some(SoundCue::Shoot),
            GameEvent::EnemyStunned { .. } => Some(SoundCue::Hit),
            GameEvent::PlayerCaught => Some(SoundCue::Boom),
            GameEvent::TreasureCollected => Some(SoundCue::Pickup),
            GameEvent::RoomAdvanced { .. } => Some(SoundCue::PowerUp),
            _ => None,
        }
    }
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A sink refused or failed to play a cue
#[derive(Debug, thiserror::Error)]
#[error("sound '{cue}' failed: {reason}")]
pub struct SoundError {
    pub cue: SoundCue,
    pub reason: String,
}

/// Host-side sound output
pub trait SoundSink {
    fn play(&mut self, cue: SoundCue) -> Result<(), SoundError>;
}

/// Discards every cue
#[derive(Debug, Default)]
pub struct NullSink;

impl SoundSink for NullSink {
    fn play(&mut self, _cue: SoundCue) -> Result<(), SoundError> {
        Ok(())
    }
}

/// Writes each cue to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogSink;

impl SoundSink for LogSink {
    fn play(&mut self, cue: SoundCue) -> Result<(), SoundError> {
        log::info!("[sound] {}", cue);
        Ok(())
    }
}

/// Keeps every cue it is handed; clones share the same history
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    played: Rc<RefCell<Vec<SoundCue>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<SoundCue> {
        self.played.borrow().clone()
    }

    pub fn count(&self, cue: SoundCue) -> usize {
        self.played.borrow().iter().filter(|c| **c == cue).count()
    }
}

impl SoundSink for RecordingSink {
    fn play(&mut self, cue: SoundCue) -> Result<(), SoundError> {
        self.played.borrow_mut().push(cue);
        Ok(())
    }
}

/// Audio front end for the scene
pub struct AudioManager {
    sink: Box<dyn SoundSink>,
    muted: bool,
    failures: u32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioManager")
            .field("muted", &self.muted)
            .field("failures", &self.failures)
            .finish()
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn SoundSink>) -> Self {
        Self {
            sink,
            muted: false,
            failures: 0,
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Cues the sink failed to play so far
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Fire and forget
    pub fn play(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        if let Err(e) = self.sink.play(cue) {
            self.failures += 1;
            log::warn!("{}", e);
        }
    }

    /// Play the cue for every event that has one
    pub fn play_events<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for cue in events.into_iter().filter_map(SoundCue::for_event) {
            self.play(cue);
        }
    }
}
