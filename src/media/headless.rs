//! In-process player used by tests and the headless simulator.
//!
//! Commands update local state immediately and echo the resulting state
//! change as an event, the way the embedded player reports it asynchronously.

use std::cell::Cell;
use std::collections::VecDeque;

use super::player::{Player, PlayerEvent, PlayerState};

/// A command issued to the [`HeadlessPlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCall {
    Play,
    Pause,
    Mute,
    Unmute,
    SetVolume(u8),
}

/// Scriptable stand-in for the embedded video player.
#[derive(Debug)]
pub struct HeadlessPlayer {
    state: PlayerState,
    volume: u8,
    muted: bool,
    duration: f64,
    position: f64,
    echo: bool,
    calls: Vec<PlayerCall>,
    queries: Cell<usize>,
    events: VecDeque<PlayerEvent>,
}

impl HeadlessPlayer {
    /// A player for a track of `duration` seconds that echoes state changes.
    pub fn new(duration: f64) -> Self {
        Self {
            state: PlayerState::Unstarted,
            volume: 100,
            muted: false,
            duration,
            position: 0.0,
            echo: true,
            calls: Vec::new(),
            queries: Cell::new(0),
            events: VecDeque::new(),
        }
    }

    /// Stop echoing state changes; the test pushes them by hand.
    pub fn silent(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Queue the ready signal.
    pub fn signal_ready(&mut self) {
        self.events.push_back(PlayerEvent::Ready);
    }

    /// Queue an error, as when the video is unavailable.
    pub fn signal_error(&mut self, code: i32) {
        self.events.push_back(PlayerEvent::Error(code));
    }

    /// Force a state and queue the matching event.
    pub fn signal_state(&mut self, state: PlayerState) {
        self.state = state;
        self.events.push_back(PlayerEvent::StateChange(state));
    }

    /// Move playback forward while playing. The track loops at its end.
    pub fn advance(&mut self, seconds: f64) {
        if self.state != PlayerState::Playing {
            return;
        }
        self.position += seconds;
        if self.duration > 0.0 && self.position >= self.duration {
            self.position %= self.duration;
        }
    }

    pub fn set_position(&mut self, seconds: f64) {
        self.position = seconds;
    }

    /// Commands received so far, in order.
    pub fn calls(&self) -> &[PlayerCall] {
        &self.calls
    }

    /// Number of queries answered so far.
    pub fn queries(&self) -> usize {
        self.queries.get()
    }

    /// Whether the player has been touched at all.
    pub fn untouched(&self) -> bool {
        self.calls.is_empty() && self.queries() == 0
    }

    fn transition(&mut self, state: PlayerState) {
        self.state = state;
        if self.echo {
            self.events.push_back(PlayerEvent::StateChange(state));
        }
    }

    fn query<T>(&self, value: T) -> T {
        self.queries.set(self.queries.get() + 1);
        value
    }
}

impl Default for HeadlessPlayer {
    fn default() -> Self {
        Self::new(240.0)
    }
}

impl Player for HeadlessPlayer {
    fn play(&mut self) {
        self.calls.push(PlayerCall::Play);
        self.transition(PlayerState::Playing);
    }

    fn pause(&mut self) {
        self.calls.push(PlayerCall::Pause);
        self.transition(PlayerState::Paused);
    }

    fn mute(&mut self) {
        self.calls.push(PlayerCall::Mute);
        self.muted = true;
    }

    fn unmute(&mut self) {
        self.calls.push(PlayerCall::Unmute);
        self.muted = false;
    }

    fn is_muted(&self) -> bool {
        self.query(self.muted)
    }

    fn set_volume(&mut self, volume: u8) {
        self.calls.push(PlayerCall::SetVolume(volume));
        self.volume = volume.min(100);
    }

    fn volume(&self) -> u8 {
        self.query(self.volume)
    }

    fn duration(&self) -> f64 {
        self.query(self.duration)
    }

    fn current_time(&self) -> f64 {
        self.query(self.position)
    }

    fn state(&self) -> PlayerState {
        self.query(self.state)
    }

    fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.events.drain(..).collect()
    }
}
