//! Player capability consumed by the media adapter.

use serde::Serialize;
use thiserror::Error;

/// Playback state reported by the embedded player.
///
/// Discriminants follow the YouTube IFrame API codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }
}

/// Asynchronous notification from the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The player finished loading and accepts commands
    Ready,
    StateChange(PlayerState),
    /// Raw error code from the player
    Error(i32),
}

/// A player error, classified from its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("invalid player parameter (code {0})")]
    InvalidParameter(i32),
    #[error("content cannot be played in an HTML5 player (code {0})")]
    Html5(i32),
    #[error("video not found or private (code {0})")]
    NotFound(i32),
    #[error("video owner does not allow embedded playback (code {0})")]
    EmbedRefused(i32),
    #[error("unknown player error (code {0})")]
    Unknown(i32),
}

impl MediaError {
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::InvalidParameter(code),
            5 => Self::Html5(code),
            100 => Self::NotFound(code),
            101 | 150 => Self::EmbedRefused(code),
            _ => Self::Unknown(code),
        }
    }
}

/// Commands and queries of an embeddable video player.
///
/// Calling any of these before the player has signalled [`PlayerEvent::Ready`]
/// is undefined; the adapter guards every call.
pub trait Player {
    fn play(&mut self);
    fn pause(&mut self);
    fn mute(&mut self);
    fn unmute(&mut self);
    fn is_muted(&self) -> bool;
    /// Volume in `0..=100`
    fn set_volume(&mut self, volume: u8);
    fn volume(&self) -> u8;
    /// Track length in seconds, zero while unknown
    fn duration(&self) -> f64;
    /// Playback position in seconds
    fn current_time(&self) -> f64;
    fn state(&self) -> PlayerState;

    /// Take the events the player emitted since the last call.
    fn drain_events(&mut self) -> Vec<PlayerEvent> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes() {
        for state in [
            PlayerState::Unstarted,
            PlayerState::Ended,
            PlayerState::Playing,
            PlayerState::Paused,
            PlayerState::Buffering,
            PlayerState::Cued,
        ] {
            assert_eq!(PlayerState::from_code(state.code()), Some(state));
        }
        assert_eq!(PlayerState::from_code(4), None);
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(MediaError::from_code(100), MediaError::NotFound(100));
        assert_eq!(MediaError::from_code(150), MediaError::EmbedRefused(150));
        assert_eq!(MediaError::from_code(7), MediaError::Unknown(7));
        assert!(MediaError::from_code(101).to_string().contains("embedded"));
    }
}
