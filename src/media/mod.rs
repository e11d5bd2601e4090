//! Media adapter over the embedded music player
//!
//! [`MediaAdapter`] owns the readiness flag and the progress updater and
//! exposes the page's play/pause/mute/volume model on top of a [`Player`].
//!
//! The adapter never tracks playback state itself. Toggles and icon refreshes
//! re-query the player, which stays the single source of truth.
//!
//! # Lifecycle
//!
//! ```text
//! not ready --Ready--> ready --Error--> failed (terminal)
//!     \______________________Error______/
//! ```
//!
//! While not ready (or failed) every operation is a no-op that never touches
//! the player.

mod headless;
mod player;

pub use headless::{HeadlessPlayer, PlayerCall};
pub use player::{MediaError, Player, PlayerEvent, PlayerState};

use crate::app::Job;
use crate::config::MediaConfig;
use crate::models::Target;
use crate::scheduler::{Periodic, Scheduler};
use crate::surface::Surface;

pub const ICON_PLAY: &str = "fas fa-play";
pub const ICON_PAUSE: &str = "fas fa-pause";
pub const ICON_VOLUME_UP: &str = "fas fa-volume-up";
pub const ICON_VOLUME_MUTE: &str = "fas fa-volume-mute";

/// Normalizes a [`Player`] into the page's music controls.
pub struct MediaAdapter<P: Player> {
    player: P,
    config: MediaConfig,
    ready: bool,
    failure: Option<MediaError>,
    unlocked: bool,
    progress: Periodic,
}

impl<P: Player> MediaAdapter<P> {
    pub fn new(player: P, config: MediaConfig) -> Self {
        let progress = Periodic::new(config.progress_interval_ms);
        Self { player, config, ready: false, failure: None, unlocked: false, progress }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The error that ended playback for this session, if any.
    pub fn failure(&self) -> Option<MediaError> {
        self.failure
    }

    pub fn progress_running(&self) -> bool {
        self.progress.is_running()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Handle every event the player emitted since the last call.
    pub fn pump(&mut self, surface: &mut dyn Surface, scheduler: &mut Scheduler<Job>) {
        for event in self.player.drain_events() {
            self.handle(event, surface, scheduler);
        }
    }

    pub fn handle(
        &mut self,
        event: PlayerEvent,
        surface: &mut dyn Surface,
        scheduler: &mut Scheduler<Job>,
    ) {
        match event {
            PlayerEvent::Ready => self.on_ready(surface),
            PlayerEvent::StateChange(state) => self.on_state_change(state, surface, scheduler),
            PlayerEvent::Error(code) => self.on_error(code, surface, scheduler),
        }
    }

    fn on_ready(&mut self, surface: &mut dyn Surface) {
        if self.failure.is_some() {
            log::debug!("ignoring ready signal after player failure");
            return;
        }
        self.ready = true;
        log::info!("music player ready");

        let volume = self.config.default_volume.min(100);
        self.player.set_volume(volume);
        surface.set_value(Target::VolumeSlider, volume as f64);

        self.refresh_play_button(surface);
        self.refresh_mute_button(surface);
        log::info!("click anywhere to start the music");
    }

    fn on_state_change(
        &mut self,
        state: PlayerState,
        surface: &mut dyn Surface,
        scheduler: &mut Scheduler<Job>,
    ) {
        if self.failure.is_some() {
            log::debug!("ignoring state change after player failure");
            return;
        }
        log::debug!("player state -> {:?}", state);
        match state {
            PlayerState::Playing => {
                surface.set_visible(Target::PlayingIndicator, true);
                self.start_progress(scheduler);
            }
            PlayerState::Paused | PlayerState::Ended => {
                surface.set_visible(Target::PlayingIndicator, false);
                self.stop_progress(scheduler);
            }
            PlayerState::Unstarted | PlayerState::Buffering | PlayerState::Cued => {}
        }
        self.refresh_play_button(surface);
    }

    fn on_error(&mut self, code: i32, surface: &mut dyn Surface, scheduler: &mut Scheduler<Job>) {
        let error = MediaError::from_code(code);
        log::error!("music player error: {}", error);

        surface.set_text(Target::SongTitle, &self.config.error_label);
        surface.set_visible(Target::PlayingIndicator, false);
        self.stop_progress(scheduler);
        self.ready = false;
        self.failure = Some(error);
    }

    /// First user interaction anywhere on the page. Only the first call
    /// counts, whether or not the player was ready for it.
    pub fn unlock(&mut self) {
        if self.unlocked {
            return;
        }
        self.unlocked = true;
        if self.ready {
            log::debug!("first interaction, starting playback");
            self.player.play();
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Start playback unless the player already reports playing.
    pub fn play_unless_playing(&mut self) {
        if self.ready && self.player.state() != PlayerState::Playing {
            self.player.play();
        }
    }

    /// Pause when the player reports playing, play otherwise.
    pub fn toggle_play_pause(&mut self) {
        if !self.ready {
            return;
        }
        if self.player.state() == PlayerState::Playing {
            self.player.pause();
        } else {
            self.player.play();
        }
    }

    pub fn toggle_mute(&mut self, surface: &mut dyn Surface) {
        if !self.ready {
            return;
        }
        if self.player.is_muted() {
            self.player.unmute();
        } else {
            self.player.mute();
        }
        self.refresh_mute_button(surface);
    }

    /// Set the volume, clamped to `0..=100`.
    pub fn set_volume(&mut self, volume: f64, surface: &mut dyn Surface) {
        if !self.ready {
            return;
        }
        let volume = if volume.is_nan() { 0.0 } else { volume.round().clamp(0.0, 100.0) };
        self.player.set_volume(volume as u8);
        self.refresh_mute_button(surface);
    }

    pub fn refresh_play_button(&self, surface: &mut dyn Surface) {
        let icon = if self.ready && self.player.state() == PlayerState::Playing {
            ICON_PAUSE
        } else {
            ICON_PLAY
        };
        surface.set_icon(Target::PlayIcon, icon);
    }

    /// Recompute the mute icon from the player, and mirror its volume on the
    /// slider while unmuted.
    pub fn refresh_mute_button(&self, surface: &mut dyn Surface) {
        if !self.ready {
            surface.set_icon(Target::MuteIcon, ICON_VOLUME_UP);
            return;
        }

        let muted = self.player.is_muted();
        let volume = self.player.volume();
        let icon = if muted || volume == 0 { ICON_VOLUME_MUTE } else { ICON_VOLUME_UP };
        surface.set_icon(Target::MuteIcon, icon);

        if !muted {
            surface.set_value(Target::VolumeSlider, volume as f64);
        }
    }

    /// Progress updater tick.
    pub fn update_progress(&self, surface: &mut dyn Surface) {
        if !self.ready {
            return;
        }
        let duration = self.player.duration();
        if duration > 0.0 {
            let percent = self.player.current_time() / duration * 100.0;
            surface.set_style(Target::Progress, "width", &format!("{}%", percent));
        }
    }

    /// (Re)start the progress updater. Any previous cycle is cleared first.
    pub fn start_progress(&mut self, scheduler: &mut Scheduler<Job>) {
        self.progress.start(scheduler, Job::ProgressTick);
    }

    /// Stop the progress updater. Idempotent.
    pub fn stop_progress(&mut self, scheduler: &mut Scheduler<Job>) {
        self.progress.stop(scheduler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    struct Rig {
        adapter: MediaAdapter<HeadlessPlayer>,
        surface: MemorySurface,
        scheduler: Scheduler<Job>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                adapter: MediaAdapter::new(HeadlessPlayer::new(200.0), MediaConfig::default()),
                surface: MemorySurface::default(),
                scheduler: Scheduler::new(),
            }
        }

        fn ready() -> Self {
            let mut rig = Self::new();
            rig.adapter.player_mut().signal_ready();
            rig.pump();
            rig
        }

        fn pump(&mut self) {
            self.adapter.pump(&mut self.surface, &mut self.scheduler);
        }

        fn progress_jobs(&self) -> usize {
            self.scheduler.count_matching(|j| *j == Job::ProgressTick)
        }
    }

    #[test]
    fn test_not_ready_operations_never_touch_player() {
        let mut rig = Rig::new();
        rig.adapter.toggle_play_pause();
        rig.adapter.toggle_mute(&mut rig.surface);
        rig.adapter.set_volume(30.0, &mut rig.surface);
        rig.adapter.play_unless_playing();
        rig.adapter.update_progress(&mut rig.surface);
        rig.adapter.refresh_play_button(&mut rig.surface);
        rig.adapter.refresh_mute_button(&mut rig.surface);

        assert!(rig.adapter.player().untouched());
        assert_eq!(rig.surface.icon(Target::PlayIcon), Some(ICON_PLAY));
        assert_eq!(rig.surface.icon(Target::MuteIcon), Some(ICON_VOLUME_UP));
    }

    #[test]
    fn test_ready_applies_default_volume() {
        let rig = Rig::ready();
        assert!(rig.adapter.is_ready());
        assert_eq!(rig.adapter.player().calls(), &[PlayerCall::SetVolume(50)]);
        assert_eq!(rig.surface.value(Target::VolumeSlider), Some(50.0));
    }

    #[test]
    fn test_playing_shows_indicator_and_starts_progress() {
        let mut rig = Rig::ready();
        rig.adapter.toggle_play_pause();
        rig.pump();

        assert!(rig.surface.is_visible(Target::PlayingIndicator));
        assert!(rig.adapter.progress_running());
        assert_eq!(rig.surface.icon(Target::PlayIcon), Some(ICON_PAUSE));

        rig.adapter.toggle_play_pause();
        rig.pump();
        assert!(!rig.surface.is_visible(Target::PlayingIndicator));
        assert!(!rig.adapter.progress_running());
        assert_eq!(rig.progress_jobs(), 0);
        assert_eq!(rig.surface.icon(Target::PlayIcon), Some(ICON_PLAY));
    }

    #[test]
    fn test_repeated_playing_keeps_one_progress_cycle() {
        let mut rig = Rig::ready();
        rig.adapter.player_mut().signal_state(PlayerState::Playing);
        rig.adapter.player_mut().signal_state(PlayerState::Playing);
        rig.pump();
        assert_eq!(rig.progress_jobs(), 1);
    }

    #[test]
    fn test_ended_stops_progress() {
        let mut rig = Rig::ready();
        rig.adapter.player_mut().signal_state(PlayerState::Playing);
        rig.adapter.player_mut().signal_state(PlayerState::Ended);
        rig.pump();
        assert!(!rig.adapter.progress_running());
        assert!(!rig.surface.is_visible(Target::PlayingIndicator));
    }

    #[test]
    fn test_buffering_leaves_indicator_alone() {
        let mut rig = Rig::ready();
        rig.adapter.player_mut().signal_state(PlayerState::Playing);
        rig.adapter.player_mut().signal_state(PlayerState::Buffering);
        rig.pump();
        assert!(rig.surface.is_visible(Target::PlayingIndicator));
        assert!(rig.adapter.progress_running());
    }

    #[test]
    fn test_progress_width() {
        let mut rig = Rig::ready();
        rig.adapter.player_mut().set_position(50.0);
        rig.adapter.update_progress(&mut rig.surface);
        assert_eq!(rig.surface.style(Target::Progress, "width"), Some("25%"));
    }

    #[test]
    fn test_progress_skipped_without_duration() {
        let mut rig = Rig::new();
        rig.adapter = MediaAdapter::new(HeadlessPlayer::new(0.0), MediaConfig::default());
        rig.adapter.player_mut().signal_ready();
        rig.pump();
        rig.adapter.update_progress(&mut rig.surface);
        assert_eq!(rig.surface.style(Target::Progress, "width"), None);
    }

    #[test]
    fn test_volume_zero_shows_muted_icon() {
        let mut rig = Rig::ready();
        assert_eq!(rig.surface.icon(Target::MuteIcon), Some(ICON_VOLUME_UP));

        rig.adapter.set_volume(0.0, &mut rig.surface);
        assert_eq!(rig.surface.icon(Target::MuteIcon), Some(ICON_VOLUME_MUTE));
        assert_eq!(rig.surface.value(Target::VolumeSlider), Some(0.0));
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut rig = Rig::ready();
        rig.adapter.set_volume(250.0, &mut rig.surface);
        rig.adapter.set_volume(-3.0, &mut rig.surface);
        let calls = rig.adapter.player().calls();
        assert_eq!(&calls[1..], &[PlayerCall::SetVolume(100), PlayerCall::SetVolume(0)]);
    }

    #[test]
    fn test_toggle_mute_requeries_player() {
        let mut rig = Rig::ready();
        rig.adapter.toggle_mute(&mut rig.surface);
        assert_eq!(rig.surface.icon(Target::MuteIcon), Some(ICON_VOLUME_MUTE));

        // Slider keeps its last value while muted
        rig.adapter.set_volume(80.0, &mut rig.surface);
        assert_eq!(rig.surface.value(Target::VolumeSlider), Some(50.0));

        rig.adapter.toggle_mute(&mut rig.surface);
        assert_eq!(rig.surface.icon(Target::MuteIcon), Some(ICON_VOLUME_UP));
        assert_eq!(rig.surface.value(Target::VolumeSlider), Some(80.0));
    }

    #[test]
    fn test_unlock_is_one_time() {
        let mut rig = Rig::ready();
        rig.adapter.unlock();
        rig.adapter.unlock();
        let plays = rig.adapter.player().calls().iter().filter(|c| **c == PlayerCall::Play).count();
        assert_eq!(plays, 1);
    }

    #[test]
    fn test_unlock_before_ready_is_consumed() {
        let mut rig = Rig::new();
        rig.adapter.unlock();
        assert!(rig.adapter.is_unlocked());

        rig.adapter.player_mut().signal_ready();
        rig.pump();
        rig.adapter.unlock();
        assert!(!rig.adapter.player().calls().contains(&PlayerCall::Play));
    }

    #[test]
    fn test_play_unless_playing() {
        let mut rig = Rig::ready();
        rig.adapter.play_unless_playing();
        rig.adapter.play_unless_playing();
        let plays = rig.adapter.player().calls().iter().filter(|c| **c == PlayerCall::Play).count();
        assert_eq!(plays, 1);
    }

    #[test]
    fn test_error_is_terminal() {
        let mut rig = Rig::ready();
        rig.adapter.toggle_play_pause();
        rig.pump();

        rig.adapter.player_mut().signal_error(150);
        rig.pump();
        assert_eq!(rig.surface.text(Target::SongTitle), Some("Music unavailable - YouTube error"));
        assert_eq!(rig.adapter.failure(), Some(MediaError::EmbedRefused(150)));
        assert!(!rig.adapter.progress_running());
        assert!(!rig.surface.is_visible(Target::PlayingIndicator));

        let before = rig.adapter.player().calls().len();
        rig.adapter.toggle_play_pause();
        rig.adapter.unlock();
        rig.adapter.player_mut().signal_ready();
        rig.pump();
        assert!(!rig.adapter.is_ready());
        assert_eq!(rig.adapter.player().calls().len(), before);
    }

    #[test]
    fn test_state_change_after_error_is_ignored() {
        let mut rig = Rig::ready();
        rig.adapter.player_mut().signal_error(150);
        rig.pump();

        rig.adapter.player_mut().signal_state(PlayerState::Playing);
        rig.pump();
        assert!(!rig.surface.is_visible(Target::PlayingIndicator));
        assert!(!rig.adapter.progress_running());
        assert_eq!(rig.progress_jobs(), 0);
        assert_eq!(rig.surface.icon(Target::PlayIcon), Some(ICON_PLAY));
    }
}
