//! The greeting page engine
//!
//! [`Greeting`] owns the surface, the player, the scheduler and every
//! component. After [`Greeting::start`], all work flows through three entry
//! points:
//!
//! - [`Greeting::advance`] moves the clock and runs due jobs
//! - [`Greeting::dispatch`] handles one user input
//! - [`Greeting::player_event`] handles one player notification
//!
//! Each call runs to completion before returning, and player events queued
//! by a command are handled before the call returns.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ambient::Ambient;
use crate::config::GreetingConfig;
use crate::dispatch::{Action, Dispatcher, Event, Input};
use crate::effects::EffectSpawner;
use crate::media::{MediaAdapter, Player, PlayerEvent, PlayerState};
use crate::models::{Group, Layer, Target};
use crate::reveal::RevealTracker;
use crate::scheduler::{Millis, Periodic, Scheduler};
use crate::surface::{NodeId, Surface};

/// Scheduled work, as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Heart spawner tick (cap-checked)
    SpawnHeart,
    /// A confetti piece reached the end of its animation
    ExpireConfetti(NodeId),
    /// Timed entrance of the message group
    RevealEntrance,
    Reveal(Group, usize),
    ProgressTick,
    TitlePulse,
    TitleRestore,
    HueStep,
    LyricShow(usize),
    LyricReset,
    LyricRestart,
    /// Put a pulsed control back to its resting transform
    EndPulse(Target),
}

/// The whole page: components, surface, player and clock.
pub struct Greeting<S: Surface, P: Player> {
    config: GreetingConfig,
    surface: S,
    scheduler: Scheduler<Job>,
    spawner: EffectSpawner,
    reveal: RevealTracker,
    media: MediaAdapter<P>,
    dispatcher: Dispatcher,
    ambient: Ambient,
    heart_timer: Periodic,
    started: bool,
}

impl<S: Surface, P: Player> Greeting<S, P> {
    pub fn new(config: GreetingConfig, surface: S, player: P) -> Self {
        let spawner = EffectSpawner::new(
            config.hearts.clone(),
            config.confetti.clone(),
            config.modal.clone(),
            config.page.seed,
        );
        let reveal = RevealTracker::new(config.reveal.clone(), &surface);
        let media = MediaAdapter::new(player, config.media.clone());
        let dispatcher = Dispatcher::standard(config.page.variant);
        let ambient = Ambient::new(config.ambient.clone());
        let heart_timer = Periodic::new(config.hearts.interval_ms);

        Self {
            config,
            surface,
            scheduler: Scheduler::new(),
            spawner,
            reveal,
            media,
            dispatcher,
            ambient,
            heart_timer,
            started: false,
        }
    }

    /// Replace the binding table.
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Initialize every component once. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let hearts = self.spawner.populate(&mut self.surface);
        self.heart_timer.start(&mut self.scheduler, Job::SpawnHeart);
        log::debug!("spawned {} initial hearts", hearts);

        self.media.refresh_play_button(&mut self.surface);
        self.media.refresh_mute_button(&mut self.surface);

        self.scheduler.set_timeout(self.reveal.entrance_delay(), Job::RevealEntrance);
        self.reveal_scan();

        self.ambient.start(&self.surface, &mut self.scheduler);

        log::info!("You found the secret! This page is a love letter to someone very special.");
        log::info!("Now playing: {}", self.config.media.track);
        log::info!("Click anywhere on the page to start the music!");

        self.pump_player();
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Move the clock forward by `ms`, running every job that falls due.
    pub fn advance(&mut self, ms: Millis) {
        let until = self.scheduler.now() + ms;
        self.pump_player();
        while let Some((_, job)) = self.scheduler.pop_due(until) {
            self.run(job);
            self.pump_player();
        }
        self.scheduler.advance_to(until);
    }

    /// Handle one user input.
    pub fn dispatch(&mut self, event: Event) {
        for action in self.dispatcher.resolve_bubbling(&event) {
            self.perform(action, &event);
            self.pump_player();
        }
    }

    /// Handle one player notification delivered outside the player's queue.
    pub fn player_event(&mut self, event: PlayerEvent) {
        self.media.handle(event, &mut self.surface, &mut self.scheduler);
        self.pump_player();
    }

    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    pub fn config(&self) -> &GreetingConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn player(&self) -> &P {
        self.media.player()
    }

    pub fn player_mut(&mut self) -> &mut P {
        self.media.player_mut()
    }

    pub fn media(&self) -> &MediaAdapter<P> {
        &self.media
    }

    pub fn reveal(&self) -> &RevealTracker {
        &self.reveal
    }

    pub fn scheduler(&self) -> &Scheduler<Job> {
        &self.scheduler
    }

    pub fn hue(&self) -> f64 {
        self.ambient.hue()
    }

    /// Point-in-time view of the engine for reporting.
    pub fn snapshot(&self) -> Snapshot {
        let ready = self.media.is_ready();
        Snapshot {
            at_ms: self.now(),
            hearts: self.surface.count(Layer::Hearts),
            modal_hearts: self.surface.count(Layer::ModalHearts),
            confetti: self.surface.count(Layer::Confetti),
            revealed: crate::reveal::TRACKED
                .iter()
                .map(|g| (*g, self.reveal.revealed_count(*g)))
                .collect(),
            player_ready: ready,
            player_state: if ready { Some(self.media.player().state()) } else { None },
            progress_running: self.media.progress_running(),
            hue: self.ambient.hue(),
            pending_jobs: self.scheduler.pending(),
        }
    }

    fn pump_player(&mut self) {
        self.media.pump(&mut self.surface, &mut self.scheduler);
    }

    fn reveal_scan(&mut self) {
        for r in self.reveal.scan(&mut self.surface) {
            self.scheduler.set_timeout(r.delay, Job::Reveal(r.group, r.index));
        }
    }

    fn spawn_confetti(&mut self) {
        for piece in self.spawner.spawn_confetti(&mut self.surface) {
            self.scheduler.set_timeout(piece.lifetime, Job::ExpireConfetti(piece.node));
        }
    }

    fn pulse(&mut self, target: Target, transform: &str, hold: Millis) {
        self.surface.set_style(target, "transform", transform);
        self.scheduler.set_timeout(hold, Job::EndPulse(target));
    }

    fn run(&mut self, job: Job) {
        match job {
            Job::SpawnHeart => {
                self.spawner.try_spawn_heart(&mut self.surface);
            }
            Job::ExpireConfetti(node) => {
                self.surface.remove(node);
            }
            Job::RevealEntrance => {
                self.reveal.reveal_all(&mut self.surface, Group::Messages);
            }
            Job::Reveal(group, index) => {
                self.reveal.reveal(&mut self.surface, group, index);
            }
            Job::ProgressTick => self.media.update_progress(&mut self.surface),
            Job::TitlePulse => self.ambient.title_pulse(&mut self.surface, &mut self.scheduler),
            Job::TitleRestore => self.ambient.title_restore(&mut self.surface),
            Job::HueStep => self.ambient.hue_step(&mut self.surface),
            Job::LyricShow(i) => self.ambient.show_lyric(&mut self.surface, i),
            Job::LyricReset => self.ambient.reset_lyrics(&mut self.surface, &mut self.scheduler),
            Job::LyricRestart => self.ambient.schedule_lyrics(&mut self.scheduler),
            Job::EndPulse(target) => {
                let rest = match target {
                    Target::PhotoFrame(_) => &self.config.pulse.photo_rest,
                    _ => &self.config.pulse.social_rest,
                };
                self.surface.set_style(target, "transform", rest);
            }
        }
    }

    fn perform(&mut self, action: Action, event: &Event) {
        log::trace!("{:?} -> {:?}", event, action);
        match action {
            Action::TogglePlayback => self.media.toggle_play_pause(),
            Action::ToggleMute => self.media.toggle_mute(&mut self.surface),
            Action::SetVolume => {
                if let Input::Slide(value) = event.input {
                    self.media.set_volume(value, &mut self.surface);
                }
            }
            Action::OpenSecret { force_playback } => {
                self.surface.set_visible(Target::Modal, true);
                self.spawner.rebuild_modal_hearts(&mut self.surface);
                self.spawn_confetti();
                if force_playback {
                    self.media.play_unless_playing();
                }
            }
            Action::CloseModal => self.surface.set_visible(Target::Modal, false),
            Action::SpawnConfetti => self.spawn_confetti(),
            Action::PulsePhoto => {
                let transform = self.config.pulse.photo_transform.clone();
                let hold = self.config.pulse.photo_hold_ms;
                self.pulse(Target::PhotoFrame(event.index), &transform, hold);
            }
            Action::PulseSocial => {
                let transform = self.config.pulse.social_transform.clone();
                let hold = self.config.pulse.social_hold_ms;
                self.pulse(Target::SocialButton(event.index), &transform, hold);
            }
            Action::UnlockAudio => self.media.unlock(),
            Action::RevealScan => self.reveal_scan(),
        }
    }
}

/// Engine state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub at_ms: Millis,
    pub hearts: usize,
    pub modal_hearts: usize,
    pub confetti: usize,
    pub revealed: BTreeMap<Group, usize>,
    pub player_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_state: Option<PlayerState>,
    pub progress_running: bool,
    pub hue: f64,
    pub pending_jobs: usize,
}
