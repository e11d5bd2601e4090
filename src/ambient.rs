//! Input-independent cosmetic cycles: title pulse, background hue drift and
//! the looping lyric cascade.

use crate::app::Job;
use crate::config::AmbientConfig;
use crate::models::{Group, Target};
use crate::scheduler::{Millis, Periodic, Scheduler};
use crate::surface::Surface;

/// Background hue accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct HueCycle {
    hue: f64,
    step: f64,
    offset: f64,
}

impl HueCycle {
    pub fn new(step: f64, offset: f64) -> Self {
        Self { hue: 0.0, step, offset }
    }

    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Advance by one step, wrapping at 360 degrees.
    pub fn advance(&mut self) -> f64 {
        self.hue = (self.hue + self.step) % 360.0;
        self.hue
    }

    /// Body background for the current hue.
    pub fn gradient(&self) -> String {
        format!(
            "linear-gradient(135deg, hsl({:.1}, 30%, 95%) 0%, hsl({:.1}, 40%, 97%) 100%)",
            self.hue,
            self.hue + self.offset
        )
    }
}

/// Owns the ambient timers and the state they mutate.
pub struct Ambient {
    config: AmbientConfig,
    hue: HueCycle,
    title_timer: Periodic,
    hue_timer: Periodic,
    lyric_timer: Periodic,
    lyric_lines: usize,
}

impl Ambient {
    pub fn new(config: AmbientConfig) -> Self {
        Self {
            hue: HueCycle::new(config.hue_step, config.hue_offset),
            title_timer: Periodic::new(config.title_interval_ms),
            hue_timer: Periodic::new(config.hue_interval_ms),
            lyric_timer: Periodic::new(config.lyric_cycle_ms),
            lyric_lines: 0,
            config,
        }
    }

    pub fn hue(&self) -> f64 {
        self.hue.hue()
    }

    /// Start every cycle and the first lyric cascade.
    pub fn start(&mut self, surface: &dyn Surface, scheduler: &mut Scheduler<Job>) {
        self.lyric_lines = surface.group_len(Group::Lyrics);
        self.title_timer.start(scheduler, Job::TitlePulse);
        self.hue_timer.start(scheduler, Job::HueStep);
        self.schedule_lyrics(scheduler);
        self.lyric_timer.start(scheduler, Job::LyricReset);
    }

    /// Stop every cycle. Pending one-shot jobs still run.
    pub fn stop(&mut self, scheduler: &mut Scheduler<Job>) {
        self.title_timer.stop(scheduler);
        self.hue_timer.stop(scheduler);
        self.lyric_timer.stop(scheduler);
    }

    pub fn is_running(&self) -> bool {
        self.title_timer.is_running() || self.hue_timer.is_running() || self.lyric_timer.is_running()
    }

    /// Clear the title animation; it is restored shortly after so the
    /// browser restarts it from the first frame.
    pub fn title_pulse(&self, surface: &mut dyn Surface, scheduler: &mut Scheduler<Job>) {
        surface.set_style(Target::Title, "animation", "none");
        scheduler.set_timeout(self.config.title_restart_ms, Job::TitleRestore);
    }

    pub fn title_restore(&self, surface: &mut dyn Surface) {
        surface.set_style(Target::Title, "animation", &self.config.title_animation);
    }

    pub fn hue_step(&mut self, surface: &mut dyn Surface) {
        self.hue.advance();
        surface.set_style(Target::Body, "background", &self.hue.gradient());
    }

    pub fn show_lyric(&self, surface: &mut dyn Surface, index: usize) {
        surface.set_revealed(Group::Lyrics, index, true);
    }

    /// Hide every lyric line and queue the next cascade.
    pub fn reset_lyrics(&self, surface: &mut dyn Surface, scheduler: &mut Scheduler<Job>) {
        for i in 0..self.lyric_lines {
            surface.set_revealed(Group::Lyrics, i, false);
        }
        scheduler.set_timeout(self.config.lyric_restart_ms, Job::LyricRestart);
    }

    /// Line `i` shows `(i + 1)` steps from now.
    pub fn schedule_lyrics(&self, scheduler: &mut Scheduler<Job>) {
        for i in 0..self.lyric_lines {
            let delay = (i as Millis + 1) * self.config.lyric_step_ms;
            scheduler.set_timeout(delay, Job::LyricShow(i));
        }
    }
}
