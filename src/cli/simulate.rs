//! Headless simulation command
//!
//! Drives a [`Greeting`] over a [`MemorySurface`] and a [`HeadlessPlayer`]
//! with a virtual clock, replaying a scripted list of inputs.

use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use thiserror::Error;

use crate::app::Greeting;
use crate::config::load_config;
use crate::dispatch::{Control, Event};
use crate::media::{HeadlessPlayer, PlayerState};
use crate::scheduler::Millis;
use crate::surface::MemorySurface;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Errors in a `--script` argument.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("script step '{0}': expected TIME_MS:COMMAND")]
    Malformed(String),
    #[error("script step '{step}': invalid time")]
    Time { step: String },
    #[error("script step '{step}': unknown command '{command}'")]
    UnknownCommand { step: String, command: String },
    #[error("script step '{step}': invalid argument '{arg}'")]
    Argument { step: String, arg: String },
}

/// A scripted input.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Ready,
    Error(i32),
    State(PlayerState),
    Input(Event),
    /// Scroll the page by this many pixels, then fire the scroll event
    Scroll(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    pub at: Millis,
    pub command: ScriptCommand,
}

/// Parse a comma-separated script. Steps come back sorted by time; steps at
/// the same time keep their written order.
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps = script
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_step)
        .collect::<Result<Vec<_>, _>>()?;
    steps.sort_by_key(|s| s.at);
    Ok(steps)
}

fn parse_step(step: &str) -> Result<ScriptStep, ScriptError> {
    let (at, command) = step.split_once(':').ok_or_else(|| ScriptError::Malformed(step.to_string()))?;
    let at = at.trim().parse::<Millis>().map_err(|_| ScriptError::Time { step: step.to_string() })?;

    let (name, arg) = match command.split_once('=') {
        Some((name, arg)) => (name.trim(), Some(arg)),
        None => (command.trim(), None),
    };
    let bad_arg = || ScriptError::Argument { step: step.to_string(), arg: arg.unwrap_or("").to_string() };

    let command = match (name, arg) {
        ("ready", None) => ScriptCommand::Ready,
        ("error", Some(code)) => ScriptCommand::Error(code.trim().parse().map_err(|_| bad_arg())?),
        ("state", Some(state)) => ScriptCommand::State(parse_state(state.trim()).ok_or_else(bad_arg)?),
        ("click", Some(target)) => {
            let (control, index) = match target.split_once('#') {
                Some((control, index)) => (control, index.trim().parse().map_err(|_| bad_arg())?),
                None => (target, 0),
            };
            let control = parse_control(control.trim()).ok_or_else(bad_arg)?;
            ScriptCommand::Input(Event::click_nth(control, index))
        }
        ("key", Some(key)) => {
            let key = match key {
                "space" => ' ',
                k => {
                    let mut chars = k.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => c,
                        _ => return Err(bad_arg()),
                    }
                }
            };
            ScriptCommand::Input(Event::key(key))
        }
        ("slide", Some(value)) => {
            ScriptCommand::Input(Event::slide(value.trim().parse().map_err(|_| bad_arg())?))
        }
        ("scroll", Some(dy)) => ScriptCommand::Scroll(dy.trim().parse().map_err(|_| bad_arg())?),
        _ => {
            return Err(ScriptError::UnknownCommand {
                step: step.to_string(),
                command: command.to_string(),
            })
        }
    };

    Ok(ScriptStep { at, command })
}

fn parse_control(name: &str) -> Option<Control> {
    let control = match name {
        "play_pause" => Control::PlayPause,
        "mute" => Control::Mute,
        "volume_slider" => Control::VolumeSlider,
        "secret_heart" => Control::SecretHeart,
        "modal_close" => Control::ModalClose,
        "modal_backdrop" => Control::ModalBackdrop,
        "photo_frame" => Control::PhotoFrame,
        "social_button" => Control::SocialButton,
        "document" => Control::Document,
        _ => return None,
    };
    Some(control)
}

fn parse_state(name: &str) -> Option<PlayerState> {
    let state = match name {
        "unstarted" => PlayerState::Unstarted,
        "ended" => PlayerState::Ended,
        "playing" => PlayerState::Playing,
        "paused" => PlayerState::Paused,
        "buffering" => PlayerState::Buffering,
        "cued" => PlayerState::Cued,
        _ => return None,
    };
    Some(state)
}

fn apply(greeting: &mut Greeting<MemorySurface, HeadlessPlayer>, command: &ScriptCommand) {
    log::debug!("t={}ms script {:?}", greeting.now(), command);
    match command {
        ScriptCommand::Ready => greeting.player_mut().signal_ready(),
        ScriptCommand::Error(code) => greeting.player_mut().signal_error(*code),
        ScriptCommand::State(state) => greeting.player_mut().signal_state(*state),
        ScriptCommand::Input(event) => greeting.dispatch(*event),
        ScriptCommand::Scroll(dy) => {
            greeting.surface_mut().scroll_by(*dy);
            greeting.dispatch(Event::scroll());
        }
    }
    // Deliver queued player events
    greeting.advance(0);
}

fn snapshot_line(greeting: &Greeting<MemorySurface, HeadlessPlayer>) -> serde_json::Result<String> {
    serde_json::to_string(&serde_json::json!({
        "engine": greeting.snapshot(),
        "page": greeting.surface().summary(),
    }))
}

/// Run the simulation, writing JSON lines to `out`.
pub fn simulate(
    greeting: &mut Greeting<MemorySurface, HeadlessPlayer>,
    seconds: u64,
    step: Millis,
    script: Vec<ScriptStep>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let end = seconds.saturating_mul(1000);
    let step = step.max(1);
    let mut pending: VecDeque<ScriptStep> = script.into();

    greeting.start();
    let mut next_print = 0;

    loop {
        while pending.front().is_some_and(|s| s.at <= greeting.now()) {
            if let Some(s) = pending.pop_front() {
                apply(greeting, &s.command);
            }
        }
        if greeting.now() == next_print {
            writeln!(out, "{}", snapshot_line(greeting)?)?;
            next_print += step;
        }
        if greeting.now() >= end {
            break;
        }

        let next_script = pending.front().map(|s| s.at).unwrap_or(Millis::MAX);
        let target = next_print.min(next_script).min(end);
        let delta = target - greeting.now();
        greeting.player_mut().advance(delta as f64 / 1000.0);
        greeting.advance(delta);
    }

    Ok(())
}

/// Execute the simulate command
pub fn run_simulate(
    config_path: Option<&Path>,
    seconds: u64,
    step: u64,
    script: Option<&str>,
    seed: Option<u64>,
) -> ExitCode {
    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if seed.is_some() {
        config.page.seed = seed;
    }

    let steps = match script.map(parse_script).transpose() {
        Ok(steps) => steps.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut greeting = Greeting::new(config, MemorySurface::default(), HeadlessPlayer::default());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match simulate(&mut greeting, seconds, step, steps, &mut out) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GreetingConfig;

    #[test]
    fn test_parse_script() {
        let steps = parse_script("1500:click=social_button#2, 0:ready, 3000:key=space").unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0], ScriptStep { at: 0, command: ScriptCommand::Ready });
        assert_eq!(
            steps[1].command,
            ScriptCommand::Input(Event::click_nth(Control::SocialButton, 2))
        );
        assert_eq!(steps[2].command, ScriptCommand::Input(Event::key(' ')));
    }

    #[test]
    fn test_parse_script_errors() {
        assert!(matches!(parse_script("ready"), Err(ScriptError::Malformed(_))));
        assert!(matches!(parse_script("x:ready"), Err(ScriptError::Time { .. })));
        assert!(matches!(parse_script("0:dance"), Err(ScriptError::UnknownCommand { .. })));
        assert!(matches!(parse_script("0:click=kettle"), Err(ScriptError::Argument { .. })));
        assert!(matches!(parse_script("0:key=ab"), Err(ScriptError::Argument { .. })));
    }

    #[test]
    fn test_simulate_emits_one_line_per_step() {
        let mut config = GreetingConfig::default();
        config.page.seed = Some(3);
        let mut greeting = Greeting::new(config, MemorySurface::default(), HeadlessPlayer::default());
        let script = parse_script("0:ready,500:click=document,2000:click=secret_heart").unwrap();

        let mut out = Vec::new();
        simulate(&mut greeting, 3, 1000, script, &mut out).unwrap();

        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["engine"]["hearts"], 20);
        assert_eq!(lines[1]["engine"]["player_state"], "playing");
        assert_eq!(lines[2]["page"]["modal_open"], true);
        assert_eq!(lines[2]["engine"]["modal_hearts"], 8);
    }
}
