//! Heartfelt - effect engine for a single-page romantic greeting
//!
//! This library provides:
//! - Decorative effects: a capped field of floating hearts, confetti bursts
//!   and the secret modal's heart row
//! - Scroll-driven, one-way reveals of page sections
//! - A media adapter over an embedded music player
//! - An input binding table and ambient cosmetic cycles
//!
//! The engine runs on a virtual clock ([`scheduler::Scheduler`]) against the
//! [`surface::Surface`] trait, so it works headless (tests, the `heartfelt
//! simulate` command) and in the browser (the `wasm` feature).

pub mod ambient;
pub mod app;
pub mod config;
pub mod dispatch;
pub mod effects;
pub mod media;
pub mod models;
pub mod reveal;
pub mod scheduler;
pub mod surface;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use app::{Greeting, Job, Snapshot};
pub use config::GreetingConfig;
pub use surface::{MemorySurface, Surface, SurfaceError};
