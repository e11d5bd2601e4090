//! WASM tests using wasm_bindgen_test
//!
//! Run with: wasm-pack test --headless --chrome --features wasm

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

// Configure tests to run in browser environment
wasm_bindgen_test_configure!(run_in_browser);

use heartfelt::config::GreetingConfig;
use heartfelt::dispatch::{Control, Event};
use heartfelt::media::HeadlessPlayer;
use heartfelt::models::{Layer, Target};
use heartfelt::{Greeting, MemorySurface, Surface};

#[wasm_bindgen_test]
fn test_engine_runs_headless_in_browser() {
    let mut page = Greeting::new(GreetingConfig::default(), MemorySurface::default(), HeadlessPlayer::default());
    page.start();
    assert_eq!(page.surface().count(Layer::Hearts), 20);

    page.dispatch(Event::click(Control::SecretHeart));
    assert!(page.surface().is_visible(Target::Modal));
    assert_eq!(page.surface().count(Layer::Confetti), 50);

    page.advance(60_000);
    assert_eq!(page.surface().count(Layer::Confetti), 0);
    assert!(page.surface().heart_count() <= 30);
}

#[cfg(feature = "wasm")]
#[wasm_bindgen_test]
fn test_bind_fails_fast_on_incomplete_page() {
    use heartfelt::wasm::DomSurface;
    use heartfelt::SurfaceError;

    let window = web_sys::window().unwrap();
    match DomSurface::bind(window) {
        Err(SurfaceError::MissingElement { selector }) => assert_eq!(selector, ".hearts-container"),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("bind should fail on an empty page"),
    }
}
