//! WASM binding for the browser page
//!
//! [`DomSurface`] implements [`Surface`] over the greeting's DOM and
//! [`YouTubePlayer`] implements [`Player`] over the YouTube IFrame API.
//! [`mount`] wires both into a [`Greeting`] and drives it from a single
//! `setInterval` plus document-level event listeners.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent, Window};

use crate::app::Greeting;
use crate::config::{parse_config, GreetingConfig};
use crate::dispatch::{Control, Event};
use crate::media::{Player, PlayerEvent, PlayerState};
use crate::models::{Decoration, Group, Layer, Target};
use crate::surface::{NodeId, Surface, SurfaceError};

/// Engine tick period in milliseconds.
const TICK_MS: i32 = 50;

/// Element that hosts the embedded player.
const PLAYER_ELEMENT: &str = "youtubePlayer";

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

fn host(e: JsValue) -> SurfaceError {
    SurfaceError::Host(format!("{:?}", e))
}

fn require(document: &Document, selector: &str) -> Result<Element, SurfaceError> {
    document
        .query_selector(selector)
        .map_err(host)?
        .ok_or_else(|| SurfaceError::MissingElement { selector: selector.to_string() })
}

fn require_html(document: &Document, selector: &str) -> Result<HtmlElement, SurfaceError> {
    require(document, selector)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| SurfaceError::Host(format!("{} is not an HTML element", selector)))
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, SurfaceError> {
    let list = document.query_selector_all(selector).map_err(host)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn query_all_html(document: &Document, selector: &str) -> Result<Vec<HtmlElement>, SurfaceError> {
    Ok(query_all(document, selector)?
        .into_iter()
        .filter_map(|e| e.dyn_into::<HtmlElement>().ok())
        .collect())
}

fn warn_on(result: Result<impl Sized, JsValue>, what: &str) {
    if let Err(e) = result {
        log::warn!("{} failed: {:?}", what, e);
    }
}

/// The greeting page's DOM, resolved once at bind time.
pub struct DomSurface {
    window: Window,
    document: Document,
    layers: HashMap<Layer, Element>,
    targets: HashMap<Target, HtmlElement>,
    volume_slider: HtmlInputElement,
    photos: Vec<HtmlElement>,
    socials: Vec<HtmlElement>,
    secret_heart: Element,
    close: Element,
    groups: HashMap<Group, Vec<Element>>,
    nodes: HashMap<NodeId, (Layer, Element)>,
    next_node: NodeId,
}

impl DomSurface {
    /// Resolve every element the engine touches. Fails on the first
    /// required element that is missing.
    pub fn bind(window: Window) -> Result<Self, SurfaceError> {
        let document = window
            .document()
            .ok_or_else(|| SurfaceError::Host("window has no document".to_string()))?;

        let mut layers = HashMap::new();
        layers.insert(Layer::Hearts, require(&document, ".hearts-container")?);
        layers.insert(Layer::Confetti, require(&document, ".confetti-container")?);
        layers.insert(Layer::ModalHearts, require(&document, ".floating-hearts-small")?);

        let mut targets = HashMap::new();
        for (target, selector) in [
            (Target::Modal, "#secretModal"),
            (Target::Title, ".title"),
            (Target::PlayingIndicator, "#playingIndicator"),
            (Target::Progress, "#progress"),
            (Target::PlayIcon, "#playPauseBtn i"),
            (Target::MuteIcon, "#muteBtn i"),
            (Target::SongTitle, ".song-title"),
        ] {
            targets.insert(target, require_html(&document, selector)?);
        }
        let body = document.body().ok_or_else(|| SurfaceError::MissingElement { selector: "body".to_string() })?;
        targets.insert(Target::Body, body);

        let volume_slider = require(&document, "#volumeSlider")?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| SurfaceError::Host("#volumeSlider is not an input".to_string()))?;

        let mut groups = HashMap::new();
        groups.insert(Group::Messages, query_all(&document, ".message-text, .signature")?);
        groups.insert(Group::Timeline, query_all(&document, ".timeline-content")?);
        groups.insert(Group::Qualities, query_all(&document, ".quality-card")?);
        groups.insert(Group::Lyrics, query_all(&document, ".lyric-line")?);

        Ok(Self {
            photos: query_all_html(&document, ".photo-frame")?,
            socials: query_all_html(&document, ".social-btn")?,
            secret_heart: require(&document, "#secretHeart")?,
            close: require(&document, ".close")?,
            window,
            document,
            layers,
            targets,
            volume_slider,
            groups,
            nodes: HashMap::new(),
            next_node: 1,
        })
    }

    /// Map a click target to the control it belongs to.
    pub fn control_for(&self, element: &Element) -> (Control, usize) {
        let modal: Option<&Element> = self.targets.get(&Target::Modal).map(|m| m.as_ref());
        if modal == Some(element) {
            return (Control::ModalBackdrop, 0);
        }

        let within = |selector: &str| element.closest(selector).ok().flatten();
        if within("#playPauseBtn").is_some() {
            return (Control::PlayPause, 0);
        }
        if within("#muteBtn").is_some() {
            return (Control::Mute, 0);
        }
        if let Some(e) = within("#secretHeart") {
            if e == self.secret_heart {
                return (Control::SecretHeart, 0);
            }
        }
        if let Some(e) = within(".close") {
            if e == self.close {
                return (Control::ModalClose, 0);
            }
        }
        if let Some(e) = within(".photo-frame") {
            if let Some(i) = self.photos.iter().position(|p| AsRef::<Element>::as_ref(p) == &e) {
                return (Control::PhotoFrame, i);
            }
        }
        if let Some(e) = within(".social-btn") {
            if let Some(i) = self.socials.iter().position(|s| AsRef::<Element>::as_ref(s) == &e) {
                return (Control::SocialButton, i);
            }
        }
        (Control::Document, 0)
    }

    fn target(&self, target: Target) -> Option<&HtmlElement> {
        match target {
            Target::PhotoFrame(i) => self.photos.get(i),
            Target::SocialButton(i) => self.socials.get(i),
            _ => self.targets.get(&target),
        }
    }

    fn member(&self, group: Group, index: usize) -> Option<&Element> {
        self.groups.get(&group).and_then(|g| g.get(index))
    }
}

impl Surface for DomSurface {
    fn append(&mut self, layer: Layer, decoration: &Decoration) -> NodeId {
        let id = self.next_node;
        self.next_node += 1;

        let node = match self.document.create_element("div") {
            Ok(node) => node,
            Err(e) => {
                log::warn!("create decoration failed: {:?}", e);
                return id;
            }
        };
        node.set_class_name(decoration.class_name());
        if let Some(html) = node.dyn_ref::<HtmlElement>() {
            let style = html.style();
            for (property, value) in decoration.css_declarations() {
                warn_on(style.set_property(property, &value), "decoration style");
            }
        }
        if let Some(container) = self.layers.get(&layer) {
            warn_on(container.append_child(&node), "append decoration");
        }
        self.nodes.insert(id, (layer, node));
        id
    }

    fn remove(&mut self, node: NodeId) -> bool {
        match self.nodes.remove(&node) {
            Some((_, element)) => {
                element.remove();
                true
            }
            None => false,
        }
    }

    fn clear(&mut self, layer: Layer) {
        if let Some(container) = self.layers.get(&layer) {
            container.set_inner_html("");
        }
        self.nodes.retain(|_, (l, _)| *l != layer);
    }

    fn count(&self, layer: Layer) -> usize {
        self.nodes.values().filter(|(l, _)| *l == layer).count()
    }

    fn group_len(&self, group: Group) -> usize {
        self.groups.get(&group).map(Vec::len).unwrap_or(0)
    }

    fn member_top(&self, group: Group, index: usize) -> f64 {
        self.member(group, index)
            .map(|e| e.get_bounding_client_rect().top())
            .unwrap_or(f64::INFINITY)
    }

    fn viewport_height(&self) -> f64 {
        self.window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(0.0)
    }

    fn set_revealed(&mut self, group: Group, index: usize, revealed: bool) {
        if let Some(e) = self.member(group, index) {
            let classes = e.class_list();
            if revealed {
                warn_on(classes.add_1("show"), "reveal");
            } else {
                warn_on(classes.remove_1("show"), "unreveal");
            }
        }
    }

    fn set_visible(&mut self, target: Target, visible: bool) {
        let display = match (target, visible) {
            (_, false) => "none",
            (Target::PlayingIndicator, true) => "inline-flex",
            (_, true) => "block",
        };
        self.set_style(target, "display", display);
    }

    fn set_style(&mut self, target: Target, property: &str, value: &str) {
        if let Some(e) = self.target(target) {
            warn_on(e.style().set_property(property, value), "set style");
        }
    }

    fn set_text(&mut self, target: Target, text: &str) {
        if let Some(e) = self.target(target) {
            e.set_text_content(Some(text));
        }
    }

    fn set_icon(&mut self, target: Target, class_name: &str) {
        if let Some(e) = self.target(target) {
            e.set_class_name(class_name);
        }
    }

    fn set_value(&mut self, target: Target, value: f64) {
        match target {
            Target::VolumeSlider => self.volume_slider.set_value(&value.to_string()),
            other => log::warn!("{:?} has no value", other),
        }
    }
}

type EventQueue = Rc<RefCell<VecDeque<PlayerEvent>>>;

/// [`Player`] over a `YT.Player` instance.
///
/// Until the IFrame API has created the instance, commands are dropped and
/// queries return defaults; the adapter does not issue either before the
/// ready event anyway.
pub struct YouTubePlayer {
    instance: Rc<RefCell<Option<JsValue>>>,
    events: EventQueue,
}

impl YouTubePlayer {
    /// Create the embedded player in `element_id`, now if the IFrame API is
    /// loaded and otherwise from `onYouTubeIframeAPIReady`.
    pub fn embed(window: &Window, element_id: &str, video_id: &str) -> Result<Self, JsValue> {
        let instance: Rc<RefCell<Option<JsValue>>> = Rc::new(RefCell::new(None));
        let events: EventQueue = Rc::new(RefCell::new(VecDeque::new()));
        let options = player_options(video_id, &events)?;

        let create = {
            let instance = instance.clone();
            let element_id = element_id.to_string();
            move || {
                let window = match web_sys::window() {
                    Some(w) => w,
                    None => return,
                };
                match construct_player(&window, &element_id, &options) {
                    Ok(player) => *instance.borrow_mut() = Some(player),
                    Err(e) => log::error!("could not create YouTube player: {:?}", e),
                }
            }
        };

        let api_loaded = Reflect::get(window, &"YT".into())
            .ok()
            .and_then(|yt| Reflect::get(&yt, &"Player".into()).ok())
            .is_some_and(|ctor| ctor.is_function());
        if api_loaded {
            create();
        } else {
            let callback = Closure::once_into_js(create);
            Reflect::set(window, &"onYouTubeIframeAPIReady".into(), &callback)?;
        }

        Ok(Self { instance, events })
    }

    fn call(&self, method: &str, args: &[JsValue]) -> Option<JsValue> {
        let instance = self.instance.borrow();
        let player = instance.as_ref()?;
        let function = Reflect::get(player, &method.into()).ok()?.dyn_into::<Function>().ok()?;
        let result = match args {
            [] => function.call0(player),
            [a] => function.call1(player, a),
            _ => function.apply(player, &args.iter().collect::<Array>()),
        };
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("YouTube {} failed: {:?}", method, e);
                None
            }
        }
    }

    fn number(&self, method: &str) -> f64 {
        self.call(method, &[]).and_then(|v| v.as_f64()).unwrap_or(0.0)
    }
}

fn construct_player(window: &Window, element_id: &str, options: &Object) -> Result<JsValue, JsValue> {
    let yt = Reflect::get(window, &"YT".into())?;
    let ctor = Reflect::get(&yt, &"Player".into())?.dyn_into::<Function>()?;
    let args = Array::of2(&JsValue::from_str(element_id), options);
    Ok(Reflect::construct(&ctor, &args)?.into())
}

fn event_code(event: &JsValue) -> Option<i32> {
    Reflect::get(event, &"data".into()).ok().and_then(|d| d.as_f64()).map(|d| d as i32)
}

fn player_options(video_id: &str, events: &EventQueue) -> Result<Object, JsValue> {
    let vars = Object::new();
    for (key, value) in [
        ("autoplay", JsValue::from(0)),
        ("controls", JsValue::from(0)),
        ("disablekb", JsValue::from(1)),
        ("fs", JsValue::from(0)),
        ("loop", JsValue::from(1)),
        ("modestbranding", JsValue::from(1)),
        ("playlist", JsValue::from_str(video_id)),
    ] {
        Reflect::set(&vars, &key.into(), &value)?;
    }

    let handlers = Object::new();
    let queue = events.clone();
    let on_ready = Closure::wrap(Box::new(move |_: JsValue| {
        queue.borrow_mut().push_back(PlayerEvent::Ready);
    }) as Box<dyn FnMut(JsValue)>);
    let queue = events.clone();
    let on_state = Closure::wrap(Box::new(move |event: JsValue| {
        match event_code(&event).and_then(PlayerState::from_code) {
            Some(state) => queue.borrow_mut().push_back(PlayerEvent::StateChange(state)),
            None => log::debug!("unknown player state {:?}", event_code(&event)),
        }
    }) as Box<dyn FnMut(JsValue)>);
    let queue = events.clone();
    let on_error = Closure::wrap(Box::new(move |event: JsValue| {
        queue.borrow_mut().push_back(PlayerEvent::Error(event_code(&event).unwrap_or(-1)));
    }) as Box<dyn FnMut(JsValue)>);

    Reflect::set(&handlers, &"onReady".into(), on_ready.as_ref())?;
    Reflect::set(&handlers, &"onStateChange".into(), on_state.as_ref())?;
    Reflect::set(&handlers, &"onError".into(), on_error.as_ref())?;
    on_ready.forget();
    on_state.forget();
    on_error.forget();

    let options = Object::new();
    Reflect::set(&options, &"height".into(), &"100".into())?;
    Reflect::set(&options, &"width".into(), &"100".into())?;
    Reflect::set(&options, &"videoId".into(), &video_id.into())?;
    Reflect::set(&options, &"playerVars".into(), &vars)?;
    Reflect::set(&options, &"events".into(), &handlers)?;
    Ok(options)
}

impl Player for YouTubePlayer {
    fn play(&mut self) {
        self.call("playVideo", &[]);
    }

    fn pause(&mut self) {
        self.call("pauseVideo", &[]);
    }

    fn mute(&mut self) {
        self.call("mute", &[]);
    }

    fn unmute(&mut self) {
        self.call("unMute", &[]);
    }

    fn is_muted(&self) -> bool {
        self.call("isMuted", &[]).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    fn set_volume(&mut self, volume: u8) {
        self.call("setVolume", &[JsValue::from(volume)]);
    }

    fn volume(&self) -> u8 {
        self.number("getVolume").round().clamp(0.0, 100.0) as u8
    }

    fn duration(&self) -> f64 {
        self.number("getDuration")
    }

    fn current_time(&self) -> f64 {
        self.number("getCurrentTime")
    }

    fn state(&self) -> PlayerState {
        PlayerState::from_code(self.number("getPlayerState") as i32).unwrap_or(PlayerState::Unstarted)
    }

    fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.events.borrow_mut().drain(..).collect()
    }
}

type Engine = Rc<RefCell<Greeting<DomSurface, YouTubePlayer>>>;

fn with_engine(engine: &Engine, f: impl FnOnce(&mut Greeting<DomSurface, YouTubePlayer>)) {
    match engine.try_borrow_mut() {
        Ok(mut greeting) => f(&mut greeting),
        Err(_) => log::warn!("engine busy, dropping callback"),
    }
}

fn listen(
    target: &web_sys::EventTarget,
    kind: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Bind the page, embed the player and start the engine.
///
/// `config_toml` is optional `heartfelt.toml` text; defaults apply otherwise.
#[wasm_bindgen]
pub fn mount(config_toml: Option<String>) -> Result<(), JsValue> {
    let config = match config_toml {
        Some(text) => parse_config(&text).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => GreetingConfig::default(),
    };
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let surface = DomSurface::bind(window.clone()).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let player = YouTubePlayer::embed(&window, PLAYER_ELEMENT, &config.media.video_id)?;

    let engine: Engine = Rc::new(RefCell::new(Greeting::new(config, surface, player)));
    with_engine(&engine, |g| g.start());

    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    {
        let engine = engine.clone();
        listen(&document, "click", move |event| {
            let Some(element) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            with_engine(&engine, |g| {
                let (control, index) = g.surface().control_for(&element);
                g.dispatch(Event::click_nth(control, index));
            });
        })?;
    }
    {
        let engine = engine.clone();
        listen(&document, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            let mut chars = key.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                with_engine(&engine, |g| g.dispatch(Event::key(c)));
            }
        })?;
    }
    {
        let engine = engine.clone();
        listen(&document, "input", move |event| {
            let Some(slider) = event.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
                return;
            };
            if slider.id() == "volumeSlider" {
                with_engine(&engine, |g| g.dispatch(Event::slide(slider.value_as_number())));
            }
        })?;
    }
    {
        let engine = engine.clone();
        listen(&window, "scroll", move |_| with_engine(&engine, |g| g.dispatch(Event::scroll())))?;
    }

    let performance = window.performance().ok_or_else(|| JsValue::from_str("no performance"))?;
    let mut last = performance.now();
    let tick = Closure::wrap(Box::new(move || {
        let elapsed = (performance.now() - last).max(0.0).floor();
        last += elapsed;
        with_engine(&engine, |g| g.advance(elapsed as u64));
    }) as Box<dyn FnMut()>);
    window.set_interval_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), TICK_MS)?;
    tick.forget();

    log::info!("greeting mounted");
    Ok(())
}
