//! MOS Web
//!
//! Browser host for the scroll trigger engine. Exposes a `Mos` class to
//! JavaScript that reads elements through `web-sys`, animates them with the
//! Web Animations API and keeps the session in step with scroll, resize and
//! DOM mutations.
//!
//! ```js
//! import init, { Mos } from "./mos_web.js";
//!
//! await init();
//! const mos = new Mos({ offset: 200, once: true });
//! mos.init();
//! ```

pub mod dom;
pub mod error;
mod listeners;
pub mod waapi;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use mos_core::{GlobalConfig, ScrollAnimationSession, ScrollDirection};
use wasm_bindgen::prelude::*;
use web_sys::EventTarget;

pub use dom::{WebDocument, WebElement};
pub use error::{HostError, Result};
pub use waapi::{js_factory, JsControlsHandle, WaapiEngine, WaapiHandle};

use listeners::{EventListener, Listeners};

/// Whether the configured start event has already fired for `ready_state`
fn starts_immediately(start_event: &str, ready_state: &str) -> bool {
    match start_event {
        "DOMContentLoaded" => ready_state != "loading",
        "load" => ready_state == "complete",
        _ => false,
    }
}

/// Options given as a JSON string, or none for the defaults
fn parse_options_json(json: Option<&str>) -> Result<GlobalConfig> {
    match json {
        None => Ok(GlobalConfig::default()),
        Some(json) => Ok(GlobalConfig::from_json(json)?),
    }
}

fn parse_options(options: &JsValue) -> Result<GlobalConfig> {
    if options.is_undefined() || options.is_null() {
        return parse_options_json(None);
    }
    if let Some(json) = options.as_string() {
        return parse_options_json(Some(&json));
    }
    if !options.is_object() {
        return Err(HostError::InvalidOptions(
            "expected an object or a JSON string".into(),
        ));
    }
    let json: String = js_sys::JSON::stringify(options)
        .map_err(|err| HostError::js(&err))?
        .into();
    parse_options_json(Some(&json))
}

fn direction_name(direction: ScrollDirection) -> &'static str {
    match direction {
        ScrollDirection::Up => "up",
        ScrollDirection::Down => "down",
        ScrollDirection::None => "none",
    }
}

struct Host {
    document: WebDocument,
    session: ScrollAnimationSession<WebDocument>,
    listeners: RefCell<Option<Listeners>>,
    /// Start-event and window `load` listeners
    startup: RefCell<Vec<EventListener>>,
}

impl Host {
    fn start(self: &Rc<Self>) -> Result<()> {
        let count = self.session.init()?;
        self.install_listeners()?;
        tracing::debug!("Mos: started with {} elements", count);
        Ok(())
    }

    fn initialized(&self) -> Result<bool> {
        Ok(self.session.is_initialized()?)
    }

    /// Drop the current listeners and install fresh ones for the live config
    fn install_listeners(self: &Rc<Self>) -> Result<()> {
        drop(self.listeners.borrow_mut().take());
        if !self.initialized()? || self.session.config()?.disable {
            return Ok(());
        }

        // The mutation observer triggers hard refreshes itself; its closure
        // is still running then, so the reinstall waits for a timer
        let weak: Weak<Host> = Rc::downgrade(self);
        let window = self.document.window().clone();
        let reinstall = move || {
            let weak = weak.clone();
            listeners::set_timeout(&window, 0.0, move || {
                let Some(host) = weak.upgrade() else {
                    return;
                };
                if let Err(err) = host.install_listeners() {
                    tracing::warn!("Mos: reinstalling listeners failed: {}", err);
                }
            });
        };

        let listeners = Listeners::install(&self.document, &self.session, reinstall)?;
        *self.listeners.borrow_mut() = Some(listeners);
        Ok(())
    }

    fn teardown(&self) {
        self.startup.borrow_mut().clear();
        drop(self.listeners.borrow_mut().take());
    }
}

/// Scroll-triggered animations for the current page
#[wasm_bindgen]
pub struct Mos {
    host: Rc<Host>,
}

#[wasm_bindgen]
impl Mos {
    /// Create an instance from an options object, a JSON string or nothing
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> std::result::Result<Mos, JsValue> {
        let config = parse_options(&options)?;
        let document = WebDocument::from_window()?;
        let session = ScrollAnimationSession::new(document.clone(), WaapiEngine, config)
            .map_err(HostError::from)?;

        Ok(Mos {
            host: Rc::new(Host {
                document,
                session,
                listeners: RefCell::new(None),
                startup: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Start now, or once the configured start event fires
    pub fn init(&self) -> std::result::Result<(), JsValue> {
        let host = &self.host;
        if host.initialized()? {
            return self.refresh_hard();
        }

        let config = host.session.config().map_err(HostError::from)?;
        if config.disable {
            tracing::debug!("Mos: disabled");
            return Ok(());
        }

        let mut startup = host.startup.borrow_mut();
        startup.clear();

        // Late images and fonts move elements after the first layout
        let window_target: &EventTarget = host.document.window().as_ref();
        let weak: Weak<Host> = Rc::downgrade(host);
        startup.push(EventListener::new(window_target, "load", move |_| {
            let Some(host) = weak.upgrade() else {
                return;
            };
            if matches!(host.session.is_initialized(), Ok(true)) {
                if let Err(err) = host.session.recalculate_positions() {
                    tracing::warn!("Mos: recalculation on load failed: {}", err);
                }
            }
        })?);

        let ready_state = host.document.document().ready_state();
        if starts_immediately(&config.start_event, &ready_state) {
            drop(startup);
            host.start()?;
            return Ok(());
        }

        let target: &EventTarget = if config.start_event == "load" {
            window_target
        } else {
            host.document.document().as_ref()
        };
        let weak: Weak<Host> = Rc::downgrade(host);
        startup.push(EventListener::new(target, &config.start_event, move |_| {
            let Some(host) = weak.upgrade() else {
                return;
            };
            if !matches!(host.session.is_initialized(), Ok(false)) {
                return;
            }
            if let Err(err) = host.start() {
                tracing::warn!("Mos: start failed: {}", err);
            }
        })?);
        tracing::debug!("Mos: waiting for {:?}", config.start_event);
        Ok(())
    }

    /// Recalculate positions and re-evaluate every tracked element
    pub fn refresh(&self) -> std::result::Result<(), JsValue> {
        if !self.host.initialized()? {
            self.host.start()?;
            return Ok(());
        }
        self.host.session.refresh().map_err(HostError::from)?;
        Ok(())
    }

    /// Rescan the document for `data-mos` elements and rebuild every entry
    #[wasm_bindgen(js_name = refreshHard)]
    pub fn refresh_hard(&self) -> std::result::Result<(), JsValue> {
        if !self.host.initialized()? {
            self.host.start()?;
            return Ok(());
        }
        self.host.session.refresh_hard().map_err(HostError::from)?;
        self.host.install_listeners()?;
        Ok(())
    }

    /// Use `factory(element, config)` for elements whose preset is `name`
    #[wasm_bindgen(js_name = registerAnimation)]
    pub fn register_animation(
        &self,
        name: &str,
        factory: Function,
    ) -> std::result::Result<(), JsValue> {
        self.host
            .session
            .register_animation_factory(name, js_factory(factory))
            .map_err(HostError::from)?;
        Ok(())
    }

    /// Replace the options; listeners are reinstalled when their settings change
    #[wasm_bindgen(js_name = updateConfig)]
    pub fn update_config(&self, options: JsValue) -> std::result::Result<(), JsValue> {
        let config = parse_options(&options)?;
        let changes = self
            .host
            .session
            .update_config(config)
            .map_err(HostError::from)?;
        if changes.any() && self.host.initialized()? {
            self.host.install_listeners()?;
        }
        Ok(())
    }

    /// Remove every listener and animation; `init` may be called again
    pub fn destroy(&self) -> std::result::Result<(), JsValue> {
        // Fails while the session is busy, before any listener is dropped
        self.host.session.destroy().map_err(HostError::from)?;
        self.host.teardown();
        Ok(())
    }

    #[wasm_bindgen(js_name = preparedCount)]
    pub fn prepared_count(&self) -> std::result::Result<usize, JsValue> {
        Ok(self
            .host
            .session
            .prepared_count()
            .map_err(HostError::from)?)
    }

    /// `"up"`, `"down"` or `"none"`
    #[wasm_bindgen(js_name = scrollDirection)]
    pub fn scroll_direction(&self) -> std::result::Result<String, JsValue> {
        let direction = self
            .host
            .session
            .scroll_direction()
            .map_err(HostError::from)?;
        Ok(direction_name(direction).to_string())
    }
}
