//! Browser event wiring
//!
//! One scroll listener, one debounced resize/orientation pair and one
//! `MutationObserver` per installed [`Listeners`]. Dropping it removes every
//! listener and disconnects the observer, so reinstalling never duplicates
//! handlers.

use js_sys::Array;
use mos_core::{ScrollAnimationSession, ScrollSchedule};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Event, EventTarget, MutationObserver, MutationObserverInit, MutationRecord, NodeList, Window,
};

use crate::dom::{WebDocument, WebElement};
use crate::error::{HostError, Result};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;
}

type Session = ScrollAnimationSession<WebDocument>;

/// An `addEventListener` registration, removed on drop
pub(crate) struct EventListener {
    target: EventTarget,
    event: String,
    closure: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new(
        target: &EventTarget,
        event: &str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|err| HostError::js(&err))?;
        Ok(Self {
            target: target.clone(),
            event: event.to_string(),
            closure,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(&self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Run `f` once after `delay_ms`
pub(crate) fn set_timeout(window: &Window, delay_ms: f64, f: impl FnOnce() + 'static) {
    let callback = Closure::once_into_js(f);
    let delay = delay_ms.ceil().clamp(0.0, f64::from(i32::MAX)) as i32;
    if let Err(err) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
    {
        tracing::warn!("setTimeout failed: {}", crate::error::describe(&err));
    }
}

fn on_scroll(window: &Window, session: &Session) {
    match session.handle_scroll(performance_now()) {
        Ok(ScrollSchedule::Deferred {
            fire_at_ms,
            needs_timer: true,
        }) => {
            let session = session.clone();
            set_timeout(window, fire_at_ms - performance_now() + 1.0, move || {
                if let Err(err) = session.flush_scroll(performance_now()) {
                    tracing::warn!("deferred scroll tick failed: {}", err);
                }
            });
        }
        Ok(_) => {}
        Err(err) => tracing::warn!("scroll handling failed: {}", err),
    }
}

fn on_resize(window: &Window, session: &Session) {
    let now = performance_now();
    let due = match session.handle_resize(now) {
        Ok(due) => due,
        Err(err) => {
            tracing::warn!("resize handling failed: {}", err);
            return;
        }
    };
    let session = session.clone();
    // One extra millisecond so the timer never lands just short of `due`
    set_timeout(window, due - now + 1.0, move || {
        if let Err(err) = session.flush_resize(performance_now()) {
            tracing::warn!("position recalculation failed: {}", err);
        }
    });
}

fn collect_elements(nodes: &NodeList, out: &mut Vec<WebElement>) {
    for i in 0..nodes.length() {
        if let Some(element) = nodes
            .item(i)
            .and_then(|node| node.dyn_into::<web_sys::Element>().ok())
        {
            out.push(WebElement(element));
        }
    }
}

/// Observer plus the closure it calls
struct MutationWatch {
    observer: MutationObserver,
    _closure: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl MutationWatch {
    fn new(
        document: &WebDocument,
        session: &Session,
        on_hard_refresh: impl Fn() + 'static,
    ) -> Result<Self> {
        let session = session.clone();
        let closure = Closure::wrap(Box::new(move |records: Array, _: MutationObserver| {
            let mut added = Vec::new();
            let mut removed = Vec::new();
            for record in records.iter() {
                let Ok(record) = record.dyn_into::<MutationRecord>() else {
                    continue;
                };
                collect_elements(&record.added_nodes(), &mut added);
                collect_elements(&record.removed_nodes(), &mut removed);
            }
            if added.is_empty() && removed.is_empty() {
                return;
            }
            match session.handle_mutations(&added, &removed) {
                Ok(true) => on_hard_refresh(),
                Ok(false) => {}
                Err(err) => tracing::warn!("mutation handling failed: {}", err),
            }
        }) as Box<dyn FnMut(Array, MutationObserver)>);

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|err| HostError::js(&err))?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(document.document(), &init)
            .map_err(|err| HostError::js(&err))?;

        Ok(Self {
            observer,
            _closure: closure,
        })
    }
}

impl Drop for MutationWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Every listener a running session needs
pub(crate) struct Listeners {
    _scroll: EventListener,
    _resize: EventListener,
    _orientation: EventListener,
    _mutations: Option<MutationWatch>,
}

impl Listeners {
    /// Install every listener; `on_hard_refresh` runs after a mutation batch
    /// rebuilt the registry
    pub fn install(
        document: &WebDocument,
        session: &Session,
        on_hard_refresh: impl Fn() + 'static,
    ) -> Result<Self> {
        let window = document.window().clone();
        let target: &EventTarget = window.as_ref();

        let scroll = {
            let (window, session) = (window.clone(), session.clone());
            EventListener::new(target, "scroll", move |_| on_scroll(&window, &session))?
        };
        let resize = {
            let (window, session) = (window.clone(), session.clone());
            EventListener::new(target, "resize", move |_| on_resize(&window, &session))?
        };
        let orientation = {
            let (window, session) = (window.clone(), session.clone());
            EventListener::new(target, "orientationchange", move |_| {
                on_resize(&window, &session)
            })?
        };
        let mutations = if session.config()?.disable_mutation_observer {
            None
        } else {
            Some(MutationWatch::new(document, session, on_hard_refresh)?)
        };

        tracing::debug!(
            "listeners installed (mutation observer: {})",
            mutations.is_some()
        );
        Ok(Self {
            _scroll: scroll,
            _resize: resize,
            _orientation: orientation,
            _mutations: mutations,
        })
    }
}
