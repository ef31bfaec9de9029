//! Animation controller
//!
//! Owns handle creation and drives the per-element lifecycle:
//!
//! ```text
//! Unarmed -> Armed -> PlayingForward -> CompletedForward -> Reversing -> Armed
//!                          ^                                    |
//!                          +------------ (interrupted) ---------+
//! ```
//!
//! Completion callbacks carry only the DOM node. They are routed back through
//! the session, which looks the entry up again; an entry that disappeared in
//! the meantime is ignored.

use std::rc::Rc;

use mos_animation::{presets, AnimationEngine, AnimationError, AnimationHandle};
use rustc_hash::FxHashMap;

use crate::config::{ElementConfig, GlobalConfig};
use crate::dom::DomElement;
use crate::error::{MosError, Result};
use crate::registry::{ElementRegistry, TrackedElement};

/// User-supplied handle factory, keyed by preset name
pub type AnimationFactory<E> =
    Box<dyn Fn(&E, &ElementConfig) -> mos_animation::Result<Box<dyn AnimationHandle>>>;

/// Which playback a completion belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Forward,
    Reverse,
}

/// Receives finished notifications, with the node they belong to
pub type CompletionRouter<E> = Rc<dyn Fn(E, Completion, mos_animation::Result<()>)>;

/// Class names written to tracked elements
#[derive(Clone, Debug)]
struct MarkerClasses {
    animated: String,
    use_class_names: bool,
}

pub struct AnimationController<E> {
    engine: Box<dyn AnimationEngine<E>>,
    factories: FxHashMap<String, AnimationFactory<E>>,
    classes: MarkerClasses,
}

impl<E: DomElement> AnimationController<E> {
    pub fn new(engine: Box<dyn AnimationEngine<E>>, config: &GlobalConfig) -> Self {
        Self {
            engine,
            factories: FxHashMap::default(),
            classes: MarkerClasses {
                animated: config.animated_class_name.clone(),
                use_class_names: config.use_class_names,
            },
        }
    }

    /// Switch marker classes, renaming them on entries that show them now
    pub fn set_classes(&mut self, config: &GlobalConfig, entries: &[TrackedElement<E>]) {
        let visible = || entries.iter().filter(|entry| entry.animated);
        for entry in visible() {
            self.remove_classes(entry);
        }
        self.classes = MarkerClasses {
            animated: config.animated_class_name.clone(),
            use_class_names: config.use_class_names,
        };
        for entry in visible() {
            self.add_classes(entry);
        }
    }

    /// Register a factory consulted before the built-in presets
    ///
    /// Registering the same name again replaces the previous factory. Entries
    /// that already own a handle keep it until the next hard refresh.
    pub fn register_factory(&mut self, name: &str, factory: AnimationFactory<E>) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MosError::EmptyFactoryName);
        }
        if self.factories.insert(name.to_string(), factory).is_some() {
            tracing::debug!("replaced animation factory `{}`", name);
        }
        Ok(())
    }

    /// Return the entry's handle, creating it on first use
    ///
    /// Construction failures are logged and yield `None`; callers treat that
    /// as a no-op.
    pub fn ensure_handle<'a>(
        &self,
        entry: &'a mut TrackedElement<E>,
    ) -> Option<&'a dyn AnimationHandle> {
        if entry.animation_handle.is_none() {
            match self.build_handle(&entry.element, &entry.config) {
                Ok(handle) => entry.animation_handle = Some(handle),
                Err(err) => {
                    tracing::warn!(
                        "could not create `{}` animation for {:?}: {}",
                        entry.config.preset,
                        entry.element,
                        err
                    );
                    return None;
                }
            }
        }
        entry.animation_handle.as_deref()
    }

    fn build_handle(
        &self,
        element: &E,
        config: &ElementConfig,
    ) -> mos_animation::Result<Box<dyn AnimationHandle>> {
        if let Some(factory) = self.factories.get(&config.preset) {
            tracing::trace!("using custom factory `{}` for {:?}", config.preset, element);
            return factory(element, config);
        }
        let keyframes = presets::resolve(&config.preset, config.distance);
        self.engine
            .animate(element, &keyframes, &config.animate_options())
    }

    /// Pause a fresh handle at its start state
    ///
    /// Entries already animated (playing, completed or reversing) are left
    /// alone; the following tick decides whether they should reverse.
    pub fn arm_initial(&self, entry: &mut TrackedElement<E>) -> Result<()> {
        if entry.animated || entry.reversing {
            return Ok(());
        }
        let Some(handle) = self.ensure_handle(entry) else {
            return Ok(());
        };
        handle.pause()?;
        entry.animated = false;
        entry.reversing = false;
        entry.forward_finished = false;
        Ok(())
    }

    /// Jump straight to the end state without a visible transition
    pub fn complete_instantly(&self, entry: &mut TrackedElement<E>) -> Result<()> {
        if entry.animated && !entry.reversing && entry.forward_finished {
            return Ok(());
        }
        let once = entry.config.once;
        let Some(handle) = self.ensure_handle(entry) else {
            return Ok(());
        };
        handle.set_speed(1.0)?;
        handle.complete()?;
        if once {
            handle.stop()?;
        }
        entry.animated = true;
        entry.reversing = false;
        entry.forward_finished = true;
        self.add_classes(entry);
        Ok(())
    }

    /// Start or resume the forward animation
    ///
    /// Idempotent while already playing forward or completed.
    pub fn play_forward(
        &self,
        entry: &mut TrackedElement<E>,
        router: &CompletionRouter<E>,
    ) -> Result<()> {
        if entry.has_handle() && entry.animated && !entry.reversing {
            return Ok(());
        }
        let element = entry.element.clone();
        let Some(handle) = self.ensure_handle(entry) else {
            return Ok(());
        };
        handle.set_speed(1.0)?;
        handle.play()?;
        notify_on_finish(handle, element, Completion::Forward, router);

        tracing::trace!("playing {:?} forward", entry.element);
        entry.animated = true;
        entry.reversing = false;
        entry.forward_finished = false;
        self.add_classes(entry);
        Ok(())
    }

    /// Run the animation backwards to its start
    ///
    /// No-op for once-only entries, entries never armed and entries not
    /// animated or already reversing.
    pub fn reverse(&self, entry: &mut TrackedElement<E>, router: &CompletionRouter<E>) -> Result<()> {
        if entry.config.once || !entry.animated || entry.reversing {
            return Ok(());
        }
        let Some(handle) = entry.handle() else {
            return Ok(());
        };
        handle.set_speed(-1.0)?;
        handle.play()?;
        notify_on_finish(handle, entry.element.clone(), Completion::Reverse, router);

        tracing::trace!("reversing {:?}", entry.element);
        entry.reversing = true;
        entry.forward_finished = false;
        Ok(())
    }

    /// Apply a finished notification to whatever entry now owns `element`
    pub fn handle_completion(
        &self,
        registry: &mut ElementRegistry<E>,
        element: &E,
        completion: Completion,
        result: mos_animation::Result<()>,
    ) {
        let Some(entry) = registry.find_by_element_mut(element) else {
            tracing::trace!("{:?} finished after leaving the registry", element);
            return;
        };

        let outcome = match (completion, result) {
            (Completion::Forward, Ok(())) => self.on_forward_finished(entry),
            (Completion::Reverse, Ok(())) => self.on_reverse_finished(entry),
            (Completion::Forward, Err(err)) => {
                tracing::debug!("forward animation of {:?} ended early: {}", element, err);
                Ok(())
            }
            (Completion::Reverse, Err(err)) => {
                if !matches!(err, AnimationError::Interrupted) {
                    tracing::warn!("reverse animation of {:?} failed: {}", element, err);
                }
                entry.reversing = false;
                Ok(())
            }
        };

        if let Err(err) = outcome {
            tracing::warn!("completion handling for {:?} failed: {}", element, err);
        }
    }

    fn on_forward_finished(&self, entry: &mut TrackedElement<E>) -> Result<()> {
        // Superseded by a reverse, or reset since
        if entry.reversing || !entry.animated {
            return Ok(());
        }
        entry.forward_finished = true;
        if entry.config.once {
            if let Some(handle) = entry.handle() {
                handle.stop()?;
            }
            tracing::trace!("{:?} finished once; stopped", entry.element);
        }
        Ok(())
    }

    fn on_reverse_finished(&self, entry: &mut TrackedElement<E>) -> Result<()> {
        // A forward play interrupted this reverse
        if !entry.reversing {
            return Ok(());
        }
        entry.animated = false;
        entry.reversing = false;
        entry.forward_finished = false;
        self.remove_classes(entry);
        if let Some(handle) = entry.handle() {
            handle.set_time(0.0)?;
            handle.pause()?;
        }
        Ok(())
    }

    fn add_classes(&self, entry: &TrackedElement<E>) {
        entry.element.add_class(&self.classes.animated);
        if self.classes.use_class_names {
            entry.element.add_class(&entry.config.preset);
        }
    }

    fn remove_classes(&self, entry: &TrackedElement<E>) {
        entry.element.remove_class(&self.classes.animated);
        if self.classes.use_class_names {
            entry.element.remove_class(&entry.config.preset);
        }
    }
}

fn notify_on_finish<E: DomElement>(
    handle: &dyn AnimationHandle,
    element: E,
    completion: Completion,
    router: &CompletionRouter<E>,
) {
    let router = Rc::clone(router);
    handle.on_finished(Box::new(move |result| router(element, completion, result)));
}
