//! In-memory DOM and a recording animation engine for unit tests

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use mos_animation::{
    AnimateOptions, AnimationEngine, AnimationHandle, AnimationScheduler, FinishCallback,
    KeyframeSpec, ScheduledAnimation, SchedulerEngine,
};
use rustc_hash::FxHashMap;

use crate::config::GlobalConfig;
use crate::dom::{Document, DomElement};
use crate::error::Result;
use crate::session::ScrollAnimationSession;

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// DOM
// ============================================================================

struct MockNode {
    id: u32,
    offset_top: Cell<f64>,
    offset_left: Cell<f64>,
    height: Cell<f64>,
    scroll_top: Cell<f64>,
    document_root: Cell<bool>,
    offset_parent: RefCell<Option<MockElement>>,
    attributes: RefCell<FxHashMap<String, String>>,
    classes: RefCell<Vec<String>>,
    children: RefCell<Vec<MockElement>>,
}

#[derive(Clone)]
pub(crate) struct MockElement(Rc<MockNode>);

impl MockElement {
    pub fn new() -> Self {
        Self(Rc::new(MockNode {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            offset_top: Cell::new(0.0),
            offset_left: Cell::new(0.0),
            height: Cell::new(0.0),
            scroll_top: Cell::new(0.0),
            document_root: Cell::new(false),
            offset_parent: RefCell::new(None),
            attributes: RefCell::new(FxHashMap::default()),
            classes: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    pub fn at(self, top: f64, height: f64) -> Self {
        self.0.offset_top.set(top);
        self.0.height.set(height);
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.0
            .attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_scroll(self, scroll_top: f64) -> Self {
        self.0.scroll_top.set(scroll_top);
        self
    }

    pub fn document_root(self) -> Self {
        self.0.document_root.set(true);
        self
    }

    pub fn set_top(&self, top: f64) {
        self.0.offset_top.set(top);
    }

    pub fn set_offset_parent(&self, parent: &MockElement) {
        *self.0.offset_parent.borrow_mut() = Some(parent.clone());
    }

    pub fn append_child(&self, child: &MockElement) {
        self.0.children.borrow_mut().push(child.clone());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.classes.borrow().iter().any(|c| c == class)
    }
}

impl fmt::Debug for MockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockElement(#{})", self.0.id)
    }
}

impl DomElement for MockElement {
    fn is_same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn offset_top(&self) -> f64 {
        self.0.offset_top.get()
    }

    fn offset_left(&self) -> f64 {
        self.0.offset_left.get()
    }

    fn offset_height(&self) -> f64 {
        self.0.height.get()
    }

    fn scroll_top(&self) -> f64 {
        self.0.scroll_top.get()
    }

    fn scroll_left(&self) -> f64 {
        0.0
    }

    fn offset_parent(&self) -> Option<Self> {
        self.0.offset_parent.borrow().clone()
    }

    fn is_document_root(&self) -> bool {
        self.0.document_root.get()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.0.classes.borrow_mut().push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.0.classes.borrow_mut().retain(|c| c != class);
    }

    fn has_descendant_with_attribute(&self, name: &str) -> bool {
        self.0
            .children
            .borrow()
            .iter()
            .any(|child| child.has_attribute(name) || child.has_descendant_with_attribute(name))
    }
}

struct MockPage {
    scroll_y: Cell<f64>,
    viewport_height: Cell<f64>,
    elements: RefCell<Vec<MockElement>>,
    selectors: RefCell<FxHashMap<String, MockElement>>,
}

#[derive(Clone)]
pub(crate) struct MockDocument(Rc<MockPage>);

impl MockDocument {
    pub fn new(viewport_height: f64) -> Self {
        Self(Rc::new(MockPage {
            scroll_y: Cell::new(0.0),
            viewport_height: Cell::new(viewport_height),
            elements: RefCell::new(Vec::new()),
            selectors: RefCell::new(FxHashMap::default()),
        }))
    }

    /// Append an element to the page, returning a handle to it
    pub fn add(&self, element: MockElement) -> MockElement {
        self.0.elements.borrow_mut().push(element.clone());
        element
    }

    pub fn register_selector(&self, selector: &str, element: &MockElement) {
        self.0
            .selectors
            .borrow_mut()
            .insert(selector.to_string(), element.clone());
    }

    pub fn set_scroll_y(&self, y: f64) {
        self.0.scroll_y.set(y);
    }
}

impl Document for MockDocument {
    type Element = MockElement;

    fn scroll_y(&self) -> f64 {
        self.0.scroll_y.get()
    }

    fn viewport_height(&self) -> f64 {
        self.0.viewport_height.get()
    }

    fn query_selector(&self, selector: &str) -> Option<MockElement> {
        self.0.selectors.borrow().get(selector).cloned()
    }

    fn elements_with_attribute(&self, name: &str) -> Vec<MockElement> {
        self.0
            .elements
            .borrow()
            .iter()
            .filter(|el| el.has_attribute(name))
            .cloned()
            .collect()
    }
}

// ============================================================================
// Recording engine
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum HandleCall {
    Play { speed: f64 },
    Pause,
    Stop,
    Complete,
    SetSpeed(f64),
    SetTime(f64),
}

/// Shared log of every handle created and every call made on them
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    calls: Rc<RefCell<Vec<HandleCall>>>,
    created: Rc<Cell<usize>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(&self, scheduler: &AnimationScheduler) -> RecordingEngine {
        RecordingEngine {
            inner: scheduler.engine(),
            recorder: self.clone(),
        }
    }

    pub fn calls(&self) -> Vec<HandleCall> {
        self.calls.borrow().clone()
    }

    pub fn created(&self) -> usize {
        self.created.get()
    }

    pub fn forward_plays(&self) -> usize {
        self.count(|c| matches!(c, HandleCall::Play { speed } if *speed > 0.0))
    }

    pub fn reverse_plays(&self) -> usize {
        self.count(|c| matches!(c, HandleCall::Play { speed } if *speed < 0.0))
    }

    pub fn completes(&self) -> usize {
        self.count(|c| matches!(c, HandleCall::Complete))
    }

    fn count(&self, f: impl Fn(&HandleCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| f(c)).count()
    }

    fn log(&self, call: HandleCall) {
        self.calls.borrow_mut().push(call);
    }
}

pub(crate) struct RecordingEngine {
    inner: SchedulerEngine,
    recorder: Recorder,
}

impl<T> AnimationEngine<T> for RecordingEngine {
    fn animate(
        &self,
        _target: &T,
        keyframes: &KeyframeSpec,
        options: &AnimateOptions,
    ) -> mos_animation::Result<Box<dyn AnimationHandle>> {
        let inner = self.inner.create(keyframes, options)?;
        self.recorder.created.set(self.recorder.created.get() + 1);
        Ok(Box::new(RecordingHandle {
            inner,
            recorder: self.recorder.clone(),
        }))
    }
}

struct RecordingHandle {
    inner: ScheduledAnimation,
    recorder: Recorder,
}

impl AnimationHandle for RecordingHandle {
    fn play(&self) -> mos_animation::Result<()> {
        self.recorder.log(HandleCall::Play {
            speed: self.inner.speed(),
        });
        self.inner.play()
    }

    fn pause(&self) -> mos_animation::Result<()> {
        self.recorder.log(HandleCall::Pause);
        self.inner.pause()
    }

    fn stop(&self) -> mos_animation::Result<()> {
        self.recorder.log(HandleCall::Stop);
        self.inner.stop()
    }

    fn complete(&self) -> mos_animation::Result<()> {
        self.recorder.log(HandleCall::Complete);
        self.inner.complete()
    }

    fn speed(&self) -> f64 {
        self.inner.speed()
    }

    fn set_speed(&self, speed: f64) -> mos_animation::Result<()> {
        self.recorder.log(HandleCall::SetSpeed(speed));
        self.inner.set_speed(speed)
    }

    fn time(&self) -> f64 {
        self.inner.time()
    }

    fn set_time(&self, seconds: f64) -> mos_animation::Result<()> {
        self.recorder.log(HandleCall::SetTime(seconds));
        self.inner.set_time(seconds)
    }

    fn on_finished(&self, callback: FinishCallback) {
        self.inner.on_finished(callback);
    }
}

// ============================================================================
// Session harness
// ============================================================================

/// A session over a mock page with an 800px viewport
pub(crate) struct Harness {
    pub scheduler: AnimationScheduler,
    pub recorder: Recorder,
    pub document: MockDocument,
    pub session: ScrollAnimationSession<MockDocument>,
}

impl Harness {
    pub fn new(config: GlobalConfig) -> Self {
        match Self::try_new(config) {
            Ok(harness) => harness,
            Err(err) => panic!("invalid test config: {err}"),
        }
    }

    pub fn try_new(config: GlobalConfig) -> Result<Self> {
        let scheduler = AnimationScheduler::new();
        let recorder = Recorder::new();
        let document = MockDocument::new(800.0);
        let session =
            ScrollAnimationSession::new(document.clone(), recorder.engine(&scheduler), config)?;

        Ok(Self {
            scheduler,
            recorder,
            document,
            session,
        })
    }

    pub fn add_tracked(&self, preset: &str, top: f64, height: f64) -> MockElement {
        self.document.add(
            MockElement::new()
                .with_attr("data-mos", preset)
                .at(top, height),
        )
    }

    pub fn scroll_to(&self, y: f64) {
        self.document.set_scroll_y(y);
        self.session
            .on_scroll_tick()
            .expect("session busy during scroll");
    }

    /// Run every playing animation to its end and deliver notifications
    pub fn settle(&self) {
        self.scheduler.tick(60_000.0);
        self.scheduler.flush();
    }
}
