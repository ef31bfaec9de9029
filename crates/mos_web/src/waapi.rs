//! Web Animations API engine
//!
//! [`WaapiEngine`] turns keyframe specs into `element.animate(...)` calls and
//! wraps the returned `Animation`. Custom factories registered from
//! JavaScript may return either an `Animation` or any object shaped like the
//! handle contract (`play`, `pause`, `stop`, `complete`, `speed`, `time`,
//! `finished`), which [`JsControlsHandle`] drives through reflection.

use std::cell::Cell;

use js_sys::{Array, Function, Object, Promise, Reflect};
use mos_animation::{
    AnimateOptions, AnimationEngine, AnimationError, AnimationHandle, FinishCallback, KeyframeSpec,
    Result,
};
use mos_core::{AnimationFactory, ElementConfig};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::Animation;

use crate::dom::WebElement;
use crate::error::describe;

fn engine_error(value: JsValue) -> AnimationError {
    let name = Reflect::get(&value, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string());
    // `cancel()` rejects the finished promise with an AbortError
    if name.as_deref() == Some("AbortError") {
        AnimationError::Interrupted
    } else {
        AnimationError::Engine(describe(&value))
    }
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(drop)
        .map_err(engine_error)
}

/// `[{offset, opacity?, transform?}, ...]` for `element.animate`
pub(crate) fn keyframes_to_js(spec: &KeyframeSpec) -> Result<Array> {
    let frames = Array::new();
    for frame in spec.css_frames() {
        let object = Object::new();
        set(&object, "offset", &JsValue::from(frame.offset))?;
        if let Some(opacity) = &frame.opacity {
            set(&object, "opacity", &JsValue::from_str(opacity))?;
        }
        if let Some(transform) = &frame.transform {
            set(&object, "transform", &JsValue::from_str(transform))?;
        }
        frames.push(&object);
    }
    Ok(frames)
}

/// Timing dictionary; the Web Animations API takes milliseconds
pub(crate) fn options_to_js(options: &AnimateOptions) -> Result<Object> {
    let object = Object::new();
    set(&object, "duration", &JsValue::from(options.duration * 1000.0))?;
    set(&object, "delay", &JsValue::from(options.delay * 1000.0))?;
    set(&object, "easing", &JsValue::from_str(&options.easing.to_css()))?;
    set(&object, "fill", &JsValue::from_str(options.fill.as_css()))?;
    Ok(object)
}

/// The element config as seen by JavaScript factories, times in seconds
pub(crate) fn config_to_js(config: &ElementConfig) -> Result<Object> {
    let object = Object::new();
    set(&object, "preset", &JsValue::from_str(&config.preset))?;
    set(&object, "offset", &JsValue::from(config.offset))?;
    set(
        &object,
        "duration",
        &JsValue::from(config.time_unit.to_seconds(config.duration)),
    )?;
    set(
        &object,
        "delay",
        &JsValue::from(config.time_unit.to_seconds(config.delay)),
    )?;
    set(&object, "easing", &JsValue::from_str(&config.easing.to_css()))?;
    set(&object, "distance", &JsValue::from(config.distance))?;
    set(&object, "once", &JsValue::from_bool(config.once))?;
    set(&object, "mirror", &JsValue::from_bool(config.mirror))?;
    if let Some(id) = &config.id {
        set(&object, "id", &JsValue::from_str(id))?;
    }
    Ok(object)
}

/// Deliver a promise outcome on a later microtask
fn settle_later(promise: Promise, callback: FinishCallback) {
    spawn_local(async move {
        let result = JsFuture::from(promise)
            .await
            .map(drop)
            .map_err(engine_error);
        callback(result);
    });
}

fn reject_later(callback: FinishCallback, error: AnimationError) {
    spawn_local(async move { callback(Err(error)) });
}

// ============================================================================
// Engine
// ============================================================================

/// [`AnimationEngine`] backed by `Element.animate`
#[derive(Clone, Copy, Debug, Default)]
pub struct WaapiEngine;

impl AnimationEngine<WebElement> for WaapiEngine {
    fn animate(
        &self,
        target: &WebElement,
        keyframes: &KeyframeSpec,
        options: &AnimateOptions,
    ) -> Result<Box<dyn AnimationHandle>> {
        keyframes.validate()?;
        let element: &web_sys::Element = &target.0;

        let animate: Function = Reflect::get(element, &JsValue::from_str("animate"))
            .map_err(engine_error)?
            .dyn_into()
            .map_err(|_| AnimationError::Engine("Element.animate is not supported".into()))?;
        let js_keyframes: Array = keyframes_to_js(keyframes)?;
        let js_options: Object = options_to_js(options)?;
        let animation: Animation = animate
            .call2(element, &js_keyframes, &js_options)
            .map_err(engine_error)?
            .dyn_into()
            .map_err(|_| AnimationError::Engine("animate() did not return an Animation".into()))?;

        // `animate()` starts playing immediately; hold the first frame
        animation.pause().map_err(engine_error)?;
        Ok(Box::new(WaapiHandle::new(animation)))
    }
}

/// Handle over a native `Animation`
///
/// Dropping it cancels the animation, which removes its effect and rejects
/// the pending finished promise.
pub struct WaapiHandle {
    animation: Animation,
    stopped: Cell<bool>,
}

impl WaapiHandle {
    pub fn new(animation: Animation) -> Self {
        Self {
            animation,
            stopped: Cell::new(false),
        }
    }
}

impl AnimationHandle for WaapiHandle {
    fn play(&self) -> Result<()> {
        if self.stopped.get() {
            return Ok(());
        }
        self.animation.play().map_err(engine_error)
    }

    fn pause(&self) -> Result<()> {
        self.animation.pause().map_err(engine_error)
    }

    fn stop(&self) -> Result<()> {
        self.stopped.set(true);
        self.animation.pause().map_err(engine_error)
    }

    fn complete(&self) -> Result<()> {
        self.animation.finish().map_err(engine_error)
    }

    fn speed(&self) -> f64 {
        self.animation.playback_rate()
    }

    fn set_speed(&self, speed: f64) -> Result<()> {
        self.animation.set_playback_rate(speed);
        Ok(())
    }

    fn time(&self) -> f64 {
        self.animation.current_time().unwrap_or(0.0) / 1000.0
    }

    fn set_time(&self, seconds: f64) -> Result<()> {
        self.animation.set_current_time(Some(seconds * 1000.0));
        Ok(())
    }

    fn on_finished(&self, callback: FinishCallback) {
        match self.animation.finished() {
            Ok(promise) => settle_later(promise, callback),
            Err(err) => reject_later(callback, engine_error(err)),
        }
    }
}

impl Drop for WaapiHandle {
    fn drop(&mut self) {
        self.animation.cancel();
    }
}

// ============================================================================
// JavaScript controls
// ============================================================================

/// Handle over a controls object returned by a JavaScript factory
pub struct JsControlsHandle {
    controls: Object,
    stopped: Cell<bool>,
}

impl JsControlsHandle {
    pub fn new(controls: Object) -> Self {
        Self {
            controls,
            stopped: Cell::new(false),
        }
    }

    fn get(&self, key: &str) -> Result<JsValue> {
        Reflect::get(&self.controls, &JsValue::from_str(key)).map_err(engine_error)
    }

    fn call(&self, method: &str) -> Result<()> {
        let function: Function = self
            .get(method)?
            .dyn_into()
            .map_err(|_| AnimationError::Engine(format!("controls.{method} is not a function")))?;
        function.call0(&self.controls).map(drop).map_err(engine_error)
    }

    fn number(&self, key: &str, fallback: f64) -> f64 {
        self.get(key)
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(fallback)
    }
}

impl AnimationHandle for JsControlsHandle {
    fn play(&self) -> Result<()> {
        if self.stopped.get() {
            return Ok(());
        }
        self.call("play")
    }

    fn pause(&self) -> Result<()> {
        self.call("pause")
    }

    fn stop(&self) -> Result<()> {
        self.stopped.set(true);
        self.call("stop")
    }

    fn complete(&self) -> Result<()> {
        self.call("complete")
    }

    fn speed(&self) -> f64 {
        self.number("speed", 1.0)
    }

    fn set_speed(&self, speed: f64) -> Result<()> {
        set(&self.controls, "speed", &JsValue::from(speed))
    }

    fn time(&self) -> f64 {
        self.number("time", 0.0)
    }

    fn set_time(&self, seconds: f64) -> Result<()> {
        set(&self.controls, "time", &JsValue::from(seconds))
    }

    fn on_finished(&self, callback: FinishCallback) {
        match self.get("finished").map(|value| value.dyn_into::<Promise>()) {
            Ok(Ok(promise)) => settle_later(promise, callback),
            Ok(Err(_)) => reject_later(
                callback,
                AnimationError::Engine("controls.finished is not a promise".into()),
            ),
            Err(err) => reject_later(callback, err),
        }
    }
}

/// Wrap a JavaScript `(element, config) => handle` function
pub fn js_factory(factory: Function) -> AnimationFactory<WebElement> {
    Box::new(move |element: &WebElement, config: &ElementConfig| {
        let target: &web_sys::Element = &element.0;
        let js_config: Object = config_to_js(config)?;
        let value = factory
            .call2(&JsValue::NULL, target, &js_config)
            .map_err(engine_error)?;
        handle_from_js(value)
    })
}

fn handle_from_js(value: JsValue) -> Result<Box<dyn AnimationHandle>> {
    if value.is_instance_of::<Animation>() {
        return Ok(Box::new(WaapiHandle::new(value.unchecked_into())));
    }
    match value.dyn_into::<Object>() {
        Ok(controls) => Ok(Box::new(JsControlsHandle::new(controls))),
        Err(_) => Err(AnimationError::Engine(
            "animation factory must return an object".into(),
        )),
    }
}
