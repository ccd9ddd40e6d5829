use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use web_sys::{HtmlElement, MouseEvent};

use crate::config::EngineConfig;
use crate::doc::{Crop, DocError, ImageStyle, Layer, LayerId, LayerStore, TextStyle};
use crate::dom::{self, DomSurface, GestureListeners, PointerListeners};
use crate::gate::RenderGate;
use crate::geom::Point;
use crate::hit::Hit;
use crate::input::{Button, Controller, InputState, UiState};
use crate::render::{self, Scene};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions emitted for the host's layer store to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    PositionChanged { id: LayerId, position: Point },
    CropChanged { id: LayerId, crop: Crop },
    SelectionChanged { id: Option<LayerId> },
    /// The host typically reopens its upload flow.
    EmptyCanvasClicked,
}

/// Core engine state: all logic that doesn't depend on the DOM.
///
/// Separated from `Engine` so it can be tested without WASM/browser
/// dependencies. Actions produced by input handlers are applied to `doc`
/// before being returned, so the core doubles as the host's layer store.
pub struct EngineCore {
    pub doc: LayerStore,
    pub ui: UiState,
    pub config: EngineConfig,
    controller: Controller,
    gate: RenderGate,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            doc: LayerStore::with_max_scale(config.max_scale),
            ui: UiState::default(),
            config,
            controller: Controller::new(),
            gate: RenderGate::new(),
        }
    }

    // --- Data inputs ---

    /// Append a layer created by the host (upload, template pick).
    ///
    /// # Errors
    ///
    /// [`DocError::Duplicate`] if a layer with the same id exists.
    pub fn add_layer(&mut self, layer: impl Into<Layer>) -> Result<LayerId, DocError> {
        self.doc.push(layer)
    }

    /// Delete a layer. Clears the selection and crop mode if it was selected.
    ///
    /// A gesture on the layer is aborted on its next pointer event.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] if no layer has this id.
    pub fn remove_layer(&mut self, id: &LayerId) -> Result<Layer, DocError> {
        let was_selected = self.doc.is_selected(id);
        let layer = self.doc.remove(id)?;
        if was_selected {
            self.ui.crop_mode = false;
        }
        Ok(layer)
    }

    /// Apply a style-panel edit to an image layer.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] or [`DocError::KindMismatch`].
    pub fn set_image_style(&mut self, id: &LayerId, style: ImageStyle) -> Result<(), DocError> {
        self.doc.replace_image_style(id, style)?;
        Ok(())
    }

    /// Apply a style-panel edit to a text layer.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] or [`DocError::KindMismatch`].
    pub fn set_text_style(&mut self, id: &LayerId, style: TextStyle) -> Result<(), DocError> {
        self.doc.replace_text_style(id, style)?;
        Ok(())
    }

    /// Replace a text layer's content.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] or [`DocError::KindMismatch`].
    pub fn set_text(&mut self, id: &LayerId, content: impl Into<String>) -> Result<(), DocError> {
        self.doc.set_content(id, content)
    }

    /// Select a layer (or clear with `None`) from outside the canvas.
    ///
    /// Changing the selection leaves crop mode.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] if `id` does not name a layer.
    pub fn select(&mut self, id: Option<LayerId>) -> Result<(), DocError> {
        if self.doc.selected() == id {
            return Ok(());
        }
        self.doc.select(id)?;
        if self.ui.crop_mode {
            self.ui.crop_mode = false;
            tracing::debug!("crop mode left on selection change");
        }
        tracing::debug!(?id, "selection changed");
        Ok(())
    }

    /// Enter or leave crop mode. Returns the resulting mode.
    ///
    /// Crop mode needs a selected image layer; without one the request is
    /// ignored. Leaving crop mode abandons an in-flight crop gesture.
    pub fn set_crop_mode(&mut self, enabled: bool) -> bool {
        if enabled {
            let image_selected = self.doc.selected().is_some_and(|id| self.doc.get_image(&id).is_ok());
            if !image_selected {
                tracing::debug!("crop mode needs a selected image");
                return self.ui.crop_mode;
            }
        } else if matches!(self.controller.state(), InputState::Cropping { .. }) {
            self.controller.cancel();
        }
        self.ui.crop_mode = enabled;
        enabled
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, hit: Option<Hit>, pt: Point, button: Button) -> Vec<Action> {
        let actions = self.controller.pointer_down(&self.doc, self.ui, hit, pt, button);
        self.apply_all(&actions);
        actions
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        let actions = self.controller.pointer_move(&self.doc, pt);
        self.apply_all(&actions);
        actions
    }

    pub fn on_pointer_up(&mut self, pt: Point) -> Vec<Action> {
        let actions = self.controller.pointer_up(&self.doc, pt);
        self.apply_all(&actions);
        actions
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let actions = self.controller.pointer_leave(&self.doc);
        self.apply_all(&actions);
        actions
    }

    /// Drop the active gesture without emitting anything.
    pub fn cancel_gesture(&mut self) -> bool {
        self.controller.cancel()
    }

    /// Apply one action to the layer store.
    pub fn apply(&mut self, action: &Action) {
        let result = match action {
            Action::PositionChanged { id, position } => self.doc.set_position(id, *position),
            Action::CropChanged { id, crop } => self.doc.set_crop(id, *crop).map(|_| ()),
            Action::SelectionChanged { id } => self.select(*id),
            Action::EmptyCanvasClicked => Ok(()),
        };
        if let Err(err) = result {
            tracing::warn!(%err, ?action, "action not applied");
        }
    }

    fn apply_all(&mut self, actions: &[Action]) {
        for action in actions {
            self.apply(action);
        }
    }

    // --- Render ---

    /// Build this frame's scene, consulting the render gate.
    pub fn render(&mut self) -> Scene {
        render::render(&self.doc, self.ui, self.controller.dragging(), &self.config.canvas, &mut self.gate)
    }

    /// Forget every gate key so the next [`render`](Self::render) redraws all
    /// live layers.
    pub fn invalidate_render(&mut self) {
        self.gate.invalidate_all();
        tracing::debug!("render gate invalidated");
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<LayerId> {
        self.doc.selected()
    }

    #[must_use]
    pub fn crop_mode(&self) -> bool {
        self.ui.crop_mode
    }

    #[must_use]
    pub fn input_state(&self) -> &InputState {
        self.controller.state()
    }

    /// Look up a layer by id.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] if no layer has this id.
    pub fn layer(&self, id: &LayerId) -> Result<&Layer, DocError> {
        self.doc.get(id)
    }
}

// =============================================================
// Browser engine
// =============================================================

type Sink = Box<dyn FnMut(&Action)>;

struct Shared {
    this: Weak<RefCell<Shared>>,
    core: EngineCore,
    surface: DomSurface,
    sink: Sink,
    gesture: Option<GestureListeners>,
}

/// The full engine. Wraps `EngineCore`, paints into a container element and
/// wires pointer events.
///
/// Emitted actions are applied to the core and then passed to `sink`, which
/// runs while the engine is borrowed and must not call back into it. The
/// layer-editing methods mirror `EngineCore` and repaint afterwards; their
/// errors are the core's [`DocError`]s.
pub struct Engine {
    shared: Rc<RefCell<Shared>>,
    _pointer: PointerListeners,
}

impl Engine {
    /// Mount the engine inside `container`.
    ///
    /// # Errors
    ///
    /// Returns the DOM exception if the canvas element cannot be created or
    /// listeners cannot be attached.
    pub fn mount(
        container: HtmlElement,
        config: EngineConfig,
        sink: impl FnMut(&Action) + 'static,
    ) -> Result<Self, JsValue> {
        let surface = DomSurface::new(container)?;
        let shared = Rc::new_cyclic(|this| {
            RefCell::new(Shared {
                this: this.clone(),
                core: EngineCore::with_config(config),
                surface,
                sink: Box::new(sink),
                gesture: None,
            })
        });

        let down = Rc::downgrade(&shared);
        let leave = Rc::downgrade(&shared);
        let pointer = PointerListeners::attach(
            shared.borrow().surface.canvas(),
            move |event: MouseEvent| with_shared(&down, |s| s.pointer_down(&event)),
            move |_event: MouseEvent| with_shared(&leave, Shared::pointer_leave),
        )?;
        let engine = Self { shared, _pointer: pointer };
        engine.paint();
        Ok(engine)
    }

    /// # Errors
    ///
    /// See [`EngineCore::add_layer`].
    pub fn add_layer(&self, layer: impl Into<Layer>) -> Result<LayerId, DocError> {
        let id = self.shared.borrow_mut().core.add_layer(layer)?;
        self.paint();
        Ok(id)
    }

    /// # Errors
    ///
    /// See [`EngineCore::remove_layer`].
    pub fn remove_layer(&self, id: &LayerId) -> Result<Layer, DocError> {
        let layer = self.shared.borrow_mut().core.remove_layer(id)?;
        self.paint();
        Ok(layer)
    }

    /// # Errors
    ///
    /// See [`EngineCore::set_image_style`].
    pub fn set_image_style(&self, id: &LayerId, style: ImageStyle) -> Result<(), DocError> {
        self.shared.borrow_mut().core.set_image_style(id, style)?;
        self.paint();
        Ok(())
    }

    /// # Errors
    ///
    /// See [`EngineCore::set_text_style`].
    pub fn set_text_style(&self, id: &LayerId, style: TextStyle) -> Result<(), DocError> {
        self.shared.borrow_mut().core.set_text_style(id, style)?;
        self.paint();
        Ok(())
    }

    /// # Errors
    ///
    /// See [`EngineCore::set_text`].
    pub fn set_text(&self, id: &LayerId, content: impl Into<String>) -> Result<(), DocError> {
        self.shared.borrow_mut().core.set_text(id, content)?;
        self.paint();
        Ok(())
    }

    /// # Errors
    ///
    /// See [`EngineCore::select`].
    pub fn select(&self, id: Option<LayerId>) -> Result<(), DocError> {
        self.shared.borrow_mut().core.select(id)?;
        self.paint();
        Ok(())
    }

    pub fn set_crop_mode(&self, enabled: bool) -> bool {
        let mut s = self.shared.borrow_mut();
        let mode = s.core.set_crop_mode(enabled);
        s.sync_gesture();
        s.paint();
        mode
    }

    #[must_use]
    pub fn selection(&self) -> Option<LayerId> {
        self.shared.borrow().core.selection()
    }

    #[must_use]
    pub fn crop_mode(&self) -> bool {
        self.shared.borrow().core.crop_mode()
    }

    /// Repaint whatever the render gate lets through.
    pub fn paint(&self) {
        self.shared.borrow_mut().paint();
    }
}

/// Adapt a JavaScript function into an action sink.
///
/// Each action is passed as a plain object, e.g.
/// `{ type: "positionChanged", id, position: { x, y } }`.
pub fn js_sink(callback: js_sys::Function) -> impl FnMut(&Action) + 'static {
    move |action: &Action| {
        let json = match serde_json::to_string(action) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(%err, ?action, "action not serializable");
                return;
            }
        };
        let result = js_sys::JSON::parse(&json).and_then(|value| callback.call1(&JsValue::NULL, &value));
        if let Err(err) = result {
            tracing::warn!(?err, "action callback threw");
        }
    }
}

/// Run `f` on the shared state if the engine is still alive and not already
/// borrowed by an outer handler.
fn with_shared(weak: &Weak<RefCell<Shared>>, f: impl FnOnce(&mut Shared)) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    match shared.try_borrow_mut() {
        Ok(mut state) => f(&mut state),
        Err(_) => tracing::warn!("pointer event dropped: engine busy"),
    }
}

impl Shared {
    fn pointer_down(&mut self, event: &MouseEvent) {
        let hit = match dom::resolve_hit(event) {
            Ok(hit) => hit,
            Err(err) => {
                tracing::warn!(?err, "pointer down ignored: hit resolution failed");
                return;
            }
        };
        let pt = self.surface.canvas_point(event);
        let actions = self.core.on_pointer_down(hit, pt, Button::from_dom(event.button()));
        if !self.core.input_state().is_idle() {
            event.prevent_default();
        }
        self.sync_gesture();
        self.finish(&actions);
    }

    fn pointer_move(&mut self, event: &MouseEvent) {
        let pt = self.surface.canvas_point(event);
        let actions = self.core.on_pointer_move(pt);
        self.finish(&actions);
    }

    fn pointer_up(&mut self, event: &MouseEvent) {
        let pt = self.surface.canvas_point(event);
        let actions = self.core.on_pointer_up(pt);
        self.finish(&actions);
    }

    fn pointer_leave(&mut self) {
        let actions = self.core.on_pointer_leave();
        self.finish(&actions);
    }

    /// Forward actions to the host, release listeners of a finished gesture,
    /// and repaint.
    fn finish(&mut self, actions: &[Action]) {
        for action in actions {
            (self.sink)(action);
        }
        if self.core.input_state().is_idle() {
            if let Some(gesture) = self.gesture.as_mut() {
                gesture.detach();
            }
        }
        self.paint();
    }

    /// Make the document listeners match the controller's session.
    ///
    /// Listeners of an ended or replaced session are detached; a new session
    /// gets fresh listeners.
    fn sync_gesture(&mut self) {
        let session = self.core.input_state().session();
        let current = self.gesture.as_ref().filter(|g| g.is_attached()).map(GestureListeners::session);
        if session == current {
            return;
        }
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.detach();
        }
        let Some(session) = session else {
            return;
        };
        let on_move = self.this.clone();
        let on_up = self.this.clone();
        match GestureListeners::attach(
            self.surface.document(),
            session,
            move |event: MouseEvent| with_shared(&on_move, |s| s.pointer_move(&event)),
            move |event: MouseEvent| with_shared(&on_up, |s| s.pointer_up(&event)),
        ) {
            // Replacing drops the previous, already detached, listeners.
            Ok(gesture) => self.gesture = Some(gesture),
            Err(err) => {
                tracing::warn!(?err, session, "gesture listeners not attached; cancelling");
                self.core.cancel_gesture();
            }
        }
    }

    fn paint(&mut self) {
        let scene = self.core.render();
        if let Err(err) = self.surface.paint(&scene) {
            tracing::warn!(?err, "paint failed; next frame redraws everything");
            self.core.invalidate_render();
            self.surface.forget_content();
        }
    }
}
