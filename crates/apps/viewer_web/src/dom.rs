//! Canvas mounting and DOM input plumbing.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use view::{ControlInput, InputSurface, ListenerBinding, MouseButton, ViewportSize};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlCanvasElement, HtmlElement, PointerEvent, TouchEvent, WheelEvent};

/// Inputs captured by listeners, drained once per frame.
pub type InputQueue = Rc<RefCell<VecDeque<ControlInput>>>;

/// The viewer canvas inside its container element.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    queue: InputQueue,
}

impl CanvasSurface {
    /// Appends a fresh canvas to the element with id `container_id`.
    pub fn mount(container_id: &str) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id {container_id:?}")))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| JsValue::from_str(&format!("#{container_id} is not an HTML element")))?;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("failed to create canvas"))?;
        canvas.set_attribute("style", "display:block;width:100%;height:100%;touch-action:none")?;
        container.append_child(&canvas)?;

        let surface = Self {
            container,
            canvas,
            queue: Rc::new(RefCell::new(VecDeque::new())),
        };
        if let Some(size) = surface.container_size() {
            surface.canvas.set_width(size.width.max(1.0) as u32);
            surface.canvas.set_height(size.height.max(1.0) as u32);
        }
        Ok(surface)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Measured container size; `None` once the container left the document.
    pub fn container_size(&self) -> Option<ViewportSize> {
        if !self.container.is_connected() {
            return None;
        }
        Some(ViewportSize::new(
            self.container.client_width() as f64,
            self.container.client_height() as f64,
        ))
    }

    pub fn drain_inputs(&self) -> Vec<ControlInput> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

impl InputSurface for CanvasSurface {
    fn bind_listeners(&self) -> ListenerBinding {
        let canvas = &self.canvas;
        let active = EventListenerOptions::enable_prevent_default();
        let mut listeners = Vec::new();

        let queue = self.queue.clone();
        let target = canvas.clone();
        listeners.push(EventListener::new(canvas, "pointerdown", move |event: &Event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            if event.pointer_type() == "touch" {
                return;
            }
            let Some(button) = mouse_button(event.button()) else {
                return;
            };
            target.set_pointer_capture(event.pointer_id()).ok();
            queue.borrow_mut().push_back(ControlInput::PointerDown {
                button,
                x: event.offset_x() as f64,
                y: event.offset_y() as f64,
            });
        }));

        let queue = self.queue.clone();
        listeners.push(EventListener::new(canvas, "pointermove", move |event: &Event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            if event.pointer_type() == "touch" {
                return;
            }
            queue.borrow_mut().push_back(ControlInput::PointerMove {
                x: event.offset_x() as f64,
                y: event.offset_y() as f64,
            });
        }));

        for name in ["pointerup", "pointercancel"] {
            let queue = self.queue.clone();
            let target = canvas.clone();
            listeners.push(EventListener::new(canvas, name, move |event: &Event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else {
                    return;
                };
                if event.pointer_type() == "touch" {
                    return;
                }
                target.release_pointer_capture(event.pointer_id()).ok();
                queue.borrow_mut().push_back(ControlInput::PointerUp);
            }));
        }

        let queue = self.queue.clone();
        listeners.push(EventListener::new_with_options(
            canvas,
            "wheel",
            active,
            move |event: &Event| {
                let Some(event) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                event.prevent_default();
                queue.borrow_mut().push_back(ControlInput::Wheel {
                    delta_y: event.delta_y(),
                });
            },
        ));

        for name in ["touchstart", "touchmove", "touchend", "touchcancel"] {
            let queue = self.queue.clone();
            let target = canvas.clone();
            listeners.push(EventListener::new_with_options(
                canvas,
                name,
                active,
                move |event: &Event| {
                    let Some(event) = event.dyn_ref::<TouchEvent>() else {
                        return;
                    };
                    event.prevent_default();
                    let points = touch_points(event, &target);
                    queue.borrow_mut().push_back(touch_input(name, points));
                },
            ));
        }

        listeners.push(EventListener::new_with_options(
            canvas,
            "contextmenu",
            active,
            |event: &Event| event.prevent_default(),
        ));

        tracing::debug!(count = listeners.len(), "canvas listeners bound");
        ListenerBinding::new(move || drop(listeners))
    }

    fn viewport(&self) -> ViewportSize {
        ViewportSize::new(
            self.canvas.client_width() as f64,
            self.canvas.client_height() as f64,
        )
    }
}

/// DOM `MouseEvent.button` to a controller button.
pub fn mouse_button(button: i16) -> Option<MouseButton> {
    match button {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    }
}

/// Maps a touch event name and its remaining touches to controller input.
///
/// A lifted finger with others still down restarts the gesture with the rest.
pub fn touch_input(event: &str, points: Vec<[f64; 2]>) -> ControlInput {
    match event {
        "touchstart" => ControlInput::TouchStart { points },
        "touchmove" => ControlInput::TouchMove { points },
        _ if !points.is_empty() => ControlInput::TouchStart { points },
        _ => ControlInput::TouchEnd,
    }
}

fn touch_points(event: &TouchEvent, canvas: &HtmlCanvasElement) -> Vec<[f64; 2]> {
    let rect = canvas.get_bounding_client_rect();
    let touches = event.touches();
    (0..touches.length())
        .filter_map(|i| touches.get(i))
        .map(|t| {
            [
                t.client_x() as f64 - rect.left(),
                t.client_y() as f64 - rect.top(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{mouse_button, touch_input};
    use view::{ControlInput, MouseButton};

    #[test]
    fn dom_buttons_map_to_controller_buttons() {
        assert_eq!(mouse_button(0), Some(MouseButton::Left));
        assert_eq!(mouse_button(1), Some(MouseButton::Middle));
        assert_eq!(mouse_button(2), Some(MouseButton::Right));
        assert_eq!(mouse_button(3), None);
    }

    #[test]
    fn lifting_one_of_two_fingers_restarts_the_gesture() {
        let one = vec![[4.0, 5.0]];
        assert_eq!(
            touch_input("touchend", one.clone()),
            ControlInput::TouchStart { points: one }
        );
        assert_eq!(touch_input("touchcancel", Vec::new()), ControlInput::TouchEnd);
        assert_eq!(
            touch_input("touchmove", vec![[1.0, 1.0]]),
            ControlInput::TouchMove {
                points: vec![[1.0, 1.0]]
            }
        );
    }
}
