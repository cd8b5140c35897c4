//! Interactive pan/zoom viewport.
//!
//! [`ViewportController`] is a small state machine driven by pointer and wheel
//! gestures. It keeps one [`ViewportTransform`] (translate x/y, scale k) that is
//! updated atomically per event. Renderers pull it once per frame with
//! [`ViewportController::poll_frame`], which coalesces any number of events
//! into the latest value and reports nothing when the transform is unchanged.
//!
//! Zoom behavior follows d3-zoom: wheel ticks scale by `2^(-delta_y * f)` around
//! the pointer, and a two-pointer pinch scales by the change in finger distance
//! around the fingers' midpoint.

mod transform;

pub use transform::{ScaleExtent, ViewportTransform};

use crate::layout::Coord;
use std::collections::BTreeMap;
use tracing::trace;

/// Wheel delta multiplier for pixel-mode deltas.
pub const WHEEL_PIXEL_FACTOR: f64 = 0.002;
/// Wheel delta multiplier for line-mode deltas.
pub const WHEEL_LINE_FACTOR: f64 = 0.05;
/// Wheel delta multiplier for page-mode deltas.
pub const WHEEL_PAGE_FACTOR: f64 = 1.0;
/// Extra multiplier while ctrl is held (trackpad pinch).
pub const WHEEL_CTRL_MULTIPLIER: f64 = 10.0;

/// Unit of a wheel delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WheelDeltaMode {
    /// Pixels.
    #[default]
    Pixel,
    /// Lines.
    Line,
    /// Pages.
    Page,
}

impl WheelDeltaMode {
    fn factor(self) -> f64 {
        match self {
            Self::Pixel => WHEEL_PIXEL_FACTOR,
            Self::Line => WHEEL_LINE_FACTOR,
            Self::Page => WHEEL_PAGE_FACTOR,
        }
    }
}

/// Identifier of an active pointer (mouse, pen, or finger).
pub type PointerId = u32;

/// Input gesture event in viewport (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// A pointer was pressed.
    PointerDown {
        /// Pointer identifier.
        id: PointerId,
        /// Screen position.
        position: Coord,
    },
    /// A pressed pointer moved.
    PointerMove {
        /// Pointer identifier.
        id: PointerId,
        /// Screen position.
        position: Coord,
    },
    /// A pointer was released or cancelled.
    PointerUp {
        /// Pointer identifier.
        id: PointerId,
    },
    /// Wheel or trackpad scroll.
    Wheel {
        /// Screen position of the pointer.
        position: Coord,
        /// Vertical delta; positive scrolls down (zooms out).
        delta_y: f64,
        /// Unit of `delta_y`.
        delta_mode: WheelDeltaMode,
        /// Whether ctrl was held.
        ctrl: bool,
    },
}

/// Gesture currently in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    /// No pointer pressed.
    Idle,
    /// One pointer dragging the diagram.
    Panning {
        /// Pointer driving the pan.
        pointer: PointerId,
        /// Its last seen screen position.
        last: Coord,
    },
    /// Two pointers pinching.
    Zooming {
        /// The two pointers with their current screen positions.
        pointers: [(PointerId, Coord); 2],
        /// Diagram-space points under each pointer when the pinch began.
        anchors: [Coord; 2],
    },
}

/// Pan/zoom state machine with a pull-based, coalescing output.
#[derive(Debug, Clone)]
pub struct ViewportController {
    state: GestureState,
    transform: ViewportTransform,
    published: ViewportTransform,
    dirty: bool,
    extent: ScaleExtent,
    /// Pressed pointers that are not driving the current gesture.
    spare_pointers: BTreeMap<PointerId, Coord>,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    /// Identity transform, unbounded scale.
    pub fn new() -> Self {
        Self::with_extent(ScaleExtent::default())
    }

    /// Identity transform, scale limited to `extent`.
    pub fn with_extent(extent: ScaleExtent) -> Self {
        Self {
            state: GestureState::Idle,
            transform: ViewportTransform::IDENTITY,
            published: ViewportTransform::IDENTITY,
            dirty: false,
            extent,
            spare_pointers: BTreeMap::new(),
        }
    }

    /// Current gesture state.
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Latest transform, including events not yet polled.
    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    /// The transform a renderer last received from [`Self::poll_frame`].
    pub fn published(&self) -> ViewportTransform {
        self.published
    }

    /// Return the latest transform if it changed since the previous poll.
    ///
    /// Call once per animation frame; bursts of events between two polls
    /// collapse into one update.
    pub fn poll_frame(&mut self) -> Option<ViewportTransform> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        if self.transform == self.published {
            return None;
        }
        self.published = self.transform;
        Some(self.published)
    }

    /// Back to the identity transform; any gesture in progress is dropped.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.spare_pointers.clear();
        self.set_transform(ViewportTransform::IDENTITY);
    }

    /// Feed one gesture event.
    pub fn handle(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::PointerDown { id, position } => self.pointer_down(id, position),
            GestureEvent::PointerMove { id, position } => self.pointer_move(id, position),
            GestureEvent::PointerUp { id } => self.pointer_up(id),
            GestureEvent::Wheel {
                position,
                delta_y,
                delta_mode,
                ctrl,
            } => self.wheel(position, delta_y, delta_mode, ctrl),
        }
    }

    fn pointer_down(&mut self, id: PointerId, position: Coord) {
        match self.state.clone() {
            GestureState::Idle => {
                self.state = GestureState::Panning {
                    pointer: id,
                    last: position,
                };
            }
            GestureState::Panning { pointer, last } if pointer != id => {
                self.start_pinch([(pointer, last), (id, position)]);
            }
            GestureState::Panning { .. } => {
                self.state = GestureState::Panning {
                    pointer: id,
                    last: position,
                };
            }
            GestureState::Zooming { .. } => {
                self.spare_pointers.insert(id, position);
            }
        }
    }

    fn pointer_move(&mut self, id: PointerId, position: Coord) {
        match self.state.clone() {
            GestureState::Panning { pointer, last } if pointer == id => {
                let next = self
                    .transform
                    .translated(position.x - last.x, position.y - last.y);
                self.state = GestureState::Panning {
                    pointer,
                    last: position,
                };
                self.set_transform(next);
            }
            GestureState::Zooming {
                mut pointers,
                anchors,
            } => {
                let Some(slot) = pointers.iter_mut().find(|(pointer, _)| *pointer == id) else {
                    self.spare_pointers.insert(id, position);
                    return;
                };
                slot.1 = position;
                self.state = GestureState::Zooming { pointers, anchors };
                self.apply_pinch(pointers, anchors);
            }
            _ => {
                if let Some(spare) = self.spare_pointers.get_mut(&id) {
                    *spare = position;
                }
            }
        }
    }

    fn pointer_up(&mut self, id: PointerId) {
        self.spare_pointers.remove(&id);
        match self.state.clone() {
            GestureState::Panning { pointer, .. } if pointer == id => {
                self.state = match self.spare_pointers.pop_first() {
                    Some((pointer, last)) => GestureState::Panning { pointer, last },
                    None => GestureState::Idle,
                };
            }
            GestureState::Zooming { pointers, .. } => {
                let remaining: Vec<(PointerId, Coord)> = pointers
                    .iter()
                    .copied()
                    .filter(|(pointer, _)| *pointer != id)
                    .collect();
                if remaining.len() == 2 {
                    return;
                }
                let (pointer, last) = remaining[0];
                match self.spare_pointers.pop_first() {
                    Some(other) => self.start_pinch([(pointer, last), other]),
                    None => self.state = GestureState::Panning { pointer, last },
                }
            }
            _ => {}
        }
    }

    fn wheel(&mut self, position: Coord, delta_y: f64, mode: WheelDeltaMode, ctrl: bool) {
        let mut exponent = -delta_y * mode.factor();
        if ctrl {
            exponent *= WHEEL_CTRL_MULTIPLIER;
        }
        let scale = self.extent.clamp(self.transform.k * exponent.exp2());
        let next = self.transform.zoomed_about(position, scale);
        trace!(scale, x = next.x, y = next.y, "Wheel zoom");
        self.set_transform(next);
    }

    fn start_pinch(&mut self, pointers: [(PointerId, Coord); 2]) {
        let anchors = [
            self.transform.invert(pointers[0].1),
            self.transform.invert(pointers[1].1),
        ];
        self.state = GestureState::Zooming { pointers, anchors };
    }

    fn apply_pinch(&mut self, pointers: [(PointerId, Coord); 2], anchors: [Coord; 2]) {
        let screen_distance = distance(pointers[0].1, pointers[1].1);
        let world_distance = distance(anchors[0], anchors[1]);
        if world_distance == 0.0 {
            return;
        }
        let scale = self.extent.clamp(screen_distance / world_distance);
        let screen_mid = midpoint(pointers[0].1, pointers[1].1);
        let world_mid = midpoint(anchors[0], anchors[1]);
        let next = ViewportTransform::new(
            screen_mid.x - world_mid.x * scale,
            screen_mid.y - world_mid.y * scale,
            scale,
        );
        self.set_transform(next);
    }

    fn set_transform(&mut self, next: ViewportTransform) {
        if !next.is_valid() {
            trace!(?next, "Ignoring degenerate viewport transform");
            return;
        }
        self.transform = next;
        self.dirty = true;
    }
}

fn distance(a: Coord, b: Coord) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn midpoint(a: Coord, b: Coord) -> Coord {
    Coord::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
