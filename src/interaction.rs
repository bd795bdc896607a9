//! Turning pointer gestures into annotations.
//!
//! One pointer drives one gesture at a time:
//!
//! ```text
//!   Idle --down(rect/oval)--> Drawing --up--> AwaitingLabel --submit/cancel--> Idle
//!   Idle --down(point)------------------------> AwaitingLabel
//! ```
//!
//! While a label is pending no new shape can be started on either side.
//! Pointer events with a NaN or infinite coordinate are dropped and leave the
//! gesture as it was.
//! Cancelling the label still commits the shape, with an empty label. That is
//! long-standing editor behavior; whether cancel should discard instead is an
//! open product question.

use crate::config::EditorPreferences;
use crate::model::{AnnotationId, Position, Shape, Side, Style, Tool};
use crate::store::AnnotationStore;

/// Size of the image shown on one side's canvas, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
}

impl CanvasBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp a position into `[0, width] x [0, height]`.
    pub fn clamp(&self, p: Position) -> Position {
        Position::new(
            p.x.max(0.0).min(self.width.max(0.0)),
            p.y.max(0.0).min(self.height.max(0.0)),
        )
    }
}

/// Where the current pointer gesture is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging out a rectangle or oval from `anchor`.
    Drawing {
        side: Side,
        anchor: Position,
        shape: Shape,
    },
    /// Geometry is frozen, waiting for the label dialog to resolve.
    AwaitingLabel { side: Side, shape: Shape },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// The provisional shape and its side, if any.
    pub fn provisional(&self) -> Option<(Side, &Shape)> {
        match self {
            Gesture::Idle => None,
            Gesture::Drawing { side, shape, .. } | Gesture::AwaitingLabel { side, shape } => {
                Some((*side, shape))
            }
        }
    }
}

/// Active tool plus the pointer gesture state machine.
#[derive(Debug, Clone)]
pub struct InteractionController {
    tool: Option<Tool>,
    gesture: Gesture,
    left_bounds: Option<CanvasBounds>,
    right_bounds: Option<CanvasBounds>,
    point_radius: f64,
    clamp_to_canvas: bool,
    style: Style,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(&EditorPreferences::default())
    }
}

impl InteractionController {
    pub fn new(preferences: &EditorPreferences) -> Self {
        Self {
            tool: None,
            gesture: Gesture::Idle,
            left_bounds: None,
            right_bounds: None,
            point_radius: preferences.point_radius,
            clamp_to_canvas: preferences.clamp_to_canvas,
            style: preferences.default_style.clone(),
        }
    }

    pub fn current_tool(&self) -> Option<Tool> {
        self.tool
    }

    /// Select a tool, or `None` to disable drawing.
    ///
    /// A gesture already in progress keeps the shape kind it started with.
    pub fn set_tool(&mut self, tool: Option<Tool>) {
        if self.tool != tool {
            log::debug!(
                "Tool: {} -> {}",
                self.tool.map_or("none", |t| t.name()),
                tool.map_or("none", |t| t.name())
            );
        }
        self.tool = tool;
    }

    pub fn canvas_bounds(&self, side: Side) -> Option<CanvasBounds> {
        match side {
            Side::Left => self.left_bounds,
            Side::Right => self.right_bounds,
        }
    }

    /// Set (or forget) the image size of a side, used for clamping.
    pub fn set_canvas_bounds(&mut self, side: Side, bounds: Option<CanvasBounds>) {
        match side {
            Side::Left => self.left_bounds = bounds,
            Side::Right => self.right_bounds = bounds,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// The shape waiting for a label, if any.
    pub fn pending_label(&self) -> Option<(Side, &Shape)> {
        match &self.gesture {
            Gesture::AwaitingLabel { side, shape } => Some((*side, shape)),
            _ => None,
        }
    }

    fn accepts(side: Side, p: Position) -> bool {
        if !p.is_finite() {
            log::warn!("Ignoring pointer event on {} at non-finite ({}, {})", side, p.x, p.y);
            return false;
        }
        true
    }

    fn resolve(&self, side: Side, p: Position) -> Position {
        match self.canvas_bounds(side) {
            Some(bounds) if self.clamp_to_canvas => bounds.clamp(p),
            _ => p,
        }
    }

    /// Start a shape at `p`. Returns false if nothing happened.
    pub fn pointer_down(&mut self, side: Side, p: Position) -> bool {
        if !Self::accepts(side, p) {
            return false;
        }
        let Some(tool) = self.tool else {
            log::trace!("Pointer down on {} with no active tool", side);
            return false;
        };

        match &self.gesture {
            Gesture::AwaitingLabel { .. } => {
                log::debug!("Pointer down on {} ignored: label pending", side);
                return false;
            }
            Gesture::Drawing { side: previous, .. } => {
                // Release was missed (e.g. pointer left the window)
                log::warn!(
                    "Starting new {} shape while a {} drag is still active - discarding it",
                    side,
                    previous
                );
            }
            Gesture::Idle => {}
        }

        let anchor = self.resolve(side, p);
        let shape = Shape::start(tool.shape_kind(), anchor, self.point_radius);
        self.gesture = if tool.completes_on_press() {
            log::debug!(
                "{}: placed at ({:.1}, {:.1}) on {}",
                tool.name(),
                anchor.x,
                anchor.y,
                side
            );
            Gesture::AwaitingLabel { side, shape }
        } else {
            log::debug!(
                "{}: STARTED at ({:.1}, {:.1}) on {}",
                tool.name(),
                anchor.x,
                anchor.y,
                side
            );
            Gesture::Drawing {
                side,
                anchor,
                shape,
            }
        };
        true
    }

    /// Update the provisional shape. Only moves on the drawing side count.
    pub fn pointer_move(&mut self, side: Side, p: Position) -> bool {
        if !Self::accepts(side, p) {
            return false;
        }
        let current = self.resolve(side, p);
        match &mut self.gesture {
            Gesture::Drawing {
                side: drawing_side,
                anchor,
                shape,
            } if *drawing_side == side => {
                shape.drag_to(*anchor, current);
                log::trace!("Drawing on {}: {:?}", side, shape);
                true
            }
            _ => false,
        }
    }

    /// Freeze the provisional shape and wait for a label.
    ///
    /// A release on the drawing side uses the (clamped) release position. A
    /// release reported by the other side's canvas keeps the last position
    /// seen on the drawing side.
    pub fn pointer_up(&mut self, side: Side, p: Position) -> bool {
        if !Self::accepts(side, p) {
            return false;
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Drawing {
                side: drawing_side,
                anchor,
                mut shape,
            } => {
                if drawing_side == side {
                    shape.drag_to(anchor, self.resolve(side, p));
                } else {
                    log::debug!(
                        "Released over {} while drawing on {}; keeping last position",
                        side,
                        drawing_side
                    );
                }
                log::debug!("Drawing on {} ended: {:?}", drawing_side, shape);
                self.gesture = Gesture::AwaitingLabel {
                    side: drawing_side,
                    shape,
                };
                true
            }
            other => {
                self.gesture = other;
                false
            }
        }
    }

    /// Commit the pending shape with `label`.
    pub fn submit_label(
        &mut self,
        store: &mut AnnotationStore,
        label: impl Into<String>,
    ) -> Option<AnnotationId> {
        self.commit(store, label.into())
    }

    /// Commit the pending shape with an empty label.
    pub fn cancel_label(&mut self, store: &mut AnnotationStore) -> Option<AnnotationId> {
        log::debug!("Label cancelled; committing shape unlabeled");
        self.commit(store, String::new())
    }

    fn commit(&mut self, store: &mut AnnotationStore, label: String) -> Option<AnnotationId> {
        let Gesture::AwaitingLabel { side, shape } = self.gesture else {
            log::debug!("No shape awaiting a label");
            return None;
        };
        self.gesture = Gesture::Idle;
        Some(store.commit(side, shape, label, self.style.clone()))
    }

    /// Throw away any provisional shape without committing it.
    pub fn abort(&mut self) -> Option<Shape> {
        let discarded = std::mem::take(&mut self.gesture).provisional().map(|(_, s)| *s);
        if discarded.is_some() {
            log::debug!("Discarded provisional shape");
        }
        discarded
    }
}
