//! Pointer state machine for the crop rectangle.
//!
//! Each `(TouchState, PointerEvent)` pair maps to a next state and an
//! [`Effect`] through [`transition`]. The effect is applied to the crop
//! rectangle by [`crate::CropGeometry`]; nothing here touches geometry state.

use serde::{Deserialize, Serialize};
use snapcrop_geometry::{Point2D, RectF};

/// A resize zone on the crop rectangle, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    None,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
}

impl Handle {
    /// Hit-test order: corners win over edge midpoints.
    pub const RESIZE: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
        Handle::Top,
        Handle::Bottom,
        Handle::Left,
        Handle::Right,
    ];

    pub fn moves_left(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::BottomLeft | Handle::Left)
    }

    pub fn moves_right(&self) -> bool {
        matches!(self, Handle::TopRight | Handle::BottomRight | Handle::Right)
    }

    pub fn moves_top(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopRight | Handle::Top)
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::BottomRight | Handle::Bottom)
    }

    /// Where this handle sits on `rect`.
    pub fn anchor(&self, rect: &RectF) -> Option<Point2D> {
        let c = rect.center();
        let p = match self {
            Handle::None => return None,
            Handle::TopLeft => Point2D::new(rect.left, rect.top),
            Handle::TopRight => Point2D::new(rect.right, rect.top),
            Handle::BottomLeft => Point2D::new(rect.left, rect.bottom),
            Handle::BottomRight => Point2D::new(rect.right, rect.bottom),
            Handle::Top => Point2D::new(c.x, rect.top),
            Handle::Bottom => Point2D::new(c.x, rect.bottom),
            Handle::Left => Point2D::new(rect.left, c.y),
            Handle::Right => Point2D::new(rect.right, c.y),
        };
        Some(p)
    }
}

/// What the active touch is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchMode {
    None,
    Drag,
    Resize,
}

/// The pointer state, carrying the last seen position while a touch is active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TouchState {
    #[default]
    Idle,
    /// Pressed outside the rectangle; moves are ignored until release.
    Ignoring,
    Dragging { last: Point2D },
    Resizing { handle: Handle, last: Point2D },
}

impl TouchState {
    pub fn mode(&self) -> TouchMode {
        match self {
            TouchState::Idle | TouchState::Ignoring => TouchMode::None,
            TouchState::Dragging { .. } => TouchMode::Drag,
            TouchState::Resizing { .. } => TouchMode::Resize,
        }
    }

    pub fn handle(&self) -> Handle {
        match self {
            TouchState::Resizing { handle, .. } => *handle,
            _ => Handle::None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, TouchState::Idle)
    }
}

/// A single-pointer input event in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Point2D),
    Move(Point2D),
    Release,
}

/// Change to apply to the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    None,
    Translate { dx: f64, dy: f64 },
    Resize { handle: Handle, dx: f64, dy: f64 },
}

/// Classify a press against the crop rectangle.
pub fn hit_test(point: Point2D, crop: &RectF, touch_radius: f64) -> Handle {
    Handle::RESIZE
        .into_iter()
        .find(|handle| {
            handle
                .anchor(crop)
                .is_some_and(|anchor| point.distance_to(&anchor) < touch_radius)
        })
        .unwrap_or(Handle::None)
}

/// Next state and effect for `event` in `state`.
///
/// A press while a touch is already active is ignored (single pointer only).
pub fn transition(
    state: TouchState,
    event: PointerEvent,
    crop: &RectF,
    touch_radius: f64,
) -> (TouchState, Effect) {
    match (state, event) {
        (TouchState::Idle, PointerEvent::Press(p)) => (press(p, crop, touch_radius), Effect::None),
        (active, PointerEvent::Press(_)) => (active, Effect::None),

        (TouchState::Dragging { last }, PointerEvent::Move(p)) => {
            let (dx, dy) = p.delta_from(&last);
            (TouchState::Dragging { last: p }, Effect::Translate { dx, dy })
        }
        (TouchState::Resizing { handle, last }, PointerEvent::Move(p)) => {
            let (dx, dy) = p.delta_from(&last);
            (
                TouchState::Resizing { handle, last: p },
                Effect::Resize { handle, dx, dy },
            )
        }
        (idle @ (TouchState::Idle | TouchState::Ignoring), PointerEvent::Move(_)) => {
            (idle, Effect::None)
        }

        (_, PointerEvent::Release) => (TouchState::Idle, Effect::None),
    }
}

fn press(point: Point2D, crop: &RectF, touch_radius: f64) -> TouchState {
    match hit_test(point, crop, touch_radius) {
        Handle::None if crop.contains(point) => TouchState::Dragging { last: point },
        Handle::None => TouchState::Ignoring,
        handle => TouchState::Resizing {
            handle,
            last: point,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADIUS: f64 = 50.0;

    fn crop() -> RectF {
        RectF::new(100.0, 100.0, 500.0, 500.0)
    }

    #[test]
    fn corners_take_priority_over_edges() {
        assert_eq!(
            hit_test(Point2D::new(110.0, 105.0), &crop(), RADIUS),
            Handle::TopLeft
        );
        assert_eq!(
            hit_test(Point2D::new(300.0, 490.0), &crop(), RADIUS),
            Handle::Bottom
        );
        assert_eq!(
            hit_test(Point2D::new(505.0, 300.0), &crop(), RADIUS),
            Handle::Right
        );
    }

    #[test]
    fn press_classifies_into_drag_resize_or_nothing() {
        let (state, _) = transition(
            TouchState::Idle,
            PointerEvent::Press(Point2D::new(300.0, 300.0)),
            &crop(),
            RADIUS,
        );
        assert_eq!(state.mode(), TouchMode::Drag);

        let (state, _) = transition(
            TouchState::Idle,
            PointerEvent::Press(Point2D::new(498.0, 502.0)),
            &crop(),
            RADIUS,
        );
        assert_eq!(state.mode(), TouchMode::Resize);
        assert_eq!(state.handle(), Handle::BottomRight);

        let (state, _) = transition(
            TouchState::Idle,
            PointerEvent::Press(Point2D::new(900.0, 900.0)),
            &crop(),
            RADIUS,
        );
        assert_eq!(state.mode(), TouchMode::None);
        assert_eq!(state.handle(), Handle::None);
    }

    #[test]
    fn moves_report_deltas_from_last_position() {
        let state = TouchState::Dragging {
            last: Point2D::new(10.0, 10.0),
        };
        let (state, effect) = transition(
            state,
            PointerEvent::Move(Point2D::new(15.0, 7.0)),
            &crop(),
            RADIUS,
        );
        assert_eq!(effect, Effect::Translate { dx: 5.0, dy: -3.0 });

        let (_, effect) = transition(
            state,
            PointerEvent::Move(Point2D::new(16.0, 7.0)),
            &crop(),
            RADIUS,
        );
        assert_eq!(effect, Effect::Translate { dx: 1.0, dy: 0.0 });
    }

    #[test]
    fn moves_outside_any_touch_do_nothing() {
        for state in [TouchState::Idle, TouchState::Ignoring] {
            let (next, effect) = transition(
                state,
                PointerEvent::Move(Point2D::new(1.0, 1.0)),
                &crop(),
                RADIUS,
            );
            assert_eq!(next, state);
            assert_eq!(effect, Effect::None);
        }
    }

    #[test]
    fn second_press_is_ignored_and_release_resets() {
        let resizing = TouchState::Resizing {
            handle: Handle::Left,
            last: Point2D::new(100.0, 300.0),
        };
        let (state, effect) = transition(
            resizing,
            PointerEvent::Press(Point2D::new(300.0, 300.0)),
            &crop(),
            RADIUS,
        );
        assert_eq!(state, resizing);
        assert_eq!(effect, Effect::None);

        let (state, _) = transition(state, PointerEvent::Release, &crop(), RADIUS);
        assert_eq!(state, TouchState::Idle);
    }
}
