//! Camera transform and the pan/zoom gesture state machine.
//!
//! The viewport knows nothing about the graph; it turns pointer, touch, and
//! wheel events into a `Transform` that the renderer applies to the laid-out
//! tree. Every transition is synchronous, and the next state is derived from
//! the *current* touch count rather than a remembered event type, so late or
//! reordered platform events cannot wedge the machine.

use std::time::{Duration, Instant};

pub const MIN_SCALE: f32 = 0.2;
pub const MAX_SCALE: f32 = 3.0;
const WHEEL_ZOOM_RATE: f32 = 0.001;
const BUTTON_ZOOM_STEP: f32 = 0.2;
const WHEEL_SETTLE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// The camera: `screen = world * scale + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Panning {
        /// `pointer - translation` at grab time; a move sets the translation
        /// to `pointer - pan_start`, so panning is a pure function of the
        /// current pointer position.
        pan_start: Point,
    },
    Pinching {
        start_distance: f32,
        start_scale: f32,
    },
}

/// Pan/zoom state machine over a [`Transform`].
#[derive(Debug, Clone)]
pub struct Viewport {
    transform: Transform,
    gesture: Gesture,
    last_wheel: Option<Instant>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            gesture: Gesture::Idle,
            last_wheel: None,
        }
    }
}

impl Viewport {
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.gesture, Gesture::Pinching { .. })
    }

    // ----- single-pointer pan (mouse) -----

    /// Background press; presses on cards or buttons never reach here.
    pub fn pointer_down(&mut self, at: Point) {
        self.gesture = Gesture::Panning {
            pan_start: Point::new(at.x - self.transform.x, at.y - self.transform.y),
        };
    }

    pub fn pointer_move(&mut self, at: Point) {
        if let Gesture::Panning { pan_start } = self.gesture {
            self.transform.x = at.x - pan_start.x;
            self.transform.y = at.y - pan_start.y;
        }
    }

    pub fn pointer_up(&mut self) {
        self.gesture = Gesture::Idle;
    }

    // ----- touch (pan + pinch) -----

    /// Feed the complete set of current touch points. Handles starts, moves,
    /// and ends uniformly: zero points is idle, one is a pan, two or more is
    /// a pinch around the first two.
    pub fn touches(&mut self, points: &[Point]) {
        match points {
            [] => self.gesture = Gesture::Idle,
            [p] => match self.gesture {
                Gesture::Panning { pan_start } => {
                    self.transform.x = p.x - pan_start.x;
                    self.transform.y = p.y - pan_start.y;
                }
                // Fresh pan, or one finger lifting out of a pinch.
                Gesture::Idle | Gesture::Pinching { .. } => self.pointer_down(*p),
            },
            [a, b, ..] => {
                let distance = a.distance(*b);
                match self.gesture {
                    Gesture::Pinching {
                        start_distance,
                        start_scale,
                    } if start_distance > 0.0 => {
                        let scale = clamp_scale(start_scale * distance / start_distance);
                        self.zoom_toward(a.midpoint(*b), scale);
                    }
                    _ => {
                        self.gesture = Gesture::Pinching {
                            start_distance: distance,
                            start_scale: self.transform.scale,
                        };
                    }
                }
            }
        }
    }

    // ----- zoom -----

    /// Wheel zoom toward the mouse position. `now` feeds the settle timer
    /// that suppresses animation during a burst of wheel events.
    pub fn wheel(&mut self, delta_y: f32, focal: Point, now: Instant) {
        let scale = clamp_scale(self.transform.scale - delta_y * WHEEL_ZOOM_RATE);
        self.zoom_toward(focal, scale);
        self.last_wheel = Some(now);
    }

    /// Whether a wheel burst is still in flight (within the settle window).
    pub fn wheel_active(&self, now: Instant) -> bool {
        self.last_wheel
            .is_some_and(|at| now.duration_since(at) < WHEEL_SETTLE)
    }

    /// Button zoom: fixed step, no focal point.
    pub fn zoom_in(&mut self) {
        self.transform.scale = clamp_scale(self.transform.scale + BUTTON_ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.transform.scale = clamp_scale(self.transform.scale - BUTTON_ZOOM_STEP);
    }

    /// Back to the identity camera; invoked on view-root changes and on
    /// request.
    pub fn reset(&mut self) {
        self.transform = Transform::default();
        self.gesture = Gesture::Idle;
    }

    /// Rescale while keeping the world point under `focal` fixed on screen.
    fn zoom_toward(&mut self, focal: Point, new_scale: f32) {
        let ratio = 1.0 - new_scale / self.transform.scale;
        self.transform.x += (focal.x - self.transform.x) * ratio;
        self.transform.y += (focal.y - self.transform.y) * ratio;
        self.transform.scale = new_scale;
    }
}

fn clamp_scale(scale: f32) -> f32 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn pan_follows_the_pointer() {
        let mut vp = Viewport::default();
        vp.pointer_down(Point::new(10.0, 10.0));
        vp.pointer_move(Point::new(25.0, 4.0));
        assert_close(vp.transform().x, 15.0);
        assert_close(vp.transform().y, -6.0);
        vp.pointer_up();
        assert!(!vp.is_panning());
        // Moves after release do nothing.
        vp.pointer_move(Point::new(100.0, 100.0));
        assert_close(vp.transform().x, 15.0);
    }

    #[test]
    fn scale_stays_clamped_under_any_event_storm() {
        let mut vp = Viewport::default();
        let now = Instant::now();
        for _ in 0..50 {
            vp.wheel(-10_000.0, Point::new(0.0, 0.0), now);
        }
        assert_close(vp.transform().scale, MAX_SCALE);
        for _ in 0..50 {
            vp.zoom_out();
        }
        assert_close(vp.transform().scale, MIN_SCALE);
        for _ in 0..50 {
            vp.zoom_in();
        }
        assert_close(vp.transform().scale, MAX_SCALE);
        vp.touches(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        vp.touches(&[Point::new(0.0, 0.0), Point::new(10_000.0, 0.0)]);
        assert_close(vp.transform().scale, MAX_SCALE);
        vp.touches(&[Point::new(0.0, 0.0), Point::new(0.001, 0.0)]);
        assert_close(vp.transform().scale, MIN_SCALE);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut vp = Viewport::default();
        vp.wheel(-500.0, Point::new(40.0, 40.0), Instant::now());
        vp.pointer_down(Point::new(0.0, 0.0));
        vp.reset();
        let first = vp.transform();
        vp.reset();
        assert_eq!(first, vp.transform());
        assert_eq!(first, Transform::default());
        assert!(!vp.is_panning());
    }

    #[test]
    fn wheel_zoom_keeps_the_focal_point_fixed() {
        let mut vp = Viewport::default();
        vp.pointer_down(Point::new(0.0, 0.0));
        vp.pointer_move(Point::new(30.0, 20.0));
        vp.pointer_up();

        let focal = Point::new(80.0, 60.0);
        let before = vp.transform();
        let world_x = (focal.x - before.x) / before.scale;
        let world_y = (focal.y - before.y) / before.scale;

        vp.wheel(-400.0, focal, Instant::now());

        let after = vp.transform();
        assert_close(world_x * after.scale + after.x, focal.x);
        assert_close(world_y * after.scale + after.y, focal.y);
    }

    #[test]
    fn button_zoom_leaves_translation_alone() {
        let mut vp = Viewport::default();
        vp.pointer_down(Point::new(0.0, 0.0));
        vp.pointer_move(Point::new(12.0, 34.0));
        vp.pointer_up();
        vp.zoom_in();
        assert_close(vp.transform().scale, 1.2);
        assert_close(vp.transform().x, 12.0);
        assert_close(vp.transform().y, 34.0);
    }

    #[test]
    fn pinch_scales_by_distance_ratio() {
        let mut vp = Viewport::default();
        vp.touches(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        assert!(vp.is_pinching());
        vp.touches(&[Point::new(0.0, 0.0), Point::new(150.0, 0.0)]);
        assert_close(vp.transform().scale, 1.5);
    }

    #[test]
    fn second_touch_suspends_panning_and_lifting_resumes_it() {
        let mut vp = Viewport::default();
        vp.touches(&[Point::new(10.0, 10.0)]);
        assert!(vp.is_panning());
        vp.touches(&[Point::new(10.0, 10.0), Point::new(60.0, 10.0)]);
        assert!(vp.is_pinching());
        // One finger lifts; pan resumes from the remaining position with no
        // jump.
        vp.touches(&[Point::new(60.0, 10.0)]);
        assert!(vp.is_panning());
        let before = vp.transform();
        vp.touches(&[Point::new(60.0, 10.0)]);
        assert_eq!(before, vp.transform());
        vp.touches(&[]);
        assert!(!vp.is_panning() && !vp.is_pinching());
    }

    #[test]
    fn state_derives_from_current_touch_count() {
        let mut vp = Viewport::default();
        // A stale end (empty set) while idle is harmless, and a two-point
        // report arriving before any single-point start still pinches.
        vp.touches(&[]);
        vp.touches(&[Point::new(0.0, 0.0), Point::new(50.0, 0.0)]);
        assert!(vp.is_pinching());
        vp.touches(&[]);
        assert!(!vp.is_pinching());
    }

    #[test]
    fn wheel_settle_window_expires() {
        let mut vp = Viewport::default();
        let start = Instant::now();
        vp.wheel(-100.0, Point::new(0.0, 0.0), start);
        assert!(vp.wheel_active(start + Duration::from_millis(100)));
        assert!(!vp.wheel_active(start + Duration::from_millis(200)));
    }
}
