//! Turtle engine
//!
//! Holds the cursor state (position, heading, pen, delay), executes the
//! primitive motions, records the traced path and tells listeners about every
//! committed change. Rendering happens elsewhere: listeners get the state and
//! the path through `TurtleEvent`s and never touch the turtle directly.

use crate::cancel::CancelToken;
use crate::config::{TurtleConfig, DEFAULT_STEP_LENGTH, MAX_ANIMATION_STEPS};
use crate::error::{EngineError, Result, TurtleError};
use crate::path::{Path, Point};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// What a single mutation changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    Delay { old: u64, new: u64 },
    Heading { old: f64, new: f64 },
    Position { old: Point, new: Point },
    Pen { old: bool, new: bool },
    Reset,
}

/// Notification sent to listeners after a change is committed
#[derive(Debug, Clone, Copy)]
pub struct TurtleEvent<'a> {
    /// Delay in effect after the change, for throttling a render loop
    pub delay: u64,
    pub change: Change,
    /// Everything traced so far
    pub path: &'a Path,
}

/// Receiver of turtle notifications.
///
/// Listeners are called synchronously on whatever thread runs the turtle,
/// which may be a background worker; hopping to another thread is up to the
/// listener.
pub trait TurtleListener: Send + Sync {
    fn turtle_changed(&self, event: &TurtleEvent<'_>);
}

struct FnListener<F>(F);

impl<F> TurtleListener for FnListener<F>
where
    F: Fn(&TurtleEvent<'_>) + Send + Sync,
{
    fn turtle_changed(&self, event: &TurtleEvent<'_>) {
        (self.0)(event)
    }
}

/// Handle for removing a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The turtle state machine
pub struct Turtle {
    position: Point,
    /// Degrees in `[0, 360)`, counter-clockwise from the x axis
    heading: f64,
    pen_down: bool,
    /// Milliseconds to pause after each animation sub-step
    delay: u64,
    path: Path,
    /// Next pen-down motion must open a new subpath at the current position
    fresh_subpath: bool,
    step_length: f64,
    cancel: CancelToken,
    listeners: Vec<(ListenerId, Arc<dyn TurtleListener>)>,
    next_listener_id: u64,
}

impl Turtle {
    /// Create a turtle at the origin, heading 0, pen down, no delay
    pub fn new() -> Self {
        Self {
            position: Point::ORIGIN,
            heading: 0.0,
            pen_down: true,
            delay: 0,
            path: Path::new(),
            fresh_subpath: true,
            step_length: DEFAULT_STEP_LENGTH,
            cancel: CancelToken::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Create a turtle using the configured delay and animation step
    pub fn with_config(config: &TurtleConfig) -> Self {
        let mut turtle = Self::new();
        turtle.delay = config.delay;
        turtle.step_length = config.step_length;
        turtle
    }

    /// Use `token` for animation pauses
    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = token;
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    // Listeners

    /// Register a listener; it is called after every later change
    pub fn add_listener(&mut self, listener: Arc<dyn TurtleListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Register a closure as listener
    pub fn on_change<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&TurtleEvent<'_>) + Send + Sync + 'static,
    {
        self.add_listener(Arc::new(FnListener(callback)))
    }

    /// Detach a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    fn notify(&self, change: Change) {
        let event = TurtleEvent {
            delay: self.delay,
            change,
            path: &self.path,
        };
        for (_, listener) in &self.listeners {
            listener.turtle_changed(&event);
        }
    }

    // State

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Heading rounded to whole degrees, in `0..360`
    pub fn heading_rounded(&self) -> u32 {
        (self.heading.round() as u32) % 360
    }

    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Transitions

    /// Set the animation delay in milliseconds
    pub fn set_delay(&mut self, milliseconds: i64) -> Result<()> {
        let new = u64::try_from(milliseconds)
            .map_err(|_| EngineError::NegativeDelay(milliseconds))?;
        let old = self.delay;
        self.delay = new;
        debug!(old, new, "delay");
        self.notify(Change::Delay { old, new });
        Ok(())
    }

    /// Turn counter-clockwise
    pub fn left(&mut self, degrees: f64) -> Result<()> {
        self.rotate(degrees)
    }

    /// Turn clockwise
    pub fn right(&mut self, degrees: f64) -> Result<()> {
        self.rotate(-degrees)
    }

    /// Add `delta` degrees to the heading and normalize into `[0, 360)`
    pub fn rotate(&mut self, delta: f64) -> Result<()> {
        finite("angle", delta)?;
        let old = self.heading;
        self.heading = normalize_degrees(old + delta);
        debug!(old, new = self.heading, "heading");
        self.notify(Change::Heading {
            old,
            new: self.heading,
        });
        Ok(())
    }

    pub fn forward(&mut self, distance: f64) -> Result<()> {
        self.advance(distance)
    }

    pub fn backward(&mut self, distance: f64) -> Result<()> {
        self.advance(-distance)
    }

    /// Move along the heading, drawing if the pen is down.
    ///
    /// With a delay the motion is animated in sub-steps; each one is
    /// announced and followed by a pause. A cancelled pause commits the
    /// motion up to the sub-step reached and returns `Cancelled`.
    pub fn advance(&mut self, distance: f64) -> Result<()> {
        finite("distance", distance)?;
        let start = self.position;
        let radians = self.heading.to_radians();
        let (dx, dy) = (radians.cos(), radians.sin());
        let along = |d: f64| Point::new(start.x + d * dx, start.y + d * dy);

        if self.pen_down && self.fresh_subpath {
            self.path.move_to(start);
            self.fresh_subpath = false;
        }

        if self.delay > 0 {
            let pause = Duration::from_millis(self.delay);
            let (steps, step) = animation_steps(distance, self.step_length);
            for i in 1..steps {
                let old = self.position;
                self.position = along(i as f64 * step);
                trace!(x = self.position.x, y = self.position.y, "sub-step");
                self.notify(Change::Position {
                    old,
                    new: self.position,
                });
                if !self.cancel.sleep(pause) {
                    warn!(x = self.position.x, y = self.position.y, "motion cancelled");
                    self.commit_motion();
                    return Err(TurtleError::Cancelled);
                }
            }
        }

        let old = self.position;
        self.position = along(distance);
        self.commit_motion();
        debug!(distance, x = self.position.x, y = self.position.y, "advance");
        self.notify(Change::Position {
            old,
            new: self.position,
        });
        Ok(())
    }

    /// Record the motion to the current position in the path
    fn commit_motion(&mut self) {
        if self.pen_down {
            self.path.line_to(self.position);
        } else {
            self.path.move_to(self.position);
            self.fresh_subpath = true;
        }
    }

    pub fn pen_up(&mut self) {
        self.set_pen(false);
    }

    pub fn pen_down(&mut self) {
        self.set_pen(true);
    }

    /// Lift or lower the pen. Lowering a lifted pen makes the next motion
    /// start a new subpath.
    pub fn set_pen(&mut self, down: bool) {
        let old = self.pen_down;
        if down && !old {
            self.fresh_subpath = true;
        }
        self.pen_down = down;
        debug!(down, "pen");
        self.notify(Change::Pen { old, new: down });
    }

    /// Clear the path and return to the origin, heading 0, pen down.
    /// The delay is kept.
    pub fn reset(&mut self) {
        self.path.clear();
        self.position = Point::ORIGIN;
        self.heading = 0.0;
        self.pen_down = true;
        self.fresh_subpath = true;
        debug!("reset");
        self.notify(Change::Reset);
    }
}

/// Wrap an angle in degrees into `[0, 360)`
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative angles up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Number of sub-steps for an animated motion and the signed length of each.
/// The count never exceeds `MAX_ANIMATION_STEPS`.
fn animation_steps(distance: f64, step_length: f64) -> (u64, f64) {
    let steps = (distance.abs() / step_length).ceil();
    if steps > MAX_ANIMATION_STEPS as f64 {
        (MAX_ANIMATION_STEPS, distance / MAX_ANIMATION_STEPS as f64)
    } else {
        (steps as u64, step_length.copysign(distance))
    }
}

fn finite(what: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::NotFinite { what, value }.into())
    }
}

impl Default for Turtle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Turtle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Turtle")
            .field("position", &self.position)
            .field("heading", &self.heading)
            .field("pen_down", &self.pen_down)
            .field("delay", &self.delay)
            .field("path", &self.path)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Status line: pen symbol, heading, position and delay
impl fmt::Display for Turtle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:3}° {:7.1} {:7.1}  {}ms",
            if self.pen_down { "▼" } else { "△" },
            self.heading_rounded(),
            self.position.x,
            self.position.y,
            self.delay
        )
    }
}
