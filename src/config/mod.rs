//! Run configuration

/// Initial animation delay in milliseconds
pub const DEFAULT_DELAY_MS: u64 = 0;
/// Length of one animation sub-step in plane units
pub const DEFAULT_STEP_LENGTH: f64 = 1.0;
/// Rotation applied by `left`/`right` without an argument
pub const DEFAULT_TURN_DEGREES: f64 = 90.0;
/// Upper bound on the sub-steps of one animated motion; longer motions take
/// proportionally longer steps
pub const MAX_ANIMATION_STEPS: u64 = 1_000;

/// Settings for an interpreter and its turtle
#[derive(Debug, Clone, PartialEq)]
pub struct TurtleConfig {
    /// Delay the turtle starts with (scripts may change it)
    pub delay: u64,
    /// Distance covered between two animation pauses
    pub step_length: f64,
    /// Keep variables from one `run` to the next
    pub retain_variables: bool,
}

impl TurtleConfig {
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_DELAY_MS,
            step_length: DEFAULT_STEP_LENGTH,
            retain_variables: false,
        }
    }

    pub fn with_delay(mut self, delay: u64) -> Self {
        self.delay = delay;
        self
    }

    /// Non-positive or non-finite lengths fall back to the default
    pub fn with_step_length(mut self, step_length: f64) -> Self {
        self.step_length = if step_length.is_finite() && step_length > 0.0 {
            step_length
        } else {
            DEFAULT_STEP_LENGTH
        };
        self
    }

    pub fn with_retained_variables(mut self, retain: bool) -> Self {
        self.retain_variables = retain;
        self
    }
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self::new()
    }
}
