use std::sync::Arc;

use parking_lot::Mutex;
use turtle_script::{
    evaluate, Change, CommandError, Environment, EvaluationError, Interpreter, Point, Segment,
    TurtleError, TurtleEvent, TurtleListener,
};

const EPSILON: f64 = 1e-9;

/// Helper to run a script that must succeed
fn run_script(script: &str) -> Interpreter {
    let mut interpreter = Interpreter::new();
    interpreter.run(script).unwrap();
    interpreter
}

fn assert_point(actual: Point, x: f64, y: f64) {
    assert!(
        (actual.x - x).abs() < EPSILON && (actual.y - y).abs() < EPSILON,
        "expected ({x}, {y}), got {actual:?}"
    );
}

/// Keeps a copy of every event's change and path size
#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<(Change, usize)>>,
}

impl TurtleListener for EventLog {
    fn turtle_changed(&self, event: &TurtleEvent<'_>) {
        self.events.lock().push((event.change, event.path.len()));
    }
}

#[test]
fn test_precedence() {
    let env = Environment::new();
    assert_eq!(evaluate("2 + 3 * 4", &env).unwrap().as_f64(), 14.0);
    assert_eq!(evaluate("( 2 + 3 ) * 4", &env).unwrap().as_f64(), 20.0);
    assert_eq!(evaluate("2 ^ 3 ^ 2", &env).unwrap().as_f64(), 512.0);
}

#[test]
fn test_mismatched_parentheses_never_yield_value() {
    let env = Environment::new();
    for text in ["( 1 + 2", "1 + 2 )"] {
        assert_eq!(
            evaluate(text, &env),
            Err(EvaluationError::MismatchedParenthesis),
            "{text}"
        );
    }
}

#[test]
fn test_variable_round_trip() {
    let interpreter = run_script("x = 3 + 4");
    let value = evaluate("x", interpreter.variables()).unwrap();
    assert_eq!(value.as_f64(), 7.0);

    let interpreter = run_script("x = 3 + 4\nx = 1");
    assert_eq!(evaluate("x", interpreter.variables()).unwrap().as_f64(), 1.0);
}

#[test]
fn test_forward_left_forward() {
    let interpreter = run_script("forward 10\nleft 90\nforward 10");
    let turtle = interpreter.turtle();
    assert_point(turtle.position(), 10.0, 10.0);

    let segments = turtle.path().segments();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0], Segment::MoveTo(Point::ORIGIN));
    assert!(segments[1..].iter().all(|s| matches!(s, Segment::LineTo(_))));
}

#[test]
fn test_square_returns_home() {
    let interpreter = run_script(
        "side = 25\n\
         forward side\nleft\n\
         forward side\nleft\n\
         forward side\nleft\n\
         forward side\nleft\n",
    );
    let turtle = interpreter.turtle();
    assert_point(turtle.position(), 0.0, 0.0);
    assert_eq!(turtle.heading(), 0.0);
    assert_eq!(turtle.path().line_count(), 4);
    assert!((turtle.path().drawn_length() - 100.0).abs() < EPSILON);
}

#[test]
fn test_pen_up_motion_then_pen_down() {
    let interpreter = run_script("forward 10\nup\nright\nforward 5\ndown\nforward 5");
    let turtle = interpreter.turtle();
    assert_point(turtle.position(), 10.0, -10.0);
    assert_eq!(turtle.path().line_count(), 2);

    let segments = turtle.path().segments();
    match segments[2] {
        Segment::MoveTo(p) => assert_point(p, 10.0, -5.0),
        other => panic!("expected a move at the cursor, got {other:?}"),
    }
    match segments[3] {
        Segment::LineTo(p) => assert_point(p, 10.0, -10.0),
        other => panic!("expected a line, got {other:?}"),
    }
}

#[test]
fn test_reset_preserves_delay() {
    let interpreter = run_script("forward 10\nleft 30\nup\ndelay 3\nreset");
    let turtle = interpreter.turtle();
    assert!(turtle.path().is_empty());
    assert_eq!(turtle.position(), Point::ORIGIN);
    assert_eq!(turtle.heading(), 0.0);
    assert!(turtle.is_pen_down());
    assert_eq!(turtle.delay(), 3);
}

#[test]
fn test_unknown_verb_reports_line() {
    let mut interpreter = Interpreter::new();
    let err = interpreter
        .run("# comment\nforward 1\n\nturn 90\nforward 1")
        .unwrap_err();
    assert_eq!(err.line, 4);
    assert_eq!(err.text, "turn 90");
    assert!(matches!(
        err.error,
        TurtleError::Command(CommandError::UnknownCommand(_))
    ));
    assert_eq!(interpreter.turtle().path().line_count(), 1);
}

#[test]
fn test_missing_argument_reports_line() {
    let mut interpreter = Interpreter::new();
    let err = interpreter.run("left\nright 45\nbackward").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(
        err.error,
        TurtleError::Command(CommandError::MissingArgument("backward"))
    );
    assert_eq!(interpreter.turtle().heading(), 45.0);
}

#[test]
fn test_empty_name_reports_line() {
    let mut interpreter = Interpreter::new();
    let err = interpreter.run("a = 1\n = 2").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.error, TurtleError::Command(CommandError::EmptyName));
}

#[test]
fn test_listeners_see_committed_state() {
    let mut interpreter = Interpreter::new();
    let log = Arc::new(EventLog::default());
    interpreter.turtle_mut().add_listener(log.clone());

    interpreter.run("forward 2\nup\nforward 2\nreset").unwrap();

    let events = log.events.lock();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], (Change::Position { .. }, 2)));
    assert_eq!(events[1], (Change::Pen { old: true, new: false }, 2));
    assert!(matches!(events[2], (Change::Position { .. }, 3)));
    assert_eq!(events[3], (Change::Reset, 0));
}

#[test]
fn test_case_insensitive_script() {
    let interpreter = run_script("FORWARD 4\nLeft\nMove 4\nPenUp\nBACK 4");
    let turtle = interpreter.turtle();
    assert_point(turtle.position(), 4.0, 0.0);
    assert!(!turtle.is_pen_down());
}
