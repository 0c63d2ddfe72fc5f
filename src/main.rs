use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use turtle_script::{Interpreter, RunWorker, TurtleConfig};

const USAGE: &str = "usage: turtle-script [--delay MS] [--step LEN] [--retain] [FILE]";

/// Command-line options
#[derive(Debug, Default)]
struct Options {
    config: TurtleConfig,
    script: Option<String>,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut options = Options::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--delay" => {
                    let value = args.next().ok_or("--delay needs a value")?;
                    let delay = value
                        .parse()
                        .map_err(|_| format!("invalid delay \"{value}\""))?;
                    options.config = options.config.with_delay(delay);
                }
                "--step" => {
                    let value = args.next().ok_or("--step needs a value")?;
                    let step = value
                        .parse()
                        .map_err(|_| format!("invalid step length \"{value}\""))?;
                    options.config = options.config.with_step_length(step);
                }
                "--retain" => options.config = options.config.with_retained_variables(true),
                _ => {
                    if arg.starts_with("--") {
                        return Err(format!("unknown option {arg}"));
                    }
                    if options.script.is_some() {
                        return Err(format!("unexpected argument {arg}"));
                    }
                    options.script = Some(arg);
                }
            }
        }
        Ok(options)
    }
}

fn main() -> ExitCode {
    init_tracing();

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("turtle-script: {message}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match options.script {
        Some(file) => run_file(&file, options.config),
        None => interactive(options.config),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (warnings only by default)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn run_file(file: &str, config: TurtleConfig) -> ExitCode {
    let script = match fs::read_to_string(file) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("turtle-script: can't read \"{file}\": {e}");
            return ExitCode::FAILURE;
        }
    };

    let worker = match RunWorker::spawn(Interpreter::with_config(config), script) {
        Ok(worker) => worker,
        Err(e) => {
            eprintln!("turtle-script: can't start run: {e}");
            return ExitCode::FAILURE;
        }
    };
    let outcome = worker.join();
    let turtle = outcome.interpreter.turtle();

    print!("{}", turtle.path());
    println!("{turtle}");

    match outcome.result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error at line {}: {}", e.line, e.error);
            eprintln!("  {}", e.text.trim());
            ExitCode::FAILURE
        }
    }
}

fn interactive(config: TurtleConfig) -> ExitCode {
    let mut interpreter = Interpreter::with_config(config);
    let stdin = io::stdin();
    match prompt(&mut interpreter, stdin.lock(), io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("turtle-script: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Read-execute loop over `input`, answering on `output`
fn prompt(
    interpreter: &mut Interpreter,
    mut input: impl BufRead,
    mut output: impl Write,
) -> io::Result<()> {
    writeln!(output, "Turtle Script v{}", env!("CARGO_PKG_VERSION"))?;
    writeln!(output, "Type 'EXIT' to quit, 'HELP' for help\n")?;

    let mut line_buffer = String::new();
    let mut line_number = 0;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        line_buffer.clear();
        if input.read_line(&mut line_buffer)? == 0 {
            return Ok(());
        }
        line_number += 1;
        let command = line_buffer.trim();

        if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
            writeln!(output, "Goodbye!")?;
            return Ok(());
        }
        if command.eq_ignore_ascii_case("help") {
            print_help(&mut output)?;
            continue;
        }
        if command.eq_ignore_ascii_case("path") {
            write!(output, "{}", interpreter.turtle().path())?;
            continue;
        }
        if command.eq_ignore_ascii_case("state") {
            writeln!(output, "{}", interpreter.turtle())?;
            continue;
        }
        if command.eq_ignore_ascii_case("vars") {
            for (name, value) in interpreter.variables().sorted() {
                writeln!(output, "{name} = {value}")?;
            }
            continue;
        }

        if let Err(e) = interpreter.execute_line(line_number, command) {
            writeln!(output, "Error: {}", e.error)?;
        }
    }
}

fn print_help(output: &mut impl Write) -> io::Result<()> {
    writeln!(output, "Turtle Script - Available Commands:")?;
    writeln!(output)?;
    writeln!(output, "Turtle:")?;
    writeln!(output, "  forward EXPR   (move)      - Move ahead, drawing if the pen is down")?;
    writeln!(output, "  backward EXPR  (back)      - Move back")?;
    writeln!(output, "  left [EXPR]                - Turn counter-clockwise (default 90)")?;
    writeln!(output, "  right [EXPR]               - Turn clockwise (default 90)")?;
    writeln!(output, "  up             (penup)     - Lift the pen")?;
    writeln!(output, "  down           (pendown)   - Lower the pen")?;
    writeln!(output, "  delay EXPR                 - Pause per step in milliseconds")?;
    writeln!(output, "  reset                      - Clear the path and return home")?;
    writeln!(output)?;
    writeln!(output, "Variables:")?;
    writeln!(output, "  size = 10 * 2              - Assign a variable")?;
    writeln!(output)?;
    writeln!(output, "Expressions use spaces between every number, name and operator:")?;
    writeln!(output, "  ( size + 1 ) * 2 ^ 3       - Operators: ( ) ^ * / % + -")?;
    writeln!(output)?;
    writeln!(output, "Prompt:")?;
    writeln!(output, "  PATH                       - Show the traced path")?;
    writeln!(output, "  STATE                      - Show pen, heading, position, delay")?;
    writeln!(output, "  VARS                       - List variables")?;
    writeln!(output, "  EXIT                       - Quit")?;
    writeln!(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run the prompt over `lines` and return everything it printed
    fn session(lines: &str) -> (Interpreter, String) {
        let mut interpreter = Interpreter::new();
        let mut output = Vec::new();
        prompt(&mut interpreter, lines.as_bytes(), &mut output).unwrap();
        (interpreter, String::from_utf8(output).unwrap())
    }

    /// A terminal that has gone away
    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    /// Accepts writes but cannot flush
    struct UnflushableOutput;

    impl Write for UnflushableOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "flush failed"))
        }
    }

    #[test]
    fn test_prompt_executes_lines() {
        let (interpreter, output) = session("side = 5\nforward side\nVARS\nPATH\nexit\nforward 1\n");
        assert_eq!(interpreter.turtle().path().line_count(), 1);
        assert!(output.contains("side = 5\n"));
        assert!(output.contains("move    0    0\nline    5    0\n"));
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_prompt_reports_errors_and_continues() {
        let (interpreter, output) = session("fly\nforward 2\n");
        assert!(output.contains("Error: invalid command \"fly\""), "{output}");
        assert_eq!(interpreter.turtle().path().line_count(), 1);
    }

    #[test]
    fn test_prompt_stops_at_end_of_input() {
        let (_, output) = session("");
        assert!(output.ends_with("> "));
    }

    #[test]
    fn test_prompt_propagates_output_errors() {
        let mut interpreter = Interpreter::new();
        let err = prompt(&mut interpreter, "forward 1\n".as_bytes(), ClosedOutput).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(interpreter.turtle().path().is_empty());
    }

    #[test]
    fn test_prompt_propagates_flush_errors() {
        let mut interpreter = Interpreter::new();
        let err = prompt(&mut interpreter, "forward 1\n".as_bytes(), UnflushableOutput).unwrap_err();
        assert_eq!(err.to_string(), "flush failed");
        assert!(interpreter.turtle().path().is_empty());
    }
}
