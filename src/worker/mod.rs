//! Background script runs
//!
//! A `RunWorker` moves an interpreter onto its own thread so the caller stays
//! responsive while an animated script plays. The interpreter (and with it
//! the turtle and the variables) belongs to that thread until `join` hands it
//! back, so two runs can never share state.

use crate::cancel::CancelToken;
use crate::error::ScriptError;
use crate::executor::Interpreter;
use std::io;
use std::panic;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// The interpreter returned by a finished run, and how the run ended
#[derive(Debug)]
pub struct RunOutcome {
    pub interpreter: Interpreter,
    pub result: Result<(), ScriptError>,
}

/// A script running on a background thread
#[derive(Debug)]
pub struct RunWorker {
    cancel: CancelToken,
    handle: JoinHandle<RunOutcome>,
}

impl RunWorker {
    /// Start running `script` on a new thread
    pub fn spawn(mut interpreter: Interpreter, script: impl Into<String>) -> io::Result<Self> {
        let script = script.into();
        let cancel = interpreter.cancel_token();
        let handle = thread::Builder::new()
            .name("turtle-run".to_string())
            .spawn(move || {
                let result = interpreter.run(&script);
                match &result {
                    Ok(()) => info!("worker finished"),
                    Err(err) if err.is_cancelled() => warn!(line = err.line, "worker cancelled"),
                    Err(err) => warn!(%err, "worker failed"),
                }
                RunOutcome {
                    interpreter,
                    result,
                }
            })?;
        Ok(Self { cancel, handle })
    }

    /// Ask the run to stop at the next line or animation pause
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the run to end. A panic on the worker thread is resumed here.
    pub fn join(self) -> RunOutcome {
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}
