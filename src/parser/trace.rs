//! Progress narration for the scanner and parser
//!
//! Both stages take a [`Trace`] at construction and report to it at fixed
//! points: the scanner after every emitted token, the parser whenever a rule
//! or terminal is attempted, matched, skipped or fails. Tracing never feeds
//! back into control flow, so swapping the tracer cannot change a result.
//!
//! - [`NoTrace`]: the default; does nothing.
//! - [`LogTrace`]: forwards everything to [`tracing`] at `DEBUG` level.

use super::lexer::Token;
use std::fmt;

/// Where in a rule's lifecycle a trace event was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracePhase {
    Attempt,
    Matched,
    NoMatch,
    Failed,
}

impl fmt::Display for TracePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TracePhase::Attempt => "attempting to match",
            TracePhase::Matched => "matched",
            TracePhase::NoMatch => "did not match",
            TracePhase::Failed => "failed",
        };
        f.write_str(text)
    }
}

/// One parser trace point.
#[derive(Debug, Clone, Copy)]
pub struct TraceEvent<'a> {
    pub phase: TracePhase,
    /// Production name, or the terminal text / kind being matched.
    pub rule: &'a str,
    /// Cursor position when the event was raised.
    pub position: usize,
    /// Token under the cursor, `None` at end of stream.
    pub token: Option<&'a Token>,
}

/// Observer injected into the scanner and parser.
pub trait Trace {
    fn token(&self, _token: &Token) {}

    fn event(&self, _event: &TraceEvent<'_>) {}
}

/// Tracer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl Trace for NoTrace {}

/// Tracer that emits `tracing` debug events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTrace;

impl Trace for LogTrace {
    fn token(&self, token: &Token) {
        tracing::debug!(
            target: "oberon07::scanner",
            kind = %token.kind,
            line = token.location.line,
            column = token.location.column,
            "emitted {:?}",
            token.text
        );
    }

    fn event(&self, event: &TraceEvent<'_>) {
        match event.token {
            Some(token) => tracing::debug!(
                target: "oberon07::parser",
                rule = event.rule,
                position = event.position,
                token = %token.text,
                line = token.location.line,
                column = token.location.column,
                "{} {}",
                event.phase,
                event.rule
            ),
            None => tracing::debug!(
                target: "oberon07::parser",
                rule = event.rule,
                position = event.position,
                "{} {} at end of stream",
                event.phase,
                event.rule
            ),
        }
    }
}
