//! Per-call tracing scope opened by every generated method.

use std::cell::Cell;
use std::fmt::Display;

use tracing::{Span, field};

/// A tracing span that lives for one generated call.
///
/// The span is closed when the scope is dropped, so it ends on success,
/// early return, error and unwind alike. Errors recorded with
/// [`set_error`](Self::set_error) are attached to the span before it closes.
#[derive(Debug)]
pub struct InstrumentationScope {
    name: &'static str,
    span: Span,
    failed: Cell<bool>,
}

impl InstrumentationScope {
    pub fn start(name: &'static str) -> Self {
        let span = tracing::info_span!(
            "service_method",
            method = name,
            error = field::Empty,
            status = field::Empty,
        );
        tracing::trace!(parent: &span, "scope opened");
        Self {
            name,
            span,
            failed: Cell::new(false),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn is_error(&self) -> bool {
        self.failed.get()
    }

    /// Mark the scope as failed and record the error on the span
    pub fn set_error(&self, error: &dyn Display) {
        self.failed.set(true);
        let message = error.to_string();
        self.span.record("error", message.as_str());
        tracing::warn!(parent: &self.span, error = %message, "service method failed");
    }

    /// Record the response status observed inside this scope
    pub fn set_status(&self, status: u16) {
        self.span.record("status", status);
    }

    /// Run `f` inside the span, recording its error (if any) before the
    /// scope closes. The error is returned to the caller unchanged.
    pub fn run<T, E, F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        let result = self.span.in_scope(f);
        if let Err(error) = &result {
            self.set_error(error);
        }
        result
    }

    /// Close the scope explicitly; equivalent to dropping it
    pub fn close(self) {}
}

impl Drop for InstrumentationScope {
    fn drop(&mut self) {
        tracing::trace!(
            parent: &self.span,
            failed = self.failed.get(),
            "scope closed"
        );
    }
}
