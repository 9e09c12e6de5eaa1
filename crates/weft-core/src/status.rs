//! Event handler status and severity aggregation.

use std::fmt;

/// Severity of an [`EventStatus`], least to most severe.
///
/// The dispatcher combines per-handler statuses by keeping the most
/// severe one seen so far, so `Failed` is sticky for the remainder of a
/// dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// The handler ran but had no effect.
    DidNothing,
    /// The handler completed its work.
    Succeeded,
    /// The handler failed. The caller decides whether to halt.
    Failed,
}

/// Result of one update-event handler invocation.
///
/// Handler failures are data, not process errors: the dispatcher
/// aggregates them and returns the combined status so the caller can
/// choose a retry or halt policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventStatus {
    /// The handler ran but had no effect.
    DidNothing,
    /// The handler completed its work.
    Succeeded,
    /// The handler failed.
    Failed {
        /// Human-readable description of the failure.
        message: String,
    },
}

impl EventStatus {
    /// A status reporting that the handler had no effect.
    pub fn did_nothing() -> Self {
        Self::DidNothing
    }

    /// A status reporting success.
    pub fn succeeded() -> Self {
        Self::Succeeded
    }

    /// A status reporting failure with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// The severity of this status.
    pub fn severity(&self) -> Severity {
        match self {
            Self::DidNothing => Severity::DidNothing,
            Self::Succeeded => Severity::Succeeded,
            Self::Failed { .. } => Severity::Failed,
        }
    }

    /// Whether this status is a failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Replace `self` with `other` if `other` is strictly more severe.
    ///
    /// On equal severity the existing status is kept, so the first
    /// failure message reported wins.
    pub fn keep_more_severe(&mut self, other: EventStatus) {
        if other.severity() > self.severity() {
            *self = other;
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DidNothing => write!(f, "did nothing"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed { message } => write!(f, "failed: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_totally_ordered() {
        assert!(Severity::DidNothing < Severity::Succeeded);
        assert!(Severity::Succeeded < Severity::Failed);
    }

    #[test]
    fn keep_more_severe_upgrades() {
        let mut status = EventStatus::did_nothing();
        status.keep_more_severe(EventStatus::succeeded());
        assert_eq!(status, EventStatus::Succeeded);
        status.keep_more_severe(EventStatus::failed("boom"));
        assert!(status.is_failed());
    }

    #[test]
    fn keep_more_severe_never_downgrades() {
        let mut status = EventStatus::failed("first");
        status.keep_more_severe(EventStatus::succeeded());
        status.keep_more_severe(EventStatus::did_nothing());
        assert_eq!(status, EventStatus::failed("first"));
    }

    #[test]
    fn first_failure_message_wins() {
        let mut status = EventStatus::failed("first");
        status.keep_more_severe(EventStatus::failed("second"));
        assert_eq!(status, EventStatus::failed("first"));
    }
}
