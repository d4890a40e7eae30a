/// Per-URL processing states
///
/// Every URL in a batch walks this machine from `Pending` to exactly one
/// terminal state.
use serde::Serialize;
use std::fmt;

/// Represents where a URL currently is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlState {
    // ===== Active States =====
    /// Accepted into the batch, nothing done yet
    Pending,

    /// Being checked by the URL validator
    Validating,

    /// Waiting on the rate limiter or the network
    Fetching,

    /// Turning the fetched body into text
    Extracting,

    /// Being categorized and quality scored
    Scoring,

    // ===== Terminal States =====
    /// A record with content was produced
    Completed,

    /// An unrecoverable failure; the record still exists but carries the error
    Errored,
}

impl UrlState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }

    /// Returns true if the machine allows moving from `self` to `next`
    ///
    /// The happy path is strictly linear. `Errored` is reachable from every
    /// non-terminal state; terminal states have no exits.
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Errored {
            return true;
        }
        matches!(
            (self, next),
            (Self::Pending, Self::Validating)
                | (Self::Validating, Self::Fetching)
                | (Self::Fetching, Self::Extracting)
                | (Self::Extracting, Self::Scoring)
                | (Self::Scoring, Self::Completed)
        )
    }

    /// Converts the state to its snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validating => "validating",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Scoring => "scoring",
            Self::Completed => "completed",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
