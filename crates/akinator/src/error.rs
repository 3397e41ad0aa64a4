//! Session client errors.

use crate::config::ConfigError;
use crate::transport::TransportError;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Classification of a server-reported completion code.
///
/// The raw code is always kept alongside; this only names the codes the
/// service is known to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum RejectionKind {
    /// `KO - SERVER DOWN`
    #[display("server down")]
    ServerDown,
    /// `KO - TECHNICAL ERROR`
    #[display("technical error")]
    TechnicalError,
    /// `KO - TIMEOUT`: the remote session expired.
    #[display("session timed out")]
    TimedOut,
    /// `WARN - NO QUESTION`: the question pool is exhausted.
    #[display("no more questions")]
    NoMoreQuestions,
    /// Any other non-OK code.
    #[display("other")]
    Other,
}

impl RejectionKind {
    /// Classifies a raw completion code.
    pub fn classify(code: &str) -> Self {
        match code {
            "KO - SERVER DOWN" => RejectionKind::ServerDown,
            "KO - TECHNICAL ERROR" => RejectionKind::TechnicalError,
            "KO - TIMEOUT" => RejectionKind::TimedOut,
            "WARN - NO QUESTION" => RejectionKind::NoMoreQuestions,
            _ => RejectionKind::Other,
        }
    }
}

/// Error returned by every session operation.
///
/// Local validation failures (`InvalidConfig`, `InvalidAnswer`, `NotBootstrapped`,
/// `CantGoBackAnyFurther`, `UnknownRegion`) happen before any request is
/// sent. None of the variants leave a partially updated session behind.
#[derive(Debug, Clone, Display, Error)]
pub enum AkinatorError {
    /// The client configuration holds unusable values.
    #[display("{source}")]
    InvalidConfig {
        /// Underlying configuration error.
        source: ConfigError,
    },

    /// The region selector matched no known language.
    #[display("Unknown region: {selector:?}")]
    UnknownRegion {
        /// The selector as given.
        #[error(not(source))]
        selector: String,
    },

    /// The client identity tokens could not be obtained.
    #[display("Identity fetch failed: {reason}")]
    IdentityFetchFailed {
        /// What went wrong.
        #[error(not(source))]
        reason: String,
    },

    /// The answer was not an id in 0..=4 or a recognized synonym.
    #[display("Invalid answer: {input:?}")]
    InvalidAnswer {
        /// The rejected input.
        #[error(not(source))]
        input: String,
    },

    /// A step operation was attempted before a successful bootstrap.
    #[display("Session not started; call start() first")]
    NotBootstrapped,

    /// `back()` was called on the first question.
    #[display("Already on the first question; can't go back any further")]
    CantGoBackAnyFurther,

    /// Session creation returned a non-OK completion or a malformed body.
    #[display("Session rejected by server: {code}")]
    SessionRejected {
        /// Completion code exactly as reported.
        #[error(not(source))]
        code: String,
    },

    /// A step or guess request returned a non-OK completion.
    #[display("Request rejected by server: {code}")]
    ServerRejected {
        /// Completion code exactly as reported.
        #[error(not(source))]
        code: String,
    },

    /// Network, timeout, or malformed-document failure.
    #[display("{source}")]
    TransportFailure {
        /// Underlying transport error.
        source: TransportError,
    },
}

impl AkinatorError {
    /// The server-reported completion code, for rejection variants.
    pub fn rejection_code(&self) -> Option<&str> {
        match self {
            AkinatorError::SessionRejected { code } | AkinatorError::ServerRejected { code } => {
                Some(code)
            }
            _ => None,
        }
    }

    /// Classification of the completion code, for rejection variants.
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        self.rejection_code().map(RejectionKind::classify)
    }

    /// Whether the error was raised locally, before any network I/O.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AkinatorError::InvalidConfig { .. }
                | AkinatorError::UnknownRegion { .. }
                | AkinatorError::InvalidAnswer { .. }
                | AkinatorError::NotBootstrapped
                | AkinatorError::CantGoBackAnyFurther
        )
    }
}

impl From<ConfigError> for AkinatorError {
    fn from(source: ConfigError) -> Self {
        AkinatorError::InvalidConfig { source }
    }
}

impl From<TransportError> for AkinatorError {
    fn from(source: TransportError) -> Self {
        AkinatorError::TransportFailure { source }
    }
}
