//! Akinator session client.
//!
//! Drives one game against the remote guessing-game service: bootstrap a
//! session, answer or take back questions, and fetch the current guess.
//!
//! # Architecture
//!
//! - **Transport**: one GET per call, returns a JSON document or a
//!   [`TransportError`]. Swappable through the [`Transport`] trait.
//! - **Session client**: [`Akinator`] owns all protocol state and turns every
//!   non-OK completion into a typed [`AkinatorError`].
//! - **Collaborators**: [`RegionTable`] for endpoint lookup and
//!   [`IdentityProvider`] for the ephemeral client tokens.
//!
//! # Example
//!
//! ```no_run
//! use akinator::{Akinator, Answer, ClientConfig};
//!
//! # async fn example() -> Result<(), akinator::AkinatorError> {
//! let mut aki = Akinator::connect(&ClientConfig::default())?;
//! println!("{}", aki.start(Some("en")).await?);
//! println!("{}", aki.answer(Answer::Yes).await?);
//! if aki.progression().unwrap_or_default() > 85.0 {
//!     let candidate = aki.guess().await?;
//!     println!("{:?}", candidate.name());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod answer;
mod config;
mod error;
mod identity;
mod protocol;
mod region;
mod session;
mod transport;

// Crate-level exports - Answers
pub use answer::{Answer, AnswerInput};

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError};

// Crate-level exports - Errors
pub use error::{AkinatorError, RejectionKind};

// Crate-level exports - Client identity
pub use identity::{ClientIdentity, IdentityProvider, PageIdentityProvider, extract_identity};

// Crate-level exports - Wire protocol
pub use protocol::{
    Candidate, Credentials, Guess, SUCCESS, StepPosition, answer_target, back_target,
    decode_candidates, decode_new_session, decode_step, decode_top_candidate, list_target,
    new_session_target,
};

// Crate-level exports - Regions
pub use region::{Language, RegionTable, Server};

// Crate-level exports - Session client
pub use session::{Akinator, Session};

// Crate-level exports - Transport
pub use transport::{HttpTransport, Transport, TransportError, TransportErrorKind};

// Re-exported so implementors of `Transport` need not depend on reqwest.
pub use reqwest::Url;
