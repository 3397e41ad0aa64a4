//! The session client: one game against the remote service.
//!
//! [`Akinator`] starts uninitialized. [`Akinator::start`] moves it to the
//! active state by creating a remote session; from then on `answer`, `back`
//! and `guess` each perform one round trip and either commit the server's
//! reply in full or leave the [`Session`] untouched.
//!
//! Operations take `&mut self`, so a single client can never have two
//! requests in flight. Independent clients share nothing and may run in
//! parallel, even over the same [`Transport`].

use crate::answer::AnswerInput;
use crate::config::ClientConfig;
use crate::error::AkinatorError;
use crate::identity::{ClientIdentity, IdentityProvider, PageIdentityProvider};
use crate::protocol::{self, Candidate, Credentials, Guess, StepPosition};
use crate::region::{RegionTable, Server};
use crate::transport::{HttpTransport, Transport};
use derive_getters::Getters;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// State of an active game.
///
/// `server`, `credentials` and `identity` are fixed at bootstrap. The step
/// position only ever changes as a whole, from a successful server reply.
#[derive(Debug, Clone, PartialEq, Getters, Serialize)]
pub struct Session {
    /// Endpoint the session lives on.
    server: Server,
    /// Server-issued session id and signature.
    credentials: Credentials,
    /// Client identity used to create the session.
    identity: ClientIdentity,
    /// Current question, progression and step.
    position: StepPosition,
    /// Top candidate from the most recent successful guess.
    last_guess: Option<Guess>,
}

impl Session {
    /// Server-issued session id.
    pub fn session_id(&self) -> &str {
        self.credentials.session()
    }

    /// Server-issued signature.
    pub fn signature(&self) -> &str {
        self.credentials.signature()
    }

    /// Question awaiting an answer.
    pub fn question(&self) -> &str {
        self.position.question()
    }

    /// Server-reported progression, as sent.
    pub fn progression(&self) -> f64 {
        *self.position.progression()
    }

    /// Zero-based step index.
    pub fn step(&self) -> u32 {
        *self.position.step()
    }
}

/// Client for one guessing-game session.
#[derive(Debug)]
pub struct Akinator {
    transport: Arc<dyn Transport>,
    identity: Arc<dyn IdentityProvider>,
    regions: RegionTable,
    session: Option<Session>,
}

impl Akinator {
    /// Creates a client over `transport`, scraping identities from the page
    /// named in `config` and applying its endpoint overrides.
    #[instrument(skip_all)]
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Result<Self, AkinatorError> {
        config.validate()?;
        let identity = PageIdentityProvider::from_str_url(Arc::clone(&transport), config.identity_url())?;
        let regions = RegionTable::from_config(config)?;
        Ok(Self::with_parts(transport, Arc::new(identity), regions))
    }

    /// Creates a client over a fresh HTTP transport built from `config`.
    #[instrument(skip_all)]
    pub fn connect(config: &ClientConfig) -> Result<Self, AkinatorError> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Self::new(Arc::new(transport), config)
    }

    /// Assembles a client from explicit collaborators.
    pub fn with_parts(
        transport: Arc<dyn Transport>,
        identity: Arc<dyn IdentityProvider>,
        regions: RegionTable,
    ) -> Self {
        Self {
            transport,
            identity,
            regions,
            session: None,
        }
    }

    /// The active session, or `None` before a successful [`start`](Self::start).
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a session has been started.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Current question, if active.
    pub fn question(&self) -> Option<&str> {
        self.session.as_ref().map(Session::question)
    }

    /// Current progression, if active.
    pub fn progression(&self) -> Option<f64> {
        self.session.as_ref().map(Session::progression)
    }

    /// Current step, if active.
    pub fn step(&self) -> Option<u32> {
        self.session.as_ref().map(Session::step)
    }

    /// Top candidate from the last successful [`guess`](Self::guess).
    pub fn last_guess(&self) -> Option<&Guess> {
        self.session.as_ref().and_then(|s| s.last_guess.as_ref())
    }

    /// Starts a new game and returns the first question.
    ///
    /// `region` is a language code or verbose name; `None` selects English.
    /// Calling this again abandons the current game for a new one; if the
    /// new bootstrap fails, the current game is kept.
    #[instrument(skip(self))]
    pub async fn start(&mut self, region: Option<&str>) -> Result<String, AkinatorError> {
        let server = self.regions.resolve(region)?;
        let identity = self.identity.fetch_client_identity().await?;

        let target = protocol::new_session_target(&server, &identity)?;
        let document = self.fetch(&target).await?;
        let (credentials, position) = protocol::decode_new_session(&document)?;

        info!(
            server = %server,
            step = *position.step(),
            progression = *position.progression(),
            "Session started"
        );

        let question = position.question().clone();
        self.session = Some(Session {
            server,
            credentials,
            identity,
            position,
            last_guess: None,
        });
        Ok(question)
    }

    /// Answers the current question and returns the next one.
    ///
    /// The answer is validated before anything is sent.
    #[instrument(skip(self, input))]
    pub async fn answer(&mut self, input: impl Into<AnswerInput>) -> Result<String, AkinatorError> {
        let input: AnswerInput = input.into();
        let answer = input.resolve().inspect_err(|e| {
            warn!(error = %e, "Rejected answer before sending");
        })?;
        let session = self.active()?;

        let target =
            protocol::answer_target(&session.server, &session.credentials, session.step(), answer)?;
        let document = self.fetch(&target).await?;
        let position = protocol::decode_step(&document)?;

        info!(answer = %answer, step = *position.step(), "Answered");
        Ok(self.commit(position))
    }

    /// Returns to the previous question.
    ///
    /// Fails locally with [`AkinatorError::CantGoBackAnyFurther`] on step 0.
    /// The server decides what the previous question was.
    #[instrument(skip(self))]
    pub async fn back(&mut self) -> Result<String, AkinatorError> {
        let session = self.active()?;
        let step = session.step();
        if step == 0 {
            warn!("Back requested on the first question");
            return Err(AkinatorError::CantGoBackAnyFurther);
        }

        let target = protocol::back_target(&session.server, &session.credentials, step)?;
        let document = self.fetch(&target).await?;
        let position = protocol::decode_step(&document)?;

        info!(from = step, to = *position.step(), "Went back");
        Ok(self.commit(position))
    }

    /// Fetches the current best guess.
    ///
    /// Stores name, description and picture as [`Akinator::last_guess`] and
    /// returns the complete record. Does not change the step; may be called
    /// at any point of an active game.
    #[instrument(skip(self))]
    pub async fn guess(&mut self) -> Result<Candidate, AkinatorError> {
        let document = self.fetch_list().await?;
        let top = protocol::decode_top_candidate(&document)?;
        let guess = top.to_guess();

        info!(name = ?guess.name(), "Guessed");
        if let Some(session) = self.session.as_mut() {
            session.last_guess = Some(guess);
        }
        Ok(top)
    }

    /// Fetches the whole guess list without storing anything.
    #[instrument(skip(self))]
    pub async fn candidates(&self) -> Result<Vec<Candidate>, AkinatorError> {
        let document = self.fetch_list().await?;
        protocol::decode_candidates(&document)
    }

    async fn fetch_list(&self) -> Result<Value, AkinatorError> {
        let session = self.active()?;
        let target = protocol::list_target(&session.server, &session.credentials, session.step())?;
        self.fetch(&target).await
    }

    fn active(&self) -> Result<&Session, AkinatorError> {
        self.session.as_ref().ok_or_else(|| {
            warn!("Operation attempted before start()");
            AkinatorError::NotBootstrapped
        })
    }

    async fn fetch(&self, target: &Url) -> Result<Value, AkinatorError> {
        self.transport.get_document(target).await.map_err(|e| {
            error!(error = %e, path = target.path(), "Transport failure");
            AkinatorError::from(e)
        })
    }

    /// Replaces the step position. Only called with a fully decoded reply.
    fn commit(&mut self, position: StepPosition) -> String {
        let question = position.question().clone();
        if let Some(session) = self.session.as_mut() {
            session.position = position;
        }
        question
    }
}
