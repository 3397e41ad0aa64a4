//! Wire protocol: request targets and response decoding.
//!
//! Four GET endpoints under `https://{server}/ws/`:
//!
//! | Operation | Path | Parameters |
//! |-----------|------|------------|
//! | bootstrap | `new_session` | partner, player, uid_ext_session, frontaddr, constraint |
//! | answer | `answer` | callback, session, signature, step, answer (0..=4) |
//! | back | `answer` | callback, session, signature, step, answer = -1 |
//! | guess | `list` | callback, session, signature, step |
//!
//! Every response carries a `completion` field; [`SUCCESS`] is the only
//! success value. The live service sends numbers as strings, so numeric
//! fields accept both forms.

use crate::answer::Answer;
use crate::error::AkinatorError;
use crate::identity::ClientIdentity;
use crate::region::Server;
use crate::transport::{TransportError, TransportErrorKind};
use derive_getters::Getters;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

/// Completion value meaning the request succeeded.
pub const SUCCESS: &str = "OK";

/// Answer id the service interprets as "go back one step".
const BACK_ANSWER_ID: &str = "-1";

const PARTNER: &str = "1";
const PLAYER: &str = "website-desktop";
const CONSTRAINT: &str = "ETAT<>'AV'";

/// Server-issued session credentials, sent with every step request.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Credentials {
    /// Session id.
    session: String,
    /// Session signature.
    signature: String,
}

impl Credentials {
    /// Creates credentials from the opaque server values.
    pub fn new(session: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            signature: signature.into(),
        }
    }
}

/// Question, progression and step reported by the server, always together.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct StepPosition {
    /// Question awaiting an answer.
    #[serde(deserialize_with = "lenient::string")]
    question: String,
    /// Server confidence estimate, nominally 0..=100 but never clamped.
    #[serde(deserialize_with = "lenient::float")]
    progression: f64,
    /// Zero-based index of the question.
    #[serde(deserialize_with = "lenient::integer")]
    step: u32,
}

impl StepPosition {
    /// Creates a step position.
    pub fn new(question: impl Into<String>, progression: f64, step: u32) -> Self {
        Self {
            question: question.into(),
            progression,
            step,
        }
    }
}

/// The stored part of a guess: name, description and picture.
///
/// Each field is kept as the server sent it; `None` means the field was
/// `null` or absent.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Guess {
    /// Name of the guessed character.
    name: Option<String>,
    /// Short description.
    description: Option<String>,
    /// Absolute URL of the character's picture.
    absolute_picture_path: Option<String>,
}

/// One entry of the guess list, with every field the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate {
    record: Map<String, Value>,
}

impl Candidate {
    /// Wraps a raw record.
    pub fn new(record: Map<String, Value>) -> Self {
        Self { record }
    }

    /// Candidate name, if present.
    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    /// Candidate description, if present.
    pub fn description(&self) -> Option<&str> {
        self.text("description")
    }

    /// Candidate picture URL, if present.
    pub fn absolute_picture_path(&self) -> Option<&str> {
        self.text("absolute_picture_path")
    }

    /// Any field as sent by the server.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    /// The full record.
    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    /// Consumes the candidate, returning the full record.
    pub fn into_record(self) -> Map<String, Value> {
        self.record
    }

    /// Extracts the stored [`Guess`].
    pub fn to_guess(&self) -> Guess {
        Guess {
            name: self.name().map(str::to_string),
            description: self.description().map(str::to_string),
            absolute_picture_path: self.absolute_picture_path().map(str::to_string),
        }
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.record.get(key).and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Request targets
// ---------------------------------------------------------------------------

#[track_caller]
fn target(server: &Server, path: &str, params: &[(&str, &str)]) -> Result<Url, AkinatorError> {
    let base = format!("https://{}/ws/{}", server.as_str(), path);
    Url::parse_with_params(&base, params).map_err(|e| {
        warn!(server = %server, path, error = %e, "Invalid request target");
        AkinatorError::from(TransportError::new(
            TransportErrorKind::InvalidTarget,
            format!("Invalid request target {}: {}", base, e),
        ))
    })
}

/// Session-creation target.
#[instrument(skip_all, fields(server = %server))]
pub fn new_session_target(server: &Server, identity: &ClientIdentity) -> Result<Url, AkinatorError> {
    target(
        server,
        "new_session",
        &[
            ("partner", PARTNER),
            ("player", PLAYER),
            ("uid_ext_session", identity.uid().as_str()),
            ("frontaddr", identity.front_addr().as_str()),
            ("constraint", CONSTRAINT),
        ],
    )
}

/// Answer target for the question at `step`.
#[instrument(skip_all, fields(server = %server, step = step, answer = %answer))]
pub fn answer_target(
    server: &Server,
    credentials: &Credentials,
    step: u32,
    answer: Answer,
) -> Result<Url, AkinatorError> {
    let step = step.to_string();
    let answer = answer.id().to_string();
    target(
        server,
        "answer",
        &[
            ("callback", ""),
            ("session", credentials.session().as_str()),
            ("signature", credentials.signature().as_str()),
            ("step", step.as_str()),
            ("answer", answer.as_str()),
        ],
    )
}

/// Back target; the server moves to `step - 1`.
#[instrument(skip_all, fields(server = %server, step = step))]
pub fn back_target(server: &Server, credentials: &Credentials, step: u32) -> Result<Url, AkinatorError> {
    let step = step.to_string();
    target(
        server,
        "answer",
        &[
            ("callback", ""),
            ("session", credentials.session().as_str()),
            ("signature", credentials.signature().as_str()),
            ("step", step.as_str()),
            ("answer", BACK_ANSWER_ID),
        ],
    )
}

/// Guess-list target.
#[instrument(skip_all, fields(server = %server, step = step))]
pub fn list_target(server: &Server, credentials: &Credentials, step: u32) -> Result<Url, AkinatorError> {
    let step = step.to_string();
    target(
        server,
        "list",
        &[
            ("callback", ""),
            ("session", credentials.session().as_str()),
            ("signature", credentials.signature().as_str()),
            ("step", step.as_str()),
        ],
    )
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Identification {
    #[serde(deserialize_with = "lenient::string")]
    session: String,
    #[serde(deserialize_with = "lenient::string")]
    signature: String,
}

#[derive(Deserialize)]
struct NewSessionParameters {
    identification: Identification,
    step_information: StepPosition,
}

#[derive(Deserialize)]
struct NewSessionBody {
    parameters: NewSessionParameters,
}

#[derive(Deserialize)]
struct StepBody {
    parameters: StepPosition,
}

#[derive(Deserialize)]
struct ListParameters {
    elements: Vec<Value>,
}

#[derive(Deserialize)]
struct ListBody {
    parameters: ListParameters,
}

#[track_caller]
fn malformed(what: &str, detail: impl std::fmt::Display) -> AkinatorError {
    AkinatorError::from(TransportError::new(
        TransportErrorKind::Decode,
        format!("Malformed {} response: {}", what, detail),
    ))
}

/// Reads the completion field verbatim.
///
/// A document without one is not a protocol response at all. Non-string
/// codes are rendered as their JSON text.
pub fn completion(document: &Value) -> Result<String, AkinatorError> {
    match document.get("completion") {
        Some(Value::String(code)) => Ok(code.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(malformed("protocol", "missing completion field")),
    }
}

/// Decodes a session-creation response.
///
/// Non-OK completions and malformed OK bodies are both
/// [`AkinatorError::SessionRejected`] carrying the reported code.
#[instrument(skip(document))]
pub fn decode_new_session(document: &Value) -> Result<(Credentials, StepPosition), AkinatorError> {
    let code = completion(document)?;
    if code != SUCCESS {
        warn!(code = %code, "Session creation rejected");
        return Err(AkinatorError::SessionRejected { code });
    }

    let body = NewSessionBody::deserialize(document).map_err(|e| {
        warn!(code = %code, error = %e, "Session creation response malformed");
        AkinatorError::SessionRejected { code: code.clone() }
    })?;

    let NewSessionParameters {
        identification,
        step_information,
    } = body.parameters;
    debug!(step = step_information.step, "Decoded new session");
    Ok((
        Credentials::new(identification.session, identification.signature),
        step_information,
    ))
}

/// Decodes an answer or back response.
#[instrument(skip(document))]
pub fn decode_step(document: &Value) -> Result<StepPosition, AkinatorError> {
    let code = completion(document)?;
    if code != SUCCESS {
        warn!(code = %code, "Step rejected");
        return Err(AkinatorError::ServerRejected { code });
    }

    let body = StepBody::deserialize(document).map_err(|e| malformed("step", e))?;
    debug!(step = body.parameters.step, progression = body.parameters.progression, "Decoded step");
    Ok(body.parameters)
}

fn list_elements(document: &Value) -> Result<Vec<Value>, AkinatorError> {
    let code = completion(document)?;
    if code != SUCCESS {
        warn!(code = %code, "Guess list rejected");
        return Err(AkinatorError::ServerRejected { code });
    }

    let body = ListBody::deserialize(document).map_err(|e| malformed("list", e))?;
    Ok(body.parameters.elements)
}

fn element_record(entry: Value) -> Option<Map<String, Value>> {
    match entry {
        Value::Object(mut entry) => match entry.remove("element") {
            Some(Value::Object(record)) => Some(record),
            _ => None,
        },
        _ => None,
    }
}

/// Decodes a guess-list response, in server order. Never empty.
///
/// Entries without an `element` object are skipped.
#[instrument(skip(document))]
pub fn decode_candidates(document: &Value) -> Result<Vec<Candidate>, AkinatorError> {
    let elements = list_elements(document)?;
    let total = elements.len();
    let candidates: Vec<_> = elements
        .into_iter()
        .filter_map(element_record)
        .map(Candidate::new)
        .collect();

    if candidates.len() < total {
        warn!(skipped = total - candidates.len(), "Skipped malformed list entries");
    }
    if candidates.is_empty() {
        return Err(malformed("list", "no candidates"));
    }
    debug!(count = candidates.len(), "Decoded guess list");
    Ok(candidates)
}

/// Decodes only the top entry of a guess-list response.
///
/// The rest of the list is not inspected.
#[instrument(skip(document))]
pub fn decode_top_candidate(document: &Value) -> Result<Candidate, AkinatorError> {
    let top = list_elements(document)?
        .into_iter()
        .next()
        .ok_or_else(|| malformed("list", "no candidates"))?;
    let record = element_record(top).ok_or_else(|| malformed("list", "top entry has no element"))?;
    Ok(Candidate::new(record))
}

/// Deserializers accepting a scalar as either a JSON string or number.
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(serde_json::Number),
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Scalar::deserialize(deserializer)? {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        })
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Scalar::deserialize(deserializer)? {
            Scalar::Text(s) => s.trim().parse::<f64>().map_err(D::Error::custom),
            Scalar::Number(n) => n
                .as_f64()
                .ok_or_else(|| D::Error::custom(format!("{} is not a float", n))),
        }
    }

    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        match Scalar::deserialize(deserializer)? {
            Scalar::Text(s) => s.trim().parse::<u32>().map_err(D::Error::custom),
            Scalar::Number(n) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| D::Error::custom(format!("{} is not a step index", n))),
        }
    }
}
