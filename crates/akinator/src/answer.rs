//! Answer tokens and their canonical wire ids.

use crate::error::AkinatorError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};
use tracing::instrument;

/// One of the five answers the service accepts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::Display,
)]
pub enum Answer {
    /// Id 0.
    #[strum(serialize = "yes")]
    Yes,
    /// Id 1.
    #[strum(serialize = "no")]
    No,
    /// Id 2.
    #[strum(serialize = "don't know")]
    DontKnow,
    /// Id 3.
    #[strum(serialize = "probably")]
    Probably,
    /// Id 4.
    #[strum(serialize = "probably not")]
    ProbablyNot,
}

impl Answer {
    /// Wire id sent in the `answer` query parameter.
    pub fn id(self) -> u8 {
        match self {
            Answer::Yes => 0,
            Answer::No => 1,
            Answer::DontKnow => 2,
            Answer::Probably => 3,
            Answer::ProbablyNot => 4,
        }
    }

    /// Maps a numeric id back to an answer.
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Answer::Yes),
            1 => Some(Answer::No),
            2 => Some(Answer::DontKnow),
            3 => Some(Answer::Probably),
            4 => Some(Answer::ProbablyNot),
            _ => None,
        }
    }

    /// Recognized textual synonyms, lowercase.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Answer::Yes => &["yes", "y", "0"],
            Answer::No => &["no", "n", "1"],
            Answer::DontKnow => &["i", "idk", "i dont know", "i don't know", "2"],
            Answer::Probably => &["probably", "p", "3"],
            Answer::ProbablyNot => &["probably not", "pn", "4"],
        }
    }
}

impl FromStr for Answer {
    type Err = AkinatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        Answer::iter()
            .find(|answer| answer.synonyms().contains(&token.as_str()))
            .ok_or_else(|| AkinatorError::InvalidAnswer {
                input: s.to_string(),
            })
    }
}

/// Caller-supplied answer, before validation.
///
/// Numeric input is range-checked when resolved; textual input is parsed
/// eagerly by [`AnswerInput::parse`] or arrives pre-parsed as a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerInput {
    /// A raw id, valid only within 0..=4.
    Numeric(i64),
    /// An already-recognized answer.
    Token(Answer),
}

impl AnswerInput {
    /// Parses free text: a bare integer becomes [`AnswerInput::Numeric`],
    /// anything else must be a recognized synonym.
    #[instrument]
    pub fn parse(text: &str) -> Result<Self, AkinatorError> {
        match text.trim().parse::<i64>() {
            Ok(n) => Ok(AnswerInput::Numeric(n)),
            Err(_) => text.parse::<Answer>().map(AnswerInput::Token),
        }
    }

    /// Resolves to a canonical answer, rejecting out-of-range ids.
    pub fn resolve(self) -> Result<Answer, AkinatorError> {
        match self {
            AnswerInput::Token(answer) => Ok(answer),
            AnswerInput::Numeric(n) => {
                Answer::from_id(n).ok_or_else(|| AkinatorError::InvalidAnswer {
                    input: n.to_string(),
                })
            }
        }
    }
}

impl From<Answer> for AnswerInput {
    fn from(answer: Answer) -> Self {
        AnswerInput::Token(answer)
    }
}

impl From<i64> for AnswerInput {
    fn from(id: i64) -> Self {
        AnswerInput::Numeric(id)
    }
}

impl From<i32> for AnswerInput {
    fn from(id: i32) -> Self {
        AnswerInput::Numeric(i64::from(id))
    }
}
