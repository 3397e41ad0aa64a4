//! Region selection: language identifiers to server endpoints.

use crate::config::ClientConfig;
use crate::error::AkinatorError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{EnumIter, IntoEnumIterator};
use tracing::{debug, instrument, warn};

/// Languages served by the remote service.
///
/// Each has a short code and a verbose name; either selects it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[strum(serialize = "en")]
    English,
    /// Second English server, for when the main one is down.
    #[strum(serialize = "en2")]
    English2,
    /// Arabic.
    #[strum(serialize = "ar")]
    Arabic,
    /// Chinese.
    #[strum(serialize = "cn")]
    Chinese,
    /// German.
    #[strum(serialize = "de")]
    German,
    /// Spanish.
    #[strum(serialize = "es")]
    Spanish,
    /// French.
    #[strum(serialize = "fr")]
    French,
    /// Second French server.
    #[strum(serialize = "fr2")]
    French2,
    /// Hebrew.
    #[strum(serialize = "il")]
    Hebrew,
    /// Italian.
    #[strum(serialize = "it")]
    Italian,
    /// Japanese.
    #[strum(serialize = "jp")]
    Japanese,
    /// Korean.
    #[strum(serialize = "kr")]
    Korean,
    /// Dutch.
    #[strum(serialize = "nl")]
    Dutch,
    /// Polish.
    #[strum(serialize = "pl")]
    Polish,
    /// Portuguese.
    #[strum(serialize = "pt")]
    Portuguese,
    /// Russian.
    #[strum(serialize = "ru")]
    Russian,
    /// Turkish.
    #[strum(serialize = "tr")]
    Turkish,
}

impl Language {
    /// Short language code, e.g. `"en"`.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::English2 => "en2",
            Language::Arabic => "ar",
            Language::Chinese => "cn",
            Language::German => "de",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::French2 => "fr2",
            Language::Hebrew => "il",
            Language::Italian => "it",
            Language::Japanese => "jp",
            Language::Korean => "kr",
            Language::Dutch => "nl",
            Language::Polish => "pl",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
            Language::Turkish => "tr",
        }
    }

    /// Verbose name, e.g. `"english"`.
    pub fn verbose_name(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::English2 => "english2",
            Language::Arabic => "arabic",
            Language::Chinese => "chinese",
            Language::German => "german",
            Language::Spanish => "spanish",
            Language::French => "french",
            Language::French2 => "french2",
            Language::Hebrew => "hebrew",
            Language::Italian => "italian",
            Language::Japanese => "japanese",
            Language::Korean => "korean",
            Language::Dutch => "dutch",
            Language::Polish => "polish",
            Language::Portuguese => "portuguese",
            Language::Russian => "russian",
            Language::Turkish => "turkish",
        }
    }

    /// Built-in endpoint for this language.
    fn default_endpoint(self) -> &'static str {
        match self {
            Language::English => "srv13.akinator.com:9196",
            Language::English2 => "srv2.akinator.com:9162",
            Language::Arabic => "srv2.akinator.com:9155",
            Language::Chinese => "srv11.akinator.com:9150",
            Language::German => "srv7.akinator.com:9241",
            Language::Spanish => "srv6.akinator.com:9127",
            Language::French => "srv3.akinator.com:9217",
            Language::French2 => "srv12.akinator.com:9185",
            Language::Hebrew => "srv12.akinator.com:9189",
            Language::Italian => "srv9.akinator.com:9214",
            Language::Japanese => "srv11.akinator.com:9172",
            Language::Korean => "srv2.akinator.com:9156",
            Language::Dutch => "srv9.akinator.com:9215",
            Language::Polish => "srv14.akinator.com:9161",
            Language::Portuguese => "srv11.akinator.com:9169",
            Language::Russian => "srv12.akinator.com:9190",
            Language::Turkish => "srv3.akinator.com:9211",
        }
    }

    /// Parses a selector (code or verbose name), ignoring case and padding.
    #[instrument]
    pub fn from_selector(selector: &str) -> Option<Self> {
        let wanted = selector.trim().to_lowercase();
        Language::iter().find(|lang| lang.code() == wanted || lang.verbose_name() == wanted)
    }
}

/// Opaque server endpoint (`host[:port]`) a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Server(String);

impl Server {
    /// Creates a server endpoint, returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        let v = v.trim();
        if v.is_empty() { None } else { Some(Self(v.to_string())) }
    }

    /// Returns the endpoint as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves region selectors to endpoints.
///
/// Starts from the built-in table; configuration may replace individual
/// endpoints but cannot add languages.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    overrides: HashMap<Language, Server>,
}

impl RegionTable {
    /// Table with only the built-in endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the endpoint overrides from `config` applied.
    #[instrument(skip(config))]
    pub fn from_config(config: &ClientConfig) -> Result<Self, AkinatorError> {
        let mut table = Self::new();
        for (selector, endpoint) in config.servers() {
            let language = Language::from_selector(selector).ok_or_else(|| {
                warn!(selector = %selector, "Override for unknown region");
                AkinatorError::UnknownRegion {
                    selector: selector.clone(),
                }
            })?;
            let server = Server::new(endpoint.as_str()).ok_or_else(|| {
                AkinatorError::UnknownRegion {
                    selector: selector.clone(),
                }
            })?;
            debug!(language = %language, server = %server, "Applying endpoint override");
            table.overrides.insert(language, server);
        }
        Ok(table)
    }

    /// Replaces the endpoint for one language.
    pub fn with_override(mut self, language: Language, server: Server) -> Self {
        self.overrides.insert(language, server);
        self
    }

    /// Resolves `selector` to a server. `None` selects English.
    #[instrument(skip(self))]
    pub fn resolve(&self, selector: Option<&str>) -> Result<Server, AkinatorError> {
        let language = match selector {
            None => Language::English,
            Some(s) => Language::from_selector(s).ok_or_else(|| {
                warn!(selector = s, "Unknown region selector");
                AkinatorError::UnknownRegion {
                    selector: s.to_string(),
                }
            })?,
        };

        let server = self
            .overrides
            .get(&language)
            .cloned()
            .unwrap_or_else(|| Server(language.default_endpoint().to_string()));
        debug!(language = %language, server = %server, "Resolved region");
        Ok(server)
    }
}
