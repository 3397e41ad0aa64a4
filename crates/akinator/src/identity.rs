//! Ephemeral client identity.
//!
//! The session-creation request must carry two tokens (`uid_ext_session` and
//! `frontaddr`) that the service only publishes inside the game page's
//! inline script. [`IdentityProvider`] is the seam; [`PageIdentityProvider`]
//! is the scraping strategy currently needed.

use crate::error::AkinatorError;
use crate::transport::Transport;
use async_trait::async_trait;
use derive_getters::Getters;
use derive_new::new;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, instrument, warn};

/// Tokens identifying this client to the service for one bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct ClientIdentity {
    /// `uid_ext_session` token.
    uid: String,
    /// `frontaddr` token.
    front_addr: String,
}

/// Source of [`ClientIdentity`] tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Obtains a fresh identity. One network round trip at most.
    async fn fetch_client_identity(&self) -> Result<ClientIdentity, AkinatorError>;
}

static IDENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var uid_ext_session = '(.*)';\n.*var frontaddr = '(.*)';")
        .expect("invalid identity pattern")
});

/// Extracts the identity tokens from the game page source.
#[instrument(skip(page), fields(page_length = page.len()))]
pub fn extract_identity(page: &str) -> Option<ClientIdentity> {
    let captures = IDENTITY_PATTERN.captures(page)?;
    let uid = captures.get(1)?.as_str();
    let front_addr = captures.get(2)?.as_str();
    debug!("Found identity tokens in page");
    Some(ClientIdentity::new(uid.to_string(), front_addr.to_string()))
}

/// Scrapes the identity tokens from the public game page.
#[derive(Debug, Clone)]
pub struct PageIdentityProvider {
    transport: Arc<dyn Transport>,
    page_url: Url,
}

impl PageIdentityProvider {
    /// Creates a provider that fetches `page_url` through `transport`.
    pub fn new(transport: Arc<dyn Transport>, page_url: Url) -> Self {
        Self {
            transport,
            page_url,
        }
    }

    /// Creates a provider from a textual URL.
    #[instrument(skip(transport))]
    pub fn from_str_url(transport: Arc<dyn Transport>, page_url: &str) -> Result<Self, AkinatorError> {
        let page_url = Url::parse(page_url).map_err(|e| AkinatorError::IdentityFetchFailed {
            reason: format!("Invalid identity page URL {:?}: {}", page_url, e),
        })?;
        Ok(Self::new(transport, page_url))
    }
}

#[async_trait]
impl IdentityProvider for PageIdentityProvider {
    #[instrument(skip(self), fields(page = %self.page_url))]
    async fn fetch_client_identity(&self) -> Result<ClientIdentity, AkinatorError> {
        let page = self.transport.get_page(&self.page_url).await.map_err(|e| {
            warn!(error = %e, "Could not fetch identity page");
            AkinatorError::IdentityFetchFailed {
                reason: e.to_string(),
            }
        })?;

        let identity = extract_identity(&page).ok_or_else(|| {
            warn!(page_length = page.len(), "Identity tokens not found in page");
            AkinatorError::IdentityFetchFailed {
                reason: "identity tokens not found in page".to_string(),
            }
        })?;

        info!("Fetched client identity");
        Ok(identity)
    }
}
