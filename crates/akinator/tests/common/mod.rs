//! Shared test doubles.

#![allow(dead_code)]

use akinator::{
    Akinator, ClientConfig, Language, RegionTable, Server, Transport, TransportError,
    TransportErrorKind, Url,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Host every test session resolves to.
pub const TEST_HOST: &str = "aki.test:9000";

/// Identity page carrying the tokens `U1` and `F1`.
pub const IDENTITY_PAGE: &str = "<html><script>\n\
    var uid_ext_session = 'U1';\n\
    var frontaddr = 'F1';\n\
    </script></html>";

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Document(Value),
    Page(String),
    Fail(TransportErrorKind),
}

/// Transport that replays scripted replies in order and records every target.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Url>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_document(&self, document: Value) {
        self.push(Reply::Document(document));
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Url {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("No request recorded")
    }

    fn next(&self, target: &Url) -> Reply {
        self.requests.lock().unwrap().push(target.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("Unscripted request to {}", target))
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn get_document(&self, target: &Url) -> Result<Value, TransportError> {
        match self.next(target) {
            Reply::Document(document) => Ok(document),
            Reply::Page(_) => Err(TransportError::new(
                TransportErrorKind::Decode,
                "scripted page where a document was expected",
            )),
            Reply::Fail(kind) => Err(TransportError::new(kind, "scripted failure")),
        }
    }

    async fn get_page(&self, target: &Url) -> Result<String, TransportError> {
        match self.next(target) {
            Reply::Page(page) => Ok(page),
            Reply::Document(document) => Ok(document.to_string()),
            Reply::Fail(kind) => Err(TransportError::new(kind, "scripted failure")),
        }
    }
}

/// Client whose English endpoint is [`TEST_HOST`].
pub fn client(transport: &Arc<ScriptedTransport>) -> Akinator {
    let config = ClientConfig::default();
    let transport: Arc<dyn Transport> = transport.clone();
    let identity = akinator::PageIdentityProvider::from_str_url(
        Arc::clone(&transport),
        config.identity_url(),
    )
    .expect("Default identity URL should parse");
    let regions = RegionTable::new().with_override(
        Language::English,
        Server::new(TEST_HOST).expect("valid host"),
    );
    Akinator::with_parts(transport, Arc::new(identity), regions)
}

/// Bootstrap response: session 42, signature 99, first question.
pub fn new_session_ok() -> Value {
    json!({
        "completion": "OK",
        "parameters": {
            "identification": {
                "channel": 0,
                "session": "42",
                "signature": "99",
                "challenge_auth": "abc"
            },
            "step_information": {
                "question": "Is it a human?",
                "answers": [],
                "step": "0",
                "progression": "0.00000",
                "questionid": "266",
                "infogain": "0.607602"
            }
        }
    })
}

/// Answer or back response.
pub fn step_ok(question: &str, progression: &str, step: u32) -> Value {
    json!({
        "completion": "OK",
        "parameters": {
            "question": question,
            "answers": [],
            "step": step.to_string(),
            "progression": progression,
            "questionid": "1",
            "infogain": "0.5"
        }
    })
}

/// Any response with the given completion code and no parameters.
pub fn rejected(code: &str) -> Value {
    json!({ "completion": code })
}

/// Guess list with Alan Turing on top.
pub fn list_ok() -> Value {
    json!({
        "completion": "OK",
        "parameters": {
            "elements": [
                {
                    "element": {
                        "id": "7742",
                        "name": "Alan Turing",
                        "description": "Mathematician",
                        "absolute_picture_path": "http://photos.test/turing.jpg",
                        "proba": "0.93",
                        "ranking": "120"
                    }
                },
                {
                    "element": {
                        "id": "1",
                        "name": "Ada Lovelace",
                        "description": "Mathematician",
                        "absolute_picture_path": "http://photos.test/ada.jpg",
                        "proba": "0.04"
                    }
                }
            ],
            "NbObjetsPertinents": "2"
        }
    })
}

/// Scripts the identity page and the bootstrap response, then starts.
pub async fn started(transport: &Arc<ScriptedTransport>) -> Akinator {
    transport.push(Reply::Page(IDENTITY_PAGE.to_string()));
    transport.push_document(new_session_ok());
    let mut aki = client(transport);
    aki.start(Some("en")).await.expect("Bootstrap should succeed");
    aki
}

/// Value of one query parameter.
pub fn query(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
