//! Integration test against the live service.

use akinator::{Akinator, Answer, ClientConfig};
use tracing_subscriber::EnvFilter;

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_live_game_round_trip() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    dotenvy::dotenv().ok();

    let mut aki = Akinator::connect(&ClientConfig::default()).expect("Failed to build client");

    let first = aki.start(Some("en")).await.expect("Failed to start");
    assert!(!first.is_empty(), "First question should not be empty");
    assert_eq!(aki.step(), Some(0));

    aki.answer(Answer::Yes).await.expect("Failed to answer");
    assert_eq!(aki.step(), Some(1));

    let back = aki.back().await.expect("Failed to go back");
    assert_eq!(back, first);

    let candidate = aki.guess().await.expect("Failed to guess");
    eprintln!("Guess: {:?}", candidate.name());
}
