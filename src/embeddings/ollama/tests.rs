use super::*;
use crate::config::Config;
use crate::embeddings::EmbeddingBackend;

fn test_config() -> Config {
    let mut config = Config::default();
    // Connection refused immediately; nothing listens on port 1.
    config.ollama.port = 1;
    config
}

#[test]
fn client_construction_from_default_config() {
    let config = Config::default();
    let client = OllamaClient::new(&config).expect("client should build from defaults");

    assert_eq!(client.model, "all-minilm:latest");
    assert_eq!(client.batch_size, 16);
    assert_eq!(client.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn retry_attempts_builder_floors_at_one() {
    let config = Config::default();
    let client = OllamaClient::new(&config)
        .expect("client should build")
        .with_retry_attempts(0);

    assert_eq!(client.retry_attempts, 1);
}

#[test]
fn ping_fails_fast_without_server() {
    let client = OllamaClient::new(&test_config())
        .expect("client should build")
        .with_retry_attempts(1);

    assert!(client.ping().is_err());
}

#[test]
fn embed_surfaces_transport_errors() {
    let client = OllamaClient::new(&test_config())
        .expect("client should build")
        .with_retry_attempts(1);

    let result = client.embed_text("a blue velvet sofa");
    assert!(result.is_err(), "no server should mean an error, not a vector");
}

#[test]
fn empty_batch_is_a_no_op() {
    let client = OllamaClient::new(&test_config()).expect("client should build");

    let results = client.embed_texts(&[]).expect("empty batch should succeed");
    assert!(results.is_empty());
}

#[test]
fn backend_trait_delegates_to_client() {
    let client = OllamaClient::new(&test_config())
        .expect("client should build")
        .with_retry_attempts(1);
    let backend: &dyn EmbeddingBackend = &client;

    assert!(backend.embed("test").is_err());
    assert!(backend.embed_batch(&[]).expect("empty batch").is_empty());
}
