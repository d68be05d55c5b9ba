use emograph_blueprint::{SchemaErrorKind, ValidationOptions};
use emograph_core::{GenerationError, RetryPolicy, RetryingGenerator};
use emograph_test_utils::{invalid_output, system_transcript, valid_output, ScriptedClient, Step};
use std::time::Duration;
use tokio::time::Instant;

fn generator(max_attempts: u32, base_delay: Duration) -> RetryingGenerator {
    RetryingGenerator::new(
        RetryPolicy::new(max_attempts, base_delay),
        ValidationOptions::default(),
    )
}

#[tokio::test]
async fn test_first_attempt_success() {
    let client = ScriptedClient::always(Step::ok(valid_output("done")));
    let transcript = system_transcript("draw");

    let generated = RetryingGenerator::default()
        .invoke(&client, &transcript)
        .await
        .unwrap();

    assert_eq!(generated.response, "done");
    assert_eq!(generated.attempts, 1);
    assert_eq!(client.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_permanent_error_is_not_retried() {
    let client = ScriptedClient::from_steps(vec![
        Step::permanent("invalid api key"),
        Step::ok(valid_output("never")),
    ]);
    let start = Instant::now();

    let err = RetryingGenerator::default()
        .invoke(&client, &system_transcript("draw"))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Permanent(msg) if msg == "invalid api key"));
    assert_eq!(client.calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_linear_backoff_without_trailing_wait() {
    let client = ScriptedClient::always(Step::transient("rate limited"));
    let start = Instant::now();

    let err = generator(3, Duration::from_secs(1))
        .invoke(&client, &system_transcript("draw"))
        .await
        .unwrap_err();

    // 1s after attempt 1, 2s after attempt 2, nothing after attempt 3
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(client.calls(), 3);
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_returns_last_error() {
    let client = ScriptedClient::from_steps(vec![
        Step::transient("timeout"),
        Step::transient("overloaded"),
        Step::ok(invalid_output()),
    ]);

    let err = generator(3, Duration::from_millis(10))
        .invoke(&client, &system_transcript("draw"))
        .await
        .unwrap_err();

    match err {
        GenerationError::InvalidOutput(schema) => {
            assert_eq!(schema.kind, SchemaErrorKind::UnresolvedReference);
        }
        other => panic!("expected schema rejection, got {other:?}"),
    }
    assert_eq!(client.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_schema_rejection_is_retried() {
    let client =
        ScriptedClient::from_steps(vec![Step::ok(invalid_output()), Step::ok(valid_output("fixed"))]);
    let start = Instant::now();

    let generated = RetryingGenerator::default()
        .invoke(&client, &system_transcript("draw"))
        .await
        .unwrap();

    assert_eq!(generated.response, "fixed");
    assert_eq!(generated.attempts, 2);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_budget() {
    let client = ScriptedClient::always(Step::transient("flaky"));

    let result = generator(0, Duration::from_secs(5))
        .invoke(&client, &system_transcript("draw"))
        .await;

    assert!(result.is_err());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_same_transcript_every_attempt() {
    let client =
        ScriptedClient::from_steps(vec![Step::transient("blip"), Step::ok(valid_output("ok"))]);
    let transcript = system_transcript("draw");

    generator(3, Duration::ZERO)
        .invoke(&client, &transcript)
        .await
        .unwrap();

    let seen = client.seen();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|t| t.same_snapshot(&transcript)));
}
