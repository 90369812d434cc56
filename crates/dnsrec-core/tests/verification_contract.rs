//! Contract Test: Verified Writes
//!
//! The provider's write acknowledgement is not proof of effect. Only the
//! state observed by a re-fetch decides success.
//!
//! Constraints verified:
//! - A write that is acknowledged but not applied is reported as `Failed`
//! - Transport errors at any stage are reported as `Failed` and stop the
//!   cycle immediately
//! - Nothing is retried
//!
//! If this test fails, the tool may report success for a change that
//! never happened.

mod common;

use common::*;
use dnsrec_core::{
    Configuration, Error, FailureKind, Operation, Outcome, Reconciler, Record, Request, Stage,
};

fn failure(outcome: Outcome) -> dnsrec_core::Failure {
    match outcome {
        Outcome::Failed(failure) => failure,
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn add_fails_when_write_is_silently_dropped() {
    let provider = MockProviderClient::new(initial_config()).with_write_mode(WriteMode::Ignore);
    let engine = Reconciler::new(Box::new(provider.clone()));

    let failure = failure(engine.add_record(&spf_record()).await);

    assert_eq!(failure.stage, Stage::Verify);
    assert_eq!(failure.kind(), FailureKind::Verification);
    assert_eq!(
        failure.error,
        Error::verification("record not present after write")
    );
    assert_eq!(failure.target, Some(spf_record()));
    assert_eq!(failure.before, Some(initial_config()));
    assert_eq!(failure.after, Some(initial_config()));
    assert_eq!(provider.replace_call_count(), 1, "no retry after mismatch");
    assert_eq!(provider.fetch_call_count(), 2);
}

#[tokio::test]
async fn remove_fails_when_write_is_silently_dropped() {
    let provider = MockProviderClient::new(initial_config()).with_write_mode(WriteMode::Ignore);
    let engine = Reconciler::new(Box::new(provider.clone()));

    let failure = failure(engine.remove_record(&dmarc_record()).await);

    assert_eq!(failure.stage, Stage::Verify);
    assert_eq!(failure.kind(), FailureKind::Verification);
    assert_eq!(
        failure.error,
        Error::verification("record still present after removal")
    );
    assert_eq!(provider.replace_call_count(), 1);
}

#[tokio::test]
async fn add_fails_when_provider_normalizes_value() {
    fn truncate_values(config: &Configuration) -> Configuration {
        let mut stored = config.clone();
        for record in &mut stored.records {
            record.value.truncate(10);
        }
        stored
    }

    let provider = MockProviderClient::new(initial_config())
        .with_write_mode(WriteMode::Transform(truncate_values));
    let engine = Reconciler::new(Box::new(provider.clone()));

    let failure = failure(engine.add_record(&spf_record()).await);

    assert_eq!(failure.kind(), FailureKind::Verification);
    // The write itself went out with the full value
    assert_eq!(provider.written()[0].records[1], spf_record());
}

#[tokio::test]
async fn padded_value_verifies_against_trimming_provider() {
    fn trim_values(config: &Configuration) -> Configuration {
        let mut stored = config.clone();
        for record in &mut stored.records {
            record.value = record.value.trim().to_string();
        }
        stored
    }

    let provider = MockProviderClient::new(initial_config())
        .with_write_mode(WriteMode::Transform(trim_values));
    let engine = Reconciler::new(Box::new(provider.clone()));
    let padded = Record::new("TXT", "@", format!("  {} ", spf_record().value));
    let request = Request::new(Operation::Add, padded).unwrap();

    let first = engine.execute(&request).await;
    assert!(matches!(first, Outcome::Added { .. }), "got {:?}", first);

    let second = engine.execute(&request).await;
    assert!(matches!(second, Outcome::AlreadyExists { .. }), "got {:?}", second);

    assert_eq!(provider.replace_call_count(), 1);
    assert_eq!(provider.stored().count_of(&spf_record()), 1);
}

#[tokio::test]
async fn remove_fails_when_provider_reinserts_record() {
    fn reinsert_dmarc(config: &Configuration) -> Configuration {
        config.with_record_appended(&dmarc_record())
    }

    let provider = MockProviderClient::new(initial_config())
        .with_write_mode(WriteMode::Transform(reinsert_dmarc));
    let engine = Reconciler::new(Box::new(provider.clone()));

    let failure = failure(engine.remove_record(&dmarc_record()).await);
    assert_eq!(failure.stage, Stage::Verify);
    assert!(failure.after.unwrap().contains(&dmarc_record()));
}

#[tokio::test]
async fn initial_fetch_error_fails_without_write() {
    let provider = MockProviderClient::new(initial_config()).failing_fetch_on_call(1);
    let engine = Reconciler::new(Box::new(provider.clone()));

    let failure = failure(engine.add_record(&spf_record()).await);

    assert_eq!(failure.stage, Stage::Fetch);
    assert_eq!(failure.kind(), FailureKind::Transport);
    assert_eq!(failure.before, None);
    assert_eq!(provider.replace_call_count(), 0);
    assert_eq!(provider.fetch_call_count(), 1, "no retry after fetch error");
}

#[tokio::test]
async fn write_error_fails_without_verification_fetch() {
    let provider = MockProviderClient::new(initial_config())
        .failing_replace(Error::provider("mock", "form rejected"));
    let engine = Reconciler::new(Box::new(provider.clone()));

    let failure = failure(engine.remove_record(&dmarc_record()).await);

    assert_eq!(failure.stage, Stage::Write);
    assert_eq!(failure.kind(), FailureKind::Transport);
    assert_eq!(failure.error, Error::provider("mock", "form rejected"));
    assert_eq!(failure.before, Some(initial_config()));
    assert_eq!(failure.after, None);
    assert_eq!(provider.replace_call_count(), 1);
    assert_eq!(provider.fetch_call_count(), 1);
}

#[tokio::test]
async fn verification_fetch_error_is_a_failure_even_after_good_write() {
    let provider = MockProviderClient::new(initial_config()).failing_fetch_on_call(2);
    let engine = Reconciler::new(Box::new(provider.clone()));

    let failure = failure(engine.add_record(&spf_record()).await);

    assert_eq!(failure.stage, Stage::VerifyFetch);
    assert_eq!(failure.kind(), FailureKind::Transport);
    assert_eq!(failure.before, Some(initial_config()));
    // The write did land; we just could not confirm it
    assert!(provider.stored().contains(&spf_record()));
}

#[tokio::test]
async fn list_fetch_error_is_failed() {
    let provider = MockProviderClient::new(initial_config()).failing_fetch_on_call(1);
    let engine = Reconciler::new(Box::new(provider.clone()));

    let outcome = engine.list().await;

    let failure = failure(outcome);
    assert_eq!(failure.stage, Stage::Fetch);
    assert_eq!(failure.target, None);
    assert_eq!(
        failure.to_string(),
        "fetch error: HTTP error: connection reset by peer"
    );
}
