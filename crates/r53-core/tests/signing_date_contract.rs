//! Contract Test: Signing Date Cache
//!
//! Constraints verified:
//! - The provider date is fetched at most once per cache
//! - A seeded cache never fetches
//! - Failed fetches leave the cache empty and surface typed errors
//! - Concurrent first callers share one fetch
//! - Signed headers use the cached date

mod common;

use common::*;
use r53_core::config::Credentials;
use r53_core::error::Error;
use r53_core::signer::{AUTHORIZATION_HEADER, DATE_HEADER, Signer, SigningDateCache};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn date_is_fetched_once_for_many_calls() {
    let source = Arc::new(CountingDateSource::new(GOLDEN_DATE));
    let cache = SigningDateCache::new(source.clone());

    for _ in 0..10 {
        assert_eq!(cache.get_or_fetch().await.unwrap(), GOLDEN_DATE);
    }

    assert_eq!(
        source.fetch_count(),
        1,
        "Expected exactly 1 fetch for 10 calls, got {}",
        source.fetch_count()
    );
}

#[tokio::test]
async fn seeded_cache_never_fetches() {
    let source = Arc::new(CountingDateSource::new("Tue, 27 Mar 2012 00:00:00 GMT"));
    let cache = SigningDateCache::seeded(source.clone(), GOLDEN_DATE);

    for _ in 0..5 {
        assert_eq!(cache.get_or_fetch().await.unwrap(), GOLDEN_DATE);
    }

    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn cached_date_is_never_refreshed() {
    let source = Arc::new(CountingDateSource::new(GOLDEN_DATE));
    let cache = SigningDateCache::new(source.clone());

    cache.get_or_fetch().await.unwrap();
    source.set_reply(DateReply::Date("Wed, 28 Mar 2012 10:00:00 GMT".to_string()));

    assert_eq!(cache.get_or_fetch().await.unwrap(), GOLDEN_DATE);
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn reset_allows_a_new_fetch() {
    let source = Arc::new(CountingDateSource::new(GOLDEN_DATE));
    let cache = SigningDateCache::seeded(source.clone(), "Sun, 01 Jan 2012 00:00:00 GMT");

    cache.reset().await;
    assert_eq!(cache.cached().await, None);

    assert_eq!(cache.get_or_fetch().await.unwrap(), GOLDEN_DATE);
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error_and_caches_nothing() {
    let source = Arc::new(CountingDateSource::with_reply(DateReply::Unreachable));
    let cache = SigningDateCache::new(source.clone());

    let err = cache.get_or_fetch().await.unwrap_err();
    assert!(matches!(err, Error::Network(_)), "got {:?}", err);
    assert_eq!(cache.cached().await, None);

    // Next call tries again and succeeds
    source.set_reply(DateReply::Date(GOLDEN_DATE.to_string()));
    assert_eq!(cache.get_or_fetch().await.unwrap(), GOLDEN_DATE);
    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test]
async fn missing_date_header_is_surfaced() {
    let source = Arc::new(CountingDateSource::with_reply(DateReply::NoDateHeader));
    let cache = SigningDateCache::new(source);

    let err = cache.get_or_fetch().await.unwrap_err();
    assert!(matches!(err, Error::MissingDateHeader { .. }), "got {:?}", err);
    assert_eq!(cache.cached().await, None);
}

#[tokio::test]
async fn concurrent_first_callers_share_one_fetch() {
    let source = Arc::new(CountingDateSource::new(GOLDEN_DATE).with_delay(Duration::from_millis(50)));
    let cache = Arc::new(SigningDateCache::new(source.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move { cache.get_or_fetch().await }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), GOLDEN_DATE);
    }

    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn signer_produces_golden_headers_from_cached_date() {
    let source = Arc::new(CountingDateSource::new(GOLDEN_DATE));
    let signer = Signer::new(
        Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY"),
        Arc::new(SigningDateCache::new(source.clone())),
    );

    let first = signer.sign().await.unwrap();
    let second = signer.clone().sign().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.date, GOLDEN_DATE);
    assert_eq!(
        first.authorization,
        "AWS3-HTTPS AWSAccessKeyId=AKIDEXAMPLE,Algorithm=HmacSHA1,Signature=eodSvQSA3PUF9CznLQBkgUycVfM="
    );

    let pairs = first.pairs();
    assert_eq!(pairs[0], (DATE_HEADER, GOLDEN_DATE));
    assert_eq!(pairs[1].0, AUTHORIZATION_HEADER);

    // Clones share the cache
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn signer_fails_without_date() {
    let source = Arc::new(CountingDateSource::with_reply(DateReply::Unreachable));
    let signer = Signer::new(
        Credentials::new("AKIDEXAMPLE", "secret"),
        Arc::new(SigningDateCache::new(source)),
    );

    assert!(signer.sign().await.unwrap_err().is_network());
}
