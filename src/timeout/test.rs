use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{Timeout, TimeoutError};

fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let inc = Arc::clone(&count);
    (count, move || {
        inc.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test]
async fn fires_once() {
    let (count, on_timeout) = counter();
    let timeout = Timeout::start(Duration::from_millis(10), on_timeout).unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(timeout.has_fired());
    assert!(!timeout.stop(), "stop after expiry is a no-op");
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stop_before_expiry() {
    let (count, on_timeout) = counter();
    let timeout = Timeout::start(Duration::from_millis(30), on_timeout).unwrap();

    assert!(timeout.stop());
    assert!(timeout.is_stopped());
    assert!(!timeout.stop(), "second stop is a no-op");

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!timeout.has_fired());
}

#[tokio::test]
async fn stop_from_other_task() {
    let (count, on_timeout) = counter();
    let timeout = Timeout::start(Duration::from_millis(50), on_timeout).unwrap();

    let remote = timeout.clone();
    let stopped = tokio::spawn(async move { remote.stop() }).await.unwrap();

    assert!(stopped);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_duration() {
    let err = Timeout::start(Duration::ZERO, || {}).unwrap_err();
    assert_eq!(err, TimeoutError::ZeroDuration);
}

#[test]
fn no_runtime() {
    let err = Timeout::start(Duration::from_millis(1), || {}).unwrap_err();
    assert_eq!(err, TimeoutError::NoRuntime);
}

#[tokio::test]
async fn expiring_resolves() {
    let (timeout, expired) = Timeout::expiring(Duration::from_millis(10)).unwrap();
    tokio::time::timeout(Duration::from_secs(1), expired).await.unwrap();
    assert!(timeout.has_fired());
}

#[tokio::test]
async fn expiring_stopped_never_resolves() {
    let (timeout, expired) = Timeout::expiring(Duration::from_millis(10)).unwrap();
    assert!(timeout.stop());
    let waited = tokio::time::timeout(Duration::from_millis(60), expired).await;
    assert!(waited.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn completion_and_expiry_are_exclusive() {
    for _ in 0..200 {
        let (count, on_timeout) = counter();
        let timeout = Timeout::start(Duration::from_millis(1), on_timeout).unwrap();

        tokio::time::sleep(Duration::from_millis(1)).await;
        let completed = timeout.stop();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let fired = count.load(Ordering::SeqCst);

        assert!(fired <= 1);
        assert_eq!(completed as usize + fired, 1, "exactly one outcome is observed");
    }
}
