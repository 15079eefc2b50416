//! Bridging one-shot engine signals into single-resolution results.
//!
//! Each native request fires exactly one of a success/error signal pair.
//! [`resolve`] races the two and yields whichever fires, exactly once. The
//! unfired signal's subscription is simply dropped; the signals are mutually
//! exclusive by the driver contract, so there is no cross-talk to clean up.

use asyncstore_engine::{EngineError, EngineRequest, FailureSignal, SuccessSignal};
use std::future::pending;

/// Resolve when the success signal fires; never resolve otherwise.
///
/// A dropped sender means the error path fired (or the driver
/// malfunctioned), so this future stays pending rather than fabricating an
/// outcome.
async fn success<T>(signal: SuccessSignal<T>) -> T {
    match signal.await {
        Ok(value) => value,
        Err(_) => pending().await,
    }
}

/// Resolve with the driver error when the failure signal fires.
async fn failure(signal: FailureSignal) -> EngineError {
    match signal.await {
        Ok(error) => error,
        Err(_) => pending().await,
    }
}

/// Race a request's two signals into a single result.
///
/// Terminates exactly once under the driver contract. A request that never
/// settles (driver malfunction) suspends the caller indefinitely; that is
/// accepted rather than handled.
pub(crate) async fn resolve<T>(request: EngineRequest<T>) -> Result<T, EngineError> {
    let (success_signal, failure_signal) = request.into_signals();
    tokio::select! {
        value = success(success_signal) => Ok(value),
        error = failure(failure_signal) => Err(error),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn resolves_success() {
        let request = EngineRequest::resolved(5u32);
        assert_eq!(resolve(request).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn resolves_failure() {
        let request = EngineRequest::<u32>::rejected(EngineError::new("boom"));
        assert_eq!(resolve(request).await.unwrap_err().message(), "boom");
    }

    #[tokio::test]
    async fn resolves_late_success() {
        let (request, responder) = EngineRequest::new();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            responder.resolve(9u32);
        });
        assert_eq!(resolve(request).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn unsettled_request_stays_pending() {
        let (request, responder) = EngineRequest::<u32>::new();
        drop(responder);
        let outcome = timeout(Duration::from_millis(20), resolve(request)).await;
        assert!(outcome.is_err(), "a request dropped unfired must not resolve");
    }
}
