//! One-shot completion signalling for native requests.
//!
//! Every native operation returns a request object that later fires exactly
//! one of two signals: success (with the result payload) or failure (with an
//! [`EngineError`]). These types model that pair over [`oneshot`] channels.
//! The consumer half is [`EngineRequest`]; the driver half is
//! [`RequestResponder`], whose consuming methods make a double emission
//! unrepresentable.

use crate::EngineError;
use tokio::sync::oneshot;

/// Receiving half of a request's success signal.
pub type SuccessSignal<T> = oneshot::Receiver<T>;

/// Receiving half of a request's failure signal.
pub type FailureSignal = oneshot::Receiver<EngineError>;

/// Receiving half of an open request's upgrade signal.
///
/// Carries the schema handle when first-time setup is needed. Settles
/// without a value (the sender is dropped) when no upgrade is required.
pub type UpgradeSignal<S> = oneshot::Receiver<S>;

/// A pending native request.
///
/// Exactly one of the two signals fires, exactly once, per the driver
/// contract. A request whose responder was dropped unfired never settles.
#[derive(Debug)]
pub struct EngineRequest<T> {
    success: SuccessSignal<T>,
    failure: FailureSignal,
}

impl<T> EngineRequest<T> {
    /// Create a pending request and the responder that completes it.
    pub fn new() -> (Self, RequestResponder<T>) {
        let (success_tx, success) = oneshot::channel();
        let (failure_tx, failure) = oneshot::channel();
        (Self { success, failure }, RequestResponder { success: success_tx, failure: failure_tx })
    }

    /// Create a request whose success signal has already fired.
    pub fn resolved(value: T) -> Self {
        let (request, responder) = Self::new();
        responder.resolve(value);
        request
    }

    /// Create a request whose failure signal has already fired.
    pub fn rejected(error: EngineError) -> Self {
        let (request, responder) = Self::new();
        responder.reject(error);
        request
    }

    /// Split the request into its two signals for racing.
    pub fn into_signals(self) -> (SuccessSignal<T>, FailureSignal) {
        (self.success, self.failure)
    }
}

/// Driver-side completion handle for a pending request.
///
/// Both completion methods consume the responder, so at most one signal can
/// ever fire. Send failures are ignored: a consumer that abandoned interest
/// in the result simply never observes the outcome.
#[derive(Debug)]
pub struct RequestResponder<T> {
    success: oneshot::Sender<T>,
    failure: oneshot::Sender<EngineError>,
}

impl<T> RequestResponder<T> {
    /// Fire the success signal with the result payload.
    pub fn resolve(self, value: T) {
        let _ = self.success.send(value);
    }

    /// Fire the failure signal with a driver error.
    pub fn reject(self, error: EngineError) {
        let _ = self.failure.send(error);
    }
}

/// A pending open-database request.
///
/// In addition to the completion pair, an open request may first emit an
/// upgrade signal carrying a schema handle when the database needs
/// first-time setup.
///
/// # Ordering Contract
///
/// Drivers settle the upgrade signal (fire it or drop the sender) strictly
/// before either completion signal, and must not complete the open until a
/// delivered schema handle has been dropped. Consumers may therefore await
/// the upgrade signal first without risk of missing the completion.
#[derive(Debug)]
pub struct OpenRequest<C, S> {
    upgrade: UpgradeSignal<S>,
    request: EngineRequest<C>,
}

impl<C, S> OpenRequest<C, S> {
    /// Create a pending open request and the responder that completes it.
    pub fn new() -> (Self, OpenResponder<C, S>) {
        let (upgrade_tx, upgrade) = oneshot::channel();
        let (request, completion) = EngineRequest::new();
        (Self { upgrade, request }, OpenResponder { upgrade: upgrade_tx, completion })
    }

    /// Split into the upgrade signal and the completion request.
    pub fn into_parts(self) -> (UpgradeSignal<S>, EngineRequest<C>) {
        (self.upgrade, self.request)
    }
}

/// Driver-side handle for completing an open request.
#[derive(Debug)]
pub struct OpenResponder<C, S> {
    /// Sender for the upgrade signal. Dropping it unfired tells the consumer
    /// no first-time setup is needed.
    pub upgrade: oneshot::Sender<S>,
    /// Responder for the completion pair.
    pub completion: RequestResponder<C>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn resolved_request_fires_success_once() {
        let (success, failure) = EngineRequest::resolved(7u32).into_signals();
        assert_eq!(success.await.unwrap(), 7);
        // The failure sender was dropped unfired.
        assert!(failure.await.is_err());
    }

    #[tokio::test]
    async fn rejected_request_fires_failure_once() {
        let (success, failure) =
            EngineRequest::<u32>::rejected(EngineError::new("boom")).into_signals();
        assert_eq!(failure.await.unwrap().message(), "boom");
        assert!(success.await.is_err());
    }

    #[tokio::test]
    async fn open_request_settles_upgrade_before_completion() {
        let (open, responder) = OpenRequest::<&str, ()>::new();
        let (upgrade, request) = open.into_parts();

        drop(responder.upgrade);
        responder.completion.resolve("conn");

        assert!(upgrade.await.is_err());
        let (success, _failure) = request.into_signals();
        assert_eq!(success.await.unwrap(), "conn");
    }
}
