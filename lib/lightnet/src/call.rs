//! Dispatching one resolved request.
//!
//! A [`Call`] is created per logical request and consumed by exactly one of
//! its dispatch methods, so the terminal outcome is delivered once:
//!
//! - [`Call::send`] awaits the whole redirect chain on the caller's task;
//! - [`Call::spawn`] runs it on one spawned task and hands back a
//!   [`PendingCall`];
//! - [`Call::execute`] spawns it for side effects only;
//! - [`Call::enqueue`] spawns it and posts the outcome as a callback to the
//!   origin [`Looper`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::task::JoinHandle;

use crate::looper::{Looper, post_or_fallback};
use crate::{Error, HttpManager, RequestDescriptor, Response, Result};

/// Receiver of the terminal outcome of an enqueued call.
///
/// Exactly one of the two methods is invoked, on the origin looper.
pub trait NetworkResponse: Send + 'static {
    /// The call succeeded with a 2xx response.
    fn on_response(self, response: Response<String>);

    /// The call failed.
    fn on_error(self, error: Error);
}

impl<F> NetworkResponse for F
where
    F: FnOnce(Result<Response<String>>) + Send + 'static,
{
    fn on_response(self, response: Response<String>) {
        self(Ok(response));
    }

    fn on_error(self, error: Error) {
        self(Err(error));
    }
}

/// A resolved request bound to a manager, ready to be dispatched.
#[derive(Debug)]
#[must_use = "a call does nothing until it is sent, spawned, executed or enqueued"]
pub struct Call {
    manager: HttpManager,
    descriptor: RequestDescriptor,
}

impl Call {
    pub(crate) const fn new(manager: HttpManager, descriptor: RequestDescriptor) -> Self {
        Self {
            manager,
            descriptor,
        }
    }

    /// The resolved descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Run the call inline on the current task; no task is spawned.
    pub async fn send(self) -> Result<Response<String>> {
        self.manager.perform(&self.descriptor).await
    }

    /// Run the call on exactly one spawned task.
    pub fn spawn(self) -> PendingCall {
        let Self {
            manager,
            descriptor,
        } = self;
        let task_manager = manager.clone();
        let handle = manager.spawn_task(async move { task_manager.perform(&descriptor).await });
        PendingCall { handle }
    }

    /// Spawn the call and ignore its outcome.
    pub fn execute(self) {
        drop(self.spawn());
    }

    /// Spawn the call and post its outcome to `origin`.
    ///
    /// Only a weak reference to `origin` is kept: when every handle of it is
    /// dropped (or its runner is gone) by the time the call completes, the
    /// callback goes to the manager's main looper instead.
    ///
    /// This always spawns one task. A caller already running on a background
    /// task can avoid it with `send().await` followed by its own
    /// [`Looper::post`].
    pub fn enqueue<R: NetworkResponse>(self, origin: &Looper, callback: R) {
        let Self {
            manager,
            descriptor,
        } = self;
        let origin = origin.downgrade();
        let main = manager.main_looper().clone();

        let task_manager = manager.clone();
        manager.spawn_task(async move {
            let outcome = task_manager.perform(&descriptor).await;
            post_or_fallback(
                &origin,
                &main,
                Box::new(move || match outcome {
                    Ok(response) => callback.on_response(response),
                    Err(error) => callback.on_error(error),
                }),
            );
        });
    }
}

/// Outcome of a spawned call.
#[derive(Debug)]
#[must_use = "dropping a pending call detaches it"]
pub struct PendingCall {
    handle: JoinHandle<Result<Response<String>>>,
}

impl Future for PendingCall {
    type Output = Result<Response<String>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let joined = ready!(Pin::new(&mut self.handle).poll(cx));
        Poll::Ready(joined.unwrap_or_else(|e| Err(Error::connection(format!("call task failed: {e}")))))
    }
}
