use std::{pin::Pin, task::Context};

pub use futures::future::BoxFuture;

/// A future that is polled from the UI loop instead of being awaited.
///
/// Polling uses a no-op waker, so the owner has to call [`PollTask::poll_ready`]
/// again (typically every frame) until it yields the value.
pub struct PollTask<T>(Option<BoxFuture<'static, T>>);

impl<T> PollTask<T> {
    pub fn new(b: BoxFuture<'static, T>) -> Self {
        Self(Some(b))
    }

    /// Returns the result once, `None` while pending or after it was taken.
    pub fn poll_ready(&mut self) -> Option<T> {
        let fut = self.0.as_mut()?;
        let waker = std::task::Waker::noop();
        let mut cx = Context::from_waker(waker);
        match Pin::new(fut).poll(&mut cx) {
            std::task::Poll::Ready(r) => {
                self.0 = None;
                Some(r)
            }
            std::task::Poll::Pending => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_none()
    }
}

impl<T> std::fmt::Debug for PollTask<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PollTask")
            .field(&if self.is_finished() { "finished" } else { "pending" })
            .finish()
    }
}
