//! Main-thread delivery of replies.
//!
//! Backends call back on threads they own. Every reply is instead
//! executed on one dedicated thread, the equivalent of an application's
//! UI loop, in the order replies were posted.

use crate::error::LicensingResult;
use crate::reply::{Reply, ReplySink};
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Name of the delivery thread.
pub const MAIN_THREAD_NAME: &str = "play-licensing-main";

type Task = Box<dyn FnOnce() + Send + 'static>;

/// A single-threaded executor that every reply is posted to.
///
/// The thread exits once the dispatcher and every handle referring to it
/// are dropped.
pub struct ResultDispatcher {
    tx: mpsc::UnboundedSender<Task>,
    thread_id: ThreadId,
    attached: AtomicBool,
}

impl ResultDispatcher {
    /// Spawns the delivery thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn start() -> LicensingResult<Arc<Self>> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Task>();
        let handle = thread::Builder::new()
            .name(MAIN_THREAD_NAME.into())
            .spawn(move || {
                while let Some(task) = rx.blocking_recv() {
                    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                        warn!("Reply task panicked on the delivery thread");
                    }
                }
                debug!("Result dispatcher stopped");
            })?;

        Ok(Arc::new(Self {
            tx,
            thread_id: handle.thread().id(),
            attached: AtomicBool::new(true),
        }))
    }

    /// Queues a task for the delivery thread.
    ///
    /// Returns `false` if the task was dropped because the dispatcher is
    /// detached or its thread is gone.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        if !self.is_attached() {
            debug!("Dispatcher detached, dropping reply");
            return false;
        }
        if self.tx.send(Box::new(task)).is_err() {
            debug!("Delivery thread gone, dropping reply");
            return false;
        }
        true
    }

    /// The id of the delivery thread.
    #[must_use]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Whether the calling thread is the delivery thread.
    #[must_use]
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Stops delivery. Replies posted afterwards are dropped.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }
}

/// The handle a method-call handler answers through.
///
/// Answering consumes the handle, so at most one reply is possible.
/// [`ResultHandle::on_main`] routes the reply through a
/// [`ResultDispatcher`]; wrapping an already-routed handle is a no-op.
pub struct ResultHandle {
    sink: Option<Box<dyn ReplySink>>,
    main: Option<Arc<ResultDispatcher>>,
}

impl ResultHandle {
    /// A handle that replies on whichever thread answers it.
    pub fn new(sink: impl ReplySink + 'static) -> Self {
        Self {
            sink: Some(Box::new(sink)),
            main: None,
        }
    }

    /// Routes the reply through `dispatcher`, unless already routed.
    #[must_use]
    pub fn on_main(mut self, dispatcher: &Arc<ResultDispatcher>) -> Self {
        if self.main.is_none() {
            self.main = Some(Arc::clone(dispatcher));
        }
        self
    }

    #[must_use]
    pub fn is_on_main(&self) -> bool {
        self.main.is_some()
    }

    pub fn success(self, value: impl Into<Value>) {
        self.send(Reply::success(value));
    }

    pub fn error(self, code: impl Into<String>, message: Option<String>, details: Option<Value>) {
        self.send(Reply::error(code, message, details));
    }

    pub fn not_implemented(self) {
        self.send(Reply::NotImplemented);
    }

    /// Delivers `reply`, on the delivery thread if routed there.
    pub fn send(mut self, reply: Reply) {
        let Some(sink) = self.sink.take() else {
            return;
        };
        match self.main.take() {
            Some(dispatcher) => {
                dispatcher.post(move || sink.send(reply));
            }
            None => sink.send(reply),
        }
    }

    /// Consumes the handle without replying.
    pub fn discard(mut self) {
        if self.sink.take().is_some() {
            debug!("Result handle discarded without a reply");
        }
    }
}

impl Drop for ResultHandle {
    fn drop(&mut self) {
        if self.sink.is_some() {
            warn!("Result handle dropped without a reply");
        }
    }
}
