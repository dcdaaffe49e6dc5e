mod common;

use common::{recording_handle, test_identity, REPLY_TIMEOUT};
use play_licensing::{
    CheckOutcome, LicenseBackend, LicenseCheckerCallback, LicenseClient, LicenseConfig,
    MethodCall, Reply, RequestRouter, ResultDispatcher, ResultHandle, ScriptedBackend,
    SessionConfig, LICENSED, MAIN_THREAD_NAME,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn counting_handle(count: &Arc<AtomicUsize>) -> ResultHandle {
    let count = Arc::clone(count);
    ResultHandle::new(move |_reply: Reply| {
        count.fetch_add(1, Ordering::SeqCst);
    })
}

// ── Delivery thread ──────────────────────────────────────────────

#[test]
fn delivery_thread_is_named() {
    let dispatcher = ResultDispatcher::start().unwrap();
    let (tx, rx) = mpsc::channel();
    assert!(dispatcher.post(move || {
        tx.send(thread::current().name().map(str::to_string)).unwrap();
    }));
    let name = rx.recv_timeout(REPLY_TIMEOUT).unwrap();
    assert_eq!(name.as_deref(), Some(MAIN_THREAD_NAME));
}

#[test]
fn tasks_run_in_submission_order() {
    let dispatcher = ResultDispatcher::start().unwrap();
    let (tx, rx) = mpsc::channel();
    for i in 0..100 {
        let tx = tx.clone();
        dispatcher.post(move || tx.send(i).unwrap());
    }
    let seen: Vec<i32> = (0..100).map(|_| rx.recv_timeout(REPLY_TIMEOUT).unwrap()).collect();
    assert_eq!(seen, (0..100).collect::<Vec<_>>());
}

#[test]
fn is_current_only_on_delivery_thread() {
    let dispatcher = ResultDispatcher::start().unwrap();
    assert!(!dispatcher.is_current());

    let (tx, rx) = mpsc::channel();
    let inner = Arc::clone(&dispatcher);
    dispatcher.post(move || tx.send(inner.is_current()).unwrap());
    assert!(rx.recv_timeout(REPLY_TIMEOUT).unwrap());
}

#[test]
fn panicking_task_does_not_stop_delivery() {
    let dispatcher = ResultDispatcher::start().unwrap();
    dispatcher.post(|| panic!("sink failure"));

    let (tx, rx) = mpsc::channel();
    dispatcher.post(move || tx.send(()).unwrap());
    assert!(rx.recv_timeout(REPLY_TIMEOUT).is_ok());
}

#[test]
fn detached_dispatcher_drops_tasks() {
    let dispatcher = ResultDispatcher::start().unwrap();
    dispatcher.detach();
    assert!(!dispatcher.is_attached());

    let (tx, rx) = mpsc::channel::<()>();
    assert!(!dispatcher.post(move || tx.send(()).unwrap()));
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

// ── Cross-thread delivery ────────────────────────────────────────

#[test]
fn backend_reply_lands_on_delivery_thread() {
    let dispatcher = ResultDispatcher::start().unwrap();
    let client = LicenseClient::new(
        LicenseConfig::default(),
        test_identity(),
        Arc::new(ScriptedBackend::new(CheckOutcome::Allowed(LICENSED))),
    );
    let router = RequestRouter::new(client, Arc::clone(&dispatcher));

    let (handle, rx) = recording_handle();
    router.handle(MethodCall::new("check"), handle);

    let (reply, thread_id) = rx.recv_timeout(REPLY_TIMEOUT).unwrap();
    assert_eq!(reply, Reply::success(LICENSED));
    assert_eq!(thread_id, dispatcher.thread_id());
    assert_ne!(thread_id, thread::current().id());
}

/// Calls back on the thread that started the check, before returning.
struct InlineBackend;

impl LicenseBackend for InlineBackend {
    fn check_access(self: Box<Self>, callback: Box<dyn LicenseCheckerCallback>) {
        callback.dont_allow(3);
    }
}

#[test]
fn synchronous_callback_still_lands_on_delivery_thread() {
    let dispatcher = ResultDispatcher::start().unwrap();
    let factory = |_: SessionConfig| -> Box<dyn LicenseBackend> { Box::new(InlineBackend) };
    let client = LicenseClient::new(LicenseConfig::default(), test_identity(), Arc::new(factory));
    let router = RequestRouter::new(client, Arc::clone(&dispatcher));

    let (handle, rx) = recording_handle();
    router.handle(MethodCall::new("isAllowed"), handle);

    let (reply, thread_id) = rx.recv_timeout(REPLY_TIMEOUT).unwrap();
    assert_eq!(reply, Reply::success(false));
    assert_eq!(thread_id, dispatcher.thread_id());
}

#[test]
fn each_request_replies_exactly_once() {
    let dispatcher = ResultDispatcher::start().unwrap();
    let client = LicenseClient::new(
        LicenseConfig::default(),
        test_identity(),
        Arc::new(ScriptedBackend::new(CheckOutcome::ApplicationError(999))),
    );
    let router = RequestRouter::new(client, Arc::clone(&dispatcher));

    let receivers: Vec<_> = ["check", "isAllowed", "foo"]
        .into_iter()
        .map(|method| {
            let (handle, rx) = recording_handle();
            router.handle(MethodCall::new(method), handle);
            (method, rx)
        })
        .collect();

    for (method, rx) in receivers {
        let (_, thread_id) = rx.recv_timeout(REPLY_TIMEOUT).unwrap();
        assert_eq!(thread_id, dispatcher.thread_id(), "{method}");
        assert!(
            rx.recv_timeout(Duration::from_millis(50)).is_err(),
            "{method} replied twice"
        );
    }
}

// ── Handle wrapping ──────────────────────────────────────────────

#[test]
fn unwrapped_handle_replies_on_caller_thread() {
    let (handle, rx) = recording_handle();
    assert!(!handle.is_on_main());
    handle.success(true);

    let (reply, thread_id) = rx.recv_timeout(REPLY_TIMEOUT).unwrap();
    assert_eq!(reply, Reply::success(true));
    assert_eq!(thread_id, thread::current().id());
}

#[test]
fn wrapping_twice_delivers_once() {
    let dispatcher = ResultDispatcher::start().unwrap();
    let count = Arc::new(AtomicUsize::new(0));

    let handle = counting_handle(&count).on_main(&dispatcher).on_main(&dispatcher);
    assert!(handle.is_on_main());
    handle.not_implemented();

    let (tx, rx) = mpsc::channel();
    dispatcher.post(move || tx.send(()).unwrap());
    rx.recv_timeout(REPLY_TIMEOUT).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn rewrapping_keeps_first_dispatcher() {
    let first = ResultDispatcher::start().unwrap();
    let second = ResultDispatcher::start().unwrap();

    let (handle, rx) = recording_handle();
    let handle = handle.on_main(&first).on_main(&second);
    handle.error("7", Some("failed".into()), None);

    let (reply, thread_id) = rx.recv_timeout(REPLY_TIMEOUT).unwrap();
    assert_eq!(reply, Reply::error("7", Some("failed".into()), None));
    assert_eq!(thread_id, first.thread_id());
}

#[test]
fn router_rewraps_already_wrapped_handle() {
    let dispatcher = ResultDispatcher::start().unwrap();
    let client = LicenseClient::new(
        LicenseConfig::default(),
        test_identity(),
        Arc::new(ScriptedBackend::new(CheckOutcome::Allowed(LICENSED))),
    );
    let router = RequestRouter::new(client, Arc::clone(&dispatcher));

    let (handle, rx) = recording_handle();
    router.handle(MethodCall::new("isAllowed"), handle.on_main(&dispatcher));

    let (reply, thread_id) = rx.recv_timeout(REPLY_TIMEOUT).unwrap();
    assert_eq!(reply, Reply::success(true));
    assert_eq!(thread_id, dispatcher.thread_id());
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}
