// Worker runs against fake bridges and enumerators

use hookdash::engine::{
    BridgeError, EnumerateError, PackageEntry, PackageSource, ProcessEntry, ProcessSource,
    RefreshError, RefreshMessage, RefreshWorker,
};
use std::sync::Arc;

use crate::common::fakes::{FakeBridge, FakeEnumerator, Gate};
use crate::common::helpers::collect_run;

#[test]
fn test_rows_arrive_in_order_then_one_finished() {
    let enumerator = FakeEnumerator::with_processes(&[(1, "init"), (42, "zygote"), (7, "adbd")]);
    let worker = RefreshWorker::new(ProcessSource::new(Arc::new(enumerator)));

    assert!(worker.start());
    let messages = collect_run(&worker);

    assert_eq!(
        messages,
        vec![
            RefreshMessage::Row(ProcessEntry::new(1, "init")),
            RefreshMessage::Row(ProcessEntry::new(42, "zygote")),
            RefreshMessage::Row(ProcessEntry::new(7, "adbd")),
            RefreshMessage::Finished,
        ]
    );
    assert!(!worker.is_running());
    assert!(worker.receiver().try_recv().is_err(), "nothing after Finished");
}

#[test]
fn test_enumeration_failure_is_one_error_then_finished() {
    let enumerator = FakeEnumerator::failing(EnumerateError::ServerNotRunning);
    let worker = RefreshWorker::new(ProcessSource::new(Arc::new(enumerator)));

    assert!(worker.start());
    let messages = collect_run(&worker);

    assert_eq!(
        messages,
        vec![
            RefreshMessage::Error(RefreshError::ServerNotRunning),
            RefreshMessage::Finished,
        ]
    );
    assert_eq!(
        RefreshError::ServerNotRunning.to_string(),
        "unable to connect to remote frida server: not started"
    );
}

#[test]
fn test_each_enumeration_error_maps_to_its_message() {
    let cases = [
        (
            EnumerateError::TransportClosed,
            "unable to connect to remote frida server: closed",
        ),
        (
            EnumerateError::TimedOut,
            "unable to connect to remote frida server: timedout",
        ),
        (
            EnumerateError::Other("boom".to_string()),
            "something was wrong...",
        ),
    ];

    for (err, expected) in cases {
        let worker = RefreshWorker::new(ProcessSource::new(Arc::new(FakeEnumerator::failing(err))));
        assert!(worker.start());
        let messages = collect_run(&worker);
        match &messages[..] {
            [RefreshMessage::Error(e), RefreshMessage::Finished] => {
                assert_eq!(e.to_string(), expected)
            }
            other => panic!("unexpected messages: {:?}", other),
        }
    }
}

#[test]
fn test_start_while_running_is_refused() {
    let gate = Gate::new();
    let enumerator = Arc::new(FakeEnumerator::with_processes(&[(1, "init")]).gated(gate.clone()));
    let worker = RefreshWorker::new(ProcessSource::new(enumerator.clone()));

    assert!(worker.start());
    assert!(worker.is_running());
    assert!(!worker.start(), "second start must be a no-op");

    gate.open();
    let messages = collect_run(&worker);
    assert_eq!(messages.len(), 2);
    assert_eq!(enumerator.calls(), 1);

    // A finished worker can run again
    assert!(worker.start());
    assert_eq!(collect_run(&worker).len(), 2);
    assert_eq!(enumerator.calls(), 2);
}

#[test]
fn test_packages_are_sorted_by_name() {
    let bridge = FakeBridge::with_packages(&[
        ("com.b", "/data/app/b/base.apk"),
        ("com.a", "/data/app/a/base.apk"),
    ]);
    let worker = RefreshWorker::new(PackageSource::new(Arc::new(bridge)));

    assert!(worker.start());
    assert_eq!(
        collect_run(&worker),
        vec![
            RefreshMessage::Row(PackageEntry::new("com.a", "/data/app/a/base.apk")),
            RefreshMessage::Row(PackageEntry::new("com.b", "/data/app/b/base.apk")),
            RefreshMessage::Finished,
        ]
    );
}

#[test]
fn test_unavailable_bridge_finishes_with_no_rows() {
    let bridge = Arc::new(FakeBridge::unavailable());
    let worker = RefreshWorker::new(PackageSource::new(bridge.clone()));

    assert!(worker.start());
    assert_eq!(collect_run(&worker), vec![RefreshMessage::Finished]);
    assert_eq!(bridge.list_calls(), 0);
}

#[test]
fn test_bridge_failure_is_reported_verbatim() {
    let err = BridgeError::CommandFailed {
        command: "shell pm list packages -f".to_string(),
        stderr: "error: no devices/emulators found".to_string(),
    };
    let expected = err.to_string();
    let worker = RefreshWorker::new(PackageSource::new(Arc::new(FakeBridge::failing(err))));

    assert!(worker.start());
    assert_eq!(
        collect_run(&worker),
        vec![
            RefreshMessage::Error(RefreshError::Bridge(expected)),
            RefreshMessage::Finished,
        ]
    );
}
