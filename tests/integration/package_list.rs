// Package list view: refresh, columns and APK install

use hookdash::engine::BridgeError;
use hookdash::ui::{PackageList, PackageListEvent};
use std::sync::Arc;

use crate::common::fakes::{FakeBridge, Gate};
use crate::common::helpers::settle_packages;

fn rows(list: &PackageList) -> Vec<Vec<String>> {
    list.view
        .model()
        .map(|m| m.rows().to_vec())
        .unwrap_or_default()
}

#[test]
fn test_initial_refresh_fills_sorted_rows_with_paths() {
    let bridge = FakeBridge::with_packages(&[
        ("com.b", "/data/app/b/base.apk"),
        ("com.a", "/data/app/a/base.apk"),
    ]);
    let mut list = PackageList::new(Arc::new(bridge), true);
    assert!(list.is_refreshing(), "construction starts a refresh");
    assert!(!list.refresh_enabled());

    let events = settle_packages(&mut list);

    assert_eq!(events, vec![PackageListEvent::Refreshed { count: 2 }]);
    assert_eq!(
        list.view.headers().unwrap(),
        &["Name".to_string(), "Path".to_string()]
    );
    assert_eq!(
        rows(&list),
        vec![
            vec!["com.a".to_string(), "/data/app/a/base.apk".to_string()],
            vec!["com.b".to_string(), "/data/app/b/base.apk".to_string()],
        ]
    );
    assert!(list.refresh_enabled());
}

#[test]
fn test_name_only_layout() {
    let bridge = FakeBridge::with_packages(&[("com.example", "/data/app/x.apk")]);
    let mut list = PackageList::new(Arc::new(bridge), false);
    settle_packages(&mut list);

    assert!(!list.show_paths());
    assert_eq!(list.view.number_of_cols(), Some(1));
    assert_eq!(list.view.get_item(0), Some(vec!["com.example".to_string()]));
}

#[test]
fn test_refresh_while_running_is_ignored() {
    let gate = Gate::new();
    let bridge = Arc::new(FakeBridge::with_packages(&[("com.a", "")]).gated(gate.clone()));
    let mut list = PackageList::new(bridge.clone(), true);

    assert!(!list.refresh(), "refresh while running must be a no-op");
    assert!(!list.refresh());

    gate.open();
    let events = settle_packages(&mut list);
    assert_eq!(events, vec![PackageListEvent::Refreshed { count: 1 }]);
    assert_eq!(bridge.list_calls(), 1);

    // Enabled again once Finished was handled
    assert!(list.refresh());
    settle_packages(&mut list);
    assert_eq!(list.view.number_of_rows(), Some(1), "refresh replaces rows");
    assert_eq!(bridge.list_calls(), 2);
}

#[test]
fn test_unavailable_bridge_gives_empty_list_without_error() {
    let mut list = PackageList::new(Arc::new(FakeBridge::unavailable()), true);
    let events = settle_packages(&mut list);

    assert_eq!(events, vec![PackageListEvent::Refreshed { count: 0 }]);
    assert_eq!(list.view.number_of_rows(), Some(0));
}

#[test]
fn test_bridge_error_surfaces_as_event() {
    let bridge = FakeBridge::failing(BridgeError::Spawn {
        program: "adb".to_string(),
        reason: "No such file or directory".to_string(),
    });
    let mut list = PackageList::new(Arc::new(bridge), true);
    let events = settle_packages(&mut list);

    assert_eq!(
        events,
        vec![
            PackageListEvent::RefreshError(
                "failed to run adb: No such file or directory".to_string()
            ),
        ]
    );
}

#[test]
fn test_install_runs_in_background_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let apk = dir.path().join("app-debug.apk");
    std::fs::write(&apk, b"PK").unwrap();

    let bridge = Arc::new(FakeBridge::with_packages(&[]));
    let mut list = PackageList::new(bridge.clone(), true);
    settle_packages(&mut list);

    list.install(&apk).unwrap();
    assert_eq!(list.installing(), Some(apk.as_path()));
    assert!(
        list.install(&apk).is_err(),
        "second install while one is pending"
    );

    let events = settle_packages(&mut list);
    assert_eq!(
        events,
        vec![PackageListEvent::InstallFinished {
            apk: apk.clone(),
            result: Ok(()),
        }]
    );
    assert_eq!(*bridge.installed.lock().unwrap(), vec![apk]);
}

#[test]
fn test_install_rejects_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut list = PackageList::new(Arc::new(FakeBridge::with_packages(&[])), true);

    let err = list.install(&dir.path().join("missing.apk")).unwrap_err();
    assert!(err.starts_with("no such apk"), "got: {}", err);
    assert!(list.installing().is_none());
}
