use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hookdash::engine::{RefreshMessage, RefreshSource, RefreshWorker};
use hookdash::ui::{PackageList, PackageListEvent, ProcessList, ProcessListEvent};
use std::thread;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Collect worker messages up to and including the first `Finished`.
pub fn collect_run<S: RefreshSource>(worker: &RefreshWorker<S>) -> Vec<RefreshMessage<S::Item>> {
    let mut messages = Vec::new();
    loop {
        let msg = worker
            .receiver()
            .recv_timeout(TIMEOUT)
            .expect("worker did not finish in time");
        let done = matches!(msg, RefreshMessage::Finished);
        messages.push(msg);
        if done {
            return messages;
        }
    }
}

/// Poll until the package list has no refresh or install in flight.
pub fn settle_packages(list: &mut PackageList) -> Vec<PackageListEvent> {
    let deadline = Instant::now() + TIMEOUT;
    let mut events = Vec::new();
    loop {
        events.extend(list.poll());
        if !list.is_refreshing() && list.installing().is_none() {
            return events;
        }
        assert!(Instant::now() < deadline, "package list did not settle");
        thread::sleep(Duration::from_millis(5));
    }
}

pub fn settle_processes(list: &mut ProcessList) -> Vec<ProcessListEvent> {
    let deadline = Instant::now() + TIMEOUT;
    let mut events = Vec::new();
    loop {
        events.extend(list.poll());
        if !list.is_refreshing() {
            return events;
        }
        assert!(Instant::now() < deadline, "process list did not settle");
        thread::sleep(Duration::from_millis(5));
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

/// Key events for typing `text`
pub fn type_text(text: &str) -> Vec<KeyEvent> {
    text.chars().map(|c| key(KeyCode::Char(c))).collect()
}
