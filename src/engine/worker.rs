// Background refresh worker for list views

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use super::adb::{AndroidBridge, PackageEntry};
use super::device::{ProcessEntry, ProcessEnumerator};
use super::error::RefreshError;

/// Something a list view can be refreshed from.
pub trait RefreshSource: Send + Sync + 'static {
    type Item: Send + 'static;

    /// One synchronous enumeration. Runs on the worker thread.
    fn fetch(&self) -> Result<Vec<Self::Item>, RefreshError>;
}

/// Message from a worker to the view that owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshMessage<T> {
    /// One result, in source order
    Row(T),

    /// The run failed; sent at most once per run
    Error(RefreshError),

    /// Always the last message of a run
    Finished,
}

/// Runs one refresh at a time on a spawned thread and streams the results
/// back over a channel.
pub struct RefreshWorker<S: RefreshSource> {
    source: Arc<S>,
    running: Arc<AtomicBool>,
    tx: Sender<RefreshMessage<S::Item>>,
    rx: Receiver<RefreshMessage<S::Item>>,
}

impl<S: RefreshSource> RefreshWorker<S> {
    pub fn new(source: S) -> Self {
        let (tx, rx) = mpsc::channel();

        Self {
            source: Arc::new(source),
            running: Arc::new(AtomicBool::new(false)),
            tx,
            rx,
        }
    }

    /// Get the receiver for worker messages
    pub fn receiver(&self) -> &Receiver<RefreshMessage<S::Item>> {
        &self.rx
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Replace the source used by later runs. A run in flight keeps its own.
    pub fn set_source(&mut self, source: S) {
        self.source = Arc::new(source);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start a run. Returns `false` without doing anything if one is already
    /// in flight.
    pub fn start(&self) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("refresh already running");
            return false;
        }

        let source = Arc::clone(&self.source);
        let running = Arc::clone(&self.running);
        let tx = self.tx.clone();

        let spawned = thread::Builder::new()
            .name("refresh".to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| source.fetch()))
                    .unwrap_or_else(|_| {
                        tracing::error!("refresh source panicked");
                        Err(RefreshError::Other)
                    });

                match outcome {
                    Ok(items) => {
                        tracing::debug!(count = items.len(), "refresh produced rows");
                        for item in items {
                            let _ = tx.send(RefreshMessage::Row(item));
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "refresh failed");
                        let _ = tx.send(RefreshMessage::Error(err));
                    }
                }

                // Clear before the terminal message so a consumer that has
                // seen Finished can start the next run right away
                running.store(false, Ordering::SeqCst);
                let _ = tx.send(RefreshMessage::Finished);
            });

        if let Err(e) = spawned {
            tracing::error!(error = %e, "failed to spawn refresh thread");
            self.running.store(false, Ordering::SeqCst);
            return false;
        }

        true
    }
}

/// Installed packages, sorted by name.
///
/// An unreachable bridge yields an empty listing rather than an error.
pub struct PackageSource {
    bridge: Arc<dyn AndroidBridge>,
}

impl PackageSource {
    pub fn new(bridge: Arc<dyn AndroidBridge>) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &Arc<dyn AndroidBridge> {
        &self.bridge
    }
}

impl RefreshSource for PackageSource {
    type Item = PackageEntry;

    fn fetch(&self) -> Result<Vec<PackageEntry>, RefreshError> {
        if !self.bridge.is_available() {
            tracing::debug!("android bridge unavailable, skipping package listing");
            return Ok(Vec::new());
        }

        let mut packages = self.bridge.list_packages()?;
        packages.sort_by(|a, b| a.package.cmp(&b.package));
        Ok(packages)
    }
}

/// Processes on a device, in the order the device reports them.
pub struct ProcessSource {
    enumerator: Arc<dyn ProcessEnumerator>,
}

impl ProcessSource {
    pub fn new(enumerator: Arc<dyn ProcessEnumerator>) -> Self {
        Self { enumerator }
    }
}

impl RefreshSource for ProcessSource {
    type Item = ProcessEntry;

    fn fetch(&self) -> Result<Vec<ProcessEntry>, RefreshError> {
        Ok(self.enumerator.enumerate_processes()?)
    }
}
