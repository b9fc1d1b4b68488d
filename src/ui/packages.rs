// Installed package list with background refresh and APK install

use ratatui::{Frame, layout::Rect};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::config::{HexCase, RowColoring};
use crate::engine::{AndroidBridge, PackageEntry, PackageSource, RefreshMessage, RefreshWorker};
use crate::ui::list_view::{ListView, TableModel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageListEvent {
    /// A refresh run finished cleanly with `count` rows
    Refreshed { count: usize },
    RefreshError(String),
    InstallFinished {
        apk: PathBuf,
        result: Result<(), String>,
    },
}

type InstallResult = (PathBuf, Result<(), String>);

pub struct PackageList {
    pub view: ListView,
    worker: RefreshWorker<PackageSource>,
    refreshing: bool,
    rows_this_run: usize,
    run_failed: bool,
    show_paths: bool,
    install_tx: Sender<InstallResult>,
    install_rx: Receiver<InstallResult>,
    installing: Option<PathBuf>,
}

impl PackageList {
    /// Build the view and kick off the first refresh.
    pub fn new(bridge: Arc<dyn AndroidBridge>, show_paths: bool) -> Self {
        let headers: &[&str] = if show_paths { &["Name", "Path"] } else { &["Name"] };
        let (install_tx, install_rx) = mpsc::channel();

        let mut list = Self {
            view: ListView::with_model(TableModel::new(headers.iter().copied())),
            worker: RefreshWorker::new(PackageSource::new(bridge)),
            refreshing: false,
            rows_this_run: 0,
            run_failed: false,
            show_paths,
            install_tx,
            install_rx,
            installing: None,
        };
        list.refresh();
        list
    }

    /// Apply the list display preferences from the `[ui]` config section.
    pub fn with_preferences(mut self, row_coloring: RowColoring, hex_case: HexCase) -> Self {
        self.view.row_coloring = row_coloring;
        self.view.hex_case = hex_case;
        self
    }

    pub fn show_paths(&self) -> bool {
        self.show_paths
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// The refresh control is disabled while a run is in flight.
    pub fn refresh_enabled(&self) -> bool {
        !self.refreshing
    }

    /// Clear and reload. Does nothing while a refresh is running.
    pub fn refresh(&mut self) -> bool {
        if self.refreshing || self.worker.is_running() {
            return false;
        }

        self.view.clear();
        self.rows_this_run = 0;
        self.run_failed = false;
        self.refreshing = self.worker.start();
        if self.refreshing {
            tracing::info!("package refresh started");
        }
        self.refreshing
    }

    pub fn installing(&self) -> Option<&Path> {
        self.installing.as_deref()
    }

    /// Install an APK on a background thread. The outcome arrives as
    /// [`PackageListEvent::InstallFinished`] from [`poll`](Self::poll).
    pub fn install(&mut self, apk: &Path) -> Result<(), String> {
        if self.installing.is_some() {
            return Err("an install is already running".to_string());
        }
        if !apk.is_file() {
            return Err(format!("no such apk: {}", apk.display()));
        }

        let bridge = Arc::clone(self.worker.source().bridge());
        let tx = self.install_tx.clone();
        let apk = apk.to_path_buf();
        self.installing = Some(apk.clone());

        tracing::info!(apk = %apk.display(), "installing apk");
        let spawned = thread::Builder::new()
            .name("install".to_string())
            .spawn(move || {
                let result = bridge.install(&apk).map_err(|e| e.to_string());
                let _ = tx.send((apk, result));
            });

        if let Err(e) = spawned {
            self.installing = None;
            return Err(format!("failed to start install: {}", e));
        }
        Ok(())
    }

    /// Drain worker messages into the table. Call from the UI loop.
    pub fn poll(&mut self) -> Vec<PackageListEvent> {
        let mut events = Vec::new();

        while let Ok(msg) = self.worker.receiver().try_recv() {
            match msg {
                RefreshMessage::Row(entry) => self.add_package(entry),
                RefreshMessage::Error(err) => {
                    self.run_failed = true;
                    events.push(PackageListEvent::RefreshError(err.to_string()));
                }
                RefreshMessage::Finished => {
                    self.refreshing = false;
                    tracing::info!(count = self.rows_this_run, "package refresh finished");
                    if !self.run_failed {
                        events.push(PackageListEvent::Refreshed {
                            count: self.rows_this_run,
                        });
                    }
                }
            }
        }

        while let Ok((apk, result)) = self.install_rx.try_recv() {
            self.installing = None;
            events.push(PackageListEvent::InstallFinished { apk, result });
        }

        events
    }

    fn add_package(&mut self, entry: PackageEntry) {
        let cells = if self.show_paths {
            vec![entry.package, entry.path]
        } else {
            vec![entry.package]
        };
        self.view.append_row(cells);
        self.rows_this_run += 1;
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.refreshing {
            " Packages (refreshing...) ".to_string()
        } else {
            format!(" Packages ({}) ", self.view.number_of_rows().unwrap_or(0))
        };
        self.view.render(frame, area, &title);
    }
}
