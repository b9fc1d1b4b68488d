// Running processes on the instrumentation device

use ratatui::{Frame, layout::Rect};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{HexCase, RowColoring};
use crate::engine::{
    DeviceTarget, ProcessEntry, ProcessEnumerator, ProcessSource, RefreshMessage, RefreshWorker,
};
use crate::ui::list_view::{ListView, TableModel};

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessListEvent {
    Refreshed { count: usize },
    RefreshError(String),
}

/// A process the user picked from the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSelection {
    pub pid: u32,
    pub name: String,
}

pub struct ProcessList {
    pub view: ListView,
    worker: RefreshWorker<ProcessSource>,
    device: DeviceTarget,
    refreshing: bool,
    rows_this_run: usize,
    run_failed: bool,
    last_click: Option<(usize, Instant)>,
}

impl ProcessList {
    /// Build the view and kick off the first refresh.
    pub fn new(enumerator: Arc<dyn ProcessEnumerator>, device: DeviceTarget) -> Self {
        let mut list = Self {
            view: ListView::with_model(TableModel::new(["PID", "Name"])),
            worker: RefreshWorker::new(ProcessSource::new(enumerator)),
            device,
            refreshing: false,
            rows_this_run: 0,
            run_failed: false,
            last_click: None,
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

    pub fn device(&self) -> &DeviceTarget {
        &self.device
    }

    /// Point later refreshes at another device. A run in flight finishes
    /// against the old one.
    pub fn set_device(&mut self, device: DeviceTarget, enumerator: Arc<dyn ProcessEnumerator>) {
        tracing::info!(%device, "process list device changed");
        self.device = device;
        self.worker.set_source(ProcessSource::new(enumerator));
    }

    pub fn clear(&mut self) {
        self.view.clear();
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn refresh_enabled(&self) -> bool {
        !self.refreshing
    }

    /// Clear and reload. Does nothing while a refresh is running.
    pub fn refresh(&mut self) -> bool {
        if self.refreshing || self.worker.is_running() {
            return false;
        }

        self.clear();
        self.rows_this_run = 0;
        self.run_failed = false;
        self.refreshing = self.worker.start();
        if self.refreshing {
            tracing::info!(device = %self.device, "process refresh started");
        }
        self.refreshing
    }

    pub fn poll(&mut self) -> Vec<ProcessListEvent> {
        let mut events = Vec::new();

        while let Ok(msg) = self.worker.receiver().try_recv() {
            match msg {
                RefreshMessage::Row(entry) => self.add_process(entry),
                RefreshMessage::Error(err) => {
                    self.run_failed = true;
                    events.push(ProcessListEvent::RefreshError(err.to_string()));
                }
                RefreshMessage::Finished => {
                    self.refreshing = false;
                    tracing::info!(count = self.rows_this_run, "process refresh finished");
                    if !self.run_failed {
                        events.push(ProcessListEvent::Refreshed {
                            count: self.rows_this_run,
                        });
                    }
                }
            }
        }

        events
    }

    fn add_process(&mut self, entry: ProcessEntry) {
        self.view
            .append_row(vec![entry.pid.to_string(), entry.name]);
        self.rows_this_run += 1;
    }

    /// Selection for a row, read back from the displayed cells.
    ///
    /// Returns `None` when the row is missing or its PID cell is not a number.
    pub fn activate(&self, row: usize) -> Option<ProcessSelection> {
        let pid_text = self.view.get_item_text(row, 0)?;
        let name = self.view.get_item_text(row, 1)?.to_string();

        match pid_text.trim().parse::<u32>() {
            Ok(pid) => {
                tracing::info!(pid, %name, "process selected");
                Some(ProcessSelection { pid, name })
            }
            Err(_) => {
                tracing::warn!(row, pid = pid_text, "ignoring selection with non-numeric pid");
                None
            }
        }
    }

    pub fn activate_selected(&self) -> Option<ProcessSelection> {
        self.activate(self.view.selected()?)
    }

    /// Left click on a row; the second click on the same row within the
    /// double-click window activates it.
    pub fn click(&mut self, row: usize, at: Instant) -> Option<ProcessSelection> {
        self.view.select(Some(row));

        let is_double = matches!(
            self.last_click,
            Some((last_row, last_at)) if last_row == row && at.duration_since(last_at) <= DOUBLE_CLICK_WINDOW
        );

        if is_double {
            self.last_click = None;
            self.activate(row)
        } else {
            self.last_click = Some((row, at));
            None
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.refreshing {
            format!(" Processes on {} (refreshing...) ", self.device)
        } else {
            format!(
                " Processes on {} ({}) ",
                self.device,
                self.view.number_of_rows().unwrap_or(0)
            )
        };
        self.view.render(frame, area, &title);
    }
}
