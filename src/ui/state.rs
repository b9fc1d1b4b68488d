// Application state management

use chrono::{DateTime, Local};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use crate::config::Config;
use crate::engine::{AndroidBridge, DeviceTarget, Engine, EngineEvent, ProcessEnumerator};
use crate::ui::hooks::HooksPanel;
use crate::ui::input_modal::InputModal;
use crate::ui::packages::{PackageList, PackageListEvent};
use crate::ui::processes::{ProcessList, ProcessListEvent, ProcessSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Packages,
    Processes,
    Hooks,
}

impl Screen {
    pub fn next(self) -> Self {
        match self {
            Self::Packages => Self::Processes,
            Self::Processes => Self::Hooks,
            Self::Hooks => Self::Packages,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Packages => "Packages",
            Self::Processes => "Processes",
            Self::Hooks => "Hooks",
        }
    }
}

/// One line in the status bar
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub at: DateTime<Local>,
}

/// External collaborators the UI is built on
pub struct Collaborators {
    pub bridge: Arc<dyn AndroidBridge>,
    pub enumerator: Arc<dyn ProcessEnumerator>,
    pub device: DeviceTarget,
    pub engine: Rc<dyn Engine>,
    pub engine_events: Receiver<EngineEvent>,
}

pub struct AppState {
    pub current_screen: Screen,
    pub packages: PackageList,
    pub processes: ProcessList,
    pub hooks: HooksPanel,
    pub engine_events: Receiver<EngineEvent>,
    pub status: Option<StatusMessage>,
    pub attached: Option<ProcessSelection>,
    pub install_prompt: Option<InputModal>,
}

impl AppState {
    /// Build every view. Package and process lists start their first refresh.
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        let Collaborators {
            bridge,
            enumerator,
            device,
            engine,
            engine_events,
        } = collaborators;

        Self {
            current_screen: Screen::Processes,
            packages: PackageList::new(bridge, config.packages.show_paths)
                .with_preferences(config.ui.alternate_row_colors, config.ui.hex_style),
            processes: ProcessList::new(enumerator, device)
                .with_preferences(config.ui.alternate_row_colors, config.ui.hex_style),
            hooks: HooksPanel::new(
                engine,
                config.ui.alternate_row_colors,
                config.ui.hex_style,
            ),
            engine_events,
            status: None,
            attached: None,
            install_prompt: None,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
            at: Local::now(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!(%text, "status error");
        self.status = Some(StatusMessage {
            text,
            is_error: true,
            at: Local::now(),
        });
    }

    /// True while a modal or menu owns the keyboard
    pub fn is_capturing_input(&self) -> bool {
        self.install_prompt.is_some()
            || (self.current_screen == Screen::Hooks && self.hooks.is_capturing_input())
    }

    /// Drain every background channel into the views. Runs on the UI thread.
    pub fn poll_background(&mut self) {
        for event in self.packages.poll() {
            match event {
                PackageListEvent::Refreshed { count } => {
                    self.set_status(format!("{} packages", count));
                }
                PackageListEvent::RefreshError(err) => self.set_error(err),
                PackageListEvent::InstallFinished { apk, result } => match result {
                    Ok(()) => self.set_status(format!("installed {}", apk.display())),
                    Err(err) => self.set_error(format!("install failed: {}", err)),
                },
            }
        }

        for event in self.processes.poll() {
            match event {
                ProcessListEvent::Refreshed { count } => {
                    self.set_status(format!("{} processes on {}", count, self.processes.device()));
                }
                ProcessListEvent::RefreshError(err) => self.set_error(err),
            }
        }

        while let Ok(event) = self.engine_events.try_recv() {
            self.hooks.handle_engine_event(event);
        }
    }

    pub fn select_process(&mut self, selection: ProcessSelection) {
        self.set_status(format!("selected {} ({})", selection.name, selection.pid));
        self.attached = Some(selection);
        self.current_screen = Screen::Hooks;
    }
}
