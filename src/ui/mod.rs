// Terminal UI using Ratatui

pub mod components;
pub mod context_menu;
pub mod events;
pub mod hooks;
pub mod input_modal;
pub mod list_view;
pub mod packages;
pub mod processes;
pub mod state;

pub use context_menu::{ContextMenu, MenuEntry};
pub use events::{draw, handle_key, handle_mouse, run_ui};
pub use hooks::{HooksPanel, MenuAction};
pub use input_modal::{InputKind, InputModal, InputOutcome};
pub use list_view::{ListView, TableModel};
pub use packages::{PackageList, PackageListEvent};
pub use processes::{ProcessList, ProcessListEvent, ProcessSelection};
pub use state::{AppState, Collaborators, Screen, StatusMessage};
