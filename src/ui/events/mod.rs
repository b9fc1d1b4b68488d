// Event handling and main UI loop

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
};
use std::io;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::ui::components::{Footer, Header, StatusBar};
use crate::ui::state::{AppState, Collaborators, Screen};

mod hooks;
mod packages;
mod processes;

// Event types sent from dedicated event thread to main loop
enum UiEvent {
    Input(Event), // Keyboard, mouse, or other terminal events
    Tick,         // Periodic wake-up to drain background channels
}

/// Spawn a dedicated thread for event polling.
fn spawn_event_thread(tx: mpsc::Sender<UiEvent>) {
    let tick_rate = Duration::from_millis(50);

    thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::from_secs(0));

            if event::poll(timeout).unwrap_or(false) {
                if let Ok(evt) = event::read() {
                    if tx.send(UiEvent::Input(evt)).is_err() {
                        break; // Main thread dropped the receiver
                    }
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.send(UiEvent::Tick).is_err() {
                    break;
                }
                last_tick = Instant::now();
            }
        }
    });
}

pub fn run_ui(config: &Config, collaborators: Collaborators) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(config, collaborators);

    let (event_tx, event_rx) = mpsc::channel();
    spawn_event_thread(event_tx);

    let result = run_app(&mut terminal, &mut app_state, event_rx);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    event_rx: Receiver<UiEvent>,
) -> io::Result<()> {
    loop {
        let mut pending_inputs: Vec<Event> = Vec::new();

        // Block for one event, then drain whatever else is queued
        match event_rx.recv() {
            Ok(UiEvent::Input(ev)) => pending_inputs.push(ev),
            Ok(UiEvent::Tick) => {}
            Err(_) => return Ok(()),
        }
        while let Ok(evt) = event_rx.try_recv() {
            if let UiEvent::Input(ev) = evt {
                pending_inputs.push(ev);
            }
        }

        // Background results first so input acts on current rows
        state.poll_background();

        for input in pending_inputs {
            match input {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(key, state) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => handle_mouse(mouse, state),
                _ => {}
            }
        }

        terminal.draw(|frame| draw(frame, state))?;
    }
}

/// Render the whole application
pub fn draw(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header / tabs
            Constraint::Min(0),    // Current screen
            Constraint::Length(1), // Status
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let attached = state
        .attached
        .as_ref()
        .map(|sel| (sel.pid, sel.name.as_str()));
    frame.render_widget(
        Header {
            current: state.current_screen,
            attached,
        },
        chunks[0],
    );

    let footer = match state.current_screen {
        Screen::Packages => {
            state.packages.render(frame, chunks[1]);
            Footer::packages(state.packages.refresh_enabled())
        }
        Screen::Processes => {
            state.processes.render(frame, chunks[1]);
            Footer::processes(state.processes.refresh_enabled())
        }
        Screen::Hooks => {
            state.hooks.render(frame, chunks[1]);
            Footer::hooks(state.hooks.java_available())
        }
    };

    frame.render_widget(
        StatusBar {
            status: state.status.as_ref(),
        },
        chunks[2],
    );
    frame.render_widget(footer, chunks[3]);

    if let Some(prompt) = state.install_prompt.as_ref() {
        prompt.render(frame);
    }
}

fn should_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Returns true when the application should exit
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> bool {
    // Ctrl+C always quits; plain q only when no text entry is open
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.install_prompt.is_some() {
        packages::handle_install_prompt_key(key, state);
        return false;
    }

    if !state.is_capturing_input() {
        if should_quit(&key) {
            return true;
        }
        let jump = match key.code {
            KeyCode::Tab => Some(state.current_screen.next()),
            KeyCode::Char('1') => Some(Screen::Packages),
            KeyCode::Char('2') => Some(Screen::Processes),
            KeyCode::Char('3') => Some(Screen::Hooks),
            _ => None,
        };
        if let Some(screen) = jump {
            state.current_screen = screen;
            return false;
        }
    }

    match state.current_screen {
        Screen::Packages => packages::handle_packages_key(key, state),
        Screen::Processes => processes::handle_processes_key(key, state),
        Screen::Hooks => hooks::handle_hooks_key(key, state),
    }

    false
}

pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) {
    if state.install_prompt.is_some() {
        return;
    }

    match state.current_screen {
        Screen::Packages => packages::handle_packages_mouse(mouse, state),
        Screen::Processes => processes::handle_processes_mouse(mouse, state),
        Screen::Hooks => hooks::handle_hooks_mouse(mouse, state),
    }
}
