// Hook records and the engine facade the hooks panel talks to

use std::cell::RefCell;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Native,
    Java,
    OnLoad,
}

impl HookKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Java => "java",
            Self::OnLoad => "on-load",
        }
    }
}

/// An instrumentation point owned by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub kind: HookKind,
    /// What the user typed: a symbol, `class.method`, or a module name.
    pub input: String,
    /// Resolved address, 0 while unresolved.
    pub ptr: u64,
    pub condition: Option<String>,
    pub logic: Option<String>,
}

impl Hook {
    pub fn new(kind: HookKind, input: impl Into<String>, ptr: u64) -> Self {
        Self {
            kind,
            input: input.into(),
            ptr,
            condition: None,
            logic: None,
        }
    }

    pub fn native(input: impl Into<String>, ptr: u64) -> Self {
        Self::new(HookKind::Native, input, ptr)
    }

    pub fn java(input: impl Into<String>) -> Self {
        Self::new(HookKind::Java, input, 0)
    }

    pub fn onload(module: impl Into<String>) -> Self {
        Self::new(HookKind::OnLoad, module, 0)
    }

    pub fn is_resolved(&self) -> bool {
        self.ptr != 0
    }

    /// Key for condition/logic updates: the address once resolved, else the input.
    pub fn target(&self) -> HookTarget {
        if self.is_resolved() {
            HookTarget::Address(self.ptr)
        } else {
            HookTarget::Symbol(self.input.clone())
        }
    }

    /// Key for deletion. Native hooks go by address, the others by input.
    pub fn delete_target(&self) -> HookTarget {
        match self.kind {
            HookKind::Native if self.is_resolved() => HookTarget::Address(self.ptr),
            _ => HookTarget::Symbol(self.input.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HookTarget {
    Address(u64),
    Symbol(String),
}

impl fmt::Display for HookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(ptr) => write!(f, "{:#x}", ptr),
            Self::Symbol(s) => write!(f, "{}", s),
        }
    }
}

/// Remote calls the panel issues against the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    SetHookCondition { target: HookTarget, condition: String },
    SetHookLogic { target: HookTarget, logic: String },
    DeleteHook { target: HookTarget },
}

impl ApiCall {
    /// Name of the remote method on the agent side.
    pub fn method(&self) -> &'static str {
        match self {
            Self::SetHookCondition { .. } => "setHookCondition",
            Self::SetHookLogic { .. } => "setHookLogic",
            Self::DeleteHook { .. } => "deleteHook",
        }
    }

    pub fn target(&self) -> &HookTarget {
        match self {
            Self::SetHookCondition { target, .. }
            | Self::SetHookLogic { target, .. }
            | Self::DeleteHook { target } => target,
        }
    }
}

/// Notifications from the engine back to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    NativeHookCreated(Hook),
    JavaHookCreated(Hook),
    OnLoadHookCreated(Option<Hook>),
    ModuleLoaded { module: String, base: u64 },
}

/// The instrumentation engine as seen from the UI.
///
/// Hook creation is asynchronous: the created record comes back later as an
/// [`EngineEvent`]. `api` only reports success or failure.
pub trait Engine {
    fn java_available(&self) -> bool;

    fn hook_native(&self, input: &str);

    fn hook_java(&self, input: &str);

    fn hook_onload(&self, module: &str);

    fn api(&self, call: &ApiCall) -> bool;
}

/// Engine for sessions without an attached agent.
///
/// Hooks are recorded in-process and echoed back as events, symbols that look
/// like hex addresses resolve to that address, and remote calls succeed when
/// they name a known hook.
pub struct LocalEngine {
    java_available: bool,
    hooks: RefCell<Vec<Hook>>,
    tx: Sender<EngineEvent>,
}

impl LocalEngine {
    pub fn new(java_available: bool) -> (Self, Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                java_available,
                hooks: RefCell::new(Vec::new()),
                tx,
            },
            rx,
        )
    }

    pub fn hooks(&self) -> Vec<Hook> {
        self.hooks.borrow().clone()
    }

    /// Simulate a module load so pending on-load hooks fire.
    pub fn module_loaded(&self, module: &str, base: u64) {
        let watched = self
            .hooks
            .borrow()
            .iter()
            .any(|h| h.kind == HookKind::OnLoad && h.input == module);
        if watched {
            let _ = self.tx.send(EngineEvent::ModuleLoaded {
                module: module.to_string(),
                base,
            });
        }
    }

    fn position(&self, target: &HookTarget) -> Option<usize> {
        self.hooks.borrow().iter().position(|h| match target {
            HookTarget::Address(ptr) => h.ptr == *ptr,
            HookTarget::Symbol(s) => &h.input == s,
        })
    }

    fn record(&self, hook: Hook) -> bool {
        let mut hooks = self.hooks.borrow_mut();
        if hooks.iter().any(|h| h.kind == hook.kind && h.input == hook.input) {
            tracing::debug!(input = %hook.input, "hook already present");
            return false;
        }
        hooks.push(hook);
        true
    }
}

impl Engine for LocalEngine {
    fn java_available(&self) -> bool {
        self.java_available
    }

    fn hook_native(&self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        let hook = Hook::native(input, parse_address(input).unwrap_or(0));
        if self.record(hook.clone()) {
            let _ = self.tx.send(EngineEvent::NativeHookCreated(hook));
        }
    }

    fn hook_java(&self, input: &str) {
        let input = input.trim();
        if !self.java_available || input.is_empty() {
            return;
        }
        let hook = Hook::java(input);
        if self.record(hook.clone()) {
            let _ = self.tx.send(EngineEvent::JavaHookCreated(hook));
        }
    }

    fn hook_onload(&self, module: &str) {
        let module = module.trim();
        if !self.java_available || module.is_empty() {
            return;
        }
        let hook = Hook::onload(module);
        let created = self.record(hook.clone()).then_some(hook);
        let _ = self.tx.send(EngineEvent::OnLoadHookCreated(created));
    }

    fn api(&self, call: &ApiCall) -> bool {
        let Some(idx) = self.position(call.target()) else {
            tracing::debug!(method = call.method(), target = %call.target(), "no such hook");
            return false;
        };

        let mut hooks = self.hooks.borrow_mut();
        match call {
            ApiCall::SetHookCondition { condition, .. } => {
                hooks[idx].condition = Some(condition.clone());
            }
            ApiCall::SetHookLogic { logic, .. } => {
                hooks[idx].logic = Some(logic.clone());
            }
            ApiCall::DeleteHook { .. } => {
                hooks.remove(idx);
            }
        }
        true
    }
}

/// Parse `0x`-prefixed hex into an address.
pub fn parse_address(s: &str) -> Option<u64> {
    let digits = s
        .trim()
        .strip_prefix("0x")
        .or_else(|| s.trim().strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok().filter(|ptr| *ptr != 0)
}
