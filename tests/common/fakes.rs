// In-memory collaborators for driving the views without adb, frida or a device

use hookdash::engine::{
    AndroidBridge, ApiCall, BridgeError, EnumerateError, Engine, PackageEntry, ProcessEntry,
    ProcessEnumerator,
};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

/// Holds a source inside its enumeration call until the test opens it.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cond.wait(open).unwrap();
        }
    }
}

pub struct FakeBridge {
    pub available: bool,
    pub packages: Vec<PackageEntry>,
    pub failure: Option<BridgeError>,
    pub gate: Option<Arc<Gate>>,
    pub installed: Mutex<Vec<PathBuf>>,
    pub list_calls: AtomicUsize,
}

impl FakeBridge {
    pub fn with_packages(packages: &[(&str, &str)]) -> Self {
        Self {
            available: true,
            packages: packages
                .iter()
                .map(|(name, path)| PackageEntry::new(*name, *path))
                .collect(),
            failure: None,
            gate: None,
            installed: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::with_packages(&[])
        }
    }

    pub fn failing(err: BridgeError) -> Self {
        Self {
            failure: Some(err),
            ..Self::with_packages(&[])
        }
    }

    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl AndroidBridge for FakeBridge {
    fn is_available(&self) -> bool {
        self.available
    }

    fn list_packages(&self) -> Result<Vec<PackageEntry>, BridgeError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.wait();
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.packages.clone()),
        }
    }

    fn install(&self, apk: &Path) -> Result<(), BridgeError> {
        self.installed.lock().unwrap().push(apk.to_path_buf());
        Ok(())
    }
}

pub struct FakeEnumerator {
    pub result: Result<Vec<ProcessEntry>, EnumerateError>,
    pub gate: Option<Arc<Gate>>,
    pub calls: AtomicUsize,
}

impl FakeEnumerator {
    pub fn with_processes(procs: &[(u32, &str)]) -> Self {
        Self {
            result: Ok(procs
                .iter()
                .map(|(pid, name)| ProcessEntry::new(*pid, *name))
                .collect()),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: EnumerateError) -> Self {
        Self {
            result: Err(err),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProcessEnumerator for FakeEnumerator {
    fn enumerate_processes(&self) -> Result<Vec<ProcessEntry>, EnumerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.wait();
        }
        self.result.clone()
    }
}

/// Engine that records every request and answers remote calls with a fixed result.
pub struct RecordingEngine {
    pub java: bool,
    pub api_result: Cell<bool>,
    pub calls: RefCell<Vec<ApiCall>>,
    pub created: RefCell<Vec<(&'static str, String)>>,
}

impl RecordingEngine {
    pub fn new(java: bool, api_result: bool) -> Self {
        Self {
            java,
            api_result: Cell::new(api_result),
            calls: RefCell::new(Vec::new()),
            created: RefCell::new(Vec::new()),
        }
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|c| c.method()).collect()
    }
}

impl Engine for RecordingEngine {
    fn java_available(&self) -> bool {
        self.java
    }

    fn hook_native(&self, input: &str) {
        self.created.borrow_mut().push(("native", input.to_string()));
    }

    fn hook_java(&self, input: &str) {
        self.created.borrow_mut().push(("java", input.to_string()));
    }

    fn hook_onload(&self, module: &str) {
        self.created.borrow_mut().push(("onload", module.to_string()));
    }

    fn api(&self, call: &ApiCall) -> bool {
        self.calls.borrow_mut().push(call.clone());
        self.api_result.get()
    }
}
