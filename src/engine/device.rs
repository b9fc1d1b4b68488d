// Process enumeration on an instrumentation device

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Command;
use std::str::FromStr;
use std::sync::Mutex;
use sysinfo::System;

use super::error::EnumerateError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

impl ProcessEntry {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

pub trait ProcessEnumerator: Send + Sync {
    fn enumerate_processes(&self) -> Result<Vec<ProcessEntry>, EnumerateError>;
}

/// Which device a session talks to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceTarget {
    #[default]
    Local,
    Usb,
    Remote,
    Host(String),
    Id(String),
}

impl DeviceTarget {
    /// Device selection flags understood by the frida command-line tools.
    pub fn frida_args(&self) -> Vec<String> {
        match self {
            Self::Local => Vec::new(),
            Self::Usb => vec!["-U".to_string()],
            Self::Remote => vec!["-R".to_string()],
            Self::Host(host) => vec!["-H".to_string(), host.clone()],
            Self::Id(id) => vec!["-D".to_string(), id.clone()],
        }
    }
}

impl fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Usb => write!(f, "usb"),
            Self::Remote => write!(f, "remote"),
            Self::Host(host) => write!(f, "host:{}", host),
            Self::Id(id) => write!(f, "id:{}", id),
        }
    }
}

impl FromStr for DeviceTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "local" => return Ok(Self::Local),
            "usb" => return Ok(Self::Usb),
            "remote" => return Ok(Self::Remote),
            _ => {}
        }

        if let Some(host) = s.strip_prefix("host:").filter(|h| !h.is_empty()) {
            return Ok(Self::Host(host.to_string()));
        }
        if let Some(id) = s.strip_prefix("id:").filter(|i| !i.is_empty()) {
            return Ok(Self::Id(id.to_string()));
        }

        Err(format!(
            "unknown device '{}' (expected local, usb, remote, host:<addr> or id:<serial>)",
            s
        ))
    }
}

impl TryFrom<String> for DeviceTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceTarget> for String {
    fn from(value: DeviceTarget) -> Self {
        value.to_string()
    }
}

/// Enumerates processes by running `frida-ps --json` against a device.
#[derive(Debug, Clone)]
pub struct FridaPs {
    program: String,
    target: DeviceTarget,
}

impl FridaPs {
    pub fn new(program: impl Into<String>, target: DeviceTarget) -> Self {
        Self {
            program: program.into(),
            target,
        }
    }

    pub fn target(&self) -> &DeviceTarget {
        &self.target
    }
}

impl ProcessEnumerator for FridaPs {
    fn enumerate_processes(&self) -> Result<Vec<ProcessEntry>, EnumerateError> {
        let output = Command::new(&self.program)
            .args(self.target.frida_args())
            .arg("--json")
            .output()
            .map_err(|e| EnumerateError::Other(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_frida_error(&stderr));
        }

        parse_frida_ps_json(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the JSON array printed by `frida-ps --json`.
pub fn parse_frida_ps_json(json: &str) -> Result<Vec<ProcessEntry>, EnumerateError> {
    serde_json::from_str(json)
        .map_err(|e| EnumerateError::Other(format!("unexpected frida-ps output: {}", e)))
}

/// Map frida's error text onto the categories the UI distinguishes.
pub fn classify_frida_error(stderr: &str) -> EnumerateError {
    let lower = stderr.to_lowercase();

    if lower.contains("timed out") || lower.contains("timedout") || lower.contains("timeout") {
        EnumerateError::TimedOut
    } else if lower.contains(": closed") || lower.contains("connection closed") {
        EnumerateError::TransportClosed
    } else if lower.contains("unable to connect")
        || lower.contains("server not running")
        || lower.contains("servernotrunning")
    {
        EnumerateError::ServerNotRunning
    } else {
        EnumerateError::Other(stderr.trim().to_string())
    }
}

/// Snapshot of the processes on this machine.
#[derive(Debug, Default)]
pub struct LocalProcesses {
    system: Mutex<System>,
}

impl LocalProcesses {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessEnumerator for LocalProcesses {
    fn enumerate_processes(&self) -> Result<Vec<ProcessEntry>, EnumerateError> {
        let mut system = self
            .system
            .lock()
            .map_err(|_| EnumerateError::Other("process table lock poisoned".to_string()))?;
        system.refresh_processes();

        let mut procs: Vec<ProcessEntry> = system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry::new(pid.as_u32(), process.name()))
            .collect();
        procs.sort_by_key(|p| p.pid);

        Ok(procs)
    }
}

/// Pick the enumerator for a device target.
pub fn enumerator_for(target: &DeviceTarget, frida_ps: &str) -> Box<dyn ProcessEnumerator> {
    match target {
        DeviceTarget::Local => Box::new(LocalProcesses::new()),
        other => Box::new(FridaPs::new(frida_ps, other.clone())),
    }
}
