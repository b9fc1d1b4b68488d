// Android bridge: installed packages and APK install through `adb`

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

use super::error::BridgeError;

/// An installed package as reported by the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub package: String,
    pub path: String,
}

impl PackageEntry {
    pub fn new(package: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            path: path.into(),
        }
    }
}

pub trait AndroidBridge: Send + Sync {
    /// Whether a bridge binary is reachable and answers.
    fn is_available(&self) -> bool;

    fn list_packages(&self) -> Result<Vec<PackageEntry>, BridgeError>;

    fn install(&self, apk: &Path) -> Result<(), BridgeError>;
}

/// `adb` command-line bridge, optionally pinned to one device serial.
#[derive(Debug, Clone)]
pub struct Adb {
    program: String,
    serial: Option<String>,
}

impl Default for Adb {
    fn default() -> Self {
        Self::new("adb", None)
    }
}

impl Adb {
    pub fn new(program: impl Into<String>, serial: Option<String>) -> Self {
        Self {
            program: program.into(),
            serial,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<String, BridgeError> {
        let output = self
            .command()
            .args(args)
            .output()
            .map_err(|e| BridgeError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(BridgeError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl AndroidBridge for Adb {
    fn is_available(&self) -> bool {
        match Command::new(&self.program).arg("version").output() {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!(program = %self.program, error = %e, "adb not reachable");
                false
            }
        }
    }

    fn list_packages(&self) -> Result<Vec<PackageEntry>, BridgeError> {
        let stdout = self.run(&["shell", "pm", "list", "packages", "-f"])?;
        Ok(parse_pm_list_packages(&stdout))
    }

    fn install(&self, apk: &Path) -> Result<(), BridgeError> {
        if !apk.is_file() {
            return Err(BridgeError::ApkNotFound(apk.display().to_string()));
        }

        let apk_arg = apk.to_string_lossy();
        let stdout = self.run(&["install", "-r", &apk_arg])?;

        // Older adb versions exit 0 and print the failure on stdout
        if let Some(line) = stdout.lines().find(|l| l.trim_start().starts_with("Failure")) {
            return Err(BridgeError::CommandFailed {
                command: format!("install -r {}", apk_arg),
                stderr: line.trim().to_string(),
            });
        }

        tracing::info!(apk = %apk.display(), "apk installed");
        Ok(())
    }
}

/// Parse `pm list packages -f` output (`package:<apk path>=<name>` per line).
///
/// The path may itself contain `=`, so the split happens on the last one.
/// Lines without a path keep an empty path.
pub fn parse_pm_list_packages(output: &str) -> Vec<PackageEntry> {
    let mut packages = Vec::new();

    for raw in output.lines() {
        let line = raw.trim();
        let Some(payload) = line.strip_prefix("package:") else {
            continue;
        };

        match payload.rsplit_once('=') {
            Some((path, name)) => {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                packages.push(PackageEntry::new(name, path.trim()));
            }
            None if !payload.trim().is_empty() => {
                packages.push(PackageEntry::new(payload.trim(), ""));
            }
            None => {}
        }
    }

    packages
}
