// External collaborators and the refresh machinery - independent of UI

pub mod adb;
pub mod device;
pub mod error;
pub mod session;
pub mod worker;

pub use adb::{Adb, AndroidBridge, PackageEntry};
pub use device::{
    DeviceTarget, FridaPs, LocalProcesses, ProcessEntry, ProcessEnumerator, enumerator_for,
};
pub use error::{BridgeError, EnumerateError, RefreshError};
pub use session::{ApiCall, Engine, EngineEvent, Hook, HookKind, HookTarget, LocalEngine};
pub use worker::{PackageSource, ProcessSource, RefreshMessage, RefreshSource, RefreshWorker};
