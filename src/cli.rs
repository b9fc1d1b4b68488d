use clap::{Parser, Subcommand};
use hookdash::engine::DeviceTarget;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hookdash")]
#[command(about = "Terminal front-end for packages, processes and hooks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Device to enumerate processes on: local, usb, remote, host:<addr> or id:<serial>
    #[arg(long, global = true, value_name = "TARGET")]
    pub device: Option<DeviceTarget>,

    /// adb serial of the Android device (overrides config)
    #[arg(long, global = true)]
    pub serial: Option<String>,

    /// Enable Java and module-load hooks (overrides config)
    #[arg(long, global = true)]
    pub java: bool,

    /// Write a log file even when logging is off in config
    #[arg(long, global = true)]
    pub log: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List installed packages on the Android device
    Packages {
        /// Include the APK path of each package
        #[arg(long)]
        paths: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List processes on the selected device
    Processes {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Install an APK on the Android device
    Install {
        /// Path to the APK
        apk: PathBuf,
    },

    /// Create default config file
    InitConfig,
}
