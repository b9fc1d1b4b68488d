use crate::cli::{Cli, Commands};
use hookdash::config::Config;
use hookdash::engine::{
    Adb, AndroidBridge, DeviceTarget, LocalEngine, PackageSource, ProcessEnumerator, ProcessSource,
    RefreshSource, enumerator_for,
};
use hookdash::{logging, ui};
use std::path::Path;
use std::process;
use std::rc::Rc;
use std::sync::Arc;

pub fn run(cli: Cli) {
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}", e);
        Config::default()
    });
    apply_overrides(&mut config, &cli);

    // Handle subcommands first
    if let Some(command) = cli.command {
        logging::init_stderr_logging(&config.logging);
        match command {
            Commands::Packages { paths, json } => handle_packages(&config, paths, json),
            Commands::Processes { json } => handle_processes(&config, json),
            Commands::Install { apk } => handle_install(&config, &apk),
            Commands::InitConfig => handle_init_config(),
        }
        return;
    }

    if config.logging.enabled {
        let log_path = Config::config_dir().map(|dir| dir.join("hookdash.log"));
        match log_path {
            Ok(path) => {
                if let Err(e) = logging::init_file_logging(&config.logging, &path) {
                    eprintln!("Warning: logging disabled: {:#}", e);
                }
            }
            Err(e) => eprintln!("Warning: logging disabled: {:#}", e),
        }
    }

    let (engine, engine_events) = LocalEngine::new(config.engine.java_available);
    let device = config.bridge.device.clone();
    let collaborators = ui::Collaborators {
        bridge: bridge(&config),
        enumerator: enumerator(&config, &device),
        device,
        engine: Rc::new(engine),
        engine_events,
    };

    // Launch TUI (default behavior)
    if let Err(e) = ui::run_ui(&config, collaborators) {
        eprintln!("Error running UI: {}", e);
        process::exit(1);
    }
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(device) = &cli.device {
        config.bridge.device = device.clone();
    }
    if let Some(serial) = &cli.serial {
        config.bridge.serial = Some(serial.clone());
    }
    if cli.java {
        config.engine.java_available = true;
    }
    if cli.log {
        config.logging.enabled = true;
    }
}

fn bridge(config: &Config) -> Arc<dyn AndroidBridge> {
    Arc::new(Adb::new(
        config.bridge.adb_path.clone(),
        config.bridge.serial.clone(),
    ))
}

fn enumerator(config: &Config, device: &DeviceTarget) -> Arc<dyn ProcessEnumerator> {
    Arc::from(enumerator_for(device, &config.bridge.frida_ps_path))
}

fn handle_packages(config: &Config, paths: bool, json: bool) {
    let bridge = bridge(config);
    if !bridge.is_available() {
        eprintln!("Error: {} is not available", config.bridge.adb_path);
        process::exit(1);
    }

    // Same source the package screen refreshes from
    let packages = match PackageSource::new(bridge).fetch() {
        Ok(packages) => packages,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&packages) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    for entry in &packages {
        if paths && !entry.path.is_empty() {
            println!("{}\t{}", entry.package, entry.path);
        } else {
            println!("{}", entry.package);
        }
    }
    println!("\n{} packages", packages.len());
}

fn handle_processes(config: &Config, json: bool) {
    let device = &config.bridge.device;
    let source = ProcessSource::new(enumerator(config, device));

    let processes = match source.fetch() {
        Ok(processes) => processes,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&processes) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("{:>8}  Name", "PID");
    for process in &processes {
        println!("{:>8}  {}", process.pid, process.name);
    }
    println!("\n{} processes on {}", processes.len(), device);
}

fn handle_install(config: &Config, apk: &Path) {
    let bridge = bridge(config);
    println!("Installing {}...", apk.display());

    match bridge.install(apk) {
        Ok(()) => println!("Installed {}", apk.display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn handle_init_config() {
    match Config::config_path() {
        Ok(path) if path.exists() => match Config::load_from(&path) {
            Ok(cfg) => {
                println!("Config loaded successfully from {}", path.display());
                match toml::to_string_pretty(&cfg) {
                    Ok(text) => println!("{}", text),
                    Err(e) => eprintln!("Failed to render config: {:#}", e),
                }
            }
            Err(e) => {
                eprintln!("Config invalid: {:#}", e);
                process::exit(1);
            }
        },
        Ok(path) => {
            println!("Creating default config...");
            if let Err(err) = Config::default().save_to(&path) {
                eprintln!("Failed to save default config: {:#}", err);
                process::exit(1);
            }
            println!("Default config saved to {}", path.display());
        }
        Err(e) => {
            eprintln!("Config path unknown: {:#}", e);
            process::exit(1);
        }
    }
}
