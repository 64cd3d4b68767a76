use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use airmonban::capture::interface;
use airmonban::config::Config;
use airmonban::detection::catalog;
use airmonban::{Airmonban, Daemon};

#[derive(Parser)]
#[command(name = "airmonban")]
#[command(author, version, about = "802.11 management frame intrusion detection daemon")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the capture daemon
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,
    },

    /// Stop the capture daemon
    Stop,

    /// Show daemon status
    Status,

    /// List wireless interfaces
    Interfaces,

    /// List the bandit signature catalog
    Bandits,

    /// Generate default configuration file
    GenConfig {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Table row for interface list
#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Index")]
    index: i32,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Frequency")]
    frequency: String,
    #[tabled(rename = "MAC")]
    mac: String,
}

/// Table row for the bandit catalog
#[derive(Tabled)]
struct BanditRow {
    #[tabled(rename = "Identifier")]
    identifier: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Fingerprints")]
    fingerprints: usize,
    #[tabled(rename = "Description")]
    description: String,
}

pub async fn run_command(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };

    match cli.command {
        Commands::Start { foreground } => cmd_start(config, foreground).await,
        Commands::Stop => cmd_stop(config).await,
        Commands::Status => cmd_status(config).await,
        Commands::Interfaces => cmd_interfaces(),
        Commands::Bandits => cmd_bandits(),
        Commands::GenConfig { output } => cmd_gen_config(output),
    }
}

async fn cmd_start(config: Config, foreground: bool) -> Result<()> {
    if !foreground {
        // Check if already running
        let pid_path = config.pid_path();
        if pid_path.exists() {
            let pid_str = std::fs::read_to_string(&pid_path)?;
            if let Ok(pid) = pid_str.trim().parse::<u32>() {
                let proc_path = format!("/proc/{}", pid);
                if std::path::Path::new(&proc_path).exists() {
                    anyhow::bail!("Daemon already running with PID {}", pid);
                }
            }
        }

        println!("Starting airmonban daemon...");

        let daemonize = daemonize::Daemonize::new()
            .pid_file(&pid_path)
            .chown_pid_file(true)
            .working_directory("/");

        match daemonize.start() {
            Ok(_) => {
                // We're now in the daemon process
            }
            Err(e) => {
                anyhow::bail!("Failed to daemonize: {}", e);
            }
        }
    } else {
        println!("Starting airmonban in foreground mode...");
    }

    let core = Airmonban::new(config);
    let mut daemon = Daemon::new(core);

    // Handle signals
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    tokio::select! {
        result = daemon.run() => {
            result?;
        }
        _ = shutdown_signal => {
            println!("\nShutting down...");
            daemon.shutdown().await;
        }
    }

    Ok(())
}

async fn cmd_stop(config: Config) -> Result<()> {
    let pid_path = config.pid_path();

    if !pid_path.exists() {
        println!("Daemon is not running (no PID file found)");
        return Ok(());
    }

    let pid_str = std::fs::read_to_string(&pid_path)?;
    let pid: i32 = pid_str.trim().parse().context("Invalid PID in pid file")?;

    // Send SIGTERM
    unsafe {
        if libc::kill(pid, libc::SIGTERM) == 0 {
            println!("Sent stop signal to daemon (PID {})", pid);
            std::fs::remove_file(&pid_path)?;
        } else {
            println!(
                "Failed to send signal to PID {} (process may have exited)",
                pid
            );
            std::fs::remove_file(&pid_path)?;
        }
    }

    Ok(())
}

async fn cmd_status(config: Config) -> Result<()> {
    let pid_path = config.pid_path();

    if pid_path.exists() {
        let pid_str = std::fs::read_to_string(&pid_path)?;
        if let Ok(pid) = pid_str.trim().parse::<u32>() {
            let proc_path = format!("/proc/{}", pid);
            if std::path::Path::new(&proc_path).exists() {
                println!("{}", "Daemon Status: RUNNING".green().bold());
                println!("PID: {}", pid);

                let names: Vec<&str> = config
                    .capture
                    .interfaces
                    .iter()
                    .map(|i| i.name.as_str())
                    .collect();
                println!("Capturing on: {}", names.join(", "));

                return Ok(());
            }
        }
    }

    println!("{}", "Daemon Status: STOPPED".red().bold());
    Ok(())
}

fn cmd_interfaces() -> Result<()> {
    let interfaces = interface::list_interfaces()?;

    if interfaces.is_empty() {
        println!("No wireless interfaces found");
        return Ok(());
    }

    let rows: Vec<InterfaceRow> = interfaces
        .iter()
        .map(|i| InterfaceRow {
            name: i.name.clone(),
            index: i.ifindex,
            mode: i.mode.as_str().to_string(),
            channel: i.channel.map(|c| c.to_string()).unwrap_or_default(),
            frequency: i
                .frequency
                .map(|f| format!("{} MHz", f))
                .unwrap_or_default(),
            mac: i.mac.map(|m| m.to_string()).unwrap_or_default(),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

fn cmd_bandits() -> Result<()> {
    let rows: Vec<BanditRow> = catalog()
        .iter()
        .map(|b| BanditRow {
            identifier: b.identifier.to_string(),
            name: b.name.to_string(),
            fingerprints: b.fingerprints.len(),
            description: b.description.to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

fn cmd_gen_config(output: Option<PathBuf>) -> Result<()> {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &toml_str)?;
            println!("Configuration written to {}", path.display());
        }
        None => {
            println!("{}", toml_str);
        }
    }

    Ok(())
}
