// src/main.rs
//! Trezor probe
//! Opens the attached Trezor, prints its identity and derives addresses or
//! extended public keys.
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use trezor_link::{ConsoleEntry, DeviceConfig, TrezorDevice};

#[derive(Parser)]
#[command(name = "trezor-probe")]
#[command(about = "Talk to an attached Trezor hardware wallet")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Device configuration file (defaults to $TREZOR_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Unlock the device (PIN / passphrase) before running the command
    #[arg(long, global = true)]
    unlock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print firmware version and label
    Info,
    /// Ping the device
    Ping {
        #[arg(default_value = "ping")]
        message: String,
    },
    /// Derive an address
    Address(DeriveArgs),
    /// Derive an extended public key
    Xpub(DeriveArgs),
}

#[derive(ClapArgs)]
struct DeriveArgs {
    /// Derivation path, e.g. m/49'/0'/0'/0/0
    path: String,
    /// Coin ticker (btc, bch, ltc, eth, ...)
    #[arg(long, default_value = "btc")]
    coin: String,
    /// Address mode (P2PKH, P2SH, ...); empty uses the coin default
    #[arg(long, default_value = "")]
    mode: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging()?;

    info!("Starting trezor-probe v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => DeviceConfig::load(path)?,
        None => DeviceConfig::from_env()?,
    };

    let mut device = TrezorDevice::open_with_config(&config, ConsoleEntry::stdio())
        .context("failed to open Trezor device")?;

    if args.unlock {
        device.unlock()?;
    }

    match args.command.unwrap_or(Commands::Info) {
        Commands::Info => {
            let [major, minor, patch] = device.firmware();
            println!("firmware: {}.{}.{}", major, minor, patch);
            println!("label:    {}", device.label());
        }
        Commands::Ping { message } => {
            println!("{}", device.ping(&message)?);
        }
        Commands::Address(derive) => {
            let address = device.get_address(&derive.path, &derive.coin, &derive.mode)?;
            println!("{}", address);
        }
        Commands::Xpub(derive) => {
            let xpub = device.get_xpub(&derive.path, &derive.coin, &derive.mode)?;
            println!("{}", xpub);
        }
    }

    device.close();
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
