//! # dht22-read
//!
//! Reads a DHT22 sensor wired to a Raspberry Pi GPIO pin and prints one
//! humidity/temperature line.
//!
//! ## Usage
//! ```bash
//! # BCM 4 (wiringPi 7), up to 100 attempts, holding /var/run/dht.lock
//! sudo dht22-read
//!
//! # BCM 17, 10 attempts, no lock file (non-root), pulse dumps on failure
//! dht22-read 17 --attempts 10 --no-lock -vv
//!
//! # Fast host: allow more polls per pulse before timing out
//! sudo dht22-read --max-cycles 8000
//! ```

mod gpio;
mod lock;
mod privilege;

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, value_parser};
use log::{LevelFilter, debug, info, warn};
use rppal::gpio::Gpio;

use dht22_reader::pulse::DEFAULT_MAX_CYCLES;
use dht22_reader::{Config, Dht22, Reading};

use crate::gpio::{HostDelay, RppalLine};
use crate::lock::{DEFAULT_LOCK_FILE, LockFile};

/// Rest time after the last read, before another process may wake the sensor.
const RELEASE_GRACE: Duration = Duration::from_millis(500);

/// Exit status after Ctrl-C.
const INTERRUPTED: i32 = 130;

/// Read a DHT22/AM2302 humidity and temperature sensor
#[derive(Parser, Debug)]
#[command(name = "dht22-read", version, author, long_about = None)]
struct Args {
    /// BCM GPIO number of the data line (wiringPi pin 7 is BCM 4)
    #[arg(default_value_t = 4)]
    pin: u8,

    /// Maximum number of read attempts
    #[arg(short, long, default_value_t = 100, value_parser = value_parser!(u32).range(1..))]
    attempts: u32,

    /// Polls per pulse before it counts as timed out. The 80 µs
    /// acknowledgement must fit, so raise this on hosts with fast GPIO reads
    #[arg(long, default_value_t = DEFAULT_MAX_CYCLES, value_parser = value_parser!(u16).range(1..))]
    max_cycles: u16,

    /// Skip the lock file (for running as a non-root user)
    #[arg(long)]
    no_lock: bool,

    /// Lock file serialising access to the sensor
    #[arg(long, default_value = DEFAULT_LOCK_FILE)]
    lock_file: PathBuf,

    /// Verbose logging (-v: attempt failures, -vv: pulse widths)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(reading) => {
            println!(
                "Humidity = {:.2} % Temperature = {:.2} *C",
                reading.humidity, reading.temperature
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn run(args: &Args) -> anyhow::Result<Reading> {
    ctrlc::set_handler(|| {
        warn!("interrupted, exiting");
        std::process::exit(INTERRUPTED);
    })
    .context("installing signal handler")?;

    // Taken before touching GPIO, released after the grace period below.
    let _lock = if args.no_lock {
        None
    } else {
        let lock = LockFile::acquire(&args.lock_file)
            .context("serialising access to the sensor")?;
        debug!("holding {}", lock.path().display());
        Some(lock)
    };

    let gpio = Gpio::new().context("opening GPIO")?;
    let pin = gpio
        .get(args.pin)
        .with_context(|| format!("claiming GPIO {}", args.pin))?;
    privilege::drop_privileges().context("dropping privileges")?;

    let config = Config::default()
        .with_attempts(args.attempts)
        .with_max_cycles(args.max_cycles);
    info!(
        "reading BCM {} with up to {} attempts",
        args.pin,
        config.attempts()
    );
    debug!("{config:?}");

    let mut dht = Dht22::with_config(RppalLine::new(pin), HostDelay, config);
    let result = dht.read();

    thread::sleep(RELEASE_GRACE);
    result.context("reading sensor")
}
