use std::env;
use std::process;

use chrono::Local;
use log::{error, info, warn};

mod bh1750;
mod bmp280;
mod bus;
mod error;
mod retention;
mod store;
mod structs;

use bus::RppalBus;
use error::Error;
use store::{LogRecord, ReadingStore};

/// Default data directory; override with ENVIRO_DATA_DIR.
const DEFAULT_DATA_DIR: &str = "/home/enviropi/enviro_data";

fn data_dir() -> String {
    env::var("ENVIRO_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
}

/// Round a channel value for storage.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn fmt_channel(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.2}", value),
        None => "n/a".to_string(),
    }
}

/// One acquire -> compensate -> store -> sweep cycle.
fn run() -> Result<(), Error> {
    let store = ReadingStore::open(data_dir())?;
    let mut bus = RppalBus::new()?;

    // Channel failures are isolated: a failed sensor logs a warning and
    // leaves its fields null instead of aborting the record.
    let weather = bmp280::acquire(&mut bus);
    if let Err(err) = &weather {
        warn!("BMP280 read failed: {}", err);
    }
    let light = bh1750::read_lux(&mut bus);
    if let Err(err) = &light {
        warn!("BH1750 read failed: {}", err);
    }

    let now = Local::now();
    let record = LogRecord {
        timestamp: now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        temperature_c: weather.as_ref().ok().map(|w| round2(w.temperature_c)),
        pressure_hpa: weather.as_ref().ok().map(|w| round2(w.pressure_hpa)),
        light_lux: light.ok().map(round2),
    };

    let today = now.date_naive();
    store.append(today, &record)?;

    println!(
        "[{}] {} C, {} hPa, {} lux",
        record.timestamp,
        fmt_channel(record.temperature_c),
        fmt_channel(record.pressure_hpa),
        fmt_channel(record.light_lux),
    );

    let removed = retention::sweep(store.dir(), today)?;
    if !removed.is_empty() {
        info!("retention sweep removed {} file(s)", removed.len());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        error!("{}", err);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals_for_storage() {
        assert_eq!(round2(25.082477), 25.08);
        assert_eq!(round2(1006.5325814), 1006.53);
        assert_eq!(round2(213.33333333333334), 213.33);
    }
}
