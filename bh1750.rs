use std::thread;
use std::time::Duration;

use crate::bus::I2cBus;
use crate::error::Error;

/// BH1750 I2C default slave address.
pub const ADDR_BH1750: u16 = 0x23;

// BH1750 command bytes (register-less protocol).
const CMD_POWER_ON: u8 = 0x01;
const CMD_CONT_HIGH_RES: u8 = 0x10;

/// Datasheet conversion factor from raw counts to lux.
const COUNTS_PER_LUX: f64 = 1.2;

/// Worst-case conversion time in high-resolution mode.
const MEASUREMENT_TIME: Duration = Duration::from_millis(180);

/// Power the sensor up and take one high-resolution lux measurement.
pub fn read_lux<B: I2cBus>(bus: &mut B) -> Result<f64, Error> {
    bus.send_byte(ADDR_BH1750, CMD_POWER_ON)?;
    thread::sleep(Duration::from_millis(10));
    bus.send_byte(ADDR_BH1750, CMD_CONT_HIGH_RES)?;
    thread::sleep(MEASUREMENT_TIME);

    let mut data = [0u8; 2];
    bus.read(ADDR_BH1750, &mut data)?;
    Ok(u16::from_be_bytes(data) as f64 / COUNTS_PER_LUX)
}
