use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::bus::I2cBus;
use crate::error::Error;
use crate::structs::{CalibrationSet, CompensatedReading, RawSample, CALIB_BLOCK_LEN};

/// BMP280 I2C default slave address.
pub const ADDR_BMP280: u16 = 0x76;

// BMP280 register addresses.
pub const REG_CALIB_00: u8 = 0x88;
pub const REG_CHIP_ID: u8 = 0xD0;
pub const REG_CTRL_MEAS: u8 = 0xF4;
pub const REG_CONFIG: u8 = 0xF5;
pub const REG_PRESS_MSB: u8 = 0xF7;

/// Chip ID reported by a BMP280 at 0xD0.
const CHIP_ID_BMP280: u8 = 0x58;

// ctrl_meas: temperature x4, pressure x4 oversampling, normal mode (0x6F).
const OSRS_T: u8 = 0b011;
const OSRS_P: u8 = 0b011;
const MODE_NORMAL: u8 = 0b11;
const CTRL_MEAS_WDATA: u8 = (OSRS_T << 5) | (OSRS_P << 2) | MODE_NORMAL;

// config: standby 1000 ms, filter off, 3-wire SPI disabled (0xA0).
const T_SB: u8 = 0b101;
const FILTER: u8 = 0b000;
const SPI3W_EN: u8 = 0;
const CONFIG_WDATA: u8 = (T_SB << 5) | (FILTER << 2) | SPI3W_EN;

/// Time for the first conversion after configuration.
const SETTLE: Duration = Duration::from_millis(100);

/// Check the chip ID and write the oversampling/mode configuration.
pub fn configure<B: I2cBus>(bus: &mut B) -> Result<(), Error> {
    let mut id = [0u8; 1];
    bus.read_bytes(ADDR_BMP280, REG_CHIP_ID, &mut id)?;
    if id[0] == CHIP_ID_BMP280 {
        debug!("BMP280 chip id {:#04x}", id[0]);
    } else {
        warn!(
            "unexpected chip id {:#04x} (expected {:#04x})",
            id[0], CHIP_ID_BMP280
        );
    }

    bus.write_byte(ADDR_BMP280, REG_CTRL_MEAS, CTRL_MEAS_WDATA)?;
    bus.write_byte(ADDR_BMP280, REG_CONFIG, CONFIG_WDATA)?;
    thread::sleep(SETTLE);
    Ok(())
}

/// Read the 24-byte calibration block and decode it.
pub fn read_calibration<B: I2cBus>(bus: &mut B) -> Result<CalibrationSet, Error> {
    let mut block = [0u8; CALIB_BLOCK_LEN];
    bus.read_bytes(ADDR_BMP280, REG_CALIB_00, &mut block)?;
    CalibrationSet::decode(&block)
}

/// Read the raw 20-bit ADC counts (pressure and temperature burst).
pub fn read_raw<B: I2cBus>(bus: &mut B) -> Result<RawSample, Error> {
    let mut data = [0u8; 6];
    bus.read_bytes(ADDR_BMP280, REG_PRESS_MSB, &mut data)?;
    Ok(RawSample::from_burst(&data))
}

/// One full acquisition: configure, read calibration, read and compensate.
pub fn acquire<B: I2cBus>(bus: &mut B) -> Result<CompensatedReading, Error> {
    configure(bus)?;
    let cal = read_calibration(bus)?;
    let raw = read_raw(bus)?;
    Ok(compensate(raw, &cal))
}

/// Convert raw ADC counts to degrees Celsius and hPa with the datasheet
/// double-precision formulas.
///
/// Temperature runs first: its t_fine intermediate feeds the pressure
/// formula of the same sample.
pub fn compensate(raw: RawSample, cal: &CalibrationSet) -> CompensatedReading {
    let adc_t = raw.raw_temperature as f64;
    let var1 = (adc_t / 16384.0 - cal.dig_t1 as f64 / 1024.0) * cal.dig_t2 as f64;
    let var2 = {
        let v = adc_t / 131072.0 - cal.dig_t1 as f64 / 8192.0;
        v * v * cal.dig_t3 as f64
    };
    // Truncating integer cast.
    let t_fine = (var1 + var2) as i64;
    let temperature_c = (var1 + var2) / 5120.0;

    CompensatedReading {
        temperature_c,
        pressure_hpa: compensate_pressure(raw.raw_pressure as f64, t_fine, cal),
    }
}

fn compensate_pressure(adc_p: f64, t_fine: i64, cal: &CalibrationSet) -> f64 {
    let mut var1 = t_fine as f64 / 2.0 - 64000.0;
    let mut var2 = var1 * var1 * cal.dig_p6 as f64 / 32768.0;
    var2 += var1 * cal.dig_p5 as f64 * 2.0;
    var2 = var2 / 4.0 + cal.dig_p4 as f64 * 65536.0;
    var1 = (cal.dig_p3 as f64 * var1 * var1 / 524288.0 + cal.dig_p2 as f64 * var1) / 524288.0;
    var1 = (1.0 + var1 / 32768.0) * cal.dig_p1 as f64;

    // Degenerate calibration; never divide by zero.
    if var1 == 0.0 {
        return 0.0;
    }

    let mut p = 1048576.0 - adc_p;
    p = (p - var2 / 4096.0) * 6250.0 / var1;
    let var1 = cal.dig_p9 as f64 * p * p / 2147483648.0;
    let var2 = p * cal.dig_p8 as f64 / 32768.0;
    p += (var1 + var2 + cal.dig_p7 as f64) / 16.0;
    p / 100.0
}
