use rppal::i2c::I2c;

use crate::error::Error;

/// Register-based bus access, one handle per acquisition cycle.
///
/// The handle is owned by the caller and passed into the sensor modules;
/// nothing in the crate holds global bus state.
pub trait I2cBus {
    /// Read `buf.len()` bytes starting at `reg`, register addresses
    /// ascending.
    fn read_bytes(&mut self, addr: u16, reg: u8, buf: &mut [u8]) -> Result<(), Error>;

    /// Plain read with no register select (command-only devices).
    fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), Error>;

    /// Write a single byte to a register.
    fn write_byte(&mut self, addr: u16, reg: u8, value: u8) -> Result<(), Error>;

    /// Send a register-less command byte.
    fn send_byte(&mut self, addr: u16, value: u8) -> Result<(), Error>;
}

/// Raspberry Pi hardware bus (`/dev/i2c-1`).
pub struct RppalBus {
    i2c: I2c,
}

impl RppalBus {
    pub fn new() -> Result<Self, Error> {
        Ok(Self { i2c: I2c::new()? })
    }
}

impl I2cBus for RppalBus {
    fn read_bytes(&mut self, addr: u16, reg: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.i2c.set_slave_address(addr)?;
        for (n, slot) in buf.iter_mut().enumerate() {
            *slot = self.i2c.smbus_read_byte(reg + n as u8)?;
        }
        Ok(())
    }

    fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), Error> {
        self.i2c.set_slave_address(addr)?;
        let _ = self.i2c.read(buf)?;
        Ok(())
    }

    fn write_byte(&mut self, addr: u16, reg: u8, value: u8) -> Result<(), Error> {
        self.i2c.set_slave_address(addr)?;
        self.i2c.smbus_write_byte(reg, value)?;
        Ok(())
    }

    fn send_byte(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        self.i2c.set_slave_address(addr)?;
        self.i2c.smbus_send_byte(value)?;
        Ok(())
    }
}
