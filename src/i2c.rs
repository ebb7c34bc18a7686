// ============================================================================
// src/i2c.rs - Two-Wire Bus
// ============================================================================
//!
//! CCS レジスタ経由のポーリング式 2 線式 (I2C) バス。
//!
//! ブート EEPROM の読み出しと、Juli@ の AK4358/AK4114 への書き込みに使う。
//! ビジー待ちは有限回で打ち切り、タイムアウトしても処理は続行する。

use core::sync::atomic::Ordering;

use log::warn;

use crate::chip::Chip;
use crate::error::BusTimeout;
use crate::mmio::RegisterSpace;
use crate::platform::Platform;
use crate::regs::*;

impl<R: RegisterSpace, P: Platform> Chip<R, P> {
    /// Poll until the bus is idle.
    ///
    /// On timeout the failure is logged and counted, and the caller carries on;
    /// a read that follows may return stale data.
    pub fn i2c_wait(&self) -> Result<(), BusTimeout> {
        let config = self.config();
        let mut status = 0;
        for _ in 0..config.i2c_poll_limit {
            status = self.ccs().read8(CCS_I2C_STATUS);
            if status & CCS_I2C_BUSY == 0 {
                return Ok(());
            }
            self.delay_us(config.i2c_poll_delay_us);
        }

        self.i2c_timeouts.fetch_add(1, Ordering::Relaxed);
        let timeout = BusTimeout { status };
        warn!("[ENVY24HT] {}", timeout);
        Err(timeout)
    }

    /// Read one byte from the boot EEPROM.
    pub fn i2c_read(&self, addr: u8) -> u8 {
        self.i2c_read_with_delay(addr, 0)
    }

    /// EEPROM 読み出し。`spins` 回のダミーステータス読み出しを挟む。
    pub fn i2c_read_with_delay(&self, addr: u8, spins: u32) -> u8 {
        let _ = self.i2c_wait();
        for _ in 0..spins {
            let _ = self.ccs().read8(CCS_I2C_STATUS);
        }
        self.ccs().write8(CCS_I2C_ADDR, addr);
        self.ccs().write8(CCS_I2C_DEV_ADDRESS, EEPROM_DEV_ADDRESS);
        let _ = self.i2c_wait();
        self.ccs().read8(CCS_I2C_DATA)
    }

    /// Write `data` to register `reg` of the chip at `chip_address`.
    pub fn i2c_write(&self, chip_address: u8, reg: u8, data: u8) {
        let _ = self.i2c_wait();
        self.ccs().write8(CCS_I2C_ADDR, reg);
        self.ccs().write8(CCS_I2C_DATA, data);
        let _ = self.i2c_wait();
        self.ccs().write8(CCS_I2C_DEV_ADDRESS, chip_address | CCS_ADDRESS_WRITE);
    }
}
