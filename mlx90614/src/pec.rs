// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! SMBus packet error code (PEC) calculations.
//!
//! The PEC is a CRC-8 with the polynomial x<sup>8</sup> + x<sup>2</sup> + x<sup>1</sup> + 1
//! (`0x07`), an initial value of 0, and no reflection of either the input or the output. It covers
//! every byte of a transaction except for the START, repeated START, STOP, ACK and NACK bits. That
//! includes the address bytes, which the I²C controller sends on our behalf, so the addresses have
//! to be added back in when computing (or checking) a PEC.

use crc::{Crc, NoTable, CRC_8_SMBUS};

/// The CRC-8 generator polynomial, without the implicit x<sup>8</sup> term.
pub const POLYNOMIAL: u8 = 0x07;

/// CRC-8/SMBUS, computed a bit at a time.
///
/// Transactions with this sensor are at most five bytes long, so a lookup table doesn't earn its
/// 256 bytes of flash.
const SMBUS_PEC: Crc<u8, NoTable> = Crc::<u8, NoTable>::new(&CRC_8_SMBUS);

/// Compute the CRC-8 of a sequence of bytes.
/// ```
/// # use mlx90614::pec::crc8;
/// assert_eq!(crc8(&[]), 0);
/// assert_eq!(crc8(b"123456789"), 0xF4);
/// ```
pub fn crc8(bytes: &[u8]) -> u8 {
    SMBUS_PEC.checksum(bytes)
}

/// The PEC for writing `value` to `command` on the device at `i2c_address`.
///
/// The checksummed frame is `[address + W, command, value_lo, value_hi]`. Only the last three of
/// those (and then this PEC) are actually handed to the I²C implementation.
pub fn write_word_pec(i2c_address: u8, command: u8, value: u16) -> u8 {
    let [low, high] = value.to_le_bytes();
    crc8(&[i2c_address << 1, command, low, high])
}

/// The PEC the device should send after replying with `value` to a read of `command`.
///
/// The checksummed frame is `[address + W, command, address + R, value_lo, value_hi]`.
pub fn read_word_pec(i2c_address: u8, command: u8, value: u16) -> u8 {
    let [low, high] = value.to_le_bytes();
    crc8(&[i2c_address << 1, command, (i2c_address << 1) | 1, low, high])
}
