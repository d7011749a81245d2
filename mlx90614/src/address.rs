// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Memory map of the MLX90614.
//!
//! Every SMBus command for this sensor is an opcode combined with an address. RAM is read with
//! commands of the form `000x_xxxx`, and EEPROM is read or written with `001x_xxxx`, so the
//! command byte *is* the address as far as this library is concerned.
use core::fmt;

use num_enum::IntoPrimitive;

/// The factory default SMBus address.
pub const DEFAULT_ADDRESS: u8 = 0x5A;

/// The opcode bits set for EEPROM access.
const EEPROM_OPCODE: u8 = 0x20;

/// The mask for the opcode portion of a command.
const OPCODE_MASK: u8 = 0xE0;

/// Marker newtype for a memory location accessible over SMBus.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Address(u8);

impl Address {
    /// Wrap the given command in an `Address`.
    ///
    /// This function is intended to be used in const contexts, in other cases the
    /// [`From`][core::convert::From] implementations are probably easier to use.
    pub const fn new(command: u8) -> Self {
        Self(command)
    }

    /// Whether this address refers to EEPROM (as opposed to RAM).
    pub(crate) fn is_eeprom(&self) -> bool {
        self.0 & OPCODE_MASK == EEPROM_OPCODE
    }

    pub(crate) fn command(&self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#04X})", self.0)
    }
}

impl From<u8> for Address {
    fn from(command: u8) -> Self {
        Self::new(command)
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl From<RamAddress> for Address {
    fn from(address: RamAddress) -> Self {
        Self(address.into())
    }
}

impl From<EepromAddress> for Address {
    fn from(address: EepromAddress) -> Self {
        Self(address.into())
    }
}

/// Addresses within the sensor's RAM. These are all read-only.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RamAddress {
    /// Raw data from IR channel 1.
    RawIr1 = 0x04,

    /// Raw data from IR channel 2 (dual zone devices only).
    RawIr2 = 0x05,

    /// Linearized ambient temperature (T<sub>a</sub>).
    AmbientTemperature = 0x06,

    /// Linearized object temperature from zone 1 (T<sub>obj1</sub>).
    ObjectTemperature1 = 0x07,

    /// Linearized object temperature from zone 2 (T<sub>obj2</sub>, dual zone devices only).
    ObjectTemperature2 = 0x08,
}

/// Addresses within the sensor's EEPROM that are documented as user accessible.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EepromAddress {
    /// Upper limit of the object temperature range used for PWM output.
    ObjectTemperatureMax = 0x20,

    /// Lower limit of the object temperature range used for PWM output.
    ObjectTemperatureMin = 0x21,

    /// PWM output control.
    PwmControl = 0x22,

    /// Ambient temperature range used for PWM output.
    AmbientTemperatureRange = 0x23,

    /// Emissivity correction coefficient.
    Emissivity = 0x24,

    /// Config register 1 (filter settings, among other things).
    Config = 0x25,

    /// The SMBus address, in the lower byte.
    SmbusAddress = 0x2E,

    /// Factory ID, first word.
    Id1 = 0x3C,

    /// Factory ID, second word.
    Id2 = 0x3D,

    /// Factory ID, third word.
    Id3 = 0x3E,

    /// Factory ID, fourth word.
    Id4 = 0x3F,
}

#[cfg(test)]
mod test {
    extern crate std;

    use super::*;

    #[test]
    fn ram_is_not_eeprom() {
        for address in [
            RamAddress::RawIr1,
            RamAddress::RawIr2,
            RamAddress::AmbientTemperature,
            RamAddress::ObjectTemperature1,
            RamAddress::ObjectTemperature2,
        ] {
            assert!(!Address::from(address).is_eeprom(), "{:?}", address);
        }
    }

    #[test]
    fn eeprom_is_eeprom() {
        for address in [
            EepromAddress::ObjectTemperatureMax,
            EepromAddress::ObjectTemperatureMin,
            EepromAddress::PwmControl,
            EepromAddress::AmbientTemperatureRange,
            EepromAddress::Emissivity,
            EepromAddress::Config,
            EepromAddress::SmbusAddress,
            EepromAddress::Id1,
            EepromAddress::Id2,
            EepromAddress::Id3,
            EepromAddress::Id4,
        ] {
            assert!(Address::from(address).is_eeprom(), "{:?}", address);
        }
    }

    #[test]
    fn raw_commands() {
        assert!(Address::new(0x20).is_eeprom());
        assert!(Address::new(0x3F).is_eeprom());
        assert!(!Address::new(0x1F).is_eeprom());
        assert!(!Address::new(0x40).is_eeprom());
        // Opcode 111x_xxxx is the sleep command, not EEPROM.
        assert!(!Address::new(0xFF).is_eeprom());
    }

    #[test]
    fn command_bytes() {
        assert_eq!(Address::from(RamAddress::AmbientTemperature).command(), 0x06);
        assert_eq!(Address::from(RamAddress::ObjectTemperature1).command(), 0x07);
        assert_eq!(Address::from(EepromAddress::Emissivity).command(), 0x24);
        assert_eq!(Address::from(EepromAddress::Config).command(), 0x25);
        assert_eq!(u8::from(Address::new(0x3C)), 0x3C);
    }

    #[test]
    fn debug_format() {
        assert_eq!(std::format!("{:?}", Address::new(0x07)), "Address(0x07)");
    }
}
