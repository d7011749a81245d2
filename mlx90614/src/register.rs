// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::address::EepromAddress;
use crate::calculations::{emissivity_from_raw, emissivity_to_raw, settling_time_ms};
use crate::error::LibraryError;
use crate::util::{is_bit_set, replace_bits};

/// Trait for common register functionality.
///
/// Registers are full 16-bit EEPROM words. Implementations must keep every bit they were created
/// with, even the ones they don't interpret, so that writing a modified register back doesn't
/// clobber reserved or factory calibration bits.
pub trait Register: From<u16> + Into<u16> + Copy + PartialEq {
    /// The address of this register in the sensor's memory map.
    fn address() -> EepromAddress;
}

/// Config register 1 (EEPROM 0x25).
///
/// Only the digital filter settings are exposed, the rest of the bits control things like the
/// sensor gain and the sign of K<sub>s</sub> which are calibrated at the factory and should be
/// left alone.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigRegister {
    raw: u16,
}

impl ConfigRegister {
    /// Bits [10:8], the FIR filter setting.
    pub const NOISE_FILTER_MASK: u16 = 0x0700;

    /// Bits [2:0], the IIR filter setting.
    pub const SPIKE_FILTER_MASK: u16 = 0x0007;

    /// Bit 6, enables a second IIR filter stage.
    pub const DUAL_IIR_BIT: u32 = 6;

    /// The factory default value.
    pub const FACTORY_DEFAULT: u16 = 0x9FB4;

    /// The raw value of the whole register.
    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// The current FIR (noise) filter setting.
    ///
    /// The datasheet documents the lower four FIR settings as "not recommended" and this library
    /// doesn't expose them, so `None` is returned if one of them is set.
    pub fn noise_filter(&self) -> Option<NoiseFilter> {
        NoiseFilter::try_from_primitive(self.raw & Self::NOISE_FILTER_MASK).ok()
    }

    /// Change the FIR (noise) filter setting, leaving every other bit alone.
    pub fn set_noise_filter(&mut self, filter: NoiseFilter) {
        self.raw = replace_bits(self.raw, Self::NOISE_FILTER_MASK, filter.into());
    }

    /// The current IIR (spike) filter setting.
    pub fn spike_filter(&self) -> SpikeFilter {
        // Unwrapping is safe here as all eight values of the three bit field are valid.
        SpikeFilter::try_from_primitive(self.raw & Self::SPIKE_FILTER_MASK).unwrap()
    }

    /// Change the IIR (spike) filter setting, leaving every other bit alone.
    pub fn set_spike_filter(&mut self, filter: SpikeFilter) {
        self.raw = replace_bits(self.raw, Self::SPIKE_FILTER_MASK, filter.into());
    }

    /// Whether the second IIR filter stage is enabled.
    pub fn dual_iir(&self) -> bool {
        is_bit_set(self.raw, Self::DUAL_IIR_BIT)
    }

    /// Enable (or disable) the second IIR filter stage.
    pub fn set_dual_iir(&mut self, enabled: bool) {
        let bit = 1u16 << Self::DUAL_IIR_BIT;
        self.raw = replace_bits(self.raw, bit, if enabled { bit } else { 0 });
    }

    /// An estimate of how long the output takes to settle after a step change in temperature, in
    /// milliseconds.
    ///
    /// See Melexis' application note "Understanding MLX90614 on-chip digital signal filters" for
    /// the derivation.
    pub fn settling_time(&self) -> Result<u32, LibraryError> {
        let noise_filter = self.noise_filter().ok_or(LibraryError::InvalidData(
            "Config register has an unsupported FIR filter setting",
        ))?;
        Ok(settling_time_ms(
            noise_filter,
            self.spike_filter(),
            self.dual_iir(),
        ))
    }
}

impl Default for ConfigRegister {
    fn default() -> Self {
        Self {
            raw: Self::FACTORY_DEFAULT,
        }
    }
}

impl Register for ConfigRegister {
    fn address() -> EepromAddress {
        EepromAddress::Config
    }
}

impl From<u16> for ConfigRegister {
    fn from(raw: u16) -> Self {
        Self { raw }
    }
}

impl From<ConfigRegister> for u16 {
    fn from(register: ConfigRegister) -> Self {
        register.raw
    }
}

/// The emissivity register (EEPROM 0x24).
///
/// Emissivity is stored as a fraction of `0xFFFF`, so `0xFFFF` is an emissivity of 1.0.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmissivityRegister {
    raw: u16,
}

impl EmissivityRegister {
    /// The smallest emissivity the sensor is specified for.
    pub const MIN: f64 = 0.1;

    /// The largest possible emissivity.
    pub const MAX: f64 = 1.0;

    /// Create an emissivity register for the given emissivity.
    ///
    /// Values outside of 0.1 to 1.0 (inclusive) are rejected.
    /// ```
    /// # use mlx90614::EmissivityRegister;
    /// let glass = EmissivityRegister::from_emissivity(0.92).unwrap();
    /// assert_eq!(u16::from(glass), 60292);
    /// assert!(EmissivityRegister::from_emissivity(0.05).is_err());
    /// ```
    pub fn from_emissivity(emissivity: f64) -> Result<Self, LibraryError> {
        if (Self::MIN..=Self::MAX).contains(&emissivity) {
            Ok(Self {
                raw: emissivity_to_raw(emissivity),
            })
        } else {
            Err(LibraryError::InvalidData(
                "Emissivity must be between 0.1 and 1.0",
            ))
        }
    }

    /// The raw value of the whole register.
    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// The emissivity, between 0 and 1.
    pub fn emissivity(&self) -> f64 {
        emissivity_from_raw(self.raw)
    }
}

impl Default for EmissivityRegister {
    fn default() -> Self {
        Self { raw: 0xFFFF }
    }
}

impl Register for EmissivityRegister {
    fn address() -> EepromAddress {
        EepromAddress::Emissivity
    }
}

impl From<u16> for EmissivityRegister {
    fn from(raw: u16) -> Self {
        Self { raw }
    }
}

impl From<EmissivityRegister> for u16 {
    fn from(register: EmissivityRegister) -> Self {
        register.raw
    }
}

/// FIR filter settings, limiting noise.
///
/// The discriminants are the bits as they appear in the config register (bits [10:8]), so a
/// setting can be compared directly against a masked register value. Higher settings average over
/// more samples, lowering noise at the cost of a slower response.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum NoiseFilter {
    /// FIR = 128, the least filtering.
    Fir128 = 0b100_0000_0000,

    /// FIR = 256.
    Fir256 = 0b101_0000_0000,

    /// FIR = 512.
    Fir512 = 0b110_0000_0000,

    /// FIR = 1024, the most filtering and the factory default.
    Fir1024 = 0b111_0000_0000,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::Fir1024
    }
}

/// IIR filter settings, limiting sharp changes (spikes).
///
/// The percentages are the weight given to each new sample (a<sub>1</sub> in the application
/// note), so lower percentages filter more. The discriminants are the bits as they appear in the
/// config register (bits [2:0]).
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum SpikeFilter {
    /// a<sub>1</sub> = 1, b<sub>1</sub> = 0. No spike filtering, the factory default.
    Limit100 = 0b100,

    /// a<sub>1</sub> = 0.8, b<sub>1</sub> = 0.2.
    Limit80 = 0b101,

    /// a<sub>1</sub> = 0.666, b<sub>1</sub> = 0.333.
    Limit67 = 0b110,

    /// a<sub>1</sub> = 0.571, b<sub>1</sub> = 0.428.
    Limit57 = 0b111,

    /// a<sub>1</sub> = 0.5, b<sub>1</sub> = 0.5.
    Limit50 = 0b000,

    /// a<sub>1</sub> = 0.25, b<sub>1</sub> = 0.75.
    Limit25 = 0b001,

    /// a<sub>1</sub> = 0.166, b<sub>1</sub> = 0.833.
    Limit17 = 0b010,

    /// a<sub>1</sub> = 0.125, b<sub>1</sub> = 0.875. The most spike filtering.
    Limit13 = 0b011,
}

impl Default for SpikeFilter {
    fn default() -> Self {
        Self::Limit100
    }
}
