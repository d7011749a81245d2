// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Accessors that report failures with in-band sentinel values instead of `Result`.
//!
//! These mirror the API most MLX90614 libraries for other platforms expose, which makes porting
//! code from them easier. Errors are discarded: temperatures and emissivity come back as NaN, raw
//! registers as 0, and the filter modes as [`NOISE_FILTER_ERROR`] and [`SPIKE_FILTER_ERROR`].
//! Writes that fail are silently dropped. New code should prefer the `Result` based methods on
//! [`Mlx90614`].
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;
use num_enum::TryFromPrimitive;

use crate::address::{Address, EepromAddress, RamAddress};
use crate::calculations::{
    celsius_to_fahrenheit, emissivity_from_raw, emissivity_to_raw, raw_to_celsius,
};
use crate::driver::Mlx90614;
use crate::register::{ConfigRegister, NoiseFilter, SpikeFilter};

/// Returned by [`Mlx90614::read_noise_filter_mode`] when the config register couldn't be read.
pub const NOISE_FILTER_ERROR: u16 = 0;

/// Returned by [`Mlx90614::read_spike_filter_mode`] when the config register couldn't be read.
///
/// Every value of the three bit spike filter field is a valid setting, so the sentinel is outside
/// of that field.
pub const SPIKE_FILTER_ERROR: u16 = 0x1000;

impl<I2C, D> Mlx90614<I2C, D>
where
    I2C: i2c::WriteRead + i2c::Write,
    D: DelayMs<u16>,
{
    /// Read a word, treating failure as 0.
    fn read_word_or_zero<A: Into<Address>>(&mut self, address: A) -> u16 {
        self.read_word(address).unwrap_or(0)
    }

    fn temperature_or_nan(&mut self, address: RamAddress) -> f32 {
        match self.read_word_or_zero(address) {
            0 => f32::NAN,
            raw => raw_to_celsius(raw),
        }
    }

    /// The object temperature in ℃, or NaN if it couldn't be read.
    pub fn read_object_temp_c(&mut self) -> f32 {
        self.temperature_or_nan(RamAddress::ObjectTemperature1)
    }

    /// The object temperature in ℉, or NaN if it couldn't be read.
    pub fn read_object_temp_f(&mut self) -> f32 {
        celsius_to_fahrenheit(self.read_object_temp_c())
    }

    /// The ambient temperature in ℃, or NaN if it couldn't be read.
    pub fn read_ambient_temp_c(&mut self) -> f32 {
        self.temperature_or_nan(RamAddress::AmbientTemperature)
    }

    /// The ambient temperature in ℉, or NaN if it couldn't be read.
    pub fn read_ambient_temp_f(&mut self) -> f32 {
        celsius_to_fahrenheit(self.read_ambient_temp_c())
    }

    /// The raw emissivity register, or 0 if it couldn't be read.
    pub fn read_emissivity_register_raw(&mut self) -> u16 {
        self.read_word_or_zero(EepromAddress::Emissivity)
    }

    /// Write a raw value to the emissivity register, ignoring any errors.
    pub fn write_emissivity_register_raw(&mut self, raw: u16) {
        let _ = self.set_emissivity_register(raw);
    }

    /// The emissivity, or NaN if it couldn't be read.
    pub fn read_emissivity(&mut self) -> f64 {
        match self.read_emissivity_register_raw() {
            0 => f64::NAN,
            raw => emissivity_from_raw(raw),
        }
    }

    /// Write an emissivity.
    ///
    /// Unlike [`set_emissivity`][Mlx90614::set_emissivity] the value isn't range checked, it's
    /// scaled and truncated (saturating at 0 and `0xFFFF`) and then written.
    pub fn write_emissivity(&mut self, emissivity: f64) {
        self.write_emissivity_register_raw(emissivity_to_raw(emissivity));
    }

    /// The raw value of config register 1, or 0 if it couldn't be read.
    pub fn read_config_register_raw(&mut self) -> u16 {
        self.read_word_or_zero(EepromAddress::Config)
    }

    /// Write config register 1.
    ///
    /// Be careful, most of the bits in this register are factory calibration.
    pub fn write_config_register_raw(&mut self, raw: u16) {
        let _ = self.set_config_register(ConfigRegister::from(raw));
    }

    /// The FIR (noise) filter bits of config register 1 (still in place, bits [10:8]), or
    /// [`NOISE_FILTER_ERROR`].
    pub fn read_noise_filter_mode(&mut self) -> u16 {
        match self.read_config_register_raw() {
            0 => NOISE_FILTER_ERROR,
            raw => raw & ConfigRegister::NOISE_FILTER_MASK,
        }
    }

    /// The IIR (spike) filter bits of config register 1, or [`SPIKE_FILTER_ERROR`].
    pub fn read_spike_filter_mode(&mut self) -> u16 {
        match self.read_config_register_raw() {
            0 => SPIKE_FILTER_ERROR,
            raw => raw & ConfigRegister::SPIKE_FILTER_MASK,
        }
    }

    /// Apply `update` to config register 1, writing it back only if it changed.
    ///
    /// A register value of 0 is treated as a failed read and nothing is written.
    fn update_config_or_skip<F: FnOnce(&mut ConfigRegister)>(&mut self, update: F) {
        let current = self.read_config_register_raw();
        if current == 0 {
            return;
        }
        let mut register = ConfigRegister::from(current);
        update(&mut register);
        if register.raw() == current {
            trace!("Config register unchanged, skipping EEPROM write");
        } else {
            let _ = self.set_config_register(register);
        }
    }

    /// Set the FIR (noise) filter from its raw bits (`0x0400`, `0x0500`, `0x0600` or `0x0700`).
    ///
    /// Any other value is ignored without touching the sensor.
    pub fn write_noise_filter_mode(&mut self, mode: u16) {
        if let Ok(filter) = NoiseFilter::try_from_primitive(mode) {
            self.update_config_or_skip(|register| register.set_noise_filter(filter));
        }
    }

    /// Set the IIR (spike) filter from its raw bits (`0` through `7`).
    ///
    /// Any other value is ignored without touching the sensor.
    pub fn write_spike_filter_mode(&mut self, mode: u16) {
        if let Ok(filter) = SpikeFilter::try_from_primitive(mode) {
            self.update_config_or_skip(|register| register.set_spike_filter(filter));
        }
    }

    /// Set both filters from their raw bits with at most one EEPROM write.
    ///
    /// If either value is invalid nothing is changed.
    pub fn write_filter_mode(&mut self, noise_mode: u16, spike_mode: u16) {
        let noise = NoiseFilter::try_from_primitive(noise_mode);
        let spike = SpikeFilter::try_from_primitive(spike_mode);
        if let (Ok(noise), Ok(spike)) = (noise, spike) {
            self.update_config_or_skip(|register| {
                register.set_noise_filter(noise);
                register.set_spike_filter(spike);
            });
        }
    }

    /// The settling time estimate in milliseconds, or 0 if it couldn't be computed.
    pub fn settling_time_estimate(&mut self) -> u32 {
        self.settling_time().unwrap_or(0)
    }
}
