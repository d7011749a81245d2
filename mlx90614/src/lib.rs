// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! A pure-Rust library for accessing the Melexis MLX90614 infrared thermometer over SMBus.
//!
//! The MLX90614 measures the temperature of whatever is in its field of view (the "object"), as
//! well as its own temperature (the "ambient" temperature). Beyond reading temperatures, this
//! library can adjust the emissivity the sensor compensates for and configure its two digital
//! filters.
//!
//! This library uses the [`embedded-hal`][embedded-hal] I²C traits, meaning you should be able to
//! use this library on other platforms, as long as there's an `embedded-hal` I²C implementation
//! available. This library is also `no_std` compatible.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/*/embedded_hal/blocking/i2c/index.html
//!
//! # Example
//! ```no_run
//! use linux_embedded_hal::{Delay, I2cdev};
//! use mlx90614::{Mlx90614, NoiseFilter, DEFAULT_ADDRESS};
//!
//! let i2c_bus = I2cdev::new("/dev/i2c-1").expect("/dev/i2c-1 needs to be an I2C controller");
//! let mut sensor = Mlx90614::new(i2c_bus, Delay, DEFAULT_ADDRESS)?;
//! let object = sensor.object_temperature()?;
//! let ambient = sensor.ambient_temperature()?;
//! println!("Object: {:.2}℃, ambient: {:.2}℃", object, ambient);
//! // Less noise, slower response. Nothing is written if this is already the setting.
//! sensor.set_noise_filter(NoiseFilter::Fir1024)?;
//! # Ok::<(), mlx90614::Error<I2cdev>>(())
//! ```
//!
//! # EEPROM Writes
//! Settings (emissivity, the filters, and the rest of the configuration) are stored in EEPROM.
//! Every EEPROM write is done as an erase (writing 0) and then the actual write, with a delay
//! after each. These delays block the calling thread for 20ms in total, which is why
//! [`Mlx90614`] needs a [`DelayMs`][embedded_hal::blocking::delay::DelayMs] implementation. The
//! filter setters read the current configuration first and skip the write entirely if nothing
//! would change, as the EEPROM has a limited number of write cycles.
//!
//! # Packet Error Codes
//! Every write includes an SMBus packet error code (a CRC-8 over the transaction). The sensor
//! sends one with every reply as well, but checking it is opt-in; see
//! [`Mlx90614::set_pec_verification`]. The calculation is exposed in the [`pec`] module.
//!
//! # Sentinel Values
//! A second set of accessors that return NaN or error codes instead of a `Result` is also
//! available (for example [`Mlx90614::read_object_temp_c`]), for code ported from libraries on
//! other platforms.
//!
//! # Logging
//! Enabling the `log` or `defmt` feature logs EEPROM writes (at debug), skipped writes (at trace)
//! and PEC mismatches (at warn) through the respective crate. Only one of them may be enabled.

#![no_std]
#![allow(clippy::float_cmp)]

#[cfg(all(feature = "log", feature = "defmt"))]
compile_error!("Only one of the 'log' and 'defmt' features may be enabled.");

// This must go first, so the macros are visible to the rest of the crate.
#[macro_use]
mod fmt;

pub mod address;
pub mod calculations;
#[doc(hidden)]
pub mod driver;
#[doc(hidden)]
pub mod error;
pub mod pec;
pub mod register;
mod sentinel;
mod util;

pub use address::{Address, EepromAddress, RamAddress, DEFAULT_ADDRESS};
#[doc(inline)]
pub use driver::{Mlx90614, EEPROM_WRITE_DELAY_MS};
#[doc(inline)]
pub use error::{Error, LibraryError};
pub use register::*;
pub use sentinel::{NOISE_FILTER_ERROR, SPIKE_FILTER_ERROR};
