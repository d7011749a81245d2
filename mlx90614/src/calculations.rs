// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Conversions between raw register values and physical quantities.
//!
//! The temperature registers have a resolution of 0.02 K per LSB, with 0 at absolute zero.
//! Emissivity is a 16-bit fraction of `0xFFFF`.
use crate::register::{NoiseFilter, SpikeFilter};

/// Kelvin per LSB of the temperature registers.
pub const TEMPERATURE_RESOLUTION: f32 = 0.02;

/// 0℃ in Kelvin.
pub const ZERO_CELSIUS: f32 = 273.15;

/// Convert a raw temperature register value (T<sub>a</sub> or T<sub>obj</sub>) to degrees
/// Celsius.
/// ```
/// # use mlx90614::calculations::raw_to_celsius;
/// # use float_cmp::assert_approx_eq;
/// assert_approx_eq!(f32, raw_to_celsius(0x3AD2), 28.01, epsilon = 0.001);
/// ```
pub fn raw_to_celsius(raw: u16) -> f32 {
    f32::from(raw) * TEMPERATURE_RESOLUTION - ZERO_CELSIUS
}

/// Convert degrees Celsius to degrees Fahrenheit.
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Convert a raw emissivity register value to an emissivity between 0 and 1.
pub fn emissivity_from_raw(raw: u16) -> f64 {
    f64::from(raw) / 65535.0
}

/// Convert an emissivity to the raw register representation.
///
/// The conversion truncates towards zero. Values outside of the representable range saturate
/// (and NaN becomes 0), but callers should be validating against the sensor's 0.1 to 1.0 range
/// before getting here.
pub fn emissivity_to_raw(emissivity: f64) -> u16 {
    (f64::from(u16::MAX) * emissivity) as u16
}

/// The per-FIR-setting constant used in the settling time estimate.
fn fir_constant(filter: NoiseFilter) -> f64 {
    match filter {
        NoiseFilter::Fir128 => 5.184,
        NoiseFilter::Fir256 => 9.280,
        NoiseFilter::Fir512 => 17.472,
        NoiseFilter::Fir1024 => 33.856,
    }
}

/// The per-IIR-setting constant used in the settling time estimate.
fn iir_constant(filter: SpikeFilter) -> f64 {
    match filter {
        SpikeFilter::Limit13 | SpikeFilter::Limit17 | SpikeFilter::Limit25 | SpikeFilter::Limit50 => {
            10.0
        }
        SpikeFilter::Limit57 => 9.0,
        SpikeFilter::Limit67 => 8.0,
        SpikeFilter::Limit80 => 4.0,
        SpikeFilter::Limit100 => 1.0,
    }
}

/// Estimate the settling time of the sensor output for the given filter settings, in whole
/// milliseconds (truncated).
///
/// The estimate is
/// 9.719 + IIR(FIR + 5.26) + IIR(FIR + 12.542) + IIR · dual · (FIR + 12.542)
/// with the FIR and IIR constants taken from Melexis' filter application note.
pub fn settling_time_ms(noise: NoiseFilter, spike: SpikeFilter, dual_iir: bool) -> u32 {
    let fir = fir_constant(noise);
    let iir = iir_constant(spike);
    let dual = if dual_iir { 1.0 } else { 0.0 };
    let estimate =
        9.719 + (iir * (fir + 5.26)) + (iir * (fir + 12.542)) + (iir * dual * (fir + 12.542));
    estimate as u32
}
