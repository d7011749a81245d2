// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;
use paste::paste;

use crate::address::{Address, EepromAddress, RamAddress};
use crate::calculations::{celsius_to_fahrenheit, raw_to_celsius};
use crate::error::{Error, LibraryError};
use crate::pec::{read_word_pec, write_word_pec};
use crate::register::*;

/// How long to wait after each EEPROM write (including erases), in milliseconds.
///
/// The datasheet specifies a 5ms write time, this leaves some margin.
pub const EEPROM_WRITE_DELAY_MS: u16 = 10;

/// DRY macro for the set_* methods in `Mlx90614` that modify a config register field.
macro_rules! set_config_field {
    { $field:ident, $typ:ty, $doc:literal } => {
    paste! {
        #[doc = $doc]
        ///
        /// The config register is read first, and if the field already has the requested value
        /// nothing is written, sparing the EEPROM an erase/write cycle. If that read fails nothing
        /// is written either.
        pub fn [< set_ $field >](&mut self, new_value: $typ) -> Result<(), Error<I2C>> {
            let current = self.config_register()?;
            let mut updated = current;
            updated.[< set_ $field >](new_value);
            if updated == current {
                trace!("{} unchanged, skipping EEPROM write", stringify!($field));
                Ok(())
            } else {
                self.set_config_register(updated)
            }
        }
    }};
}

/// Driver for an MLX90614 infrared thermometer.
///
/// The driver owns the bus it talks over and a delay provider. The delay provider is used to
/// wait out EEPROM writes, and those waits *block*: every method that changes a setting on the
/// sensor takes at least 20ms. If that's a problem (in an interrupt handler or a cooperative
/// scheduler for example), drive the sensor from a context where blocking is acceptable.
///
/// Every method that touches the bus takes `&mut self`, and a transaction is a write of the
/// command followed by either a read or a write of the data. Sharing a bus between this driver
/// and other devices requires external synchronization (a bus manager, or a mutex around the bus
/// implementation).
#[derive(Clone, Debug)]
pub struct Mlx90614<I2C, D> {
    /// The I²C bus this sensor is accessible on.
    bus: I2C,

    /// Used to wait for EEPROM writes to complete.
    delay: D,

    /// The I²C address this sensor is accessible at.
    address: u8,

    /// Whether the sensor acknowledged the most recent probe.
    present: bool,

    /// Whether to check the PEC the sensor sends with every read.
    verify_pec: bool,
}

impl<I2C, D> Mlx90614<I2C, D>
where
    I2C: i2c::WriteRead + i2c::Write,
    D: DelayMs<u16>,
{
    /// Create a `Mlx90614` for accessing the sensor at the given I²C address.
    ///
    /// The sensor is probed with an empty write, and an error is returned if it doesn't
    /// acknowledge it. The factory default address is [`DEFAULT_ADDRESS`][crate::DEFAULT_ADDRESS]
    /// (0x5A).
    pub fn new(bus: I2C, delay: D, address: u8) -> Result<Self, Error<I2C>> {
        let mut sensor = Self {
            bus,
            delay,
            address,
            present: false,
            verify_pec: false,
        };
        sensor.probe()?;
        Ok(sensor)
    }

    /// Re-initialize the driver with a new bus and address.
    ///
    /// The bus currently owned by the driver is dropped before the sensor is probed on the new
    /// one. If the probe fails, every later operation fails with [`LibraryError::NotPresent`]
    /// until `begin` is called again and succeeds.
    pub fn begin(&mut self, bus: I2C, address: u8) -> Result<(), Error<I2C>> {
        let previous = core::mem::replace(&mut self.bus, bus);
        drop(previous);
        self.address = address;
        self.probe()
    }

    /// Give up ownership of the bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.bus, self.delay)
    }

    fn probe(&mut self) -> Result<(), Error<I2C>> {
        self.present = false;
        self.bus
            .write(self.address, &[])
            .map_err(Error::I2cWriteError)?;
        self.present = true;
        debug!("MLX90614 present at {:#x}", self.address);
        Ok(())
    }

    fn ensure_present(&self) -> Result<(), Error<I2C>> {
        if self.present {
            Ok(())
        } else {
            Err(LibraryError::NotPresent.into())
        }
    }

    /// The I²C address the driver is using.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Whether the PEC sent with each reply is being checked.
    ///
    /// Checking is disabled by default.
    pub fn pec_verification(&self) -> bool {
        self.verify_pec
    }

    /// Enable (or disable) checking the PEC sent with each reply.
    ///
    /// When enabled, a reply with a PEC that doesn't match the computed one is reported as a
    /// [`LibraryError::PecMismatch`] instead of being returned. Successful reads return the same
    /// values either way.
    pub fn set_pec_verification(&mut self, enabled: bool) {
        self.verify_pec = enabled;
    }

    /// Read a single word from RAM or EEPROM.
    pub fn read_word<A: Into<Address>>(&mut self, address: A) -> Result<u16, Error<I2C>> {
        self.ensure_present()?;
        read_register(
            &mut self.bus,
            self.address,
            address.into().command(),
            self.verify_pec,
        )
    }

    /// Write a single word to EEPROM, *without* erasing the cell first.
    ///
    /// The result of writing a non-zero value over a non-zero cell is undefined. Unless you're
    /// sure the cell has been erased (written with 0), use [`write_eeprom`][Self::write_eeprom]
    /// instead.
    pub fn write_word(&mut self, address: EepromAddress, value: u16) -> Result<(), Error<I2C>> {
        self.ensure_present()?;
        let command = Address::from(address);
        debug_assert!(command.is_eeprom(), "{:?} is not in EEPROM", command);
        write_register(&mut self.bus, self.address, command.command(), value)
    }

    /// Write a word to EEPROM, erasing it first.
    ///
    /// The full sequence is: write 0, wait, write `value`, wait. The waits are
    /// [`EEPROM_WRITE_DELAY_MS`] each, and block.
    pub fn write_eeprom(&mut self, address: EepromAddress, value: u16) -> Result<(), Error<I2C>> {
        debug!("Writing {:#x} to EEPROM {:#x}", value, u8::from(address));
        self.write_word(address, 0)?;
        self.delay.delay_ms(EEPROM_WRITE_DELAY_MS);
        self.write_word(address, value)?;
        self.delay.delay_ms(EEPROM_WRITE_DELAY_MS);
        Ok(())
    }

    /// Read a register.
    pub fn register<R: Register>(&mut self) -> Result<R, Error<I2C>> {
        Ok(R::from(self.read_word(R::address())?))
    }

    /// Write a register if its value is different from what the sensor currently has.
    pub fn update_register<R: Register>(&mut self, register: R) -> Result<(), Error<I2C>> {
        let current: R = self.register()?;
        if current == register {
            trace!("Register {:#x} unchanged, skipping EEPROM write", u8::from(R::address()));
            Ok(())
        } else {
            self.write_eeprom(R::address(), register.into())
        }
    }

    fn temperature(&mut self, address: RamAddress) -> Result<f32, Error<I2C>> {
        Ok(raw_to_celsius(self.read_word(address)?))
    }

    /// The object temperature (in ℃).
    ///
    /// This is the temperature of zone 1 on dual zone sensors.
    pub fn object_temperature(&mut self) -> Result<f32, Error<I2C>> {
        self.temperature(RamAddress::ObjectTemperature1)
    }

    /// The object temperature (in ℉).
    pub fn object_temperature_fahrenheit(&mut self) -> Result<f32, Error<I2C>> {
        self.object_temperature().map(celsius_to_fahrenheit)
    }

    /// The ambient (sensor die) temperature (in ℃).
    pub fn ambient_temperature(&mut self) -> Result<f32, Error<I2C>> {
        self.temperature(RamAddress::AmbientTemperature)
    }

    /// The ambient (sensor die) temperature (in ℉).
    pub fn ambient_temperature_fahrenheit(&mut self) -> Result<f32, Error<I2C>> {
        self.ambient_temperature().map(celsius_to_fahrenheit)
    }

    /// The raw value of the emissivity register.
    pub fn emissivity_register(&mut self) -> Result<u16, Error<I2C>> {
        self.read_word(EepromAddress::Emissivity)
    }

    /// Write a raw value to the emissivity register.
    pub fn set_emissivity_register(&mut self, raw: u16) -> Result<(), Error<I2C>> {
        self.write_eeprom(EepromAddress::Emissivity, raw)
    }

    /// The emissivity the sensor is compensating for.
    ///
    /// The default is 1.0.
    pub fn emissivity(&mut self) -> Result<f64, Error<I2C>> {
        Ok(self.register::<EmissivityRegister>()?.emissivity())
    }

    /// Set the emissivity the sensor compensates for.
    ///
    /// The sensor is specified for emissivities between 0.1 and 1.0, values outside of that range
    /// are rejected without touching the sensor.
    pub fn set_emissivity(&mut self, emissivity: f64) -> Result<(), Error<I2C>> {
        let register = EmissivityRegister::from_emissivity(emissivity)?;
        self.write_eeprom(EmissivityRegister::address(), register.into())
    }

    /// Read config register 1.
    pub fn config_register(&mut self) -> Result<ConfigRegister, Error<I2C>> {
        self.register()
    }

    /// Write config register 1.
    ///
    /// This always goes through an erase/write cycle. Be careful with the bits outside of the
    /// filter settings, they hold factory calibration.
    pub fn set_config_register(&mut self, register: ConfigRegister) -> Result<(), Error<I2C>> {
        self.write_eeprom(ConfigRegister::address(), register.into())
    }

    /// The current FIR (noise) filter setting.
    pub fn noise_filter(&mut self) -> Result<NoiseFilter, Error<I2C>> {
        let register = self.config_register()?;
        let filter = register.noise_filter().ok_or(LibraryError::InvalidData(
            "Config register has an unsupported FIR filter setting",
        ))?;
        Ok(filter)
    }

    set_config_field! {
        noise_filter,
        NoiseFilter,
        "Set the FIR (noise) filter."
    }

    /// The current IIR (spike) filter setting.
    pub fn spike_filter(&mut self) -> Result<SpikeFilter, Error<I2C>> {
        Ok(self.config_register()?.spike_filter())
    }

    set_config_field! {
        spike_filter,
        SpikeFilter,
        "Set the IIR (spike) filter."
    }

    /// Check if the second IIR filter stage is enabled.
    pub fn dual_iir(&mut self) -> Result<bool, Error<I2C>> {
        Ok(self.config_register()?.dual_iir())
    }

    set_config_field! {
        dual_iir,
        bool,
        "Enable (or disable) the second IIR filter stage."
    }

    /// Set both the FIR (noise) and IIR (spike) filters with at most one EEPROM write.
    ///
    /// Like the individual setters, nothing is written if both filters already have the requested
    /// settings.
    pub fn set_filters(
        &mut self,
        noise: NoiseFilter,
        spike: SpikeFilter,
    ) -> Result<(), Error<I2C>> {
        let current = self.config_register()?;
        let mut updated = current;
        updated.set_noise_filter(noise);
        updated.set_spike_filter(spike);
        if updated == current {
            trace!("Filters unchanged, skipping EEPROM write");
            return Ok(());
        }
        self.set_config_register(updated)
    }

    /// Estimate how long the sensor output takes to settle after a step change, in
    /// milliseconds, using the current filter settings.
    pub fn settling_time(&mut self) -> Result<u32, Error<I2C>> {
        let settling_time = self.config_register()?.settling_time()?;
        Ok(settling_time)
    }

    /// The four factory ID words.
    pub fn id(&mut self) -> Result<[u16; 4], Error<I2C>> {
        Ok([
            self.read_word(EepromAddress::Id1)?,
            self.read_word(EepromAddress::Id2)?,
            self.read_word(EepromAddress::Id3)?,
            self.read_word(EepromAddress::Id4)?,
        ])
    }
}

fn read_register<I2C>(
    bus: &mut I2C,
    i2c_address: u8,
    command: u8,
    verify_pec: bool,
) -> Result<u16, Error<I2C>>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    // Two data bytes (little-endian) and the PEC.
    let mut reply = [0u8; 3];
    bus.write_read(i2c_address, &[command], &mut reply)
        .map_err(Error::I2cWriteReadError)?;
    let [low, high, received] = reply;
    let value = u16::from_le_bytes([low, high]);
    if verify_pec {
        let computed = read_word_pec(i2c_address, command, value);
        if computed != received {
            warn!(
                "PEC mismatch reading {:#x}: computed {:#x}, received {:#x}",
                command,
                computed,
                received
            );
            return Err(LibraryError::PecMismatch { computed, received }.into());
        }
    }
    Ok(value)
}

fn write_register<I2C>(
    bus: &mut I2C,
    i2c_address: u8,
    command: u8,
    value: u16,
) -> Result<(), Error<I2C>>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    let [low, high] = value.to_le_bytes();
    // The address is covered by the PEC, but the I²C implementation sends it for us.
    let pec = write_word_pec(i2c_address, command, value);
    bus.write(i2c_address, &[command, low, high, pec])
        .map_err(Error::I2cWriteError)
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::vec;

    use float_cmp::assert_approx_eq;
    use mlx90614_test_data::register_data;
    use mlx90614_test_data::{MockDelay, MockError, MockSensorBus, Operation};

    use super::*;

    fn create_mlx90614(address: u8) -> (Mlx90614<MockSensorBus, MockDelay>, MockSensorBus) {
        let mock_bus = MockSensorBus::new(address);
        let sensor = Mlx90614::new(mock_bus.clone(), mock_bus.delay(), address)
            .expect("A MLX90614 should be created when the device is present");
        mock_bus.clear_operations();
        (sensor, mock_bus)
    }

    #[test]
    fn smoke_test() {
        let mock_bus = MockSensorBus::new(0x5A);
        let sensor = Mlx90614::new(mock_bus.clone(), mock_bus.delay(), 0x5A).unwrap();
        assert_eq!(sensor.address(), 0x5A);
        assert!(!sensor.pec_verification());
        assert_eq!(*mock_bus.operations(), vec![Operation::Probe]);
    }

    #[test]
    fn absent_sensor() {
        let mock_bus = MockSensorBus::new(0x5A);
        mock_bus.set_present(false);
        let res = Mlx90614::new(mock_bus.clone(), mock_bus.delay(), 0x5A);
        assert_eq!(
            res.unwrap_err(),
            Error::I2cWriteError(MockError::NoAcknowledge)
        );
    }

    #[test]
    fn wrong_address() {
        let mock_bus = MockSensorBus::new(0x5A);
        let res = Mlx90614::new(mock_bus.clone(), mock_bus.delay(), 0x33);
        assert_eq!(
            res.unwrap_err(),
            Error::I2cWriteError(MockError::UnknownI2cAddress(0x33))
        );
    }

    #[test]
    fn read_word_single_transaction() {
        // Non-default address to make sure assumptions aren't being made about the address.
        let (mut sensor, mock_bus) = create_mlx90614(0x10);
        let value = sensor.read_word(RamAddress::ObjectTemperature1).unwrap();
        assert_eq!(value, register_data::OBJECT_TEMPERATURE_1);
        assert_eq!(
            *mock_bus.operations(),
            vec![Operation::Read { command: 0x07 }]
        );
    }

    #[test]
    fn write_word_frame() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        sensor.write_word(EepromAddress::Emissivity, 0).unwrap();
        assert_eq!(
            *mock_bus.operations(),
            vec![Operation::Write {
                command: 0x24,
                value: 0x0000,
                pec: 0x28
            }]
        );
    }

    #[test]
    fn write_eeprom_sequence() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        sensor
            .write_eeprom(EepromAddress::Config, 0x9FB3)
            .unwrap();
        assert_eq!(
            *mock_bus.operations(),
            vec![
                Operation::Write {
                    command: 0x25,
                    value: 0x0000,
                    pec: write_word_pec(0x5A, 0x25, 0x0000),
                },
                Operation::Delay { ms: 10 },
                Operation::Write {
                    command: 0x25,
                    value: 0x9FB3,
                    pec: write_word_pec(0x5A, 0x25, 0x9FB3),
                },
                Operation::Delay { ms: 10 },
            ]
        );
        assert_eq!(mock_bus.register(0x25), 0x9FB3);
    }

    #[test]
    fn write_without_erase_is_rejected() {
        // The mock is strict about erasing, make sure the error makes it through.
        let (mut sensor, _mock_bus) = create_mlx90614(0x5A);
        let res = sensor.write_word(EepromAddress::Emissivity, 0x8000);
        assert!(matches!(
            res,
            Err(Error::I2cWriteError(MockError::NotErased { .. }))
        ));
    }

    #[test]
    fn eeprom_round_trip() {
        let (mut sensor, _mock_bus) = create_mlx90614(0x5A);
        let addresses = [
            EepromAddress::ObjectTemperatureMax,
            EepromAddress::ObjectTemperatureMin,
            EepromAddress::PwmControl,
            EepromAddress::AmbientTemperatureRange,
            EepromAddress::Emissivity,
            EepromAddress::Config,
            EepromAddress::SmbusAddress,
        ];
        for address in addresses {
            for value in [0x0000, 0x0001, 0x1234, 0x8000, 0xFFFF] {
                sensor.write_eeprom(address, value).unwrap();
                assert_eq!(sensor.read_word(address).unwrap(), value);
            }
        }
    }

    #[test]
    fn temperatures() {
        let (mut sensor, _mock_bus) = create_mlx90614(0x5A);
        assert_approx_eq!(
            f32,
            sensor.object_temperature().unwrap(),
            28.01,
            epsilon = 0.001
        );
        assert_approx_eq!(
            f32,
            sensor.ambient_temperature().unwrap(),
            28.75,
            epsilon = 0.001
        );
        assert_approx_eq!(
            f32,
            sensor.ambient_temperature_fahrenheit().unwrap(),
            83.75,
            epsilon = 0.001
        );
        assert_approx_eq!(
            f32,
            sensor.object_temperature_fahrenheit().unwrap(),
            82.418,
            epsilon = 0.001
        );
    }

    #[test]
    fn temperature_read_failure() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        mock_bus.set_fail_reads(true);
        assert_eq!(
            sensor.object_temperature(),
            Err(Error::I2cWriteReadError(MockError::NoAcknowledge))
        );
        assert_eq!(
            sensor.ambient_temperature_fahrenheit(),
            Err(Error::I2cWriteReadError(MockError::NoAcknowledge))
        );
    }

    #[test]
    fn emissivity() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        assert_eq!(sensor.emissivity().unwrap(), 1.0);
        sensor.set_emissivity(0.5).unwrap();
        assert_eq!(mock_bus.register(0x24), 32767);
        assert_eq!(sensor.emissivity_register().unwrap(), 32767);
        sensor.set_emissivity(1.0).unwrap();
        assert_eq!(sensor.emissivity_register().unwrap(), 65535);
        assert_eq!(sensor.emissivity().unwrap(), 1.0);
    }

    #[test]
    fn emissivity_out_of_range() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        for value in [0.0, 0.05, 1.5, -1.0, f64::NAN] {
            assert!(matches!(
                sensor.set_emissivity(value),
                Err(Error::LibraryError(LibraryError::InvalidData(_)))
            ));
        }
        assert!(mock_bus.operations().is_empty());
        assert_eq!(mock_bus.register(0x24), register_data::EMISSIVITY);
    }

    #[test]
    fn emissivity_register_raw() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        sensor.set_emissivity_register(6553).unwrap();
        assert_eq!(mock_bus.register(0x24), 6553);
        assert_approx_eq!(f64, sensor.emissivity().unwrap(), 0.1, epsilon = 0.0001);
    }

    #[test]
    fn read_filters() {
        let (mut sensor, _mock_bus) = create_mlx90614(0x5A);
        assert_eq!(sensor.noise_filter().unwrap(), NoiseFilter::Fir1024);
        assert_eq!(sensor.spike_filter().unwrap(), SpikeFilter::Limit100);
        assert!(!sensor.dual_iir().unwrap());
    }

    #[test]
    fn unsupported_noise_filter() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        mock_bus.set_register(0x25, 0x9BB4);
        assert!(matches!(
            sensor.noise_filter(),
            Err(Error::LibraryError(LibraryError::InvalidData(_)))
        ));
        assert!(sensor.settling_time().is_err());
    }

    #[test]
    fn set_noise_filter() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        sensor.set_noise_filter(NoiseFilter::Fir128).unwrap();
        assert_eq!(mock_bus.register(0x25), 0x9CB4);
        assert_eq!(mock_bus.read_count(), 1);
        assert_eq!(mock_bus.write_count(), 2);
        assert_eq!(mock_bus.total_delay_ms(), 20);
        assert_eq!(sensor.noise_filter().unwrap(), NoiseFilter::Fir128);
    }

    #[test]
    fn set_spike_filter() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        sensor.set_spike_filter(SpikeFilter::Limit13).unwrap();
        assert_eq!(mock_bus.register(0x25), 0x9FB3);
        assert_eq!(sensor.spike_filter().unwrap(), SpikeFilter::Limit13);
    }

    #[test]
    fn set_dual_iir() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        sensor.set_dual_iir(true).unwrap();
        assert_eq!(mock_bus.register(0x25), 0x9FF4);
        assert!(sensor.dual_iir().unwrap());
    }

    #[test]
    fn set_filters() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        sensor
            .set_filters(NoiseFilter::Fir256, SpikeFilter::Limit80)
            .unwrap();
        assert_eq!(mock_bus.register(0x25), 0x9DB5);
        // One erase, one write
        assert_eq!(mock_bus.write_count(), 2);
    }

    #[test]
    fn unchanged_filters_skip_write() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        sensor.set_noise_filter(NoiseFilter::Fir1024).unwrap();
        sensor.set_spike_filter(SpikeFilter::Limit100).unwrap();
        sensor.set_dual_iir(false).unwrap();
        sensor
            .set_filters(NoiseFilter::Fir1024, SpikeFilter::Limit100)
            .unwrap();
        assert_eq!(
            mock_bus.read_count(),
            4,
            "There should only be one read to check each setting"
        );
        assert_eq!(mock_bus.write_count(), 0);
        assert_eq!(mock_bus.total_delay_ms(), 0);
    }

    #[test]
    fn failed_read_skips_write() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        mock_bus.set_fail_reads(true);
        assert!(sensor.set_noise_filter(NoiseFilter::Fir128).is_err());
        assert!(sensor.set_spike_filter(SpikeFilter::Limit13).is_err());
        assert!(sensor
            .set_filters(NoiseFilter::Fir128, SpikeFilter::Limit13)
            .is_err());
        assert_eq!(mock_bus.write_count(), 0);
        assert_eq!(mock_bus.register(0x25), register_data::CONFIG_REGISTER);
    }

    #[test]
    fn failed_erase_stops_write() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        mock_bus.set_fail_writes(true);
        assert_eq!(
            sensor.set_emissivity(0.5),
            Err(Error::I2cWriteError(MockError::NoAcknowledge))
        );
        assert_eq!(mock_bus.write_count(), 1);
        assert_eq!(mock_bus.total_delay_ms(), 0);
    }

    #[test]
    fn update_register() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        sensor
            .update_register(ConfigRegister::default())
            .unwrap();
        assert_eq!(mock_bus.write_count(), 0);
        sensor
            .update_register(EmissivityRegister::from(0x8000))
            .unwrap();
        assert_eq!(mock_bus.write_count(), 2);
        assert_eq!(
            sensor.register::<EmissivityRegister>().unwrap().raw(),
            0x8000
        );
    }

    #[test]
    fn settling_time() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        assert_eq!(sensor.settling_time().unwrap(), 95);
        // FIR 128, IIR 50%, dual IIR
        mock_bus.set_register(0x25, 0x9CF0);
        assert_eq!(sensor.settling_time().unwrap(), 468);
    }

    #[test]
    fn id() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        assert_eq!(sensor.id().unwrap(), register_data::ID);
        assert_eq!(mock_bus.read_count(), 4);
    }

    #[test]
    fn pec_verification() {
        let (mut sensor, mock_bus) = create_mlx90614(0x5A);
        sensor.set_pec_verification(true);
        assert!(sensor.pec_verification());
        assert_eq!(
            sensor.read_word(RamAddress::ObjectTemperature1).unwrap(),
            register_data::OBJECT_TEMPERATURE_1
        );
        mock_bus.set_corrupt_pec(true);
        assert_eq!(
            sensor.read_word(RamAddress::ObjectTemperature1),
            Err(Error::LibraryError(LibraryError::PecMismatch {
                computed: 0x30,
                received: !0x30,
            }))
        );
        // Without verification the bad PEC is ignored
        sensor.set_pec_verification(false);
        assert_eq!(
            sensor.read_word(RamAddress::ObjectTemperature1).unwrap(),
            register_data::OBJECT_TEMPERATURE_1
        );
    }

    #[test]
    fn begin_drops_previous_bus() {
        let (mut sensor, old_bus) = create_mlx90614(0x5A);
        // The test's clone, the sensor's bus, and the sensor's delay
        assert_eq!(old_bus.handle_count(), 3);
        let new_bus = MockSensorBus::new(0x5B);
        sensor.begin(new_bus.clone(), 0x5B).unwrap();
        assert_eq!(old_bus.handle_count(), 2);
        assert_eq!(new_bus.handle_count(), 2);
        assert_eq!(sensor.address(), 0x5B);
        sensor.read_word(RamAddress::AmbientTemperature).unwrap();
        assert_eq!(new_bus.read_count(), 1);
        assert_eq!(old_bus.read_count(), 0);
    }

    #[test]
    fn failed_begin() {
        let (mut sensor, _old_bus) = create_mlx90614(0x5A);
        let absent_bus = MockSensorBus::new(0x5A);
        absent_bus.set_present(false);
        assert_eq!(
            sensor.begin(absent_bus.clone(), 0x5A),
            Err(Error::I2cWriteError(MockError::NoAcknowledge))
        );
        assert_eq!(
            sensor.object_temperature(),
            Err(Error::LibraryError(LibraryError::NotPresent))
        );
        assert_eq!(
            sensor.set_emissivity(0.5),
            Err(Error::LibraryError(LibraryError::NotPresent))
        );
        // Nothing besides the probe should have been attempted
        assert_eq!(absent_bus.operations().len(), 0);
        absent_bus.set_present(true);
        sensor.begin(absent_bus.clone(), 0x5A).unwrap();
        assert!(sensor.object_temperature().is_ok());
    }

    #[test]
    fn release() {
        let (sensor, mock_bus) = create_mlx90614(0x5A);
        let (bus, _delay) = sensor.release();
        assert_eq!(bus.i2c_address(), 0x5A);
        assert_eq!(mock_bus.handle_count(), 3);
    }
}
