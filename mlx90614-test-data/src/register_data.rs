// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

/// The number of 16-bit words addressable by an SMBus command on the MLX90614.
///
/// RAM is accessed with commands `0x00` through `0x1F`, EEPROM with `0x20` through `0x3F`.
pub const MEMORY_LENGTH: usize = 0x40;

/// The first command that accesses EEPROM instead of RAM.
pub const EEPROM_START: u8 = 0x20;

/// Raw IR channel 1 (RAM 0x04).
pub const RAW_IR_1: u16 = 0x0010;

/// Raw IR channel 2 (RAM 0x05).
pub const RAW_IR_2: u16 = 0x0000;

/// Ambient temperature (RAM 0x06), 28.75℃.
pub const AMBIENT_TEMPERATURE: u16 = 0x3AF7;

/// Object temperature 1 (RAM 0x07), 28.01℃. This is the value used in the datasheet's PEC
/// example.
pub const OBJECT_TEMPERATURE_1: u16 = 0x3AD2;

/// Object temperature 2 (RAM 0x08). Single zone devices report the same value as zone 1.
pub const OBJECT_TEMPERATURE_2: u16 = 0x3AD2;

/// T<sub>o</sub> maximum (EEPROM 0x20).
pub const OBJECT_TEMPERATURE_MAX: u16 = 0x9993;

/// T<sub>o</sub> minimum (EEPROM 0x21).
pub const OBJECT_TEMPERATURE_MIN: u16 = 0x62E3;

/// PWM control (EEPROM 0x22).
pub const PWM_CONTROL: u16 = 0x0201;

/// T<sub>a</sub> range (EEPROM 0x23).
pub const AMBIENT_TEMPERATURE_RANGE: u16 = 0xF71C;

/// Emissivity (EEPROM 0x24), factory default of 1.0.
pub const EMISSIVITY: u16 = 0xFFFF;

/// Config register 1 (EEPROM 0x25), factory default.
///
/// FIR = 1024, IIR = 100% (no spike filtering), single IIR.
pub const CONFIG_REGISTER: u16 = 0x9FB4;

/// SMBus address (EEPROM 0x2E). Only the low byte is the address.
pub const SMBUS_ADDRESS: u16 = 0xBE5A;

/// The four factory ID words (EEPROM 0x3C-0x3F).
pub const ID: [u16; 4] = [0x1B2C, 0x0E9A, 0x968D, 0x9C43];

/// Build the memory image of a freshly manufactured MLX90614.
pub fn default_memory() -> [u16; MEMORY_LENGTH] {
    let mut memory = [0u16; MEMORY_LENGTH];
    memory[0x04] = RAW_IR_1;
    memory[0x05] = RAW_IR_2;
    memory[0x06] = AMBIENT_TEMPERATURE;
    memory[0x07] = OBJECT_TEMPERATURE_1;
    memory[0x08] = OBJECT_TEMPERATURE_2;
    memory[0x20] = OBJECT_TEMPERATURE_MAX;
    memory[0x21] = OBJECT_TEMPERATURE_MIN;
    memory[0x22] = PWM_CONTROL;
    memory[0x23] = AMBIENT_TEMPERATURE_RANGE;
    memory[0x24] = EMISSIVITY;
    memory[0x25] = CONFIG_REGISTER;
    memory[0x2E] = SMBUS_ADDRESS;
    memory[0x3C..].copy_from_slice(&ID);
    memory
}
