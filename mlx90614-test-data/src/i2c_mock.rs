// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use std::cell::{Ref, RefCell};
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;

use crate::register_data::{default_memory, EEPROM_START, MEMORY_LENGTH};

/// The ID words are programmed at the factory and can't be changed.
const ID_START: u8 = 0x3C;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MockError {
    /// The device didn't acknowledge the transaction.
    ///
    /// Returned when the device has been marked absent, or when a failure has been injected.
    NoAcknowledge,

    /// An unknown I2C address was given.
    UnknownI2cAddress(u8),

    /// The requested operation is not allowed.
    ///
    /// This covers things situations such as:
    /// * A write-read transaction that writes more (or less) than a single command byte.
    /// * A write-read transaction that reads anything other than two data bytes and a PEC.
    /// * A plain write that isn't exactly a command, two data bytes and a PEC.
    IllegalOperation,

    /// The given command doesn't map to anything in the device.
    UnknownMemoryAddress(u8),

    /// The given command can't be written to (RAM or the factory ID words).
    IllegalWriteAddress(u8),

    /// The PEC sent with a write didn't match the frame.
    BadPec { command: u8, expected: u8, received: u8 },

    /// A non-zero value was written over a cell that had not been erased first.
    NotErased { command: u8, existing: u16, new: u16 },
}

/// A record of something that happened to the mock device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// An empty write, used to check if the device is present.
    Probe,

    /// A combined write-read of a single word.
    Read { command: u8 },

    /// A single word write, along with the PEC byte that was sent.
    Write { command: u8, value: u16, pec: u8 },

    /// A blocking delay (from [`MockDelay`]).
    Delay { ms: u16 },
}

#[derive(Debug)]
struct DeviceState {
    memory: [u16; MEMORY_LENGTH],
    present: bool,
    fail_reads: bool,
    fail_writes: bool,
    corrupt_pec: bool,
    operations: Vec<Operation>,
}

/// A mock MLX90614 on an SMBus.
///
/// Clones share the same device, so a test can keep a clone around to inspect what a driver did
/// with the one it was given.
#[derive(Clone, Debug)]
pub struct MockSensorBus {
    i2c_address: u8,
    state: Rc<RefCell<DeviceState>>,
}

/// A delay provider that records delays into the operation log of a [`MockSensorBus`] instead
/// of sleeping.
#[derive(Clone, Debug)]
pub struct MockDelay {
    state: Rc<RefCell<DeviceState>>,
}

impl MockSensorBus {
    /// Create a mock device with factory default memory contents at the given address.
    pub fn new(i2c_address: u8) -> Self {
        Self::with_memory(i2c_address, default_memory())
    }

    pub fn with_memory(i2c_address: u8, memory: [u16; MEMORY_LENGTH]) -> Self {
        Self {
            i2c_address,
            state: Rc::new(RefCell::new(DeviceState {
                memory,
                present: true,
                fail_reads: false,
                fail_writes: false,
                corrupt_pec: false,
                operations: Vec::new(),
            })),
        }
    }

    pub fn i2c_address(&self) -> u8 {
        self.i2c_address
    }

    /// A delay provider that logs to this device's operation log.
    pub fn delay(&self) -> MockDelay {
        MockDelay {
            state: Rc::clone(&self.state),
        }
    }

    /// Read a word directly out of the device memory, bypassing the bus.
    pub fn register(&self, command: u8) -> u16 {
        self.state.borrow().memory[command as usize]
    }

    /// Overwrite a word directly in device memory, bypassing the bus and all of its checks.
    pub fn set_register(&self, command: u8, value: u16) {
        self.state.borrow_mut().memory[command as usize] = value;
    }

    /// Mark the device as present (the default) or absent from the bus.
    pub fn set_present(&self, present: bool) {
        self.state.borrow_mut().present = present;
    }

    /// Make every subsequent read fail with [`MockError::NoAcknowledge`].
    pub fn set_fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    /// Make every subsequent write fail with [`MockError::NoAcknowledge`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    /// Send an incorrect PEC with every read reply.
    pub fn set_corrupt_pec(&self, corrupt: bool) {
        self.state.borrow_mut().corrupt_pec = corrupt;
    }

    /// All recorded operations, oldest first.
    pub fn operations(&self) -> Ref<Vec<Operation>> {
        Ref::map(self.state.borrow(), |state| &state.operations)
    }

    pub fn clear_operations(&self) {
        self.state.borrow_mut().operations.clear()
    }

    pub fn read_count(&self) -> usize {
        self.count(|op| matches!(op, Operation::Read { .. }))
    }

    pub fn write_count(&self) -> usize {
        self.count(|op| matches!(op, Operation::Write { .. }))
    }

    /// The total amount of time spent in delays, in milliseconds.
    pub fn total_delay_ms(&self) -> u32 {
        self.operations()
            .iter()
            .map(|op| match op {
                Operation::Delay { ms } => u32::from(*ms),
                _ => 0,
            })
            .sum()
    }

    /// The number of live handles (bus clones and delays) to this device.
    ///
    /// Useful for checking that a driver has let go of a bus.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.state)
    }

    fn count<P: Fn(&Operation) -> bool>(&self, predicate: P) -> usize {
        self.operations().iter().filter(|op| predicate(op)).count()
    }

    fn add_operation(&self, operation: Operation) {
        self.state.borrow_mut().operations.push(operation);
    }

    fn check_address(&self, i2c_address: u8) -> Result<(), MockError> {
        if i2c_address != self.i2c_address {
            Err(MockError::UnknownI2cAddress(i2c_address))
        } else if !self.state.borrow().present {
            Err(MockError::NoAcknowledge)
        } else {
            Ok(())
        }
    }
}

impl i2c::Write for MockSensorBus {
    type Error = MockError;

    fn write(&mut self, i2c_address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check_address(i2c_address)?;
        if bytes.is_empty() {
            self.add_operation(Operation::Probe);
            return Ok(());
        }
        let frame: [u8; 4] = bytes.try_into().map_err(|_| MockError::IllegalOperation)?;
        let [command, low, high, pec] = frame;
        let value = u16::from_le_bytes([low, high]);
        self.add_operation(Operation::Write {
            command,
            value,
            pec,
        });
        if self.state.borrow().fail_writes {
            return Err(MockError::NoAcknowledge);
        }
        if usize::from(command) >= MEMORY_LENGTH {
            return Err(MockError::UnknownMemoryAddress(command));
        }
        if command < EEPROM_START || command >= ID_START {
            return Err(MockError::IllegalWriteAddress(command));
        }
        // The address with the write bit is part of the checksum even though it's not in `bytes`.
        let expected = reference_pec(&[i2c_address << 1, command, low, high]);
        if expected != pec {
            return Err(MockError::BadPec {
                command,
                expected,
                received: pec,
            });
        }
        let mut state = self.state.borrow_mut();
        let existing = state.memory[command as usize];
        if existing != 0 && value != 0 {
            return Err(MockError::NotErased {
                command,
                existing,
                new: value,
            });
        }
        state.memory[command as usize] = value;
        Ok(())
    }
}

impl i2c::WriteRead for MockSensorBus {
    type Error = MockError;

    fn write_read(
        &mut self,
        i2c_address: u8,
        write_buffer: &[u8],
        out_buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.check_address(i2c_address)?;
        // Only a command goes out, and only a word plus PEC comes back.
        if write_buffer.len() != 1 || out_buffer.len() != 3 {
            return Err(MockError::IllegalOperation);
        }
        let command = write_buffer[0];
        if usize::from(command) >= MEMORY_LENGTH {
            return Err(MockError::UnknownMemoryAddress(command));
        }
        self.add_operation(Operation::Read { command });
        let state = self.state.borrow();
        if state.fail_reads {
            return Err(MockError::NoAcknowledge);
        }
        let [low, high] = state.memory[command as usize].to_le_bytes();
        let mut pec = reference_pec(&[
            i2c_address << 1,
            command,
            (i2c_address << 1) | 1,
            low,
            high,
        ]);
        if state.corrupt_pec {
            pec = !pec;
        }
        out_buffer.copy_from_slice(&[low, high, pec]);
        Ok(())
    }
}

impl DelayMs<u16> for MockDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.state
            .borrow_mut()
            .operations
            .push(Operation::Delay { ms });
    }
}

/// An independent SMBus PEC implementation, so the mock isn't checking the driver against itself.
fn reference_pec(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |crc, byte| {
        (0..8).fold(crc ^ byte, |crc, _| {
            if crc & 0x80 != 0 {
                (crc << 1) ^ 0x07
            } else {
                crc << 1
            }
        })
    })
}
