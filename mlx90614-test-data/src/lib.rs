// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
mod i2c_mock;
pub mod register_data;

pub use i2c_mock::{MockDelay, MockError, MockSensorBus, Operation};
pub use register_data::{default_memory, MEMORY_LENGTH};
