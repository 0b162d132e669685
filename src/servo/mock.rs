//! Mock PCA9685 for testing.
//!
//! Behaves like the chip's register file: a write sets the register pointer
//! and stores the following bytes, reads return from the pointer, and the
//! pointer only advances while MODE1 has auto-increment enabled. Prescale
//! writes are ignored unless the oscillator is asleep, as on the real part.
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use std::vec::Vec;

use super::registers::{self, mode1};

/// I2C transaction type for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I2cTransaction {
    Write { addr: u8, data: Vec<u8> },
    Read { addr: u8, len: usize },
}

#[derive(Debug)]
pub struct MockI2c {
    registers: [u8; 256],
    pointer: u8,
    transactions: Vec<I2cTransaction>,
    /// (value, MODE1 at the time) for every PRESCALE write
    prescale_writes: Vec<(u8, u8)>,
    fail_writes: bool,
}

impl MockI2c {
    /// Power-on register state.
    pub fn new() -> Self {
        let mut registers = [0u8; 256];
        registers[registers::MODE1 as usize] = 0x11;
        registers[registers::MODE2 as usize] = 0x04;
        registers[registers::PRESCALE as usize] = 0x1E;
        Self {
            registers,
            pointer: 0,
            transactions: Vec::new(),
            prescale_writes: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn transactions(&self) -> Vec<I2cTransaction> {
        self.transactions.clone()
    }

    /// Payloads of every write, including the address byte of register reads.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.transactions
            .iter()
            .filter_map(|t| match t {
                I2cTransaction::Write { data, .. } => Some(data.clone()),
                I2cTransaction::Read { .. } => None,
            })
            .collect()
    }

    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    pub fn register(&self, register: u8) -> u8 {
        self.registers[register as usize]
    }

    pub fn prescale_writes(&self) -> Vec<(u8, u8)> {
        self.prescale_writes.clone()
    }

    /// Makes every following write NACK.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn fail_writes(&self) -> bool {
        self.fail_writes
    }

    fn store(&mut self, value: u8) {
        if self.pointer == registers::PRESCALE {
            let mode = self.register(registers::MODE1);
            self.prescale_writes.push((value, mode));
            if mode & mode1::SLEEP == 0 {
                return;
            }
        }
        self.registers[self.pointer as usize] = value;
    }

    fn advance(&mut self) {
        if self.register(registers::MODE1) & mode1::AI != 0 {
            self.pointer = self.pointer.wrapping_add(1);
        }
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for MockI2c {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::Write(data) => {
                    if self.fail_writes {
                        return Err(ErrorKind::Other);
                    }
                    self.transactions.push(I2cTransaction::Write {
                        addr: address,
                        data: data.to_vec(),
                    });
                    if let Some((&register, values)) = data.split_first() {
                        self.pointer = register;
                        for &value in values {
                            self.store(value);
                            self.advance();
                        }
                    }
                }
                Operation::Read(buffer) => {
                    self.transactions.push(I2cTransaction::Read {
                        addr: address,
                        len: buffer.len(),
                    });
                    for byte in buffer.iter_mut() {
                        *byte = self.register(self.pointer);
                        self.advance();
                    }
                }
            }
        }
        Ok(())
    }
}

/// Delay that only counts how long it was asked to wait.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_only_advances_with_auto_increment() {
        let mut i2c = MockI2c::new();
        i2c.write(0x40, &[0x06, 1, 2]).unwrap();
        assert_eq!(i2c.register(0x06), 2);
        assert_eq!(i2c.register(0x07), 0);

        i2c.write(0x40, &[registers::MODE1, mode1::AI]).unwrap();
        i2c.write(0x40, &[0x06, 1, 2]).unwrap();
        assert_eq!(i2c.register(0x06), 1);
        assert_eq!(i2c.register(0x07), 2);
    }

    #[test]
    fn prescale_is_read_only_while_awake() {
        let mut i2c = MockI2c::new();
        i2c.write(0x40, &[registers::MODE1, 0x00]).unwrap();
        i2c.write(0x40, &[registers::PRESCALE, 121]).unwrap();
        assert_eq!(i2c.register(registers::PRESCALE), 0x1E);
        assert_eq!(i2c.prescale_writes(), vec![(121, 0x00)]);
    }
}
