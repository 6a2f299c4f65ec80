//! Decoders for two analog inputs found on small controller boards: a
//! keypad wired as a resistor ladder on one ADC channel, and a thermistor
//! read through a calibration table.
//!
//! Both decoders read through the `embedded-hal` [`OneShot`] ADC trait.
//! They own their channel pin and can be given it back with `free`.
//!
//! ```
//! use adc_decoders::{
//!     Button, Keypad, KeypadConfig, Oversampling, Reading, ThermistorConfig,
//!     ThermistorDecoder,
//! };
//! # use embedded_hal_mock::adc::{Mock, MockChan0, MockChan1, Transaction};
//! #
//! # let mut expectations: Vec<Transaction<u16>> = vec![Transaction::read(0, 612)];
//! # expectations.extend((0..16).map(|_| Transaction::read(1, 591)));
//! # let mut adc = Mock::new(&expectations);
//! # let (button_pin, thermistor_pin) = (MockChan0 {}, MockChan1 {});
//!
//! let mut keypad = Keypad::new(button_pin, KeypadConfig::MEASURED);
//! let mut thermistor = ThermistorDecoder::new(
//!     thermistor_pin,
//!     ThermistorConfig {
//!         oversampling: Oversampling::Sum,
//!         ..ThermistorConfig::default()
//!     },
//! );
//!
//! let event = keypad.read(&mut adc).unwrap();
//! assert_eq!(event.button, Button::Select);
//! assert!(event.just_pressed);
//!
//! // Temperatures are in the calibration table's units
//! assert_eq!(thermistor.read(&mut adc), Ok(Reading::Temperature(100)));
//! ```
//!
//! [`OneShot`]: embedded_hal::adc::OneShot

#![cfg_attr(not(test), no_std)]

pub mod button;
pub mod calibration;
mod interpolate;
pub mod thermistor;

pub use button::{
    Button, ButtonDecoder, ButtonDecoderState, ButtonEvent, ButtonWindow, Keypad, KeypadConfig,
};
pub use calibration::{CalibrationEntry, CalibrationTable, TableError, COLD_END_RESERVED};
pub use thermistor::{Oversampling, Reading, ThermistorConfig, ThermistorDecoder};
