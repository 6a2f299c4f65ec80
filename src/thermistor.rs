//! Thermistor temperature from an oversampled ADC reading and a
//! [`CalibrationTable`].

use crate::{
    calibration::{CalibrationTable, COLD_END_RESERVED, OVERSAMPLE},
    interpolate::interpolate,
};
use embedded_hal::adc::{Channel, OneShot};

/// Samples drawn per reading unless configured otherwise. Matches the
/// scale of the shipped table.
pub const OVERSAMPLE_COUNT: u8 = OVERSAMPLE as u8;

/// Value legacy callers receive for either fault.
pub const FAULT_SENTINEL: i32 = 0;

/// How the samples of one reading are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    /// Keep only the final sample. Earlier samples are drawn and discarded.
    #[default]
    LastSample,
    /// Integer mean of all samples.
    Mean,
    /// Sum of all samples. Matches tables whose raw values were scaled by
    /// the sample count.
    Sum,
}

/// Outcome of a table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Temperature in the table's scale.
    Temperature(i32),
    /// Sample below the hottest row: hotter than the table covers. The
    /// heater should be shut down.
    Overflow,
    /// Sample at or past the reserved cold rows, usually an unplugged
    /// thermistor.
    Underflow,
}

impl Reading {
    pub fn temperature(self) -> Option<i32> {
        match self {
            Reading::Temperature(t) => Some(t),
            Reading::Overflow | Reading::Underflow => None,
        }
    }

    pub fn is_fault(self) -> bool {
        self.temperature().is_none()
    }

    /// Collapses faults to [`FAULT_SENTINEL`].
    ///
    /// A sentinel of `0` cannot be told apart from a genuine `0` reading.
    pub fn to_sentinel(self) -> i32 {
        self.temperature().unwrap_or(FAULT_SENTINEL)
    }
}

/// Converts an oversampled value into a [`Reading`].
///
/// Rows are scanned from the hot end, stopping short of the reserved cold
/// rows. The bracket is the last row whose raw value is below `sample` and
/// the row after it.
///
/// # Examples
///
/// ```
/// use adc_decoders::{thermistor::lookup, CalibrationTable, Reading};
///
/// let table = CalibrationTable::default();
///
/// assert_eq!(lookup(&table, 591 * 16), Reading::Temperature(100));
/// assert_eq!(lookup(&table, 9752), Reading::Temperature(97));
/// assert_eq!(lookup(&table, 0), Reading::Overflow);
/// assert_eq!(lookup(&table, 1023 * 16), Reading::Underflow);
/// ```
pub fn lookup(table: &CalibrationTable, sample: u32) -> Reading {
    let hottest = table.hottest();

    if sample < hottest.raw {
        return Reading::Overflow;
    }
    if sample >= table.coldest_usable().raw {
        return Reading::Underflow;
    }

    let rows = table.entries();
    let scanned = &rows[..rows.len() - COLD_END_RESERVED];
    let below = scanned.iter().take_while(|row| sample > row.raw).count();

    // Nothing below means the sample sits exactly on the hottest row.
    let Some(high) = below.checked_sub(1) else {
        return Reading::Temperature(hottest.temperature);
    };

    Reading::Temperature(interpolate(rows[high], rows[high + 1], sample))
}

/// Configuration for a [`ThermistorDecoder`].
///
/// - `samples`: ADC reads per reading (`0` is treated as `1`)
/// - `oversampling`: how those reads are combined
/// - `table`: calibration table, in the scale `oversampling` produces
///
/// # Examples
///
/// ```
/// use adc_decoders::{CalibrationTable, Oversampling, ThermistorConfig};
///
/// let config = ThermistorConfig {
///     samples: 16,
///     oversampling: Oversampling::Sum, // matches the ×16 shipped table
///     table: CalibrationTable::default(),
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermistorConfig {
    pub samples: u8,
    pub oversampling: Oversampling,
    pub table: CalibrationTable,
}

impl Default for ThermistorConfig {
    fn default() -> Self {
        Self {
            samples: OVERSAMPLE_COUNT,
            oversampling: Oversampling::default(),
            table: CalibrationTable::default(),
        }
    }
}

type Error<Adc, ADC, Word, Pin> = <Adc as OneShot<ADC, Word, Pin>>::Error;

#[derive(Debug)]
pub struct ThermistorDecoder<Pin> {
    pin: Pin,
    config: ThermistorConfig,
}

impl<Pin> ThermistorDecoder<Pin> {
    pub fn new<ADC>(pin: Pin, config: ThermistorConfig) -> Self
    where
        Pin: Channel<ADC>,
    {
        Self { pin, config }
    }

    /// Destroys the decoder and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    pub fn config(&self) -> &ThermistorConfig {
        &self.config
    }

    pub fn table(&self) -> &CalibrationTable {
        &self.config.table
    }

    /// Draws `samples` reads from the thermistor channel and combines them
    /// according to `oversampling`.
    pub fn sample<Adc, ADC, Word>(
        &mut self,
        adc: &mut Adc,
    ) -> Result<u32, Error<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
    {
        let count = self.config.samples.max(1);
        let mut last = 0;
        let mut sum = 0u32;

        for _ in 0..count {
            last = nb::block!(adc.read(&mut self.pin))?.into();
            sum = sum.saturating_add(last);
        }

        let value = match self.config.oversampling {
            Oversampling::LastSample => last,
            Oversampling::Mean => sum / u32::from(count),
            Oversampling::Sum => sum,
        };

        #[cfg(feature = "defmt")]
        defmt::trace!("thermistor sample: {} ({} reads)", value, count);

        Ok(value)
    }

    /// Converts an already oversampled value using this decoder's table.
    pub fn decode(&self, sample: u32) -> Reading {
        let reading = lookup(&self.config.table, sample);

        #[cfg(feature = "defmt")]
        match reading {
            Reading::Overflow => defmt::warn!("thermistor overflow at {}", sample),
            Reading::Underflow => defmt::warn!("thermistor underflow at {}", sample),
            Reading::Temperature(_) => {}
        }

        reading
    }

    /// Samples the thermistor and looks the result up in the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use adc_decoders::{Oversampling, Reading, ThermistorConfig, ThermistorDecoder};
    /// # use embedded_hal_mock::adc::{Mock, MockChan1, Transaction};
    /// #
    /// # let expectations: [Transaction<u16>; 4] = [
    /// #     Transaction::read(1, 627),
    /// #     Transaction::read(1, 629),
    /// #     Transaction::read(1, 628),
    /// #     Transaction::read(1, 628),
    /// # ];
    /// # let mut adc = Mock::new(&expectations);
    /// # let pin = MockChan1 {};
    ///
    /// let config = ThermistorConfig {
    ///     samples: 4,
    ///     oversampling: Oversampling::Mean,
    ///     ..ThermistorConfig::default()
    /// };
    /// let mut decoder = ThermistorDecoder::new(pin, config);
    ///
    /// // A mean of 628 counts falls between the 265 and 260 rows
    /// assert_eq!(decoder.read(&mut adc), Ok(Reading::Temperature(262)));
    /// ```
    pub fn read<Adc, ADC, Word>(
        &mut self,
        adc: &mut Adc,
    ) -> Result<Reading, Error<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
    {
        let sample = self.sample(adc)?;
        Ok(self.decode(sample))
    }

    /// Like [`read`](ThermistorDecoder::read), but reports both faults as
    /// [`FAULT_SENTINEL`].
    pub fn read_legacy<Adc, ADC, Word>(
        &mut self,
        adc: &mut Adc,
    ) -> Result<i32, Error<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
    {
        self.read(adc).map(Reading::to_sentinel)
    }
}
