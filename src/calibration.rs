//! Thermistor calibration tables.
//!
//! A table is an ordered list of `(raw, temperature)` rows. Raw values
//! rise strictly from the hottest row at index 0 to the coldest row at the
//! end, and the last [`COLD_END_RESERVED`] rows are never used as
//! interpolation targets.

use core::fmt;

/// Number of rows at the cold end of a table that the bracket search
/// never selects. Readings that reach them are reported as underflow.
pub const COLD_END_RESERVED: usize = 2;

/// Oversample count the shipped table was scaled by.
pub const OVERSAMPLE: u32 = 16;

/// One calibration point: an oversampled ADC value and the temperature it
/// corresponds to, in the table's native scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationEntry {
    pub raw: u32,
    pub temperature: i32,
}

impl CalibrationEntry {
    pub const fn new(raw: u32, temperature: i32) -> Self {
        Self { raw, temperature }
    }
}

/// Reasons a set of rows is rejected as a calibration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// Not enough rows to leave a bracket once the cold end is reserved.
    TooShort { len: usize },

    /// The row at `index` does not have a larger raw value than the row
    /// before it.
    NotAscending { index: usize },
}

impl TableError {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableError::TooShort { .. } => "Calibration table too short",
            TableError::NotAscending { .. } => "Calibration table not strictly ascending",
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::TooShort { len } => write!(f, "{} ({} rows)", self.as_str(), len),
            TableError::NotAscending { index } => write!(f, "{} at row {}", self.as_str(), index),
        }
    }
}

/// Checks that `rows` can be used as a calibration table.
///
/// Usable in const context, so compiled-in tables can be checked at build
/// time:
///
/// ```
/// use adc_decoders::{calibration::validate, CalibrationEntry};
///
/// const ROWS: [CalibrationEntry; 3] = [
///     CalibrationEntry::new(100, 50),
///     CalibrationEntry::new(200, 25),
///     CalibrationEntry::new(300, 0),
/// ];
///
/// const _: () = assert!(validate(&ROWS).is_ok());
/// ```
pub const fn validate(rows: &[CalibrationEntry]) -> Result<(), TableError> {
    if rows.len() <= COLD_END_RESERVED {
        return Err(TableError::TooShort { len: rows.len() });
    }

    let mut index = 1;
    while index < rows.len() {
        if rows[index].raw <= rows[index - 1].raw {
            return Err(TableError::NotAscending { index });
        }
        index += 1;
    }

    Ok(())
}

/// A validated, immutable calibration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationTable {
    rows: &'static [CalibrationEntry],
}

impl CalibrationTable {
    /// Returns a table over `rows`, or the first reason they are unusable.
    ///
    /// # Examples
    ///
    /// ```
    /// use adc_decoders::{CalibrationEntry, CalibrationTable, TableError};
    ///
    /// static OUT_OF_ORDER: [CalibrationEntry; 3] = [
    ///     CalibrationEntry::new(300, 50),
    ///     CalibrationEntry::new(200, 25),
    ///     CalibrationEntry::new(100, 0),
    /// ];
    ///
    /// assert_eq!(
    ///     CalibrationTable::new(&OUT_OF_ORDER),
    ///     Err(TableError::NotAscending { index: 1 })
    /// );
    /// ```
    pub fn new(rows: &'static [CalibrationEntry]) -> Result<Self, TableError> {
        match validate(rows) {
            Ok(()) => Ok(Self { rows }),
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::error!("rejected calibration table: {}", err);
                Err(err)
            }
        }
    }

    pub fn entries(&self) -> &'static [CalibrationEntry] {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row with the smallest raw value. Anything below it is overflow.
    pub fn hottest(&self) -> CalibrationEntry {
        self.rows[0]
    }

    /// The first reserved row. Anything at or above it is underflow.
    pub fn coldest_usable(&self) -> CalibrationEntry {
        self.rows[self.rows.len() - COLD_END_RESERVED]
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self {
            rows: &THERMISTOR_100K_4K7,
        }
    }
}

const _: () = assert!(validate(&THERMISTOR_100K_4K7).is_ok());

/// 100K thermistor with a 4.7 kΩ pull-up, 10-bit ADC values scaled by
/// [`OVERSAMPLE`]. Temperatures are in the table's native units, 300 at
/// the hot end down to 0. The rows follow the usual 100K hot-end curve in
/// whole °C, though some callers treat them as tenths of a degree. The
/// last row is the unplugged safety row.
pub const THERMISTOR_100K_4K7: [CalibrationEntry; 61] = [
    CalibrationEntry::new(23 * OVERSAMPLE, 300),
    CalibrationEntry::new(25 * OVERSAMPLE, 295),
    CalibrationEntry::new(27 * OVERSAMPLE, 290),
    CalibrationEntry::new(28 * OVERSAMPLE, 285),
    CalibrationEntry::new(31 * OVERSAMPLE, 280),
    CalibrationEntry::new(33 * OVERSAMPLE, 275),
    CalibrationEntry::new(35 * OVERSAMPLE, 270),
    CalibrationEntry::new(38 * OVERSAMPLE, 265),
    CalibrationEntry::new(41 * OVERSAMPLE, 260),
    CalibrationEntry::new(44 * OVERSAMPLE, 255),
    CalibrationEntry::new(48 * OVERSAMPLE, 250),
    CalibrationEntry::new(52 * OVERSAMPLE, 245),
    CalibrationEntry::new(56 * OVERSAMPLE, 240),
    CalibrationEntry::new(61 * OVERSAMPLE, 235),
    CalibrationEntry::new(66 * OVERSAMPLE, 230),
    CalibrationEntry::new(71 * OVERSAMPLE, 225),
    CalibrationEntry::new(78 * OVERSAMPLE, 220),
    CalibrationEntry::new(84 * OVERSAMPLE, 215),
    CalibrationEntry::new(92 * OVERSAMPLE, 210),
    CalibrationEntry::new(100 * OVERSAMPLE, 205),
    CalibrationEntry::new(109 * OVERSAMPLE, 200),
    CalibrationEntry::new(120 * OVERSAMPLE, 195),
    CalibrationEntry::new(131 * OVERSAMPLE, 190),
    CalibrationEntry::new(143 * OVERSAMPLE, 185),
    CalibrationEntry::new(156 * OVERSAMPLE, 180),
    CalibrationEntry::new(171 * OVERSAMPLE, 175),
    CalibrationEntry::new(187 * OVERSAMPLE, 170),
    CalibrationEntry::new(205 * OVERSAMPLE, 165),
    CalibrationEntry::new(224 * OVERSAMPLE, 160),
    CalibrationEntry::new(245 * OVERSAMPLE, 155),
    CalibrationEntry::new(268 * OVERSAMPLE, 150),
    CalibrationEntry::new(293 * OVERSAMPLE, 145),
    CalibrationEntry::new(320 * OVERSAMPLE, 140),
    CalibrationEntry::new(348 * OVERSAMPLE, 135),
    CalibrationEntry::new(379 * OVERSAMPLE, 130),
    CalibrationEntry::new(411 * OVERSAMPLE, 125),
    CalibrationEntry::new(445 * OVERSAMPLE, 120),
    CalibrationEntry::new(480 * OVERSAMPLE, 115),
    CalibrationEntry::new(516 * OVERSAMPLE, 110),
    CalibrationEntry::new(553 * OVERSAMPLE, 105),
    CalibrationEntry::new(591 * OVERSAMPLE, 100),
    CalibrationEntry::new(628 * OVERSAMPLE, 95),
    CalibrationEntry::new(665 * OVERSAMPLE, 90),
    CalibrationEntry::new(702 * OVERSAMPLE, 85),
    CalibrationEntry::new(737 * OVERSAMPLE, 80),
    CalibrationEntry::new(770 * OVERSAMPLE, 75),
    CalibrationEntry::new(801 * OVERSAMPLE, 70),
    CalibrationEntry::new(830 * OVERSAMPLE, 65),
    CalibrationEntry::new(857 * OVERSAMPLE, 60),
    CalibrationEntry::new(881 * OVERSAMPLE, 55),
    CalibrationEntry::new(903 * OVERSAMPLE, 50),
    CalibrationEntry::new(922 * OVERSAMPLE, 45),
    CalibrationEntry::new(939 * OVERSAMPLE, 40),
    CalibrationEntry::new(954 * OVERSAMPLE, 35),
    CalibrationEntry::new(966 * OVERSAMPLE, 30),
    CalibrationEntry::new(977 * OVERSAMPLE, 25),
    CalibrationEntry::new(985 * OVERSAMPLE, 20),
    CalibrationEntry::new(993 * OVERSAMPLE, 15),
    CalibrationEntry::new(999 * OVERSAMPLE, 10),
    CalibrationEntry::new(1004 * OVERSAMPLE, 5),
    CalibrationEntry::new(1008 * OVERSAMPLE, 0),
];
