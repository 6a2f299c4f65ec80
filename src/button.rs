//! Keypad on a single analog resistor ladder.
//!
//! Each button pulls the ladder to a distinct voltage. A sample is matched
//! against one window per button, in [`Button::PRIORITY`] order, and the
//! first window containing it wins.

use embedded_hal::adc::{Channel, OneShot};

/// Identity of the button currently held, or `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    #[default]
    None,
    Right,
    Up,
    Down,
    Left,
    Select,
}

impl Button {
    /// Order in which windows are tested. Overlapping windows resolve to
    /// the earliest button in this list.
    pub const PRIORITY: [Button; 5] = [
        Button::Right,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Select,
    ];

    pub fn is_pressed(self) -> bool {
        self != Button::None
    }
}

/// A symmetric band of raw values that classifies as `button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonWindow {
    pub button: Button,
    pub center: u16,
    pub hysteresis: u16,
}

impl ButtonWindow {
    pub const fn new(button: Button, center: u16, hysteresis: u16) -> Self {
        Self {
            button,
            center,
            hysteresis,
        }
    }

    /// Whether `raw` lies in `center - hysteresis ..= center + hysteresis`.
    pub fn contains(&self, raw: u16) -> bool {
        let low = self.center.saturating_sub(self.hysteresis);
        let high = self.center.saturating_add(self.hysteresis);

        (low..=high).contains(&raw)
    }
}

/// Configuration for a [`ButtonDecoder`].
///
/// `windows` is tested front to back; entry `i` belongs to
/// `Button::PRIORITY[i]`.
///
/// # Examples
///
/// ```
/// use adc_decoders::KeypadConfig;
///
/// // Right, Up, Down, Left, Select, each ±12 counts
/// let config = KeypadConfig::new([20, 150, 330, 510, 740], 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeypadConfig {
    pub windows: [ButtonWindow; 5],
}

impl KeypadConfig {
    /// Ladder values measured on the filament dryer's shield.
    pub const MEASURED: Self = Self::new([815, 930, 903, 856, 612], 10);

    /// Ladder values from the Freetronics LCD & Keypad Shield datasheet.
    pub const FREETRONICS: Self = Self::new([0, 145, 329, 505, 741], 10);

    /// Builds windows from centers given in [`Button::PRIORITY`] order, all
    /// sharing one hysteresis.
    pub const fn new(centers: [u16; 5], hysteresis: u16) -> Self {
        let p = Button::PRIORITY;
        Self {
            windows: [
                ButtonWindow::new(p[0], centers[0], hysteresis),
                ButtonWindow::new(p[1], centers[1], hysteresis),
                ButtonWindow::new(p[2], centers[2], hysteresis),
                ButtonWindow::new(p[3], centers[3], hysteresis),
                ButtonWindow::new(p[4], centers[4], hysteresis),
            ],
        }
    }

    /// Returns the first window containing `raw`, or `Button::None`.
    pub fn classify(&self, raw: u16) -> Button {
        self.windows
            .iter()
            .find(|window| window.contains(raw))
            .map_or(Button::None, |window| window.button)
    }
}

impl Default for KeypadConfig {
    fn default() -> Self {
        Self::MEASURED
    }
}

/// Result of one decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub button: Button,
    pub just_pressed: bool,
    pub just_released: bool,
}

/// Everything a decode needs to remember between samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonDecoderState {
    pub previous: Button,
    pub just_pressed: bool,
    pub just_released: bool,
}

impl ButtonDecoderState {
    /// Classifies `raw` and derives edge flags against `self.previous`.
    ///
    /// A press is `None` to any button and a release is any button to
    /// `None`. Other transitions, including one button straight to
    /// another, leave both flags as they were. Flags are never cleared
    /// here; that is up to the receiver.
    pub fn decode(self, config: &KeypadConfig, raw: u16) -> (Self, ButtonEvent) {
        let button = config.classify(raw);
        let mut next = self;

        if !self.previous.is_pressed() && button.is_pressed() {
            next.just_pressed = true;
            next.just_released = false;
            #[cfg(feature = "defmt")]
            defmt::debug!("button pressed: {} (raw {})", button, raw);
        }
        if self.previous.is_pressed() && !button.is_pressed() {
            next.just_pressed = false;
            next.just_released = true;
            #[cfg(feature = "defmt")]
            defmt::debug!("button released: {}", self.previous);
        }

        next.previous = button;

        let event = ButtonEvent {
            button,
            just_pressed: next.just_pressed,
            just_released: next.just_released,
        };

        (next, event)
    }
}

/// Decodes keypad samples and tracks press/release edges.
///
/// # Examples
///
/// ```
/// use adc_decoders::{Button, ButtonDecoder, KeypadConfig};
///
/// let mut decoder = ButtonDecoder::new(KeypadConfig::MEASURED);
///
/// let event = decoder.decode(818);
/// assert_eq!(event.button, Button::Right);
/// assert!(event.just_pressed);
///
/// assert!(decoder.take_just_pressed());
/// assert!(!decoder.take_just_pressed());
/// ```
#[derive(Debug, Clone)]
pub struct ButtonDecoder {
    config: KeypadConfig,
    state: ButtonDecoderState,
}

impl ButtonDecoder {
    pub fn new(config: KeypadConfig) -> Self {
        Self {
            config,
            state: ButtonDecoderState::default(),
        }
    }

    /// Classifies `raw` and updates the edge flags.
    pub fn decode(&mut self, raw: u16) -> ButtonEvent {
        let (state, event) = self.state.decode(&self.config, raw);
        self.state = state;
        event
    }

    /// Classifies `raw` without touching any state.
    pub fn classify(&self, raw: u16) -> Button {
        self.config.classify(raw)
    }

    pub fn config(&self) -> &KeypadConfig {
        &self.config
    }

    pub fn state(&self) -> ButtonDecoderState {
        self.state
    }

    /// The button seen by the last decode.
    pub fn current(&self) -> Button {
        self.state.previous
    }

    /// Returns the press flag and clears it.
    pub fn take_just_pressed(&mut self) -> bool {
        core::mem::take(&mut self.state.just_pressed)
    }

    /// Returns the release flag and clears it.
    pub fn take_just_released(&mut self) -> bool {
        core::mem::take(&mut self.state.just_released)
    }

    pub fn clear_events(&mut self) {
        self.state.just_pressed = false;
        self.state.just_released = false;
    }

    /// Forgets the previous button and both flags.
    pub fn reset(&mut self) {
        self.state = ButtonDecoderState::default();
    }
}

impl Default for ButtonDecoder {
    fn default() -> Self {
        Self::new(KeypadConfig::default())
    }
}

/// A [`ButtonDecoder`] bound to the ADC channel the ladder is wired to.
#[derive(Debug)]
pub struct Keypad<Pin> {
    pin: Pin,
    decoder: ButtonDecoder,
}

impl<Pin> Keypad<Pin> {
    pub fn new<ADC>(pin: Pin, config: KeypadConfig) -> Self
    where
        Pin: Channel<ADC>,
    {
        Self {
            pin,
            decoder: ButtonDecoder::new(config),
        }
    }

    /// Destroys the keypad and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    pub fn decoder(&self) -> &ButtonDecoder {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut ButtonDecoder {
        &mut self.decoder
    }

    /// Takes one sample from the ladder and decodes it.
    ///
    /// # Examples
    ///
    /// ```
    /// use adc_decoders::{Button, Keypad, KeypadConfig};
    /// # use embedded_hal_mock::adc::{Mock, MockChan0, Transaction};
    /// #
    /// # let expectations: [Transaction<u16>; 2] =
    /// #     [Transaction::read(0, 930), Transaction::read(0, 0)];
    /// # let mut adc = Mock::new(&expectations);
    /// # let pin = MockChan0 {};
    ///
    /// let mut keypad = Keypad::new(pin, KeypadConfig::MEASURED);
    ///
    /// let event = keypad.read(&mut adc).unwrap();
    /// assert_eq!(event.button, Button::Up);
    ///
    /// let event = keypad.read(&mut adc).unwrap();
    /// assert!(event.just_released);
    /// ```
    ///
    /// Words wider than 16 bits saturate at `u16::MAX`, which lies outside
    /// every window of a 10 or 12-bit ladder.
    pub fn read<Adc, ADC, Word>(
        &mut self,
        adc: &mut Adc,
    ) -> Result<ButtonEvent, <Adc as OneShot<ADC, Word, Pin>>::Error>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
    {
        let raw: u32 = nb::block!(adc.read(&mut self.pin))?.into();
        let raw = u16::try_from(raw).unwrap_or(u16::MAX);
        Ok(self.decoder.decode(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::{
        adc::{Mock, MockChan0, Transaction},
        common::Generic,
        MockError,
    };
    use std::io::ErrorKind;

    fn decoder() -> ButtonDecoder {
        ButtonDecoder::new(KeypadConfig::MEASURED)
    }

    fn keypad() -> Keypad<MockChan0> {
        let pin = MockChan0 {};
        Keypad::new(pin, KeypadConfig::MEASURED)
    }

    fn adc(expectations: &[Transaction<u16>]) -> Generic<Transaction<u16>> {
        Mock::new(expectations)
    }

    #[test]
    fn classifies_inside_windows() {
        let decoder = decoder();
        for (center, button) in [
            (815, Button::Right),
            (930, Button::Up),
            (903, Button::Down),
            (856, Button::Left),
            (612, Button::Select),
        ] {
            for raw in center - 10..=center + 10 {
                assert_eq!(decoder.classify(raw), button, "raw {}", raw);
            }
        }
    }

    #[test]
    fn classifies_outside_windows_as_none() {
        let decoder = decoder();
        for raw in [0, 601, 623, 700, 804, 826, 845, 867, 892, 941, 1023, u16::MAX] {
            assert_eq!(decoder.classify(raw), Button::None, "raw {}", raw);
        }
    }

    #[test]
    fn first_window_wins_on_overlap() {
        // Up and Down share 910..=915
        let config = KeypadConfig::new([100, 905, 920, 400, 600], 10);
        let decoder = ButtonDecoder::new(config);

        assert_eq!(decoder.classify(912), Button::Up);
        assert_eq!(decoder.classify(916), Button::Down);
        assert_eq!(decoder.classify(894), Button::None);
    }

    #[test]
    fn window_at_zero_does_not_wrap() {
        let decoder = ButtonDecoder::new(KeypadConfig::FREETRONICS);

        assert_eq!(decoder.classify(0), Button::Right);
        assert_eq!(decoder.classify(10), Button::Right);
        assert_eq!(decoder.classify(11), Button::None);
        assert_eq!(decoder.classify(u16::MAX), Button::None);
    }

    #[test]
    fn press_then_release() {
        let mut decoder = decoder();

        let idle = decoder.decode(0);
        assert_eq!(idle.button, Button::None);
        assert!(!idle.just_pressed && !idle.just_released);

        let press = decoder.decode(815);
        assert_eq!(press.button, Button::Right);
        assert!(press.just_pressed);
        assert!(!press.just_released);

        let release = decoder.decode(0);
        assert_eq!(release.button, Button::None);
        assert!(!release.just_pressed);
        assert!(release.just_released);
    }

    #[test]
    fn held_button_keeps_flags() {
        let mut decoder = decoder();

        decoder.decode(815);
        decoder.clear_events();

        let held = decoder.decode(816);
        assert_eq!(held.button, Button::Right);
        assert!(!held.just_pressed);

        decoder.decode(0);
        let idle = decoder.decode(0);
        assert!(idle.just_released, "release flag is kept until cleared");
    }

    #[test]
    fn button_to_button_is_not_an_edge() {
        let mut decoder = decoder();

        decoder.decode(815);
        decoder.clear_events();

        let up = decoder.decode(930);
        assert_eq!(up.button, Button::Up);
        assert!(!up.just_pressed);
        assert!(!up.just_released);
        assert_eq!(decoder.current(), Button::Up);
    }

    #[test]
    fn button_to_button_keeps_press_flag() {
        let mut decoder = decoder();

        let right = decoder.decode(815);
        assert!(right.just_pressed);

        let up = decoder.decode(930);
        assert_eq!(up.button, Button::Up);
        assert!(up.just_pressed);
        assert!(!up.just_released);
        assert!(decoder.state().just_pressed);

        let release = decoder.decode(0);
        assert!(!release.just_pressed);
        assert!(release.just_released);
    }

    #[test]
    fn pure_state_decode() {
        let config = KeypadConfig::MEASURED;
        let state = ButtonDecoderState::default();

        let (state, event) = state.decode(&config, 612);
        assert_eq!(event.button, Button::Select);
        assert_eq!(
            state,
            ButtonDecoderState {
                previous: Button::Select,
                just_pressed: true,
                just_released: false,
            }
        );

        let (state, event) = state.decode(&config, 500);
        assert!(event.just_released);
        assert_eq!(state.previous, Button::None);
    }

    #[test]
    fn take_clears_flags() {
        let mut decoder = decoder();

        decoder.decode(856);
        assert!(decoder.take_just_pressed());
        assert!(!decoder.state().just_pressed);

        decoder.decode(0);
        assert!(decoder.take_just_released());
        assert!(!decoder.take_just_released());
    }

    #[test]
    fn reset() {
        let mut decoder = decoder();

        decoder.decode(903);
        decoder.reset();

        assert_eq!(decoder.state(), ButtonDecoderState::default());
        assert!(decoder.decode(903).just_pressed);
    }

    #[test]
    fn reads_from_adc() {
        let mut keypad = keypad();
        let expectations = [
            Transaction::read(0, 903),
            Transaction::read(0, 905),
            Transaction::read(0, 1023),
        ];
        let mut adc = adc(&expectations);

        let event = keypad.read(&mut adc).unwrap();
        assert_eq!(event.button, Button::Down);
        assert!(event.just_pressed);

        let event = keypad.read(&mut adc).unwrap();
        assert_eq!(event.button, Button::Down);

        let event = keypad.read(&mut adc).unwrap();
        assert_eq!(event.button, Button::None);
        assert!(event.just_released);

        adc.done();
    }

    #[test]
    fn reads_from_8_bit_adc() {
        // Freetronics ladder at 8-bit resolution
        let config = KeypadConfig::new([0, 36, 82, 126, 185], 3);
        let mut keypad = Keypad::new(MockChan0 {}, config);
        let expectations = [Transaction::read(0, 84u8), Transaction::read(0, 255u8)];
        let mut adc: Generic<Transaction<u8>> = Mock::new(&expectations);

        let event = keypad.read(&mut adc).unwrap();
        assert_eq!(event.button, Button::Down);
        assert!(event.just_pressed);

        let event = keypad.read(&mut adc).unwrap();
        assert_eq!(event.button, Button::None);
        assert!(event.just_released);

        adc.done();
    }

    #[test]
    fn wide_words_saturate() {
        let config = KeypadConfig::new([100, 200, 300, 400, u16::MAX - 5], 10);
        let mut keypad = Keypad::new(MockChan0 {}, config);
        let expectations = [
            Transaction::read(0, 300u32),
            Transaction::read(0, 70_000u32),
        ];
        let mut adc: Generic<Transaction<u32>> = Mock::new(&expectations);

        assert_eq!(keypad.read(&mut adc).unwrap().button, Button::Down);
        assert_eq!(keypad.read(&mut adc).unwrap().button, Button::Select);

        adc.done();
    }

    #[test]
    fn error() {
        let mut keypad = keypad();
        let mut adc =
            adc(&[Transaction::read(0, 0).with_error(MockError::Io(ErrorKind::InvalidData))]);

        assert!(keypad.read(&mut adc).is_err());
        assert_eq!(keypad.decoder().current(), Button::None);
    }
}
