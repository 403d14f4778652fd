use core::fmt;

/// Configuration for a [`Zmpt101b`](crate::Zmpt101b).
///
/// - `frequency`: The mains frequency (Hz)
/// - `sensitivity`: The calibration factor translating the ADC-scale RMS into volts, tuned per sensor
/// - `reference_voltage`: The voltage corresponding to the largest value possible for the ADC (V)
/// - `precision`: The precision of the ADC in bits (eg. for 10-bit precision, use `10`)
/// - `zero_point_window`: The inclusive range of raw values a plausible zero point must fall into
/// - `noise_floor`: The smallest peak deviation from the zero point (raw ADC units) treated as a signal
/// - `min_voltage`: Averaged readings below this voltage (V) are treated as noise
///
/// # Examples
///
/// ```
/// use zmpt101b::Config;
///
/// let config = Config {
///     reference_voltage: 5.0,        // 5 V
///     precision: 12,                 // 12 bits of precision
///     zero_point_window: (400, 3600),
///     ..Config::new(60, 350.0)       // 60 Hz mains
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub frequency: u16,
    pub sensitivity: f32,
    pub reference_voltage: f32,
    pub precision: u32,
    pub zero_point_window: (u32, u32),
    pub noise_floor: u32,
    pub min_voltage: f32,
}

impl Config {
    /// Returns a configuration for a 10-bit, 3.3 V ADC with the given
    /// mains `frequency` (Hz) and `sensitivity`.
    ///
    /// # Examples
    ///
    /// ```
    /// use zmpt101b::Config;
    ///
    /// let config = Config::new(50, 500.0);
    ///
    /// assert_eq!(config.zero_point_window, (100, 900));
    /// assert_eq!(config.full_scale(), 1023);
    /// ```
    pub const fn new(frequency: u16, sensitivity: f32) -> Self {
        Self {
            frequency,
            sensitivity,
            reference_voltage: 3.3,
            precision: 10,
            zero_point_window: (100, 900),
            noise_floor: 3,
            min_voltage: 0.1,
        }
    }

    /// Returns the length of one AC period in microseconds, or `0` for
    /// a frequency of `0`.
    pub fn period_micros(&self) -> u32 {
        match self.frequency {
            0 => 0,
            frequency => 1_000_000 / u32::from(frequency),
        }
    }

    /// Returns the largest value the ADC can report.
    pub fn full_scale(&self) -> u32 {
        match self.precision {
            0 => 0,
            precision => (1u32 << precision.min(16)) - 1,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.frequency == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if self.precision == 0 || self.precision > 16 {
            return Err(ConfigError::InvalidPrecision);
        }

        let (low, high) = self.zero_point_window;
        if low > high || high > self.full_scale() {
            return Err(ConfigError::InvalidZeroPointWindow);
        }

        let positive = |value: f32| value.is_finite() && value > 0.0;
        if !positive(self.sensitivity) || !positive(self.reference_voltage) {
            return Err(ConfigError::InvalidSensitivity);
        }

        Ok(())
    }
}

/// Reasons a [`Config`] is rejected by [`Zmpt101b::new`](crate::Zmpt101b::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The mains frequency is `0`.
    ZeroFrequency,
    /// The ADC precision is `0` or more than 16 bits.
    InvalidPrecision,
    /// The zero point window is reversed or exceeds the ADC's range.
    InvalidZeroPointWindow,
    /// The sensitivity or reference voltage is not a positive number.
    InvalidSensitivity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ConfigError::ZeroFrequency => "mains frequency must be greater than 0 Hz",
            ConfigError::InvalidPrecision => "ADC precision must be between 1 and 16 bits",
            ConfigError::InvalidZeroPointWindow => "zero point window is outside the ADC range",
            ConfigError::InvalidSensitivity => {
                "sensitivity and reference voltage must be positive"
            }
        };

        f.write_str(message)
    }
}
