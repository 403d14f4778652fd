use crate::{
    clock::Clock,
    config::{Config, ConfigError},
    window::{sample_for, RmsWindow, ZeroPointWindow},
};
use core::{fmt, marker::PhantomData};
use embedded_hal::adc::{Channel, OneShot};

/// Errors returned when measuring with a [`Zmpt101b`].
///
/// `ZeroPointOutOfRange`, `BelowNoiseFloor` and `BelowMinimumVoltage`
/// describe the signal rather than a fault in the driver. See
/// [`is_no_signal`](Error::is_no_signal).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Reading the ADC failed.
    Adc(E),
    /// A measurement was requested with 0 repetitions.
    NoRepetitions,
    /// A sampling window ended before the ADC could be read even once.
    NoSamples,
    /// The zero point is outside the configured window, which usually
    /// means the input is floating or disconnected.
    ZeroPointOutOfRange { zero_point: u32 },
    /// The largest deviation from the zero point is below the noise floor.
    BelowNoiseFloor { max_deviation: u32 },
    /// The averaged voltage is below the configured minimum.
    BelowMinimumVoltage { voltage: f32 },
}

impl<E> Error<E> {
    /// Returns `true` if the error means no usable mains signal was
    /// present, as opposed to a failure of the ADC or the call itself.
    pub fn is_no_signal(&self) -> bool {
        matches!(
            self,
            Error::ZeroPointOutOfRange { .. }
                | Error::BelowNoiseFloor { .. }
                | Error::BelowMinimumVoltage { .. }
        )
    }
}

impl<E> fmt::Display for Error<E>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Adc(error) => write!(f, "ADC read failed: {:?}", error),
            Error::NoRepetitions => f.write_str("at least one repetition is required"),
            Error::NoSamples => f.write_str("no samples were taken in the sampling window"),
            Error::ZeroPointOutOfRange { zero_point } => {
                write!(f, "zero point {} is out of range, input may be floating", zero_point)
            }
            Error::BelowNoiseFloor { max_deviation } => {
                write!(f, "peak deviation {} is below the noise floor", max_deviation)
            }
            Error::BelowMinimumVoltage { voltage } => {
                write!(f, "voltage {} V is below the minimum", voltage)
            }
        }
    }
}

type AdcError<Adc, ADC, Word, Pin> = <Adc as OneShot<ADC, Word, Pin>>::Error;

/// A ZMPT101B AC voltage sensor connected to an analog `Pin`.
///
/// Every measurement busy-waits on the ADC for whole AC periods, so the
/// ADC and clock are only borrowed for the duration of a call.
#[derive(Debug)]
pub struct Zmpt101b<Pin, Word> {
    pin: Pin,
    config: Config,
    period: u32,
    word: PhantomData<Word>,
}

impl<Pin, Word> Zmpt101b<Pin, Word> {
    /// Returns a sensor using the provided `config`, or an error if the
    /// configuration is invalid (eg. a mains frequency of 0 Hz).
    ///
    /// # Examples
    ///
    /// ```
    /// use zmpt101b::{Config, ConfigError, Zmpt101b};
    /// # use embedded_hal_mock::adc::MockChan0;
    /// #
    /// # let pin = MockChan0 {};
    ///
    /// let sensor = Zmpt101b::new(pin, Config::new(50, 500.0))?;
    /// # let sensor: Zmpt101b<MockChan0, u16> = sensor;
    ///
    /// // One 50 Hz period is 20 ms
    /// assert_eq!(sensor.period_micros(), 20_000);
    /// # Ok::<(), ConfigError>(())
    /// ```
    pub fn new<ADC>(pin: Pin, config: Config) -> Result<Self, ConfigError>
    where
        Pin: Channel<ADC>,
    {
        config.validate()?;

        Ok(Self {
            pin,
            config,
            period: config.period_micros(),
            word: PhantomData,
        })
    }

    /// Destroys the sensor and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    /// Returns the configuration the sensor was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the length of one sampling window in microseconds.
    pub fn period_micros(&self) -> u32 {
        self.period
    }

    /// Samples the ADC for one AC period and returns the mean reading,
    /// which is the sensor's current zero point.
    pub fn zero_point<Adc, ADC, C>(
        &mut self,
        adc: &mut Adc,
        clock: &mut C,
    ) -> Result<u32, Error<AdcError<Adc, ADC, Word, Pin>>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        C: Clock,
    {
        let period = self.period;
        let pin = &mut self.pin;
        let mut window = ZeroPointWindow::default();

        sample_for(clock, period, || {
            nb::block!(adc.read(pin)).map(|value| window.push(value.into()))
        })
        .map_err(Error::Adc)?;

        let zero_point = window.mean().ok_or(Error::NoSamples)?;
        trace!("zero point: {}", zero_point);

        Ok(zero_point)
    }

    /// Measures the RMS voltage of the mains, averaged over
    /// `repetitions` AC cycles.
    ///
    /// Each repetition samples for two AC periods: one to find the zero
    /// point and one to integrate the squared deviations from it. The
    /// first repetition that finds no usable signal fails the whole
    /// measurement, discarding the repetitions before it.
    ///
    /// # Examples
    ///
    /// ```
    /// use zmpt101b::{Config, Error, Zmpt101b};
    /// # use embedded_hal_mock::adc::{Mock, MockChan0, Transaction};
    /// #
    /// # let pin = MockChan0 {};
    /// # let mut adc = Mock::new(&[
    /// #     Transaction::read(0, 500u16),
    /// #     Transaction::read(0, 512),
    /// #     Transaction::read(0, 524),
    /// #     Transaction::read(0, 522),
    /// #     Transaction::read(0, 502),
    /// #     Transaction::read(0, 512),
    /// # ]);
    /// # let mut micros = 0u32;
    /// # let mut clock = || {
    /// #     micros += 5_000;
    /// #     micros
    /// # };
    ///
    /// let mut sensor = Zmpt101b::new(pin, Config::new(50, 500.0)).unwrap();
    /// # let _: &Zmpt101b<MockChan0, u16> = &sensor;
    ///
    /// let voltage = sensor.rms_voltage(&mut adc, &mut clock, 1).unwrap();
    /// assert!((voltage - 13.17).abs() < 0.01);
    /// # adc.done();
    ///
    /// // A disconnected input reads close to 0
    /// # let mut adc = Mock::new(&[
    /// #     Transaction::read(0, 3u16),
    /// #     Transaction::read(0, 3),
    /// #     Transaction::read(0, 3),
    /// # ]);
    /// assert_eq!(
    ///     sensor.rms_voltage(&mut adc, &mut clock, 1),
    ///     Err(Error::ZeroPointOutOfRange { zero_point: 3 })
    /// );
    /// # adc.done();
    /// ```
    pub fn rms_voltage<Adc, ADC, C>(
        &mut self,
        adc: &mut Adc,
        clock: &mut C,
        repetitions: u8,
    ) -> Result<f32, Error<AdcError<Adc, ADC, Word, Pin>>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        C: Clock,
    {
        if repetitions == 0 {
            return Err(Error::NoRepetitions);
        }

        let mut total = 0.0;
        for _ in 0..repetitions {
            total += self.cycle_voltage(adc, clock)?;
        }

        let voltage = (total / f64::from(repetitions)) as f32;
        if voltage < self.config.min_voltage {
            debug!("voltage {} V is below the minimum", voltage);
            return Err(Error::BelowMinimumVoltage { voltage });
        }

        debug!("RMS voltage: {} V", voltage);
        Ok(voltage)
    }

    /// Like [`rms_voltage`](Zmpt101b::rms_voltage), but returns `0.0`
    /// when no usable signal is present and treats 0 repetitions as 1.
    ///
    /// Errors for which [`Error::is_no_signal`] is `false` are still
    /// returned.
    pub fn rms_voltage_or_zero<Adc, ADC, C>(
        &mut self,
        adc: &mut Adc,
        clock: &mut C,
        repetitions: u8,
    ) -> Result<f32, Error<AdcError<Adc, ADC, Word, Pin>>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        C: Clock,
    {
        match self.rms_voltage(adc, clock, repetitions.max(1)) {
            Err(error) if error.is_no_signal() => Ok(0.0),
            result => result,
        }
    }

    fn cycle_voltage<Adc, ADC, C>(
        &mut self,
        adc: &mut Adc,
        clock: &mut C,
    ) -> Result<f64, Error<AdcError<Adc, ADC, Word, Pin>>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        C: Clock,
    {
        let zero_point = self.zero_point(adc, clock)?;

        let (low, high) = self.config.zero_point_window;
        if zero_point < low || zero_point > high {
            warn!("zero point {} is out of range, input may be floating", zero_point);
            return Err(Error::ZeroPointOutOfRange { zero_point });
        }

        let period = self.period;
        let pin = &mut self.pin;
        let mut window = RmsWindow::new(zero_point);

        sample_for(clock, period, || {
            nb::block!(adc.read(pin)).map(|value| window.push(value.into()))
        })
        .map_err(Error::Adc)?;

        let rms = window.rms().ok_or(Error::NoSamples)?;

        let max_deviation = window.max_deviation();
        if max_deviation < self.config.noise_floor {
            debug!("peak deviation {} is below the noise floor", max_deviation);
            return Err(Error::BelowNoiseFloor { max_deviation });
        }

        trace!("cycle RMS: {} (max deviation {})", rms, max_deviation);

        Ok(rms / f64::from(self.config.full_scale())
            * f64::from(self.config.reference_voltage)
            * f64::from(self.config.sensitivity))
    }
}
