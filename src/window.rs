use crate::clock::{elapsed, Clock};

/// Calls `sample` until `period` microseconds have passed since the
/// first reading of `clock`, returning the number of samples taken.
///
/// Stops at the first error returned by `sample`.
pub fn sample_for<C, E, F>(clock: &mut C, period: u32, mut sample: F) -> Result<u32, E>
where
    C: Clock,
    F: FnMut() -> Result<(), E>,
{
    let start = clock.now_micros();
    let mut count = 0;

    while elapsed(start, clock.now_micros()) < period {
        sample()?;
        count += 1;
    }

    Ok(count)
}

/// Running mean of raw readings.
#[derive(Debug, Default)]
pub struct ZeroPointWindow {
    sum: u64,
    count: u32,
}

impl ZeroPointWindow {
    pub fn push(&mut self, value: u32) {
        self.sum += u64::from(value);
        self.count += 1;
    }

    /// Integer mean of the readings, or `None` if there were none.
    pub fn mean(&self) -> Option<u32> {
        let mean = self.sum.checked_div(u64::from(self.count))?;
        // The mean of u32 readings always fits in a u32.
        Some(mean as u32)
    }
}

/// Sum of squared deviations from a zero point.
#[derive(Debug)]
pub struct RmsWindow {
    zero_point: i32,
    sum_of_squares: u64,
    count: u32,
    max_deviation: u32,
}

impl RmsWindow {
    pub fn new(zero_point: u32) -> Self {
        Self {
            zero_point: zero_point as i32,
            sum_of_squares: 0,
            count: 0,
            max_deviation: 0,
        }
    }

    pub fn push(&mut self, value: u32) {
        let deviation = (value as i32 - self.zero_point).unsigned_abs();

        self.sum_of_squares += u64::from(deviation) * u64::from(deviation);
        self.count += 1;
        self.max_deviation = self.max_deviation.max(deviation);
    }

    /// The largest absolute deviation seen so far.
    pub fn max_deviation(&self) -> u32 {
        self.max_deviation
    }

    /// Root mean square of the deviations in raw ADC units, or `None`
    /// if there were no readings.
    pub fn rms(&self) -> Option<f64> {
        match self.count {
            0 => None,
            count => Some(libm::sqrt(self.sum_of_squares as f64 / f64::from(count))),
        }
    }
}
