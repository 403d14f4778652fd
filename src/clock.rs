/// A free-running microsecond counter.
///
/// The counter is expected to wrap around at `u32::MAX`; elapsed times
/// are always computed with wrapping subtraction.
///
/// Any `FnMut() -> u32` is a `Clock`, so a HAL timer can be passed as a
/// closure.
///
/// # Examples
///
/// ```
/// use zmpt101b::Clock;
///
/// let mut ticks = 0u32;
/// let mut clock = || {
///     ticks = ticks.wrapping_add(10);
///     ticks
/// };
///
/// assert_eq!(clock.now_micros(), 10);
/// assert_eq!(clock.now_micros(), 20);
/// ```
pub trait Clock {
    /// Returns the current value of the counter in microseconds.
    fn now_micros(&mut self) -> u32;
}

impl<F> Clock for F
where
    F: FnMut() -> u32,
{
    fn now_micros(&mut self) -> u32 {
        self()
    }
}

/// Microseconds elapsed between `start` and `now`, across a wraparound.
pub(crate) fn elapsed(start: u32, now: u32) -> u32 {
    now.wrapping_sub(start)
}
