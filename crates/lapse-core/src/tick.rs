//! Tick primitives for wrapping hardware counters
//!
//! A tick counter increases monotonically and wraps back to zero once its
//! representable range is exceeded. All interval arithmetic is modular, so
//! the difference of two samples is correct as long as the true interval is
//! shorter than one full counter period.

use std::fmt;
use std::hash::Hash;

/// Unsigned counter value produced by a wrapping tick source.
///
/// The counter width is chosen by the host when it binds a concrete type;
/// nothing in lapse assumes a particular width.
pub trait Tick: Copy + Ord + Hash + Default + fmt::Debug + fmt::Display + Send + Sync + 'static {
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;
    /// Width of the counter in bits
    const BITS: u32;

    /// Modular addition
    fn wrapping_add(self, rhs: Self) -> Self;

    /// Modular subtraction, the interval between two samples
    fn wrapping_sub(self, rhs: Self) -> Self;

    /// Addition that reports overflow of the counter width
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// Truncate a wide value onto this counter width
    fn from_u128_wrapping(value: u128) -> Self;

    /// Widen to `u128` without loss
    fn into_u128(self) -> u128;

    /// Ticks elapsed from `earlier` to `self`, tolerating one wraparound
    #[inline]
    fn ticks_since(self, earlier: Self) -> Self {
        self.wrapping_sub(earlier)
    }
}

macro_rules! impl_tick {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Tick for $ty {
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const MAX: Self = <$ty>::MAX;
                const BITS: u32 = <$ty>::BITS;

                #[inline]
                fn wrapping_add(self, rhs: Self) -> Self {
                    <$ty>::wrapping_add(self, rhs)
                }

                #[inline]
                fn wrapping_sub(self, rhs: Self) -> Self {
                    <$ty>::wrapping_sub(self, rhs)
                }

                #[inline]
                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$ty>::checked_add(self, rhs)
                }

                #[inline]
                fn from_u128_wrapping(value: u128) -> Self {
                    value as $ty
                }

                #[inline]
                fn into_u128(self) -> u128 {
                    self as u128
                }
            }
        )*
    };
}

impl_tick!(u8, u16, u32, u64, u128, usize);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ticks_since_across_wrap() {
        let before: u8 = 250;
        let after: u8 = 4;
        assert_eq!(after.ticks_since(before), 10);

        let before: u32 = u32::MAX - 99;
        let after: u32 = 100;
        assert_eq!(after.ticks_since(before), 200);
    }

    #[test]
    fn test_truncation_wraps_onto_width() {
        assert_eq!(<u8 as Tick>::from_u128_wrapping(256 + 7), 7);
        assert_eq!(<u16 as Tick>::from_u128_wrapping(65_536), 0);
        assert_eq!(<u64 as Tick>::from_u128_wrapping(42), 42);
    }

    #[test]
    fn test_checked_add_reports_overflow() {
        assert_eq!(Tick::checked_add(200u8, 55), Some(255));
        assert_eq!(Tick::checked_add(200u8, 56), None);
    }

    #[test]
    fn test_width_constants() {
        assert_eq!(<u16 as Tick>::BITS, 16);
        assert_eq!(<u32 as Tick>::MAX, u32::MAX);
        assert_eq!(<u64 as Tick>::ZERO, 0);
    }

    proptest! {
        #[test]
        fn prop_interval_survives_wraparound(start in any::<u16>(), len in any::<u16>()) {
            let end = Tick::wrapping_add(start, len);
            prop_assert_eq!(end.ticks_since(start), len);
        }
    }
}
