use std::ops::{Add, AddAssign, Sub, SubAssign};

macro_rules! time_unit {
    ($name: ident) => {
        #[derive(
            Debug,
            Default,
            Copy,
            Clone,
            PartialOrd,
            Ord,
            PartialEq,
            Eq,
            Hash,
            derive_more::Display,
            derive_more::FromStr,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(i64);

        impl $name {
            pub const ZERO: $name = Self::new(0);
            pub const MIN: $name = Self::new(i64::MIN);
            pub const MAX: $name = Self::new(i64::MAX);

            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn into_i64(self) -> i64 {
                self.0
            }

            pub const fn into_f64(self) -> f64 {
                self.0 as f64
            }

            pub const fn from_millis(value: i64) -> Self {
                Self(value * 1_000)
            }
        }
    };
}

/// An absolute point in simulated time, in microseconds since the caller's
/// (arbitrary) epoch.
time_unit!(Timestamp);

/// A span of simulated time, in microseconds.
time_unit!(Delta);

impl Add<Delta> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Delta) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub<Delta> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Delta) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Delta;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        Delta::new(self.0 - rhs.0)
    }
}

impl AddAssign<Delta> for Timestamp {
    fn add_assign(&mut self, rhs: Delta) {
        *self = Self(self.0 + rhs.0)
    }
}

impl SubAssign<Delta> for Timestamp {
    fn sub_assign(&mut self, rhs: Delta) {
        *self = Self(self.0 - rhs.0)
    }
}

impl Add<Delta> for Delta {
    type Output = Delta;

    fn add(self, rhs: Delta) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_delta_arithmetic() {
        let t = Timestamp::from_millis(16);
        assert_eq!(t, Timestamp::new(16_000));
        assert_eq!(t + Delta::new(500), Timestamp::new(16_500));
        assert_eq!(t - Timestamp::new(1_000), Delta::new(15_000));
    }

    #[test]
    fn timestamp_max() {
        let a = Timestamp::new(5);
        let b = Timestamp::new(-3);
        assert_eq!(a.max(b), a);
        assert_eq!(Timestamp::MIN.max(b), b);
    }
}
