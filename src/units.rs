use crate::time::Delta;

macro_rules! unit {
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
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::SubAssign,
            derive_more::Sum,
            derive_more::Display,
            derive_more::FromStr,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub const ZERO: $name = Self::new(0);
            pub const ONE: $name = Self::new(1);
            pub const MAX: $name = Self::new(u64::MAX);

            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn into_u64(self) -> u64 {
                self.0
            }

            pub const fn into_f64(self) -> f64 {
                self.0 as f64
            }

            pub const fn into_usize(self) -> usize {
                self.0 as usize
            }

            pub const fn saturating_sub(self, rhs: Self) -> Self {
                Self::new(self.0.saturating_sub(rhs.0))
            }
        }
    };
}

unit!(Bits);
unit!(Bytes);

impl Bytes {
    pub const fn into_bits(self) -> Bits {
        Bits::new(self.0 * 8)
    }
}

impl From<Bytes> for Bits {
    fn from(val: Bytes) -> Self {
        val.into_bits()
    }
}

unit!(Kbps);

impl Kbps {
    /// How long the link is busy serializing `size` bits, rounded up so the
    /// configured rate is never overstated.
    ///
    /// `Kbps` is decimal (1 kbps = 1000 bits/s), so bits / kbps gives
    /// milliseconds and the scale factor to microseconds is 1000. The
    /// intermediate product is widened to `u128`; terabit rates over
    /// hour-scale simulations stay well inside the result's `i64` range.
    pub fn transmission_delay(self, size: Bits) -> Delta {
        assert!(self != Kbps::ZERO);
        let bits = size.into_u64() as u128;
        let kbps = self.0 as u128;
        let micros = (bits * 1_000 + kbps - 1) / kbps;
        Delta::new(micros as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmission_delay_exact() {
        // 1000 bytes over 500 kbps is 16 ms on the nose.
        let rate = Kbps::new(500);
        let size = Bytes::new(1_000).into_bits();
        assert_eq!(rate.transmission_delay(size), Delta::new(16_000));
    }

    #[test]
    fn transmission_delay_rounds_up() {
        // 999 bits over 1 gbps is 0.999 us and must not round to zero.
        let rate = Kbps::new(1_000_000);
        assert_eq!(rate.transmission_delay(Bits::new(999)), Delta::new(1));

        // 1001 bits over 1 mbps is 1001 us exactly; no spurious bump.
        let rate = Kbps::new(1_000);
        assert_eq!(rate.transmission_delay(Bits::new(1_001)), Delta::new(1_001));
    }

    #[test]
    fn transmission_delay_terabit_hour() {
        // A terabit link clocking out an hour's worth of traffic must not
        // overflow the intermediate arithmetic.
        let rate = Kbps::new(1_000_000_000);
        let size = Bytes::new(450_000_000_000_000).into_bits();
        assert_eq!(rate.transmission_delay(size), Delta::new(3_600_000_000));
    }
}
