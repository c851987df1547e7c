//! Sample value conversions between the card payload and the PWM compare registers.

/// Shift a signed 8-bit PCM byte into the unsigned duty range.
///
/// `-128..=127` (stored as two's complement) maps onto `0..=255`.
#[inline(always)]
pub const fn to_unsigned(raw: u8) -> u8 {
    raw.wrapping_add(128)
}

/// A PWM duty value in `1..=255`.
///
/// The timer output toggles on compare match, and a compare value of zero
/// stalls the reset/set output mode, so zero is lifted to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Duty(u8);

impl Duty {
    pub const MIN: Duty = Duty(1);

    #[inline(always)]
    pub const fn from_sample(sample: u8) -> Self {
        if sample == 0 { Self::MIN } else { Duty(sample) }
    }

    #[inline(always)]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for Duty {
    fn from(sample: u8) -> Self {
        Self::from_sample(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bias_is_a_bijection() {
        let mut seen = [false; 256];
        for raw in 0..=255u8 {
            let out = to_unsigned(raw);
            assert!(!seen[out as usize], "{raw} collides");
            seen[out as usize] = true;
        }
        assert!(seen.iter().all(|&hit| hit));
    }

    #[test]
    fn bias_centres_signed_range() {
        assert_eq!(to_unsigned(0), 128);
        assert_eq!(to_unsigned(i8::MIN as u8), 0);
        assert_eq!(to_unsigned(i8::MAX as u8), 255);
        assert_eq!(to_unsigned(-1i8 as u8), 127);
    }

    #[test]
    fn zero_duty_is_lifted() {
        assert_eq!(Duty::from_sample(0), Duty::MIN);
        assert_eq!(Duty::from_sample(0).get(), 1);
        for sample in 1..=255u8 {
            assert_eq!(Duty::from(sample).get(), sample);
        }
    }
}
