/// Closed parametric range `[min, max]` along a ray or an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Contains nothing (min > max).
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// Contains every value.
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn length(&self) -> f32 {
        self.max - self.min
    }

    /// Inclusive membership test.
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Exclusive membership test.
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Grown to `width` total, keeping the midpoint. Already-wider and empty
    /// intervals are returned as is.
    pub fn padded_to(&self, width: f32) -> Interval {
        let missing = width - self.length();
        if missing <= 0.0 || !missing.is_finite() {
            return *self;
        }
        Interval::new(self.min - missing * 0.5, self.max + missing * 0.5)
    }

    /// Both ends moved by `offset`.
    pub fn shifted(&self, offset: f32) -> Interval {
        Interval::new(self.min + offset, self.max + offset)
    }

    /// Smallest interval containing both inputs.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }

    /// Same interval with its upper end replaced.
    pub fn with_max(&self, max: f32) -> Interval {
        Interval::new(self.min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_includes_endpoints_surrounds_does_not() {
        let range = Interval::new(-2.0, 3.0);

        for x in [-2.0, 0.0, 3.0] {
            assert!(range.contains(x), "{}", x);
        }
        assert!(!range.contains(3.01));
        assert!(!range.surrounds(-2.0));
        assert!(!range.surrounds(3.0));
        assert!(range.surrounds(2.99));
    }

    #[test]
    fn test_padded_to_keeps_midpoint() {
        let flat = Interval::new(5.0, 5.0).padded_to(0.5);
        assert_eq!(flat, Interval::new(4.75, 5.25));

        let wide = Interval::new(0.0, 2.0);
        assert_eq!(wide.padded_to(0.5), wide);
        assert_eq!(Interval::EMPTY.padded_to(0.5), Interval::EMPTY);
    }

    #[test]
    fn test_shifted() {
        assert_eq!(Interval::new(1.0, 4.0).shifted(-1.5), Interval::new(-0.5, 2.5));
    }

    #[test]
    fn test_surrounding_with_empty_is_identity() {
        let a = Interval::new(-1.0, 2.0);
        let b = Interval::new(0.5, 7.0);

        assert_eq!(Interval::surrounding(&a, &b), Interval::new(-1.0, 7.0));
        assert_eq!(Interval::surrounding(&Interval::EMPTY, &a), a);
        assert!(!Interval::EMPTY.contains(0.0));
        assert!(Interval::UNIVERSE.contains(-1e30));
    }

    #[test]
    fn test_with_max_narrows_search() {
        let search = Interval::new(0.001, f32::INFINITY).with_max(5.0);
        assert_eq!(search, Interval::new(0.001, 5.0));
        assert!(!search.contains(6.0));
    }
}
