use rand::Rng;

pub const FULL_LEVEL: f64 = 100.0;
pub const RECHARGE_FLOOR: f64 = 20.0;
pub const DRAIN_MIN: f64 = 0.5;
pub const DRAIN_MAX: f64 = 1.0;

/// Simulated battery driving the detector tier selection.
///
/// The level starts full, drains by a random amount each cycle and snaps
/// back to full once it would fall under the recharge floor. Depletion is
/// per-cycle only and does not depend on which tier actually ran.
#[derive(Debug)]
pub struct Battery<R: Rng> {
    level: f64,
    rng: R,
}

impl<R: Rng> Battery<R> {
    pub fn new(rng: R) -> Self {
        Self {
            level: FULL_LEVEL,
            rng,
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Drains the battery by one cycle's worth and returns the new level.
    pub fn tick(&mut self) -> f64 {
        let amount = self.rng.random_range(DRAIN_MIN..=DRAIN_MAX);
        self.drain(amount)
    }

    fn drain(&mut self, amount: f64) -> f64 {
        self.level -= amount;
        if self.level < RECHARGE_FLOOR {
            // Instant recharge, not a ramp.
            self.level = FULL_LEVEL;
        }
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_level_starts_full() {
        let battery = Battery::new(StdRng::seed_from_u64(0));
        assert_eq!(battery.level(), FULL_LEVEL);
    }

    #[test]
    fn test_level_stays_in_bounds() {
        let mut battery = Battery::new(StdRng::seed_from_u64(42));
        for _ in 0..10_000 {
            let level = battery.tick();
            assert!((0.0..=FULL_LEVEL).contains(&level), "level out of bounds: {level}");
            assert_eq!(level, battery.level());
        }
    }

    #[test]
    fn test_drain_amount_is_bounded() {
        let mut battery = Battery::new(StdRng::seed_from_u64(7));
        let mut previous = battery.level();
        for _ in 0..10_000 {
            let level = battery.tick();
            if level < previous {
                let drained = previous - level;
                assert!(
                    drained >= DRAIN_MIN - 1e-9 && drained <= DRAIN_MAX + 1e-9,
                    "drain out of range: {drained}"
                );
            } else {
                // The only way the level can rise is a recharge to full,
                // which needs the previous level within one drain of the floor.
                assert_eq!(level, FULL_LEVEL);
                assert!(previous < RECHARGE_FLOOR + DRAIN_MAX);
            }
            previous = level;
        }
    }

    #[test]
    fn test_recharges_to_full_below_floor() {
        let mut battery = Battery::new(StdRng::seed_from_u64(0));
        battery.level = RECHARGE_FLOOR + 0.1;
        assert_eq!(battery.drain(0.2), FULL_LEVEL);
    }

    #[test]
    fn test_no_recharge_at_exactly_the_floor() {
        let mut battery = Battery::new(StdRng::seed_from_u64(0));
        battery.level = RECHARGE_FLOOR + 0.5;
        // 20.0 is not strictly below the floor, so no recharge.
        assert_eq!(battery.drain(0.5), RECHARGE_FLOOR);
    }

    #[test]
    fn test_fixed_drain_recharge_period() {
        let mut battery = Battery::new(StdRng::seed_from_u64(0));
        // With a constant 0.5 drain the level is 100 - 0.5 * n until tick
        // 161, where 19.5 < 20 triggers the recharge.
        for n in 1..=160 {
            assert_eq!(battery.drain(0.5), FULL_LEVEL - 0.5 * n as f64);
        }
        assert_eq!(battery.drain(0.5), FULL_LEVEL);
        // The pattern repeats from full.
        for n in 1..=160 {
            assert_eq!(battery.drain(0.5), FULL_LEVEL - 0.5 * n as f64);
        }
        assert_eq!(battery.drain(0.5), FULL_LEVEL);
    }
}
