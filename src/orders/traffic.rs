//! Live traffic per district

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::generator::Order;
use crate::core::state::District;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum TrafficLevel {
    #[default]
    Clear,
    Slow,
    Jammed,
}

impl TrafficLevel {
    pub fn time_multiplier(self) -> f64 {
        match self {
            Self::Clear => 1.0,
            Self::Slow => 1.2,
            Self::Jammed => 1.5,
        }
    }
}

/// Traffic conditions, rerolled every game hour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Traffic {
    levels: [TrafficLevel; 4],
}

impl Traffic {
    pub fn reroll<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        const LEVELS: [TrafficLevel; 3] =
            [TrafficLevel::Clear, TrafficLevel::Slow, TrafficLevel::Jammed];
        for level in &mut self.levels {
            *level = LEVELS[rng.gen_range(0..LEVELS.len())];
        }
    }

    pub fn level(&self, district: District) -> TrafficLevel {
        self.levels[Self::index(district)]
    }

    /// Traffic that slows an order, read where it is picked up
    pub fn at_pickup(&self, order: &Order) -> TrafficLevel {
        self.level(order.pickup_district)
    }

    fn index(district: District) -> usize {
        match district {
            District::AntNest => 0,
            District::WutongLane => 1,
            District::StartupPark => 2,
            District::JadeBay => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Weather;
    use crate::orders::generator::OrderGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_multipliers() {
        assert_eq!(TrafficLevel::Clear.time_multiplier(), 1.0);
        assert_eq!(TrafficLevel::Slow.time_multiplier(), 1.2);
        assert_eq!(TrafficLevel::Jammed.time_multiplier(), 1.5);
    }

    #[test]
    fn test_reroll_covers_every_level() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut traffic = Traffic::default();
        assert!(District::ALL
            .iter()
            .all(|&d| traffic.level(d) == TrafficLevel::Clear));

        let mut seen = [0usize; 3];
        for _ in 0..300 {
            traffic.reroll(&mut rng);
            for district in District::ALL {
                let slot = match traffic.level(district) {
                    TrafficLevel::Clear => 0,
                    TrafficLevel::Slow => 1,
                    TrafficLevel::Jammed => 2,
                };
                seen[slot] += 1;
            }
        }
        assert_eq!(seen.iter().sum::<usize>(), 1200);
        // Roughly uniform over the three levels
        assert!(seen.iter().all(|&n| (300..500).contains(&n)));
    }

    #[test]
    fn test_pickup_traffic_scales_estimate() {
        let generator = OrderGenerator::new();
        let clear = Traffic::default();
        let mut busy = Traffic::default();
        let mut rng = StdRng::seed_from_u64(8);
        while District::ALL.iter().all(|&d| busy.level(d) == TrafficLevel::Clear) {
            busy.reroll(&mut rng);
        }

        let mut slowed = 0;
        for seed in 0..100 {
            let base = generator.generate(&mut StdRng::seed_from_u64(seed), Weather::Sunny, 15, 1.0, &clear);
            let order = generator.generate(&mut StdRng::seed_from_u64(seed), Weather::Sunny, 15, 1.0, &busy);
            assert_eq!(order.order_id, base.order_id);
            assert_eq!(order.distance_km, base.distance_km);

            let level = busy.at_pickup(&order);
            assert_eq!(level, busy.level(order.pickup_district));
            assert_eq!(
                order.estimated_time,
                OrderGenerator::estimated_time(order.distance_km, Weather::Sunny, level.time_multiplier())
            );
            assert!(order.estimated_time >= base.estimated_time);
            if level != TrafficLevel::Clear && order.estimated_time > base.estimated_time {
                slowed += 1;
            }
        }
        assert!(slowed > 0);
    }
}
