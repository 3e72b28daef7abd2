//! Random order generation

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::traffic::Traffic;
use crate::core::state::{round_cents, CustomerType, District, Weather};

/// Order risk class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum OrderPriority {
    /// High pay, high risk
    S,
    /// Regular
    A,
    /// Safe
    D,
}

impl OrderPriority {
    pub fn base_rate(self) -> f64 {
        match self {
            Self::S => 15.0,
            Self::A => 8.0,
            Self::D => 5.0,
        }
    }

    pub fn base_complaint_probability(self) -> f64 {
        match self {
            Self::S => 0.7,
            Self::A => 0.4,
            Self::D => 0.05,
        }
    }

    pub fn base_experience(self) -> u32 {
        match self {
            Self::S => 50,
            Self::A => 30,
            Self::D => 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum OrderStatus {
    Available,
    Accepted,
    #[strum(to_string = "Picked Up")]
    PickedUp,
    Delivered,
    Failed,
    Cancelled,
}

/// A delivery order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub restaurant_name: String,
    pub customer_name: String,
    pub pickup_district: District,
    pub delivery_district: District,
    pub customer_type: CustomerType,
    pub priority: OrderPriority,
    pub base_fee: f64,
    pub distance_km: f64,
    /// Minutes
    pub estimated_time: u32,
    pub special_requirements: Vec<String>,
    pub weather_bonus: f64,
    pub peak_hour_bonus: f64,
    pub status: OrderStatus,
    pub complaint_probability: f64,
    pub tip_probability: f64,
}

impl Order {
    pub fn total_fee(&self) -> f64 {
        round_cents(self.base_fee + self.weather_bonus + self.peak_hour_bonus)
    }

    /// Last six characters of the id
    pub fn short_id(&self) -> &str {
        let len = self.order_id.len();
        &self.order_id[len.saturating_sub(6)..]
    }
}

const RESTAURANTS: &[&str] = &[
    "McDonald's",
    "KFC",
    "Shaxian Snacks",
    "Lanzhou Noodles",
    "Braised Chicken Rice",
    "Haidilao",
    "Xibei",
    "Grandma's Kitchen",
    "White Deer",
    "Green Tea",
];

const CUSTOMER_NAMES: &[&str] = &[
    "Zhang San",
    "Li Si",
    "Wang Wu",
    "Zhao Liu",
    "Qian Qi",
    "Sun Ba",
    "Zhou Jiu",
    "Wu Shi",
    "Zheng Yi",
    "Wang Er",
    "Feng Shan",
    "Chen Si",
    "Chu Wu",
    "Wei Liu",
];

const PEAK_BONUS_HOURS: [u32; 6] = [11, 12, 13, 18, 19, 20];

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

/// Builds random orders from the fee and risk tables
#[derive(Debug, Clone, Default)]
pub struct OrderGenerator;

impl OrderGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate one available order
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        weather: Weather,
        hour: u32,
        time_modifier: f64,
        traffic: &Traffic,
    ) -> Order {
        let order_id = format!("ORDER_{}", rng.gen_range(100_000..=999_999));
        let restaurant_name = pick(rng, RESTAURANTS).to_string();
        let customer_name = pick(rng, CUSTOMER_NAMES).to_string();
        let pickup_district = pick(rng, &District::ALL);
        let delivery_district = pick(rng, &District::ALL);
        let customer_type = pick(rng, &CustomerType::ALL);
        let priority = Self::roll_priority(rng, customer_type);

        let base_fee = Self::base_fee(pickup_district, delivery_district, priority);
        let distance_km = Self::distance(rng, pickup_district, delivery_district);
        let modifier = time_modifier * traffic.level(pickup_district).time_multiplier();
        let estimated_time = Self::estimated_time(distance_km, weather, modifier);

        let mut special_requirements: Vec<String> = Self::requirements(customer_type)
            .iter()
            .map(|s| s.to_string())
            .collect();
        if weather.is_wet() {
            special_requirements.push("Keep the food dry".to_string());
        }

        Order {
            order_id,
            restaurant_name,
            customer_name,
            pickup_district,
            delivery_district,
            customer_type,
            priority,
            base_fee,
            distance_km,
            estimated_time,
            special_requirements,
            weather_bonus: round_cents(base_fee * weather.fee_bonus_ratio()),
            peak_hour_bonus: Self::peak_bonus(hour, base_fee),
            status: OrderStatus::Available,
            complaint_probability: Self::complaint_probability(priority, customer_type),
            tip_probability: Self::tip_probability(delivery_district, customer_type),
        }
    }

    /// Weights for [S, A, D]
    fn priority_weights(customer: CustomerType) -> [f64; 3] {
        match customer {
            CustomerType::ProgrammerShy => [0.1, 0.3, 0.6],
            CustomerType::RichImpatient => [0.7, 0.25, 0.05],
            CustomerType::DifficultElderly => [0.4, 0.5, 0.1],
            CustomerType::Normal => [0.2, 0.6, 0.2],
            CustomerType::Vip => [0.5, 0.4, 0.1],
        }
    }

    fn roll_priority<R: Rng + ?Sized>(rng: &mut R, customer: CustomerType) -> OrderPriority {
        let [s, a, _] = Self::priority_weights(customer);
        let roll: f64 = rng.gen();
        if roll < s {
            OrderPriority::S
        } else if roll < s + a {
            OrderPriority::A
        } else {
            OrderPriority::D
        }
    }

    pub fn base_fee(pickup: District, delivery: District, priority: OrderPriority) -> f64 {
        let multiplier = (pickup.fee_multiplier() + delivery.fee_multiplier()) / 2.0;
        round_cents(priority.base_rate() * multiplier)
    }

    fn distance<R: Rng + ?Sized>(rng: &mut R, pickup: District, delivery: District) -> f64 {
        let km = if pickup == delivery {
            rng.gen_range(0.5..2.0)
        } else {
            rng.gen_range(2.0..8.0)
        };
        (km * 10.0_f64).round() / 10.0
    }

    /// Five minutes per km, scaled by weather and time of day
    pub fn estimated_time(distance_km: f64, weather: Weather, modifier: f64) -> u32 {
        ((distance_km * 5.0 * weather.travel_multiplier() * modifier) as u32).max(1)
    }

    pub fn peak_bonus(hour: u32, base_fee: f64) -> f64 {
        if PEAK_BONUS_HOURS.contains(&hour) {
            round_cents(base_fee * 0.2)
        } else {
            0.0
        }
    }

    fn requirements(customer: CustomerType) -> &'static [&'static str] {
        match customer {
            CustomerType::ProgrammerShy => &["Leave at the door", "No phone calls"],
            CustomerType::RichImpatient => &["Video check on arrival", "Invoice required"],
            CustomerType::DifficultElderly => &["Hand over in person", "Bring change"],
            CustomerType::Normal => &["Standard delivery"],
            CustomerType::Vip => &["Use the insulated bag", "Handle with care"],
        }
    }

    pub fn complaint_probability(priority: OrderPriority, customer: CustomerType) -> f64 {
        let multiplier = match customer {
            CustomerType::ProgrammerShy => 0.3,
            CustomerType::RichImpatient => 1.5,
            CustomerType::DifficultElderly => 1.2,
            CustomerType::Normal => 1.0,
            CustomerType::Vip => 0.8,
        };
        (priority.base_complaint_probability() * multiplier).min(0.9)
    }

    pub fn tip_probability(district: District, customer: CustomerType) -> f64 {
        let multiplier = match customer {
            CustomerType::ProgrammerShy => 1.2,
            CustomerType::RichImpatient => 0.8,
            CustomerType::DifficultElderly => 0.5,
            CustomerType::Normal => 1.0,
            CustomerType::Vip => 1.5,
        };
        (district.tip_probability() * multiplier).min(0.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fee_table() {
        assert_eq!(
            OrderGenerator::base_fee(District::JadeBay, District::JadeBay, OrderPriority::S),
            22.5
        );
        assert_eq!(
            OrderGenerator::base_fee(District::AntNest, District::WutongLane, OrderPriority::A),
            8.8
        );
        assert_eq!(OrderGenerator::peak_bonus(12, 8.8), 1.76);
        assert_eq!(OrderGenerator::peak_bonus(15, 8.8), 0.0);
    }

    #[test]
    fn test_probabilities_are_capped() {
        let complaint =
            OrderGenerator::complaint_probability(OrderPriority::S, CustomerType::RichImpatient);
        assert_eq!(complaint, 0.9);
        let tip = OrderGenerator::tip_probability(District::JadeBay, CustomerType::Vip);
        assert_eq!(tip, 0.8);
        let low = OrderGenerator::tip_probability(District::AntNest, CustomerType::DifficultElderly);
        assert!((low - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_estimated_time_scales_with_weather() {
        assert_eq!(OrderGenerator::estimated_time(4.0, Weather::Sunny, 1.0), 20);
        assert_eq!(OrderGenerator::estimated_time(4.0, Weather::Typhoon, 1.0), 40);
        assert_eq!(OrderGenerator::estimated_time(0.1, Weather::Sunny, 0.7), 1);
    }

    #[test]
    fn test_generated_orders_are_consistent() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = OrderGenerator::new();
        let traffic = Traffic::default();
        for _ in 0..200 {
            let order = generator.generate(&mut rng, Weather::Rainy, 12, 1.0, &traffic);
            assert_eq!(order.status, OrderStatus::Available);
            assert!(order.order_id.starts_with("ORDER_"));
            assert_eq!(order.short_id().len(), 6);
            if order.pickup_district == order.delivery_district {
                assert!((0.5..=2.0).contains(&order.distance_km));
            } else {
                assert!((2.0..=8.0).contains(&order.distance_km));
            }
            assert_eq!(order.weather_bonus, round_cents(order.base_fee * 0.3));
            assert!(order.peak_hour_bonus > 0.0);
            assert!(order
                .special_requirements
                .iter()
                .any(|r| r == "Keep the food dry"));
            assert!(order.complaint_probability <= 0.9);
            assert!(order.tip_probability <= 0.8);
        }
    }

    #[test]
    fn test_tycoons_mostly_place_s_orders() {
        let mut rng = StdRng::seed_from_u64(1);
        let s_count = (0..1000)
            .filter(|_| {
                OrderGenerator::roll_priority(&mut rng, CustomerType::RichImpatient)
                    == OrderPriority::S
            })
            .count();
        assert!((600..800).contains(&s_count));
    }
}
