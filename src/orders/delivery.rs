//! Delivery simulation: random events, tips, ratings and experience

use rand::Rng;

use super::generator::{Order, OrderPriority};
use crate::core::state::{round_cents, GameState, Skill};

/// Something that happened on the road
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryEvent {
    FoodDamage { cost: f64 },
    Accident { medical_cost: f64 },
    BatteryDead { delay_minutes: u32 },
    EarlyArrival { bonus: f64 },
}

impl DeliveryEvent {
    pub fn description(&self) -> String {
        match self {
            Self::FoodDamage { cost } => format!("Food got soaked in the rain (-¥{cost:.2})"),
            Self::Accident { medical_cost } => {
                format!("Traffic accident, delivery failed (medical bill ¥{medical_cost:.2})")
            }
            Self::BatteryDead { delay_minutes } => {
                format!("Battery died, pushed the scooter (+{delay_minutes} min)")
            }
            Self::EarlyArrival { bonus } => format!("Arrived early (+¥{bonus:.2})"),
        }
    }
}

/// Result of one delivery, applied to the state by [`DeliveryOutcome::apply`]
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOutcome {
    pub success: bool,
    /// Total paid to the courier, tip included
    pub earnings: f64,
    pub tip: f64,
    pub complaint: bool,
    pub experience: u32,
    pub minutes: u32,
    pub late: bool,
    pub stamina_cost: u32,
    pub battery_used: u32,
    pub fatigue: u32,
    pub medical_cost: f64,
    pub events: Vec<DeliveryEvent>,
}

impl DeliveryOutcome {
    /// Apply money, ratings, experience and wear to the courier.
    /// Returns the number of levels gained.
    pub fn apply(&self, order: &Order, state: &mut GameState) -> u32 {
        state.attributes.drain_stamina(self.stamina_cost);
        state.add_fatigue(self.fatigue);
        state.equipment.battery_charge = state.equipment.battery_charge.saturating_sub(self.battery_used);

        if !self.success {
            // The trip ends where it started, at the restaurant
            state.current_location = order.pickup_district;
            state.stats.failed_deliveries += 1;
            state.spend_up_to(self.medical_cost);
            return 0;
        }

        state.earn(self.earnings);
        state.current_location = order.delivery_district;

        let stats = &mut state.stats;
        stats.successful_deliveries += 1;
        stats.total_earnings = round_cents(stats.total_earnings + self.earnings);
        stats.total_tips = round_cents(stats.total_tips + self.tip);
        stats.today_earnings = round_cents(stats.today_earnings + self.earnings);
        stats.today_tips = round_cents(stats.today_tips + self.tip);

        if self.complaint {
            stats.complaints += 1;
            state.adjust_credit(-5);
        } else {
            stats.five_star_ratings += 1;
            state.adjust_credit(1);
        }

        state.attributes.gain_experience(self.experience)
    }
}

/// Simulates the trip from restaurant to customer
#[derive(Debug, Clone, Default)]
pub struct DeliverySimulator;

impl DeliverySimulator {
    pub const ACCIDENT_MEDICAL_COST: f64 = 500.0;
    pub const INSURED_MEDICAL_COST: f64 = 50.0;
    /// Share of the battery capacity used per km
    pub const BATTERY_PER_KM: f64 = 0.02;

    pub fn new() -> Self {
        Self
    }

    pub fn simulate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        order: &Order,
        state: &GameState,
    ) -> DeliveryOutcome {
        let events = self.roll_events(rng, order, state);

        let mut outcome = DeliveryOutcome {
            success: true,
            earnings: 0.0,
            tip: 0.0,
            complaint: false,
            experience: 0,
            minutes: order.estimated_time,
            late: false,
            stamina_cost: 5 + order.distance_km.round() as u32,
            battery_used: Self::battery_used(order.distance_km, state.equipment.battery_capacity),
            fatigue: 0,
            medical_cost: 0.0,
            events: Vec::new(),
        };

        let mut total = order.total_fee();
        for event in &events {
            match event {
                DeliveryEvent::Accident { medical_cost } => {
                    outcome.success = false;
                    outcome.medical_cost = *medical_cost;
                }
                DeliveryEvent::FoodDamage { cost } => total -= cost,
                DeliveryEvent::BatteryDead { delay_minutes } => {
                    outcome.minutes += delay_minutes;
                    outcome.late = true;
                }
                DeliveryEvent::EarlyArrival { bonus } => total += bonus,
            }
        }
        outcome.fatigue = outcome.minutes / 3;
        outcome.events = events;

        if !outcome.success {
            tracing::debug!("Delivery {} failed", order.order_id);
            return outcome;
        }

        if rng.gen_bool(order.tip_probability.clamp(0.0, 1.0)) {
            outcome.tip = round_cents(rng.gen_range(2.0..20.0));
            total += outcome.tip;
        }

        let mut complaint_chance = order.complaint_probability;
        if state.attributes.emotional_intelligence > 5 {
            complaint_chance *= 0.8;
        }
        outcome.complaint = rng.gen_bool(complaint_chance.clamp(0.0, 1.0));

        outcome.earnings = round_cents(total.max(0.0));
        outcome.experience = Self::experience(order.priority, state);
        outcome
    }

    fn roll_events<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        order: &Order,
        state: &GameState,
    ) -> Vec<DeliveryEvent> {
        let mut events = Vec::new();
        let equipment = &state.equipment;

        if state.weather.is_wet() && !equipment.rain_cover {
            let chance = if equipment.cargo_rack_reinforced { 0.15 } else { 0.3 };
            if rng.gen_bool(chance) {
                events.push(DeliveryEvent::FoodDamage {
                    cost: round_cents(order.base_fee * 0.5),
                });
            }
        }

        let safety = f64::from(state.attributes.skill(Skill::TrafficSafety));
        let accident_chance = (0.05 - safety * 0.005).max(0.01);
        if rng.gen_bool(accident_chance) {
            let medical_cost = if state.finances.medical_insurance {
                Self::INSURED_MEDICAL_COST
            } else {
                Self::ACCIDENT_MEDICAL_COST
            };
            events.push(DeliveryEvent::Accident { medical_cost });
        }

        if state.battery_percent() < 50 && rng.gen_bool(0.1) {
            events.push(DeliveryEvent::BatteryDead { delay_minutes: 20 });
        }

        if state.attributes.direction_sense > 3 && rng.gen_bool(0.2) {
            events.push(DeliveryEvent::EarlyArrival { bonus: 3.0 });
        }

        events
    }

    pub fn battery_used(distance_km: f64, capacity: u32) -> u32 {
        (distance_km * Self::BATTERY_PER_KM * f64::from(capacity)).round() as u32
    }

    pub fn experience(priority: OrderPriority, state: &GameState) -> u32 {
        let mut exp = priority.base_experience();
        if state.weather.is_bad() {
            exp += 10;
        }
        exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{CustomerType, District, Upgrade, Weather};
    use crate::orders::generator::OrderStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn order(priority: OrderPriority) -> Order {
        Order {
            order_id: "ORDER_123456".to_string(),
            restaurant_name: "KFC".to_string(),
            customer_name: "Li Si".to_string(),
            pickup_district: District::AntNest,
            delivery_district: District::JadeBay,
            customer_type: CustomerType::Normal,
            priority,
            base_fee: 10.0,
            distance_km: 3.0,
            estimated_time: 15,
            special_requirements: Vec::new(),
            weather_bonus: 0.0,
            peak_hour_bonus: 2.0,
            status: OrderStatus::Accepted,
            complaint_probability: 0.0,
            tip_probability: 0.0,
        }
    }

    #[test]
    fn test_clean_delivery_pays_fee() {
        let mut rng = StdRng::seed_from_u64(11);
        let state = GameState::default();
        let simulator = DeliverySimulator::new();
        let order = order(OrderPriority::A);

        // Accidents are the only possible event for a new courier in the sun
        let outcome = (0..50)
            .map(|_| simulator.simulate(&mut rng, &order, &state))
            .find(|o| o.events.is_empty())
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.earnings, 12.0);
        assert_eq!(outcome.tip, 0.0);
        assert!(!outcome.complaint);
        assert_eq!(outcome.experience, 30);
        assert_eq!(outcome.minutes, 15);
        assert_eq!(outcome.stamina_cost, 8);
        assert_eq!(outcome.battery_used, 6);
        assert_eq!(outcome.fatigue, 5);
    }

    #[test]
    fn test_apply_success_updates_everything() {
        let mut state = GameState::default();
        let order = order(OrderPriority::S);
        let outcome = DeliveryOutcome {
            success: true,
            earnings: 20.0,
            tip: 5.0,
            complaint: false,
            experience: 120,
            minutes: 15,
            late: false,
            stamina_cost: 8,
            battery_used: 6,
            fatigue: 5,
            medical_cost: 0.0,
            events: Vec::new(),
        };
        let levels = outcome.apply(&order, &mut state);
        assert_eq!(levels, 1);
        assert_eq!(state.coins(), 120.0);
        assert_eq!(state.stats.successful_deliveries, 1);
        assert_eq!(state.stats.total_tips, 5.0);
        assert_eq!(state.stats.today_earnings, 20.0);
        assert_eq!(state.stats.five_star_ratings, 1);
        assert_eq!(state.attributes.credit_score, 101);
        assert_eq!(state.attributes.stamina, 92);
        assert_eq!(state.equipment.battery_charge, 94);
        assert_eq!(state.current_location, District::JadeBay);
    }

    #[test]
    fn test_apply_complaint_and_failure() {
        let mut state = GameState::default();
        let order = order(OrderPriority::A);
        let mut outcome = DeliverySimulator::new().simulate(
            &mut StdRng::seed_from_u64(0),
            &order,
            &state,
        );
        outcome.success = true;
        outcome.complaint = true;
        outcome.apply(&order, &mut state);
        assert_eq!(state.stats.complaints, 1);
        assert_eq!(state.attributes.credit_score, 95);

        outcome.success = false;
        outcome.medical_cost = 500.0;
        let coins = state.coins();
        outcome.apply(&order, &mut state);
        assert_eq!(state.stats.failed_deliveries, 1);
        assert_eq!(state.coins(), 0.0);
        assert!(coins < 500.0);
    }

    #[test]
    fn test_failed_delivery_moves_courier_to_pickup() {
        let mut state = GameState::default();
        state.current_location = District::StartupPark;
        let mut order = order(OrderPriority::A);
        order.pickup_district = District::WutongLane;
        let mut outcome = DeliverySimulator::new().simulate(
            &mut StdRng::seed_from_u64(0),
            &order,
            &state,
        );
        outcome.success = false;
        outcome.apply(&order, &mut state);
        assert_eq!(state.current_location, District::WutongLane);
    }

    #[test]
    fn test_battery_use_follows_capacity() {
        assert_eq!(DeliverySimulator::battery_used(3.0, 100), 6);
        assert_eq!(DeliverySimulator::battery_used(5.0, 120), 12);

        let mut state = GameState::default();
        state.finances.delivery_coins = 10_000.0;
        state.buy_upgrade(Upgrade::BatteryExpansion).unwrap();
        let capacity = state.equipment.battery_capacity;
        let order = order(OrderPriority::D);
        let outcome = DeliverySimulator::new().simulate(
            &mut StdRng::seed_from_u64(2),
            &order,
            &state,
        );
        assert_eq!(outcome.battery_used, DeliverySimulator::battery_used(3.0, capacity));

        let before = state.battery_percent();
        outcome.apply(&order, &mut state);
        // Six percent of the pack for three km, whatever its size
        assert_eq!(before - state.battery_percent(), 6);
    }

    #[test]
    fn test_rain_without_cover_damages_food_sometimes() {
        let mut rng = StdRng::seed_from_u64(5);
        let simulator = DeliverySimulator::new();
        let order = order(OrderPriority::D);
        let mut state = GameState::default();
        state.weather = Weather::Rainy;

        let damaged = |state: &GameState, rng: &mut StdRng| {
            (0..500)
                .filter(|_| {
                    simulator
                        .roll_events(rng, &order, state)
                        .iter()
                        .any(|e| matches!(e, DeliveryEvent::FoodDamage { .. }))
                })
                .count()
        };
        let bare = damaged(&state, &mut rng);
        assert!((100..200).contains(&bare));

        state.equipment.rain_cover = true;
        assert_eq!(damaged(&state, &mut rng), 0);
    }

    #[test]
    fn test_failed_delivery_earns_nothing() {
        let mut rng = StdRng::seed_from_u64(9);
        let simulator = DeliverySimulator::new();
        let order = order(OrderPriority::S);
        let mut state = GameState::default();
        state.finances.medical_insurance = true;

        let failed = (0..2000)
            .map(|_| simulator.simulate(&mut rng, &order, &state))
            .find(|o| !o.success)
            .unwrap();
        assert_eq!(failed.earnings, 0.0);
        assert_eq!(failed.experience, 0);
        assert_eq!(failed.medical_cost, DeliverySimulator::INSURED_MEDICAL_COST);
    }

    #[test]
    fn test_bad_weather_experience() {
        let mut state = GameState::default();
        state.weather = Weather::Stormy;
        assert_eq!(DeliverySimulator::experience(OrderPriority::D, &state), 25);
        state.weather = Weather::Typhoon;
        assert_eq!(DeliverySimulator::experience(OrderPriority::D, &state), 15);
    }
}
