//! Player, finances, equipment and statistics

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::error::{GameError, GameResult};
use crate::skills::Career;

/// Round a money amount to cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, Display)]
pub enum Weather {
    #[default]
    Sunny,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
    Typhoon,
}

impl Weather {
    /// Multiplier on travel time
    pub fn travel_multiplier(self) -> f64 {
        match self {
            Self::Sunny => 1.0,
            Self::Rainy => 1.3,
            Self::Stormy => 1.6,
            Self::Snowy => 1.5,
            Self::Foggy => 1.4,
            Self::Typhoon => 2.0,
        }
    }

    /// Share of the base fee paid on top as a weather bonus
    pub fn fee_bonus_ratio(self) -> f64 {
        match self {
            Self::Sunny => 0.0,
            Self::Rainy => 0.3,
            Self::Stormy => 0.8,
            Self::Snowy => 0.6,
            Self::Foggy => 0.4,
            Self::Typhoon => 1.5,
        }
    }

    /// Food can get soaked
    pub fn is_wet(self) -> bool {
        matches!(self, Self::Rainy | Self::Stormy | Self::Typhoon)
    }

    /// Earns extra experience
    pub fn is_bad(self) -> bool {
        matches!(self, Self::Rainy | Self::Stormy)
    }

    fn frequency(self) -> u32 {
        match self {
            Self::Sunny => 50,
            Self::Rainy => 20,
            Self::Stormy => 8,
            Self::Snowy => 5,
            Self::Foggy => 12,
            Self::Typhoon => 5,
        }
    }

    /// Hourly weather change: 10% chance to roll a new weather
    pub fn reroll<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        if !rng.gen_bool(0.1) {
            return self;
        }
        let all: Vec<Self> = Self::iter().collect();
        match WeightedIndex::new(all.iter().map(|w| w.frequency())) {
            Ok(dist) => all[dist.sample(rng)],
            Err(_) => self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, Display)]
pub enum District {
    #[default]
    #[strum(to_string = "Ant Nest")]
    AntNest,
    #[strum(to_string = "Wutong Lane")]
    WutongLane,
    #[strum(to_string = "Startup Park")]
    StartupPark,
    #[strum(to_string = "Jade Bay")]
    JadeBay,
}

impl District {
    pub const ALL: [Self; 4] = [Self::AntNest, Self::WutongLane, Self::StartupPark, Self::JadeBay];

    pub fn description(self) -> &'static str {
        match self {
            Self::AntNest => "urban village",
            Self::WutongLane => "old town",
            Self::StartupPark => "new business district",
            Self::JadeBay => "upscale community",
        }
    }

    pub fn fee_multiplier(self) -> f64 {
        match self {
            Self::AntNest => 1.2,
            Self::WutongLane => 1.0,
            Self::StartupPark => 1.1,
            Self::JadeBay => 1.5,
        }
    }

    /// Base chance that a customer here tips
    pub fn tip_probability(self) -> f64 {
        match self {
            Self::AntNest => 0.1,
            Self::WutongLane => 0.3,
            Self::StartupPark => 0.2,
            Self::JadeBay => 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum CustomerType {
    #[strum(to_string = "Shy Programmer")]
    ProgrammerShy,
    #[strum(to_string = "Impatient Tycoon")]
    RichImpatient,
    #[strum(to_string = "Picky Auntie")]
    DifficultElderly,
    #[strum(to_string = "Regular")]
    Normal,
    #[strum(to_string = "VIP")]
    Vip,
}

impl CustomerType {
    pub const ALL: [Self; 5] = [
        Self::ProgrammerShy,
        Self::RichImpatient,
        Self::DifficultElderly,
        Self::Normal,
        Self::Vip,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum Skill {
    #[strum(to_string = "Direction Sense")]
    DirectionSense,
    #[strum(to_string = "Emotional Intelligence")]
    EmotionalIntelligence,
    #[strum(to_string = "Education")]
    EducationLevel,
    #[strum(to_string = "First Aid")]
    FirstAid,
    Communication,
    #[strum(to_string = "Traffic Safety")]
    TrafficSafety,
    #[strum(to_string = "Customer Service")]
    CustomerService,
    #[strum(to_string = "Financial Management")]
    FinancialManagement,
    #[strum(to_string = "Language")]
    LanguageSkills,
}

/// Player attributes and skills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAttributes {
    pub direction_sense: u32,
    pub emotional_intelligence: u32,
    pub education_level: u32,
    pub first_aid: u32,
    pub communication: u32,
    pub traffic_safety: u32,
    pub customer_service: u32,
    pub financial_management: u32,
    pub language_skills: u32,
    /// 0..=100
    pub stamina: u32,
    pub credit_score: i32,
    pub experience: u32,
    pub level: u32,
}

impl Default for PlayerAttributes {
    fn default() -> Self {
        Self {
            direction_sense: 1,
            emotional_intelligence: 1,
            education_level: 1,
            first_aid: 0,
            communication: 0,
            traffic_safety: 0,
            customer_service: 0,
            financial_management: 0,
            language_skills: 0,
            stamina: 100,
            credit_score: 100,
            experience: 0,
            level: 1,
        }
    }
}

impl PlayerAttributes {
    pub const MAX_STAMINA: u32 = 100;
    pub const EXPERIENCE_PER_LEVEL: u32 = 100;

    pub fn skill(&self, skill: Skill) -> u32 {
        match skill {
            Skill::DirectionSense => self.direction_sense,
            Skill::EmotionalIntelligence => self.emotional_intelligence,
            Skill::EducationLevel => self.education_level,
            Skill::FirstAid => self.first_aid,
            Skill::Communication => self.communication,
            Skill::TrafficSafety => self.traffic_safety,
            Skill::CustomerService => self.customer_service,
            Skill::FinancialManagement => self.financial_management,
            Skill::LanguageSkills => self.language_skills,
        }
    }

    fn skill_mut(&mut self, skill: Skill) -> &mut u32 {
        match skill {
            Skill::DirectionSense => &mut self.direction_sense,
            Skill::EmotionalIntelligence => &mut self.emotional_intelligence,
            Skill::EducationLevel => &mut self.education_level,
            Skill::FirstAid => &mut self.first_aid,
            Skill::Communication => &mut self.communication,
            Skill::TrafficSafety => &mut self.traffic_safety,
            Skill::CustomerService => &mut self.customer_service,
            Skill::FinancialManagement => &mut self.financial_management,
            Skill::LanguageSkills => &mut self.language_skills,
        }
    }

    pub fn add_skill(&mut self, skill: Skill, amount: u32) {
        *self.skill_mut(skill) += amount;
    }

    /// Check a minimum skill level
    pub fn require(&self, skill: Skill, required: u32) -> GameResult<()> {
        let current = self.skill(skill);
        if current < required {
            return Err(GameError::RequirementNotMet {
                skill,
                required,
                current,
            });
        }
        Ok(())
    }

    pub fn drain_stamina(&mut self, amount: u32) {
        self.stamina = self.stamina.saturating_sub(amount);
    }

    pub fn restore_stamina(&mut self, amount: u32) {
        self.stamina = (self.stamina + amount).min(Self::MAX_STAMINA);
    }

    /// Add experience, returning how many levels were gained
    pub fn gain_experience(&mut self, amount: u32) -> u32 {
        self.experience += amount;
        let gained = self.experience / Self::EXPERIENCE_PER_LEVEL;
        self.experience %= Self::EXPERIENCE_PER_LEVEL;
        self.level += gained;
        gained
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finances {
    pub delivery_coins: f64,
    pub credit_points: u32,
    pub debt: f64,
    pub savings: f64,
    pub medical_insurance: bool,
}

impl Default for Finances {
    fn default() -> Self {
        Self {
            delivery_coins: 100.0,
            credit_points: 100,
            debt: 50_000.0,
            savings: 0.0,
            medical_insurance: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum Uniform {
    #[default]
    Basic,
    Formal,
}

/// Scooter and gear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub battery_capacity: u32,
    pub battery_charge: u32,
    pub rain_cover: bool,
    pub cargo_rack_reinforced: bool,
    pub uniform: Uniform,
}

impl Default for Equipment {
    fn default() -> Self {
        Self {
            battery_capacity: 100,
            battery_charge: 100,
            rain_cover: false,
            cargo_rack_reinforced: false,
            uniform: Uniform::Basic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
pub enum Upgrade {
    #[strum(to_string = "Battery Expansion")]
    BatteryExpansion,
    #[strum(to_string = "Rain Cover")]
    RainCover,
    #[strum(to_string = "Reinforced Cargo Rack")]
    CargoRack,
    #[strum(to_string = "Formal Uniform")]
    FormalUniform,
}

impl Upgrade {
    pub fn price(self) -> f64 {
        match self {
            Self::BatteryExpansion => 300.0,
            Self::RainCover => 200.0,
            Self::CargoRack => 150.0,
            Self::FormalUniform => 500.0,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::BatteryExpansion => "+20% battery capacity",
            Self::RainCover => "Keeps food dry in the rain",
            Self::CargoRack => "Halves the chance of damaged food",
            Self::FormalUniform => "Welcome in upscale communities",
        }
    }

    pub fn is_owned(self, equipment: &Equipment) -> bool {
        match self {
            Self::BatteryExpansion => false,
            Self::RainCover => equipment.rain_cover,
            Self::CargoRack => equipment.cargo_rack_reinforced,
            Self::FormalUniform => equipment.uniform == Uniform::Formal,
        }
    }
}

/// Delivery counters for the statistics tab
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub total_orders: u32,
    pub successful_deliveries: u32,
    pub failed_deliveries: u32,
    pub complaints: u32,
    pub five_star_ratings: u32,
    pub total_earnings: f64,
    pub total_tips: f64,
    pub s_orders: u32,
    pub a_orders: u32,
    pub d_orders: u32,
    pub today_earnings: f64,
    pub today_tips: f64,
    /// Earnings per finished day, oldest first
    pub daily_earnings: Vec<f64>,
}

impl GameStats {
    const HISTORY_DAYS: usize = 30;

    /// Close the current day
    pub fn roll_day(&mut self) {
        self.daily_earnings.push(round_cents(self.today_earnings));
        if self.daily_earnings.len() > Self::HISTORY_DAYS {
            let excess = self.daily_earnings.len() - Self::HISTORY_DAYS;
            self.daily_earnings.drain(..excess);
        }
        self.today_earnings = 0.0;
        self.today_tips = 0.0;
    }

    pub fn success_rate(&self) -> f64 {
        f64::from(self.successful_deliveries) / f64::from(self.total_orders.max(1))
    }

    pub fn complaint_rate(&self) -> f64 {
        f64::from(self.complaints) / f64::from(self.total_orders.max(1))
    }
}

/// Everything about the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub player_name: String,
    pub weather: Weather,
    pub attributes: PlayerAttributes,
    pub finances: Finances,
    pub equipment: Equipment,
    pub stats: GameStats,
    /// 0..=100
    pub fatigue_level: u32,
    pub current_location: District,
    pub career: Option<Career>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new("Courier Wang")
    }
}

impl GameState {
    pub const REST_COST: f64 = 10.0;
    pub const REST_MINUTES: u32 = 60;
    pub const INSURANCE_COST: f64 = 500.0;

    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            weather: Weather::Sunny,
            attributes: PlayerAttributes::default(),
            finances: Finances::default(),
            equipment: Equipment::default(),
            stats: GameStats::default(),
            fatigue_level: 0,
            current_location: District::AntNest,
            career: None,
        }
    }

    pub fn coins(&self) -> f64 {
        self.finances.delivery_coins
    }

    /// Pay an amount from delivery coins
    pub fn spend(&mut self, amount: f64) -> GameResult<()> {
        if amount > self.finances.delivery_coins + 1e-9 {
            return Err(GameError::InsufficientFunds {
                needed: amount,
                available: self.finances.delivery_coins,
            });
        }
        self.finances.delivery_coins = round_cents(self.finances.delivery_coins - amount).max(0.0);
        Ok(())
    }

    /// Pay as much of an amount as the coins cover, returning what was paid
    pub fn spend_up_to(&mut self, amount: f64) -> f64 {
        let paid = round_cents(amount.max(0.0).min(self.finances.delivery_coins));
        self.finances.delivery_coins = round_cents(self.finances.delivery_coins - paid).max(0.0);
        paid
    }

    pub fn earn(&mut self, amount: f64) {
        self.finances.delivery_coins = round_cents(self.finances.delivery_coins + amount);
    }

    pub fn adjust_credit(&mut self, delta: i32) {
        self.attributes.credit_score += delta;
    }

    pub fn add_fatigue(&mut self, amount: u32) {
        self.fatigue_level = (self.fatigue_level + amount).min(100);
    }

    /// Rest for an hour: stamina +30, fatigue -20, battery recharged
    pub fn rest(&mut self) -> GameResult<()> {
        if self.attributes.stamina >= PlayerAttributes::MAX_STAMINA {
            return Err(GameError::StaminaFull);
        }
        self.spend(Self::REST_COST)?;
        self.attributes.restore_stamina(30);
        self.fatigue_level = self.fatigue_level.saturating_sub(20);
        self.equipment.battery_charge = self.equipment.battery_capacity;
        Ok(())
    }

    pub fn buy_insurance(&mut self) -> GameResult<()> {
        if self.finances.medical_insurance {
            return Err(GameError::AlreadyInsured);
        }
        self.spend(Self::INSURANCE_COST)?;
        self.finances.medical_insurance = true;
        tracing::info!("Medical insurance purchased");
        Ok(())
    }

    /// Pay down debt, returning the amount actually paid
    pub fn pay_debt(&mut self, amount: f64) -> GameResult<f64> {
        if !(amount > 0.0) {
            return Err(GameError::InvalidAmount);
        }
        if amount > self.finances.delivery_coins {
            return Err(GameError::InsufficientFunds {
                needed: amount,
                available: self.finances.delivery_coins,
            });
        }
        let paid = round_cents(amount.min(self.finances.debt));
        self.spend(paid)?;
        self.finances.debt = round_cents(self.finances.debt - paid);
        Ok(paid)
    }

    pub fn deposit(&mut self, amount: f64) -> GameResult<()> {
        if !(amount > 0.0) {
            return Err(GameError::InvalidAmount);
        }
        self.spend(amount)?;
        self.finances.savings = round_cents(self.finances.savings + amount);
        Ok(())
    }

    pub fn withdraw(&mut self, amount: f64) -> GameResult<()> {
        if !(amount > 0.0) {
            return Err(GameError::InvalidAmount);
        }
        if amount > self.finances.savings {
            return Err(GameError::InsufficientFunds {
                needed: amount,
                available: self.finances.savings,
            });
        }
        self.finances.savings = round_cents(self.finances.savings - amount);
        self.earn(amount);
        Ok(())
    }

    pub fn buy_upgrade(&mut self, upgrade: Upgrade) -> GameResult<()> {
        if upgrade.is_owned(&self.equipment) {
            return Err(GameError::UpgradeOwned(upgrade.to_string()));
        }
        self.spend(upgrade.price())?;
        let equipment = &mut self.equipment;
        match upgrade {
            Upgrade::BatteryExpansion => {
                equipment.battery_capacity += 20;
                equipment.battery_charge = equipment.battery_capacity;
            }
            Upgrade::RainCover => equipment.rain_cover = true,
            Upgrade::CargoRack => equipment.cargo_rack_reinforced = true,
            Upgrade::FormalUniform => equipment.uniform = Uniform::Formal,
        }
        tracing::info!("Bought upgrade: {}", upgrade);
        Ok(())
    }

    pub fn battery_percent(&self) -> u32 {
        self.equipment.battery_charge * 100 / self.equipment.battery_capacity.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_player_defaults() {
        let state = GameState::default();
        assert_eq!(state.coins(), 100.0);
        assert_eq!(state.finances.debt, 50_000.0);
        assert_eq!(state.attributes.stamina, 100);
        assert_eq!(state.attributes.level, 1);
        assert_eq!(state.attributes.skill(Skill::DirectionSense), 1);
        assert_eq!(state.attributes.skill(Skill::FirstAid), 0);
    }

    #[test]
    fn test_experience_carries_over_levels() {
        let mut attrs = PlayerAttributes::default();
        assert_eq!(attrs.gain_experience(80), 0);
        assert_eq!(attrs.gain_experience(150), 2);
        assert_eq!(attrs.level, 3);
        assert_eq!(attrs.experience, 30);
    }

    #[test]
    fn test_rest_rules() {
        let mut state = GameState::default();
        assert_eq!(state.rest(), Err(GameError::StaminaFull));

        state.attributes.stamina = 50;
        state.fatigue_level = 10;
        state.equipment.battery_charge = 20;
        state.rest().unwrap();
        assert_eq!(state.attributes.stamina, 80);
        assert_eq!(state.fatigue_level, 0);
        assert_eq!(state.equipment.battery_charge, 100);
        assert_eq!(state.coins(), 90.0);

        state.attributes.stamina = 90;
        state.finances.delivery_coins = 5.0;
        assert!(matches!(
            state.rest(),
            Err(GameError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_pay_debt_clamps_and_validates() {
        let mut state = GameState::default();
        assert_eq!(state.pay_debt(0.0), Err(GameError::InvalidAmount));
        assert_eq!(state.pay_debt(f64::NAN), Err(GameError::InvalidAmount));
        assert!(matches!(
            state.pay_debt(200.0),
            Err(GameError::InsufficientFunds { .. })
        ));

        assert_eq!(state.pay_debt(40.0), Ok(40.0));
        assert_eq!(state.finances.debt, 49_960.0);

        state.finances.debt = 25.0;
        assert_eq!(state.pay_debt(60.0), Ok(25.0));
        assert_eq!(state.finances.debt, 0.0);
        assert_eq!(state.coins(), 35.0);
    }

    #[test]
    fn test_insurance_and_upgrades() {
        let mut state = GameState::default();
        state.finances.delivery_coins = 2000.0;
        state.buy_insurance().unwrap();
        assert_eq!(state.buy_insurance(), Err(GameError::AlreadyInsured));

        state.buy_upgrade(Upgrade::RainCover).unwrap();
        assert!(state.equipment.rain_cover);
        assert!(matches!(
            state.buy_upgrade(Upgrade::RainCover),
            Err(GameError::UpgradeOwned(_))
        ));

        state.buy_upgrade(Upgrade::BatteryExpansion).unwrap();
        state.buy_upgrade(Upgrade::BatteryExpansion).unwrap();
        assert_eq!(state.equipment.battery_capacity, 140);
        assert_eq!(state.coins(), 700.0);
    }

    #[test]
    fn test_savings_round_trip() {
        let mut state = GameState::default();
        state.deposit(60.0).unwrap();
        assert_eq!(state.coins(), 40.0);
        assert!(state.withdraw(70.0).is_err());
        state.withdraw(60.0).unwrap();
        assert_eq!(state.finances.savings, 0.0);
        assert_eq!(state.coins(), 100.0);
    }

    #[test]
    fn test_daily_history_keeps_thirty_days() {
        let mut stats = GameStats::default();
        for day in 0..35 {
            stats.today_earnings = f64::from(day);
            stats.roll_day();
        }
        assert_eq!(stats.daily_earnings.len(), 30);
        assert_eq!(stats.daily_earnings[0], 5.0);
        assert_eq!(stats.today_earnings, 0.0);
    }

    #[test]
    fn test_weather_reroll_stays_mostly() {
        let mut rng = StdRng::seed_from_u64(7);
        let unchanged = (0..1000)
            .filter(|_| Weather::Sunny.reroll(&mut rng) == Weather::Sunny)
            .count();
        assert!(unchanged > 900);
    }
}
