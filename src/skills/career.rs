//! Leaving delivery work for another career

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::school::Difficulty;
use crate::core::error::{GameError, GameResult};
use crate::core::state::{round_cents, GameState, Skill};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CareerIncome {
    Monthly(f64),
    MonthlyRange(f64, f64),
    Hourly { rate: f64, hours_per_day: u32 },
}

impl CareerIncome {
    pub fn describe(self) -> String {
        match self {
            Self::Monthly(amount) => format!("¥{amount:.0} a month"),
            Self::MonthlyRange(low, high) => format!("¥{low:.0}-{high:.0} a month"),
            Self::Hourly {
                rate,
                hours_per_day,
            } => format!("¥{rate:.0} an hour, {hours_per_day} hours a day"),
        }
    }

    /// Pay for one day of work
    pub fn daily<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        let amount = match self {
            Self::Monthly(amount) => amount / 30.0,
            Self::MonthlyRange(low, high) => rng.gen_range(low..=high) / 30.0,
            Self::Hourly {
                rate,
                hours_per_day,
            } => rate * f64::from(hours_per_day),
        };
        round_cents(amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum Career {
    #[strum(to_string = "Civil Servant")]
    CivilServant,
    #[strum(to_string = "Business Manager")]
    BusinessManager,
    #[strum(to_string = "Service Supervisor")]
    ServiceSupervisor,
    Trainer,
}

impl Career {
    pub fn requirements(self) -> &'static [(Skill, u32)] {
        match self {
            Self::CivilServant => &[(Skill::EducationLevel, 5), (Skill::Communication, 3)],
            Self::BusinessManager => &[(Skill::EducationLevel, 4), (Skill::FinancialManagement, 3)],
            Self::ServiceSupervisor => &[(Skill::CustomerService, 4), (Skill::EmotionalIntelligence, 3)],
            Self::Trainer => &[(Skill::Communication, 4), (Skill::EducationLevel, 3)],
        }
    }

    pub fn difficulty(self) -> Difficulty {
        match self {
            Self::CivilServant => Difficulty::Hard,
            Self::BusinessManager | Self::Trainer => Difficulty::Medium,
            Self::ServiceSupervisor => Difficulty::Easy,
        }
    }

    pub fn income(self) -> CareerIncome {
        match self {
            Self::CivilServant => CareerIncome::Monthly(8000.0),
            Self::BusinessManager => CareerIncome::MonthlyRange(6000.0, 15000.0),
            Self::ServiceSupervisor => CareerIncome::Monthly(5000.0),
            Self::Trainer => CareerIncome::Hourly {
                rate: 200.0,
                hours_per_day: 4,
            },
        }
    }

    pub fn perk(self) -> &'static str {
        match self {
            Self::CivilServant => "High social status",
            Self::BusinessManager => "High growth potential",
            Self::ServiceSupervisor => "Good work environment",
            Self::Trainer => "Flexible schedule",
        }
    }

    /// First unmet requirement, if any
    pub fn check_eligibility(self, state: &GameState) -> GameResult<()> {
        self.requirements()
            .iter()
            .try_for_each(|&(skill, level)| state.attributes.require(skill, level))
    }

    pub fn success_rate(self, state: &GameState) -> f64 {
        let skills: u32 = self
            .requirements()
            .iter()
            .map(|&(skill, _)| state.attributes.skill(skill))
            .sum();
        (self.difficulty().base_rate() + 0.05 * f64::from(skills)).min(0.9)
    }

    /// Try to switch careers. Returns whether the application succeeded.
    pub fn attempt<R: Rng + ?Sized>(self, rng: &mut R, state: &mut GameState) -> GameResult<bool> {
        if state.career == Some(self) {
            return Err(GameError::AlreadyInCareer(self.to_string()));
        }
        self.check_eligibility(state)?;
        let success = rng.gen_bool(self.success_rate(state));
        if success {
            state.career = Some(self);
            tracing::info!("Career changed to {}", self);
        }
        Ok(success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn supervisor_ready() -> GameState {
        let mut state = GameState::default();
        state.attributes.customer_service = 4;
        state.attributes.emotional_intelligence = 3;
        state
    }

    #[test]
    fn test_eligibility_reports_first_gap() {
        let state = GameState::default();
        assert_eq!(
            Career::CivilServant.check_eligibility(&state),
            Err(GameError::RequirementNotMet {
                skill: Skill::EducationLevel,
                required: 5,
                current: 1
            })
        );
        assert!(Career::ServiceSupervisor
            .check_eligibility(&supervisor_ready())
            .is_ok());
    }

    #[test]
    fn test_success_rate_is_capped() {
        let state = supervisor_ready();
        // 0.8 + 0.05 * 7
        assert_eq!(Career::ServiceSupervisor.success_rate(&state), 0.9);
        let mut trainer = GameState::default();
        trainer.attributes.communication = 4;
        trainer.attributes.education_level = 3;
        assert_eq!(Career::Trainer.success_rate(&trainer), 0.9);
        trainer.attributes.communication = 5;
        trainer.attributes.education_level = 0;
        // 0.6 + 0.05 * 5
        assert!((Career::Trainer.success_rate(&trainer) - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_attempt_sets_career() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = supervisor_ready();
        while !Career::ServiceSupervisor.attempt(&mut rng, &mut state).unwrap() {}
        assert_eq!(state.career, Some(Career::ServiceSupervisor));
        assert_eq!(
            Career::ServiceSupervisor.attempt(&mut rng, &mut state),
            Err(GameError::AlreadyInCareer("Service Supervisor".to_string()))
        );
    }

    #[test]
    fn test_daily_income() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(Career::CivilServant.income().daily(&mut rng), 266.67);
        assert_eq!(Career::Trainer.income().daily(&mut rng), 800.0);
        let manager = Career::BusinessManager.income().daily(&mut rng);
        assert!((200.0..=500.0).contains(&manager));
    }
}
