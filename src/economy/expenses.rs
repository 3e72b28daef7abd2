//! Living costs: the daily spend and the monthly bill

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, GameResult};
use crate::core::state::{round_cents, GameState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpense {
    pub rent: f64,
    pub food: f64,
    pub utilities: f64,
    pub phone: f64,
    pub transportation: f64,
    pub medical: f64,
    pub entertainment: f64,
    pub debt_payment: f64,
}

impl Default for MonthlyExpense {
    fn default() -> Self {
        Self {
            rent: 2000.0,
            food: 800.0,
            utilities: 200.0,
            phone: 100.0,
            transportation: 300.0,
            medical: 0.0,
            entertainment: 200.0,
            debt_payment: 1000.0,
        }
    }
}

impl MonthlyExpense {
    pub fn total(&self) -> f64 {
        round_cents(
            self.rent
                + self.food
                + self.utilities
                + self.phone
                + self.transportation
                + self.medical
                + self.entertainment
                + self.debt_payment,
        )
    }
}

/// How a monthly bill went
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPayment {
    pub total: f64,
    pub paid: bool,
    /// Credit lost for missing the bill, zero on a retry in the same cycle
    pub credit_penalty: i32,
    /// Old and new rent when the landlord raised it
    pub rent_increase: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseManager {
    pub monthly: MonthlyExpense,
    last_payment_day: u32,
    /// Last payment day of a cycle whose bill was already billed and missed
    #[serde(default)]
    overdue_cycle: Option<u32>,
}

impl Default for ExpenseManager {
    fn default() -> Self {
        Self {
            monthly: MonthlyExpense::default(),
            last_payment_day: 1,
            overdue_cycle: None,
        }
    }
}

impl ExpenseManager {
    pub const BILLING_DAYS: u32 = 30;
    pub const INSURED_MEDICAL: f64 = 150.0;
    pub const LATE_CREDIT_PENALTY: i32 = 20;

    pub fn days_until_due(&self, day: u32) -> u32 {
        (self.last_payment_day + Self::BILLING_DAYS).saturating_sub(day)
    }

    pub fn is_due(&self, day: u32) -> bool {
        self.days_until_due(day) == 0
    }

    /// Food, transport and sundries for one day
    pub fn daily_cost<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        round_cents(rng.gen_range(20.0..50.0) + rng.gen_range(10.0..30.0) + rng.gen_range(5.0..20.0))
    }

    /// Charge a day's living cost. Returns false when the coins ran out.
    pub fn charge_daily(state: &mut GameState, cost: f64) -> bool {
        if state.spend(cost).is_ok() {
            return true;
        }
        state.finances.delivery_coins = 0.0;
        state.adjust_credit(-2);
        tracing::warn!("Could not cover daily costs of ¥{:.2}", cost);
        false
    }

    pub fn pay_monthly<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        state: &mut GameState,
        day: u32,
    ) -> GameResult<MonthlyPayment> {
        let days_left = self.days_until_due(day);
        if days_left > 0 {
            return Err(GameError::NotDueYet { days_left });
        }

        self.monthly.medical = if state.finances.medical_insurance {
            Self::INSURED_MEDICAL
        } else {
            0.0
        };

        // Rent and the late penalty apply once per cycle, retries only try to pay
        let retry = self.overdue_cycle == Some(self.last_payment_day);
        let mut rent_increase = None;
        if !retry && rng.gen_bool(0.1) {
            let old = self.monthly.rent;
            self.monthly.rent = round_cents(old * (1.0 + rng.gen_range(0.05..0.15)));
            rent_increase = Some((old, self.monthly.rent));
            tracing::info!("Rent raised from ¥{:.2} to ¥{:.2}", old, self.monthly.rent);
        }

        let total = self.monthly.total();
        let paid = state.spend(total).is_ok();
        let mut credit_penalty = 0;
        if paid {
            self.last_payment_day = day;
            self.overdue_cycle = None;
            state.finances.debt = round_cents((state.finances.debt - self.monthly.debt_payment).max(0.0));
            tracing::info!("Monthly bill of ¥{:.2} paid", total);
        } else {
            if !retry {
                credit_penalty = Self::LATE_CREDIT_PENALTY;
                state.adjust_credit(-credit_penalty);
                self.overdue_cycle = Some(self.last_payment_day);
            }
            tracing::warn!("Monthly bill of ¥{:.2} could not be paid", total);
        }

        Ok(MonthlyPayment {
            total,
            paid,
            credit_penalty,
            rent_increase,
        })
    }

    /// Monthly bill lines with the total last
    pub fn breakdown(&self) -> Vec<(&'static str, f64)> {
        let m = &self.monthly;
        vec![
            ("Rent", m.rent),
            ("Food", m.food),
            ("Utilities", m.utilities),
            ("Phone", m.phone),
            ("Transport", m.transportation),
            ("Medical", m.medical),
            ("Entertainment", m.entertainment),
            ("Debt payment", m.debt_payment),
            ("Total", m.total()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_daily_cost_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let cost = ExpenseManager::daily_cost(&mut rng);
            assert!((35.0..=100.0).contains(&cost));
        }
    }

    #[test]
    fn test_unpaid_daily_cost_costs_credit() {
        let mut state = GameState::default();
        assert!(ExpenseManager::charge_daily(&mut state, 40.0));
        assert_eq!(state.coins(), 60.0);
        assert!(!ExpenseManager::charge_daily(&mut state, 80.0));
        assert_eq!(state.coins(), 0.0);
        assert_eq!(state.attributes.credit_score, 98);
    }

    #[test]
    fn test_monthly_not_due() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut expenses = ExpenseManager::default();
        let mut state = GameState::default();
        assert_eq!(
            expenses.pay_monthly(&mut rng, &mut state, 11),
            Err(GameError::NotDueYet { days_left: 20 })
        );
        assert!(!expenses.is_due(30));
        assert!(expenses.is_due(31));
    }

    #[test]
    fn test_monthly_payment_reduces_debt() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut expenses = ExpenseManager::default();
        let mut state = GameState::default();
        state.finances.delivery_coins = 10_000.0;
        state.finances.medical_insurance = true;

        let payment = expenses.pay_monthly(&mut rng, &mut state, 31).unwrap();
        assert!(payment.paid);
        assert_eq!(expenses.monthly.medical, 150.0);
        assert_eq!(state.coins(), round_cents(10_000.0 - payment.total));
        assert_eq!(state.finances.debt, 49_000.0);
        if let Some((old, new)) = payment.rent_increase {
            assert!(new > old);
        } else {
            assert_eq!(payment.total, 4750.0);
        }
        assert_eq!(expenses.days_until_due(31), 30);
    }

    #[test]
    fn test_rent_increase_still_pays() {
        let mut expenses = ExpenseManager::default();
        let mut state = GameState::default();
        state.finances.delivery_coins = 100_000.0;
        let mut seed = 0;
        let payment = loop {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut trial = expenses.clone();
            let mut trial_state = state.clone();
            let payment = trial.pay_monthly(&mut rng, &mut trial_state, 31).unwrap();
            if payment.rent_increase.is_some() {
                expenses = trial;
                state = trial_state;
                break payment;
            }
            seed += 1;
        };
        assert!(payment.paid);
        assert!(expenses.monthly.rent > 2000.0);
        assert_eq!(state.coins(), round_cents(100_000.0 - payment.total));
    }

    #[test]
    fn test_unaffordable_bill() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut expenses = ExpenseManager::default();
        let mut state = GameState::default();
        let payment = expenses.pay_monthly(&mut rng, &mut state, 40).unwrap();
        assert!(!payment.paid);
        assert_eq!(payment.credit_penalty, 20);
        assert_eq!(state.attributes.credit_score, 80);
        assert_eq!(state.coins(), 100.0);
        assert!(expenses.is_due(41));
    }

    #[test]
    fn test_missed_bill_penalized_once_per_cycle() {
        let mut expenses = ExpenseManager::default();
        let mut state = GameState::default();
        let first = expenses
            .pay_monthly(&mut StdRng::seed_from_u64(4), &mut state, 31)
            .unwrap();
        let rent = expenses.monthly.rent;

        for (seed, day) in (32..40).enumerate() {
            let mut rng = StdRng::seed_from_u64(seed as u64);
            let retry = expenses.pay_monthly(&mut rng, &mut state, day).unwrap();
            assert!(!retry.paid);
            assert_eq!(retry.credit_penalty, 0);
            assert_eq!(retry.rent_increase, None);
            assert_eq!(retry.total, first.total);
        }
        assert_eq!(expenses.monthly.rent, rent);
        assert_eq!(state.attributes.credit_score, 80);

        state.finances.delivery_coins = 10_000.0;
        let late = expenses
            .pay_monthly(&mut StdRng::seed_from_u64(7), &mut state, 40)
            .unwrap();
        assert!(late.paid);
        assert_eq!(expenses.days_until_due(40), 30);

        // The next cycle is billed in full again
        state.finances.delivery_coins = 0.0;
        let next = expenses
            .pay_monthly(&mut StdRng::seed_from_u64(8), &mut state, 70)
            .unwrap();
        assert_eq!(next.credit_penalty, 20);
        assert_eq!(state.attributes.credit_score, 60);
    }

    #[test]
    fn test_breakdown_total() {
        let expenses = ExpenseManager::default();
        let lines = expenses.breakdown();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines.last(), Some(&("Total", 4600.0)));
    }
}
