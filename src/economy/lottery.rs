//! Lottery tickets

use std::collections::HashSet;

use chrono::NaiveDateTime;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::core::error::{GameError, GameResult};
use crate::core::state::{round_cents, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, Display)]
pub enum LotteryKind {
    #[strum(to_string = "Double Color Ball")]
    DoubleColorBall,
    #[strum(to_string = "Super Lotto")]
    SuperLotto,
    #[strum(to_string = "Scratch Card")]
    ScratchCard,
}

impl LotteryKind {
    pub fn price(self) -> f64 {
        match self {
            Self::DoubleColorBall | Self::SuperLotto => 2.0,
            Self::ScratchCard => 10.0,
        }
    }

    /// Number pools as (count, max) pairs, main pool first
    fn pools(self) -> &'static [(usize, u32)] {
        match self {
            Self::DoubleColorBall => &[(6, 33), (1, 16)],
            Self::SuperLotto => &[(5, 35), (2, 12)],
            Self::ScratchCard => &[],
        }
    }

    pub fn rules(self) -> &'static str {
        match self {
            Self::DoubleColorBall => "6 red balls from 1-33 and 1 blue ball from 1-16",
            Self::SuperLotto => "5 front numbers from 1-35 and 2 back numbers from 1-12",
            Self::ScratchCard => "Scratch to reveal an instant prize",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotteryTicket {
    pub timestamp: NaiveDateTime,
    pub kind: LotteryKind,
    pub numbers: Vec<u32>,
    pub winning_numbers: Vec<u32>,
    /// Matches in the main and second pool
    pub matches: (usize, usize),
    pub prize: f64,
    pub cost: f64,
}

impl LotteryTicket {
    pub fn is_win(&self) -> bool {
        self.prize > 0.0
    }
}

pub fn double_color_ball_prize(red: usize, blue: bool, consecutive_losses: u32) -> f64 {
    let bonus = 1.0 + f64::from(consecutive_losses) * 0.1;
    let prize = match (red, blue) {
        (6, true) => return 5_000_000.0,
        (6, false) => return 1_000_000.0,
        (5, true) => 3_000.0,
        (5, false) | (4, true) => 200.0,
        (4, false) | (3, true) => 10.0,
        (_, true) => 5.0,
        _ => 0.0,
    };
    round_cents(prize * bonus)
}

pub fn super_lotto_prize(front: usize, back: usize) -> f64 {
    match (front, back) {
        (5, 2) => 10_000_000.0,
        (5, 1) => 500_000.0,
        (5, _) => 10_000.0,
        (4, 2) => 3_000.0,
        (4, 1) => 300.0,
        (3, 2) => 200.0,
        (4, _) | (3, 1) | (2, 2) => 10.0,
        (3, _) | (1, 2) | (2, 1) | (0, 2) => 5.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lottery {
    consecutive_losses: u32,
    history: Vec<LotteryTicket>,
}

impl Lottery {
    const SCRATCH_PRIZES: [f64; 8] = [0.0, 10.0, 20.0, 50.0, 100.0, 500.0, 1000.0, 10_000.0];
    const SCRATCH_WEIGHTS: [f64; 8] = [0.7, 0.15, 0.08, 0.04, 0.02, 0.008, 0.001, 0.0001];

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    pub fn history(&self) -> &[LotteryTicket] {
        &self.history
    }

    pub fn total_spent(&self) -> f64 {
        round_cents(self.history.iter().map(|t| t.cost).sum())
    }

    pub fn total_won(&self) -> f64 {
        round_cents(self.history.iter().map(|t| t.prize).sum())
    }

    /// Distinct random numbers for every pool
    pub fn quick_pick<R: Rng + ?Sized>(rng: &mut R, kind: LotteryKind) -> Vec<u32> {
        kind.pools()
            .iter()
            .flat_map(|&(count, max)| draw(rng, count, max))
            .collect()
    }

    pub fn validate(kind: LotteryKind, numbers: &[u32]) -> GameResult<()> {
        let pools = kind.pools();
        let expected: usize = pools.iter().map(|(count, _)| count).sum();
        if numbers.len() != expected {
            return Err(GameError::InvalidLotteryNumbers(format!(
                "{kind} needs {expected} numbers, got {}",
                numbers.len()
            )));
        }
        let mut rest = numbers;
        for &(count, max) in pools {
            let (pool, tail) = rest.split_at(count);
            rest = tail;
            if let Some(n) = pool.iter().find(|&&n| n == 0 || n > max) {
                return Err(GameError::InvalidLotteryNumbers(format!(
                    "{n} is outside 1-{max}"
                )));
            }
            let distinct: HashSet<_> = pool.iter().collect();
            if distinct.len() != pool.len() {
                return Err(GameError::InvalidLotteryNumbers(
                    "numbers in a pool must be different".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Buy and draw a ticket. Missing numbers are quick-picked.
    pub fn buy<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        state: &mut GameState,
        kind: LotteryKind,
        numbers: Option<Vec<u32>>,
        now: NaiveDateTime,
    ) -> GameResult<&LotteryTicket> {
        let numbers = match numbers {
            Some(numbers) if kind != LotteryKind::ScratchCard => {
                Self::validate(kind, &numbers)?;
                numbers
            }
            _ => Self::quick_pick(rng, kind),
        };
        let cost = kind.price();
        state.spend(cost)?;

        let (winning_numbers, matches, prize) = match kind {
            LotteryKind::ScratchCard => (Vec::new(), (0, 0), self.scratch(rng)),
            LotteryKind::DoubleColorBall | LotteryKind::SuperLotto => {
                let winning = Self::quick_pick(rng, kind);
                let split = kind.pools()[0].0;
                let matches = (
                    count_matches(&numbers[..split], &winning[..split]),
                    count_matches(&numbers[split..], &winning[split..]),
                );
                let prize = if kind == LotteryKind::DoubleColorBall {
                    double_color_ball_prize(matches.0, matches.1 == 1, self.consecutive_losses)
                } else {
                    super_lotto_prize(matches.0, matches.1)
                };
                (winning, matches, prize)
            }
        };

        if prize > 0.0 {
            self.consecutive_losses = 0;
            state.earn(prize);
            tracing::info!("{} ticket won ¥{:.2}", kind, prize);
        } else {
            self.consecutive_losses += 1;
        }

        self.history.push(LotteryTicket {
            timestamp: now,
            kind,
            numbers,
            winning_numbers,
            matches,
            prize,
            cost,
        });
        Ok(&self.history[self.history.len() - 1])
    }

    fn scratch<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match WeightedIndex::new(Self::SCRATCH_WEIGHTS) {
            Ok(dist) => Self::SCRATCH_PRIZES[dist.sample(rng)],
            Err(_) => 0.0,
        }
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, count: usize, max: u32) -> Vec<u32> {
    let mut picked: Vec<u32> = index::sample(rng, max as usize, count)
        .into_iter()
        .map(|i| i as u32 + 1)
        .collect();
    picked.sort_unstable();
    picked
}

fn count_matches(a: &[u32], b: &[u32]) -> usize {
    a.iter().filter(|n| b.contains(n)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::GameClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_double_color_ball_table() {
        assert_eq!(double_color_ball_prize(6, true, 3), 5_000_000.0);
        assert_eq!(double_color_ball_prize(6, false, 0), 1_000_000.0);
        assert_eq!(double_color_ball_prize(5, true, 0), 3_000.0);
        assert_eq!(double_color_ball_prize(4, true, 0), 200.0);
        assert_eq!(double_color_ball_prize(3, true, 0), 10.0);
        assert_eq!(double_color_ball_prize(0, true, 0), 5.0);
        assert_eq!(double_color_ball_prize(3, false, 0), 0.0);
        assert_eq!(double_color_ball_prize(0, true, 5), 7.5);
    }

    #[test]
    fn test_super_lotto_table() {
        assert_eq!(super_lotto_prize(5, 2), 10_000_000.0);
        assert_eq!(super_lotto_prize(5, 0), 10_000.0);
        assert_eq!(super_lotto_prize(4, 0), 10.0);
        assert_eq!(super_lotto_prize(2, 2), 10.0);
        assert_eq!(super_lotto_prize(0, 2), 5.0);
        assert_eq!(super_lotto_prize(2, 0), 0.0);
        assert_eq!(super_lotto_prize(1, 1), 0.0);
    }

    #[test]
    fn test_validation() {
        let kind = LotteryKind::DoubleColorBall;
        assert!(Lottery::validate(kind, &[1, 2, 3, 4, 5, 6, 16]).is_ok());
        assert!(Lottery::validate(kind, &[1, 2, 3, 4, 5, 6]).is_err());
        assert!(Lottery::validate(kind, &[1, 2, 3, 4, 5, 34, 1]).is_err());
        assert!(Lottery::validate(kind, &[1, 1, 3, 4, 5, 6, 1]).is_err());
        assert!(Lottery::validate(kind, &[1, 2, 3, 4, 5, 6, 17]).is_err());

        let kind = LotteryKind::SuperLotto;
        assert!(Lottery::validate(kind, &[1, 2, 3, 4, 35, 1, 12]).is_ok());
        assert!(Lottery::validate(kind, &[1, 2, 3, 4, 5, 7, 7]).is_err());
    }

    #[test]
    fn test_quick_pick_is_valid() {
        let mut rng = StdRng::seed_from_u64(5);
        for kind in [LotteryKind::DoubleColorBall, LotteryKind::SuperLotto] {
            for _ in 0..50 {
                let numbers = Lottery::quick_pick(&mut rng, kind);
                assert!(Lottery::validate(kind, &numbers).is_ok());
            }
        }
        assert!(Lottery::quick_pick(&mut rng, LotteryKind::ScratchCard).is_empty());
    }

    #[test]
    fn test_buy_charges_and_records() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut lottery = Lottery::default();
        let mut state = GameState::default();
        let now = GameClock::default().now();

        for _ in 0..5 {
            let ticket = lottery
                .buy(&mut rng, &mut state, LotteryKind::ScratchCard, None, now)
                .unwrap();
            assert_eq!(ticket.cost, 10.0);
        }
        assert_eq!(lottery.history().len(), 5);
        let expected = round_cents(100.0 - lottery.total_spent() + lottery.total_won());
        assert_eq!(state.coins(), expected);

        assert!(matches!(
            lottery.buy(
                &mut rng,
                &mut state,
                LotteryKind::DoubleColorBall,
                Some(vec![1, 2, 3]),
                now
            ),
            Err(GameError::InvalidLotteryNumbers(_))
        ));
        assert_eq!(lottery.history().len(), 5);
    }

    #[test]
    fn test_losses_are_counted() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut lottery = Lottery::default();
        let mut state = GameState::default();
        state.finances.delivery_coins = 1_000.0;
        let now = GameClock::default().now();
        let ticket = lottery
            .buy(&mut rng, &mut state, LotteryKind::SuperLotto, None, now)
            .unwrap()
            .clone();
        assert_eq!(ticket.numbers.len(), 7);
        assert_eq!(ticket.winning_numbers.len(), 7);
        if ticket.is_win() {
            assert_eq!(lottery.consecutive_losses(), 0);
        } else {
            assert_eq!(lottery.consecutive_losses(), 1);
        }
    }
}
