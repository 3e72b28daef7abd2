//! Stock positions with optional leverage
//!
//! A position of `shares` bought at `avg_cost` with leverage `L` ties up
//! `shares * avg_cost / L` of the player's coins as margin. Profit and loss
//! is the full price move on all shares, so equity is the margin plus the
//! profit, never below zero. Selling pays out the sold share of equity.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::market::StockMarket;
use crate::core::error::{GameError, GameResult};
use crate::core::state::{round_cents, GameState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPosition {
    pub symbol: String,
    pub shares: u32,
    pub avg_cost: f64,
    pub current_price: f64,
    pub leverage: f64,
}

impl StockPosition {
    pub fn margin(&self) -> f64 {
        f64::from(self.shares) * self.avg_cost / self.leverage
    }

    pub fn profit_loss(&self) -> f64 {
        (self.current_price - self.avg_cost) * f64::from(self.shares)
    }

    pub fn equity(&self) -> f64 {
        (self.margin() + self.profit_loss()).max(0.0)
    }

    /// Market value of the shares held
    pub fn exposure(&self) -> f64 {
        f64::from(self.shares) * self.current_price
    }

    pub fn profit_loss_percent(&self) -> f64 {
        let margin = self.margin();
        if margin <= 0.0 {
            0.0
        } else {
            self.profit_loss() / margin * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum TransactionKind {
    Buy,
    Sell,
    Liquidation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: NaiveDateTime,
    pub kind: TransactionKind,
    pub symbol: String,
    pub shares: u32,
    pub price: f64,
    pub leverage: f64,
    /// Margin paid for a buy, coins returned for a sale
    pub amount: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    positions: Vec<StockPosition>,
    transactions: Vec<Transaction>,
}

impl Portfolio {
    pub const MAX_LEVERAGE: f64 = 5.0;
    pub const LIQUIDATION_THRESHOLD: f64 = 0.3;

    pub fn positions(&self) -> &[StockPosition] {
        &self.positions
    }

    pub fn position(&self, symbol: &str) -> Option<&StockPosition> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn buy(
        &mut self,
        state: &mut GameState,
        symbol: &str,
        shares: u32,
        price: f64,
        leverage: f64,
        now: NaiveDateTime,
    ) -> GameResult<()> {
        if shares == 0 {
            return Err(GameError::InvalidShares);
        }
        if !(1.0..=Self::MAX_LEVERAGE).contains(&leverage) {
            return Err(GameError::InvalidLeverage {
                max: Self::MAX_LEVERAGE,
            });
        }
        if let Some(held) = self.position(symbol) {
            if (held.leverage - leverage).abs() > f64::EPSILON {
                return Err(GameError::LeverageMismatch {
                    symbol: symbol.to_string(),
                    held: held.leverage,
                    requested: leverage,
                });
            }
        }

        let cost = round_cents(f64::from(shares) * price / leverage);
        state.spend(cost)?;

        match self.positions.iter_mut().find(|p| p.symbol == symbol) {
            Some(position) => {
                let total_shares = position.shares + shares;
                position.avg_cost = (position.avg_cost * f64::from(position.shares)
                    + price * f64::from(shares))
                    / f64::from(total_shares);
                position.shares = total_shares;
                position.current_price = price;
            }
            None => self.positions.push(StockPosition {
                symbol: symbol.to_string(),
                shares,
                avg_cost: price,
                current_price: price,
                leverage,
            }),
        }

        self.transactions.push(Transaction {
            timestamp: now,
            kind: TransactionKind::Buy,
            symbol: symbol.to_string(),
            shares,
            price,
            leverage,
            amount: cost,
            profit: 0.0,
        });
        tracing::info!("Bought {} shares of {} at {:.2} ({}x)", shares, symbol, price, leverage);
        Ok(())
    }

    /// Sell shares at `price`, returning the realized profit
    pub fn sell(
        &mut self,
        state: &mut GameState,
        symbol: &str,
        shares: u32,
        price: f64,
        now: NaiveDateTime,
    ) -> GameResult<f64> {
        self.close(state, symbol, shares, price, now, TransactionKind::Sell)
    }

    fn close(
        &mut self,
        state: &mut GameState,
        symbol: &str,
        shares: u32,
        price: f64,
        now: NaiveDateTime,
        kind: TransactionKind,
    ) -> GameResult<f64> {
        if shares == 0 {
            return Err(GameError::InvalidShares);
        }
        let index = self
            .positions
            .iter()
            .position(|p| p.symbol == symbol)
            .ok_or_else(|| GameError::NoPosition(symbol.to_string()))?;
        let position = &mut self.positions[index];
        if shares > position.shares {
            return Err(GameError::InsufficientShares {
                held: position.shares,
                requested: shares,
            });
        }

        position.current_price = price;
        let fraction = f64::from(shares) / f64::from(position.shares);
        let payout = round_cents(position.equity() * fraction);
        let profit = round_cents((price - position.avg_cost) * f64::from(shares));
        let leverage = position.leverage;

        if shares == position.shares {
            self.positions.remove(index);
        } else {
            position.shares -= shares;
        }
        state.earn(payout);

        self.transactions.push(Transaction {
            timestamp: now,
            kind,
            symbol: symbol.to_string(),
            shares,
            price,
            leverage,
            amount: payout,
            profit,
        });
        Ok(profit)
    }

    /// Mark positions to market and force-sell leveraged positions whose
    /// equity fell below the threshold. Returns the liquidated symbols.
    pub fn update_prices(
        &mut self,
        market: &StockMarket,
        state: &mut GameState,
        now: NaiveDateTime,
    ) -> Vec<String> {
        for position in &mut self.positions {
            if let Some(stock) = market.get(&position.symbol) {
                position.current_price = stock.price;
            }
        }

        let doomed: Vec<(String, u32, f64)> = self
            .positions
            .iter()
            .filter(|p| p.leverage > 1.0 && p.equity() < p.margin() * Self::LIQUIDATION_THRESHOLD)
            .map(|p| (p.symbol.clone(), p.shares, p.current_price))
            .collect();

        let mut liquidated = Vec::new();
        for (symbol, shares, price) in doomed {
            if self
                .close(state, &symbol, shares, price, now, TransactionKind::Liquidation)
                .is_ok()
            {
                tracing::info!("Position in {} liquidated at {:.2}", symbol, price);
                liquidated.push(symbol);
            }
        }
        liquidated
    }

    /// Equity of all positions
    pub fn value(&self) -> f64 {
        round_cents(self.positions.iter().map(StockPosition::equity).sum())
    }

    pub fn total_profit_loss(&self) -> f64 {
        round_cents(self.positions.iter().map(StockPosition::profit_loss).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::GameClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rich() -> GameState {
        let mut state = GameState::default();
        state.finances.delivery_coins = 10_000.0;
        state
    }

    fn now() -> NaiveDateTime {
        GameClock::default().now()
    }

    #[test]
    fn test_buy_validation() {
        let mut portfolio = Portfolio::default();
        let mut state = rich();
        assert_eq!(
            portfolio.buy(&mut state, "000001", 0, 10.0, 1.0, now()),
            Err(GameError::InvalidShares)
        );
        assert_eq!(
            portfolio.buy(&mut state, "000001", 10, 10.0, 6.0, now()),
            Err(GameError::InvalidLeverage { max: 5.0 })
        );
        assert_eq!(
            portfolio.buy(&mut state, "000001", 10, 10.0, 0.5, now()),
            Err(GameError::InvalidLeverage { max: 5.0 })
        );
        assert!(matches!(
            portfolio.buy(&mut state, "600519", 100, 1680.0, 1.0, now()),
            Err(GameError::InsufficientFunds { .. })
        ));
        assert_eq!(state.coins(), 10_000.0);
    }

    #[test]
    fn test_buy_averages_cost() {
        let mut portfolio = Portfolio::default();
        let mut state = rich();
        portfolio.buy(&mut state, "000001", 100, 10.0, 1.0, now()).unwrap();
        portfolio.buy(&mut state, "000001", 100, 20.0, 1.0, now()).unwrap();
        let position = portfolio.position("000001").unwrap();
        assert_eq!(position.shares, 200);
        assert_eq!(position.avg_cost, 15.0);
        assert_eq!(state.coins(), 7_000.0);

        assert!(matches!(
            portfolio.buy(&mut state, "000001", 10, 20.0, 2.0, now()),
            Err(GameError::LeverageMismatch { .. })
        ));
    }

    #[test]
    fn test_leveraged_sell_pays_equity() {
        let mut portfolio = Portfolio::default();
        let mut state = rich();
        // 100 shares at 10 with 5x: 200 margin
        portfolio.buy(&mut state, "000001", 100, 10.0, 5.0, now()).unwrap();
        assert_eq!(state.coins(), 9_800.0);

        let profit = portfolio.sell(&mut state, "000001", 50, 12.0, now()).unwrap();
        assert_eq!(profit, 100.0);
        // equity 200 + 200 = 400, half of it returned
        assert_eq!(state.coins(), 10_000.0);
        assert_eq!(portfolio.position("000001").unwrap().shares, 50);

        assert_eq!(
            portfolio.sell(&mut state, "000001", 60, 12.0, now()),
            Err(GameError::InsufficientShares {
                held: 50,
                requested: 60
            })
        );
        portfolio.sell(&mut state, "000001", 50, 12.0, now()).unwrap();
        assert_eq!(state.coins(), 10_200.0);
        assert!(portfolio.positions().is_empty());
        assert_eq!(
            portfolio.sell(&mut state, "000001", 1, 12.0, now()),
            Err(GameError::NoPosition("000001".to_string()))
        );
    }

    #[test]
    fn test_unleveraged_round_trip() {
        let mut portfolio = Portfolio::default();
        let mut state = rich();
        portfolio.buy(&mut state, "000002", 10, 20.0, 1.0, now()).unwrap();
        let profit = portfolio.sell(&mut state, "000002", 10, 18.0, now()).unwrap();
        assert_eq!(profit, -20.0);
        assert_eq!(state.coins(), 9_980.0);
        assert_eq!(portfolio.transactions().len(), 2);
    }

    #[test]
    fn test_liquidation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut market = StockMarket::new(&mut rng);
        let mut portfolio = Portfolio::default();
        let mut state = rich();
        let price = market.get("000001").unwrap().price;
        portfolio.buy(&mut state, "000001", 100, price, 5.0, now()).unwrap();
        portfolio.buy(&mut state, "000002", 10, 18.2, 1.0, now()).unwrap();

        // 15% drop at 5x leaves 25% of margin
        market.set_price("000001", price * 0.85);
        market.set_price("000002", 1.0);
        let liquidated = portfolio.update_prices(&market, &mut state, now());
        assert_eq!(liquidated, vec!["000001".to_string()]);
        assert!(portfolio.position("000001").is_none());
        assert!(portfolio.position("000002").is_some());
        let last = portfolio.transactions().last().unwrap();
        assert_eq!(last.kind, TransactionKind::Liquidation);
    }

    #[test]
    fn test_value_and_profit() {
        let mut portfolio = Portfolio::default();
        let mut state = rich();
        portfolio.buy(&mut state, "000001", 100, 10.0, 2.0, now()).unwrap();
        let mut market = StockMarket::new(&mut StdRng::seed_from_u64(2));
        market.set_price("000001", 11.0);
        portfolio.update_prices(&market, &mut state, now());
        assert_eq!(portfolio.total_profit_loss(), 100.0);
        assert_eq!(portfolio.value(), 600.0);
        assert_eq!(portfolio.position("000001").unwrap().profit_loss_percent(), 20.0);
    }
}
