//! Simulated stock market

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::core::state::round_cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum Sector {
    Tech,
    Finance,
    Consumer,
    Medical,
    Energy,
}

impl Sector {
    pub fn volatility(self) -> f64 {
        match self {
            Self::Tech => 1.5,
            Self::Finance => 0.8,
            Self::Consumer => 1.0,
            Self::Medical => 1.2,
            Self::Energy => 1.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub sector: Sector,
    pub price: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub market_cap: f64,
    /// Recent prices, oldest first
    pub history: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMarket {
    stocks: Vec<Stock>,
}

impl StockMarket {
    /// Trading runs from 09:00 until 15:00 game time
    pub const OPEN_HOUR: u32 = 9;
    pub const CLOSE_HOUR: u32 = 15;
    pub const UPDATE_MINUTES: u64 = 5;
    const HISTORY_LEN: usize = 60;

    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let listings = [
            ("000001", "Ping An Bank", Sector::Finance, 12.50),
            ("000002", "Vanke A", Sector::Consumer, 18.20),
            ("000858", "Wuliangye", Sector::Consumer, 158.30),
            ("002415", "Hikvision", Sector::Tech, 35.80),
            ("300059", "East Money", Sector::Finance, 15.60),
            ("300750", "CATL", Sector::Tech, 420.50),
            ("600036", "China Merchants Bank", Sector::Finance, 35.20),
            ("600519", "Kweichow Moutai", Sector::Consumer, 1680.00),
            ("600887", "Yili Group", Sector::Consumer, 32.40),
            ("688111", "Kingsoft Office", Sector::Tech, 280.80),
        ];

        let stocks = listings
            .into_iter()
            .map(|(symbol, name, sector, price)| Stock {
                symbol: symbol.to_string(),
                name: name.to_string(),
                sector,
                price,
                change_percent: 0.0,
                volume: rng.gen_range(10_000..=1_000_000),
                market_cap: price * rng.gen_range(1_000_000..=10_000_000) as f64,
                history: vec![price],
            })
            .collect();
        Self { stocks }
    }

    pub fn is_trading_hour(hour: u32) -> bool {
        (Self::OPEN_HOUR..Self::CLOSE_HOUR).contains(&hour)
    }

    /// Move every price once. Returns false outside trading hours.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R, hour: u32) -> bool {
        if !Self::is_trading_hour(hour) {
            return false;
        }
        for stock in &mut self.stocks {
            let change = rng.gen_range(-0.05..=0.05) * stock.sector.volatility();
            stock.price = round_cents(stock.price * (1.0 + change)).max(0.01);
            stock.change_percent = change * 100.0;
            stock.volume = rng.gen_range(10_000..=1_000_000);
            stock.history.push(stock.price);
            if stock.history.len() > Self::HISTORY_LEN {
                stock.history.remove(0);
            }
        }
        true
    }

    pub fn get(&self, symbol: &str) -> Option<&Stock> {
        self.stocks.iter().find(|s| s.symbol == symbol)
    }

    pub fn all(&self) -> &[Stock] {
        &self.stocks
    }

    /// Case-insensitive match on name or symbol
    pub fn search(&self, keyword: &str) -> Vec<&Stock> {
        let keyword = keyword.to_lowercase();
        self.stocks
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&keyword) || s.symbol.to_lowercase().contains(&keyword)
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn set_price(&mut self, symbol: &str, price: f64) {
        if let Some(stock) = self.stocks.iter_mut().find(|s| s.symbol == symbol) {
            stock.price = price;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_listings() {
        let market = StockMarket::new(&mut StdRng::seed_from_u64(1));
        assert_eq!(market.all().len(), 10);
        assert_eq!(market.get("600519").unwrap().price, 1680.0);
        assert!(market.get("999999").is_none());
    }

    #[test]
    fn test_no_trading_outside_hours() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut market = StockMarket::new(&mut rng);
        let before: Vec<f64> = market.all().iter().map(|s| s.price).collect();
        assert!(!market.update(&mut rng, 8));
        assert!(!market.update(&mut rng, 15));
        let after: Vec<f64> = market.all().iter().map(|s| s.price).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_moves_are_bounded_by_volatility() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut market = StockMarket::new(&mut rng);
        for _ in 0..100 {
            let before: Vec<f64> = market.all().iter().map(|s| s.price).collect();
            assert!(market.update(&mut rng, 10));
            for (stock, old) in market.all().iter().zip(before) {
                let bound = 0.05 * stock.sector.volatility() * 100.0 + 1e-6;
                assert!(stock.change_percent.abs() <= bound);
                assert!(stock.price >= 0.01);
                assert!((stock.price - old).abs() <= old * 0.075 + 0.01);
            }
        }
        assert!(market.all().iter().all(|s| s.history.len() == 60));
    }

    #[test]
    fn test_search() {
        let market = StockMarket::new(&mut StdRng::seed_from_u64(4));
        assert_eq!(market.search("bank").len(), 2);
        assert_eq!(market.search("3007")[0].name, "CATL");
        assert!(market.search("nothing").is_empty());
    }
}
