//! Money beyond deliveries: stocks, lottery and living costs

pub mod expenses;
pub mod lottery;
pub mod market;
pub mod portfolio;

pub use expenses::{ExpenseManager, MonthlyExpense, MonthlyPayment};
pub use lottery::{Lottery, LotteryKind, LotteryTicket};
pub use market::{Sector, Stock, StockMarket};
pub use portfolio::{Portfolio, StockPosition, Transaction, TransactionKind};
