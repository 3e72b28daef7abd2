//! Order grabbing and delivery

pub mod board;
pub mod delivery;
pub mod generator;
pub mod traffic;

pub use board::{DeliverySettings, OrderBoard, RiskPreference};
pub use delivery::{DeliveryEvent, DeliveryOutcome, DeliverySimulator};
pub use generator::{Order, OrderGenerator, OrderPriority, OrderStatus};
pub use traffic::{Traffic, TrafficLevel};
