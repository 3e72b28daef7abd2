//! Order board: available orders and the courier's active orders

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::generator::{Order, OrderGenerator, OrderPriority, OrderStatus};
use super::traffic::Traffic;
use crate::core::error::{GameError, GameResult};
use crate::core::state::Weather;

/// Minimum stamina needed to accept an order
pub const MIN_ACCEPT_STAMINA: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, Display)]
pub enum RiskPreference {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl RiskPreference {
    pub fn allows(self, priority: OrderPriority) -> bool {
        match self {
            Self::Conservative => priority == OrderPriority::D,
            Self::Balanced => priority != OrderPriority::S,
            Self::Aggressive => true,
        }
    }
}

/// Order taking preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySettings {
    pub auto_accept: bool,
    /// Minimum total fee for auto accept
    pub min_income: f64,
    pub risk: RiskPreference,
    pub max_active_orders: usize,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            auto_accept: false,
            min_income: 8.0,
            risk: RiskPreference::Balanced,
            max_active_orders: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBoard {
    available: Vec<Order>,
    active: Vec<Order>,
    selected: Option<String>,
}

impl OrderBoard {
    pub fn available(&self) -> &[Order] {
        &self.available
    }

    pub fn active(&self) -> &[Order] {
        &self.active
    }

    /// Replace the available orders with 5 to 15 new ones
    pub fn refresh<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        generator: &OrderGenerator,
        weather: Weather,
        hour: u32,
        time_modifier: f64,
        traffic: &Traffic,
    ) {
        let count = rng.gen_range(5..=15);
        self.available.clear();
        while self.available.len() < count {
            let order = generator.generate(rng, weather, hour, time_modifier, traffic);
            if self.find(&order.order_id).is_none() {
                self.available.push(order);
            }
        }
        if let Some(id) = self.selected.clone() {
            if self.find(&id).is_none() {
                self.selected = None;
            }
        }
        tracing::debug!("Order board refreshed with {} orders", count);
    }

    /// Look up an available or active order
    pub fn find(&self, id: &str) -> Option<&Order> {
        self.available
            .iter()
            .chain(self.active.iter())
            .find(|o| o.order_id == id)
    }

    pub fn select(&mut self, id: &str) {
        if self.find(id).is_some() {
            self.selected = Some(id.to_string());
        }
    }

    pub fn selected(&self) -> Option<&Order> {
        self.selected.as_deref().and_then(|id| self.find(id))
    }

    fn available_index(&self, id: &str) -> GameResult<usize> {
        self.available
            .iter()
            .position(|o| o.order_id == id)
            .ok_or_else(|| self.not_available(id))
    }

    fn not_available(&self, id: &str) -> GameError {
        match self.find(id) {
            Some(order) => GameError::InvalidOrderState {
                id: order.short_id().to_string(),
                status: order.status.to_string(),
            },
            None => GameError::NoSuchOrder(id.to_string()),
        }
    }

    /// Turn down an available order
    pub fn reject(&mut self, id: &str) -> GameResult<Order> {
        let index = self.available_index(id)?;
        let mut order = self.available.remove(index);
        order.status = OrderStatus::Cancelled;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(order)
    }

    /// Take an available order
    pub fn accept(&mut self, id: &str, stamina: u32, limit: usize) -> GameResult<&Order> {
        let index = self.available_index(id)?;
        if stamina < MIN_ACCEPT_STAMINA {
            return Err(GameError::InsufficientStamina {
                needed: MIN_ACCEPT_STAMINA,
                available: stamina,
            });
        }
        if self.active.len() >= limit {
            return Err(GameError::ActiveOrderLimit(limit));
        }
        let mut order = self.available.remove(index);
        order.status = OrderStatus::Accepted;
        self.active.push(order);
        Ok(&self.active[self.active.len() - 1])
    }

    /// Collect the food for an accepted order
    pub fn pick_up(&mut self, id: &str) -> GameResult<&Order> {
        let order = self
            .active
            .iter_mut()
            .find(|o| o.order_id == id)
            .ok_or_else(|| GameError::NoSuchOrder(id.to_string()))?;
        if order.status != OrderStatus::Accepted {
            return Err(GameError::InvalidOrderState {
                id: order.short_id().to_string(),
                status: order.status.to_string(),
            });
        }
        order.status = OrderStatus::PickedUp;
        Ok(order)
    }

    /// Remove an accepted or picked up order to deliver it
    pub fn take_for_delivery(&mut self, id: &str) -> GameResult<Order> {
        let index = match self.active.iter().position(|o| o.order_id == id) {
            Some(index) => index,
            None => return Err(self.not_available(id)),
        };
        let status = self.active[index].status;
        if !matches!(status, OrderStatus::Accepted | OrderStatus::PickedUp) {
            return Err(GameError::InvalidOrderState {
                id: self.active[index].short_id().to_string(),
                status: status.to_string(),
            });
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(self.active.remove(index))
    }

    /// Accept the best paying order the settings allow
    pub fn auto_accept(&mut self, settings: &DeliverySettings, stamina: u32) -> Option<String> {
        if !settings.auto_accept
            || stamina < MIN_ACCEPT_STAMINA
            || self.active.len() >= settings.max_active_orders
        {
            return None;
        }
        let best = self
            .available
            .iter()
            .filter(|o| settings.risk.allows(o.priority) && o.total_fee() >= settings.min_income)
            .max_by(|a, b| a.total_fee().total_cmp(&b.total_fee()))
            .map(|o| o.order_id.clone())?;
        self.accept(&best, stamina, settings.max_active_orders).ok()?;
        Some(best)
    }
}
