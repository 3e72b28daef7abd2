//! UI components for the delivery simulator

pub mod charts;
pub mod customer;
pub mod dialogs;
pub mod investment;
pub mod orders;
pub mod skills;
pub mod stats;
pub mod status;

use eframe::egui::Color32;

use crate::orders::OrderPriority;

pub const PROFIT: Color32 = Color32::from_rgb(220, 70, 60);
pub const LOSS: Color32 = Color32::from_rgb(60, 170, 90);

pub fn money(amount: f64) -> String {
    format!("¥{amount:.2}")
}

/// Row tint for an order priority
pub fn priority_tint(priority: OrderPriority) -> Option<Color32> {
    match priority {
        OrderPriority::S => Some(Color32::from_rgba_unmultiplied(220, 60, 60, 40)),
        OrderPriority::A => None,
        OrderPriority::D => Some(Color32::from_rgba_unmultiplied(60, 180, 90, 40)),
    }
}

pub fn priority_color(priority: OrderPriority) -> Color32 {
    match priority {
        OrderPriority::S => Color32::from_rgb(230, 80, 70),
        OrderPriority::A => Color32::from_rgb(230, 170, 60),
        OrderPriority::D => Color32::from_rgb(80, 190, 110),
    }
}

/// Red for gains and green for losses, as on the exchange boards
pub fn change_color(change: f64) -> Color32 {
    if change > 0.0 {
        PROFIT
    } else if change < 0.0 {
        LOSS
    } else {
        Color32::GRAY
    }
}
