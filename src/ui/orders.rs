//! Order board: grab, pick up and deliver

use eframe::egui::{self, Color32, RichText};
use egui_extras::{Column, TableBuilder, TableRow};

use super::{money, priority_color, priority_tint};
use crate::app::{DeliverySimApp, Tab};
use crate::core::session::DeliveryReport;
use crate::orders::{Order, OrderStatus};

fn tinted(row: &mut TableRow<'_, '_>, tint: Option<Color32>, add: impl FnOnce(&mut egui::Ui)) {
    row.col(|ui| {
        if let Some(tint) = tint {
            ui.painter().rect_filled(ui.max_rect(), 0.0, tint);
        }
        add(ui);
    });
}

enum OrderAction {
    Select(String),
    Accept(String),
    Reject(String),
    PickUp(String),
    Deliver(String),
}

/// Order board panel
pub struct OrdersPanel;

impl OrdersPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.heading("Order Board");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("\u{21BB} Refresh").on_hover_text("Fetch new orders").clicked() {
                    app.session.refresh_orders();
                }
                let settings = &app.session.settings;
                if settings.auto_accept {
                    ui.weak(format!(
                        "Auto accept: {} orders over {}",
                        settings.risk,
                        money(settings.min_income)
                    ));
                }
            });
        });
        ui.separator();

        egui::SidePanel::right("order_details")
            .resizable(true)
            .default_width(280.0)
            .show_inside(ui, |ui| {
                Self::details(ui, app, &mut action);
            });

        ui.strong(format!("Available ({})", app.session.board.available().len()));
        Self::available_table(ui, app, &mut action);
        ui.add_space(8.0);
        ui.strong(format!(
            "Carrying ({}/{})",
            app.session.board.active().len(),
            app.session.settings.max_active_orders
        ));
        Self::active_list(ui, app, &mut action);

        if let Some(action) = action {
            Self::apply(app, action);
        }
    }

    fn available_table(ui: &mut egui::Ui, app: &DeliverySimApp, action: &mut Option<OrderAction>) {
        let orders = app.session.board.available();
        if orders.is_empty() {
            ui.weak("No orders right now, try refreshing");
            return;
        }
        let selected = app.session.board.selected().map(|o| o.order_id.as_str());

        ui.push_id("available_orders", |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::auto().at_least(64.0))
                .column(Column::remainder().at_least(120.0))
                .column(Column::auto().at_least(90.0))
                .column(Column::auto().at_least(180.0))
                .column(Column::auto())
                .column(Column::auto())
                .column(Column::auto())
                .column(Column::auto())
                .max_scroll_height(280.0)
                .header(20.0, |mut header| {
                    for title in [
                        "ID", "Restaurant", "Customer", "Route", "km", "Fee", "Class", "ETA",
                    ] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    for order in orders {
                        let is_selected = selected == Some(order.order_id.as_str());
                        let tint = priority_tint(order.priority);
                        body.row(22.0, |mut row| {
                            row.set_selected(is_selected);
                            tinted(&mut row, tint, |ui| {
                                if ui.selectable_label(is_selected, order.short_id()).clicked() {
                                    *action = Some(OrderAction::Select(order.order_id.clone()));
                                }
                            });
                            tinted(&mut row, tint, |ui| {
                                ui.label(&order.restaurant_name);
                            });
                            tinted(&mut row, tint, |ui| {
                                ui.label(order.customer_type.to_string());
                            });
                            tinted(&mut row, tint, |ui| {
                                ui.label(format!(
                                    "{} \u{2192} {}",
                                    order.pickup_district, order.delivery_district
                                ));
                            });
                            tinted(&mut row, tint, |ui| {
                                ui.label(format!("{:.1}", order.distance_km));
                            });
                            tinted(&mut row, tint, |ui| {
                                ui.label(money(order.total_fee()));
                            });
                            tinted(&mut row, tint, |ui| {
                                ui.colored_label(
                                    priority_color(order.priority),
                                    RichText::new(order.priority.to_string()).strong(),
                                );
                            });
                            tinted(&mut row, tint, |ui| {
                                ui.label(format!("{} min", order.estimated_time));
                            });
                        });
                    }
                });
        });
    }

    fn active_list(ui: &mut egui::Ui, app: &DeliverySimApp, action: &mut Option<OrderAction>) {
        let orders = app.session.board.active();
        if orders.is_empty() {
            ui.weak("Not carrying anything");
            return;
        }
        egui::Grid::new("active_orders")
            .striped(true)
            .num_columns(5)
            .show(ui, |ui| {
                for order in orders {
                    if ui.selectable_label(false, order.short_id()).clicked() {
                        *action = Some(OrderAction::Select(order.order_id.clone()));
                    }
                    ui.label(&order.restaurant_name);
                    ui.label(format!(
                        "{} \u{2192} {}",
                        order.pickup_district, order.delivery_district
                    ));
                    ui.label(order.status.to_string());
                    match order.status {
                        OrderStatus::Accepted => {
                            if ui.button("Pick Up").clicked() {
                                *action = Some(OrderAction::PickUp(order.order_id.clone()));
                            }
                        }
                        OrderStatus::PickedUp => {
                            if ui.button("Deliver").clicked() {
                                *action = Some(OrderAction::Deliver(order.order_id.clone()));
                            }
                        }
                        _ => {
                            ui.label("");
                        }
                    }
                    ui.end_row();
                }
            });
    }

    fn details(ui: &mut egui::Ui, app: &DeliverySimApp, action: &mut Option<OrderAction>) {
        ui.heading("Details");
        let Some(order) = app.session.board.selected() else {
            ui.weak("Select an order to see its details");
            return;
        };

        Self::order_facts(ui, app, order);
        ui.add_space(8.0);
        ui.horizontal(|ui| match order.status {
            OrderStatus::Available => {
                if ui.button("Accept").clicked() {
                    *action = Some(OrderAction::Accept(order.order_id.clone()));
                }
                if ui.button("Reject").clicked() {
                    *action = Some(OrderAction::Reject(order.order_id.clone()));
                }
            }
            OrderStatus::Accepted => {
                if ui.button("Pick Up").clicked() {
                    *action = Some(OrderAction::PickUp(order.order_id.clone()));
                }
            }
            OrderStatus::PickedUp => {
                if ui.button("Deliver").clicked() {
                    *action = Some(OrderAction::Deliver(order.order_id.clone()));
                }
            }
            _ => {}
        });
    }

    fn order_facts(ui: &mut egui::Ui, app: &DeliverySimApp, order: &Order) {
        egui::Grid::new("order_facts").num_columns(2).show(ui, |ui| {
            let fact = |ui: &mut egui::Ui, name: &str, value: String| {
                ui.label(name);
                ui.label(value);
                ui.end_row();
            };
            fact(ui, "Order", order.short_id().to_string());
            fact(ui, "Restaurant", order.restaurant_name.clone());
            fact(ui, "Customer", order.customer_name.clone());
            fact(ui, "Type", order.customer_type.to_string());
            fact(ui, "Pickup", order.pickup_district.to_string());
            fact(ui, "Drop off", order.delivery_district.to_string());
            fact(ui, "Distance", format!("{:.1} km", order.distance_km));
            fact(ui, "Estimate", format!("{} min", order.estimated_time));
            fact(
                ui,
                "Traffic",
                app.session.traffic.at_pickup(order).to_string(),
            );
            fact(ui, "Base fee", money(order.base_fee));
            fact(ui, "Weather bonus", money(order.weather_bonus));
            fact(ui, "Peak bonus", money(order.peak_hour_bonus));
            fact(ui, "Total", money(order.total_fee()));
            fact(
                ui,
                "Complaint risk",
                format!("{:.0}%", order.complaint_probability * 100.0),
            );
            fact(ui, "Tip chance", format!("{:.0}%", order.tip_probability * 100.0));
            fact(ui, "Status", order.status.to_string());
        });
        ui.colored_label(
            priority_color(order.priority),
            format!("Class {} order", order.priority),
        );
        for requirement in &order.special_requirements {
            ui.label(format!("\u{2022} {requirement}"));
        }
    }

    fn apply(app: &mut DeliverySimApp, action: OrderAction) {
        match action {
            OrderAction::Select(id) => app.session.select_order(&id),
            OrderAction::Accept(id) => {
                let result = app.session.accept_order(&id);
                app.handle(result, |order| {
                    format!("Accepted order {} from {}", order.short_id(), order.restaurant_name)
                });
            }
            OrderAction::Reject(id) => {
                let result = app.session.reject_order(&id);
                app.handle(result, |order| format!("Rejected order {}", order.short_id()));
            }
            OrderAction::PickUp(id) => {
                let result = app.session.pick_up_order(&id);
                app.handle(result, |order| {
                    format!("Picked up order {} at {}", order.short_id(), order.restaurant_name)
                });
            }
            OrderAction::Deliver(id) => {
                let result = app.session.deliver_order(&id);
                if let Ok(report) = &result {
                    if report.conversation {
                        app.tab = Tab::Customers;
                    }
                }
                app.handle(result, |report| Self::describe_delivery(&report));
            }
        }
    }

    fn describe_delivery(report: &DeliveryReport) -> String {
        let outcome = &report.outcome;
        let mut text = if outcome.success {
            format!(
                "Delivered {} in {} min, earned {}",
                report.order.short_id(),
                outcome.minutes,
                money(outcome.earnings)
            )
        } else {
            format!("Order {} failed", report.order.short_id())
        };
        if outcome.tip > 0.0 {
            text.push_str(&format!(", tip {}", money(outcome.tip)));
        }
        if outcome.late {
            text.push_str(", late");
        }
        if outcome.complaint {
            text.push_str(", customer complained");
        }
        for event in &outcome.events {
            text.push_str(". ");
            text.push_str(&event.description());
        }
        if report.levels_gained > 0 {
            text.push_str(". Level up!");
        }
        text
    }
}
