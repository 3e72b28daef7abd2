//! Floating windows opened from the menu and panels

use eframe::egui::{self, Color32, RichText};
use egui_commonmark::CommonMarkViewer;
use strum::IntoEnumIterator;

use super::investment::InvestmentPanel;
use super::{change_color, money};
use crate::app::DeliverySimApp;
use crate::core::config::AppConfig;
use crate::core::session::MessageKind;
use crate::core::state::{District, Upgrade};
use crate::orders::RiskPreference;

const HELP: &str = r#"# How to Play

You are a food delivery courier with **¥50,000** of debt. Ride hard and build a better life.

## Orders

- **S** orders pay the most but customers complain easily.
- **A** orders are the everyday balance.
- **D** orders pay little and rarely go wrong.

Accept an order, pick it up at the restaurant, then deliver it. Bad weather and traffic slow you down,
and rain can ruin food unless you have a rain cover.

## Customers

After a delivery the customer talks to you. Pick your reply carefully: good answers earn credit and tips,
poor ones bring complaints.

## Money

Living costs are charged every day and the monthly bill every 30 days. Stocks can be bought with up to
5x leverage, and leveraged positions are liquidated when they fall too far. The lottery is always there,
for better or worse.

## Growing

Night school courses raise your skills. With enough skill you can apply for a new career.

## Shortcuts

- `Space` pauses the clock
- `Ctrl+S` saves the game
"#;

/// Which windows are open
#[derive(Debug, Clone, Default)]
pub struct Dialogs {
    pub equipment: bool,
    pub pay_debt: bool,
    pub traffic: bool,
    pub messages: bool,
    pub delivery_settings: bool,
    pub interaction_history: bool,
    pub patterns: bool,
    pub lottery_history: bool,
    pub transactions: bool,
    pub report: bool,
    pub help: bool,
    pub about: bool,
}

fn window(
    ctx: &egui::Context,
    app: &mut DeliverySimApp,
    title: &str,
    flag: fn(&mut Dialogs) -> &mut bool,
    body: fn(&mut egui::Ui, &mut DeliverySimApp),
) {
    let mut open = *flag(&mut app.dialogs);
    if !open {
        return;
    }
    egui::Window::new(title)
        .open(&mut open)
        .resizable(true)
        .default_width(420.0)
        .show(ctx, |ui| body(ui, app));
    // The body may close its own window
    let still_open = flag(&mut app.dialogs);
    *still_open = *still_open && open;
}

impl Dialogs {
    pub fn show(ctx: &egui::Context, app: &mut DeliverySimApp) {
        window(ctx, app, "Equipment", |d| &mut d.equipment, Self::equipment);
        window(ctx, app, "Pay Debt", |d| &mut d.pay_debt, Self::pay_debt);
        window(ctx, app, "Traffic", |d| &mut d.traffic, Self::traffic);
        window(ctx, app, "Messages", |d| &mut d.messages, Self::messages);
        window(
            ctx,
            app,
            "Delivery Settings",
            |d| &mut d.delivery_settings,
            Self::delivery_settings,
        );
        window(
            ctx,
            app,
            "Conversation History",
            |d| &mut d.interaction_history,
            Self::interaction_history,
        );
        window(ctx, app, "Customer Patterns", |d| &mut d.patterns, Self::patterns);
        window(
            ctx,
            app,
            "Lottery History",
            |d| &mut d.lottery_history,
            Self::lottery_history,
        );
        window(ctx, app, "Transactions", |d| &mut d.transactions, Self::transactions);
        window(ctx, app, "Game Report", |d| &mut d.report, Self::report);
        window(ctx, app, "How to Play", |d| &mut d.help, Self::help);
        window(ctx, app, "About", |d| &mut d.about, Self::about);
    }

    fn equipment(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        let equipment = app.session.state.equipment.clone();
        ui.label(format!(
            "Battery {}% of {} capacity",
            app.session.state.battery_percent(),
            equipment.battery_capacity
        ));
        ui.label(format!("Uniform: {}", equipment.uniform));
        ui.separator();

        egui::Grid::new("upgrade_grid")
            .striped(true)
            .num_columns(3)
            .show(ui, |ui| {
                for upgrade in Upgrade::iter() {
                    ui.label(upgrade.to_string()).on_hover_text(upgrade.description());
                    ui.label(money(upgrade.price()));
                    if upgrade.is_owned(&equipment) {
                        ui.weak("Installed");
                    } else if ui.button("Buy").clicked() {
                        let result = app.session.buy_upgrade(upgrade);
                        app.handle(result, |()| format!("Installed {upgrade}"));
                    }
                    ui.end_row();
                }
            });
    }

    fn pay_debt(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        ui.label(format!(
            "Outstanding debt {}",
            money(app.session.state.finances.debt)
        ));
        ui.label(format!(
            "Available {}",
            money(app.session.state.finances.delivery_coins)
        ));
        InvestmentPanel::debt_form(ui, app);
    }

    fn traffic(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        egui::Grid::new("traffic_grid")
            .striped(true)
            .num_columns(3)
            .show(ui, |ui| {
                for district in District::ALL {
                    let level = app.session.traffic.level(district);
                    ui.label(district.to_string()).on_hover_text(district.description());
                    ui.label(level.to_string());
                    ui.weak(format!("x{:.1} travel time", level.time_multiplier()));
                    ui.end_row();
                }
            });
    }

    fn messages(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        egui::ScrollArea::vertical()
            .id_salt("message_log")
            .stick_to_bottom(true)
            .max_height(400.0)
            .show(ui, |ui| {
                for message in app.session.messages() {
                    let color = match message.kind {
                        MessageKind::System => ui.visuals().text_color(),
                        MessageKind::Platform => Color32::from_rgb(100, 160, 240),
                        MessageKind::Weather => Color32::from_rgb(120, 200, 210),
                        MessageKind::Warning => Color32::from_rgb(230, 150, 60),
                    };
                    ui.horizontal_wrapped(|ui| {
                        ui.weak(message.time.format("%m-%d %H:%M").to_string());
                        ui.colored_label(color, format!("[{}] {}", message.kind, message.text));
                    });
                }
            });
    }

    fn delivery_settings(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        let draft = &mut app.forms.delivery;
        ui.checkbox(&mut draft.auto_accept, "Auto accept orders");
        egui::Grid::new("delivery_settings_grid")
            .num_columns(2)
            .show(ui, |ui| {
                ui.label("Minimum fee");
                ui.add(
                    egui::DragValue::new(&mut draft.min_income)
                        .range(0.0..=100.0)
                        .speed(0.5)
                        .prefix("¥"),
                );
                ui.end_row();
                ui.label("Risk preference");
                egui::ComboBox::from_id_salt("risk_preference")
                    .selected_text(draft.risk.to_string())
                    .show_ui(ui, |ui| {
                        for risk in RiskPreference::iter() {
                            ui.selectable_value(&mut draft.risk, risk, risk.to_string());
                        }
                    });
                ui.end_row();
                ui.label("Max active orders");
                ui.add(egui::DragValue::new(&mut draft.max_active_orders).range(1..=5));
                ui.end_row();
            });

        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                app.apply_delivery_settings();
                app.dialogs.delivery_settings = false;
            }
            if ui.button("Cancel").clicked() {
                app.forms.delivery = app.session.settings.clone();
                app.dialogs.delivery_settings = false;
            }
        });
    }

    fn interaction_history(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        let customers = &app.session.customers;
        ui.label(format!("{} conversations", customers.history_len()));
        egui::ScrollArea::vertical()
            .id_salt("interaction_history")
            .max_height(400.0)
            .show(ui, |ui| {
                for record in customers.history(customers.history_len()).iter().rev() {
                    ui.horizontal(|ui| {
                        ui.weak(record.timestamp.format("%m-%d %H:%M").to_string());
                        ui.strong(&record.customer_name);
                        ui.label(format!("{} / {}", record.customer, record.trigger));
                        ui.colored_label(
                            change_color(f64::from(record.impact.credit)),
                            format!("credit {:+}", record.impact.credit),
                        );
                    });
                    ui.label(format!("You: {}", record.choice));
                    ui.label(format!("Customer: {}", record.response));
                    ui.separator();
                }
            });
    }

    fn patterns(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        let patterns = app.session.customers.analyze_patterns();
        if patterns.is_empty() {
            ui.weak("Talk to some customers first");
            return;
        }
        egui::Grid::new("pattern_grid")
            .striped(true)
            .num_columns(4)
            .show(ui, |ui| {
                for title in ["Customer", "Talks", "Went well", "Rate"] {
                    ui.strong(title);
                }
                ui.end_row();
                for pattern in &patterns {
                    ui.label(pattern.customer.to_string());
                    ui.label(pattern.total.to_string());
                    ui.label(pattern.positive.to_string());
                    ui.label(format!("{:.0}%", pattern.success_rate * 100.0));
                    ui.end_row();
                }
            });
    }

    fn lottery_history(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        let tickets = app.session.lottery.history();
        if tickets.is_empty() {
            ui.weak("No tickets bought yet");
            return;
        }
        egui::ScrollArea::vertical()
            .id_salt("lottery_history")
            .max_height(400.0)
            .show(ui, |ui| {
                egui::Grid::new("lottery_grid")
                    .striped(true)
                    .num_columns(4)
                    .show(ui, |ui| {
                        for ticket in tickets.iter().rev() {
                            ui.weak(ticket.timestamp.format("%m-%d %H:%M").to_string());
                            ui.label(ticket.kind.to_string());
                            let numbers: Vec<String> =
                                ticket.numbers.iter().map(u32::to_string).collect();
                            ui.label(numbers.join(" "));
                            let prize = RichText::new(money(ticket.prize));
                            if ticket.is_win() {
                                ui.colored_label(super::PROFIT, prize.strong());
                            } else {
                                ui.label(prize);
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn transactions(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        let transactions = app.session.portfolio.transactions();
        if transactions.is_empty() {
            ui.weak("No trades yet");
            return;
        }
        egui::ScrollArea::vertical()
            .id_salt("transactions")
            .max_height(400.0)
            .show(ui, |ui| {
                egui::Grid::new("transaction_grid")
                    .striped(true)
                    .num_columns(6)
                    .show(ui, |ui| {
                        for tx in transactions.iter().rev() {
                            ui.weak(tx.timestamp.format("%m-%d %H:%M").to_string());
                            ui.label(tx.kind.to_string());
                            ui.label(format!("{} x{}", tx.symbol, tx.shares));
                            ui.label(format!("{:.2} at {:.1}x", tx.price, tx.leverage));
                            ui.label(money(tx.amount));
                            ui.colored_label(change_color(tx.profit), money(tx.profit));
                            ui.end_row();
                        }
                    });
            });
    }

    fn report(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        egui::ScrollArea::vertical()
            .id_salt("report_scroll")
            .max_height(500.0)
            .show(ui, |ui| {
                CommonMarkViewer::new().show(ui, &mut app.commonmark_cache, &app.report);
            });
        if ui.button("Refresh").clicked() {
            app.report = app.session.report();
        }
    }

    fn help(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        egui::ScrollArea::vertical()
            .id_salt("help_scroll")
            .max_height(500.0)
            .show(ui, |ui| {
                CommonMarkViewer::new().show(ui, &mut app.commonmark_cache, HELP);
            });
    }

    fn about(ui: &mut egui::Ui, _app: &mut DeliverySimApp) {
        ui.vertical_centered(|ui| {
            ui.heading(AppConfig::APP_NAME);
            ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
            ui.add_space(6.0);
            ui.label("Pay off the debt one order at a time.");
        });
    }
}
