//! Stocks, lottery and household bills

use eframe::egui::{self, RichText};
use egui_extras::{Column, TableBuilder};
use strum::IntoEnumIterator;

use super::charts::{self, Slice, PALETTE};
use super::{change_color, money};
use crate::app::{DeliverySimApp, InvestmentView};
use crate::core::error::GameError;
use crate::core::state::GameState;
use crate::economy::{Lottery, LotteryKind, Portfolio, Stock, StockMarket};

/// Investment panel
pub struct InvestmentPanel;

impl InvestmentPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        ui.horizontal(|ui| {
            for view in InvestmentView::iter() {
                if ui
                    .selectable_label(app.investment_view == view, view.to_string())
                    .clicked()
                {
                    app.investment_view = view;
                }
            }
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("investment_scroll")
            .show(ui, |ui| match app.investment_view {
                InvestmentView::Stocks => Self::stocks(ui, app),
                InvestmentView::Lottery => Self::lottery(ui, app),
                InvestmentView::Expenses => Self::expenses(ui, app),
            });
    }

    fn stocks(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        ui.horizontal(|ui| {
            ui.heading("Stock Market");
            let open = StockMarket::is_trading_hour(app.session.clock.hour());
            if open {
                ui.colored_label(super::LOSS, "Open");
            } else {
                ui.weak(format!(
                    "Closed, trading {:02}:00-{:02}:00",
                    StockMarket::OPEN_HOUR,
                    StockMarket::CLOSE_HOUR
                ));
            }
        });
        ui.add(
            egui::TextEdit::singleline(&mut app.forms.stock_search)
                .hint_text("Search symbol or name"),
        );

        let keyword = app.forms.stock_search.trim();
        let stocks: Vec<&Stock> = if keyword.is_empty() {
            app.session.market.all().iter().collect()
        } else {
            app.session.market.search(keyword)
        };
        let mut picked = None;
        Self::stock_table(ui, &stocks, app.forms.selected_stock.as_deref(), &mut picked);
        if let Some(symbol) = picked {
            app.forms.selected_stock = Some(symbol);
        }

        ui.add_space(8.0);
        Self::trade_form(ui, app);
        ui.add_space(8.0);
        Self::positions(ui, app);
    }

    fn stock_table(
        ui: &mut egui::Ui,
        stocks: &[&Stock],
        selected: Option<&str>,
        picked: &mut Option<String>,
    ) {
        ui.push_id("stock_table", |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::auto().at_least(70.0))
                .column(Column::remainder().at_least(120.0))
                .column(Column::auto().at_least(70.0))
                .column(Column::auto().at_least(70.0))
                .column(Column::auto().at_least(70.0))
                .column(Column::auto())
                .max_scroll_height(240.0)
                .header(20.0, |mut header| {
                    for title in ["Symbol", "Name", "Sector", "Price", "Change", "Volume"] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    for stock in stocks {
                        body.row(20.0, |mut row| {
                            let is_selected = selected == Some(stock.symbol.as_str());
                            row.set_selected(is_selected);
                            row.col(|ui| {
                                if ui.selectable_label(is_selected, &stock.symbol).clicked() {
                                    *picked = Some(stock.symbol.clone());
                                }
                            });
                            row.col(|ui| {
                                ui.label(&stock.name);
                            });
                            row.col(|ui| {
                                ui.label(stock.sector.to_string());
                            });
                            row.col(|ui| {
                                ui.label(format!("{:.2}", stock.price));
                            });
                            row.col(|ui| {
                                ui.colored_label(
                                    change_color(stock.change_percent),
                                    format!("{:+.2}%", stock.change_percent),
                                );
                            });
                            row.col(|ui| {
                                ui.label(stock.volume.to_string());
                            });
                        });
                    }
                });
        });
    }

    fn trade_form(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        let Some(stock) = app
            .forms
            .selected_stock
            .as_deref()
            .and_then(|symbol| app.session.market.get(symbol))
            .cloned()
        else {
            ui.weak("Select a stock to trade");
            return;
        };

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.strong(format!("{} {}", stock.symbol, stock.name));
                ui.label(format!("{:.2}", stock.price));
                ui.colored_label(
                    change_color(stock.change_percent),
                    format!("{:+.2}%", stock.change_percent),
                );
                ui.weak(format!("Cap {:.0}", stock.market_cap));
            });
            charts::line_chart(ui, &stock.history, 120.0, change_color(stock.change_percent));

            ui.horizontal(|ui| {
                ui.label("Shares");
                ui.add(
                    egui::DragValue::new(&mut app.forms.trade_shares)
                        .range(1..=100_000)
                        .speed(10),
                );
                ui.label("Leverage");
                ui.add(
                    egui::DragValue::new(&mut app.forms.trade_leverage)
                        .range(1.0..=Portfolio::MAX_LEVERAGE)
                        .speed(0.1)
                        .fixed_decimals(1)
                        .suffix("x"),
                );
            });
            let shares = app.forms.trade_shares;
            let leverage = app.forms.trade_leverage;
            let margin = f64::from(shares) * stock.price / leverage;
            ui.label(format!(
                "Margin needed {} for exposure {}",
                money(margin),
                money(f64::from(shares) * stock.price)
            ));
            if leverage > 1.0 {
                ui.weak(format!(
                    "Liquidated if equity falls below {:.0}% of margin",
                    Portfolio::LIQUIDATION_THRESHOLD * 100.0
                ));
            }

            ui.horizontal(|ui| {
                if ui.button("Buy").clicked() {
                    let result = app.session.buy_stock(&stock.symbol, shares, leverage);
                    app.handle(result, |()| {
                        format!("Bought {shares} shares of {} at {:.2}", stock.name, stock.price)
                    });
                }
                if ui.button("Sell").clicked() {
                    let result = app.session.sell_stock(&stock.symbol, shares);
                    app.handle(result, |profit| {
                        format!("Sold {shares} shares of {}, profit {}", stock.name, money(profit))
                    });
                }
            });
        });
    }

    fn positions(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        let portfolio = &app.session.portfolio;
        ui.horizontal(|ui| {
            ui.strong("Positions");
            ui.label(format!("Value {}", money(portfolio.value())));
            let pnl = portfolio.total_profit_loss();
            ui.colored_label(change_color(pnl), format!("P/L {}", money(pnl)));
            if ui.button("Transactions").clicked() {
                app.dialogs.transactions = true;
            }
        });

        let positions = app.session.portfolio.positions();
        if positions.is_empty() {
            ui.weak("No open positions");
            return;
        }
        egui::Grid::new("positions_grid")
            .striped(true)
            .num_columns(7)
            .show(ui, |ui| {
                for title in ["Symbol", "Shares", "Avg cost", "Price", "Leverage", "P/L", "Equity"] {
                    ui.strong(title);
                }
                ui.end_row();
                for position in positions {
                    ui.label(&position.symbol);
                    ui.label(position.shares.to_string());
                    ui.label(format!("{:.2}", position.avg_cost));
                    ui.label(format!("{:.2}", position.current_price));
                    ui.label(format!("{:.1}x", position.leverage));
                    let pnl = position.profit_loss();
                    ui.colored_label(
                        change_color(pnl),
                        format!("{} ({:+.1}%)", money(pnl), position.profit_loss_percent()),
                    );
                    ui.label(money(position.equity()));
                    ui.end_row();
                }
            });
    }

    fn lottery(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        ui.heading("Lottery");
        let kind = app.forms.lottery_kind;
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt("lottery_kind")
                .selected_text(kind.to_string())
                .show_ui(ui, |ui| {
                    for option in LotteryKind::iter() {
                        ui.selectable_value(&mut app.forms.lottery_kind, option, option.to_string());
                    }
                });
            ui.label(format!("{} per ticket", money(kind.price())));
        });
        ui.weak(kind.rules());

        if kind != LotteryKind::ScratchCard {
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut app.forms.lottery_numbers)
                        .hint_text("Your numbers, or leave empty for a quick pick"),
                );
                if ui.button("Random").clicked() {
                    let numbers = Lottery::quick_pick(&mut rand::thread_rng(), kind);
                    app.forms.lottery_numbers = numbers
                        .iter()
                        .map(u32::to_string)
                        .collect::<Vec<_>>()
                        .join(" ");
                }
            });
        }

        if ui.button("Buy Ticket").clicked() {
            match Self::parse_numbers(&app.forms.lottery_numbers) {
                Ok(numbers) => {
                    let result = app.session.buy_lottery(kind, numbers);
                    if let Ok(ticket) = &result {
                        app.forms.last_ticket = Some(ticket.clone());
                    }
                    app.handle(result, |ticket| {
                        if ticket.is_win() {
                            format!("Won {} on {}!", money(ticket.prize), ticket.kind)
                        } else {
                            format!("No luck with this {}", ticket.kind)
                        }
                    });
                }
                Err(e) => app.notify_error(e),
            }
        }

        if let Some(ticket) = &app.forms.last_ticket {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.strong(format!("Last ticket: {}", ticket.kind));
                if !ticket.numbers.is_empty() {
                    ui.label(format!("Your numbers: {}", join(&ticket.numbers)));
                    ui.label(format!("Drawn: {}", join(&ticket.winning_numbers)));
                    ui.label(format!(
                        "Matched {} + {}",
                        ticket.matches.0, ticket.matches.1
                    ));
                }
                let prize = RichText::new(format!("Prize {}", money(ticket.prize)));
                if ticket.is_win() {
                    ui.colored_label(super::PROFIT, prize.strong());
                } else {
                    ui.label(prize);
                }
            });
        }

        ui.add_space(8.0);
        let lottery = &app.session.lottery;
        ui.label(format!(
            "Spent {}  Won {}  Losing streak {}",
            money(lottery.total_spent()),
            money(lottery.total_won()),
            lottery.consecutive_losses()
        ));
        if ui.button("Ticket History").clicked() {
            app.dialogs.lottery_history = true;
        }
    }

    /// Empty input means a quick pick
    fn parse_numbers(input: &str) -> Result<Option<Vec<u32>>, GameError> {
        let parts: Vec<&str> = input
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            return Ok(None);
        }
        parts
            .iter()
            .map(|p| {
                p.parse::<u32>()
                    .map_err(|_| GameError::InvalidLotteryNumbers(format!("'{p}' is not a number")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn expenses(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        ui.heading("Monthly Expenses");
        let breakdown = app.session.expenses.breakdown();
        ui.horizontal_top(|ui| {
            egui::Grid::new("expense_grid")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui| {
                    for (name, amount) in &breakdown {
                        ui.label(*name);
                        ui.label(money(*amount));
                        ui.end_row();
                    }
                });
            ui.add_space(20.0);
            let slices: Vec<Slice> = breakdown
                .iter()
                .filter(|(name, _)| *name != "Total")
                .zip(PALETTE)
                .map(|((name, amount), color)| Slice {
                    label: name.to_string(),
                    value: *amount,
                    color,
                })
                .collect();
            charts::pie_chart(ui, &slices, 80.0);
        });

        let day = app.session.clock.day();
        ui.label(format!(
            "Next bill in {} days",
            app.session.expenses.days_until_due(day)
        ));
        if ui.button("Pay Monthly Bill").clicked() {
            let result = app.session.pay_monthly();
            app.handle(result, |payment| {
                if payment.paid {
                    format!("Paid the monthly bill of {}", money(payment.total))
                } else {
                    format!("Could not pay the monthly bill of {}", money(payment.total))
                }
            });
        }

        ui.separator();
        ui.strong("Insurance");
        if app.session.state.finances.medical_insurance {
            ui.label("Medical insurance is active");
        } else if ui
            .button(format!(
                "Buy Medical Insurance ({})",
                money(GameState::INSURANCE_COST)
            ))
            .clicked()
        {
            let result = app.session.buy_insurance();
            app.handle(result, |()| "Medical insurance bought".to_string());
        }

        ui.separator();
        ui.strong("Debt");
        ui.label(format!("Outstanding {}", money(app.session.state.finances.debt)));
        Self::debt_form(ui, app);

        ui.separator();
        ui.strong("Savings");
        ui.label(format!("Balance {}", money(app.session.state.finances.savings)));
        ui.horizontal(|ui| {
            ui.add(
                egui::DragValue::new(&mut app.forms.bank_amount)
                    .range(0.0..=1_000_000.0)
                    .speed(10.0)
                    .prefix("¥"),
            );
            let amount = app.forms.bank_amount;
            if ui.button("Deposit").clicked() {
                let result = app.session.deposit(amount);
                app.handle(result, |()| format!("Deposited {}", money(amount)));
            }
            if ui.button("Withdraw").clicked() {
                let result = app.session.withdraw(amount);
                app.handle(result, |()| format!("Withdrew {}", money(amount)));
            }
        });
    }

    /// Amount field and pay button, shared with the pay debt dialog
    pub fn debt_form(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        ui.horizontal(|ui| {
            ui.add(
                egui::DragValue::new(&mut app.forms.debt_amount)
                    .range(0.0..=1_000_000.0)
                    .speed(50.0)
                    .prefix("¥"),
            );
            if ui.button("Pay Debt").clicked() {
                let result = app.session.pay_debt(app.forms.debt_amount);
                app.handle(result, |paid| format!("Paid {} of debt", money(paid)));
            }
        });
    }
}

fn join(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
