//! Main application state and UI coordination

use std::time::Duration;

use eframe::egui;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::core::config::AppConfig;
use crate::core::error::GameResult;
use crate::core::save;
use crate::core::session::GameSession;
use crate::customer::DialogueMode;
use crate::economy::{LotteryKind, LotteryTicket};
use crate::orders::DeliverySettings;
use crate::skills::{Career, CourseKind};
use crate::ui::{
    customer::CustomerPanel, dialogs::Dialogs, investment::InvestmentPanel, orders::OrdersPanel,
    skills::SkillsPanel, stats::StatsPanel, status::StatusPanel,
};

/// Main area tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, Display)]
pub enum Tab {
    #[default]
    Orders,
    Customers,
    Investment,
    Skills,
    Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, Display)]
pub enum InvestmentView {
    #[default]
    Stocks,
    Lottery,
    Expenses,
}

/// Feedback line shown in the bottom bar
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub error: bool,
}

/// Form inputs kept between frames
#[derive(Debug, Clone)]
pub struct Forms {
    pub stock_search: String,
    pub selected_stock: Option<String>,
    pub trade_shares: u32,
    pub trade_leverage: f64,
    pub lottery_kind: LotteryKind,
    /// Space separated picks, empty for a quick pick
    pub lottery_numbers: String,
    pub last_ticket: Option<LotteryTicket>,
    pub debt_amount: f64,
    pub bank_amount: f64,
    pub course: CourseKind,
    pub study_minutes: u32,
    pub career: Career,
    /// Draft edited in the delivery settings dialog
    pub delivery: DeliverySettings,
}

impl Default for Forms {
    fn default() -> Self {
        Self {
            stock_search: String::new(),
            selected_stock: None,
            trade_shares: 100,
            trade_leverage: 1.0,
            lottery_kind: LotteryKind::DoubleColorBall,
            lottery_numbers: String::new(),
            last_ticket: None,
            debt_amount: 1_000.0,
            bank_amount: 100.0,
            course: CourseKind::FirstAid,
            study_minutes: 60,
            career: Career::ServiceSupervisor,
            delivery: DeliverySettings::default(),
        }
    }
}

/// Main application state
pub struct DeliverySimApp {
    pub session: GameSession,
    /// Application configuration
    pub config: AppConfig,
    pub tab: Tab,
    pub investment_view: InvestmentView,
    pub forms: Forms,
    /// Which dialog windows are open
    pub dialogs: Dialogs,
    pub notice: Option<Notice>,
    /// Last generated game report
    pub report: String,
    /// Commonmark cache for the report and help windows
    pub commonmark_cache: egui_commonmark::CommonMarkCache,
    last_frame_time: Option<f64>,
    applied_style: Option<(bool, f32)>,
}

impl DeliverySimApp {
    const SPEEDS: [f64; 5] = [1.0, 30.0, 60.0, 120.0, 300.0];
    const MAX_FRAME_SECONDS: f64 = 1.0;

    /// Create a new application instance
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let session = Self::fresh_session(&config);

        Self {
            session,
            forms: Forms {
                delivery: config.delivery.clone(),
                ..Forms::default()
            },
            config,
            tab: Tab::default(),
            investment_view: InvestmentView::default(),
            dialogs: Dialogs::default(),
            notice: None,
            report: String::new(),
            commonmark_cache: egui_commonmark::CommonMarkCache::default(),
            last_frame_time: None,
            applied_style: None,
        }
    }

    fn fresh_session(config: &AppConfig) -> GameSession {
        let mut session = GameSession::new(&config.player_name);
        session.configure(
            config.delivery.clone(),
            config.dialogue_mode,
            config.clock_speed,
        );
        session
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            error: false,
        });
    }

    pub fn notify_error(&mut self, error: impl std::fmt::Display) {
        let text = error.to_string();
        tracing::debug!("Action refused: {}", text);
        self.notice = Some(Notice { text, error: true });
    }

    /// Show the outcome of a gameplay action
    pub fn handle<T>(&mut self, result: GameResult<T>, describe: impl FnOnce(T) -> String) {
        match result {
            Ok(value) => {
                let text = describe(value);
                self.notify(text);
            }
            Err(e) => self.notify_error(e),
        }
    }

    pub fn new_game(&mut self) {
        self.session = Self::fresh_session(&self.config);
        self.forms = Forms {
            delivery: self.config.delivery.clone(),
            ..Forms::default()
        };
        self.tab = Tab::Orders;
        tracing::info!("Started a new game for {}", self.config.player_name);
        self.notify("New game started");
    }

    pub fn save_game(&mut self) {
        let Some(path) = self.config.resolved_save_path() else {
            self.notify_error("Could not determine the save directory");
            return;
        };
        match save::save_game(&self.session, &path) {
            Ok(()) => self.notify(format!("Game saved to {}", path.display())),
            Err(e) => {
                tracing::error!("Failed to save game: {:#}", e);
                self.notify_error(format!("{e:#}"));
            }
        }
    }

    pub fn load_game(&mut self) {
        let Some(path) = self.config.resolved_save_path() else {
            self.notify_error("Could not determine the save directory");
            return;
        };
        match save::load_game(&path) {
            Ok(session) => {
                self.session = session;
                self.forms = Forms {
                    delivery: self.session.settings.clone(),
                    ..Forms::default()
                };
                self.notify(format!("Loaded {}", path.display()));
            }
            Err(e) => {
                tracing::error!("Failed to load game: {:#}", e);
                self.notify_error(format!("{e:#}"));
            }
        }
    }

    pub fn export_statistics(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("statistics.json")
            .save_file()
        else {
            return;
        };
        match save::export_statistics(&self.session.state, &path) {
            Ok(()) => self.notify(format!("Statistics exported to {}", path.display())),
            Err(e) => {
                tracing::error!("Failed to export statistics: {:#}", e);
                self.notify_error(format!("{e:#}"));
            }
        }
    }

    pub fn generate_report(&mut self) {
        self.report = self.session.report();
        self.dialogs.report = true;
    }

    pub fn apply_delivery_settings(&mut self) {
        self.session.settings = self.forms.delivery.clone();
        self.config.delivery = self.forms.delivery.clone();
        self.save_config();
        self.notify("Delivery settings saved");
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.session.clock.set_speed(speed);
        self.config.clock_speed = speed;
        self.save_config();
    }

    pub fn set_dialogue_mode(&mut self, mode: DialogueMode) {
        self.session.customers.mode = mode;
        self.config.dialogue_mode = mode;
        self.save_config();
    }

    pub fn toggle_dialogue_mode(&mut self) {
        let mode = self.session.toggle_dialogue_mode();
        self.config.dialogue_mode = mode;
        self.save_config();
        self.notify(format!("Dialogue mode: {mode}"));
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {:#}", e);
        }
    }

    fn apply_style(&mut self, ctx: &egui::Context) {
        let wanted = (self.config.ui.dark_theme, self.config.ui.zoom);
        if self.applied_style == Some(wanted) {
            return;
        }
        ctx.set_visuals(if wanted.0 {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        ctx.set_zoom_factor(wanted.1);
        self.applied_style = Some(wanted);
    }

    /// Feed real time into the game clock
    fn advance_clock(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        if let Some(last) = self.last_frame_time {
            let elapsed = (now - last).clamp(0.0, Self::MAX_FRAME_SECONDS);
            self.session.tick(elapsed);
        }
        self.last_frame_time = Some(now);
        if !self.session.clock.is_paused() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Game", |ui| {
                    if ui.button("New Game").clicked() {
                        self.new_game();
                        ui.close();
                    }
                    if ui.button("Save").clicked() {
                        self.save_game();
                        ui.close();
                    }
                    if ui.button("Load").clicked() {
                        self.load_game();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Export Statistics...").clicked() {
                        self.export_statistics();
                        ui.close();
                    }
                    if ui.button("Game Report").clicked() {
                        self.generate_report();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Settings", |ui| {
                    let mode = self.session.customers.mode;
                    for option in [DialogueMode::Offline, DialogueMode::Online] {
                        if ui
                            .selectable_label(mode == option, format!("{option} dialogue"))
                            .clicked()
                        {
                            self.set_dialogue_mode(option);
                            ui.close();
                        }
                    }
                    ui.separator();
                    if ui.button("Delivery Settings...").clicked() {
                        self.forms.delivery = self.session.settings.clone();
                        self.dialogs.delivery_settings = true;
                        ui.close();
                    }
                    ui.separator();
                    let pause_label = if self.session.clock.is_paused() {
                        "Resume"
                    } else {
                        "Pause"
                    };
                    if ui.button(pause_label).clicked() {
                        self.session.toggle_pause();
                        ui.close();
                    }
                    ui.menu_button("Game Speed", |ui| {
                        let current = self.session.clock.speed();
                        for speed in Self::SPEEDS {
                            if ui
                                .selectable_label(current == speed, format!("{speed:.0}x"))
                                .clicked()
                            {
                                self.set_speed(speed);
                                ui.close();
                            }
                        }
                    });
                    ui.separator();
                    let mut dark = self.config.ui.dark_theme;
                    if ui.checkbox(&mut dark, "Dark theme").changed() {
                        self.config.ui.dark_theme = dark;
                        self.save_config();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("How to Play").clicked() {
                        self.dialogs.help = true;
                        ui.close();
                    }
                    if ui.button("About").clicked() {
                        self.dialogs.about = true;
                        ui.close();
                    }
                });
            });
        });
    }

    fn render_tabs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for tab in Tab::iter() {
                let label = match (tab, self.session.customers.pending().is_some()) {
                    (Tab::Customers, true) => format!("{tab} \u{1F4AC}"),
                    _ => tab.to_string(),
                };
                if ui.selectable_label(self.tab == tab, label).clicked() {
                    self.tab = tab;
                }
            }
        });
        ui.separator();
    }

    fn render_bottom_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("notice_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.session.clock.full_string());
                if self.session.clock.is_paused() {
                    ui.colored_label(egui::Color32::YELLOW, "PAUSED");
                } else {
                    ui.weak(format!("{:.0}x", self.session.clock.speed()));
                }
                ui.separator();
                if let Some(notice) = &self.notice {
                    let color = if notice.error {
                        egui::Color32::from_rgb(230, 90, 80)
                    } else {
                        ui.visuals().text_color()
                    };
                    ui.colored_label(color, &notice.text);
                }
            });
        });
    }
}

impl eframe::App for DeliverySimApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_style(ctx);
        self.advance_clock(ctx);

        // Handle keyboard shortcuts
        let typing = ctx.wants_keyboard_input();
        let (save, pause) = ctx.input(|i| {
            (
                i.modifiers.ctrl && i.key_pressed(egui::Key::S),
                !typing && i.key_pressed(egui::Key::Space),
            )
        });
        if save {
            self.save_game();
        }
        if pause {
            self.session.toggle_pause();
        }

        self.render_menu_bar(ctx);
        self.render_bottom_bar(ctx);

        egui::SidePanel::left("status_panel")
            .resizable(true)
            .default_width(self.config.ui.status_width)
            .min_width(220.0)
            .show(ctx, |ui| {
                StatusPanel::show(ui, self);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_tabs(ui);
            match self.tab {
                Tab::Orders => OrdersPanel::show(ui, self),
                Tab::Customers => CustomerPanel::show(ui, self),
                Tab::Investment => InvestmentPanel::show(ui, self),
                Tab::Skills => SkillsPanel::show(ui, self),
                Tab::Statistics => StatsPanel::show(ui, self),
            }
        });

        Dialogs::show(ctx, self);
    }
}
