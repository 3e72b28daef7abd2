//! A running game: every subsystem plus the clock that drives them

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::clock::{ClockEvent, GameClock};
use super::error::{GameError, GameResult};
use super::state::{GameState, Skill, Upgrade};
use crate::customer::{CustomerInteractionSystem, DialogueMode, InteractionReply, Trigger};
use crate::economy::{
    ExpenseManager, Lottery, LotteryKind, LotteryTicket, MonthlyPayment, Portfolio, StockMarket,
};
use crate::orders::{
    DeliveryOutcome, DeliverySettings, DeliverySimulator, Order, OrderBoard, OrderGenerator,
    OrderPriority, Traffic,
};
use crate::skills::{Career, CourseKind, ExamResult, NightSchool, StudyReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum MessageKind {
    System,
    Platform,
    Weather,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub time: NaiveDateTime,
    pub kind: MessageKind,
    pub text: String,
}

/// What a finished delivery did
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReport {
    pub order: Order,
    pub outcome: DeliveryOutcome,
    pub levels_gained: u32,
    /// A customer is waiting for a reply
    pub conversation: bool,
}

fn fresh_rng() -> StdRng {
    StdRng::from_entropy()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub state: GameState,
    pub clock: GameClock,
    pub board: OrderBoard,
    pub customers: CustomerInteractionSystem,
    pub market: StockMarket,
    pub portfolio: Portfolio,
    pub lottery: Lottery,
    pub expenses: ExpenseManager,
    pub school: NightSchool,
    pub traffic: Traffic,
    pub settings: DeliverySettings,
    messages: Vec<Message>,
    /// Game minute of the last market update
    market_minute: i64,
    #[serde(skip)]
    generator: OrderGenerator,
    #[serde(skip)]
    simulator: DeliverySimulator,
    #[serde(skip, default = "fresh_rng")]
    rng: StdRng,
}

impl GameSession {
    const MESSAGE_LIMIT: usize = 200;
    const LOW_CREDIT: i32 = 80;
    const HIGH_DEBT: f64 = 40_000.0;
    const TIRED: u32 = 80;

    pub fn new(player_name: &str) -> Self {
        Self::with_rng(player_name, fresh_rng())
    }

    /// Reproducible session for tests and replays
    pub fn with_seed(player_name: &str, seed: u64) -> Self {
        Self::with_rng(player_name, StdRng::seed_from_u64(seed))
    }

    fn with_rng(player_name: &str, mut rng: StdRng) -> Self {
        let market = StockMarket::new(&mut rng);
        let mut traffic = Traffic::default();
        traffic.reroll(&mut rng);
        let mut session = Self {
            state: GameState::new(player_name),
            clock: GameClock::default(),
            board: OrderBoard::default(),
            customers: CustomerInteractionSystem::default(),
            market,
            portfolio: Portfolio::default(),
            lottery: Lottery::default(),
            expenses: ExpenseManager::default(),
            school: NightSchool::default(),
            traffic,
            settings: DeliverySettings::default(),
            messages: Vec::new(),
            market_minute: 0,
            generator: OrderGenerator::new(),
            simulator: DeliverySimulator::new(),
            rng,
        };
        session.push_message(
            MessageKind::System,
            format!("Welcome to the food delivery simulator, {player_name}!"),
        );
        session.refresh_orders();
        session
    }

    pub fn configure(&mut self, settings: DeliverySettings, mode: DialogueMode, speed: f64) {
        self.settings = settings;
        self.customers.mode = mode;
        self.clock.set_speed(speed);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn push_message(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.messages.push(Message {
            time: self.clock.now(),
            kind,
            text: text.into(),
        });
        if self.messages.len() > Self::MESSAGE_LIMIT {
            let excess = self.messages.len() - Self::MESSAGE_LIMIT;
            self.messages.drain(..excess);
        }
    }

    /// Advance by elapsed real time
    pub fn tick(&mut self, real_seconds: f64) {
        let events = self.clock.tick(real_seconds);
        self.handle_events(events);
    }

    /// Advance for an activity that takes game time
    fn spend_minutes(&mut self, minutes: u32) {
        let events = self.clock.advance_minutes(minutes);
        self.handle_events(events);
    }

    fn handle_events(&mut self, events: Vec<ClockEvent>) {
        for event in events {
            match event {
                ClockEvent::HourChanged(hour) => self.on_hour(hour),
                ClockEvent::NewDay(day) => self.on_new_day(day),
            }
        }
        self.update_market();
    }

    fn on_hour(&mut self, hour: u32) {
        let weather = self.state.weather.reroll(&mut self.rng);
        if weather != self.state.weather {
            self.state.weather = weather;
            self.push_message(
                MessageKind::Weather,
                format!("Weather changed to {weather}, ride safely"),
            );
        }
        self.traffic.reroll(&mut self.rng);

        if self.state.fatigue_level > Self::TIRED {
            self.state.attributes.drain_stamina(2);
        }
        tracing::debug!("Hour {} started", hour);
        self.auto_accept();
    }

    fn on_new_day(&mut self, day: u32) {
        if let Some(career) = self.state.career {
            let income = career.income().daily(&mut self.rng);
            self.state.earn(income);
            self.push_message(
                MessageKind::System,
                format!("{career} income: ¥{income:.2}"),
            );
        }

        let cost = ExpenseManager::daily_cost(&mut self.rng);
        if ExpenseManager::charge_daily(&mut self.state, cost) {
            self.push_message(
                MessageKind::System,
                format!("Day {day}: daily living costs ¥{cost:.2}"),
            );
        } else {
            self.push_message(
                MessageKind::Warning,
                format!("Day {day}: could not cover living costs of ¥{cost:.2}, credit -2"),
            );
        }

        self.state.stats.roll_day();

        if self.expenses.is_due(day) {
            if let Ok(payment) = self.expenses.pay_monthly(&mut self.rng, &mut self.state, day) {
                self.push_payment(&payment);
            }
        }

        if self.state.attributes.credit_score < Self::LOW_CREDIT {
            self.push_message(
                MessageKind::Warning,
                "Credit score is low, mind your service quality",
            );
        }
        if self.state.finances.debt > Self::HIGH_DEBT {
            self.push_message(
                MessageKind::Warning,
                "Debt is high, keep paying it down",
            );
        }
        tracing::info!("Day {} started", day);
    }

    fn update_market(&mut self) {
        let elapsed = self.clock.elapsed_minutes();
        let step = StockMarket::UPDATE_MINUTES as i64;
        if elapsed - self.market_minute < step {
            return;
        }
        self.market_minute = elapsed - (elapsed - self.market_minute) % step;

        if self.market.update(&mut self.rng, self.clock.hour()) {
            let now = self.clock.now();
            let liquidated = self
                .portfolio
                .update_prices(&self.market, &mut self.state, now);
            for symbol in liquidated {
                self.push_message(
                    MessageKind::Warning,
                    format!("Leveraged position in {symbol} was liquidated"),
                );
            }
        }
    }

    fn push_payment(&mut self, payment: &MonthlyPayment) {
        if let Some((old, new)) = payment.rent_increase {
            self.push_message(
                MessageKind::Warning,
                format!("Rent went up from ¥{old:.2} to ¥{new:.2}"),
            );
        }
        if payment.paid {
            self.push_message(
                MessageKind::System,
                format!("Monthly bill of ¥{:.2} paid", payment.total),
            );
        } else if payment.credit_penalty > 0 {
            self.push_message(
                MessageKind::Warning,
                format!(
                    "Could not pay the monthly bill of ¥{:.2}, credit -{}",
                    payment.total, payment.credit_penalty
                ),
            );
        } else {
            self.push_message(
                MessageKind::Warning,
                format!("Monthly bill of ¥{:.2} is still overdue", payment.total),
            );
        }
    }

    pub fn toggle_pause(&mut self) {
        self.clock.toggle_pause();
    }

    pub fn toggle_dialogue_mode(&mut self) -> DialogueMode {
        self.customers.toggle_mode()
    }

    // Orders

    pub fn refresh_orders(&mut self) {
        let hour = self.clock.hour();
        let modifier = self.clock.delivery_time_modifier();
        self.board.refresh(
            &mut self.rng,
            &self.generator,
            self.state.weather,
            hour,
            modifier,
            &self.traffic,
        );
        let count = self.board.available().len();
        self.push_message(
            MessageKind::Platform,
            format!("{count} new orders are waiting for a courier"),
        );
        self.auto_accept();
    }

    fn auto_accept(&mut self) {
        if let Some(id) = self
            .board
            .auto_accept(&self.settings, self.state.attributes.stamina)
        {
            if let Some(order) = self.board.find(&id) {
                let priority = order.priority;
                let text = format!("Auto accepted order {}", order.short_id());
                self.count_order(priority);
                self.push_message(MessageKind::Platform, text);
            }
        }
    }

    fn count_order(&mut self, priority: OrderPriority) {
        let stats = &mut self.state.stats;
        stats.total_orders += 1;
        match priority {
            OrderPriority::S => stats.s_orders += 1,
            OrderPriority::A => stats.a_orders += 1,
            OrderPriority::D => stats.d_orders += 1,
        }
    }

    pub fn select_order(&mut self, id: &str) {
        self.board.select(id);
    }

    pub fn reject_order(&mut self, id: &str) -> GameResult<Order> {
        let order = self.board.reject(id)?;
        tracing::debug!("Rejected order {}", order.order_id);
        Ok(order)
    }

    pub fn accept_order(&mut self, id: &str) -> GameResult<Order> {
        let order = self
            .board
            .accept(id, self.state.attributes.stamina, self.settings.max_active_orders)?
            .clone();
        self.count_order(order.priority);
        tracing::debug!("Accepted order {}", order.order_id);
        Ok(order)
    }

    pub fn pick_up_order(&mut self, id: &str) -> GameResult<Order> {
        let order = self.board.pick_up(id)?.clone();
        self.state.current_location = order.pickup_district;
        Ok(order)
    }

    /// Ride the order to the customer and open the conversation
    pub fn deliver_order(&mut self, id: &str) -> GameResult<DeliveryReport> {
        let order = self.board.take_for_delivery(id)?;
        let outcome = self.simulator.simulate(&mut self.rng, &order, &self.state);
        let levels_gained = outcome.apply(&order, &mut self.state);
        self.spend_minutes(outcome.minutes);

        for event in &outcome.events {
            let text = event.description();
            self.push_message(MessageKind::Platform, text);
        }
        if levels_gained > 0 {
            let level = self.state.attributes.level;
            tracing::info!("Reached level {}", level);
            self.push_message(MessageKind::System, format!("Level up! Now level {level}"));
        }

        let conversation = outcome.success;
        if outcome.success {
            let trigger = Trigger::after_delivery(order.customer_type, outcome.late);
            self.customers.begin(&order, trigger, &self.state);
            self.push_message(
                MessageKind::Platform,
                format!(
                    "Order {} delivered, earned ¥{:.2}",
                    order.short_id(),
                    outcome.earnings
                ),
            );
        } else {
            self.push_message(
                MessageKind::Warning,
                format!("Order {} failed", order.short_id()),
            );
        }

        Ok(DeliveryReport {
            order,
            outcome,
            levels_gained,
            conversation,
        })
    }

    pub fn choose_reply(&mut self, index: usize) -> GameResult<InteractionReply> {
        let now = self.clock.now();
        let reply = self
            .customers
            .choose(&mut self.rng, index, &mut self.state, now)?;
        if reply.complaint {
            self.push_message(MessageKind::Warning, "The customer filed a complaint, credit -5");
        }
        Ok(reply)
    }

    // Investment

    pub fn buy_stock(&mut self, symbol: &str, shares: u32, leverage: f64) -> GameResult<()> {
        let price = self
            .market
            .get(symbol)
            .map(|s| s.price)
            .ok_or_else(|| GameError::UnknownStock(symbol.to_string()))?;
        let now = self.clock.now();
        self.portfolio
            .buy(&mut self.state, symbol, shares, price, leverage, now)
    }

    /// Sell at the market price, returning the realized profit
    pub fn sell_stock(&mut self, symbol: &str, shares: u32) -> GameResult<f64> {
        let price = self
            .market
            .get(symbol)
            .map(|s| s.price)
            .ok_or_else(|| GameError::UnknownStock(symbol.to_string()))?;
        let now = self.clock.now();
        self.portfolio
            .sell(&mut self.state, symbol, shares, price, now)
    }

    pub fn buy_lottery(
        &mut self,
        kind: LotteryKind,
        numbers: Option<Vec<u32>>,
    ) -> GameResult<LotteryTicket> {
        let now = self.clock.now();
        let ticket = self
            .lottery
            .buy(&mut self.rng, &mut self.state, kind, numbers, now)?
            .clone();
        if ticket.prize >= 1_000.0 {
            self.push_message(
                MessageKind::System,
                format!("Big win! {} paid ¥{:.2}", kind, ticket.prize),
            );
        }
        Ok(ticket)
    }

    pub fn pay_monthly(&mut self) -> GameResult<MonthlyPayment> {
        let day = self.clock.day();
        let payment = self
            .expenses
            .pay_monthly(&mut self.rng, &mut self.state, day)?;
        self.push_payment(&payment);
        Ok(payment)
    }

    pub fn buy_insurance(&mut self) -> GameResult<()> {
        self.state.buy_insurance()
    }

    pub fn pay_debt(&mut self, amount: f64) -> GameResult<f64> {
        let paid = self.state.pay_debt(amount)?;
        tracing::info!("Paid ¥{:.2} of debt", paid);
        Ok(paid)
    }

    pub fn deposit(&mut self, amount: f64) -> GameResult<()> {
        self.state.deposit(amount)
    }

    pub fn withdraw(&mut self, amount: f64) -> GameResult<()> {
        self.state.withdraw(amount)
    }

    // Player

    pub fn buy_upgrade(&mut self, upgrade: Upgrade) -> GameResult<()> {
        self.state.buy_upgrade(upgrade)
    }

    /// Rest for an hour of game time
    pub fn rest(&mut self) -> GameResult<()> {
        self.state.rest()?;
        self.spend_minutes(GameState::REST_MINUTES);
        Ok(())
    }

    pub fn enroll(&mut self, course: CourseKind) -> GameResult<()> {
        self.school.enroll(course, &mut self.state)
    }

    pub fn study(&mut self, course: CourseKind, minutes: u32) -> GameResult<StudyReport> {
        let now = self.clock.now();
        let report = self.school.study(course, minutes, &mut self.state, now)?;
        self.spend_minutes(report.minutes);
        if report.levels_gained > 0 {
            let level = self.state.attributes.level;
            self.push_message(MessageKind::System, format!("Level up! Now level {level}"));
        }
        Ok(report)
    }

    pub fn take_exam(&mut self, course: CourseKind) -> GameResult<ExamResult> {
        let result = self.school.take_exam(&mut self.rng, course, &mut self.state)?;
        if result.passed {
            self.push_message(
                MessageKind::System,
                format!("Passed the {} exam", course.course().name),
            );
        }
        Ok(result)
    }

    pub fn attempt_career(&mut self, career: Career) -> GameResult<bool> {
        let success = career.attempt(&mut self.rng, &mut self.state)?;
        if success {
            self.push_message(MessageKind::System, format!("Started a new career as {career}"));
        }
        Ok(success)
    }

    /// Markdown summary of the whole game
    pub fn report(&self) -> String {
        let state = &self.state;
        let attrs = &state.attributes;
        let stats = &state.stats;
        let mut out = String::new();

        let _ = writeln!(out, "# Game Report\n");
        let _ = writeln!(out, "## Player\n");
        let _ = writeln!(out, "- Name: {}", state.player_name);
        let _ = writeln!(out, "- Level: {}", attrs.level);
        let _ = writeln!(
            out,
            "- Experience: {}/{}",
            attrs.experience,
            crate::core::state::PlayerAttributes::EXPERIENCE_PER_LEVEL
        );
        let _ = writeln!(out, "- Credit score: {}", attrs.credit_score);
        if let Some(career) = state.career {
            let _ = writeln!(out, "- Career: {career}");
        }

        let _ = writeln!(out, "\n## Finances\n");
        let _ = writeln!(out, "- Delivery coins: ¥{:.2}", state.finances.delivery_coins);
        let _ = writeln!(out, "- Savings: ¥{:.2}", state.finances.savings);
        let _ = writeln!(out, "- Debt: ¥{:.2}", state.finances.debt);

        let _ = writeln!(out, "\n## Deliveries\n");
        let _ = writeln!(out, "- Total orders: {}", stats.total_orders);
        let _ = writeln!(out, "- Successful: {}", stats.successful_deliveries);
        let _ = writeln!(out, "- Success rate: {:.1}%", stats.success_rate() * 100.0);
        let _ = writeln!(out, "- Total earnings: ¥{:.2}", stats.total_earnings);
        let _ = writeln!(out, "- Total tips: ¥{:.2}", stats.total_tips);
        let _ = writeln!(out, "- Five star ratings: {}", stats.five_star_ratings);
        let _ = writeln!(out, "- Complaints: {}", stats.complaints);
        let _ = writeln!(out, "- Complaint rate: {:.1}%", stats.complaint_rate() * 100.0);

        let _ = writeln!(out, "\n## Skills\n");
        for skill in [
            Skill::DirectionSense,
            Skill::EmotionalIntelligence,
            Skill::EducationLevel,
        ] {
            let _ = writeln!(out, "- {}: level {}", skill, attrs.skill(skill));
        }

        let _ = writeln!(out, "\n## Status\n");
        let _ = writeln!(out, "- Stamina: {}/100", attrs.stamina);
        let _ = writeln!(out, "- Fatigue: {}%", state.fatigue_level);
        let _ = writeln!(out, "- Location: {}", state.current_location);
        let _ = writeln!(out, "- Weather: {}", state.weather);
        let _ = writeln!(out, "- Time: {}", self.clock.full_string());

        let _ = writeln!(out, "\n## Investments\n");
        let _ = writeln!(out, "- Positions: {}", self.portfolio.positions().len());
        let _ = writeln!(out, "- Portfolio value: ¥{:.2}", self.portfolio.value());
        let _ = writeln!(out, "- Total profit/loss: ¥{:.2}", self.portfolio.total_profit_loss());
        let _ = writeln!(
            out,
            "- Lottery: spent ¥{:.2}, won ¥{:.2}",
            self.lottery.total_spent(),
            self.lottery.total_won()
        );
        out
    }
}
