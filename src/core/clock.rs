//! Simulated game clock

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Calendar event crossed while the clock advanced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// A new hour started
    HourChanged(u32),
    /// A new game day started
    NewDay(u32),
}

/// Period of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TimeOfDay {
    Dawn,
    Morning,
    Noon,
    Afternoon,
    Evening,
    Night,
    Midnight,
}

impl TimeOfDay {
    /// Travel time multiplier for deliveries in this period
    pub fn delivery_modifier(self) -> f64 {
        match self {
            Self::Dawn => 0.8,
            Self::Morning => 1.2,
            Self::Noon => 1.5,
            Self::Afternoon => 1.0,
            Self::Evening => 1.3,
            Self::Night => 0.9,
            Self::Midnight => 0.7,
        }
    }
}

/// Game clock running faster than real time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    start: NaiveDateTime,
    now: NaiveDateTime,
    day: u32,
    /// Game seconds per real second
    speed: f64,
    paused: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(9, 0)
    }
}

impl GameClock {
    /// Default speed: one real second is one game minute
    pub const DEFAULT_SPEED: f64 = 60.0;

    /// Create a clock on day 1 at the given time
    pub fn new(hour: u32, minute: u32) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap_or_default();
        Self {
            start,
            now: start,
            day: 1,
            speed: Self::DEFAULT_SPEED,
            paused: false,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn hour(&self) -> u32 {
        self.now.hour()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Minutes elapsed since the game started
    pub fn elapsed_minutes(&self) -> i64 {
        (self.now - self.start).num_minutes()
    }

    /// Set the time speed multiplier
    pub fn set_speed(&mut self, multiplier: f64) {
        self.speed = multiplier.max(0.0);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Advance by elapsed real time
    pub fn tick(&mut self, real_seconds: f64) -> Vec<ClockEvent> {
        if self.paused || real_seconds <= 0.0 {
            return Vec::new();
        }
        let millis = (real_seconds * self.speed * 1000.0) as i64;
        self.advance(Duration::milliseconds(millis))
    }

    /// Advance for an activity such as a delivery or a study session
    pub fn advance_minutes(&mut self, minutes: u32) -> Vec<ClockEvent> {
        self.advance(Duration::minutes(i64::from(minutes)))
    }

    fn advance(&mut self, by: Duration) -> Vec<ClockEvent> {
        let old = self.now;
        self.now = old + by;

        // First hour boundary strictly after `old`
        let into_hour = Duration::seconds(i64::from(old.minute() * 60 + old.second()))
            + Duration::nanoseconds(i64::from(old.nanosecond()));
        let mut boundary = old - into_hour + Duration::hours(1);

        let mut events = Vec::new();
        while boundary <= self.now {
            let hour = boundary.hour();
            events.push(ClockEvent::HourChanged(hour));
            if hour == 0 {
                self.day += 1;
                events.push(ClockEvent::NewDay(self.day));
            }
            boundary += Duration::hours(1);
        }
        events
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        match self.hour() {
            5..=6 => TimeOfDay::Dawn,
            7..=10 => TimeOfDay::Morning,
            11..=12 => TimeOfDay::Noon,
            13..=16 => TimeOfDay::Afternoon,
            17..=18 => TimeOfDay::Evening,
            19..=22 => TimeOfDay::Night,
            _ => TimeOfDay::Midnight,
        }
    }

    /// Morning, lunch and dinner rush
    pub fn is_peak_hour(&self) -> bool {
        matches!(self.hour(), 7..=9 | 11..=13 | 17..=19)
    }

    pub fn is_late_night(&self) -> bool {
        let hour = self.hour();
        hour >= 22 || hour <= 5
    }

    pub fn delivery_time_modifier(&self) -> f64 {
        self.time_of_day().delivery_modifier()
    }

    /// `HH:MM`
    pub fn formatted_time(&self) -> String {
        self.now.format("%H:%M").to_string()
    }

    /// `Day N`
    pub fn formatted_date(&self) -> String {
        format!("Day {}", self.day)
    }

    /// `Day N HH:MM (Period)`
    pub fn full_string(&self) -> String {
        format!(
            "{} {} ({})",
            self.formatted_date(),
            self.formatted_time(),
            self.time_of_day()
        )
    }
}
