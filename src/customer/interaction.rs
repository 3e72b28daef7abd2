//! Conversations with customers after a delivery

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::dialogue::{
    AssistantDialogues, DialogueMode, DialogueOption, DialogueSource, Impact, OfflineDialogues,
    Trigger,
};
use crate::core::error::{GameError, GameResult};
use crate::core::state::{round_cents, CustomerType, District, GameState};
use crate::orders::Order;

/// A conversation waiting for the player's reply
#[derive(Debug, Clone)]
pub struct PendingInteraction {
    pub order_id: String,
    pub customer_name: String,
    pub customer: CustomerType,
    pub district: District,
    pub trigger: Trigger,
    pub context: String,
    pub options: Vec<DialogueOption>,
    replies: Vec<String>,
}

/// What happened after the player replied
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionReply {
    pub choice: String,
    pub response: String,
    pub impact: Impact,
    pub bonus_tip: f64,
    pub complaint: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: NaiveDateTime,
    pub customer_name: String,
    pub customer: CustomerType,
    pub trigger: Trigger,
    pub choice: String,
    pub response: String,
    pub impact: Impact,
}

/// Interaction counts for one customer type
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerPattern {
    pub customer: CustomerType,
    pub total: usize,
    pub positive: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInteractionSystem {
    pub mode: DialogueMode,
    history: Vec<InteractionRecord>,
    #[serde(skip)]
    pending: Option<PendingInteraction>,
    #[serde(skip)]
    offline: OfflineDialogues,
    #[serde(skip)]
    assistant: AssistantDialogues,
}

impl CustomerInteractionSystem {
    const DEFAULT_REPLY: &'static str = "OK, thanks";

    fn source(&self) -> &dyn DialogueSource {
        match self.mode {
            DialogueMode::Offline => &self.offline,
            DialogueMode::Online => &self.assistant,
        }
    }

    pub fn toggle_mode(&mut self) -> DialogueMode {
        self.mode = match self.mode {
            DialogueMode::Offline => DialogueMode::Online,
            DialogueMode::Online => DialogueMode::Offline,
        };
        self.mode
    }

    pub fn pending(&self) -> Option<&PendingInteraction> {
        self.pending.as_ref()
    }

    /// Start a conversation, offering the replies the courier qualifies for
    pub fn begin(&mut self, order: &Order, trigger: Trigger, state: &GameState) -> &PendingInteraction {
        let source = self.source();
        let (context, options, replies) = match source.dialogue(order, trigger, state) {
            Some(dialogue) => {
                let available: Vec<DialogueOption> = dialogue
                    .options
                    .iter()
                    .filter(|o| o.is_available(state))
                    .cloned()
                    .collect();
                let options = if available.is_empty() {
                    dialogue.options
                } else {
                    available
                };
                (dialogue.context, options, dialogue.replies)
            }
            None => (
                String::new(),
                vec![DialogueOption {
                    text: "Your delivery is here".to_string(),
                    impact: Impact::default(),
                    requirement: None,
                }],
                vec![Self::DEFAULT_REPLY.to_string()],
            ),
        };
        tracing::debug!(
            "Customer interaction via {} for {}",
            source.name(),
            order.order_id
        );

        self.pending.insert(PendingInteraction {
            order_id: order.order_id.clone(),
            customer_name: order.customer_name.clone(),
            customer: order.customer_type,
            district: order.delivery_district,
            trigger,
            context,
            options,
            replies,
        })
    }

    /// Reply with one of the pending options
    pub fn choose<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        index: usize,
        state: &mut GameState,
        now: NaiveDateTime,
    ) -> GameResult<InteractionReply> {
        let pending = self.pending.as_ref().ok_or(GameError::NoPendingInteraction)?;
        let option = pending.options.get(index).ok_or(GameError::InvalidOption)?.clone();
        let pending = self.pending.take().ok_or(GameError::NoPendingInteraction)?;

        let impact = option.impact;
        state.adjust_credit(impact.credit);

        let mut bonus_tip = 0.0;
        if impact.tip_chance > 0.0 && rng.gen_bool(impact.tip_chance.min(1.0)) {
            bonus_tip = round_cents(rng.gen_range(2.0..10.0));
            state.earn(bonus_tip);
            state.stats.total_tips = round_cents(state.stats.total_tips + bonus_tip);
            state.stats.today_tips = round_cents(state.stats.today_tips + bonus_tip);
            state.stats.total_earnings = round_cents(state.stats.total_earnings + bonus_tip);
            state.stats.today_earnings = round_cents(state.stats.today_earnings + bonus_tip);
        }

        let complaint =
            impact.complaint_chance > 0.0 && rng.gen_bool(impact.complaint_chance.min(1.0));
        if complaint {
            state.adjust_credit(-5);
            state.stats.complaints += 1;
        }

        let response = if pending.replies.is_empty() {
            Self::DEFAULT_REPLY.to_string()
        } else {
            pending.replies[rng.gen_range(0..pending.replies.len())].clone()
        };

        self.history.push(InteractionRecord {
            timestamp: now,
            customer_name: pending.customer_name,
            customer: pending.customer,
            trigger: pending.trigger,
            choice: option.text.clone(),
            response: response.clone(),
            impact,
        });

        Ok(InteractionReply {
            choice: option.text,
            response,
            impact,
            bonus_tip,
            complaint,
        })
    }

    /// Most recent records, oldest first
    pub fn history(&self, limit: usize) -> &[InteractionRecord] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Share of conversations per customer type that raised credit
    pub fn analyze_patterns(&self) -> Vec<CustomerPattern> {
        CustomerType::ALL
            .iter()
            .filter_map(|&customer| {
                let records: Vec<_> = self
                    .history
                    .iter()
                    .filter(|r| r.customer == customer)
                    .collect();
                if records.is_empty() {
                    return None;
                }
                let positive = records.iter().filter(|r| r.impact.credit > 0).count();
                Some(CustomerPattern {
                    customer,
                    total: records.len(),
                    positive,
                    success_rate: positive as f64 / records.len() as f64,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::GameClock;
    use crate::core::state::Weather;
    use crate::orders::{OrderGenerator, Traffic};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn order_for(customer: CustomerType) -> Order {
        let mut rng = StdRng::seed_from_u64(21);
        let mut order =
            OrderGenerator::new().generate(&mut rng, Weather::Sunny, 10, 1.0, &Traffic::default());
        order.customer_type = customer;
        order
    }

    #[test]
    fn test_begin_filters_by_skill() {
        let mut system = CustomerInteractionSystem::default();
        let state = GameState::default();
        let order = order_for(CustomerType::RichImpatient);
        let pending = system.begin(&order, Trigger::Urged, &state);
        assert_eq!(pending.options.len(), 2);

        let mut skilled = GameState::default();
        skilled.attributes.emotional_intelligence = 3;
        let pending = system.begin(&order, Trigger::Urged, &skilled);
        assert_eq!(pending.options.len(), 3);
    }

    #[test]
    fn test_missing_script_uses_default_reply() {
        let mut system = CustomerInteractionSystem::default();
        let mut state = GameState::default();
        let order = order_for(CustomerType::Vip);
        system.begin(&order, Trigger::Late, &state);

        let mut rng = StdRng::seed_from_u64(1);
        let reply = system
            .choose(&mut rng, 0, &mut state, GameClock::default().now())
            .unwrap();
        assert_eq!(reply.response, "OK, thanks");
        assert_eq!(reply.impact, Impact::default());
        assert_eq!(state.attributes.credit_score, 100);
    }

    #[test]
    fn test_choose_applies_credit_and_records() {
        let mut system = CustomerInteractionSystem::default();
        let mut state = GameState::default();
        let order = order_for(CustomerType::Normal);
        system.begin(&order, Trigger::Delivered, &state);

        let mut rng = StdRng::seed_from_u64(2);
        let now = GameClock::default().now();
        assert_eq!(
            system.choose(&mut rng, 5, &mut state, now),
            Err(GameError::InvalidOption)
        );
        assert!(system.pending().is_some());

        let reply = system.choose(&mut rng, 0, &mut state, now).unwrap();
        assert_eq!(reply.choice, "Hello, your delivery is here");
        assert_eq!(state.attributes.credit_score, 101);
        assert!(system.pending().is_none());
        assert_eq!(system.history(10).len(), 1);
        assert_eq!(
            system.choose(&mut rng, 0, &mut state, now),
            Err(GameError::NoPendingInteraction)
        );
    }

    #[test]
    fn test_certain_tip_is_paid() {
        let mut system = CustomerInteractionSystem::default();
        let mut state = GameState::default();
        state.attributes.emotional_intelligence = 4;
        let order = order_for(CustomerType::RichImpatient);
        let pending = system.begin(&order, Trigger::Delivered, &state);
        let best = pending
            .options
            .iter()
            .position(|o| o.impact.tip_chance >= 1.0)
            .unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let reply = system
            .choose(&mut rng, best, &mut state, GameClock::default().now())
            .unwrap();
        assert!(reply.bonus_tip >= 2.0);
        assert_eq!(state.coins(), round_cents(100.0 + reply.bonus_tip));
        assert_eq!(state.attributes.credit_score, 103);
    }

    #[test]
    fn test_history_limit_and_patterns() {
        let mut system = CustomerInteractionSystem::default();
        let mut state = GameState::default();
        let mut rng = StdRng::seed_from_u64(4);
        let now = GameClock::default().now();

        let normal = order_for(CustomerType::Normal);
        for _ in 0..12 {
            system.begin(&normal, Trigger::Delivered, &state);
            system.choose(&mut rng, 0, &mut state, now).unwrap();
        }
        let vip = order_for(CustomerType::Vip);
        system.begin(&vip, Trigger::Late, &state);
        system.choose(&mut rng, 0, &mut state, now).unwrap();

        assert_eq!(system.history(10).len(), 10);
        assert_eq!(system.history_len(), 13);

        let patterns = system.analyze_patterns();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].customer, CustomerType::Normal);
        assert_eq!(patterns[0].success_rate, 1.0);
        assert_eq!(patterns[1].customer, CustomerType::Vip);
        assert_eq!(patterns[1].positive, 0);
    }

    #[test]
    fn test_online_mode_uses_assistant() {
        let mut system = CustomerInteractionSystem::default();
        assert_eq!(system.toggle_mode(), DialogueMode::Online);
        let state = GameState::default();
        let order = order_for(CustomerType::ProgrammerShy);
        let pending = system.begin(&order, Trigger::Delivered, &state);
        assert_eq!(pending.options.len(), 3);
        assert!(pending.context.contains("Write three different replies"));
    }
}
