//! Customer dialogue scripts
//!
//! A [`DialogueSource`] supplies the replies a courier can give a customer
//! in a situation. The offline source is a fixed script; the assistant
//! source builds the prompt for a language model and answers from a
//! built-in table.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::core::state::{CustomerType, GameState, Skill};
use crate::orders::Order;

/// Situation that starts a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Trigger {
    /// Delivered on time
    Delivered,
    /// Delivered late
    Late,
    /// Customer is chasing the order
    Urged,
}

impl Trigger {
    /// Conversation that follows a delivery
    pub fn after_delivery(customer: CustomerType, late: bool) -> Self {
        match (late, customer) {
            (false, _) => Self::Delivered,
            (true, CustomerType::RichImpatient) => Self::Urged,
            (true, _) => Self::Late,
        }
    }
}

/// Effect of a reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub credit: i32,
    pub tip_chance: f64,
    pub complaint_chance: f64,
}

impl Impact {
    pub fn credit(credit: i32) -> Self {
        Self {
            credit,
            tip_chance: 0.0,
            complaint_chance: 0.0,
        }
    }

    pub fn with_tip(mut self, chance: f64) -> Self {
        self.tip_chance = chance;
        self
    }

    pub fn with_complaint(mut self, chance: f64) -> Self {
        self.complaint_chance = chance;
        self
    }

    pub fn summary(&self) -> String {
        let mut parts = vec![format!("credit {:+}", self.credit)];
        if self.tip_chance != 0.0 {
            parts.push(format!("tip chance {:.0}%", self.tip_chance * 100.0));
        }
        if self.complaint_chance != 0.0 {
            parts.push(format!("complaint chance {:+.0}%", self.complaint_chance * 100.0));
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueOption {
    pub text: String,
    pub impact: Impact,
    /// Minimum skill level needed to say this
    pub requirement: Option<(Skill, u32)>,
}

impl DialogueOption {
    fn new(text: &str, impact: Impact) -> Self {
        Self {
            text: text.to_string(),
            impact,
            requirement: None,
        }
    }

    fn requires(mut self, skill: Skill, level: u32) -> Self {
        self.requirement = Some((skill, level));
        self
    }

    pub fn is_available(&self, state: &GameState) -> bool {
        self.requirement
            .map_or(true, |(skill, level)| state.attributes.skill(skill) >= level)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDialogue {
    pub customer: CustomerType,
    pub trigger: Trigger,
    pub options: Vec<DialogueOption>,
    pub replies: Vec<String>,
    /// Hint shown to the player
    pub context: String,
}

impl CustomerDialogue {
    fn new(customer: CustomerType, trigger: Trigger, context: &str) -> Self {
        Self {
            customer,
            trigger,
            options: Vec::new(),
            replies: Vec::new(),
            context: context.to_string(),
        }
    }

    fn option(mut self, option: DialogueOption) -> Self {
        self.options.push(option);
        self
    }

    fn replies(mut self, replies: &[&str]) -> Self {
        self.replies = replies.iter().map(|r| r.to_string()).collect();
        self
    }
}

/// Supplies dialogue for a customer situation
pub trait DialogueSource {
    fn name(&self) -> &'static str;

    fn dialogue(
        &self,
        order: &Order,
        trigger: Trigger,
        state: &GameState,
    ) -> Option<CustomerDialogue>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum DialogueMode {
    #[default]
    Offline,
    Online,
}

/// Scripted dialogue database
#[derive(Debug, Clone)]
pub struct OfflineDialogues {
    dialogues: Vec<CustomerDialogue>,
}

impl Default for OfflineDialogues {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineDialogues {
    pub fn new() -> Self {
        use CustomerType::*;
        let eq = Skill::EmotionalIntelligence;

        let dialogues = vec![
            CustomerDialogue::new(
                ProgrammerShy,
                Trigger::Delivered,
                "Shy programmers prefer not to be disturbed",
            )
            .option(DialogueOption::new(
                "Your food is at the door, grab it whenever you like",
                Impact::credit(2).with_tip(0.6),
            ))
            .option(DialogueOption::new(
                "Food's here! Come get it!",
                Impact::credit(-1).with_complaint(0.3),
            ))
            .replies(&["Thanks", "Appreciate it"]),
            CustomerDialogue::new(
                ProgrammerShy,
                Trigger::Late,
                "Programmers are usually patient about delays",
            )
            .option(DialogueOption::new(
                "Sorry I'm late, traffic was terrible",
                Impact::credit(-1),
            ))
            .option(DialogueOption::new(
                "Left it at the door, it's still hot",
                Impact::credit(1).with_tip(0.3),
            ))
            .replies(&["No problem", "Watch the time next time"]),
            CustomerDialogue::new(
                RichImpatient,
                Trigger::Urged,
                "Impatient tycoons expect a respectful tone",
            )
            .option(DialogueOption::new(
                "Hello, I'm on my way, almost there",
                Impact::credit(0),
            ))
            .option(DialogueOption::new(
                "Sorry, something came up on my end",
                Impact::credit(-3).with_complaint(0.5),
            ))
            .option(
                DialogueOption::new(
                    "Sir, I'm rushing your order right now",
                    Impact::credit(1),
                )
                .requires(eq, 3),
            )
            .replies(&[
                "Your service is so slow",
                "Make me wait this long again and see",
            ]),
            CustomerDialogue::new(
                RichImpatient,
                Trigger::Delivered,
                "On-time delivery earns generous tips",
            )
            .option(DialogueOption::new(
                "Your meal has arrived, please check it",
                Impact::credit(2).with_tip(0.8),
            ))
            .option(
                DialogueOption::new(
                    "Boss, your delivery. Anything else I can do for you?",
                    Impact::credit(3).with_tip(1.0),
                )
                .requires(eq, 4),
            )
            .replies(&["Not bad, right on time", "Efficient this time"]),
            CustomerDialogue::new(
                DifficultElderly,
                Trigger::Delivered,
                "Calling her 'Auntie' lowers complaints by 20%",
            )
            .option(DialogueOption::new(
                "Hello Auntie, your food is here",
                Impact::credit(2).with_complaint(-0.2),
            ))
            .option(DialogueOption::new(
                "Your food is here",
                Impact::credit(0).with_complaint(0.1),
            ))
            .option(
                DialogueOption::new(
                    "Grandma, your meal is here, eat it while it's hot",
                    Impact::credit(3).with_tip(0.4),
                )
                .requires(eq, 5),
            )
            .replies(&[
                "What a polite young one",
                "Young people these days are not so bad",
            ]),
            CustomerDialogue::new(Normal, Trigger::Delivered, "Regular customer")
                .option(DialogueOption::new(
                    "Hello, your delivery is here",
                    Impact::credit(1),
                ))
                .option(DialogueOption::new(
                    "Delivery's here, enjoy your meal",
                    Impact::credit(1).with_tip(0.2),
                ))
                .replies(&["Thanks", "Appreciate it"]),
            CustomerDialogue::new(Vip, Trigger::Delivered, "VIP customers expect premium service")
                .option(DialogueOption::new(
                    "Hello, your VIP delivery has arrived",
                    Impact::credit(2).with_tip(0.6),
                ))
                .option(
                    DialogueOption::new(
                        "Dear customer, your meal is served, enjoy",
                        Impact::credit(3).with_tip(0.8),
                    )
                    .requires(eq, 3),
                )
                .replies(&["Great service", "I'll order from you again"]),
        ];

        Self { dialogues }
    }

    pub fn get(&self, customer: CustomerType, trigger: Trigger) -> Option<&CustomerDialogue> {
        self.dialogues
            .iter()
            .find(|d| d.customer == customer && d.trigger == trigger)
    }
}

impl DialogueSource for OfflineDialogues {
    fn name(&self) -> &'static str {
        "offline script"
    }

    fn dialogue(
        &self,
        order: &Order,
        trigger: Trigger,
        _state: &GameState,
    ) -> Option<CustomerDialogue> {
        self.get(order.customer_type, trigger).cloned()
    }
}

/// Online mode: prompt building plus a built-in answer table
#[derive(Debug, Clone, Default)]
pub struct AssistantDialogues;

impl AssistantDialogues {
    /// Prompt describing the situation for a language model
    pub fn prompt(order: &Order, trigger: Trigger, state: &GameState) -> String {
        format!(
            "You are a food delivery courier talking to a customer.\n\
             \n\
             Customer:\n\
             - Type: {}\n\
             - Order priority: {}\n\
             - Delivery district: {}\n\
             \n\
             Situation: {}\n\
             \n\
             Courier:\n\
             - Emotional intelligence: {}\n\
             - Level: {}\n\
             \n\
             Write three different replies and predict how the customer reacts.\n\
             Each reply should carry a different risk and reward.",
            order.customer_type,
            order.priority,
            order.delivery_district,
            trigger,
            state.attributes.emotional_intelligence,
            state.attributes.level,
        )
    }
}

impl DialogueSource for AssistantDialogues {
    fn name(&self) -> &'static str {
        "assistant"
    }

    fn dialogue(
        &self,
        order: &Order,
        trigger: Trigger,
        state: &GameState,
    ) -> Option<CustomerDialogue> {
        let context = Self::prompt(order, trigger, state);
        let dialogue = match (order.customer_type, trigger) {
            (CustomerType::ProgrammerShy, Trigger::Delivered) => {
                CustomerDialogue::new(order.customer_type, trigger, &context)
                    .option(DialogueOption::new(
                        "Left at the door, please collect",
                        Impact::credit(2).with_tip(0.5),
                    ))
                    .option(DialogueOption::new(
                        "Your food is here, enjoy",
                        Impact::credit(1),
                    ))
                    .option(DialogueOption::new(
                        "Delivered, no need to reply",
                        Impact::credit(3).with_tip(0.7),
                    ))
            }
            (CustomerType::RichImpatient, Trigger::Urged) => {
                CustomerDialogue::new(order.customer_type, trigger, &context)
                    .option(DialogueOption::new(
                        "Sorry for the delay, rushing it now",
                        Impact::credit(0),
                    ))
                    .option(DialogueOption::new(
                        "Arriving shortly, please hold on",
                        Impact::credit(-1),
                    ))
                    .option(DialogueOption::new(
                        "Valued customer, I'll be there as fast as I can",
                        Impact::credit(2),
                    ))
            }
            _ => return None,
        };
        Some(dialogue.replies(&["Got it, thanks", "Okay"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{District, Weather};
    use crate::orders::{OrderGenerator, Traffic};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn order_for(customer: CustomerType) -> Order {
        let mut rng = StdRng::seed_from_u64(8);
        let mut order =
            OrderGenerator::new().generate(&mut rng, Weather::Sunny, 10, 1.0, &Traffic::default());
        order.customer_type = customer;
        order.delivery_district = District::WutongLane;
        order
    }

    #[test]
    fn test_every_customer_has_a_delivered_script() {
        let db = OfflineDialogues::new();
        for customer in CustomerType::ALL {
            let dialogue = db.get(customer, Trigger::Delivered).unwrap();
            assert!(!dialogue.options.is_empty());
            assert!(!dialogue.replies.is_empty());
        }
        assert!(db.get(CustomerType::Vip, Trigger::Late).is_none());
    }

    #[test]
    fn test_requirements_gate_options() {
        let db = OfflineDialogues::new();
        let mut state = GameState::default();
        let dialogue = db.get(CustomerType::DifficultElderly, Trigger::Delivered).unwrap();
        let premium = &dialogue.options[2];
        assert!(!premium.is_available(&state));
        state.attributes.emotional_intelligence = 5;
        assert!(premium.is_available(&state));
    }

    #[test]
    fn test_trigger_after_delivery() {
        assert_eq!(
            Trigger::after_delivery(CustomerType::Vip, false),
            Trigger::Delivered
        );
        assert_eq!(
            Trigger::after_delivery(CustomerType::RichImpatient, true),
            Trigger::Urged
        );
        assert_eq!(
            Trigger::after_delivery(CustomerType::ProgrammerShy, true),
            Trigger::Late
        );
    }

    #[test]
    fn test_assistant_prompt_and_table() {
        let state = GameState::default();
        let order = order_for(CustomerType::ProgrammerShy);
        let prompt = AssistantDialogues::prompt(&order, Trigger::Delivered, &state);
        assert!(prompt.contains("Shy Programmer"));
        assert!(prompt.contains("Wutong Lane"));

        let dialogue = AssistantDialogues
            .dialogue(&order, Trigger::Delivered, &state)
            .unwrap();
        assert_eq!(dialogue.options.len(), 3);
        assert_eq!(dialogue.context, prompt);

        let other = order_for(CustomerType::Normal);
        assert!(AssistantDialogues
            .dialogue(&other, Trigger::Delivered, &state)
            .is_none());
    }

    #[test]
    fn test_impact_summary() {
        assert_eq!(
            Impact::credit(2).with_tip(0.6).summary(),
            "credit +2, tip chance 60%"
        );
        assert_eq!(
            Impact::credit(0).with_complaint(-0.2).summary(),
            "credit +0, complaint chance -20%"
        );
    }
}
