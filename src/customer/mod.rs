//! Customer conversations

pub mod dialogue;
pub mod interaction;

pub use dialogue::{DialogueMode, DialogueOption, DialogueSource, Impact, Trigger};
pub use interaction::{CustomerInteractionSystem, InteractionRecord, InteractionReply, PendingInteraction};
