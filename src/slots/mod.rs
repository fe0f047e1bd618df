//! # Slot Analysis Bot
//!
//! A second, independent bot: the user pages through a fixed catalog of slot
//! games, picks one, and sends a screenshot. The reply is a randomly drawn
//! bonus prediction; the image itself is only checked for a supported format.

pub mod catalog;
pub mod handlers;
pub mod predictor;

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Conversation state of one chat with the slot bot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SlotDialogueState {
    #[default]
    Menu,
    AwaitingScreenshot {
        game: String,
    },
}

impl SlotDialogueState {
    /// Game picked by the user, if any
    pub fn selected_game(&self) -> Option<&str> {
        match self {
            SlotDialogueState::AwaitingScreenshot { game } => Some(game),
            SlotDialogueState::Menu => None,
        }
    }
}

/// Type alias for the slot dialogue
pub type SlotDialogue = Dialogue<SlotDialogueState, InMemStorage<SlotDialogueState>>;

pub use catalog::{create_catalog_keyboard, parse_catalog_callback, CatalogAction, GAMES, GAMES_PER_PAGE};
pub use handlers::{slot_callback_handler, slot_message_handler};
pub use predictor::{predict_bonus, BonusPrediction};
