mod k_armed_bandit;
mod paperclips;

pub use k_armed_bandit::KArmedBandit;
pub use paperclips::{FactoryAction, PaperclipFactory};
