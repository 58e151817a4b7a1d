//! Turns a scraped menu into a chat message and delivers it.
mod compose;
mod payload;
mod webhook;

pub use compose::Template;
pub use webhook::Webhook;
