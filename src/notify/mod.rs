//! Chat notifications for merged pull requests.

mod discord;

pub use discord::{DiscordNotifier, NotifyError, WebhookMessage};
