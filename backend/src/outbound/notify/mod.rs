//! Notification adapters for the registration confirmation side effect.

pub mod webhook_notifier;

pub use webhook_notifier::WebhookNotifier;
