//! Reference-counted live subscriptions

mod manager;

pub use manager::SubscriptionManager;
