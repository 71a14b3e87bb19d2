//! Application layer - trigger-driven scanning

pub mod trigger_subscriber;

pub use trigger_subscriber::{SubscriberConfig, SubscriberStats, TriggerSource, TriggerStream, TriggerSubscriber};
