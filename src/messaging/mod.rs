// Messaging module - Lock-free channels between the engine and its shell

pub mod channels;
pub mod command;
pub mod notification;

pub use channels::{
    CommandConsumer, CommandProducer, NotificationConsumer, NotificationProducer,
    create_command_channel, create_notification_channel,
};
pub use command::{EngineCommand, NotePlayParams};
pub use notification::{Notification, NotificationCategory, NotificationLevel};
