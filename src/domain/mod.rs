pub mod chat;
pub mod failover;
pub mod image;
pub mod prompt;
pub mod usage;
