pub mod conversation;
pub mod identity;
pub mod intent;
pub mod rules;
pub mod usage;
