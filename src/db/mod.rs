//! Database access layer

pub mod menu;
pub mod orders;
pub mod users;
