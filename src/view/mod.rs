//! View modules — one per screen section, egui immediate mode.

pub mod connect;
pub mod fund;
pub mod overview;
pub mod withdraw;
