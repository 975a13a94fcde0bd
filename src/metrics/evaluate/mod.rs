pub mod classify;
pub mod ranking;
