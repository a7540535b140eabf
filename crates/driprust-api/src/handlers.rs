//! API request handlers

pub mod campaigns;
pub mod health;
