//! API handlers.

pub mod admin;
pub mod branches;
pub mod dashboard;
pub mod health;
pub mod live;
pub mod loyalty;
pub mod parking;
pub mod rates;
pub mod tariff;
