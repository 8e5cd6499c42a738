//! Data models for the MuniServe grievance portal.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod account;
mod announcement;
mod grievance;

pub use account::*;
pub use announcement::*;
pub use grievance::*;
