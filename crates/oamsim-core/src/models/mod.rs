//! Data models for OAMSim

mod alarm;
mod event;
mod kpi;
mod node;
mod query;

pub use alarm::*;
pub use event::*;
pub use kpi::*;
pub use node::*;
pub use query::*;
