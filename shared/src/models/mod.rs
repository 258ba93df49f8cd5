//! Domain models for the procurement pipeline

mod configuration;
mod container;
mod product;
mod stage;
mod user;

pub use configuration::*;
pub use container::*;
pub use product::*;
pub use stage::*;
pub use user::*;
