pub mod forms;
pub mod health;
pub mod members;
pub mod metrics;
