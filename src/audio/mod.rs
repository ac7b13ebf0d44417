pub mod automation;
pub mod engine;
pub mod parameters;
