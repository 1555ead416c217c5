pub mod serialization;
pub mod setup;
