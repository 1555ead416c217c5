pub mod hat;
pub mod policy;

pub use hat::{
    ChainForecast, ClueRecord, Decision, DecisionReason, Forecast, HatAction, HatError,
    HatFeatures, HatPlayer, ModifiedReason, PlayerMemory,
};
pub use policy::{HatPolicy, Policy, PolicyContext, PolicyError, Table};
