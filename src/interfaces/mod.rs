pub mod subgen;

pub use subgen::{
    Generator, RunReport, SetupError, SubscriptionError, SubscriptionReport,
};
