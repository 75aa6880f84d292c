pub mod target;

pub use target::{
    BuildTarget, InMemoryTarget, RegistrationLedger, RegistrationState, TransformPipeline,
};
