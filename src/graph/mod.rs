pub mod builder;
pub mod registration;

pub use builder::{GraphBuilder, ServiceGraph};
pub use registration::{
    ref_arg, Capability, Recipe, Registration, SetupCall, StartupAction, TASK_TAG,
};
