pub mod document;
pub mod params;
pub mod validate;

pub use document::{AssemblyConfig, ComponentSpec, ConfigDocument, Descriptor, TaskSpec};
pub use params::ParameterTable;
pub use validate::validate_shapes;
