pub mod assembler;
pub mod catalog;
pub mod resolver;
pub mod tasks;

pub use assembler::Assembler;
pub use catalog::{CollaboratorCatalog, CollaboratorType};
pub use resolver::resolve_component;
pub use tasks::{register_tasks, task_identity};
