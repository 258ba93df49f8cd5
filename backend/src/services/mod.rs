//! Business logic services for the procurement tracker

pub mod collaborators;
pub mod configuration;
pub mod container;
pub mod memory;
pub mod products;
pub mod workflow;

pub use collaborators::{ConfigurationProvider, ContainerProvider, ProductStore};
pub use configuration::PgConfigurationProvider;
pub use container::{ContainerStatus, PgContainerProvider};
pub use memory::{MemoryConfigurationProvider, MemoryContainerProvider, MemoryProductStore};
pub use products::PgProductStore;
pub use workflow::{AdvanceInput, AdvanceResult, CreateProductInput, PgWorkflowService, WorkflowService};
