//! Contracts of the collaborators the workflow depends on
//!
//! Each has a PostgreSQL implementation for the server and an in-memory one
//! for embedding and tests.

use shared::{Configuration, ContainerAssignment, Product, ProductStatus, StageRecord};

use crate::error::AppResult;

/// Persistence for products and their stage history
#[axum::async_trait]
pub trait ProductStore: Send + Sync {
    /// Load a product with its full stage history. `NotFound` if absent.
    async fn load_product(&self, sku: &str) -> AppResult<Product>;

    async fn sku_exists(&self, sku: &str) -> AppResult<bool>;

    /// Next number for a provisional SKU
    async fn next_sequence(&self) -> AppResult<u32>;

    /// Register a new product. Fails with `DuplicateSku` if the SKU is taken.
    async fn insert_product(&self, product: &Product) -> AppResult<()>;

    /// Persist `product` and append `record` atomically.
    ///
    /// Compare-and-set: applies only while the stored product still has
    /// `expected_sku` and `expected_status`, otherwise `Conflict` carrying the
    /// stored status.
    async fn save_product(
        &self,
        expected_sku: &str,
        expected_status: ProductStatus,
        product: &Product,
        record: &StageRecord,
    ) -> AppResult<()>;

    /// Mark a product as permanently excluded and return it
    async fn exclude_product(&self, sku: &str) -> AppResult<Product>;
}

/// Source of the current cost configuration
#[axum::async_trait]
pub trait ConfigurationProvider: Send + Sync {
    async fn current_configuration(&self) -> AppResult<Configuration>;

    /// Replace the stored configuration. Used by administrators only; the
    /// workflow itself never writes configuration.
    async fn replace_configuration(&self, config: &Configuration) -> AppResult<Configuration>;
}

/// Shared freight containers
#[axum::async_trait]
pub trait ContainerProvider: Send + Sync {
    /// Add a product's volume to a container. `ContainerNotFound` if the
    /// container does not exist or is no longer open for loading.
    async fn attach_product(&self, assignment: &ContainerAssignment) -> AppResult<()>;

    /// Reverse a previous `attach_product`. A container left empty goes back
    /// to CREATED.
    async fn detach_product(&self, assignment: &ContainerAssignment) -> AppResult<()>;
}
