//! In-memory collaborators
//!
//! Same contracts as the PostgreSQL implementations, including the
//! compare-and-set on save. Used to run the workflow without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock};

use rust_decimal::Decimal;

use shared::{Configuration, ContainerAssignment, Product, ProductStatus, StageRecord, WorkflowError};

use super::collaborators::{ConfigurationProvider, ContainerProvider, ProductStore};
use super::container::ContainerStatus;
use crate::error::{AppError, AppResult};

fn poisoned(what: &str) -> AppError {
    AppError::Internal(format!("{} lock poisoned", what))
}

#[derive(Default)]
pub struct MemoryProductStore {
    products: Mutex<HashMap<String, Product>>,
    sequence: AtomicU32,
    read_only: AtomicBool,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::default();
        if let Ok(mut map) = store.products.lock() {
            map.extend(products.into_iter().map(|p| (p.sku.clone(), p)));
        }
        store
    }

    /// While read-only every save fails, as a storage outage would
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Copy of the stored product, if any
    pub fn get(&self, sku: &str) -> Option<Product> {
        self.products.lock().ok().and_then(|map| map.get(sku).cloned())
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, HashMap<String, Product>>> {
        self.products.lock().map_err(|_| poisoned("product store"))
    }
}

#[axum::async_trait]
impl ProductStore for MemoryProductStore {
    async fn load_product(&self, sku: &str) -> AppResult<Product> {
        self.lock()?
            .get(sku)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Product {}", sku)))
    }

    async fn sku_exists(&self, sku: &str) -> AppResult<bool> {
        Ok(self.lock()?.contains_key(sku))
    }

    async fn next_sequence(&self) -> AppResult<u32> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn insert_product(&self, product: &Product) -> AppResult<()> {
        let mut map = self.lock()?;
        if map.contains_key(&product.sku) {
            return Err(WorkflowError::DuplicateSku(product.sku.clone()).into());
        }
        map.insert(product.sku.clone(), product.clone());
        Ok(())
    }

    async fn save_product(
        &self,
        expected_sku: &str,
        expected_status: ProductStatus,
        product: &Product,
        record: &StageRecord,
    ) -> AppResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(AppError::Internal("Product store is read-only".to_string()));
        }

        let mut map = self.lock()?;
        let stored = map
            .get(expected_sku)
            .ok_or_else(|| AppError::NotFound(format!("Product {}", expected_sku)))?;
        if stored.status != expected_status || stored.excluded {
            return Err(AppError::Conflict {
                message: format!(
                    "Product {} is no longer {}; re-fetch before retrying",
                    expected_sku, expected_status
                ),
                current_status: Some(stored.status),
            });
        }
        if product.sku != expected_sku && map.contains_key(&product.sku) {
            return Err(WorkflowError::DuplicateSku(product.sku.clone()).into());
        }

        let mut saved = product.clone();
        if saved.stages.last().map(|r| r.id) != Some(record.id) {
            saved.stages.push(record.clone());
        }
        map.remove(expected_sku);
        map.insert(saved.sku.clone(), saved);
        Ok(())
    }

    async fn exclude_product(&self, sku: &str) -> AppResult<Product> {
        let mut map = self.lock()?;
        let product = map
            .get_mut(sku)
            .ok_or_else(|| AppError::NotFound(format!("Product {}", sku)))?;
        product.excluded = true;
        product.updated_at = chrono::Utc::now();
        Ok(product.clone())
    }
}

#[derive(Default)]
pub struct MemoryConfigurationProvider {
    config: RwLock<Configuration>,
}

impl MemoryConfigurationProvider {
    pub fn new(config: Configuration) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

#[axum::async_trait]
impl ConfigurationProvider for MemoryConfigurationProvider {
    async fn current_configuration(&self) -> AppResult<Configuration> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|_| poisoned("configuration"))
    }

    async fn replace_configuration(&self, config: &Configuration) -> AppResult<Configuration> {
        let mut current = self.config.write().map_err(|_| poisoned("configuration"))?;
        *current = config.clone();
        Ok(config.clone())
    }
}

/// A container as tracked in memory
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryContainer {
    pub status: ContainerStatus,
    pub max_cbm: Decimal,
    pub used_cbm: Decimal,
    /// Loaded volume per SKU
    pub products: BTreeMap<String, Decimal>,
}

#[derive(Default)]
pub struct MemoryContainerProvider {
    containers: Mutex<HashMap<String, MemoryContainer>>,
}

impl MemoryContainerProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty container open for loading
    pub fn add_container(&self, container_number: &str, max_cbm: Decimal) {
        if let Ok(mut map) = self.containers.lock() {
            map.insert(
                container_number.to_string(),
                MemoryContainer {
                    status: ContainerStatus::Created,
                    max_cbm,
                    used_cbm: Decimal::ZERO,
                    products: BTreeMap::new(),
                },
            );
        }
    }

    pub fn set_status(&self, container_number: &str, status: ContainerStatus) {
        if let Ok(mut map) = self.containers.lock() {
            if let Some(container) = map.get_mut(container_number) {
                container.status = status;
            }
        }
    }

    pub fn get(&self, container_number: &str) -> Option<MemoryContainer> {
        self.containers
            .lock()
            .ok()
            .and_then(|map| map.get(container_number).cloned())
    }
}

#[axum::async_trait]
impl ContainerProvider for MemoryContainerProvider {
    async fn attach_product(&self, assignment: &ContainerAssignment) -> AppResult<()> {
        let mut map = self.containers.lock().map_err(|_| poisoned("container"))?;
        let container = map
            .get_mut(&assignment.container_number)
            .filter(|c| c.status.accepts_products())
            .ok_or_else(|| AppError::ContainerNotFound(assignment.container_number.clone()))?;

        container.used_cbm += assignment.volume_cbm;
        *container
            .products
            .entry(assignment.sku.clone())
            .or_insert(Decimal::ZERO) += assignment.volume_cbm;
        container.status = ContainerStatus::InUse;

        if container.used_cbm > container.max_cbm {
            tracing::warn!(
                container = %assignment.container_number,
                used_cbm = %container.used_cbm,
                max_cbm = %container.max_cbm,
                "Container loaded beyond its capacity"
            );
        }
        Ok(())
    }

    async fn detach_product(&self, assignment: &ContainerAssignment) -> AppResult<()> {
        let mut map = self.containers.lock().map_err(|_| poisoned("container"))?;
        let Some(container) = map.get_mut(&assignment.container_number) else {
            return Ok(());
        };

        container.used_cbm = (container.used_cbm - assignment.volume_cbm).max(Decimal::ZERO);
        if let Some(volume) = container.products.get_mut(&assignment.sku) {
            *volume -= assignment.volume_cbm;
            if *volume <= Decimal::ZERO {
                container.products.remove(&assignment.sku);
            }
        }
        if container.products.is_empty() && container.status == ContainerStatus::InUse {
            container.status = ContainerStatus::Created;
        }
        Ok(())
    }
}
