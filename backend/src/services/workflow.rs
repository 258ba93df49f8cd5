//! Workflow orchestration
//!
//! Wraps the pure transition engine with the collaborators it needs: load the
//! product and configuration once, run the engine, enforce SKU uniqueness,
//! attach the container, then persist. Any failure after the container was
//! attached detaches it again, so a transition is all-or-nothing.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::{
    advance, analyze, provisional_sku, validate_configuration, validate_sku, ActorRole,
    Configuration, CostAnalysis, Product, ProductStatus, StageRecord, TransitionRequest,
    WorkflowError, WorkflowWarning,
};

use super::collaborators::{ConfigurationProvider, ContainerProvider, ProductStore};
use super::configuration::PgConfigurationProvider;
use super::container::PgContainerProvider;
use super::products::PgProductStore;
use crate::error::{AppError, AppResult};

/// Body of an advance request
#[derive(Debug, Deserialize)]
pub struct AdvanceInput {
    /// Status the caller last saw; the transition applies only if it still holds
    pub current_status: ProductStatus,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Result of an applied transition
#[derive(Debug, Serialize)]
pub struct AdvanceResult {
    pub new_status: ProductStatus,
    pub product: Product,
    pub record: StageRecord,
    pub warnings: Vec<WorkflowWarning>,
}

/// Input for registering a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    /// Catalog SKU; a provisional one is generated when absent
    #[validate(length(min = 1, max = 64))]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(length(max = 2000))]
    pub reference_link: Option<String>,
    #[validate(range(min = 1))]
    pub suggested_quantity: Option<u32>,
    /// Register without an open replenishment need
    #[serde(default)]
    pub idle: bool,
}

/// Workflow service over the three collaborator contracts
pub struct WorkflowService<P, C, K> {
    products: P,
    configuration: C,
    containers: K,
}

/// The service as wired for the HTTP server
pub type PgWorkflowService = WorkflowService<PgProductStore, PgConfigurationProvider, PgContainerProvider>;

impl PgWorkflowService {
    pub fn postgres(db: PgPool, standard_container_cbm: Decimal) -> Self {
        WorkflowService::new(
            PgProductStore::new(db.clone()),
            PgConfigurationProvider::new(db.clone(), standard_container_cbm),
            PgContainerProvider::new(db),
        )
    }
}

impl<P, C, K> WorkflowService<P, C, K>
where
    P: ProductStore,
    C: ConfigurationProvider,
    K: ContainerProvider,
{
    pub fn new(products: P, configuration: C, containers: K) -> Self {
        Self {
            products,
            configuration,
            containers,
        }
    }

    pub fn products(&self) -> &P {
        &self.products
    }

    pub fn configuration(&self) -> &C {
        &self.configuration
    }

    pub fn containers(&self) -> &K {
        &self.containers
    }

    /// Apply the next transition to `sku` on behalf of `actor`
    pub async fn advance(
        &self,
        sku: &str,
        input: AdvanceInput,
        actor: ActorRole,
    ) -> AppResult<AdvanceResult> {
        let product = self.products.load_product(sku).await?;
        let config = self.configuration.current_configuration().await?;

        let request = TransitionRequest {
            expected_status: input.current_status,
            payload: &input.payload,
            actor,
            record_id: Uuid::new_v4(),
            now: Utc::now(),
        };
        let outcome = advance(&product, request, &config).map_err(|e| {
            tracing::debug!(
                sku = %sku,
                status = %product.status,
                role = %actor,
                error = %e,
                "Transition refused"
            );
            e
        })?;

        if let Some(change) = &outcome.sku_change {
            if self.products.sku_exists(&change.to).await? {
                return Err(WorkflowError::DuplicateSku(change.to.clone()).into());
            }
        }

        if let Some(assignment) = &outcome.container_assignment {
            self.containers.attach_product(assignment).await?;
        }

        let saved = self
            .products
            .save_product(&product.sku, product.status, &outcome.product, &outcome.record)
            .await;

        if let Err(err) = saved {
            if let Some(assignment) = &outcome.container_assignment {
                tracing::warn!(
                    sku = %sku,
                    container = %assignment.container_number,
                    "Save failed after container attach; detaching"
                );
                if let Err(detach_err) = self.containers.detach_product(assignment).await {
                    tracing::error!(
                        sku = %sku,
                        container = %assignment.container_number,
                        error = %detach_err,
                        "Failed to detach product from container"
                    );
                }
            }
            return Err(err);
        }

        tracing::info!(
            sku = %outcome.product.sku,
            from = %product.status,
            to = %outcome.product.status,
            role = %actor,
            "Transition applied"
        );
        for warning in &outcome.warnings {
            tracing::warn!(sku = %outcome.product.sku, "{}", warning);
        }

        Ok(AdvanceResult {
            new_status: outcome.product.status,
            product: outcome.product,
            record: outcome.record,
            warnings: outcome.warnings,
        })
    }

    /// Cost analysis for `sku` at `selling_price` without recording anything.
    ///
    /// Defaults to the selling price proposed at the analysis stage.
    pub async fn preview_analysis(
        &self,
        sku: &str,
        selling_price: Option<Decimal>,
    ) -> AppResult<CostAnalysis> {
        let product = self.products.load_product(sku).await?;
        let config = self.configuration.current_configuration().await?;

        let fob = product
            .fob_price
            .ok_or_else(|| WorkflowError::MissingField("fob_price".to_string()))?;
        let unit_volume = product
            .unit_volume_cbm
            .ok_or_else(|| WorkflowError::MissingField("unit_volume_cbm".to_string()))?;
        let selling_price = selling_price
            .or(product.selling_price)
            .ok_or_else(|| WorkflowError::MissingField("selling_price".to_string()))?;
        if selling_price <= Decimal::ZERO {
            return Err(WorkflowError::invalid("selling_price", "must be greater than zero").into());
        }

        let params = config.resolve()?;
        Ok(analyze(fob, unit_volume, selling_price, &params)?)
    }

    pub async fn get_product(&self, sku: &str) -> AppResult<Product> {
        self.products.load_product(sku).await
    }

    /// Register a product, assigning a provisional SKU when none is given
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let sku = match input.sku {
            Some(sku) => {
                let sku = sku.trim().to_string();
                validate_sku(&sku).map_err(|m| WorkflowError::invalid("sku", m))?;
                sku
            }
            None => provisional_sku(self.products.next_sequence().await?),
        };

        let status = if input.idle {
            ProductStatus::NoReplenishmentNeeded
        } else {
            ProductStatus::NeedsReplenishment
        };
        let mut product = Product::new(sku, input.description, status, Utc::now());
        product.reference_link = input.reference_link;
        product.suggested_quantity = input.suggested_quantity;

        self.products.insert_product(&product).await?;
        tracing::info!(sku = %product.sku, status = %product.status, "Product registered");
        Ok(product)
    }

    /// Permanently remove a product from the pipeline. Buyers and admins only.
    pub async fn exclude_product(&self, sku: &str, actor: ActorRole) -> AppResult<Product> {
        if !actor.can_act_as(ActorRole::Buyer) {
            return Err(AppError::InsufficientPermissions(
                "Only buyers may exclude products".to_string(),
            ));
        }
        let product = self.products.exclude_product(sku).await?;
        tracing::info!(sku = %sku, role = %actor, "Product excluded");
        Ok(product)
    }

    pub async fn current_configuration(&self) -> AppResult<Configuration> {
        self.configuration.current_configuration().await
    }

    /// Replace the cost configuration. Admins only.
    pub async fn replace_configuration(
        &self,
        config: Configuration,
        actor: ActorRole,
    ) -> AppResult<Configuration> {
        if actor != ActorRole::Admin {
            return Err(AppError::InsufficientPermissions(
                "Only administrators may change the cost configuration".to_string(),
            ));
        }
        validate_configuration(&config)?;
        self.configuration.replace_configuration(&config).await
    }
}
