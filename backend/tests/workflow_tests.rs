//! Procurement workflow tests
//!
//! Drives the workflow service over the in-memory collaborators:
//! - The full pipeline from replenishment to shipping
//! - Rejection and re-quotation
//! - Role, status and exclusion guards leave products untouched
//! - Container attach is undone when the save fails
//! - A save against a status that moved on conflicts and writes nothing

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use tokio_test::{assert_err, assert_ok};

use uuid::Uuid;

use procurement_tracker::error::{AppError, AppResult};
use procurement_tracker::services::{
    AdvanceInput, ContainerStatus, CreateProductInput, MemoryConfigurationProvider,
    MemoryContainerProvider, MemoryProductStore, ProductStore, WorkflowService,
};
use shared::{
    advance, ActorRole, Configuration, Currency, Money, Product, ProductStatus, StageDetails,
    StageRecord, TransitionOutcome, TransitionRequest, WorkflowError, WorkflowWarning,
};

type Service = WorkflowService<MemoryProductStore, MemoryConfigurationProvider, MemoryContainerProvider>;

const CONTAINER: &str = "MSCU1234567";

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn complete_configuration() -> Configuration {
    serde_json::from_value(json!({
        "exchange_rates": { "rmb_to_usd": "0.14", "usd_to_local": "950" },
        "container_cbm": "68",
        "fixed_costs_usd": { "ocean_freight": "3000" },
        "variable_costs": {
            "supplier_commission": "0.05",
            "container_insurance": "0.02",
            "import_duty": "0.06",
            "vat": "0.19"
        },
        "marketplace": {
            "commission_pct": "0.13",
            "shipping_threshold": "19990",
            "shipping_cost": "3500",
            "medium_threshold": "9990",
            "medium_charge": "1000",
            "low_charge": "700"
        }
    }))
    .unwrap()
}

fn service_with(products: Vec<Product>, config: Configuration) -> Service {
    let containers = MemoryContainerProvider::new();
    containers.add_container(CONTAINER, dec("68"));
    WorkflowService::new(
        MemoryProductStore::with_products(products),
        MemoryConfigurationProvider::new(config),
        containers,
    )
}

fn service() -> Service {
    service_with(Vec::new(), complete_configuration())
}

/// A quoted product waiting for the buyer's decision
fn analyzing_product(sku: &str) -> Product {
    let mut product = Product::new(sku, "Ceramic mug 350ml", ProductStatus::Analyzing, Utc::now());
    product.suggested_quantity = Some(100);
    product.requested_quantity = Some(100);
    product.fob_price = Some(Money::new(dec("100"), Currency::Rmb));
    product.units_per_case = Some(48);
    product.case_volume_cbm = Some(dec("2.88"));
    product.unit_volume_cbm = Some(dec("0.06"));
    product.minimum_order_quantity = Some(96);
    product.selling_price = Some(dec("50000"));
    product
}

fn input(current_status: ProductStatus, payload: Value) -> AdvanceInput {
    AdvanceInput {
        current_status,
        payload,
    }
}

fn quotation() -> Value {
    json!({
        "unit_price": "100",
        "currency": "RMB",
        "units_per_case": 48,
        "case_volume_cbm": "2.88",
        "production_lead_time_days": 30,
        "minimum_order_quantity": 96,
        "supplier_city": "Yiwu"
    })
}

fn workflow_error(err: &AppError) -> &WorkflowError {
    err.workflow().unwrap_or_else(|| panic!("expected a workflow error, got {:?}", err))
}

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn test_full_pipeline_strictly_advances() {
    let service = service();
    let product = assert_ok!(
        service
            .create_product(CreateProductInput {
                sku: None,
                description: "Ceramic mug 350ml".to_string(),
                reference_link: None,
                suggested_quantity: Some(100),
                idle: false,
            })
            .await
    );
    assert_eq!(product.sku, "SKU-000001");
    assert_eq!(product.status, ProductStatus::NeedsReplenishment);

    let steps: Vec<(ActorRole, Value)> = vec![
        (ActorRole::Buyer, json!({})),
        (ActorRole::Supplier, quotation()),
        (ActorRole::Buyer, json!({ "selling_price": "50000" })),
        (ActorRole::Buyer, json!({ "approved": true, "new_sku": "MUG-350" })),
        (ActorRole::Supplier, json!({ "estimated_delivery_date": "2026-12-01" })),
        (ActorRole::Supplier, json!({ "quality_notes": "Glaze even" })),
        (ActorRole::Supplier, json!({ "container_number": CONTAINER })),
    ];

    let mut sku = product.sku.clone();
    let mut status = product.status;
    for (actor, payload) in steps {
        let result = assert_ok!(service.advance(&sku, input(status, payload), actor).await);
        assert!(result.new_status.pipeline_position() > status.pipeline_position());
        assert_eq!(result.record.previous_status, status);
        assert_eq!(result.record.next_status, result.new_status);
        sku = result.product.sku.clone();
        status = result.new_status;
    }

    assert_eq!(status, ProductStatus::Shipped);
    assert_eq!(sku, "MUG-350");

    let stored = service.products().get("MUG-350").unwrap();
    assert!(service.products().get("SKU-000001").is_none());
    assert_eq!(stored.stages.len(), 7);
    assert_eq!(stored.requested_quantity, Some(100));
    // 100 rounded up to whole cases of 48
    assert_eq!(stored.approved_quantity, Some(144));
    assert_eq!(stored.confirmed_quantity, Some(144));
    assert_eq!(stored.shipped_quantity, Some(144));
    assert_eq!(stored.unit_volume_cbm, Some(dec("0.06")));
    assert!(stored.landed_cost.is_some());

    let container = service.containers().get(CONTAINER).unwrap();
    assert_eq!(container.status, ContainerStatus::InUse);
    assert_eq!(container.used_cbm, dec("8.64"));
    assert_eq!(container.products.get("MUG-350"), Some(&dec("8.64")));
}

#[tokio::test]
async fn test_idle_product_starts_before_replenishment() {
    let service = service();
    let product = assert_ok!(
        service
            .create_product(CreateProductInput {
                sku: Some("MUG-200".to_string()),
                description: "Espresso cup".to_string(),
                reference_link: None,
                suggested_quantity: None,
                idle: true,
            })
            .await
    );
    assert_eq!(product.status, ProductStatus::NoReplenishmentNeeded);

    let err = assert_err!(
        service
            .advance("MUG-200", input(ProductStatus::NoReplenishmentNeeded, json!({})), ActorRole::Buyer)
            .await
    );
    assert_eq!(
        workflow_error(&err),
        &WorkflowError::MissingField("suggested_quantity".to_string())
    );

    let result = assert_ok!(
        service
            .advance(
                "MUG-200",
                input(ProductStatus::NoReplenishmentNeeded, json!({ "suggested_quantity": 60 })),
                ActorRole::Buyer,
            )
            .await
    );
    assert_eq!(result.new_status, ProductStatus::NeedsReplenishment);
    assert_eq!(result.product.suggested_quantity, Some(60));
}

#[tokio::test]
async fn test_rejection_loops_back_through_quotation() {
    let service = service_with(vec![analyzing_product("SKU-000010")], complete_configuration());

    let rejected = assert_ok!(
        service
            .advance(
                "SKU-000010",
                input(ProductStatus::Analyzing, json!({ "approved": false, "comments": "Too expensive" })),
                ActorRole::Buyer,
            )
            .await
    );
    assert_eq!(rejected.new_status, ProductStatus::QuoteRejected);
    assert_eq!(rejected.product.approved_quantity, None);
    assert!(rejected.product.landed_cost.is_some());

    let requoted = assert_ok!(
        service
            .advance("SKU-000010", input(ProductStatus::QuoteRejected, quotation()), ActorRole::Supplier)
            .await
    );
    assert_eq!(requoted.new_status, ProductStatus::Quoted);

    let analyzing = assert_ok!(
        service
            .advance(
                "SKU-000010",
                input(ProductStatus::Quoted, json!({ "selling_price": "52000" })),
                ActorRole::Buyer,
            )
            .await
    );
    assert_eq!(analyzing.new_status, ProductStatus::Analyzing);

    let stored = service.products().get("SKU-000010").unwrap();
    assert_eq!(stored.stages.len(), 3);
    assert_eq!(stored.selling_price, Some(dec("52000")));
}

#[tokio::test]
async fn test_thin_margin_approval_warns_with_target_price() {
    let mut product = analyzing_product("SKU-000011");
    product.selling_price = Some(dec("24000"));
    product.minimum_order_quantity = Some(500);
    let service = service_with(vec![product], complete_configuration());

    let result = assert_ok!(
        service
            .advance("SKU-000011", input(ProductStatus::Analyzing, json!({ "approved": true })), ActorRole::Buyer)
            .await
    );
    assert_eq!(result.new_status, ProductStatus::PurchaseApproved);
    assert!(result.warnings.iter().any(|w| matches!(
        w,
        WorkflowWarning::BelowMinimumOrderQuantity { quantity: 144, minimum: 500 }
    )));
    assert!(result.warnings.iter().any(|w| matches!(
        w,
        WorkflowWarning::MarginBelowTarget { target_purchase_price: Some(_), .. }
    )));

    match &result.record.details {
        StageDetails::Approval { analysis, target_purchase_price, .. } => {
            assert!(analysis.margin.below_target);
            assert!(target_purchase_price.is_some());
        }
        other => panic!("unexpected details {:?}", other),
    }
}

// ============================================================================
// Guards
// ============================================================================

#[tokio::test]
async fn test_supplier_cannot_approve() {
    let service = service_with(vec![analyzing_product("SKU-000020")], complete_configuration());

    let err = assert_err!(
        service
            .advance("SKU-000020", input(ProductStatus::Analyzing, json!({ "approved": true })), ActorRole::Supplier)
            .await
    );
    assert!(matches!(
        workflow_error(&err),
        WorkflowError::RoleNotAuthorized {
            actor: ActorRole::Supplier,
            required: ActorRole::Buyer,
            from: ProductStatus::Analyzing,
        }
    ));

    let stored = service.products().get("SKU-000020").unwrap();
    assert_eq!(stored.status, ProductStatus::Analyzing);
    assert!(stored.stages.is_empty());
}

#[tokio::test]
async fn test_admin_may_act_for_any_role() {
    let service = service_with(vec![analyzing_product("SKU-000021")], complete_configuration());
    let result = assert_ok!(
        service
            .advance("SKU-000021", input(ProductStatus::Analyzing, json!({ "approved": true })), ActorRole::Admin)
            .await
    );
    assert_eq!(result.record.actor_role, ActorRole::Admin);
}

#[tokio::test]
async fn test_repeated_advance_is_refused() {
    let service = service_with(vec![analyzing_product("SKU-000030")], complete_configuration());
    let payload = json!({ "approved": true });

    assert_ok!(
        service
            .advance("SKU-000030", input(ProductStatus::Analyzing, payload.clone()), ActorRole::Buyer)
            .await
    );
    let err = assert_err!(
        service
            .advance("SKU-000030", input(ProductStatus::Analyzing, payload), ActorRole::Buyer)
            .await
    );
    assert!(matches!(
        workflow_error(&err),
        WorkflowError::StatusMismatch {
            current: ProductStatus::PurchaseApproved,
            ..
        }
    ));

    let stored = service.products().get("SKU-000030").unwrap();
    assert_eq!(stored.stages.len(), 1);
}

/// Run the engine directly, as a second actor holding an older copy would
fn outcome_from(product: &Product, payload: Value, actor: ActorRole) -> TransitionOutcome {
    let request = TransitionRequest {
        expected_status: product.status,
        payload: &payload,
        actor,
        record_id: Uuid::new_v4(),
        now: Utc::now(),
    };
    advance(product, request, &complete_configuration()).unwrap()
}

fn expect_conflict(err: AppError) -> Option<ProductStatus> {
    match err {
        AppError::Conflict { current_status, .. } => current_status,
        other => panic!("expected a conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stale_save_conflicts_and_writes_nothing() {
    let service = service_with(vec![analyzing_product("SKU-000032")], complete_configuration());

    // Both buyers load the product while it is still being analyzed
    let stale = assert_ok!(service.products().load_product("SKU-000032").await);

    assert_ok!(
        service
            .advance("SKU-000032", input(ProductStatus::Analyzing, json!({ "approved": true })), ActorRole::Buyer)
            .await
    );

    let late = outcome_from(&stale, json!({ "approved": false }), ActorRole::Buyer);
    let err = assert_err!(
        service
            .products()
            .save_product("SKU-000032", ProductStatus::Analyzing, &late.product, &late.record)
            .await
    );
    assert_eq!(expect_conflict(err), Some(ProductStatus::PurchaseApproved));

    let stored = service.products().get("SKU-000032").unwrap();
    assert_eq!(stored.status, ProductStatus::PurchaseApproved);
    assert_eq!(stored.stages.len(), 1);
    assert_eq!(stored.stages[0].next_status, ProductStatus::PurchaseApproved);
}

#[tokio::test]
async fn test_shipped_product_has_no_next_step() {
    let mut product = analyzing_product("SKU-000031");
    product.status = ProductStatus::Shipped;
    let service = service_with(vec![product], complete_configuration());

    let err = assert_err!(
        service
            .advance("SKU-000031", input(ProductStatus::Shipped, json!({})), ActorRole::Admin)
            .await
    );
    assert_eq!(workflow_error(&err), &WorkflowError::NoTransition(ProductStatus::Shipped));
}

#[tokio::test]
async fn test_excluded_product_is_refused() {
    let service = service_with(vec![analyzing_product("SKU-000040")], complete_configuration());

    let err = assert_err!(service.exclude_product("SKU-000040", ActorRole::Supplier).await);
    assert!(matches!(err, AppError::InsufficientPermissions(_)));

    let excluded = assert_ok!(service.exclude_product("SKU-000040", ActorRole::Buyer).await);
    assert!(excluded.excluded);

    let err = assert_err!(
        service
            .advance("SKU-000040", input(ProductStatus::Analyzing, json!({ "approved": true })), ActorRole::Buyer)
            .await
    );
    assert_eq!(
        workflow_error(&err),
        &WorkflowError::ProductExcluded("SKU-000040".to_string())
    );
}

#[tokio::test]
async fn test_unknown_product() {
    let service = service();
    let err = assert_err!(
        service
            .advance("SKU-999999", input(ProductStatus::Analyzing, json!({})), ActorRole::Buyer)
            .await
    );
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_malformed_payload_is_rejected() {
    let service = service_with(vec![analyzing_product("SKU-000041")], complete_configuration());
    let err = assert_err!(
        service
            .advance("SKU-000041", input(ProductStatus::Analyzing, json!([1, 2, 3])), ActorRole::Buyer)
            .await
    );
    assert!(matches!(workflow_error(&err), WorkflowError::MalformedPayload(_)));
}

#[tokio::test]
async fn test_oversized_quotation_is_refused() {
    let mut product = analyzing_product("SKU-000042");
    product.status = ProductStatus::QuoteRequested;
    let service = service_with(vec![product], complete_configuration());

    let mut payload = quotation();
    payload["unit_price"] = json!("1000000000000000000000000000");
    let err = assert_err!(
        service
            .advance("SKU-000042", input(ProductStatus::QuoteRequested, payload), ActorRole::Supplier)
            .await
    );
    assert_eq!(
        workflow_error(&err),
        &WorkflowError::invalid("unit_price", "must not exceed 1000000000000")
    );

    let stored = service.products().get("SKU-000042").unwrap();
    assert_eq!(stored.status, ProductStatus::QuoteRequested);
    assert!(stored.stages.is_empty());
}

#[tokio::test]
async fn test_cost_overflow_at_approval_is_an_error() {
    let mut product = analyzing_product("SKU-000043");
    product.fob_price = Some(Money::new(dec("1000000000000000000000000000"), Currency::Usd));
    let service = service_with(vec![product], complete_configuration());

    let err = assert_err!(
        service
            .advance("SKU-000043", input(ProductStatus::Analyzing, json!({ "approved": false })), ActorRole::Buyer)
            .await
    );
    assert_eq!(
        workflow_error(&err),
        &WorkflowError::invalid("cif_local", "is out of range")
    );

    let stored = service.products().get("SKU-000043").unwrap();
    assert_eq!(stored.status, ProductStatus::Analyzing);
    assert_eq!(stored.landed_cost, None);
}

#[tokio::test]
async fn test_derived_unit_volume_is_kept_exactly() {
    let mut product = analyzing_product("SKU-000044");
    product.status = ProductStatus::QuoteRequested;
    let service = service_with(vec![product], complete_configuration());

    let mut payload = quotation();
    payload["units_per_case"] = json!(3);
    payload["case_volume_cbm"] = json!("0.1");
    let result = assert_ok!(
        service
            .advance("SKU-000044", input(ProductStatus::QuoteRequested, payload), ActorRole::Supplier)
            .await
    );

    let recorded = match &result.record.details {
        StageDetails::Quotation { unit_volume_cbm, .. } => *unit_volume_cbm,
        other => panic!("expected a quotation record, got {:?}", other),
    };
    let stored = service.products().get("SKU-000044").unwrap();
    assert_eq!(stored.unit_volume_cbm, Some(recorded));
    assert_eq!(recorded, dec("0.1") / Decimal::from(3));
}

// ============================================================================
// SKU rewrite
// ============================================================================

#[tokio::test]
async fn test_duplicate_sku_leaves_product_unchanged() {
    let mut taken = analyzing_product("MUG-350");
    taken.status = ProductStatus::Shipped;
    let service = service_with(
        vec![analyzing_product("SKU-000050"), taken],
        complete_configuration(),
    );

    let err = assert_err!(
        service
            .advance(
                "SKU-000050",
                input(ProductStatus::Analyzing, json!({ "approved": true, "new_sku": "MUG-350" })),
                ActorRole::Buyer,
            )
            .await
    );
    assert_eq!(workflow_error(&err), &WorkflowError::DuplicateSku("MUG-350".to_string()));

    let stored = service.products().get("SKU-000050").unwrap();
    assert_eq!(stored.status, ProductStatus::Analyzing);
    assert!(stored.stages.is_empty());
}

#[tokio::test]
async fn test_catalog_sku_is_not_rewritten() {
    let service = service_with(vec![analyzing_product("MUG-100")], complete_configuration());
    let err = assert_err!(
        service
            .advance(
                "MUG-100",
                input(ProductStatus::Analyzing, json!({ "approved": true, "new_sku": "MUG-101" })),
                ActorRole::Buyer,
            )
            .await
    );
    assert_eq!(workflow_error(&err), &WorkflowError::SkuNotRewritable("MUG-100".to_string()));
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_incomplete_configuration_blocks_approval() {
    let service = service_with(vec![analyzing_product("SKU-000060")], Configuration::default());

    let err = assert_err!(
        service
            .advance("SKU-000060", input(ProductStatus::Analyzing, json!({ "approved": true })), ActorRole::Buyer)
            .await
    );
    match workflow_error(&err) {
        WorkflowError::ConfigurationIncomplete { missing } => {
            assert!(missing.contains(&"exchange_rates.rmb_to_usd".to_string()));
            assert!(missing.contains(&"marketplace.commission_pct".to_string()));
        }
        other => panic!("unexpected error {:?}", other),
    }

    let stored = service.products().get("SKU-000060").unwrap();
    assert_eq!(stored.status, ProductStatus::Analyzing);
}

#[tokio::test]
async fn test_only_admin_replaces_configuration() {
    let service = service_with(Vec::new(), Configuration::default());

    let err = assert_err!(
        service
            .replace_configuration(complete_configuration(), ActorRole::Buyer)
            .await
    );
    assert!(matches!(err, AppError::InsufficientPermissions(_)));

    assert_ok!(
        service
            .replace_configuration(complete_configuration(), ActorRole::Admin)
            .await
    );
    let current = assert_ok!(service.current_configuration().await);
    assert_ok!(current.resolve());
}

#[tokio::test]
async fn test_preview_analysis_records_nothing() {
    let service = service_with(vec![analyzing_product("SKU-000061")], complete_configuration());

    let analysis = assert_ok!(service.preview_analysis("SKU-000061", Some(dec("20000"))).await);
    assert_eq!(analysis.margin.selling_price, dec("20000"));

    let stored = service.products().get("SKU-000061").unwrap();
    assert!(stored.stages.is_empty());
    assert_eq!(stored.landed_cost, None);
}

// ============================================================================
// Containers
// ============================================================================

fn manufactured_product(sku: &str) -> Product {
    let mut product = analyzing_product(sku);
    product.status = ProductStatus::Manufactured;
    product.approved_quantity = Some(144);
    product.confirmed_quantity = Some(144);
    product.manufactured_quantity = Some(144);
    product
}

#[tokio::test]
async fn test_unknown_container_causes_no_writes() {
    let service = service_with(vec![manufactured_product("SKU-000070")], complete_configuration());

    let err = assert_err!(
        service
            .advance(
                "SKU-000070",
                input(ProductStatus::Manufactured, json!({ "container_number": "TGHU0000000" })),
                ActorRole::Supplier,
            )
            .await
    );
    assert!(matches!(err, AppError::ContainerNotFound(_)));

    let stored = service.products().get("SKU-000070").unwrap();
    assert_eq!(stored.status, ProductStatus::Manufactured);
    assert!(stored.stages.is_empty());
    assert_eq!(stored.container_number, None);
}

#[tokio::test]
async fn test_shipped_container_accepts_nothing() {
    let service = service_with(vec![manufactured_product("SKU-000071")], complete_configuration());
    service.containers().set_status(CONTAINER, ContainerStatus::Shipped);

    let err = assert_err!(
        service
            .advance(
                "SKU-000071",
                input(ProductStatus::Manufactured, json!({ "container_number": CONTAINER })),
                ActorRole::Supplier,
            )
            .await
    );
    assert!(matches!(err, AppError::ContainerNotFound(_)));
}

#[tokio::test]
async fn test_failed_save_detaches_container() {
    let service = service_with(vec![manufactured_product("SKU-000072")], complete_configuration());
    service.products().set_read_only(true);

    let err = assert_err!(
        service
            .advance(
                "SKU-000072",
                input(ProductStatus::Manufactured, json!({ "container_number": CONTAINER })),
                ActorRole::Supplier,
            )
            .await
    );
    assert!(matches!(err, AppError::Internal(_)));

    let container = service.containers().get(CONTAINER).unwrap();
    assert_eq!(container.used_cbm, Decimal::ZERO);
    assert!(container.products.is_empty());
    assert_eq!(container.status, ContainerStatus::Created);

    let stored = service.products().get("SKU-000072").unwrap();
    assert_eq!(stored.status, ProductStatus::Manufactured);
}

/// Product store whose reads predate a write another actor already committed
struct StaleReads {
    inner: MemoryProductStore,
    snapshot: Product,
}

#[axum::async_trait]
impl ProductStore for StaleReads {
    async fn load_product(&self, _sku: &str) -> AppResult<Product> {
        Ok(self.snapshot.clone())
    }

    async fn sku_exists(&self, sku: &str) -> AppResult<bool> {
        self.inner.sku_exists(sku).await
    }

    async fn next_sequence(&self) -> AppResult<u32> {
        self.inner.next_sequence().await
    }

    async fn insert_product(&self, product: &Product) -> AppResult<()> {
        self.inner.insert_product(product).await
    }

    async fn save_product(
        &self,
        expected_sku: &str,
        expected_status: ProductStatus,
        product: &Product,
        record: &StageRecord,
    ) -> AppResult<()> {
        self.inner
            .save_product(expected_sku, expected_status, product, record)
            .await
    }

    async fn exclude_product(&self, sku: &str) -> AppResult<Product> {
        self.inner.exclude_product(sku).await
    }
}

#[tokio::test]
async fn test_concurrent_shipping_conflicts_and_detaches() {
    let snapshot = manufactured_product("SKU-000073");
    let winner = outcome_from(
        &snapshot,
        json!({ "container_number": "TGHU0000000" }),
        ActorRole::Supplier,
    );

    let containers = MemoryContainerProvider::new();
    containers.add_container(CONTAINER, dec("68"));
    let service = WorkflowService::new(
        StaleReads {
            inner: MemoryProductStore::with_products(vec![winner.product]),
            snapshot,
        },
        MemoryConfigurationProvider::new(complete_configuration()),
        containers,
    );

    let err = assert_err!(
        service
            .advance(
                "SKU-000073",
                input(ProductStatus::Manufactured, json!({ "container_number": CONTAINER })),
                ActorRole::Supplier,
            )
            .await
    );
    assert_eq!(expect_conflict(err), Some(ProductStatus::Shipped));

    let stored = service.products().inner.get("SKU-000073").unwrap();
    assert_eq!(stored.stages.len(), 1);
    assert_eq!(stored.container_number.as_deref(), Some("TGHU0000000"));

    let container = service.containers().get(CONTAINER).unwrap();
    assert!(container.products.is_empty());
    assert_eq!(container.used_cbm, Decimal::ZERO);
    assert_eq!(container.status, ContainerStatus::Created);
}

#[tokio::test]
async fn test_detach_keeps_container_in_use_while_loaded() {
    let service = service_with(
        vec![manufactured_product("SKU-000074"), manufactured_product("SKU-000075")],
        complete_configuration(),
    );
    let ship = || input(ProductStatus::Manufactured, json!({ "container_number": CONTAINER }));

    assert_ok!(service.advance("SKU-000074", ship(), ActorRole::Supplier).await);
    service.products().set_read_only(true);
    assert_err!(service.advance("SKU-000075", ship(), ActorRole::Supplier).await);

    let container = service.containers().get(CONTAINER).unwrap();
    assert_eq!(container.status, ContainerStatus::InUse);
    assert_eq!(container.products.len(), 1);
    assert_eq!(container.used_cbm, dec("8.64"));
}
