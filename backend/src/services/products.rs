//! PostgreSQL product store

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use shared::{ActorRole, Currency, Money, Product, ProductStatus, StageRecord, WorkflowError};

use super::collaborators::ProductStore;
use crate::error::{AppError, AppResult};

/// Product store backed by the `products` and `product_stage_records` tables
#[derive(Clone)]
pub struct PgProductStore {
    db: PgPool,
}

/// Database row for a product
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    sku: String,
    description: String,
    reference_link: Option<String>,
    status: String,
    excluded: bool,
    fob_amount: Option<Decimal>,
    fob_currency: Option<String>,
    unit_volume_cbm: Option<Decimal>,
    units_per_case: Option<i64>,
    case_volume_cbm: Option<Decimal>,
    minimum_order_quantity: Option<i64>,
    selling_price: Option<Decimal>,
    suggested_quantity: Option<i64>,
    requested_quantity: Option<i64>,
    approved_quantity: Option<i64>,
    confirmed_quantity: Option<i64>,
    manufactured_quantity: Option<i64>,
    shipped_quantity: Option<i64>,
    landed_cost: Option<Decimal>,
    projected_margin: Option<Decimal>,
    container_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Database row for a stage record
#[derive(Debug, sqlx::FromRow)]
struct StageRecordRow {
    id: Uuid,
    previous_status: String,
    next_status: String,
    actor_role: String,
    recorded_at: DateTime<Utc>,
    details: serde_json::Value,
}

const PRODUCT_COLUMNS: &str = r#"
    sku, description, reference_link, status, excluded,
    fob_amount, fob_currency, unit_volume_cbm, units_per_case, case_volume_cbm,
    minimum_order_quantity, selling_price,
    suggested_quantity, requested_quantity, approved_quantity,
    confirmed_quantity, manufactured_quantity, shipped_quantity,
    landed_cost, projected_margin, container_number, created_at, updated_at
"#;

fn parse_status(value: &str) -> AppResult<ProductStatus> {
    ProductStatus::from_str(value)
        .ok_or_else(|| AppError::Internal(format!("Unknown product status in database: {}", value)))
}

fn quantity(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

fn db_quantity(value: Option<u32>) -> Option<i64> {
    value.map(i64::from)
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> AppResult<Self> {
        let fob_price = match (row.fob_amount, row.fob_currency) {
            (Some(amount), Some(currency)) => {
                let currency: Currency = currency.parse().map_err(AppError::Internal)?;
                Some(Money::new(amount, currency))
            }
            _ => None,
        };

        Ok(Product {
            status: parse_status(&row.status)?,
            sku: row.sku,
            description: row.description,
            reference_link: row.reference_link,
            excluded: row.excluded,
            fob_price,
            unit_volume_cbm: row.unit_volume_cbm,
            units_per_case: quantity(row.units_per_case),
            case_volume_cbm: row.case_volume_cbm,
            minimum_order_quantity: quantity(row.minimum_order_quantity),
            selling_price: row.selling_price,
            suggested_quantity: quantity(row.suggested_quantity),
            requested_quantity: quantity(row.requested_quantity),
            approved_quantity: quantity(row.approved_quantity),
            confirmed_quantity: quantity(row.confirmed_quantity),
            manufactured_quantity: quantity(row.manufactured_quantity),
            shipped_quantity: quantity(row.shipped_quantity),
            landed_cost: row.landed_cost,
            projected_margin: row.projected_margin,
            container_number: row.container_number,
            stages: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<StageRecordRow> for StageRecord {
    type Error = AppError;

    fn try_from(row: StageRecordRow) -> AppResult<Self> {
        let actor_role = ActorRole::from_str(&row.actor_role).ok_or_else(|| {
            AppError::Internal(format!("Unknown actor role in database: {}", row.actor_role))
        })?;
        let details = serde_json::from_value(row.details)
            .map_err(|e| AppError::Internal(format!("Corrupt stage record {}: {}", row.id, e)))?;

        Ok(StageRecord {
            id: row.id,
            previous_status: parse_status(&row.previous_status)?,
            next_status: parse_status(&row.next_status)?,
            actor_role,
            recorded_at: row.recorded_at,
            details,
        })
    }
}

/// Turn a unique violation on the SKU into the engine's duplicate error
fn duplicate_sku(err: sqlx::Error, sku: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            WorkflowError::DuplicateSku(sku.to_string()).into()
        }
        _ => err.into(),
    }
}

impl PgProductStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn current_status(&self, sku: &str) -> AppResult<Option<ProductStatus>> {
        let status = sqlx::query_scalar::<_, String>("SELECT status FROM products WHERE sku = $1")
            .bind(sku)
            .fetch_optional(&self.db)
            .await?;
        status.as_deref().map(parse_status).transpose()
    }
}

#[axum::async_trait]
impl ProductStore for PgProductStore {
    async fn load_product(&self, sku: &str) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE sku = $1",
            PRODUCT_COLUMNS
        ))
        .bind(sku)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {}", sku)))?;

        let records = sqlx::query_as::<_, StageRecordRow>(
            r#"
            SELECT id, previous_status, next_status, actor_role, recorded_at, details
            FROM product_stage_records
            WHERE sku = $1
            ORDER BY recorded_at, seq
            "#,
        )
        .bind(sku)
        .fetch_all(&self.db)
        .await?;

        let mut product = Product::try_from(row)?;
        product.stages = records
            .into_iter()
            .map(StageRecord::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(product)
    }

    async fn sku_exists(&self, sku: &str) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)",
        )
        .bind(sku)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn next_sequence(&self) -> AppResult<u32> {
        let next = sqlx::query_scalar::<_, i64>("SELECT nextval('provisional_sku_seq')")
            .fetch_one(&self.db)
            .await?;
        u32::try_from(next)
            .map_err(|_| AppError::Internal("Provisional SKU sequence exhausted".to_string()))
    }

    async fn insert_product(&self, product: &Product) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (sku, description, reference_link, status, excluded,
                                  suggested_quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&product.sku)
        .bind(&product.description)
        .bind(&product.reference_link)
        .bind(product.status.as_str())
        .bind(product.excluded)
        .bind(db_quantity(product.suggested_quantity))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| duplicate_sku(e, &product.sku))?;
        Ok(())
    }

    async fn save_product(
        &self,
        expected_sku: &str,
        expected_status: ProductStatus,
        product: &Product,
        record: &StageRecord,
    ) -> AppResult<()> {
        let details = serde_json::to_value(&record.details)
            .map_err(|e| AppError::Internal(format!("Failed to encode stage record: {}", e)))?;

        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET sku = $1, description = $2, reference_link = $3, status = $4, excluded = $5,
                fob_amount = $6, fob_currency = $7, unit_volume_cbm = $8, units_per_case = $9,
                case_volume_cbm = $10, minimum_order_quantity = $11, selling_price = $12,
                suggested_quantity = $13, requested_quantity = $14, approved_quantity = $15,
                confirmed_quantity = $16, manufactured_quantity = $17, shipped_quantity = $18,
                landed_cost = $19, projected_margin = $20, container_number = $21,
                updated_at = $22
            WHERE sku = $23 AND status = $24 AND NOT excluded
            "#,
        )
        .bind(&product.sku)
        .bind(&product.description)
        .bind(&product.reference_link)
        .bind(product.status.as_str())
        .bind(product.excluded)
        .bind(product.fob_price.map(|m| m.amount))
        .bind(product.fob_price.map(|m| m.currency.as_str()))
        .bind(product.unit_volume_cbm)
        .bind(db_quantity(product.units_per_case))
        .bind(product.case_volume_cbm)
        .bind(db_quantity(product.minimum_order_quantity))
        .bind(product.selling_price)
        .bind(db_quantity(product.suggested_quantity))
        .bind(db_quantity(product.requested_quantity))
        .bind(db_quantity(product.approved_quantity))
        .bind(db_quantity(product.confirmed_quantity))
        .bind(db_quantity(product.manufactured_quantity))
        .bind(db_quantity(product.shipped_quantity))
        .bind(product.landed_cost)
        .bind(product.projected_margin)
        .bind(&product.container_number)
        .bind(product.updated_at)
        .bind(expected_sku)
        .bind(expected_status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| duplicate_sku(e, &product.sku))?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(match self.current_status(expected_sku).await? {
                Some(current_status) => AppError::Conflict {
                    message: format!(
                        "Product {} is no longer {}; re-fetch before retrying",
                        expected_sku, expected_status
                    ),
                    current_status: Some(current_status),
                },
                None => AppError::NotFound(format!("Product {}", expected_sku)),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO product_stage_records
                (id, sku, stage, previous_status, next_status, actor_role, recorded_at, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(&product.sku)
        .bind(record.stage().as_str())
        .bind(record.previous_status.as_str())
        .bind(record.next_status.as_str())
        .bind(record.actor_role.as_str())
        .bind(record.recorded_at)
        .bind(details)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn exclude_product(&self, sku: &str) -> AppResult<Product> {
        let updated = sqlx::query(
            "UPDATE products SET excluded = TRUE, updated_at = NOW() WHERE sku = $1",
        )
        .bind(sku)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {}", sku)));
        }
        self.load_product(sku).await
    }
}
