//! PostgreSQL container provider

use rust_decimal::Decimal;
use sqlx::PgPool;

use shared::ContainerAssignment;

use super::collaborators::ContainerProvider;
use crate::error::{AppError, AppResult};

/// Container lifecycle as stored in `containers.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Created,
    InUse,
    Shipped,
}

impl ContainerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerStatus::Created => "CREATED",
            ContainerStatus::InUse => "IN_USE",
            ContainerStatus::Shipped => "SHIPPED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(ContainerStatus::Created),
            "IN_USE" => Some(ContainerStatus::InUse),
            "SHIPPED" => Some(ContainerStatus::Shipped),
            _ => None,
        }
    }

    /// Only containers still being loaded accept products
    pub fn accepts_products(&self) -> bool {
        matches!(self, ContainerStatus::Created | ContainerStatus::InUse)
    }
}

#[derive(Clone)]
pub struct PgContainerProvider {
    db: PgPool,
}

impl PgContainerProvider {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[axum::async_trait]
impl ContainerProvider for PgContainerProvider {
    async fn attach_product(&self, assignment: &ContainerAssignment) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let container = sqlx::query_as::<_, (String, Decimal, Decimal)>(
            r#"
            SELECT status, max_cbm, used_cbm
            FROM containers
            WHERE container_number = $1
            FOR UPDATE
            "#,
        )
        .bind(&assignment.container_number)
        .fetch_optional(&mut *tx)
        .await?;

        let (status, max_cbm, used_cbm) = match container {
            Some((status, max_cbm, used_cbm))
                if ContainerStatus::from_str(&status).is_some_and(|s| s.accepts_products()) =>
            {
                (status, max_cbm, used_cbm)
            }
            _ => {
                tx.rollback().await?;
                return Err(AppError::ContainerNotFound(assignment.container_number.clone()));
            }
        };

        let new_used = used_cbm + assignment.volume_cbm;
        if new_used > max_cbm {
            tracing::warn!(
                container = %assignment.container_number,
                sku = %assignment.sku,
                used_cbm = %new_used,
                max_cbm = %max_cbm,
                "Container loaded beyond its capacity"
            );
        }

        sqlx::query(
            r#"
            INSERT INTO container_products (container_number, sku, volume_cbm, attached_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (container_number, sku)
            DO UPDATE SET volume_cbm = container_products.volume_cbm + EXCLUDED.volume_cbm
            "#,
        )
        .bind(&assignment.container_number)
        .bind(&assignment.sku)
        .bind(assignment.volume_cbm)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE containers SET used_cbm = $2, status = $3, updated_at = NOW() WHERE container_number = $1",
        )
        .bind(&assignment.container_number)
        .bind(new_used)
        .bind(ContainerStatus::InUse.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            container = %assignment.container_number,
            sku = %assignment.sku,
            previous_status = %status,
            volume_cbm = %assignment.volume_cbm,
            "Product attached to container"
        );
        Ok(())
    }

    async fn detach_product(&self, assignment: &ContainerAssignment) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE container_products
            SET volume_cbm = volume_cbm - $3
            WHERE container_number = $1 AND sku = $2
            "#,
        )
        .bind(&assignment.container_number)
        .bind(&assignment.sku)
        .bind(assignment.volume_cbm)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM container_products WHERE container_number = $1 AND sku = $2 AND volume_cbm <= 0",
        )
        .bind(&assignment.container_number)
        .bind(&assignment.sku)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE containers
            SET used_cbm = GREATEST(used_cbm - $2, 0),
                status = CASE
                    WHEN status = 'IN_USE' AND NOT EXISTS (
                        SELECT 1 FROM container_products WHERE container_number = $1
                    ) THEN 'CREATED'
                    ELSE status
                END,
                updated_at = NOW()
            WHERE container_number = $1
            "#,
        )
        .bind(&assignment.container_number)
        .bind(assignment.volume_cbm)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_open_containers_accept_products() {
        assert!(ContainerStatus::Created.accepts_products());
        assert!(ContainerStatus::InUse.accepts_products());
        assert!(!ContainerStatus::Shipped.accepts_products());
    }

    #[test]
    fn test_status_strings() {
        for status in [ContainerStatus::Created, ContainerStatus::InUse, ContainerStatus::Shipped] {
            assert_eq!(ContainerStatus::from_str(status.as_str()), Some(status));
        }
    }
}
