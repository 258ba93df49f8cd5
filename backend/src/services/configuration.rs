//! PostgreSQL configuration provider
//!
//! The cost configuration is one JSON document in a single-row table.

use rust_decimal::Decimal;
use sqlx::PgPool;

use shared::Configuration;

use super::collaborators::ConfigurationProvider;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgConfigurationProvider {
    db: PgPool,
    standard_container_cbm: Decimal,
}

impl PgConfigurationProvider {
    pub fn new(db: PgPool, standard_container_cbm: Decimal) -> Self {
        Self {
            db,
            standard_container_cbm,
        }
    }
}

#[axum::async_trait]
impl ConfigurationProvider for PgConfigurationProvider {
    async fn current_configuration(&self) -> AppResult<Configuration> {
        let data = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT data FROM configuration WHERE id = 1",
        )
        .fetch_optional(&self.db)
        .await?;

        let mut config = match data {
            Some(value) => serde_json::from_value::<Configuration>(value)
                .map_err(|e| AppError::Internal(format!("Stored configuration is corrupt: {}", e)))?,
            None => Configuration::default(),
        };
        config.container_cbm.get_or_insert(self.standard_container_cbm);
        Ok(config)
    }

    async fn replace_configuration(&self, config: &Configuration) -> AppResult<Configuration> {
        let data = serde_json::to_value(config)
            .map_err(|e| AppError::Internal(format!("Failed to encode configuration: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO configuration (id, data, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(data)
        .execute(&self.db)
        .await?;

        tracing::info!("Cost configuration replaced");
        Ok(config.clone())
    }
}
