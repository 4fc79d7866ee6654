//! Equipment repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::EquipmentStore;
use crate::{
    error::{AppError, AppResult},
    models::{equipment::EquipmentQuery, Equipment, EquipmentStatus},
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EquipmentStore for EquipmentRepository {
    /// Get equipment by ID
    async fn get(&self, id: Uuid) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// List equipment, optionally filtered by status and category
    async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            r#"
            SELECT * FROM equipment
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR category = $2)
            ORDER BY name
            "#,
        )
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, equipment: &Equipment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO equipment (
                id, name, description, category, brand, model, year, daily_rate, city,
                status, minimum_rental_days, maximum_rental_days, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(equipment.id)
        .bind(&equipment.name)
        .bind(&equipment.description)
        .bind(equipment.category)
        .bind(&equipment.brand)
        .bind(&equipment.model)
        .bind(equipment.year)
        .bind(equipment.daily_rate)
        .bind(&equipment.city)
        .bind(equipment.status)
        .bind(equipment.minimum_rental_days)
        .bind(equipment.maximum_rental_days)
        .bind(equipment.created_at)
        .bind(equipment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, equipment: &Equipment) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE equipment SET
                name = $2, description = $3, category = $4, brand = $5, model = $6,
                year = $7, daily_rate = $8, city = $9, status = $10,
                minimum_rental_days = $11, maximum_rental_days = $12, updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(equipment.id)
        .bind(&equipment.name)
        .bind(&equipment.description)
        .bind(equipment.category)
        .bind(&equipment.brand)
        .bind(&equipment.model)
        .bind(equipment.year)
        .bind(equipment.daily_rate)
        .bind(&equipment.city)
        .bind(equipment.status)
        .bind(equipment.minimum_rental_days)
        .bind(equipment.maximum_rental_days)
        .bind(equipment.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", equipment.id)));
        }
        Ok(())
    }

    /// Delete equipment
    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: EquipmentStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE equipment SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }
}
