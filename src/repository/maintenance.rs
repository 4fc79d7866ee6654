//! Maintenance repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::MaintenanceStore;
use crate::{
    error::{AppError, AppResult},
    models::Maintenance,
};

#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: Pool<Postgres>,
}

impl MaintenanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaintenanceStore for MaintenanceRepository {
    async fn get(&self, id: Uuid) -> AppResult<Maintenance> {
        sqlx::query_as::<_, Maintenance>("SELECT * FROM maintenance WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Maintenance {} not found", id)))
    }

    async fn insert(&self, m: &Maintenance) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO maintenance (
                id, equipment_id, maintenance_type, status, priority, title, description,
                scheduled_date, estimated_duration, actual_start_date, actual_end_date,
                technician_id, assigned_by, labor_cost, parts_cost, external_cost,
                work_performed, next_maintenance_date, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21)
            "#,
        )
        .bind(m.id)
        .bind(m.equipment_id)
        .bind(m.maintenance_type)
        .bind(m.status)
        .bind(m.priority)
        .bind(&m.title)
        .bind(&m.description)
        .bind(m.scheduled_date)
        .bind(m.estimated_duration)
        .bind(m.actual_start_date)
        .bind(m.actual_end_date)
        .bind(m.technician_id)
        .bind(m.assigned_by)
        .bind(m.labor_cost)
        .bind(m.parts_cost)
        .bind(m.external_cost)
        .bind(&m.work_performed)
        .bind(m.next_maintenance_date)
        .bind(&m.notes)
        .bind(m.created_at)
        .bind(m.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, m: &Maintenance) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE maintenance SET
                status = $2, actual_start_date = $3, actual_end_date = $4,
                technician_id = $5, labor_cost = $6, parts_cost = $7, external_cost = $8,
                work_performed = $9, next_maintenance_date = $10, notes = $11, updated_at = $12,
                maintenance_type = $13, priority = $14, title = $15, description = $16,
                scheduled_date = $17, estimated_duration = $18
            WHERE id = $1
            "#,
        )
        .bind(m.id)
        .bind(m.status)
        .bind(m.actual_start_date)
        .bind(m.actual_end_date)
        .bind(m.technician_id)
        .bind(m.labor_cost)
        .bind(m.parts_cost)
        .bind(m.external_cost)
        .bind(&m.work_performed)
        .bind(m.next_maintenance_date)
        .bind(&m.notes)
        .bind(m.updated_at)
        .bind(m.maintenance_type)
        .bind(m.priority)
        .bind(&m.title)
        .bind(&m.description)
        .bind(m.scheduled_date)
        .bind(m.estimated_duration)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Maintenance {} not found", m.id)));
        }
        Ok(())
    }

    async fn has_other_in_progress(&self, equipment_id: Uuid, exclude: Option<Uuid>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM maintenance
                WHERE equipment_id = $1
                  AND status = 'in_progress'
                  AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(equipment_id)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Maintenance>> {
        let rows = sqlx::query_as::<_, Maintenance>(
            r#"
            SELECT * FROM maintenance
            WHERE status = 'scheduled' AND scheduled_date < $1
            ORDER BY scheduled_date
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
