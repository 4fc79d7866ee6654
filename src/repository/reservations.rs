//! Reservations repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::ReservationStore;
use crate::{
    error::{AppError, AppResult},
    models::{Period, Reservation},
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for ReservationsRepository {
    /// Get reservation by ID
    async fn get(&self, id: Uuid) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    async fn insert(&self, r: &Reservation) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, equipment_id, client_id, start_date, end_date, status,
                daily_rate, number_of_days, delivery_required, delivery_cost, total_cost,
                delivery_street, delivery_city, delivery_postal_code, notes, admin_notes,
                approved_by, approved_at, rejection_reason, cancellation_reason,
                payment_status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(r.id)
        .bind(r.equipment_id)
        .bind(r.client_id)
        .bind(r.start_date)
        .bind(r.end_date)
        .bind(r.status)
        .bind(r.daily_rate)
        .bind(r.number_of_days)
        .bind(r.delivery_required)
        .bind(r.delivery_cost)
        .bind(r.total_cost)
        .bind(&r.delivery_street)
        .bind(&r.delivery_city)
        .bind(&r.delivery_postal_code)
        .bind(&r.notes)
        .bind(&r.admin_notes)
        .bind(r.approved_by)
        .bind(r.approved_at)
        .bind(&r.rejection_reason)
        .bind(&r.cancellation_reason)
        .bind(r.payment_status)
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, r: &Reservation) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE reservations SET
                start_date = $2, end_date = $3, status = $4, daily_rate = $5,
                number_of_days = $6, delivery_cost = $7, total_cost = $8,
                admin_notes = $9, approved_by = $10, approved_at = $11,
                rejection_reason = $12, cancellation_reason = $13,
                payment_status = $14, updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(r.id)
        .bind(r.start_date)
        .bind(r.end_date)
        .bind(r.status)
        .bind(r.daily_rate)
        .bind(r.number_of_days)
        .bind(r.delivery_cost)
        .bind(r.total_cost)
        .bind(&r.admin_notes)
        .bind(r.approved_by)
        .bind(r.approved_at)
        .bind(&r.rejection_reason)
        .bind(&r.cancellation_reason)
        .bind(r.payment_status)
        .bind(r.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reservation {} not found", r.id)));
        }
        Ok(())
    }

    async fn has_blocking_overlap(
        &self,
        equipment_id: Uuid,
        period: &Period,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE equipment_id = $1
                  AND status IN ('approved', 'active')
                  AND start_date < $3
                  AND end_date > $2
                  AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(equipment_id)
        .bind(period.start)
        .bind(period.end)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn has_other_occupying(
        &self,
        equipment_id: Uuid,
        exclude: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE equipment_id = $1
                  AND ($2::uuid IS NULL OR id <> $2)
                  AND (
                      status = 'active'
                      OR (status = 'approved' AND start_date <= $3 AND end_date >= $3)
                  )
            )
            "#,
        )
        .bind(equipment_id)
        .bind(exclude)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn has_blocking(&self, equipment_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE equipment_id = $1 AND status IN ('approved', 'active'))",
        )
        .bind(equipment_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_approved_starting(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE status = 'approved' AND start_date >= $1 AND start_date < $2
            ORDER BY start_date
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_active_ending_before(&self, until: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE status = 'active' AND end_date < $1 ORDER BY end_date",
        )
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_active_at(&self, at: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE status = 'active' AND start_date <= $1 AND end_date >= $1
            ORDER BY end_date
            "#,
        )
        .bind(at)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
