//! In-memory store used by service tests

use std::{collections::HashMap, sync::Arc, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{EquipmentStore, MaintenanceStore, ReservationStore, Stores, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::EquipmentQuery, Equipment, EquipmentStatus, Maintenance, MaintenanceStatus,
        Period, Reservation, ReservationStatus, User,
    },
};

#[derive(Default)]
pub struct MemoryStore {
    equipment: Mutex<HashMap<Uuid, Equipment>>,
    reservations: Mutex<HashMap<Uuid, Reservation>>,
    maintenance: Mutex<HashMap<Uuid, Maintenance>>,
    users: Mutex<HashMap<Uuid, User>>,
    /// Equipment ids whose status writes fail, to exercise partial failures
    failing_status_writes: Mutex<Vec<Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stores(self: &Arc<Self>) -> Stores {
        Stores {
            equipment: self.clone(),
            reservations: self.clone(),
            maintenance: self.clone(),
            users: self.clone(),
        }
    }

    pub fn put_equipment(&self, equipment: Equipment) {
        self.equipment.lock().unwrap().insert(equipment.id, equipment);
    }

    pub fn put_reservation(&self, reservation: Reservation) {
        self.reservations
            .lock()
            .unwrap()
            .insert(reservation.id, reservation);
    }

    pub fn put_maintenance(&self, maintenance: Maintenance) {
        self.maintenance
            .lock()
            .unwrap()
            .insert(maintenance.id, maintenance);
    }

    pub fn put_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn equipment_status(&self, id: Uuid) -> EquipmentStatus {
        self.equipment.lock().unwrap()[&id].status
    }

    pub fn reservation(&self, id: Uuid) -> Reservation {
        self.reservations.lock().unwrap()[&id].clone()
    }

    pub fn maintenance(&self, id: Uuid) -> Maintenance {
        self.maintenance.lock().unwrap()[&id].clone()
    }

    pub fn fail_status_writes(&self, equipment_id: Uuid) {
        self.failing_status_writes.lock().unwrap().push(equipment_id);
    }
}

#[async_trait]
impl EquipmentStore for MemoryStore {
    async fn get(&self, id: Uuid) -> AppResult<Equipment> {
        self.equipment
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        let mut rows: Vec<Equipment> = self
            .equipment
            .lock()
            .unwrap()
            .values()
            .filter(|e| query.status.map_or(true, |s| e.status == s))
            .filter(|e| query.category.map_or(true, |c| e.category == c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn insert(&self, equipment: &Equipment) -> AppResult<()> {
        self.put_equipment(equipment.clone());
        Ok(())
    }

    async fn save(&self, equipment: &Equipment) -> AppResult<()> {
        let mut map = self.equipment.lock().unwrap();
        match map.get_mut(&equipment.id) {
            Some(slot) => {
                *slot = equipment.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Equipment {} not found", equipment.id))),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.equipment
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    async fn set_status(&self, id: Uuid, status: EquipmentStatus) -> AppResult<()> {
        if self.failing_status_writes.lock().unwrap().contains(&id) {
            return Err(AppError::Internal("status write failed".to_string()));
        }
        let mut map = self.equipment.lock().unwrap();
        let equipment = map
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;
        equipment.status = status;
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn get(&self, id: Uuid) -> AppResult<Reservation> {
        self.reservations
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    async fn insert(&self, reservation: &Reservation) -> AppResult<()> {
        self.put_reservation(reservation.clone());
        Ok(())
    }

    async fn save(&self, reservation: &Reservation) -> AppResult<()> {
        let mut map = self.reservations.lock().unwrap();
        match map.get_mut(&reservation.id) {
            Some(slot) => {
                *slot = reservation.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "Reservation {} not found",
                reservation.id
            ))),
        }
    }

    async fn has_blocking_overlap(
        &self,
        equipment_id: Uuid,
        period: &Period,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        Ok(self.reservations.lock().unwrap().values().any(|r| {
            r.equipment_id == equipment_id
                && Some(r.id) != exclude
                && r.status.is_blocking()
                && r.period().overlaps(period)
        }))
    }

    async fn has_other_occupying(
        &self,
        equipment_id: Uuid,
        exclude: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        Ok(self.reservations.lock().unwrap().values().any(|r| {
            r.equipment_id == equipment_id
                && Some(r.id) != exclude
                && (r.status == ReservationStatus::Active
                    || (r.status == ReservationStatus::Approved && r.period().contains(at)))
        }))
    }

    async fn has_blocking(&self, equipment_id: Uuid) -> AppResult<bool> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .values()
            .any(|r| r.equipment_id == equipment_id && r.status.is_blocking()))
    }

    async fn find_approved_starting(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .reservations
            .lock()
            .unwrap()
            .values()
            .filter(|r| {
                r.status == ReservationStatus::Approved && r.start_date >= from && r.start_date < to
            })
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.start_date);
        Ok(rows)
    }

    async fn find_active_ending_before(&self, until: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .reservations
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == ReservationStatus::Active && r.end_date < until)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.end_date);
        Ok(rows)
    }

    async fn find_active_at(&self, at: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .reservations
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == ReservationStatus::Active && r.period().contains(at))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.end_date);
        Ok(rows)
    }
}

#[async_trait]
impl MaintenanceStore for MemoryStore {
    async fn get(&self, id: Uuid) -> AppResult<Maintenance> {
        self.maintenance
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Maintenance {} not found", id)))
    }

    async fn insert(&self, maintenance: &Maintenance) -> AppResult<()> {
        self.put_maintenance(maintenance.clone());
        Ok(())
    }

    async fn save(&self, maintenance: &Maintenance) -> AppResult<()> {
        let mut map = self.maintenance.lock().unwrap();
        match map.get_mut(&maintenance.id) {
            Some(slot) => {
                *slot = maintenance.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "Maintenance {} not found",
                maintenance.id
            ))),
        }
    }

    async fn has_other_in_progress(&self, equipment_id: Uuid, exclude: Option<Uuid>) -> AppResult<bool> {
        Ok(self.maintenance.lock().unwrap().values().any(|m| {
            m.equipment_id == equipment_id
                && Some(m.id) != exclude
                && m.status == MaintenanceStatus::InProgress
        }))
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Maintenance>> {
        let mut rows: Vec<Maintenance> = self
            .maintenance
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.status == MaintenanceStatus::Scheduled && m.scheduled_date < now)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.scheduled_date);
        Ok(rows)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, id: Uuid) -> AppResult<User> {
        self.users
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        self.put_user(user.clone());
        Ok(())
    }
}
