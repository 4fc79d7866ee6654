//! Data models for the rental server

pub mod enums;
pub mod equipment;
pub mod maintenance;
pub mod reservation;
pub mod user;

// Re-export commonly used types
pub use enums::{
    EquipmentCategory, EquipmentStatus, MaintenancePriority, MaintenanceStatus, MaintenanceType,
    PaymentStatus, ReservationStatus, Role,
};
pub use equipment::Equipment;
pub use maintenance::Maintenance;
pub use reservation::{Period, Pricing, Reservation};
pub use user::{RegisterUser, User, UserClaims};
