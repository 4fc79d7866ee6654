//! Shared domain enums, stored as text columns

use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, Postgres,
};
use utoipa::ToSchema;

/// Declares a closed set of string values with serde, OpenAPI and SQLx support.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <&str as Decode<Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
                <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Reservation
// ---------------------------------------------------------------------------

text_enum! {
    /// Reservation lifecycle state
    ReservationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl ReservationStatus {
    /// States that hold the equipment for their interval
    pub const BLOCKING: [ReservationStatus; 2] = [ReservationStatus::Approved, ReservationStatus::Active];

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Rejected | ReservationStatus::Completed | ReservationStatus::Cancelled
        )
    }

    pub fn is_blocking(&self) -> bool {
        Self::BLOCKING.contains(self)
    }
}

text_enum! {
    PaymentStatus {
        Unpaid => "unpaid",
        Partial => "partial",
        Paid => "paid",
        Refunded => "refunded",
    }
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

text_enum! {
    /// Equipment status, projected from reservations and maintenance
    EquipmentStatus {
        Available => "available",
        Rented => "rented",
        Maintenance => "maintenance",
        Inactive => "inactive",
    }
}

text_enum! {
    EquipmentCategory {
        Excavator => "excavator",
        Bulldozer => "bulldozer",
        Crane => "crane",
        Loader => "loader",
        Compactor => "compactor",
        Other => "other",
    }
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

text_enum! {
    MaintenanceStatus {
        Scheduled => "scheduled",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    MaintenanceType {
        Preventive => "preventive",
        Corrective => "corrective",
        Emergency => "emergency",
    }
}

text_enum! {
    MaintenancePriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

text_enum! {
    Role {
        Client => "client",
        Admin => "admin",
    }
}
