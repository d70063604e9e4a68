//! Reservation Model

use serde::{Deserialize, Serialize};

use super::surf_class::ClassType;

/// Share of the listed price the school keeps on partnership bookings
pub const PARTNERSHIP_SHARE: f64 = 0.8;

/// Reservation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
    Completed,
}

/// Guest skill level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurfLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Where a booking came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InternalSource {
    Whatsapp,
    Instagram,
    Website,
    Selina,
    SandhiHouse,
    Ondina,
    PacoDIlhas,
    Retreats,
    Swellnest,
    Other,
}

impl InternalSource {
    /// Partnership channels earn the school only [`PARTNERSHIP_SHARE`] of the price
    pub fn is_partnership(&self) -> bool {
        matches!(
            self,
            InternalSource::Selina
                | InternalSource::SandhiHouse
                | InternalSource::Ondina
                | InternalSource::PacoDIlhas
                | InternalSource::Swellnest
                | InternalSource::Retreats
        )
    }
}

/// Who collected the payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Marcelo,
    Vasco,
    Website,
    BankTransfer,
    PartnerCollected,
    PaidToPartnership,
}

/// Guest booking on a class (remote table `reservations`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    /// Booking id on the website, used to de-duplicate imports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub class_id: String,
    pub guest_name: String,
    pub weight: f64,
    pub height: f64,
    pub level: SurfLevel,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_source: Option<InternalSource>,
    pub booking_type: ClassType,
    pub payment_method: PaymentMethod,
    pub status: ReservationStatus,
    pub price: f64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub needs_pickup: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Reservation {
    /// Booked through one of the partnership channels
    pub fn is_partnership(&self) -> bool {
        self.internal_source.is_some_and(|s| s.is_partnership())
    }

    /// Amount the school actually earns for this booking
    pub fn school_net_value(&self) -> f64 {
        if self.is_partnership() {
            self.price * PARTNERSHIP_SHARE
        } else {
            self.price
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ReservationStatus::Cancelled
    }
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreate {
    #[serde(default)]
    pub external_id: Option<String>,
    pub class_id: String,
    pub guest_name: String,
    pub weight: f64,
    pub height: f64,
    pub level: SurfLevel,
    pub source_id: String,
    #[serde(default)]
    pub internal_source: Option<InternalSource>,
    pub booking_type: ClassType,
    pub payment_method: PaymentMethod,
    pub status: ReservationStatus,
    pub price: f64,
    #[serde(default)]
    pub needs_pickup: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ReservationCreate {
    pub fn into_reservation(self, id: String) -> Reservation {
        Reservation {
            id,
            external_id: self.external_id,
            class_id: self.class_id,
            guest_name: self.guest_name,
            weight: self.weight,
            height: self.height,
            level: self.level,
            source_id: self.source_id,
            internal_source: self.internal_source,
            booking_type: self.booking_type,
            payment_method: self.payment_method,
            status: self.status,
            price: self.price,
            needs_pickup: self.needs_pickup,
            notes: self.notes,
        }
    }
}
