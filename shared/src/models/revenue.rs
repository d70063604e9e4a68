//! Revenue Model

use serde::{Deserialize, Serialize};

use super::reservation::Reservation;

/// Category used for revenue generated from a reservation
pub const RESERVATION_REVENUE_CATEGORY: &str = "Aula";

/// Ledger revenue entry (remote table `revenues`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub id: String,
    pub value: f64,
    pub date: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Back-reference to the reservation that produced this row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
}

impl Revenue {
    /// Revenue row accompanying a newly created reservation
    pub fn for_reservation(id: String, reservation: &Reservation, date: String) -> Self {
        let description = if reservation.is_partnership() {
            format!("{} (Net 80%)", reservation.guest_name)
        } else {
            reservation.guest_name.clone()
        };

        Self {
            id,
            value: reservation.school_net_value(),
            date,
            category: RESERVATION_REVENUE_CATEGORY.to_string(),
            description: Some(description),
            reservation_id: Some(reservation.id.clone()),
        }
    }

    pub fn belongs_to(&self, reservation_id: &str) -> bool {
        self.reservation_id.as_deref() == Some(reservation_id)
    }
}

/// Create revenue payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueCreate {
    pub value: f64,
    pub date: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reservation_id: Option<String>,
}

impl RevenueCreate {
    pub fn into_revenue(self, id: String) -> Revenue {
        Revenue {
            id,
            value: self.value,
            date: self.date,
            category: self.category,
            description: self.description,
            reservation_id: self.reservation_id,
        }
    }
}
