use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use validator::Validate;

/// Direction of a stock movement. The serialized name is the data API's
/// collection for that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
pub enum MovementKind {
    /// Stock-in ("entrada").
    #[serde(rename = "entradas")]
    #[strum(serialize = "entradas")]
    Inbound,
    /// Stock-out ("salida").
    #[serde(rename = "salidas")]
    #[strum(serialize = "salidas")]
    Outbound,
}

impl MovementKind {
    /// Stock after applying `quantity`, or `None` when an outbound movement
    /// would drive stock below zero.
    pub fn apply(self, stock: u32, quantity: u32) -> Option<u32> {
        match self {
            MovementKind::Inbound => stock.checked_add(quantity),
            MovementKind::Outbound => stock.checked_sub(quantity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: i64,
    #[serde(rename = "productoId", alias = "productId")]
    pub product_id: i64,
    #[serde(rename = "cantidad", alias = "quantity")]
    pub quantity: u32,
    #[serde(rename = "fecha", alias = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /entradas` and `POST /salidas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovement {
    #[serde(rename = "productoId", alias = "productId")]
    pub product_id: i64,
    #[serde(rename = "cantidad", alias = "quantity")]
    pub quantity: u32,
    #[serde(rename = "fecha", alias = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl NewMovement {
    pub fn into_movement(self, id: i64) -> Movement {
        Movement {
            id,
            product_id: self.product_id,
            quantity: self.quantity,
            timestamp: self.timestamp,
        }
    }
}

/// The "Nueva Entrada / Nueva Salida" form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MovementForm {
    #[serde(rename = "productoId", alias = "productId", default)]
    #[validate(required)]
    pub product_id: Option<i64>,
    #[serde(rename = "cantidad", alias = "quantity", default)]
    #[validate(required, range(min = 1))]
    pub quantity: Option<u32>,
}
