//! Error taxonomy of the planner.
//!
//! Every error is a synchronous validation failure. Each carries a stable
//! machine-readable code plus the offending field where one applies, so
//! callers can render their own messages.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Truck dimension or capacity is not a positive finite number.
    #[error("invalid truck spec '{truck_id}': {field} {reason}, got {value}")]
    InvalidTruckSpec {
        truck_id: String,
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A line item or its resolved product cannot be planned.
    #[error(
        "malformed line item #{index} (order '{order_id}', product '{product_id}'): {field} {reason}"
    )]
    MalformedLineItem {
        index: usize,
        order_id: String,
        product_id: String,
        field: &'static str,
        reason: String,
    },

    #[error("unknown product '{product_id}' referenced by line item #{index}")]
    UnknownProduct { index: usize, product_id: String },

    #[error("unknown truck '{truck_id}'")]
    UnknownTruck { truck_id: String },

    #[error("duplicate {entity} id '{id}' in catalog")]
    DuplicateCatalogEntry { entity: &'static str, id: String },

    #[error("plan would expand to {requested} units, limit is {limit}")]
    TooManyUnits { requested: u64, limit: usize },
}

impl PlanError {
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::InvalidTruckSpec { .. } => "invalid_truck_spec",
            PlanError::MalformedLineItem { .. } => "malformed_line_item",
            PlanError::UnknownProduct { .. } => "unknown_product",
            PlanError::UnknownTruck { .. } => "unknown_truck",
            PlanError::DuplicateCatalogEntry { .. } => "duplicate_catalog_entry",
            PlanError::TooManyUnits { .. } => "too_many_units",
        }
    }

    /// Name of the offending input field, when the error is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PlanError::InvalidTruckSpec { field, .. } => Some(*field),
            PlanError::MalformedLineItem { field, .. } => Some(*field),
            PlanError::UnknownProduct { .. } => Some("productId"),
            PlanError::UnknownTruck { .. } => Some("truckId"),
            PlanError::DuplicateCatalogEntry { .. } => Some("id"),
            PlanError::TooManyUnits { .. } => Some("quantity"),
        }
    }
}
