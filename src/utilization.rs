//! Volume and weight utilization of a truck for one trip.
//!
//! The headline figure is the larger of the two percentages: either limit on
//! its own can make a load impossible. Percentages are never capped, a value
//! above 100 is the overload signal.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::PlanError;
use crate::model::{ResolvedLineItem, TruckSpec};

/// Which capacity limit produced the headline utilization figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum BindingConstraint {
    Volume,
    Weight,
}

/// Aggregate load of a trip measured against the truck capacity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Utilization {
    pub total_volume_m3: f64,
    pub total_weight_kg: f64,
    pub volume_utilization_pct: f64,
    pub weight_utilization_pct: f64,
    pub max_utilization_pct: f64,
}

impl Utilization {
    /// Ties report `Volume`.
    pub fn binding_constraint(&self) -> BindingConstraint {
        if self.weight_utilization_pct > self.volume_utilization_pct {
            BindingConstraint::Weight
        } else {
            BindingConstraint::Volume
        }
    }

    pub fn is_overloaded(&self) -> bool {
        self.max_utilization_pct > 100.0
    }
}

/// Computes the utilization of `truck` by the given line items.
///
/// The truck is validated first so the divisions below never see a zero or
/// negative capacity. Line items are assumed to be validated by the caller.
pub fn calculate_utilization(
    truck: &TruckSpec,
    items: &[ResolvedLineItem],
) -> Result<Utilization, PlanError> {
    truck.validate()?;
    Ok(utilization_of(truck, items))
}

/// Unchecked core of [`calculate_utilization`]; the truck must already be valid.
pub(crate) fn utilization_of(truck: &TruckSpec, items: &[ResolvedLineItem]) -> Utilization {
    let (total_volume_m3, total_weight_kg) = items
        .iter()
        .fold((0.0_f64, 0.0_f64), |(volume, weight), line| {
            (volume + line.line_volume_m3(), weight + line.line_weight_kg())
        });

    let volume_utilization_pct = 100.0 * total_volume_m3 / truck.volume_m3();
    let weight_utilization_pct = 100.0 * total_weight_kg / truck.weight_capacity_kg();

    Utilization {
        total_volume_m3,
        total_weight_kg,
        volume_utilization_pct,
        weight_utilization_pct,
        max_utilization_pct: volume_utilization_pct.max(weight_utilization_pct),
    }
}

/// Clamps a percentage into `0..=100` for progress bars.
///
/// Display only. Never feed the clamped value back into planning.
pub fn display_percentage(pct: f64) -> f64 {
    if pct.is_nan() {
        return 0.0;
    }
    pct.clamp(0.0, 100.0)
}
