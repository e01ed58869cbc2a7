//! Single entry point for planning one trip.
//!
//! `plan_load` validates the input, computes utilization, sequences the units
//! and assembles a [`LoadPlanResult`]. It is a pure transformation: no I/O, no
//! retained state, and no partial results on error.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::error::PlanError;
use crate::model::LoadPlanInput;
use crate::sequencer::{SequencedUnit, order_units};
use crate::utilization::{BindingConstraint, Utilization, utilization_of};

/// Tunables of the planner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Maximum number of units a single plan may expand to.
    pub max_units: usize,
    /// Utilization (percent) above which a plan is logged as overloaded.
    pub overload_warning_pct: f64,
}

impl PlannerConfig {
    pub const DEFAULT_MAX_UNITS: usize = 10_000;
    pub const DEFAULT_OVERLOAD_WARNING_PCT: f64 = 100.0;

    pub fn builder() -> PlannerConfigBuilder {
        PlannerConfigBuilder::default()
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_units: Self::DEFAULT_MAX_UNITS,
            overload_warning_pct: Self::DEFAULT_OVERLOAD_WARNING_PCT,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PlannerConfigBuilder {
    config: PlannerConfig,
}

impl PlannerConfigBuilder {
    pub fn max_units(mut self, max_units: usize) -> Self {
        self.config.max_units = max_units;
        self
    }

    pub fn overload_warning_pct(mut self, pct: f64) -> Self {
        self.config.overload_warning_pct = pct;
        self
    }

    pub fn build(self) -> PlannerConfig {
        self.config
    }
}

/// Utilization figures plus the full loading sequence of a trip.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadPlanResult {
    pub truck_id: String,
    pub total_volume_m3: f64,
    pub total_weight_kg: f64,
    pub volume_utilization_pct: f64,
    pub weight_utilization_pct: f64,
    pub max_utilization_pct: f64,
    pub sequenced_items: Vec<SequencedUnit>,
}

impl LoadPlanResult {
    fn assemble(truck_id: String, utilization: Utilization, units: Vec<SequencedUnit>) -> Self {
        Self {
            truck_id,
            total_volume_m3: utilization.total_volume_m3,
            total_weight_kg: utilization.total_weight_kg,
            volume_utilization_pct: utilization.volume_utilization_pct,
            weight_utilization_pct: utilization.weight_utilization_pct,
            max_utilization_pct: utilization.max_utilization_pct,
            sequenced_items: units,
        }
    }

    pub fn utilization(&self) -> Utilization {
        Utilization {
            total_volume_m3: self.total_volume_m3,
            total_weight_kg: self.total_weight_kg,
            volume_utilization_pct: self.volume_utilization_pct,
            weight_utilization_pct: self.weight_utilization_pct,
            max_utilization_pct: self.max_utilization_pct,
        }
    }

    pub fn unit_count(&self) -> usize {
        self.sequenced_items.len()
    }

    pub fn is_overloaded(&self) -> bool {
        self.utilization().is_overloaded()
    }

    pub fn summary(&self) -> PlanSummary {
        let orders: HashSet<&str> = self
            .sequenced_items
            .iter()
            .map(|u| u.line_item.order_id.as_str())
            .collect();

        PlanSummary {
            unit_count: self.unit_count(),
            order_count: orders.len(),
            fragile_units: self
                .sequenced_items
                .iter()
                .filter(|u| u.product.fragile)
                .count(),
            upright_units: self
                .sequenced_items
                .iter()
                .filter(|u| u.product.no_lie_down)
                .count(),
            binding_constraint: self.utilization().binding_constraint(),
            overloaded: self.is_overloaded(),
        }
    }
}

/// Counts for dashboards and log lines.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub unit_count: usize,
    pub order_count: usize,
    pub fragile_units: usize,
    pub upright_units: usize,
    pub binding_constraint: BindingConstraint,
    pub overloaded: bool,
}

/// Plans a trip with the default configuration.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use load_planner::model::{LoadPlanInput, OrderLineItem, ProductSpec, ResolvedLineItem, TruckSpec};
/// use load_planner::planner::plan_load;
///
/// let truck = TruckSpec::new("T1", (443.0, 250.0, 210.0), 3.0).unwrap();
/// let product = ProductSpec::new("P1", "Sofa", (107.0, 88.0, 53.0), 45.0);
/// let when = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
/// let item = OrderLineItem::new("ORD-1", "P1", 2, when);
///
/// let plan = plan_load(&LoadPlanInput::new(truck, vec![ResolvedLineItem::new(item, product)])).unwrap();
/// assert_eq!(plan.sequenced_items.len(), 2);
/// ```
pub fn plan_load(input: &LoadPlanInput) -> Result<LoadPlanResult, PlanError> {
    plan_load_with_config(input, PlannerConfig::default())
}

/// Plans a trip with a custom configuration.
pub fn plan_load_with_config(
    input: &LoadPlanInput,
    config: PlannerConfig,
) -> Result<LoadPlanResult, PlanError> {
    input.validate()?;

    let requested = input.unit_count();
    if requested > config.max_units as u64 {
        return Err(PlanError::TooManyUnits {
            requested,
            limit: config.max_units,
        });
    }

    // Validated once above; the unchecked cores skip the per-stage checks.
    let utilization = utilization_of(&input.truck, &input.items);
    let units = order_units(&input.items);

    debug!(
        truck_id = %input.truck.id,
        line_items = input.items.len(),
        units = units.len(),
        volume_pct = utilization.volume_utilization_pct,
        weight_pct = utilization.weight_utilization_pct,
        "load plan computed"
    );
    if utilization.max_utilization_pct > config.overload_warning_pct {
        warn!(
            truck_id = %input.truck.id,
            max_pct = utilization.max_utilization_pct,
            threshold = config.overload_warning_pct,
            "planned load exceeds truck capacity"
        );
    }

    Ok(LoadPlanResult::assemble(
        input.truck.id.clone(),
        utilization,
        units,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderLineItem, ProductSpec, ResolvedLineItem, TruckSpec};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, hour, 0, 0).unwrap()
    }

    fn truck_3t() -> TruckSpec {
        TruckSpec::new("truck-3t", (443.0, 250.0, 210.0), 3.0).unwrap()
    }

    fn line(order: &str, hour: u32, quantity: u32, product: ProductSpec) -> ResolvedLineItem {
        ResolvedLineItem::new(
            OrderLineItem::new(order, product.id.clone(), quantity, at(hour)),
            product,
        )
    }

    fn sample_input() -> LoadPlanInput {
        LoadPlanInput::new(
            truck_3t(),
            vec![
                line("ORD-2", 13, 1, ProductSpec::new("bed", "Bed", (200.0, 160.0, 30.0), 60.0)),
                line(
                    "ORD-1",
                    9,
                    3,
                    ProductSpec::new("vase", "Vase", (30.0, 30.0, 60.0), 3.0).fragile(),
                ),
                line(
                    "ORD-1",
                    9,
                    1,
                    ProductSpec::new("fridge", "Fridge", (70.0, 70.0, 180.0), 80.0).upright(),
                ),
            ],
        )
    }

    #[test]
    fn reference_sofa_plan() {
        let input = LoadPlanInput::new(
            truck_3t(),
            vec![line(
                "ORD-1",
                9,
                1,
                ProductSpec::new("sofa", "Sofa", (107.0, 88.0, 53.0), 45.0),
            )],
        );
        let plan = plan_load(&input).unwrap();

        assert!((plan.total_volume_m3 - 0.499).abs() < 1e-3);
        assert!((plan.volume_utilization_pct - 2.15).abs() < 0.01);
        assert!((plan.weight_utilization_pct - 1.5).abs() < 1e-9);
        assert!((plan.max_utilization_pct - 2.15).abs() < 0.01);
        assert_eq!(plan.sequenced_items.len(), 1);
    }

    #[test]
    fn empty_trip_gives_empty_plan() {
        let plan = plan_load(&LoadPlanInput::new(truck_3t(), Vec::new())).unwrap();
        assert_eq!(plan.total_volume_m3, 0.0);
        assert_eq!(plan.volume_utilization_pct, 0.0);
        assert_eq!(plan.weight_utilization_pct, 0.0);
        assert!(plan.sequenced_items.is_empty());
        assert!(!plan.is_overloaded());
    }

    #[test]
    fn zero_height_truck_is_rejected() {
        let mut input = sample_input();
        input.truck.height_cm = 0.0;
        let err = plan_load(&input).unwrap_err();
        assert_eq!(err.code(), "invalid_truck_spec");
        assert_eq!(err.field(), Some("heightCm"));
    }

    #[test]
    fn malformed_line_fails_whole_plan() {
        let mut input = sample_input();
        input.items[2].product.package_height_cm = f64::NAN;
        let err = plan_load(&input).unwrap_err();
        assert!(matches!(
            err,
            PlanError::MalformedLineItem {
                index: 2,
                field: "packageHeightCm",
                ..
            }
        ));
    }

    #[test]
    fn sequence_and_summary() {
        let plan = plan_load(&sample_input()).unwrap();
        let ids: Vec<_> = plan
            .sequenced_items
            .iter()
            .map(|u| u.product.id.as_str())
            .collect();
        assert_eq!(ids, vec!["vase", "vase", "vase", "fridge", "bed"]);

        let summary = plan.summary();
        assert_eq!(summary.unit_count, 5);
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.fragile_units, 3);
        assert_eq!(summary.upright_units, 1);
        assert_eq!(summary.binding_constraint, BindingConstraint::Volume);
        assert!(!summary.overloaded);
    }

    #[test]
    fn degenerate_truck_volume_is_rejected_not_nan() {
        let mut input = LoadPlanInput::new(truck_3t(), Vec::new());
        input.truck.length_cm = 1e-110;
        input.truck.width_cm = 1e-110;
        input.truck.height_cm = 1e-110;
        let err = plan_load(&input).unwrap_err();
        assert_eq!(err.code(), "invalid_truck_spec");
        assert_eq!(err.field(), Some("volumeM3"));
    }

    #[test]
    fn infinite_line_totals_fail_the_plan() {
        let input = LoadPlanInput::new(
            truck_3t(),
            vec![line(
                "ORD-1",
                9,
                2,
                ProductSpec::new("slab", "Slab", (1e200, 1e200, 1e200), 10.0),
            )],
        );
        let err = plan_load(&input).unwrap_err();
        assert_eq!(err.code(), "malformed_line_item");
        assert_eq!(err.field(), Some("unitVolumeM3"));
    }

    #[test]
    fn planning_is_idempotent() {
        let input = sample_input();
        let first = plan_load(&input).unwrap();
        let second = plan_load(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unit_limit_is_enforced() {
        let config = PlannerConfig::builder().max_units(4).build();
        let err = plan_load_with_config(&sample_input(), config).unwrap_err();
        assert_eq!(
            err,
            PlanError::TooManyUnits {
                requested: 5,
                limit: 4
            }
        );

        let config = PlannerConfig::builder().max_units(5).build();
        assert!(plan_load_with_config(&sample_input(), config).is_ok());
    }

    #[test]
    fn overload_is_surfaced_not_clamped() {
        crate::logging::init_test();
        let input = LoadPlanInput::new(
            truck_3t(),
            vec![line(
                "ORD-1",
                9,
                31,
                ProductSpec::new("pallet", "Pallet", (100.0, 100.0, 75.0), 100.0),
            )],
        );
        let plan = plan_load(&input).unwrap();
        assert!(plan.weight_utilization_pct > 100.0);
        assert!(plan.max_utilization_pct > 100.0);
        assert!(plan.summary().overloaded);
        assert_eq!(
            plan.summary().binding_constraint,
            BindingConstraint::Weight
        );
    }
}
