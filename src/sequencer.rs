//! Loading order for the physical units of a trip.
//!
//! Every line item is expanded into one entry per unit, then the units are
//! stable-sorted. The first key that differs decides:
//!
//! 1. scheduled delivery time, earliest first
//! 2. fragile units first
//! 3. units that must stay upright last
//! 4. larger package volume first
//!
//! Units tied on all four keys keep their input order. The position in the
//! returned sequence is the load-this-Nth instruction for the crew.

use std::cmp::Ordering;

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::PlanError;
use crate::model::{OrderLineItem, ProductSpec, ResolvedLineItem};

/// One physical unit in the loading sequence.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SequencedUnit {
    /// 1-based position in the loading sequence.
    pub load_position: usize,
    /// 1-based index of this unit within its line item.
    pub unit_index: u32,
    pub line_item: OrderLineItem,
    pub product: ProductSpec,
    pub unit_volume_m3: f64,
}

impl SequencedUnit {
    fn from_line(line: &ResolvedLineItem, unit_index: u32) -> Self {
        Self {
            load_position: 0,
            unit_index,
            line_item: line.item.clone(),
            product: line.product.clone(),
            unit_volume_m3: line.unit_volume_m3(),
        }
    }
}

/// Compares two units by the loading priority described in the module docs.
///
/// Pure and total, so it can drive `sort_by` directly. Volumes are compared
/// with `total_cmp`; validated input never contains NaN.
pub fn compare_units(a: &SequencedUnit, b: &SequencedUnit) -> Ordering {
    a.line_item
        .scheduled_delivery_time
        .cmp(&b.line_item.scheduled_delivery_time)
        // `true` sorts after `false`, so compare reversed to put fragile first.
        .then_with(|| b.product.fragile.cmp(&a.product.fragile))
        .then_with(|| a.product.no_lie_down.cmp(&b.product.no_lie_down))
        .then_with(|| {
            b.product
                .package_volume_cm3()
                .total_cmp(&a.product.package_volume_cm3())
        })
}

/// Expands `quantity` into individual units, preserving input order.
pub fn expand_units(items: &[ResolvedLineItem]) -> Vec<SequencedUnit> {
    items
        .iter()
        .flat_map(|line| (1..=line.item.quantity).map(move |n| SequencedUnit::from_line(line, n)))
        .collect()
}

/// Validates, expands and sorts the line items into a loading sequence.
///
/// The input slice is left untouched; a fresh sequence is returned.
pub fn sequence_units(items: &[ResolvedLineItem]) -> Result<Vec<SequencedUnit>, PlanError> {
    for (index, line) in items.iter().enumerate() {
        line.validate(index)?;
    }
    Ok(order_units(items))
}

/// Unchecked core of [`sequence_units`]; every line must already be valid.
pub(crate) fn order_units(items: &[ResolvedLineItem]) -> Vec<SequencedUnit> {
    let mut units = expand_units(items);
    // `sort_by` is stable.
    units.sort_by(compare_units);
    for (idx, unit) in units.iter_mut().enumerate() {
        unit.load_position = idx + 1;
    }
    units
}
