//! Data models for trip load planning.
//!
//! - `TruckSpec`: interior cargo space and rated payload of a truck
//! - `ProductSpec`: package geometry, weight, and handling flags of a product
//! - `OrderLineItem`: one product-and-quantity entry of an order on the trip
//! - `ResolvedLineItem`: a line item paired with its product spec
//! - `LoadPlanInput`: everything the planner needs for one trip
//!
//! All records are plain values. Capacities are derived on demand and never
//! stored next to the dimensions they come from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::error::PlanError;
use crate::types::validation::{check_non_negative, check_positive};
use crate::types::{Dimensional, Dimensions, KG_PER_TONNE, Weighted};

/// Truck interior cargo dimensions and rated payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "truck-3t",
    "name": "3t box truck",
    "lengthCm": 443.0,
    "widthCm": 250.0,
    "heightCm": 210.0,
    "ratedToneCapacity": 3.0
}))]
pub struct TruckSpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    /// Rated payload in tonnes.
    pub rated_tone_capacity: f64,
}

impl TruckSpec {
    /// Creates a truck spec after validating dimensions and capacity.
    ///
    /// # Examples
    /// ```
    /// use load_planner::model::TruckSpec;
    ///
    /// let truck = TruckSpec::new("T1", (443.0, 250.0, 210.0), 3.0).unwrap();
    /// assert!((truck.weight_capacity_kg() - 3000.0).abs() < 1e-9);
    ///
    /// assert!(TruckSpec::new("T2", (443.0, 250.0, 0.0), 3.0).is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        dims: (f64, f64, f64),
        rated_tone_capacity: f64,
    ) -> Result<Self, PlanError> {
        let truck = Self {
            id: id.into(),
            name: None,
            length_cm: dims.0,
            width_cm: dims.1,
            height_cm: dims.2,
            rated_tone_capacity,
        };
        truck.validate()?;
        Ok(truck)
    }

    /// Rejects non-positive or non-finite dimensions and capacity.
    pub fn validate(&self) -> Result<(), PlanError> {
        let invalid = |field: &'static str, value: f64, reason: &'static str| {
            PlanError::InvalidTruckSpec {
                truck_id: self.id.clone(),
                field,
                value,
                reason,
            }
        };

        let axes = [
            ("lengthCm", self.length_cm),
            ("widthCm", self.width_cm),
            ("heightCm", self.height_cm),
            ("ratedToneCapacity", self.rated_tone_capacity),
        ];
        for (field, value) in axes {
            if let Err(problem) = check_positive(value) {
                return Err(invalid(field, value, problem.describe()));
            }
        }

        // Valid axes can still multiply out to zero or infinity.
        let derived = [
            ("volumeM3", self.volume_m3()),
            ("weightCapacityKg", self.weight_capacity_kg()),
        ];
        for (field, value) in derived {
            if let Err(problem) = check_positive(value) {
                return Err(invalid(field, value, problem.describe()));
            }
        }
        Ok(())
    }

    /// Interior cargo volume in m³.
    pub fn volume_m3(&self) -> f64 {
        Dimensional::volume_m3(self)
    }

    /// Rated payload in kg.
    pub fn weight_capacity_kg(&self) -> f64 {
        self.rated_tone_capacity * KG_PER_TONNE
    }
}

impl Dimensional for TruckSpec {
    fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.length_cm, self.width_cm, self.height_cm)
    }
}

fn default_max_stack_height() -> u32 {
    1
}

/// Product package geometry and handling flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "sofa-3",
    "name": "Three-seat sofa",
    "packageLengthCm": 107.0,
    "packageWidthCm": 88.0,
    "packageHeightCm": 53.0,
    "weightKg": 45.0,
    "fragile": false,
    "noLieDown": false,
    "stackable": true,
    "maxStackHeight": 2
}))]
pub struct ProductSpec {
    pub id: String,
    pub name: String,
    pub package_length_cm: f64,
    pub package_width_cm: f64,
    pub package_height_cm: f64,
    pub weight_kg: f64,
    #[serde(default)]
    pub fragile: bool,
    /// Must stay upright during transport.
    #[serde(default)]
    pub no_lie_down: bool,
    #[serde(default)]
    pub stackable: bool,
    /// Only meaningful when `stackable` is set.
    #[serde(default = "default_max_stack_height")]
    pub max_stack_height: u32,
}

impl ProductSpec {
    /// Creates a product with no handling flags set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        package_dims: (f64, f64, f64),
        weight_kg: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            package_length_cm: package_dims.0,
            package_width_cm: package_dims.1,
            package_height_cm: package_dims.2,
            weight_kg,
            fragile: false,
            no_lie_down: false,
            stackable: false,
            max_stack_height: default_max_stack_height(),
        }
    }

    pub fn fragile(mut self) -> Self {
        self.fragile = true;
        self
    }

    pub fn upright(mut self) -> Self {
        self.no_lie_down = true;
        self
    }

    pub fn stackable_up_to(mut self, max_stack_height: u32) -> Self {
        self.stackable = true;
        self.max_stack_height = max_stack_height;
        self
    }

    /// Package volume in m³.
    pub fn unit_volume_m3(&self) -> f64 {
        Dimensional::volume_m3(self)
    }

    /// Package volume in cm³, the sequencing key.
    pub fn package_volume_cm3(&self) -> f64 {
        Dimensional::volume_cm3(self)
    }
}

impl Dimensional for ProductSpec {
    fn dimensions(&self) -> Dimensions {
        Dimensions::new(
            self.package_length_cm,
            self.package_width_cm,
            self.package_height_cm,
        )
    }
}

impl Weighted for ProductSpec {
    fn weight_kg(&self) -> f64 {
        self.weight_kg
    }
}

/// One product-and-quantity entry of an order assigned to the trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "orderId": "ORD-1001",
    "productId": "sofa-3",
    "quantity": 2,
    "scheduledDeliveryTime": "2024-05-02T09:00:00Z",
    "loadingPositionHint": "rear-left"
}))]
pub struct OrderLineItem {
    pub order_id: String,
    pub product_id: String,
    pub quantity: u32,
    /// Promised delivery time of the owning order.
    pub scheduled_delivery_time: DateTime<Utc>,
    /// Informational only; never affects the plan.
    #[serde(default)]
    pub loading_position_hint: Option<String>,
}

impl OrderLineItem {
    pub fn new(
        order_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: u32,
        scheduled_delivery_time: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            product_id: product_id.into(),
            quantity,
            scheduled_delivery_time,
            loading_position_hint: None,
        }
    }

}

/// A line item paired with the product spec it references.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLineItem {
    pub item: OrderLineItem,
    pub product: ProductSpec,
}

impl ResolvedLineItem {
    pub fn new(item: OrderLineItem, product: ProductSpec) -> Self {
        Self { item, product }
    }

    /// Validates the pair; `index` is the position in the input and is only
    /// used for error reporting.
    pub fn validate(&self, index: usize) -> Result<(), PlanError> {
        let malformed = |field: &'static str, reason: String| PlanError::MalformedLineItem {
            index,
            order_id: self.item.order_id.clone(),
            product_id: self.item.product_id.clone(),
            field,
            reason,
        };

        if self.item.order_id.trim().is_empty() {
            return Err(malformed("orderId", "must not be empty".to_string()));
        }
        if self.item.product_id.trim().is_empty() {
            return Err(malformed("productId", "must not be empty".to_string()));
        }
        if self.item.product_id != self.product.id {
            return Err(malformed(
                "productId",
                format!("does not match resolved product '{}'", self.product.id),
            ));
        }
        if self.item.quantity == 0 {
            return Err(malformed("quantity", "must be greater than 0".to_string()));
        }

        let names = ["packageLengthCm", "packageWidthCm", "packageHeightCm"];
        if let Some((field, value)) = self.product.dimensions().first_invalid(names) {
            return Err(malformed(field, format!("must be a positive number, got {value}")));
        }
        if let Err(problem) = check_non_negative(self.product.weight_kg) {
            return Err(malformed(
                "weightKg",
                format!("{}, got {}", problem.describe(), self.product.weight_kg),
            ));
        }
        if self.product.stackable && self.product.max_stack_height == 0 {
            return Err(malformed(
                "maxStackHeight",
                "must be greater than 0 for stackable products".to_string(),
            ));
        }

        let unit_volume = self.unit_volume_m3();
        if let Err(problem) = check_positive(unit_volume) {
            return Err(malformed(
                "unitVolumeM3",
                format!("{}, got {}", problem.describe(), unit_volume),
            ));
        }
        let totals = [
            ("lineVolumeM3", self.line_volume_m3()),
            ("lineWeightKg", self.line_weight_kg()),
        ];
        for (field, value) in totals {
            if let Err(problem) = check_non_negative(value) {
                return Err(malformed(field, format!("{}, got {}", problem.describe(), value)));
            }
        }
        Ok(())
    }

    pub fn unit_volume_m3(&self) -> f64 {
        self.product.unit_volume_m3()
    }

    pub fn line_volume_m3(&self) -> f64 {
        self.unit_volume_m3() * f64::from(self.item.quantity)
    }

    pub fn line_weight_kg(&self) -> f64 {
        self.product.weight_kg() * f64::from(self.item.quantity)
    }
}

/// Truck plus resolved line items for a single trip.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadPlanInput {
    pub truck: TruckSpec,
    pub items: Vec<ResolvedLineItem>,
}

impl LoadPlanInput {
    pub fn new(truck: TruckSpec, items: Vec<ResolvedLineItem>) -> Self {
        Self { truck, items }
    }

    /// Validates the truck first, then every line item in input order.
    ///
    /// Also rejects the line item whose contribution pushes a trip total past
    /// the largest finite value.
    pub fn validate(&self) -> Result<(), PlanError> {
        self.truck.validate()?;
        let (mut volume, mut weight) = (0.0_f64, 0.0_f64);
        for (index, item) in self.items.iter().enumerate() {
            item.validate(index)?;
            volume += item.line_volume_m3();
            weight += item.line_weight_kg();
            let overflow = if !volume.is_finite() {
                Some("lineVolumeM3")
            } else if !weight.is_finite() {
                Some("lineWeightKg")
            } else {
                None
            };
            if let Some(field) = overflow {
                return Err(PlanError::MalformedLineItem {
                    index,
                    order_id: item.item.order_id.clone(),
                    product_id: item.item.product_id.clone(),
                    field,
                    reason: "pushes the trip total past a finite value".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Number of physical units after quantity expansion.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|r| u64::from(r.item.quantity)).sum()
    }
}
