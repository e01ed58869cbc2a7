//! Catalog lookups that turn raw line items into planner input.
//!
//! The planner never looks anything up itself. Callers resolve product and
//! truck ids through a [`Catalog`] first and hand over a complete
//! [`LoadPlanInput`].

use std::collections::HashMap;

use crate::error::PlanError;
use crate::model::{LoadPlanInput, OrderLineItem, ProductSpec, ResolvedLineItem, TruckSpec};

/// Read access to fleet and product master data.
pub trait Catalog {
    fn product(&self, id: &str) -> Option<&ProductSpec>;
    fn truck(&self, id: &str) -> Option<&TruckSpec>;
}

/// Catalog backed by in-memory maps, built per request.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    products: HashMap<String, ProductSpec>,
    trucks: HashMap<String, TruckSpec>,
}

impl InMemoryCatalog {
    /// Builds a catalog, rejecting duplicate ids.
    pub fn new(
        trucks: impl IntoIterator<Item = TruckSpec>,
        products: impl IntoIterator<Item = ProductSpec>,
    ) -> Result<Self, PlanError> {
        let mut catalog = Self::default();
        for truck in trucks {
            catalog.insert_truck(truck)?;
        }
        for product in products {
            catalog.insert_product(product)?;
        }
        Ok(catalog)
    }

    pub fn insert_truck(&mut self, truck: TruckSpec) -> Result<(), PlanError> {
        if self.trucks.contains_key(&truck.id) {
            return Err(PlanError::DuplicateCatalogEntry {
                entity: "truck",
                id: truck.id,
            });
        }
        self.trucks.insert(truck.id.clone(), truck);
        Ok(())
    }

    pub fn insert_product(&mut self, product: ProductSpec) -> Result<(), PlanError> {
        if self.products.contains_key(&product.id) {
            return Err(PlanError::DuplicateCatalogEntry {
                entity: "product",
                id: product.id,
            });
        }
        self.products.insert(product.id.clone(), product);
        Ok(())
    }
}

impl Catalog for InMemoryCatalog {
    fn product(&self, id: &str) -> Option<&ProductSpec> {
        self.products.get(id)
    }

    fn truck(&self, id: &str) -> Option<&TruckSpec> {
        self.trucks.get(id)
    }
}

/// Resolves the truck and every line item's product, keeping item order.
pub fn resolve_line_items<C: Catalog + ?Sized>(
    catalog: &C,
    truck_id: &str,
    items: Vec<OrderLineItem>,
) -> Result<LoadPlanInput, PlanError> {
    let truck = catalog
        .truck(truck_id)
        .cloned()
        .ok_or_else(|| PlanError::UnknownTruck {
            truck_id: truck_id.to_string(),
        })?;

    let resolved = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match catalog.product(&item.product_id) {
            Some(product) => Ok(ResolvedLineItem::new(item, product.clone())),
            None => Err(PlanError::UnknownProduct {
                index,
                product_id: item.product_id,
            }),
        })
        .collect::<Result<Vec<_>, PlanError>>()?;

    Ok(LoadPlanInput::new(truck, resolved))
}
