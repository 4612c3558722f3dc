use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::sales::{SellerId, StoreId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub average_ticket: Option<Decimal>,
}

impl Store {
    /// The average ticket when it is set to a positive amount.
    pub fn configured_ticket(&self) -> Option<Decimal> {
        self.average_ticket.filter(|ticket| *ticket > Decimal::ZERO)
    }

    pub fn has_ticket(&self) -> bool {
        self.configured_ticket().is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    pub store_id: StoreId,
}

/// Per-user store and seller configuration read from the record store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRoster {
    pub stores: Vec<Store>,
    pub sellers: Vec<Seller>,
}

impl StoreRoster {
    pub fn new(stores: Vec<Store>, sellers: Vec<Seller>) -> Self {
        Self { stores, sellers }
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty() && self.sellers.is_empty()
    }

    pub fn store(&self, id: &StoreId) -> Option<&Store> {
        self.stores.iter().find(|store| &store.id == id)
    }

    pub fn seller(&self, id: &SellerId) -> Option<&Seller> {
        self.sellers.iter().find(|seller| &seller.id == id)
    }

    pub fn ticket_for(&self, id: &StoreId) -> Option<Decimal> {
        self.store(id).and_then(Store::configured_ticket)
    }

    pub fn store_name<'a>(&'a self, id: &'a StoreId) -> &'a str {
        self.store(id).map(|store| store.name.as_str()).unwrap_or(id.0.as_str())
    }

    pub fn seller_name<'a>(&'a self, id: &'a SellerId) -> &'a str {
        self.seller(id).map(|seller| seller.name.as_str()).unwrap_or(id.0.as_str())
    }

    /// Stores whose average ticket is missing or not positive, in roster order.
    pub fn stores_missing_ticket(&self) -> Vec<&Store> {
        self.stores.iter().filter(|store| !store.has_ticket()).collect()
    }
}
