//! Address types.

use crate::ids::{AddressId, CustomerId};
use serde::{Deserialize, Serialize};

/// A customer's delivery address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    /// Address ID.
    pub id: AddressId,
    /// Customer the address belongs to.
    pub customer_id: CustomerId,
    /// Recipient name.
    #[serde(default)]
    pub recipient: String,
    /// Street line.
    #[serde(default)]
    pub line1: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// Shipping region; selects the store's shipping rate.
    pub region: String,
    /// Postal/ZIP code.
    #[serde(default)]
    pub postal_code: String,
}

impl Address {
    /// Create an address with just the fields shipping needs.
    pub fn new(id: AddressId, customer_id: CustomerId, region: impl Into<String>) -> Self {
        Self {
            id,
            customer_id,
            recipient: String::new(),
            line1: String::new(),
            city: String::new(),
            region: region.into(),
            postal_code: String::new(),
        }
    }

    /// Check if the address belongs to a customer.
    pub fn is_owned_by(&self, customer_id: &CustomerId) -> bool {
        &self.customer_id == customer_id
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        [
            self.recipient.as_str(),
            self.line1.as_str(),
            self.city.as_str(),
            self.region.as_str(),
            self.postal_code.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
    }
}
