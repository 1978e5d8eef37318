//! Types stored in the customer's session.

use serde::{Deserialize, Serialize};

use larder_core::{CustomerId, Email};
use larder_db::Customer;

/// Session-stored customer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCustomer {
    pub id: CustomerId,
    pub email: Email,
    pub name: String,
}

impl From<&Customer> for CurrentCustomer {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            email: customer.email.clone(),
            name: customer.name.clone(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// The logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// The shopping cart, for guests and customers alike.
    pub const CART: &str = "cart";
}
