//! API operations and their required parameters.

use std::{fmt, str::FromStr};

use crate::error::DevPayError;

/// One remote API operation.
///
/// The wire name is sent as the `method` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Fetch a previously prepared or executed charge.
    RetrieveCharge,
    /// Execute a charge against a card or stored customer.
    ExecuteCharge,
    /// Refund an executed charge.
    RefundCharge,
    /// Create a customer with an active card.
    CreateCustomer,
    /// Replace the active card of a customer.
    UpdateCustomer,
    /// Add a once-off amount to a customer's account.
    BillCustomer,
    /// Fetch billing info for a customer.
    RetrieveCustomer,
    /// Delete a customer.
    DeleteCustomer,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::RetrieveCharge,
        Self::ExecuteCharge,
        Self::RefundCharge,
        Self::CreateCustomer,
        Self::UpdateCustomer,
        Self::BillCustomer,
        Self::RetrieveCustomer,
        Self::DeleteCustomer,
    ];

    /// Returns the wire name sent in the `method` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RetrieveCharge => "retrieve_charge",
            Self::ExecuteCharge => "execute_charge",
            Self::RefundCharge => "refund_charge",
            Self::CreateCustomer => "create_customer",
            Self::UpdateCustomer => "update_customer",
            Self::BillCustomer => "bill_customer",
            Self::RetrieveCustomer => "retrieve_customer",
            Self::DeleteCustomer => "delete_customer",
        }
    }

    /// Returns the keys that must be present in the caller's parameters.
    ///
    /// Keys are checked in this order and the first missing one is reported.
    #[must_use]
    pub const fn required_params(self) -> &'static [&'static str] {
        match self {
            Self::ExecuteCharge => &["amount", "currency"],
            Self::BillCustomer => &["id", "amount"],
            Self::CreateCustomer => &[],
            Self::RetrieveCharge
            | Self::RefundCharge
            | Self::UpdateCustomer
            | Self::RetrieveCustomer
            | Self::DeleteCustomer => &["id"],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DevPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| DevPayError::InvalidInput(format!("unknown operation: {s}")))
    }
}
