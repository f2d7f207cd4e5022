//! # Shipping Recalculation
//!
//! Pure total arithmetic for shipping selections. Used when a payment sheet
//! opens (preselected option) and every time the payer picks another option.

use crate::details::{PaymentDetails, ShippingOption};
use crate::money::{sum_values, CurrencyAmount};
use serde::{Deserialize, Serialize};

/// A total including shipping, ready to show on a payment sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculatedTotal {
    pub label: String,
    pub amount: CurrencyAmount,
    /// Inherited from the item total
    pub pending: bool,
}

impl RecalculatedTotal {
    fn with_shipping(details: &PaymentDetails, option: Option<&ShippingOption>) -> Self {
        let total = details.total();
        let value = match option {
            Some(option) => sum_values([total.amount.value, option.amount.value]),
            None => total.amount.value,
        };

        Self {
            label: total.label,
            amount: CurrencyAmount::new(value, total.amount.currency),
            pending: total.pending,
        }
    }
}

/// Total after the payer selects shipping option `option_id`.
///
/// Returns `None` when the option is unknown, so a stale selection leaves the
/// sheet's total untouched instead of failing checkout.
pub fn recalculate_total(details: &PaymentDetails, option_id: &str) -> Option<RecalculatedTotal> {
    details
        .shipping_option(option_id)
        .map(|option| RecalculatedTotal::with_shipping(details, Some(option)))
}

/// Total to open the payment sheet with: item total plus the preselected
/// shipping option, or the plain item total when none is selected.
pub fn checkout_total(details: &PaymentDetails) -> RecalculatedTotal {
    RecalculatedTotal::with_shipping(details, details.selected_shipping_option())
}
