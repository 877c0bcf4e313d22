//! Payable price for a ticket purchase.
//!
//! Discounts apply to the unit price, and the undiscounted price is the unit
//! price alone; `quantity` does not scale either branch. Assignments already
//! stored were priced this way, so the rule is kept as is.

use rust_decimal::Decimal;

use crate::models::{Discount, DiscountUnit};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Price charged for a purchase at `unit_price`, after at most one discount.
///
/// The result is never negative. `None` means the arithmetic left the range
/// `Decimal` can represent.
pub fn payable_price(unit_price: Decimal, discount: Option<&Discount>) -> Option<Decimal> {
    let payable = match discount {
        None => unit_price,
        Some(d) => match d.unit {
            DiscountUnit::Percent => {
                let factor = Decimal::ONE.checked_sub(d.value.checked_div(HUNDRED)?)?;
                unit_price.checked_mul(factor)?
            }
            DiscountUnit::Amount => unit_price.checked_sub(d.value)?,
        },
    };
    Some(payable.max(Decimal::ZERO))
}
