//! Pure order-total calculations: subtotal, discount, shipping, tax and
//! order-number generation.
//!
//! Everything here is referentially transparent; services call these with
//! plain data and persist the results. Money is `rust_decimal::Decimal`
//! throughout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// First order number issued when no prior order exists.
pub const FIRST_ORDER_NUMBER: u64 = 1001;

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// A line as fed into the totals calculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LineInput {
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl LineInput {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Sum of line totals.
pub fn subtotal(lines: &[LineInput]) -> Decimal {
    lines.iter().map(LineInput::line_total).sum()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DiscountSettings {
    pub kind: DiscountKind,
    /// Percentage points for [`DiscountKind::Percentage`], an absolute
    /// amount for [`DiscountKind::Fixed`].
    pub value: Decimal,
    /// Subtotals below this get no discount at all.
    pub minimum_amount: Option<Decimal>,
    /// Upper cap on the computed discount.
    pub maximum_discount: Option<Decimal>,
}

/// Discount applied to `subtotal`. Suppressed entirely below
/// `minimum_amount`, capped at `maximum_discount`, and never more than the
/// amount being discounted.
pub fn discount_amount(subtotal: Decimal, settings: Option<&DiscountSettings>) -> Decimal {
    let Some(settings) = settings else {
        return Decimal::ZERO;
    };

    if let Some(minimum) = settings.minimum_amount {
        if subtotal < minimum {
            return Decimal::ZERO;
        }
    }

    let mut amount = match settings.kind {
        DiscountKind::Percentage => subtotal * settings.value / HUNDRED,
        DiscountKind::Fixed => settings.value,
    };

    if let Some(maximum) = settings.maximum_discount {
        amount = amount.min(maximum);
    }

    amount.min(subtotal)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShippingSettings {
    pub amount: Decimal,
    /// Subtotals at or above this ship free.
    pub free_above: Option<Decimal>,
}

pub fn shipping_amount(subtotal: Decimal, settings: Option<&ShippingSettings>) -> Decimal {
    let Some(settings) = settings else {
        return Decimal::ZERO;
    };

    match settings.free_above {
        Some(threshold) if subtotal >= threshold => Decimal::ZERO,
        _ => settings.amount,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Tax is added on top of the taxable amount.
    Exclusive,
    /// The taxable amount already contains tax; the tax portion is
    /// back-calculated out of it and reported, not added again.
    Inclusive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaxSettings {
    /// Rate in percentage points, e.g. 8.5 for 8.5%.
    pub rate: Decimal,
    pub mode: TaxMode,
}

/// Result of a full totals calculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub shipping_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Compute all totals for an order in one pass.
///
/// `taxable = subtotal - discount + shipping`; exclusive tax is added to
/// the total, inclusive tax is only reported.
pub fn calculate_totals(
    lines: &[LineInput],
    discount: Option<&DiscountSettings>,
    shipping: Option<&ShippingSettings>,
    tax: Option<&TaxSettings>,
) -> OrderTotals {
    let subtotal = subtotal(lines);
    let discount_amount = discount_amount(subtotal, discount);
    let shipping_amount = shipping_amount(subtotal, shipping);
    let taxable = subtotal - discount_amount + shipping_amount;

    let (tax_amount, total) = match tax {
        Some(settings) => match settings.mode {
            TaxMode::Exclusive => {
                let tax = taxable * settings.rate / HUNDRED;
                (tax, taxable + tax)
            }
            TaxMode::Inclusive => {
                let tax = taxable * settings.rate / (HUNDRED + settings.rate);
                (tax, taxable)
            }
        },
        None => (Decimal::ZERO, taxable),
    };

    OrderTotals {
        subtotal,
        discount_amount,
        shipping_amount,
        tax_amount,
        total,
    }
}

/// Next order number: the trailing numeric suffix of the last known number
/// plus one, or [`FIRST_ORDER_NUMBER`] when there is no prior order or the
/// suffix does not parse.
///
/// No uniqueness is enforced here; two clients generating concurrently can
/// produce the same number and the unique index on `orders.order_number`
/// turns that into a conflict at insert time.
pub fn generate_order_number(prefix: &str, last: Option<&str>) -> String {
    let next = last
        .map(|last| last.strip_prefix(prefix).unwrap_or(last))
        .and_then(|digits| digits.parse::<u64>().ok())
        .map(|n| n + 1)
        .unwrap_or(FIRST_ORDER_NUMBER);

    format!("{}{}", prefix, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lines() -> Vec<LineInput> {
        vec![
            LineInput {
                unit_price: dec!(10),
                quantity: 2,
            },
            LineInput {
                unit_price: dec!(5),
                quantity: 1,
            },
        ]
    }

    #[test]
    fn subtotal_sums_line_totals() {
        assert_eq!(subtotal(&lines()), dec!(25));
    }

    #[test]
    fn full_totals_with_percentage_discount_shipping_and_exclusive_tax() {
        let discount = DiscountSettings {
            kind: DiscountKind::Percentage,
            value: dec!(10),
            minimum_amount: None,
            maximum_discount: None,
        };
        let shipping = ShippingSettings {
            amount: dec!(5),
            free_above: None,
        };
        let tax = TaxSettings {
            rate: dec!(8.5),
            mode: TaxMode::Exclusive,
        };

        let totals = calculate_totals(&lines(), Some(&discount), Some(&shipping), Some(&tax));

        assert_eq!(totals.subtotal, dec!(25));
        assert_eq!(totals.discount_amount, dec!(2.5));
        assert_eq!(totals.shipping_amount, dec!(5));
        assert_eq!(totals.tax_amount, dec!(2.3375));
        assert_eq!(totals.total, dec!(29.8375));
    }

    #[test]
    fn discount_suppressed_below_minimum() {
        let discount = DiscountSettings {
            kind: DiscountKind::Percentage,
            value: dec!(10),
            minimum_amount: Some(dec!(50)),
            maximum_discount: None,
        };
        assert_eq!(discount_amount(dec!(25), Some(&discount)), dec!(0));
    }

    #[test]
    fn discount_capped_by_maximum() {
        let discount = DiscountSettings {
            kind: DiscountKind::Percentage,
            value: dec!(50),
            minimum_amount: None,
            maximum_discount: Some(dec!(10)),
        };
        assert_eq!(discount_amount(dec!(100), Some(&discount)), dec!(10));
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() {
        let discount = DiscountSettings {
            kind: DiscountKind::Fixed,
            value: dec!(75),
            minimum_amount: None,
            maximum_discount: None,
        };
        assert_eq!(discount_amount(dec!(50), Some(&discount)), dec!(50));
    }

    #[test]
    fn shipping_free_above_threshold() {
        let shipping = ShippingSettings {
            amount: dec!(5),
            free_above: Some(dec!(20)),
        };
        assert_eq!(shipping_amount(dec!(25), Some(&shipping)), dec!(0));
        assert_eq!(shipping_amount(dec!(19.99), Some(&shipping)), dec!(5));
    }

    #[test]
    fn inclusive_tax_is_extracted_not_added() {
        let tax = TaxSettings {
            rate: dec!(10),
            mode: TaxMode::Inclusive,
        };
        let totals = calculate_totals(
            &[LineInput {
                unit_price: dec!(110),
                quantity: 1,
            }],
            None,
            None,
            Some(&tax),
        );
        assert_eq!(totals.tax_amount, dec!(10));
        assert_eq!(totals.total, dec!(110));
    }

    #[test]
    fn order_number_increments_trailing_suffix() {
        assert_eq!(generate_order_number("#", Some("#1042")), "#1043");
    }

    #[test]
    fn order_number_starts_at_default_without_prior_order() {
        assert_eq!(generate_order_number("#", None), "#1001");
    }

    #[test]
    fn order_number_resets_on_unparseable_suffix() {
        assert_eq!(generate_order_number("#", Some("#draft")), "#1001");
    }
}
