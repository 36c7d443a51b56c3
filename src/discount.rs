use serde::{Deserialize, Serialize};

pub const VOLUME_MIN_ITEMS: u32 = 10;
pub const BULK_MIN_SUBTOTAL: f64 = 5000.0;
pub const PREMIUM_MIN_SUBTOTAL: f64 = 10000.0;
pub const CUSTOM_MAX_PERCENT: f64 = 50.0;

/// Discount choice offered at the point of sale. Radio semantics: exactly one
/// selection per cart, switching recomputes immediately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "percent", rename_all = "lowercase")]
pub enum Discount {
    #[default]
    None,
    Volume,
    Bulk,
    Premium,
    Custom(f64),
}

/// Result of quoting a selection against a cart: the amount taken off, the
/// effective percentage, and the label shown on totals and receipts. An
/// ineligible selection quotes to a zero amount with an explanatory label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountQuote {
    pub amount: f64,
    pub percentage: f64,
    #[serde(rename = "type")]
    pub label: String,
}

impl DiscountQuote {
    pub fn none() -> Self {
        Self {
            amount: 0.0,
            percentage: 0.0,
            label: "No discount".to_string(),
        }
    }

    fn ineligible(label: &str) -> Self {
        Self {
            amount: 0.0,
            percentage: 0.0,
            label: label.to_string(),
        }
    }

    pub fn applies(&self) -> bool {
        self.amount > 0.0
    }
}

impl Discount {
    /// Pure function of (subtotal, total item count, selection). Thresholds
    /// are inclusive; the custom percentage must sit in (0, 50].
    pub fn quote(self, subtotal: f64, total_items: u32) -> DiscountQuote {
        match self {
            Discount::None => DiscountQuote::none(),
            Discount::Volume => {
                if total_items >= VOLUME_MIN_ITEMS {
                    DiscountQuote {
                        amount: subtotal * 0.05,
                        percentage: 5.0,
                        label: "Volume discount (10+ items)".to_string(),
                    }
                } else {
                    DiscountQuote::ineligible("Volume discount not applicable (need 10+ items)")
                }
            }
            Discount::Bulk => {
                if subtotal >= BULK_MIN_SUBTOTAL {
                    DiscountQuote {
                        amount: subtotal * 0.03,
                        percentage: 3.0,
                        label: "Bulk purchase discount (₦5000+)".to_string(),
                    }
                } else {
                    DiscountQuote::ineligible("Bulk discount not applicable (need ₦5000+)")
                }
            }
            Discount::Premium => {
                if subtotal >= PREMIUM_MIN_SUBTOTAL {
                    DiscountQuote {
                        amount: subtotal * 0.07,
                        percentage: 7.0,
                        label: "Premium customer discount (₦10000+)".to_string(),
                    }
                } else {
                    DiscountQuote::ineligible("Premium discount not applicable (need ₦10000+)")
                }
            }
            Discount::Custom(percent) => {
                if percent > 0.0 && percent <= CUSTOM_MAX_PERCENT {
                    DiscountQuote {
                        amount: subtotal * (percent / 100.0),
                        percentage: percent,
                        label: format!("Custom discount ({percent}%)"),
                    }
                } else {
                    DiscountQuote::ineligible("Invalid custom discount (0-50% allowed)")
                }
            }
        }
    }
}

/// The discount never drives the total negative.
pub fn total_after_discount(subtotal: f64, quote: &DiscountQuote) -> f64 {
    (subtotal - quote.amount).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_discount() {
        let q = Discount::None.quote(9600.0, 12);
        assert_eq!(q.amount, 0.0);
        assert_eq!(q.label, "No discount");
        assert!(!q.applies());
    }

    #[test]
    fn test_volume_boundary_applies_at_ten() {
        let q = Discount::Volume.quote(9600.0, 10);
        assert_eq!(q.amount, 480.0);
        assert_eq!(q.percentage, 5.0);
        assert_eq!(q.label, "Volume discount (10+ items)");
    }

    #[test]
    fn test_volume_ineligible_below_ten() {
        let q = Discount::Volume.quote(9600.0, 9);
        assert_eq!(q.amount, 0.0);
        assert_eq!(q.label, "Volume discount not applicable (need 10+ items)");
    }

    #[test]
    fn test_volume_scenario_twelve_items() {
        // 12 x Rice at 800
        let q = Discount::Volume.quote(9600.0, 12);
        assert_eq!(q.amount, 480.0);
        assert_eq!(total_after_discount(9600.0, &q), 9120.0);
    }

    #[test]
    fn test_bulk_inclusive_threshold() {
        let q = Discount::Bulk.quote(5000.0, 3);
        assert_eq!(q.amount, 150.0);
        assert_eq!(q.percentage, 3.0);

        let q = Discount::Bulk.quote(4999.99, 3);
        assert_eq!(q.amount, 0.0);
        assert_eq!(q.label, "Bulk discount not applicable (need ₦5000+)");
    }

    #[test]
    fn test_premium_inclusive_threshold() {
        let q = Discount::Premium.quote(10000.0, 1);
        assert_eq!(q.percentage, 7.0);
        // 10000 * 0.07 picks up float dust; the money surfaces are formatted.
        assert_eq!(format!("{:.2}", q.amount), "700.00");
        assert_eq!(
            format!("{:.2}", total_after_discount(10000.0, &q)),
            "9300.00"
        );

        let q = Discount::Premium.quote(9999.99, 1);
        assert_eq!(q.amount, 0.0);
        assert_eq!(q.label, "Premium discount not applicable (need ₦10000+)");
    }

    #[test]
    fn test_custom_range() {
        assert_eq!(Discount::Custom(0.0).quote(1000.0, 1).amount, 0.0);
        assert_eq!(Discount::Custom(51.0).quote(1000.0, 1).amount, 0.0);
        assert_eq!(
            Discount::Custom(51.0).quote(1000.0, 1).label,
            "Invalid custom discount (0-50% allowed)"
        );

        let q = Discount::Custom(50.0).quote(1000.0, 1);
        assert_eq!(q.amount, 500.0);
        assert_eq!(q.percentage, 50.0);
        assert_eq!(q.label, "Custom discount (50%)");
    }

    #[test]
    fn test_total_never_negative() {
        let q = DiscountQuote {
            amount: 2000.0,
            percentage: 50.0,
            label: "Custom discount (50%)".to_string(),
        };
        assert_eq!(total_after_discount(1000.0, &q), 0.0);
    }

    #[test]
    fn test_selection_roundtrip() {
        for d in [
            Discount::None,
            Discount::Volume,
            Discount::Bulk,
            Discount::Premium,
            Discount::Custom(12.5),
        ] {
            let json = serde_json::to_string(&d).unwrap();
            let back: Discount = serde_json::from_str(&json).unwrap();
            assert_eq!(d, back);
        }
    }
}
