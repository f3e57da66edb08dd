use rust_decimal::Decimal;

/// Hard ceiling on the percent of equity a single trade may commit.
#[derive(Debug, Clone)]
pub struct RiskValidator {
    max_risk_percent: Decimal,
}

impl Default for RiskValidator {
    fn default() -> Self {
        Self::new(Decimal::from(8))
    }
}

impl RiskValidator {
    #[must_use]
    pub const fn new(max_risk_percent: Decimal) -> Self {
        Self { max_risk_percent }
    }

    #[must_use]
    pub const fn max_risk_percent(&self) -> Decimal {
        self.max_risk_percent
    }

    /// True iff `size_percent` is at or below the ceiling.
    ///
    /// `equity` is accepted for call-site symmetry with the sizer and does
    /// not affect the result; leverage and balance are not considered.
    #[must_use]
    pub fn validate(&self, size_percent: Decimal, _equity: Decimal) -> bool {
        size_percent <= self.max_risk_percent
    }
}
