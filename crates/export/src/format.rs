use budgetkit_core::Money;

/// Whole-unit amounts with a trailing currency symbol, e.g. `1850 €`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoneyFormat {
    symbol: String,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self::new("€")
    }
}

impl MoneyFormat {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into() }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn amount(&self, value: Money) -> String {
        format!("{value} {}", self.symbol)
    }

    /// Savings always carry a minus sign, including a zero saving.
    pub fn saving(&self, value: Money) -> String {
        format!("-{} {}", value.abs(), self.symbol)
    }

    pub fn extra(&self, value: Money) -> String {
        format!("+{} {}", value.abs(), self.symbol)
    }

    pub fn monthly(&self, value: Money) -> String {
        format!("{value} {}/month", self.symbol)
    }
}
