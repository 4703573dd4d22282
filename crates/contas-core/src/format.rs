/// Formats currency amounts for presentation.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: f64) -> String;
}

/// Prefixes amounts with a fixed currency symbol, two decimal places.
#[derive(Debug, Clone)]
pub struct SymbolFormatter {
    symbol: String,
}

impl SymbolFormatter {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl Default for SymbolFormatter {
    fn default() -> Self {
        Self::new("R$")
    }
}

impl CurrencyFormatter for SymbolFormatter {
    fn format_amount(&self, amount: f64) -> String {
        format!("{} {:.2}", self.symbol, amount)
    }
}
