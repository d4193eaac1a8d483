use super::{Period, Stock};

/// The pair the user currently has chosen
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub stock: Option<Stock>,
    pub period: Period,
}

/// Identity of a selection. A fresh quote for the same symbol keeps the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub symbol: String,
    pub period: Period,
}

impl Selection {
    pub fn new(stock: Option<Stock>, period: Period) -> Self {
        Self { stock, period }
    }

    pub fn key(&self) -> Option<SelectionKey> {
        self.stock.as_ref().map(|stock| SelectionKey {
            symbol: stock.symbol.clone(),
            period: self.period,
        })
    }

    pub fn symbol(&self) -> Option<&str> {
        self.stock.as_ref().map(|stock| stock.symbol.as_str())
    }
}

impl std::fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.symbol, self.period)
    }
}
