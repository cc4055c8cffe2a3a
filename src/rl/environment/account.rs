//! Cash and single-unit position bookkeeping.

/// Cash balance plus an optional one-unit long position.
///
/// The entry price is the position: holding a unit and having an entry
/// price are the same fact, so they cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Account {
    balance: f64,
    entry_price: Option<f64>,
}

impl Account {
    /// Create a flat account with the given cash
    pub fn new(balance: f64) -> Self {
        Self {
            balance,
            entry_price: None,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Units held, always 0 or 1
    pub fn shares_held(&self) -> u8 {
        u8::from(self.entry_price.is_some())
    }

    /// Entry price of the open position
    pub fn entry_price(&self) -> Option<f64> {
        self.entry_price
    }

    pub fn is_open(&self) -> bool {
        self.entry_price.is_some()
    }

    /// Buy one unit at `price`. Returns false (and changes nothing) when a
    /// position is already open or the cash does not cover the price.
    pub fn buy(&mut self, price: f64) -> bool {
        if self.is_open() || self.balance < price {
            return false;
        }
        self.balance -= price;
        self.entry_price = Some(price);
        true
    }

    /// Sell the open unit at `price`, returning the realized P&L. Returns
    /// `None` when flat.
    pub fn sell(&mut self, price: f64) -> Option<f64> {
        let entry = self.entry_price.take()?;
        self.balance += price;
        Some(price - entry)
    }
}
