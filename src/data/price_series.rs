use std::ops::Range;
use std::sync::Arc;

use crate::error::{Result, TradesimError};

/// Ordered closing prices, indexed by step.
///
/// Cloning is cheap: clones share the same immutable buffer, so several
/// environments can read one series from different threads.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    prices: Arc<[f64]>,
}

impl PriceSeries {
    /// Build a series, rejecting empty input and any price that is not
    /// strictly positive and finite
    pub fn new(prices: Vec<f64>) -> Result<Self> {
        if prices.is_empty() {
            return Err(TradesimError::InvalidPriceSeries(
                "series is empty".to_string(),
            ));
        }

        if let Some((index, price)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(TradesimError::InvalidPriceSeries(format!(
                "price at index {} must be positive and finite, got {}",
                index, price
            )));
        }

        Ok(Self {
            prices: prices.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Price at `step`, if in range
    pub fn get(&self, step: usize) -> Option<f64> {
        self.prices.get(step).copied()
    }

    /// Slice of prices covering `range`, if in range
    pub fn window(&self, range: Range<usize>) -> Option<&[f64]> {
        self.prices.get(range)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.prices
    }
}

impl TryFrom<Vec<f64>> for PriceSeries {
    type Error = TradesimError;

    fn try_from(prices: Vec<f64>) -> Result<Self> {
        Self::new(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_series() {
        let series = PriceSeries::new(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(1), Some(2.0));
        assert_eq!(series.get(3), None);
        assert_eq!(series.window(0..2), Some(&[1.0, 2.0][..]));
        assert_eq!(series.window(2..4), None);
    }

    #[test]
    fn test_rejects_empty_and_non_positive() {
        assert!(PriceSeries::new(vec![]).is_err());
        assert!(PriceSeries::new(vec![1.0, 0.0]).is_err());
        assert!(PriceSeries::new(vec![1.0, -3.0]).is_err());
        assert!(PriceSeries::new(vec![f64::NAN]).is_err());
        assert!(PriceSeries::new(vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn test_clones_share_buffer() {
        let series = PriceSeries::new(vec![5.0; 4]).unwrap();
        let clone = series.clone();
        assert!(std::ptr::eq(series.as_slice(), clone.as_slice()));
    }
}
