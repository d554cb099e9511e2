//! Profit by sales channel: store type and payment method.
//!
//! Summed over exploded rows, so a transaction counts once per product line.

use serde::Serialize;

use super::sum_by;
use crate::models::ExplodedRow;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoreTypeProfit {
    pub store_type: String,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentMethodProfit {
    pub payment_method: String,
    pub profit: f64,
}

/// Both channel breakdowns.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChannelProfit {
    pub by_store_type: Vec<StoreTypeProfit>,
    pub by_payment_method: Vec<PaymentMethodProfit>,
}

pub fn profit_by_store_type(rows: &[ExplodedRow]) -> Vec<StoreTypeProfit> {
    sum_by(rows, |r| r.store_type.clone(), |r| r.profit)
        .into_iter()
        .map(|(store_type, profit)| StoreTypeProfit { store_type, profit })
        .collect()
}

pub fn profit_by_payment_method(rows: &[ExplodedRow]) -> Vec<PaymentMethodProfit> {
    sum_by(rows, |r| r.payment_method.clone(), |r| r.profit)
        .into_iter()
        .map(|(payment_method, profit)| PaymentMethodProfit { payment_method, profit })
        .collect()
}

pub fn channel_profit(rows: &[ExplodedRow]) -> ChannelProfit {
    ChannelProfit {
        by_store_type: profit_by_store_type(rows),
        by_payment_method: profit_by_payment_method(rows),
    }
}
