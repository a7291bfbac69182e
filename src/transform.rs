use crate::catalog::CATALOG;
use crate::models::{CakeLineItem, RawOrder};

pub fn line_items(order: &RawOrder) -> Vec<CakeLineItem> {
    CATALOG
        .iter()
        .filter_map(|kind| {
            let quantity = order.quantity(kind.field).filter(|quantity| *quantity > 0)?;
            Some(CakeLineItem {
                base_type: kind.base_type,
                quantity: quantity as u64,
                abbreviation: kind.abbreviation,
                color: kind.color,
                size: kind.size,
            })
        })
        .collect()
}
