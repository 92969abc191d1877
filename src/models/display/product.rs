//! Product display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_price, truncate_string};
use crate::client::models::Product;

const NAME_WIDTH: usize = 48;

/// Product row for listings and search results
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ProductDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "BRAND")]
    pub brand: String,

    #[tabled(rename = "PRICE")]
    pub price: String,

    #[tabled(rename = "RATING")]
    pub rating: String,
}

impl From<&Product> for ProductDisplay {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: truncate_string(&product.name, NAME_WIDTH),
            brand: product.brand.clone().unwrap_or_default(),
            price: format_price(product.price, product.currency.as_deref()),
            rating: product
                .rating
                .map(|r| format!("{:.1}", r))
                .unwrap_or_default(),
        }
    }
}

impl From<Product> for ProductDisplay {
    fn from(product: Product) -> Self {
        Self::from(&product)
    }
}
