//! Taxonomy display model

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::CatalogItem;

/// Category, brand, language or currency row
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CatalogItemDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    /// Code for languages and currencies, slug otherwise
    #[tabled(rename = "CODE")]
    pub code: String,
}

impl From<CatalogItem> for CatalogItemDisplay {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            code: item.code.or(item.slug).unwrap_or_default(),
        }
    }
}
