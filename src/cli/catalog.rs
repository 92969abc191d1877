//! Product and taxonomy listing commands

use log::debug;

use crate::catalog::ProductQuery;
use crate::cli::{CatalogCommands, CommandContext, GlobalOptions};
use crate::error::Result;
use crate::models::{CatalogItemDisplay, ProductDisplay};
use crate::output::Formattable;

/// Product listing filters as given on the command line
#[derive(Debug, Clone, Default)]
pub struct ProductArgs {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
}

impl ProductArgs {
    fn to_query(&self) -> ProductQuery {
        let mut query = ProductQuery::new();
        if let Some(ref id) = self.category {
            query = query.category(id.clone());
        }
        if let Some(ref id) = self.brand {
            query = query.brand(id.clone());
        }
        if let Some(page) = self.page {
            query = query.page(page);
        }
        query
    }
}

pub async fn products(opts: &GlobalOptions, args: &ProductArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let query = args.to_query();

    let products = match args.search.as_deref() {
        Some(text) => ctx.catalog.search_products(text, &query).await?,
        None => ctx.catalog.products(&query).await?,
    };
    debug!("Fetched {} products", products.len());

    let rows: Vec<ProductDisplay> = products.into_iter().map(ProductDisplay::from).collect();
    rows.print(ctx.format)
}

pub async fn catalog(opts: &GlobalOptions, which: CatalogCommands) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let items = match which {
        CatalogCommands::Languages => ctx.catalog.languages().await?,
        CatalogCommands::Currencies => ctx.catalog.currencies().await?,
        CatalogCommands::Categories => ctx.catalog.categories().await?,
        CatalogCommands::Brands => ctx.catalog.brands().await?,
    };
    debug!("Fetched {} {:?}", items.len(), which);

    let rows: Vec<CatalogItemDisplay> = items.into_iter().map(CatalogItemDisplay::from).collect();
    rows.print(ctx.format)
}
