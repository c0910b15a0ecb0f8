//! Catalog listing and search.

use std::io;

use super::render::write_products;
use super::{CommandError, Context};

/// `qkart products`
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let page = ctx.products_page()?;

    let Some(products) = page.catalog().fetch_catalog().await else {
        return Err(CommandError::Unsuccessful("could not load the catalog"));
    };

    write_products(&mut io::stdout().lock(), &products)?;
    Ok(())
}

/// `qkart search <text>`
pub async fn search(ctx: &Context, text: &str) -> Result<(), CommandError> {
    let text = text.trim();
    if text.is_empty() {
        return list(ctx).await;
    }

    let page = ctx.products_page()?;
    page.catalog().search_now(text).await;

    write_products(&mut io::stdout().lock(), &page.catalog().snapshot().filtered)?;
    Ok(())
}
