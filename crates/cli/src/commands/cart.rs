//! Cart commands. All of them require a stored session.

use std::io::{self, Write};

use qkart_core::ProductId;
use qkart_storefront::api::ApiClient;
use qkart_storefront::views::{AddToCartOptions, AddToCartOutcome, CheckoutOutcome, ProductsPage};

use super::render::write_cart;
use super::{CommandError, Context};

async fn mounted(ctx: &Context) -> Result<ProductsPage<ApiClient>, CommandError> {
    let page = ctx.products_page()?;
    page.mount().await;
    Ok(page)
}

/// `qkart cart`
pub async fn show(ctx: &Context) -> Result<(), CommandError> {
    let page = mounted(ctx).await?;

    let Some(cart) = page.cart_panel() else {
        return Err(CommandError::Unsuccessful(
            "not logged in; run `qkart login` first",
        ));
    };

    write_cart(&mut io::stdout().lock(), &cart.items())?;
    Ok(())
}

/// `qkart add <id> [--qty N]`: refuses products already in the cart.
pub async fn add(ctx: &Context, product_id: &ProductId, qty: u32) -> Result<(), CommandError> {
    update(ctx, product_id, qty, AddToCartOptions::from_product_card()).await
}

/// `qkart set-qty <id> <qty>`
pub async fn set_quantity(
    ctx: &Context,
    product_id: &ProductId,
    qty: u32,
) -> Result<(), CommandError> {
    update(ctx, product_id, qty, AddToCartOptions::default()).await
}

async fn update(
    ctx: &Context,
    product_id: &ProductId,
    qty: u32,
    options: AddToCartOptions,
) -> Result<(), CommandError> {
    let page = mounted(ctx).await?;

    match page.add_to_cart(product_id, qty, options).await {
        AddToCartOutcome::Updated(items) => {
            write_cart(&mut io::stdout().lock(), &items)?;
            Ok(())
        }
        AddToCartOutcome::LoginRequired
        | AddToCartOutcome::Duplicate
        | AddToCartOutcome::Failed
        | AddToCartOutcome::NotInCart => {
            Err(CommandError::Unsuccessful("cart not updated"))
        }
    }
}

/// `qkart checkout`
pub async fn checkout(ctx: &Context) -> Result<(), CommandError> {
    let page = mounted(ctx).await?;

    match page.checkout() {
        CheckoutOutcome::Proceed => {
            let totals = page
                .cart_panel()
                .map(qkart_storefront::views::CartView::totals)
                .unwrap_or_default();
            writeln!(
                io::stdout().lock(),
                "Checking out {} item(s), total {}",
                totals.items,
                totals.value
            )?;
            Ok(())
        }
        CheckoutOutcome::LoginRequired | CheckoutOutcome::EmptyCart => {
            Err(CommandError::Unsuccessful("cannot check out"))
        }
    }
}
