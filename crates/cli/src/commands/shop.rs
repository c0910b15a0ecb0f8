//! Interactive storefront.
//!
//! Typing text searches the catalog (debounced, results are printed when
//! they arrive). Lines starting with `:` are commands:
//!
//! ```text
//! :add <id>    add a product to the cart
//! :inc <id>    raise a cart line by one
//! :dec <id>    lower a cart line by one
//! :cart        show the cart
//! :checkout    proceed to checkout
//! :clear       show the whole catalog again
//! :help        show this help
//! :quit        leave
//! ```

use std::io::{self, Write};

use qkart_core::{Product, ProductId};
use qkart_storefront::views::{AddToCartOptions, AddToCartOutcome};

use super::render::{write_cart, write_products};
use super::{CommandError, Context, Prompter};

const HELP: &str = "\
Type to search. Commands:
  :add <id>    add a product to the cart
  :inc <id>    raise a cart line by one
  :dec <id>    lower a cart line by one
  :cart        show the cart
  :checkout    proceed to checkout
  :clear       show the whole catalog again
  :help        show this help
  :quit        leave";

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Search(String),
    Add(ProductId),
    Increment(ProductId),
    Decrement(ProductId),
    Cart,
    Checkout,
    Help,
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Input::Search(line.to_string());
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let argument = words.next();

    match (name, argument) {
        ("add", Some(id)) => Input::Add(ProductId::new(id)),
        ("inc", Some(id)) => Input::Increment(ProductId::new(id)),
        ("dec", Some(id)) => Input::Decrement(ProductId::new(id)),
        ("cart", None) => Input::Cart,
        ("checkout", None) => Input::Checkout,
        ("clear", None) => Input::Search(String::new()),
        ("help", None) => Input::Help,
        ("quit" | "q", None) => Input::Quit,
        _ => Input::Invalid(line.to_string()),
    }
}

/// `qkart shop`
pub async fn run(ctx: &Context) -> Result<(), CommandError> {
    let page = ctx.products_page()?;
    page.mount().await;
    ctx.flush()?;

    {
        let mut out = io::stdout().lock();
        write_products(&mut out, &page.catalog().snapshot().filtered)?;
        writeln!(out, "\n{HELP}")?;
    }

    // Print the visible list whenever it changes
    let mut catalog = page.catalog().subscribe();
    let renderer = tokio::spawn(async move {
        let mut shown: Vec<Product> = catalog.borrow_and_update().filtered.clone();
        while catalog.changed().await.is_ok() {
            let filtered = catalog.borrow_and_update().filtered.clone();
            if filtered == shown {
                continue;
            }
            if let Err(e) = write_products(&mut io::stdout().lock(), &filtered) {
                tracing::warn!(error = %e, "Could not render products");
                break;
            }
            shown = filtered;
        }
    });

    let mut input = Prompter::new();
    while let Some(line) = input.next_line().await? {
        match parse_input(&line) {
            Input::Search(text) => page.catalog().set_search_text(text),
            Input::Add(id) => {
                page.add_to_cart(&id, 1, AddToCartOptions::from_product_card())
                    .await;
            }
            Input::Increment(id) => {
                page.increment(&id).await;
            }
            Input::Decrement(id) => {
                if page.decrement(&id).await == AddToCartOutcome::NotInCart {
                    writeln!(io::stderr().lock(), "{id} is not in the cart")?;
                }
            }
            Input::Cart => match page.cart_panel() {
                Some(cart) => write_cart(&mut io::stdout().lock(), &cart.items())?,
                None => writeln!(io::stderr().lock(), "Log in to see your cart")?,
            },
            Input::Checkout => {
                page.checkout();
            }
            Input::Help => writeln!(io::stdout().lock(), "{HELP}")?,
            Input::Quit => break,
            Input::Invalid(line) => {
                writeln!(io::stderr().lock(), "Unknown command: {line} (try :help)")?;
            }
        }
        ctx.flush()?;
    }

    renderer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_search() {
        assert_eq!(parse_input("  leather bag "), Input::Search("leather bag".to_string()));
        assert_eq!(parse_input(""), Input::Search(String::new()));
        assert_eq!(parse_input(":clear"), Input::Search(String::new()));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_input(":add A1"), Input::Add(ProductId::new("A1")));
        assert_eq!(parse_input(":inc A1"), Input::Increment(ProductId::new("A1")));
        assert_eq!(parse_input(":dec A1"), Input::Decrement(ProductId::new("A1")));
        assert_eq!(parse_input(":cart"), Input::Cart);
        assert_eq!(parse_input(":checkout"), Input::Checkout);
        assert_eq!(parse_input(":q"), Input::Quit);
    }

    #[test]
    fn test_invalid_commands() {
        assert_eq!(parse_input(":add"), Input::Invalid(":add".to_string()));
        assert_eq!(parse_input(":cart now"), Input::Invalid(":cart now".to_string()));
        assert_eq!(parse_input(":dance"), Input::Invalid(":dance".to_string()));
    }
}
