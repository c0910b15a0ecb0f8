//! Plain-text rendering of products and cart lines.

use std::io::{self, Write};

use qkart_core::{CartItem, CartTotals, Product};

const NAME_WIDTH: usize = 40;

pub fn write_products(out: &mut impl Write, products: &[Product]) -> io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "No products found");
    }

    for product in products {
        writeln!(
            out,
            "{:<18}  {:<40}  {:<16}  {:>8}  {}",
            product.id.as_str(),
            truncate(&product.name, NAME_WIDTH),
            product.category,
            product.cost.to_string(),
            stars(product.rating),
        )?;
    }
    Ok(())
}

pub fn write_cart(out: &mut impl Write, items: &[CartItem]) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "Cart is empty");
    }

    for item in items {
        writeln!(
            out,
            "{:<18}  {:<40}  x{:<4}  {:>8}",
            item.product_id().as_str(),
            truncate(&item.product.name, NAME_WIDTH),
            item.quantity,
            item.line_cost().to_string(),
        )?;
    }

    let totals = CartTotals::of(items);
    writeln!(out, "{} item(s), total {}", totals.items, totals.value)
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use qkart_core::{CartEntry, ProductId, generate_cart_items};

    use super::*;

    fn product(id: &str, name: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: "Fashion".to_string(),
            cost: cost.into(),
            rating: 3,
            image_url: String::new(),
        }
    }

    fn render(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(render(|out| write_products(out, &[])), "No products found\n");
        assert_eq!(render(|out| write_cart(out, &[])), "Cart is empty\n");
    }

    #[test]
    fn test_product_line() {
        let text = render(|out| write_products(out, &[product("A", "Duffle", 150)]));
        assert!(text.starts_with("A "));
        assert!(text.contains("Duffle"));
        assert!(text.contains("$150"));
        assert!(text.contains("★★★☆☆"));
    }

    #[test]
    fn test_cart_totals_line() {
        let catalog = [product("A", "Duffle", 150), product("B", "Watch", 60)];
        let items = generate_cart_items(&[CartEntry::new("A", 2), CartEntry::new("B", 1)], &catalog);

        let text = render(|out| write_cart(out, &items));
        assert!(text.ends_with("3 item(s), total $360\n"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long product name", 6), "a ver…");
    }
}
