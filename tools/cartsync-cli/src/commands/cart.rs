//! Cart commands: add, list, remove, update, count.

use anyhow::{bail, Result};
use cartsync_commerce::cart::CartLineItem;
use cartsync_commerce::CartKey;

use super::{AddArgs, KeyArgs, UpdateArgs};
use crate::context::Context;

impl KeyArgs {
    fn cart_key(&self) -> CartKey {
        CartKey::new(self.product_id, self.product_type_id)
    }
}

pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open_cart(ctx.open_storage().await?).await?;
    let item = CartLineItem::new(args.key.product_id, args.key.product_type_id, args.quantity);

    let spinner = ctx.output.spinner("Adding to cart...");
    let result = session.store.add_to_cart(item).await;
    spinner.finish_and_clear();
    result?;

    report_count(ctx, session.store.cached_items_count().await?);
    ctx.output
        .success(&format!("Added {} x {}", args.quantity, args.key.cart_key()));
    Ok(())
}

pub async fn list(ctx: &Context) -> Result<()> {
    let session = ctx.open_cart(ctx.open_storage().await?).await?;

    let spinner = ctx.output.spinner("Loading cart...");
    let result = session.store.get_cart_products().await;
    spinner.finish_and_clear();
    let products = result?;

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    if products.is_empty() {
        ctx.output.info("Cart is empty");
        return Ok(());
    }

    ctx.output.header("Cart");
    let widths = [8, 8, 5, 10, 0];
    ctx.output
        .table_row(&["PRODUCT", "TYPE", "QTY", "PRICE", "TITLE"], &widths);
    for product in &products {
        ctx.output.table_row(
            &[
                &product.product_id.to_string(),
                &product.product_type_id.to_string(),
                &product.quantity.to_string(),
                &product.price.to_string(),
                &product.title,
            ],
            &widths,
        );
    }
    Ok(())
}

pub async fn remove(args: KeyArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open_cart(ctx.open_storage().await?).await?;
    let key = args.cart_key();

    let spinner = ctx.output.spinner("Removing from cart...");
    let result = session
        .store
        .remove_product_from_cart(key.product_id, key.product_type_id)
        .await;
    spinner.finish_and_clear();
    result?;

    ctx.output.success(&format!("Removed {}", key));
    Ok(())
}

pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open_cart(ctx.open_storage().await?).await?;
    let key = args.key.cart_key();

    let spinner = ctx.output.spinner("Updating cart...");
    let result = update_line(&session.store, key, args.quantity).await;
    spinner.finish_and_clear();

    match result? {
        true => ctx
            .output
            .success(&format!("Set {} to quantity {}", key, args.quantity)),
        false => bail!("{} is not in the cart", key),
    }
    Ok(())
}

/// Looks the line up in the current snapshot list, then pushes the new quantity.
async fn update_line(
    store: &cartsync_store::CartStore,
    key: CartKey,
    quantity: i32,
) -> Result<bool> {
    let products = store.get_cart_products().await?;
    let Some(mut snapshot) = products.into_iter().find(|p| p.key() == key) else {
        return Ok(false);
    };
    snapshot.quantity = quantity;
    store.update_quantity(&snapshot).await?;
    Ok(true)
}

pub async fn count(ctx: &Context) -> Result<()> {
    let session = ctx.open_cart(ctx.open_storage().await?).await?;

    let spinner = ctx.output.spinner("Counting cart items...");
    let result = session.store.get_cart_items_count().await;
    spinner.finish_and_clear();

    report_count(ctx, result?);
    Ok(())
}

fn report_count(ctx: &Context, count: i32) {
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "count": count }));
    } else {
        ctx.output.kv("Items in cart", &count.to_string());
    }
}

