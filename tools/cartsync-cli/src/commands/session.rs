//! Sign-in and sign-out.

use anyhow::Result;
use cartsync_store::StoredTokenAuth;

use super::LoginArgs;
use crate::context::Context;

/// Store the token, then hand the guest cart over to the account.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.open_storage().await?;

    StoredTokenAuth::new(cache.clone())
        .sign_in(&args.token)
        .await?;

    // Opened after sign-in so the API client carries the bearer token.
    let session = ctx.open_cart(cache).await?;

    let spinner = ctx.output.spinner("Uploading local cart...");
    let uploaded = session.store.store_cart_items(!args.keep_local).await;
    spinner.finish_and_clear();
    uploaded?;

    let count = session.store.get_cart_items_count().await?;

    if ctx.output.is_json() {
        ctx.output
            .json(&serde_json::json!({ "signedIn": true, "count": count }));
        return Ok(());
    }

    ctx.output.success("Signed in");
    ctx.output.kv("Items in cart", &count.to_string());
    if args.keep_local {
        ctx.output.debug("Local cart kept on this device");
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let session = ctx.open_cart(ctx.open_storage().await?).await?;
    session.auth.sign_out().await?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "signedIn": false }));
    } else {
        ctx.output.success("Signed out");
    }
    Ok(())
}
