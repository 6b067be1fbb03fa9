//! Show the request a location produces.

use anyhow::{Context as _, Result};
use assist_search::{codec, PreparedRequest};
use serde_json::json;

use super::PayloadArgs;
use crate::context::Context;

/// Run the payload command.
pub async fn run(args: PayloadArgs, ctx: &Context) -> Result<()> {
    let state = codec::from_location(&args.location);
    if !state.is_searchable() {
        ctx.output
            .warn("The location has no search text; the page would not send this request");
    }

    let request = PreparedRequest::build(&state, &ctx.config).context("Failed to build request")?;
    let headers = if args.show_secret {
        request.headers.clone()
    } else {
        request.masked_headers()
    };

    if ctx.output.is_json() {
        let headers: serde_json::Map<String, serde_json::Value> = headers
            .into_iter()
            .map(|(name, value)| (name, value.into()))
            .collect();
        ctx.output.json(&json!({
            "method": "POST",
            "url": request.url,
            "headers": headers,
            "body": request.body,
        }));
        return Ok(());
    }

    ctx.output.header("Search request");
    ctx.output.kv("POST", &request.url);
    for (name, value) in &headers {
        ctx.output.kv(name, value);
    }
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&request.body).context("Failed to serialize body")?
    );

    ctx.output.info("");
    ctx.output.kv("Shareable location", &codec::to_location(&state));

    Ok(())
}
