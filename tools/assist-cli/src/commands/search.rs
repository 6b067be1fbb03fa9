//! One-shot search and location commands.

use std::time::Duration;

use anyhow::Result;
use assist_observability::{LogFormat, LogLevel};
use assist_search::{codec, FacetField, PriceRange, QueryState};
use search_page::{FetchTicket, HttpSearchBackend, SearchSession, ViewState};

use super::{parse_language, parse_sort, OpenArgs, SearchArgs};
use crate::context::Context;
use crate::output::render_session;

/// Run the search command.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let location = codec::to_location(&state_from_args(&args)?);
    ctx.output.debug(&format!("Location: {}", location));
    load_location(&location, ctx).await
}

/// Run the open command.
pub async fn open(args: OpenArgs, ctx: &Context) -> Result<()> {
    load_location(&args.location, ctx).await
}

async fn load_location(location: &str, ctx: &Context) -> Result<()> {
    let mut session = new_session(ctx);
    let ticket = session.open(location);
    if ticket.is_none() && session.view() == &ViewState::Idle {
        ctx.output.warn("The location has no search text");
    }

    settle(&mut session, ticket, ctx).await;
    render_session(&ctx.output, &session);

    if ctx.output.is_verbose() && !ctx.output.is_json() {
        eprintln!("{}", session.metrics().to_summary());
    }

    match session.view() {
        ViewState::Failed(message) => anyhow::bail!("Search failed: {}", message),
        _ => Ok(()),
    }
}

/// Build a session against the configured HTTP backend.
pub fn new_session(ctx: &Context) -> SearchSession<HttpSearchBackend> {
    let backend = HttpSearchBackend::new(Duration::from_secs(ctx.config.timeout_secs));
    let (format, level) = match (ctx.output.is_json(), ctx.output.is_verbose()) {
        (true, _) => (LogFormat::Json, LogLevel::Info),
        (false, true) => (LogFormat::Human, LogLevel::Debug),
        (false, false) => (LogFormat::Human, LogLevel::Info),
    };
    SearchSession::new(ctx.config.clone(), backend).with_logger(format, level)
}

/// Run `ticket` and its follow-up behind a spinner.
pub async fn settle(
    session: &mut SearchSession<HttpSearchBackend>,
    ticket: Option<FetchTicket>,
    ctx: &Context,
) {
    if ticket.is_none() {
        return;
    }
    let spinner = ctx.output.spinner("Searching...");
    session.run(ticket).await;
    spinner.finish_and_clear();
}

fn state_from_args(args: &SearchArgs) -> Result<QueryState> {
    let mut state = QueryState::new()
        .with_text(args.text.as_str())
        .with_language(parse_language(&args.lang)?);

    for (field, values) in [
        (FacetField::Brand, &args.brand),
        (FacetField::Category, &args.category),
    ] {
        for value in values {
            if !state.values(field).contains(value) {
                state.toggle(field, value);
            }
        }
    }
    state.set_sort(parse_sort(&args.sort)?);

    if let (Some(min), Some(max)) = (args.price_min, args.price_max) {
        state.set_price_range_by_user(PriceRange::new(min as f64, max as f64));
    }

    state.page = args.page.max(1);
    Ok(state)
}
