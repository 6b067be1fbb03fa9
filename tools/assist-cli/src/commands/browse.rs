//! Interactive search session.

use anyhow::Result;
use assist_core::Language;
use assist_search::{codec, FacetField, QueryState, SortOption};
use dialoguer::{Input, Select};
use search_page::{HttpSearchBackend, SearchEvent, SearchSession};

use super::search::{new_session, settle};
use super::{parse_language, BrowseArgs};
use crate::context::Context;
use crate::output::render_session;

#[derive(Clone, Copy)]
enum Action {
    Search,
    Brand,
    Category,
    Sort,
    Price,
    Language,
    NextPage,
    PrevPage,
    GoToPage,
    ClearFilter,
    ClearAll,
    Back,
    Quit,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Self::Search => "New search",
            Self::Brand => "Toggle brand",
            Self::Category => "Toggle category",
            Self::Sort => "Change sort",
            Self::Price => "Set price range",
            Self::Language => "Change language",
            Self::NextPage => "Next page",
            Self::PrevPage => "Previous page",
            Self::GoToPage => "Go to page",
            Self::ClearFilter => "Clear a filter",
            Self::ClearAll => "Clear all filters",
            Self::Back => "Back",
            Self::Quit => "Quit",
        }
    }
}

/// Run the browse command.
pub async fn run(args: BrowseArgs, ctx: &Context) -> Result<()> {
    let language = parse_language(&args.lang)?;
    let text = match args.text {
        Some(text) => text,
        None => prompt_text()?,
    };

    let mut session = new_session(ctx);
    let location = codec::to_location(&QueryState::new().with_text(text).with_language(language));
    let ticket = session.open(&location);
    settle(&mut session, ticket, ctx).await;
    render_session(&ctx.output, &session);

    loop {
        let actions = available_actions(&session);
        let labels: Vec<&str> = actions.iter().map(Action::label).collect();
        let selection = Select::new()
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact()?;

        let action = actions[selection];
        if let Action::Quit = action {
            break;
        }

        let Some(event) = event_for(action, &session)? else {
            continue;
        };
        let ticket = session.dispatch(event);
        settle(&mut session, ticket, ctx).await;
        render_session(&ctx.output, &session);
    }

    if ctx.output.is_verbose() {
        eprintln!("{}", session.metrics().to_summary());
    }

    Ok(())
}

fn prompt_text() -> Result<String> {
    Ok(Input::<String>::new()
        .with_prompt("Search for")
        .interact_text()?)
}

fn available_actions(session: &SearchSession<HttpSearchBackend>) -> Vec<Action> {
    let mut actions = vec![Action::Search];

    if let Some(model) = session.view().model() {
        if !model.facets.brands.is_empty() {
            actions.push(Action::Brand);
        }
        if !model.facets.categories.is_empty() {
            actions.push(Action::Category);
        }
        actions.extend([Action::Sort, Action::Price]);
        if model.pagination.has_next {
            actions.push(Action::NextPage);
        }
        if model.pagination.has_prev {
            actions.push(Action::PrevPage);
        }
        if model.pagination.is_visible() {
            actions.push(Action::GoToPage);
        }
    }

    actions.push(Action::Language);

    let active = session.state().active_filter_count();
    if active > 0 {
        actions.push(Action::ClearFilter);
    }
    if active > 1 {
        actions.push(Action::ClearAll);
    }
    if session.history().can_go_back() {
        actions.push(Action::Back);
    }
    actions.push(Action::Quit);
    actions
}

/// Ask for whatever the action needs and build the event.
fn event_for(action: Action, session: &SearchSession<HttpSearchBackend>) -> Result<Option<SearchEvent>> {
    let state = session.state();
    let model = session.view().model();

    let event = match action {
        Action::Search => Some(SearchEvent::SubmitText(prompt_text()?)),
        Action::Brand | Action::Category => {
            let (field, options) = match (action, model) {
                (Action::Brand, Some(model)) => (FacetField::Brand, &model.facets.brands),
                (_, Some(model)) => (FacetField::Category, &model.facets.categories),
                (_, None) => return Ok(None),
            };
            let labels: Vec<String> = options
                .iter()
                .map(|option| {
                    let mark = if state.values(field).contains(&option.name) { "[x]" } else { "[ ]" };
                    format!("{} {} ({})", mark, option.name, option.count)
                })
                .collect();
            let selection = Select::new()
                .with_prompt(field.facet_label())
                .items(&labels)
                .default(0)
                .interact()?;
            Some(SearchEvent::Toggle {
                field,
                value: options[selection].name.clone(),
            })
        }
        Action::Sort => {
            let labels: Vec<&str> = SortOption::ALL.iter().map(|s| s.display_name()).collect();
            let current = SortOption::ALL.iter().position(|s| *s == state.sort).unwrap_or(0);
            let selection = Select::new()
                .with_prompt("Sort by")
                .items(&labels)
                .default(current)
                .interact()?;
            Some(SearchEvent::ChangeSort(SortOption::ALL[selection]))
        }
        Action::Price => {
            let (low, high) = session.page_context().price_bounds.slider_domain();
            let min: f64 = Input::new()
                .with_prompt(format!("Minimum price ({} - {})", low, high))
                .default(state.price_range.map_or(low, |range| range.min))
                .interact_text()?;
            let max: f64 = Input::new()
                .with_prompt("Maximum price")
                .default(state.price_range.map_or(high, |range| range.max))
                .interact_text()?;
            Some(SearchEvent::ChangePrice { min, max })
        }
        Action::Language => {
            let labels: Vec<&str> = Language::ALL.iter().map(|l| l.label()).collect();
            let current = Language::ALL.iter().position(|l| *l == state.language).unwrap_or(0);
            let selection = Select::new()
                .with_prompt("Language")
                .items(&labels)
                .default(current)
                .interact()?;
            Some(SearchEvent::ChangeLanguage(Language::ALL[selection]))
        }
        Action::NextPage => Some(SearchEvent::ChangePage(state.page + 1)),
        Action::PrevPage => Some(SearchEvent::ChangePage(state.page.saturating_sub(1))),
        Action::GoToPage => {
            let page: u32 = Input::new()
                .with_prompt("Page")
                .default(state.page)
                .interact_text()?;
            Some(SearchEvent::ChangePage(page))
        }
        Action::ClearFilter => {
            let chips = session.active_filters();
            let labels: Vec<String> = chips.iter().map(|chip| chip.label()).collect();
            let selection = Select::new()
                .with_prompt("Remove filter")
                .items(&labels)
                .default(0)
                .interact()?;
            chips.into_iter().nth(selection).map(SearchEvent::ClearFilter)
        }
        Action::ClearAll => Some(SearchEvent::ClearAll),
        Action::Back => Some(SearchEvent::NavigateBack),
        Action::Quit => None,
    };

    Ok(event)
}
