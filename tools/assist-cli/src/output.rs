//! Output formatting for the CLI.

use std::time::Duration;

use assist_search::{DisplayModel, FacetOption, ResultItem};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use search_page::{SearchBackend, SearchSession, ViewState};
use serde_json::json;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Spinner shown while a fetch is pending.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(template);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Print the session's current view.
pub fn render_session<B: SearchBackend + 'static>(output: &Output, session: &SearchSession<B>) {
    if output.is_json() {
        let (status, results, error) = match session.view() {
            ViewState::Idle => ("idle", None, None),
            ViewState::Loading => ("loading", None, None),
            ViewState::Loaded(model) => ("loaded", Some(model.as_ref()), None),
            ViewState::Failed(message) => ("failed", None, Some(message.as_str())),
        };
        output.json(&json!({
            "location": session.location(),
            "status": status,
            "active_filters": session.active_filters().iter().map(|f| f.label()).collect::<Vec<_>>(),
            "results": results,
            "error": error,
        }));
        return;
    }

    let state = session.state();
    match session.view() {
        ViewState::Idle => output.info("Enter a search term to see results"),
        ViewState::Loading => output.info("Loading..."),
        ViewState::Failed(message) => output.error(message),
        ViewState::Loaded(model) if model.is_empty() => {
            output.header(&DisplayModel::results_header_text(&state.text));
            output.warn("Results not found");
            output.info("Use `back` to return to the previous search");
        }
        ViewState::Loaded(model) => {
            output.header(&DisplayModel::results_header_text(&state.text));
            render_filters(output, session, model);
            println!();
            for item in &model.items {
                render_item(item);
            }
            render_pagination(model);
        }
    }
    output.debug(&format!("location: {}", session.location()));
}

fn render_filters<B: SearchBackend + 'static>(
    output: &Output,
    session: &SearchSession<B>,
    model: &DisplayModel,
) {
    let state = session.state();
    output.kv(
        "Language / Sort",
        &format!("{} / {}", state.language.label(), state.sort.display_name()),
    );
    if let Some(range) = state.price_range {
        output.kv("Price", &format!("{} - {}", range.min, range.max));
    }
    if !model.facets.brands.is_empty() {
        output.kv("Brands", &facet_line(&model.facets.brands, |name| state.brands.contains(name)));
    }
    if !model.facets.categories.is_empty() {
        output.kv(
            "Categories",
            &facet_line(&model.facets.categories, |name| state.categories.contains(name)),
        );
    }

    let chips = session.active_filters();
    if !chips.is_empty() {
        let labels: Vec<String> = chips.iter().map(|chip| format!("[{}]", chip.label())).collect();
        output.kv(&model.filter_header_text(), &labels.join(" "));
    }
}

fn facet_line(options: &[FacetOption], selected: impl Fn(&str) -> bool) -> String {
    options
        .iter()
        .map(|option| {
            let text = format!("{} ({})", option.name, option.count);
            if selected(&option.name) {
                style(text).green().bold().to_string()
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_item(item: &ResultItem) {
    let stock = if item.in_stock {
        style(item.stock_label()).green()
    } else {
        style(item.stock_label()).red()
    };
    let original = item
        .original_price_text()
        .map(|price| format!(" {}", style(price).dim().strikethrough()))
        .unwrap_or_default();

    println!(
        "  {} {:.2}{} {} {}",
        style(format!("#{}", item.id)).dim(),
        item.sale_price,
        original,
        item.title,
        stock
    );
}

fn render_pagination(model: &DisplayModel) {
    let pagination = &model.pagination;
    println!();
    if !pagination.is_visible() {
        println!("  {}", style(pagination.displayed_text()).dim());
        return;
    }

    let pages: Vec<String> = pagination
        .page_numbers(7)
        .into_iter()
        .map(|page| {
            if page == pagination.page {
                style(format!("[{}]", page)).bold().to_string()
            } else {
                page.to_string()
            }
        })
        .collect();
    let prev = if pagination.has_prev { "‹ prev" } else { "" };
    let next = if pagination.has_next { "next ›" } else { "" };

    println!(
        "  {} {} {}   {}",
        prev,
        pages.join(" "),
        next,
        style(pagination.displayed_text()).dim()
    );
}
