//! CLI command implementations.

pub mod browse;
pub mod config;
pub mod payload;
pub mod search;

use anyhow::{bail, Result};
use assist_core::Language;
use assist_search::SortOption;
use clap::{Args, Subcommand};

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Search text.
    pub text: String,

    /// Result language (English or Arabic).
    #[arg(short, long, default_value = "English")]
    pub lang: String,

    /// Brand filter (repeatable).
    #[arg(short, long)]
    pub brand: Vec<String>,

    /// Category filter (repeatable).
    #[arg(short = 'C', long)]
    pub category: Vec<String>,

    /// Sort order: relevance, price-high-to-low or price-low-to-high.
    #[arg(short, long, default_value = "relevance")]
    pub sort: String,

    /// Lower price bound.
    #[arg(long, requires = "price_max")]
    pub price_min: Option<i64>,

    /// Upper price bound.
    #[arg(long, requires = "price_min")]
    pub price_max: Option<i64>,

    /// Result page.
    #[arg(short, long, default_value = "1")]
    pub page: u32,
}

/// Arguments for the open command.
#[derive(Args)]
pub struct OpenArgs {
    /// Location or URL, e.g. `/search?q=phone&lang=Arabic&page=2`.
    pub location: String,
}

/// Arguments for the browse command.
#[derive(Args)]
pub struct BrowseArgs {
    /// Initial search text.
    pub text: Option<String>,

    /// Result language (English or Arabic).
    #[arg(short, long, default_value = "English")]
    pub lang: String,
}

/// Arguments for the payload command.
#[derive(Args)]
pub struct PayloadArgs {
    /// Location or URL to build the request for.
    pub location: String,

    /// Print the secret key instead of masking it.
    #[arg(long)]
    pub show_secret: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}

/// Parse a language label as typed on the command line.
pub fn parse_language(label: &str) -> Result<Language> {
    match Language::ALL
        .into_iter()
        .find(|lang| lang.label().eq_ignore_ascii_case(label))
    {
        Some(language) => Ok(language),
        None => {
            let known: Vec<&str> = Language::ALL.iter().map(|l| l.label()).collect();
            bail!("Unknown language: {}. Available: {}", label, known.join(", "))
        }
    }
}

/// Parse a sort option, rejecting unknown names rather than falling back.
pub fn parse_sort(value: &str) -> Result<SortOption> {
    match SortOption::ALL.into_iter().find(|sort| sort.as_str() == value) {
        Some(sort) => Ok(sort),
        None => {
            let known: Vec<&str> = SortOption::ALL.iter().map(|s| s.as_str()).collect();
            bail!("Unknown sort: {}. Available: {}", value, known.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("arabic").unwrap(), Language::Arabic);
        assert_eq!(parse_language("English").unwrap(), Language::English);
        assert!(parse_language("French").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("price-low-to-high").unwrap(), SortOption::PriceLowToHigh);
        assert!(parse_sort("cheapest").is_err());
    }
}
