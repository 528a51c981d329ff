#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the apartment briefing generator.
//!
//! Input comes from a JSON file (`--input`), from `--customer` plus
//! `--urls`, or — with no arguments — from a built-in demo request
//! that runs in mock mode.

mod config;
mod mock;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use apt_briefing_models::{BriefingInput, ListingInput};
use clap::Parser;

#[derive(Parser)]
#[command(name = "apt-briefing", about = "Apartment briefing deck generator")]
struct Cli {
    /// Briefing input JSON file.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Customer name (used with --urls).
    #[arg(long, short)]
    customer: Option<String>,

    /// Listing URLs (used with --customer).
    #[arg(long, short, num_args = 1..)]
    urls: Vec<String>,

    /// Skip all crawling and build the deck from sample data.
    #[arg(long)]
    mock: bool,

    /// Configuration file path.
    #[arg(long, default_value = "config/config.toml")]
    config: PathBuf,

    /// Agent profile path.
    #[arg(long, default_value = "config/agent.toml")]
    agent: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let multi = apt_briefing_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = config::load_config(&cli.config);
    let agent = config::load_agent_profile(&cli.agent);

    let mut mock = cli.mock || config.mock;
    let input = if let Some(path) = &cli.input {
        match config::load_input(path) {
            Ok(input) => input,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    } else if let (Some(customer), false) = (cli.customer.clone(), cli.urls.is_empty()) {
        minimal_input(customer, &cli.urls)
    } else {
        log::info!("no input given, running the demo briefing in mock mode");
        mock = true;
        demo_input()
    };

    if input.listings.is_empty() {
        log::error!("briefing input has no listings");
        return ExitCode::FAILURE;
    }

    match pipeline::run(&multi, &config, &agent, &input, mock).await {
        Ok(path) => {
            log::info!("briefing complete: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            // The only fatal surface: orchestration/rendering trouble.
            log::error!("briefing failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Minimal input when only URLs are supplied.
fn minimal_input(customer: String, urls: &[String]) -> BriefingInput {
    BriefingInput {
        customer_name: customer,
        listings: urls
            .iter()
            .map(|url| ListingInput {
                url: url.clone(),
                price: "미입력".to_string(),
                dong: "미입력".to_string(),
                ho: None,
                floor: "미입력".to_string(),
                direction: None,
                structure: None,
                memo: None,
            })
            .collect(),
    }
}

/// The built-in demo request: three listings across two complexes.
fn demo_input() -> BriefingInput {
    let listing = |url: &str, price: &str, dong: &str, floor: &str, direction: &str,
                   structure: &str, memo: &str| ListingInput {
        url: url.to_string(),
        price: price.to_string(),
        dong: dong.to_string(),
        ho: None,
        floor: floor.to_string(),
        direction: Some(direction.to_string()),
        structure: Some(structure.to_string()),
        memo: if memo.is_empty() {
            None
        } else {
            Some(memo.to_string())
        },
    };

    BriefingInput {
        customer_name: "테스트고객".to_string(),
        listings: vec![
            listing(
                "https://new.land.naver.com/complexes/12345?articleNo=67890",
                "6.4억",
                "124동",
                "7/15층",
                "동향",
                "복도식 방2화1",
                "샷시교체, 욕실수리",
            ),
            listing(
                "https://new.land.naver.com/complexes/12345?articleNo=11111",
                "6.6억",
                "115동",
                "12/15층",
                "남향",
                "복도식 방3화2",
                "",
            ),
            listing(
                "https://new.land.naver.com/complexes/99999?articleNo=22222",
                "8.2억",
                "201동",
                "3/20층",
                "남서향",
                "타워식 방3화2",
                "올수리, 네고 가능",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_input_spans_two_complexes() {
        let input = demo_input();
        let groups = apt_briefing_aggregate::group_by_complex(&input.listings);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].complex_id, "12345");
        assert_eq!(groups[0].listings.len(), 2);
        assert_eq!(groups[1].listings.len(), 1);
    }

    #[test]
    fn minimal_input_marks_unentered_fields() {
        let input = minimal_input(
            "고객".to_string(),
            &["https://new.land.naver.com/complexes/1?articleNo=2".to_string()],
        );
        assert_eq!(input.listings[0].price, "미입력");
    }
}
