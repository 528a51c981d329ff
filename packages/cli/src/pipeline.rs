//! The full briefing pipeline: group → resolve → aggregate → render.
//!
//! Complexes are independent, so each group runs as its own task;
//! within a group the fallback chains are sequential by nature. One
//! browser session is acquired per group and dropped when the group's
//! captures are done, failed or not.

use std::path::PathBuf;
use std::sync::Arc;

use apt_briefing_aggregate::{ListingGroup, compose, group_by_complex, url};
use apt_briefing_capture::capability::BrowserCapability;
use apt_briefing_capture::scripts;
use apt_briefing_cli_utils::{IndicatifProgress, MultiProgress};
use apt_briefing_generate::{BriefingContext, DeckRenderer, MarkdownDeck, RenderError};
use apt_briefing_models::{
    AgentProfile, AggregatedComplex, BriefingInput, ComplexRecord, ImageKind,
};
use apt_briefing_resolver::complex::{ComplexSources, resolve_complex};
use apt_briefing_resolver::listing::{ListingSources, resolve_listing};
use apt_briefing_resolver::live::LiveSources;
use apt_briefing_resolver::location::{LocationSources, resolve_location};
use apt_briefing_resolver::price::{PriceSources, resolve_price};
use apt_briefing_resolver::school::{SchoolSources, resolve_school};
use apt_briefing_resolver::ResolveContext;
use apt_briefing_source::politeness::Politeness;
use apt_briefing_source::{SourceError, build_client};

use crate::config::Config;
use crate::mock::MockSources;

/// Fatal pipeline errors. Only orchestration and rendering can fail
/// the run; resolver trouble degrades to placeholders instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] SourceError),

    #[error("deck rendering failed: {0}")]
    Render(#[from] RenderError),
}

/// One bundle of trait objects, all usually backed by the same value.
#[derive(Clone)]
struct Sources {
    complex: Arc<dyn ComplexSources>,
    location: Arc<dyn LocationSources>,
    price: Arc<dyn PriceSources>,
    school: Arc<dyn SchoolSources>,
    listing: Arc<dyn ListingSources>,
}

impl Sources {
    fn from_shared<T>(shared: Arc<T>) -> Self
    where
        T: ComplexSources
            + LocationSources
            + PriceSources
            + SchoolSources
            + ListingSources
            + 'static,
    {
        Self {
            complex: shared.clone(),
            location: shared.clone(),
            price: shared.clone(),
            school: shared.clone(),
            listing: shared,
        }
    }
}

/// Runs the full pipeline and returns the rendered deck path.
///
/// # Errors
///
/// Returns [`PipelineError`] for client setup or rendering failures.
pub async fn run(
    multi: &MultiProgress,
    config: &Config,
    agent: &AgentProfile,
    input: &BriefingInput,
    mock: bool,
) -> Result<PathBuf, PipelineError> {
    let politeness = if mock || !config.politeness {
        Politeness::disabled()
    } else {
        Politeness::standard()
    };

    let ctx = ResolveContext {
        client: build_client(config.http_timeout_secs())?,
        politeness,
        // No engine ships with the CLI; captures degrade to
        // placeholders unless the embedder installs one.
        capability: BrowserCapability::unavailable(),
        work_dir: config.work_dir(),
        api_key: if mock {
            None
        } else {
            config.public_data_api_key.clone()
        },
        reference_point: (config.reference_point.lat, config.reference_point.lng),
        reference_name: config.reference_point.name.clone(),
        today: chrono::Local::now().date_naive(),
    };

    let sources = if mock {
        log::info!("mock mode: all crawling skipped");
        Sources::from_shared(Arc::new(MockSources))
    } else {
        Sources::from_shared(Arc::new(LiveSources::new(
            ctx.client.clone(),
            ctx.politeness,
        )))
    };

    let groups = group_by_complex(&input.listings);
    log::info!(
        "{} listings grouped into {} complexes for {}",
        input.listings.len(),
        groups.len(),
        input.customer_name
    );

    let progress = IndicatifProgress::steps_bar(multi, "단지 처리", groups.len() as u64);

    let mut handles = Vec::with_capacity(groups.len());
    for group in groups {
        let ctx = ctx.clone();
        let sources = sources.clone();
        handles.push(tokio::spawn(async move {
            process_group(&ctx, &sources, group).await
        }));
    }

    let mut complexes = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(aggregated) => complexes.push(aggregated),
            Err(e) => {
                // A panicked group degrades to a placeholder record so
                // the deck still covers every input group.
                log::error!("complex task failed: {e}");
                complexes.push(AggregatedComplex {
                    complex: ComplexRecord::placeholder("unknown"),
                    price: None,
                    location: None,
                    school: None,
                    listings: Vec::new(),
                });
            }
        }
        progress.inc(1);
    }
    progress.finish("단지 처리 완료".to_string());

    let renderer = MarkdownDeck::new(config.output_dir());
    let briefing = BriefingContext {
        customer_name: &input.customer_name,
        agent,
    };
    Ok(renderer.render(&briefing, &complexes)?)
}

/// Resolves everything for one complex group.
async fn process_group(
    ctx: &ResolveContext,
    sources: &Sources,
    group: ListingGroup,
) -> AggregatedComplex {
    log::info!("resolving complex {}", group.complex_id);

    // One browser session covers every capture for this group; the
    // permit is released on drop even if a capture fails midway.
    let session = ctx.capability.acquire().await;

    let mut complex = resolve_complex(ctx, sources.complex.as_ref(), &group.complex_id).await;

    if let Some(session) = session.as_ref() {
        let script = scripts::complex_detail_script(&group.complex_id);
        let path = ctx.image_path(&group.complex_id, ImageKind::ComplexDetail);
        if session.capture(&script, &path).await.produced_file() {
            complex.detail_capture_path = Some(path);
        }
    }
    let location =
        resolve_location(ctx, sources.location.as_ref(), session.as_ref(), &complex).await;
    let price = resolve_price(ctx, sources.price.as_ref(), session.as_ref(), &complex).await;
    let school = resolve_school(ctx, sources.school.as_ref(), session.as_ref(), &complex).await;

    let mut listings = Vec::with_capacity(group.listings.len());
    for listing_input in &group.listings {
        let ids = url::parse_listing_url(&listing_input.url);
        let detail = resolve_listing(
            ctx,
            sources.listing.as_ref(),
            &complex,
            listing_input,
            ids.article_no.as_deref(),
        )
        .await;
        listings.push(detail);
    }

    drop(session);

    compose(complex, Some(price), Some(location), Some(school), listings)
}

#[cfg(test)]
mod tests {
    use apt_briefing_models::ListingInput;

    use super::*;

    fn listing(url: &str) -> ListingInput {
        ListingInput {
            url: url.to_string(),
            price: "6.4억".to_string(),
            dong: "124동".to_string(),
            ho: None,
            floor: "7/15층".to_string(),
            direction: None,
            structure: None,
            memo: None,
        }
    }

    #[tokio::test]
    async fn mock_pipeline_covers_every_group() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_dir: Some(dir.path().join("out")),
            work_dir: Some(dir.path().join("work")),
            ..Config::default()
        };
        let agent = apt_briefing_models::AgentProfile::default();
        let input = BriefingInput {
            customer_name: "고객".to_string(),
            listings: vec![
                listing("https://new.land.naver.com/complexes/12345?articleNo=67890"),
                listing("https://new.land.naver.com/complexes/99999?articleNo=22222"),
                listing("https://new.land.naver.com/complexes/12345?articleNo=11111"),
            ],
        };

        let multi = MultiProgress::new();
        let deck = run(&multi, &config, &agent, &input, true).await.unwrap();
        assert!(deck.exists());

        let json_path = dir.path().join("out/briefing_고객.json");
        let complexes: Vec<AggregatedComplex> =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();

        // Two groups in first-seen order, every listing accounted for.
        assert_eq!(complexes.len(), 2);
        assert_eq!(complexes[0].complex.complex_id, "12345");
        assert_eq!(complexes[0].listings.len(), 2);
        assert_eq!(complexes[1].complex.complex_id, "99999");
        assert_eq!(complexes[1].listings.len(), 1);

        // Mock mode still produces a fully degraded-but-complete record.
        assert!(complexes[0].price.is_some());
        assert!(complexes[0].location.is_some());
        assert_eq!(
            complexes[0].location.as_ref().unwrap().nearest_station,
            "샘플역"
        );
    }
}
