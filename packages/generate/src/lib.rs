#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Deck renderer boundary.
//!
//! The pipeline's boundary artifact is the list of aggregated complex
//! records; rendering them into a presentation file is a backend
//! concern behind [`DeckRenderer`]. The shipped backend writes a
//! markdown deck outline plus a JSON dump of the records — enough for
//! a human to assemble slides from, without committing this crate to
//! any presentation file format.

use std::path::{Path, PathBuf};

use apt_briefing_capture::placeholder;
use apt_briefing_models::{AgentProfile, AggregatedComplex, HeadlineTime, NO_DATA_LABEL};
use thiserror::Error;

/// Errors from rendering the deck.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Output file or directory could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A briefing request as the renderer sees it.
pub struct BriefingContext<'a> {
    pub customer_name: &'a str,
    pub agent: &'a AgentProfile,
}

/// Renderer backend boundary.
pub trait DeckRenderer {
    /// Renders the deck and returns the path of the primary artifact.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the output cannot be written — the
    /// only error in the pipeline that surfaces to the operator.
    fn render(
        &self,
        briefing: &BriefingContext<'_>,
        complexes: &[AggregatedComplex],
    ) -> Result<PathBuf, RenderError>;
}

/// Placeholder image substituted in the outline for any missing path.
const MISSING_IMAGE: &str = "placeholder.png";

/// Dimensions of the generated placeholder image.
const PLACEHOLDER_W: u32 = 600;
const PLACEHOLDER_H: u32 = 450;

/// The shipped backend: markdown outline + JSON dump.
pub struct MarkdownDeck {
    output_dir: PathBuf,
}

impl MarkdownDeck {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn image_ref(&self, path: Option<&Path>) -> String {
        path.map_or_else(
            || MISSING_IMAGE.to_string(),
            |p| p.display().to_string(),
        )
    }
}

impl DeckRenderer for MarkdownDeck {
    fn render(
        &self,
        briefing: &BriefingContext<'_>,
        complexes: &[AggregatedComplex],
    ) -> Result<PathBuf, RenderError> {
        std::fs::create_dir_all(&self.output_dir)?;

        // One shared placeholder backs every missing image reference.
        let placeholder_path = self.output_dir.join(MISSING_IMAGE);
        if let Err(e) =
            placeholder::ensure_placeholder(&placeholder_path, PLACEHOLDER_W, PLACEHOLDER_H)
        {
            log::warn!("placeholder image write failed: {e}");
        }

        let stem = sanitize_stem(briefing.customer_name);

        let json_path = self.output_dir.join(format!("briefing_{stem}.json"));
        std::fs::write(&json_path, serde_json::to_string_pretty(complexes)?)?;

        let md_path = self.output_dir.join(format!("briefing_{stem}.md"));
        std::fs::write(&md_path, self.outline(briefing, complexes))?;

        log::info!("deck written: {}", md_path.display());
        Ok(md_path)
    }
}

impl MarkdownDeck {
    fn outline(&self, briefing: &BriefingContext<'_>, complexes: &[AggregatedComplex]) -> String {
        let mut out = String::new();
        let agent = briefing.agent;

        out.push_str(&format!(
            "# {} 브리핑\n\n{} {} · {} · {}\n\n> {}\n",
            briefing.customer_name, agent.company, agent.name, agent.phone, agent.email,
            agent.slogan
        ));

        for aggregated in complexes {
            let complex = &aggregated.complex;
            out.push_str(&format!("\n## {} ({})\n\n", complex.name, complex.complex_id));

            if !complex.hashtags.is_empty() {
                let tags: Vec<String> =
                    complex.hashtags.iter().map(|t| format!("#{t}")).collect();
                out.push_str(&format!("{}\n\n", tags.join(" ")));
            }

            out.push_str(&apt_briefing_aggregate::overview_text(complex));
            out.push('\n');
            out.push_str(&format!(
                "\n![전경]({})\n",
                self.image_ref(complex.aerial_photo_path.as_deref())
            ));

            if let Some(location) = &aggregated.location {
                out.push_str("\n### 입지\n\n");
                let headline = match location.headline_time() {
                    HeadlineTime::Walk(min) => format!("도보 {min}분"),
                    HeadlineTime::Transit(min) => format!("대중교통 약 {min}분"),
                };
                let line = if location.station_line.is_empty() {
                    String::new()
                } else {
                    format!("({})", location.station_line)
                };
                out.push_str(&format!(
                    "{}{} {headline} · 강남역 {}분\n",
                    location.nearest_station, line, location.gangnam_minutes
                ));
                out.push_str(&format!(
                    "\n![도보경로]({})\n![대중교통경로]({})\n",
                    self.image_ref(location.walk_route_image_path.as_deref()),
                    self.image_ref(location.transit_route_image_path.as_deref()),
                ));
            }

            if let Some(price) = &aggregated.price {
                out.push_str("\n### 실거래가\n\n");
                out.push_str(&apt_briefing_aggregate::price_summary_text(
                    &complex.name,
                    price,
                ));
                out.push('\n');
                out.push_str(&format!(
                    "\n![시세추이]({})\n\n",
                    self.image_ref(price.chart_image_path.as_deref())
                ));
                out.push_str("| 일자 | 면적 | 층 | 가격 |\n|---|---|---|---|\n");
                for txn in &price.transactions {
                    out.push_str(&format!(
                        "| {} | {} | {} | {} |\n",
                        txn.date, txn.area_pyeong, txn.floor, txn.price
                    ));
                }
            }

            if let Some(school) = &aggregated.school {
                out.push_str("\n### 학군\n\n");
                out.push_str(&format!(
                    "{} {}\n",
                    school.elementary_name, school.walk_distance
                ));
                if !school.elementary_address.is_empty() {
                    out.push_str(&format!(
                        "{} · {} · {}\n",
                        school.elementary_address,
                        school.elementary_type,
                        school.elementary_phone
                    ));
                }
                out.push_str(&format!(
                    "\n![초등학교]({})\n![학군지도]({})\n",
                    self.image_ref(school.elementary_map_path.as_deref()),
                    self.image_ref(school.zone_map_path.as_deref()),
                ));
            }

            out.push_str("\n### 매물\n\n");
            for listing in &aggregated.listings {
                let rooms = listing
                    .rooms
                    .map_or_else(|| NO_DATA_LABEL.to_string(), |r| format!("방{r}"));
                out.push_str(&format!(
                    "- {} {} · {} · {rooms}",
                    listing.dong, listing.floor, listing.price
                ));
                if let Some(memo) = &listing.memo
                    && !memo.is_empty()
                {
                    out.push_str(&format!(" · {memo}"));
                }
                out.push('\n');
            }
        }

        out
    }
}

/// File-name stem from a customer name: whitespace collapsed to `_`.
fn sanitize_stem(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        "briefing".to_string()
    } else {
        cleaned
    }
}
