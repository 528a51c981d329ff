//! Builders for the fixed interaction scripts the pipeline captures.
//!
//! Pure functions from coordinates/names to [`CaptureScript`] values —
//! the only pieces of browser automation with application knowledge,
//! kept testable without a browser.

use crate::engine::{CaptureScript, CaptureTarget, ScriptStep, encode_component};

const MAP_DIRECTIONS_BASE: &str = "https://map.naver.com/p/directions";
const SCHOOL_ZONE_URL: &str = "https://asil.kr/asil/svl/schoolZone";
const PRICE_CHART_URL: &str = "https://asil.kr/asil/svl/priceChart";
const COMPLEX_PAGE_BASE: &str = "https://fin.land.naver.com/complexes";

/// Script hiding the directions side panel so only the map remains.
const HIDE_PANEL_JS: &str = "\
    const panel = document.querySelector('.svc_panel');\
    if (panel) panel.style.display = 'none';\
    const styled = document.querySelector('[class*=\"StyledPanelLayout\"]');\
    if (styled) styled.style.display = 'none';";

/// A directions route capture between two named points.
///
/// `mode` is the portal's path segment: `"walk"` or `"transit"`.
#[must_use]
pub fn route_script(
    from: (f64, f64),
    from_name: &str,
    to: (f64, f64),
    to_name: &str,
    mode: &str,
) -> CaptureScript {
    let url = format!(
        "{MAP_DIRECTIONS_BASE}/{},{},{},,,/{},{},{},,,/-/{mode}",
        from.1,
        from.0,
        encode_component(from_name),
        to.1,
        to.0,
        encode_component(to_name),
    );

    CaptureScript::page(url)
        .step(ScriptStep::WaitMs(5_000))
        .step(ScriptStep::Evaluate(HIDE_PANEL_JS.to_string()))
        .step(ScriptStep::WaitMs(500))
}

/// Walking route from the complex to its nearest station or school.
#[must_use]
pub fn walk_route_script(from: (f64, f64), from_name: &str, to: (f64, f64), to_name: &str) -> CaptureScript {
    route_script(from, from_name, to, to_name, "walk")
}

/// Transit route from the complex to the reference point.
#[must_use]
pub fn transit_route_script(
    from: (f64, f64),
    from_name: &str,
    to: (f64, f64),
    to_name: &str,
) -> CaptureScript {
    route_script(from, from_name, to, to_name, "transit")
}

/// Secondary-school zone map: search the address, pan to the complex,
/// switch the map to schools-only display. The layer juggling is one
/// atomic evaluate step — an opaque map-API sequence.
#[must_use]
pub fn school_zone_script(address: &str, lat: f64, lng: f64) -> CaptureScript {
    let pan_and_filter = format!(
        "map.setCenter(new kakao.maps.LatLng({lat}, {lng}));\
         map.setLevel(5);\
         showSchoolLayer('middle_high');\
         ['price','favorite','development'].forEach(hideOverlayLayer);"
    );

    CaptureScript::page(SCHOOL_ZONE_URL)
        .step(ScriptStep::WaitMs(3_000))
        .step(ScriptStep::Fill {
            selector: "input#search".to_string(),
            value: address.to_string(),
        })
        .step(ScriptStep::Press("Enter".to_string()))
        .step(ScriptStep::WaitMs(5_000))
        .step(ScriptStep::Evaluate(pan_and_filter))
        .step(ScriptStep::WaitMs(1_000))
}

/// Price trend chart for a complex, searched by name.
#[must_use]
pub fn price_chart_script(complex_name: &str) -> CaptureScript {
    CaptureScript::page(PRICE_CHART_URL)
        .step(ScriptStep::WaitMs(3_000))
        .step(ScriptStep::Fill {
            selector: "input#search".to_string(),
            value: complex_name.to_string(),
        })
        .step(ScriptStep::Press("Enter".to_string()))
        .step(ScriptStep::WaitForSelector("#chartArea".to_string()))
        .step(ScriptStep::WaitMs(2_000))
        .target(CaptureTarget::Element("#chartArea".to_string()))
}

/// Detail section of the complex page (the satellite/overview panel).
#[must_use]
pub fn complex_detail_script(complex_id: &str) -> CaptureScript {
    CaptureScript::page(format!("{COMPLEX_PAGE_BASE}/{complex_id}"))
        .step(ScriptStep::WaitForSelector(".complex_detail".to_string()))
        .step(ScriptStep::WaitMs(2_000))
        .target(CaptureTarget::Clip {
            x: 0,
            y: 120,
            width: 860,
            height: 640,
        })
}
