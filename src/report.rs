//! Report generation.
//!
//! A finished [`QuotaResult`] can be handed to a report generator
//! together with the profile it came from.  [`ReportDocument`] collects
//! the figures a printable report shows; [`ReportRenderer`]
//! implementations turn it into bytes.  Renderers may depend on
//! resources that are missing at runtime (fonts, external tools), so
//! each one reports whether it is usable and [`FallbackRenderer`]
//! walks a chain of them, degrading to a plain error-marker document
//! rather than failing the request.

use crate::models::{CategoryQuota, CompanyProfile, QuotaResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;

pub const REPORT_TITLE: &str = "Manufacturing Foreign Worker Quota Report";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer `{0}` is not available")]
    Unavailable(String),
    #[error("renderer `{renderer}` failed: {reason}")]
    Failed { renderer: String, reason: String },
}

/// One current/remaining pair in the category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    /// Category name as printed.
    pub label: String,
    /// Workers currently held in the category.
    pub current: u64,
    /// Clamped display headroom for the category.
    pub remaining: u64,
}

impl ReportLine {
    fn new(label: &str, quota: &CategoryQuota) -> Self {
        Self {
            label: label.to_string(),
            current: quota.current,
            remaining: quota.remaining,
        }
    }
}

/// The content of a quota report, independent of its output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Heading, [`REPORT_TITLE`].
    pub title: String,
    /// Submitting company, for labelling only.
    pub company_name: String,
    /// Tier label with its rate, e.g. `"B (20%)"`.
    pub tier: String,
    /// Foreign workers currently employed, all categories.
    pub total_foreign: u64,
    /// Blue-collar share of `total_foreign`.
    pub blue_collar_total: u64,
    /// Signed headroom; negative when over quota.
    pub final_remaining: i64,
    /// Clamped blue-collar headroom.
    pub blue_collar_remaining: u64,
    /// Clamped technician headroom.
    pub tech_remaining: u64,
    /// Description of the ceiling that produced `final_remaining`.
    pub binding_ceiling: String,
    /// Current/remaining pairs in report order.
    pub categories: Vec<ReportLine>,
    /// Local plus foreign staff.
    pub all_staff: u64,
}

impl ReportDocument {
    /// Collects the report figures from a profile and its result.
    pub fn build(profile: &CompanyProfile, result: &QuotaResult) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            company_name: profile.company_name.clone(),
            tier: profile.tier.to_string(),
            total_foreign: result.aggregates.total_foreign,
            blue_collar_total: result.aggregates.blue_collar_total,
            final_remaining: result.final_remaining,
            blue_collar_remaining: result.blue_collar_remaining,
            tech_remaining: result.tech_remaining,
            binding_ceiling: result.binding.describe().to_string(),
            categories: vec![
                ReportLine::new("Base case", &result.base_case),
                ReportLine::new("Extra allowance", &result.extra),
                ReportLine::new("Transfer", &result.transfer),
                ReportLine::new("Raise plan", &result.raise_plan),
                ReportLine::new("Technical staff", &result.tech),
            ],
            all_staff: result.aggregates.all_staff,
        }
    }
}

/// Turns a [`ReportDocument`] into an output document.
///
/// Renderers must be thread-safe (`Send + Sync`) because the API shares
/// them across requests.
pub trait ReportRenderer: Send + Sync {
    fn name(&self) -> &str;
    /// MIME type of the rendered bytes.
    fn content_type(&self) -> &'static str;
    /// Whether the resources this renderer needs are present.
    fn is_available(&self) -> bool {
        true
    }
    fn render(&self, doc: &ReportDocument) -> Result<Vec<u8>, RenderError>;
}

pub struct PlainTextRenderer;

impl ReportRenderer for PlainTextRenderer {
    fn name(&self) -> &str {
        "text"
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, doc: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        let failed = |err: std::fmt::Error| RenderError::Failed {
            renderer: self.name().to_string(),
            reason: err.to_string(),
        };
        write_text(&mut out, doc).map_err(failed)?;
        Ok(out.into_bytes())
    }
}

fn write_text(out: &mut String, doc: &ReportDocument) -> std::fmt::Result {
    writeln!(out, "{}", doc.title)?;
    writeln!(out)?;
    writeln!(out, "Company: {}", doc.company_name)?;
    writeln!(out, "Tier: {}", doc.tier)?;
    writeln!(
        out,
        "Foreign workers employed: {} (blue-collar {})",
        doc.total_foreign, doc.blue_collar_total
    )?;
    if doc.final_remaining < 0 {
        writeln!(
            out,
            "Over quota by {} ({})",
            doc.final_remaining.unsigned_abs(),
            doc.binding_ceiling
        )?;
    } else {
        writeln!(out, "Additional hires permitted: {}", doc.final_remaining)?;
    }
    writeln!(
        out,
        "(blue-collar {}, technical staff {})",
        doc.blue_collar_remaining, doc.tech_remaining
    )?;
    writeln!(out, "{}", "-".repeat(50))?;
    for line in &doc.categories {
        writeln!(
            out,
            "{}: current {} / remaining {}",
            line.label, line.current, line.remaining
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Total staff (local + foreign): {}", doc.all_staff)
}

pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, doc: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        serde_json::to_vec_pretty(doc).map_err(|err| RenderError::Failed {
            renderer: self.name().to_string(),
            reason: err.to_string(),
        })
    }
}

/// Output of a [`FallbackRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Name of the renderer that produced `body`, or `"error-marker"`.
    pub renderer: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl RenderedReport {
    pub fn is_degraded(&self) -> bool {
        self.renderer == ERROR_MARKER
    }
}

const ERROR_MARKER: &str = "error-marker";

/// Tries each renderer in order and never fails: when no renderer
/// succeeds the caller receives an error-marker document listing why.
pub struct FallbackRenderer {
    renderers: Vec<Arc<dyn ReportRenderer>>,
}

impl FallbackRenderer {
    pub fn new(renderers: Vec<Arc<dyn ReportRenderer>>) -> Self {
        Self { renderers }
    }

    pub fn render(&self, doc: &ReportDocument) -> RenderedReport {
        let mut failures = Vec::new();
        for renderer in &self.renderers {
            if !renderer.is_available() {
                tracing::warn!(renderer = renderer.name(), "report renderer unavailable, skipping");
                failures.push(RenderError::Unavailable(renderer.name().to_string()));
                continue;
            }
            match renderer.render(doc) {
                Ok(body) => {
                    return RenderedReport {
                        renderer: renderer.name().to_string(),
                        content_type: renderer.content_type(),
                        body,
                    }
                }
                Err(err) => {
                    tracing::warn!(renderer = renderer.name(), error = %err, "report renderer failed");
                    failures.push(err);
                }
            }
        }
        error_marker(doc, &failures)
    }
}

impl Default for FallbackRenderer {
    fn default() -> Self {
        Self::new(vec![Arc::new(PlainTextRenderer)])
    }
}

fn error_marker(doc: &ReportDocument, failures: &[RenderError]) -> RenderedReport {
    let mut body = format!(
        "{}\n\nReport for {} could not be rendered.\n",
        doc.title, doc.company_name
    );
    for failure in failures {
        body.push_str(&format!("- {failure}\n"));
    }
    RenderedReport {
        renderer: ERROR_MARKER.to_string(),
        content_type: "text/plain; charset=utf-8",
        body: body.into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_quota;
    use crate::models::RateTier;
    use crate::rules::QuotaRules;

    struct Broken;

    impl ReportRenderer for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn content_type(&self) -> &'static str {
            "application/pdf"
        }
        fn render(&self, _doc: &ReportDocument) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Failed {
                renderer: "broken".into(),
                reason: "font missing".into(),
            })
        }
    }

    struct Missing;

    impl ReportRenderer for Missing {
        fn name(&self) -> &str {
            "missing"
        }
        fn content_type(&self) -> &'static str {
            "application/pdf"
        }
        fn is_available(&self) -> bool {
            false
        }
        fn render(&self, _doc: &ReportDocument) -> Result<Vec<u8>, RenderError> {
            panic!("unavailable renderer must not be called");
        }
    }

    fn document(base_case: u32) -> ReportDocument {
        let profile = CompanyProfile {
            base_case,
            tech_staff: 3,
            ..CompanyProfile::new("Harbor Castings", 121, RateTier::B)
        };
        let result = compute_quota(&profile, &QuotaRules::default());
        ReportDocument::build(&profile, &result)
    }

    #[test]
    fn document_carries_category_pairs() {
        let doc = document(10);
        assert_eq!(doc.company_name, "Harbor Castings");
        assert_eq!(doc.categories.len(), 5);
        assert_eq!(doc.categories[0].label, "Base case");
        assert_eq!(doc.categories[0].current, 10);
        assert_eq!(doc.categories[4].current, 3);
        assert_eq!(doc.all_staff, 134);
    }

    #[test]
    fn text_report_lists_figures() {
        let doc = document(10);
        let text = String::from_utf8(PlainTextRenderer.render(&doc).unwrap()).unwrap();
        assert!(text.starts_with(REPORT_TITLE));
        assert!(text.contains("Company: Harbor Castings"));
        assert!(text.contains(&format!("Additional hires permitted: {}", doc.final_remaining)));
        assert!(text.contains("Base case: current 10 / remaining"));
        assert!(text.contains("Total staff (local + foreign): 134"));
    }

    #[test]
    fn text_report_flags_over_quota() {
        let doc = document(200);
        assert!(doc.final_remaining < 0);
        let text = String::from_utf8(PlainTextRenderer.render(&doc).unwrap()).unwrap();
        assert!(text.contains(&format!("Over quota by {}", -doc.final_remaining)));
    }

    #[test]
    fn fallback_skips_unavailable_and_failed_renderers() {
        let chain = FallbackRenderer::new(vec![
            Arc::new(Missing),
            Arc::new(Broken),
            Arc::new(JsonRenderer),
        ]);
        let report = chain.render(&document(10));
        assert_eq!(report.renderer, "json");
        assert_eq!(report.content_type, "application/json");
        let parsed: ReportDocument = serde_json::from_slice(&report.body).unwrap();
        assert_eq!(parsed, document(10));
    }

    #[test]
    fn fallback_degrades_to_error_marker() {
        let chain = FallbackRenderer::new(vec![Arc::new(Missing), Arc::new(Broken)]);
        let report = chain.render(&document(10));
        assert!(report.is_degraded());
        let text = String::from_utf8(report.body).unwrap();
        assert!(text.contains("could not be rendered"));
        assert!(text.contains("renderer `missing` is not available"));
        assert!(text.contains("font missing"));
    }
}
