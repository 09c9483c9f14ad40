//! Submission intake.
//!
//! A [`QuotaSubmission`] is the raw record collected by a form or an
//! API client.  Headcounts arrive as signed integers and the tier as
//! free text; [`QuotaSubmission::validate`] turns them into a
//! [`CompanyProfile`] or rejects the whole submission.

use crate::error::QuotaError;
use crate::models::{CompanyProfile, Percent, RateTier};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaSubmission {
    pub company_name: String,
    pub local_staff: i64,
    /// Tier label (`"A+"`, `"B"`) or base rate (`"0.20"`, `"20%"`).
    pub tier: String,
    pub base_case: i64,
    pub extra_5: i64,
    pub extra_10: i64,
    pub extra_15: i64,
    pub extra_20: i64,
    pub transfer: i64,
    pub raise_plan: i64,
    pub tech_staff: i64,
    pub pro_staff: i64,
}

impl QuotaSubmission {
    /// Validates every field and builds the profile.  The first bad
    /// field is reported.
    pub fn validate(&self) -> Result<CompanyProfile, QuotaError> {
        let tier = self.tier.parse::<RateTier>()?;
        Ok(CompanyProfile {
            company_name: self.company_name.trim().to_string(),
            local_staff: headcount("local_staff", self.local_staff)?,
            tier,
            base_case: headcount("base_case", self.base_case)?,
            extra_5: headcount("extra_5", self.extra_5)?,
            extra_10: headcount("extra_10", self.extra_10)?,
            extra_15: headcount("extra_15", self.extra_15)?,
            extra_20: headcount("extra_20", self.extra_20)?,
            transfer: headcount("transfer", self.transfer)?,
            raise_plan: headcount("raise_plan", self.raise_plan)?,
            tech_staff: headcount("tech_staff", self.tech_staff)?,
            pro_staff: headcount("pro_staff", self.pro_staff)?,
        })
    }
}

fn headcount(field: &str, value: i64) -> Result<u32, QuotaError> {
    if value < 0 {
        return Err(QuotaError::invalid_input(
            field,
            format!("headcount must not be negative (got {value})"),
        ));
    }
    u32::try_from(value).map_err(|_| {
        QuotaError::invalid_input(field, format!("headcount {value} is out of range"))
    })
}

impl FromStr for RateTier {
    type Err = QuotaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let by_label = RateTier::ALL
            .into_iter()
            .find(|tier| tier.label().eq_ignore_ascii_case(raw));
        by_label
            .or_else(|| parse_rate(raw).and_then(RateTier::from_rate))
            .ok_or_else(|| {
                QuotaError::invalid_input("tier", format!("unrecognised rate tier `{raw}`"))
            })
    }
}

/// Reads `"0.35"` or `"35%"` as whole percentage points.
fn parse_rate(raw: &str) -> Option<Percent> {
    let points = match raw.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()?,
        None => raw.parse::<f64>().ok()? * 100.0,
    };
    let rounded = points.round();
    if !points.is_finite() || rounded < 0.0 || (points - rounded).abs() > 1e-6 {
        return None;
    }
    Some(Percent(rounded as u32))
}
