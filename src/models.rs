//! Data models for the Quota Engine.
//!
//! The `models` module defines the serialisable records that flow
//! through the calculator: the [`CompanyProfile`] describing one
//! employer's declared headcounts, the regulator-assigned
//! [`RateTier`], and the [`QuotaResult`] produced by
//! [`crate::engine::compute_quota`].  Headcounts are unsigned so that a
//! profile which made it past the intake boundary cannot carry a
//! negative value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A whole percentage point rate, e.g. `Percent(35)` for 35%.
///
/// Statutory rates are all whole percentages, which lets every ceiling
/// be computed in exact integer arithmetic; see [`Percent::ceiling_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(pub u32);

impl Percent {
    /// The rate as a fraction (`Percent(35)` is `0.35`).
    pub fn as_fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Adds `other` to this rate, capped at `cap`.
    pub fn plus_capped(self, other: Percent, cap: Percent) -> Percent {
        Percent(self.0.saturating_add(other.0).min(cap.0))
    }

    /// Applies the rate to `headcount` and rounds with the regulatory
    /// two-step rule: half-up to one decimal place, then up to the next
    /// whole worker.
    ///
    /// `headcount * percent` is the exact value in hundredths of a
    /// worker, so neither step touches floating point.  Saturates
    /// instead of overflowing for rates a rule table should never hold.
    pub fn ceiling_of(self, headcount: u64) -> u64 {
        let hundredths = headcount.saturating_mul(u64::from(self.0));
        let tenths = hundredths.saturating_add(5) / 10;
        (tenths + 9) / 10
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Regulator-assigned industry tier and its base ceiling rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateTier {
    /// Tier A+, 35%.  Serialised as `"A+"`.
    #[serde(rename = "A+")]
    APlus,
    /// Tier A, 25%.
    A,
    /// Tier B, 20%.
    B,
    /// Tier C, 15%.
    C,
    /// Tier D, 10%.
    D,
}

impl RateTier {
    /// Every tier, highest rate first.
    pub const ALL: [RateTier; 5] = [
        RateTier::APlus,
        RateTier::A,
        RateTier::B,
        RateTier::C,
        RateTier::D,
    ];

    /// Base ceiling rate for the tier.
    pub fn base_rate(self) -> Percent {
        match self {
            RateTier::APlus => Percent(35),
            RateTier::A => Percent(25),
            RateTier::B => Percent(20),
            RateTier::C => Percent(15),
            RateTier::D => Percent(10),
        }
    }

    /// Short label as printed by the regulator (`"A+"`, `"B"`).
    pub fn label(self) -> &'static str {
        match self {
            RateTier::APlus => "A+",
            RateTier::A => "A",
            RateTier::B => "B",
            RateTier::C => "C",
            RateTier::D => "D",
        }
    }

    /// Looks up the tier that carries `rate`.
    pub fn from_rate(rate: Percent) -> Option<RateTier> {
        Self::ALL.into_iter().find(|tier| tier.base_rate() == rate)
    }
}

impl fmt::Display for RateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.base_rate())
    }
}

/// One employer's declared headcounts.  Constructed fresh from each
/// submission (see [`crate::intake::QuotaSubmission`]) and never
/// mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Display name only; takes no part in the calculation.
    pub company_name: String,
    /// Domestic employee headcount.
    pub local_staff: u32,
    /// Selected industry tier.
    pub tier: RateTier,
    /// Primary-quota workers (b1).
    pub base_case: u32,
    /// Supplementary-allowance tiers (b2..b5).  A company may hold
    /// workers in several tiers at once; they share one ceiling.
    pub extra_5: u32,
    pub extra_10: u32,
    pub extra_15: u32,
    pub extra_20: u32,
    /// Inter-employer transfer quota (b6).
    pub transfer: u32,
    /// Wage-increase incentive quota (b7).
    pub raise_plan: u32,
    /// Mid-level technical foreign staff.
    pub tech_staff: u32,
    /// Professional foreign staff.  Counted in totals, never capped on
    /// its own.
    pub pro_staff: u32,
}

impl CompanyProfile {
    /// A profile with only a name, local headcount and tier set.
    pub fn new(company_name: impl Into<String>, local_staff: u32, tier: RateTier) -> Self {
        Self {
            company_name: company_name.into(),
            local_staff,
            tier,
            base_case: 0,
            extra_5: 0,
            extra_10: 0,
            extra_15: 0,
            extra_20: 0,
            transfer: 0,
            raise_plan: 0,
            tech_staff: 0,
            pro_staff: 0,
        }
    }

    /// Sums the category headcounts into the shared denominators.
    pub fn aggregates(&self) -> Aggregates {
        let extra_total = u64::from(self.extra_5)
            + u64::from(self.extra_10)
            + u64::from(self.extra_15)
            + u64::from(self.extra_20);
        let blue_collar_total = u64::from(self.base_case)
            + extra_total
            + u64::from(self.transfer)
            + u64::from(self.raise_plan);
        let total_foreign =
            blue_collar_total + u64::from(self.tech_staff) + u64::from(self.pro_staff);
        Aggregates {
            extra_total,
            blue_collar_total,
            total_foreign,
            all_staff: u64::from(self.local_staff) + total_foreign,
        }
    }
}

/// Headcount sums derived from a [`CompanyProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregates {
    /// All supplementary-allowance tiers together.
    pub extra_total: u64,
    /// Base case, extra allowance, transfer and raise-plan workers.
    pub blue_collar_total: u64,
    /// Blue-collar plus technical and professional staff.
    pub total_foreign: u64,
    /// Local plus all foreign staff; the denominator of every
    /// percentage-based ceiling.
    pub all_staff: u64,
}

/// Current usage, ceiling and display headroom for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryQuota {
    /// Workers currently held in the category.
    pub current: u64,
    /// Maximum the category may hold.
    pub ceiling: u64,
    /// `ceiling - current`, clamped at zero.  Informational only: these
    /// values must not be summed to obtain the overall headroom.
    pub remaining: u64,
}

impl CategoryQuota {
    pub fn new(current: u64, ceiling: u64) -> Self {
        Self {
            current,
            ceiling,
            remaining: ceiling.saturating_sub(current),
        }
    }
}

/// The cross-category ceilings that bound total hiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingKind {
    /// Blue-collar cap over the denominator net of transfers, counting
    /// base case and extra-allowance workers.
    BlueCollarNetOfTransfer,
    /// Blue-collar cap over the full denominator, counting transfers.
    BlueCollarWithTransfer,
    /// Blue-collar cap including raise-plan workers.
    BlueCollarWithRaisePlan,
    /// Overall cap on the foreign workforce.
    TotalForeign,
}

impl CeilingKind {
    /// True for the three ceilings that only count blue-collar workers.
    pub fn is_blue_collar(self) -> bool {
        !matches!(self, CeilingKind::TotalForeign)
    }

    /// Human-readable name used in reports.
    pub fn describe(self) -> &'static str {
        match self {
            CeilingKind::BlueCollarNetOfTransfer => "blue-collar cap excluding transfers",
            CeilingKind::BlueCollarWithTransfer => "blue-collar cap including transfers",
            CeilingKind::BlueCollarWithRaisePlan => "blue-collar cap including raise plan",
            CeilingKind::TotalForeign => "total foreign workforce cap",
        }
    }
}

/// One interception ceiling with its signed headroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeilingCheck {
    pub kind: CeilingKind,
    pub ceiling: u64,
    pub used: u64,
    /// `ceiling - used`; negative when the company is already over.
    pub remaining: i64,
}

impl CeilingCheck {
    pub fn new(kind: CeilingKind, ceiling: u64, used: u64) -> Self {
        Self {
            kind,
            ceiling,
            used,
            remaining: signed_diff(ceiling, used),
        }
    }
}

pub(crate) fn signed_diff(a: u64, b: u64) -> i64 {
    // Inputs are sums of u32 headcounts and ceilings of those sums, well
    // inside i64 range.
    a as i64 - b as i64
}

/// Output of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaResult {
    /// Tier the profile was evaluated under.
    pub tier: RateTier,
    /// Headcount sums the ceilings were computed from.
    pub aggregates: Aggregates,
    /// Primary case, capped at the tier rate of the core workforce.
    pub base_case: CategoryQuota,
    /// Shared pool for the supplementary-allowance tiers.
    pub extra: CategoryQuota,
    /// Inter-employer transfers.
    pub transfer: CategoryQuota,
    /// Wage-increase incentive workers; the lower of two ceilings.
    pub raise_plan: CategoryQuota,
    /// Technical staff, capped at the tier rate of all staff.
    pub tech: CategoryQuota,
    /// The four interception ceilings in evaluation order.
    pub checks: Vec<CeilingCheck>,
    /// Blue-collar headroom, clamped at zero.
    pub blue_collar_remaining: u64,
    /// Technician headroom, clamped at zero.
    pub tech_remaining: u64,
    /// Tightest headroom across all interception ceilings.  Negative
    /// means the company already exceeds a ceiling by that many.
    pub final_remaining: i64,
    /// The ceiling that produced `final_remaining`.
    pub binding: CeilingKind,
}

impl QuotaResult {
    pub fn is_over_quota(&self) -> bool {
        self.final_remaining < 0
    }

    pub fn check(&self, kind: CeilingKind) -> Option<&CeilingCheck> {
        self.checks.iter().find(|check| check.kind == kind)
    }
}
