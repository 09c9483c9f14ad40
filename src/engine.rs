//! Quota computation engine.
//!
//! The `engine` module turns a [`CompanyProfile`] into a
//! [`QuotaResult`].  Evaluation follows a fixed pipeline: aggregates,
//! then the per-category ceilings, then the interception ceilings whose
//! minimum is the authoritative headroom.  Each stage reads only the
//! outputs of earlier stages.  Independent profiles can be evaluated
//! in parallel with [`compute_batch`], which uses the [`rayon`] crate.

use crate::models::{
    signed_diff, CategoryQuota, CeilingCheck, CeilingKind, CompanyProfile, QuotaResult,
};
use crate::rules::QuotaRules;
use rayon::prelude::*;

/// Computes the hiring quota for one profile.
///
/// Total over every valid profile: there is no division and no input
/// for which the arithmetic can fail.
pub fn compute_quota(profile: &CompanyProfile, rules: &QuotaRules) -> QuotaResult {
    let agg = profile.aggregates();
    let rate = profile.tier.base_rate();
    let all_staff = agg.all_staff;
    let transfer = u64::from(profile.transfer);
    let base_case = u64::from(profile.base_case);
    let tech_staff = u64::from(profile.tech_staff);
    let net_of_transfer = all_staff - transfer;

    // Primary case: only the core workforce, excluding the
    // supplementary, transfer and raise-plan categories.
    let core = u64::from(profile.local_staff)
        + base_case
        + tech_staff
        + u64::from(profile.pro_staff);
    let base_case_ceiling = rate.ceiling_of(core);

    // Supplementary allowance is a pool on top of the primary case.
    let extra_ceiling = rules
        .extra_rate(rate)
        .ceiling_of(net_of_transfer)
        .saturating_sub(base_case_ceiling);

    let transfer_ceiling = rules.transfer_rate.ceiling_of(all_staff);

    let raised_rate = rules.raised_rate(rate);
    let raise_plan_ceiling = rules
        .raise_plan_rate
        .ceiling_of(all_staff)
        .min(raised_rate.ceiling_of(all_staff));

    let tech_ceiling = rate.ceiling_of(all_staff);

    let [net_check, transfer_check, raise_check, total_check] = [
        CeilingCheck::new(
            CeilingKind::BlueCollarNetOfTransfer,
            rules.blue_collar_cap.ceiling_of(net_of_transfer),
            base_case + agg.extra_total,
        ),
        CeilingCheck::new(
            CeilingKind::BlueCollarWithTransfer,
            rules.blue_collar_cap.ceiling_of(all_staff),
            base_case + agg.extra_total + transfer,
        ),
        CeilingCheck::new(
            CeilingKind::BlueCollarWithRaisePlan,
            raised_rate.ceiling_of(all_staff),
            agg.blue_collar_total,
        ),
        CeilingCheck::new(
            CeilingKind::TotalForeign,
            rules.total_foreign_cap.ceiling_of(all_staff),
            agg.total_foreign,
        ),
    ];

    let blue_collar_min = net_check
        .remaining
        .min(transfer_check.remaining)
        .min(raise_check.remaining);
    let blue_collar_remaining = clamp_non_negative(blue_collar_min);
    let tech_remaining =
        clamp_non_negative(signed_diff(tech_ceiling, tech_staff).min(total_check.remaining));

    // Earlier checks win ties so the reported binding ceiling is stable.
    let tightest = [transfer_check, raise_check, total_check]
        .into_iter()
        .fold(net_check, |best, check| {
            if check.remaining < best.remaining {
                check
            } else {
                best
            }
        });

    tracing::debug!(
        company = %profile.company_name,
        tier = profile.tier.label(),
        all_staff,
        binding = ?tightest.kind,
        final_remaining = tightest.remaining,
        "computed quota"
    );

    QuotaResult {
        tier: profile.tier,
        aggregates: agg,
        base_case: CategoryQuota::new(base_case, base_case_ceiling),
        extra: CategoryQuota::new(agg.extra_total, extra_ceiling),
        transfer: CategoryQuota::new(transfer, transfer_ceiling),
        raise_plan: CategoryQuota::new(u64::from(profile.raise_plan), raise_plan_ceiling),
        tech: CategoryQuota::new(tech_staff, tech_ceiling),
        checks: vec![net_check, transfer_check, raise_check, total_check],
        blue_collar_remaining,
        tech_remaining,
        final_remaining: tightest.remaining,
        binding: tightest.kind,
    }
}

/// Evaluates independent profiles in parallel.  Results keep the order
/// of `profiles`.
pub fn compute_batch(profiles: &[CompanyProfile], rules: &QuotaRules) -> Vec<QuotaResult> {
    profiles
        .par_iter()
        .map(|profile| compute_quota(profile, rules))
        .collect()
}

fn clamp_non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
