//! Statutory rate table and the regulatory rounding rule.
//!
//! The `rules` module holds the percentages the regulation applies to
//! each ceiling.  They are kept in a [`QuotaRules`] value rather than
//! hard-coded in the engine so that a corrected table can be loaded
//! from a JSON file without touching the evaluation pipeline.

use crate::error::QuotaError;
use crate::models::Percent;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rounds `x` the way the regulation prescribes: first to one decimal
/// place (half-up), then up to the next integer.
///
/// The two steps are not interchangeable with a single ceiling:
/// `10.01` rounds to `10.0` and stays `10`, while `10.05` becomes
/// `10.1` and then `11`.
pub fn regulatory_round(x: f64) -> i64 {
    let tenths = (x * 10.0).round() as i64;
    tenths.div_euclid(10) + i64::from(tenths.rem_euclid(10) != 0)
}

/// Percentages applied by each ceiling.  [`QuotaRules::default`] is the
/// current statutory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaRules {
    /// Added to the tier rate for the supplementary-allowance ceiling.
    pub extra_bonus: Percent,
    /// Upper bound on the supplementary-allowance rate.
    pub extra_cap: Percent,
    /// Transfer ceiling rate.
    pub transfer_rate: Percent,
    /// Flat raise-plan ceiling rate.
    pub raise_plan_rate: Percent,
    /// Added to the tier rate for the raise-plan and third blue-collar
    /// ceilings.
    pub raise_plan_bonus: Percent,
    /// Upper bound on the tier rate plus `raise_plan_bonus`.
    pub raise_plan_cap: Percent,
    /// Rate for the first two blue-collar interception ceilings.
    pub blue_collar_cap: Percent,
    /// Rate for the total foreign workforce ceiling.
    pub total_foreign_cap: Percent,
}

impl Default for QuotaRules {
    fn default() -> Self {
        Self {
            extra_bonus: Percent(20),
            extra_cap: Percent(40),
            transfer_rate: Percent(5),
            raise_plan_rate: Percent(10),
            raise_plan_bonus: Percent(30),
            raise_plan_cap: Percent(45),
            blue_collar_cap: Percent(40),
            total_foreign_cap: Percent(50),
        }
    }
}

impl QuotaRules {
    /// Supplementary-allowance rate for a tier: `min(base + bonus, cap)`.
    pub fn extra_rate(&self, base: Percent) -> Percent {
        base.plus_capped(self.extra_bonus, self.extra_cap)
    }

    /// Raised rate shared by the raise-plan ceiling and the third
    /// blue-collar ceiling: `min(base + bonus, cap)`.
    pub fn raised_rate(&self, base: Percent) -> Percent {
        base.plus_capped(self.raise_plan_bonus, self.raise_plan_cap)
    }

    /// Rejects tables that would apply a rate above 100%.
    pub fn validate(&self) -> Result<(), QuotaError> {
        let fields = [
            ("extra_bonus", self.extra_bonus),
            ("extra_cap", self.extra_cap),
            ("transfer_rate", self.transfer_rate),
            ("raise_plan_rate", self.raise_plan_rate),
            ("raise_plan_bonus", self.raise_plan_bonus),
            ("raise_plan_cap", self.raise_plan_cap),
            ("blue_collar_cap", self.blue_collar_cap),
            ("total_foreign_cap", self.total_foreign_cap),
        ];
        for (name, rate) in fields {
            if rate.0 > 100 {
                return Err(QuotaError::InvalidRules(format!(
                    "{name} is {rate}, rates may not exceed 100%"
                )));
            }
        }
        Ok(())
    }
}

/// Load a rule table from a JSON file.
///
/// Missing keys fall back to the statutory defaults, so a file only
/// needs to carry the rates it overrides.
pub fn load_rules(path: &Path) -> Result<QuotaRules, QuotaError> {
    let display = path.display().to_string();
    let data = std::fs::read_to_string(path).map_err(|source| QuotaError::RulesIo {
        path: display.clone(),
        source,
    })?;
    let rules: QuotaRules = serde_json::from_str(&data).map_err(|source| QuotaError::RulesParse {
        path: display,
        source,
    })?;
    rules.validate()?;
    tracing::info!(path = %path.display(), ?rules, "loaded quota rules");
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_regulatory_round_boundaries() {
        assert_eq!(regulatory_round(10.05), 11);
        assert_eq!(regulatory_round(10.04), 10);
        assert_eq!(regulatory_round(10.0), 10);
        assert_eq!(regulatory_round(10.01), 10);
        assert_eq!(regulatory_round(9.95), 10);
        assert_eq!(regulatory_round(121.0 * 0.20), 25);
        assert_eq!(regulatory_round(0.0), 0);
    }

    #[test]
    fn test_regulatory_round_is_identity_on_integers() {
        for n in [0_i64, 1, 7, 48, 250, 10_000] {
            assert_eq!(regulatory_round(n as f64), n);
        }
    }

    #[test]
    fn test_float_and_integer_rounding_agree() {
        for (headcount, rate) in [(121_u64, 20_u32), (121, 45), (201, 5), (321, 40), (87, 35)] {
            let exact = Percent(rate).ceiling_of(headcount);
            let real = regulatory_round(headcount as f64 * Percent(rate).as_fraction());
            assert_eq!(exact as i64, real, "{headcount} x {rate}%");
        }
    }

    #[test]
    fn test_derived_rates() {
        let rules = QuotaRules::default();
        assert_eq!(rules.extra_rate(Percent(35)), Percent(40));
        assert_eq!(rules.extra_rate(Percent(10)), Percent(30));
        assert_eq!(rules.raised_rate(Percent(20)), Percent(45));
        assert_eq!(rules.raised_rate(Percent(10)), Percent(40));
    }

    #[test]
    fn test_partial_rules_fall_back_to_defaults() {
        let rules: QuotaRules = serde_json::from_value(json!({"transfer_rate": 8})).unwrap();
        assert_eq!(rules.transfer_rate, Percent(8));
        assert_eq!(rules.total_foreign_cap, Percent(50));
    }

    #[test]
    fn test_validate_rejects_rates_above_100() {
        let rules = QuotaRules {
            total_foreign_cap: Percent(150),
            ..QuotaRules::default()
        };
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("total_foreign_cap"));
    }

    #[test]
    fn test_load_rules_from_file() {
        let dir = std::env::temp_dir().join(format!("quota-rules-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rules.json");
        std::fs::write(&path, r#"{"blue_collar_cap": 35}"#).unwrap();
        let rules = load_rules(&path).unwrap();
        assert_eq!(rules.blue_collar_cap, Percent(35));
        std::fs::remove_dir_all(&dir).unwrap();

        let missing = load_rules(&dir.join("missing.json")).unwrap_err();
        assert!(matches!(missing, QuotaError::RulesIo { .. }));
    }
}
