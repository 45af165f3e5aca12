//! Employee incentive ledger.
//!
//! Every employee carries one [`IncentiveLedger`]. It records which
//! merchants the employee onboarded in each calendar month, pays a
//! per-onboarding incentive from time-versioned tier percentages, and
//! evaluates the month's revenue-target bonus.
//!
//! All operations are synchronous and take the current time as an
//! argument; loading and saving the ledger is the caller's job.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PerkdeskError, PerkdeskResult};

/// Package tier name → value (price or percentage).
pub type TierMap = BTreeMap<String, Decimal>;

/// Earliest and latest calendar years accepted for monthly records.
pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 9999;

/// Converts revenue above the monthly target into a payable bonus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BonusRule {
    /// Pays `amount_per_revenue` for every currency unit above target.
    #[serde(rename_all = "camelCase")]
    PerRevenue { amount_per_revenue: Option<Decimal> },
    /// Pays a flat amount once any revenue exceeds the target.
    #[serde(rename_all = "camelCase")]
    Fixed { fixed_bonus_amount: Option<Decimal> },
}

impl Default for BonusRule {
    fn default() -> Self {
        BonusRule::PerRevenue {
            amount_per_revenue: None,
        }
    }
}

impl BonusRule {
    /// Bonus owed for the given excess over target.
    ///
    /// A fixed rule is all-or-nothing: an excess of 1 and an excess of
    /// 1,000,000 both pay `fixed_bonus_amount`.
    pub fn bonus_for_excess(&self, excess: Decimal) -> PerkdeskResult<Decimal> {
        if excess <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        match self {
            BonusRule::PerRevenue { amount_per_revenue } => excess
                .checked_mul(amount_per_revenue.unwrap_or(Decimal::ZERO))
                .ok_or_else(|| out_of_range("bonusAmount")),
            BonusRule::Fixed { fixed_bonus_amount } => {
                Ok(fixed_bonus_amount.unwrap_or(Decimal::ZERO))
            }
        }
    }

    fn validate(&self) -> PerkdeskResult<()> {
        let (field, amount) = match self {
            BonusRule::PerRevenue { amount_per_revenue } => {
                ("amountPerRevenue", amount_per_revenue)
            }
            BonusRule::Fixed { fixed_bonus_amount } => ("fixedBonusAmount", fixed_bonus_amount),
        };
        match amount {
            Some(a) if *a < Decimal::ZERO => {
                Err(PerkdeskError::validation(field, "must not be negative"))
            }
            _ => Ok(()),
        }
    }
}

/// Full snapshot of tier percentages effective from a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveSnapshot {
    pub percentage: TierMap,
    pub effective_from: DateTime<Utc>,
}

/// Merchant attributed to an employee within a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardedMerchant {
    pub merchant_id: String,
    pub name: String,
    pub email: String,
    pub package: String,
    pub revenue: Decimal,
}

/// Merchant as submitted by the caller.
///
/// `revenue` is accepted for compatibility with existing payloads but is
/// always replaced by the tier's configured package price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMerchant {
    pub merchant_id: String,
    pub name: String,
    pub email: String,
    pub package: String,
    #[serde(default)]
    pub revenue: Option<Decimal>,
}

impl NewMerchant {
    fn validate(&self) -> PerkdeskResult<()> {
        let fields = [
            ("merchantId", &self.merchant_id),
            ("name", &self.name),
            ("email", &self.email),
            ("package", &self.package),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(PerkdeskError::validation(field, "must not be empty"));
            }
        }
        Ok(())
    }
}

/// Onboarding and bonus state for one (year, month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub year: i32,
    pub month: u32,
    /// Overrides the ledger default when set.
    pub revenue_target: Option<Decimal>,
    pub onboarded_count: u32,
    pub onboarded_merchants: Vec<OnboardedMerchant>,
    /// Overrides the ledger default when set.
    pub bonus_rule: Option<BonusRule>,
    pub bonus_amount: Decimal,
    pub bonus_calculated_at: Option<DateTime<Utc>>,
}

impl MonthlyRecord {
    fn new(year: i32, month: u32, revenue_target: Decimal) -> Self {
        Self {
            year,
            month,
            revenue_target: Some(revenue_target),
            onboarded_count: 0,
            onboarded_merchants: Vec::new(),
            bonus_rule: None,
            bonus_amount: Decimal::ZERO,
            bonus_calculated_at: None,
        }
    }

    /// Sum of revenue over the month's onboarded merchants.
    pub fn total_revenue(&self) -> PerkdeskResult<Decimal> {
        self.onboarded_merchants
            .iter()
            .try_fold(Decimal::ZERO, |acc, m| acc.checked_add(m.revenue))
            .ok_or_else(|| out_of_range("revenue"))
    }

    pub fn has_merchant(&self, merchant_id: &str) -> bool {
        self.onboarded_merchants
            .iter()
            .any(|m| m.merchant_id == merchant_id)
    }
}

/// Result of [`IncentiveLedger::register_onboarding`].
#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingOutcome {
    /// First registration of the merchant in that month.
    Registered { revenue: Decimal, incentive: Decimal },
    /// The merchant was already attributed to that month; nothing changed.
    AlreadyRegistered,
}

impl OnboardingOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, OnboardingOutcome::Registered { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncentiveLedger {
    pub package_prices: TierMap,
    /// Current rates, used when no history snapshot applies.
    pub incentive_percentages: TierMap,
    /// Append-only; not kept sorted.
    pub incentive_percentage_history: Vec<IncentiveSnapshot>,
    pub monthly_records: Vec<MonthlyRecord>,
    pub default_monthly_revenue_target: Decimal,
    pub default_bonus_rule: BonusRule,
    pub total_onboarded: u64,
    pub total_bonus_earned: Decimal,
    pub onboarding_incentive_earned: Decimal,
}

impl IncentiveLedger {
    /// Percentage for `tier` effective at `at`.
    ///
    /// Picks the history snapshot with the latest `effective_from <= at`
    /// (the later-inserted one on a tie). Without a qualifying snapshot
    /// the current `incentive_percentages` apply. Unknown tiers yield 0.
    pub fn applicable_percentage(&self, tier: &str, at: DateTime<Utc>) -> Decimal {
        let snapshot = self
            .incentive_percentage_history
            .iter()
            .filter(|s| s.effective_from <= at)
            .max_by_key(|s| s.effective_from);

        let rates = match snapshot {
            Some(s) => &s.percentage,
            None => &self.incentive_percentages,
        };
        rates.get(tier).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn monthly_record(&self, year: i32, month: u32) -> Option<&MonthlyRecord> {
        self.monthly_records
            .iter()
            .find(|r| r.year == year && r.month == month)
    }

    /// Attribute `merchant` to the given month (defaults to the month of
    /// `now`) and credit the onboarding incentive.
    ///
    /// Re-registering a merchant already present in that month is a
    /// no-op. The incentive percentage is resolved at `now`, not at the
    /// attributed month.
    pub fn register_onboarding(
        &mut self,
        merchant: NewMerchant,
        year: Option<i32>,
        month: Option<u32>,
        now: DateTime<Utc>,
    ) -> PerkdeskResult<OnboardingOutcome> {
        merchant.validate()?;
        let year = year.unwrap_or_else(|| now.year());
        let month = month.unwrap_or_else(|| now.month());
        validate_period(year, month)?;

        if self
            .monthly_record(year, month)
            .is_some_and(|r| r.has_merchant(&merchant.merchant_id))
        {
            return Ok(OnboardingOutcome::AlreadyRegistered);
        }

        let revenue = self
            .package_prices
            .get(&merchant.package)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let percentage = self.applicable_percentage(&merchant.package, now);
        let incentive = revenue
            .checked_mul(percentage)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| out_of_range("incentive"))?;
        let incentive_earned = self
            .onboarding_incentive_earned
            .checked_add(incentive)
            .ok_or_else(|| out_of_range("onboardingIncentiveEarned"))?;
        let total_onboarded = self
            .total_onboarded
            .checked_add(1)
            .ok_or_else(|| out_of_range("totalOnboarded"))?;

        let record = self.month_entry(year, month);
        record.onboarded_merchants.push(OnboardedMerchant {
            merchant_id: merchant.merchant_id,
            name: merchant.name,
            email: merchant.email,
            package: merchant.package,
            revenue,
        });
        record.onboarded_count = record.onboarded_merchants.len() as u32;

        self.total_onboarded = total_onboarded;
        self.onboarding_incentive_earned = incentive_earned;

        Ok(OnboardingOutcome::Registered { revenue, incentive })
    }

    /// Evaluate and store the revenue-target bonus for a month.
    ///
    /// Recomputing a month adds the new amount to `total_bonus_earned`
    /// again; the previous amount is not subtracted.
    pub fn compute_monthly_bonus(
        &mut self,
        year: i32,
        month: u32,
        now: DateTime<Utc>,
    ) -> PerkdeskResult<Decimal> {
        validate_period(year, month)?;
        let default_target = self.default_monthly_revenue_target;
        let default_rule = &self.default_bonus_rule;

        let record = self
            .monthly_records
            .iter_mut()
            .find(|r| r.year == year && r.month == month)
            .ok_or_else(|| PerkdeskError::not_found("monthly_record", period_key(year, month)))?;

        let rule = record.bonus_rule.as_ref().unwrap_or(default_rule);
        let target = record.revenue_target.unwrap_or(default_target);
        let excess = record
            .total_revenue()?
            .checked_sub(target)
            .ok_or_else(|| out_of_range("revenue"))?
            .max(Decimal::ZERO);
        let bonus = rule.bonus_for_excess(excess)?;
        let total_bonus_earned = self
            .total_bonus_earned
            .checked_add(bonus)
            .ok_or_else(|| out_of_range("totalBonusEarned"))?;

        record.bonus_amount = bonus;
        record.bonus_calculated_at = Some(now);
        self.total_bonus_earned = total_bonus_earned;

        Ok(bonus)
    }

    pub fn set_package_price(&mut self, tier: &str, price: Decimal) -> PerkdeskResult<()> {
        validate_tier(tier)?;
        if price < Decimal::ZERO {
            return Err(PerkdeskError::validation("price", "must not be negative"));
        }
        self.package_prices.insert(tier.to_string(), price);
        Ok(())
    }

    /// Record a new percentage snapshot.
    ///
    /// The snapshot always goes into history. It also becomes the
    /// current rate set when it is already in effect at `now`.
    pub fn set_incentive_percentages(
        &mut self,
        percentages: TierMap,
        effective_from: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> PerkdeskResult<()> {
        validate_percentages(&percentages)?;

        if effective_from <= now {
            self.incentive_percentages = percentages.clone();
        }
        self.incentive_percentage_history.push(IncentiveSnapshot {
            percentage: percentages,
            effective_from,
        });
        Ok(())
    }

    pub fn set_default_revenue_target(&mut self, target: Decimal) -> PerkdeskResult<()> {
        validate_target(target)?;
        self.default_monthly_revenue_target = target;
        Ok(())
    }

    pub fn set_default_bonus_rule(&mut self, rule: BonusRule) -> PerkdeskResult<()> {
        rule.validate()?;
        self.default_bonus_rule = rule;
        Ok(())
    }

    /// Override the revenue target of one month, creating its record if
    /// needed.
    pub fn set_monthly_revenue_target(
        &mut self,
        year: i32,
        month: u32,
        target: Decimal,
    ) -> PerkdeskResult<()> {
        validate_period(year, month)?;
        validate_target(target)?;
        self.month_entry(year, month).revenue_target = Some(target);
        Ok(())
    }

    /// Override (or clear, with `None`) the bonus rule of one month.
    pub fn set_monthly_bonus_rule(
        &mut self,
        year: i32,
        month: u32,
        rule: Option<BonusRule>,
    ) -> PerkdeskResult<()> {
        validate_period(year, month)?;
        if let Some(rule) = &rule {
            rule.validate()?;
        }
        self.month_entry(year, month).bonus_rule = rule;
        Ok(())
    }

    fn month_entry(&mut self, year: i32, month: u32) -> &mut MonthlyRecord {
        let idx = match self
            .monthly_records
            .iter()
            .position(|r| r.year == year && r.month == month)
        {
            Some(idx) => idx,
            None => {
                self.monthly_records.push(MonthlyRecord::new(
                    year,
                    month,
                    self.default_monthly_revenue_target,
                ));
                self.monthly_records.len() - 1
            }
        };
        &mut self.monthly_records[idx]
    }
}

impl IncentiveLedger {
    /// Check a ledger that did not come through the setters, such as one
    /// supplied whole when an employee is created.
    pub fn validate(&self) -> PerkdeskResult<()> {
        for (tier, price) in &self.package_prices {
            validate_tier(tier)?;
            if *price < Decimal::ZERO {
                return Err(PerkdeskError::validation("price", "must not be negative"));
            }
        }
        validate_percentages(&self.incentive_percentages)?;
        for snapshot in &self.incentive_percentage_history {
            validate_percentages(&snapshot.percentage)?;
        }
        validate_target(self.default_monthly_revenue_target)?;
        self.default_bonus_rule.validate()?;

        for record in &self.monthly_records {
            validate_period(record.year, record.month)?;
            if let Some(target) = record.revenue_target {
                validate_target(target)?;
            }
            if let Some(rule) = &record.bonus_rule {
                rule.validate()?;
            }
        }
        Ok(())
    }
}

fn out_of_range(field: &str) -> PerkdeskError {
    PerkdeskError::validation(field, "amount out of range")
}

fn period_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

fn validate_period(year: i32, month: u32) -> PerkdeskResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(PerkdeskError::validation(
            "year",
            format!("must be between {MIN_YEAR} and {MAX_YEAR}"),
        ));
    }
    if !(1..=12).contains(&month) {
        return Err(PerkdeskError::validation("month", "must be between 1 and 12"));
    }
    Ok(())
}

fn validate_tier(tier: &str) -> PerkdeskResult<()> {
    if tier.trim().is_empty() {
        return Err(PerkdeskError::validation("package", "must not be empty"));
    }
    Ok(())
}

fn validate_percentages(percentages: &TierMap) -> PerkdeskResult<()> {
    for (tier, pct) in percentages {
        validate_tier(tier)?;
        if *pct < Decimal::ZERO || *pct > Decimal::ONE_HUNDRED {
            return Err(PerkdeskError::validation(
                format!("percentage.{tier}"),
                "must be between 0 and 100",
            ));
        }
    }
    Ok(())
}

fn validate_target(target: Decimal) -> PerkdeskResult<()> {
    if target < Decimal::ZERO {
        return Err(PerkdeskError::validation(
            "revenueTarget",
            "must not be negative",
        ));
    }
    Ok(())
}
