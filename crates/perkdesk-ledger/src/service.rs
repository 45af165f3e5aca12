//! Incentive service — employee onboarding, bonus and rate management.

use chrono::{DateTime, Utc};
use perkdesk_core::error::PerkdeskResult;
use perkdesk_core::incentive::{BonusRule, NewMerchant, OnboardingOutcome, TierMap};
use perkdesk_core::models::employee::Employee;
use perkdesk_core::repository::EmployeeRepository;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

/// Each call is one load → mutate → save cycle on a single employee.
/// Saves replace the whole ledger, so concurrent calls for the same
/// employee can lose an update.
pub struct IncentiveService<E: EmployeeRepository> {
    employee_repo: E,
}

impl<E: EmployeeRepository> IncentiveService<E> {
    pub fn new(employee_repo: E) -> Self {
        Self { employee_repo }
    }

    /// Attribute a merchant to an employee for a month (current month by
    /// default). A duplicate registration is reported and not saved.
    pub async fn register_onboarding(
        &self,
        employee_id: Uuid,
        merchant: NewMerchant,
        year: Option<i32>,
        month: Option<u32>,
    ) -> PerkdeskResult<OnboardingOutcome> {
        let mut employee = self.employee_repo.get_by_id(employee_id).await?;
        let merchant_id = merchant.merchant_id.clone();

        let outcome = employee
            .ledger
            .register_onboarding(merchant, year, month, Utc::now())?;

        match &outcome {
            OnboardingOutcome::Registered { revenue, incentive } => {
                self.employee_repo
                    .save_ledger(employee_id, &employee.ledger)
                    .await?;
                info!(
                    %employee_id,
                    %merchant_id,
                    %revenue,
                    %incentive,
                    "Merchant onboarding registered"
                );
            }
            OnboardingOutcome::AlreadyRegistered => {
                debug!(%employee_id, %merchant_id, "Merchant already registered for month");
            }
        }

        Ok(outcome)
    }

    /// Compute and store the revenue-target bonus for a month.
    pub async fn compute_monthly_bonus(
        &self,
        employee_id: Uuid,
        year: i32,
        month: u32,
    ) -> PerkdeskResult<Decimal> {
        let mut employee = self.employee_repo.get_by_id(employee_id).await?;
        let bonus = employee
            .ledger
            .compute_monthly_bonus(year, month, Utc::now())?;
        self.employee_repo
            .save_ledger(employee_id, &employee.ledger)
            .await?;

        info!(%employee_id, year, month, %bonus, "Monthly bonus computed");
        Ok(bonus)
    }

    pub async fn applicable_percentage(
        &self,
        employee_id: Uuid,
        tier: &str,
        at: DateTime<Utc>,
    ) -> PerkdeskResult<Decimal> {
        let employee = self.employee_repo.get_by_id(employee_id).await?;
        Ok(employee.ledger.applicable_percentage(tier, at))
    }

    pub async fn set_package_price(
        &self,
        employee_id: Uuid,
        tier: &str,
        price: Decimal,
    ) -> PerkdeskResult<Employee> {
        self.modify(employee_id, |employee| {
            employee.ledger.set_package_price(tier, price)
        })
        .await
    }

    /// Add a percentage snapshot effective from `effective_from`.
    pub async fn set_incentive_percentages(
        &self,
        employee_id: Uuid,
        percentages: TierMap,
        effective_from: DateTime<Utc>,
    ) -> PerkdeskResult<Employee> {
        self.modify(employee_id, |employee| {
            employee
                .ledger
                .set_incentive_percentages(percentages, effective_from, Utc::now())
        })
        .await
    }

    pub async fn set_default_revenue_target(
        &self,
        employee_id: Uuid,
        target: Decimal,
    ) -> PerkdeskResult<Employee> {
        self.modify(employee_id, |employee| {
            employee.ledger.set_default_revenue_target(target)
        })
        .await
    }

    pub async fn set_default_bonus_rule(
        &self,
        employee_id: Uuid,
        rule: BonusRule,
    ) -> PerkdeskResult<Employee> {
        self.modify(employee_id, |employee| {
            employee.ledger.set_default_bonus_rule(rule)
        })
        .await
    }

    pub async fn set_monthly_revenue_target(
        &self,
        employee_id: Uuid,
        year: i32,
        month: u32,
        target: Decimal,
    ) -> PerkdeskResult<Employee> {
        self.modify(employee_id, |employee| {
            employee
                .ledger
                .set_monthly_revenue_target(year, month, target)
        })
        .await
    }

    /// Override the month's bonus rule; `None` falls back to the default.
    pub async fn set_monthly_bonus_rule(
        &self,
        employee_id: Uuid,
        year: i32,
        month: u32,
        rule: Option<BonusRule>,
    ) -> PerkdeskResult<Employee> {
        self.modify(employee_id, |employee| {
            employee.ledger.set_monthly_bonus_rule(year, month, rule)
        })
        .await
    }

    async fn modify<F>(&self, employee_id: Uuid, apply: F) -> PerkdeskResult<Employee>
    where
        F: FnOnce(&mut Employee) -> PerkdeskResult<()>,
    {
        let mut employee = self.employee_repo.get_by_id(employee_id).await?;
        apply(&mut employee)?;
        let employee = self
            .employee_repo
            .save_ledger(employee_id, &employee.ledger)
            .await?;
        debug!(%employee_id, "Incentive ledger updated");
        Ok(employee)
    }
}
