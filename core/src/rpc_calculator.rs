//! Repayment-capacity calculator — pure arithmetic over the five
//! interview figures.
//!
//! All amounts are monthly rupiah unless named otherwise. Every output
//! is derived; nothing here is mutated independently.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ACTIVE_DAYS: f64 = 25.0;
pub const DEFAULT_COGS_PERCENTAGE: f64 = 50.0;
pub const DEFAULT_HOUSEHOLD_EXPENSES: f64 = 1_500_000.0;
pub const DEFAULT_EXISTING_OBLIGATIONS: f64 = 0.0;

/// Share of sustainable disposable cash offered as the installment cap.
const INSTALLMENT_SHARE: f64 = 0.30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcInputs {
    /// Average gross revenue per active day.
    pub daily_revenue: f64,
    pub active_days: Option<f64>,
    pub cogs_percentage: Option<f64>,
    pub household_expenses: Option<f64>,
    pub existing_obligations: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResult {
    pub monthly_income: f64,
    pub cogs: f64,
    pub gross_profit: f64,
    pub monthly_expenses: f64,
    /// Monthly surplus after cost-of-goods, household spending and
    /// existing obligations — the basis for max_installment.
    pub sustainable_disposable_cash: f64,
    /// Never negative.
    pub max_installment: f64,
    /// 0-100 capacity component for the A-Score.
    pub capacity_score: u8,
}

pub fn compute(inputs: &RpcInputs) -> RpcResult {
    let active_days = inputs.active_days.unwrap_or(DEFAULT_ACTIVE_DAYS);
    let cogs_percentage = inputs.cogs_percentage.unwrap_or(DEFAULT_COGS_PERCENTAGE);
    let household = inputs
        .household_expenses
        .unwrap_or(DEFAULT_HOUSEHOLD_EXPENSES);
    let obligations = inputs
        .existing_obligations
        .unwrap_or(DEFAULT_EXISTING_OBLIGATIONS);

    let monthly_income = inputs.daily_revenue * active_days;
    let cogs = monthly_income * cogs_percentage / 100.0;
    let gross_profit = monthly_income - cogs;
    let monthly_expenses = cogs + household + obligations;
    let sustainable_disposable_cash = gross_profit - household - obligations;
    let max_installment = (sustainable_disposable_cash * INSTALLMENT_SHARE)
        .round()
        .max(0.0);

    RpcResult {
        monthly_income,
        cogs,
        gross_profit,
        monthly_expenses,
        sustainable_disposable_cash,
        max_installment,
        capacity_score: capacity_score(sustainable_disposable_cash),
    }
}

/// Band the monthly surplus (in millions of rupiah) into a 0-100
/// score. Bands meet at their edges: 0.5m -> 30, 1m -> 50, 2m -> 70,
/// 4m -> 85; anything at or below zero scores 0.
pub fn capacity_score(sdc: f64) -> u8 {
    if sdc <= 0.0 {
        return 0;
    }
    let m = sdc / 1_000_000.0;
    let score = if m < 0.5 {
        (m * 60.0).round()
    } else if m < 1.0 {
        (30.0 + (m - 0.5) * 40.0).round()
    } else if m < 2.0 {
        (50.0 + (m - 1.0) * 20.0).round()
    } else if m < 4.0 {
        (70.0 + (m - 2.0) * 7.5).round()
    } else {
        (85.0 + (m - 4.0) * 3.0).round().min(100.0)
    };
    score as u8
}
