//! Financial ratios derived from a balance sheet and income statement.
//!
//! A zero denominator produces [`RatioValue::NotComputable`]; no ratio is ever
//! infinite. Values are rounded to four decimal places.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::reports::{BalanceSheet, IncomeStatement};
use crate::types::{AccountCategory, LedgerError, LedgerResult};

/// Decimal places kept on every ratio
pub const RATIO_SCALE: i64 = 4;

/// Outcome of a single ratio computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum RatioValue {
    Value(BigDecimal),
    NotComputable,
}

impl RatioValue {
    /// Divide, yielding `NotComputable` when the denominator is zero
    pub fn divide(numerator: &BigDecimal, denominator: &BigDecimal) -> Self {
        if *denominator == BigDecimal::from(0) {
            RatioValue::NotComputable
        } else {
            RatioValue::Value((numerator / denominator).round(RATIO_SCALE))
        }
    }

    pub fn value(&self) -> Option<&BigDecimal> {
        match self {
            RatioValue::Value(v) => Some(v),
            RatioValue::NotComputable => None,
        }
    }

    pub fn is_computable(&self) -> bool {
        matches!(self, RatioValue::Value(_))
    }
}

impl fmt::Display for RatioValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioValue::Value(v) => write!(f, "{}", v),
            RatioValue::NotComputable => write!(f, "n/a"),
        }
    }
}

/// Ratio family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioGroup {
    Liquidity,
    Profitability,
    Efficiency,
    Leverage,
}

/// Every ratio the analyzer produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    // Liquidity
    CurrentRatio,
    QuickRatio,
    CashRatio,
    // Profitability
    GrossMargin,
    OperatingMargin,
    NetProfitMargin,
    ReturnOnAssets,
    ReturnOnEquity,
    // Efficiency
    AssetTurnover,
    ReceivablesTurnover,
    InventoryTurnover,
    // Leverage
    DebtToEquity,
    DebtRatio,
    EquityMultiplier,
}

impl RatioKind {
    pub const ALL: [RatioKind; 14] = [
        RatioKind::CurrentRatio,
        RatioKind::QuickRatio,
        RatioKind::CashRatio,
        RatioKind::GrossMargin,
        RatioKind::OperatingMargin,
        RatioKind::NetProfitMargin,
        RatioKind::ReturnOnAssets,
        RatioKind::ReturnOnEquity,
        RatioKind::AssetTurnover,
        RatioKind::ReceivablesTurnover,
        RatioKind::InventoryTurnover,
        RatioKind::DebtToEquity,
        RatioKind::DebtRatio,
        RatioKind::EquityMultiplier,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RatioKind::CurrentRatio => "Current Ratio",
            RatioKind::QuickRatio => "Quick Ratio",
            RatioKind::CashRatio => "Cash Ratio",
            RatioKind::GrossMargin => "Gross Margin",
            RatioKind::OperatingMargin => "Operating Margin",
            RatioKind::NetProfitMargin => "Net Profit Margin",
            RatioKind::ReturnOnAssets => "Return on Assets",
            RatioKind::ReturnOnEquity => "Return on Equity",
            RatioKind::AssetTurnover => "Asset Turnover",
            RatioKind::ReceivablesTurnover => "Receivables Turnover",
            RatioKind::InventoryTurnover => "Inventory Turnover",
            RatioKind::DebtToEquity => "Debt to Equity",
            RatioKind::DebtRatio => "Debt Ratio",
            RatioKind::EquityMultiplier => "Equity Multiplier",
        }
    }

    pub fn group(&self) -> RatioGroup {
        match self {
            RatioKind::CurrentRatio | RatioKind::QuickRatio | RatioKind::CashRatio => {
                RatioGroup::Liquidity
            }
            RatioKind::GrossMargin
            | RatioKind::OperatingMargin
            | RatioKind::NetProfitMargin
            | RatioKind::ReturnOnAssets
            | RatioKind::ReturnOnEquity => RatioGroup::Profitability,
            RatioKind::AssetTurnover
            | RatioKind::ReceivablesTurnover
            | RatioKind::InventoryTurnover => RatioGroup::Efficiency,
            RatioKind::DebtToEquity | RatioKind::DebtRatio | RatioKind::EquityMultiplier => {
                RatioGroup::Leverage
            }
        }
    }
}

/// A named ratio and its value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ratio {
    pub kind: RatioKind,
    pub value: RatioValue,
}

/// Ratios grouped by family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioReport {
    pub liquidity: Vec<Ratio>,
    pub profitability: Vec<Ratio>,
    pub efficiency: Vec<Ratio>,
    pub leverage: Vec<Ratio>,
}

impl RatioReport {
    pub fn iter(&self) -> impl Iterator<Item = &Ratio> {
        self.liquidity
            .iter()
            .chain(&self.profitability)
            .chain(&self.efficiency)
            .chain(&self.leverage)
    }

    pub fn get(&self, kind: RatioKind) -> Option<&RatioValue> {
        self.iter().find(|r| r.kind == kind).map(|r| &r.value)
    }
}

/// Stateless ratio calculator
pub struct RatioAnalyzer;

impl RatioAnalyzer {
    /// Compute every ratio from a pair of statements covering the same window
    pub fn compute_ratios(balance_sheet: &BalanceSheet, income: &IncomeStatement) -> RatioReport {
        let current_assets = &balance_sheet.current_assets.total;
        let current_liabilities = &balance_sheet.current_liabilities.total;
        let inventory = balance_sheet.category_total(AccountCategory::Inventory);
        let cash = balance_sheet.category_total(AccountCategory::Cash);
        let receivables = balance_sheet.category_total(AccountCategory::AccountsReceivable);
        let total_assets = &balance_sheet.total_assets;
        let total_liabilities = &balance_sheet.total_liabilities;
        let total_equity = &balance_sheet.total_equity;
        let revenue = income.total_revenue();
        let net_income = &income.net_income;

        let ratio = |kind, value| Ratio { kind, value };

        RatioReport {
            liquidity: vec![
                ratio(
                    RatioKind::CurrentRatio,
                    RatioValue::divide(current_assets, current_liabilities),
                ),
                ratio(
                    RatioKind::QuickRatio,
                    RatioValue::divide(&(current_assets - &inventory), current_liabilities),
                ),
                ratio(
                    RatioKind::CashRatio,
                    RatioValue::divide(&cash, current_liabilities),
                ),
            ],
            profitability: vec![
                ratio(
                    RatioKind::GrossMargin,
                    RatioValue::divide(&income.gross_profit, revenue),
                ),
                ratio(
                    RatioKind::OperatingMargin,
                    RatioValue::divide(&income.operating_income, revenue),
                ),
                ratio(
                    RatioKind::NetProfitMargin,
                    RatioValue::divide(net_income, revenue),
                ),
                ratio(
                    RatioKind::ReturnOnAssets,
                    RatioValue::divide(net_income, total_assets),
                ),
                ratio(
                    RatioKind::ReturnOnEquity,
                    RatioValue::divide(net_income, total_equity),
                ),
            ],
            efficiency: vec![
                ratio(
                    RatioKind::AssetTurnover,
                    RatioValue::divide(revenue, total_assets),
                ),
                ratio(
                    RatioKind::ReceivablesTurnover,
                    RatioValue::divide(revenue, &receivables),
                ),
                ratio(
                    RatioKind::InventoryTurnover,
                    RatioValue::divide(&income.cost_of_goods_sold.total, &inventory),
                ),
            ],
            leverage: vec![
                ratio(
                    RatioKind::DebtToEquity,
                    RatioValue::divide(total_liabilities, total_equity),
                ),
                ratio(
                    RatioKind::DebtRatio,
                    RatioValue::divide(total_liabilities, total_assets),
                ),
                ratio(
                    RatioKind::EquityMultiplier,
                    RatioValue::divide(total_assets, total_equity),
                ),
            ],
        }
    }

    /// Compute and classify in one step
    pub fn analyze(
        balance_sheet: &BalanceSheet,
        income: &IncomeStatement,
        thresholds: &RatioThresholds,
    ) -> RatioAnalysis {
        let report = Self::compute_ratios(balance_sheet, income);
        let assessments = Self::classify(&report, thresholds);
        RatioAnalysis {
            report,
            assessments,
        }
    }

    /// Assign a qualitative band to every ratio in the report
    pub fn classify(report: &RatioReport, thresholds: &RatioThresholds) -> Vec<RatioAssessment> {
        report
            .iter()
            .map(|ratio| RatioAssessment {
                kind: ratio.kind,
                value: ratio.value.clone(),
                band: thresholds.for_kind(ratio.kind).band(&ratio.value),
            })
            .collect()
    }
}

/// Qualitative band, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Strong,
    Adequate,
    Concern,
    NotComputable,
}

/// A ratio with its band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioAssessment {
    pub kind: RatioKind,
    pub value: RatioValue,
    pub band: Band,
}

/// Ratios together with their bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioAnalysis {
    pub report: RatioReport,
    pub assessments: Vec<RatioAssessment>,
}

impl RatioAnalysis {
    pub fn band(&self, kind: RatioKind) -> Option<Band> {
        self.assessments.iter().find(|a| a.kind == kind).map(|a| a.band)
    }
}

/// Cut-offs for one ratio. Boundaries are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub strong: BigDecimal,
    pub adequate: BigDecimal,
    /// False for ratios where smaller is healthier (leverage)
    #[serde(default = "higher_is_better_default")]
    pub higher_is_better: bool,
}

fn higher_is_better_default() -> bool {
    true
}

fn dec(units: i64, scale: i64) -> BigDecimal {
    BigDecimal::new(units.into(), scale)
}

impl BandThresholds {
    pub fn higher_is_better(strong: BigDecimal, adequate: BigDecimal) -> Self {
        Self {
            strong,
            adequate,
            higher_is_better: true,
        }
    }

    pub fn lower_is_better(strong: BigDecimal, adequate: BigDecimal) -> Self {
        Self {
            strong,
            adequate,
            higher_is_better: false,
        }
    }

    /// Built-in thresholds for a ratio
    pub fn default_for(kind: RatioKind) -> Self {
        match kind {
            RatioKind::CurrentRatio => Self::higher_is_better(dec(2, 0), dec(1, 0)),
            RatioKind::QuickRatio => Self::higher_is_better(dec(1, 0), dec(5, 1)),
            RatioKind::CashRatio => Self::higher_is_better(dec(5, 1), dec(2, 1)),
            RatioKind::GrossMargin => Self::higher_is_better(dec(4, 1), dec(2, 1)),
            RatioKind::OperatingMargin => Self::higher_is_better(dec(15, 2), dec(5, 2)),
            RatioKind::NetProfitMargin => Self::higher_is_better(dec(1, 1), dec(5, 2)),
            RatioKind::ReturnOnAssets => Self::higher_is_better(dec(1, 1), dec(5, 2)),
            RatioKind::ReturnOnEquity => Self::higher_is_better(dec(15, 2), dec(8, 2)),
            RatioKind::AssetTurnover => Self::higher_is_better(dec(1, 0), dec(5, 1)),
            RatioKind::ReceivablesTurnover => Self::higher_is_better(dec(10, 0), dec(6, 0)),
            RatioKind::InventoryTurnover => Self::higher_is_better(dec(8, 0), dec(4, 0)),
            RatioKind::DebtToEquity => Self::lower_is_better(dec(1, 0), dec(2, 0)),
            RatioKind::DebtRatio => Self::lower_is_better(dec(4, 1), dec(6, 1)),
            RatioKind::EquityMultiplier => Self::lower_is_better(dec(2, 0), dec(3, 0)),
        }
    }

    pub fn band(&self, value: &RatioValue) -> Band {
        let Some(v) = value.value() else {
            return Band::NotComputable;
        };
        if self.higher_is_better {
            if *v >= self.strong {
                Band::Strong
            } else if *v >= self.adequate {
                Band::Adequate
            } else {
                Band::Concern
            }
        } else if *v <= self.strong {
            Band::Strong
        } else if *v <= self.adequate {
            Band::Adequate
        } else {
            Band::Concern
        }
    }

    fn validate(&self, kind: RatioKind) -> LedgerResult<()> {
        let ordered = if self.higher_is_better {
            self.strong >= self.adequate
        } else {
            self.strong <= self.adequate
        };
        if ordered {
            Ok(())
        } else {
            Err(LedgerError::Config(format!(
                "{} thresholds out of order: strong {} vs adequate {}",
                kind.name(),
                self.strong,
                self.adequate
            )))
        }
    }
}

/// Per-ratio thresholds. Ratios left out of a configuration document fall
/// back to [`BandThresholds::default_for`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioThresholds {
    overrides: BTreeMap<RatioKind, BandThresholds>,
}

impl RatioThresholds {
    pub fn with(mut self, kind: RatioKind, thresholds: BandThresholds) -> Self {
        self.overrides.insert(kind, thresholds);
        self
    }

    pub fn for_kind(&self, kind: RatioKind) -> BandThresholds {
        self.overrides
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| BandThresholds::default_for(kind))
    }

    pub fn validate(&self) -> LedgerResult<()> {
        self.overrides
            .iter()
            .try_for_each(|(kind, thresholds)| thresholds.validate(*kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::{utils::standard_chart, AccountCatalog};
    use crate::ledger::journal::patterns;
    use crate::reports::StatementGenerator;
    use crate::types::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn posted(mut entry: JournalEntry) -> JournalEntry {
        entry.status = EntryStatus::Posted;
        entry
    }

    fn statements(entries: &[JournalEntry]) -> (BalanceSheet, IncomeStatement) {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let generator = StatementGenerator::new(&catalog, entries);
        let period = Period::through(date(31));
        (
            generator.balance_sheet(&period, &default_tolerance()),
            generator.income_statement(&period),
        )
    }

    fn value(n: &str) -> RatioValue {
        RatioValue::Value(n.parse().unwrap())
    }

    #[test]
    fn test_current_ratio_two_is_strong() {
        // Current assets 200, current liabilities 100
        let entries = vec![
            posted(patterns::owner_investment("je1", date(1), "Capital", "cash", "owners_equity", BigDecimal::from(100))),
            posted(patterns::asset_purchase("je2", date(2), "Stock on credit", "fuel_inventory", "accounts_payable", BigDecimal::from(100))),
        ];
        let (sheet, income) = statements(&entries);
        let report = RatioAnalyzer::compute_ratios(&sheet, &income);

        assert_eq!(report.get(RatioKind::CurrentRatio), Some(&value("2")));
        assert_eq!(report.get(RatioKind::QuickRatio), Some(&value("1")));
        assert_eq!(report.get(RatioKind::CashRatio), Some(&value("1")));

        let assessments = RatioAnalyzer::classify(&report, &RatioThresholds::default());
        let current = assessments
            .iter()
            .find(|a| a.kind == RatioKind::CurrentRatio)
            .unwrap();
        assert_eq!(current.band, Band::Strong);
    }

    #[test]
    fn test_zero_current_liabilities_not_computable() {
        let entries = vec![posted(patterns::owner_investment(
            "je1", date(1), "Capital", "cash", "owners_equity", BigDecimal::from(500),
        ))];
        let (sheet, income) = statements(&entries);
        let report = RatioAnalyzer::compute_ratios(&sheet, &income);

        assert_eq!(report.get(RatioKind::CurrentRatio), Some(&RatioValue::NotComputable));
        // No revenue either
        assert_eq!(report.get(RatioKind::NetProfitMargin), Some(&RatioValue::NotComputable));
        assert_eq!(report.get(RatioKind::DebtToEquity), Some(&value("0")));
        assert_eq!(report.iter().count(), RatioKind::ALL.len());

        let assessments = RatioAnalyzer::classify(&report, &RatioThresholds::default());
        assert!(assessments
            .iter()
            .filter(|a| !a.value.is_computable())
            .all(|a| a.band == Band::NotComputable));
    }

    #[test]
    fn test_profitability_ratios() {
        let entries = vec![
            posted(patterns::owner_investment("je1", date(1), "Capital", "cash", "owners_equity", BigDecimal::from(1000))),
            posted(patterns::sale("je2", date(5), "Fuel", "cash", "fuel_sales", BigDecimal::from(400))),
            posted(patterns::expense_payment("je3", date(6), "Fuel cost", "cost_of_fuel", "cash", BigDecimal::from(300))),
        ];
        let (sheet, income) = statements(&entries);
        let report = RatioAnalyzer::compute_ratios(&sheet, &income);

        // Net income 100 on revenue 400, assets 1100, equity 1100
        assert_eq!(report.get(RatioKind::GrossMargin), Some(&value("0.25")));
        assert_eq!(report.get(RatioKind::NetProfitMargin), Some(&value("0.25")));
        assert_eq!(report.get(RatioKind::ReturnOnAssets), Some(&value("0.0909")));
        assert_eq!(report.get(RatioKind::EquityMultiplier), Some(&value("1")));
    }

    #[rstest]
    #[case("2.0001", Band::Strong)]
    #[case("2", Band::Strong)]
    #[case("1.9999", Band::Adequate)]
    #[case("1", Band::Adequate)]
    #[case("0.9999", Band::Concern)]
    fn test_current_ratio_bands(#[case] ratio: &str, #[case] expected: Band) {
        let thresholds = BandThresholds::default_for(RatioKind::CurrentRatio);
        assert_eq!(thresholds.band(&value(ratio)), expected);
    }

    #[rstest]
    #[case("0.5", Band::Strong)]
    #[case("1", Band::Strong)]
    #[case("1.5", Band::Adequate)]
    #[case("2", Band::Adequate)]
    #[case("2.5", Band::Concern)]
    fn test_debt_to_equity_bands(#[case] ratio: &str, #[case] expected: Band) {
        let thresholds = BandThresholds::default_for(RatioKind::DebtToEquity);
        assert_eq!(thresholds.band(&value(ratio)), expected);
    }

    #[test]
    fn test_thresholds_from_config() {
        let thresholds: RatioThresholds = serde_json::from_str(
            r#"{ "current_ratio": { "strong": "3", "adequate": "1.5" } }"#,
        )
        .unwrap();
        assert!(thresholds.validate().is_ok());
        assert_eq!(thresholds.for_kind(RatioKind::CurrentRatio).band(&value("2")), Band::Adequate);
        assert_eq!(
            thresholds.for_kind(RatioKind::QuickRatio),
            BandThresholds::default_for(RatioKind::QuickRatio)
        );
    }

    #[test]
    fn test_out_of_order_thresholds_rejected() {
        let thresholds = RatioThresholds::default().with(
            RatioKind::DebtRatio,
            BandThresholds::lower_is_better(dec(8, 1), dec(5, 1)),
        );
        assert!(matches!(thresholds.validate(), Err(LedgerError::Config(_))));
    }
}
