//! Fuel station month-end example
//!
//! Run with `RUST_LOG=ledger_engine=debug` to see validation and cache logs.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use ledger_engine::ledger::account::utils::standard_chart;
use ledger_engine::{
    patterns, BankStatementLine, EngineConfig, JournalEntryBuilder, Ledger, LedgerError,
    MemoryStore, Period, TaxBracket,
};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledger_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_json(
        r#"{
            "validation": {
                "reduction_allowed_accounts": [
                    "cash", "bank", "fuel_inventory", "accumulated_depreciation", "accounts_payable"
                ]
            }
        }"#,
    )?;
    let ledger = Ledger::with_config(MemoryStore::with_accounts(standard_chart()), config);

    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 1, d).ok_or("invalid date");
    let month = Period::new(day(1)?, day(31)?)?;

    println!("Recording January activity...");
    let entries = vec![
        patterns::owner_investment("je1", day(1)?, "Initial capital", "cash", "owners_equity", BigDecimal::from(50000)),
        patterns::loan_received("je2", day(2)?, "Bank loan", "bank", "loans_payable", BigDecimal::from(40000)),
        patterns::asset_purchase("je3", day(3)?, "Dispensing pumps", "equipment", "bank", BigDecimal::from(30000)),
        patterns::asset_purchase("je4", day(4)?, "Fuel delivery", "fuel_inventory", "accounts_payable", BigDecimal::from(8000)),
        patterns::sale("je5", day(10)?, "Pump takings", "cash", "fuel_sales", BigDecimal::from(12000)),
        patterns::expense_payment("je6", day(10)?, "Fuel sold", "cost_of_fuel", "fuel_inventory", BigDecimal::from(6000)),
        patterns::expense_payment("je7", day(15)?, "Attendant wages", "wages_expense", "cash", BigDecimal::from(2000)),
        JournalEntryBuilder::new("je8", day(20)?, "Supplier payment")
            .reference("CHQ-1001")
            .debit("accounts_payable", BigDecimal::from(3000), None)
            .credit("bank", BigDecimal::from(3000), None)
            .build(),
        patterns::depreciation("je9", day(31)?, "depreciation_expense", "accumulated_depreciation", BigDecimal::from(500)),
    ];
    for entry in entries {
        let posted = ledger.post_entry(entry).await?;
        println!("  posted {} {}", posted.id, posted.description);
    }

    // An unbalanced entry is rejected with every problem listed
    let broken = JournalEntryBuilder::new("je10", day(21)?, "Typo")
        .debit("utilities_expense", BigDecimal::from(120), None)
        .credit("bank", BigDecimal::from(12), None)
        .build();
    if let Err(LedgerError::Rejected(report)) = ledger.post_entry(broken).await {
        println!("  rejected je10: {}", report);
    }

    let sheet = ledger.balance_sheet(&Period::through(month.end)).await?;
    println!("\nBalance sheet at {}", month.end);
    for section in [&sheet.current_assets, &sheet.fixed_assets, &sheet.current_liabilities, &sheet.long_term_liabilities, &sheet.equity] {
        println!("  {}", section.title);
        for line in &section.lines {
            println!("    {:<6} {:<28} {:>12}", line.code, line.name, line.amount);
        }
    }
    println!("  Current earnings {:>36}", sheet.current_earnings);
    println!("  Total assets {:>40}", sheet.total_assets);
    println!("  Liabilities and equity {:>30}", sheet.liabilities_and_equity());

    let income = ledger.income_statement(&month).await?;
    println!("\nIncome statement");
    println!("  Revenue      {:>12}", income.total_revenue());
    println!("  Gross profit {:>12}", income.gross_profit);
    println!("  Net income   {:>12}", income.net_income);

    let cash_flow = ledger.cash_flow(&month).await?;
    println!("\nCash flow");
    println!("  Operating {:>12}", cash_flow.net_operating_cash_flow);
    println!("  Investing {:>12}", cash_flow.net_investing_cash_flow);
    println!("  Financing {:>12}", cash_flow.net_financing_cash_flow);
    println!("  Ending cash {:>10}", cash_flow.ending_cash);

    let analysis = ledger.ratio_report(&Period::through(month.end)).await?;
    println!("\nRatios");
    for assessment in &analysis.assessments {
        println!(
            "  {:<22} {:>10} {:?}",
            assessment.kind.name(),
            assessment.value.to_string(),
            assessment.band
        );
    }

    let statement = vec![
        BankStatementLine::new("s1", day(2)?, BigDecimal::from(40000)),
        BankStatementLine::new("s2", day(3)?, BigDecimal::from(-30000)),
        BankStatementLine::new("s3", day(31)?, BigDecimal::from(-25)),
    ];
    let reconciliation = ledger.reconcile("bank", &month, &statement).await?;
    println!("\nBank reconciliation (reconciled: {})", reconciliation.is_reconciled);
    for difference in &reconciliation.differences {
        println!(
            "  {:?} {} {} {}",
            difference.kind, difference.source_id, difference.date, difference.amount
        );
    }

    let brackets = vec![
        TaxBracket::new(BigDecimal::from(2000), "0.1".parse()?),
        TaxBracket::unbounded("0.25".parse()?),
    ];
    let tax = ledger.calculate_taxes(&month, &brackets).await?;
    println!("\nTaxable income {} owes {}", tax.taxable_income, tax.tax_liability);

    let integrity = ledger.validate_integrity(&month).await?;
    println!("Ledger healthy: {}", integrity.is_healthy());

    Ok(())
}
