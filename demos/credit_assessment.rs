use credit_ratio_engine::*;

const STATEMENTS: &str = r#"{
    "Audited 2079": {
        "Current Assets": 1450, "Current Liabilities": 980, "Closing Stock": 410,
        "Net Worth": 820, "Total Liabilities": 2650, "Term Loan": 600,
        "Finance Cost": 95, "Operating Profit": 410, "Depreciation": 60, "Amortisation": 12,
        "Income Tax": 48, "Net Profit": 150, "Administrative Expenses": 210
    },
    "Audited 2080": {
        "Current Assets": 1720, "Current Liabilities": 1010, "Closing Stock": 450,
        "Net Worth": 930, "Total Liabilities": 2590, "Term Loan": 520,
        "Finance Cost": 88, "Operating Profit": 470, "Depreciation": 64, "Amortisation": 12,
        "Income Tax": 57, "Net Profit": 185, "Administrative Expenses": 220
    },
    "Projected 2081": {
        "Current Assets": 1900, "Current Liabilities": 1100, "Closing Stock": 480,
        "Net Worth": 1060, "Total Liabilities": 2500, "Term Loan": 440,
        "Finance Cost": 80, "Operating Profit": 520, "Depreciation": 66, "Amortisation": 12,
        "Income Tax": 64, "Net Profit": 215, "Administrative Expenses": 230
    }
}"#;

fn print_ratios(ratios: &RatioSet) {
    for (ratio, record) in ratios {
        println!(
            "  {:<16} {:>10.2}  {:<9} [{}] {}",
            ratio.as_str(),
            record.value,
            record.status,
            record.color,
            record.message
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let statements = FinancialStatements::from_json_str(STATEMENTS)?.expand_thousands();
    let ctx = AnalysisContext::default();
    let repayments = RepaymentSchedule::uniform(150_000.0);

    let assessment = assess(&statements, &ctx, &repayments)?;

    for period in &assessment.periods {
        println!("\n{} ({:?}, {})", period.label, period.kind, period.year);
        print_ratios(&period.ratios);
        if let Some(decision) = period.decision {
            println!(
                "  => {} ({} green): {}",
                decision.label(),
                period.counts.green,
                decision.message()
            );
        }
    }

    println!("\nTrends (audited):");
    for ratio in RatioName::ALL {
        if let Some(trend) = assessment.trend(ratio, PeriodKind::Audited) {
            println!("  {}", trend.summary());
        }
    }

    if let Some(comparison) = assessment.audited_to_projected() {
        println!(
            "\nAudited to projected ({} -> {}):",
            comparison.from_period, comparison.to_period
        );
        for change in &comparison.changes {
            println!(
                "  {:<16} {:>10.2} -> {:>10.2} ({:+.2}, {:+.2}%)",
                change.ratio.as_str(),
                change.from,
                change.to,
                change.change,
                change.change_pct
            );
        }
        println!("  Improvements expected: {:?}", comparison.improvements());
        println!("  Declining metrics: {:?}", comparison.declines());
        if let (Some(best), Some(worst)) = (comparison.best_metric(), comparison.worst_metric()) {
            println!("  Best performing: {}, requiring most attention: {}", best, worst);
        }
    }

    let Some(latest) = assessment.index.latest_audited() else {
        return Ok(());
    };
    let Some(data) = statements.period(latest) else {
        return Ok(());
    };

    let engine = StressEngine::from_context(&ctx);
    for scenario in StressScenario::presets() {
        let report = engine.run_scenario(data, &scenario, repayments.for_period(latest));
        let conclusion = report.conclusion(&ctx.standards);

        println!("\nStress scenario: {}", scenario.name);
        for ratio in RatioName::ALL {
            println!(
                "  {:<16} {:>10.2} -> {:>10.2} ({:+.1}%)",
                ratio.as_str(),
                report.original[&ratio],
                report.stressed[&ratio],
                report.change_pct(ratio)
            );
        }
        println!(
            "  {} of {} ratios green after stress, {}",
            conclusion.green_after_stress,
            conclusion.total,
            if conclusion.resilient {
                "resilient"
            } else {
                "vulnerable"
            }
        );
    }

    Ok(())
}
