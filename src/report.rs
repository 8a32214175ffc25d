//! Plain-text deal report.
//!
//! Pure field-to-text rendering of a `DealAnalysis`; no arithmetic beyond
//! number formatting.

use rust_decimal::Decimal;
use std::fmt::{self, Write};

use crate::analysis::round_money;
use crate::types::DealAnalysis;

const RULE_WIDTH: usize = 60;
const SUBTOTAL_WIDTH: usize = 40;
/// Indent that aligns the subtotal rules with the breakdown values.
const BREAKDOWN_INDENT: &str = "                    ";

/// Format a dollar amount as `$1,234,567.89`. Negative amounts render as
/// `$-1,234.50`.
pub fn format_currency(value: Decimal) -> String {
    format!("${}", group_thousands(value))
}

/// Format a percentage with two decimals, e.g. `12.34%`.
pub fn format_percent(value: Decimal) -> String {
    let mut v = round_money(value);
    if v.is_zero() {
        v.set_sign_positive(true);
    }
    v.rescale(2);
    format!("{v}%")
}

fn group_thousands(value: Decimal) -> String {
    let mut v = round_money(value);
    v.rescale(2);
    let negative = v.is_sign_negative() && !v.is_zero();
    let digits = v.abs().to_string();
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}.{frac_part}")
    } else {
        format!("{grouped}.{frac_part}")
    }
}

/// Render the full fixed-layout report.
pub fn format_report(analysis: &DealAnalysis) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, analysis);
    out
}

fn write_report(out: &mut String, a: &DealAnalysis) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    let subtotal = format!("{BREAKDOWN_INDENT}{}", "─".repeat(SUBTOTAL_WIDTH));
    let b = &a.breakdown;

    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "DEAL ANALYSIS REPORT")?;
    writeln!(out, "{rule}")?;
    writeln!(out)?;

    writeln!(out, "PROPERTY DETAILS")?;
    writeln!(out, "----------------")?;
    writeln!(out, "Address: {}", a.property_address)?;
    writeln!(out, "Current List Price: {}", format_currency(a.list_price))?;
    writeln!(out)?;

    writeln!(out, "VALUATION")?;
    writeln!(out, "---------")?;
    writeln!(out, "After Repair Value (ARV): {}", format_currency(a.arv))?;
    writeln!(
        out,
        "Estimated Repairs ({}): {}",
        a.repair_level,
        format_currency(a.estimated_repairs)
    )?;
    writeln!(
        out,
        "Maximum Allowable Offer (MAO): {}",
        format_currency(a.max_allowable_offer)
    )?;
    writeln!(out)?;

    writeln!(out, "INVESTMENT ANALYSIS")?;
    writeln!(out, "-------------------")?;
    writeln!(out, "Total Investment Required: {}", format_currency(a.total_investment))?;
    writeln!(out, "Potential Profit: {}", format_currency(a.potential_profit))?;
    writeln!(out, "Return on Investment (ROI): {}", format_percent(a.roi_percentage))?;
    writeln!(out)?;

    writeln!(out, "DEAL RATING: {}", a.rating)?;
    writeln!(out, "{rule}")?;
    writeln!(out)?;

    writeln!(out, "RECOMMENDATION")?;
    writeln!(out, "--------------")?;
    writeln!(out, "{}", a.recommendation)?;
    writeln!(out)?;

    writeln!(out, "COST BREAKDOWN")?;
    writeln!(out, "--------------")?;
    writeln!(out, "Purchase Price:     {}", format_currency(b.purchase_price))?;
    writeln!(out, "Repair Costs:       {}", format_currency(b.repair_costs))?;
    writeln!(out, "Holding Costs:      {}", format_currency(b.holding_costs))?;
    writeln!(out, "Selling Costs (8%): {}", format_currency(b.selling_costs))?;
    writeln!(out, "{subtotal}")?;
    writeln!(out, "Total Costs:        {}", format_currency(b.total_costs))?;
    writeln!(out, "ARV:                {}", format_currency(b.arv))?;
    writeln!(out, "{subtotal}")?;
    writeln!(out, "Net Profit:         {}", format_currency(b.net_profit))?;
    writeln!(out)?;
    writeln!(out, "{rule}")?;
    Ok(())
}

impl fmt::Display for DealAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_report(self))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
