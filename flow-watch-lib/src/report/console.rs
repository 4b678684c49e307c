use super::TaskReport;
use crate::Result;
use crate::sink::Severity;
use core::fmt::Write;
use owo_colors::OwoColorize;

/// Number of insights previewed on the dashboard.
const INSIGHT_PREVIEW_COUNT: usize = 3;

/// Number of spending categories listed on the dashboard.
const CATEGORY_PREVIEW_COUNT: usize = 5;

/// Render the completion dashboard for `report` as terminal text.
pub fn generate<W: Write>(report: &TaskReport, use_colors: bool, writer: &mut W) -> Result<()> {
    let title = "Financial Analysis Complete";
    if use_colors {
        writeln!(writer, "{}", title.bold())?;
    } else {
        writeln!(writer, "{title}")?;
    }
    writeln!(writer, "═══════════════════════════════════════")?;

    let summary = &report.summary;
    let figures = [
        ("Total Transactions", summary.total_transactions.to_string(), None),
        ("Total Income", format_rupees(summary.total_income), Some(Severity::Success)),
        ("Total Expenses", format_rupees(summary.total_expenses), Some(Severity::Error)),
        ("Net Savings", format_rupees(summary.net_savings), Some(Severity::Info)),
    ];

    let label_width = figures.iter().map(|(label, _, _)| label.len()).max().unwrap_or(0);
    for (label, value, tone) in figures {
        let value = match tone {
            Some(tone) if use_colors => paint(&value, tone),
            _ => value,
        };
        writeln!(writer, "  {label:<label_width$}  {value}")?;
    }

    if let Some(range) = &summary.date_range {
        writeln!(writer, "  {:<label_width$}  {} to {}", "Period", range.start, range.end)?;
    }

    writeln!(writer)?;
    writeln!(writer, "Insights")?;
    if report.insights.is_empty() {
        writeln!(writer, "  No insights available yet.")?;
    } else {
        for insight in report.insights.iter().take(INSIGHT_PREVIEW_COUNT) {
            let badge = insight.severity.to_string();
            let badge = if use_colors { paint(&badge, insight.severity) } else { badge };
            writeln!(writer, "  [{badge}] {}", insight.title)?;
            if !insight.message.is_empty() {
                writeln!(writer, "      {}", insight.message)?;
            }
        }
    }

    let categories = report.top_categories(CATEGORY_PREVIEW_COUNT);
    if !categories.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Top Spending")?;
        let name_width = categories.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, total) in categories {
            writeln!(
                writer,
                "  {name:<name_width$}  {} ({} transactions)",
                format_rupees(total.amount),
                total.count
            )?;
        }
    }

    Ok(())
}

fn paint(text: &str, severity: Severity) -> String {
    match severity {
        Severity::Success => text.green().to_string(),
        Severity::Error => text.red().to_string(),
        Severity::Warning => text.yellow().to_string(),
        Severity::Info => text.cyan().to_string(),
    }
}

/// Format a rupee amount, rounded to whole rupees, using Indian digit grouping (`₹12,34,567`).
#[must_use]
pub fn format_rupees(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "value is rounded and made non-negative first")]
    let digits = (rounded.abs() as u64).to_string();

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            groups.push(right);
            rest = left;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{tail}", groups.join(","))
    };

    format!("{sign}₹{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CategoryTotal, Insight};

    fn sample_report() -> TaskReport {
        let mut report = TaskReport::default();
        report.summary.total_transactions = 42;
        report.summary.total_income = 125_000.0;
        report.summary.total_expenses = 80_250.4;
        report.summary.net_savings = 44_749.6;
        let _ = report
            .summary
            .category_breakdown
            .insert("Shopping".to_string(), CategoryTotal { amount: 30_000.0, count: 7 });
        report
    }

    #[test]
    fn test_format_rupees() {
        assert_eq!(format_rupees(0.0), "₹0");
        assert_eq!(format_rupees(999.4), "₹999");
        assert_eq!(format_rupees(1000.0), "₹1,000");
        assert_eq!(format_rupees(123_456.0), "₹1,23,456");
        assert_eq!(format_rupees(1_234_567.0), "₹12,34,567");
        assert_eq!(format_rupees(-2500.0), "-₹2,500");
    }

    #[test]
    fn test_generate_without_insights() {
        let mut out = String::new();
        generate(&sample_report(), false, &mut out).unwrap();

        assert!(out.contains("Financial Analysis Complete"));
        assert!(out.contains("Total Transactions  42"));
        assert!(out.contains("₹1,25,000"));
        assert!(out.contains("No insights available yet."));
        assert!(out.contains("Shopping  ₹30,000 (7 transactions)"));
    }

    #[test]
    fn test_generate_previews_three_insights() {
        let mut report = sample_report();
        report.insights = (1..=5)
            .map(|i| Insight {
                title: format!("insight {i}"),
                severity: Severity::Warning,
                ..Insight::default()
            })
            .collect();

        let mut out = String::new();
        generate(&report, false, &mut out).unwrap();

        assert!(out.contains("[warning] insight 3"));
        assert!(!out.contains("insight 4"));
    }

    #[test]
    fn test_generate_with_colors_still_contains_text() {
        let mut out = String::new();
        generate(&sample_report(), true, &mut out).unwrap();
        assert!(out.contains("Financial Analysis Complete"));
        assert!(out.contains('\u{1b}'));
    }
}
