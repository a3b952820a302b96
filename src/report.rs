use std::fmt::Write;

use rust_decimal::Decimal;

use crate::models::{ReportPayload, TableRow};

fn cell(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{:.2}", value))
}

fn write_table(output: &mut String, heading: &str, labels: &[&str], rows: &[TableRow]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {}", heading);

    if rows.is_empty() {
        let _ = writeln!(output, "No disciplines recorded for this report.");
        return;
    }

    let _ = writeln!(output, "| Discipline | {} |", labels.join(" | "));
    let _ = writeln!(output, "|---{}|", "|---".repeat(labels.len()));
    for row in rows {
        let values: Vec<String> = labels.iter().map(|label| cell(row.cell(label))).collect();
        let _ = writeln!(output, "| {} | {} |", row.discipline, values.join(" | "));
    }
}

pub fn render_markdown(title: &str, payload: &ReportPayload) -> String {
    let mut output = String::new();
    let configuration = &payload.configuration;
    let category = configuration.category.as_deref().unwrap_or("all categories");
    let labels: Vec<&str> = payload
        .tabs_data
        .iter()
        .map(|period| period.label.as_str())
        .collect();

    let _ = writeln!(output, "# {}", title);
    let _ = writeln!(
        output,
        "Generated for {} ({} years of work starting {})",
        category, configuration.years_of_work, configuration.start_year
    );

    let tables = &payload.final_results;
    write_table(&mut output, "Performance, %", &labels, &tables.performance_table);
    write_table(&mut output, "Quality, %", &labels, &tables.quality_table);
    write_table(&mut output, "Average Score", &labels, &tables.average_score_table);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Overall Results");

    if payload.overall_results.is_empty() {
        let _ = writeln!(output, "No disciplines recorded for this report.");
    } else {
        let _ = writeln!(output, "| Discipline | Performance, % | Quality, % | Average Score |");
        let _ = writeln!(output, "|---|---|---|---|");
        for result in &payload.overall_results {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} |",
                result.discipline,
                cell(result.avg_performance),
                cell(result.avg_quality),
                cell(result.avg_average_score)
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Configuration, GradeRow, Period};
    use crate::payload::build_payload;

    fn configuration() -> Configuration {
        Configuration::new(Some("Natural sciences".to_string()), 2, 2018).unwrap()
    }

    #[test]
    fn renders_tables_with_period_columns() {
        let mut first = Period::new("2018-2019");
        first.autumn_winter.push(GradeRow {
            discipline: Some("Math".to_string()),
            group: None,
            students: 20,
            fives: 10,
            fours: 6,
            threes: 4,
        });
        let second = Period::new("2019-2020");

        let payload = build_payload(configuration(), &[first, second]);
        let report = render_markdown("Physics department", &payload);

        assert!(report.starts_with("# Physics department\n"));
        assert!(report.contains("Generated for Natural sciences (2 years of work starting 2018)"));
        assert!(report.contains("| Discipline | 2018-2019 | 2019-2020 |"));
        assert!(report.contains("|---|---|---|"));
        assert!(report.contains("| Math | 80.00 | - |"));
        assert!(report.contains("| Math | 4.30 | - |"));
        assert!(report.contains("| Math | 86.00 | 80.00 | 4.30 |"));
    }

    #[test]
    fn empty_report_says_so() {
        let payload = build_payload(configuration(), &[]);
        let report = render_markdown("Empty", &payload);
        assert_eq!(
            report.matches("No disciplines recorded for this report.").count(),
            4
        );
    }
}
