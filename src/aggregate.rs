use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::decimal::mean;
use crate::metrics;
use crate::models::{FinalResults, IntermediateResult, OverallResult, Period, TableRow};

#[derive(Default)]
struct MetricValues {
    performance: Vec<Decimal>,
    quality: Vec<Decimal>,
    average_score: Vec<Decimal>,
}

impl MetricValues {
    fn push(
        &mut self,
        performance: Option<Decimal>,
        quality: Option<Decimal>,
        average_score: Option<Decimal>,
    ) {
        self.performance.extend(performance);
        self.quality.extend(quality);
        self.average_score.extend(average_score);
    }
}

/// Averages every discipline's semester rows within each period.
pub fn intermediate_results(periods: &[Period]) -> Vec<Vec<IntermediateResult>> {
    periods.iter().map(period_results).collect()
}

fn period_results(period: &Period) -> Vec<IntermediateResult> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, MetricValues> = HashMap::new();

    for row in period.rows() {
        let Some(discipline) = row.discipline_key() else {
            continue;
        };

        let entry = groups.entry(discipline.to_string()).or_insert_with(|| {
            order.push(discipline.to_string());
            MetricValues::default()
        });
        entry.push(
            metrics::performance(row),
            metrics::quality(row),
            metrics::average_score(row),
        );
    }

    let results: Vec<IntermediateResult> = order
        .into_iter()
        .map(|discipline| {
            let values = groups.remove(&discipline).unwrap_or_default();
            IntermediateResult {
                performance: mean(&values.performance),
                quality: mean(&values.quality),
                average_score: mean(&values.average_score),
                discipline,
            }
        })
        .collect();

    tracing::debug!(
        period = %period.label,
        disciplines = results.len(),
        "aggregated period"
    );
    results
}

/// Every discipline seen in any period, in first-seen order.
pub fn discipline_universe(intermediate: &[Vec<IntermediateResult>]) -> Vec<String> {
    let mut seen = HashSet::new();
    intermediate
        .iter()
        .flatten()
        .filter(|result| seen.insert(result.discipline.as_str()))
        .map(|result| result.discipline.clone())
        .collect()
}

fn find<'a>(results: &'a [IntermediateResult], discipline: &str) -> Option<&'a IntermediateResult> {
    results.iter().find(|result| result.discipline == discipline)
}

/// Pivots the per-period results into one wide table per metric.
pub fn final_results(periods: &[Period], intermediate: &[Vec<IntermediateResult>]) -> FinalResults {
    let disciplines = discipline_universe(intermediate);

    let table = |metric: fn(&IntermediateResult) -> Option<Decimal>| -> Vec<TableRow> {
        disciplines
            .iter()
            .map(|discipline| TableRow {
                discipline: discipline.clone(),
                cells: periods
                    .iter()
                    .enumerate()
                    .map(|(index, period)| {
                        let value = intermediate
                            .get(index)
                            .and_then(|results| find(results, discipline))
                            .and_then(metric);
                        (period.label.clone(), value)
                    })
                    .collect(),
            })
            .collect()
    };

    FinalResults {
        performance_table: table(|result| result.performance),
        quality_table: table(|result| result.quality),
        average_score_table: table(|result| result.average_score),
    }
}

/// Averages each discipline's per-period values across all periods.
pub fn overall_results(intermediate: &[Vec<IntermediateResult>]) -> Vec<OverallResult> {
    discipline_universe(intermediate)
        .into_iter()
        .map(|discipline| {
            let mut values = MetricValues::default();
            for results in intermediate {
                if let Some(result) = find(results, &discipline) {
                    values.push(result.performance, result.quality, result.average_score);
                }
            }

            OverallResult {
                avg_performance: mean(&values.performance),
                avg_quality: mean(&values.quality),
                avg_average_score: mean(&values.average_score),
                discipline,
            }
        })
        .collect()
}
