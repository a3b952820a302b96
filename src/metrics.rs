//! Per-row statistics for a single discipline's grade tally.
//!
//! Every function returns `None` instead of failing when its inputs cannot
//! produce a value: an unset discipline, no enrolled students, or no grades.

use rust_decimal::Decimal;

use crate::decimal::{
    round_half_up, AVERAGE_SCORE_PRECISION, PERFORMANCE_PRECISION, QUALITY_PRECISION,
};
use crate::models::{EnhancedPeriod, EnhancedRow, GradeRow, Period};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

pub fn total_grades(row: &GradeRow) -> Option<Decimal> {
    row.discipline_key()?;
    let sum = u64::from(row.fives) + u64::from(row.fours) + u64::from(row.threes);
    if sum == 0 {
        None
    } else {
        Some(Decimal::from(sum))
    }
}

fn grade_points(row: &GradeRow) -> Decimal {
    Decimal::from(5 * u64::from(row.fives) + 4 * u64::from(row.fours) + 3 * u64::from(row.threes))
}

/// Share of the maximum attainable grade points, as a percentage.
pub fn performance(row: &GradeRow) -> Option<Decimal> {
    let total = total_grades(row)?;
    if row.students == 0 {
        return None;
    }
    let ratio = grade_points(row) / (total * Decimal::from(5));
    Some(round_half_up(ratio * HUNDRED, PERFORMANCE_PRECISION))
}

/// Percentage of enrolled students graded four or five.
pub fn quality(row: &GradeRow) -> Option<Decimal> {
    row.discipline_key()?;
    if row.students == 0 {
        return None;
    }
    let good = Decimal::from(u64::from(row.fives) + u64::from(row.fours));
    let ratio = good / Decimal::from(row.students);
    Some(round_half_up(ratio * HUNDRED, QUALITY_PRECISION))
}

pub fn average_score(row: &GradeRow) -> Option<Decimal> {
    let total = total_grades(row)?;
    Some(round_half_up(grade_points(row) / total, AVERAGE_SCORE_PRECISION))
}

pub fn enhance_row(row: &GradeRow) -> EnhancedRow {
    EnhancedRow {
        discipline: row.discipline.clone(),
        group: row.group.clone(),
        students: row.students,
        fives: row.fives,
        fours: row.fours,
        threes: row.threes,
        total_grades: total_grades(row).map(|total| total.to_string()),
        performance: performance(row),
        quality: quality(row),
        average_score: average_score(row),
    }
}

pub fn enhance_periods(periods: &[Period]) -> Vec<EnhancedPeriod> {
    periods
        .iter()
        .map(|period| EnhancedPeriod {
            label: period.label.clone(),
            autumn_winter: period.autumn_winter.iter().map(enhance_row).collect(),
            spring_summer: period.spring_summer.iter().map(enhance_row).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(discipline: &str, students: u32, fives: u32, fours: u32, threes: u32) -> GradeRow {
        GradeRow {
            discipline: Some(discipline.to_string()),
            group: Some("PM-21".to_string()),
            students,
            fives,
            fours,
            threes,
        }
    }

    #[test]
    fn computes_all_metrics_for_a_full_row() {
        let math = row("Math", 20, 10, 6, 4);
        assert_eq!(total_grades(&math), Some(Decimal::from(20)));
        assert_eq!(quality(&math), Some(Decimal::from(80)));
        assert_eq!(average_score(&math), Some(Decimal::new(43, 1)));
        assert_eq!(performance(&math), Some(Decimal::from(86)));
    }

    #[test]
    fn unset_discipline_suppresses_every_metric() {
        let mut blank = row("", 20, 10, 6, 4);
        for discipline in [None, Some(String::new())] {
            blank.discipline = discipline;
            assert_eq!(total_grades(&blank), None);
            assert_eq!(performance(&blank), None);
            assert_eq!(quality(&blank), None);
            assert_eq!(average_score(&blank), None);
        }
    }

    #[test]
    fn zero_students_has_no_performance_or_quality() {
        let empty_class = row("Physics", 0, 3, 2, 1);
        assert_eq!(performance(&empty_class), None);
        assert_eq!(quality(&empty_class), None);
        assert_eq!(total_grades(&empty_class), Some(Decimal::from(6)));
        assert!(average_score(&empty_class).is_some());
    }

    #[test]
    fn zero_grades_has_no_total_or_average() {
        let ungraded = row("Chemistry", 12, 0, 0, 0);
        assert_eq!(total_grades(&ungraded), None);
        assert_eq!(average_score(&ungraded), None);
        assert_eq!(performance(&ungraded), None);
        assert_eq!(quality(&ungraded), Some(Decimal::ZERO));
    }

    #[test]
    fn rounds_to_metric_precision() {
        // 2 / 3 students -> 66.666.. -> 66.7
        let partial = row("History", 3, 1, 1, 1);
        assert_eq!(quality(&partial), Some(Decimal::new(667, 1)));
        // 12 points over 3 grades -> 4.00; 12 / 15 -> 80.0
        assert_eq!(average_score(&partial), Some(Decimal::from(4)));
        assert_eq!(performance(&partial), Some(Decimal::from(80)));

        // 14 points over 3 grades -> 4.666.. -> 4.67; 14 / 15 -> 93.333.. -> 93.3
        let strong = row("Biology", 3, 2, 1, 0);
        assert_eq!(average_score(&strong), Some(Decimal::new(467, 2)));
        assert_eq!(performance(&strong), Some(Decimal::new(933, 1)));
    }

    #[test]
    fn enhanced_row_carries_total_as_text() {
        let enhanced = enhance_row(&row("Math", 20, 10, 6, 4));
        assert_eq!(enhanced.total_grades.as_deref(), Some("20"));
        assert_eq!(enhanced.group.as_deref(), Some("PM-21"));
        assert_eq!(enhanced.average_score, Some(Decimal::new(43, 1)));

        let blank = enhance_row(&GradeRow::default());
        assert_eq!(blank.total_grades, None);
        assert_eq!(blank.performance, None);
    }

    #[test]
    fn enhances_both_semesters_of_every_period() {
        let mut period = Period::new("2018-2019");
        period.autumn_winter.push(row("Math", 20, 10, 6, 4));
        period.spring_summer.push(GradeRow::default());

        let enhanced = enhance_periods(&[period]);
        assert_eq!(enhanced.len(), 1);
        assert_eq!(enhanced[0].label, "2018-2019");
        assert_eq!(enhanced[0].autumn_winter[0].quality, Some(Decimal::from(80)));
        assert_eq!(enhanced[0].spring_summer[0].quality, None);
    }
}
