use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::{GradeRow, Period, Semester, MAX_PERIODS};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{found} periods supplied but at most {allowed} are allowed")]
    TooManyPeriods { found: usize, allowed: usize },
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    period: String,
    semester: Semester,
    #[serde(default)]
    discipline: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default, deserialize_with = "blank_as_zero")]
    students: u32,
    #[serde(default, deserialize_with = "blank_as_zero")]
    fives: u32,
    #[serde(default, deserialize_with = "blank_as_zero")]
    fours: u32,
    #[serde(default, deserialize_with = "blank_as_zero")]
    threes: u32,
}

/// Blank count cells read as zero, as in a freshly filled template.
fn blank_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<u32>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Reads grade rows, assembling periods in the order their labels first appear.
pub fn load_csv(csv_path: &Path) -> anyhow::Result<Vec<Period>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut periods: Vec<Period> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid grade row {}", line + 1))?;
        let position = *index.entry(row.period.clone()).or_insert_with(|| {
            periods.push(Period::new(row.period.clone()));
            periods.len() - 1
        });

        periods[position].semester_mut(row.semester).push(GradeRow {
            discipline: row.discipline,
            group: row.group,
            students: row.students,
            fives: row.fives,
            fours: row.fours,
            threes: row.threes,
        });
    }

    tracing::debug!(path = %csv_path.display(), periods = periods.len(), "loaded grade csv");
    Ok(periods)
}

/// Reads a JSON array of periods with `autumnWinter`/`springSummer` row lists.
pub fn load_json(json_path: &Path) -> anyhow::Result<Vec<Period>> {
    let contents = std::fs::read_to_string(json_path)
        .with_context(|| format!("failed to read {}", json_path.display()))?;
    let periods: Vec<Period> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a list of periods", json_path.display()))?;
    Ok(periods)
}

pub fn check_period_count(periods: &[Period], years_of_work: u8) -> Result<(), InputError> {
    let allowed = usize::from(years_of_work).min(MAX_PERIODS);
    if periods.len() > allowed {
        return Err(InputError::TooManyPeriods {
            found: periods.len(),
            allowed,
        });
    }
    Ok(())
}

/// Empty periods for a fresh report, one blank row per semester.
///
/// Stops early rather than overflow when the years run past `i32::MAX`.
pub fn generate_periods(years_of_work: u8, start_year: i32) -> Vec<Period> {
    let count = usize::from(years_of_work).min(MAX_PERIODS);
    (0..count as i32)
        .map_while(|offset| {
            let year = start_year.checked_add(offset)?;
            let next = year.checked_add(1)?;
            Some(Period {
                label: format!("{}-{}", year, next),
                autumn_winter: vec![GradeRow::default()],
                spring_summer: vec![GradeRow::default()],
            })
        })
        .collect()
}

/// Writes a fill-in CSV with one row per semester slot.
pub fn write_template(csv_path: &Path, periods: &[Period]) -> anyhow::Result<usize> {
    let mut writer = csv::Writer::from_path(csv_path)
        .with_context(|| format!("failed to create {}", csv_path.display()))?;
    let mut written = 0usize;

    for period in periods {
        for (semester, rows) in [
            (Semester::AutumnWinter, &period.autumn_winter),
            (Semester::SpringSummer, &period.spring_summer),
        ] {
            for row in rows {
                writer.serialize(CsvRow {
                    period: period.label.clone(),
                    semester,
                    discipline: row.discipline.clone(),
                    group: row.group.clone(),
                    students: row.students,
                    fives: row.fives,
                    fours: row.fours,
                    threes: row.threes,
                })?;
                written += 1;
            }
        }
    }

    writer.flush()?;
    Ok(written)
}

/// The first year of a `"2018-2019"` style label.
pub fn label_start_year(label: &str) -> Option<i32> {
    label.split('-').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn generates_labelled_periods_capped_at_five() {
        let periods = generate_periods(2, 2018);
        let labels: Vec<&str> = periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["2018-2019", "2019-2020"]);
        assert_eq!(periods[0].autumn_winter, vec![GradeRow::default()]);
        assert_eq!(periods[0].spring_summer, vec![GradeRow::default()]);

        assert_eq!(generate_periods(9, 2018).len(), MAX_PERIODS);
    }

    #[test]
    fn period_generation_stops_at_the_last_representable_year() {
        assert!(generate_periods(1, i32::MAX).is_empty());

        let periods = generate_periods(3, i32::MAX - 2);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1].label, format!("{}-{}", i32::MAX - 1, i32::MAX));
    }

    #[test]
    fn loads_csv_rows_into_periods_in_first_seen_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "period,semester,discipline,group,students,fives,fours,threes").unwrap();
        writeln!(file, "2019-2020,spring-summer,Physics,PM-21,15,5,5,5").unwrap();
        writeln!(file, "2018-2019,autumn-winter,Math,PM-21,20,10,6,4").unwrap();
        writeln!(file, "2019-2020,autumn-winter,Math,PM-21,18,9,6,3").unwrap();
        writeln!(file, "2018-2019,spring-summer,,,0,0,0,0").unwrap();

        let periods = load_csv(file.path()).unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].label, "2019-2020");
        assert_eq!(periods[0].autumn_winter[0].discipline.as_deref(), Some("Math"));
        assert_eq!(periods[0].spring_summer[0].threes, 5);
        assert_eq!(periods[1].autumn_winter[0].students, 20);
        assert_eq!(periods[1].spring_summer[0].discipline_key(), None);
    }

    #[test]
    fn blank_count_cells_read_as_zero() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "period,semester,discipline,group,students,fives,fours,threes").unwrap();
        writeln!(file, "2018-2019,autumn-winter,Math,PM-21,12,,5,").unwrap();

        let periods = load_csv(file.path()).unwrap();
        let row = &periods[0].autumn_winter[0];
        assert_eq!((row.students, row.fives, row.fours, row.threes), (12, 0, 5, 0));
    }

    #[test]
    fn rejects_negative_counts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "period,semester,discipline,group,students,fives,fours,threes").unwrap();
        writeln!(file, "2018-2019,autumn-winter,Math,PM-21,-3,1,1,1").unwrap();

        assert!(load_csv(file.path()).is_err());
    }

    #[test]
    fn template_round_trips_through_the_loader() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let written = write_template(file.path(), &generate_periods(3, 2020)).unwrap();
        assert_eq!(written, 6);

        let periods = load_csv(file.path()).unwrap();
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[2].label, "2022-2023");
        assert_eq!(periods[2].spring_summer.len(), 1);
    }

    #[test]
    fn loads_json_periods() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"label": "2018-2019", "autumnWinter": [{{"discipline": "Math", "students": 20, "fives": 10, "fours": 6, "threes": 4}}], "springSummer": []}}]"#
        )
        .unwrap();

        let periods = load_json(file.path()).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].autumn_winter[0].fives, 10);
    }

    #[test]
    fn period_count_is_bounded_by_years_of_work() {
        let periods = generate_periods(3, 2018);
        assert_eq!(check_period_count(&periods, 3), Ok(()));
        assert_eq!(
            check_period_count(&periods, 2),
            Err(InputError::TooManyPeriods { found: 3, allowed: 2 })
        );
    }

    #[test]
    fn parses_start_year_from_label() {
        assert_eq!(label_start_year("2018-2019"), Some(2018));
        assert_eq!(label_start_year("autumn"), None);
    }
}
