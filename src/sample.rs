//! Plausible fake grade data for trying out exports without real input.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::input::generate_periods;
use crate::models::{GradeRow, Period};

const DISCIPLINE_NAMES: [&str; 29] = [
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "History",
    "Geography",
    "Literature",
    "English",
    "Economics",
    "Computer Science",
    "Philosophy",
    "Art",
    "Music",
    "Physical Education",
    "Sociology",
    "Psychology",
    "Political Science",
    "Law",
    "Business",
    "Statistics",
    "Ecology",
    "Geology",
    "Astronomy",
    "Engineering",
    "Medicine",
    "Architecture",
    "Linguistics",
    "Anthropology",
    "Drama",
];

/// Chance that a discipline is taught in a given year.
const PRESENCE: f64 = 0.8;

fn pick_disciplines<R: Rng>(rng: &mut R, count: usize) -> Vec<String> {
    let mut names: Vec<String> = DISCIPLINE_NAMES
        .choose_multiple(rng, count)
        .map(|name| name.to_string())
        .collect();
    for extra in names.len()..count {
        names.push(format!("Elective {}", extra + 1));
    }
    names
}

fn sample_row<R: Rng>(rng: &mut R, discipline: &str) -> GradeRow {
    let students = rng.gen_range(10..=30);
    let fives = rng.gen_range(0..=students);
    let fours = rng.gen_range(0..=students - fives);
    let threes = rng.gen_range(0..=students - fives - fours);
    GradeRow {
        discipline: Some(discipline.to_string()),
        group: Some(format!("G-{}", rng.gen_range(1..=4))),
        students,
        fives,
        fours,
        threes,
    }
}

/// Fake periods where every discipline appears in at least one year.
pub fn sample_periods<R: Rng>(
    rng: &mut R,
    discipline_count: usize,
    years_of_work: u8,
    start_year: i32,
) -> Vec<Period> {
    let mut periods = generate_periods(years_of_work, start_year);
    for period in &mut periods {
        period.autumn_winter.clear();
        period.spring_summer.clear();
    }
    if periods.is_empty() {
        return periods;
    }

    for discipline in pick_disciplines(rng, discipline_count) {
        let mut taught = false;
        for period in &mut periods {
            if rng.gen_bool(PRESENCE) {
                period.autumn_winter.push(sample_row(rng, &discipline));
                period.spring_summer.push(sample_row(rng, &discipline));
                taught = true;
            }
        }
        if !taught {
            periods[0].autumn_winter.push(sample_row(rng, &discipline));
        }
    }

    periods
}
