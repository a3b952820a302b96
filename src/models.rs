use std::fmt;

use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const MAX_PERIODS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRow {
    #[serde(default)]
    pub discipline: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub students: u32,
    #[serde(default)]
    pub fives: u32,
    #[serde(default)]
    pub fours: u32,
    #[serde(default)]
    pub threes: u32,
}

impl GradeRow {
    /// The grouping key, or `None` when the discipline is unset.
    pub fn discipline_key(&self) -> Option<&str> {
        self.discipline
            .as_deref()
            .filter(|discipline| !discipline.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Semester {
    AutumnWinter,
    SpringSummer,
}

/// One academic year ("tab") with both semester row lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub label: String,
    #[serde(default)]
    pub autumn_winter: Vec<GradeRow>,
    #[serde(default)]
    pub spring_summer: Vec<GradeRow>,
}

impl Period {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn semester_mut(&mut self, semester: Semester) -> &mut Vec<GradeRow> {
        match semester {
            Semester::AutumnWinter => &mut self.autumn_winter,
            Semester::SpringSummer => &mut self.spring_summer,
        }
    }

    /// Autumn-winter rows followed by spring-summer rows.
    pub fn rows(&self) -> impl Iterator<Item = &GradeRow> {
        self.autumn_winter.iter().chain(self.spring_summer.iter())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("years of work must be between 1 and 5, got {0}")]
    YearsOfWork(u8),
    #[error("start year must be positive and leave room for every period, got {0}")]
    StartYear(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub category: Option<String>,
    pub years_of_work: u8,
    pub start_year: i32,
}

impl Configuration {
    pub fn new(
        category: Option<String>,
        years_of_work: u8,
        start_year: i32,
    ) -> Result<Self, ConfigurationError> {
        if years_of_work == 0 || usize::from(years_of_work) > MAX_PERIODS {
            return Err(ConfigurationError::YearsOfWork(years_of_work));
        }
        // the last period label needs `start_year + years_of_work` to fit
        if start_year <= 0 || start_year.checked_add(i32::from(years_of_work)).is_none() {
            return Err(ConfigurationError::StartYear(start_year));
        }

        Ok(Self {
            category: category.filter(|category| !category.trim().is_empty()),
            years_of_work,
            start_year,
        })
    }
}

/// A grade row with its derived metrics attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedRow {
    #[serde(default)]
    pub discipline: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub students: u32,
    #[serde(default)]
    pub fives: u32,
    #[serde(default)]
    pub fours: u32,
    #[serde(default)]
    pub threes: u32,
    #[serde(default)]
    pub total_grades: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub performance: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub quality: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub average_score: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedPeriod {
    pub label: String,
    pub autumn_winter: Vec<EnhancedRow>,
    pub spring_summer: Vec<EnhancedRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateResult {
    pub discipline: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub performance: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub quality: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub average_score: Option<Decimal>,
}

/// One row of a wide table: a discipline and one cell per period label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub discipline: String,
    pub cells: Vec<(String, Option<Decimal>)>,
}

impl TableRow {
    pub fn cell(&self, label: &str) -> Option<Decimal> {
        self.cells
            .iter()
            .find(|(column, _)| column == label)
            .and_then(|(_, value)| *value)
    }
}

struct Cell<'a>(&'a Option<Decimal>);

impl Serialize for Cell<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float_option::serialize(self.0, serializer)
    }
}

struct OwnedCell(Option<Decimal>);

impl<'de> Deserialize<'de> for OwnedCell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float_option::deserialize(deserializer).map(OwnedCell)
    }
}

impl Serialize for TableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len() + 1))?;
        map.serialize_entry("discipline", &self.discipline)?;
        for (label, value) in &self.cells {
            map.serialize_entry(label, &Cell(value))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TableRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableRowVisitor;

        impl<'de> Visitor<'de> for TableRowVisitor {
            type Value = TableRow;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a table row keyed by discipline and period labels")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TableRow, A::Error> {
                let mut row = TableRow::default();
                let mut discipline = None;
                while let Some(key) = access.next_key::<String>()? {
                    if key == "discipline" {
                        discipline = Some(access.next_value::<Option<String>>()?.unwrap_or_default());
                    } else {
                        let OwnedCell(value) = access.next_value()?;
                        row.cells.push((key, value));
                    }
                }
                row.discipline =
                    discipline.ok_or_else(|| <A::Error as serde::de::Error>::missing_field("discipline"))?;
                Ok(row)
            }
        }

        deserializer.deserialize_map(TableRowVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResults {
    pub performance_table: Vec<TableRow>,
    pub quality_table: Vec<TableRow>,
    pub average_score_table: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallResult {
    pub discipline: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub avg_performance: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub avg_quality: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub avg_average_score: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub configuration: Configuration,
    pub tabs_data: Vec<EnhancedPeriod>,
    pub intermediate_results: Vec<Vec<IntermediateResult>>,
    pub final_results: FinalResults,
    pub overall_results: Vec<OverallResult>,
}

/// Identity of whoever the report was produced for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportUser {
    pub name: Option<String>,
    pub email: Option<String>,
}
