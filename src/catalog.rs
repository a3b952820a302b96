use std::collections::HashSet;

use uuid::Uuid;

use crate::models::Period;

const NAME_MAX: usize = 255;
const CODE_MAX: usize = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("a discipline needs a code or a name")]
    MissingCodeAndName,
    #[error("discipline name is {0} characters long, at most 255 allowed")]
    NameTooLong(usize),
    #[error("discipline code is {0} characters long, at most 100 allowed")]
    CodeTooLong(usize),
}

/// A catalog entry that grade rows refer to by its code name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discipline {
    pub id: Uuid,
    pub code: Option<String>,
    pub name: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Discipline {
    pub fn new(code: Option<String>, name: Option<String>) -> Result<Self, CatalogError> {
        let code = non_blank(code);
        let name = non_blank(name);

        if code.is_none() && name.is_none() {
            return Err(CatalogError::MissingCodeAndName);
        }
        if let Some(length) = name.as_ref().map(|name| name.chars().count()) {
            if length > NAME_MAX {
                return Err(CatalogError::NameTooLong(length));
            }
        }
        if let Some(length) = code.as_ref().map(|code| code.chars().count()) {
            if length > CODE_MAX {
                return Err(CatalogError::CodeTooLong(length));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            code,
            name,
        })
    }

    /// `"<code> <name>"`, or whichever half is present.
    pub fn code_name(&self) -> String {
        match (&self.code, &self.name) {
            (Some(code), Some(name)) => format!("{} {}", code, name),
            (Some(code), None) => code.clone(),
            (None, Some(name)) => name.clone(),
            (None, None) => String::new(),
        }
    }

    pub fn matches(&self, discipline: &str) -> bool {
        self.code_name() == discipline
            || self.code.as_deref() == Some(discipline)
            || self.name.as_deref() == Some(discipline)
    }
}

/// Disciplines used in `periods` that no catalog entry matches, first-seen order.
pub fn unknown_disciplines<'a>(periods: &'a [Period], catalog: &[Discipline]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    periods
        .iter()
        .flat_map(|period| period.rows())
        .filter_map(|row| row.discipline_key())
        .filter(|discipline| seen.insert(*discipline))
        .filter(|discipline| !catalog.iter().any(|entry| entry.matches(discipline)))
        .collect()
}
