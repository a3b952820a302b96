use chrono::NaiveDateTime;

const DATE_MARKER: &str = "_from_";

pub fn report_title(name: &str, at: NaiveDateTime) -> String {
    format!("Report \"{}\" from {}", name, at.format("%d.%m.%Y %H:%M"))
}

/// Makes a report title safe to use as a file name.
pub fn clean_title(title: &str) -> String {
    // symbols become spaces, then each whitespace run becomes one `_`;
    // runs at either end are kept as a separator
    let mut joined = String::with_capacity(title.len());
    let mut in_gap = false;
    for ch in title.trim().chars() {
        if ch.is_alphanumeric() {
            joined.push(ch);
            in_gap = false;
        } else if !in_gap {
            joined.push('_');
            in_gap = true;
        }
    }

    hyphenate_date(&joined)
}

fn is_underscored_date(bytes: &[u8]) -> bool {
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(position, byte)| match position {
            2 | 5 => *byte == b'_',
            _ => byte.is_ascii_digit(),
        })
}

fn hyphenate_date(title: &str) -> String {
    let Some(marker) = title.find(DATE_MARKER) else {
        return title.to_string();
    };
    let date_start = marker + DATE_MARKER.len();
    let tail = &title[date_start..];
    match tail.as_bytes().get(..10) {
        Some(date) if is_underscored_date(date) => format!(
            "{}{}{}",
            &title[..date_start],
            tail[..10].replace('_', "-"),
            &tail[10..]
        ),
        _ => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 3)
            .and_then(|date| date.and_hms_opt(14, 5, 0))
            .unwrap()
    }

    #[test]
    fn title_includes_name_and_timestamp() {
        assert_eq!(
            report_title("Department of Physics", at()),
            "Report \"Department of Physics\" from 03.02.2026 14:05"
        );
    }

    #[test]
    fn cleaned_title_is_file_name_safe() {
        let title = report_title("Physics & Math", at());
        assert_eq!(clean_title(&title), "Report_Physics_Math_from_03-02-2026_14_05");
    }

    #[test]
    fn keeps_non_latin_letters() {
        assert_eq!(clean_title("  Отчёт: «Физика»  "), "Отчёт_Физика_");
    }

    #[test]
    fn symbol_runs_at_the_edges_leave_a_separator() {
        assert_eq!(clean_title("Report \"X\""), "Report_X_");
        assert_eq!(clean_title("«Math» notes"), "_Math_notes");
    }

    #[test]
    fn leaves_titles_without_dates_alone() {
        assert_eq!(clean_title("notes from_12_ab"), "notes_from_12_ab");
    }
}
