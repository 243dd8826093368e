use chrono::NaiveDate;

/// How a partial input is completed to a full date before parsing.
#[derive(Debug, Clone, Copy)]
enum Pad {
    AsIs,
    /// Prefix "01-" so month-year inputs like "Jan-24" become "01-Jan-24".
    PrependDay,
    /// Suffix "-01" so year-month inputs like "2024-04" become "2024-04-01".
    AppendDay,
}

/// Accepted date formats, tried in order. The first match wins; exhausting
/// the list yields `None` rather than an error or a diagnostic.
const DATE_FORMATS: &[(Pad, &str)] = &[
    (Pad::PrependDay, "%d-%b-%y"), // Jan-24
    (Pad::AsIs, "%d %B %Y"),       // 01 April 2024
    (Pad::AsIs, "%d %b %Y"),       // 01 Apr 2024
    (Pad::AsIs, "%Y-%m-%d"),       // 2024-04-01
    (Pad::AppendDay, "%Y-%m-%d"),  // 2024-04
];

/// Parses a date string against the accepted format list.
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS.iter().find_map(|(pad, fmt)| {
        let candidate = match pad {
            Pad::AsIs => trimmed.to_string(),
            Pad::PrependDay => format!("01-{}", trimmed),
            Pad::AppendDay => format!("{}-01", trimmed),
        };
        NaiveDate::parse_from_str(&candidate, fmt).ok()
    })
}

/// Parses a fiscal year label, tolerating an "FY"/"fy" prefix.
pub fn parse_fiscal_year(input: &str) -> Option<i32> {
    let trimmed = input.trim();
    let digits = match trimmed.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("fy") => trimmed[2..].trim(),
        _ => trimmed,
    };

    digits
        .parse::<i32>()
        .ok()
        .filter(|year| (1900..=2100).contains(year))
}

/// The calendar month following `(year, month)`.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Formats a month as its chart label, e.g. (2024, 1) -> "Jan-24".
pub fn month_label(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date.format("%b-%y").to_string(),
        None => format!("{:04}-{:02}", year, month),
    }
}
