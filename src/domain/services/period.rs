use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

/// A closed reporting interval. `from` is pinned to 00:00:00 and `to` to
/// 23:59:59 of their respective days, so `from <= to` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl Period {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Period {
            from: start_of_day(from),
            to: end_of_day(to),
        }
    }

    /// Full calendar month, or `None` when year/month do not form a date.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = first.checked_add_months(Months::new(1))? - Duration::days(1);
        Some(Period::new(first, last))
    }

    /// Number of calendar days covered, inclusive on both ends.
    pub fn days(&self) -> i64 {
        (self.to.date() - self.from.date()).num_days() + 1
    }

    /// The interval of equal day-count ending the instant before `from`.
    pub fn comparison(&self) -> Period {
        let end = self.from.date() - Duration::days(1);
        let start = end - Duration::days(self.days() - 1);
        Period::new(start, end)
    }
}

/// Raw period selectors exactly as they arrive on the query string.
#[derive(Debug, Clone, Default)]
pub struct PeriodParams {
    pub month_year: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Turn request parameters into one canonical interval.
///
/// Resolution order: `month_year` string, then explicit `month`+`year`
/// integers, then `date_from`/`date_to` with one-month-ending-today
/// defaults. Malformed values fall through silently; an inverted explicit
/// range is swapped rather than rejected.
pub fn resolve_period(params: &PeriodParams, today: NaiveDate) -> Period {
    if let Some(period) = resolve_month_year_period(params) {
        debug!(from = %period.from, to = %period.to, "period resolved from month/year selectors");
        return period;
    }

    let default_to = today;
    let default_from = today
        .checked_sub_months(Months::new(1))
        .map(|d| d + Duration::days(1))
        .unwrap_or(today);

    let to = parse_date(params.date_to.as_deref()).unwrap_or(default_to);
    let from = parse_date(params.date_from.as_deref()).unwrap_or(default_from);

    let period = if from > to {
        Period::new(to, from)
    } else {
        Period::new(from, to)
    };
    debug!(from = %period.from, to = %period.to, "period resolved from date range");
    period
}

fn resolve_month_year_period(params: &PeriodParams) -> Option<Period> {
    if let Some(raw) = params.month_year.as_deref() {
        if let Some((year, month)) = parse_month_year(raw) {
            if let Some(period) = Period::month(year, month) {
                return Some(period);
            }
        }
    }

    if let (Some(month_raw), Some(year_raw)) = (params.month.as_deref(), params.year.as_deref()) {
        let month = int_value(month_raw);
        let year = int_value(year_raw);
        if (1..=12).contains(&month) && year > 0 {
            if let Some(period) = Period::month(year as i32, month as u32) {
                return Some(period);
            }
        }
    }

    None
}

/// Parse a flexible month/year string: year and month in either order,
/// separated by `-`, `/` or whitespace, month as a number or an English
/// name, or a bare `YYYYMM`. Any full date string works as a last resort
/// and is truncated to its month. Returns `None` instead of erroring.
pub fn parse_month_year(value: &str) -> Option<(i32, u32)> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    explicit_month_year(value)
        .or_else(|| parse_date(Some(value)).map(|d| (d.year(), d.month())))
        .filter(|&(year, month)| NaiveDate::from_ymd_opt(year, month, 1).is_some())
}

fn explicit_month_year(value: &str) -> Option<(i32, u32)> {
    let tokens: Vec<&str> = value
        .split(|c: char| c == '-' || c == '/' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    match tokens.as_slice() {
        [a, b] => {
            let a_num = a.parse::<i32>().ok();
            let b_num = b.parse::<i32>().ok();
            match (a_num, b_num) {
                // Year-first numeric formats take precedence over month-first.
                (Some(first), Some(second)) => {
                    if (1..=12).contains(&second) && first > 0 {
                        Some((first, second as u32))
                    } else if (1..=12).contains(&first) && second > 0 {
                        Some((second, first as u32))
                    } else {
                        None
                    }
                }
                (None, Some(year)) if year > 0 => month_from_name(a).map(|m| (year, m)),
                (Some(year), None) if year > 0 => month_from_name(b).map(|m| (year, m)),
                _ => None,
            }
        }
        [single] if single.len() == 6 && single.chars().all(|c| c.is_ascii_digit()) => {
            let year = single[..4].parse::<i32>().ok()?;
            let month = single[4..].parse::<u32>().ok()?;
            if (1..=12).contains(&month) && year > 0 {
                Some((year, month))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn month_from_name(token: &str) -> Option<u32> {
    const NAMES: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    let token = token.to_ascii_lowercase();
    NAMES
        .iter()
        .position(|name| *name == token.as_str() || (token.len() == 3 && name.starts_with(&token)))
        .map(|index| index as u32 + 1)
}

/// Generic date-string parser used by the range selectors and the
/// month/year fallback. Unparseable or missing input yields `None` so the
/// caller can substitute its default.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts.date());
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }

    None
}

/// Loose integer coercion: an optional sign and the leading digit run
/// count, anything after them is ignored. `"3abc"` is 3, `"abc"` is 0.
fn int_value(raw: &str) -> i64 {
    let raw = raw.trim();
    let mut end = 0;
    for (index, c) in raw.char_indices() {
        if c.is_ascii_digit() || (index == 0 && (c == '+' || c == '-')) {
            end = index + c.len_utf8();
        } else {
            break;
        }
    }
    raw[..end].parse::<i64>().unwrap_or(0)
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::seconds(86_399)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn params(
        month_year: Option<&str>,
        month: Option<&str>,
        year: Option<&str>,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> PeriodParams {
        PeriodParams {
            month_year: month_year.map(str::to_string),
            month: month.map(str::to_string),
            year: year.map(str::to_string),
            date_from: date_from.map(str::to_string),
            date_to: date_to.map(str::to_string),
        }
    }

    #[test]
    fn test_month_year_dash_format() {
        let period = resolve_period(&params(Some("2025-03"), None, None, None, None), date(2025, 6, 1));
        assert_eq!(period.from, date(2025, 3, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(period.to, date(2025, 3, 31).and_hms_opt(23, 59, 59).unwrap());
    }

    #[test]
    fn test_month_year_flexible_formats() {
        for raw in ["2025/03", "2025 03", "202503", "3-2025", "03/2025", "3 2025"] {
            assert_eq!(parse_month_year(raw), Some((2025, 3)), "format: {}", raw);
        }
    }

    #[test]
    fn test_month_year_name_formats() {
        assert_eq!(parse_month_year("March 2025"), Some((2025, 3)));
        assert_eq!(parse_month_year("2025 March"), Some((2025, 3)));
        assert_eq!(parse_month_year("mar 2025"), Some((2025, 3)));
    }

    #[test]
    fn test_month_year_full_date_fallback_truncates_to_month() {
        assert_eq!(parse_month_year("2025-03-15"), Some((2025, 3)));
    }

    #[test]
    fn test_month_year_garbage_returns_none() {
        assert_eq!(parse_month_year("not a month"), None);
        assert_eq!(parse_month_year(""), None);
        assert_eq!(parse_month_year("13-13"), None);
    }

    #[test]
    fn test_malformed_month_year_falls_through_to_month_year_ints() {
        let period = resolve_period(
            &params(Some("garbage"), Some("2"), Some("2024"), None, None),
            date(2025, 6, 1),
        );
        assert_eq!(period.from.date(), date(2024, 2, 1));
        assert_eq!(period.to.date(), date(2024, 2, 29));
    }

    #[test]
    fn test_month_year_ints_coerce_leading_digits() {
        let period = resolve_period(
            &params(None, Some("3abc"), Some("2025junk"), None, None),
            date(2025, 6, 1),
        );
        assert_eq!(period.from.date(), date(2025, 3, 1));
        assert_eq!(period.to.date(), date(2025, 3, 31));

        assert_eq!(int_value("3abc"), 3);
        assert_eq!(int_value("-5x"), -5);
        assert_eq!(int_value(" 12 "), 12);
        assert_eq!(int_value("abc"), 0);
        assert_eq!(int_value("+"), 0);
        assert_eq!(int_value(""), 0);
    }

    #[test]
    fn test_month_year_ints_out_of_range_fall_through() {
        let period = resolve_period(
            &params(None, Some("13"), Some("2024"), Some("2025-01-10"), Some("2025-01-20")),
            date(2025, 6, 1),
        );
        assert_eq!(period.from.date(), date(2025, 1, 10));
        assert_eq!(period.to.date(), date(2025, 1, 20));
    }

    #[test]
    fn test_explicit_range() {
        let period = resolve_period(
            &params(None, None, None, Some("2025-02-01"), Some("2025-02-10")),
            date(2025, 6, 1),
        );
        assert_eq!(period.from, date(2025, 2, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(period.to, date(2025, 2, 10).and_hms_opt(23, 59, 59).unwrap());
    }

    #[test]
    fn test_swapped_range_is_corrected() {
        let period = resolve_period(
            &params(None, None, None, Some("2025-02-10"), Some("2025-02-01")),
            date(2025, 6, 1),
        );
        assert_eq!(period.from.date(), date(2025, 2, 1));
        assert_eq!(period.to.date(), date(2025, 2, 10));
        assert_eq!(period.from.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_default_range_is_one_month_ending_today() {
        let period = resolve_period(&params(None, None, None, None, None), date(2025, 6, 15));
        assert_eq!(period.to.date(), date(2025, 6, 15));
        assert_eq!(period.from.date(), date(2025, 5, 16));
    }

    #[test]
    fn test_invalid_date_falls_back_to_default() {
        let period = resolve_period(
            &params(None, None, None, Some("not-a-date"), Some("2025-06-10")),
            date(2025, 6, 15),
        );
        assert_eq!(period.to.date(), date(2025, 6, 10));
        assert_eq!(period.from.date(), date(2025, 5, 16));
    }

    #[test]
    fn test_period_days_inclusive() {
        let period = Period::new(date(2025, 3, 1), date(2025, 3, 31));
        assert_eq!(period.days(), 31);
    }

    #[test]
    fn test_comparison_period_of_march() {
        let period = Period::month(2025, 3).unwrap();
        let comparison = period.comparison();
        assert_eq!(comparison.from, date(2025, 1, 29).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(comparison.to, date(2025, 2, 28).and_hms_opt(23, 59, 59).unwrap());
        assert_eq!(comparison.days(), 31);
    }

    #[test]
    fn test_comparison_is_contiguous() {
        let period = Period::new(date(2025, 5, 10), date(2025, 5, 16));
        let comparison = period.comparison();
        assert_eq!(comparison.to.date(), date(2025, 5, 9));
        assert_eq!(comparison.days(), period.days());
    }

    #[test]
    fn test_month_invalid_ymd_is_none() {
        assert!(Period::month(2025, 13).is_none());
        assert!(Period::month(0, 0).is_none());
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date(Some("2025-03-05")), Some(date(2025, 3, 5)));
        assert_eq!(parse_date(Some("2025/03/05")), Some(date(2025, 3, 5)));
        assert_eq!(parse_date(Some("05/03/2025")), Some(date(2025, 3, 5)));
        assert_eq!(parse_date(Some("2025-03-05 10:20:30")), Some(date(2025, 3, 5)));
        assert_eq!(parse_date(Some("2025-03-05T10:20:30")), Some(date(2025, 3, 5)));
        assert_eq!(parse_date(Some("2025-03-05T10:20:30+02:00")), Some(date(2025, 3, 5)));
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(None), None);
    }
}
