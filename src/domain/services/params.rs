//! Query-parameter coercions.
//!
//! Every parameter arrives as an optional raw string and is coerced to a
//! safe value here; malformed input never produces a request error.

/// Partner ids, deduplicated and restricted to positive integers,
/// preserving order. The parameter may arrive as repeated query keys, as
/// a comma-separated string, or any mix of the two; unusable input yields
/// an empty list, meaning no filter.
pub fn normalize_partner_ids<'a, I>(values: I) -> Vec<i64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ids = Vec::new();
    for value in values {
        for token in value.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let id = token.parse::<i64>().unwrap_or(0);
            if id > 0 && !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Loose boolean parse: missing uses the default, the usual true/false
/// spellings are honored, anything else is truthy when non-empty.
pub fn boolean_value(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => !other.is_empty(),
        },
    }
}

/// Optional float parameter: missing or empty means absent, a non-numeric
/// value coerces to 0.0 rather than failing the request.
pub fn float_param(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(raw.parse::<f64>().unwrap_or(0.0))
}
