//! US mailing-address formatting.
//!
//! Follows the usual US postal layout:
//!
//! ```text
//! 100 Congress Ave
//! Austin, TX 78701
//! ```
//!
//! The county stands in for a missing city and full state names are
//! abbreviated to their USPS codes.

use crate::models::{Address, StructuredAddress};

const STATE_CODES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("American Samoa", "AS"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Guam", "GU"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Northern Mariana Islands", "MP"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Puerto Rico", "PR"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("United States Virgin Islands", "VI"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// USPS code for a state name; codes pass through upper-cased.
pub fn state_code(state: &str) -> Option<&'static str> {
    let state = state.trim();
    STATE_CODES
        .iter()
        .find(|(name, code)| name.eq_ignore_ascii_case(state) || code.eq_ignore_ascii_case(state))
        .map(|(_, code)| *code)
}

/// Format structured fields as a multi-line mailing address.
pub fn format_address(addr: &StructuredAddress) -> String {
    format_lines(addr).join("\n")
}

/// Same as [`format_address`] on one line, separated by `", "`.
pub fn format_single_line(addr: &StructuredAddress) -> String {
    format_lines(addr).join(", ")
}

/// Format a sampled address, whatever its property layout.
///
/// Free-text addresses (`address` / `addr` properties) are returned as-is.
pub fn format_sampled(addr: &Address) -> String {
    let structured = addr.structured();
    if structured.street.is_some() || structured.city.is_some() {
        return format_address(&structured);
    }
    addr.prop_text("address")
        .or_else(|| addr.prop_text("addr"))
        .unwrap_or_default()
}

fn format_lines(addr: &StructuredAddress) -> Vec<String> {
    let field = |v: &Option<String>| v.as_deref().map(clean).filter(|s| !s.is_empty());

    let street_line = join_present(&[field(&addr.number), field(&addr.street)], " ");

    let locality = field(&addr.city).or_else(|| field(&addr.county));
    let state = field(&addr.state).map(|s| match state_code(&s) {
        Some(code) => code.to_string(),
        None => s,
    });
    let region = join_present(&[state, field(&addr.zip)], " ");
    let locality_line = join_present(&[locality, region], ", ");

    let mut lines: Vec<String> = Vec::new();
    for line in [street_line, locality_line].into_iter().flatten() {
        if lines.last() != Some(&line) {
            lines.push(line);
        }
    }
    lines
}

fn join_present(parts: &[Option<String>], sep: &str) -> Option<String> {
    let present: Vec<&str> = parts.iter().flatten().map(String::as_str).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(sep))
    }
}

/// Collapse inner whitespace and strip stray separators.
fn clean(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}
