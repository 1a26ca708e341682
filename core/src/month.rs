//! Spanish month names accepted by the month-count query.

use time::Month;

use crate::error::QueryError;

const MONTH_NAMES: [(&str, Month); 12] = [
    ("enero", Month::January),
    ("febrero", Month::February),
    ("marzo", Month::March),
    ("abril", Month::April),
    ("mayo", Month::May),
    ("junio", Month::June),
    ("julio", Month::July),
    ("agosto", Month::August),
    ("septiembre", Month::September),
    ("octubre", Month::October),
    ("noviembre", Month::November),
    ("diciembre", Month::December),
];

/// Resolve a month name, ignoring case and surrounding whitespace.
pub fn parse_month(name: &str) -> Result<Month, QueryError> {
    let wanted = name.trim().to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == wanted)
        .map(|(_, month)| *month)
        .ok_or_else(|| QueryError::InvalidMonth(name.to_string()))
}
