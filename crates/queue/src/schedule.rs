//! Cron-expression validation and next-run computation.

use {
    chrono::{DateTime, Utc},
    cron::Schedule,
};

use crate::error::{Error, Result};

/// Parse a cron expression, accepting the common 5-field form.
///
/// The `cron` crate requires 7 fields (sec min hour dom month dow year);
/// users typically provide 5 (min hour dom month dow). Prepend "0" for
/// seconds and append "*" for year before giving up.
pub fn parse(expr: &str) -> Result<Schedule> {
    expr.parse::<Schedule>()
        .or_else(|_| {
            let padded = format!("0 {expr} *");
            padded.parse::<Schedule>()
        })
        .map_err(|source| Error::invalid_cron(expr, source))
}

/// The first fire time of `expr` strictly after `now`, if any.
pub fn next_occurrence(expr: &str, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    Ok(parse(expr)?.after(&now).next())
}
