pub mod index;
pub mod list;

use anyhow::{Result, bail};
use sesslog_types::{QueryFilter, parse_date_arg};

use crate::args::FilterArgs;

/// Translate CLI filter flags into a `QueryFilter`, rejecting malformed
/// dates here so they never reach the core.
pub fn build_filter(args: &FilterArgs) -> Result<QueryFilter> {
    let since = match &args.since {
        Some(value) => match parse_date_arg(value, false) {
            Ok(parsed) => Some(parsed),
            Err(err) => bail!("invalid --since value: {}", err),
        },
        None => None,
    };
    let until = match &args.until {
        Some(value) => match parse_date_arg(value, true) {
            Ok(parsed) => Some(parsed),
            Err(err) => bail!("invalid --until value: {}", err),
        },
        None => None,
    };

    Ok(QueryFilter {
        search: args.search.clone().unwrap_or_default(),
        project: args.project.clone().unwrap_or_default(),
        since,
        until,
    })
}
