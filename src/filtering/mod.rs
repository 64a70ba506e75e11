//! Filter categories, filter state and local matching.

mod category;
mod codec;
mod date;
mod matching;
mod state;

pub use category::{
    FilterCategory, FilterKind, FilterOption, FilterType, ItemValueFn, MatcherFn,
};
pub use codec::FilterParamCodec;
pub use date::{DateInterval, format_date, parse_calendar_date, parse_date};
pub use matching::{matches_all, matches_category};
pub use state::{FilterState, FilterValues, normalize_atoms};
