//! Per-feature table state.
//!
//! Each feature is a plain state struct with synchronous mutators, plus a
//! [`ParamCodec`](crate::url_params::ParamCodec) that persists it. The
//! facade in [`controls`](crate::controls) composes them and decides when a
//! change in one feature resets another.
//!
//! Filter state lives in [`filtering`](crate::filtering) next to the filter
//! category model it depends on.

mod active_item;
mod expansion;
mod pagination;
mod selection;
mod sort;

pub use active_item::{ActiveItemParamCodec, ActiveItemState};
pub use expansion::{ExpandedRows, ExpansionParamCodec, ExpansionState, ExpansionVariant};
pub use pagination::{PageWindow, PaginationParamCodec, PaginationState};
pub use selection::{SelectionSet, SelectionState};
pub use sort::{ActiveSort, SortDirection, SortParamCodec, SortState, SortValue};
