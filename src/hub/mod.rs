//! Remote mode: the hub request descriptor and its query serialization.

mod query;
mod request;

pub use query::{HubQuery, serialize_filter, serialize_filters, wrap_and_escape};
pub use request::{
    FilterOperator, HubFilter, HubFilterValue, HubRequestArgs, HubRequestParams, HubSort, build_request_params,
    LogicOperator, filter_entries,
};
