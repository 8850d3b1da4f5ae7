//! Pure computations over attribute data: reducers and the text literal format.

pub mod estimator;
pub mod literal;

pub use literal::{
    format_interval_map, format_interval_set, format_timestamp_map, format_timestamp_set,
    parse_interval_map, parse_interval_set, parse_timestamp_map, parse_timestamp_set, parse_value,
};
