//! Station and stream catalog: naming, classification and visibility.

pub mod access;
pub mod categories;
pub mod stations;
pub mod streams;

pub use access::is_visible;
pub use categories::{CategoryInfo, CategoryTable, Visibility, is_positional, normalize_key, short_name};
pub use stations::{Station, find_station, resolve_location, resolve_stations};
pub use streams::{Stream, resolve_streams, visible_streams};
