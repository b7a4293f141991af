//! Domain types for marketdeck

pub mod bar;
pub mod request;
pub mod series;

pub use bar::CanonicalBar;
pub use request::{Provider, SymbolRequest, TimeRange};
pub use series::{CanonicalSeries, PLOTTABLE_MIN_POINTS};
