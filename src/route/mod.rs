//! Route model and selection.
//!
//! A [`Route`] is produced once by the directions lookup and consumed
//! read-only by the navigation session afterwards.

mod model;
mod selector;

pub use model::{Coordinate, Leg, Route, Step};
pub use selector::select_route;
