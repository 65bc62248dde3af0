#![doc = include_str!("../README.md")]

mod assembler;
mod error;
mod locator;
mod matcher;
mod model;
mod network;

pub use assembler::{assemble, assemble_batch};
pub use error::{LocateError, NetworkError};
pub use locator::locate;
pub use matcher::{MatcherConfig, RouteMatch, disambiguate};
pub use model::{Event, EventInput, Measure, Point, RouteId, VertexRef};
pub use network::{Route, RouteNetwork};
