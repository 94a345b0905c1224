//! LEON value types.

mod map;
mod value;

pub use map::{Iter, Map};
pub use value::Value;
