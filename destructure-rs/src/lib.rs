//! Pattern-binding evaluator.
//!
//! Unpacks structured values into named bindings according to a declarative
//! [`Pattern`]: positional and keyed slots, renaming, rest collection, and
//! lazily evaluated defaults that fire only for values that are
//! [`Value::Unset`] (never for [`Value::Null`]).
//!
//! ```rust
//! use destructure::script::{parse_pattern, parse_value};
//! use destructure::{evaluate, EmptyEnv, Value};
//!
//! let pattern = parse_pattern("{ name, address: { city = 'Unknown' } = {}, ...rest }").unwrap();
//! let value = parse_value("{ name: 'Ada', age: 36 }").unwrap();
//!
//! let b = evaluate(&pattern, value, &EmptyEnv).unwrap();
//! assert_eq!(b.get("city"), Some(&Value::from("Unknown")));
//! assert_eq!(b.to_string(), "name = \"Ada\"\ncity = \"Unknown\"\nrest = { age: 36 }");
//! ```

pub mod bind;
pub mod cli;
pub mod config;
pub mod error;
pub mod pattern;
pub mod script;
pub mod value;

pub use bind::{assign, bind_call, evaluate, Bindings, DefaultExpr, EmptyEnv, Environment, Signature, Store};
pub use error::{BindError, DefaultError, Shape};
pub use pattern::{ArraySlot, Limits, ObjectSlot, Pattern, PatternError};
pub use value::{Mapping, Value};
