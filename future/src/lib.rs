//! Single-resolution futures and promises with composable combinators.
//!
//! A [`Promise`] is the write side of a computation that settles exactly
//! once; its [`Future`] is the read side, a cheap cloneable handle on which
//! any number of success/failure/cancel/completion callbacks can be
//! registered. Settlement is strictly first-wins: whichever of `succeed`,
//! `fail`, or `cancel` executes first — directly or through a mimicked
//! source — determines the terminal [`Outcome`], and everything later is a
//! silent no-op.
//!
//! The primitive is execution-context-agnostic: callbacks run synchronously
//! on whatever thread performs the settling call, and the library spawns no
//! runtime of its own (only the delay-based combinators share one lazily
//! spawned timer thread). Cancellation is cooperative and propagates
//! strictly upstream, never downstream.
//!
//! # Examples
//!
//! ```
//! use strata::{Promise, Outcome};
//!
//! let promise = Promise::<i32>::new();
//! let future = promise
//!   .future()
//!   .map(|n| n + 1)
//!   .filter(|n| *n > 0);
//!
//! promise.succeed(41);
//! assert_eq!(future.wait().into_value(), Some(42));
//! ```

pub mod error;
pub mod sequence;

mod combinators;
mod core;
mod future;
mod outcome;
mod promise;
mod timer;

pub use combinators::retry;
pub use error::{is_future_error, wrap, Error, FutureError};
pub use future::{Awaited, Future};
pub use outcome::Outcome;
pub use promise::Promise;
pub use timer::delay;
