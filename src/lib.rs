// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Add attributes taken from a request [`Context`] to structured log records.
//!
//! # Usage
//!
//! Describe the values to take from a context with extractors, and wrap the
//! handler which actually emits records in a [`ContextHandler`]:
//!
//! ```edition2018
//! use log::Level;
//! use log_context::{attr, Context, ContextHandler, Handler, LogHandler, Record};
//!
//! # struct Discard;
//! # impl log::Log for Discard {
//! #     fn enabled(&self, _: &log::Metadata) -> bool { true }
//! #     fn log(&self, _: &log::Record) {}
//! #     fn flush(&self) {}
//! # }
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! fn request_id(ctx: &Context) -> Option<String> {
//!     ctx.value::<String>("request_id").cloned()
//! }
//!
//! let handler = ContextHandler::new(LogHandler::new(Discard), vec![attr("request_id", request_id)?])?;
//!
//! let ctx = Context::background().with_value("request_id", "4711".to_string());
//! handler.handle(&ctx, &Record::new(Level::Info, "hello"))?;
//! # Ok(())
//! # }
//! ```
//!
//! The [`ContextHandler`] runs its extractors once for every record it handles,
//! with the context the record was logged in, appends the extracted
//! attributes to a copy of the record and hands that copy to the target
//! handler.  If nothing was extracted the target handler gets the original
//! record.
//!
//! # Extractors
//!
//! An [`Extractor`] derives zero or more [`Attr`]ibutes from a context:
//!
//! - [`attr`] makes a single attribute from a lookup function which returns
//!   `Option<T>`.  The attribute kind follows from `T`, see [`attr`] for the
//!   supported types; any other type becomes [`Value::Any`].
//! - [`ignore_zero`] and [`log_zero`] adapt lookup functions returning a bare
//!   `T`, and omit or keep default values respectively.
//! - [`from_fn`] turns any function into an extractor, e.g. to log a custom
//!   type as multiple attributes.
//! - [`group`] puts the attributes of other extractors into a named group,
//!   and [`concat`] joins several extractors into one.
//!
//! ```edition2018
//! use std::time::Duration;
//! use log_context::{attr, group, ignore_zero, Context};
//!
//! # fn main() -> Result<(), log_context::Error> {
//! fn hostname(ctx: &Context) -> Option<String> {
//!     ctx.value::<String>("hostname").cloned()
//! }
//!
//! fn timeout(ctx: &Context) -> Duration {
//!     ctx.value::<Duration>("timeout").copied().unwrap_or_default()
//! }
//!
//! let config = group(
//!     "config",
//!     vec![attr("hostname", hostname)?, attr("timeout", ignore_zero(timeout))?],
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! # The `log` facade
//!
//! [`LogHandler`] emits records through any [`log::Log`] implementation, with
//! attributes as key-values.  A [`ContextHandler`] implements [`log::Log`]
//! itself, taking the context from [`Context::current`], so it can be
//! installed as the global logger with [`ContextHandler::install`]; use
//! [`Context::enter`] or [`Context::scope`] to set the current context.
//!
//! # Errors
//!
//! Constructors return [`Error`] for wiring mistakes such as empty keys or
//! missing extractors.  Errors of the target handler pass through
//! [`ContextHandler`] unchanged; when logging through the `log` facade a
//! failing target handler **panics**, because [`log::Log`] has no way to
//! report errors.
#![deny(warnings, missing_docs, clippy::all)]

mod compose;
mod context;
mod error;
mod extract;
mod facade;
mod handler;
mod record;
mod value;

pub use compose::{concat, group};
pub use context::{Context, ContextGuard};
pub use error::{Error, Result};
pub use extract::{
    attr, from_fn, ignore_zero, log_zero, Extractor, ExtractorFn, IgnoreZero, LogZero, Lookup,
    SharedExtractor, TypedExtractor,
};
pub use facade::LogHandler;
pub use handler::{ContextHandler, Handler};
pub use record::Record;
pub use value::{Attr, Value};
