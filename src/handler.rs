// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Handlers, and the handler which adds attributes from a context.

use std::fmt::Display;
use std::sync::Arc;

use log::{Level, Log, Metadata, SetLoggerError};

use crate::compose::concat;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::extract::SharedExtractor;
use crate::record::Record;
use crate::value::Attr;

/// Formats and emits log records.
pub trait Handler: Send + Sync {
    /// The error returned by [`Handler::handle`].
    type Error;

    /// Whether this handler emits records at `level`.
    fn enabled(&self, ctx: &Context, level: Level) -> bool;

    /// Whether this handler emits records described by `metadata`.
    ///
    /// Handlers which also filter by target override this; the default
    /// only looks at the level.
    fn enabled_for(&self, ctx: &Context, metadata: &Metadata) -> bool {
        self.enabled(ctx, metadata.level())
    }

    /// Emit `record`.
    ///
    /// Implementations must not assume they own `record`; copy it before
    /// adding to it.
    fn handle(&self, ctx: &Context, record: &Record) -> std::result::Result<(), Self::Error>;

    /// A handler which includes `attrs` in every record it emits.
    fn with_attrs(&self, attrs: &[Attr]) -> Self
    where
        Self: Sized;

    /// A handler which puts all subsequent attributes into the group `name`.
    fn with_group(&self, name: &str) -> Self
    where
        Self: Sized;

    /// Flush buffered records.
    ///
    /// Does nothing by default.
    fn flush(&self) {}
}

/// A handler which adds attributes taken from the context of each record,
/// and then passes the record on to a target handler.
///
/// The extractor is built once, in [`ContextHandler::new`], and shared by
/// all handlers derived with [`Handler::with_attrs`] and
/// [`Handler::with_group`].
pub struct ContextHandler<H> {
    extractor: SharedExtractor,
    target: H,
}

impl<H: Handler> ContextHandler<H> {
    /// Wrap `target` and add the attributes of all `extractors` to records.
    ///
    /// Fail under the same conditions as [`concat`].
    pub fn new<I, E>(target: H, extractors: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<SharedExtractor>>,
    {
        Self::from_optional(Some(target), extractors)
    }

    /// Like [`ContextHandler::new`], for a target which may be absent.
    ///
    /// Fail with [`Error::NilTarget`] if `target` is `None`.
    pub fn from_optional<I, E>(target: Option<H>, extractors: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<SharedExtractor>>,
    {
        let target = target.ok_or(Error::NilTarget)?;
        Ok(Self {
            extractor: concat(extractors)?,
            target,
        })
    }

    /// The combined extractor of this handler.
    pub fn extractor(&self) -> &SharedExtractor {
        &self.extractor
    }

    /// The wrapped handler.
    pub fn target(&self) -> &H {
        &self.target
    }
}

impl<H: Handler> Handler for ContextHandler<H> {
    type Error = H::Error;

    /// Whether the target handler is enabled for `level`.
    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.target.enabled(ctx, level)
    }

    fn enabled_for(&self, ctx: &Context, metadata: &Metadata) -> bool {
        self.target.enabled_for(ctx, metadata)
    }

    /// Add attributes extracted from `ctx` to `record` and pass it on.
    ///
    /// If the extractor finds nothing the target gets `record` itself,
    /// otherwise a copy with the extracted attributes appended.  Return the
    /// result of the target handler unchanged.
    fn handle(&self, ctx: &Context, record: &Record) -> std::result::Result<(), Self::Error> {
        let attrs = self.extractor.extract(ctx);
        if attrs.is_empty() {
            self.target.handle(ctx, record)
        } else {
            let mut record = record.clone();
            record.add_attrs(attrs);
            self.target.handle(ctx, &record)
        }
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
            target: self.target.with_attrs(attrs),
        }
    }

    fn with_group(&self, name: &str) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
            target: self.target.with_group(name),
        }
    }

    fn flush(&self) {
        self.target.flush()
    }
}

impl<H> ContextHandler<H>
where
    H: Handler + 'static,
    H::Error: Display,
{
    /// Install this handler as the global logger of the `log` facade.
    ///
    /// See [`log::set_boxed_logger`].  Records logged through the facade
    /// take their context from [`Context::current`].
    pub fn install(self) -> std::result::Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(self))
    }
}

/// The [`Log`] interface for [`ContextHandler`].
impl<H> Log for ContextHandler<H>
where
    H: Handler,
    H::Error: Display,
{
    /// Whether the target handler is enabled in the current context.
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.enabled_for(&Context::current(), metadata)
    }

    /// Handle `record` in the current context.
    ///
    /// # Errors
    ///
    /// **Panic** if the target handler fails; the `log` facade offers no way
    /// to return the error.  Use [`Handler::handle`] directly to get at
    /// errors.
    fn log(&self, record: &log::Record) {
        let ctx = Context::current();
        if !self.enabled_for(&ctx, record.metadata()) {
            return;
        }
        if let Err(error) = self.handle(&ctx, &Record::from_log(record)) {
            panic!("Failed to handle log record: {}", error);
        }
    }

    fn flush(&self) {
        Handler::flush(self)
    }
}
