// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A handler which emits records through a [`log::Log`] implementation.

use std::convert::Infallible;
use std::sync::Arc;

use log::kv::{Error, Key, Source, ToValue, VisitSource};
use log::{Level, Log, Metadata};

use crate::context::Context;
use crate::handler::Handler;
use crate::record::Record;
use crate::value::{Attr, Value};

/// Emit records through any logger of the `log` facade.
///
/// Attributes become key-values of the emitted [`log::Record`]: first those
/// added with [`Handler::with_attrs`], then those of the record itself.
/// Group attributes are flattened into dotted keys, i.e. a group `cfg` with
/// a member `foo` becomes the key `cfg.foo`.  After [`Handler::with_group`]
/// all subsequent attribute keys get the group name prepended likewise.
///
/// [`log::Record`] has no field for a timestamp, so [`Record::time`] is not
/// passed on; loggers stamp records with their own time.
pub struct LogHandler<L> {
    logger: Arc<L>,
    attrs: Vec<(String, Value)>,
    group: String,
}

impl<L: Log> LogHandler<L> {
    /// Emit records through `logger`.
    pub fn new(logger: L) -> Self {
        Self {
            logger: Arc::new(logger),
            attrs: Vec::new(),
            group: String::new(),
        }
    }

    /// The wrapped logger.
    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Flatten `attrs` into qualified key-values.
    fn qualify<'a>(&self, attrs: &'a [Attr]) -> Vec<(String, &'a Value)> {
        let mut pairs = Vec::with_capacity(attrs.len());
        for attr in attrs {
            attr.flatten(&self.group, &mut pairs);
        }
        pairs
    }
}

impl<L> Clone for LogHandler<L> {
    fn clone(&self) -> Self {
        Self {
            logger: Arc::clone(&self.logger),
            attrs: self.attrs.clone(),
            group: self.group.clone(),
        }
    }
}

struct KeyValues<'a>(Vec<(&'a str, &'a Value)>);

impl Source for KeyValues<'_> {
    fn visit<'kvs>(&'kvs self, visitor: &mut dyn VisitSource<'kvs>) -> Result<(), Error> {
        for (key, value) in &self.0 {
            visitor.visit_pair(Key::from_str(key), value.to_value())?;
        }
        Ok(())
    }
}

impl<L: Log> Handler for LogHandler<L> {
    type Error = Infallible;

    /// Whether `level` passes [`log::max_level`] and the wrapped logger.
    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.enabled_for(ctx, &Metadata::builder().level(level).build())
    }

    /// Whether `metadata` passes [`log::max_level`] and the wrapped logger.
    ///
    /// The logger sees the full metadata, so it can filter by target.
    fn enabled_for(&self, _ctx: &Context, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && self.logger.enabled(metadata)
    }

    fn handle(&self, _ctx: &Context, record: &Record) -> Result<(), Infallible> {
        let record_attrs = self.qualify(record.attrs());
        let key_values = KeyValues(
            self.attrs
                .iter()
                .map(|(key, value)| (key.as_str(), value))
                .chain(record_attrs.iter().map(|(key, value)| (key.as_str(), *value)))
                .collect(),
        );
        self.logger.log(
            &log::Record::builder()
                .level(record.level)
                .target(&record.target)
                .module_path(record.module_path.as_deref())
                .file(record.file.as_deref())
                .line(record.line)
                .args(format_args!("{}", record.message))
                .key_values(&key_values)
                .build(),
        );
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Self {
        let mut handler = self.clone();
        handler.attrs.extend(
            self.qualify(attrs)
                .into_iter()
                .map(|(key, value)| (key, value.clone())),
        );
        handler
    }

    /// Put subsequent attributes into the group `name`.
    ///
    /// An empty `name` leaves attributes where they are.
    fn with_group(&self, name: &str) -> Self {
        let mut handler = self.clone();
        if !name.is_empty() {
            if !handler.group.is_empty() {
                handler.group.push('.');
            }
            handler.group.push_str(name);
        }
        handler
    }

    fn flush(&self) {
        self.logger.flush()
    }
}
