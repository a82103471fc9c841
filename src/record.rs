// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Log records passed to handlers.

use chrono::{DateTime, Utc};
use log::kv::{Error, Key, Value, VisitSource};
use log::Level;

use crate::value::Attr;

/// A single log event.
///
/// Cloning a record yields an independent copy; handlers which need to add
/// attributes clone first and never change the record they were given.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// When the event happened.
    pub time: DateTime<Utc>,
    /// The level of this event.
    pub level: Level,
    /// The log message.
    pub message: String,
    /// The target of the event, see [`log::Record::target`].
    pub target: String,
    /// The module path the event originates from, if known.
    pub module_path: Option<String>,
    /// The source file the event originates from, if known.
    pub file: Option<String>,
    /// The line the event originates from, if known.
    pub line: Option<u32>,
    attrs: Vec<Attr>,
}

impl Record {
    /// Create a record for `message` at `level` with the current time.
    pub fn new<M: Into<String>>(level: Level, message: M) -> Self {
        Self {
            time: Utc::now(),
            level,
            message: message.into(),
            target: String::new(),
            module_path: None,
            file: None,
            line: None,
            attrs: Vec::new(),
        }
    }

    /// Set the target of this record.
    pub fn with_target<T: Into<String>>(mut self, target: T) -> Self {
        self.target = target.into();
        self
    }

    /// Set the time of this record.
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// Add `attrs` to this record and return it.
    pub fn with_attrs<I: IntoIterator<Item = Attr>>(mut self, attrs: I) -> Self {
        self.add_attrs(attrs);
        self
    }

    /// Append `attrs` after all attributes already on this record.
    pub fn add_attrs<I: IntoIterator<Item = Attr>>(&mut self, attrs: I) {
        self.attrs.extend(attrs);
    }

    /// The attributes of this record, in order.
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// The number of attributes on this record.
    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }

    /// Convert a record of the `log` facade.
    ///
    /// Key-values of `record` become attributes of the closest kind.
    pub fn from_log(record: &log::Record) -> Self {
        let mut attrs = Vec::with_capacity(record.key_values().count());
        // Our visitor never fails, so there's nothing to handle here
        let _ = record
            .key_values()
            .visit(&mut CollectAttrs(&mut attrs));
        Self {
            time: Utc::now(),
            level: record.level(),
            message: record.args().to_string(),
            target: record.target().to_string(),
            module_path: record.module_path().map(ToString::to_string),
            file: record.file().map(ToString::to_string),
            line: record.line(),
            attrs,
        }
    }
}

struct CollectAttrs<'a>(&'a mut Vec<Attr>);

impl<'kvs> VisitSource<'kvs> for CollectAttrs<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), Error> {
        self.0.push(Attr::new(key.as_str().to_string(), value.into()));
        Ok(())
    }
}
