// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Spies, fixtures and a capturing logger for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use log::kv::VisitSource;
use log::{Level, Log, Metadata};
use log_context::{attr, Attr, Context, Handler, Record, SharedExtractor};
use thiserror::Error;

pub const FOO_KEY: &str = "foo";
pub const FOO_VALUE: isize = 42;
pub const BAR_KEY: &str = "bar";
pub const BAR_VALUE: &str = "oom";
pub const PIF_KEY: &str = "pif";
pub const PIF_VALUE: bool = true;
pub const GROUP_NAME: &str = "ziz";
pub const TEST_MESSAGE: &str = "this message is a test";

pub fn foo_attr() -> Attr {
    Attr::int(FOO_KEY, FOO_VALUE)
}

pub fn bar_attr() -> Attr {
    Attr::string(BAR_KEY, BAR_VALUE)
}

pub fn pif_attr() -> Attr {
    Attr::bool(PIF_KEY, PIF_VALUE)
}

pub fn foo_extractor() -> SharedExtractor {
    attr(FOO_KEY, |ctx: &Context| ctx.value::<isize>(FOO_KEY).copied()).unwrap()
}

pub fn bar_extractor() -> SharedExtractor {
    attr(BAR_KEY, |ctx: &Context| ctx.value::<String>(BAR_KEY).cloned()).unwrap()
}

pub fn pif_extractor() -> SharedExtractor {
    attr(PIF_KEY, |ctx: &Context| ctx.value::<bool>(PIF_KEY).copied()).unwrap()
}

/// An extractor which never finds anything.
pub fn noop_extractor() -> SharedExtractor {
    attr("noop", |_: &Context| None::<()>).unwrap()
}

/// A context with values for all fixture extractors.
pub fn populated_context() -> Context {
    Context::background()
        .with_value(FOO_KEY, FOO_VALUE)
        .with_value(BAR_KEY, BAR_VALUE.to_string())
        .with_value(PIF_KEY, PIF_VALUE)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("spy failed: {0}")]
pub struct SpyError(pub String);

/// What the spy saw in its last `handle` call.
pub struct Handled {
    pub ctx: Context,
    /// Address of the record passed to the spy.
    pub record_ptr: usize,
    pub record: Record,
}

#[derive(Default)]
pub struct Calls {
    pub enabled: Option<(Context, Level)>,
    pub handled: Option<Handled>,
    pub with_attrs: Vec<Vec<Attr>>,
    pub with_group: Vec<String>,
}

/// A handler which records its calls.
///
/// Handlers derived with `with_attrs` and `with_group` share the calls of
/// the spy they were derived from.
#[derive(Clone, Default)]
pub struct HandlerSpy {
    pub calls: Arc<Mutex<Calls>>,
    pub enabled_returns: bool,
    pub handle_returns: Option<SpyError>,
}

impl HandlerSpy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handled_record(&self) -> Record {
        let calls = self.calls.lock().unwrap();
        calls.handled.as_ref().unwrap().record.clone()
    }

    pub fn handled_record_ptr(&self) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.handled.as_ref().unwrap().record_ptr
    }

    pub fn handled_context(&self) -> Context {
        let calls = self.calls.lock().unwrap();
        calls.handled.as_ref().unwrap().ctx.clone()
    }
}

impl Handler for HandlerSpy {
    type Error = SpyError;

    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.calls.lock().unwrap().enabled = Some((ctx.clone(), level));
        self.enabled_returns
    }

    fn handle(&self, ctx: &Context, record: &Record) -> Result<(), SpyError> {
        self.calls.lock().unwrap().handled = Some(Handled {
            ctx: ctx.clone(),
            record_ptr: record as *const Record as usize,
            record: record.clone(),
        });
        match &self.handle_returns {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Self {
        self.calls.lock().unwrap().with_attrs.push(attrs.to_vec());
        self.clone()
    }

    fn with_group(&self, name: &str) -> Self {
        self.calls.lock().unwrap().with_group.push(name.to_string());
        self.clone()
    }
}

/// A record as seen by a `log` logger.
#[derive(Debug, Clone, PartialEq)]
pub struct Captured {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub key_values: Vec<(String, String)>,
}

impl Captured {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.key_values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct CollectKeyValues<'a>(&'a mut Vec<(String, String)>);

impl<'kvs> VisitSource<'kvs> for CollectKeyValues<'_> {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        self.0.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

/// A logger which keeps all records in memory.
#[derive(Clone, Default)]
pub struct CaptureLog {
    pub records: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureLog {
    pub fn records_for(&self, target: &str) -> Vec<Captured> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.target == target)
            .cloned()
            .collect()
    }
}

impl Log for CaptureLog {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let mut key_values = Vec::new();
        record
            .key_values()
            .visit(&mut CollectKeyValues(&mut key_values))
            .unwrap();
        self.records.lock().unwrap().push(Captured {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            key_values,
        });
    }

    fn flush(&self) {}
}
