// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Derive attributes from a context.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::value::{Attr, Value};

/// Produce zero or more attributes from a [`Context`].
///
/// An extractor which finds nothing returns an empty vector.
pub trait Extractor: Send + Sync {
    /// Extract attributes from `ctx`.
    fn extract(&self, ctx: &Context) -> Vec<Attr>;
}

/// An extractor shared between handlers and compositions.
pub type SharedExtractor = Arc<dyn Extractor>;

/// An [`Extractor`] backed by a single function.
///
/// Use this for values whose representation [`attr`] does not know about.
pub struct ExtractorFn<F>(pub F);

impl<F> Extractor for ExtractorFn<F>
where
    F: Fn(&Context) -> Vec<Attr> + Send + Sync,
{
    fn extract(&self, ctx: &Context) -> Vec<Attr> {
        (self.0)(ctx)
    }
}

/// Create a shared extractor from a function.
pub fn from_fn<F>(f: F) -> SharedExtractor
where
    F: Fn(&Context) -> Vec<Attr> + Send + Sync + 'static,
{
    Arc::new(ExtractorFn(f))
}

/// Look up a value of type `T` in a context.
///
/// Implemented for all `Fn(&Context) -> Option<T>`; use [`ignore_zero`] and
/// [`log_zero`] for functions which return a bare `T`.
pub trait Lookup<T>: Send + Sync {
    /// Return the value if `ctx` has one.
    fn lookup(&self, ctx: &Context) -> Option<T>;
}

impl<T, F> Lookup<T> for F
where
    F: Fn(&Context) -> Option<T> + Send + Sync,
{
    fn lookup(&self, ctx: &Context) -> Option<T> {
        self(ctx)
    }
}

/// A [`Lookup`] which treats the default value of `T` as not found.
///
/// See [`ignore_zero`].
pub struct IgnoreZero<F>(F);

impl<F> IgnoreZero<F> {
    /// Adapt `lookup`, failing if it is absent.
    pub fn new(lookup: Option<F>) -> Result<Self> {
        lookup.map(Self).ok_or(Error::NilLookup)
    }
}

impl<T, F> Lookup<T> for IgnoreZero<F>
where
    T: Default + PartialEq,
    F: Fn(&Context) -> T + Send + Sync,
{
    fn lookup(&self, ctx: &Context) -> Option<T> {
        Some((self.0)(ctx)).filter(|value| *value != T::default())
    }
}

/// A [`Lookup`] which always finds a value.
///
/// See [`log_zero`].
pub struct LogZero<F>(F);

impl<F> LogZero<F> {
    /// Adapt `lookup`, failing if it is absent.
    pub fn new(lookup: Option<F>) -> Result<Self> {
        lookup.map(Self).ok_or(Error::NilLookup)
    }
}

impl<T, F> Lookup<T> for LogZero<F>
where
    F: Fn(&Context) -> T + Send + Sync,
{
    fn lookup(&self, ctx: &Context) -> Option<T> {
        Some((self.0)(ctx))
    }
}

/// Adapt a function returning a bare value, so that default values are
/// omitted from log records.
///
/// A value counts as default if it compares equal to `T::default()`, so
/// `-0.0` is omitted just like `0.0`.
pub fn ignore_zero<T, F>(lookup: F) -> IgnoreZero<F>
where
    T: Default + PartialEq,
    F: Fn(&Context) -> T + Send + Sync,
{
    IgnoreZero(lookup)
}

/// Adapt a function returning a bare value, so that every value including
/// the default value ends up in log records.
pub fn log_zero<T, F>(lookup: F) -> LogZero<F>
where
    F: Fn(&Context) -> T + Send + Sync,
{
    LogZero(lookup)
}

/// Move `value` into a `U` if `T` and `U` are the same type.
fn cast<T: 'static, U: 'static>(value: T) -> std::result::Result<U, T> {
    let mut slot = Some(value);
    let cast = (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<U>>()
        .and_then(Option::take);
    match (cast, slot) {
        (Some(value), _) => Ok(value),
        (None, Some(value)) => Err(value),
        // The slot is only emptied by a successful cast
        (None, None) => unreachable!(),
    }
}

/// Select how to turn a `T` into a value.
///
/// Known types get their dedicated kind, everything else becomes
/// [`Value::Any`].
fn value_maker<T: Debug + Send + Sync + 'static>() -> fn(T) -> Value {
    let id = TypeId::of::<T>();
    if id == TypeId::of::<bool>() {
        return |v| cast(v).map_or_else(Value::any, Value::Bool);
    }
    if id == TypeId::of::<Duration>() {
        return |v| cast(v).map_or_else(Value::any, Value::Duration);
    }
    if id == TypeId::of::<f64>() {
        return |v| cast(v).map_or_else(Value::any, Value::Float64);
    }
    if id == TypeId::of::<isize>() {
        return |v| cast(v).map_or_else(Value::any, |v: isize| Value::Int64(v as i64));
    }
    if id == TypeId::of::<i64>() {
        return |v| cast(v).map_or_else(Value::any, Value::Int64);
    }
    if id == TypeId::of::<String>() {
        return |v| cast(v).map_or_else(Value::any, Value::String);
    }
    if id == TypeId::of::<DateTime<Utc>>() {
        return |v| cast(v).map_or_else(Value::any, Value::Time);
    }
    if id == TypeId::of::<u64>() {
        return |v| cast(v).map_or_else(Value::any, Value::Uint64);
    }
    Value::any
}

/// An [`Extractor`] producing a single attribute from a [`Lookup`].
pub struct TypedExtractor<T, L> {
    key: Cow<'static, str>,
    lookup: L,
    make_value: fn(T) -> Value,
}

impl<T, L> TypedExtractor<T, L>
where
    T: Debug + Send + Sync + 'static,
    L: Lookup<T>,
{
    /// Create an extractor for `key` from `lookup`.
    ///
    /// Fail if `key` is empty or `lookup` is absent.
    pub fn new<K: Into<Cow<'static, str>>>(key: K, lookup: Option<L>) -> Result<Self> {
        let key = validate_key(key.into())?;
        let lookup = lookup.ok_or(Error::NilLookup)?;
        Ok(Self {
            key,
            lookup,
            make_value: value_maker::<T>(),
        })
    }
}

impl<T, L> Extractor for TypedExtractor<T, L>
where
    L: Lookup<T>,
{
    fn extract(&self, ctx: &Context) -> Vec<Attr> {
        match self.lookup.lookup(ctx) {
            Some(value) => vec![Attr::new(self.key.clone(), (self.make_value)(value))],
            None => Vec::new(),
        }
    }
}

/// Create an extractor which takes the value for `key` from a context.
///
/// The attribute kind follows from `T`:
///
/// - `bool` → [`Value::Bool`]
/// - [`Duration`] → [`Value::Duration`]
/// - `f64` → [`Value::Float64`]
/// - `isize` and `i64` → [`Value::Int64`]
/// - `String` → [`Value::String`]
/// - [`DateTime<Utc>`] → [`Value::Time`]
/// - `u64` → [`Value::Uint64`]
///
/// Any other type becomes [`Value::Any`].
///
/// Fail if `key` is empty.
pub fn attr<K, T, L>(key: K, lookup: L) -> Result<SharedExtractor>
where
    K: Into<Cow<'static, str>>,
    T: Debug + Send + Sync + 'static,
    L: Lookup<T> + 'static,
{
    let extractor = TypedExtractor::new(key, Some(lookup))?;
    Ok(Arc::new(extractor))
}

pub(crate) fn validate_key(key: Cow<'static, str>) -> Result<Cow<'static, str>> {
    if key.is_empty() {
        Err(Error::EmptyKey)
    } else {
        Ok(key)
    }
}
