// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Combine extractors.

use std::borrow::Cow;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::extract::{validate_key, Extractor, SharedExtractor};
use crate::value::{Attr, Value};

/// Runs several extractors in order and joins their attributes.
struct Concat(Vec<SharedExtractor>);

impl Extractor for Concat {
    fn extract(&self, ctx: &Context) -> Vec<Attr> {
        let mut attrs = Vec::with_capacity(self.0.len());
        for extractor in &self.0 {
            attrs.extend(extractor.extract(ctx));
        }
        attrs
    }
}

/// Combine `extractors` into a single extractor.
///
/// The combined extractor returns the attributes of all `extractors` in
/// order.  A single extractor is returned as is.
///
/// Each item may be an extractor or an `Option` of one; fail if there are no
/// extractors, or if any of them is `None`.
pub fn concat<I, E>(extractors: I) -> Result<SharedExtractor>
where
    I: IntoIterator<Item = E>,
    E: Into<Option<SharedExtractor>>,
{
    let mut extractors: Vec<Option<SharedExtractor>> =
        extractors.into_iter().map(Into::into).collect();
    match extractors.len() {
        0 => Err(Error::NoExtractors),
        1 => extractors.pop().flatten().ok_or(Error::NilExtractor),
        total => {
            let positions: Vec<usize> = extractors
                .iter()
                .enumerate()
                .filter(|(_, extractor)| extractor.is_none())
                .map(|(index, _)| index + 1)
                .collect();
            if positions.is_empty() {
                Ok(Arc::new(Concat(extractors.into_iter().flatten().collect())))
            } else {
                Err(Error::NilExtractors { positions, total })
            }
        }
    }
}

/// Wraps all attributes of an extractor in a single group attribute.
struct Group {
    key: Cow<'static, str>,
    extractor: SharedExtractor,
}

impl Extractor for Group {
    fn extract(&self, ctx: &Context) -> Vec<Attr> {
        let attrs = self.extractor.extract(ctx);
        if attrs.is_empty() {
            Vec::new()
        } else {
            vec![Attr::new(self.key.clone(), Value::Group(attrs))]
        }
    }
}

/// Put the attributes of all `extractors` into a group named `key`.
///
/// The group extractor returns a single group attribute, or nothing at all if
/// `extractors` found nothing; it never returns an empty group.
///
/// Fail if `key` is empty, and under the same conditions as [`concat`].
pub fn group<K, I, E>(key: K, extractors: I) -> Result<SharedExtractor>
where
    K: Into<Cow<'static, str>>,
    I: IntoIterator<Item = E>,
    E: Into<Option<SharedExtractor>>,
{
    let key = validate_key(key.into())?;
    Ok(Arc::new(Group {
        key,
        extractor: concat(extractors)?,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use similar_asserts::assert_eq;

    use crate::context::Context;
    use crate::error::Error;
    use crate::extract::{attr, from_fn, SharedExtractor};
    use crate::value::Attr;

    fn foo() -> SharedExtractor {
        attr("foo", |ctx: &Context| ctx.value::<isize>("foo").copied()).unwrap()
    }

    fn bar() -> SharedExtractor {
        attr("bar", |ctx: &Context| ctx.value::<String>("bar").cloned()).unwrap()
    }

    fn populated() -> Context {
        Context::background()
            .with_value("foo", 42_isize)
            .with_value("bar", "oom".to_string())
    }

    #[test]
    fn concat_nothing() {
        let extractors: Vec<SharedExtractor> = Vec::new();
        assert_eq!(super::concat(extractors).err(), Some(Error::NoExtractors));
    }

    #[test]
    fn concat_one_returns_it() {
        let foo = foo();
        let concatenated = super::concat(vec![foo.clone()]).unwrap();
        assert!(Arc::ptr_eq(&foo, &concatenated));
    }

    #[test]
    fn concat_one_absent() {
        assert_eq!(
            super::concat(vec![None::<SharedExtractor>]).err(),
            Some(Error::NilExtractor)
        );
    }

    #[test]
    fn concat_reports_all_absent_positions() {
        let error = super::concat(vec![Some(foo()), None, Some(bar()), None])
            .err()
            .unwrap();
        assert_eq!(
            error,
            Error::NilExtractors {
                positions: vec![2, 4],
                total: 4
            }
        );
        assert_eq!(
            error.to_string(),
            "extractor 2 of 4 is nil, extractor 4 of 4 is nil"
        );
    }

    #[test]
    fn concat_keeps_order() {
        let pair = from_fn(|_| vec![Attr::int("a", 1), Attr::int("b", 2)]);
        let nothing = from_fn(|_| Vec::new());
        let concatenated = super::concat(vec![bar(), nothing, pair, foo()]).unwrap();
        assert_eq!(
            concatenated.extract(&populated()),
            vec![
                Attr::string("bar", "oom"),
                Attr::int("a", 1),
                Attr::int("b", 2),
                Attr::int("foo", 42),
            ]
        );
    }

    #[test]
    fn group_populated() {
        let group = super::group("cfg", vec![foo(), bar()]).unwrap();
        assert_eq!(
            group.extract(&populated()),
            vec![Attr::group(
                "cfg",
                vec![Attr::int("foo", 42), Attr::string("bar", "oom")]
            )]
        );
    }

    #[test]
    fn group_empty_context() {
        let group = super::group("cfg", vec![foo(), bar()]).unwrap();
        assert_eq!(group.extract(&Context::background()), Vec::<Attr>::new());
    }

    #[test]
    fn group_partially_populated() {
        let group = super::group("cfg", vec![foo(), bar()]).unwrap();
        let ctx = Context::background().with_value("bar", "oom".to_string());
        assert_eq!(
            group.extract(&ctx),
            vec![Attr::group("cfg", vec![Attr::string("bar", "oom")])]
        );
    }

    #[test]
    fn nested_groups_stay_nested() {
        let inner = super::group("inner", vec![foo()]).unwrap();
        let outer = super::group("outer", vec![inner, bar()]).unwrap();
        assert_eq!(
            outer.extract(&populated()),
            vec![Attr::group(
                "outer",
                vec![
                    Attr::group("inner", vec![Attr::int("foo", 42)]),
                    Attr::string("bar", "oom"),
                ]
            )]
        );
    }

    #[test]
    fn group_empty_key() {
        assert_eq!(
            super::group("", vec![foo()]).err(),
            Some(Error::EmptyKey)
        );
        let extractors: Vec<SharedExtractor> = Vec::new();
        assert_eq!(super::group("", extractors).err(), Some(Error::EmptyKey));
    }

    #[test]
    fn group_propagates_concat_errors() {
        let extractors: Vec<SharedExtractor> = Vec::new();
        assert_eq!(
            super::group("ziz", extractors).err(),
            Some(Error::NoExtractors)
        );
        assert_eq!(
            super::group("ziz", vec![None::<SharedExtractor>]).err(),
            Some(Error::NilExtractor)
        );
        assert_eq!(
            super::group("ziz", vec![Some(foo()), None, Some(bar())])
                .err()
                .map(|error| error.to_string()),
            Some("extractor 2 of 3 is nil".to_string())
        );
    }
}
