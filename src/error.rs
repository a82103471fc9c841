// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors raised while wiring up extractors and handlers.

use thiserror::Error;

/// A wiring mistake detected while constructing an extractor or handler.
///
/// None of these errors can occur while extracting attributes or handling
/// records; they all indicate a bug in the setup code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An attribute or group key was empty.
    #[error("key is empty")]
    EmptyKey,

    /// No lookup function was given.
    #[error("lookup is nil")]
    NilLookup,

    /// A composition received no extractors at all.
    #[error("received 0 extractors")]
    NoExtractors,

    /// The single extractor given to a composition was absent.
    #[error("extractor is nil")]
    NilExtractor,

    /// Some extractors in a list were absent.
    ///
    /// `positions` holds the 1-based positions of all absent extractors
    /// among `total` extractors.
    #[error("{}", nil_positions_message(.positions, .total))]
    NilExtractors {
        /// 1-based positions of the absent extractors.
        positions: Vec<usize>,
        /// The number of extractors in the list.
        total: usize,
    },

    /// The target handler was absent.
    #[error("target is nil")]
    NilTarget,
}

fn nil_positions_message(positions: &[usize], total: &usize) -> String {
    positions
        .iter()
        .map(|position| format!("extractor {} of {} is nil", position, total))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for constructors in this crate.
pub type Result<T> = std::result::Result<T, Error>;
