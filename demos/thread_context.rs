// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![deny(warnings, clippy::all)]

//! Use the context handler behind the `log` macros.
//!
//! The handler takes the context of each record from the context entered
//! on the current thread.

use log::{info, warn, LevelFilter};
use log_context::{attr, log_zero, Context, ContextHandler, LogHandler};

fn attempt(ctx: &Context) -> u64 {
    ctx.value::<u64>("attempt").copied().unwrap_or_default()
}

fn main() {
    let logger = env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .build();
    ContextHandler::new(
        LogHandler::new(logger),
        vec![
            attr("user", |ctx: &Context| ctx.value::<String>("user").cloned()).unwrap(),
            attr("attempt", log_zero(attempt)).unwrap(),
        ],
    )
    .unwrap()
    .install()
    .unwrap();
    log::set_max_level(LevelFilter::Info);

    info!(hello = "world"; "An info message without context");

    let ctx = Context::background().with_value("user", "jane".to_string());
    ctx.scope(|| {
        info!("logged in");
        let _retry = ctx.with_value("attempt", 2_u64).enter();
        warn!("retrying");
    });
}
