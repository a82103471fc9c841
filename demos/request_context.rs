// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![deny(warnings, clippy::all)]

//! Add request attributes to every record handled for a request.
//!
//! Run with `RUST_LOG=info cargo run --example request_context`; env_logger
//! prints the key-values of each record after its message.

use std::time::Duration;

use log::Level;
use log_context::{
    attr, from_fn, group, ignore_zero, Attr, Context, ContextHandler, Handler, LogHandler, Record,
};

/// A type the attribute lookup doesn't know about.
struct Browser {
    user_agent: String,
    js: bool,
}

fn request_id(ctx: &Context) -> Option<String> {
    ctx.value::<String>("request_id").cloned()
}

fn hostname(ctx: &Context) -> Option<String> {
    ctx.value::<String>("hostname").cloned()
}

fn port(ctx: &Context) -> Option<u64> {
    ctx.value::<u64>("port").copied()
}

fn timeout(ctx: &Context) -> Duration {
    ctx.value::<Duration>("timeout").copied().unwrap_or_default()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = env_logger::Builder::from_default_env().build();
    log::set_max_level(logger.filter());

    let browser = from_fn(|ctx: &Context| match ctx.value::<Browser>("browser") {
        Some(browser) => vec![
            Attr::string("user-agent", browser.user_agent.clone()),
            Attr::bool("js", browser.js),
        ],
        None => Vec::new(),
    });

    let handler = ContextHandler::new(
        LogHandler::new(logger),
        vec![
            attr("request_id", request_id)?,
            group(
                "config",
                vec![
                    attr("hostname", hostname)?,
                    attr("port", port)?,
                    attr("timeout", ignore_zero(timeout))?,
                ],
            )?,
            group("browser", vec![browser])?,
        ],
    )?;

    handler.handle(
        &Context::background(),
        &Record::new(Level::Info, "starting up").with_target("request_context"),
    )?;

    let ctx = Context::background()
        .with_value("request_id", "4711".to_string())
        .with_value("hostname", "example.com".to_string())
        .with_value("port", 8443_u64)
        .with_value(
            "browser",
            Browser {
                user_agent: "curl/8.4.0".to_string(),
                js: false,
            },
        );
    let handler = handler.with_group("request");
    handler.handle(
        &ctx,
        &Record::new(Level::Info, "handling request").with_target("request_context"),
    )?;
    handler.flush();
    Ok(())
}
