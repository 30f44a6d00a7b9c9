//! Resolve command - run the request pipeline for URLs

use crate::cli::args::ResolveArgs;
use crate::config::{self, Config};
use crate::error::ThumbResult;
use crate::handler::{Handler, Outcome, Request};
use crate::transform::RasterEngine;
use console::style;
use std::sync::Arc;

/// Execute the resolve command
///
/// Populates the variant cache as a side effect, so it doubles as a cache
/// warmer for known-hot URLs.
pub async fn execute(args: ResolveArgs, config: &Config) -> ThumbResult<()> {
    let mut config = config.clone();
    if args.serve_static {
        config.assets.serve_static = true;
    }
    config::validate(&config)?;

    let engine = Arc::new(RasterEngine::new(&config.engine)?);
    let handler = Handler::new(config, engine);

    for url in &args.urls {
        let request = Request::from_url(url);
        match handler.handle(&request).await {
            Outcome::Serve(path) => {
                println!("{} {} {}", style("serve").green(), url, path.display());
            }
            Outcome::PassThrough => {
                println!("{} {}", style("pass-through").dim(), url);
            }
        }
    }

    Ok(())
}
