//! Key command - print the cache key for a URL's query

use crate::cache;
use crate::cli::args::KeyArgs;
use crate::config::Config;
use crate::error::ThumbResult;
use crate::handler::Request;

/// Execute the key command
pub async fn execute(args: KeyArgs, config: &Config) -> ThumbResult<()> {
    let request = Request::from_url(&args.url);
    let hashed = args.hashed || config.cache.hashed_keys;

    println!("{}", cache::cache_key(request.params(), hashed));
    Ok(())
}
