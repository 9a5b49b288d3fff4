//! Remove temp and cache artifacts.

use snapcrop_common::config::AppConfig;
use snapcrop_common::temp::TempCache;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let cache = TempCache::from_config(&config.storage);
    let temp = cache.clean_temp()?;
    let cached = cache.clean_cache()?;
    println!("Removed {temp} temp artifact(s) and {cached} cached copy(ies)");
    Ok(())
}
