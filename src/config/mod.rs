//! Configuration management

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

/// Load configuration: defaults, then an optional `nowplaying` config file
/// in the working directory, then `NOWPLAYING_*` environment variables.
pub fn load_config() -> Result<Config> {
    let mut builder = ::config::Config::builder()
        .set_default("port", 8080)?
        .add_source(::config::File::with_name("nowplaying").required(false))
        .add_source(::config::Environment::with_prefix("NOWPLAYING").try_parsing(true));

    // Port precedence: NOWPLAYING_PORT > PORT > config file > default.
    // Plain PORT is honored for container and supervisor environments.
    if let Ok(port) = std::env::var("NOWPLAYING_PORT") {
        if let Ok(port_num) = port.parse::<u16>() {
            builder = builder.set_override("port", i64::from(port_num))?;
        }
    } else if let Ok(port) = std::env::var("PORT") {
        if let Ok(port_num) = port.parse::<u16>() {
            builder = builder.set_override("port", i64::from(port_num))?;
        }
    }

    Ok(builder.build()?.try_deserialize()?)
}
