use serde::Deserialize;

const CONFIG_FILE: &str = "yatube";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub web_host: String,
    pub web_port: u16,
    /// Number of posts shown on every paginated listing.
    pub page_limit: u32,
    pub media_root: String,
    pub static_root: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads settings from defaults, an optional `yatube.toml`, then the
    /// environment (after `.env` has been read into it).
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("web_host", "0.0.0.0")?
            .set_default("web_port", 3000)?
            .set_default("page_limit", 10)?
            .set_default("media_root", "./media")?
            .set_default("static_root", "./static")?
            .set_default("log_format", "text")?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize::<Self>()?;

        if config.page_limit == 0 {
            return Err(crate::Error::Internal(
                "PAGE_LIMIT must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn web_addr(&self) -> String {
        format!("{}:{}", self.web_host, self.web_port)
    }
}
