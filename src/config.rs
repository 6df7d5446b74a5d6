use clap::Parser;
use std::env;

/// Community Q&A web service API
#[derive(Parser, Debug, PartialEq)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    /// Which errors we want to log (info, warn or error)
    #[clap(short, long, default_value = "warn")]
    pub log_level: String,
    /// Which PORT the server is listening to
    #[clap(short, long, default_value = "8080")]
    pub port: u16,
    /// Database user
    #[clap(long, default_value = "username")]
    pub db_user: String,
    /// Database password
    #[clap(long, default_value = "password")]
    pub db_password: String,
    /// URL for the postgres database
    #[clap(long, default_value = "localhost")]
    pub db_host: String,
    /// PORT number for the database connection
    #[clap(long, default_value = "5432")]
    pub db_port: u16,
    /// Database name
    #[clap(long, default_value = "dev_commons")]
    pub db_name: String,
    /// Base URL of the hosted assistant prompt service
    #[clap(long, default_value = "https://assistant.example.com")]
    pub assistant_api_url: String,
    /// Base URL of the media bucket for question images
    #[clap(long, default_value = "https://media.example.com")]
    pub media_bucket_url: String,
}

impl Config {
    pub fn new() -> Result<Config, handle_errors::Error> {
        let config = Config::parse();

        if env::var("ASSISTANT_API_KEY").is_err() {
            panic!("Assistant API key not set");
        }

        if env::var("PASETO_KEY").is_err() {
            panic!("PASETO_KEY not set");
        }

        let port = std::env::var("PORT")
            .ok()
            .map(|val| val.parse::<u16>())
            .unwrap_or(Ok(config.port))
            .map_err(handle_errors::Error::ParseError)?;

        let db_user = env::var("POSTGRES_USER").unwrap_or(config.db_user.to_owned());
        let db_password = env::var("POSTGRES_PASSWORD").unwrap_or(config.db_password.to_owned());
        let db_host = env::var("POSTGRES_HOST").unwrap_or(config.db_host.to_owned());
        let db_port = env::var("POSTGRES_PORT").unwrap_or(config.db_port.to_string());
        let db_name = env::var("POSTGRES_DB").unwrap_or(config.db_name.to_owned());
        let assistant_api_url =
            env::var("ASSISTANT_API_URL").unwrap_or(config.assistant_api_url.to_owned());
        let media_bucket_url =
            env::var("MEDIA_BUCKET_URL").unwrap_or(config.media_bucket_url.to_owned());

        Ok(Config {
            log_level: config.log_level,
            port,
            db_user,
            db_password,
            db_host,
            db_port: db_port
                .parse::<u16>()
                .map_err(handle_errors::Error::ParseError)?,
            db_name,
            assistant_api_url,
            media_bucket_url,
        })
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    fn set_env() {
        unsafe { env::set_var("ASSISTANT_API_KEY", "yes") };
        unsafe { env::set_var("PASETO_KEY", "RANDOM WORDS WINTER MACINTOSH PC") };
        unsafe { env::set_var("POSTGRES_USER", "user") };
        unsafe { env::set_var("POSTGRES_PASSWORD", "pass") };
        unsafe { env::set_var("POSTGRES_HOST", "localhost") };
        unsafe { env::set_var("POSTGRES_PORT", "5432") };
        unsafe { env::set_var("POSTGRES_DB", "dev_commons") };
    }

    #[test]
    fn unset_and_set_api_key() {
        // ENV variables are not set
        let result = std::panic::catch_unwind(Config::new);
        assert!(result.is_err());

        // Now we set them
        set_env();

        let expected = Config {
            log_level: "warn".to_string(),
            port: 8080,
            db_user: "user".to_string(),
            db_password: "pass".to_string(),
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_name: "dev_commons".to_string(),
            assistant_api_url: "https://assistant.example.com".to_string(),
            media_bucket_url: "https://media.example.com".to_string(),
        };

        let config = Config::new().unwrap();

        assert_eq!(config, expected);
    }
}
