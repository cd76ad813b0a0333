use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, SeedEntry, SitemapConfig, UserAgentConfig,
};
use crate::url::UrlRoot;
use crate::ConfigError;
use url::Url;

/// Maximum number of worker threads
const MAX_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_sitemap_config(&config.sitemap)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates sitemap configuration
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    for path in &config.paths {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sitemap paths cannot contain empty entries".to_string(),
            ));
        }

        if path.contains("://") {
            return Err(ConfigError::Validation(format!(
                "sitemap path '{}' must be relative to the site root",
                path
            )));
        }
    }

    if let Some(dir) = &config.temp_dir {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "temp-dir cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates seed entries
///
/// Each seed URL must have an http(s) root, and each start-URL sitemap must
/// live on that same root.
fn validate_seeds(seeds: &[SeedEntry]) -> Result<(), ConfigError> {
    for seed in seeds {
        let root = UrlRoot::parse(&seed.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed.url, e)))?;

        for sitemap in &seed.sitemaps {
            Url::parse(sitemap).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid sitemap URL '{}': {}", sitemap, e))
            })?;

            if !root.contains(sitemap) {
                return Err(ConfigError::Validation(format!(
                    "Sitemap '{}' is not on the root of seed '{}' ({})",
                    sitemap, seed.url, root
                )));
            }
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
