use crate::app::carousel::CarouselSettings;
use crate::app::catalogue::CatalogueSettings;
use crate::app::product::ProductSettings;
use crate::core::slides::Breakpoints;
use crate::utils::get_data_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = "config.json";

/// Longest wheel discount, one year
const MAX_GRANT_LIFETIME_HOURS: i64 = 24 * 365;
/// Longest cart time-to-live, ten years
const MAX_CART_LIFETIME_DAYS: i64 = 3650;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete storefront configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "Breakpoints::categories")]
    pub category_breakpoints: Breakpoints,
    #[serde(default = "Breakpoints::subcategories")]
    pub subcategory_breakpoints: Breakpoints,
    /// Auto-advance period of the subcategory carousel
    #[serde(default = "default_interval_ms")]
    pub carousel_interval_ms: u64,
    /// Delay before a clicked category reveals its subcategories
    #[serde(default = "default_debounce_ms")]
    pub reveal_debounce_ms: u64,
    #[serde(default = "default_page_sizes")]
    pub page_sizes: Vec<usize>,
    /// Root categories never shown in the carousel
    #[serde(default = "default_hidden_roots")]
    pub hidden_root_ids: Vec<u64>,
    /// Percentages on the discount wheel
    #[serde(default = "default_wheel_options")]
    pub wheel_options: Vec<u32>,
    #[serde(default = "default_grant_lifetime_hours")]
    pub grant_lifetime_hours: i64,
    /// Sub-category passed to product pages while a wheel discount runs
    #[serde(default = "default_promo_sub_category")]
    pub promo_sub_category_id: Option<u64>,
    #[serde(default = "default_eligible_sub_categories")]
    pub eligible_sub_category_ids: Vec<u64>,
    /// Fraction off the line total, `0.1` for 10%
    #[serde(default = "default_eligibility_rate")]
    pub eligibility_rate: f64,
    #[serde(default = "default_cart_lifetime_days")]
    pub cart_lifetime_days: i64,
    #[serde(default = "default_max_quantity")]
    pub max_quantity: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            category_breakpoints: Breakpoints::categories(),
            subcategory_breakpoints: Breakpoints::subcategories(),
            carousel_interval_ms: default_interval_ms(),
            reveal_debounce_ms: default_debounce_ms(),
            page_sizes: default_page_sizes(),
            hidden_root_ids: default_hidden_roots(),
            wheel_options: default_wheel_options(),
            grant_lifetime_hours: default_grant_lifetime_hours(),
            promo_sub_category_id: default_promo_sub_category(),
            eligible_sub_category_ids: default_eligible_sub_categories(),
            eligibility_rate: default_eligibility_rate(),
            cart_lifetime_days: default_cart_lifetime_days(),
            max_quantity: default_max_quantity(),
        }
    }
}

fn default_interval_ms() -> u64 {
    3000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_page_sizes() -> Vec<usize> {
    vec![8, 16, 24, 32]
}

fn default_hidden_roots() -> Vec<u64> {
    vec![1]
}

fn default_wheel_options() -> Vec<u32> {
    vec![5, 10, 15, 20, 25, 30, 50]
}

fn default_grant_lifetime_hours() -> i64 {
    24
}

#[allow(clippy::unnecessary_wraps)]
fn default_promo_sub_category() -> Option<u64> {
    Some(2)
}

fn default_eligible_sub_categories() -> Vec<u64> {
    vec![2, 3]
}

fn default_eligibility_rate() -> f64 {
    0.1
}

fn default_cart_lifetime_days() -> i64 {
    7
}

fn default_max_quantity() -> u32 {
    99
}

impl AppConfig {
    /// Checks values that would leave a view unusable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.page_sizes.is_empty() || self.page_sizes.contains(&0) {
            return invalid("page sizes must be non-empty and positive");
        }
        if self.wheel_options.is_empty() {
            return invalid("the discount wheel needs at least one option");
        }
        if self.wheel_options.iter().any(|&p| p == 0 || p > 100) {
            return invalid("wheel options must be between 1 and 100 percent");
        }
        if self.carousel_interval_ms == 0 || self.reveal_debounce_ms == 0 {
            return invalid("carousel timings must be positive");
        }
        if !(1..=MAX_GRANT_LIFETIME_HOURS).contains(&self.grant_lifetime_hours) {
            return invalid("grant lifetime must be between 1 hour and 1 year");
        }
        if !(1..=MAX_CART_LIFETIME_DAYS).contains(&self.cart_lifetime_days) {
            return invalid("cart lifetime must be between 1 day and 10 years");
        }
        if !(0.0..1.0).contains(&self.eligibility_rate) {
            return invalid("eligibility rate must be in [0, 1)");
        }
        if self.max_quantity == 0 {
            return invalid("maximum quantity must be positive");
        }
        for breakpoints in [&self.category_breakpoints, &self.subcategory_breakpoints] {
            breakpoints
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }

    pub fn carousel_settings(&self) -> CarouselSettings {
        CarouselSettings {
            root_breakpoints: self.category_breakpoints.clone(),
            sub_breakpoints: self.subcategory_breakpoints.clone(),
            hidden_roots: self.hidden_root_ids.clone(),
            interval: Duration::from_millis(self.carousel_interval_ms),
            debounce: Duration::from_millis(self.reveal_debounce_ms),
        }
    }

    pub fn catalogue_settings(&self) -> CatalogueSettings {
        CatalogueSettings {
            page_sizes: self.page_sizes.clone(),
            promo_sub_category: self.promo_sub_category_id,
        }
    }

    pub fn product_settings(&self) -> ProductSettings {
        ProductSettings {
            eligible_sub_categories: self.eligible_sub_category_ids.clone(),
            eligibility_rate: self.eligibility_rate,
            max_quantity: self.max_quantity,
            cart_lifetime: self.cart_lifetime(),
        }
    }

    /// Grant lifetime, clamped into the range [`AppConfig::validate`] accepts
    pub fn grant_lifetime(&self) -> chrono::Duration {
        chrono::Duration::hours(self.grant_lifetime_hours.clamp(1, MAX_GRANT_LIFETIME_HOURS))
    }

    /// Cart lifetime, clamped into the range [`AppConfig::validate`] accepts
    pub fn cart_lifetime(&self) -> chrono::Duration {
        chrono::Duration::days(self.cart_lifetime_days.clamp(1, MAX_CART_LIFETIME_DAYS))
    }
}

/// Default location of the config file
pub fn config_path() -> Option<PathBuf> {
    get_data_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Saves the config to `path` using an atomic write pattern.
/// 1. Writes to a temporary file next to `path`.
/// 2. Sets restrictive permissions (0o600).
/// 3. Atomically renames to the target path.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written or renamed.
pub async fn save_config_to(path: &Path, config: &AppConfig) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    let temp_path = path.with_extension("json.tmp");

    #[cfg(unix)]
    {
        use tokio::fs::OpenOptions;
        use tokio::io::AsyncWriteExt;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600)
            .open(&temp_path)
            .await?;

        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
    }

    #[cfg(not(unix))]
    {
        use tokio::io::AsyncWriteExt;

        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
    }

    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::StorageFull {
            std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "Disk full: cannot save configuration. Free up space and try again.",
            )
        } else {
            e
        }
    })
}

/// Saves the config to the data directory.
///
/// # Errors
///
/// See [`save_config_to`].
pub async fn save_config(config: &AppConfig) -> std::io::Result<()> {
    match config_path() {
        Some(path) => save_config_to(&path, config).await,
        None => Ok(()),
    }
}

/// Loads the config at `path`; a missing, unreadable or invalid file yields
/// the defaults.
pub async fn load_config_from(path: &Path) -> AppConfig {
    let Ok(json) = tokio::fs::read_to_string(path).await else {
        return AppConfig::default();
    };
    match serde_json::from_str::<AppConfig>(&json) {
        Ok(config) => match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!("Ignoring {}: {e}", path.display());
                AppConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("Ignoring unreadable {}: {e}", path.display());
            AppConfig::default()
        }
    }
}

/// Loads the config from the data directory, or returns the defaults.
pub async fn load_config() -> AppConfig {
    match config_path() {
        Some(path) => load_config_from(&path).await,
        None => AppConfig::default(),
    }
}
