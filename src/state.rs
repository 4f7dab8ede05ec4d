use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::core::compress::CompressionClient;
use crate::core::fulfillment::FulfillmentClient;
use crate::core::generation::{GenerationClient, PollPolicy};
#[cfg(feature = "watermark")]
use crate::core::watermark::Watermarker;
use crate::error::{AppError, Result};
use crate::models::generation::{TextToImageParams, UpscaleParams};
use crate::models::watermark::{Placement, WatermarkSettings};

/// Configuration for the application, read once at startup
#[derive(Clone, Debug)]
pub struct Config {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Secret expected in the `x-api-key` header of gated routes
    pub server_api_key: String,
    /// Generation API settings
    pub generation: GenerationConfig,
    /// Fulfillment API settings
    pub fulfillment: FulfillmentConfig,
    /// Compression service, off when `None`
    pub compression: Option<CompressionConfig>,
    /// CDN upload, off when `None`
    pub cdn: Option<CdnConfig>,
    /// Watermarking of face-swap results, off when `None`
    pub watermark: Option<WatermarkConfig>,
    /// CSV file served by the country list route
    pub countries_path: PathBuf,
    /// Delay before the keep-alive route answers
    pub keep_alive_delay: Duration,
}

/// Generation API configuration
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// API base url, without a trailing slash
    pub base_url: String,
    /// Value of the `API-Key` header
    pub api_key: String,
    /// Cadence and bound of the status poll
    pub poll: PollPolicy,
    /// Text-to-image model parameters
    pub text_to_image: TextToImageParams,
    /// Upscale model parameters
    pub upscale: UpscaleParams,
}

/// Fulfillment API configuration
#[derive(Clone, Debug)]
pub struct FulfillmentConfig {
    /// API base url, without a trailing slash
    pub base_url: String,
    /// Shop that owns created products
    pub shop_id: String,
    /// Image id placed on every print position other than the front
    pub placeholder_image_id: String,
}

/// Compression service configuration
#[derive(Clone, Debug)]
pub struct CompressionConfig {
    /// API base url, without a trailing slash
    pub base_url: String,
    /// API key, sent as the basic-auth password
    pub api_key: String,
}

/// CDN upload configuration
#[derive(Clone, Debug)]
pub struct CdnConfig {
    /// Upload endpoint
    pub upload_url: String,
    /// Private key, sent as the basic-auth user name
    pub private_key: String,
}

/// Watermark configuration
#[derive(Clone, Debug)]
pub struct WatermarkConfig {
    /// Raster watermark asset
    pub asset_path: PathBuf,
    /// Compositing settings
    pub settings: WatermarkSettings,
}

/// Typed access to configuration values by name
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.get(key)
            .ok_or_else(|| AppError::Config(format!("{} must be set", key)))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| AppError::Config(format!("{} is invalid ({}): {}", key, raw, e)))
            })
            .transpose()
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.parse(key)?.unwrap_or(default))
    }

    fn list<T>(&self, key: &str) -> Result<Vec<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(raw) = self.get(key) else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                item.parse::<T>()
                    .map_err(|e| AppError::Config(format!("{} has an invalid item ({}): {}", key, item, e)))
            })
            .collect()
    }

    fn url(&self, key: &str, default: &str) -> String {
        self.or(key, default).trim_end_matches('/').to_string()
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_env()
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let poll = PollPolicy {
            interval: Duration::from_millis(vars.parse_or("POLL_INTERVAL_MS", 2000u64)?),
            max_attempts: vars.parse_or("POLL_MAX_ATTEMPTS", 150u32)?,
        };
        if poll.max_attempts == 0 {
            return Err(AppError::Config("POLL_MAX_ATTEMPTS must be at least 1".into()));
        }

        let text_to_image = TextToImageParams {
            model_id: vars.get("MODEL_ID"),
            negative_prompt: vars.get("NEGATIVE_PROMPT"),
            num_inference_step: vars.parse("NUM_INFERENCE_STEP")?,
            samples: vars.parse("SAMPLES")?,
            guidance_scale: vars.parse("GUIDANCE_SCALE")?,
            width: vars.parse("WIDTH")?,
            height: vars.parse("HEIGHT")?,
            lora_models: vars.list("LORA_MODELS")?,
            lora_weights: vars.list("LORA_WEIGHTS")?,
            scheduler: vars.get("SCHEDULER"),
            seed: vars.parse("SEED")?,
            clip_skip: vars.parse("CLIP_SKIP")?,
            safety_checker: vars.get("SAFETY_CHECKER").as_deref() == Some("true"),
            ip_adapter_image: vars.get("IP_ADAPTER_IMAGE"),
            ip_adapter: vars.list("IP_ADAPTER")?,
            ip_adapter_scale: vars.list("IP_ADAPTER_SCALE")?,
            webhook: vars.get("WEBHOOK"),
        };

        let upscale_defaults = UpscaleParams::default();
        let upscale = UpscaleParams {
            model_name: vars.or("UPSCALE_MODEL", &upscale_defaults.model_name),
            scale_factor: vars.parse_or("UPSCALE_FACTOR", upscale_defaults.scale_factor)?,
            tile: vars.parse_or("UPSCALE_TILE", upscale_defaults.tile)?,
        };

        let generation = GenerationConfig {
            base_url: vars.url("GENERATION_API_URL", "https://api.imagepipeline.io"),
            api_key: vars.required("API_KEY")?,
            poll,
            text_to_image,
            upscale,
        };

        let fulfillment = FulfillmentConfig {
            base_url: vars.url("FULFILLMENT_API_URL", "https://api.printify.com"),
            shop_id: vars.or("PRINTIFY_SHOP_ID", "14354198"),
            placeholder_image_id: vars.or("PLACEHOLDER_IMAGE_ID", "6751df108e4ed254fc7d1019"),
        };

        let compression = vars.get("TINIFY_API_KEY").map(|api_key| CompressionConfig {
            base_url: vars.url("COMPRESSION_API_URL", "https://api.tinify.com"),
            api_key,
        });

        let cdn = vars.get("IMAGEKIT_PRIVATE_KEY").map(|private_key| CdnConfig {
            upload_url: vars.or(
                "IMAGEKIT_UPLOAD_URL",
                "https://upload.imagekit.io/api/v1/files/upload",
            ),
            private_key,
        });

        let watermark = match vars.get("WATERMARK_PATH") {
            Some(path) => {
                if cdn.is_none() {
                    return Err(AppError::Config(
                        "WATERMARK_PATH requires IMAGEKIT_PRIVATE_KEY for uploads".into(),
                    ));
                }
                let defaults = WatermarkSettings::default();
                let opacity: f32 = vars.parse_or("WATERMARK_OPACITY", defaults.opacity)?;
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(AppError::Config(format!(
                        "WATERMARK_OPACITY must be between 0 and 1, got {}",
                        opacity
                    )));
                }
                let scale_fraction: f32 = vars.parse_or("WATERMARK_SCALE", defaults.scale_fraction)?;
                if !(scale_fraction > 0.0 && scale_fraction <= 1.0) {
                    return Err(AppError::Config(format!(
                        "WATERMARK_SCALE must be in (0, 1], got {}",
                        scale_fraction
                    )));
                }
                let placement: Placement = vars.parse_or("WATERMARK_PLACEMENT", defaults.placement)?;
                Some(WatermarkConfig {
                    asset_path: PathBuf::from(path),
                    settings: WatermarkSettings {
                        opacity,
                        placement,
                        scale_fraction,
                    },
                })
            }
            None => None,
        };

        Ok(Self {
            host: vars.or("HOST", "0.0.0.0"),
            port: vars.parse_or("PORT", 8080u16)?,
            server_api_key: vars.required("SERVER_API_KEY")?,
            generation,
            fulfillment,
            compression,
            cdn,
            watermark,
            countries_path: PathBuf::from(vars.or("COUNTRIES_PATH", "./countryList.csv")),
            keep_alive_delay: Duration::from_millis(vars.parse_or("KEEP_ALIVE_DELAY_MS", 2000u64)?),
        })
    }
}

/// Application state that can be shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Generation API client
    pub generation: GenerationClient,
    /// Fulfillment API client
    pub fulfillment: FulfillmentClient,
    /// Compression client, when configured
    pub compressor: Option<CompressionClient>,
    /// Watermark pipeline, when configured
    #[cfg(feature = "watermark")]
    pub watermarker: Option<Watermarker>,
}

impl AppState {
    /// Build the shared HTTP client and every upstream client from `config`
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self::with_client(config, http))
    }

    /// Build the state around an existing HTTP client
    pub fn with_client(config: Config, http: reqwest::Client) -> Arc<Self> {
        let generation = GenerationClient::new(http.clone(), &config.generation);
        let fulfillment = FulfillmentClient::new(http.clone(), &config.fulfillment);
        let compressor = config
            .compression
            .as_ref()
            .map(|c| CompressionClient::new(http.clone(), c));

        #[cfg(feature = "watermark")]
        let watermarker = match (&config.watermark, &config.cdn) {
            (Some(watermark), Some(cdn)) => Some(Watermarker::new(http.clone(), watermark, cdn)),
            _ => None,
        };

        Arc::new(Self {
            config: Arc::new(config),
            generation,
            fulfillment,
            compressor,
            #[cfg(feature = "watermark")]
            watermarker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const MINIMAL: [(&str, &str); 2] = [("SERVER_API_KEY", "secret"), ("API_KEY", "gen-key")];

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&MINIMAL)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.server_api_key, "secret");
        assert_eq!(config.generation.base_url, "https://api.imagepipeline.io");
        assert_eq!(config.generation.poll.interval, Duration::from_secs(2));
        assert_eq!(config.generation.poll.max_attempts, 150);
        assert_eq!(config.generation.upscale, UpscaleParams::default());
        assert_eq!(config.fulfillment.shop_id, "14354198");
        assert!(config.compression.is_none());
        assert!(config.cdn.is_none());
        assert!(config.watermark.is_none());
        assert_eq!(config.countries_path, PathBuf::from("./countryList.csv"));
        assert!(!config.generation.text_to_image.safety_checker);
    }

    #[test]
    fn missing_keys_are_rejected() {
        let err = Config::from_lookup(lookup(&[("API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("SERVER_API_KEY")));

        let err = Config::from_lookup(lookup(&[("SERVER_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("API_KEY")));
    }

    #[test]
    fn text_to_image_params_and_lists() {
        let mut pairs = MINIMAL.to_vec();
        pairs.extend([
            ("MODEL_ID", "sdxl-base"),
            ("SAMPLES", "2"),
            ("GUIDANCE_SCALE", "7.5"),
            ("LORA_MODELS", "a, b"),
            ("LORA_WEIGHTS", "0.5,1"),
            ("SAFETY_CHECKER", "true"),
            ("SEED", "-1"),
        ]);
        let params = Config::from_lookup(lookup(&pairs)).unwrap().generation.text_to_image;

        assert_eq!(params.model_id.as_deref(), Some("sdxl-base"));
        assert_eq!(params.samples, Some(2));
        assert_eq!(params.guidance_scale, Some(7.5));
        assert_eq!(params.lora_models, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(params.lora_weights, vec![0.5, 1.0]);
        assert!(params.safety_checker);
        assert_eq!(params.seed, Some(-1));
        assert_eq!(params.width, None);
    }

    #[test]
    fn invalid_numbers_are_config_errors() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("POLL_INTERVAL_MS", "soon"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("POLL_INTERVAL_MS")));
    }

    #[test]
    fn base_urls_lose_trailing_slash() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("GENERATION_API_URL", "http://127.0.0.1:9000/"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.generation.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn watermark_requires_cdn() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("WATERMARK_PATH", "logo.png"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(AppError::Config(_))
        ));

        pairs.extend([
            ("IMAGEKIT_PRIVATE_KEY", "private_x"),
            ("WATERMARK_PLACEMENT", "corner"),
            ("WATERMARK_OPACITY", "0.8"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        let watermark = config.watermark.unwrap();
        assert_eq!(watermark.asset_path, PathBuf::from("logo.png"));
        assert_eq!(watermark.settings.placement, Placement::Corner { padding: 10 });
        assert_eq!(watermark.settings.opacity, 0.8);
        assert_eq!(watermark.settings.scale_fraction, 0.3);
        assert_eq!(
            config.cdn.unwrap().upload_url,
            "https://upload.imagekit.io/api/v1/files/upload"
        );
    }

    #[test]
    fn opacity_out_of_range() {
        let mut pairs = MINIMAL.to_vec();
        pairs.extend([
            ("WATERMARK_PATH", "logo.png"),
            ("IMAGEKIT_PRIVATE_KEY", "k"),
            ("WATERMARK_OPACITY", "1.5"),
        ]);
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn env_example_starts_with_only_required_keys() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/.env.example");
        let mut vars: HashMap<String, String> = dotenv::from_path_iter(path)
            .unwrap()
            .map(|item| item.unwrap())
            .collect();
        vars.insert("SERVER_API_KEY".into(), "secret".into());
        vars.insert("API_KEY".into(), "gen-key".into());

        let config = Config::from_lookup(move |key: &str| vars.get(key).cloned()).unwrap();
        assert!(config.watermark.is_none());
        assert!(config.cdn.is_none());
        assert!(config.compression.is_none());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn compression_enabled_by_key() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("TINIFY_API_KEY", "tiny"));
        let compression = Config::from_lookup(lookup(&pairs)).unwrap().compression.unwrap();
        assert_eq!(compression.api_key, "tiny");
        assert_eq!(compression.base_url, "https://api.tinify.com");
    }
}
