use secrecy::SecretString;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub email: EmailConfig,
    pub security: SecurityConfig,
    pub swagger: SwaggerConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Signing secret and per-namespace token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub admin_token_expiry_minutes: i64,
    pub user_password_token_expiry_minutes: i64,
    pub user_pin_token_expiry_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub ttl_seconds: u64,
    /// Wrong guesses allowed before a code is burned.
    pub max_attempts: u32,
}

/// Transactional email API settings.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: SecretString,
    pub from_address: String,
    pub from_name: String,
    pub max_attempts: u32,
    pub retry_delay_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl EmailConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
    /// Shared secret presented in `Admin-Authorization` to bootstrap superusers.
    pub superuser_secret: SecretString,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub enabled: SwaggerMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SwaggerMode {
    Public,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_attempts: u32,
    pub login_window_seconds: u64,
    pub otp_attempts: u32,
    pub otp_window_seconds: u64,
    pub global_ip_limit: u32,
    pub global_ip_window_seconds: u64,
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = IdentityConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("identity-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", "10", is_prod)?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", "1", is_prod)?,
            },
            redis: RedisConfig {
                url: get_env("REDIS_URL", Some("redis://127.0.0.1:6379"), is_prod)?,
            },
            jwt: JwtConfig {
                secret: SecretString::new(get_env("JWT_SECRET_KEY", None, is_prod)?),
                admin_token_expiry_minutes: parse_env(
                    "ADMIN_JWT_TOKEN_EXPIRY_MINUTES",
                    "60",
                    is_prod,
                )?,
                user_password_token_expiry_minutes: parse_env(
                    "USER_PASSWORD_TOKEN_EXPIRY_MINUTES",
                    "5",
                    is_prod,
                )?,
                user_pin_token_expiry_minutes: parse_env(
                    "USER_PIN_TOKEN_EXPIRY_MINUTES",
                    "60",
                    is_prod,
                )?,
            },
            otp: OtpConfig {
                ttl_seconds: parse_env("OTP_TTL_SECONDS", "600", is_prod)?,
                max_attempts: parse_env("OTP_MAX_ATTEMPTS", "5", is_prod)?,
            },
            email: EmailConfig {
                api_url: get_env(
                    "ZEPTOMAIL_API_URL",
                    Some("https://api.zeptomail.com/v1.1/email"),
                    is_prod,
                )?,
                api_key: SecretString::new(get_env("ZEPTOMAIL_API_KEY", Some(""), is_prod)?),
                from_address: get_env("MAIL_FROM", Some("noreply@localhost"), is_prod)?,
                from_name: get_env("MAIL_FROM_NAME", Some("Identity Service"), is_prod)?,
                max_attempts: parse_env("EMAIL_MAX_RETRIES", "3", is_prod)?,
                retry_delay_seconds: parse_env("EMAIL_RETRY_DELAY_SECONDS", "2", is_prod)?,
                request_timeout_seconds: parse_env("EMAIL_REQUEST_TIMEOUT_SECONDS", "10", is_prod)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
                superuser_secret: SecretString::new(get_env("SUPERUSER_SECRET", None, is_prod)?),
            },
            swagger: SwaggerConfig {
                enabled: get_env("ENABLE_SWAGGER", Some("public"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            },
            rate_limit: RateLimitConfig {
                login_attempts: parse_env("RATE_LIMIT_LOGIN_ATTEMPTS", "5", is_prod)?,
                login_window_seconds: parse_env("RATE_LIMIT_LOGIN_WINDOW_SECONDS", "900", is_prod)?,
                otp_attempts: parse_env("RATE_LIMIT_OTP_ATTEMPTS", "3", is_prod)?,
                otp_window_seconds: parse_env("RATE_LIMIT_OTP_WINDOW_SECONDS", "600", is_prod)?,
                global_ip_limit: parse_env("RATE_LIMIT_GLOBAL_IP_LIMIT", "100", is_prod)?,
                global_ip_window_seconds: parse_env(
                    "RATE_LIMIT_GLOBAL_IP_WINDOW_SECONDS",
                    "60",
                    is_prod,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let positive = [
            (
                "ADMIN_JWT_TOKEN_EXPIRY_MINUTES",
                self.jwt.admin_token_expiry_minutes,
            ),
            (
                "USER_PASSWORD_TOKEN_EXPIRY_MINUTES",
                self.jwt.user_password_token_expiry_minutes,
            ),
            (
                "USER_PIN_TOKEN_EXPIRY_MINUTES",
                self.jwt.user_pin_token_expiry_minutes,
            ),
        ];
        for (key, value) in positive {
            if value <= 0 {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} must be positive",
                    key
                )));
            }
        }

        if self.otp.ttl_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "OTP_TTL_SECONDS must be positive"
            )));
        }

        if self.otp.max_attempts == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "OTP_MAX_ATTEMPTS must be at least 1"
            )));
        }

        if self.email.max_attempts == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "EMAIL_MAX_RETRIES must be at least 1"
            )));
        }

        if self.environment == Environment::Prod {
            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.swagger.enabled == SwaggerMode::Public {
                tracing::warn!("Swagger is publicly accessible in production");
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: &str, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(default), is_prod)?
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("{}: {}", key, e)))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" | "test" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::str::FromStr for SwaggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(SwaggerMode::Public),
            "disabled" => Ok(SwaggerMode::Disabled),
            _ => Err(format!("Invalid swagger mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_environment_aliases() {
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!("Dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn parse_env_reports_key_on_bad_value() {
        // Key is unlikely to be set in any environment running the tests.
        let err = parse_env::<u32>("IDENTITY_TEST_UNSET_NUMBER", "abc", false).unwrap_err();
        assert!(err.to_string().contains("IDENTITY_TEST_UNSET_NUMBER"));
    }
}
