//! Shared constants used across bluegreen crates

/// Name of the directory under the user's config dir, and of the local config files
pub const APP_NAME: &str = "bluegreen";

/// Project-local, user-facing config file
pub const LOCAL_CONFIG_FILE: &str = "Bluegreen.toml";
/// Project-local, tool-managed config directory
pub const LOCAL_INTERNAL_CONFIG_DIR: &str = ".bluegreen";

/// Environment variable the infra-as-code tool reads the stack passphrase from
pub const PASSPHRASE_ENV_VAR: &str = "PULUMI_CONFIG_PASSPHRASE";

// Stack names
pub const DEFAULT_PRODUCTION_STACK: &str = "production";
pub const DEFAULT_STAGING_STACK: &str = "staging";

// Stack output keys written by the VM stacks
pub const OUTPUT_PUBLIC_IP: &str = "publicIp";
pub const OUTPUT_DNS_INSTRUCTIONS: &str = "dnsInstructions";

// Stack output keys written by the static site stack
pub const OUTPUT_WEBSITE_URL: &str = "websiteUrl";
pub const OUTPUT_DISTRIBUTION_ID: &str = "distributionId";
pub const OUTPUT_DNS_ZONE: &str = "cloudflareZone";

/// Default location of the static site build
pub const DEFAULT_SITE_BUILD_DIR: &str = "target/site";
/// Pattern used when purging the whole CDN cache
pub const INVALIDATE_ALL_PATHS: &str = "/*";
