//! Shared constants and invariants

pub const DEFAULT_BASE_URL: &str = "https://api.meest.com/v3.0/openAPI/";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Remote operations, relative to the base url
pub const AUTH_PATH: &str = "auth";
pub const BRANCH_SEARCH_PATH: &str = "branchSearch";
pub const TOKEN_HEADER: &str = "token";

/// Key of the shared token record in the token store
pub const TOKEN_CACHE_KEY: &str = "meestexpress.token";
/// Local validity window of a freshly issued token.
/// The auth response carries no lifetime, so this is policy, not protocol.
pub const TOKEN_VALIDITY_HOURS: i64 = 12;

// Environment sourced configuration
pub const ENV_LOGIN: &str = "MEEST_EXPRESS_LOGIN";
pub const ENV_PASSWORD: &str = "MEEST_EXPRESS_PASSWORD";
pub const ENV_DEBUG: &str = "APP_DEBUG";

pub const DEFAULT_TOKEN_STORE_FILE: &str = "meestexpress-token.json";
