//! Application constants
//!
//! Centralized location for domain-level constants shared by the auth and
//! contact layers.

// Identity resolution
pub const MAX_RESOLVE_BATCH_SIZE: usize = 50;

// Silent refresh
pub const DEFAULT_REFRESH_TIMEOUT_MS: u64 = 10_000;

// Session storage key holding the hash of the pending authentication nonce
pub const NONCE_HASH_KEY: &str = "authentication_nonce_hash";

// Scopes every id-token request must carry
pub const REQUIRED_ID_TOKEN_SCOPES: [&str; 3] = ["profile", "email", "openid"];

// Rendering fallbacks
pub const DEFAULT_AVATAR_URL: &str = "./images/defaultAvatar.png";

// Google
pub const GOOGLE_AUTH_SERVICE: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_CONTACTS_SCOPE: &str = "https://www.googleapis.com/auth/contacts";
pub const GOOGLE_PEOPLE_API_BASE: &str = "https://people.googleapis.com/v1";
pub const GOOGLE_MAX_CONNECTIONS: usize = 2000;

// Microsoft
pub const GRAPH_USER_READ_WRITE_SCOPE: &str = "https://graph.microsoft.com/User.ReadWrite";
pub const GRAPH_USER_READ_BASIC_ALL_SCOPE: &str = "https://graph.microsoft.com/User.ReadBasic.All";

// Mock tokens
pub const MOCK_TOKEN_LIFETIME_SECS: i64 = 86_400;
pub const MOCK_TOKEN_SKEW_SECS: i64 = 60;
