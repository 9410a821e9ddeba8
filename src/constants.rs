// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";

// Token configuration constants
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 30 * 60;
pub const MIN_SECRET_LEN: usize = 32;
pub const MAX_TOKEN_LEN: usize = 4096;
pub const BEARER_SCHEME: &str = "Bearer";

// Password hashing defaults (argon2 crate defaults for Argon2id)
pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19_456;
pub const DEFAULT_ARGON2_ITERATIONS: u32 = 2;
pub const DEFAULT_ARGON2_PARALLELISM: u32 = 1;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

// Request handling
pub const DEFAULT_MIN_AUTH_MILLIS: u64 = 100;
pub const MAX_BODY_BYTES: u64 = 16 * 1024;
