use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub password_min_length: usize,
    pub password_max_length: usize,
    /// Email domains whose users are provisioned as businesses
    pub business_domains: Vec<String>,
    /// Argon2 memory cost in KiB
    pub hash_memory_kib: u32,
    /// Argon2 iterations
    pub hash_iterations: u32,
    /// Argon2 lanes
    pub hash_parallelism: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            password_min_length: 8,
            password_max_length: 128,
            business_domains: Vec::new(),
            hash_memory_kib: 19456,
            hash_iterations: 2,
            hash_parallelism: 1,
        }
    }
}
