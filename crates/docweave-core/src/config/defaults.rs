//! Compiled defaults for every tunable.

pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

pub const DEFAULT_LEXICAL_WEIGHT: f64 = 0.60;
pub const DEFAULT_GRAPH_WEIGHT: f64 = 0.25;
pub const DEFAULT_EMBEDDING_WEIGHT: f64 = 0.15;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

pub const DEFAULT_MAX_EXPLORATION_STEPS: u32 = 50;
pub const DEFAULT_MAX_SECTIONS: u32 = 20;
pub const DEFAULT_MAX_SECTION_STEPS: u32 = 5;
pub const DEFAULT_MAX_CORRECTION_ITERATIONS: u32 = 2;
pub const DEFAULT_MAX_UNCITED_RETRIES: u32 = 1;

pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 0.80;
pub const DEFAULT_VALIDITY_THRESHOLD: f64 = 0.80;

pub const DEFAULT_EXTRACTIVE_THRESHOLD: f64 = 0.50;
pub const DEFAULT_KEYWORD_THRESHOLD: f64 = 0.60;
pub const DEFAULT_JUDGE_BATCH_SIZE: usize = 8;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 8_000;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
