// Single source of truth for all default values.

// --- Learning ---
pub const DEFAULT_CLUSTER_COUNT: usize = 2;
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;
pub const DEFAULT_KMEANS_MAX_ITERATIONS: usize = 100;

// --- Training ---
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_L2: f64 = 0.0;
pub const DEFAULT_BATCH_SIZE: usize = 1;

// --- Inference ---
pub const DEFAULT_STORE: bool = true;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
