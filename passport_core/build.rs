// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    reduction: ReductionLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    large_file_threshold: u64,
    read_buffer_size: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_field_length: usize,
    max_token_count: usize,
    token_channel_capacity: usize,
}

#[derive(serde::Deserialize)]
struct ReductionLimits {
    max_fields_per_record: usize,
    max_retained_reports: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_files_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PASSPORT_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=PASSPORT_CONFIG_DIR");

    let profile = env::var("PASSPORT_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("PASSPORT_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of passport_core directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_FIELD_LENGTH: usize = 1_000_000;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMITS: max_file_size exceeds absolute maximum");
    }

    if config.lexical.max_field_length == 0
        || config.lexical.max_field_length > ABSOLUTE_MAX_FIELD_LENGTH
    {
        panic!("LIMITS: max_field_length must be within 1..={ABSOLUTE_MAX_FIELD_LENGTH}");
    }

    if config.lexical.token_channel_capacity == 0 {
        panic!("LIMITS: token_channel_capacity cannot be zero");
    }

    if config.batch_processing.max_worker_threads == 0 {
        panic!("LIMITS: max_worker_threads cannot be zero");
    }

    if profile == "production" && config.file_processing.max_file_size > 50_000_000 {
        panic!("PRODUCTION: max_file_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const LARGE_FILE_THRESHOLD: u64 = {};
        pub const READ_BUFFER_SIZE: usize = {};
    }}

    pub mod lexical {{
        pub const MAX_FIELD_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const TOKEN_CHANNEL_CAPACITY: usize = {};
    }}

    pub mod reduction {{
        pub const MAX_FIELDS_PER_RECORD: usize = {};
        pub const MAX_RETAINED_REPORTS: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_FILES_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        config.file_processing.max_file_size,
        config.file_processing.large_file_threshold,
        config.file_processing.read_buffer_size,
        config.lexical.max_field_length,
        config.lexical.max_token_count,
        config.lexical.token_channel_capacity,
        config.reduction.max_fields_per_record,
        config.reduction.max_retained_reports,
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_files_per_batch,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
    );

    fs::write(&output_path, constants_code)
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", output_path.display(), e));
}
