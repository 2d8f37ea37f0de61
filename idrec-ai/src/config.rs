//! Configuration resolution for idrec-ai
//!
//! Merges command line (with `IDREC_*` environment fallbacks), the TOML
//! file and compiled defaults into one [`ServiceConfig`].

use anyhow::{Context, Result};
use clap::Parser;
use idrec_common::config::{
    default_config_path, CompiledDefaults, ConverterConfig, DataFolderResolver, ExtractorConfig,
    TomlConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::services::{converter_from_config, ExtractionOrchestrator, OllamaExtractor};

/// Module name used for the config file and logs
pub const MODULE_NAME: &str = "idrec-ai";

/// Command-line arguments for idrec-ai
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "idrec-ai")]
#[command(about = "Identity document extraction and reconciliation service")]
#[command(version)]
pub struct CliArgs {
    /// Address to listen on (host:port)
    #[arg(short, long, env = "IDREC_BIND_ADDRESS")]
    pub bind: Option<String>,

    /// Folder holding the database (also IDREC_DATA_FOLDER)
    #[arg(short, long)]
    pub data_folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "IDREC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "IDREC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// docling-serve base URL
    #[arg(long, env = "IDREC_DOCLING_URL")]
    pub docling_url: Option<String>,

    /// Ollama base URL
    #[arg(long, env = "IDREC_OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Extraction model name
    #[arg(long, env = "IDREC_MODEL")]
    pub model: Option<String>,
}

impl CliArgs {
    /// Explicit config path, else `<config dir>/idrec/idrec-ai.toml`
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| default_config_path(MODULE_NAME))
    }
}

/// Effective service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub data_folder: PathBuf,
    pub log_level: String,
    pub converter: ConverterConfig,
    pub extractor: ExtractorConfig,
}

impl ServiceConfig {
    /// CLI/ENV over TOML over compiled defaults
    pub fn resolve(args: &CliArgs, toml: TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        let log_level = Self::log_level(args, &toml);
        let data_folder =
            DataFolderResolver::new(MODULE_NAME).resolve(args.data_folder.as_deref(), &toml);

        let mut converter = toml.converter;
        if let Some(url) = &args.docling_url {
            converter.url = url.clone();
        }

        let mut extractor = toml.extractor;
        if let Some(url) = &args.ollama_url {
            extractor.url = url.clone();
        }
        if let Some(model) = &args.model {
            extractor.model = model.clone();
        }

        Self {
            bind_address: args
                .bind
                .clone()
                .or(toml.bind_address)
                .unwrap_or(defaults.bind_address),
            data_folder,
            log_level,
            converter,
            extractor,
        }
    }

    /// Log filter: `--log-level` / `IDREC_LOG_LEVEL`, else the TOML level
    pub fn log_level(args: &CliArgs, toml: &TomlConfig) -> String {
        args.log_level
            .clone()
            .unwrap_or_else(|| toml.logging.level.clone())
    }

    /// Wire the configured converter and extractor into an orchestrator
    pub fn build_orchestrator(&self) -> Result<Arc<ExtractionOrchestrator>> {
        let converter =
            converter_from_config(&self.converter).context("Failed to create document converter")?;
        let extractor =
            OllamaExtractor::new(&self.extractor).context("Failed to create field extractor")?;

        Ok(Arc::new(ExtractionOrchestrator::new(
            converter,
            Arc::new(extractor),
        )))
    }
}
