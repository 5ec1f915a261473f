//! JSON configuration and report helpers for decode runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{DecodeError, DecoderParams, DialDecoder, ReadingResult, VisionBackend};

/// Default store file holding the persisted calibration.
pub const DEFAULT_STORE_PATH: &str = "meter_dials_store.json";
pub const DEFAULT_REPORT_PATH: &str = "meter_dials_report.json";

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration of one decode run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeConfig {
    pub image_path: String,
    #[serde(default)]
    pub report_path: Option<String>,
    #[serde(default)]
    pub overlay_path: Option<String>,
    #[serde(default)]
    pub store_path: Option<String>,
    /// Ignore any persisted calibration and always detect dials.
    #[serde(default)]
    pub ignore_calibration: bool,
    #[serde(default)]
    pub params: DecoderParams,
}

impl DecodeConfig {
    pub fn new(image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            report_path: None,
            overlay_path: None,
            store_path: None,
            ignore_calibration: false,
            params: DecoderParams::default(),
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH))
    }

    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }

    pub fn build_decoder<B: VisionBackend>(&self, backend: B) -> DialDecoder<B> {
        DialDecoder::new(backend, self.params.clone())
    }
}

/// Outcome of one decode run, written as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeReport {
    pub image_path: String,
    #[serde(default)]
    pub config_path: Option<String>,
    pub calibrated: bool,
    /// Zero-padded reading, e.g. `"00123"`.
    #[serde(default)]
    pub reading: Option<String>,
    #[serde(default)]
    pub result: Option<ReadingResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DecodeReport {
    pub fn new(cfg: &DecodeConfig, config_path: Option<&Path>, calibrated: bool) -> Self {
        Self {
            image_path: cfg.image_path.clone(),
            config_path: config_path.map(|p| p.to_string_lossy().into_owned()),
            calibrated,
            reading: None,
            result: None,
            error: None,
        }
    }

    /// Populate report fields from a successful decode.
    pub fn set_result(&mut self, res: ReadingResult) {
        self.reading = Some(res.display());
        self.result = Some(res);
        self.error = None;
    }

    /// Record a decode failure.
    pub fn set_error(&mut self, err: &DecodeError) {
        self.reading = None;
        self.result = None;
        self.error = Some(err.to_string());
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
