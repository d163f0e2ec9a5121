//! User settings stored as JSON under the local app data directory

use export::{EncodeSettings, OutputFormat};
use hotkeys::HotKey;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SETTINGS_FILE_NAME: &str = "usersettings.json";
pub const DEFAULT_API_HOST: &str = "https://sc.marakusa.me";
pub const DEFAULT_CAPTURE_HOTKEY: &str = "PrintScreen";

/// `<local app data>/CapYap`, falling back to the temp dir
pub static APP_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("CapYap")
});

pub fn settings_path() -> PathBuf {
    APP_DIR.join(SETTINGS_FILE_NAME)
}

pub fn log_dir() -> PathBuf {
    APP_DIR.join("logs")
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub auto_start: bool,
    pub theme: String,
    pub capture_cursor: bool,
    pub debug_logging: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            auto_start: true,
            theme: "theme_dark".into(),
            capture_cursor: false,
            debug_logging: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// JPEG quality, 0-100
    pub compression_quality: i32,
    /// GIF quality, 0-100
    pub anim_compression_quality: i32,
    /// PNG compression level, 0-9
    pub compression_level: i32,
    /// 0 = JPEG, 1 = PNG, 2 = GIF
    pub upload_format: i32,
    pub api_host: String,
    pub upload_key: Option<String>,
    pub copy_image_on_failure: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            compression_quality: 92,
            anim_compression_quality: 70,
            compression_level: 6,
            upload_format: 0,
            api_host: DEFAULT_API_HOST.into(),
            upload_key: None,
            copy_image_on_failure: true,
        }
    }
}

impl UploadSettings {
    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_index(self.upload_format)
    }

    /// Encoder parameters for the configured format
    pub fn encode_settings(&self) -> EncodeSettings {
        let format = self.format();
        let quality = match format {
            OutputFormat::Gif => self.anim_compression_quality,
            _ => self.compression_quality,
        };

        EncodeSettings {
            format,
            quality: quality.clamp(0, 100) as u8,
            png_compression: self.compression_level.clamp(0, 9) as u8,
        }
    }

    fn clamp(&mut self) {
        self.compression_quality = self.compression_quality.clamp(0, 100);
        self.anim_compression_quality = self.anim_compression_quality.clamp(0, 100);
        self.compression_level = self.compression_level.clamp(0, 9);
        if !(0..=2).contains(&self.upload_format) {
            self.upload_format = 0;
        }
        self.api_host = self.api_host.trim().trim_end_matches('/').to_string();
        if self.api_host.is_empty() {
            self.api_host = DEFAULT_API_HOST.into();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotKeySettings {
    pub capture_screen: String,
}

impl Default for HotKeySettings {
    fn default() -> Self {
        Self {
            capture_screen: DEFAULT_CAPTURE_HOTKEY.into(),
        }
    }
}

impl HotKeySettings {
    /// Parsed capture hotkey, the default one when the stored string is invalid
    pub fn capture_hotkey(&self) -> HotKey {
        HotKey::parse(&self.capture_screen).unwrap_or_else(|e| {
            tracing::warn!("{e}, using {DEFAULT_CAPTURE_HOTKEY}");
            HotKey::new(hotkeys::VirtualKey::SNAPSHOT, hotkeys::Modifiers::NONE)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: AppSettings,
    pub upload: UploadSettings,
    pub hotkeys: HotKeySettings,
}

impl Settings {
    /// Load settings, defaults when the file does not exist yet
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&content)?;
        settings.upload.clamp();
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.upload.compression_quality, 92);
        assert_eq!(settings.hotkeys.capture_screen, "PrintScreen");
    }

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);

        let mut settings = Settings::default();
        settings.app.auto_start = false;
        settings.upload.upload_format = 1;
        settings.upload.upload_key = Some("secret".into());
        settings.hotkeys.capture_screen = "Ctrl+Shift+S".into();
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, r#"{ "upload": { "upload_format": 2 } }"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.upload.upload_format, 2);
        assert_eq!(settings.upload.anim_compression_quality, 70);
        assert_eq!(settings.upload.api_host, DEFAULT_API_HOST);
        assert!(settings.app.auto_start);
    }

    #[test]
    fn out_of_range_values_clamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(
            &path,
            r#"{ "upload": {
                "compression_quality": 250,
                "anim_compression_quality": -4,
                "compression_level": 12,
                "upload_format": 7,
                "api_host": "https://example.com/"
            } }"#,
        )
        .unwrap();

        let upload = Settings::load(&path).unwrap().upload;
        assert_eq!(upload.compression_quality, 100);
        assert_eq!(upload.anim_compression_quality, 0);
        assert_eq!(upload.compression_level, 9);
        assert_eq!(upload.upload_format, 0);
        assert_eq!(upload.api_host, "https://example.com");
    }

    #[test]
    fn broken_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Settings::load(&path), Err(SettingsError::Json(_))));
    }

    #[test]
    fn invalid_hotkey_falls_back_to_print_screen() {
        let mut hotkeys = HotKeySettings::default();
        assert_eq!(hotkeys.capture_hotkey().to_string(), "PrintScreen");

        hotkeys.capture_screen = "Ctrl+Shift+S".into();
        assert_eq!(hotkeys.capture_hotkey().to_string(), "Ctrl+Shift+S");

        hotkeys.capture_screen = "Hyper+?".into();
        assert_eq!(hotkeys.capture_hotkey().to_string(), "PrintScreen");
    }

    #[test]
    fn gif_uses_animation_quality() {
        let mut upload = UploadSettings::default();
        upload.upload_format = 2;

        let encode = upload.encode_settings();
        assert_eq!(encode.format, OutputFormat::Gif);
        assert_eq!(encode.quality, 70);
        assert_eq!(encode.png_compression, 6);

        upload.upload_format = 0;
        assert_eq!(upload.encode_settings().quality, 92);
    }
}
