use idforge_core::{Carrier, Gender, PhoneFormat};
use idforge_export::Symbology;
use idforge_export::atomic::write_bytes_atomic;
use serde::{Deserialize, Serialize};

use super::{WorkspacePaths, WorkspaceResult};

const DEFAULT_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NationalIdPrefs {
    pub min_age: u32,
    pub max_age: u32,
    pub gender: Gender,
    pub count: usize,
    pub show_barcodes: bool,
}

impl Default for NationalIdPrefs {
    fn default() -> Self {
        Self {
            min_age: 20,
            max_age: 40,
            gender: Gender::Random,
            count: DEFAULT_COUNT,
            show_barcodes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimPrefs {
    pub carriers: Vec<Carrier>,
    pub count: usize,
    pub show_barcodes: bool,
}

impl Default for SimPrefs {
    fn default() -> Self {
        Self {
            carriers: vec![Carrier::Vodacom],
            count: DEFAULT_COUNT,
            show_barcodes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImeiPrefs {
    pub tac: String,
    pub count: usize,
    pub show_barcodes: bool,
}

impl Default for ImeiPrefs {
    fn default() -> Self {
        Self {
            tac: String::new(),
            count: DEFAULT_COUNT,
            show_barcodes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhonePrefs {
    pub format: PhoneFormat,
    pub count: usize,
    pub show_barcodes: bool,
}

impl Default for PhonePrefs {
    fn default() -> Self {
        Self {
            format: PhoneFormat::Random,
            count: DEFAULT_COUNT,
            show_barcodes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassportPrefs {
    pub count: usize,
    pub show_barcodes: bool,
}

impl Default for PassportPrefs {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            show_barcodes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodePrefs {
    pub text_list: String,
    pub barcode_type: Symbology,
}

impl Default for BarcodePrefs {
    fn default() -> Self {
        Self {
            text_list: "123456789\nABC-123\nTEST-DATA".to_string(),
            barcode_type: Symbology::Code128,
        }
    }
}

/// Form values remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub national_id: NationalIdPrefs,
    pub sim: SimPrefs,
    pub imei: ImeiPrefs,
    pub phone: PhonePrefs,
    pub passport: PassportPrefs,
    pub barcode: BarcodePrefs,
}

/// Load `settings.toml`, writing defaults on first run.
///
/// An unreadable or malformed file is logged and replaced by defaults in
/// memory; it is only overwritten on the next save.
pub fn load_or_create_preferences(paths: &WorkspacePaths) -> WorkspaceResult<Preferences> {
    let path = paths.settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path)?;
        return match toml::from_str::<Preferences>(&content) {
            Ok(prefs) => Ok(prefs),
            Err(err) => {
                tracing::warn!(event = "settings_invalid", path = %path.display(), error = %err);
                Ok(Preferences::default())
            }
        };
    }

    let prefs = Preferences::default();
    save_preferences(paths, &prefs)?;
    Ok(prefs)
}

pub fn save_preferences(paths: &WorkspacePaths, prefs: &Preferences) -> WorkspaceResult<()> {
    let path = paths.settings_path();
    let encoded = toml::to_string_pretty(prefs)?;
    write_bytes_atomic(&path, encoded.as_bytes())?;
    tracing::info!(event = "settings_saved", path = %path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = WorkspacePaths::new(dir.path().to_path_buf());
        let prefs = load_or_create_preferences(&paths).expect("load");
        assert_eq!(prefs, Preferences::default());
        assert!(paths.settings_path().exists());
        assert_eq!(prefs.sim.carriers, vec![Carrier::Vodacom]);
        assert_eq!(prefs.national_id.min_age, 20);
        assert_eq!(prefs.national_id.max_age, 40);
    }

    #[test]
    fn saved_changes_survive_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = WorkspacePaths::new(dir.path().to_path_buf());
        let mut prefs = load_or_create_preferences(&paths).expect("load");
        prefs.sim.carriers = vec![Carrier::Mtn, Carrier::EightTa];
        prefs.national_id.gender = Gender::Female;
        prefs.imei.tac = "49015420".to_string();
        prefs.barcode.barcode_type = Symbology::Ean13;
        save_preferences(&paths, &prefs).expect("save");

        let content = std::fs::read_to_string(paths.settings_path()).expect("readable");
        assert!(content.contains("\"8ta\""));
        assert!(content.contains("\"EAN13\""));

        let reloaded = load_or_create_preferences(&paths).expect("reload");
        assert_eq!(reloaded, prefs);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = WorkspacePaths::new(dir.path().to_path_buf());
        paths.ensure_dirs().expect("dirs");
        std::fs::write(paths.settings_path(), "[phone]\nformat = \"Local\"\n").expect("write");

        let prefs = load_or_create_preferences(&paths).expect("load");
        assert_eq!(prefs.phone.format, PhoneFormat::Local);
        assert_eq!(prefs.phone.count, DEFAULT_COUNT);
        assert_eq!(prefs.sim, SimPrefs::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = WorkspacePaths::new(dir.path().to_path_buf());
        paths.ensure_dirs().expect("dirs");
        std::fs::write(paths.settings_path(), "not = [valid").expect("write");

        let prefs = load_or_create_preferences(&paths).expect("load");
        assert_eq!(prefs, Preferences::default());
    }
}
