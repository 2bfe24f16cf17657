// Configuration type definitions

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::PilotError;

/// Word delimiter convention applied when inserting a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterMode {
    /// Replicate whatever convention the typed query used
    #[default]
    Auto,
    Underscore,
    Space,
}

/// Per-category result caps. `-1` = unlimited, `0` = hide the category.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultCaps {
    #[serde(default = "default_general_cap")]
    pub group0: i64,
    #[serde(default = "default_group_cap")]
    pub group1: i64,
    #[serde(default = "default_group_cap")]
    pub group3: i64,
    #[serde(default = "default_group_cap")]
    pub group4: i64,
    #[serde(default = "default_group_cap")]
    pub group5: i64,
    #[serde(default = "default_custom_cap")]
    pub custom: i64,
    #[serde(default = "default_lora_cap")]
    pub lora: i64,
}

fn default_general_cap() -> i64 {
    30
}

fn default_group_cap() -> i64 {
    10
}

fn default_custom_cap() -> i64 {
    20
}

fn default_lora_cap() -> i64 {
    100
}

impl Default for ResultCaps {
    fn default() -> Self {
        ResultCaps {
            group0: default_general_cap(),
            group1: default_group_cap(),
            group3: default_group_cap(),
            group4: default_group_cap(),
            group5: default_group_cap(),
            custom: default_custom_cap(),
            lora: default_lora_cap(),
        }
    }
}

impl ResultCaps {
    /// Cap for a tag category id. Categories without a configured bucket
    /// (e.g. the unused id `2`) get `None` and contribute no results.
    pub fn for_category(&self, category: &str) -> Option<i64> {
        match category {
            "0" => Some(self.group0),
            "1" => Some(self.group1),
            "3" => Some(self.group3),
            "4" => Some(self.group4),
            "5" => Some(self.group5),
            "custom" => Some(self.custom),
            _ => None,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub caps: ResultCaps,

    /// Source id the per-category delimiter modes are keyed under
    #[serde(default = "default_tag_source")]
    pub tag_source: String,

    /// Delimiter modes keyed by `"<source>/<category>"`
    #[serde(default)]
    pub delimiters: HashMap<String, DelimiterMode>,

    /// Newline/comma separated tags always inserted with underscores
    #[serde(default)]
    pub always_underscore_tags: String,

    /// Newline/comma separated tags always inserted with spaces
    #[serde(default)]
    pub always_space_tags: String,

    /// Append a comma after every completed tag
    #[serde(default = "default_true")]
    pub append_comma: bool,

    /// Offer co-occurrence suggestions when the active word is empty
    #[serde(default = "default_true")]
    pub suggest_enabled: bool,

    /// Insertion mechanism used by the embedding UI; carried through
    /// untouched by the core
    #[serde(default = "default_true")]
    pub prefer_exec_command: bool,

    /// Debounce window for the remote tag search, in milliseconds
    #[serde(default = "default_remote_debounce_ms")]
    pub remote_debounce_ms: u64,
}

fn default_tag_source() -> String {
    "danbooru.donmai.us".to_string()
}

fn default_true() -> bool {
    true
}

fn default_remote_debounce_ms() -> u64 {
    1100
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            caps: ResultCaps::default(),
            tag_source: default_tag_source(),
            delimiters: HashMap::new(),
            always_underscore_tags: String::new(),
            always_space_tags: String::new(),
            append_comma: true,
            suggest_enabled: true,
            prefer_exec_command: true,
            remote_debounce_ms: default_remote_debounce_ms(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML document.
    pub fn from_toml(document: &str) -> Result<Settings, PilotError> {
        toml::from_str(document).map_err(|e| PilotError::Settings(e.to_string()))
    }

    /// Load settings from a TOML file on disk.
    pub fn load_from_path(path: &Path) -> Result<Settings, PilotError> {
        let document = std::fs::read_to_string(path)?;
        Settings::from_toml(&document)
    }

    /// Delimiter mode for a tag category under the configured source.
    pub fn delimiter_mode(&self, category: &str) -> DelimiterMode {
        self.delimiters
            .get(&format!("{}/{}", self.tag_source, category))
            .copied()
            .unwrap_or_default()
    }

    pub fn always_underscore_set(&self) -> HashSet<String> {
        parse_tag_list(&self.always_underscore_tags)
    }

    pub fn always_space_set(&self) -> HashSet<String> {
        parse_tag_list(&self.always_space_tags)
    }
}

/// Split a newline/comma separated tag list, trimming entries and folding
/// underscores to the space display form.
fn parse_tag_list(raw: &str) -> HashSet<String> {
    raw.split(['\n', ','])
        .map(|tag| tag.trim().replace('_', " "))
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.caps.group0, 30);
        assert_eq!(settings.caps.lora, 100);
        assert!(settings.append_comma);
        assert!(settings.suggest_enabled);
        assert_eq!(settings.tag_source, "danbooru.donmai.us");
        assert_eq!(settings.delimiter_mode("0"), DelimiterMode::Auto);
    }

    #[test]
    fn test_unknown_category_has_no_cap() {
        let caps = ResultCaps::default();
        assert_eq!(caps.for_category("2"), None);
        assert_eq!(caps.for_category("custom"), Some(20));
    }

    #[test]
    fn test_delimiter_mode_lookup_by_source_and_category() {
        let mut settings = Settings::default();
        settings
            .delimiters
            .insert("danbooru.donmai.us/1".to_string(), DelimiterMode::Underscore);
        assert_eq!(settings.delimiter_mode("1"), DelimiterMode::Underscore);
        assert_eq!(settings.delimiter_mode("0"), DelimiterMode::Auto);
        settings.tag_source = "other.example".to_string();
        assert_eq!(settings.delimiter_mode("1"), DelimiterMode::Auto);
    }

    #[test]
    fn test_tag_list_parsing() {
        let mut settings = Settings::default();
        settings.always_underscore_tags = "score_9, score_8_up\nsource_pony".to_string();
        let set = settings.always_underscore_set();
        assert!(set.contains("score 9"));
        assert!(set.contains("score 8 up"));
        assert!(set.contains("source pony"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_load_from_toml_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
append_comma = false

[caps]
group0 = -1
custom = 0

[delimiters]
"danbooru.donmai.us/4" = "underscore"
"#
        )
        .expect("write settings");

        let settings = Settings::load_from_path(file.path()).expect("load settings");
        assert!(!settings.append_comma);
        assert_eq!(settings.caps.group0, -1);
        assert_eq!(settings.caps.custom, 0);
        assert_eq!(settings.caps.group1, 10);
        assert_eq!(settings.delimiter_mode("4"), DelimiterMode::Underscore);
    }

    #[test]
    fn test_invalid_toml_is_a_settings_error() {
        let result = Settings::from_toml("caps = \"not a table\"");
        assert!(matches!(result, Err(PilotError::Settings(_))));
    }

    // For any valid delimiter mode value in a TOML config, parsing should
    // extract and store that mode without errors.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_valid_delimiter_mode_parsing(
            mode in prop::sample::select(vec!["auto", "underscore", "space"])
        ) {
            let toml_content = format!(
                "[delimiters]\n\"danbooru.donmai.us/0\" = \"{}\"\n",
                mode
            );

            let settings = Settings::from_toml(&toml_content);
            prop_assert!(settings.is_ok(), "failed to parse mode: {}", mode);

            let expected = match mode {
                "auto" => DelimiterMode::Auto,
                "underscore" => DelimiterMode::Underscore,
                "space" => DelimiterMode::Space,
                _ => unreachable!(),
            };
            prop_assert_eq!(settings.unwrap().delimiter_mode("0"), expected);
        }

        // Any subset of fields may be missing; the rest fall back to
        // defaults.
        #[test]
        fn prop_missing_fields_use_defaults(include_caps in prop::bool::ANY) {
            let toml_content = if include_caps {
                "[caps]\ngroup1 = 3\n".to_string()
            } else {
                String::new()
            };

            let settings = Settings::from_toml(&toml_content);
            prop_assert!(settings.is_ok());
            let settings = settings.unwrap();

            prop_assert_eq!(settings.caps.group0, 30);
            if include_caps {
                prop_assert_eq!(settings.caps.group1, 3);
            } else {
                prop_assert_eq!(settings.caps.group1, 10);
            }
            prop_assert!(settings.suggest_enabled);
        }
    }
}
