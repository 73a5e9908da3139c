use shadow_editor_core::history::HistorySettings;

const DOCUMENTATION: &str = r"# Shadow editor settings. You may edit this file, but be aware that formatting and comments will not
# be preserved.

# [history]
# merge_window_ms: consecutive edits of the same attribute within this many milliseconds
#                  become a single undo step. Script edits always merge.
# persistent:      save the undo history along with the document.

";

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub history: HistorySettings,
    #[serde(skip)]
    failed_to_load: bool,
}
impl Settings {
    const FILENAME: &'static str = "settings.toml";
    /// Shared global settings, saved and loaded from user preferences.
    /// (Or defaulted, if unavailable for some reason)
    #[must_use]
    pub fn get() -> &'static Self {
        static GLOBAL_SETTINGS: std::sync::OnceLock<Settings> = std::sync::OnceLock::new();

        GLOBAL_SETTINGS.get_or_init(|| {
            let mut dir = super::preferences_dir();
            match dir.as_mut() {
                None => Self::no_path(),
                Some(dir) => {
                    dir.push(Self::FILENAME);
                    Self::load_or_default(dir)
                }
            }
        })
    }
    #[must_use]
    pub fn no_path() -> Self {
        log::warn!("Settings weren't available, defaulting.");
        Self {
            failed_to_load: true,
            ..Default::default()
        }
    }
    #[must_use]
    fn load_or_default(path: &std::path::Path) -> Self {
        let settings: anyhow::Result<Settings> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let settings : Settings = toml::from_str(&string)?;

            Ok(settings)
        };

        match settings {
            Ok(settings) => settings,
            Err(_) => Self::no_path(),
        }
    }
    /// Return true if loading user's settings failed, in which case the defaults are in use.
    #[must_use]
    pub fn did_fail_to_load(&self) -> bool {
        self.failed_to_load
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences =
            super::preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Not recursive. If the parent is missing, the user probably has a reason.
        // Errors surface from the file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        let mut string = toml::ser::to_string_pretty(self)?;
        string = DOCUMENTATION.to_owned() + &string;
        std::fs::write(preferences, string)?;
        Ok(())
    }
}
