//! Theme resolution for the menu overlay.
//!
//! A session carries the requested [`ThemeSetting`] and the last known system
//! preference. `Auto` (or no setting at all) follows the system; explicit
//! `Light`/`Dark` are never undone by a later system change.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Theme requested by the host or configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSetting {
    Auto,
    Light,
    Dark,
}

impl FromStr for ThemeSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme setting '{other}'")),
        }
    }
}

/// The resolved look applied to the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
}

/// Current theme setting plus the system preference subscription state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeState {
    setting: Option<ThemeSetting>,
    system_dark: bool,
    appearance_dark: bool,
}

impl ThemeState {
    pub fn new(system_dark: bool) -> Self {
        Self {
            setting: None,
            system_dark,
            appearance_dark: system_dark,
        }
    }

    pub fn setting(&self) -> Option<ThemeSetting> {
        self.setting
    }

    /// Apply a theme setting and return the resulting appearance.
    pub fn apply(&mut self, setting: Option<ThemeSetting>) -> Appearance {
        self.setting = setting;
        self.appearance_dark = match setting {
            Some(ThemeSetting::Dark) => true,
            Some(ThemeSetting::Light) => false,
            Some(ThemeSetting::Auto) | None => self.system_dark,
        };
        self.appearance()
    }

    /// Feed a system preference change.
    ///
    /// Returns the new appearance when it applies, `None` when an explicit
    /// override is in effect.
    pub fn system_changed(&mut self, dark: bool) -> Option<Appearance> {
        self.system_dark = dark;
        match self.setting {
            None | Some(ThemeSetting::Auto) => {
                self.appearance_dark = dark;
                Some(self.appearance())
            }
            Some(_) => None,
        }
    }

    pub fn appearance(&self) -> Appearance {
        if self.appearance_dark {
            Appearance::Dark
        } else {
            Appearance::Light
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_setting() {
        assert_eq!("auto".parse(), Ok(ThemeSetting::Auto));
        assert_eq!("light".parse(), Ok(ThemeSetting::Light));
        assert_eq!("dark".parse(), Ok(ThemeSetting::Dark));
        assert!("Dark".parse::<ThemeSetting>().is_err());
    }

    #[test]
    fn test_auto_follows_system() {
        let mut theme = ThemeState::new(true);
        assert_eq!(theme.apply(Some(ThemeSetting::Auto)), Appearance::Dark);
        assert_eq!(theme.system_changed(false), Some(Appearance::Light));
        assert_eq!(theme.appearance(), Appearance::Light);
    }

    #[test]
    fn test_unset_follows_system() {
        let mut theme = ThemeState::new(false);
        assert_eq!(theme.apply(None), Appearance::Light);
        assert_eq!(theme.system_changed(true), Some(Appearance::Dark));
    }

    #[test]
    fn test_explicit_override_survives_system_change() {
        let mut theme = ThemeState::new(true);
        assert_eq!(theme.apply(Some(ThemeSetting::Light)), Appearance::Light);
        assert_eq!(theme.system_changed(true), None);
        assert_eq!(theme.system_changed(false), None);
        assert_eq!(theme.appearance(), Appearance::Light);

        // Switching back to auto picks up the latest system value.
        assert_eq!(theme.apply(Some(ThemeSetting::Auto)), Appearance::Light);
    }

    #[test]
    fn test_explicit_dark() {
        let mut theme = ThemeState::new(false);
        assert_eq!(theme.apply(Some(ThemeSetting::Dark)), Appearance::Dark);
    }
}
