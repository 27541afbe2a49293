use serde::Deserialize;

/// Settings of the main window.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    /// hide and lock the mouse cursor so that mouse motion turns the camera
    pub capture_cursor: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Waypoint Walk".to_owned(),
            width: 1200,
            height: 800,
            resizable: false,
            capture_cursor: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: WindowConfig = serde_json::from_str(r#"{ "title": "Board" }"#).unwrap();
        assert_eq!(
            config,
            WindowConfig {
                title: "Board".to_owned(),
                ..WindowConfig::default()
            },
            "only the title changed"
        );
    }
}
