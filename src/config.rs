use serde::{Deserialize, Serialize};

/// Spacing and size parameters for the position calculator.
///
/// Every key is optional when deserialized; missing keys take the defaults below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width of a table box. Default 220.
    pub table_width: f64,
    /// Height of a collapsed table (its header). Default 40.
    pub table_height: f64,
    /// Height of one field row. Default 28.
    pub field_height: f64,
    /// Gap between field rows. Default 4.
    pub field_spacing: f64,
    /// Horizontal gap between levels. Default 120.
    pub level_padding: f64,
    /// Vertical gap between tables in a level. Default 30.
    pub vertical_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            table_width: 220.0,
            table_height: 40.0,
            field_height: 28.0,
            field_spacing: 4.0,
            level_padding: 120.0,
            vertical_padding: 30.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Vertical distance between consecutive field rows.
    pub fn field_stride(&self) -> f64 {
        self.field_height + self.field_spacing
    }

    /// Horizontal distance between consecutive levels.
    pub fn level_stride(&self) -> f64 {
        self.table_width + self.level_padding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config = LayoutConfig::from_json(r#"{"tableWidth": 300, "fieldSpacing": 0}"#).unwrap();
        assert_eq!(config.table_width, 300.0);
        assert_eq!(config.field_spacing, 0.0);
        assert_eq!(config.table_height, LayoutConfig::default().table_height);
    }

    #[test]
    fn test_strides() {
        let config = LayoutConfig::default();
        assert_eq!(config.field_stride(), 32.0);
        assert_eq!(config.level_stride(), 340.0);
    }
}
