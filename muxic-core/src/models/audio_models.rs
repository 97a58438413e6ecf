/// A capture endpoint as reported by the platform backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

/// How to pick the capture endpoint when opening a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// First active capture endpoint.
    #[default]
    Default,
    /// Endpoint whose friendly name matches exactly.
    Named(String),
}

impl DeviceSelector {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(name) if !name.is_empty() => Self::Named(name.to_string()),
            _ => Self::Default,
        }
    }

    /// Whether `source` satisfies this selector.
    pub fn matches(&self, source: &AudioSource) -> bool {
        match self {
            Self::Default => true,
            Self::Named(name) => source.name == *name,
        }
    }
}
