use serde::{Deserialize, Serialize};

/// Which semantics backs an evaluation or a derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceMode {
    /// Sum-product (marginal) semantics.
    #[default]
    Soft,
    /// Max-product (most probable explanation) semantics.
    Hard,
}

impl InferenceMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Soft => "soft",
            Self::Hard => "hard",
        }
    }
}

impl std::str::FromStr for InferenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "soft" => Ok(Self::Soft),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown inference mode '{other}'")),
        }
    }
}
