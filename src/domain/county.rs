use super::{lenient, lenient_key};
use serde::{Deserialize, Serialize};

/// Entry of the department catalogue (`departements.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct County {
    #[serde(default, deserialize_with = "lenient_key")]
    pub code_departement: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub nom_departement: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub code_region: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub nom_region: Option<String>,
}

impl County {
    /// `Ain (01)`, or `None` when either part is missing
    pub fn display_name(&self) -> Option<String> {
        match (&self.nom_departement, &self.code_departement) {
            (Some(name), Some(code)) => Some(format!("{} ({})", name, code)),
            _ => None,
        }
    }
}
