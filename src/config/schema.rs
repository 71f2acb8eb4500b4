use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// rule name -> expression source
    #[serde(default)]
    pub rules: BTreeMap<String, String>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// treat a rule that fails to evaluate as a failed check
    #[serde(default = "default_fail_on_error")]
    pub fail_on_error: bool,
}

fn default_fail_on_error() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fail_on_error: default_fail_on_error(),
        }
    }
}
