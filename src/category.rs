//! Closed set of subject tracks. Adding one means touching the catalog data,
//! the default seed and the leaderboard peers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Html,
    Css,
    Javascript,
    Python,
    Cpp,
}

impl Category {
    /// Every known category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Html,
        Category::Css,
        Category::Javascript,
        Category::Python,
        Category::Cpp,
    ];

    /// Storage / wire key.
    pub fn key(self) -> &'static str {
        match self {
            Category::Html => "html",
            Category::Css => "css",
            Category::Javascript => "javascript",
            Category::Python => "python",
            Category::Cpp => "cpp",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Html => "HTML",
            Category::Css => "CSS",
            Category::Javascript => "JavaScript",
            Category::Python => "Python",
            Category::Cpp => "C++",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Category::Html),
            "css" => Ok(Category::Css),
            "javascript" | "js" => Ok(Category::Javascript),
            "python" | "py" => Ok(Category::Python),
            "cpp" | "c++" => Ok(Category::Cpp),
            _ => Err(ProgressError::UnknownCategory(s.to_string())),
        }
    }
}
