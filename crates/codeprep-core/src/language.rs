use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    JavaScript,
    Cpp,
    Java,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Cpp => "C++",
            Language::Java => "Java",
        }
    }

    /// Identifier sent to remote sandboxes.
    pub fn id(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Cpp => "cpp",
            Language::Java => "java",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            Language::JavaScript => "js",
            Language::Cpp => "cpp",
            Language::Java => "java",
        }
    }

    pub fn all() -> &'static [Language] {
        &[Language::JavaScript, Language::Cpp, Language::Java]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "javascript" | "js" => Ok(Language::JavaScript),
            "cpp" | "c++" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("js".parse::<Language>(), Ok(Language::JavaScript));
        assert_eq!("C++".parse::<Language>(), Ok(Language::Cpp));
        assert_eq!("Java".parse::<Language>(), Ok(Language::Java));
        assert!("python".parse::<Language>().is_err());
    }

    #[test]
    fn test_wire_ids() {
        let ids: Vec<_> = Language::all().iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec!["javascript", "cpp", "java"]);
        assert_eq!(serde_json::to_string(&Language::Cpp).unwrap(), "\"cpp\"");
    }
}
