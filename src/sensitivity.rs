use anyhow::Result;
use std::fmt;
use std::str::FromStr;

/// DIAMOND sensitivity modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensitivity {
    Default,
    Faster,
    Fast,
    MidSensitive,
    Sensitive,
    MoreSensitive,
    VerySensitive,
    UltraSensitive,
}

impl Sensitivity {
    /// All modes ordered by increasing elapsed time, as measured in an earlier
    /// run rather than by what the names suggest
    pub const BY_COST: [Sensitivity; 8] = [
        Sensitivity::Default,
        Sensitivity::Faster,
        Sensitivity::Fast,
        Sensitivity::VerySensitive,
        Sensitivity::MidSensitive,
        Sensitivity::MoreSensitive,
        Sensitivity::Sensitive,
        Sensitivity::UltraSensitive,
    ];

    /// Command-line flag for `diamond blastx`, None for the default mode
    pub fn flag(&self) -> Option<&'static str> {
        match self {
            Sensitivity::Default => None,
            Sensitivity::Faster => Some("--faster"),
            Sensitivity::Fast => Some("--fast"),
            Sensitivity::MidSensitive => Some("--mid-sensitive"),
            Sensitivity::Sensitive => Some("--sensitive"),
            Sensitivity::MoreSensitive => Some("--more-sensitive"),
            Sensitivity::VerySensitive => Some("--very-sensitive"),
            Sensitivity::UltraSensitive => Some("--ultra-sensitive"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sensitivity::Default => "default",
            Sensitivity::Faster => "faster",
            Sensitivity::Fast => "fast",
            Sensitivity::MidSensitive => "mid-sensitive",
            Sensitivity::Sensitive => "sensitive",
            Sensitivity::MoreSensitive => "more-sensitive",
            Sensitivity::VerySensitive => "very-sensitive",
            Sensitivity::UltraSensitive => "ultra-sensitive",
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sensitivity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let name = lower.trim_start_matches("--");
        match name {
            "default" | "none" | "" => Ok(Sensitivity::Default),
            "faster" => Ok(Sensitivity::Faster),
            "fast" => Ok(Sensitivity::Fast),
            "mid-sensitive" => Ok(Sensitivity::MidSensitive),
            "sensitive" => Ok(Sensitivity::Sensitive),
            "more-sensitive" => Ok(Sensitivity::MoreSensitive),
            "very-sensitive" => Ok(Sensitivity::VerySensitive),
            "ultra-sensitive" => Ok(Sensitivity::UltraSensitive),
            _ => anyhow::bail!(
                "Unknown sensitivity '{}'. Valid: default, faster, fast, mid-sensitive, \
                 sensitive, more-sensitive, very-sensitive, ultra-sensitive",
                s
            ),
        }
    }
}

/// One scorer configuration: a sensitivity mode plus extra blastx arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorerConfig {
    pub sensitivity: Sensitivity,
    pub extra_args: Vec<String>,
}

impl ScorerConfig {
    pub fn new(sensitivity: Sensitivity, extra_args: Vec<String>) -> Self {
        ScorerConfig {
            sensitivity,
            extra_args,
        }
    }

    pub fn label(&self) -> &'static str {
        self.sensitivity.label()
    }

    /// Full argument list appended to `diamond blastx`
    pub fn blastx_args(&self) -> Vec<String> {
        let mut args = self.extra_args.clone();
        if let Some(flag) = self.sensitivity.flag() {
            args.push(flag.to_string());
        }
        args
    }
}

/// Parse a comma-separated list of sensitivities, keeping the given order
pub fn parse_sensitivity_list(s: &str) -> Result<Vec<Sensitivity>> {
    s.split(',')
        .map(|item| {
            if item.trim().is_empty() {
                anyhow::bail!("Empty entry in sensitivity list '{}'", s);
            }
            item.parse()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for s in Sensitivity::BY_COST {
            assert_eq!(s.label().parse::<Sensitivity>().unwrap(), s);
        }
        assert_eq!("--ultra-sensitive".parse::<Sensitivity>().unwrap(), Sensitivity::UltraSensitive);
        assert!("turbo".parse::<Sensitivity>().is_err());
    }

    #[test]
    fn test_blastx_args_append_flag() {
        let config = ScorerConfig::new(Sensitivity::Fast, vec!["--threads".into(), "1".into()]);
        assert_eq!(config.blastx_args(), vec!["--threads", "1", "--fast"]);

        let default = ScorerConfig::new(Sensitivity::Default, Vec::new());
        assert!(default.blastx_args().is_empty());
        assert_eq!(default.label(), "default");
    }

    #[test]
    fn test_parse_list_keeps_order() {
        let list = parse_sensitivity_list("sensitive,default,faster").unwrap();
        assert_eq!(
            list,
            vec![Sensitivity::Sensitive, Sensitivity::Default, Sensitivity::Faster]
        );
        assert!(parse_sensitivity_list("fast,bogus").is_err());
    }

    #[test]
    fn test_parse_list_rejects_empty_entries() {
        for input in ["fast,", ",fast", "fast,,sensitive", "", " "] {
            let err = parse_sensitivity_list(input).unwrap_err();
            assert!(err.to_string().contains("Empty entry"), "{input:?}: {err}");
        }
        assert_eq!(
            parse_sensitivity_list(" fast , default ").unwrap(),
            vec![Sensitivity::Fast, Sensitivity::Default]
        );
    }
}
