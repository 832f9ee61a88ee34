use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub(crate) const BANNER_MARKER: &str = "ServerMod - Version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerModKind {
    PluginLoaderSL,
    Exiled,
    ServerMod2,
}

impl ServerModKind {
    /// Build tag after the version in the banner; unknown tags mean ServerMod2.
    pub fn from_build(build: &str) -> Self {
        match build.trim() {
            "PluginLoaderSL" => Self::PluginLoaderSL,
            "EXILED" => Self::Exiled,
            _ => Self::ServerMod2,
        }
    }
}

impl fmt::Display for ServerModKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PluginLoaderSL => "PluginLoaderSL",
            Self::Exiled => "EXILED",
            Self::ServerMod2 => "ServerMod2",
        })
    }
}

/// Dotted numeric version. Components compare numerically; when one version
/// is a prefix of the other, the longer one is greater (`1.0 < 1.0.0.0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModVersion(Vec<u32>);

impl ModVersion {
    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl Ord for ModVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.cmp(b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| self.0.len().cmp(&other.0.len()))
    }
}

impl PartialOrd for ModVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError(String);

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version {:?}", self.0)
    }
}

impl std::error::Error for ParseVersionError {}

impl FromStr for ModVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseVersionError(s.to_string()));
        }
        trimmed
            .split('.')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| ParseVersionError(s.to_string()))
    }
}

impl fmt::Display for ModVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerMod {
    pub kind: ServerModKind,
    pub version: Option<ModVersion>,
}

impl ServerMod {
    /// Parse a `ServerMod - Version X[-BUILD]` banner line.
    pub fn from_banner(text: &str) -> Option<Self> {
        if !text.contains(BANNER_MARKER) {
            return None;
        }
        let stripped = text.replace(BANNER_MARKER, "");
        let mut parts = stripped.split('-');
        let version = parts.next().and_then(|raw| raw.parse().ok());
        let kind = ServerModKind::from_build(parts.next().unwrap_or("A"));
        Some(Self { kind, version })
    }
}

impl fmt::Display for ServerMod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {version}", self.kind),
            None => write!(f, "{} unknown", self.kind),
        }
    }
}
