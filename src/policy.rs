//! The operator-controlled consent policy: the current policy version, the
//! storage key, and the privacy-policy link targets. [`Policy::default`]
//! supplies the built-in constants; [`Policy::from_project_file`] loads a
//! `consent.yaml` overriding them.

use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_VERSION: &str = "1";
const DEFAULT_STORAGE_KEY: &str = "cais-consent";
const DEFAULT_POLICY_ROOT: &str = "privacy-policy.html";
const DEFAULT_POLICY_NESTED: &str = "../privacy-policy.html";

#[derive(Deserialize)]
struct StorageKey(String);
impl Default for StorageKey {
    fn default() -> Self {
        StorageKey(DEFAULT_STORAGE_KEY.to_owned())
    }
}

#[derive(Deserialize)]
struct PolicyRoot(String);
impl Default for PolicyRoot {
    fn default() -> Self {
        PolicyRoot(DEFAULT_POLICY_ROOT.to_owned())
    }
}

#[derive(Deserialize)]
struct PolicyNested(String);
impl Default for PolicyNested {
    fn default() -> Self {
        PolicyNested(DEFAULT_POLICY_NESTED.to_owned())
    }
}

/// The shape of a `consent.yaml` project file. Only `version` is required;
/// everything else falls back to the built-in constants.
#[derive(Deserialize)]
struct ProjectPolicy {
    version: String,

    #[serde(default)]
    storage_key: StorageKey,

    #[serde(default)]
    privacy_policy_root: PolicyRoot,

    #[serde(default)]
    privacy_policy_nested: PolicyNested,
}

/// The resolved policy consulted by every other part of the component.
#[derive(Clone, Debug)]
pub struct Policy {
    /// The current policy version. Any stored record whose version differs
    /// is treated as "no decision", forcing a re-prompt.
    pub version: String,

    /// The fixed key the serialized record is stored under.
    pub storage_key: String,

    /// Privacy-policy href for pages at the site root.
    pub privacy_policy_root: String,

    /// Privacy-policy href for pages in a nested section.
    pub privacy_policy_nested: String,
}

impl Default for Policy {
    fn default() -> Policy {
        Policy {
            version: DEFAULT_VERSION.to_owned(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            privacy_policy_root: DEFAULT_POLICY_ROOT.to_owned(),
            privacy_policy_nested: DEFAULT_POLICY_NESTED.to_owned(),
        }
    }
}

impl Policy {
    /// Loads a policy from a `consent.yaml` project file. Unlike every other
    /// operation in this component, loading failures are real errors: the
    /// operator needs to know their configuration is broken.
    pub fn from_project_file(path: &Path) -> Result<Policy> {
        let file = std::fs::File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        Policy::from_reader(file)
    }

    /// Loads a policy from YAML read from `reader`.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Policy> {
        let project: ProjectPolicy = serde_yaml::from_reader(reader)?;
        Ok(Policy {
            version: project.version,
            storage_key: project.storage_key.0,
            privacy_policy_root: project.privacy_policy_root.0,
            privacy_policy_nested: project.privacy_policy_nested.0,
        })
    }
}

/// The result of a fallible policy-loading operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the policy project file.
#[derive(Debug)]
pub enum Error {
    /// The project file couldn't be opened.
    Open { path: PathBuf, err: io::Error },

    /// The project file isn't valid policy YAML.
    Parse(serde_yaml::Error),
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator when deserializing the project file.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Parse(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening policy file `{}`: {}", path.display(), err)
            }
            Error::Parse(err) => write!(f, "Parsing policy file: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse(err) => Some(err),
        }
    }
}
