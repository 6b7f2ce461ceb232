use thiserror::Error;

/// Unified error type for the assembly phase.
///
/// Every variant is detected synchronously while the graph is being built and
/// aborts the remaining assembly steps. Nothing here is raised at task
/// execution time.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A supplied option's value does not match one of its declared shapes.
    #[error("config option '{option}' has invalid shape: expected {expected}, got {actual}")]
    ConfigShape {
        option: String,
        expected: String,
        actual: String,
    },

    /// Auto-discovery found more than one eligible candidate for a slot.
    #[error("ambiguous auto-discovery for slot '{slot}': candidates {candidates:?}")]
    ResolutionAmbiguity {
        slot: String,
        candidates: Vec<String>,
    },

    /// A named optional collaborator does not resolve to a known type.
    #[error("collaborator '{name}' is not a known type")]
    MissingCollaborator { name: String },

    /// A resolved collaborator lacks a required operation.
    #[error("collaborator '{collaborator}' is missing required operation '{operation}'")]
    MissingCapability {
        collaborator: String,
        operation: String,
    },

    /// A placeholder referenced a parameter absent from the parameter table.
    #[error("unknown parameter '%{name}%' in argument expansion")]
    UnknownParameter { name: String },

    /// A registration key was added twice with a different recipe.
    #[error("registration '{key}' already exists with a different recipe")]
    DuplicateRegistration { key: String },

    /// A configuration document could not be decoded.
    #[error("failed to decode configuration document")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl AssemblyError {
    /// Create a config shape error.
    pub fn config_shape<O, E, A>(option: O, expected: E, actual: A) -> Self
    where
        O: Into<String>,
        E: Into<String>,
        A: Into<String>,
    {
        Self::ConfigShape {
            option: option.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an ambiguity error for a slot with the offending candidates.
    pub fn ambiguity<S: Into<String>>(slot: S, candidates: Vec<String>) -> Self {
        Self::ResolutionAmbiguity {
            slot: slot.into(),
            candidates,
        }
    }

    /// Create a missing collaborator error.
    pub fn missing_collaborator<S: Into<String>>(name: S) -> Self {
        Self::MissingCollaborator { name: name.into() }
    }

    /// Create a missing capability error naming the absent operation.
    pub fn missing_capability<C, O>(collaborator: C, operation: O) -> Self
    where
        C: Into<String>,
        O: Into<String>,
    {
        Self::MissingCapability {
            collaborator: collaborator.into(),
            operation: operation.into(),
        }
    }

    /// Create an unknown parameter error.
    pub fn unknown_parameter<S: Into<String>>(name: S) -> Self {
        Self::UnknownParameter { name: name.into() }
    }

    /// Create a duplicate registration error.
    pub fn duplicate_registration<S: Into<String>>(key: S) -> Self {
        Self::DuplicateRegistration { key: key.into() }
    }

    /// Get error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigShape { .. } => "config_shape",
            Self::ResolutionAmbiguity { .. } => "resolution",
            Self::MissingCollaborator { .. } => "collaborator",
            Self::MissingCapability { .. } => "capability",
            Self::UnknownParameter { .. } => "parameter",
            Self::DuplicateRegistration { .. } => "registration",
            Self::Serialization { .. } => "serialization",
        }
    }
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, AssemblyError>;

impl From<serde_json::Error> for AssemblyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            source: Box::new(err),
        }
    }
}

impl From<serde_yaml::Error> for AssemblyError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            source: Box::new(err),
        }
    }
}
