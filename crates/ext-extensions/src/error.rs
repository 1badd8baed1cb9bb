/// Errors raised while cataloguing and resolving extensions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Extension absent from the catalog.
    #[error("extension not found: {0}")]
    NotFound(String),

    /// A transitively required extension is absent from the catalog.
    #[error("'{name}' requires '{missing}', which is not available")]
    MissingDependency { name: String, missing: String },

    /// A required extension exists but its version fails the constraint.
    #[error("'{name}' requires '{dependency}' ({constraint}), but version {found} is available")]
    IncompatibleVersion {
        name: String,
        dependency: String,
        constraint: String,
        found: String,
    },

    /// The dependency graph contains a cycle; `members` lists the nodes on it.
    #[error("dependency cycle detected among: {}", .members.join(", "))]
    CycleDetected { members: Vec<String> },

    /// Malformed dependency declaration.
    #[error("invalid dependency '{spec}': {reason}")]
    InvalidDependency { spec: String, reason: String },

    /// Malformed extension version.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Malformed version constraint.
    #[error("invalid version constraint '{constraint}': {reason}")]
    VersionConstraintParse { constraint: String, reason: String },

    /// Info file or name validation error.
    #[error(transparent)]
    Meta(#[from] ext_meta::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
