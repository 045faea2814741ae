use std::path::PathBuf;

/// Errors from building, validating, extracting or storing an event log.
#[derive(Debug, thiserror::Error)]
pub enum OcelError {
    /// Two objects share an identifier.
    #[error("duplicate object id '{0}'")]
    DuplicateObject(String),

    /// Two events share an identifier.
    #[error("duplicate event id '{0}'")]
    DuplicateEvent(String),

    /// A relationship points at an object that does not exist.
    #[error("'{from}' references unknown object '{target}' ({qualifier})")]
    DanglingReference {
        from: String,
        target: String,
        qualifier: String,
    },

    /// One type name is declared twice, e.g. a component type named like a
    /// workstation type.
    #[error("{kind} type '{name}' is declared more than once")]
    ConflictingType { kind: &'static str, name: String },

    /// An object or event uses a type the log does not declare.
    #[error("{kind} type '{name}' is not declared")]
    UndeclaredType { kind: &'static str, name: String },

    /// A timestamp string could not be parsed.
    #[error("'{owner}': bad timestamp '{value}': {detail}")]
    BadTimestamp {
        owner: String,
        value: String,
        detail: String,
    },

    /// An event lacks a required relationship.
    #[error("event '{event}' has no '{qualifier}' relationship")]
    MissingQualifier {
        event: String,
        qualifier: &'static str,
    },

    /// An event or object lacks a required attribute, or holds a value of the
    /// wrong kind.
    #[error("'{owner}': missing or malformed attribute '{name}'")]
    MissingAttribute { owner: String, name: &'static str },

    /// An event identifier is not of the form `e{number}`.
    #[error("malformed event id '{0}'")]
    MalformedEventId(String),

    /// An I/O error occurred.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid OCEL JSON document.
    #[error("invalid OCEL JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
