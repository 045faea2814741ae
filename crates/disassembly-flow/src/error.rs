use std::path::PathBuf;

/// Errors from deriving, laying out or exporting a flow graph.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// An event has no `Station` relationship.
    #[error("event '{event}' has no station")]
    MissingStation { event: String },

    /// An event references an object missing from the log.
    #[error("event '{event}' references unknown object '{object}'")]
    UnknownObject { event: String, object: String },

    /// Two nodes of different kinds share an id, e.g. an event type named
    /// like an object type.
    #[error("{added} node '{id}' collides with an existing {existing} node")]
    DuplicateNode {
        id: String,
        existing: &'static str,
        added: &'static str,
    },

    /// A node id that is not part of the graph.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// An I/O error occurred.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON file could not be read or written.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The rendered SVG could not be parsed for rasterizing.
    #[error("cannot parse rendered SVG: {0}")]
    SvgParse(String),

    /// A raster image could not be encoded.
    #[error("cannot encode {path}: {detail}")]
    Encode { path: PathBuf, detail: String },

    /// The file extension names no supported image format.
    #[error("unsupported image format for file: {0}")]
    UnsupportedFormat(PathBuf),

    /// The view has zero width or height.
    #[error("cannot rasterize an empty canvas")]
    EmptyCanvas,

    /// The raster canvas would exceed the pixel limit.
    #[error("canvas of {width}x{height} pixels exceeds the raster size limit")]
    CanvasTooLarge { width: u64, height: u64 },
}
