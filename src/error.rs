use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Any failure that aborts a layout run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Overlap(#[from] OverlapError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Referential integrity violations of the graph store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("edge {edge} references an unknown node: {endpoint}")]
    UnknownEndpoint { edge: String, endpoint: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("<{element}> is missing the required attribute `{attribute}`")]
    MissingAttribute { element: String, attribute: String },

    #[error("<{element}> attribute `{attribute}` is not a valid number: {value:?}")]
    InvalidNumber {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("not a GEXF document (root element is <{root}>)")]
    UnsupportedFormat { root: String },

    #[error("graph verification failed: {0}")]
    Graph(#[from] GraphError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid layout parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("non-finite displacement for node {node} at iteration {iteration}")]
    NonFiniteDisplacement { node: String, iteration: u32 },
}

/// Computation faults of the overlap passes.
///
/// Running out of iterations with overlaps left is not an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverlapError {
    #[error("invalid label parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("node {node} has a malformed bounding shape ({half_width} x {half_height})")]
    MalformedShape {
        node: String,
        half_width: f64,
        half_height: f64,
    },

    #[error("node {node} has a non-finite position")]
    NonFinitePosition { node: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to serialize GEXF document: {source}")]
    Render {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("cannot move from {from} to {to}")]
    OutOfOrder {
        from: crate::pipeline::PipelineState,
        to: crate::pipeline::PipelineState,
    },
}
