//! Error types for bindpack

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for layer contribution and dependency handling
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A bundled resource could not be found in the embedded table
    #[error("Unable to load bundled resource {name}")]
    #[diagnostic(
        code(bindpack::resource_load),
        help("The resource is compiled into the binary; this indicates a packaging defect")
    )]
    ResourceLoad {
        /// Logical name of the resource
        name: String,
    },

    /// Copying an artifact into a layer failed
    #[error("Unable to copy artifact to {}", path.display())]
    #[diagnostic(
        code(bindpack::copy),
        help("Check free disk space and permissions on the layer directory")
    )]
    Copy {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Destination of the copy
        path: Box<Path>,
    },

    /// Creating a directory failed
    #[error("Unable to create directory {}", path.display())]
    #[diagnostic(
        code(bindpack::directory_create),
        help("Check permissions on the parent directory")
    )]
    DirectoryCreate {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Directory that could not be created
        path: Box<Path>,
    },

    /// Creating a symlink failed
    #[error("Unable to link {} to {}", original.display(), link.display())]
    #[diagnostic(
        code(bindpack::symlink),
        help("Remove any regular file or directory already present at the link path")
    )]
    Symlink {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path the symlink points at
        original: Box<Path>,
        /// Path of the symlink itself
        link: Box<Path>,
    },

    /// Generic I/O error with path context
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(bindpack::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "rename")
        operation: String,
    },

    /// Downloading a dependency failed
    #[error("Unable to download {uri}: {message}")]
    #[diagnostic(
        code(bindpack::download),
        help("Check network access or provide an offline dependency cache")
    )]
    Download {
        /// URI being downloaded
        uri: String,
        /// Error message
        message: String,
    },

    /// The downloaded artifact does not match the expected checksum
    #[error("SHA256 mismatch for {uri}: expected {expected}, computed {actual}")]
    #[diagnostic(code(bindpack::checksum_mismatch))]
    ChecksumMismatch {
        /// URI of the artifact
        uri: String,
        /// Checksum declared by the dependency descriptor
        expected: String,
        /// Checksum of the received bytes
        actual: String,
    },

    /// No dependency matched the requested id, version and stack
    #[error("Unable to find dependency {id} {constraint} for stack {stack}")]
    #[diagnostic(
        code(bindpack::dependency_not_found),
        help("Check the version constraint against the dependencies declared in buildpack.toml")
    )]
    DependencyNotFound {
        /// Dependency id
        id: String,
        /// Version constraint that was requested
        constraint: String,
        /// Stack id of the build
        stack: String,
    },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    #[diagnostic(code(bindpack::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(code(bindpack::serialization))]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
    },

    /// A layer contribution callback failed
    #[error("Unable to contribute {layer} layer")]
    #[diagnostic(code(bindpack::contribution))]
    Contribution {
        /// Name of the layer being contributed
        layer: String,
        /// The failure raised while populating the layer
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a resource load error
    #[must_use]
    pub fn resource_load(name: impl Into<String>) -> Self {
        Self::ResourceLoad { name: name.into() }
    }

    /// Create a copy error
    #[must_use]
    pub fn copy(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Copy {
            source,
            path: path.as_ref().into(),
        }
    }

    /// Create a directory creation error
    #[must_use]
    pub fn directory_create(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::DirectoryCreate {
            source,
            path: path.as_ref().into(),
        }
    }

    /// Create a symlink error
    #[must_use]
    pub fn symlink(
        source: std::io::Error,
        original: impl AsRef<Path>,
        link: impl AsRef<Path>,
    ) -> Self {
        Self::Symlink {
            source,
            original: original.as_ref().into(),
            link: link.as_ref().into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a download error
    #[must_use]
    pub fn download(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Wrap a populate failure with the layer it was contributing
    #[must_use]
    pub fn contribution(layer: impl Into<String>, source: Self) -> Self {
        Self::Contribution {
            layer: layer.into(),
            source: Box::new(source),
        }
    }

    /// Path the error refers to, when there is one
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            Self::Copy { path, .. } | Self::DirectoryCreate { path, .. } => Some(path.to_path_buf()),
            Self::Symlink { link, .. } => Some(link.to_path_buf()),
            Self::Io { path, .. } => path.as_deref().map(Path::to_path_buf),
            Self::Contribution { source, .. } => source.path(),
            _ => None,
        }
    }
}

/// Result type for bindpack operations
pub type Result<T> = std::result::Result<T, Error>;
