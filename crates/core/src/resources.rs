//! Read-only table of resources compiled into the binary.
//!
//! Buildpacks ship small helper scripts alongside their code. Rather than
//! reading them from disk at build time, they are embedded with
//! `include_str!` and looked up by logical name.
//!
//! ```ignore
//! static RESOURCES: StaticResources = StaticResources::new(&[(
//!     "/helper.sh",
//!     include_str!("../resources/helper.sh"),
//! )]);
//!
//! let script = RESOURCES.get("/helper.sh")?;
//! ```

use crate::{Error, Result};

/// Embedded resources keyed by exact name.
#[derive(Debug, Clone, Copy)]
pub struct StaticResources {
    entries: &'static [(&'static str, &'static str)],
}

impl StaticResources {
    /// Create a table over compile-time entries.
    #[must_use]
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Look up a resource by exact name.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceLoad` if no resource has that name.
    pub fn get(&self, name: &str) -> Result<&'static str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, body)| *body)
            .ok_or_else(|| Error::resource_load(name))
    }

    /// Names of all embedded resources.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(key, _)| *key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TABLE: StaticResources =
        StaticResources::new(&[("/a.sh", "echo a\n"), ("/b.sh", "echo b\n")]);

    #[test]
    fn test_get_by_exact_name() {
        assert_eq!(TABLE.get("/a.sh").unwrap(), "echo a\n");
        assert_eq!(TABLE.get("/b.sh").unwrap(), "echo b\n");
    }

    #[test]
    fn test_get_missing() {
        let err = TABLE.get("a.sh").unwrap_err();
        assert!(matches!(err, Error::ResourceLoad { ref name } if name == "a.sh"));
        assert_eq!(err.to_string(), "Unable to load bundled resource a.sh");
    }

    #[test]
    fn test_names() {
        assert_eq!(TABLE.names().collect::<Vec<_>>(), vec!["/a.sh", "/b.sh"]);
    }
}
