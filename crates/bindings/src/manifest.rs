//! `META-INF/MANIFEST.MF` lookup for Spring Boot applications.

use bindpack_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Library directory used when the manifest does not name one.
pub const DEFAULT_SPRING_BOOT_LIB: &str = "BOOT-INF/lib/";

/// Main attributes of a JAR manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest(BTreeMap<String, String>);

impl Manifest {
    /// Parse manifest content. Continuation lines start with a single space.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut current: Option<(String, String)> = None;

        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if let Some(rest) = line.strip_prefix(' ') {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(rest);
                }
                continue;
            }

            if let Some((key, value)) = current.take() {
                entries.insert(key, value);
            }
            // Main section ends at the first blank line
            if line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                current = Some((key.trim().to_string(), value.trim_start().to_string()));
            }
        }
        if let Some((key, value)) = current {
            entries.insert(key, value);
        }

        Self(entries)
    }

    /// Read `<app_dir>/META-INF/MANIFEST.MF`. A missing manifest is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest exists but cannot be read.
    pub fn from_application(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join("META-INF").join("MANIFEST.MF");
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::io(e, &path, "read")),
        }
    }

    /// Get an attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// The application's library directory from `Spring-Boot-Lib`.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read.
pub fn spring_boot_lib(app_dir: &Path) -> Result<PathBuf> {
    let manifest = Manifest::from_application(app_dir)?;
    let lib = manifest
        .get("Spring-Boot-Lib")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(DEFAULT_SPRING_BOOT_LIB);
    Ok(app_dir.join(lib.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_main_section() {
        let manifest = Manifest::parse(
            "Manifest-Version: 1.0\r\nSpring-Boot-Lib: BOOT-INF/lib/\r\nMain-Class: org.springframework.boot.loader.JarLauncher\r\n",
        );
        assert_eq!(manifest.get("Manifest-Version"), Some("1.0"));
        assert_eq!(manifest.get("Spring-Boot-Lib"), Some("BOOT-INF/lib/"));
        assert_eq!(
            manifest.get("Main-Class"),
            Some("org.springframework.boot.loader.JarLauncher")
        );
    }

    #[test]
    fn test_parse_continuation_lines() {
        let manifest =
            Manifest::parse("Start-Class: com.example.really.long.package.name.Appl\n ication\n");
        assert_eq!(
            manifest.get("Start-Class"),
            Some("com.example.really.long.package.name.Application")
        );
    }

    #[test]
    fn test_parse_stops_at_first_section() {
        let manifest = Manifest::parse("A: 1\n\nName: foo\nB: 2\n");
        assert_eq!(manifest.get("A"), Some("1"));
        assert_eq!(manifest.get("B"), None);
    }

    #[test]
    fn test_spring_boot_lib_from_manifest() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("META-INF")).unwrap();
        std::fs::write(
            tmp.path().join("META-INF/MANIFEST.MF"),
            "Spring-Boot-Lib: WEB-INF/lib/\n",
        )
        .unwrap();

        assert_eq!(
            spring_boot_lib(tmp.path()).unwrap(),
            tmp.path().join("WEB-INF/lib/")
        );
    }

    #[test]
    fn test_spring_boot_lib_default() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(
            spring_boot_lib(tmp.path()).unwrap(),
            tmp.path().join(DEFAULT_SPRING_BOOT_LIB)
        );
    }
}
