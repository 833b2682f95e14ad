//! End-to-end tests for the build step

use bindpack::build;
use bindpack::cli::BuildArgs;
use bindpack_core::{BuildpackPlan, Error};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const JAR: &[u8] = b"spring cloud bindings 1.13.0";

struct Workspace {
    tmp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let deps = tmp.path().join("deps");
        std::fs::create_dir_all(&deps).unwrap();
        std::fs::write(deps.join("spring-cloud-bindings-1.13.0.jar"), JAR).unwrap();
        std::fs::write(deps.join("spring-cloud-bindings-2.0.0.jar"), b"v2").unwrap();

        let buildpack = tmp.path().join("buildpack");
        std::fs::create_dir_all(&buildpack).unwrap();
        std::fs::write(
            buildpack.join("buildpack.toml"),
            format!(
                r#"api = "0.7"

[buildpack]
id = "bindpack/spring-boot"
version = "0.3.0"

[[metadata.dependencies]]
id = "spring-cloud-bindings"
name = "Spring Cloud Bindings"
version = "1.13.0"
uri = "file://{deps}/spring-cloud-bindings-1.13.0.jar"
sha256 = "{sha1}"
stacks = ["io.buildpacks.stacks.jammy"]
purl = "pkg:generic/springframework/spring-cloud-bindings@1.13.0"
cpes = ["cpe:2.3:a:vmware:spring_cloud_bindings:1.13.0:*:*:*:*:*:*:*"]

[[metadata.dependencies.licenses]]
type = "Apache-2.0"
uri = "https://github.com/spring-cloud/spring-cloud-bindings/blob/main/LICENSE"

[[metadata.dependencies]]
id = "spring-cloud-bindings"
name = "Spring Cloud Bindings"
version = "2.0.0"
uri = "file://{deps}/spring-cloud-bindings-2.0.0.jar"
sha256 = "{sha2}"
stacks = ["io.buildpacks.stacks.jammy"]
"#,
                deps = deps.display(),
                sha1 = hex::encode(Sha256::digest(JAR)),
                sha2 = hex::encode(Sha256::digest(b"v2")),
            ),
        )
        .unwrap();

        let app = tmp.path().join("workspace");
        std::fs::create_dir_all(app.join("META-INF")).unwrap();
        std::fs::write(
            app.join("META-INF/MANIFEST.MF"),
            "Manifest-Version: 1.0\nSpring-Boot-Lib: BOOT-INF/lib/\n",
        )
        .unwrap();

        Self { tmp }
    }

    fn path(&self) -> &Path {
        self.tmp.path()
    }

    fn args(&self) -> BuildArgs {
        BuildArgs {
            layers_dir: self.path().join("layers"),
            buildpack_dir: self.path().join("buildpack"),
            stack: "io.buildpacks.stacks.jammy".into(),
            app_dir: self.path().join("workspace"),
            cache_dir: Some(self.path().join("cache")),
            dependency_cache: None,
            version: "1".into(),
            disabled: false,
        }
    }

    fn link(&self, name: &str) -> PathBuf {
        self.path().join("workspace/BOOT-INF/lib").join(name)
    }
}

#[test]
fn test_build_contributes_and_persists() {
    let ws = Workspace::new();

    let layer = build::run(&ws.args()).unwrap().unwrap();

    assert_eq!(layer.name, "spring-cloud-bindings");
    assert!(layer.types.launch);
    assert_eq!(
        std::fs::read(ws.link("spring-cloud-bindings-1.13.0.jar")).unwrap(),
        JAR
    );
    let toml =
        std::fs::read_to_string(ws.path().join("layers/spring-cloud-bindings.toml")).unwrap();
    assert!(toml.contains("launch = true"));
    assert!(
        ws.path()
            .join("layers/spring-cloud-bindings/profile.d/spring-cloud-bindings.sh")
            .is_file()
    );
    assert!(
        ws.path()
            .join("cache/downloads")
            .join(hex::encode(Sha256::digest(JAR)))
            .join("spring-cloud-bindings-1.13.0.jar")
            .is_file()
    );
}

#[test]
fn test_build_is_repeatable() {
    let ws = Workspace::new();
    build::run(&ws.args()).unwrap();

    // The source artifact is gone; a rebuild must not need it
    std::fs::remove_dir_all(ws.path().join("deps")).unwrap();
    std::fs::remove_dir_all(ws.path().join("cache")).unwrap();

    let layer = build::run(&ws.args()).unwrap().unwrap();

    assert!(layer.types.launch);
    assert_eq!(layer.profile.len(), 1);
    assert_eq!(
        std::fs::read(ws.link("spring-cloud-bindings-1.13.0.jar")).unwrap(),
        JAR
    );
}

#[test]
fn test_build_selects_version_constraint() {
    let ws = Workspace::new();
    let mut args = ws.args();
    args.version = "2".into();

    build::run(&args).unwrap();

    assert_eq!(
        std::fs::read(ws.link("spring-cloud-bindings-2.0.0.jar")).unwrap(),
        b"v2"
    );
}

#[test]
fn test_build_disabled() {
    let ws = Workspace::new();
    let mut args = ws.args();
    args.disabled = true;

    assert!(build::run(&args).unwrap().is_none());
    assert!(!ws.path().join("layers/spring-cloud-bindings").exists());
}

#[test]
fn test_build_unknown_version() {
    let ws = Workspace::new();
    let mut args = ws.args();
    args.version = "3".into();

    let err = build::run(&args).unwrap_err();
    assert!(matches!(err, Error::DependencyNotFound { .. }));
}

#[test]
fn test_build_uses_offline_dependency_cache() {
    let ws = Workspace::new();
    let sha = hex::encode(Sha256::digest(JAR));
    let offline = ws.path().join("buildpack/dependencies");
    std::fs::create_dir_all(offline.join(&sha)).unwrap();
    std::fs::write(
        offline.join(&sha).join("spring-cloud-bindings-1.13.0.jar"),
        JAR,
    )
    .unwrap();
    std::fs::write(
        offline.join(format!("{sha}.toml")),
        format!(
            "id = \"spring-cloud-bindings\"\nversion = \"1.13.0\"\nuri = \"https://example.invalid/spring-cloud-bindings-1.13.0.jar\"\nsha256 = \"{sha}\"\n"
        ),
    )
    .unwrap();
    std::fs::remove_dir_all(ws.path().join("deps")).unwrap();

    build::run(&ws.args()).unwrap();

    assert_eq!(
        std::fs::read(ws.link("spring-cloud-bindings-1.13.0.jar")).unwrap(),
        JAR
    );
    assert!(!ws.path().join("cache/downloads").join(&sha).exists());
}

#[test]
fn test_build_missing_buildpack_toml() {
    let ws = Workspace::new();
    let mut args = ws.args();
    args.buildpack_dir = ws.path().join("nowhere");

    let err = build::run(&args).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_build_writes_plan() {
    let ws = Workspace::new();

    build::run(&ws.args()).unwrap();

    let plan = BuildpackPlan::load(&ws.path().join("layers/plan.toml"))
        .unwrap()
        .unwrap();
    assert_eq!(plan.entries.len(), 1);
    let entry = plan.entry("spring-cloud-bindings").unwrap();
    assert_eq!(entry.version, "1.13.0");
    assert_eq!(entry.licenses[0].kind.as_deref(), Some("Apache-2.0"));
    assert_eq!(
        entry.purl.as_deref(),
        Some("pkg:generic/springframework/spring-cloud-bindings@1.13.0")
    );
    assert_eq!(entry.cpes.len(), 1);
}

#[test]
fn test_build_disabled_writes_no_plan() {
    let ws = Workspace::new();
    let mut args = ws.args();
    args.disabled = true;

    build::run(&args).unwrap();

    assert!(!ws.path().join("layers/plan.toml").exists());
}
