//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Environment variables the binary reads, cleared for every test run
const INHERITED_ENV: &[&str] = &[
    "MANIFEST",
    "SOURCES",
    "HASH_DIR",
    "PARALLEL_BUILDS",
    "PKG_DEBUG",
    "PKG_BUILD_MANIFEST",
    "PKGPLAN_CONFIG",
    "PKGPLAN_METADATA_COMMAND",
    "RUST_LOG",
];

/// Test project context
///
/// A temporary build tree with a manifest, a `sources/` directory with one
/// checkout per source, a hash record directory and a metadata command that
/// echoes the control file. Control files therefore hold the parser's JSON
/// output directly.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        };
        project.create_dir("sources");
        project.create_dir("config");
        project.write_metadata_script();
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Write the build manifest
    pub fn write_manifest(&self, yaml: &str) {
        self.create_file("build.manifest", yaml);
    }

    /// Create a checkout whose source produces `<name>-bin`
    ///
    /// `build_deps` are binary package names, e.g. `"zfs-bin (>= 2.2)"`.
    pub fn add_source(&self, name: &str, build_deps: &[&str]) {
        self.add_source_with_runtime(name, build_deps, &[]);
    }

    /// Like [`Self::add_source`], with runtime dependencies of `<name>-bin`
    pub fn add_source_with_runtime(&self, name: &str, build_deps: &[&str], runtime: &[&str]) {
        let depends: Vec<&str> = std::iter::once("${misc:Depends}").chain(runtime.iter().copied()).collect();
        let control = serde_json::json!({
            "source_package": {"name": name, "build_depends": build_deps.join(", ")},
            "binary_packages": [{"name": format!("{name}-bin"), "depends": depends.join(", ")}],
        });
        self.create_file(&format!("sources/{name}/debian/control"), &control.to_string());
    }

    /// Create a checkout without any packaging
    pub fn add_bare_source(&self, name: &str) {
        self.create_dir(&format!("sources/{name}"));
    }

    /// Record the commit a source was last built from
    pub fn record_hash(&self, name: &str, sha: &str) {
        self.create_file(&format!("hashes/{name}.hash"), &format!("{sha}\n"));
    }

    /// Checkout directory of a source
    pub fn checkout(&self, name: &str) -> PathBuf {
        self.dir.path().join("sources").join(name)
    }

    /// Build a pkgplan invocation pointed at this project
    pub fn command(&self, args: &[&str]) -> Command {
        let root = self.dir.path();
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pkgplan"));
        for var in INHERITED_ENV {
            cmd.env_remove(var);
        }
        cmd.current_dir(root)
            .env("MANIFEST", root.join("build.manifest"))
            .env("SOURCES", root.join("sources"))
            .env("HASH_DIR", root.join("hashes"))
            .env("PKGPLAN_METADATA_COMMAND", root.join("parse_deps.sh"))
            .env("PKGPLAN_CONFIG_DIR", root.join("config"))
            .args(args);
        cmd
    }

    /// Run pkgplan with `args`
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute pkgplan")
    }

    fn write_metadata_script(&self) {
        let path = self.dir.path().join("parse_deps.sh");
        std::fs::write(&path, "#!/bin/sh\nexec cat \"$1\"\n").expect("Failed to write script");
        make_executable(&path);
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}

/// Stdout as a string
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Stderr as a string
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Run git in `dir` with a fixed identity
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {args:?} failed in {}", dir.display());
}

/// Sample manifest: kernel, zfs (kernel module), middleware, samba, truenas umbrella
pub const SAMPLE_MANIFEST: &str = r#"
code_name: test
sources:
  - name: kernel
    repo: https://example.com/linux
    branch: master
  - name: zfs
    kernel_module: true
    branch: release
  - name: middleware
  - name: samba
  - name: truenas
"#;

/// Populate the checkouts for [`SAMPLE_MANIFEST`]
///
/// Expected layers: `[kernel, samba]`, `[zfs]`, `[middleware]`, `[truenas]`.
pub fn sample_project() -> TestProject {
    let project = TestProject::new();
    project.write_manifest(SAMPLE_MANIFEST);
    project.add_bare_source("kernel");
    project.add_source("zfs", &["debhelper (>= 12)", "libssl-dev"]);
    project.add_source("middleware", &["python3-dev", "zfs-bin | zfs-compat"]);
    project.add_source("samba", &["libacl1-dev [linux-any]"]);
    project.add_source_with_runtime("truenas", &["debhelper"], &["middleware-bin", "samba-bin (= 4.19)"]);
    project
}

/// Source names per batch of a YAML or JSON plan
pub fn batch_names(plan: &str) -> Vec<Vec<String>> {
    let batches: Vec<Vec<serde_yaml::Value>> =
        serde_yaml::from_str(plan).expect("Plan is not a list of batches");
    batches
        .iter()
        .map(|batch| {
            batch
                .iter()
                .map(|source| {
                    source["name"]
                        .as_str()
                        .expect("Source without a name")
                        .to_string()
                })
                .collect()
        })
        .collect()
}
