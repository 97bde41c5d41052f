//! Default configuration values

/// Default number of packages built concurrently per batch
pub const DEFAULT_PARALLEL_BUILDS: usize = 4;

/// Umbrella package aggregating the whole product; always rebuilt
pub const DEFAULT_UMBRELLA_PACKAGE: &str = "truenas";

/// Package that kernel module sources implicitly build-depend on
pub const DEFAULT_KERNEL_PACKAGE: &str = "kernel";

/// Sources that carry no usable control file and are treated as leaves
pub const DEFAULT_BOOTSTRAP_PACKAGES: &[&str] = &["kernel"];

/// Command turning a control file into JSON package metadata
pub const DEFAULT_METADATA_COMMAND: &str = "./scripts/parse_deps.pl";

/// Control file location relative to a source checkout
pub const DEFAULT_CONTROL_PATH: &str = "debian/control";

/// Control file name inside an explicit `deps_path`
pub const CONTROL_FILE_NAME: &str = "control";

/// Extension of per-package hash records
pub const HASH_FILE_EXTENSION: &str = "hash";

/// Default manifest location
pub const DEFAULT_MANIFEST_PATH: &str = "conf/build.manifest";

/// Default directory holding source checkouts
pub const DEFAULT_SOURCES_DIR: &str = "sources";

/// Default directory holding hash records
pub const DEFAULT_HASH_DIR: &str = "tmp/pkghashes";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
