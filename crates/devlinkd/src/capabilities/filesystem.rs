//! Sandboxed file storage.
//!
//! Paths supplied by the controller are relative to the sandbox root. The
//! [`SandboxFileStore`] opens the root as a capability directory with
//! `cap-std`, so lookups cannot leave it even through symlinks. Absolute
//! paths and `..` components are rejected before reaching the directory.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use devlink_protocol::Payload;

use super::{CAPABILITY_TARGET, CapabilityError};
use crate::dispatch::RegistryBuilder;
use crate::dispatch::params::ParamReader;

const MODULE: &str = "filesystem";
const DEFAULT_PATH: &str = "file.txt";

/// Stores and retrieves files for the controller.
pub trait FileStore: Send + Sync {
    /// Writes `contents` to `path`, creating parent directories, and returns
    /// the resolved location.
    fn write(&self, path: &str, contents: &[u8]) -> Result<PathBuf, CapabilityError>;

    /// Reads the file at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>, CapabilityError>;
}

/// File store confined to a single directory tree.
#[derive(Debug)]
pub struct SandboxFileStore {
    root: PathBuf,
    dir: Dir,
}

impl SandboxFileStore {
    /// Opens (creating if needed) the sandbox rooted at `root`.
    ///
    /// A relative `root` is resolved against the working directory so that
    /// written paths are always absolute.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: &Utf8Path) -> Result<Self, CapabilityError> {
        std::fs::create_dir_all(root).map_err(|error| CapabilityError::io(&error))?;
        let resolved = std::path::absolute(root).map_err(|error| CapabilityError::io(&error))?;
        let dir = Dir::open_ambient_dir(&resolved, ambient_authority())
            .map_err(|error| CapabilityError::io(&error))?;
        Ok(Self {
            root: resolved,
            dir,
        })
    }

    /// Directory the sandbox is rooted at.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileStore for SandboxFileStore {
    fn write(&self, path: &str, contents: &[u8]) -> Result<PathBuf, CapabilityError> {
        let relative = sandboxed(path)?;
        if let Some(parent) = relative.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            self.dir
                .create_dir_all(parent)
                .map_err(|error| CapabilityError::io(&error))?;
        }
        self.dir
            .write(relative, contents)
            .map_err(|error| CapabilityError::io(&error))?;
        debug!(
            target: CAPABILITY_TARGET,
            path,
            bytes = contents.len(),
            "wrote sandbox file"
        );
        Ok(self.root.join(relative))
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, CapabilityError> {
        let relative = sandboxed(path)?;
        self.dir.read(relative).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => CapabilityError::not_found(path),
            _ => CapabilityError::io(&error),
        })
    }
}

/// Validates that `path` names a location inside the sandbox.
fn sandboxed(path: &str) -> Result<&Path, CapabilityError> {
    let candidate = Path::new(path);
    if path.trim().is_empty() {
        return Err(CapabilityError::invalid_parameter("path", "path is empty"));
    }
    let escapes = candidate.components().any(|component| {
        matches!(
            component,
            Component::RootDir | Component::Prefix(_) | Component::ParentDir
        )
    });
    if escapes {
        return Err(CapabilityError::invalid_parameter(
            "path",
            "path must stay inside the sandbox",
        ));
    }
    Ok(candidate)
}

pub(crate) fn register(builder: RegistryBuilder, store: Arc<dyn FileStore>) -> RegistryBuilder {
    let reader = Arc::clone(&store);
    builder
        .register(MODULE, "write", None, move |params| {
            let path = params.text_or("path", DEFAULT_PATH)?;
            let contents = match params.optional_text("data_base64")? {
                Some(encoded) => STANDARD.decode(encoded.as_bytes()).map_err(|error| {
                    CapabilityError::invalid_parameter("data_base64", error.to_string())
                })?,
                None => params.text_or("data", "")?.into_bytes(),
            };
            let written = store.write(&path, &contents)?;
            Ok(Payload::new().with("path", written.to_string_lossy().into_owned()))
        })
        .register(MODULE, "read", None, move |params| {
            let path = params.text_or("path", DEFAULT_PATH)?;
            let contents = reader.read(&path)?;
            Ok(Payload::new().with("data_base64", STANDARD.encode(contents)))
        })
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;

    struct Sandbox {
        _temp: TempDir,
        store: SandboxFileStore,
    }

    #[fixture]
    fn sandbox() -> Sandbox {
        let temp = TempDir::new().expect("temporary directory");
        let root = Utf8PathBuf::from_path_buf(temp.path().join("sandbox"))
            .expect("temporary path is UTF-8");
        let store = SandboxFileStore::open(&root).expect("open sandbox");
        Sandbox { _temp: temp, store }
    }

    #[rstest]
    fn writes_create_parent_directories(sandbox: Sandbox) {
        let written = sandbox
            .store
            .write("logs/today/run.txt", b"ok")
            .expect("write");
        assert_eq!(written, sandbox.store.root().join("logs/today/run.txt"));
        assert_eq!(sandbox.store.read("logs/today/run.txt").expect("read"), b"ok");
    }

    #[test]
    fn relative_roots_yield_absolute_paths() {
        let temp = tempfile::Builder::new()
            .prefix("sandbox")
            .tempdir_in(".")
            .expect("temporary directory in working directory");
        let name = temp
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .expect("temporary name is UTF-8");
        let store = SandboxFileStore::open(Utf8Path::new(name)).expect("open sandbox");

        let written = store.write("a.txt", b"x").expect("write");

        assert!(written.is_absolute(), "{}", written.display());
        assert!(written.ends_with(Path::new(name).join("a.txt")));
        assert_eq!(std::fs::read(&written).expect("read back"), b"x");
    }

    #[rstest]
    fn missing_files_are_not_found(sandbox: Sandbox) {
        assert_eq!(
            sandbox.store.read("absent.txt"),
            Err(CapabilityError::not_found("absent.txt"))
        );
    }

    #[rstest]
    #[case::absolute("/etc/passwd")]
    #[case::parent("../outside.txt")]
    #[case::nested_parent("notes/../../outside.txt")]
    #[case::empty("")]
    fn escaping_paths_are_rejected(sandbox: Sandbox, #[case] path: &str) {
        assert!(matches!(
            sandbox.store.write(path, b"x"),
            Err(CapabilityError::InvalidParameter { .. })
        ));
    }

    #[rstest]
    fn base64_payloads_are_decoded(sandbox: Sandbox) {
        use devlink_protocol::Params;

        use crate::dispatch::CapabilityRegistry;

        let store: Arc<dyn FileStore> = Arc::new(sandbox.store);
        let registry = register(CapabilityRegistry::builder(), Arc::clone(&store))
            .build()
            .expect("build registry");
        registry
            .lookup(MODULE, "write")
            .expect("registered")
            .invoke(&Params::new().with("data_base64", "AAEC"))
            .expect("write");
        assert_eq!(store.read(DEFAULT_PATH).expect("read"), vec![0, 1, 2]);
    }
}
