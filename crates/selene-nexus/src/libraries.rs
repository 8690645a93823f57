//! Expansion of the `libraries.json` manifest published next to a build.
//!
//! The manifest lists Maven coordinates; each becomes a file name and a
//! download URL under the public repository.

use crate::NexusError;
use crate::http::{Fetch, get_json};
use serde::Deserialize;
use std::collections::BTreeMap;

const DEFAULT_EXTENSION: &str = "jar";

#[derive(Debug, Deserialize)]
pub struct LibrariesManifest {
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

/// One dependency declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LibraryEntry {
    pub group: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
}

impl LibraryEntry {
    /// `<name>-<version>[-<classifier>].<extension>`
    pub fn file_name(&self) -> String {
        let extension = self
            .extension
            .as_deref()
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_EXTENSION);
        match self.classifier.as_deref().filter(|c| !c.is_empty()) {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.name, self.version, classifier, extension
            ),
            None => format!("{}-{}.{}", self.name, self.version, extension),
        }
    }

    /// Standard Maven layout path below `public_base`.
    pub fn download_url(&self, public_base: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            public_base.trim_end_matches('/'),
            self.group.replace('.', "/"),
            self.name,
            self.version,
            self.file_name()
        )
    }
}

/// Fetch the manifest at `manifest_url` and map each library's file name to
/// its public download URL.
///
/// An empty `manifest_url` yields an empty map without any request. Entries
/// that produce the same file name overwrite earlier ones.
pub fn resolve_libraries(
    fetch: &dyn Fetch,
    manifest_url: &str,
    public_base: &str,
) -> Result<BTreeMap<String, String>, NexusError> {
    if manifest_url.is_empty() {
        return Ok(BTreeMap::new());
    }

    let manifest: LibrariesManifest = get_json(fetch, manifest_url)?;

    let libraries: BTreeMap<String, String> = manifest
        .libraries
        .iter()
        .map(|lib| (lib.file_name(), lib.download_url(public_base)))
        .collect();

    tracing::debug!(
        declared = manifest.libraries.len(),
        resolved = libraries.len(),
        "resolved libraries manifest"
    );

    Ok(libraries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StubFetch;

    const BASE: &str = "https://maven.example.com/repository/selene-public";
    const MANIFEST: &str = "https://maven.example.com/repository/selene-public/x-libraries.json";

    fn entry(classifier: Option<&str>, extension: Option<&str>) -> LibraryEntry {
        LibraryEntry {
            group: "a.b.c".to_string(),
            name: "lib".to_string(),
            version: "2.0".to_string(),
            classifier: classifier.map(str::to_string),
            extension: extension.map(str::to_string),
        }
    }

    #[test]
    fn test_file_name_defaults_to_jar() {
        assert_eq!(entry(None, None).file_name(), "lib-2.0.jar");
    }

    #[test]
    fn test_file_name_with_classifier() {
        assert_eq!(entry(Some("dist"), None).file_name(), "lib-2.0-dist.jar");
    }

    #[test]
    fn test_file_name_with_extension() {
        assert_eq!(
            entry(Some("natives-linux"), Some("zip")).file_name(),
            "lib-2.0-natives-linux.zip"
        );
    }

    #[test]
    fn test_empty_attributes_count_as_absent() {
        assert_eq!(entry(Some(""), Some("")).file_name(), "lib-2.0.jar");
    }

    #[test]
    fn test_download_url() {
        let url = entry(Some("dist"), None).download_url(BASE);
        assert_eq!(
            url,
            "https://maven.example.com/repository/selene-public/a/b/c/lib/2.0/lib-2.0-dist.jar"
        );
        assert!(url.contains("a/b/c/lib/2.0/lib-2.0-dist.jar"));
    }

    #[test]
    fn test_download_url_trailing_slash() {
        let url = entry(None, None).download_url("https://m/public/");
        assert_eq!(url, "https://m/public/a/b/c/lib/2.0/lib-2.0.jar");
    }

    #[test]
    fn test_empty_url_skips_fetch() {
        let fetch = StubFetch::new();
        let libraries = resolve_libraries(&fetch, "", BASE).unwrap();
        assert!(libraries.is_empty());
        assert!(fetch.requests().is_empty());
    }

    #[test]
    fn test_resolves_manifest() {
        let body = r#"{"libraries": [
            {"group": "a.b.c", "name": "lib", "version": "2.0", "classifier": "dist"},
            {"group": "org.lwjgl", "name": "lwjgl", "version": "3.3.3", "classifier": "natives-windows"},
            {"group": "com.google.code.gson", "name": "gson", "version": "2.10.1"}
        ]}"#;
        let fetch = StubFetch::new().with_body(MANIFEST, body);

        let libraries = resolve_libraries(&fetch, MANIFEST, BASE).unwrap();
        assert_eq!(libraries.len(), 3);
        assert_eq!(
            libraries["lwjgl-3.3.3-natives-windows.jar"],
            format!("{}/org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3-natives-windows.jar", BASE)
        );
        assert_eq!(
            libraries["gson-2.10.1.jar"],
            format!("{}/com/google/code/gson/gson/2.10.1/gson-2.10.1.jar", BASE)
        );
        assert!(libraries["lib-2.0-dist.jar"].contains("a/b/c/lib/2.0/lib-2.0-dist.jar"));
    }

    #[test]
    fn test_colliding_file_names_keep_last() {
        let body = r#"{"libraries": [
            {"group": "first.group", "name": "lib", "version": "1.0"},
            {"group": "second.group", "name": "lib", "version": "1.0"}
        ]}"#;
        let fetch = StubFetch::new().with_body(MANIFEST, body);

        let libraries = resolve_libraries(&fetch, MANIFEST, BASE).unwrap();
        assert_eq!(libraries.len(), 1);
        assert!(libraries["lib-1.0.jar"].contains("/second/group/"));
    }

    #[test]
    fn test_missing_libraries_key_is_empty() {
        let fetch = StubFetch::new().with_body(MANIFEST, "{}");
        assert!(resolve_libraries(&fetch, MANIFEST, BASE).unwrap().is_empty());
    }

    #[test]
    fn test_fetch_failures() {
        let fetch = StubFetch::new().with_status(MANIFEST, 404, "Not Found");
        assert!(matches!(
            resolve_libraries(&fetch, MANIFEST, BASE),
            Err(NexusError::Status { status: 404, .. })
        ));

        let fetch = StubFetch::new().with_body(MANIFEST, "not json");
        assert!(matches!(
            resolve_libraries(&fetch, MANIFEST, BASE),
            Err(NexusError::Decode { .. })
        ));

        let fetch = StubFetch::new().with_transport_error(MANIFEST, "connection reset");
        assert!(matches!(
            resolve_libraries(&fetch, MANIFEST, BASE),
            Err(NexusError::Transport { ref message, .. }) if message == "connection reset"
        ));
    }
}
