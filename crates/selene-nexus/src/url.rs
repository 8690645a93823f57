//! Rewriting internal repository URLs into public ones.

/// Maps internal hosted-repository path segments onto the public group
/// repository that fronts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRewriter {
    internal_repositories: Vec<String>,
    public_repository: String,
}

impl Default for UrlRewriter {
    fn default() -> Self {
        Self::new(["maven-releases", "maven-snapshots"], "selene-public")
    }
}

impl UrlRewriter {
    pub fn new<I, S>(internal_repositories: I, public_repository: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            internal_repositories: internal_repositories
                .into_iter()
                .map(Into::into)
                .filter(|segment: &String| !segment.is_empty())
                .collect(),
            public_repository: public_repository.into(),
        }
    }

    pub fn internal_repositories(&self) -> &[String] {
        &self.internal_repositories
    }

    pub fn public_repository(&self) -> &str {
        &self.public_repository
    }

    /// Replace every occurrence of each internal repository segment with the
    /// public one.
    pub fn to_public(&self, url: &str) -> String {
        self.internal_repositories
            .iter()
            .fold(url.to_string(), |url, internal| {
                url.replace(internal.as_str(), &self.public_repository)
            })
    }
}

/// Everything after the last `/`, or the whole input if it has none.
pub fn extract_file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
