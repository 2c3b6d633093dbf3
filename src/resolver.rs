use std::sync::Arc;

use crate::{
    error::{ProxyError, Result},
    source::{ByteStream, ContentSource},
    types::FileListing,
};

/// File served inline for the root path
pub const INDEX_FILE: &str = "index.html";

pub const HTML_CONTENT_TYPE: &str = "text/html";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// How a single request path is answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Stream the upstream body through this server
    Proxy {
        download_url: String,
        content_type: &'static str,
    },
    /// Send the caller to the upstream location with a 302
    Redirect {
        download_url: String,
        content_type: Option<&'static str>,
    },
    /// Nothing in the listing matches
    NotFound { path: String },
}

/// Map a request path onto a listing
///
/// `/` proxies `index.html`; every other path has its leading `/` stripped
/// and is matched exactly against descriptor paths.
pub fn resolve_in(listing: &FileListing, request_path: &str) -> Result<Resolution> {
    if request_path == "/" {
        let download_url = listing.download_url(INDEX_FILE);
        if download_url.is_empty() {
            return Err(ProxyError::MissingIndex);
        }
        return Ok(Resolution::Proxy {
            download_url: download_url.to_string(),
            content_type: HTML_CONTENT_TYPE,
        });
    }

    let key = request_path.strip_prefix('/').unwrap_or(request_path);
    let download_url = listing.download_url(key);
    if download_url.is_empty() {
        return Ok(Resolution::NotFound {
            path: key.to_string(),
        });
    }

    Ok(Resolution::Redirect {
        download_url: download_url.to_string(),
        content_type: content_type_for_path(key),
    })
}

/// Content type override for the handful of suffixes browsers get wrong
pub fn content_type_for_path(path: &str) -> Option<&'static str> {
    if path.ends_with(".whl") {
        Some(ZIP_CONTENT_TYPE)
    } else if path.ends_with(".html") {
        Some(HTML_CONTENT_TYPE)
    } else {
        None
    }
}

/// Resolves request paths against a freshly fetched listing
///
/// Nothing is cached: every call to [`PathResolver::resolve`] asks the
/// source for the whole listing again.
pub struct PathResolver {
    source: Arc<dyn ContentSource>,
}

impl PathResolver {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Fetch the listing and decide how to answer `request_path`
    pub async fn resolve(&self, request_path: &str) -> Result<Resolution> {
        let listing = self.source.list_files().await?;
        resolve_in(&listing, request_path)
    }

    /// Open the body behind a resolved download url
    pub async fn open(&self, download_url: &str) -> Result<ByteStream> {
        self.source.open_file(download_url).await
    }

    /// Get the underlying source
    pub fn source(&self) -> &Arc<dyn ContentSource> {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileDescriptor;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::{stream, StreamExt, TryStreamExt};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSource {
        entries: Vec<FileDescriptor>,
        listings: AtomicUsize,
    }

    impl MockSource {
        fn new(entries: Vec<FileDescriptor>) -> Self {
            Self {
                entries,
                listings: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentSource for MockSource {
        async fn list_files(&self) -> Result<FileListing> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            Ok(FileListing::new(self.entries.clone()))
        }

        async fn open_file(&self, download_url: &str) -> Result<ByteStream> {
            let body = Bytes::from(format!("body of {}", download_url));
            Ok(stream::iter(vec![Ok(body)]).boxed())
        }

        fn identifier(&self) -> String {
            "mock".to_string()
        }
    }

    fn listing(entries: &[(&str, &str)]) -> FileListing {
        entries
            .iter()
            .map(|(path, url)| FileDescriptor::file(*path, *url))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_root_proxies_index() {
        let listing = listing(&[("index.html", "https://raw/idx")]);

        assert_eq!(
            resolve_in(&listing, "/").unwrap(),
            Resolution::Proxy {
                download_url: "https://raw/idx".to_string(),
                content_type: "text/html",
            }
        );
    }

    #[test]
    fn test_root_without_index() {
        let listing = listing(&[("a.txt", "https://raw/a")]);
        assert!(matches!(
            resolve_in(&listing, "/"),
            Err(ProxyError::MissingIndex)
        ));
        assert!(matches!(
            resolve_in(&FileListing::default(), "/"),
            Err(ProxyError::MissingIndex)
        ));
    }

    #[test]
    fn test_redirect_with_zip_type() {
        let listing = listing(&[("pkg/lib.whl", "https://raw/lib.whl")]);

        assert_eq!(
            resolve_in(&listing, "/pkg/lib.whl").unwrap(),
            Resolution::Redirect {
                download_url: "https://raw/lib.whl".to_string(),
                content_type: Some("application/zip"),
            }
        );
    }

    #[test]
    fn test_redirect_uses_matched_path_for_type() {
        let listing = listing(&[
            ("lib.whl", "https://raw/lib.whl"),
            ("docs/guide.html", "https://raw/guide"),
        ]);

        assert_eq!(
            resolve_in(&listing, "/docs/guide.html").unwrap(),
            Resolution::Redirect {
                download_url: "https://raw/guide".to_string(),
                content_type: Some("text/html"),
            }
        );
    }

    #[test]
    fn test_not_found() {
        let listing = listing(&[("a.txt", "https://raw/a")]);

        assert_eq!(
            resolve_in(&listing, "/missing.txt").unwrap(),
            Resolution::NotFound {
                path: "missing.txt".to_string()
            }
        );
        assert!(matches!(
            resolve_in(&FileListing::default(), "/a.txt").unwrap(),
            Resolution::NotFound { .. }
        ));
    }

    #[test]
    fn test_entry_without_download_url_is_not_found() {
        let listing = FileListing::new(vec![FileDescriptor {
            path: "pkg".to_string(),
            ..FileDescriptor::default()
        }]);

        assert!(matches!(
            resolve_in(&listing, "/pkg").unwrap(),
            Resolution::NotFound { .. }
        ));
    }

    #[test]
    fn test_no_path_normalization() {
        let listing = listing(&[("dir/a.txt", "https://raw/a")]);

        for path in ["/dir/a.txt/", "/DIR/a.txt", "/dir%2Fa.txt", "//dir/a.txt"] {
            assert!(
                matches!(resolve_in(&listing, path).unwrap(), Resolution::NotFound { .. }),
                "{path} should not match"
            );
        }
    }

    #[test]
    fn test_index_reachable_by_name() {
        let listing = listing(&[("index.html", "https://raw/idx")]);

        assert_eq!(
            resolve_in(&listing, "/index.html").unwrap(),
            Resolution::Redirect {
                download_url: "https://raw/idx".to_string(),
                content_type: Some("text/html"),
            }
        );
    }

    #[test]
    fn test_content_type_for_path() {
        assert_eq!(
            content_type_for_path("dist/pkg-1.0-py3-none-any.whl"),
            Some("application/zip")
        );
        assert_eq!(content_type_for_path("index.html"), Some("text/html"));
        assert_eq!(content_type_for_path("archive.tar.gz"), None);
        assert_eq!(content_type_for_path("notes.htm"), None);
        assert_eq!(content_type_for_path("whl"), None);
        assert_eq!(content_type_for_path(""), None);
    }

    #[tokio::test]
    async fn test_resolver_refetches_every_time() {
        let source = Arc::new(MockSource::new(vec![FileDescriptor::file(
            "a.txt",
            "https://raw/a",
        )]));
        let resolver = PathResolver::new(source.clone());

        let first = resolver.resolve("/a.txt").await.unwrap();
        let second = resolver.resolve("/a.txt").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.listings.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.source().identifier(), "mock");
    }

    #[tokio::test]
    async fn test_resolver_open() {
        let resolver = PathResolver::new(Arc::new(MockSource::new(Vec::new())));

        let chunks: Vec<Bytes> = resolver
            .open("https://raw/idx")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.concat(), b"body of https://raw/idx");
    }
}
