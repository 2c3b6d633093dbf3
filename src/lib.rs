pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod resolver;
pub mod server;
pub mod source;
pub mod types;

pub use config::{Args, Config, LogLevel};
pub use error::{ProxyError, Result};
pub use github::GitHubSource;
pub use resolver::{content_type_for_path, resolve_in, PathResolver, Resolution};
pub use server::{router, serve};
pub use source::{ByteStream, ContentSource};
pub use types::{EntryType, FileDescriptor, FileListing};
