//! A filesystem backed store of requests
//!
//! The [`Directory`] manages requests stored as one YAML record per request
//! under `<root>/requests/`, with settings in `<root>/config.toml`. It is a
//! wrapper around the filesystem agnostic [`RequestStore`].

use std::{
    ffi::OsStr,
    fmt, io,
    path::{Path, PathBuf},
};

use chrono::Utc;
use nonempty::NonEmpty;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use walkdir::WalkDir;

use crate::{
    domain::{
        Action, Config, NewRequest, Request, RequestId, RequestStore, RequestType, ResolveError,
        Transition, TransitionError, TransitionOutcome,
    },
    storage::record::RequestRecord,
};

/// Name of the configuration file in the directory root.
pub const CONFIG_FILE: &str = "config.toml";

/// Name of the folder holding request records.
pub const REQUESTS_DIR: &str = "requests";

/// State of a directory whose records have been read.
#[derive(Debug, Clone)]
pub struct Loaded {
    store: RequestStore,
    config: Config,
}

/// State of a directory that has not been read yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A filesystem backed store of requests.
#[derive(Debug)]
pub struct Directory<S> {
    /// The root of the directory requests are stored in.
    root: PathBuf,
    state: S,
}

impl<S> Directory<S> {
    /// The root path of the directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    fn requests_dir(&self) -> PathBuf {
        self.root.join(REQUESTS_DIR)
    }
}

impl Directory<Unloaded> {
    /// Opens a directory at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self {
            root,
            state: Unloaded,
        }
    }

    /// Creates the directory layout with a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory already contains a configuration
    /// file, or if the layout cannot be written.
    pub fn init(self) -> Result<Directory<Loaded>, InitError> {
        let config_path = self.config_path();
        if config_path.exists() {
            return Err(InitError::AlreadyInitialised(self.root));
        }

        std::fs::create_dir_all(self.requests_dir())?;
        let config = Config::default();
        config.save(&config_path).map_err(InitError::Config)?;

        tracing::info!("Initialised request directory at {}", self.root.display());

        Ok(Directory {
            root: self.root,
            state: Loaded {
                store: RequestStore::default(),
                config,
            },
        })
    }

    /// Load all requests from disk
    ///
    /// Requests are ordered by submission time, oldest first.
    ///
    /// # Errors
    ///
    /// This method has different behaviour depending on the configuration file
    /// in the directory root. If `allow_unrecognised` is `true`, then any
    /// files that cannot be parsed as request records are skipped. If
    /// `allow_unrecognised` is `false` (the default), then any such file
    /// returns an error listing every offending path.
    pub fn load_all(self) -> Result<Directory<Loaded>, DirectoryLoadError> {
        let config = load_config(&self.root);
        let paths = collect_record_paths(&self.requests_dir());

        let (requests, unrecognised_paths): (Vec<_>, Vec<_>) = paths
            .par_iter()
            .map(|path| try_load_request(path))
            .partition(Result::is_ok);

        let mut requests: Vec<_> = requests.into_iter().filter_map(Result::ok).collect();
        let unrecognised_paths: Vec<_> = unrecognised_paths
            .into_iter()
            .filter_map(Result::err)
            .collect();

        if let Some(paths) = NonEmpty::from_vec(unrecognised_paths) {
            if !config.allow_unrecognised {
                return Err(DirectoryLoadError::UnrecognisedFiles(paths));
            }
            tracing::debug!("Skipped {} unrecognised files", paths.len());
        }

        requests.sort_by_key(|request| (request.created(), request.id()));

        let mut store = RequestStore::with_capacity(requests.len());
        for request in requests {
            store.insert(request)?;
        }

        Ok(Directory {
            root: self.root,
            state: Loaded { store, config },
        })
    }
}

/// Errors that can occur when loading a directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryLoadError {
    /// Some record files could not be parsed.
    UnrecognisedFiles(NonEmpty<PathBuf>),
    /// Two records claim the same id.
    Duplicate(#[from] crate::domain::DuplicateIdError),
}

impl fmt::Display for DirectoryLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognisedFiles(paths) => {
                write!(f, "Unrecognised files: ")?;
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", path.display())?;
                }
                Ok(())
            }
            Self::Duplicate(e) => write!(f, "{e}"),
        }
    }
}

/// Errors that can occur when initialising a directory.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// A configuration file already exists.
    #[error("{} is already a request directory", .0.display())]
    AlreadyInitialised(PathBuf),
    /// The layout could not be created.
    #[error("failed to create request directory: {0}")]
    Io(#[from] io::Error),
    /// The configuration could not be written.
    #[error("{0}")]
    Config(String),
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn collect_record_paths(requests_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(requests_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("yaml")))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn try_load_request(path: &Path) -> Result<Request, PathBuf> {
    match RequestRecord::load(path) {
        Ok(record) => Ok(Request::from(record)),
        Err(e) => {
            tracing::debug!("Failed to load request from {}: {e}", path.display());
            Err(path.to_path_buf())
        }
    }
}

impl Directory<Loaded> {
    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.state.config
    }

    /// Replaces the configuration and writes it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be written. The
    /// in-memory configuration is unchanged in that case.
    pub fn update_config(&mut self, config: Config) -> Result<(), String> {
        config.save(&self.config_path())?;
        self.state.config = config;
        Ok(())
    }

    /// The in-memory store.
    #[must_use]
    pub const fn store(&self) -> &RequestStore {
        &self.state.store
    }

    /// All requests, oldest first.
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        self.state.store.requests()
    }

    /// Resolves a full id or unique id prefix.
    ///
    /// # Errors
    ///
    /// See [`RequestStore::resolve`].
    pub fn resolve(&self, prefix: &str) -> Result<RequestId, ResolveError> {
        self.state.store.resolve(prefix)
    }

    /// Add a new request to the directory.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the request type is not in the configured allow-list
    /// - the request record cannot be written
    pub fn add_request(&mut self, new: NewRequest) -> Result<Request, AddRequestError> {
        let request_type = new.data.request_type();
        if !self.state.config.is_type_allowed(&request_type) {
            return Err(AddRequestError::TypeNotAllowed(request_type));
        }

        let request = self.state.store.prepare(new);
        RequestRecord::from(&request).save(&self.requests_dir())?;
        self.state.store.insert(request.clone())?;

        tracing::info!(id = %request.id(), "Added {} request", request.request_type());

        Ok(request)
    }

    /// Applies a transition, persisting the result before committing it.
    ///
    /// If `if_match` is given, the transition is refused unless it equals the
    /// request's current [`etag`](Request::etag).
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the request doesn't exist, or the transition is not allowed from its
    ///   current status
    /// - `if_match` is stale
    /// - a reason is required for rejections and none was given
    /// - the request record cannot be written
    ///
    /// Neither the in-memory store nor the record file changes on failure.
    pub fn transition(
        &mut self,
        action: Action,
        if_match: Option<&str>,
    ) -> Result<TransitionOutcome, DecideError> {
        let Action { id, transition } = action;
        let current = self
            .state
            .store
            .get(id)
            .ok_or(TransitionError::NotFound(id))?;

        if let Some(expected) = if_match {
            let actual = current.etag();
            if actual != expected.trim() {
                return Err(TransitionError::PreconditionFailed {
                    id,
                    expected: expected.trim().to_string(),
                    actual,
                }
                .into());
            }
        }

        if self.state.config.require_rejection_reason
            && current.check(&transition)?.is_applied()
            && matches!(&transition, Transition::Reject { reason } if is_blank(reason.as_deref()))
        {
            return Err(DecideError::MissingReason(id));
        }

        let mut updated = current.clone();
        let outcome = updated.apply(transition, Utc::now())?;
        if !outcome.is_applied() {
            tracing::debug!(%id, "Request already {}", updated.status());
            return Ok(outcome);
        }

        RequestRecord::from(&updated).save(&self.requests_dir())?;
        tracing::info!(%id, status = %updated.status(), "Request {}", updated.status());
        self.state.store.replace(updated)?;

        Ok(outcome)
    }

    /// Approve a request.
    ///
    /// # Errors
    ///
    /// See [`transition`](Self::transition).
    pub fn approve(&mut self, id: RequestId) -> Result<TransitionOutcome, DecideError> {
        self.transition(Action::approve(id), None)
    }

    /// Reject a request, optionally recording a reason.
    ///
    /// # Errors
    ///
    /// See [`transition`](Self::transition).
    pub fn reject(
        &mut self,
        id: RequestId,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, DecideError> {
        self.transition(Action::reject(id, reason), None)
    }

    /// Mark an interview as held.
    ///
    /// # Errors
    ///
    /// See [`transition`](Self::transition).
    pub fn complete(&mut self, id: RequestId) -> Result<TransitionOutcome, DecideError> {
        self.transition(Action::complete(id), None)
    }

    /// Call off an interview.
    ///
    /// # Errors
    ///
    /// See [`transition`](Self::transition).
    pub fn cancel(&mut self, id: RequestId) -> Result<TransitionOutcome, DecideError> {
        self.transition(Action::cancel(id), None)
    }
}

fn is_blank(reason: Option<&str>) -> bool {
    reason.is_none_or(|reason| reason.trim().is_empty())
}

/// Errors that can occur when adding a request to a directory.
#[derive(Debug, thiserror::Error)]
pub enum AddRequestError {
    /// The type is not in the configured allow-list.
    #[error("request type '{0}' is not allowed in this directory")]
    TypeNotAllowed(RequestType),
    /// The request record could not be written.
    #[error("failed to write request: {0}")]
    Io(#[from] io::Error),
    /// The generated id collides with an existing request.
    #[error(transparent)]
    Duplicate(#[from] crate::domain::DuplicateIdError),
}

/// Errors that can occur when deciding a request.
#[derive(Debug, thiserror::Error)]
pub enum DecideError {
    /// The transition itself was refused.
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// The request record could not be written.
    #[error("failed to write request: {0}")]
    Io(#[from] io::Error),
    /// A rejection reason is required by the configuration.
    #[error("a reason is required to reject request {0}")]
    MissingReason(RequestId),
}
