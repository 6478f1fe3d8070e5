use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    Employee, Priority, Request, RequestData, RequestId, RequestType, Status,
    request::{Decision, Metadata},
};

/// A request as persisted in a YAML record file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordVersion", into = "RecordVersion")]
pub struct RequestRecord {
    id: Uuid,
    employee: Employee,
    request_type: RequestType,
    title: String,
    description: String,
    priority: Priority,
    created: DateTime<Utc>,
    data: Value,
    status: Status,
    reason: Option<String>,
    decided_at: Option<DateTime<Utc>>,
}

impl RequestRecord {
    /// The path of the record for `id` under the requests directory.
    #[must_use]
    pub fn path(requests_dir: &Path, id: RequestId) -> PathBuf {
        requests_dir.join(format!("{id}.yaml"))
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let yaml = serde_yaml::to_string(self).expect("this must never fail");
        writer.write_all(yaml.as_bytes())?;
        writer.flush()
    }

    pub(crate) fn read<R: Read>(reader: &mut R) -> Result<Self, LoadError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Writes the record to `<requests_dir>/<id>.yaml`.
    ///
    /// The requests directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save(&self, requests_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(requests_dir)?;
        let file = File::create(Self::path(requests_dir, self.id.into()))?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)
    }

    /// Reads the record at `path`.
    ///
    /// The file stem must be the id of the request stored in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not contain a valid
    /// record, or is named after a different id.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let expected = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| Uuid::parse_str(stem).ok())
            .ok_or_else(|| LoadError::FileName(path.to_path_buf()))?;

        let file = File::open(path).map_err(|io_error| match io_error.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound,
            _ => LoadError::Io(io_error),
        })?;

        let record = Self::read(&mut BufReader::new(file))?;
        if record.id != expected {
            return Err(LoadError::IdMismatch {
                expected,
                found: record.id,
            });
        }
        Ok(record)
    }
}

/// Errors that can occur when loading a request record.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The record file was not found.
    #[error("request record not found")]
    NotFound,
    /// An I/O error occurred.
    #[error("failed to read request record: {0}")]
    Io(#[from] io::Error),
    /// The YAML could not be parsed.
    #[error("failed to parse request record: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The file is not named `<uuid>.yaml`.
    #[error("'{}' is not named after a request id", .0.display())]
    FileName(PathBuf),
    /// The file name and the stored id disagree.
    #[error("record file for {expected} contains request {found}")]
    IdMismatch {
        /// Id from the file name.
        expected: Uuid,
        /// Id stored in the file.
        found: Uuid,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum RecordVersion {
    #[serde(rename = "1", rename_all = "camelCase")]
    V1 {
        id: Uuid,
        employee_name: String,
        employee_id: String,
        department: String,
        request_type: RequestType,
        #[serde(default)]
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        priority: Priority,
        created_at: DateTime<Utc>,
        #[serde(default)]
        request_data: Value,
        #[serde(default)]
        status: Status,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decided_at: Option<DateTime<Utc>>,
    },
}

impl From<RecordVersion> for RequestRecord {
    fn from(version: RecordVersion) -> Self {
        match version {
            RecordVersion::V1 {
                id,
                employee_name,
                employee_id,
                department,
                request_type,
                title,
                description,
                priority,
                created_at,
                request_data,
                status,
                reason,
                decided_at,
            } => Self {
                id,
                employee: Employee::new(employee_name, employee_id, department),
                request_type,
                title,
                description,
                priority,
                created: created_at,
                data: request_data,
                status,
                reason,
                decided_at,
            },
        }
    }
}

impl From<RequestRecord> for RecordVersion {
    fn from(record: RequestRecord) -> Self {
        let RequestRecord {
            id,
            employee,
            request_type,
            title,
            description,
            priority,
            created,
            data,
            status,
            reason,
            decided_at,
        } = record;
        Self::V1 {
            id,
            employee_name: employee.name,
            employee_id: employee.id,
            department: employee.department,
            request_type,
            title,
            description,
            priority,
            created_at: created,
            request_data: data,
            status,
            reason,
            decided_at,
        }
    }
}

impl From<&Request> for RequestRecord {
    fn from(request: &Request) -> Self {
        Self {
            id: request.id().uuid(),
            employee: request.employee().clone(),
            request_type: request.request_type(),
            title: request.title().to_string(),
            description: request.description().to_string(),
            priority: request.priority(),
            created: request.created(),
            data: request.data().to_value(),
            status: request.status(),
            reason: request.reason().map(ToString::to_string),
            decided_at: request.decided_at(),
        }
    }
}

impl From<RequestRecord> for Request {
    fn from(record: RequestRecord) -> Self {
        let RequestRecord {
            id,
            employee,
            request_type,
            title,
            description,
            priority,
            created,
            data,
            status,
            reason,
            decided_at,
        } = record;

        // a reason only ever accompanies a rejection
        let reason = reason.filter(|_| status == Status::Rejected);

        Self {
            metadata: Metadata {
                id: id.into(),
                employee,
                title,
                description,
                priority,
                created,
            },
            data: RequestData::from_parts(request_type, data),
            decision: Decision {
                status,
                reason,
                decided_at,
            },
        }
    }
}
