use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::constants::DROP_ACTION;

/// Canonical outcome of a drop for a single path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DropStatus {
    Ok,
    NotNeeded,
    Impossible,
    Error,
}

impl DropStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropStatus::Ok => "ok",
            DropStatus::NotNeeded => "notneeded",
            DropStatus::Impossible => "impossible",
            DropStatus::Error => "error",
        }
    }

    /// `ok` and `notneeded` leave the path in the requested state
    pub fn is_success(&self) -> bool {
        matches!(self, DropStatus::Ok | DropStatus::NotNeeded)
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }
}

impl fmt::Display for DropStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
}

/// One line of the drop report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    pub path: PathBuf,
    pub action: &'static str,
    pub status: DropStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub refds: Option<PathBuf>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<EntryType>,
}

impl StatusRecord {
    pub fn new(path: impl AsRef<Path>, status: DropStatus, refds: Option<&Path>) -> StatusRecord {
        StatusRecord {
            path: path.as_ref().to_path_buf(),
            action: DROP_ACTION,
            status,
            message: None,
            refds: refds.map(Path::to_path_buf),
            type_: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> StatusRecord {
        self.message = Some(message.into());
        self
    }

    pub fn with_type(mut self, type_: EntryType) -> StatusRecord {
        self.type_ = Some(type_);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_record_serializes_like_the_report() {
        let record = StatusRecord::new("/data/ds/a.dat", DropStatus::NotNeeded, Some(Path::new("/data/ds")))
            .with_message("nothing to drop from /data/ds/a.dat")
            .with_type(EntryType::File);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["action"], "drop");
        assert_eq!(json["status"], "notneeded");
        assert_eq!(json["type"], "file");
        assert_eq!(json["refds"], "/data/ds");
        assert_eq!(json["message"], "nothing to drop from /data/ds/a.dat");
    }

    #[test]
    fn test_failure_statuses() {
        assert!(DropStatus::Ok.is_success());
        assert!(DropStatus::NotNeeded.is_success());
        assert!(DropStatus::Impossible.is_failure());
        assert!(DropStatus::Error.is_failure());
    }
}
