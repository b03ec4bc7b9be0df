use colored::{ColoredString, Colorize};

use libdatadrop::error::DropError;
use libdatadrop::model::{DropStatus, StatusRecord};

fn colored_status(status: DropStatus) -> ColoredString {
    match status {
        DropStatus::Ok => status.as_str().green(),
        DropStatus::NotNeeded => status.as_str().dimmed(),
        DropStatus::Impossible => status.as_str().yellow(),
        DropStatus::Error => status.as_str().red(),
    }
}

/// `drop(<status>): <path> [<message>]`, or the record as a JSON line
pub fn render_record(record: &StatusRecord, json: bool) -> Result<String, DropError> {
    if json {
        return serde_json::to_string(record)
            .map_err(|err| DropError::basic_str(format!("could not serialize record: {err}")));
    }

    let mut line = format!(
        "{}({}): {}",
        record.action,
        colored_status(record.status),
        record.path.display()
    );
    if let Some(message) = &record.message {
        line.push_str(&format!(" [{message}]"));
    }
    Ok(line)
}
