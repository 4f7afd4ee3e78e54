//! Job log indexing
//!
//! Log content is written by an external collaborator into a per-job
//! directory (`{root}/{job_id}/*.log`); this service only indexes it,
//! returning the files ordered ascending by creation time.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

/// One indexed log file with its content.
#[derive(Debug, Clone, Serialize)]
pub struct LogFile {
    pub file: String,
    pub date_created: chrono::DateTime<chrono::Utc>,
    pub path: String,
    pub logs: Vec<String>,
}

/// Index the log files for a job, ordered ascending by creation time.
///
/// Files not ending in `.log` are ignored. A missing job directory yields an
/// empty index, not an error: the job may simply not have produced logs yet.
pub fn collect_job_logs(logs_root: &Path, job_id: Uuid) -> io::Result<Vec<LogFile>> {
    let dir = logs_root.join(job_id.to_string());

    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("log") {
            continue;
        }

        let metadata = entry.metadata()?;
        // Creation time is not available on every filesystem; fall back to
        // the modification time.
        let created = metadata.created().or_else(|_| metadata.modified())?;

        let file_name = entry.file_name().to_string_lossy().to_string();

        files.push(LogFile {
            file: file_name,
            date_created: created.into(),
            path: path.to_string_lossy().to_string(),
            logs: read_lines(&path)?,
        });
    }

    files.sort_by(|a, b| a.date_created.cmp(&b.date_created));

    Ok(files)
}

fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = fs::File::open(path)?;
    BufReader::new(file).lines().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::thread::sleep;
    use std::time::Duration;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_logs_ordered_by_creation_time() {
        let root = tempfile::tempdir().unwrap();
        let job_id = Uuid::new_v4();
        let dir = root.path().join(job_id.to_string());
        fs::create_dir(&dir).unwrap();

        write_file(&dir, "b.log", "first\n");
        sleep(Duration::from_millis(50));
        write_file(&dir, "a.log", "second\n");

        let files = collect_job_logs(root.path(), job_id).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(names, vec!["b.log", "a.log"]);
        assert_eq!(files[0].logs, vec!["first"]);
    }

    #[test]
    fn test_non_log_files_ignored() {
        let root = tempfile::tempdir().unwrap();
        let job_id = Uuid::new_v4();
        let dir = root.path().join(job_id.to_string());
        fs::create_dir(&dir).unwrap();

        write_file(&dir, "run.log", "kept\n");
        write_file(&dir, "notes.txt", "skipped\n");

        let files = collect_job_logs(root.path(), job_id).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file, "run.log");
    }

    #[test]
    fn test_missing_job_directory_yields_empty_index() {
        let root = tempfile::tempdir().unwrap();
        let files = collect_job_logs(root.path(), Uuid::new_v4()).unwrap();
        assert!(files.is_empty());
    }
}
