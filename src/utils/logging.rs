use crate::core::message::{Message, Sender};
use chrono::Local;
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Append-only transcript log, toggled at runtime with `/log`.
pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Self {
        let is_active = log_file.is_some();
        LoggingState {
            file_path: log_file,
            is_active,
        }
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        // Test if we can create/write to the file
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;
        self.write_to_log(&format!(
            "## Logging started {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ))?;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {path}"))
                } else {
                    Ok(format!("Logging paused (file: {path})"))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Record one finalized transcript entry. Pending placeholders and
    /// app-authored entries are not logged.
    pub fn log_entry(&self, message: &Message) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active || self.file_path.is_none() || message.pending {
            return Ok(());
        }
        match message.sender {
            Sender::User => self.write_to_log(&format!("You: {}", message.content)),
            Sender::Assistant => {
                let attribution = message
                    .provider
                    .as_deref()
                    .map(|p| format!("## {p}"))
                    .unwrap_or_default();
                if attribution.is_empty() {
                    self.write_to_log(&message.content)
                } else {
                    self.write_to_log(&format!("{attribution}\n{}", message.content))
                }
            }
            _ => Ok(()),
        }
    }

    fn write_to_log(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Empty line after each entry for spacing, matching screen display
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!(
                "logging ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
            (Some(path), false) => format!(
                "log paused ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}

/// Export the full transcript to `path`. Atomic: the file only appears after
/// the complete write lands. Refuses to clobber an existing file.
pub fn dump_transcript(
    messages: &VecDeque<Message>,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = Path::new(path);
    if target.exists() {
        return Err(format!("File already exists: {path}").into());
    }
    let parent = target.parent().filter(|p| !p.as_os_str().is_empty());
    let mut temp_file = match parent {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };

    for msg in messages {
        if msg.pending || msg.sender.is_app() {
            continue;
        }
        let text = match msg.sender {
            Sender::User => format!("You: {}", msg.content),
            _ => msg.content.clone(),
        };
        for line in text.lines() {
            writeln!(temp_file, "{line}")?;
        }
        writeln!(temp_file)?;
    }

    temp_file.flush()?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_path(dir: &tempfile::TempDir) -> String {
        dir.path().join("chat.log").to_string_lossy().into_owned()
    }

    #[test]
    fn inactive_logger_writes_nothing() {
        let logging = LoggingState::new(None);
        assert!(!logging.is_active());
        logging.log_entry(&Message::user("hello")).unwrap();
        assert_eq!(logging.status_string(), "disabled");
    }

    #[test]
    fn entries_are_appended_with_spacing() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(&dir);
        let logging = LoggingState::new(Some(path.clone()));

        logging.log_entry(&Message::user("hello")).unwrap();
        logging
            .log_entry(&Message::assistant("hi there", Some("claude".into()), None))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("You: hello"));
        assert!(contents.contains("## claude"));
        assert!(contents.contains("hi there"));
    }

    #[test]
    fn pending_and_app_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(&dir);
        let logging = LoggingState::new(Some(path.clone()));

        logging.log_entry(&Message::pending("claude")).unwrap();
        logging.log_entry(&Message::app_error("boom")).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap_or_default();
        assert!(contents.is_empty());
    }

    #[test]
    fn toggle_requires_a_file_and_flips_state() {
        let mut logging = LoggingState::new(None);
        assert!(logging.toggle_logging().is_err());

        let dir = tempfile::tempdir().unwrap();
        logging.set_log_file(log_path(&dir)).unwrap();
        assert!(logging.is_active());
        logging.toggle_logging().unwrap();
        assert!(!logging.is_active());
    }

    #[test]
    fn dump_writes_the_transcript_without_app_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.txt");
        let path = path.to_string_lossy().into_owned();

        let mut messages = VecDeque::new();
        messages.push_back(Message::app_info("welcome"));
        messages.push_back(Message::user("question"));
        messages.push_back(Message::assistant("answer", Some("claude".into()), None));
        messages.push_back(Message::pending("claude"));
        dump_transcript(&messages, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("You: question"));
        assert!(contents.contains("answer"));
        assert!(!contents.contains("welcome"));
        assert!(!contents.contains("Thinking"));
    }

    #[test]
    fn dump_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.txt");
        std::fs::write(&path, "precious").unwrap();
        let path = path.to_string_lossy().into_owned();

        let err = dump_transcript(&VecDeque::new(), &path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(dir.path().join("dump.txt")).unwrap(), "precious");
    }
}
