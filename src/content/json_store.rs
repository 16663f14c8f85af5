use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{CollectorError, ContentItem, ContentKind, ContentSink, ContentSource};

/// A course export held as JSON on disk.
///
/// ```json
/// { "name": "BIO 101", "items": [
///     { "id": "welcome", "kind": "page", "title": "Welcome", "body": "<p>...</p>" }
/// ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseExport {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

/// File-backed [`ContentSource`] and [`ContentSink`].
///
/// Updates are applied in memory; nothing touches the disk until [`JsonCourse::save`].
#[derive(Debug)]
pub struct JsonCourse {
    path: PathBuf,
    export: CourseExport,
    dirty: bool,
}

impl JsonCourse {
    pub fn open(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| {
            if !path.exists() {
                format!("file not found: {}", path.display())
            } else {
                format!("failed to read course export: {}", path.display())
            }
        })?;
        let export = serde_json::from_str(&raw)
            .with_context(|| format!("invalid course export JSON: {}", path.display()))?;
        Ok(Self::from_export(path, export))
    }

    pub fn from_export(path: &Path, export: CourseExport) -> Self {
        Self {
            path: path.to_path_buf(),
            export,
            dirty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.export.name
    }

    pub fn export(&self) -> &CourseExport {
        &self.export
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the export back to its original path.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.save_to(&path)
    }

    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.export)
            .context("failed to serialize course export")?;
        std::fs::write(path, content + "\n")
            .with_context(|| format!("failed to write course export to {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }
}

impl ContentSource for JsonCourse {
    fn items(&self, kind: ContentKind) -> Result<Vec<ContentItem>, CollectorError> {
        Ok(self
            .export
            .items
            .iter()
            .filter(|item| item.kind == kind)
            .cloned()
            .collect())
    }
}

impl ContentSink for JsonCourse {
    fn update(&mut self, item: &ContentItem, body: &str) -> Result<(), CollectorError> {
        let stored = self
            .export
            .items
            .iter_mut()
            .find(|stored| stored.kind == item.kind && stored.id == item.id)
            .ok_or_else(|| CollectorError::MissingItem {
                kind: item.kind,
                id: item.id.clone(),
            })?;
        stored.body = body.to_string();
        self.dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CourseExport {
        serde_json::from_str(
            r##"{
                "name": "BIO 101",
                "items": [
                    {"id": "1", "kind": "page", "title": "Welcome", "body": "<p style=\"color:#447D29\">Hi</p>"},
                    {"id": "2", "kind": "assignment", "title": "Lab 1"},
                    {"id": "3", "kind": "new_quiz", "title": "Check-in", "body": "<b>go</b>"}
                ]
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn items_filtered_by_kind() {
        let course = JsonCourse::from_export(Path::new("course.json"), sample());
        let pages = course.items(ContentKind::Page).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Welcome");
        assert_eq!(course.items(ContentKind::NewQuiz).unwrap()[0].id, "3");
        assert!(course.items(ContentKind::Syllabus).unwrap().is_empty());
    }

    #[test]
    fn missing_body_defaults_to_empty() {
        let course = JsonCourse::from_export(Path::new("course.json"), sample());
        let assignments = course.items(ContentKind::Assignment).unwrap();
        assert_eq!(assignments[0].body, "");
    }

    #[test]
    fn update_changes_body_in_memory() {
        let mut course = JsonCourse::from_export(Path::new("course.json"), sample());
        let page = course.items(ContentKind::Page).unwrap().remove(0);
        course.update(&page, "<p>new</p>").unwrap();
        assert!(course.is_dirty());
        assert_eq!(course.items(ContentKind::Page).unwrap()[0].body, "<p>new</p>");
    }

    #[test]
    fn update_unknown_item_fails() {
        let mut course = JsonCourse::from_export(Path::new("course.json"), sample());
        let ghost = ContentItem {
            id: "99".into(),
            kind: ContentKind::Quiz,
            title: "Ghost".into(),
            body: String::new(),
        };
        let err = course.update(&ghost, "x").unwrap_err();
        assert!(matches!(err, CollectorError::MissingItem { .. }));
        assert!(!course.is_dirty());
    }

    #[test]
    fn save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("course.json");
        let mut course = JsonCourse::from_export(&path, sample());
        let page = course.items(ContentKind::Page).unwrap().remove(0);
        course.update(&page, "<p>saved</p>").unwrap();
        course.save().unwrap();
        assert!(!course.is_dirty());

        let reopened = JsonCourse::open(&path).unwrap();
        assert_eq!(reopened.name(), "BIO 101");
        assert_eq!(reopened.items(ContentKind::Page).unwrap()[0].body, "<p>saved</p>");
    }

    #[test]
    fn open_missing_file() {
        let err = JsonCourse::open(Path::new("/nonexistent/course.json")).unwrap_err();
        assert!(err.to_string().contains("file not found"), "{err}");
    }

    #[test]
    fn open_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonCourse::open(&path).unwrap_err();
        assert!(err.to_string().contains("invalid course export"), "{err}");
    }
}
