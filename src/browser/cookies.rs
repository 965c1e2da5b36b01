use crate::ScraperResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Backend-neutral cookie representation persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl StoredCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_path(),
            expires: None,
            http_only: false,
            secure: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> ScraperResult<Vec<StoredCookie>> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, cookies: &[StoredCookie]) -> ScraperResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(cookies)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScraperError;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("jobscout-cookies-{}", uuid::Uuid::now_v7()))
            .join(name)
    }

    #[test]
    fn test_save_creates_parent_and_loads_back() {
        let file = CookieFile::new(temp_path("cookies.json"));
        let cookies = vec![StoredCookie::new("li_at", "token", ".linkedin.com")];

        file.save(&cookies).unwrap();
        assert_eq!(file.load().unwrap(), cookies);
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let path = temp_path("corrupt.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let result = CookieFile::new(&path).load();
        assert!(matches!(result, Err(ScraperError::JsonError(_))));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let cookies: Vec<StoredCookie> =
            serde_json::from_str(r#"[{"name":"a","value":"b","domain":"example.com"}]"#).unwrap();
        assert_eq!(cookies[0].path, "/");
        assert!(!cookies[0].secure);
    }
}
