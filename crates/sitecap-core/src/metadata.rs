//! The per-site `metadata.txt` record.

use chrono::{DateTime, Local};

use crate::extract::PageStats;

/// Summary written next to `index.html`; overwritten on every capture.
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    pub source_url: String,
    pub fetched_at: DateTime<Local>,
    pub stats: PageStats,
}

impl MetadataRecord {
    pub fn new(source_url: &str, stats: PageStats) -> Self {
        Self {
            source_url: source_url.to_string(),
            fetched_at: Local::now(),
            stats,
        }
    }

    /// Four lines: URL, `Last fetch`, `Number of Links`, `Number of Images`.
    pub fn render(&self) -> String {
        format!(
            "{}\nLast fetch: {}\nNumber of Links: {}\nNumber of Images: {}\n",
            self.source_url,
            self.fetched_at.to_rfc2822(),
            self.stats.link_count,
            self.stats.image_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_four_lines() {
        let record = MetadataRecord {
            source_url: "https://example.com/".to_string(),
            fetched_at: Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            stats: PageStats {
                link_count: 3,
                image_count: 2,
            },
        };
        let text = record.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "https://example.com/");
        assert!(lines[1].starts_with("Last fetch: Fri, "));
        assert!(lines[1].contains("Mar 2024 12:30:00"));
        assert_eq!(lines[2], "Number of Links: 3");
        assert_eq!(lines[3], "Number of Images: 2");
    }

    #[test]
    fn new_stamps_current_time() {
        let before = Local::now();
        let record = MetadataRecord::new("https://example.com/", PageStats::default());
        assert!(record.fetched_at >= before);
        assert!(record.render().contains("Number of Links: 0"));
    }
}
