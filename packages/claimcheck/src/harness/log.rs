//! Append-only markdown evaluation log.
//!
//! One run appends a header, one section per record in arrival order, and a
//! closing summary. Writers are serialized by a mutex so sections never
//! interleave.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::types::{EvaluationRecord, EvaluationSummary};

#[derive(Debug)]
pub struct EvaluationLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl EvaluationLog {
    /// Open `path` for appending, creating it and its parent directory.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path).await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write_run_header(&self, started_at: DateTime<Local>) -> io::Result<()> {
        self.write(&format_run_header(started_at)).await
    }

    pub async fn append(&self, record: &EvaluationRecord) -> io::Result<()> {
        self.write(&format_record(record)).await
    }

    pub async fn write_summary(&self, summary: &EvaluationSummary) -> io::Result<()> {
        self.write(&format_summary(summary)).await
    }

    async fn write(&self, text: &str) -> io::Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(text.as_bytes()).await?;
        file.flush().await
    }
}

pub fn format_run_header(started_at: DateTime<Local>) -> String {
    format!("\n## Test Run: {}\n---\n", started_at.format("%Y-%m-%d %H:%M:%S"))
}

pub fn format_record(record: &EvaluationRecord) -> String {
    let icon = if record.success { "✅" } else { "❌" };
    let result = &record.pipeline_result;

    let mut out = String::new();
    out.push_str(&format!("### {icon} Test Case: {}\n", record.test_case.question));
    out.push_str(&format!("- **Ideal Answer:** `{}`\n", record.test_case.ideal_answer));
    out.push_str(&format!("- **Generated Answer:** `{}`\n", result.final_answer));
    out.push_str(&format!("- **Judge's Decision:** {}\n", record.judge_verdict.decision));
    out.push_str(&format!("- **Judge's Reasoning:** *{}*\n", record.judge_verdict.reasoning));
    out.push_str("- **Verified Facts Fed to Answerer:**\n");
    if result.verified_facts.is_empty() {
        out.push_str("  - (No facts were verified)\n");
    } else {
        for fact in &result.verified_facts {
            out.push_str(&format!("  - `{}`\n", fact.claim));
        }
    }
    out.push_str(&format!("- **Latency:** {:.2}s\n", record.latency_secs()));
    out.push_str("\n---\n");
    out
}

pub fn format_summary(summary: &EvaluationSummary) -> String {
    format!(
        "### Run Summary\n\
         - **Total Samples:** {}\n\
         - **Task Success Rate:** {:.2}%\n\
         - **Average Latency:** {:.3}s (±{:.3}s)\n\n",
        summary.sample_count,
        summary.success_percent(),
        summary.mean_latency_secs,
        summary.std_dev_latency_secs,
    )
}
