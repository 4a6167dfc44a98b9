use crate::options::Options;
use anyhow::Context;
use record::{Diff, MatchType, Tag, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use wire::Message;

/// Job is one unit of comparison work.
///
/// Jobs are created by the collector, owned by the queue until a processor
/// pops them, and dropped once processed.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    /// Stable human tag used in logs.
    fn describe(&self) -> String;

    async fn process(&self, options: &Options) -> anyhow::Result<()>;
}

/// MessageJob compares two result files and writes one diff report.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MessageJob {
    pub id: String,
    pub src: PathBuf,
    pub dst: PathBuf,
    pub out: PathBuf,
}

#[async_trait::async_trait]
impl Job for MessageJob {
    fn describe(&self) -> String {
        format!("message {}", self.id)
    }

    async fn process(&self, _options: &Options) -> anyhow::Result<()> {
        let (score, keys) = diff_files(&self.src, &self.dst).await?;
        let report = MessageReport {
            job: self.id.clone(),
            score,
            keys,
        };
        write_report(&self.out, &report).await
    }
}

/// ElementJob processes a named batch of file pairs into one combined
/// report. It fails if any member comparison fails.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ElementJob {
    pub id: String,
    pub elements: Vec<ElementPair>,
    pub out: PathBuf,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ElementPair {
    pub name: String,
    pub src: PathBuf,
    pub dst: PathBuf,
}

#[async_trait::async_trait]
impl Job for ElementJob {
    fn describe(&self) -> String {
        format!("batch {} ({} elements)", self.id, self.elements.len())
    }

    async fn process(&self, _options: &Options) -> anyhow::Result<()> {
        let mut elements = Vec::with_capacity(self.elements.len());
        for pair in &self.elements {
            let (score, keys) = diff_files(&pair.src, &pair.dst)
                .await
                .with_context(|| format!("element {}", pair.name))?;
            elements.push(ElementReport {
                name: pair.name.clone(),
                score,
                keys,
            });
        }
        let score = if elements.is_empty() {
            1.0
        } else {
            elements.iter().map(|e| e.score).sum::<f64>() / elements.len() as f64
        };
        let report = BatchReport {
            job: self.id.clone(),
            score,
            elements,
        };
        write_report(&self.out, &report).await
    }
}

/// One key's comparison within a message report.
#[derive(Debug, serde::Serialize)]
pub struct KeyDiff {
    pub key: String,
    #[serde(flatten)]
    pub diff: Diff,
}

/// The JSON report written for a message comparison.
#[derive(Debug, serde::Serialize)]
pub struct MessageReport {
    pub job: String,
    pub score: f64,
    pub keys: Vec<KeyDiff>,
}

#[derive(Debug, serde::Serialize)]
pub struct ElementReport {
    pub name: String,
    pub score: f64,
    pub keys: Vec<KeyDiff>,
}

#[derive(Debug, serde::Serialize)]
pub struct BatchReport {
    pub job: String,
    pub score: f64,
    pub elements: Vec<ElementReport>,
}

/// Compare the union of named values of two messages, source order first.
/// Names on one side only score zero and read as missing or unexpected.
/// The aggregate score is the mean key score, or 1.0 for two empty messages.
pub fn compare_messages(src: &Message, dst: &Message) -> (f64, Vec<KeyDiff>) {
    let mut keys = Vec::new();
    for (name, value) in src.iter() {
        let diff = match dst.get(name) {
            Some(other) => value.compare(other),
            None => one_sided(Some(value), None),
        };
        keys.push(KeyDiff {
            key: name.to_string(),
            diff,
        });
    }
    for (name, value) in dst.iter() {
        if src.get(name).is_none() {
            keys.push(KeyDiff {
                key: name.to_string(),
                diff: one_sided(None, Some(value)),
            });
        }
    }

    let score = if keys.is_empty() {
        1.0
    } else {
        keys.iter().map(|k| k.diff.score).sum::<f64>() / keys.len() as f64
    };
    (score, keys)
}

fn one_sided(src: Option<&Value>, dst: Option<&Value>) -> Diff {
    Diff {
        src_tag: src.map_or(Tag::Unknown, Value::tag),
        dst_tag: dst.map_or(Tag::Unknown, Value::tag),
        src_value: src.map(Value::stringify).unwrap_or_default(),
        dst_value: dst.map(Value::stringify).unwrap_or_default(),
        match_type: MatchType::None,
        score: 0.0,
        desc: BTreeSet::from([if src.is_some() {
            "unexpected".to_string()
        } else {
            "missing".to_string()
        }]),
    }
}

async fn diff_files(src: &Path, dst: &Path) -> anyhow::Result<(f64, Vec<KeyDiff>)> {
    let src = read_message(src).await?;
    let dst = read_message(dst).await?;
    Ok(compare_messages(&src, &dst))
}

async fn read_message(path: &Path) -> anyhow::Result<Message> {
    let buf = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read result file {}", path.display()))?;
    Message::decode(&buf).with_context(|| format!("failed to decode result file {}", path.display()))
}

async fn write_report(path: &Path, report: &impl serde::Serialize) -> anyhow::Result<()> {
    let body = serde_json::to_vec_pretty(report)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("failed to write report {}", path.display()))
}
