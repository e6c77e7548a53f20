//! Execution environment handed to system-scoped elements.
//!
//! The environment describes where a sweep runs (job, composition) and
//! carries the two ends of the result transport: an outbox the client side
//! sends reports into and an inbox the server side drains. The transport
//! itself lives outside the engine; here it is just a pair of channels.

use crate::pipeline::error::ElementError;
use crate::pipeline::value::Value;
use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Results of one composition, as sent from a node to the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub composition: String,
    pub data: BTreeMap<String, Value>,
}

/// Host/collection context for `SystemTransform` elements.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    job: String,
    composition: Option<String>,
    directory: Option<PathBuf>,
    outbox: Option<Sender<Report>>,
    inbox: Option<Receiver<Report>>,
}

impl Environment {
    pub fn new(job: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            ..Default::default()
        }
    }

    pub fn with_composition(mut self, composition: impl Into<String>) -> Self {
        self.composition = Some(composition.into());
        self
    }

    /// Directory relative paths of written files are resolved against.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_outbox(mut self, outbox: Sender<Report>) -> Self {
        self.outbox = Some(outbox);
        self
    }

    pub fn with_inbox(mut self, inbox: Receiver<Report>) -> Self {
        self.inbox = Some(inbox);
        self
    }

    /// Name of the job this sweep belongs to.
    pub fn job(&self) -> &str {
        &self.job
    }

    /// Label of the composition currently executing, `None` on the server.
    pub fn composition(&self) -> Option<&str> {
        self.composition.as_deref()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// `path` itself if absolute, else joined onto the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.directory {
            Some(directory) if path.is_relative() => directory.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Send data tagged with the current composition.
    ///
    /// Without an outbox the data is dropped, matching a sweep that runs
    /// without any collector attached.
    pub fn send(&self, data: BTreeMap<String, Value>) -> Result<(), ElementError> {
        let Some(outbox) = &self.outbox else {
            tracing::debug!("No outbox configured, dropping {} value(s)", data.len());
            return Ok(());
        };
        let report = Report {
            composition: self.composition.clone().unwrap_or_default(),
            data,
        };
        outbox
            .send(report)
            .map_err(|e| ElementError::Channel(format!("outbox closed: {}", e)))
    }

    /// Drain every report received so far.
    pub fn receive(&self) -> Vec<Report> {
        match &self.inbox {
            Some(inbox) => inbox.try_iter().collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_send_then_receive() {
        let (tx, rx) = unbounded();
        let client = Environment::new("job").with_composition("jvm @ node").with_outbox(tx);
        let server = Environment::new("job").with_inbox(rx);

        let mut data = BTreeMap::new();
        data.insert("mean".to_string(), Value::Float(1.5));
        client.send(data.clone()).unwrap();

        let reports = server.receive();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].composition, "jvm @ node");
        assert_eq!(reports[0].data, data);
        assert!(server.receive().is_empty());
    }

    #[test]
    fn test_resolve_relative_paths() {
        let env = Environment::new("job").with_directory("/tmp/node");
        assert_eq!(env.resolve(Path::new("out.json")), PathBuf::from("/tmp/node/out.json"));
        assert_eq!(env.resolve(Path::new("/abs.json")), PathBuf::from("/abs.json"));
        assert_eq!(Environment::new("job").resolve(Path::new("x")), PathBuf::from("x"));
    }

    #[test]
    fn test_send_without_outbox_is_noop() {
        let env = Environment::new("job");
        assert!(env.send(BTreeMap::new()).is_ok());
        assert!(env.receive().is_empty());
    }

    #[test]
    fn test_closed_outbox_errors() {
        let (tx, rx) = unbounded();
        drop(rx);
        let env = Environment::new("job").with_outbox(tx);
        assert!(matches!(
            env.send(BTreeMap::new()),
            Err(ElementError::Channel(_))
        ));
    }
}
