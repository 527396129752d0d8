//! Scripted connector doubles for session, resolver, and catalog tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::{RetryConfig, WarehouseConfig};
use crate::connector::{SqlConnection, SqlConnector, SqlCursor};
use crate::error::{WarehouseError, WarehouseResult};
use crate::table::Value;

/// One scripted response to a cursor execute
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Fail(String),
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
}

impl Step {
    pub(crate) fn fail(message: &str) -> Self {
        Step::Fail(message.to_string())
    }

    pub(crate) fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Step::Rows {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }
}

/// Shared script and call record
#[derive(Debug, Default)]
pub(crate) struct Script {
    /// Remaining connect attempts that must fail
    pub failing_connects: u32,
    /// Outcomes for successive execute calls; an empty queue fails
    pub steps: VecDeque<Step>,
    /// HTTP paths passed to connect, in call order
    pub connect_paths: Vec<String>,
    /// Executed SQL, in call order
    pub executed: Vec<String>,
    pub connections_opened: usize,
    pub connections_closed: usize,
    pub cursors_closed: usize,
}

#[derive(Clone)]
pub(crate) struct MockConnector {
    pub script: Arc<Mutex<Script>>,
}

impl MockConnector {
    pub(crate) fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
        }
    }

    pub(crate) fn push_steps(&self, steps: Vec<Step>) {
        self.script.lock().unwrap().steps.extend(steps);
    }

    pub(crate) fn fail_connects(&self, count: u32) {
        self.script.lock().unwrap().failing_connects = count;
    }
}

#[async_trait]
impl SqlConnector for MockConnector {
    async fn connect(
        &self,
        _server_hostname: &str,
        http_path: &str,
        _access_token: &str,
    ) -> WarehouseResult<Box<dyn SqlConnection>> {
        let mut script = self.script.lock().unwrap();
        script.connect_paths.push(http_path.to_string());

        if script.failing_connects > 0 {
            script.failing_connects -= 1;
            return Err(WarehouseError::Connect("scripted connect failure".to_string()));
        }

        script.connections_opened += 1;
        Ok(Box::new(MockConnection {
            script: self.script.clone(),
        }))
    }
}

#[derive(Debug)]
pub(crate) struct MockConnection {
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl SqlConnection for MockConnection {
    async fn cursor(&mut self) -> WarehouseResult<Box<dyn SqlCursor>> {
        Ok(Box::new(MockCursor {
            script: self.script.clone(),
            result: None,
        }))
    }

    async fn close(&mut self) -> WarehouseResult<()> {
        self.script.lock().unwrap().connections_closed += 1;
        Ok(())
    }
}

pub(crate) struct MockCursor {
    script: Arc<Mutex<Script>>,
    result: Option<(Vec<String>, Vec<Vec<Value>>)>,
}

#[async_trait]
impl SqlCursor for MockCursor {
    async fn execute(&mut self, sql: &str) -> WarehouseResult<()> {
        let mut script = self.script.lock().unwrap();
        script.executed.push(sql.to_string());

        match script.steps.pop_front() {
            Some(Step::Rows { columns, rows }) => {
                self.result = Some((columns, rows));
                Ok(())
            }
            Some(Step::Fail(message)) => {
                self.result = None;
                Err(WarehouseError::Execution(message))
            }
            None => {
                self.result = None;
                Err(WarehouseError::Execution("script exhausted".to_string()))
            }
        }
    }

    fn description(&self) -> Vec<String> {
        self.result
            .as_ref()
            .map(|(columns, _)| columns.clone())
            .unwrap_or_default()
    }

    async fn fetch_all(&mut self) -> WarehouseResult<Vec<Vec<Value>>> {
        Ok(self
            .result
            .take()
            .map(|(_, rows)| rows)
            .unwrap_or_default())
    }

    async fn close(&mut self) -> WarehouseResult<()> {
        self.script.lock().unwrap().cursors_closed += 1;
        Ok(())
    }
}

/// Config pointing at a plausible workspace host
pub(crate) fn test_config() -> WarehouseConfig {
    WarehouseConfig {
        name: "test".to_string(),
        host: "adb-123456789.0.azuredatabricks.net".to_string(),
        access_token: "dapi-test-token".to_string(),
        warehouse_id: None,
        cluster_id: None,
        endpoint_id: None,
        retry: RetryConfig::default(),
    }
}
