//! Test doubles for crates that drive the pipeline.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::oracle::{OracleError, PlanOracle};

/// One recorded oracle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleCall {
    pub system_instructions: String,
    pub context: String,
}

/// An oracle that answers from a fixed script, in order.
///
/// Once the script is used up every call fails with a transport error, so a
/// test that makes more calls than it scripted fails loudly.
#[derive(Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Result<String, OracleError>>>,
    calls: Mutex<Vec<OracleCall>>,
    delay: Option<Duration>,
}

impl ScriptedOracle {
    pub fn new(script: Vec<Result<String, OracleError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Script of successful answers only
    pub fn answering<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(answers.into_iter().map(|a| Ok(a.into())).collect())
    }

    /// Wait this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue more answers
    pub async fn push(&self, answer: Result<String, OracleError>) {
        self.script.lock().await.push_back(answer);
    }

    pub async fn calls(&self) -> Vec<OracleCall> {
        self.calls.lock().await.clone()
    }

    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }
}

#[async_trait]
impl PlanOracle for ScriptedOracle {
    async fn propose(&self, system_instructions: &str, context: &str) -> Result<String, OracleError> {
        self.calls.lock().await.push(OracleCall {
            system_instructions: system_instructions.to_string(),
            context: context.to_string(),
        });

        // Pop before sleeping so concurrent callers keep script order
        let answer = self.script.lock().await.pop_front();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        answer.unwrap_or_else(|| Err(OracleError::Transport("scripted oracle has no more answers".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_order_and_exhaustion() {
        let oracle = ScriptedOracle::answering(["first", "second"]);
        assert_eq!(oracle.propose("sys", "a").await.unwrap(), "first");
        assert_eq!(oracle.propose("sys", "b").await.unwrap(), "second");
        assert!(matches!(oracle.propose("sys", "c").await, Err(OracleError::Transport(_))));

        let calls = oracle.calls().await;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].context, "b");
        assert_eq!(oracle.remaining().await, 0);
    }

    #[test]
    fn test_pushed_answers_follow_the_script() {
        use tokio_test::block_on;

        let oracle = ScriptedOracle::answering(["scripted"]);
        block_on(oracle.push(Err(OracleError::Configuration("no key".to_string()))));
        assert_eq!(block_on(oracle.remaining()), 2);

        assert_eq!(block_on(oracle.propose("sys", "ctx")).unwrap(), "scripted");
        assert_eq!(
            block_on(oracle.propose("sys", "ctx")),
            Err(OracleError::Configuration("no key".to_string()))
        );
    }
}
