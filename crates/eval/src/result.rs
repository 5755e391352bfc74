//! Test results and the session that collects them.
//!
//! A session is append-only: every executed assertion adds one result, an
//! example that recorded nothing gets a synthesized pass and every pending
//! marker reached adds a pending result.

use std::time::{Duration, Instant};

use rodzo_table::NodeId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    Pending,
}

/// The two compared strings of a failed string assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operands {
    pub left: Option<String>,
    pub right: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub node: NodeId,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub local_line: u32,
    pub global_line: u32,
    /// Time since the example started.
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operands: Option<Operands>,
}

/// Everything one run produced, with its counters.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub results: Vec<TestResult>,
    pub examples: usize,
    pub tests: usize,
    pub failures: usize,
    pub pendings: usize,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
    #[serde(skip)]
    started: Instant,
    #[serde(skip)]
    example_started: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let now = Instant::now();
        Session {
            results: Vec::new(),
            examples: 0,
            tests: 0,
            failures: 0,
            pendings: 0,
            elapsed: Duration::ZERO,
            started: now,
            example_started: now,
        }
    }

    /// Record one assertion outcome. Failed string comparisons keep their
    /// operands for the hex dump.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &mut self,
        node: NodeId,
        ok: bool,
        message: Option<String>,
        left: Option<&str>,
        right: Option<&str>,
        local_line: u32,
        global_line: u32,
    ) {
        let outcome = if ok { Outcome::Pass } else { Outcome::Fail };
        let operands = (!ok && (left.is_some() || right.is_some())).then(|| Operands {
            left: left.map(String::from),
            right: right.map(String::from),
        });
        self.push(node, outcome, message, local_line, global_line, operands);
        self.tests += 1;
        if !ok {
            self.failures += 1;
        }
    }

    pub fn record_pass(&mut self, node: NodeId, local_line: u32, global_line: u32) {
        self.record(node, true, None, None, None, local_line, global_line);
    }

    pub fn record_failure(
        &mut self,
        node: NodeId,
        message: impl Into<String>,
        local_line: u32,
        global_line: u32,
    ) {
        self.record(
            node,
            false,
            Some(message.into()),
            None,
            None,
            local_line,
            global_line,
        );
    }

    pub(crate) fn record_pending(
        &mut self,
        node: NodeId,
        reason: Option<String>,
        local_line: u32,
        global_line: u32,
    ) {
        self.push(node, Outcome::Pending, reason, local_line, global_line, None);
        self.pendings += 1;
    }

    pub(crate) fn start_example(&mut self) -> usize {
        self.examples += 1;
        self.example_started = Instant::now();
        self.results.len()
    }

    pub(crate) fn example_elapsed(&self) -> Duration {
        self.example_started.elapsed()
    }

    pub(crate) fn finish(&mut self) {
        self.elapsed = self.started.elapsed();
    }

    pub fn failed(&self) -> bool {
        self.failures > 0
    }

    /// Results with the given outcome, in recording order.
    pub fn with_outcome(&self, outcome: Outcome) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(move |r| r.outcome == outcome)
    }

    /// `N examples, M tests seen, K failures, P pending`.
    pub fn totals(&self) -> String {
        format!(
            "{} examples, {} tests seen, {} failures, {} pending",
            self.examples, self.tests, self.failures, self.pendings
        )
    }

    fn push(
        &mut self,
        node: NodeId,
        outcome: Outcome,
        message: Option<String>,
        local_line: u32,
        global_line: u32,
        operands: Option<Operands>,
    ) {
        self.results.push(TestResult {
            node,
            outcome,
            message,
            local_line,
            global_line,
            duration: self.example_started.elapsed(),
            operands,
        });
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_follow_outcomes() {
        let mut s = Session::new();
        s.record_pass(3, 10, 110);
        s.record_failure(3, "expected 1\n      to equal 2", 11, 111);
        s.record_pending(5, Some("later".into()), 12, 112);
        assert_eq!((s.tests, s.failures, s.pendings), (2, 1, 1));
        assert!(s.failed());
        assert_eq!(s.totals(), "0 examples, 2 tests seen, 1 failures, 1 pending");
        assert_eq!(s.with_outcome(Outcome::Fail).count(), 1);
    }

    #[test]
    fn failed_string_comparison_keeps_operands() {
        let mut s = Session::new();
        s.record(1, false, None, Some("ab"), None, 1, 1);
        s.record(1, true, None, Some("ab"), Some("ab"), 2, 2);
        let failed = &s.results[0];
        assert_eq!(
            failed.operands,
            Some(Operands {
                left: Some("ab".into()),
                right: None
            })
        );
        assert_eq!(s.results[1].operands, None);
    }

    #[test]
    fn serializes_outcomes_snake_case() {
        let mut s = Session::new();
        s.record_pass(2, 4, 4);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["results"][0]["outcome"], "pass");
        assert_eq!(json["tests"], 1);
        assert!(json["results"][0].get("message").is_none());
    }
}
