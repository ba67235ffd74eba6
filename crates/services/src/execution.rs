use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};

use assess_core::model::{CodeDraft, ItemId};

use crate::config::ExecutionConfig;
use crate::error::ExecutionError;

/// Ad-hoc run of a draft against custom input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRequest {
    pub source_code: String,
    pub language_id: u32,
    pub stdin: String,
}

impl RunRequest {
    #[must_use]
    pub fn new(draft: &CodeDraft, stdin: impl Into<String>) -> Self {
        Self {
            source_code: draft.source.clone(),
            language_id: draft.language.execution_id(),
            stdin: stdin.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub compile_output: Option<String>,
    pub time_seconds: Option<f64>,
    pub memory_kb: Option<u64>,
}

/// Graded submission of one problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    pub question_id: u64,
    pub source_code: String,
    pub language_id: u32,
}

impl GradeRequest {
    #[must_use]
    pub fn new(item: ItemId, draft: &CodeDraft) -> Self {
        Self {
            question_id: item.value(),
            source_code: draft.source.clone(),
            language_id: draft.language.execution_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub actual_output: Option<String>,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GradeReport {
    pub passed: u32,
    pub total: u32,
    /// Percentage in `0..=100`. Fractional values are rounded.
    #[serde(deserialize_with = "percent_score")]
    pub score: u8,
    #[serde(default, rename = "perTestCaseResults", alias = "results")]
    pub results: Vec<TestCaseResult>,
}

fn percent_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Ok(0);
    }
    // Clamped to 0..=100 first, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = raw.clamp(0.0, 100.0).round() as u8;
    Ok(score)
}

/// The code-execution collaborator.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExecutionError` if the executor is unavailable or fails.
    async fn run(&self, request: &RunRequest) -> Result<RunOutput, ExecutionError>;

    /// # Errors
    ///
    /// Returns `ExecutionError` if the grader is unavailable or fails.
    async fn grade(&self, request: &GradeRequest) -> Result<GradeReport, ExecutionError>;
}

/// HTTP client for a Judge0-style execution service and a companion grader.
#[derive(Clone)]
pub struct HttpCodeExecutor {
    client: Client,
    config: Option<ExecutionConfig>,
}

impl HttpCodeExecutor {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ExecutionConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ExecutionConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn with_key(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.as_ref().and_then(|c| c.api_key.as_deref()) {
            Some(key) => builder.header("X-Auth-Token", key),
            None => builder,
        }
    }
}

#[async_trait]
impl CodeExecutor for HttpCodeExecutor {
    async fn run(&self, request: &RunRequest) -> Result<RunOutput, ExecutionError> {
        let config = self.config.as_ref().ok_or(ExecutionError::Disabled)?;
        let url = format!(
            "{}/submissions?base64_encoded=false&wait=true",
            config.base_url.trim_end_matches('/')
        );

        let response = self
            .with_key(self.client.post(url))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ExecutionError::HttpStatus(response.status()));
        }

        let body: SubmissionResponse = response.json().await?;
        Ok(body.into_output())
    }

    async fn grade(&self, request: &GradeRequest) -> Result<GradeReport, ExecutionError> {
        let url = self
            .config
            .as_ref()
            .and_then(|c| c.grader_url.as_deref())
            .ok_or(ExecutionError::Disabled)?;

        let response = self
            .with_key(self.client.post(url))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ExecutionError::HttpStatus(response.status()));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Err(ExecutionError::EmptyResponse);
        }
        let report: GradeReport = serde_json::from_str(&text)?;
        Ok(report)
    }
}

/// Judge0 submission result. `time` arrives as a decimal string.
#[derive(Debug, Deserialize)]
struct SubmissionResponse {
    stdout: Option<String>,
    stderr: Option<String>,
    compile_output: Option<String>,
    time: Option<String>,
    memory: Option<u64>,
}

impl SubmissionResponse {
    fn into_output(self) -> RunOutput {
        RunOutput {
            stdout: self.stdout.unwrap_or_default(),
            stderr: self.stderr.unwrap_or_default(),
            compile_output: self.compile_output.filter(|s| !s.trim().is_empty()),
            time_seconds: self.time.and_then(|t| t.trim().parse().ok()),
            memory_kb: self.memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::Language;

    #[test]
    fn run_request_uses_execution_language_id() {
        let draft = CodeDraft::new(Language::Cpp, "int main() {}");
        let request = RunRequest::new(&draft, "1 2");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["language_id"], 54);
        assert_eq!(json["stdin"], "1 2");
        assert_eq!(json["source_code"], "int main() {}");
    }

    #[test]
    fn grade_request_is_camel_case() {
        let draft = CodeDraft::new(Language::Python, "print(3)");
        let json = serde_json::to_value(GradeRequest::new(ItemId::new(7), &draft)).unwrap();
        assert_eq!(json["questionId"], 7);
        assert_eq!(json["languageId"], 71);
        assert_eq!(json["sourceCode"], "print(3)");
    }

    #[test]
    fn submission_response_parses_time_and_blank_compile_output() {
        let body: SubmissionResponse = serde_json::from_str(
            r#"{"stdout":"3\n","stderr":null,"compile_output":"","time":"0.012","memory":3120}"#,
        )
        .unwrap();
        let output = body.into_output();
        assert_eq!(output.stdout, "3\n");
        assert_eq!(output.stderr, "");
        assert_eq!(output.compile_output, None);
        assert_eq!(output.time_seconds, Some(0.012));
        assert_eq!(output.memory_kb, Some(3120));
    }

    #[test]
    fn grade_report_tolerates_missing_case_fields() {
        let report: GradeReport = serde_json::from_str(
            r#"{"passed":1,"total":2,"score":50,"perTestCaseResults":[{"passed":true},{"passed":false,"actualOutput":"x"}]}"#,
        )
        .unwrap();
        assert_eq!(report.score, 50);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[1].actual_output.as_deref(), Some("x"));
    }

    #[test]
    fn grade_report_accepts_legacy_results_field() {
        let report: GradeReport = serde_json::from_str(
            r#"{"passed":1,"total":1,"score":100,"results":[{"passed":true}]}"#,
        )
        .unwrap();
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn grade_report_rounds_and_clamps_fractional_scores() {
        let parse = |score: &str| {
            serde_json::from_str::<GradeReport>(&format!(
                r#"{{"passed":2,"total":3,"score":{score}}}"#
            ))
            .unwrap()
            .score
        };
        assert_eq!(parse("66.67"), 67);
        assert_eq!(parse("33.3"), 33);
        assert_eq!(parse("140"), 100);
        assert_eq!(parse("-5"), 0);
    }

    #[test]
    fn malformed_grade_body_is_a_decode_error() {
        let err: ExecutionError = serde_json::from_str::<GradeReport>(r#"{"passed":"many"}"#)
            .unwrap_err()
            .into();
        assert!(matches!(err, ExecutionError::Decode(_)));
    }

    #[tokio::test]
    async fn disabled_executor_reports_disabled() {
        let executor = HttpCodeExecutor::new(None);
        assert!(!executor.enabled());
        let draft = CodeDraft::new(Language::Python, "print(1)");
        let err = executor.run(&RunRequest::new(&draft, "")).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Disabled));
        let err = executor
            .grade(&GradeRequest::new(ItemId::new(1), &draft))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Disabled));
    }
}
