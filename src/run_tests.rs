//! Tests for the run module.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hiring_handshake::generate::{GenerateSettings, GenerationRequest};
use hiring_handshake::submit::SubmitSettings;
use hiring_handshake::webhook::{HttpError, HttpRequest, HttpResponse};
use tokio::time::Instant;

use super::*;

/// Shared scripted client: generator and submitter see one request log.
#[derive(Debug, Clone, Default)]
struct ScriptedClient {
    responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedClient {
    fn new(responses: Vec<(u16, &str)>) -> Self {
        let responses = responses
            .into_iter()
            .map(|(code, body)| {
                HttpResponse::new(
                    http::StatusCode::from_u16(code).unwrap(),
                    http::HeaderMap::new(),
                    body.as_bytes().to_vec(),
                )
            })
            .collect();
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::default(),
        }
    }

    fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.to_string())
            .collect()
    }
}

impl HttpClient for ScriptedClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(req);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(HttpError::Timeout)
    }
}

const GENERATE_URL: &str = "https://api.example.com/generateWebhook";
const FALLBACK_URL: &str = "https://api.example.com/testWebhook";
const GENERATED: &str = r#"{"webhook":"https://api.example.com/hook/42","accessToken":"abc123"}"#;

fn generate_settings() -> GenerateSettings {
    GenerateSettings {
        enabled: true,
        url: url::Url::parse(GENERATE_URL).unwrap(),
        request: GenerationRequest {
            name: "John Doe".to_string(),
            reg_no: "REG12347".to_string(),
            email: "john@example.com".to_string(),
        },
        timeout: GenerateSettings::DEFAULT_TIMEOUT,
    }
}

fn submit_settings(delay: Duration) -> SubmitSettings {
    SubmitSettings {
        enabled: true,
        fallback_url: url::Url::parse(FALLBACK_URL).unwrap(),
        final_query: "SELECT 1;".to_string(),
        delay,
        token_timeout: Duration::from_millis(500),
        token_poll_interval: Duration::from_millis(50),
        timeout: SubmitSettings::DEFAULT_TIMEOUT,
    }
}

fn steps<H: HttpClient + Clone>(
    client: &H,
    submit: SubmitSettings,
    shutdown: &watch::Receiver<bool>,
) -> (WebhookGenerator<H>, SolutionSubmitter<H>) {
    let context = Arc::new(WebhookContext::new());
    let generator = WebhookGenerator::new(client.clone(), Arc::clone(&context), generate_settings())
        .with_shutdown(shutdown.clone());
    let submitter =
        SolutionSubmitter::new(client.clone(), context, submit).with_shutdown(shutdown.clone());
    (generator, submitter)
}

mod sequencing {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn generation_feeds_submission() {
        let client = ScriptedClient::new(vec![(200, GENERATED), (200, "accepted")]);
        let (_tx, rx) = watch::channel(false);
        let (generator, submitter) = steps(&client, submit_settings(Duration::ZERO), &rx);

        let report = run_steps(generator, submitter, rx).await.unwrap();

        assert!(report.generation.is_stored());
        assert_eq!(report.submission.attempts(), 1);
        assert_eq!(
            client.urls(),
            vec![GENERATE_URL.to_string(), "https://api.example.com/hook/42".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_generation_leaves_submission_with_empty_context() {
        let client = ScriptedClient::new(vec![(500, "boom")]);
        let (_tx, rx) = watch::channel(false);
        let (generator, submitter) = steps(&client, submit_settings(Duration::ZERO), &rx);

        let report = run_steps(generator, submitter, rx).await.unwrap();

        assert!(!report.generation.is_stored());
        assert!(matches!(report.submission, SubmissionOutcome::ContextEmpty));
        assert_eq!(client.urls(), vec![GENERATE_URL.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_generation_response_aborts_submission() {
        let client = ScriptedClient::new(vec![(200, "{}")]);
        let (_tx, rx) = watch::channel(false);
        let (generator, submitter) = steps(&client, submit_settings(Duration::ZERO), &rx);

        let report = run_steps(generator, submitter, rx).await.unwrap();

        assert!(matches!(report.generation, GenerationOutcome::Empty));
        assert!(matches!(report.submission, SubmissionOutcome::ContextEmpty));
    }
}

mod delayed_submission {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn submission_waits_for_delay() {
        let client = ScriptedClient::new(vec![(200, GENERATED), (200, "accepted")]);
        let (_tx, rx) = watch::channel(false);
        let (generator, submitter) = steps(&client, submit_settings(Duration::from_secs(2)), &rx);
        let start = Instant::now();

        let report = run_steps(generator, submitter, rx).await.unwrap();

        assert_eq!(report.submission.attempts(), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_delay_skips_submission() {
        let client = ScriptedClient::new(vec![(200, GENERATED)]);
        let (tx, rx) = watch::channel(false);
        let (generator, submitter) = steps(&client, submit_settings(Duration::from_secs(60)), &rx);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            tx.send(true).unwrap();
        });

        let report = run_steps(generator, submitter, rx).await.unwrap();

        assert!(matches!(report.submission, SubmissionOutcome::Cancelled));
        assert_eq!(client.urls(), vec![GENERATE_URL.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_submission_skips_delay() {
        let client = ScriptedClient::new(vec![(200, GENERATED)]);
        let (_tx, rx) = watch::channel(false);
        let submit = SubmitSettings {
            enabled: false,
            ..submit_settings(Duration::from_secs(60))
        };
        let (generator, submitter) = steps(&client, submit, &rx);
        let start = Instant::now();

        let report = run_steps(generator, submitter, rx).await.unwrap();

        assert!(matches!(report.submission, SubmissionOutcome::Disabled));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

mod shutdown_during_generation {
    use super::*;

    /// Answers like `ScriptedClient`, but only after the generation timeout.
    #[derive(Debug, Clone, Default)]
    struct SlowClient {
        inner: ScriptedClient,
    }

    impl HttpClient for SlowClient {
        async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
            let response = self.inner.request(req).await;
            tokio::time::sleep(GenerateSettings::DEFAULT_TIMEOUT).await;
            response
        }
    }

    #[tokio::test(start_paused = true)]
    async fn signal_ends_run_without_waiting_for_call() {
        let client = SlowClient {
            inner: ScriptedClient::new(vec![(200, GENERATED), (200, "accepted")]),
        };
        let (tx, rx) = watch::channel(false);
        let (generator, submitter) = steps(&client, submit_settings(Duration::ZERO), &rx);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            tx.send_replace(true);
        });
        let start = Instant::now();

        let report = run_steps(generator, submitter, rx).await.unwrap();

        assert!(matches!(report.generation, GenerationOutcome::Cancelled));
        assert!(matches!(report.submission, SubmissionOutcome::Cancelled));
        assert_eq!(start.elapsed(), Duration::from_millis(200));
        assert_eq!(client.inner.urls(), vec![GENERATE_URL.to_string()]);
    }
}

mod run_error {
    use super::*;

    #[tokio::test]
    async fn submission_task_error_displays_source() {
        let handle = tokio::spawn(async { panic!("boom") });
        let join_error = handle.await.unwrap_err();

        let error = RunError::SubmissionTask(join_error);

        assert!(error.to_string().contains("Submission task failed"));
    }
}
