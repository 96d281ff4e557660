use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sketchgen::error::GenerationError;
use sketchgen::generation::{
    GenerationBackend, GenerationReply, GenerationRequest, GenerationState, ImageData,
    Orchestrator, ReplyPart,
};
use sketchgen::snapshot;

/// What the stubbed capability should do when called.
enum Script {
    /// Reply with a text part followed by two image parts.
    Images,
    /// Reply with a text part and no image at all.
    TextOnly,
    /// Raise a remote fault with the given message.
    Fail(&'static str),
}

struct StubBackend {
    script: Script,
    calls: AtomicUsize,
}

impl StubBackend {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self { script, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GenerationBackend for StubBackend {
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply, GenerationError> {
        assert!(
            request.instruction.contains("a magical girl"),
            "the instruction must embed the user prompt verbatim"
        );
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Images => Ok(GenerationReply {
                parts: vec![
                    ReplyPart { text: Some("here you go".into()), image: None },
                    ReplyPart {
                        text: None,
                        image: Some(ImageData { mime_type: "image/png".into(), bytes: b"first".to_vec() }),
                    },
                    ReplyPart {
                        text: None,
                        image: Some(ImageData { mime_type: "image/png".into(), bytes: b"second".to_vec() }),
                    },
                ],
            }),
            Script::TextOnly => Ok(GenerationReply {
                parts: vec![ReplyPart { text: Some("no can do".into()), image: None }],
            }),
            Script::Fail(message) => Err(GenerationError::RemoteCall(message.into())),
        }
    }
}

fn orchestrator_with(script: Script) -> (Orchestrator, Arc<StubBackend>) {
    let backend = StubBackend::new(script);
    (Orchestrator::new(backend.clone()), backend)
}

fn snapshot_url() -> Result<String, GenerationError> {
    Ok(snapshot::encode_data_url(snapshot::PNG_MIME, b"fake png bytes"))
}

const PROMPT: &str = "a magical girl against the Milky Way";

/// Poll until the in-flight request settles into a terminal state.
fn settle(orchestrator: &mut Orchestrator) {
    for _ in 0..500 {
        if orchestrator.poll() {
            return;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    panic!("generation request never settled");
}

#[test]
fn empty_prompt_is_rejected_without_calling_the_capability() {
    let (mut orchestrator, backend) = orchestrator_with(Script::Images);

    let err = orchestrator.submit(snapshot_url(), "   \n\t").unwrap_err();
    assert!(matches!(err, GenerationError::EmptyPrompt));
    assert!(err.is_validation());
    assert_eq!(backend.calls(), 0);
    assert!(matches!(orchestrator.state(), GenerationState::Failure(_)));
}

#[test]
fn missing_surface_is_rejected_without_calling_the_capability() {
    let (mut orchestrator, backend) = orchestrator_with(Script::Images);

    let err = orchestrator
        .submit(Err(GenerationError::MissingSurface), PROMPT)
        .unwrap_err();
    assert!(matches!(err, GenerationError::MissingSurface));
    assert_eq!(backend.calls(), 0);
}

#[test]
fn malformed_snapshot_is_rejected_without_calling_the_capability() {
    let (mut orchestrator, backend) = orchestrator_with(Script::Images);

    let err = orchestrator
        .submit(Ok("image/png;base64,AAAA".into()), PROMPT)
        .unwrap_err();
    assert!(matches!(err, GenerationError::MalformedSnapshot(_)));
    assert_eq!(backend.calls(), 0);
    match orchestrator.state() {
        GenerationState::Failure(message) => assert!(message.contains("data URL")),
        other => panic!("expected Failure, got {other:?}"),
    }
}

#[test]
fn successful_generation_surfaces_the_first_image_unchanged() {
    let (mut orchestrator, backend) = orchestrator_with(Script::Images);
    assert!(matches!(orchestrator.state(), GenerationState::Idle));

    orchestrator.submit(snapshot_url(), PROMPT).unwrap();
    assert!(orchestrator.is_submitting());

    settle(&mut orchestrator);
    match orchestrator.state() {
        GenerationState::Success(image) => {
            assert_eq!(image.bytes, b"first".to_vec());
            assert_eq!(image.mime_type, "image/png");
        }
        other => panic!("expected Success, got {other:?}"),
    }
    assert_eq!(backend.calls(), 1);
}

#[test]
fn reply_without_image_becomes_a_no_result_failure() {
    let (mut orchestrator, _backend) = orchestrator_with(Script::TextOnly);

    orchestrator.submit(snapshot_url(), PROMPT).unwrap();
    settle(&mut orchestrator);

    match orchestrator.state() {
        GenerationState::Failure(message) => {
            assert_eq!(message, &GenerationError::NoResult.to_string());
            assert!(message.contains("no image data found"));
        }
        other => panic!("expected Failure, got {other:?}"),
    }
}

#[test]
fn remote_fault_message_is_surfaced() {
    let (mut orchestrator, _backend) = orchestrator_with(Script::Fail("quota exceeded"));

    orchestrator.submit(snapshot_url(), PROMPT).unwrap();
    settle(&mut orchestrator);

    match orchestrator.state() {
        GenerationState::Failure(message) => assert!(message.contains("quota exceeded")),
        other => panic!("expected Failure, got {other:?}"),
    }
}

#[test]
fn second_submit_while_in_flight_is_a_noop() {
    let (mut orchestrator, backend) = orchestrator_with(Script::Images);

    orchestrator.submit(snapshot_url(), PROMPT).unwrap();
    assert!(orchestrator.is_submitting());

    // The guard holds until poll() observes the outcome, so this submit is
    // dropped no matter how fast the stub replies.
    orchestrator.submit(snapshot_url(), PROMPT).unwrap();
    assert!(orchestrator.is_submitting());

    settle(&mut orchestrator);
    assert!(matches!(orchestrator.state(), GenerationState::Success(_)));
    assert_eq!(backend.calls(), 1, "only one request may reach the capability");
}

#[test]
fn resubmission_after_a_terminal_state_restarts_the_lifecycle() {
    let (mut orchestrator, backend) = orchestrator_with(Script::Fail("quota exceeded"));

    orchestrator.submit(snapshot_url(), PROMPT).unwrap();
    settle(&mut orchestrator);
    assert!(matches!(orchestrator.state(), GenerationState::Failure(_)));

    orchestrator.submit(snapshot_url(), PROMPT).unwrap();
    assert!(orchestrator.is_submitting(), "terminal states allow resubmission");
    settle(&mut orchestrator);
    assert_eq!(backend.calls(), 2);
}

#[test]
fn poll_outside_submitting_reports_no_change() {
    let (mut orchestrator, _backend) = orchestrator_with(Script::Images);
    assert!(!orchestrator.poll());
    assert!(matches!(orchestrator.state(), GenerationState::Idle));
}
