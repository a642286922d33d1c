//! ---
//! thalos_section: "05-networking-external-interfaces"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Transport-independent request routing onto orchestrator operations."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use axum::http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thalos_core::{CoreError, ErrorKind, SharedOrchestrator};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Response body for every routed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: EnvelopeStatus,
    pub code: u16,
    pub data: Value,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            code: StatusCode::OK.as_u16(),
            data,
        }
    }

    /// Error envelope carrying `{error, message}`.
    pub fn error(code: StatusCode, error: &str, message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            code: code.as_u16(),
            data: json!({ "error": error, "message": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<CoreError> for Envelope {
    fn from(err: CoreError) -> Self {
        Envelope::error(status_for(&err), err.kind().as_str(), err.to_string())
    }
}

/// HTTP status for a core failure.
pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::SubsystemUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => match err.kind() {
            ErrorKind::LifecycleViolation
            | ErrorKind::KeyConflict
            | ErrorKind::TemplateConflict
            | ErrorKind::HistoryDisabled => StatusCode::CONFLICT,
            ErrorKind::KeyAbsence | ErrorKind::TemplateAbsence => StatusCode::NOT_FOUND,
            ErrorKind::ContextIncompleteness | ErrorKind::FormatInvalidity => {
                StatusCode::BAD_REQUEST
            }
        },
    }
}

#[derive(Debug, Deserialize)]
struct CreateEntry {
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct UpdateEntry {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ClassRequest {
    name: String,
    #[serde(default)]
    methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FunctionRequest {
    name: String,
    #[serde(default)]
    parameters: Vec<String>,
}

/// Maps `(method, path, body)` onto orchestrator operations.
///
/// Holds the orchestrator lock for the duration of one request only.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    orchestrator: SharedOrchestrator,
}

impl RequestRouter {
    pub fn new(orchestrator: SharedOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &SharedOrchestrator {
        &self.orchestrator
    }

    pub fn handle(&self, method: &Method, path: &str, body: Option<&Value>) -> Envelope {
        let envelope = match self.route(method, path, body) {
            Ok(data) => Envelope::success(data),
            Err(envelope) => envelope,
        };
        debug!(method = %method, path, code = envelope.code, "request routed");
        envelope
    }

    fn route(&self, method: &Method, path: &str, body: Option<&Value>) -> Result<Value, Envelope> {
        let segments: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        let mut orchestrator = self.orchestrator.lock();

        match (method.as_str(), segments.as_slice()) {
            ("GET", ["health"]) => Ok(json!({
                "healthy": true,
                "service": orchestrator.name(),
            })),
            ("GET", ["status"]) => Ok(json!(orchestrator.status())),
            ("POST", ["boot"]) => {
                orchestrator.boot()?;
                Ok(json!({ "booted": true }))
            }
            ("POST", ["shutdown"]) => {
                orchestrator.shutdown()?;
                Ok(json!({ "shutdown": true }))
            }
            ("GET", ["memory"]) => {
                let store = orchestrator.store()?;
                Ok(json!({ "keys": store.list_keys(), "count": store.count() }))
            }
            ("POST", ["memory"]) => {
                let request: CreateEntry = parse_body(body)?;
                orchestrator.store_mut()?.create(&request.key, request.value)?;
                Ok(json!({ "created": true, "key": request.key }))
            }
            ("GET", ["memory", key]) => {
                let value = orchestrator.store()?.read(key)?;
                Ok(json!({ "key": key, "value": value }))
            }
            ("PUT", ["memory", key]) => {
                let request: UpdateEntry = parse_body(body)?;
                orchestrator.store_mut()?.update(key, request.value)?;
                Ok(json!({ "updated": true, "key": key }))
            }
            ("DELETE", ["memory", key]) => {
                orchestrator.store_mut()?.delete(key)?;
                Ok(json!({ "deleted": true, "key": key }))
            }
            ("POST", ["codegen", "class"]) => {
                let request: ClassRequest = parse_body(body)?;
                let code = orchestrator
                    .templates()?
                    .generate_class(&request.name, request.methods.as_slice())?;
                Ok(json!({ "code": code }))
            }
            ("POST", ["codegen", "function"]) => {
                let request: FunctionRequest = parse_body(body)?;
                let code = orchestrator
                    .templates()?
                    .generate_function(&request.name, request.parameters.as_slice())?;
                Ok(json!({ "code": code }))
            }
            _ => Err(Envelope::error(
                StatusCode::NOT_FOUND,
                "route-not-found",
                format!("no route for {method} {path}"),
            )),
        }
    }
}

fn parse_body<T: DeserializeOwned>(body: Option<&Value>) -> Result<T, Envelope> {
    let value = body.ok_or_else(|| {
        Envelope::error(StatusCode::BAD_REQUEST, "bad-request", "request body required")
    })?;
    serde_json::from_value(value.clone()).map_err(|err| {
        Envelope::error(
            StatusCode::BAD_REQUEST,
            "bad-request",
            format!("invalid request body: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use thalos_core::Orchestrator;

    fn router(booted: bool) -> RequestRouter {
        let orchestrator = Orchestrator::default().into_shared();
        if booted {
            orchestrator.lock().boot().unwrap();
        }
        RequestRouter::new(orchestrator)
    }

    #[test]
    fn health_reports_service_name() {
        let router = router(false);
        let response = router.handle(&Method::GET, "/health", None);
        assert!(response.is_success());
        assert_eq!(response.code, 200);
        assert_eq!(response.data["healthy"], true);
        assert_eq!(response.data["service"], "Thalos Prime");
    }

    #[test]
    fn boot_and_shutdown_routes() {
        let router = router(false);
        let status = router.handle(&Method::GET, "/status", None);
        assert_eq!(status.data["state"], "created");
        assert_eq!(status.data["version"], "1.0");

        let response = router.handle(&Method::POST, "/boot", None);
        assert_eq!(response.data["booted"], true);
        let again = router.handle(&Method::POST, "/boot", None);
        assert_eq!(again.code, 409);
        assert_eq!(again.data["error"], "lifecycle-violation");

        let response = router.handle(&Method::POST, "/shutdown", None);
        assert_eq!(response.data["shutdown"], true);
        assert_eq!(router.handle(&Method::POST, "/shutdown", None).code, 409);
    }

    #[test]
    fn memory_crud_over_routes() {
        let router = router(true);
        let body = json!({ "key": "testkey", "value": "testvalue" });
        let created = router.handle(&Method::POST, "/memory", Some(&body));
        assert_eq!(created.code, 200);
        assert_eq!(created.data, json!({ "created": true, "key": "testkey" }));

        let dup = json!({ "key": "testkey", "value": "other" });
        let conflict = router.handle(&Method::POST, "/memory", Some(&dup));
        assert_eq!(conflict.status, EnvelopeStatus::Error);
        assert_eq!(conflict.code, 409);

        let read = router.handle(&Method::GET, "/memory/testkey", None);
        assert_eq!(read.data, json!({ "key": "testkey", "value": "testvalue" }));

        let update = json!({ "value": "newvalue" });
        let updated = router.handle(&Method::PUT, "/memory/testkey", Some(&update));
        assert_eq!(updated.data["updated"], true);
        let read = router.handle(&Method::GET, "/memory/testkey", None);
        assert_eq!(read.data["value"], "newvalue");

        let listed = router.handle(&Method::GET, "/memory", None);
        assert_eq!(listed.data, json!({ "keys": ["testkey"], "count": 1 }));

        let deleted = router.handle(&Method::DELETE, "/memory/testkey", None);
        assert_eq!(deleted.data["deleted"], true);
        let missing = router.handle(&Method::GET, "/memory/testkey", None);
        assert_eq!(missing.code, 404);
        assert_eq!(missing.data["error"], "key-absence");
    }

    #[test]
    fn invalid_input_is_bad_request() {
        let router = router(true);
        let bad_key = json!({ "key": "1bad", "value": "v" });
        let response = router.handle(&Method::POST, "/memory", Some(&bad_key));
        assert_eq!(response.code, 400);
        assert_eq!(response.data["error"], "format-invalidity");

        assert_eq!(router.handle(&Method::POST, "/memory", None).code, 400);
        let wrong_shape = json!({ "key": "k" });
        assert_eq!(router.handle(&Method::POST, "/memory", Some(&wrong_shape)).code, 400);

        let bad_class = json!({ "name": "lowercase" });
        assert_eq!(router.handle(&Method::POST, "/codegen/class", Some(&bad_class)).code, 400);
    }

    #[test]
    fn subsystems_unavailable_before_boot() {
        let router = router(false);
        let response = router.handle(&Method::GET, "/memory", None);
        assert_eq!(response.code, 503);
        assert_eq!(response.data["error"], "lifecycle-violation");
        let body = json!({ "name": "Widget" });
        assert_eq!(router.handle(&Method::POST, "/codegen/class", Some(&body)).code, 503);
    }

    #[test]
    fn codegen_routes() {
        let router = router(true);
        let body = json!({ "name": "TestClass", "methods": ["method1", "method2"] });
        let response = router.handle(&Method::POST, "/codegen/class", Some(&body));
        assert!(response.is_success());
        let code = response.data["code"].as_str().unwrap();
        assert!(code.contains("class TestClass:"));
        assert!(code.contains("def method1(self):"));

        let body = json!({ "name": "test_func", "parameters": ["a", "b"] });
        let response = router.handle(&Method::POST, "/codegen/function", Some(&body));
        assert!(response.data["code"].as_str().unwrap().contains("def test_func(a, b):"));
    }

    #[test]
    fn unmatched_routes_are_not_found() {
        let router = router(true);
        assert_eq!(router.handle(&Method::GET, "/nope", None).code, 404);
        assert_eq!(router.handle(&Method::PATCH, "/memory", None).code, 404);
        let response = router.handle(&Method::GET, "/memory/a/b", None);
        assert_eq!(response.data["error"], "route-not-found");
    }

    #[test]
    fn error_status_mapping() {
        assert_eq!(
            status_for(&CoreError::KeyExists { key: "k".into() }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&CoreError::TemplateNotFound { name: "t".into() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&CoreError::HistoryDisabled), StatusCode::CONFLICT);
    }
}
