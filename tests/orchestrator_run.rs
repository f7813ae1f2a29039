use groq_health::{
    checks::{GROQ_CHECK, LOCAL_EXTRACT_CHECK},
    cli::{Args, ConfigError, execute, resolve_settings},
    config::{Config, DEFAULT_MODEL, OutputFormat},
    env::Environment,
    orchestrator::{Orchestrator, ProbeSettings, RunStatus},
    report::mask_secret,
    transport::{
        CallFailure, ClientConfig, ModelTransport, ResponseCreate, TransportChoice, TransportKind,
    },
};
use mockito::Server;
use serde_json::Value;
use std::time::Duration;

struct Fixed(&'static str);

impl ModelTransport for Fixed {
    fn kind(&self) -> TransportKind {
        TransportKind::Sdk
    }

    fn output_text(&self, _request: &ResponseCreate) -> Result<String, CallFailure> {
        Ok(self.0.to_string())
    }
}

fn settings(test_local: bool, local_url: String, format: OutputFormat) -> ProbeSettings {
    ProbeSettings {
        client: ClientConfig {
            api_key: "gsk_abcdefghijklmnop".into(),
            base_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_secs(5),
            user_agent: "groq-health-test".into(),
        },
        model: "openai/gpt-oss-20b".into(),
        transport: TransportChoice::Auto,
        local_url,
        test_local,
        format,
    }
}

#[test]
fn missing_credential_exits_2_without_output() {
    let args = Args::default();
    let mut out = Vec::new();
    let status = execute(&args, &Config::default(), &Environment::default(), &mut out).unwrap();
    assert_eq!(status, RunStatus::Misconfigured);
    assert_eq!(status.code(), 2);
    assert!(out.is_empty());
}

#[test]
fn invalid_timeout_is_a_config_error() {
    let args = Args {
        api_key: Some("k".into()),
        timeout: Some(0.0),
        ..Default::default()
    };
    let err = resolve_settings(&args, &Config::default(), &Environment::default()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTimeout(_)));
}

#[test]
fn credential_precedence() {
    let mut cfg = Config::default();
    cfg.groq.api_key = "from_config".into();
    let env = Environment::from_vars([("GROQ_API_KEY", "from_env"), ("GROQ_MODEL", "env-model")]);

    let s = resolve_settings(&Args::default(), &cfg, &env).unwrap();
    assert_eq!(s.client.api_key, "from_env");
    assert_eq!(s.model, "env-model");

    let args = Args {
        api_key: Some("from_flag".into()),
        model: Some("flag-model".into()),
        ..Default::default()
    };
    let s = resolve_settings(&args, &cfg, &env).unwrap();
    assert_eq!(s.client.api_key, "from_flag");
    assert_eq!(s.model, "flag-model");

    let s = resolve_settings(&Args::default(), &cfg, &Environment::default()).unwrap();
    assert_eq!(s.client.api_key, "from_config");
    assert_eq!(s.model, DEFAULT_MODEL);
    assert_eq!(s.timeout(), Duration::from_secs(45));
    assert!(!s.test_local);
}

#[test]
fn empty_flag_falls_back_to_environment() {
    let args = Args {
        api_key: Some(String::new()),
        ..Default::default()
    };
    let env = Environment::from_vars([("GROQ_API_KEY", "from_env")]);
    let s = resolve_settings(&args, &Config::default(), &env).unwrap();
    assert_eq!(s.client.api_key, "from_env");
}

#[test]
fn masks_secrets() {
    assert_eq!(mask_secret("short"), "*****");
    assert_eq!(mask_secret("0123456789"), "**********");
    assert_eq!(mask_secret("gsk_abcdefghijklmnop"), "gsk_ab...mnop");
    assert_eq!(mask_secret(""), "");
}

#[test]
fn passing_groq_only_run_prints_report() {
    let orch = Orchestrator::new(
        settings(false, String::new(), OutputFormat::Text),
        Box::new(Fixed(r#"{"ok": true, "source": "groq"}"#)),
    );
    let mut out = Vec::new();
    let status = orch.run(&mut out).unwrap();
    assert_eq!(status, RunStatus::Passed);
    assert_eq!(status.code(), 0);

    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "Using key: gsk_ab...mnop\n\
         Using model: openai/gpt-oss-20b\n\
         \n\
         Results:\n\
         - PASS | Groq key test: SDK call ok, model=openai/gpt-oss-20b, parsed JSON ok=true\n"
    );
}

#[test]
fn local_failure_does_not_stop_groq_and_flips_exit_code() {
    let mut server = Server::new();
    server
        .mock("POST", "/api/extract")
        .with_status(200)
        .with_body(r#"{"connections":[]}"#)
        .create();

    let orch = Orchestrator::new(
        settings(true, format!("{}/api/extract", server.url()), OutputFormat::Text),
        Box::new(Fixed(r#"{"ok": true}"#)),
    );
    let results = orch.run_checks();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, GROQ_CHECK);
    assert!(results[0].ok);
    assert_eq!(results[1].name, LOCAL_EXTRACT_CHECK);
    assert!(!results[1].ok);
    assert_eq!(RunStatus::from_results(&results), RunStatus::Failed);
    assert_eq!(RunStatus::from_results(&results).code(), 1);
}

#[test]
fn groq_failure_still_runs_local_probe() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/extract")
        .with_status(200)
        .with_body(r#"{"connections":[{"eanCode":"123456789012345678"}]}"#)
        .create();

    let orch = Orchestrator::new(
        settings(true, format!("{}/api/extract", server.url()), OutputFormat::Text),
        Box::new(Fixed("no json here")),
    );
    let mut out = Vec::new();
    let status = orch.run(&mut out).unwrap();
    mock.assert();
    assert_eq!(status, RunStatus::Failed);

    let text = String::from_utf8(out).unwrap();
    let groq_line = text.find("- FAIL | Groq key test").expect("groq line");
    let local_line = text
        .find("- PASS | Local /api/extract test: HTTP 200, connections=1, first EAN valid")
        .expect("local line");
    assert!(groq_line < local_line);
}

#[test]
fn json_format_reports_masked_key() {
    let orch = Orchestrator::new(
        settings(false, String::new(), OutputFormat::Json),
        Box::new(Fixed(r#"{"ok": false}"#)),
    );
    let mut out = Vec::new();
    let status = orch.run(&mut out).unwrap();
    assert_eq!(status, RunStatus::Failed);

    let doc: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(doc["key"], "gsk_ab...mnop");
    assert_eq!(doc["transport"], "sdk");
    assert_eq!(doc["ok"], false);
    assert_eq!(doc["results"][0]["name"], GROQ_CHECK);
    assert_eq!(doc["results"][0]["ok"], false);
    assert!(doc["checked_at"].as_str().is_some());
    assert!(!String::from_utf8_lossy(&out).contains("gsk_abcdefghijklmnop"));
}
