//! Shared helpers: a wiremock server that speaks SOAP.

use metaforce::{ClientConfig, MetadataClient};
use wiremock::matchers::{body_string_contains, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Install a test subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Wrap a body element in a SOAP response envelope.
pub fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><soapenv:Body>{}</soapenv:Body></soapenv:Envelope>"#,
        body
    )
}

/// Answer `operation` with `<{operation}Response>{content}</...>`.
pub async fn respond(server: &MockServer, operation: &str, content: &str) {
    Mock::given(method("POST"))
        .and(header("SOAPAction", operation))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(&format!(
            "<{op}Response>{content}</{op}Response>",
            op = operation
        ))))
        .mount(server)
        .await;
}

/// Like [`respond`], but only for requests whose body contains `needle`.
pub async fn respond_when(server: &MockServer, operation: &str, needle: &str, content: &str) {
    Mock::given(method("POST"))
        .and(header("SOAPAction", operation))
        .and(body_string_contains(needle))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(&format!(
            "<{op}Response>{content}</{op}Response>",
            op = operation
        ))))
        .mount(server)
        .await;
}

/// Answer `operation` with a SOAP fault over HTTP 500.
pub async fn fault(server: &MockServer, operation: &str, code: &str, message: &str) {
    Mock::given(method("POST"))
        .and(header("SOAPAction", operation))
        .respond_with(ResponseTemplate::new(500).set_body_string(envelope(&format!(
            "<soapenv:Fault><faultcode>{code}</faultcode><faultstring>{message}</faultstring></soapenv:Fault>"
        ))))
        .mount(server)
        .await;
}

/// Metadata server URL hosted by the mock server.
pub fn metadata_url(server: &MockServer) -> String {
    format!("{}/services/Soap/m/50.0/00D000000000001", server.uri())
}

/// An HTTP client with a session bound to the mock server.
pub fn client(server: &MockServer) -> MetadataClient {
    init_tracing();
    let mut client = MetadataClient::with_config(ClientConfig::default())
        .expect("Failed to create metadata client");
    client.use_existing_session("00D!integration", metadata_url(server));
    client
}
