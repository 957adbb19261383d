//! Login, session-bound calls and logout over HTTP.

use super::common::{fault, init_tracing, metadata_url, respond};
use metaforce::MetadataClient;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_result(server: &MockServer) -> String {
    format!(
        "<result>\
           <metadataServerUrl>{}</metadataServerUrl>\
           <passwordExpired>false</passwordExpired>\
           <sandbox>true</sandbox>\
           <serverUrl>{}/services/Soap/u/50.0/00D000000000001</serverUrl>\
           <sessionId>00D!fresh</sessionId>\
           <userId>005000000000001</userId>\
           <userInfo><organizationId>00D000000000001</organizationId></userInfo>\
         </result>",
        metadata_url(server),
        server.uri()
    )
}

#[tokio::test]
async fn test_login_then_calls_carry_session() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/Soap/u/50.0"))
        .and(header("SOAPAction", "login"))
        .and(body_string_contains("<username>deployer@example.com</username>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(super::common::envelope(
            &format!("<loginResponse>{}</loginResponse>", login_result(&server)),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/services/Soap/m/50.0/00D000000000001"))
        .and(header("SOAPAction", "describeMetadata"))
        .and(body_string_contains("<sessionId>00D!fresh</sessionId>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(super::common::envelope(
            "<describeMetadataResponse><result>\
               <metadataObjects><xmlName>ApexClass</xmlName><suffix>cls</suffix></metadataObjects>\
               <partialSaveAllowed>true</partialSaveAllowed>\
               <testRequired>false</testRequired>\
             </result></describeMetadataResponse>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = MetadataClient::new().expect("Failed to create metadata client");
    client.set_login_url(&server.uri()).unwrap();

    let login = client
        .login("deployer@example.com", "password+token")
        .await
        .expect("Login should succeed");
    assert!(login.sandbox);
    assert_eq!(login.organization_id.as_deref(), Some("00D000000000001"));
    assert!(client.is_authenticated());
    assert_eq!(client.endpoint(), metadata_url(&server));

    let describe = client
        .describe_metadata()
        .await
        .expect("Describe should reach the metadata server URL");
    assert_eq!(describe.metadata_objects[0].xml_name, "ApexClass");
}

#[tokio::test]
async fn test_rejected_login_keeps_previous_session() {
    init_tracing();
    let server = MockServer::start().await;
    fault(
        &server,
        "login",
        "sf:INVALID_LOGIN",
        "INVALID_LOGIN: Invalid username, password, security token; or user locked out.",
    )
    .await;

    let mut client = MetadataClient::new().unwrap();
    client.set_login_url(&server.uri()).unwrap();
    client.use_existing_session("00D!previous", metadata_url(&server));

    let err = client.login("deployer@example.com", "wrong").await.unwrap_err();
    assert!(err.is_auth(), "unexpected error: {err}");
    assert!(err.to_string().contains("INVALID_LOGIN"));

    let session = client.session().expect("previous session is kept");
    assert_eq!(session.access_token(), "00D!previous");
}

#[tokio::test]
async fn test_logout_targets_partner_endpoint_and_clears_session() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/Soap/u/50.0"))
        .and(header("SOAPAction", "logout"))
        .and(body_string_contains("<sessionId>00D!integration</sessionId>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(super::common::envelope(
            "<logoutResponse/>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = super::common::client(&server);
    client.logout().await.expect("Logout should succeed");
    assert!(!client.is_authenticated());

    let err = client.describe_metadata().await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_api_version_switch_rewrites_endpoint() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/Soap/m/58.0/00D000000000001"))
        .and(body_string_contains("<asOfVersion>58.0</asOfVersion>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(super::common::envelope(
            "<describeMetadataResponse><result><testRequired>false</testRequired></result></describeMetadataResponse>",
        )))
        .expect(1)
        .mount(&server)
        .await;
    // Anything still addressed to 50.0 would hit this and fail the test.
    respond(&server, "describeMetadata", "<unexpected/>").await;

    let mut client = super::common::client(&server);
    client.set_api_version("58.0").unwrap();
    assert!(client.set_api_version("fifty").unwrap_err().is_validation());

    client
        .describe_metadata()
        .await
        .expect("Describe should use the rewritten endpoint");
}
