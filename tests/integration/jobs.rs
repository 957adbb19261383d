//! Deploy and retrieve jobs driven by caller-side polling.

use base64::Engine;
use metaforce::metadata::{JobKind, PackageManifest};
use metaforce::{AsyncJob, DeployOptions, JobState, RetrieveRequest};
use wiremock::matchers::{body_string_contains, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{client, envelope, respond, respond_when};

const ARCHIVE: &[u8] = b"PK\x03\x04fake!!";

#[tokio::test]
async fn test_deploy_poll_lifecycle() {
    let server = MockServer::start().await;
    let encoded = base64::engine::general_purpose::STANDARD.encode(ARCHIVE);

    Mock::given(method("POST"))
        .and(header("SOAPAction", "deploy"))
        .and(body_string_contains(format!("<ZipFile>{encoded}</ZipFile>")))
        .and(body_string_contains("<rollbackOnError>true</rollbackOnError>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<deployResponse><result><done>false</done><id>0Af000000000001</id>\
             <state>Queued</state></result></deployResponse>",
        )))
        .expect(1)
        .mount(&server)
        .await;
    respond_when(
        &server,
        "checkDeployStatus",
        "<includeDetails>false</includeDetails>",
        "<result><done>false</done><id>0Af000000000001</id><status>InProgress</status>\
         <success>false</success><numberComponentsTotal>1</numberComponentsTotal></result>",
    )
    .await;
    respond_when(
        &server,
        "checkDeployStatus",
        "<includeDetails>true</includeDetails>",
        "<result><details><componentSuccesses><componentType>CustomObject</componentType>\
         <created>true</created><deleted>false</deleted><fileName>objects/Foo__c.object</fileName>\
         <fullName>Foo__c</fullName></componentSuccesses></details>\
         <done>true</done><id>0Af000000000001</id><numberComponentsDeployed>1</numberComponentsDeployed>\
         <numberComponentsTotal>1</numberComponentsTotal><status>Succeeded</status>\
         <success>true</success></result>",
    )
    .await;

    let client = client(&server);
    assert_eq!(ARCHIVE.len(), 10);

    let job = client
        .deploy(ARCHIVE, &DeployOptions::default())
        .await
        .expect("Deploy should be accepted");
    assert_eq!(job.id(), "0Af000000000001");
    assert_eq!(job.kind(), JobKind::Deploy);
    assert_eq!(job.state(), JobState::Pending);

    let job = client.poll(job, false).await.unwrap();
    assert_eq!(job.state(), JobState::InProgress);
    assert!(job.details().is_none());
    assert_eq!(job.summary().unwrap().number_components_total, 1);

    let job = client.poll(job, true).await.unwrap();
    assert_eq!(job.state(), JobState::Succeeded);
    let result = job.deploy_result().expect("details were requested");
    assert!(result.success);
    assert_eq!(result.number_components_deployed, 1);
    assert_eq!(
        result.component_successes[0].full_name.as_deref(),
        Some("Foo__c")
    );

    // Terminal: no further traffic.
    let before = server.received_requests().await.unwrap_or_default().len();
    let job = client.poll(job, true).await.unwrap();
    assert_eq!(job.state(), JobState::Succeeded);
    let after = server.received_requests().await.unwrap_or_default().len();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_cancel_deploy_job() {
    let server = MockServer::start().await;
    respond_when(
        &server,
        "cancelDeploy",
        "<String>0Af000000000002</String>",
        "<result><done>false</done><id>0Af000000000002</id></result>",
    )
    .await;

    let client = client(&server);
    let job = client
        .cancel(AsyncJob::resume("0Af000000000002", JobKind::Deploy))
        .await
        .unwrap();
    assert_eq!(job.state(), JobState::Canceled);

    let job = client.cancel(job).await.unwrap();
    assert_eq!(job.state(), JobState::Canceled);
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);

    let err = client
        .cancel(AsyncJob::resume("09S000000000001", JobKind::Retrieve))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_retrieve_returns_archive() {
    let server = MockServer::start().await;
    let zip = base64::engine::general_purpose::STANDARD.encode(ARCHIVE);

    Mock::given(method("POST"))
        .and(header("SOAPAction", "retrieve"))
        .and(body_string_contains("<name>CustomObject</name>"))
        .and(body_string_contains("<members>Foo__c</members>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<retrieveResponse><result><done>false</done><id>09S000000000001</id>\
             <state>Queued</state></result></retrieveResponse>",
        )))
        .expect(1)
        .mount(&server)
        .await;
    respond(
        &server,
        "checkRetrieveStatus",
        &format!(
            "<result><done>true</done>\
             <fileProperties><fileName>unpackaged/objects/Foo__c.object</fileName>\
             <fullName>Foo__c</fullName><type>CustomObject</type></fileProperties>\
             <id>09S000000000001</id><status>Succeeded</status><success>true</success>\
             <zipFile>{zip}</zipFile></result>"
        ),
    )
    .await;

    let client = client(&server);
    let manifest = PackageManifest::new("50.0").add_type("CustomObject", vec!["Foo__c".to_string()]);

    let job = client
        .retrieve(&RetrieveRequest::unpackaged(manifest))
        .await
        .unwrap();
    assert_eq!(job.kind(), JobKind::Retrieve);
    assert_eq!(job.state(), JobState::Pending);

    let job = client.poll(job, true).await.unwrap();
    assert_eq!(job.state(), JobState::Succeeded);
    let result = job.retrieve_result().unwrap();
    assert_eq!(result.file_properties[0].full_name, "Foo__c");
    assert_eq!(result.zip_bytes().unwrap().as_deref(), Some(ARCHIVE));
}
