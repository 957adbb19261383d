//! Metadata CRUD over HTTP: per-element outcomes and batch rules.

use super::common::{client, respond, respond_when};
use metaforce::metadata::{Component, CustomObject, MetadataRef};
use wiremock::MockServer;

#[tokio::test]
async fn test_delete_reports_each_element() {
    let server = MockServer::start().await;
    respond_when(
        &server,
        "deleteMetadata",
        "<fullNames>Bar__c</fullNames>",
        "<result><fullName>Foo__c</fullName><success>true</success></result>\
         <result><fullName>Bar__c</fullName><success>false</success>\
           <errors><message>Cannot delete Bar__c: it is referenced by a layout</message>\
           <statusCode>CANNOT_DELETE_MANAGED_OBJECT</statusCode></errors>\
         </result>",
    )
    .await;

    let client = client(&server);
    let results = client
        .delete_metadata("CustomObject", &["Foo__c", "Bar__c"])
        .await
        .expect("The call itself should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().full_name, "Foo__c");

    let failure = results[1].as_ref().unwrap_err();
    assert_eq!(failure.full_name.as_deref(), Some("Bar__c"));
    assert_eq!(failure.status_code, "CANNOT_DELETE_MANAGED_OBJECT");
    assert!(failure.message.contains("referenced by a layout"));
}

#[tokio::test]
async fn test_create_then_read_back() {
    let server = MockServer::start().await;
    respond_when(
        &server,
        "createMetadata",
        r#"<metadata xsi:type="met:CustomObject"><fullName>Invoice__c</fullName>"#,
        "<result><fullName>Invoice__c</fullName><success>true</success></result>",
    )
    .await;
    respond(
        &server,
        "readMetadata",
        r#"<result><records xsi:type="CustomObject">
             <fullName>Invoice__c</fullName>
             <label>Invoice</label>
             <pluralLabel>Invoices</pluralLabel>
             <sharingModel>ReadWrite</sharingModel>
           </records></result>"#,
    )
    .await;

    let client = client(&server);
    let object = CustomObject {
        full_name: "Invoice__c".to_string(),
        label: Some("Invoice".to_string()),
        plural_label: Some("Invoices".to_string()),
        sharing_model: Some("ReadWrite".to_string()),
        ..Default::default()
    };
    let component = Component::from_typed(&object).unwrap();

    let created = client.create_metadata(&[component]).await.unwrap();
    assert_eq!(created[0].as_ref().unwrap().full_name, "Invoice__c");

    let read = client
        .read_components(&[MetadataRef::new("CustomObject", "Invoice__c")])
        .await
        .unwrap();
    assert_eq!(read.records.len(), 1);
    let record = &read.records[0];
    assert_eq!(record.type_name(), "CustomObject");
    assert_eq!(record.full_name(), "Invoice__c");
    assert_eq!(
        record.field("label").and_then(|v| v.as_str()),
        Some("Invoice")
    );
}

#[tokio::test]
async fn test_oversized_batch_never_reaches_server() {
    let server = MockServer::start().await;
    let client = client(&server);

    let names: Vec<String> = (0..11).map(|i| format!("Obj{i}__c")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();

    let err = client.delete_metadata("CustomObject", &names).await.unwrap_err();
    assert!(err.is_validation());

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}
