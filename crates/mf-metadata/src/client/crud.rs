use metaforce_client::{xml, SoapCall, Transport, XmlNode};
use tracing::{debug, instrument};

use crate::component::{Component, MetadataRef};
use crate::envelope::{self, MetadataSelector};
use crate::error::{Error, Result};
use crate::types::{
    DeleteResult, ElementResult, ReadResult, RenameRequest, SaveResult, UpsertResult,
};

use super::MetadataClient;

impl<T: Transport> MetadataClient<T> {
    /// Create components. Kinds may be mixed; at most 10 per call.
    ///
    /// Returns one result per component, in request order.
    pub async fn create_metadata(
        &self,
        components: &[Component],
    ) -> Result<Vec<ElementResult<SaveResult>>> {
        self.save("createMetadata", components, |_, full_name| SaveResult { full_name })
            .await
    }

    /// Update existing components. Kinds may be mixed; at most 10 per call.
    pub async fn update_metadata(
        &self,
        components: &[Component],
    ) -> Result<Vec<ElementResult<SaveResult>>> {
        self.save("updateMetadata", components, |_, full_name| SaveResult { full_name })
            .await
    }

    /// Create or update components. Kinds may be mixed; at most 10 per call.
    pub async fn upsert_metadata(
        &self,
        components: &[Component],
    ) -> Result<Vec<ElementResult<UpsertResult>>> {
        self.save("upsertMetadata", components, |node, full_name| UpsertResult {
            full_name,
            created: node.bool_of("created"),
        })
        .await
    }

    #[instrument(skip(self, components, success), fields(count = components.len()))]
    async fn save<R>(
        &self,
        operation: &str,
        components: &[Component],
        success: impl Fn(&XmlNode, String) -> R,
    ) -> Result<Vec<ElementResult<R>>> {
        if components.is_empty() {
            return Ok(Vec::new());
        }
        envelope::check_batch(operation, components.len())?;
        let body = envelope::encode_components(operation, &self.registry, components)?;

        let response = self.dispatch(SoapCall::metadata(operation, body)).await?;
        let names: Vec<String> = components
            .iter()
            .map(|c| c.full_name().to_string())
            .collect();
        let results = envelope::element_results(operation, &response, &names, success)?;
        log_outcome(operation, &results);
        Ok(results)
    }

    /// Delete components of one type by full name; at most 10 per call.
    ///
    /// Returns one result per name, in request order.
    pub async fn delete_metadata(
        &self,
        type_name: &str,
        full_names: &[&str],
    ) -> Result<Vec<ElementResult<DeleteResult>>> {
        let selector = MetadataSelector::new(type_name, full_names.iter().copied());
        self.delete_selected(selector).await
    }

    /// Delete components by reference. All references must share one type.
    pub async fn delete_components(
        &self,
        refs: &[MetadataRef],
    ) -> Result<Vec<ElementResult<DeleteResult>>> {
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        let selector = MetadataSelector::from_refs("deleteMetadata", refs)?;
        self.delete_selected(selector).await
    }

    async fn delete_selected(
        &self,
        selector: MetadataSelector,
    ) -> Result<Vec<ElementResult<DeleteResult>>> {
        selector.validate("deleteMetadata")?;
        if selector.full_names.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .dispatch(SoapCall::metadata("deleteMetadata", selector.to_xml()))
            .await?;
        let results = envelope::element_results(
            "deleteMetadata",
            &response,
            &selector.full_names,
            |_, full_name| DeleteResult { full_name },
        )?;
        log_outcome("deleteMetadata", &results);
        Ok(results)
    }

    /// Read components of one type by full name; at most 10 per call.
    ///
    /// Names the service does not know are absent from the result.
    pub async fn read_metadata(&self, type_name: &str, full_names: &[&str]) -> Result<ReadResult> {
        let selector = MetadataSelector::new(type_name, full_names.iter().copied());
        self.read_selected(selector).await
    }

    /// Read components by reference. All references must share one type.
    pub async fn read_components(&self, refs: &[MetadataRef]) -> Result<ReadResult> {
        if refs.is_empty() {
            return Ok(ReadResult::default());
        }
        let selector = MetadataSelector::from_refs("readMetadata", refs)?;
        self.read_selected(selector).await
    }

    async fn read_selected(&self, selector: MetadataSelector) -> Result<ReadResult> {
        selector.validate("readMetadata")?;
        if selector.full_names.is_empty() {
            return Ok(ReadResult::default());
        }

        let response = self
            .dispatch(SoapCall::metadata("readMetadata", selector.to_xml()))
            .await?;
        let records = envelope::read_records("readMetadata", &response, &selector.type_name)?;
        Ok(ReadResult { records })
    }

    /// Rename one component.
    pub async fn rename_metadata(
        &self,
        request: &RenameRequest,
    ) -> Result<ElementResult<SaveResult>> {
        for (name, value) in [
            ("type name", &request.type_name),
            ("old full name", &request.old_full_name),
            ("new full name", &request.new_full_name),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation(
                    "renameMetadata",
                    format!("{} is required", name),
                ));
            }
        }

        let body = format!(
            "<type>{}</type><oldFullName>{}</oldFullName><newFullName>{}</newFullName>",
            xml::escape(&request.type_name),
            xml::escape(&request.old_full_name),
            xml::escape(&request.new_full_name)
        );
        let response = self
            .dispatch(SoapCall::metadata("renameMetadata", body))
            .await?;
        let node = response.child("result").ok_or_else(|| {
            Error::invalid_response("renameMetadata", "response has no result element")
        })?;

        // The result names the component by its new name.
        Ok(envelope::element_result(
            "renameMetadata",
            node,
            &request.new_full_name,
            |_, full_name| SaveResult { full_name },
        ))
    }
}

fn log_outcome<R>(operation: &str, results: &[ElementResult<R>]) {
    let failed = results.iter().filter(|r| r.is_err()).count();
    debug!(
        operation,
        total = results.len(),
        failed,
        "Per-element results received"
    );
}

#[cfg(test)]
mod tests {
    use super::super::test_support::client;
    use crate::component::{Component, MetadataRef};
    use crate::kinds::{CustomField, CustomObject};
    use crate::types::RenameRequest;
    use serde_json::json;

    fn object(name: &str) -> Component {
        Component::from_typed(&CustomObject {
            full_name: name.to_string(),
            label: Some(name.trim_end_matches("__c").to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn success(name: &str) -> String {
        format!("<result><fullName>{name}</fullName><success>true</success></result>")
    }

    #[tokio::test]
    async fn test_create_mixed_kinds_preserves_order() {
        let (client, transport) = client();
        transport.respond(
            "createMetadata",
            &format!(
                "{}{}<result><errors><message>Layout exists</message>\
                 <statusCode>DUPLICATE_DEVELOPER_NAME</statusCode></errors>\
                 <fullName>Foo__c-Foo Layout</fullName><success>false</success></result>",
                success("Foo__c"),
                success("Foo__c.Amount__c")
            ),
        );

        let components = vec![
            object("Foo__c"),
            Component::from_typed(&CustomField {
                full_name: "Foo__c.Amount__c".to_string(),
                field_type: Some("Number".to_string()),
                ..Default::default()
            })
            .unwrap(),
            Component::new("Layout", json!({ "fullName": "Foo__c-Foo Layout" })).unwrap(),
        ];
        let results = client.create_metadata(&components).await.unwrap();

        assert_eq!(results.len(), components.len());
        for (result, component) in results.iter().zip(&components) {
            let name = match result {
                Ok(saved) => saved.full_name.clone(),
                Err(fault) => fault.full_name.clone().unwrap(),
            };
            assert_eq!(name, component.full_name());
        }
        let fault = results[2].as_ref().unwrap_err();
        assert_eq!(fault.status_code, "DUPLICATE_DEVELOPER_NAME");
        assert_eq!(fault.operation, "createMetadata");

        let body = transport.last_call().unwrap().call.body;
        let first = body.find(r#"xsi:type="met:CustomObject""#).unwrap();
        let second = body.find(r#"xsi:type="met:CustomField""#).unwrap();
        let third = body.find(r#"xsi:type="met:Layout""#).unwrap();
        assert!(first < second && second < third);
    }

    #[tokio::test]
    async fn test_update_metadata() {
        let (client, transport) = client();
        transport.respond("updateMetadata", &success("Foo__c"));

        let results = client.update_metadata(&[object("Foo__c")]).await.unwrap();
        assert_eq!(results[0].as_ref().unwrap().full_name, "Foo__c");
        assert_eq!(transport.last_call().unwrap().call.operation, "updateMetadata");
    }

    #[tokio::test]
    async fn test_upsert_reports_created() {
        let (client, transport) = client();
        transport.respond(
            "upsertMetadata",
            "<result><created>true</created><fullName>Foo__c</fullName><success>true</success></result>\
             <result><created>false</created><fullName>Bar__c</fullName><success>true</success></result>",
        );

        let results = client
            .upsert_metadata(&[object("Foo__c"), object("Bar__c")])
            .await
            .unwrap();
        assert!(results[0].as_ref().unwrap().created);
        assert!(!results[1].as_ref().unwrap().created);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_call() {
        let (client, transport) = client();
        assert!(client.create_metadata(&[]).await.unwrap().is_empty());
        assert!(client.delete_metadata("CustomObject", &[]).await.unwrap().is_empty());
        assert!(client.read_metadata("CustomObject", &[]).await.unwrap().records.is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_batch_is_rejected() {
        let (client, transport) = client();
        let components: Vec<Component> = (0..11).map(|i| object(&format!("Obj{i}__c"))).collect();
        let err = client.create_metadata(&components).await.unwrap_err();
        assert!(err.is_validation());

        let names: Vec<String> = (0..11).map(|i| format!("Obj{i}__c")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert!(client.delete_metadata("CustomObject", &names).await.is_err());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unregistered_kind_is_rejected_before_dispatch() {
        let (client, transport) = client();
        let component = Component::new("Mystery", json!({ "fullName": "x" })).unwrap();
        assert!(client.create_metadata(&[component]).await.unwrap_err().is_validation());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_registered_kind_is_accepted() {
        let (mut client, transport) = client();
        transport.respond("createMetadata", &success("Welcome"));
        client
            .registry_mut()
            .register(crate::ComponentKind::new("EmailTemplate").with_field_order(["subject"]));

        let component = Component::new(
            "EmailTemplate",
            json!({ "fullName": "Welcome", "subject": "Hi", "available": true }),
        )
        .unwrap();
        let results = client.create_metadata(&[component]).await.unwrap();
        assert!(results[0].is_ok());
        assert!(transport
            .last_call()
            .unwrap()
            .call
            .body
            .contains("<fullName>Welcome</fullName><subject>Hi</subject><available>true</available>"));
    }

    #[tokio::test]
    async fn test_delete_partial_failure() {
        let (client, transport) = client();
        transport.respond(
            "deleteMetadata",
            "<result><fullName>Foo__c</fullName><success>true</success></result>\
             <result><errors><message>no CustomObject named Bar__c found</message>\
             <statusCode>INVALID_CROSS_REFERENCE_KEY</statusCode></errors>\
             <fullName>Bar__c</fullName><success>false</success></result>",
        );

        let results = client
            .delete_metadata("CustomObject", &["Foo__c", "Bar__c"])
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().full_name, "Foo__c");
        let fault = results[1].as_ref().unwrap_err();
        assert_eq!(fault.full_name.as_deref(), Some("Bar__c"));
        assert!(fault.to_string().contains("Bar__c"));
    }

    #[tokio::test]
    async fn test_delete_requires_type_name() {
        let (client, transport) = client();
        let err = client.delete_metadata(" ", &["Foo__c"]).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.operation(), Some("deleteMetadata"));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mixed_types_rejected_before_dispatch() {
        let (client, transport) = client();
        let refs = vec![
            MetadataRef::new("CustomObject", "Foo__c"),
            MetadataRef::new("CustomField", "Foo__c.Bar__c"),
        ];

        assert!(client.read_components(&refs).await.unwrap_err().is_validation());
        assert!(client.delete_components(&refs).await.unwrap_err().is_validation());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_read_metadata() {
        let (client, transport) = client();
        transport.respond(
            "readMetadata",
            r#"<result>
                <records xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="CustomObject">
                    <fullName>Foo__c</fullName>
                    <label>Foo</label>
                    <pluralLabel>Foos</pluralLabel>
                </records>
            </result>"#,
        );

        let result = client.read_components(&[MetadataRef::new("CustomObject", "Foo__c")])
            .await
            .unwrap();
        assert_eq!(result.records.len(), 1);
        let object: CustomObject = result.records[0].clone().into_typed().unwrap();
        assert_eq!(object.plural_label.as_deref(), Some("Foos"));
        assert_eq!(
            transport.last_call().unwrap().call.body,
            "<type>CustomObject</type><fullNames>Foo__c</fullNames>"
        );
    }

    #[tokio::test]
    async fn test_rename_metadata() {
        let (client, transport) = client();
        transport.respond(
            "renameMetadata",
            "<result><fullName>Baz__c</fullName><success>true</success></result>",
        );

        let result = client
            .rename_metadata(&RenameRequest::new("CustomObject", "Foo__c", "Baz__c"))
            .await
            .unwrap();
        assert_eq!(result.unwrap().full_name, "Baz__c");
        assert_eq!(
            transport.last_call().unwrap().call.body,
            "<type>CustomObject</type><oldFullName>Foo__c</oldFullName><newFullName>Baz__c</newFullName>"
        );

        let err = client
            .rename_metadata(&RenameRequest::new("CustomObject", "Foo__c", ""))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_remote_fault_for_whole_call() {
        let (client, transport) = client();
        transport.fault("readMetadata", "sf:INVALID_SESSION_ID", "Session expired");

        let err = client.read_metadata("CustomObject", &["Foo__c"]).await.unwrap_err();
        let fault = err.remote_fault().unwrap();
        assert_eq!(fault.operation, "readMetadata");
        assert_eq!(fault.status_code, "sf:INVALID_SESSION_ID");
    }
}
