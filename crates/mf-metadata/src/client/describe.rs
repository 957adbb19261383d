use metaforce_client::{xml, ServiceNamespace, SoapCall, Transport};

use crate::describe::{DescribeMetadataResult, DescribeValueTypeResult};
use crate::error::{Error, Result};

use super::{parse, MetadataClient};

impl<T: Transport> MetadataClient<T> {
    /// Describe the metadata types available at the client's API version.
    pub async fn describe_metadata(&self) -> Result<DescribeMetadataResult> {
        let body = format!(
            "<asOfVersion>{}</asOfVersion>",
            self.session.api_version().as_str()
        );
        let response = self
            .dispatch(SoapCall::metadata("describeMetadata", body))
            .await?;
        Ok(parse::describe_metadata_result(parse::result(
            "describeMetadata",
            &response,
        )?))
    }

    /// Describe the fields of a metadata value type.
    ///
    /// `type_name` may be bare (`CustomObject`) or namespace-qualified
    /// (`{http://soap.sforce.com/2006/04/metadata}CustomObject`).
    pub async fn describe_value_type(&self, type_name: &str) -> Result<DescribeValueTypeResult> {
        let type_name = type_name.trim();
        if type_name.is_empty() {
            return Err(Error::validation("describeValueType", "type name is required"));
        }
        let qualified = if type_name.starts_with('{') {
            type_name.to_string()
        } else {
            format!("{{{}}}{}", ServiceNamespace::Metadata.uri(), type_name)
        };

        let body = format!("<type>{}</type>", xml::escape(&qualified));
        let response = self
            .dispatch(SoapCall::metadata("describeValueType", body))
            .await?;
        Ok(parse::describe_value_type_result(parse::result(
            "describeValueType",
            &response,
        )?))
    }

    /// Every metadata type name, including child types, sorted and
    /// deduplicated.
    pub async fn list_metadata_types(&self) -> Result<Vec<String>> {
        let result = self.describe_metadata().await?;
        let mut types: Vec<String> = result
            .metadata_objects
            .into_iter()
            .flat_map(|object| std::iter::once(object.xml_name).chain(object.child_xml_names))
            .filter(|name| !name.is_empty())
            .collect();
        types.sort();
        types.dedup();
        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::client;

    const DESCRIBE: &str = r#"<result>
        <metadataObjects>
            <childXmlNames>CustomField</childXmlNames>
            <childXmlNames>ValidationRule</childXmlNames>
            <directoryName>objects</directoryName>
            <inFolder>false</inFolder>
            <metaFile>false</metaFile>
            <suffix>object</suffix>
            <xmlName>CustomObject</xmlName>
        </metadataObjects>
        <metadataObjects>
            <directoryName>reports</directoryName>
            <inFolder>true</inFolder>
            <metaFile>false</metaFile>
            <suffix>report</suffix>
            <xmlName>Report</xmlName>
        </metadataObjects>
        <organizationNamespace></organizationNamespace>
        <partialSaveAllowed>true</partialSaveAllowed>
        <testRequired>false</testRequired>
    </result>"#;

    #[tokio::test]
    async fn test_describe_metadata() {
        let (client, transport) = client();
        transport.respond("describeMetadata", DESCRIBE);

        let result = client.describe_metadata().await.unwrap();
        assert_eq!(result.metadata_objects.len(), 2);
        assert_eq!(result.metadata_objects[0].child_xml_names.len(), 2);
        assert!(result.metadata_objects[1].in_folder);
        assert!(result.partial_save_allowed);
        assert_eq!(result.organization_namespace, None);
        assert_eq!(
            transport.last_call().unwrap().call.body,
            "<asOfVersion>50.0</asOfVersion>"
        );
    }

    #[tokio::test]
    async fn test_list_metadata_types() {
        let (client, transport) = client();
        transport.respond("describeMetadata", DESCRIBE);

        let types = client.list_metadata_types().await.unwrap();
        assert_eq!(
            types,
            vec!["CustomField", "CustomObject", "Report", "ValidationRule"]
        );
    }

    #[tokio::test]
    async fn test_describe_value_type_qualifies_name() {
        let (client, transport) = client();
        transport.respond(
            "describeValueType",
            "<result><apiReadable>true</apiReadable></result>",
        );

        let result = client.describe_value_type("CustomObject").await.unwrap();
        assert!(result.api_readable);
        assert_eq!(
            transport.last_call().unwrap().call.body,
            "<type>{http://soap.sforce.com/2006/04/metadata}CustomObject</type>"
        );

        let err = client.describe_value_type("").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.call_count(), 1);
    }
}
