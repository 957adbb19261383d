//! SOAP 1.1 envelope framing.

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::transport::{CallContext, ServiceNamespace, SoapCall};
use crate::xml::{self, XmlNode};

/// SOAP fault returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapFault {
    pub fault_code: String,
    pub fault_string: String,
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SOAP Fault: {} - {}", self.fault_code, self.fault_string)
    }
}

impl std::error::Error for SoapFault {}

/// Build the request envelope for one call.
pub(crate) fn build_envelope(context: &CallContext, call: &SoapCall) -> String {
    let header = context
        .session_id
        .as_ref()
        .map(|session_id| {
            format!(
                r#"
  <soapenv:Header>
    <SessionHeader xmlns="{ns}">
      <sessionId>{session_id}</sessionId>
    </SessionHeader>
  </soapenv:Header>"#,
                ns = call.namespace.uri(),
                session_id = xml::escape(session_id),
            )
        })
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:met="{met}">{header}
  <soapenv:Body>
    <{operation} xmlns="{ns}">
{body}
    </{operation}>
  </soapenv:Body>
</soapenv:Envelope>"#,
        met = ServiceNamespace::Metadata.uri(),
        header = header,
        operation = call.operation,
        ns = call.namespace.uri(),
        body = call.body,
    )
}

/// Parse a response envelope.
///
/// Returns the first element of `Body`, or the fault it carries.
pub(crate) fn parse_response(text: &str) -> Result<XmlNode> {
    let root = XmlNode::parse(text)?;
    if root.name != "Envelope" {
        return Err(Error::new(ErrorKind::Xml(format!(
            "expected SOAP Envelope, found <{}>",
            root.name
        ))));
    }

    let body = root
        .child("Body")
        .ok_or_else(|| Error::new(ErrorKind::Xml("SOAP envelope has no Body".to_string())))?;

    if let Some(fault) = body.child("Fault") {
        return Err(Error::new(ErrorKind::Fault(parse_fault(fault))));
    }

    body.children
        .first()
        .cloned()
        .ok_or_else(|| Error::new(ErrorKind::Xml("SOAP Body is empty".to_string())))
}

fn parse_fault(fault: &XmlNode) -> SoapFault {
    SoapFault {
        fault_code: fault
            .text_of("faultcode")
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        fault_string: fault
            .text_of("faultstring")
            .unwrap_or_else(|| "Unknown error".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_session_header() {
        let context = CallContext::new("https://x").with_session("abc<&>");
        let call = SoapCall::metadata("deploy", "      <ZipFile>UEsD</ZipFile>");
        let envelope = build_envelope(&context, &call);

        assert!(envelope.contains("<sessionId>abc&lt;&amp;&gt;</sessionId>"));
        assert!(envelope.contains(r#"<deploy xmlns="http://soap.sforce.com/2006/04/metadata">"#));
        assert!(envelope.contains("<ZipFile>UEsD</ZipFile>"));
        assert!(envelope.contains("</deploy>"));
    }

    #[test]
    fn test_envelope_without_session_has_no_header() {
        let context = CallContext::new("https://x");
        let call = SoapCall::partner("login", "<username>u</username>");
        let envelope = build_envelope(&context, &call);

        assert!(!envelope.contains("SessionHeader"));
        assert!(envelope.contains(r#"<login xmlns="urn:partner.soap.sforce.com">"#));
    }

    #[test]
    fn test_parse_response_returns_operation_element() {
        let text = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <deployResponse><result><id>0Af123</id><done>false</done></result></deployResponse>
  </soapenv:Body>
</soapenv:Envelope>"#;

        let node = parse_response(text).unwrap();
        assert_eq!(node.name, "deployResponse");
        assert_eq!(
            node.child("result").and_then(|r| r.text_of("id")),
            Some("0Af123".to_string())
        );
    }

    #[test]
    fn test_parse_response_fault() {
        let text = r#"
        <soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
            <soapenv:Body>
                <soapenv:Fault>
                    <faultcode>sf:INVALID_SESSION_ID</faultcode>
                    <faultstring>Session expired or invalid</faultstring>
                </soapenv:Fault>
            </soapenv:Body>
        </soapenv:Envelope>"#;

        let err = parse_response(text).unwrap_err();
        let fault = err.fault().unwrap();
        assert_eq!(fault.fault_code, "sf:INVALID_SESSION_ID");
        assert_eq!(fault.fault_string, "Session expired or invalid");
    }

    #[test]
    fn test_parse_response_rejects_non_envelope() {
        let err = parse_response("<html><body>gateway</body></html>").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Xml(_)));
    }
}
