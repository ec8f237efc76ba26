//! Integration tests for `GatewayClient` call orchestration
//!
//! Drives the client against a recording transport double and checks the
//! order of effects: parsing, transport lifecycle, argument handling and
//! response unwrapping.

mod support;

use std::sync::Arc;
use std::time::Duration;

use profitgate_core::ports::{ParamEncoding, TransportTarget};
use profitgate_core::GatewayClient;
use profitgate_domain::{
    Arguments, ClientConfig, ConnectorType, Environment, GatewayError, SoapValue, ValidationCode,
};
use support::transport::{param, RecordingFactory, Reply, TransportEvent};

const TOKEN_XML: &str = "<token><version>1</version><data>app-token</data></token>";

fn literal_config() -> ClientConfig {
    ClientConfig::builder("12345", "app-token").environment(Environment::Test).build().unwrap()
}

fn wsdl_config() -> ClientConfig {
    ClientConfig::builder("12345", "app-token")
        .use_wsdl(true)
        .wsdl_cache_ttl(Duration::from_secs(600))
        .build()
        .unwrap()
}

fn client(config: ClientConfig) -> (GatewayClient, RecordingFactory) {
    let factory = RecordingFactory::new();
    let client = GatewayClient::new(config, Arc::new(factory.clone()));
    (client, factory)
}

fn get_args() -> Arguments {
    Arguments::new().with("connectorId", "Profit_Debtors").with("skip", 0).with("take", 10)
}

#[test]
fn reports_soap_client_type() {
    let (client, _) = client(literal_config());
    assert_eq!(client.client_type(), "SOAP");
    assert_eq!(client.config().customer_id(), "12345");
}

#[test]
fn unknown_connector_type_creates_no_transport() {
    let (mut client, factory) = client(literal_config());

    let err = client.call("nonsense", "Execute", Arguments::new()).unwrap_err();

    assert_eq!(err.validation_code(), Some(ValidationCode::UnknownConnectorType));
    assert_eq!(err.code(), Some(40));
    assert!(factory.events().is_empty());
    assert_eq!(client.bound_connector(), None);
}

#[test]
fn connector_type_is_case_insensitive() {
    let (mut client, factory) = client(literal_config());

    client.call("GET", "GetData", get_args()).unwrap();

    assert_eq!(client.bound_connector(), Some(ConnectorType::Get));
    assert_eq!(
        factory.created(),
        vec![TransportTarget::Literal {
            location: "https://12345.soaptest.afas.online/profitservices/appconnectorget.asmx".into(),
            namespace: "urn:Afas.Profit.Services".into(),
        }]
    );
}

#[test]
fn returns_result_field_of_function() {
    let (mut client, factory) = client(literal_config());
    factory.reply_with(Reply::ResultField("<AfasGetConnector><Debtor/></AfasGetConnector>".into()));

    let result = client.call("get", "GetData", get_args()).unwrap();

    assert_eq!(result, "<AfasGetConnector><Debtor/></AfasGetConnector>");
}

#[test]
fn returns_plain_string_response_unchanged() {
    let (mut client, factory) = client(literal_config());
    factory.reply_with(Reply::Value(SoapValue::Text("raw".into())));

    assert_eq!(client.call("update", "Execute", Arguments::new()).unwrap(), "raw");
}

#[test]
fn unrecognized_response_is_a_format_error() {
    let (mut client, factory) = client(literal_config());
    factory.reply_with(Reply::Value(SoapValue::Nil));

    let err = client.call("update", "Execute", Arguments::new()).unwrap_err();

    assert!(matches!(err, GatewayError::Format { .. }));
    assert_eq!(err.code(), Some(24));
}

#[test]
fn injects_token_for_app_connectors() {
    let (mut client, factory) = client(literal_config());

    let args = Arguments::new().with("connectorType", "KnSubject").with("token", "forged");
    client.call("update", "Execute", args).unwrap();

    let call = factory.last_call();
    let token = param(&call, "token").unwrap();
    assert_eq!(token.value, TOKEN_XML);
    assert_eq!(token.encoding, ParamEncoding::RawMarkup);
    assert_eq!(call.params.iter().filter(|param| param.name == "token").count(), 1);
    assert_eq!(param(&call, "connectorType").unwrap().value, "KnSubject");
}

#[test]
fn token_connector_gets_no_token() {
    let (mut client, factory) = client(literal_config());

    client
        .call("token", "GenerateOTP", Arguments::new().with("userId", "u1").with("apiKey", "k"))
        .unwrap();

    let call = factory.last_call();
    assert!(param(&call, "token").is_none());
    assert_eq!(param(&call, "userid").unwrap().value, "u1");
}

#[test]
fn argument_names_are_folded_and_restored() {
    let (mut client, factory) = client(literal_config());

    client
        .call(
            "update",
            "Execute",
            Arguments::new().with("CONNECTORTYPE", "FbSales").with("DataXML", "<FbSales/>"),
        )
        .unwrap();

    let call = factory.last_call();
    assert_eq!(param(&call, "connectorType").unwrap().value, "FbSales");
    let data = param(&call, "dataXml").unwrap();
    assert_eq!(data.value, "<FbSales/>");
    assert_eq!(data.encoding, ParamEncoding::RawMarkup);
}

#[test]
fn literal_mode_sends_explicit_soap_action() {
    let (mut client, factory) = client(literal_config());

    client.call("get", "GetDataWithOptions", get_args()).unwrap();

    let (_, call, action) = factory.invocations().pop().unwrap();
    assert_eq!(call.function, "GetDataWithOptions");
    assert_eq!(call.namespace, "urn:Afas.Profit.Services");
    assert_eq!(action.as_deref(), Some("urn:Afas.Profit.Services/GetDataWithOptions"));
}

#[test]
fn literal_mode_reuses_and_retargets_one_transport() {
    let (mut client, factory) = client(literal_config());

    client.call("get", "GetData", get_args()).unwrap();
    client.call("get", "GetData", get_args()).unwrap();
    client.call("update", "Execute", Arguments::new()).unwrap();

    let events = factory.events();
    assert_eq!(factory.created().len(), 1);
    assert!(events.contains(&TransportEvent::Retargeted {
        id: 0,
        location: "https://12345.soaptest.afas.online/profitservices/appconnectorupdate.asmx".into(),
    }));
    assert!(factory.invocations().iter().all(|(id, _, _)| *id == 0));
    assert_eq!(client.bound_connector(), Some(ConnectorType::Update));
}

#[test]
fn same_connector_is_not_retargeted() {
    let (mut client, factory) = client(literal_config());

    client.call("report", "Execute", Arguments::new()).unwrap();
    client.call("report", "Execute", Arguments::new()).unwrap();

    assert!(!factory
        .events()
        .iter()
        .any(|event| matches!(event, TransportEvent::Retargeted { .. })));
}

#[test]
fn wsdl_mode_recreates_transport_per_connector_change() {
    let (mut client, factory) = client(wsdl_config());

    client.call("get", "GetData", get_args()).unwrap();
    client.call("get", "GetData", get_args()).unwrap();
    client.call("update", "Execute", Arguments::new()).unwrap();

    assert_eq!(
        factory.created(),
        vec![
            TransportTarget::Wsdl {
                wsdl_url: "https://12345.soap.afas.online/profitservices/appconnectorget.asmx?WSDL".into(),
                cache_ttl: Some(Duration::from_secs(600)),
            },
            TransportTarget::Wsdl {
                wsdl_url: "https://12345.soap.afas.online/profitservices/appconnectorupdate.asmx?WSDL".into(),
                cache_ttl: Some(Duration::from_secs(600)),
            },
        ]
    );
    assert!(!factory
        .events()
        .iter()
        .any(|event| matches!(event, TransportEvent::Retargeted { .. })));
}

#[test]
fn wsdl_mode_uses_normal_invocation_path() {
    let (mut client, factory) = client(wsdl_config());

    client.call("subject", "GetAttachment", Arguments::new().with("subjectId", 5)).unwrap();

    let (_, call, action) = factory.invocations().pop().unwrap();
    assert_eq!(action, None);
    assert_eq!(param(&call, "subjectid").unwrap().value, "5");
}

#[test]
fn get_without_take_fails_after_transport_acquisition() {
    let (mut client, factory) = client(literal_config());

    let err = client.call("get", "GetData", Arguments::new().with("connectorId", "x")).unwrap_err();

    assert_eq!(err.validation_code(), Some(ValidationCode::MissingTake));
    assert_eq!(factory.created().len(), 1);
    assert!(factory.invocations().is_empty());
}

#[test]
fn get_with_non_numeric_take_is_rejected() {
    let (mut client, factory) = client(literal_config());

    let err = client
        .call("get", "GetData", Arguments::new().with("connectorId", "x").with("Take", "ten"))
        .unwrap_err();

    assert_eq!(err.code(), Some(42));
    assert!(factory.invocations().is_empty());
}

#[test]
fn get_full_dataset_override_is_dispatched() {
    let (mut client, factory) = client(literal_config());

    let args = Arguments::new().with("connectorId", "x").with("SKIP", -1);
    client.call("get", "GetData", args).unwrap();
    client
        .call(
            "get",
            "GetDataWithOptions",
            Arguments::new()
                .with("connectorId", "x")
                .with("options", "<options><Skip>-1</Skip></options>"),
        )
        .unwrap();

    assert_eq!(factory.invocations().len(), 2);
}

#[test]
fn transport_errors_propagate_unchanged() {
    let (mut client, factory) = client(literal_config());
    factory.reply_with(Reply::Error(GatewayError::Fault {
        code: "soap:Server".into(),
        message: "Connector not found".into(),
        detail: None,
    }));

    let err = client.call("get", "GetData", get_args()).unwrap_err();

    match err {
        GatewayError::Fault { code, message, .. } => {
            assert_eq!(code, "soap:Server");
            assert_eq!(message, "Connector not found");
        }
        other => panic!("expected fault, got {other:?}"),
    }
}

#[test]
fn construction_failure_is_fatal_for_the_call() {
    let (mut client, factory) = client(wsdl_config());
    factory.fail_creation(GatewayError::Transport("WSDL unreachable".into()));

    let err = client.call("update", "Execute", Arguments::new()).unwrap_err();

    assert!(matches!(err, GatewayError::Transport(_)));
    assert_eq!(client.bound_connector(), None);
}
