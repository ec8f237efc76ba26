//! Recording doubles for `TransportFactory` and `SoapTransport`

use std::sync::{Arc, Mutex};

use profitgate_core::ports::{RpcCall, SoapParam, SoapTransport, TransportFactory, TransportTarget};
use profitgate_domain::{GatewayError, Result as DomainResult, SoapValue, TransportOptions};

/// One observable transport interaction
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Created { id: usize, target: TransportTarget },
    Retargeted { id: usize, location: String },
    Invoked { id: usize, call: RpcCall, soap_action: Option<String> },
}

/// Look up a parameter of `call` by its wire name
pub fn param<'a>(call: &'a RpcCall, name: &str) -> Option<&'a SoapParam> {
    call.params.iter().find(|param| param.name == name)
}

/// How the fake transport answers invocations
#[derive(Debug, Clone)]
pub enum Reply {
    /// `{function}Result` struct carrying the given text
    ResultField(String),
    /// A fixed response value
    Value(SoapValue),
    /// A fixed error
    Error(GatewayError),
}

/// Factory double that records every interaction in a shared log
#[derive(Clone)]
pub struct RecordingFactory {
    log: Arc<Mutex<Vec<TransportEvent>>>,
    reply: Arc<Mutex<Reply>>,
    create_error: Arc<Mutex<Option<GatewayError>>>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(Mutex::new(Reply::ResultField("<ok/>".to_string()))),
            create_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Answer every following invocation with `reply`
    pub fn reply_with(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    /// Fail every following transport construction with `error`
    pub fn fail_creation(&self, error: GatewayError) {
        *self.create_error.lock().unwrap() = Some(error);
    }

    pub fn events(&self) -> Vec<TransportEvent> {
        self.log.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<TransportTarget> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TransportEvent::Created { target, .. } => Some(target),
                _ => None,
            })
            .collect()
    }

    pub fn invocations(&self) -> Vec<(usize, RpcCall, Option<String>)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TransportEvent::Invoked { id, call, soap_action } => Some((id, call, soap_action)),
                _ => None,
            })
            .collect()
    }

    pub fn last_call(&self) -> RpcCall {
        self.invocations().pop().map(|(_, call, _)| call).expect("no invocation recorded")
    }
}

impl TransportFactory for RecordingFactory {
    fn create(
        &self,
        target: TransportTarget,
        _options: TransportOptions,
    ) -> DomainResult<Box<dyn SoapTransport>> {
        if let Some(error) = self.create_error.lock().unwrap().clone() {
            return Err(error);
        }

        let mut log = self.log.lock().unwrap();
        let id =
            log.iter().filter(|event| matches!(event, TransportEvent::Created { .. })).count();
        let location = match &target {
            TransportTarget::Literal { location, .. } => location.clone(),
            TransportTarget::Wsdl { wsdl_url, .. } => {
                wsdl_url.trim_end_matches("?WSDL").to_string()
            }
        };
        log.push(TransportEvent::Created { id, target });

        Ok(Box::new(RecordingTransport {
            id,
            location,
            log: Arc::clone(&self.log),
            reply: Arc::clone(&self.reply),
        }))
    }
}

/// Transport double created by [`RecordingFactory`]
pub struct RecordingTransport {
    id: usize,
    location: String,
    log: Arc<Mutex<Vec<TransportEvent>>>,
    reply: Arc<Mutex<Reply>>,
}

impl RecordingTransport {
    fn answer(&mut self, call: &RpcCall, soap_action: Option<&str>) -> DomainResult<SoapValue> {
        self.log.lock().unwrap().push(TransportEvent::Invoked {
            id: self.id,
            call: call.clone(),
            soap_action: soap_action.map(str::to_string),
        });

        match self.reply.lock().unwrap().clone() {
            Reply::ResultField(text) => {
                let mut fields = indexmap::IndexMap::new();
                fields.insert(format!("{}Result", call.function), text);
                Ok(SoapValue::Struct(fields))
            }
            Reply::Value(value) => Ok(value),
            Reply::Error(error) => Err(error),
        }
    }
}

impl SoapTransport for RecordingTransport {
    fn location(&self) -> &str {
        &self.location
    }

    fn set_location(&mut self, location: &str) {
        self.location = location.to_string();
        self.log
            .lock()
            .unwrap()
            .push(TransportEvent::Retargeted { id: self.id, location: location.to_string() });
    }

    fn invoke(&mut self, call: &RpcCall) -> DomainResult<SoapValue> {
        self.answer(call, None)
    }

    fn invoke_with_action(&mut self, call: &RpcCall, soap_action: &str) -> DomainResult<SoapValue> {
        self.answer(call, Some(soap_action))
    }
}
