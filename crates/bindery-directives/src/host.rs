//! Host boundary
//!
//! The single contract with the host process: invoke a named command with a
//! JSON object payload and await a `PageResponse`.

use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use serde_json::Value;
use smol::future::{BoxedLocal, FutureExt};

use crate::types::PageResponse;

/// Rejection value of a host invocation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", message_of(.value))]
pub struct HostError {
    value: Value,
}

impl HostError {
    pub fn new(value: impl Into<Value>) -> Self {
        Self { value: value.into() }
    }

    /// Raw rejection value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Display string derived from the rejection value
    pub fn message(&self) -> String {
        message_of(&self.value)
    }
}

impl From<String> for HostError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HostError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// String value as-is, an object's `message` field, otherwise JSON text
fn message_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// Host process interface
pub trait Host {
    /// Invoke `command` with an object payload
    fn invoke(&self, command: &str, payload: Value) -> impl Future<Output = Result<PageResponse, HostError>>;
}

impl<H: Host> Host for Rc<H> {
    fn invoke(&self, command: &str, payload: Value) -> impl Future<Output = Result<PageResponse, HostError>> {
        (**self).invoke(command, payload)
    }
}

type Handler = Box<dyn Fn(Value) -> BoxedLocal<Result<PageResponse, HostError>>>;

/// In-process host routing command names to handlers
#[derive(Default)]
pub struct CommandTable {
    handlers: HashMap<String, Handler>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async handler; a later registration replaces an earlier one
    pub fn register<F, Fut>(&mut self, command: &str, handler: F) -> &mut Self
    where
        F: Fn(Value) -> Fut + 'static,
        Fut: Future<Output = Result<PageResponse, HostError>> + 'static,
    {
        self.handlers
            .insert(command.to_string(), Box::new(move |payload| handler(payload).boxed_local()));
        self
    }

    /// Register a handler that answers without suspending
    pub fn register_sync<F>(&mut self, command: &str, handler: F) -> &mut Self
    where
        F: Fn(Value) -> Result<PageResponse, HostError> + 'static,
    {
        self.register(command, move |payload| std::future::ready(handler(payload)))
    }

    pub fn contains(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl Host for CommandTable {
    fn invoke(&self, command: &str, payload: Value) -> impl Future<Output = Result<PageResponse, HostError>> {
        let call = self.handlers.get(command).map(|handler| handler(payload));
        let command = command.to_string();
        async move {
            match call {
                Some(call) => call.await,
                None => Err(HostError::new(format!("command {command} not found"))),
            }
        }
    }
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut commands: Vec<&str> = self.commands().collect();
        commands.sort_unstable();
        f.debug_struct("CommandTable").field("commands", &commands).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DomUpdate;
    use serde_json::json;

    #[test]
    fn test_error_messages() {
        assert_eq!(HostError::new("Task not found").message(), "Task not found");
        assert_eq!(HostError::new(json!({"message": "db locked", "code": 5})).to_string(), "db locked");
        assert_eq!(HostError::new(json!({"code": 5})).message(), r#"{"code":5}"#);
        assert_eq!(HostError::new(json!(42)).message(), "42");
    }

    #[test]
    fn test_command_table_routes() {
        let mut table = CommandTable::new();
        table.register_sync("index", |_| Ok(PageResponse::new(DomUpdate::replace("<p>home</p>", "#app"))));
        table.register("echo", |payload| async move {
            Ok(PageResponse::new(DomUpdate::replace(payload.to_string(), "#out")))
        });

        let response = smol::block_on(table.invoke("echo", json!({"id": 1}))).unwrap();
        assert_eq!(response.updates[0].html, r#"{"id":1}"#);
        assert!(smol::block_on(table.invoke("index", json!({}))).is_ok());
    }

    #[test]
    fn test_unknown_command_rejects() {
        let table = Rc::new(CommandTable::new());
        let err = smol::block_on(table.invoke("missing", json!({}))).unwrap_err();
        assert_eq!(err.message(), "command missing not found");
    }
}
