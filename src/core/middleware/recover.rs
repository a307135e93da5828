//! Panic recovery.
//!
//! The panic hook logs where a panic happened; `RecoverPanic` turns it into a
//! response once the request task has died.

use crate::core::pipeline::response::panic_error;
use crate::core::pipeline::{Handler, Middleware, Request, Response};
use async_trait::async_trait;
use http::header::{CONNECTION, HeaderValue};
use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, PanicHookInfo};
use std::sync::{Arc, Once};
use tracing::error;

/// Routes panic reports through `tracing` with the fault location and a
/// backtrace taken on the panicking thread. The previous hook still runs.
/// Installing twice is a no-op.
pub fn install_panic_hook() {
    static INSTALLED: Once = Once::new();
    INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            log_panic(info);
            previous(info);
        }));
    });
}

fn log_panic(info: &PanicHookInfo<'_>) {
    let location = info
        .location()
        .map_or_else(|| "unknown".to_string(), ToString::to_string);
    let trace = Backtrace::force_capture();
    error!(
        location = %location,
        message = %panic_message(info.payload()),
        trace = %trace,
        "panic"
    );
}

/// Turns a panic anywhere downstream into a 500 that closes the connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoverPanic;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[async_trait]
impl Middleware for RecoverPanic {
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Response {
        let method = req.method().clone();
        let uri = req.uri().clone();

        match tokio::spawn(async move { next.call(req).await }).await {
            Ok(resp) => resp,
            Err(join_err) => {
                let message = if join_err.is_panic() {
                    panic_message(join_err.into_panic().as_ref())
                } else {
                    join_err.to_string()
                };
                let mut resp = panic_error(&method, &uri, &message);
                resp.headers_mut()
                    .insert(CONNECTION, HeaderValue::from_static("close"));
                resp
            }
        }
    }
}
