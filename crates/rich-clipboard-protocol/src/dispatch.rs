//! Named-operation table in front of the clipboard service.

use rich_clipboard::{ClipboardCapability, ClipboardService, WriteOutcome};
use rich_clipboard_types::{Method, MethodCall, MethodResponse, Value};
use tracing::{debug, warn};

/// Dispatcher options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Answer `getData` with every recognised key, absent ones as null.
    pub explicit_nulls: bool,
}

/// Routes [`MethodCall`]s to a [`ClipboardService`].
///
/// Dispatch is synchronous, like the service underneath it. Only an
/// unknown method name produces something other than `Success`.
pub struct Dispatcher<C> {
    service: ClipboardService<C>,
    options: DispatchOptions,
}

impl<C: ClipboardCapability> Dispatcher<C> {
    pub fn new(service: ClipboardService<C>) -> Self {
        Self::with_options(service, DispatchOptions::default())
    }

    pub fn with_options(service: ClipboardService<C>, options: DispatchOptions) -> Self {
        Self { service, options }
    }

    pub fn dispatch(&self, call: &MethodCall) -> MethodResponse {
        let Some(method) = Method::parse(&call.method) else {
            debug!(method = %call.method, "unknown method");
            return MethodResponse::NotImplemented;
        };

        match method {
            Method::GetData => {
                let snapshot = self.service.get_data();
                if self.options.explicit_nulls {
                    MethodResponse::success(snapshot.to_nullable())
                } else {
                    MethodResponse::success(snapshot)
                }
            }
            Method::SetData => {
                match call.arguments.to_snapshot() {
                    Some(snapshot) => {
                        if self.service.set_data(&snapshot) == WriteOutcome::Failed {
                            warn!("setData failed to write plain text");
                        }
                    }
                    None => debug!("setData arguments are not a string map, ignoring"),
                }
                MethodResponse::Success(Value::Null)
            }
            Method::GetAvailableTypes => {
                MethodResponse::success(self.service.get_available_types())
            }
            Method::GetItemCount => {
                let count = i64::try_from(self.service.get_item_count()).unwrap_or(i64::MAX);
                MethodResponse::success(count)
            }
        }
    }
}
