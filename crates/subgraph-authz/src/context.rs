use std::{collections::HashMap, sync::Mutex};

/// Per-request user identity, attached to the request by the context
/// builder (typically from an `x-user-id` header). An empty id means the
/// request is anonymous; guarded fields reject it before anything else.
#[derive(Debug, Default, Clone)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Session {
            user_id: user_id.into(),
        }
    }

    pub fn anonymous() -> Self {
        Session::default()
    }
}

/// Per-request scoped map of resources resolved earlier in the same
/// request, keyed by resource type name.
///
/// Guards whose `resource` is not the declaring type read the protected
/// resource's id out of this map. That only works when a resolver that
/// ran earlier recorded the resource: in this repo `Mutation.product`
/// records the `"Product"` entry that the `ProductMutation` guards read.
/// The sequencing comes from GraphQL execution itself (nested fields run
/// after their parent, mutation root fields run serially); a guard whose
/// entry was never recorded fails with a missing-resource-id error rather
/// than guessing.
#[derive(Default)]
pub struct ResourceScope {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl ResourceScope {
    /// Records a resolved resource under its type name.
    pub fn record(&self, type_name: impl Into<String>, entity: serde_json::Value) {
        self.entries.lock().unwrap().insert(type_name.into(), entity);
    }

    pub fn get(&self, type_name: &str) -> Option<serde_json::Value> {
        self.entries.lock().unwrap().get(type_name).cloned()
    }

    /// The `id` of the recorded resource, if any.
    pub fn entity_id(&self, type_name: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(type_name)
            .and_then(|entity| entity.get("id"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    }
}
