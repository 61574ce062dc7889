//! The summary attached to the terminal `PULL` of a record stream: the
//! standard Bolt `SUCCESS` metadata counters.

use crate::value::OrderedMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counters {
    pub nodes_created: i64,
    pub nodes_deleted: i64,
    pub relationships_created: i64,
    pub relationships_deleted: i64,
    pub properties_set: i64,
    pub labels_added: i64,
    pub labels_removed: i64,
    pub indexes_added: i64,
    pub indexes_removed: i64,
    pub constraints_added: i64,
    pub constraints_removed: i64,
}

impl Counters {
    pub fn from_metadata(meta: &OrderedMap) -> Counters {
        let get = |key: &str| meta.get(key).and_then(|v| v.coerce_i64().ok()).unwrap_or(0);
        Counters {
            nodes_created: get("nodes-created"),
            nodes_deleted: get("nodes-deleted"),
            relationships_created: get("relationships-created"),
            relationships_deleted: get("relationships-deleted"),
            properties_set: get("properties-set"),
            labels_added: get("labels-added"),
            labels_removed: get("labels-removed"),
            indexes_added: get("indexes-added"),
            indexes_removed: get("indexes-removed"),
            constraints_added: get("constraints-added"),
            constraints_removed: get("constraints-removed"),
        }
    }

    pub fn contains_updates(&self) -> bool {
        self.nodes_created != 0
            || self.nodes_deleted != 0
            || self.relationships_created != 0
            || self.relationships_deleted != 0
            || self.properties_set != 0
            || self.labels_added != 0
            || self.labels_removed != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    pub code: String,
    pub title: String,
    pub description: String,
    pub severity: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub query_type: Option<String>,
    pub counters: Counters,
    pub result_available_after_ms: Option<i64>,
    pub result_consumed_after_ms: Option<i64>,
    pub notifications: Vec<Notification>,
}

impl Summary {
    pub fn from_metadata(meta: &OrderedMap) -> Summary {
        let counters = meta
            .get("stats")
            .and_then(|v| match v {
                crate::value::Value::Map(m) => Some(Counters::from_metadata(m)),
                _ => None,
            })
            .unwrap_or_default();
        let notifications = meta
            .get("notifications")
            .and_then(|v| match v {
                crate::value::Value::List(items) => Some(
                    items
                        .iter()
                        .filter_map(|item| match item {
                            crate::value::Value::Map(m) => Some(Notification {
                                code: m
                                    .get("code")
                                    .and_then(|v| v.coerce_string().ok().flatten())
                                    .unwrap_or_default(),
                                title: m
                                    .get("title")
                                    .and_then(|v| v.coerce_string().ok().flatten())
                                    .unwrap_or_default(),
                                description: m
                                    .get("description")
                                    .and_then(|v| v.coerce_string().ok().flatten())
                                    .unwrap_or_default(),
                                severity: m
                                    .get("severity")
                                    .and_then(|v| v.coerce_string().ok().flatten())
                                    .unwrap_or_default(),
                            }),
                            _ => None,
                        })
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default();
        Summary {
            query_type: meta.get("type").and_then(|v| v.coerce_string().ok().flatten()),
            counters,
            result_available_after_ms: meta.get("t_first").and_then(|v| v.coerce_i64().ok()),
            result_consumed_after_ms: meta.get("t_last").and_then(|v| v.coerce_i64().ok()),
            notifications,
        }
    }
}
