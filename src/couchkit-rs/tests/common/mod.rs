#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use couchkit_rs::{Config, CouchDbClient};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub title: String,
    pub year: u32,
}

impl Album {
    pub fn new(title: &str, year: u32) -> Self {
        Self {
            id: None,
            rev: None,
            title: title.to_string(),
            year,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

pub fn config_for(server: &MockServer) -> Config {
    let addr = server.address();
    Config {
        host: addr.ip().to_string(),
        port: addr.port(),
        ..Config::for_database("albums")
    }
}

/// Config pointing at a local port nothing listens on
pub fn closed_port_config() -> Config {
    // grab a free port, then release it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    Config {
        host: "127.0.0.1".to_string(),
        port,
        connection_timeout_ms: 2_000,
        ..Config::for_database("albums")
    }
}

pub fn client_for(server: &MockServer) -> CouchDbClient {
    CouchDbClient::new(config_for(server)).unwrap()
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

/// In-memory stand-in for the document endpoints of one database
#[derive(Clone, Default)]
pub struct FakeCouch {
    docs: Arc<Mutex<HashMap<String, Value>>>,
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"error": "not_found", "reason": "missing"}))
}

fn conflict() -> ResponseTemplate {
    ResponseTemplate::new(409)
        .set_body_json(json!({"error": "conflict", "reason": "Document update conflict."}))
}

fn generation(rev: &str) -> u64 {
    rev.split('-')
        .next()
        .and_then(|g| g.parse().ok())
        .unwrap_or(0)
}

impl Respond for FakeCouch {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|s| s.map(str::to_string).collect())
            .unwrap_or_default();
        let id = match segments.as_slice() {
            [_, id] => id.clone(),
            _ => return ResponseTemplate::new(400),
        };
        let rev_param = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "rev")
            .map(|(_, v)| v.into_owned());

        let mut docs = self.docs.lock().unwrap();
        let current_rev = docs
            .get(&id)
            .and_then(|d| d["_rev"].as_str())
            .map(str::to_string);

        match request.method.as_str() {
            "GET" => match docs.get(&id) {
                Some(doc) => ResponseTemplate::new(200).set_body_json(doc),
                None => not_found(),
            },
            "PUT" => {
                let mut body: Value = serde_json::from_slice(&request.body).unwrap();
                let given_rev = body["_rev"].as_str().map(str::to_string);
                if current_rev != given_rev {
                    return conflict();
                }

                let next = current_rev.as_deref().map(generation).unwrap_or(0) + 1;
                let rev = format!("{}-{:032x}", next, next);
                body["_id"] = json!(id);
                body["_rev"] = json!(rev);
                docs.insert(id.clone(), body);

                ResponseTemplate::new(201).set_body_json(json!({"ok": true, "id": id, "rev": rev}))
            }
            "DELETE" => match current_rev {
                None => not_found(),
                Some(rev) if Some(&rev) != rev_param.as_ref() => conflict(),
                Some(rev) => {
                    docs.remove(&id);
                    let next = generation(&rev) + 1;
                    ResponseTemplate::new(200).set_body_json(
                        json!({"ok": true, "id": id, "rev": format!("{}-{:032x}", next, next)}),
                    )
                }
            },
            _ => ResponseTemplate::new(405),
        }
    }
}
