// Not every utils is used in every test, so we allow dead code
#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::{Request, Respond, ResponseTemplate};

/// Backend stand-in that stores the last POSTed body and serves it on GET
#[derive(Clone, Default)]
pub struct EchoResponder {
    stored: Arc<Mutex<Option<Vec<u8>>>>,
}

impl Respond for EchoResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut stored = self.stored.lock().unwrap();

        if request.method.as_str() == "POST" {
            *stored = Some(request.body.clone());
            return ResponseTemplate::new(201).set_body_raw(request.body.clone(), "application/json");
        }

        match stored.as_ref() {
            Some(body) => ResponseTemplate::new(200).set_body_raw(body.clone(), "application/json"),
            None => ResponseTemplate::new(400).set_body_json(json!({ "Error": "nothing stored" })),
        }
    }
}

/// A localhost URL nothing is listening on
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/users/alice")
}
