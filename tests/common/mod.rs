#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value as JsonValue};
use swapi_http::{ClientOptions, Delay, RetryPolicy, SwapiClient};

#[derive(Clone)]
enum MockBody {
    Json(JsonValue),
    Text(String),
}

#[derive(Clone)]
pub struct MockResponse {
    status: StatusCode,
    body: MockBody,
    delay: Duration,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: JsonValue) -> Self {
        Self {
            status,
            body: MockBody::Json(body),
            delay: Duration::from_millis(0),
        }
    }

    pub fn ok(body: JsonValue) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn status(status: StatusCode) -> Self {
        Self::json(status, json!({"detail": status.to_string()}))
    }

    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: MockBody::Text(body.to_owned()),
            delay: Duration::from_millis(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Scripted responses keyed by `path?query` exactly as received.
///
/// Each key serves its queue front to back; the last response repeats.
/// Unknown keys answer 404 like the real upstream does for pages past the end.
#[derive(Default)]
pub struct Routes(HashMap<String, Vec<MockResponse>>);

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, key: &str, responses: Vec<MockResponse>) -> Self {
        self.0.insert(key.to_owned(), responses);
        self
    }

    pub fn ok(self, key: &str, body: JsonValue) -> Self {
        self.respond(key, vec![MockResponse::ok(body)])
    }

    /// Serves `items` as a paginated list under `path`, 10 per page.
    ///
    /// Pages past the last one are left unregistered, so they 404.
    pub fn collection(mut self, path: &str, search: Option<&str>, items: &[JsonValue]) -> Self {
        let suffix = search.map(|s| format!("&search={s}")).unwrap_or_default();
        let count = items.len();
        if items.is_empty() {
            return self.ok(
                &format!("{path}?page=1{suffix}"),
                json!({"count": 0, "results": []}),
            );
        }
        for (index, chunk) in items.chunks(10).enumerate() {
            let key = format!("{path}?page={}{suffix}", index + 1);
            self.0.insert(
                key,
                vec![MockResponse::ok(json!({"count": count, "results": chunk}))],
            );
        }
        self
    }
}

#[derive(Clone)]
struct MockState {
    routes: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    total_hits: Arc<AtomicUsize>,
}

async fn upstream_handler(State(state): State<MockState>, uri: Uri) -> Response {
    let key = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| uri.path().to_owned());

    state.total_hits.fetch_add(1, Ordering::SeqCst);
    *state
        .hits
        .lock()
        .expect("hit map mutex must not be poisoned")
        .entry(key.clone())
        .or_default() += 1;

    let response = {
        let mut routes = state
            .routes
            .lock()
            .expect("route mutex must not be poisoned");
        match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };
    let response = response.unwrap_or_else(|| MockResponse::status(StatusCode::NOT_FOUND));

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    match response.body {
        MockBody::Json(body) => (response.status, Json(body)).into_response(),
        MockBody::Text(body) => (response.status, body).into_response(),
    }
}

pub struct TestServer {
    base_url: String,
    routes: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    total_hits: Arc<AtomicUsize>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TestServer {
    /// API root, e.g. `http://127.0.0.1:1234/api`.
    pub fn api_root(&self) -> String {
        format!("{}/api", self.base_url)
    }

    /// Absolute URL for a path served by the mock, e.g. `/api/people/1/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Adds or replaces scripted responses after the server started.
    pub fn respond(&self, key: &str, responses: Vec<MockResponse>) {
        self.routes
            .lock()
            .expect("route mutex must not be poisoned")
            .insert(key.to_owned(), responses.into());
    }

    pub fn hits(&self, key: &str) -> usize {
        self.hits
            .lock()
            .expect("hit map mutex must not be poisoned")
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.total_hits.load(Ordering::SeqCst)
    }
}

pub async fn spawn_server(routes: Routes) -> TestServer {
    let routes = routes
        .0
        .into_iter()
        .map(|(key, responses)| (key, VecDeque::from(responses)))
        .collect();
    let state = MockState {
        routes: Arc::new(Mutex::new(routes)),
        hits: Arc::new(Mutex::new(HashMap::new())),
        total_hits: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .fallback(upstream_handler)
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    TestServer {
        base_url: format!("http://{address}"),
        routes: state.routes,
        hits: state.hits,
        total_hits: state.total_hits,
        task,
    }
}

/// Delay that returns at once and records what it was asked to wait.
pub fn recording_delay() -> (Delay, Arc<Mutex<Vec<Duration>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let delay = Delay::new(move |duration| {
        recorder
            .lock()
            .expect("delay recorder mutex must not be poisoned")
            .push(duration);
        async {}
    });
    (delay, seen)
}

pub fn options(max_retries: usize) -> ClientOptions {
    ClientOptions {
        timeout_ms: 1_000,
        retry: RetryPolicy::default().with_max_retries(max_retries),
        ..ClientOptions::default()
    }
}

/// Client against the mock with the given retries and no real backoff sleeps.
pub fn client(server: &TestServer, max_retries: usize) -> SwapiClient {
    SwapiClient::new(server.api_root())
        .with_options(options(max_retries))
        .with_delay(Delay::none())
}

/// Upstream-shaped people with absolute urls pointing at `base`.
pub fn people(base: &str, count: usize) -> Vec<JsonValue> {
    (1..=count)
        .map(|i| json!({"name": format!("Person {i}"), "url": format!("{base}/api/people/{i}/")}))
        .collect()
}

pub fn names(items: &[JsonValue]) -> Vec<String> {
    items
        .iter()
        .map(|item| item["name"].as_str().unwrap_or_default().to_owned())
        .collect()
}
