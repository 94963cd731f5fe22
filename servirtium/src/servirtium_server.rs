use crate::{
    data::{InteractionData, RequestData, ResponseData},
    error::Error,
    servirtium_configuration::ServirtiumConfiguration,
    util,
};
use hyper::{
    body,
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use std::{
    convert::Infallible,
    net::{SocketAddr, TcpListener},
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
};
use tokio::{runtime::Runtime, sync::oneshot};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ServirtiumMode {
    Playback,
    Record,
}

/// A local HTTP server that either replays a recording or records the real service.
///
/// The server listens on its own thread until [`ServirtiumServer::finish`] is called or it is
/// dropped.
#[derive(Debug)]
pub struct ServirtiumServer {
    address: SocketAddr,
    state: Arc<Mutex<SessionState>>,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl ServirtiumServer {
    pub fn start(configuration: ServirtiumConfiguration) -> Result<Self, Error> {
        if configuration.interaction_mode() == ServirtiumMode::Record
            && configuration.domain_name().is_none()
        {
            return Err(Error::NotConfigured);
        }

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], configuration.port())))?;
        let address = listener.local_addr()?;
        let runtime = Runtime::new()?;
        let state = Arc::new(Mutex::new(SessionState::new(configuration)));
        let (shutdown, shutdown_signal) = oneshot::channel();

        let server_state = state.clone();
        let join_handle = thread::Builder::new()
            .name(format!("servirtium-{}", address.port()))
            .spawn(move || runtime.block_on(serve(listener, server_state, shutdown_signal)))?;

        tracing::debug!(%address, "Servirtium server started");

        Ok(Self {
            address,
            state,
            shutdown: Some(shutdown),
            join_handle: Some(join_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.address)
    }

    /// Stops the server and completes the session: a recording is checked and saved, a
    /// playback must have served every recorded interaction.
    pub fn finish(mut self) -> Result<(), Error> {
        self.stop()?;

        let mut state = self.state.lock()?;
        state.finish()
    }

    fn stop(&mut self) -> Result<(), Error> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            join_handle
                .join()
                .map_err(|_| Error::ServerThreadPanicked)?;
        }

        Ok(())
    }
}

impl Drop for ServirtiumServer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::error!(error = %e, "Couldn't gracefully shutdown the Servirtium server thread");
        }
    }
}

#[derive(Debug)]
struct SessionState {
    configuration: ServirtiumConfiguration,
    interactions: Vec<InteractionData>,
    markdown_data: Option<Vec<InteractionData>>,
    interaction_number: usize,
    error: Option<Error>,
}

impl SessionState {
    fn new(configuration: ServirtiumConfiguration) -> Self {
        Self {
            configuration,
            interactions: Vec::new(),
            markdown_data: None,
            interaction_number: 0,
            error: None,
        }
    }

    fn play_back(&mut self, request_data: &RequestData) -> Result<ResponseData, Error> {
        if self.markdown_data.is_none() {
            self.markdown_data = Some(self.load_markdown_data()?);
        }

        let recorded = self.markdown_data.as_deref().unwrap_or(&[]);
        let number = self.interaction_number;
        let playback_data = recorded
            .get(number)
            .ok_or(Error::InteractionOutOfRange {
                number,
                recorded: recorded.len(),
            })?;

        if playback_data.request_data.describe() != request_data.describe() {
            return Err(Error::InteractionMismatch {
                number,
                expected: playback_data.request_data.describe(),
                actual: request_data.describe(),
            });
        }

        let mut response_data = playback_data.response_data.clone();
        for mutation in self.configuration.playback_response_mutations() {
            mutation.mutate(&mut response_data);
        }

        self.interaction_number += 1;
        Ok(response_data)
    }

    fn record(&mut self, mut request_data: RequestData, mut response_data: ResponseData) {
        request_data.headers = util::forwardable(&request_data.headers)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        for mutation in self.configuration.record_request_mutations() {
            mutation.mutate(&mut request_data);
        }

        for mutation in self.configuration.record_response_mutations() {
            mutation.mutate(&mut response_data);
        }

        self.interactions.push(InteractionData {
            interaction_number: self.interactions.len(),
            request_data,
            response_data,
        });
    }

    fn load_markdown_data(&self) -> Result<Vec<InteractionData>, Error> {
        self.configuration
            .interaction_manager()
            .load_interactions()
            .map_err(Error::InteractionManagerError)
    }

    fn finish(&mut self) -> Result<(), Error> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }

        let interaction_manager = self.configuration.interaction_manager();

        match self.configuration.interaction_mode() {
            ServirtiumMode::Record => {
                if self.configuration.fail_if_markdown_changed() {
                    interaction_manager
                        .check_data_unchanged(&self.interactions)
                        .map_err(Error::MarkdownDataChanged)?;
                }

                interaction_manager
                    .save_interactions(&self.interactions)
                    .map_err(Error::InteractionManagerError)
            }
            ServirtiumMode::Playback => {
                let recorded = match &self.markdown_data {
                    Some(markdown_data) => markdown_data.len(),
                    None => self.load_markdown_data()?.len(),
                };

                if self.interaction_number < recorded {
                    Err(Error::UnplayedInteractions {
                        played: self.interaction_number,
                        recorded,
                    })
                } else {
                    Ok(())
                }
            }
        }
    }
}

async fn serve(
    listener: TcpListener,
    state: Arc<Mutex<SessionState>>,
    shutdown_signal: oneshot::Receiver<()>,
) {
    let builder = match Server::from_tcp(listener) {
        Ok(builder) => builder,
        Err(e) => {
            tracing::error!(error = %e, "Servirtium server couldn't listen");
            return;
        }
    };

    let make_service = make_service_fn(move |_| {
        let state = state.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |request| {
                handle_request(state.clone(), request)
            }))
        }
    });

    let server = builder
        .serve(make_service)
        .with_graceful_shutdown(async {
            let _ = shutdown_signal.await;
        });

    if let Err(e) = server.await {
        tracing::error!(error = %e, "Servirtium Server error");
    }
}

async fn handle_request(
    state: Arc<Mutex<SessionState>>,
    mut request: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let response = match process_request(&state, &mut request).await {
        Ok(response_data) => build_response(&response_data),
        Err(e) => Err(e),
    };

    Ok(response.unwrap_or_else(|error| {
        tracing::error!(%error, "Servirtium couldn't handle the request");
        if let Ok(mut state) = state.lock() {
            state.error.get_or_insert(error);
        }

        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    }))
}

async fn process_request(
    state: &Mutex<SessionState>,
    request: &mut Request<Body>,
) -> Result<ResponseData, Error> {
    let request_data = read_request_data(request).await?;
    let mode = state.lock()?.configuration.interaction_mode();

    if mode == ServirtiumMode::Playback {
        let response_data = state.lock()?.play_back(&request_data);
        return response_data;
    }

    // the lock must not be held while the request is forwarded
    let (domain_name, http_client) = {
        let state = state.lock()?;
        let domain_name = state
            .configuration
            .domain_name()
            .cloned()
            .ok_or(Error::NotConfigured)?;
        (domain_name, state.configuration.http_client())
    };

    let response_data = http_client
        .make_request(&domain_name, &request_data)
        .await?;

    state.lock()?.record(request_data, response_data.clone());
    Ok(response_data)
}

async fn read_request_data(request: &mut Request<Body>) -> Result<RequestData, Error> {
    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let headers = util::extract_headers(request.headers());

    let body = body::to_bytes(request.body_mut())
        .await
        .map_err(|_| Error::InvalidBody)?;

    Ok(RequestData {
        method,
        uri,
        headers,
        body: String::from_utf8_lossy(&body).into(),
    })
}

fn build_response(response_data: &ResponseData) -> Result<Response<Body>, Error> {
    let mut response_builder = Response::builder().status(response_data.status_code);

    if let Some(headers_mut) = response_builder.headers_mut() {
        util::put_headers(headers_mut, util::without_hop_by_hop(&response_data.headers))?;
    }

    Ok(response_builder.body(Body::from(response_data.body.clone()))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::Headers, http_client::HttpClient, interaction_manager::InteractionManager, markdown,
    };
    use async_trait::async_trait;

    #[derive(Debug, Default)]
    struct MemoryInteractions {
        recorded: Vec<InteractionData>,
        saved: Arc<Mutex<Vec<InteractionData>>>,
        changed: bool,
    }

    impl InteractionManager for MemoryInteractions {
        fn load_interactions(
            &self,
        ) -> Result<Vec<InteractionData>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.recorded.clone())
        }

        fn save_interactions(
            &self,
            interactions: &[InteractionData],
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            *self.saved.lock().unwrap() = interactions.to_vec();
            Ok(())
        }

        fn check_data_unchanged(
            &self,
            _interactions: &[InteractionData],
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if self.changed {
                Err(markdown::Error::InteractionCountDiffers { old: 0, new: 1 }.into())
            } else {
                Ok(())
            }
        }
    }

    // answers every forwarded request itself
    #[derive(Debug)]
    struct CannedHttpClient {
        response: ResponseData,
        forwarded: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpClient for CannedHttpClient {
        async fn make_request(
            &self,
            domain_name: &str,
            request_data: &RequestData,
        ) -> Result<ResponseData, Error> {
            self.forwarded
                .lock()?
                .push(format!("{}{}", domain_name, request_data.uri));
            Ok(self.response.clone())
        }
    }

    fn interaction(method: &str, uri: &str, status_code: u16, body: &str) -> InteractionData {
        let mut headers = Headers::new();
        headers.insert("content-type".into(), "application/json".into());

        InteractionData {
            interaction_number: 0,
            request_data: RequestData {
                uri: uri.into(),
                method: method.into(),
                headers: Headers::new(),
                body: String::new(),
            },
            response_data: ResponseData {
                status_code,
                headers,
                body: body.into(),
            },
        }
    }

    fn playback_server(recorded: Vec<InteractionData>) -> ServirtiumServer {
        let manager = MemoryInteractions {
            recorded,
            ..Default::default()
        };

        ServirtiumServer::start(ServirtiumConfiguration::with_interaction_manager(
            ServirtiumMode::Playback,
            Box::new(manager),
        ))
        .unwrap()
    }

    #[test]
    fn playback_serves_a_markdown_recording_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booking.md");
        markdown::save_interactions(
            &path,
            &[
                interaction("POST", "/auth", 200, r#"{"token":"abc123"}"#),
                interaction("DELETE", "/booking/1", 201, "Created"),
            ],
        )
        .unwrap();

        let server =
            ServirtiumServer::start(ServirtiumConfiguration::new(ServirtiumMode::Playback, &path))
                .unwrap();
        let client = reqwest::blocking::Client::new();

        let auth = client
            .post(format!("{}/auth", server.base_url()))
            .body(r#"{"username":"admin","password":"password123"}"#)
            .send()
            .unwrap();
        assert_eq!(auth.status().as_u16(), 200);
        assert_eq!(
            auth.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(auth.text().unwrap(), r#"{"token":"abc123"}"#);

        let deleted = client
            .delete(format!("{}/booking/1", server.base_url()))
            .send()
            .unwrap();
        assert_eq!(deleted.status().as_u16(), 201);
        assert_eq!(deleted.text().unwrap(), "Created");

        server.finish().unwrap();
    }

    #[test]
    fn playback_rejects_a_request_that_was_not_recorded_next() {
        let server = playback_server(vec![interaction("GET", "/booking", 200, "[]")]);

        let response = reqwest::blocking::get(format!("{}/booking/7", server.base_url())).unwrap();
        assert_eq!(response.status().as_u16(), 500);

        match server.finish() {
            Err(Error::InteractionMismatch {
                number,
                expected,
                actual,
            }) => {
                assert_eq!(number, 0);
                assert_eq!(expected, "GET /booking");
                assert_eq!(actual, "GET /booking/7");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn playback_fails_past_the_end_of_the_recording() {
        let server = playback_server(vec![interaction("GET", "/booking", 200, "[]")]);

        let url = format!("{}/booking", server.base_url());
        assert_eq!(reqwest::blocking::get(&url).unwrap().status().as_u16(), 200);
        assert_eq!(reqwest::blocking::get(&url).unwrap().status().as_u16(), 500);

        assert!(matches!(
            server.finish(),
            Err(Error::InteractionOutOfRange {
                number: 1,
                recorded: 1
            })
        ));
    }

    #[test]
    fn playback_reports_interactions_that_were_never_requested() {
        let server = playback_server(vec![
            interaction("GET", "/booking/1", 200, "{}"),
            interaction("DELETE", "/booking/1", 201, "Created"),
        ]);

        let response = reqwest::blocking::get(format!("{}/booking/1", server.base_url())).unwrap();
        assert_eq!(response.status().as_u16(), 200);

        assert!(matches!(
            server.finish(),
            Err(Error::UnplayedInteractions {
                played: 1,
                recorded: 2
            })
        ));
    }

    #[test]
    fn playback_mutations_rewrite_the_replayed_body() {
        let mut configuration = ServirtiumConfiguration::with_interaction_manager(
            ServirtiumMode::Playback,
            Box::new(MemoryInteractions {
                recorded: vec![interaction("POST", "/auth", 200, r#"{"token":"REDACTED"}"#)],
                ..Default::default()
            }),
        );
        configuration.add_playback_response_mutations(|m| m.body_replace("REDACTED", "abc123"));
        let server = ServirtiumServer::start(configuration).unwrap();

        let response = reqwest::blocking::Client::new()
            .post(format!("{}/auth", server.base_url()))
            .send()
            .unwrap();
        assert_eq!(response.text().unwrap(), r#"{"token":"abc123"}"#);

        server.finish().unwrap();
    }

    #[test]
    fn record_forwards_to_the_domain_and_saves_a_mutated_copy() {
        let upstream = playback_server(vec![interaction(
            "POST",
            "/auth",
            200,
            r#"{"token":"abc123"}"#,
        )]);

        let saved = Arc::new(Mutex::new(Vec::new()));
        let mut configuration = ServirtiumConfiguration::with_interaction_manager(
            ServirtiumMode::Record,
            Box::new(MemoryInteractions {
                saved: saved.clone(),
                ..Default::default()
            }),
        );
        configuration.set_domain_name(upstream.base_url());
        configuration.add_record_request_mutations(|m| {
            m.remove_headers(vec!["cookie"])
                .body_replace("password123", "REDACTED")
        });
        configuration.add_record_response_mutations(|m| m.body_replace("abc123", "REDACTED"));
        let recorder = ServirtiumServer::start(configuration).unwrap();

        let response = reqwest::blocking::Client::new()
            .post(format!("{}/auth", recorder.base_url()))
            .header("cookie", "token=previous")
            .header("content-type", "application/json")
            .body(r#"{"username":"admin","password":"password123"}"#)
            .send()
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.text().unwrap(), r#"{"token":"abc123"}"#);

        recorder.finish().unwrap();
        upstream.finish().unwrap();

        let saved = saved.lock().unwrap();
        assert_eq!(saved.len(), 1);

        let recorded = &saved[0];
        assert_eq!(recorded.request_data.describe(), "POST /auth");
        assert!(recorded.request_data.headers.get("cookie").is_none());
        assert!(recorded.request_data.headers.get("host").is_none());
        assert_eq!(
            recorded.request_data.headers.get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(
            recorded.request_data.body,
            r#"{"username":"admin","password":"REDACTED"}"#
        );
        assert_eq!(recorded.response_data.status_code, 200);
        assert_eq!(
            recorded.response_data.headers.get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(recorded.response_data.body, r#"{"token":"REDACTED"}"#);
    }

    #[test]
    fn record_mode_needs_a_domain_name() {
        let configuration =
            ServirtiumConfiguration::new(ServirtiumMode::Record, "playback_data/unused.md");

        assert!(matches!(
            ServirtiumServer::start(configuration),
            Err(Error::NotConfigured)
        ));
    }

    #[test]
    fn record_fails_when_the_recording_changed() {
        let http_client = Arc::new(CannedHttpClient {
            response: interaction("GET", "/booking", 200, "[]").response_data,
            forwarded: Mutex::new(Vec::new()),
        });
        let saved = Arc::new(Mutex::new(Vec::new()));
        let mut configuration = ServirtiumConfiguration::with_interaction_manager(
            ServirtiumMode::Record,
            Box::new(MemoryInteractions {
                saved: saved.clone(),
                changed: true,
                ..Default::default()
            }),
        );
        configuration.set_domain_name("http://booker.test");
        configuration.set_http_client(http_client.clone());
        configuration.set_fail_if_markdown_changed(true);
        let recorder = ServirtiumServer::start(configuration).unwrap();

        let response = reqwest::blocking::get(format!("{}/booking", recorder.base_url())).unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.text().unwrap(), "[]");

        assert!(matches!(
            recorder.finish(),
            Err(Error::MarkdownDataChanged(_))
        ));
        assert_eq!(
            *http_client.forwarded.lock().unwrap(),
            vec![String::from("http://booker.test/booking")]
        );
        assert!(saved.lock().unwrap().is_empty());
    }

    #[test]
    fn unchanged_recording_is_saved_when_changes_are_checked() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let mut configuration = ServirtiumConfiguration::with_interaction_manager(
            ServirtiumMode::Record,
            Box::new(MemoryInteractions {
                saved: saved.clone(),
                ..Default::default()
            }),
        );
        configuration.set_domain_name("http://booker.test");
        configuration.set_http_client(Arc::new(CannedHttpClient {
            response: interaction("DELETE", "/booking/1", 201, "Created").response_data,
            forwarded: Mutex::new(Vec::new()),
        }));
        configuration.set_fail_if_markdown_changed(true);
        let recorder = ServirtiumServer::start(configuration).unwrap();

        let response = reqwest::blocking::Client::new()
            .delete(format!("{}/booking/1", recorder.base_url()))
            .send()
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);

        recorder.finish().unwrap();
        let saved = saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].request_data.describe(), "DELETE /booking/1");
        assert_eq!(saved[0].response_data.body, "Created");
    }

    #[test]
    fn listens_on_the_configured_port() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut configuration = ServirtiumConfiguration::with_interaction_manager(
            ServirtiumMode::Playback,
            Box::new(MemoryInteractions {
                recorded: vec![interaction("GET", "/booking", 200, "[]")],
                ..Default::default()
            }),
        );
        configuration.set_port(port);
        let server = ServirtiumServer::start(configuration).unwrap();

        assert_eq!(server.base_url(), format!("http://127.0.0.1:{}", port));
        let response = reqwest::blocking::get(format!("http://127.0.0.1:{}/booking", port)).unwrap();
        assert_eq!(response.text().unwrap(), "[]");

        server.finish().unwrap();
    }
}
