// Shared primitives for one-time server bootstrapping across integration tests.
use corbit_server::ServerSettings;
use std::{
    path::PathBuf,
    // `Arc` shares data between threads; `OnceLock` writes a value only once.
    sync::{Arc, OnceLock},
    time::Duration,
};

// The world every test binary starts from.
pub const SAMPLE_WORLD: &str = include_str!("../../../saves/OCESS.json");

#[derive(Debug, Clone)]
pub struct TestServer {
    pub http_url: String,
    pub pilot_addr: String,
}

static SERVER: OnceLock<TestServer> = OnceLock::new();

// Ensure the test server is running and return its shared addresses.
pub fn ensure_server() -> &'static TestServer {
    SERVER.get_or_init(|| {
        let save_path = temp_path("start");
        std::fs::write(&save_path, SAMPLE_WORLD).expect("write startup snapshot");

        let published = Arc::new(OnceLock::<TestServer>::new());
        let published_thread = Arc::clone(&published);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Ephemeral ports avoid collisions with a locally running server.
                let pilot = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral pilot port");
                let http = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral http port");
                let _ = published_thread.set(TestServer {
                    http_url: format!("http://{}", http.local_addr().expect("http addr")),
                    pilot_addr: pilot.local_addr().expect("pilot addr").to_string(),
                });

                let settings = ServerSettings {
                    save_path: save_path.to_string_lossy().into_owned(),
                    tick_rate: 30.0,
                    gravity: true,
                    autosave_path: None,
                    autosave_period: Duration::from_secs(10),
                };
                corbit_server::run(pilot, http, settings)
                    .await
                    .expect("server failed");
            });
        });

        wait_for_readiness(published)
    })
}

// A unique file path under the system temp dir.
pub fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("corbit-{label}-{}.json", uuid::Uuid::new_v4()))
}

// Wait for address publication and then for both sockets to accept connections.
fn wait_for_readiness(published: Arc<OnceLock<TestServer>>) -> TestServer {
    let server = loop {
        if let Some(server) = published.get() {
            break server.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let http_addr = server
        .http_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(http_addr).is_ok()
            && std::net::TcpStream::connect(&server.pilot_addr).is_ok()
        {
            return server;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}
