// tests/dev_server.rs

use std::error::Error;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Duration, sleep};

use assetflow::server::inject::{EVENTS_PATH, SCRIPT_PATH};
use assetflow::server::{LiveReloadServer, Notifier, ReloadHub};
use assetflow::types::Reload;
use assetflow_test_utils::{Project, ProjectBuilder, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn request(path: &str) -> String {
    format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
}

async fn get(addr: SocketAddr, path: &str) -> Result<String, Box<dyn Error>> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(request(path).as_bytes()).await?;
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    Ok(String::from_utf8_lossy(&response).into_owned())
}

async fn start(project: &Project) -> Result<LiveReloadServer, Box<dyn Error>> {
    let config = project.config().clone().with_server_port(0);
    let server = LiveReloadServer::start(config.server(), project.path("dist"), ReloadHub::new()).await?;
    Ok(server)
}

#[tokio::test]
async fn pages_are_served_with_the_reload_client() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .file("dist/index.html", "<html><body><p>hello</p></body></html>")
        .file("dist/css/main.css", "body{margin:0}")
        .build();
    let server = start(&project).await?;
    let addr = server.local_addr();

    let page = with_timeout(get(addr, "/")).await?;
    assert!(page.starts_with("HTTP/1.1 200"), "{page}");
    assert!(page.contains("<p>hello</p>"));
    let script_at = page.find(SCRIPT_PATH).ok_or("reload client missing")?;
    let body_close = page.find("</body>").ok_or("body close missing")?;
    assert!(script_at < body_close);

    let css = with_timeout(get(addr, "/css/main.css")).await?;
    assert!(css.contains("body{margin:0}"));
    assert!(!css.contains(SCRIPT_PATH));

    let client = with_timeout(get(addr, SCRIPT_PATH)).await?;
    assert!(client.contains("EventSource"));
    assert!(client.contains(EVENTS_PATH));

    let missing = with_timeout(get(addr, "/nope.html")).await?;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

    with_timeout(server.stop()).await?;
    Ok(())
}

#[tokio::test]
async fn reload_events_reach_connected_clients() -> TestResult {
    let project = ProjectBuilder::new().file("dist/index.html", "<p>x</p>").build();
    let server = start(&project).await?;

    let mut stream = TcpStream::connect(server.local_addr()).await?;
    stream.write_all(request(EVENTS_PATH).as_bytes()).await?;

    with_timeout(async {
        while server.hub().client_count() == 0 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    server.hub().notify(Reload::Styles);

    let received = with_timeout(async {
        let mut seen = String::new();
        let mut buf = [0u8; 1024];
        while !seen.contains("event: styles") {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            seen.push_str(&String::from_utf8_lossy(&buf[..n]));
        }
        Ok::<_, std::io::Error>(seen)
    })
    .await?;
    assert!(received.contains("text/event-stream"), "{received}");
    assert!(received.contains("event: styles"), "{received}");

    drop(stream);
    with_timeout(server.stop()).await?;
    Ok(())
}

#[tokio::test]
async fn binding_a_taken_port_is_a_server_error() -> TestResult {
    let project = ProjectBuilder::new().build();
    let first = start(&project).await?;

    let config = project
        .config()
        .clone()
        .with_server_port(first.local_addr().port());
    let second = LiveReloadServer::start(config.server(), project.path("dist"), ReloadHub::new()).await;
    assert!(second.is_err());

    first.stop().await?;
    Ok(())
}
