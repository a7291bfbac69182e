use chrono::{Datelike, NaiveDate, TimeDelta, Utc};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct BoardView {
    board: Option<Board>,
    error: Option<String>,
    last_updated: Option<String>,
    auto_refresh: bool,
}

#[derive(Debug, Deserialize)]
struct Board {
    week_number: u32,
    buckets: BTreeMap<String, Bucket>,
}

#[derive(Debug, Deserialize)]
struct Bucket {
    orders: Vec<Order>,
    summary: Vec<SummaryEntry>,
    display_date: String,
}

#[derive(Debug, Deserialize)]
struct Order {
    client: String,
    formatted_date: String,
}

#[derive(Debug, Deserialize)]
struct SummaryEntry {
    abbreviation: String,
    small_count: u64,
    large_count: u64,
}

struct TestServer {
    base_url: String,
    monday: NaiveDate,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn current_monday() -> NaiveDate {
    let today = Utc::now().date_naive();
    let back = match today.weekday().num_days_from_sunday() {
        0 => 6,
        index => index - 1,
    };
    today - TimeDelta::days(back as i64)
}

fn write_orders_file(monday: NaiveDate) -> PathBuf {
    let day = |offset: i64| (monday + TimeDelta::days(offset)).format("%Y-%m-%d").to_string();
    let orders = serde_json::json!([
        {
            "id": "1",
            "property_cliente": "Ana",
            "property_data_entrega": { "start": day(0), "end": null, "time_zone": null },
            "property_bolo_pdm_g": 2,
            "property_bolo_choco_p": 1,
            "property_bolo_pdm_p": null
        },
        {
            "property_cliente": "Bruno",
            "property_data_entrega": { "start": format!("{}T15:00:00.000-03:00", day(0)) },
            "property_bolo_pdm_g": 1
        },
        {
            "property_cliente": "Sem bolo",
            "property_data_entrega": { "start": day(5) },
            "property_bolo_pdm_g": 0
        },
        {
            "property_cliente": "Domingo",
            "property_data_entrega": { "start": day(6) },
            "property_bolo_pdm_p": 3
        },
        {
            "property_data_entrega": { "start": day(2) },
            "property_bolo_choco_g": 4
        }
    ]);

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("bakery_board_http_{}_{}.json", std::process::id(), nanos));
    std::fs::write(&path, serde_json::to_vec(&orders).unwrap()).expect("write orders file");
    path
}

async fn fetch_view(client: &Client, base_url: &str) -> BoardView {
    client
        .get(format!("{base_url}/api/week"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/week")).send().await {
            if let Ok(view) = resp.json::<BoardView>().await {
                if view.board.is_some() {
                    return;
                }
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let monday = current_monday();
    let orders_path = write_orders_file(monday);
    let child = Command::new(env!("CARGO_BIN_EXE_bakery_board"))
        .env("PORT", port.to_string())
        .env("ORDERS_FILE", &orders_path)
        .env("AUTO_REFRESH", "true")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        monday,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

#[tokio::test]
async fn http_week_groups_orders_by_day() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let view = fetch_view(&client, &server.base_url).await;
    assert!(view.error.is_none());
    assert!(view.last_updated.is_some());

    let board = view.board.expect("board loaded");
    assert!(board.week_number >= 1);
    assert_eq!(
        board.buckets.keys().map(String::as_str).collect::<Vec<_>>(),
        ["friday", "monday", "saturday", "thursday", "tuesday", "wednesday"]
    );

    let monday = &board.buckets["monday"];
    assert_eq!(monday.display_date, server.monday.format("%d/%m").to_string());
    let clients: Vec<_> = monday.orders.iter().map(|order| order.client.as_str()).collect();
    assert_eq!(clients, ["Ana", "Bruno"]);
    assert_eq!(monday.orders[1].formatted_date, monday.display_date);

    assert_eq!(monday.summary.len(), 2);
    assert_eq!(monday.summary[0].abbreviation, "PDM");
    assert_eq!(monday.summary[0].small_count, 0);
    assert_eq!(monday.summary[0].large_count, 3);
    assert_eq!(monday.summary[1].abbreviation, "CHOCO");
    assert_eq!(monday.summary[1].small_count, 1);
    assert_eq!(monday.summary[1].large_count, 0);

    let saturday = &board.buckets["saturday"];
    assert!(saturday.orders.is_empty());
    assert!(saturday.summary.is_empty());

    let listed: usize = board.buckets.values().map(|bucket| bucket.orders.len()).sum();
    assert_eq!(listed, 2);
}

#[tokio::test]
async fn http_index_renders_board() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client.get(&server.base_url).send().await.unwrap();
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();

    assert!(html.contains("Bolos da Semana"));
    assert!(html.contains("Segunda-feira"));
    assert!(html.contains("Sábado"));
    assert!(html.contains("Ana"));
    assert!(html.contains("2 x PDM G"));
    assert!(!html.contains("Domingo"));
}

#[tokio::test]
async fn http_manual_refresh_returns_board() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/refresh", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(matches!(response.status(), StatusCode::OK | StatusCode::ACCEPTED));

    let view: BoardView = response.json().await.unwrap();
    assert!(view.board.is_some());
    assert!(view.error.is_none());
}

#[tokio::test]
async fn http_auto_refresh_can_be_toggled() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for enabled in [false, true] {
        let view: BoardView = client
            .post(format!("{}/api/auto-refresh", server.base_url))
            .json(&serde_json::json!({ "enabled": enabled }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view.auto_refresh, enabled);
    }

    let response = client
        .post(format!("{}/api/auto-refresh", server.base_url))
        .json(&serde_json::json!({ "enabled": "yes" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}
