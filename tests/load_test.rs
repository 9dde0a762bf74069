//! Concurrent polls through one proxy instance.

use std::time::{Duration, Instant};

mod common;

#[tokio::test]
async fn test_concurrent_polls_are_independent() {
    // Session s{n} finds its element on attempt (n % 3) + 1.
    let driver = common::start_programmable_backend(|req, hits| {
        let n: usize = req.path.split('/').nth(2).unwrap()[1..].parse().unwrap();
        if hits <= n % 3 {
            (404, r#"{"value":{"error":"no such element"}}"#.into())
        } else {
            (200, format!(r#"{{"value":"{}"}}"#, String::from_utf8_lossy(&req.body)))
        }
    })
    .await;
    let proxy = common::start_proxy(common::proxy_config(&driver.url(), 2_000, 20)).await;
    let client = common::client();

    let start = Instant::now();
    let mut handles = Vec::new();
    for n in 0..50 {
        let client = client.clone();
        let url = proxy.url(&format!("/session/s{}/element", n));
        handles.push(tokio::spawn(async move {
            let res = client.post(url).body(format!("e{}", n)).send().await.unwrap();
            (res.status().as_u16(), res.text().await.unwrap(), n)
        }));
    }

    for handle in handles {
        let (status, body, n) = handle.await.unwrap();
        assert_eq!(status, 200);
        assert_eq!(body, format!(r#"{{"value":"e{}"}}"#, n));
    }

    let expected: usize = (0..50).map(|n| n % 3 + 1).sum();
    assert_eq!(driver.calls().len(), expected);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_slow_poll_does_not_block_others() {
    let driver = common::start_programmable_backend(|req, _| {
        if req.path.starts_with("/session/slow/") {
            (404, r#"{"value":{"error":"no such element"}}"#.into())
        } else {
            (200, r#"{"value":{"id":"e1"}}"#.into())
        }
    })
    .await;
    let proxy = common::start_proxy(common::proxy_config(&driver.url(), 600, 50)).await;
    let client = common::client();

    let slow = {
        let client = client.clone();
        let url = proxy.url("/session/slow/element");
        tokio::spawn(async move { client.post(url).body("{}").send().await.unwrap().status() })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let start = Instant::now();
    for n in 0..20 {
        let res = client
            .post(proxy.url(&format!("/session/fast{}/element", n)))
            .body("{}")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }
    assert!(start.elapsed() < Duration::from_millis(500));

    assert_eq!(slow.await.unwrap(), 404);
}
