#[cfg(test)]
mod engine {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::StreamExt;
    use http::StatusCode;
    use linkverify::{
        CancellationToken, CheckResult, Checker, LinkOccurrence, Options, Outcome, Summary,
    };
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(mock_server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(path(route))
            .respond_with(template)
            .mount(mock_server)
            .await;
    }

    fn occurrence(base: &str, route: &str, file: &str, line: usize) -> LinkOccurrence {
        LinkOccurrence::new(format!("{base}{route}"), file, line)
    }

    /// A plain HTTP server that answers every request with `200` after
    /// `delay` and records the highest number of requests it was serving at
    /// the same time.
    async fn counting_server(delay: Duration) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let observed = Arc::clone(&peak);
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&observed);
                tokio::spawn(async move {
                    let mut request: Vec<u8> = Vec::new();
                    let mut chunk = [0_u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);

                    let _ = stream
                        .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                        .await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        (format!("http://{addr}"), peak)
    }

    #[tokio::test]
    async fn test_every_occurrence_gets_one_result() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/ok", ResponseTemplate::new(StatusCode::OK)).await;
        mount(&mock_server, "/gone", ResponseTemplate::new(StatusCode::GONE)).await;
        mount(
            &mock_server,
            "/moved",
            ResponseTemplate::new(StatusCode::MOVED_PERMANENTLY).insert_header("Location", "/ok"),
        )
        .await;
        let base = mock_server.uri();

        let mut occurrences = Vec::new();
        for (i, route) in ["/ok", "/gone", "/moved", "/ok", "/ok", "/gone", "/other"]
            .iter()
            .enumerate()
        {
            occurrences.push(occurrence(&base, route, "docs/index.md", i + 1));
        }
        // `/other` is not mounted, wiremock answers `404`
        let checker = Checker::new(Options::builder().concurrency(3_usize).build()).unwrap();
        let results = checker.check_all(occurrences.clone()).await;

        assert_eq!(results.len(), occurrences.len());
        let expected: HashSet<_> = occurrences.into_iter().collect();
        let actual: HashSet<_> = results.iter().map(|r| r.occurrence.clone()).collect();
        assert_eq!(actual, expected);

        let primaries = results.iter().filter(|r| r.is_primary()).count();
        assert_eq!(primaries, 4);
    }

    #[tokio::test]
    async fn test_duplicates_reference_first_occurrence() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/a", ResponseTemplate::new(StatusCode::OK)).await;
        mount(&mock_server, "/b", ResponseTemplate::new(StatusCode::OK)).await;
        let base = mock_server.uri();

        let results = Checker::new(Options::default())
            .unwrap()
            .check_all(vec![
                occurrence(&base, "/a", "f1", 1),
                occurrence(&base, "/a", "f2", 5),
                occurrence(&base, "/b", "f3", 1),
            ])
            .await;
        assert_eq!(results.len(), 3);

        let find = |file: &str| -> &CheckResult {
            results
                .iter()
                .find(|r| r.occurrence.source_file == file)
                .unwrap()
        };

        assert_eq!(find("f1").outcome, Outcome::Alive(StatusCode::OK));
        assert_eq!(find("f3").outcome, Outcome::Alive(StatusCode::OK));
        let Outcome::Duplicate(primary) = &find("f2").outcome else {
            panic!("expected a duplicate");
        };
        assert_eq!(primary.occurrence, occurrence(&base, "/a", "f1", 1));
        assert_eq!(primary.outcome, Outcome::Alive(StatusCode::OK));

        // Results for one URL are contiguous, primary first
        let positions: Vec<_> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.url().ends_with("/a"))
            .map(|(i, r)| (i, r.is_primary()))
            .collect();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[1].0, positions[0].0 + 1);
        assert!(positions[0].1);
        assert!(!positions[1].1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let (base, peak) = counting_server(Duration::from_millis(100)).await;
        let occurrences: Vec<_> = (0..12)
            .map(|i| occurrence(&base, &format!("/page/{i}"), "index.md", i))
            .collect();

        let checker = Checker::new(Options::builder().concurrency(3_usize).build()).unwrap();
        let results = checker.check_all(occurrences).await;

        assert_eq!(results.len(), 12);
        assert!(results.iter().all(|r| r.outcome == Outcome::Alive(StatusCode::OK)));
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "saw {peak} requests at once");
        assert!(peak >= 1);
    }

    #[tokio::test]
    async fn test_cancel_mid_batch() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/fast", ResponseTemplate::new(StatusCode::OK)).await;
        for route in ["/slow1", "/slow2"] {
            mount(
                &mock_server,
                route,
                ResponseTemplate::new(StatusCode::OK).set_delay(Duration::from_secs(5)),
            )
            .await;
        }
        let base = mock_server.uri();

        let checker = Checker::new(Options::builder().concurrency(1_usize).build()).unwrap();
        let token = CancellationToken::new();
        let stream = checker.check(
            vec![
                occurrence(&base, "/fast", "a.md", 1),
                occurrence(&base, "/slow1", "a.md", 2),
                occurrence(&base, "/slow2", "a.md", 3),
            ],
            token.clone(),
        );

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            canceller.cancel();
        });

        let results: Vec<CheckResult> = tokio::time::timeout(Duration::from_secs(3), stream.collect())
            .await
            .expect("stream did not close after cancellation");

        // `/slow2` was never started and is not reported
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].occurrence.source_line, 1);
        assert_eq!(results[0].outcome, Outcome::Alive(StatusCode::OK));
        assert_eq!(results[1].occurrence.source_line, 2);
        assert_eq!(
            results[1].outcome,
            Outcome::NetworkError("Check cancelled".to_string())
        );
    }

    #[tokio::test]
    async fn test_check_all_summary() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/ok", ResponseTemplate::new(StatusCode::OK)).await;
        mount(&mock_server, "/missing", ResponseTemplate::new(StatusCode::NOT_FOUND)).await;
        mount(
            &mock_server,
            "/moved",
            ResponseTemplate::new(StatusCode::PERMANENT_REDIRECT).insert_header("Location", "/ok"),
        )
        .await;
        let base = mock_server.uri();

        let results = linkverify::check_all(vec![
            occurrence(&base, "/ok", "README.md", 1),
            occurrence(&base, "/missing", "README.md", 2),
            occurrence(&base, "/moved", "docs/guide.md", 10),
            occurrence(&base, "/ok", "docs/guide.md", 11),
        ])
        .await
        .unwrap();

        let summary: Summary = results.iter().collect();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.alive, 1);
        assert_eq!(summary.redirected, 1);
        assert_eq!(summary.dead, 1);
        assert_eq!(summary.duplicates, 1);
        assert!(!summary.is_success());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures["README.md"].len(), 1);

        let moved = results
            .iter()
            .find(|r| r.url().ends_with("/moved"))
            .unwrap();
        let json = serde_json::to_value(moved).unwrap();
        assert_eq!(json["occurrence"]["source_file"], "docs/guide.md");
        assert_eq!(json["outcome"]["kind"], "redirect");
        assert_eq!(json["outcome"]["code"], 308);
        assert_eq!(json["outcome"]["final_code"], 200);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let checker = Checker::new(Options::default()).unwrap();
        let results = checker.check_all(Vec::new()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_network_error_is_retried() {
        // Bind and drop a listener to obtain a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let checker = Checker::new(Options::builder().max_retries(1_u64).build()).unwrap();
        let start = std::time::Instant::now();
        let outcome = checker
            .check_url(&format!("http://127.0.0.1:{port}/"), &CancellationToken::new())
            .await;

        assert_eq!(
            outcome,
            Outcome::NetworkError("Connection refused (after 1 retry)".to_string())
        );
        // One backoff of at least a second between the two attempts
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_cancel_while_following_redirects() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/start",
            ResponseTemplate::new(StatusCode::FOUND).insert_header("Location", "/slow"),
        )
        .await;
        mount(
            &mock_server,
            "/slow",
            ResponseTemplate::new(StatusCode::OK).set_delay(Duration::from_secs(5)),
        )
        .await;

        let checker = Checker::new(Options::default()).unwrap();
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            canceller.cancel();
        });

        let start = std::time::Instant::now();
        let outcome = checker
            .check_url(&format!("{}/start", mock_server.uri()), &token)
            .await;

        assert_eq!(
            outcome,
            Outcome::NetworkError("Check cancelled".to_string())
        );
        assert!(start.elapsed() < Duration::from_secs(3));
    }
}
