use crate::{Options, checker::WebsiteChecker, client::build_client};

#[macro_export]
/// Creates a mock web server, which responds with a predefined status to
/// every request, whatever its method or path
macro_rules! mock_server {
    ($status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let mock_server = wiremock::MockServer::start().await;
        let response_template = wiremock::ResponseTemplate::new(http::StatusCode::from($status));
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::any()).respond_with(template).mount(&mock_server).await;
        mock_server
    }};
}

/// Build a website checker the same way `Checker::new` does
///
/// # Panic
///
/// This panics if the client cannot be built, so it should only be used for
/// testing
pub(crate) fn website_checker(options: Options) -> WebsiteChecker {
    let options = options.validated();
    let client = build_client(&options).expect("Expected a valid client");
    WebsiteChecker::new(client, &options)
}

/// Start a plain HTTP server that answers `HEAD` with `head_status` and
/// `GET` with `200` headers followed by a body that never completes.
///
/// Returns the base URL of the server.
pub(crate) async fn stalled_body_server(head_status: http::StatusCode) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Expected a free local port");
    let addr = listener.local_addr().expect("Expected a bound address");

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request: Vec<u8> = Vec::new();
                let mut chunk = [0_u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }

                if request.starts_with(b"HEAD") {
                    let response = format!(
                        "HTTP/1.1 {head_status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    return;
                }

                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100000\r\n\r\npartial")
                    .await;
                let _ = stream.flush().await;
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            });
        }
    });

    format!("http://{addr}/")
}
