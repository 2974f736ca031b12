//! Login command.
//!
//! A CLI process has no web host to receive the OAuth redirect, so this
//! command plays that role too: it binds a loopback listener, hands its
//! address to the plugin as the return URL, opens the browser at the
//! login prompt, and feeds the returned authorization code into
//! `handle_callback` exactly as a web host would.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use noterepo_plugins::onenote::{OAuthCredentials, OneNoteConfig, OneNoteRepository};
use noterepo_plugins::{FileTokenStore, RepositoryPlugin, SessionId};

use crate::config::{ClientConfig, OneNoteSettings};
use crate::error::{ClientError, ClientResult};

/// Ports tried for the loopback callback listener.
const LOOPBACK_PORT_RANGE: (u16, u16) = (8080, 8090);

/// How long to wait for the browser redirect.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs the login flow for the given session.
pub async fn login(
    client_id: Option<String>,
    client_secret: Option<String>,
    force: bool,
    config: &ClientConfig,
    session: &str,
) -> ClientResult<()> {
    let (client_id, client_secret) =
        resolve_credentials(client_id, client_secret, config.onenote.as_ref())?;

    let (listener, port) = bind_loopback_server(LOOPBACK_PORT_RANGE)?;
    let return_url = format!("http://127.0.0.1:{}/callback", port);

    let credentials = OAuthCredentials::new(client_id, client_secret);
    let plugin_config = OneNoteConfig::new(credentials, return_url);
    let store = Arc::new(FileTokenStore::new(config.token_dir()));
    let repo = OneNoteRepository::new(plugin_config, store, SessionId::new(session))?;

    if repo.is_logged_in() && !force {
        println!("Already logged in.");
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    let prompt = repo.login_prompt();
    info!("starting login flow, opening browser...");
    debug!("authorization URL: {}", prompt.url);

    if let Err(e) = open::that(&prompt.url) {
        warn!("failed to open browser: {}", e);
        eprintln!("\nPlease open this URL in your browser:\n\n{}\n", prompt.url);
    }

    println!("Waiting for authorization in the browser...");
    let code = wait_for_callback(listener)?;

    repo.handle_callback(Some(code.as_str())).await?;

    println!();
    println!("Login successful.");
    println!("You can now browse with `noterepo list` and download with `noterepo fetch`.");

    Ok(())
}

/// Resolves credentials from CLI flags or `config.toml`.
///
/// Priority (highest to lowest):
/// 1. `--client-id` + `--client-secret`
/// 2. `config.toml` `[onenote]` section
fn resolve_credentials(
    cli_client_id: Option<String>,
    cli_client_secret: Option<String>,
    config_onenote: Option<&OneNoteSettings>,
) -> ClientResult<(String, String)> {
    if let (Some(id), Some(secret)) = (&cli_client_id, &cli_client_secret) {
        return Ok((id.clone(), secret.clone()));
    }

    if cli_client_id.is_some() || cli_client_secret.is_some() {
        return Err(ClientError::Config(
            "both --client-id and --client-secret are required when providing credentials directly"
                .to_string(),
        ));
    }

    if let Some(onenote) = config_onenote {
        if let (Some(id), Some(secret)) = (&onenote.client_id, &onenote.client_secret) {
            return Ok((id.clone(), secret.clone()));
        }
    }

    Err(ClientError::Config(format!(
        "OneNote credentials are required. Provide via:\n  \
         - client_id + client_secret under [onenote] in {}\n  \
         - --client-id and --client-secret flags\n  \
         - NOTEREPO_CLIENT_ID and NOTEREPO_CLIENT_SECRET env vars",
        ClientConfig::default_path().display()
    )))
}

/// Tries to bind a TCP listener on an available port in the given range.
fn bind_loopback_server(port_range: (u16, u16)) -> ClientResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        match TcpListener::bind(format!("127.0.0.1:{}", port)) {
            Ok(listener) => {
                debug!("bound loopback server on port {}", port);
                return Ok((listener, port));
            }
            Err(_) => continue,
        }
    }
    Err(ClientError::Config(format!(
        "no available port in range {}-{}",
        port_range.0, port_range.1
    )))
}

/// Waits for the OAuth callback and extracts the authorization code.
fn wait_for_callback(listener: TcpListener) -> ClientResult<String> {
    let (tx, rx) = mpsc::channel();

    // Handle the callback in a separate thread to allow timeout
    let _handle = thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = handle_callback_request(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                }
            }
        }
    });

    match rx.recv_timeout(CALLBACK_TIMEOUT) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(ClientError::Callback("authorization timed out".to_string()))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(ClientError::Callback(
            "callback channel disconnected".to_string(),
        )),
    }
}

/// Handles an incoming HTTP request on the callback listener.
fn handle_callback_request(mut stream: TcpStream) -> Option<ClientResult<String>> {
    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();

    if reader.read_line(&mut request_line).is_err() {
        return None;
    }

    // Parse the request line: GET /callback?code=... HTTP/1.1
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 || parts[0] != "GET" {
        return None;
    }

    let path = parts[1];
    if !path.starts_with("/callback") {
        return None;
    }

    let query_start = path.find('?').map(|i| i + 1).unwrap_or(path.len());
    let query = &path[query_start..];

    let mut code = None;
    let mut error = None;

    for param in query.split('&') {
        let mut kv = param.splitn(2, '=');
        if let (Some(key), Some(value)) = (kv.next(), kv.next()) {
            match key {
                "code" => code = Some(urlencoding::decode(value).unwrap_or_default().into_owned()),
                "error" => error = Some(urlencoding::decode(value).unwrap_or_default().into_owned()),
                _ => {}
            }
        }
    }

    // Send response to browser
    let response = if error.is_some() || code.is_none() {
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authorization Failed</h1>\
        <p>You can close this window.</p></body></html>"
    } else {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authorization Successful</h1>\
        <p>You can close this window and return to the terminal.</p></body></html>"
    };

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();

    if let Some(error) = error {
        return Some(Err(ClientError::Callback(format!(
            "authorization denied: {}",
            error
        ))));
    }

    match code {
        Some(c) => Some(Ok(c)),
        None => Some(Err(ClientError::Callback(
            "missing authorization code in callback".to_string(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_credentials_from_cli() {
        let result = resolve_credentials(
            Some("cli-id".to_string()),
            Some("cli-secret".to_string()),
            None,
        );
        let (id, secret) = result.unwrap();
        assert_eq!(id, "cli-id");
        assert_eq!(secret, "cli-secret");
    }

    #[test]
    fn resolve_credentials_from_config() {
        let settings = OneNoteSettings {
            client_id: Some("config-id".to_string()),
            client_secret: Some("config-secret".to_string()),
            ..Default::default()
        };
        let (id, secret) = resolve_credentials(None, None, Some(&settings)).unwrap();
        assert_eq!(id, "config-id");
        assert_eq!(secret, "config-secret");
    }

    #[test]
    fn resolve_credentials_cli_overrides_config() {
        let settings = OneNoteSettings {
            client_id: Some("config-id".to_string()),
            client_secret: Some("config-secret".to_string()),
            ..Default::default()
        };
        let (id, _) = resolve_credentials(
            Some("cli-id".to_string()),
            Some("cli-secret".to_string()),
            Some(&settings),
        )
        .unwrap();
        assert_eq!(id, "cli-id");
    }

    #[test]
    fn resolve_credentials_partial_cli_fails() {
        assert!(resolve_credentials(Some("id".to_string()), None, None).is_err());
        assert!(resolve_credentials(None, Some("secret".to_string()), None).is_err());
    }

    #[test]
    fn resolve_credentials_none_fails() {
        assert!(resolve_credentials(None, None, None).is_err());
    }

    #[test]
    fn callback_request_extracts_code() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream
                .write_all(b"GET /callback?code=abc%20123 HTTP/1.1\r\n\r\n")
                .unwrap();
            let mut response = String::new();
            let _ = BufReader::new(&stream).read_line(&mut response);
            response
        });

        let (stream, _) = listener.accept().unwrap();
        let result = handle_callback_request(stream).unwrap().unwrap();
        assert_eq!(result, "abc 123");

        let response = client.join().unwrap();
        assert!(response.contains("200 OK"));
    }

    #[test]
    fn callback_request_reports_denial() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream
                .write_all(b"GET /callback?error=access_denied HTTP/1.1\r\n\r\n")
                .unwrap();
            let mut response = String::new();
            let _ = BufReader::new(&stream).read_line(&mut response);
            response
        });

        let (stream, _) = listener.accept().unwrap();
        let result = handle_callback_request(stream).unwrap();
        assert!(result.is_err());

        let response = client.join().unwrap();
        assert!(response.contains("400"));
    }

    #[test]
    fn non_callback_paths_are_ignored() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"GET /favicon.ico HTTP/1.1\r\n\r\n").unwrap();
        });

        let (stream, _) = listener.accept().unwrap();
        assert!(handle_callback_request(stream).is_none());
        client.join().unwrap();
    }
}
