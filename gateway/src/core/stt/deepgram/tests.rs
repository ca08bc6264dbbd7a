//! Tests for the Deepgram STT implementation.

use super::*;
use crate::core::stt::base::{BaseSTT, STTError, STTEvent, STTEventCallback};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

fn collecting_callback() -> (STTEventCallback, mpsc::UnboundedReceiver<STTEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: STTEventCallback = Arc::new(move |event: STTEvent| {
        let tx = tx.clone();
        Box::pin(async move {
            let _ = tx.send(event);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    (callback, rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<STTEvent>) -> STTEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

// =============================================================================
// Configuration Tests
// =============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_default_live_options() {
        let config = DeepgramSTTConfig::new("key");
        assert_eq!(config.base_url, DEEPGRAM_STT_URL);
        assert_eq!(config.model, "nova-2");
        assert_eq!(config.language, "en");
        assert!(config.punctuate);
        assert!(config.smart_format);
        assert!(config.interim_results);
        assert!(config.vad_events);
        assert_eq!(config.keepalive_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_websocket_url_contains_live_options() {
        let url = DeepgramSTTConfig::new("key").build_websocket_url().unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.host_str(), Some("api.deepgram.com"));
        assert_eq!(url.path(), "/v1/listen");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        for (key, value) in [
            ("model", "nova-2"),
            ("language", "en"),
            ("punctuate", "true"),
            ("smart_format", "true"),
            ("interim_results", "true"),
            ("vad_events", "true"),
            ("utterance_end_ms", "1000"),
        ] {
            assert!(
                pairs.contains(&(key.to_string(), value.to_string())),
                "missing {key}={value} in {url}"
            );
        }
    }

    #[test]
    fn test_websocket_url_honours_overrides() {
        let mut config = DeepgramSTTConfig::new("key");
        config.base_url = "ws://127.0.0.1:9000/v1/listen".to_string();
        config.language = "fr".to_string();
        config.interim_results = false;

        let url = config.build_websocket_url().unwrap();
        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.port(), Some(9000));
        let query = url.query().unwrap();
        assert!(query.contains("language=fr"));
        assert!(query.contains("interim_results=false"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = DeepgramSTTConfig::new("dg-secret-key");
        let debug = format!("{config:?}");
        assert!(!debug.contains("dg-secret-key"));
        assert!(debug.contains("<redacted>"));

        let connector = DeepgramConnector::new(config);
        assert!(!format!("{connector:?}").contains("dg-secret-key"));
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let mut config = DeepgramSTTConfig::new("key");
        config.base_url = "not a url".to_string();
        assert!(matches!(
            config.build_websocket_url(),
            Err(STTError::ConfigurationError(_))
        ));
    }
}

// =============================================================================
// Message Parsing Tests
// =============================================================================

mod message_tests {
    use super::*;

    #[test]
    fn test_parse_results() {
        let raw = r#"{"type":"Results","channel_index":[0,1],"duration":1.2,"start":0.0,"is_final":true,"speech_final":false,"channel":{"alternatives":[{"transcript":"hello world","confidence":0.98}]}}"#;
        match DeepgramMessage::parse(raw).unwrap() {
            DeepgramMessage::Results(results) => {
                assert!(results.is_final);
                assert!(!results.speech_final);
                assert_eq!(results.transcript(), "hello world");
            }
            other => panic!("expected Results, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_results_without_alternatives() {
        let raw = r#"{"type":"Results","channel":{"alternatives":[]}}"#;
        match DeepgramMessage::parse(raw).unwrap() {
            DeepgramMessage::Results(results) => assert_eq!(results.transcript(), ""),
            other => panic!("expected Results, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_metadata_and_utterance_end() {
        let metadata = r#"{"type":"Metadata","request_id":"abc","duration":3.5,"channels":1}"#;
        assert!(matches!(
            DeepgramMessage::parse(metadata).unwrap(),
            DeepgramMessage::Metadata(m) if m.request_id == "abc"
        ));

        let utterance_end = r#"{"type":"UtteranceEnd","channel":[0,1],"last_word_end":2.4}"#;
        assert!(matches!(
            DeepgramMessage::parse(utterance_end).unwrap(),
            DeepgramMessage::UtteranceEnd(u) if (u.last_word_end - 2.4).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn test_parse_error_prefers_description() {
        let raw = r#"{"type":"Error","description":"bad audio","message":"generic","variant":"x"}"#;
        match DeepgramMessage::parse(raw).unwrap() {
            DeepgramMessage::Error(err) => assert_eq!(err.text(), "bad audio"),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let raw = r#"{"type":"SomethingNew","x":1}"#;
        assert!(matches!(
            DeepgramMessage::parse(raw).unwrap(),
            DeepgramMessage::Unknown(t) if t == "SomethingNew"
        ));
    }

    #[test]
    fn test_message_type() {
        assert_eq!(
            DeepgramMessage::message_type(r#"{"type":"Results","is_final":"yes"}"#).as_deref(),
            Some("Results")
        );
        assert_eq!(DeepgramMessage::message_type(r#"{"type":7}"#), None);
        assert_eq!(DeepgramMessage::message_type("[1,2]"), None);
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(DeepgramMessage::parse("not json").is_err());
    }

    #[test]
    fn test_control_messages_serialize() {
        assert_eq!(
            serde_json::to_string(&KeepAliveMessage::default()).unwrap(),
            r#"{"type":"KeepAlive"}"#
        );
        assert_eq!(
            serde_json::to_string(&CloseStreamMessage::default()).unwrap(),
            r#"{"type":"CloseStream"}"#
        );
    }
}

// =============================================================================
// Event Mapping Tests
// =============================================================================

mod event_tests {
    use super::*;

    #[tokio::test]
    async fn test_results_forwarded_verbatim() {
        let (tx, mut rx) = mpsc::channel(8);
        let raw = r#"{"type":"Results","channel":{"alternatives":[{"transcript":"hi"}]}}"#;

        let keep_going = DeepgramSTT::handle_websocket_message(Message::Text(raw.into()), &tx).await;
        assert!(keep_going);
        assert_eq!(rx.recv().await, Some(STTEvent::Transcript(raw.to_string())));
    }

    #[tokio::test]
    async fn test_unexpected_field_types_still_forwarded() {
        let (tx, mut rx) = mpsc::channel(8);
        let results = r#"{"type":"Results","is_final":"yes","channel":{"alternatives":"none"}}"#;
        let metadata = r#"{"type":"Metadata","request_id":42,"channels":"mono"}"#;

        assert!(DeepgramSTT::handle_websocket_message(Message::Text(results.into()), &tx).await);
        assert!(DeepgramSTT::handle_websocket_message(Message::Text(metadata.into()), &tx).await);

        assert_eq!(rx.recv().await, Some(STTEvent::Transcript(results.to_string())));
        assert_eq!(rx.recv().await, Some(STTEvent::Metadata(metadata.to_string())));
    }

    #[tokio::test]
    async fn test_frame_without_type_ignored() {
        let (tx, mut rx) = mpsc::channel(8);

        assert!(DeepgramSTT::handle_websocket_message(Message::Text("not json".into()), &tx).await);
        assert!(
            DeepgramSTT::handle_websocket_message(Message::Text(r#"{"channel":[0]}"#.into()), &tx)
                .await
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_speech_started_not_emitted() {
        let (tx, mut rx) = mpsc::channel(8);
        let raw = r#"{"type":"SpeechStarted","channel":[0],"timestamp":0.5}"#;

        assert!(DeepgramSTT::handle_websocket_message(Message::Text(raw.into()), &tx).await);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_error_and_warning_events() {
        let (tx, mut rx) = mpsc::channel(8);

        DeepgramSTT::handle_websocket_message(
            Message::Text(r#"{"type":"Error","description":"boom"}"#.into()),
            &tx,
        )
        .await;
        DeepgramSTT::handle_websocket_message(
            Message::Text(r#"{"type":"Warning","description":"careful"}"#.into()),
            &tx,
        )
        .await;

        assert_eq!(
            rx.recv().await,
            Some(STTEvent::Error(STTError::ProviderError("boom".to_string())))
        );
        assert_eq!(rx.recv().await, Some(STTEvent::Warning("careful".to_string())));
    }

    #[tokio::test]
    async fn test_close_frame_stops_processing() {
        let (tx, _rx) = mpsc::channel(8);
        assert!(!DeepgramSTT::handle_websocket_message(Message::Close(None), &tx).await);
    }
}

// =============================================================================
// Client Tests
// =============================================================================

mod client_tests {
    use super::*;
    use tokio_tungstenite::accept_hdr_async;
    use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

    #[test]
    fn test_new_requires_api_key() {
        let result = DeepgramSTT::new(DeepgramSTTConfig::default());
        assert!(matches!(result, Err(STTError::AuthenticationFailed(_))));
    }

    #[tokio::test]
    async fn test_send_audio_before_connect_fails() {
        let mut stt = DeepgramSTT::new(DeepgramSTTConfig::new("key")).unwrap();
        assert!(!stt.is_ready());
        let result = stt.send_audio(Bytes::from_static(b"audio")).await;
        assert!(matches!(result, Err(STTError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut config = DeepgramSTTConfig::new("key");
        config.base_url = format!("ws://127.0.0.1:{port}/v1/listen");
        let mut stt = DeepgramSTT::new(config).unwrap();

        assert!(matches!(
            stt.connect().await,
            Err(STTError::ConnectionFailed(_))
        ));
        assert!(!stt.is_ready());
    }

    /// Full lifecycle against an in-process server speaking the Deepgram protocol.
    #[tokio::test]
    async fn test_stream_lifecycle_against_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (server_tx, mut server_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let auth_tx = server_tx.clone();
            let ws = accept_hdr_async(stream, move |req: &Request, resp: Response| {
                let auth = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let _ = auth_tx.send(format!("auth:{auth}"));
                let _ = auth_tx.send(format!("query:{}", req.uri().query().unwrap_or_default()));
                Ok(resp)
            })
            .await
            .unwrap();
            let (mut write, mut read) = ws.split();

            while let Some(Ok(msg)) = read.next().await {
                match msg {
                    Message::Binary(data) => {
                        let _ = server_tx.send(format!("audio:{}", data.len()));
                        let result = r#"{"type":"Results","is_final":true,"channel":{"alternatives":[{"transcript":"hola"}]}}"#;
                        write.send(Message::Text(result.into())).await.unwrap();
                    }
                    Message::Text(text) => {
                        let _ = server_tx.send(format!("text:{}", text.as_str()));
                        if text.as_str().contains("CloseStream") {
                            let metadata = r#"{"type":"Metadata","request_id":"r1"}"#;
                            let _ = write.send(Message::Text(metadata.into())).await;
                            let _ = write.send(Message::Close(None)).await;
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        let mut config = DeepgramSTTConfig::new("secret");
        config.base_url = format!("ws://127.0.0.1:{port}/v1/listen");
        let (callback, mut events) = collecting_callback();

        let mut stt = DeepgramSTT::new(config).unwrap();
        stt.on_event(callback);
        stt.connect().await.unwrap();
        assert!(stt.is_ready());
        assert_eq!(next_event(&mut events).await, STTEvent::Open);

        assert_eq!(server_rx.recv().await.unwrap(), "auth:Token secret");
        let query = server_rx.recv().await.unwrap();
        assert!(query.contains("utterance_end_ms=1000"));
        assert!(query.contains("vad_events=true"));

        // Empty chunks are never put on the wire
        stt.send_audio(Bytes::new()).await.unwrap();
        stt.send_audio(Bytes::from_static(&[1, 2, 3, 4])).await.unwrap();
        assert_eq!(server_rx.recv().await.unwrap(), "audio:4");

        match next_event(&mut events).await {
            STTEvent::Transcript(raw) => assert!(raw.contains("hola")),
            other => panic!("expected transcript, got {other:?}"),
        }

        stt.finish().await.unwrap();
        assert!(!stt.is_ready());
        assert_eq!(
            server_rx.recv().await.unwrap(),
            r#"text:{"type":"CloseStream"}"#
        );

        match next_event(&mut events).await {
            STTEvent::Metadata(raw) => assert!(raw.contains("r1")),
            other => panic!("expected metadata, got {other:?}"),
        }
        assert_eq!(next_event(&mut events).await, STTEvent::Close);

        assert!(matches!(
            stt.send_audio(Bytes::from_static(b"late")).await,
            Err(STTError::ConnectionFailed(_))
        ));
    }
}
